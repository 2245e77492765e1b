//! Preformatted text for values with no plot form.

use varplot_protocol::ObjectPayload;

use super::Canvas;

pub(crate) fn render_object(payload: &ObjectPayload, canvas: &mut Canvas<'_>) -> String {
    canvas.surface.purge();
    canvas.surface.show_text(&payload.data);
    String::from("Object Representation")
}
