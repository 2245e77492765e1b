//! Numeric formatting for tooltips and status lines.

/// Formatting variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Three decimals, scientific outside `[0.001, 1000)`. Used in tooltips.
    Fixed3,
    /// Integers stay integers, scientific outside `[1e-4, 1e6)`. Used in
    /// status summaries.
    Compact,
}

impl NumberFormat {
    /// Formats `value` with this variant.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        match self {
            Self::Fixed3 => fixed3(value),
            Self::Compact => compact(value),
        }
    }
}

/// Tooltip formatting: `0.000`, `12.346`, `1.235e+3`, `5.000e-4`.
#[must_use]
pub fn fixed3(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return String::from("0.000");
    }
    let magnitude = value.abs();
    if !(0.001..1000.0).contains(&magnitude) {
        return scientific(value);
    }
    format!("{value:.3}")
}

/// Status formatting: `64`, `0.125`, `1.000e-5`, `2.500e+6`.
#[must_use]
pub fn compact(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if magnitude < 1e-12 {
        return String::from("0");
    }
    if !(1e-4..1e6).contains(&magnitude) {
        return scientific(value);
    }
    let nearest = value.round();
    if (value - nearest).abs() < 1e-4 {
        return format!("{nearest:.0}");
    }
    format!("{value:.3}")
}

/// Three-decimal scientific notation with an explicit exponent sign.
fn scientific(value: f64) -> String {
    let text = format!("{value:.3e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => text,
    }
}
