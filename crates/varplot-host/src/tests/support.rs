//! Shared doubles for the host test suites.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use camino::Utf8PathBuf;
use mockall::mock;
use serde_json::json;
use tempfile::TempDir;
use varplot_dap::{ClientError, DapEvent, DebugSession, ExtractorBridge};
use varplot_protocol::Payload;

use crate::commands::EventSource;
use crate::errors::{AppError, DeliveryError};
use crate::handshake::{Delivery, DeliveryTarget};
use crate::notifier::Notifier;
use crate::panel::{PanelFactory, PlotPanel};

mock! {
    pub Session {}
    impl DebugSession for Session {
        fn top_frame_id(&self) -> Result<Option<i64>, ClientError>;
        fn evaluate(
            &self,
            expression: &str,
            frame_id: Option<i64>,
            context: &str,
        ) -> Result<String, ClientError>;
    }
}

/// What the extractor answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Stage this payload and answer with its path.
    Stage(Payload),
    /// Answer with `{"error": message}`.
    Fail(String),
    /// The evaluate request itself fails.
    EvaluateError(String),
}

/// Mutable script behind a [`MockSession`].
#[derive(Debug)]
pub struct Script {
    /// Frame reported by `top_frame_id`.
    pub frame: Option<i64>,
    /// Answer to evaluate calls once `queued` is empty.
    pub reply: Reply,
    /// Answers used first, in order.
    pub queued: VecDeque<Reply>,
    /// Frames seen by evaluate.
    pub evaluated_frames: Vec<Option<i64>>,
    /// Every staged file written so far.
    pub staged: Vec<Utf8PathBuf>,
}

/// A debuggee whose behaviour steps can change mid-scenario.
pub struct ScriptedDebuggee {
    dir: TempDir,
    script: Arc<Mutex<Script>>,
}

impl ScriptedDebuggee {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
            script: Arc::new(Mutex::new(Script {
                frame: None,
                reply: Reply::Fail(String::from("nothing scripted")),
                queued: VecDeque::new(),
                evaluated_frames: Vec::new(),
                staged: Vec::new(),
            })),
        }
    }

    pub fn with_script<R>(&self, edit: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        edit(&mut script)
    }

    /// Builds a mock session reading from the script.
    pub fn session(&self) -> Arc<dyn DebugSession> {
        let mut session = MockSession::new();
        let frames = Arc::clone(&self.script);
        session.expect_top_frame_id().returning(move || {
            Ok(frames.lock().unwrap_or_else(PoisonError::into_inner).frame)
        });
        let replies = Arc::clone(&self.script);
        let dir = Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).expect("utf-8 dir");
        session
            .expect_evaluate()
            .returning(move |_, frame_id, _| {
                let mut script = replies.lock().unwrap_or_else(PoisonError::into_inner);
                script.evaluated_frames.push(frame_id);
                let reply = script
                    .queued
                    .pop_front()
                    .unwrap_or_else(|| script.reply.clone());
                match reply {
                    Reply::Stage(payload) => {
                        let path = dir.join(format!("staged-{}.json", script.staged.len()));
                        let text = payload.to_json_string().expect("serialise payload");
                        std::fs::write(&path, text).expect("stage payload");
                        script.staged.push(path.clone());
                        Ok(format!("'{}'", json!({ "file_path": path.as_str() })))
                    }
                    Reply::Fail(message) => Ok(format!("'{}'", json!({ "error": message }))),
                    Reply::EvaluateError(message) => Err(ClientError::RequestFailed {
                        command: String::from("evaluate"),
                        message,
                    }),
                }
            });
        Arc::new(session)
    }
}

pub fn bridge() -> ExtractorBridge {
    ExtractorBridge::new("def extract(value):\n    return value\n", "extract", "repl")
}

/// Notifier that keeps every notice.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

/// Everything that happened to panels opened by a [`RecordingPanelFactory`].
#[derive(Debug, Default)]
pub struct PanelLog {
    pub opened: usize,
    pub closed: usize,
    pub posts: Vec<Payload>,
}

/// Panel double that records posts.
#[derive(Debug)]
pub struct RecordingPanel {
    log: Arc<Mutex<PanelLog>>,
    binding: Option<String>,
}

impl PlotPanel for RecordingPanel {
    fn bind(&mut self, expression: &str) {
        self.binding = Some(expression.to_owned());
    }

    fn binding(&self) -> Option<&str> {
        self.binding.as_deref()
    }

    fn post(&mut self, payload: &Payload) -> Result<Delivery, DeliveryError> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .posts
            .push(payload.clone());
        Ok(Delivery::Delivered)
    }

    fn close(&mut self) {
        self.binding = None;
        self.log.lock().unwrap_or_else(PoisonError::into_inner).closed += 1;
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingPanelFactory {
    log: Arc<Mutex<PanelLog>>,
}

impl RecordingPanelFactory {
    pub fn with_log<R>(&self, read: impl FnOnce(&PanelLog) -> R) -> R {
        read(&self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn last_post(&self) -> Option<Payload> {
        self.with_log(|log| log.posts.last().cloned())
    }
}

impl PanelFactory for RecordingPanelFactory {
    type Panel = RecordingPanel;

    fn open(&self) -> Result<Self::Panel, AppError> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).opened += 1;
        Ok(RecordingPanel {
            log: Arc::clone(&self.log),
            binding: None,
        })
    }
}

/// Delivery target that records payload JSON.
#[derive(Debug, Default, Clone)]
pub struct RecordingTarget {
    delivered: Arc<Mutex<Vec<String>>>,
}

impl RecordingTarget {
    pub fn delivered(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DeliveryTarget for RecordingTarget {
    fn deliver(&mut self, payload: String) -> Result<(), DeliveryError> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload);
        Ok(())
    }
}

/// Adapter events replayed in order; the session ends when they run out.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: Mutex<VecDeque<Result<DapEvent, ClientError>>>,
}

impl ScriptedEvents {
    pub fn new(events: Vec<Result<DapEvent, ClientError>>) -> Self {
        Self {
            events: Mutex::new(events.into()),
        }
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&self) -> Result<DapEvent, ClientError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Err(ClientError::SessionEnded))
    }
}

pub fn event(name: &str) -> DapEvent {
    DapEvent {
        seq: 1,
        event: name.to_owned(),
        body: Some(json!({ "threadId": 1 })),
    }
}
