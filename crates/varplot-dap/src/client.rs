//! Blocking Debug Adapter Protocol client.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use varplot_config::AdapterEndpoint;

use crate::errors::ClientError;
use crate::message::{
    DapEvent, DapMessage, DapRequest, DapResponse, EvaluateArguments, EvaluateBody,
    StackFrame, StackTraceArguments, StackTraceBody, Thread, ThreadsBody,
};
use crate::session::DebugSession;
use crate::transport::FramedTransport;

const CLIENT_TARGET: &str = "varplot_dap::client";

/// Maximum number of messages read while waiting for one response.
const MAX_RESPONSE_ITERATIONS: usize = 100;

/// Maximum number of events held for later consumption.
const MAX_BUFFERED_EVENTS: usize = 256;

struct ClientState {
    transport: FramedTransport,
    next_seq: i64,
    events: VecDeque<DapEvent>,
    stopped_thread: Option<i64>,
    ended: bool,
}

impl ClientState {
    const fn take_seq(&mut self) -> i64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn observe(&mut self, event: &DapEvent) {
        if let Some(thread) = event.stopped_thread() {
            self.stopped_thread = Some(thread);
        }
        match event.event.as_str() {
            "continued" => self.stopped_thread = None,
            _ if event.ends_session() => {
                self.ended = true;
                self.stopped_thread = None;
            }
            _ => {}
        }
    }

    fn buffer(&mut self, event: DapEvent) {
        self.observe(&event);
        if self.events.len() >= MAX_BUFFERED_EVENTS
            && let Some(dropped) = self.events.pop_front()
        {
            warn!(
                target: CLIENT_TARGET,
                event = %dropped.event,
                "event buffer full, dropping oldest event"
            );
        }
        self.events.push_back(event);
    }
}

/// Client for a debug adapter that already hosts a running session.
///
/// The client never sends `initialize`, `attach` or `launch`. The adapter
/// must already be attached to a debuggee by another front end, otherwise
/// `threads` and `stackTrace` report no paused context.
///
/// Requests are serialised through an internal lock. Events that arrive while
/// a request is in flight are buffered and returned by
/// [`DapClient::next_event`].
pub struct DapClient {
    state: Mutex<ClientState>,
    timeout_secs: u64,
}

impl DapClient {
    /// Connects to the adapter at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the socket cannot be opened.
    pub fn connect(endpoint: &AdapterEndpoint, timeout: Duration) -> Result<Self, ClientError> {
        let transport = FramedTransport::connect(endpoint, timeout)?;
        Ok(Self::with_transport(transport, timeout.as_secs()))
    }

    /// Wraps an established transport.
    #[must_use]
    pub const fn with_transport(transport: FramedTransport, timeout_secs: u64) -> Self {
        Self {
            state: Mutex::new(ClientState {
                transport,
                next_seq: 1,
                events: VecDeque::new(),
                stopped_thread: None,
                ended: false,
            }),
            timeout_secs,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn receive(&self, state: &mut ClientState) -> Result<DapMessage, ClientError> {
        let bytes = state.transport.receive().map_err(|error| {
            if error.is_timeout() {
                ClientError::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                ClientError::Transport(error)
            }
        })?;
        Ok(DapMessage::from_bytes(&bytes)?)
    }

    fn await_response(
        &self,
        state: &mut ClientState,
        request_seq: i64,
    ) -> Result<DapResponse, ClientError> {
        for _ in 0..MAX_RESPONSE_ITERATIONS {
            match self.receive(state)? {
                DapMessage::Response(response) if response.request_seq == request_seq => {
                    return Ok(response);
                }
                DapMessage::Response(response) => {
                    warn!(
                        target: CLIENT_TARGET,
                        expected = request_seq,
                        received = response.request_seq,
                        "skipping response with non-matching request_seq"
                    );
                }
                DapMessage::Event(event) => {
                    debug!(target: CLIENT_TARGET, event = %event.event, "buffering event");
                    state.buffer(event);
                }
                DapMessage::Request(request) => {
                    warn!(
                        target: CLIENT_TARGET,
                        command = %request.command,
                        seq = request.seq,
                        "ignoring reverse request from adapter"
                    );
                }
            }
        }
        warn!(
            target: CLIENT_TARGET,
            request_seq,
            max_iterations = MAX_RESPONSE_ITERATIONS,
            "giving up on response after reaching maximum iterations"
        );
        Err(ClientError::MaxResponseIterations {
            request_seq,
            iterations: MAX_RESPONSE_ITERATIONS,
        })
    }

    /// Sends a request and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::RequestFailed`] when the adapter answers
    /// `success: false`, or a transport/codec error.
    pub fn request<A>(&self, command: &str, arguments: Option<A>) -> Result<Option<Value>, ClientError>
    where
        A: Serialize,
    {
        let mut state = self.lock();
        if state.ended {
            return Err(ClientError::SessionEnded);
        }
        let seq = state.take_seq();
        let request = DapRequest {
            seq,
            command: command.to_owned(),
            arguments: arguments.map(serde_json::to_value).transpose()?,
        };
        let envelope = serde_json::to_vec(&DapMessage::Request(request))?;

        debug!(target: CLIENT_TARGET, command, seq, "sending request");
        state.transport.send(&envelope)?;
        let response = self.await_response(&mut state, seq)?;

        if !response.success {
            return Err(ClientError::RequestFailed {
                command: command.to_owned(),
                message: response.failure_message(),
            });
        }
        Ok(response.body)
    }

    fn request_body<A, R>(&self, command: &str, arguments: Option<A>) -> Result<R, ClientError>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        let body = self
            .request(command, arguments)?
            .ok_or_else(|| ClientError::MissingBody {
                command: command.to_owned(),
            })?;
        Ok(serde_json::from_value(body)?)
    }

    /// Lists debuggee threads.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub fn threads(&self) -> Result<Vec<Thread>, ClientError> {
        let body: ThreadsBody = self.request_body("threads", None::<Value>)?;
        Ok(body.threads)
    }

    /// Returns up to `levels` frames of `thread_id`, innermost first.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub fn stack_trace(&self, thread_id: i64, levels: i64) -> Result<Vec<StackFrame>, ClientError> {
        let arguments = StackTraceArguments {
            thread_id,
            start_frame: 0,
            levels,
        };
        let body: StackTraceBody = self.request_body("stackTrace", Some(arguments))?;
        Ok(body.stack_frames)
    }

    /// Evaluates an expression and returns the full response body.
    ///
    /// # Errors
    ///
    /// Propagates request failures, including evaluation errors reported by
    /// the debuggee.
    pub fn evaluate_body(
        &self,
        expression: &str,
        frame_id: Option<i64>,
        context: &str,
    ) -> Result<EvaluateBody, ClientError> {
        let arguments = EvaluateArguments {
            expression,
            frame_id,
            context,
        };
        self.request_body("evaluate", Some(arguments))
    }

    /// Returns the next adapter event, buffered ones first.
    ///
    /// Blocks until an event arrives or the read deadline passes.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] when the deadline passes and
    /// transport errors otherwise.
    pub fn next_event(&self) -> Result<DapEvent, ClientError> {
        let mut state = self.lock();
        if let Some(event) = state.events.pop_front() {
            return Ok(event);
        }
        loop {
            match self.receive(&mut state)? {
                DapMessage::Event(event) => {
                    state.observe(&event);
                    return Ok(event);
                }
                DapMessage::Response(response) => {
                    debug!(
                        target: CLIENT_TARGET,
                        request_seq = response.request_seq,
                        "dropping unsolicited response"
                    );
                }
                DapMessage::Request(request) => {
                    warn!(
                        target: CLIENT_TARGET,
                        command = %request.command,
                        "ignoring reverse request from adapter"
                    );
                }
            }
        }
    }

    /// Whether a `terminated` or `exited` event has been seen.
    #[must_use]
    pub fn session_ended(&self) -> bool {
        self.lock().ended
    }
}

impl DebugSession for DapClient {
    fn top_frame_id(&self) -> Result<Option<i64>, ClientError> {
        if self.session_ended() {
            return Ok(None);
        }
        let stopped = self.lock().stopped_thread;
        let thread = match stopped {
            Some(thread) => Some(thread),
            None => self.threads()?.first().map(|thread| thread.id),
        };
        let Some(thread) = thread else {
            return Ok(None);
        };
        let frames = self.stack_trace(thread, 1)?;
        Ok(frames.first().map(|frame| frame.id))
    }

    fn evaluate(
        &self,
        expression: &str,
        frame_id: Option<i64>,
        context: &str,
    ) -> Result<String, ClientError> {
        Ok(self.evaluate_body(expression, frame_id, context)?.result)
    }
}

impl std::fmt::Debug for DapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("DapClient")
            .field("next_seq", &state.next_seq)
            .field("buffered_events", &state.events.len())
            .field("ended", &state.ended)
            .finish_non_exhaustive()
    }
}
