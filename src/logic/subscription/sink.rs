//! Output Sinks
//!
//! Where stream-subscribed messages go. A sink is called while the
//! subscription lock is held, so it must not call back into the
//! SubscriptionManager.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::logic::message::Message;

pub trait MessageSink: Send + Sync {
    fn on_message(&self, message: &Message);

    /// Non-terminal error (e.g. one unparseable message) or a start failure
    fn on_error(&self, code: &str, detail: &str);
}

// ============================================================================
// CHANNEL SINK
// ============================================================================

/// Event as seen by a stream consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Message(Message),
    Error { code: String, message: String },
}

/// Sink that forwards into an unbounded tokio channel. Once the sink is
/// dropped (unsubscribe) the paired `EventStream` ends.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, EventStream { rx })
    }

    fn send(&self, event: StreamEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Stream consumer gone, event dropped");
        }
    }
}

impl MessageSink for ChannelSink {
    fn on_message(&self, message: &Message) {
        self.send(StreamEvent::Message(message.clone()));
    }

    fn on_error(&self, code: &str, detail: &str) {
        self.send(StreamEvent::Error {
            code: code.to_string(),
            message: detail.to_string(),
        });
    }
}

pub struct EventStream {
    rx: mpsc::UnboundedReceiver<StreamEvent>,
}

impl EventStream {
    /// Next event; `None` once the sink is gone and the buffer is drained
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }

    /// Non-blocking poll
    pub fn try_next(&mut self) -> Option<StreamEvent> {
        self.rx.try_recv().ok()
    }

    /// Everything buffered right now
    pub fn drain(&mut self) -> Vec<StreamEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

// ============================================================================
// CLOSURE SINK
// ============================================================================

/// Sink built from an `on_message` and an `on_error` closure
pub struct FnSink<M, E> {
    on_message: M,
    on_error: E,
}

impl<M, E> FnSink<M, E>
where
    M: Fn(&Message) + Send + Sync,
    E: Fn(&str, &str) + Send + Sync,
{
    pub fn new(on_message: M, on_error: E) -> Self {
        Self { on_message, on_error }
    }
}

impl<M, E> MessageSink for FnSink<M, E>
where
    M: Fn(&Message) + Send + Sync,
    E: Fn(&str, &str) + Send + Sync,
{
    fn on_message(&self, message: &Message) {
        (self.on_message)(message)
    }

    fn on_error(&self, code: &str, detail: &str) {
        (self.on_error)(code, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_channel_sink_ends_when_dropped() {
        let (sink, mut stream) = ChannelSink::new();
        sink.on_message(&Message::new("1", "a", "b", 1));
        sink.on_error("SMS_PARSE_ERROR", "bad pdu");
        drop(sink);

        assert!(matches!(stream.next().await, Some(StreamEvent::Message(_))));
        assert_eq!(
            stream.next().await,
            Some(StreamEvent::Error {
                code: "SMS_PARSE_ERROR".into(),
                message: "bad pdu".into()
            })
        );
        assert_eq!(stream.next().await, None);
    }

    #[test]
    fn test_fn_sink() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (on_msg, on_err) = (log.clone(), log.clone());
        let sink = FnSink::new(
            move |m: &Message| on_msg.lock().push(m.body.clone()),
            move |code: &str, _detail: &str| on_err.lock().push(code.to_string()),
        );

        sink.on_message(&Message::new("1", "a", "hello", 1));
        sink.on_error("X", "y");
        assert_eq!(*log.lock(), vec!["hello".to_string(), "X".to_string()]);
    }
}
