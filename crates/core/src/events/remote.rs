//! Cross-thread emission
//!
//! The bus itself lives on the game thread. Worker threads (e.g. the client
//! talking to the problem-judging service) report back through a
//! [`RemoteEmitter`], which queues the emission on a channel. The queue is
//! drained at the start of every [`EventBus::update`](super::EventBus::update),
//! so every subscriber still runs on the game thread.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use ecode_sdk::EcodeEvent;
use serde_json::Value;

use super::Payload;

/// Capacity of the remote emission queue
pub const REMOTE_QUEUE_CAPACITY: usize = 1024;

/// An emission queued from another thread
///
/// The payload travels as a JSON value so the message is `Send`.
#[derive(Debug)]
pub(crate) struct RemoteMessage {
    pub event: EcodeEvent,
    pub delay: Duration,
    pub payload: Value,
}

/// Errors from queuing a remote emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Queue is full; the emission was dropped
    #[error("Remote event queue is full")]
    Full,

    /// The bus has been dropped
    #[error("Event bus is gone")]
    Disconnected,
}

/// Thread-safe handle for emitting onto a bus from other threads
#[derive(Debug, Clone)]
pub struct RemoteEmitter {
    sender: Sender<RemoteMessage>,
}

impl RemoteEmitter {
    /// Queue an immediate emission for the next bus update
    #[tracing::instrument(skip(self, payload))]
    pub fn emit(&self, event: EcodeEvent, payload: Payload) -> Result<(), RemoteError> {
        self.emit_delayed(event, Duration::ZERO, payload)
    }

    /// Queue a delayed emission; the delay counts from when the bus picks it up
    #[tracing::instrument(skip(self, payload))]
    pub fn emit_delayed(
        &self,
        event: EcodeEvent,
        delay: Duration,
        payload: Payload,
    ) -> Result<(), RemoteError> {
        let message = RemoteMessage {
            event,
            delay,
            payload: payload.into_value(),
        };
        match self.sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Remote event queue full, dropping '{}'", event);
                Err(RemoteError::Full)
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Remote event queue disconnected, dropping '{}'", event);
                Err(RemoteError::Disconnected)
            }
        }
    }
}

/// Receiving side, owned by the bus
#[derive(Debug)]
pub(crate) struct RemoteQueue {
    sender: Sender<RemoteMessage>,
    receiver: Receiver<RemoteMessage>,
}

impl RemoteQueue {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(REMOTE_QUEUE_CAPACITY);
        Self { sender, receiver }
    }

    pub fn emitter(&self) -> RemoteEmitter {
        RemoteEmitter {
            sender: self.sender.clone(),
        }
    }

    /// Take everything queued so far, up to one queue's worth
    pub fn drain(&self) -> Vec<(EcodeEvent, Duration, Payload)> {
        let mut drained = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            match Payload::from_value(message.payload) {
                Some(payload) => drained.push((message.event, message.delay, payload)),
                None => tracing::error!(
                    "Remote emission of '{}' carried a non-object payload",
                    message.event
                ),
            }
            if drained.len() >= REMOTE_QUEUE_CAPACITY {
                break;
            }
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_is_send() {
        fn assert_send<T: Send + Sync>() {}
        assert_send::<RemoteEmitter>();
    }

    #[test]
    fn test_drain_preserves_order() {
        let queue = RemoteQueue::new();
        let emitter = queue.emitter();

        emitter
            .emit(EcodeEvent::ProblemSolved, Payload::new().with("problem_slug", "a"))
            .unwrap();
        emitter
            .emit_delayed(EcodeEvent::CheckedProblems, Duration::from_millis(5), Payload::new())
            .unwrap();

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].0, EcodeEvent::ProblemSolved);
        assert_eq!(drained[0].2.get_string("problem_slug", ""), "a");
        assert_eq!(drained[1].1, Duration::from_millis(5));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_emit_from_worker_thread() {
        let queue = RemoteQueue::new();
        let emitter = queue.emitter();

        std::thread::spawn(move || {
            emitter
                .emit(EcodeEvent::CheckedProblems, Payload::new())
                .unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(queue.drain().len(), 1);
    }

    #[test]
    fn test_full_queue_drops() {
        let queue = RemoteQueue::new();
        let emitter = queue.emitter();

        for _ in 0..REMOTE_QUEUE_CAPACITY {
            emitter.emit(EcodeEvent::PlayerMoved, Payload::new()).unwrap();
        }
        assert_eq!(
            emitter.emit(EcodeEvent::PlayerMoved, Payload::new()),
            Err(RemoteError::Full)
        );
    }
}
