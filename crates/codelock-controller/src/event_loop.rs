//! Serialized event loop.
//!
//! The controller is moved onto a blocking task and receives events through
//! a bounded channel, so presses from any number of producers are applied
//! one at a time in arrival order. After every event the loop publishes a
//! [`ControllerSnapshot`] on a watch channel.

use codelock_hardware::{ByteStore, Delay, DigitalIo};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::{AccessController, ControlEvent, ControllerSnapshot, Outcome};
use crate::dispatcher::EventSink;
use crate::error::{ControllerError, Result};

/// Events buffered before senders wait.
pub const EVENT_QUEUE_CAPACITY: usize = 32;

#[derive(Debug)]
enum Message {
    Event {
        event: ControlEvent,
        reply: Option<oneshot::Sender<Result<Outcome>>>,
    },
    Shutdown,
}

/// Cloneable producer side of an event loop.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Message>,
}

impl EventSender {
    /// Queue an event without waiting for its outcome.
    pub async fn send(&self, event: ControlEvent) -> Result<()> {
        self.tx
            .send(Message::Event { event, reply: None })
            .await
            .map_err(|_| ControllerError::EventLoopClosed)
    }

    /// Queue an event from synchronous code.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn blocking_send(&self, event: ControlEvent) -> Result<()> {
        self.tx
            .blocking_send(Message::Event { event, reply: None })
            .map_err(|_| ControllerError::EventLoopClosed)
    }

    /// Apply an event and wait for its outcome.
    pub async fn apply(&self, event: ControlEvent) -> Result<Outcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Message::Event {
                event,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| ControllerError::EventLoopClosed)?;
        reply_rx.await.map_err(|_| ControllerError::EventLoopClosed)?
    }

    /// Whether the loop has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl EventSink for EventSender {
    fn dispatch(&mut self, event: ControlEvent) -> Result<()> {
        self.blocking_send(event)
    }

    fn is_closed(&self) -> bool {
        EventSender::is_closed(self)
    }
}

/// Runs an [`AccessController`] on a dedicated blocking task.
pub struct EventLoop;

impl EventLoop {
    /// Move `controller` onto a blocking task and start applying events.
    ///
    /// The controller should already be booted.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn<S, P, D>(controller: AccessController<S, P, D>) -> EventLoopHandle<S, P, D>
    where
        S: ByteStore + Send + 'static,
        P: DigitalIo + Send + 'static,
        D: Delay + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let task = tokio::task::spawn_blocking(move || run(controller, rx, snapshot_tx));

        EventLoopHandle {
            sender: EventSender { tx },
            snapshot: snapshot_rx,
            task,
        }
    }
}

fn run<S, P, D>(
    mut controller: AccessController<S, P, D>,
    mut rx: mpsc::Receiver<Message>,
    snapshot_tx: watch::Sender<ControllerSnapshot>,
) -> AccessController<S, P, D>
where
    S: ByteStore,
    P: DigitalIo,
    D: Delay,
{
    info!("Event loop started in {}", controller.state());

    while let Some(message) = rx.blocking_recv() {
        let (event, reply) = match message {
            Message::Event { event, reply } => (event, reply),
            Message::Shutdown => break,
        };

        let result = controller.apply(event);
        match &result {
            Ok(outcome) => debug!("{:?} -> {:?}", event, outcome),
            Err(e) => warn!("{:?} failed: {}", event, e),
        }
        snapshot_tx.send_replace(controller.snapshot());

        if let Some(reply) = reply {
            // The requester may have stopped waiting.
            let _ = reply.send(result);
        }
    }

    info!("Event loop stopped in {}", controller.state());
    controller
}

/// Owner handle of a running event loop.
pub struct EventLoopHandle<S, P, D> {
    sender: EventSender,
    snapshot: watch::Receiver<ControllerSnapshot>,
    task: JoinHandle<AccessController<S, P, D>>,
}

impl<S, P, D> EventLoopHandle<S, P, D> {
    /// A new producer for this loop.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Queue an event without waiting for its outcome.
    pub async fn send(&self, event: ControlEvent) -> Result<()> {
        self.sender.send(event).await
    }

    /// Apply an event and wait for its outcome.
    pub async fn apply(&self, event: ControlEvent) -> Result<Outcome> {
        self.sender.apply(event).await
    }

    /// Controller state after the most recent event.
    pub fn snapshot(&self) -> ControllerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch snapshots as events are applied.
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.snapshot.clone()
    }

    /// Stop the loop after the events already queued and return the
    /// controller.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::TaskFailed`] if the loop task panicked.
    pub async fn shutdown(self) -> Result<AccessController<S, P, D>> {
        if self.sender.tx.send(Message::Shutdown).await.is_err() {
            debug!("Event loop already stopped");
        }
        self.task
            .await
            .map_err(|e| ControllerError::TaskFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use codelock_core::ProgramState;
    use codelock_hardware::mock::{MockByteStore, MockClock, MockGpio};

    fn booted() -> AccessController<MockByteStore, MockGpio, MockClock> {
        let mut controller = AccessController::new(
            MockByteStore::new(64),
            MockGpio::new(),
            MockClock::new(),
            &ControllerConfig::default(),
        )
        .unwrap();
        controller.boot().unwrap();
        controller
    }

    #[tokio::test]
    async fn test_apply_returns_outcome() {
        let handle = EventLoop::spawn(booted());

        let outcome = handle.apply(ControlEvent::Confirm).await.unwrap();
        assert_eq!(outcome, Outcome::CursorMoved { position: 1 });
        assert_eq!(handle.snapshot().cursor, 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_events_are_applied_in_order() {
        let handle = EventLoop::spawn(booted());

        for _ in 0..3 {
            handle.send(ControlEvent::Confirm).await.unwrap();
        }
        let outcome = handle.apply(ControlEvent::Confirm).await.unwrap();
        assert_eq!(outcome, Outcome::AccessGranted);

        let controller = handle.shutdown().await.unwrap();
        assert_eq!(controller.state(), ProgramState::LoggedIn);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let handle = EventLoop::spawn(booted());
        let mut updates = handle.subscribe();
        assert_eq!(updates.borrow().state, ProgramState::EnterPassword);

        handle.send(ControlEvent::Increment).await.unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().entry[0].value(), 1);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_senders_close_after_shutdown() {
        let handle = EventLoop::spawn(booted());
        let sender = handle.sender();
        assert!(!sender.is_closed());

        handle.shutdown().await.unwrap();
        assert!(sender.is_closed());
        assert!(matches!(
            sender.apply(ControlEvent::Confirm).await,
            Err(ControllerError::EventLoopClosed)
        ));
    }

    #[tokio::test]
    async fn test_controller_errors_reach_the_caller() {
        let controller = booted();
        let store = controller.store().clone();
        let handle = EventLoop::spawn(controller);
        store.set_fail_reads(true);

        for _ in 0..3 {
            handle.send(ControlEvent::Confirm).await.unwrap();
        }
        let result = handle.apply(ControlEvent::Confirm).await;
        assert!(matches!(result, Err(ControllerError::Storage(_))));
        assert_eq!(handle.snapshot().state, ProgramState::EnterPassword);

        handle.shutdown().await.unwrap();
    }
}
