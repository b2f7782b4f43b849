use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use crate::error::Result;
use crate::event::CrossingEvent;

/// Written in place of an image path when no snapshot could be stored.
pub const IMAGE_UNAVAILABLE: &str = "unavailable";

/// Receives committed crossings. Implementations deal with their own
/// failures: nothing here may stop the stream.
pub trait EventSink: Send {
    fn emit(&mut self, event: CrossingEvent);

    fn flush(&mut self) {}
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    #[inline]
    fn emit(&mut self, event: CrossingEvent) {
        (**self).emit(event)
    }

    #[inline]
    fn flush(&mut self) {
        (**self).flush()
    }
}

/// Keeps events in memory, clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<CrossingEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CrossingEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, event: CrossingEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

enum Message {
    Event(CrossingEvent),
    Flush(Sender<()>),
}

/// Runs another sink on a worker thread so persistence never blocks the
/// counting loop. When the queue is full the event is still counted, only
/// its persistence is dropped.
pub struct AsyncSink {
    tx: Option<Sender<Message>>,
    worker: Option<JoinHandle<()>>,
    dropped: Arc<AtomicU64>,
}

impl AsyncSink {
    pub fn spawn<S: EventSink + 'static>(mut inner: S, capacity: usize) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded::<Message>(capacity.max(1));

        let worker = std::thread::Builder::new()
            .name("qcount-sink".into())
            .spawn(move || {
                for msg in rx {
                    match msg {
                        Message::Event(event) => inner.emit(event),
                        Message::Flush(ack) => {
                            inner.flush();
                            let _ = ack.send(());
                        }
                    }
                }

                inner.flush();
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            dropped: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Events whose persistence was skipped because the queue was full or
    /// the worker was gone.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Drains the queue and joins the worker.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        drop(self.tx.take());

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("sink worker panicked, pending events lost");
            }
        }
    }
}

impl EventSink for AsyncSink {
    fn emit(&mut self, event: CrossingEvent) {
        let Some(tx) = self.tx.as_ref() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        match tx.try_send(Message::Event(event)) {
            Ok(()) => (),
            Err(TrySendError::Full(Message::Event(ev))) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "sink queue full, persistence dropped for track {} ({})",
                    ev.track_id,
                    ev.direction
                );
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("sink worker gone, persistence dropped");
            }
        }
    }

    fn flush(&mut self) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };

        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if tx.send(Message::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        self.close();
    }
}
