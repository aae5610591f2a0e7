// crates/ragdoll_core/src/input/source.rs
use std::sync::{Arc, Mutex, Weak};

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use ragdoll_shared::RawKeyEvent;

pub type ListenerId = u64;

#[derive(Default)]
struct HubInner {
    next_id: ListenerId,
    listeners: Vec<(ListenerId, Sender<RawKeyEvent>)>,
}

/// Fan-out point for platform keyboard events. The platform layer emits,
/// registries subscribe.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Arc<Mutex<HubInner>>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = unbounded();
        let mut id = 0;
        if let Ok(mut inner) = self.inner.lock() {
            id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, sender));
        }
        tracing::trace!(listener = id, "keyboard listener attached");

        Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
            receiver,
            active: true,
        }
    }

    /// Delivers the event to every live listener; returns how many got it.
    pub fn emit(&self, event: RawKeyEvent) -> usize {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        inner
            .listeners
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
        inner.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.listeners.len())
            .unwrap_or(0)
    }
}

/// A live listener on a [`KeyboardHub`]. Detaches on `unsubscribe` or drop.
pub struct Subscription {
    id: ListenerId,
    hub: Weak<Mutex<HubInner>>,
    receiver: Receiver<RawKeyEvent>,
    active: bool,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Next queued event, if any. Never blocks.
    pub fn try_next(&self) -> Option<RawKeyEvent> {
        if !self.active {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Idempotent. Pending events are discarded.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(hub) = self.hub.upgrade() {
            if let Ok(mut inner) = hub.lock() {
                inner.listeners.retain(|(id, _)| *id != self.id);
            }
        }
        while self.receiver.try_recv().is_ok() {}
        tracing::trace!(listener = self.id, "keyboard listener detached");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_reaches_each_listener_once() {
        let hub = KeyboardHub::new();
        let a = hub.subscribe();
        let b = hub.subscribe();

        assert_eq!(hub.emit(RawKeyEvent::down("w", "KeyW")), 2);
        assert_eq!(a.try_next().map(|e| e.code), Some("KeyW".to_string()));
        assert!(a.try_next().is_none());
        assert!(b.try_next().is_some());
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let hub = KeyboardHub::new();
        let mut sub = hub.subscribe();
        hub.emit(RawKeyEvent::down("w", "KeyW"));

        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(hub.listener_count(), 0);
        assert!(sub.try_next().is_none());
        assert_eq!(hub.emit(RawKeyEvent::up("w", "KeyW")), 0);
    }

    #[test]
    fn dropping_detaches() {
        let hub = KeyboardHub::new();
        {
            let _sub = hub.subscribe();
            assert_eq!(hub.listener_count(), 1);
        }
        assert_eq!(hub.listener_count(), 0);
    }
}
