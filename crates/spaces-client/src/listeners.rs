//! Chat listener registry.

use crate::types::ChatMessage;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Callback invoked for every chat message received in the current space.
///
/// Listeners are identified by their `Arc`: removing a listener removes the
/// first registration of that same `Arc`.
pub type ChatListener = Arc<dyn Fn(&ChatMessage) + Send + Sync>;

/// Wrap a closure as a [`ChatListener`].
pub fn chat_listener<F>(f: F) -> ChatListener
where
    F: Fn(&ChatMessage) + Send + Sync + 'static,
{
    Arc::new(f)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Ordered list of listeners; duplicates allowed.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<Vec<ChatListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: ChatListener) {
        self.listeners.lock().push(listener);
    }

    /// Remove the first registration of `listener`. Returns whether one was found.
    pub fn remove(&self, listener: &ChatListener) -> bool {
        let mut listeners = self.listeners.lock();
        let position = listeners
            .iter()
            .position(|l| std::ptr::addr_eq(Arc::as_ptr(l), Arc::as_ptr(listener)));
        match position {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Call every listener in registration order and return how many
    /// completed. The lock is only held to snapshot the list, so listeners
    /// may add or remove listeners; a panicking listener is logged and
    /// skipped.
    pub fn dispatch(&self, message: &ChatMessage) -> usize {
        let snapshot: Vec<ChatListener> = self.listeners.lock().clone();
        let mut delivered = 0;
        for (index, listener) in snapshot.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| listener(message))) {
                Ok(()) => delivered += 1,
                Err(payload) => tracing::error!(
                    "[Spaces-Session] Chat listener #{} panicked: {}",
                    index,
                    panic_message(payload.as_ref())
                ),
            }
        }
        delivered
    }
}
