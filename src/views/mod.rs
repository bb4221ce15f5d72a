//! View models behind the command-line screens.
//!
//! Views hold the transient copies of server data they display and turn
//! failures into user-facing text. Fetches started for a view report into a
//! [`ViewSlot`]; once the view is gone a late result is dropped instead of
//! landing in a dead screen.

pub mod activity;
pub mod admin;
pub mod donations;

pub use activity::{ActivityDetail, ActivityList};
pub use admin::{DashboardStats, UserDirectory};
pub use donations::DonationHistory;

use parking_lot::Mutex;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    /// Settle a fetch, mapping the error to `fallback` unless it carries a
    /// better message
    pub fn from_result(result: Result<T>, fallback: &str) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => {
                debug!(error = %e, "View load failed");
                Loadable::Failed(e.user_message_or(fallback))
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn into_result(self) -> std::result::Result<T, String> {
        match self {
            Loadable::Ready(value) => Ok(value),
            Loadable::Failed(message) => Err(message),
            Loadable::Loading => Err("Still loading".to_string()),
        }
    }
}

/// State of one mounted view. Dropping the slot unmounts the view.
pub struct ViewSlot<T> {
    inner: Arc<Mutex<Loadable<T>>>,
}

impl<T> Default for ViewSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ViewSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Loadable::Loading)),
        }
    }

    /// Weak handle for a pending fetch
    pub fn handle(&self) -> SlotHandle<T> {
        SlotHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Loadable<T>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().is_loading()
    }

    /// Move the current state out, leaving the slot `Loading`
    pub fn take(&self) -> Loadable<T> {
        std::mem::replace(&mut *self.inner.lock(), Loadable::Loading)
    }
}

impl<T: Clone> ViewSlot<T> {
    pub fn get(&self) -> Loadable<T> {
        self.inner.lock().clone()
    }
}

pub struct SlotHandle<T> {
    inner: Weak<Mutex<Loadable<T>>>,
}

impl<T> SlotHandle<T> {
    /// Deliver a result; `false` if the view has been unmounted
    pub fn set(&self, value: Loadable<T>) -> bool {
        match self.inner.upgrade() {
            Some(slot) => {
                *slot.lock() = value;
                true
            }
            None => {
                debug!("Dropping result for unmounted view");
                false
            }
        }
    }
}

/// Run `load` in the background and deliver its result to `slot`
pub fn spawn_load<T, F>(slot: &ViewSlot<T>, fallback: &'static str, load: F) -> JoinHandle<bool>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let handle = slot.handle();
    tokio::spawn(async move {
        let result = load.await;
        handle.set(Loadable::from_result(result, fallback))
    })
}
