//! View lifecycle guard.
//!
//! A view hands a [`MountGuard`] to each async load it starts. When the view is
//! torn down it calls [`ViewLifecycle::unmount`]; loads that finish afterwards
//! see `is_mounted() == false` and drop their result instead of applying it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Owner side, held by the view.
#[derive(Debug)]
pub struct ViewLifecycle {
    mounted: Arc<AtomicBool>,
}

impl ViewLifecycle {
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A guard observing this view.
    pub fn guard(&self) -> MountGuard {
        MountGuard {
            mounted: Arc::clone(&self.mounted),
        }
    }

    /// Mark the view as torn down. Irreversible.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }
}

impl Default for ViewLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewLifecycle {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Observer side, carried by in-flight work.
#[derive(Debug, Clone)]
pub struct MountGuard {
    mounted: Arc<AtomicBool>,
}

impl MountGuard {
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }
}
