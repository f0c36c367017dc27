//! Cooperative cancellation of a running search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pathology_core::{PathologyError, Result};

/// Shared flag polled by the players once per UCT iteration and once per
/// alpha-beta node.
///
/// Clones share the same flag, so a supervisor can keep one clone and stop a
/// search running on another thread.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every search holding this flag to stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once the flag is raised.
    pub fn check(&self) -> Result<()> {
        if self.is_stopped() {
            Err(PathologyError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let flag = StopFlag::new();
        let worker = flag.clone();
        assert!(worker.check().is_ok());

        flag.stop();
        assert!(worker.is_stopped());
        assert!(matches!(worker.check(), Err(PathologyError::Cancelled)));
    }
}
