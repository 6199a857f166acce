//! Single-flight token of a task.
//!
//! A [`RunGuard`] is a one-slot flag. [`RunGuard::try_acquire`] flips it with a compare-and-swap
//! and hands out a [`RunPermit`]; dropping the permit clears the flag on every exit path,
//! including unwinding.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` while another permit is alive. Never blocks, never queues.
    pub fn try_acquire(&self) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Proof of a held [`RunGuard`]; releases it on drop.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the permit is dropped"]
pub struct RunPermit {
    running: Arc<AtomicBool>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected() {
        let guard = RunGuard::new();
        let permit = guard.try_acquire().expect("idle guard");
        assert!(guard.is_running());
        assert!(guard.try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_running());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn clones_share_the_slot() {
        let guard = RunGuard::new();
        let other = guard.clone();
        let _permit = guard.try_acquire().unwrap();
        assert!(other.try_acquire().is_none());
    }

    #[test]
    fn released_on_panic() {
        let guard = RunGuard::new();
        let inner = guard.clone();
        let res = std::panic::catch_unwind(move || {
            let _permit = inner.try_acquire().unwrap();
            panic!("strategy blew up");
        });
        assert!(res.is_err());
        assert!(!guard.is_running());
    }
}
