use std::sync::atomic::{AtomicBool, Ordering};

static RUNNING: AtomicBool = AtomicBool::new(false);

/// Process-wide guard: at most one scheduler runs at a time.
///
/// Released on drop.
#[derive(Debug)]
pub struct ActiveInstance {
    _private: (),
}

impl ActiveInstance {
    /// Returns `None` when another scheduler already holds the guard.
    pub fn acquire() -> Option<Self> {
        RUNNING
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { _private: () })
    }

    pub fn is_held() -> bool {
        RUNNING.load(Ordering::Acquire)
    }
}

impl Drop for ActiveInstance {
    fn drop(&mut self) {
        RUNNING.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The guard is process-global; this is the only test that takes it.
    #[test]
    fn second_acquire_fails_until_release() {
        let first = ActiveInstance::acquire().expect("guard free at start");
        assert!(ActiveInstance::is_held());
        assert!(ActiveInstance::acquire().is_none());

        drop(first);
        assert!(!ActiveInstance::is_held());

        let again = ActiveInstance::acquire();
        assert!(again.is_some());
    }
}
