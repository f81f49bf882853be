//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Reference counting for locally allocated shared resources.
//!
//! Natively ref-counted engine objects are handled by [`crate::webrtc::Arc`];
//! this module covers the Rust-side resources (frame buffers foremost) that
//! are shared across an unpredictable number of owners on media, encoder,
//! and application threads.

use std::sync::atomic::{AtomicI32, Ordering};

use crate::common::Result;
use crate::error::NativeRtcError;

pub type ReleaseCallback = Box<dyn Fn() + Send + Sync>;

/// Atomic reference counter with a release callback.
///
/// The count starts at 1. `retain` and `release` move it up and down; at the
/// 1 -> 0 transition the release callback runs exactly once. Driving the
/// count below zero, or retaining an object that has already hit zero, is a
/// lifecycle error.
pub struct RefCountDelegate {
    ref_count: AtomicI32,
    release_callback: Option<ReleaseCallback>,
}

impl std::fmt::Debug for RefCountDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefCountDelegate")
            .field("ref_count", &self.ref_count.load(Ordering::SeqCst))
            .finish()
    }
}

impl RefCountDelegate {
    pub fn new(release_callback: Option<ReleaseCallback>) -> Self {
        Self {
            ref_count: AtomicI32::new(1),
            release_callback,
        }
    }

    /// Current count. Intended for diagnostics and tests; the value may be
    /// stale by the time the caller looks at it.
    pub fn count(&self) -> i32 {
        self.ref_count.load(Ordering::SeqCst)
    }

    pub fn retain(&self) -> Result<()> {
        let updated_count = self.ref_count.fetch_add(1, Ordering::SeqCst) + 1;
        if updated_count < 2 {
            return Err(NativeRtcError::RetainAfterRelease.into());
        }
        Ok(())
    }

    pub fn release(&self) -> Result<()> {
        let updated_count = self.ref_count.fetch_sub(1, Ordering::SeqCst) - 1;
        if updated_count < 0 {
            return Err(NativeRtcError::ReleaseAfterRelease.into());
        }
        if updated_count == 0 {
            // Only the thread that took the count to exactly zero gets here.
            if let Some(callback) = &self.release_callback {
                callback();
            }
        }
        Ok(())
    }

    /// Tries to retain the object, failing if its count has already reached
    /// zero. Used when retention races with disposal on another thread.
    pub fn safe_retain(&self) -> bool {
        let mut current_ref_count = self.ref_count.load(Ordering::SeqCst);
        while current_ref_count != 0 {
            match self.ref_count.compare_exchange_weak(
                current_ref_count,
                current_ref_count + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(actual) => current_ref_count = actual,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counted_delegate() -> (Arc<AtomicU32>, RefCountDelegate) {
        let release_count = Arc::new(AtomicU32::new(0));
        let release_count_in_callback = release_count.clone();
        let delegate = RefCountDelegate::new(Some(Box::new(move || {
            release_count_in_callback.fetch_add(1, Ordering::SeqCst);
        })));
        (release_count, delegate)
    }

    #[test]
    fn balanced_retains_leave_count_at_one() {
        let (released, delegate) = counted_delegate();
        for _ in 0..10 {
            delegate.retain().unwrap();
        }
        for _ in 0..10 {
            delegate.release().unwrap();
        }
        assert_eq!(1, delegate.count());
        assert_eq!(0, released.load(Ordering::SeqCst));
    }

    #[test]
    fn release_callback_fires_exactly_once_at_zero() {
        let (released, delegate) = counted_delegate();
        delegate.retain().unwrap();
        delegate.release().unwrap();
        assert_eq!(0, released.load(Ordering::SeqCst));
        delegate.release().unwrap();
        assert_eq!(1, released.load(Ordering::SeqCst));
    }

    #[test]
    fn release_below_zero_is_an_error() {
        let (released, delegate) = counted_delegate();
        delegate.release().unwrap();
        assert!(delegate.release().is_err());
        assert_eq!(1, released.load(Ordering::SeqCst));
    }

    #[test]
    fn retain_after_full_release_is_an_error() {
        let (_released, delegate) = counted_delegate();
        delegate.release().unwrap();
        assert!(delegate.retain().is_err());
    }

    #[test]
    fn safe_retain_fails_once_fully_released() {
        let (_released, delegate) = counted_delegate();
        assert!(delegate.safe_retain());
        delegate.release().unwrap();
        delegate.release().unwrap();
        assert!(!delegate.safe_retain());
    }

    #[test]
    fn safe_retain_from_many_threads() {
        let delegate = Arc::new(RefCountDelegate::new(None));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let delegate = delegate.clone();
            handles.push(std::thread::spawn(move || {
                let mut retained = 0;
                for _ in 0..1000 {
                    if delegate.safe_retain() {
                        retained += 1;
                    }
                }
                for _ in 0..retained {
                    delegate.release().unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(1, delegate.count());
    }
}
