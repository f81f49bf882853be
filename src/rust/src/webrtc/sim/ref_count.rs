//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of the wrapper around rtc::RefCountInterface

use crate::webrtc;

pub fn dec<T: webrtc::ptr::RefCounted>(_rc: webrtc::ptr::OwnedRc<T>) {
    debug!("ref_count::dec()");
}

/// # Safety
/// The pointee must still be alive
pub unsafe fn inc<T: webrtc::ptr::RefCounted>(
    rc: webrtc::ptr::BorrowedRc<T>,
) -> webrtc::ptr::OwnedRc<T> {
    debug!("ref_count::inc()");
    webrtc::ptr::OwnedRc::from_ptr(rc.as_ptr())
}
