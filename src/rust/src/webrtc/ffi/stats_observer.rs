//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::ffi::c_void;

use crate::webrtc;

/// Incomplete type for C++ StatsObserverRffi.
#[repr(C)]
pub struct RffiStatsObserver {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiStatsObserver {}

extern "C" {
    pub fn Rust_createStatsObserver(
        stats_observer: webrtc::ptr::Borrowed<c_void>,
        callbacks: webrtc::ptr::Borrowed<c_void>,
    ) -> webrtc::ptr::OwnedRc<RffiStatsObserver>;
}
