//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::ffi::c_void;

use crate::webrtc;

/// Incomplete type for C++ PeerConnectionObserver.
#[repr(C)]
pub struct RffiPeerConnectionObserver {
    _private: [u8; 0],
}

extern "C" {
    pub fn Rust_createPeerConnectionObserver(
        observer: webrtc::ptr::Borrowed<c_void>,
        callbacks: webrtc::ptr::Borrowed<c_void>,
    ) -> webrtc::ptr::Unique<RffiPeerConnectionObserver>;
    pub fn Rust_deletePeerConnectionObserver(
        observer: webrtc::ptr::Unique<RffiPeerConnectionObserver>,
    );
}
