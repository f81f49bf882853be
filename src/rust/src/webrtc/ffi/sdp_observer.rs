//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::ffi::c_void;
use std::os::raw::c_char;

use crate::webrtc;

/// Incomplete type for C++ SessionDescriptionInterface.
#[repr(C)]
pub struct RffiSessionDescription {
    _private: [u8; 0],
}

/// Incomplete type for C++ CreateSessionDescriptionObserverRffi.
#[repr(C)]
pub struct RffiCreateSessionDescriptionObserver {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiCreateSessionDescriptionObserver {}

/// Incomplete type for C++ SetSessionDescriptionObserverRffi.
#[repr(C)]
pub struct RffiSetSessionDescriptionObserver {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiSetSessionDescriptionObserver {}

extern "C" {
    pub fn Rust_createCreateSessionDescriptionObserver(
        csd_observer: webrtc::ptr::Borrowed<c_void>,
        callbacks: webrtc::ptr::Borrowed<c_void>,
    ) -> webrtc::ptr::OwnedRc<RffiCreateSessionDescriptionObserver>;
    pub fn Rust_createSetSessionDescriptionObserver(
        ssd_observer: webrtc::ptr::Borrowed<c_void>,
        callbacks: webrtc::ptr::Borrowed<c_void>,
    ) -> webrtc::ptr::OwnedRc<RffiSetSessionDescriptionObserver>;
    pub fn Rust_toSdp(
        session_description: webrtc::ptr::Borrowed<RffiSessionDescription>,
    ) -> *const c_char;
    pub fn Rust_offerFromSdp(
        sdp: webrtc::ptr::Borrowed<c_char>,
    ) -> webrtc::ptr::Unique<RffiSessionDescription>;
    pub fn Rust_answerFromSdp(
        sdp: webrtc::ptr::Borrowed<c_char>,
    ) -> webrtc::ptr::Unique<RffiSessionDescription>;
}
