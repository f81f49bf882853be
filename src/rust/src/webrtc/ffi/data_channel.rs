//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::ffi::c_void;
use std::os::raw::c_char;

use crate::webrtc;

/// Incomplete type for C++ DataChannel.
#[repr(C)]
pub struct RffiDataChannel {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiDataChannel {}

/// Incomplete type for C++ DataChannelObserver.
#[repr(C)]
pub struct RffiDataChannelObserver {
    _private: [u8; 0],
}

extern "C" {
    pub fn Rust_dataChannelGetLabel(
        data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
    ) -> *const c_char;
    pub fn Rust_dataChannelGetId(
        data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
    ) -> i32;
    pub fn Rust_dataChannelGetState(
        data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
    ) -> i32;
    pub fn Rust_dataChannelGetBufferedAmount(
        data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
    ) -> u64;
    pub fn Rust_dataChannelSend(
        data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
        data: webrtc::ptr::Borrowed<u8>,
        data_size: usize,
        binary: bool,
    ) -> bool;
    pub fn Rust_registerDataChannelObserver(
        data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
        observer: webrtc::ptr::Borrowed<c_void>,
        callbacks: webrtc::ptr::Borrowed<c_void>,
    ) -> webrtc::ptr::Unique<RffiDataChannelObserver>;
    pub fn Rust_unregisterDataChannelObserver(
        data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
        observer: webrtc::ptr::Unique<RffiDataChannelObserver>,
    );
}
