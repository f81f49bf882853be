//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use crate::webrtc;
use crate::webrtc::rtp::RffiRtpEncodingParameters;

/// Incomplete type for C++ RtpSender.
#[repr(C)]
pub struct RffiRtpSender {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiRtpSender {}

/// Incomplete type for C++ RtpReceiver.
#[repr(C)]
pub struct RffiRtpReceiver {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiRtpReceiver {}

extern "C" {
    pub fn Rust_getSenderMediaType(sender: webrtc::ptr::BorrowedRc<RffiRtpSender>) -> i32;
    pub fn Rust_getSenderParameters(
        sender: webrtc::ptr::BorrowedRc<RffiRtpSender>,
        out: webrtc::ptr::Borrowed<RffiRtpEncodingParameters>,
        out_capacity: usize,
        out_size: webrtc::ptr::Borrowed<usize>,
    );
    pub fn Rust_setSenderParameters(
        sender: webrtc::ptr::BorrowedRc<RffiRtpSender>,
        encodings: webrtc::ptr::Borrowed<RffiRtpEncodingParameters>,
        encodings_size: usize,
    ) -> bool;
    pub fn Rust_getReceiverMediaType(receiver: webrtc::ptr::BorrowedRc<RffiRtpReceiver>) -> i32;
    pub fn Rust_getReceiverTrackIdAsUint32(
        receiver: webrtc::ptr::BorrowedRc<RffiRtpReceiver>,
    ) -> u32;
}
