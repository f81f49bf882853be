//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of RTP senders and receivers.

use std::sync::Mutex;

use crate::webrtc;
use crate::webrtc::rtp::RffiRtpEncodingParameters;

/// Simulation type for C++ RtpSender.
pub struct RffiRtpSender {
    media_type: i32,
    encodings: Mutex<Vec<RffiRtpEncodingParameters>>,
}

impl webrtc::RefCounted for RffiRtpSender {}

impl RffiRtpSender {
    /// Test hook: the parameters last applied to this sender.
    pub fn encodings(&self) -> Vec<RffiRtpEncodingParameters> {
        self.encodings.lock().unwrap().clone()
    }
}

/// Simulation type for C++ RtpReceiver.
pub struct RffiRtpReceiver {
    media_type: i32,
    track_id: u32,
}

impl webrtc::RefCounted for RffiRtpReceiver {}

pub(crate) fn new_sender(media_type: i32) -> *const RffiRtpSender {
    Box::into_raw(Box::new(RffiRtpSender {
        media_type,
        encodings: Mutex::new(vec![RffiRtpEncodingParameters {
            active: true,
            max_bitrate_bps: -1,
        }]),
    }))
}

pub(crate) fn new_receiver(media_type: i32, track_id: u32) -> *const RffiRtpReceiver {
    Box::into_raw(Box::new(RffiRtpReceiver {
        media_type,
        track_id,
    }))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getSenderMediaType(sender: webrtc::ptr::BorrowedRc<RffiRtpSender>) -> i32 {
    debug!("Rust_getSenderMediaType()");
    sender.as_ref().map(|sender| sender.media_type).unwrap_or(0)
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getSenderParameters(
    sender: webrtc::ptr::BorrowedRc<RffiRtpSender>,
    out: webrtc::ptr::Borrowed<RffiRtpEncodingParameters>,
    out_capacity: usize,
    out_size: webrtc::ptr::Borrowed<usize>,
) {
    debug!("Rust_getSenderParameters()");
    let mut written = 0;
    if let Some(sender) = sender.as_ref() {
        let encodings = sender.encodings.lock().unwrap();
        let out = out.as_ptr() as *mut RffiRtpEncodingParameters;
        for encoding in encodings.iter().take(out_capacity) {
            *out.add(written) = *encoding;
            written += 1;
        }
    }
    *(out_size.as_ptr() as *mut usize) = written;
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setSenderParameters(
    sender: webrtc::ptr::BorrowedRc<RffiRtpSender>,
    encodings: webrtc::ptr::Borrowed<RffiRtpEncodingParameters>,
    encodings_size: usize,
) -> bool {
    debug!("Rust_setSenderParameters({} encodings)", encodings_size);
    match sender.as_ref() {
        Some(sender) => {
            let new_encodings =
                std::slice::from_raw_parts(encodings.as_ptr(), encodings_size).to_vec();
            *sender.encodings.lock().unwrap() = new_encodings;
            true
        }
        None => false,
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getReceiverMediaType(
    receiver: webrtc::ptr::BorrowedRc<RffiRtpReceiver>,
) -> i32 {
    debug!("Rust_getReceiverMediaType()");
    receiver
        .as_ref()
        .map(|receiver| receiver.media_type)
        .unwrap_or(0)
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getReceiverTrackIdAsUint32(
    receiver: webrtc::ptr::BorrowedRc<RffiRtpReceiver>,
) -> u32 {
    debug!("Rust_getReceiverTrackIdAsUint32()");
    receiver
        .as_ref()
        .map(|receiver| receiver.track_id)
        .unwrap_or(0)
}
