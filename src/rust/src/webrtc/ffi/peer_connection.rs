//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::os::raw::c_char;

use crate::webrtc;
use crate::webrtc::data_channel::RffiDataChannel;
use crate::webrtc::ice_candidate::RffiIceCandidate;
use crate::webrtc::rtp::{RffiRtpReceiver, RffiRtpSender};
use crate::webrtc::sdp_observer::{
    RffiCreateSessionDescriptionObserver, RffiSessionDescription, RffiSetSessionDescriptionObserver,
};
use crate::webrtc::stats_observer::RffiStatsObserver;

/// Incomplete type for C++ PeerConnection.
#[repr(C)]
pub struct RffiPeerConnection {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiPeerConnection {}

extern "C" {
    pub fn Rust_createOffer(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        csd_observer: webrtc::ptr::BorrowedRc<RffiCreateSessionDescriptionObserver>,
    );
    pub fn Rust_createAnswer(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        csd_observer: webrtc::ptr::BorrowedRc<RffiCreateSessionDescriptionObserver>,
    );
    pub fn Rust_setLocalDescription(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        ssd_observer: webrtc::ptr::BorrowedRc<RffiSetSessionDescriptionObserver>,
        session_description: webrtc::ptr::Unique<RffiSessionDescription>,
    );
    pub fn Rust_setRemoteDescription(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        ssd_observer: webrtc::ptr::BorrowedRc<RffiSetSessionDescriptionObserver>,
        session_description: webrtc::ptr::Unique<RffiSessionDescription>,
    );
    pub fn Rust_setOutgoingMediaEnabled(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        enabled: bool,
    );
    pub fn Rust_setIncomingMediaEnabled(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        enabled: bool,
    );
    pub fn Rust_createDataChannel(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        label: webrtc::ptr::Borrowed<c_char>,
    ) -> webrtc::ptr::OwnedRc<RffiDataChannel>;
    pub fn Rust_addIceCandidate(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        candidate: webrtc::ptr::Borrowed<RffiIceCandidate>,
    ) -> bool;
    pub fn Rust_removeIceCandidates(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        candidates: webrtc::ptr::Borrowed<RffiIceCandidate>,
        candidates_size: usize,
    );
    pub fn Rust_getStats(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        stats_observer: webrtc::ptr::BorrowedRc<RffiStatsObserver>,
    );
    pub fn Rust_setSendBitrates(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        min_bitrate_bps: i32,
        start_bitrate_bps: i32,
        max_bitrate_bps: i32,
    );
    pub fn Rust_getSenders(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        out: webrtc::ptr::Borrowed<webrtc::ptr::OwnedRc<RffiRtpSender>>,
        out_capacity: usize,
        out_size: webrtc::ptr::Borrowed<usize>,
    );
    pub fn Rust_getReceivers(
        peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
        out: webrtc::ptr::Borrowed<webrtc::ptr::OwnedRc<RffiRtpReceiver>>,
        out_capacity: usize,
        out_size: webrtc::ptr::Borrowed<usize>,
    );
    pub fn Rust_closePeerConnection(peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>);
}
