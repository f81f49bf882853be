//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of the WebRTC PeerConnection.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Mutex;

use crate::webrtc;
use crate::webrtc::ice_candidate::RffiIceCandidate;
use crate::webrtc::sdp_observer::{
    RffiCreateSessionDescriptionObserver, RffiSessionDescription, RffiSetSessionDescriptionObserver,
};
use crate::webrtc::sim::data_channel::{new_data_channel, RffiDataChannel};
use crate::webrtc::sim::media::FAKE_MEDIA_STREAM;
use crate::webrtc::sim::peer_connection_observer::RffiPeerConnectionObserver;
use crate::webrtc::sim::rtp::{new_receiver, new_sender, RffiRtpReceiver, RffiRtpSender};
use crate::webrtc::sim::stats_observer::RffiStatsObserver;
use crate::webrtc::peer_connection_observer::IceConnectionState;

#[derive(Default)]
struct RffiPeerConnectionState {
    local_description_set: bool,
    remote_description_set: bool,
    outgoing_media_enabled: Option<bool>,
    incoming_media_enabled: Option<bool>,
    ice_candidates: Vec<String>,
    removed_ice_candidates: usize,
    send_rates: Option<(i32, i32, i32)>,
    data_channel_labels: Vec<String>,
    closed: bool,
}

/// Simulation type for PeerConnectionInterface.
pub struct RffiPeerConnection {
    state: Mutex<RffiPeerConnectionState>,
    observer: *const RffiPeerConnectionObserver,
}

// The observer pointer is owned by the Rust PeerConnection for the whole
// lifetime of this fake.
unsafe impl Send for RffiPeerConnection {}
unsafe impl Sync for RffiPeerConnection {}

impl webrtc::RefCounted for RffiPeerConnection {}

impl RffiPeerConnection {
    pub(crate) fn new(observer: *const RffiPeerConnectionObserver) -> Self {
        Self {
            state: Mutex::new(RffiPeerConnectionState::default()),
            observer,
        }
    }

    fn observer(&self) -> Option<&RffiPeerConnectionObserver> {
        unsafe { self.observer.as_ref() }
    }

    pub fn local_description_set(&self) -> bool {
        self.state.lock().unwrap().local_description_set
    }

    pub fn remote_description_set(&self) -> bool {
        self.state.lock().unwrap().remote_description_set
    }

    pub fn outgoing_media_enabled(&self) -> Option<bool> {
        self.state.lock().unwrap().outgoing_media_enabled
    }

    pub fn ice_candidates(&self) -> Vec<String> {
        self.state.lock().unwrap().ice_candidates.clone()
    }

    pub fn removed_ice_candidates(&self) -> usize {
        self.state.lock().unwrap().removed_ice_candidates
    }

    pub fn send_rates(&self) -> Option<(i32, i32, i32)> {
        self.state.lock().unwrap().send_rates
    }

    pub fn data_channel_labels(&self) -> Vec<String> {
        self.state.lock().unwrap().data_channel_labels.clone()
    }

    pub fn closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Test hook: pretends the engine gathered a local ICE candidate.
    pub fn inject_ice_candidate_gathered(&self, sdp_mid: &str, sdp_mline_index: i32, sdp: &str) {
        if let Some(observer) = self.observer() {
            let sdp_mid = CString::new(sdp_mid).expect("CString of sdp_mid");
            let sdp = CString::new(sdp).expect("CString of sdp");
            let candidate = RffiIceCandidate {
                sdp_mid: webrtc::ptr::Borrowed::from_ptr(sdp_mid.as_ptr()),
                sdp_mline_index,
                sdp: webrtc::ptr::Borrowed::from_ptr(sdp.as_ptr()),
            };
            observer.on_ice_candidate(&candidate);
        }
    }

    /// Test hook: pretends ICE reached the given state.
    pub fn inject_ice_connection_change(&self, new_state: IceConnectionState) {
        if let Some(observer) = self.observer() {
            observer.on_ice_connection_change(new_state);
        }
    }

    /// Test hook: pretends the remote side added a media stream.
    pub fn inject_incoming_stream(&self) {
        if let Some(observer) = self.observer() {
            observer.on_add_stream(unsafe { webrtc::ptr::OwnedRc::from_ptr(&FAKE_MEDIA_STREAM) });
        }
    }

    /// Test hook: pretends the remote side opened a data channel.
    pub fn inject_incoming_data_channel(&self, label: &str) {
        if let Some(observer) = self.observer() {
            observer.on_data_channel(unsafe { webrtc::ptr::OwnedRc::from_ptr(new_data_channel(label)) });
        }
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createOffer(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    _csd_observer: webrtc::ptr::BorrowedRc<RffiCreateSessionDescriptionObserver>,
) {
    info!("Rust_createOffer():");
    let _ = peer_connection;
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createAnswer(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    _csd_observer: webrtc::ptr::BorrowedRc<RffiCreateSessionDescriptionObserver>,
) {
    info!("Rust_createAnswer():");
    let _ = peer_connection;
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setLocalDescription(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    _ssd_observer: webrtc::ptr::BorrowedRc<RffiSetSessionDescriptionObserver>,
    session_description: webrtc::ptr::Unique<RffiSessionDescription>,
) {
    info!("Rust_setLocalDescription():");
    if let Some(peer_connection) = peer_connection.as_ref() {
        peer_connection.state.lock().unwrap().local_description_set = true;
    }
    // Takes ownership of the description.
    if !session_description.is_null() {
        drop(Box::from_raw(session_description.as_mut_ptr()));
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setRemoteDescription(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    _ssd_observer: webrtc::ptr::BorrowedRc<RffiSetSessionDescriptionObserver>,
    session_description: webrtc::ptr::Unique<RffiSessionDescription>,
) {
    info!("Rust_setRemoteDescription():");
    if let Some(peer_connection) = peer_connection.as_ref() {
        peer_connection.state.lock().unwrap().remote_description_set = true;
    }
    // Takes ownership of the description.
    if !session_description.is_null() {
        drop(Box::from_raw(session_description.as_mut_ptr()));
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setOutgoingMediaEnabled(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    enabled: bool,
) {
    info!("Rust_setOutgoingMediaEnabled({})", enabled);
    if let Some(peer_connection) = peer_connection.as_ref() {
        let mut state = peer_connection.state.lock().unwrap();
        if !(state.local_description_set && state.remote_description_set) {
            panic!("Can't Rust_setOutgoingMediaEnabled before the answer has been set.");
        }
        state.outgoing_media_enabled = Some(enabled);
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setIncomingMediaEnabled(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    enabled: bool,
) {
    info!("Rust_setIncomingMediaEnabled({})", enabled);
    if let Some(peer_connection) = peer_connection.as_ref() {
        peer_connection.state.lock().unwrap().incoming_media_enabled = Some(enabled);
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createDataChannel(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    label: webrtc::ptr::Borrowed<c_char>,
) -> webrtc::ptr::OwnedRc<RffiDataChannel> {
    let label = CStr::from_ptr(label.as_ptr()).to_string_lossy().into_owned();
    info!("Rust_createDataChannel({})", label);
    if let Some(peer_connection) = peer_connection.as_ref() {
        peer_connection
            .state
            .lock()
            .unwrap()
            .data_channel_labels
            .push(label.clone());
    }
    webrtc::ptr::OwnedRc::from_ptr(new_data_channel(&label))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_addIceCandidate(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    candidate: webrtc::ptr::Borrowed<RffiIceCandidate>,
) -> bool {
    info!("Rust_addIceCandidate():");
    match (peer_connection.as_ref(), candidate.as_ref()) {
        (Some(peer_connection), Some(candidate)) => {
            let sdp = CStr::from_ptr(candidate.sdp.as_ptr())
                .to_string_lossy()
                .into_owned();
            peer_connection.state.lock().unwrap().ice_candidates.push(sdp);
            true
        }
        _ => false,
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_removeIceCandidates(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    _candidates: webrtc::ptr::Borrowed<RffiIceCandidate>,
    candidates_size: usize,
) {
    info!("Rust_removeIceCandidates({})", candidates_size);
    if let Some(peer_connection) = peer_connection.as_ref() {
        peer_connection.state.lock().unwrap().removed_ice_candidates += candidates_size;
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getStats(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    stats_observer: webrtc::ptr::BorrowedRc<RffiStatsObserver>,
) {
    info!("Rust_getStats():");
    let _ = peer_connection;
    if let Some(stats_observer) = stats_observer.as_ref() {
        stats_observer.deliver_fake_stats();
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setSendBitrates(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    min_bitrate_bps: i32,
    start_bitrate_bps: i32,
    max_bitrate_bps: i32,
) {
    info!(
        "Rust_setSendBitrates({}, {}, {})",
        min_bitrate_bps, start_bitrate_bps, max_bitrate_bps
    );
    if let Some(peer_connection) = peer_connection.as_ref() {
        peer_connection.state.lock().unwrap().send_rates =
            Some((min_bitrate_bps, start_bitrate_bps, max_bitrate_bps));
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getSenders(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    out: webrtc::ptr::Borrowed<webrtc::ptr::OwnedRc<RffiRtpSender>>,
    out_capacity: usize,
    out_size: webrtc::ptr::Borrowed<usize>,
) {
    info!("Rust_getSenders():");
    let _ = peer_connection;
    let senders = [new_sender(0), new_sender(1)];
    let out = out.as_ptr() as *mut webrtc::ptr::OwnedRc<RffiRtpSender>;
    let mut written = 0;
    for sender in senders.iter().take(out_capacity) {
        *out.add(written) = webrtc::ptr::OwnedRc::from_ptr(*sender);
        written += 1;
    }
    *(out_size.as_ptr() as *mut usize) = written;
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getReceivers(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
    out: webrtc::ptr::Borrowed<webrtc::ptr::OwnedRc<RffiRtpReceiver>>,
    out_capacity: usize,
    out_size: webrtc::ptr::Borrowed<usize>,
) {
    info!("Rust_getReceivers():");
    let _ = peer_connection;
    let receivers = [new_receiver(0, 0x1001), new_receiver(1, 0x2001)];
    let out = out.as_ptr() as *mut webrtc::ptr::OwnedRc<RffiRtpReceiver>;
    let mut written = 0;
    for receiver in receivers.iter().take(out_capacity) {
        *out.add(written) = webrtc::ptr::OwnedRc::from_ptr(*receiver);
        written += 1;
    }
    *(out_size.as_ptr() as *mut usize) = written;
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_closePeerConnection(
    peer_connection: webrtc::ptr::BorrowedRc<RffiPeerConnection>,
) {
    info!("Rust_closePeerConnection():");
    if let Some(peer_connection) = peer_connection.as_ref() {
        peer_connection.state.lock().unwrap().closed = true;
    }
}
