//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use crate::webrtc;
use crate::webrtc::ffi::media::{RffiAudioTrack, RffiVideoSource, RffiVideoTrack};
use crate::webrtc::ffi::peer_connection::RffiPeerConnection;
use crate::webrtc::ffi::peer_connection_observer::RffiPeerConnectionObserver;
use crate::webrtc::peer_connection_factory::{
    RffiAudioConfig, RffiAudioJitterBufferConfig, RffiIceServers,
};
use crate::webrtc::rtp::RffiRtpCodecCapability;

/// Incomplete type for C++ PeerConnectionFactoryInterface.
#[repr(C)]
pub struct RffiPeerConnectionFactoryInterface {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiPeerConnectionFactoryInterface {}

/// Incomplete type for C++ PeerConnectionFactoryOwner, which holds the
/// factory plus the threads it runs on.
#[repr(C)]
pub struct RffiPeerConnectionFactoryOwner {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiPeerConnectionFactoryOwner {}

extern "C" {
    pub fn Rust_createPeerConnectionFactory(
        audio_config: webrtc::ptr::Borrowed<RffiAudioConfig>,
    ) -> webrtc::ptr::OwnedRc<RffiPeerConnectionFactoryOwner>;
    pub fn Rust_createPeerConnectionFactoryWrapper(
        factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryInterface>,
    ) -> webrtc::ptr::OwnedRc<RffiPeerConnectionFactoryOwner>;
    pub fn Rust_createPeerConnection(
        factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryOwner>,
        pc_observer: webrtc::ptr::Borrowed<RffiPeerConnectionObserver>,
        audio_jitter_buffer_config: webrtc::ptr::Borrowed<RffiAudioJitterBufferConfig>,
        ice_servers: webrtc::ptr::Borrowed<RffiIceServers>,
        outgoing_audio_track: webrtc::ptr::BorrowedRc<RffiAudioTrack>,
        outgoing_video_track: webrtc::ptr::BorrowedRc<RffiVideoTrack>,
    ) -> webrtc::ptr::OwnedRc<RffiPeerConnection>;
    pub fn Rust_createAudioTrack(
        factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryOwner>,
    ) -> webrtc::ptr::OwnedRc<RffiAudioTrack>;
    pub fn Rust_createVideoSource() -> webrtc::ptr::OwnedRc<RffiVideoSource>;
    pub fn Rust_createVideoTrack(
        factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryOwner>,
        source: webrtc::ptr::BorrowedRc<RffiVideoSource>,
    ) -> webrtc::ptr::OwnedRc<RffiVideoTrack>;
    pub fn Rust_getRtpSenderCapabilities(
        factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryOwner>,
        media_type: i32,
        out: webrtc::ptr::Borrowed<RffiRtpCodecCapability>,
        out_capacity: usize,
        out_size: webrtc::ptr::Borrowed<usize>,
    );
}
