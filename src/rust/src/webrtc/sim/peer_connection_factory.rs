//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of the WebRTC PeerConnectionFactory.

use std::os::raw::c_char;

use crate::webrtc;
use crate::webrtc::peer_connection_factory::{
    RffiAudioConfig, RffiAudioJitterBufferConfig, RffiIceServers,
};
use crate::webrtc::rtp::RffiRtpCodecCapability;
use crate::webrtc::sim::media::{
    new_audio_track, new_video_source, new_video_track, RffiAudioTrack, RffiVideoSource,
    RffiVideoTrack,
};
use crate::webrtc::sim::peer_connection::RffiPeerConnection;
use crate::webrtc::sim::peer_connection_observer::RffiPeerConnectionObserver;

/// Simulation type for PeerConnectionFactoryInterface.
pub struct RffiPeerConnectionFactoryInterface {
    _private: (),
}

impl webrtc::RefCounted for RffiPeerConnectionFactoryInterface {}

/// Simulation type for PeerConnectionFactoryOwner.
pub struct RffiPeerConnectionFactoryOwner {
    _private: (),
}

impl webrtc::RefCounted for RffiPeerConnectionFactoryOwner {}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createPeerConnectionFactory(
    _audio_config: webrtc::ptr::Borrowed<RffiAudioConfig>,
) -> webrtc::ptr::OwnedRc<RffiPeerConnectionFactoryOwner> {
    info!("Rust_createPeerConnectionFactory():");
    webrtc::ptr::OwnedRc::from_ptr(Box::into_raw(Box::new(RffiPeerConnectionFactoryOwner {
        _private: (),
    })))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createPeerConnectionFactoryWrapper(
    _factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryInterface>,
) -> webrtc::ptr::OwnedRc<RffiPeerConnectionFactoryOwner> {
    info!("Rust_createPeerConnectionFactoryWrapper():");
    webrtc::ptr::OwnedRc::from_ptr(Box::into_raw(Box::new(RffiPeerConnectionFactoryOwner {
        _private: (),
    })))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createPeerConnection(
    _factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryOwner>,
    pc_observer: webrtc::ptr::Borrowed<RffiPeerConnectionObserver>,
    _audio_jitter_buffer_config: webrtc::ptr::Borrowed<RffiAudioJitterBufferConfig>,
    _ice_servers: webrtc::ptr::Borrowed<RffiIceServers>,
    _outgoing_audio_track: webrtc::ptr::BorrowedRc<RffiAudioTrack>,
    _outgoing_video_track: webrtc::ptr::BorrowedRc<RffiVideoTrack>,
) -> webrtc::ptr::OwnedRc<RffiPeerConnection> {
    info!("Rust_createPeerConnection():");
    webrtc::ptr::OwnedRc::from_ptr(Box::into_raw(Box::new(RffiPeerConnection::new(
        pc_observer.as_ptr(),
    ))))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createAudioTrack(
    _factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryOwner>,
) -> webrtc::ptr::OwnedRc<RffiAudioTrack> {
    info!("Rust_createAudioTrack():");
    webrtc::ptr::OwnedRc::from_ptr(new_audio_track())
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createVideoSource() -> webrtc::ptr::OwnedRc<RffiVideoSource> {
    info!("Rust_createVideoSource():");
    webrtc::ptr::OwnedRc::from_ptr(new_video_source())
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createVideoTrack(
    _factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryOwner>,
    _source: webrtc::ptr::BorrowedRc<RffiVideoSource>,
) -> webrtc::ptr::OwnedRc<RffiVideoTrack> {
    info!("Rust_createVideoTrack():");
    webrtc::ptr::OwnedRc::from_ptr(new_video_track(0x2002))
}

const OPUS: &[u8] = b"opus\0";
const VP8: &[u8] = b"VP8\0";
const VP9: &[u8] = b"VP9\0";
const H264: &[u8] = b"H264\0";
const H264_FMTP: &[u8] = b"profile-level-id=42e01f\0";
const EMPTY: &[u8] = b"\0";

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getRtpSenderCapabilities(
    _factory: webrtc::ptr::BorrowedRc<RffiPeerConnectionFactoryOwner>,
    media_type: i32,
    out: webrtc::ptr::Borrowed<RffiRtpCodecCapability>,
    out_capacity: usize,
    out_size: webrtc::ptr::Borrowed<usize>,
) {
    info!("Rust_getRtpSenderCapabilities({})", media_type);
    let codec = |name: &'static [u8], clock_rate: i32, num_channels: i32, fmtp: &'static [u8]| {
        RffiRtpCodecCapability {
            name: webrtc::ptr::Borrowed::from_ptr(name.as_ptr() as *const c_char),
            kind: media_type,
            clock_rate,
            num_channels,
            sdp_fmtp_line: webrtc::ptr::Borrowed::from_ptr(fmtp.as_ptr() as *const c_char),
        }
    };
    let codecs = if media_type == 0 {
        vec![codec(OPUS, 48_000, 2, EMPTY)]
    } else {
        vec![
            codec(VP8, 90_000, 0, EMPTY),
            codec(VP9, 90_000, 0, EMPTY),
            codec(H264, 90_000, 0, H264_FMTP),
        ]
    };
    let out = out.as_ptr() as *mut RffiRtpCodecCapability;
    let mut written = 0;
    for codec in codecs.into_iter().take(out_capacity) {
        *out.add(written) = codec;
        written += 1;
    }
    *(out_size.as_ptr() as *mut usize) = written;
}
