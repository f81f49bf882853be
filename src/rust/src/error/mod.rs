//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Common error codes.

use thiserror::Error;

/// Platform independent error conditions.
#[derive(Error, Debug)]
pub enum NativeRtcError {
    // Project wide common error codes
    #[error("Mutex poisoned: {0}")]
    MutexPoisoned(String),
    #[error("Null pointer in: {0}, var: {1}")]
    NullPointer(String, String),

    // Object lifecycle error codes
    #[error("{0} already disposed")]
    AlreadyDisposed(&'static str),
    #[error("retain() called on an object with ref count < 1")]
    RetainAfterRelease,
    #[error("release() called on an object with ref count < 1")]
    ReleaseAfterRelease,

    // WebRTC / C++ object creation error codes
    #[error("Unable to create C++ PeerConnectionFactory")]
    CreatePeerConnectionFactory,
    #[error("Unable to create C++ PeerConnection")]
    CreatePeerConnection,
    #[error("Unable to create C++ PeerConnectionObserver")]
    CreatePeerConnectionObserver,
    #[error("Unable to create C++ DataChannel")]
    CreateDataChannel,
    #[error("Unable to create C++ VideoSource")]
    CreateVideoSource,
    #[error("Unable to create C++ VideoTrack")]
    CreateVideoTrack,
    #[error("Unable to create C++ AudioTrack")]
    CreateAudioTrack,

    // WebRTC / C++ session description error codes
    #[error("CreateSessionDescriptionObserver failure. error msg: {0}, type: {1}")]
    CreateSessionDescriptionObserver(String, i32),
    #[error("CreateSessionDescriptionObserver get result failure. error msg: {0}")]
    CreateSessionDescriptionObserverResult(String),
    #[error("SetSessionDescriptionObserver failure. error msg: {0}, type: {1}")]
    SetSessionDescriptionObserver(String, i32),
    #[error("SetSessionDescriptionObserver get result failure. error msg: {0}")]
    SetSessionDescriptionObserverResult(String),
    #[error("AddIceCandidate failure")]
    AddIceCandidate,

    // WebRTC / C++ offer / answer error codes
    #[error("Unable to convert offer or answer to SDP")]
    ToSdp,
    #[error("Unable to convert sdp to answer")]
    ConvertSdpAnswer,
    #[error("Unable to convert sdp to offer")]
    ConvertSdpOffer,

    // DataChannel error codes
    #[error("Unable to send data channel message")]
    DataChannelSend,
    #[error("Unknown data channel state: {0}")]
    UnknownDataChannelState(i32),

    // RtpSender / RtpReceiver error codes
    #[error("Unable to set RtpParameters on sender")]
    SetRtpParameters,

    // Frame buffer error codes
    #[error("Invalid crop region: {crop_width}x{crop_height}+{crop_x}+{crop_y} of {width}x{height} buffer")]
    InvalidCropRegion {
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
        width: u32,
        height: u32,
    },
    #[error("Invalid scale dimensions: {0}x{1}")]
    InvalidScaleDimensions(u32, u32),
    #[error("Unsupported frame dimensions: {0}x{1}")]
    UnsupportedFrameDimensions(u32, u32),
    #[error("Buffer too small: got {0} bytes, need {1}")]
    BufferTooSmall(usize, usize),
}
