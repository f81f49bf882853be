//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

use std::ffi::c_void;

use crate::webrtc;
use crate::webrtc::media::VideoFrameDeliveryCallback;
use crate::webrtc::video_frame_buffer::Rotation;

/// Incomplete type for WebRTC C++ MediaStream.
#[repr(C)]
pub struct RffiMediaStream {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiMediaStream {}

/// Incomplete type for C++ AudioTrack.
#[repr(C)]
pub struct RffiAudioTrack {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiAudioTrack {}

/// Incomplete type for C++ VideoSource.
#[repr(C)]
pub struct RffiVideoSource {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiVideoSource {}

/// Incomplete type for C++ VideoTrack.
#[repr(C)]
pub struct RffiVideoTrack {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiVideoTrack {}

/// Incomplete type for C++ webrtc::VideoFrameBuffer.
#[repr(C)]
pub struct RffiVideoFrameBuffer {
    _private: [u8; 0],
}

impl webrtc::RefCounted for RffiVideoFrameBuffer {}

extern "C" {
    pub fn Rust_getTrackIdAsUint32(track: webrtc::ptr::BorrowedRc<RffiVideoTrack>) -> u32;
    pub fn Rust_setAudioTrackEnabled(track: webrtc::ptr::BorrowedRc<RffiAudioTrack>, enabled: bool);
    pub fn Rust_setVideoTrackEnabled(track: webrtc::ptr::BorrowedRc<RffiVideoTrack>, enabled: bool);
    pub fn Rust_setVideoTrackContentHint(
        track: webrtc::ptr::BorrowedRc<RffiVideoTrack>,
        is_screenshare: bool,
    );
    pub fn Rust_getFirstVideoTrack(
        stream: webrtc::ptr::BorrowedRc<RffiMediaStream>,
    ) -> webrtc::ptr::OwnedRc<RffiVideoTrack>;
    pub fn Rust_addVideoSink(
        track: webrtc::ptr::BorrowedRc<RffiVideoTrack>,
        sink: webrtc::ptr::Borrowed<c_void>,
        callback: VideoFrameDeliveryCallback,
    );
    pub fn Rust_pushVideoFrame(
        source: webrtc::ptr::BorrowedRc<RffiVideoSource>,
        buffer: webrtc::ptr::BorrowedRc<RffiVideoFrameBuffer>,
    );
    pub fn Rust_adaptOutputVideoFormat(
        source: webrtc::ptr::BorrowedRc<RffiVideoSource>,
        width: u16,
        height: u16,
        fps: u8,
    );
    pub fn Rust_copyVideoFrameBufferFromI420(
        width: u32,
        height: u32,
        src: webrtc::ptr::Borrowed<u8>,
    ) -> webrtc::ptr::OwnedRc<RffiVideoFrameBuffer>;
    pub fn Rust_copyAndRotateVideoFrameBuffer(
        buffer: webrtc::ptr::BorrowedRc<RffiVideoFrameBuffer>,
        rotation: Rotation,
    ) -> webrtc::ptr::OwnedRc<RffiVideoFrameBuffer>;
    pub fn Rust_getVideoFrameBufferAsI420(
        buffer: webrtc::ptr::BorrowedRc<RffiVideoFrameBuffer>,
    ) -> webrtc::ptr::Borrowed<u8>;
    pub fn Rust_cropAndScaleVideoFrameBuffer(
        buffer: webrtc::ptr::BorrowedRc<RffiVideoFrameBuffer>,
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
        scale_width: u32,
        scale_height: u32,
    ) -> webrtc::ptr::OwnedRc<RffiVideoFrameBuffer>;
    pub fn Rust_convertTextureToI420(
        texture_id: u32,
        texture_type: i32,
        width: u32,
        height: u32,
        transform: webrtc::ptr::Borrowed<f32>,
    ) -> webrtc::ptr::OwnedRc<RffiVideoFrameBuffer>;
}
