//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of media streams, tracks, sources, and frame buffers.

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::webrtc;
use crate::webrtc::media::{VideoFrameDeliveryCallback, VideoFrameMetadata};
use crate::webrtc::video_frame_buffer::{I420Buffer, Rotation};

/// Simulation type for C++ MediaStream.
pub struct RffiMediaStream {
    has_video: bool,
}

impl webrtc::RefCounted for RffiMediaStream {}

pub static FAKE_MEDIA_STREAM: RffiMediaStream = RffiMediaStream { has_video: true };

/// Simulation type for C++ AudioTrack.
pub struct RffiAudioTrack {
    enabled: AtomicBool,
}

impl webrtc::RefCounted for RffiAudioTrack {}

impl RffiAudioTrack {
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

struct VideoSinkRegistration {
    sink: *const c_void,
    callback: VideoFrameDeliveryCallback,
}

// The sink pointer is only touched from test threads.
unsafe impl Send for VideoSinkRegistration {}

/// Simulation type for C++ VideoTrack.
pub struct RffiVideoTrack {
    id: u32,
    enabled: AtomicBool,
    content_hint_screenshare: AtomicBool,
    sink: Mutex<Option<VideoSinkRegistration>>,
}

impl webrtc::RefCounted for RffiVideoTrack {}

impl RffiVideoTrack {
    fn with_id(id: u32) -> Self {
        Self {
            id,
            enabled: AtomicBool::new(true),
            content_hint_screenshare: AtomicBool::new(false),
            sink: Mutex::new(None),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn content_hint_screenshare(&self) -> bool {
        self.content_hint_screenshare.load(Ordering::SeqCst)
    }

    /// Test hook: pretends the engine decoded a frame for this track.
    pub fn deliver_fake_frame(&self, width: u32, height: u32) {
        let registration = self.sink.lock().unwrap();
        if let Some(registration) = &*registration {
            let buffer = fake_i420_frame_buffer(width, height);
            (registration.callback)(
                webrtc::ptr::Borrowed::from_ptr(registration.sink),
                self.id,
                VideoFrameMetadata {
                    width,
                    height,
                    rotation: Rotation::None,
                },
                unsafe { webrtc::ptr::OwnedRc::from_ptr(buffer) },
            );
        }
    }
}

pub static FAKE_VIDEO_TRACK: RffiVideoTrack = RffiVideoTrack {
    id: 0x2001,
    enabled: AtomicBool::new(true),
    content_hint_screenshare: AtomicBool::new(false),
    sink: Mutex::new(None),
};

/// Simulation type for C++ VideoSource.
#[derive(Default)]
pub struct RffiVideoSource {
    pushed: Mutex<Vec<(u32, u32)>>,
    adapted: Mutex<Option<(u16, u16, u8)>>,
}

impl webrtc::RefCounted for RffiVideoSource {}

impl RffiVideoSource {
    /// Test hook: dimensions of every frame pushed so far.
    pub fn pushed_frames(&self) -> Vec<(u32, u32)> {
        self.pushed.lock().unwrap().clone()
    }

    /// Test hook: the most recent adapt_output_format request.
    pub fn adapted_format(&self) -> Option<(u16, u16, u8)> {
        *self.adapted.lock().unwrap()
    }
}

/// Simulation type for C++ webrtc::VideoFrameBuffer: a contiguous I420
/// image.
pub struct RffiVideoFrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl webrtc::RefCounted for RffiVideoFrameBuffer {}

impl RffiVideoFrameBuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

fn i420_size(width: u32, height: u32) -> usize {
    let chroma = |size: u32| ((size + 1) / 2) as usize;
    width as usize * height as usize + 2 * chroma(width) * chroma(height)
}

fn leak(buffer: RffiVideoFrameBuffer) -> *const RffiVideoFrameBuffer {
    Box::into_raw(Box::new(buffer))
}

/// Test hook: a mid-gray engine-owned buffer.
pub fn fake_i420_frame_buffer(width: u32, height: u32) -> *const RffiVideoFrameBuffer {
    leak(RffiVideoFrameBuffer {
        width,
        height,
        data: vec![0x80; i420_size(width, height)],
    })
}

fn buffer_as_i420(buffer: &RffiVideoFrameBuffer) -> I420Buffer {
    I420Buffer::wrap(buffer.width, buffer.height, buffer.data.clone(), None)
        .expect("sim buffer is well formed")
}

fn i420_as_buffer(i420: &I420Buffer) -> RffiVideoFrameBuffer {
    let mut data = Vec::with_capacity(i420_size(i420.width(), i420.height()));
    data.extend_from_slice(i420.data_y());
    data.extend_from_slice(i420.data_u());
    data.extend_from_slice(i420.data_v());
    RffiVideoFrameBuffer {
        width: i420.width(),
        height: i420.height(),
        data,
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getTrackIdAsUint32(track: webrtc::ptr::BorrowedRc<RffiVideoTrack>) -> u32 {
    debug!("Rust_getTrackIdAsUint32()");
    track.as_ref().map(|track| track.id).unwrap_or(0)
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setAudioTrackEnabled(
    track: webrtc::ptr::BorrowedRc<RffiAudioTrack>,
    enabled: bool,
) {
    debug!("Rust_setAudioTrackEnabled({})", enabled);
    if let Some(track) = track.as_ref() {
        track.enabled.store(enabled, Ordering::SeqCst);
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setVideoTrackEnabled(
    track: webrtc::ptr::BorrowedRc<RffiVideoTrack>,
    enabled: bool,
) {
    debug!("Rust_setVideoTrackEnabled({})", enabled);
    if let Some(track) = track.as_ref() {
        track.enabled.store(enabled, Ordering::SeqCst);
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_setVideoTrackContentHint(
    track: webrtc::ptr::BorrowedRc<RffiVideoTrack>,
    is_screenshare: bool,
) {
    debug!("Rust_setVideoTrackContentHint({})", is_screenshare);
    if let Some(track) = track.as_ref() {
        track
            .content_hint_screenshare
            .store(is_screenshare, Ordering::SeqCst);
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getFirstVideoTrack(
    stream: webrtc::ptr::BorrowedRc<RffiMediaStream>,
) -> webrtc::ptr::OwnedRc<RffiVideoTrack> {
    debug!("Rust_getFirstVideoTrack()");
    match stream.as_ref() {
        Some(stream) if stream.has_video => webrtc::ptr::OwnedRc::from_ptr(&FAKE_VIDEO_TRACK),
        _ => webrtc::ptr::OwnedRc::null(),
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_addVideoSink(
    track: webrtc::ptr::BorrowedRc<RffiVideoTrack>,
    sink: webrtc::ptr::Borrowed<c_void>,
    callback: VideoFrameDeliveryCallback,
) {
    debug!("Rust_addVideoSink()");
    if let Some(track) = track.as_ref() {
        *track.sink.lock().unwrap() = Some(VideoSinkRegistration {
            sink: sink.as_ptr(),
            callback,
        });
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_pushVideoFrame(
    source: webrtc::ptr::BorrowedRc<RffiVideoSource>,
    buffer: webrtc::ptr::BorrowedRc<RffiVideoFrameBuffer>,
) {
    debug!("Rust_pushVideoFrame()");
    if let (Some(source), Some(buffer)) = (source.as_ref(), buffer.as_ref()) {
        source.pushed.lock().unwrap().push((buffer.width, buffer.height));
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_adaptOutputVideoFormat(
    source: webrtc::ptr::BorrowedRc<RffiVideoSource>,
    width: u16,
    height: u16,
    fps: u8,
) {
    debug!("Rust_adaptOutputVideoFormat({}x{}@{})", width, height, fps);
    if let Some(source) = source.as_ref() {
        *source.adapted.lock().unwrap() = Some((width, height, fps));
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_copyVideoFrameBufferFromI420(
    width: u32,
    height: u32,
    src: webrtc::ptr::Borrowed<u8>,
) -> webrtc::ptr::OwnedRc<RffiVideoFrameBuffer> {
    debug!("Rust_copyVideoFrameBufferFromI420()");
    if src.is_null() {
        return webrtc::ptr::OwnedRc::null();
    }
    let data = std::slice::from_raw_parts(src.as_ptr(), i420_size(width, height)).to_vec();
    webrtc::ptr::OwnedRc::from_ptr(leak(RffiVideoFrameBuffer {
        width,
        height,
        data,
    }))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_copyAndRotateVideoFrameBuffer(
    buffer: webrtc::ptr::BorrowedRc<RffiVideoFrameBuffer>,
    rotation: Rotation,
) -> webrtc::ptr::OwnedRc<RffiVideoFrameBuffer> {
    debug!("Rust_copyAndRotateVideoFrameBuffer({:?})", rotation);
    match buffer.as_ref() {
        Some(buffer) => {
            let rotated = buffer_as_i420(buffer).rotate(rotation);
            webrtc::ptr::OwnedRc::from_ptr(leak(i420_as_buffer(&rotated)))
        }
        None => webrtc::ptr::OwnedRc::null(),
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_getVideoFrameBufferAsI420(
    buffer: webrtc::ptr::BorrowedRc<RffiVideoFrameBuffer>,
) -> webrtc::ptr::Borrowed<u8> {
    debug!("Rust_getVideoFrameBufferAsI420()");
    match buffer.as_ref() {
        Some(buffer) => webrtc::ptr::Borrowed::from_ptr(buffer.data.as_ptr()),
        None => webrtc::ptr::Borrowed::null(),
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_cropAndScaleVideoFrameBuffer(
    buffer: webrtc::ptr::BorrowedRc<RffiVideoFrameBuffer>,
    crop_x: u32,
    crop_y: u32,
    crop_width: u32,
    crop_height: u32,
    scale_width: u32,
    scale_height: u32,
) -> webrtc::ptr::OwnedRc<RffiVideoFrameBuffer> {
    debug!("Rust_cropAndScaleVideoFrameBuffer()");
    match buffer.as_ref() {
        Some(buffer) => {
            let scaled = buffer_as_i420(buffer).crop_and_scale(
                crop_x,
                crop_y,
                crop_width,
                crop_height,
                scale_width,
                scale_height,
            );
            match scaled {
                Ok(scaled) => webrtc::ptr::OwnedRc::from_ptr(leak(i420_as_buffer(&scaled))),
                Err(_) => webrtc::ptr::OwnedRc::null(),
            }
        }
        None => webrtc::ptr::OwnedRc::null(),
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_convertTextureToI420(
    texture_id: u32,
    _texture_type: i32,
    width: u32,
    height: u32,
    _transform: webrtc::ptr::Borrowed<f32>,
) -> webrtc::ptr::OwnedRc<RffiVideoFrameBuffer> {
    debug!("Rust_convertTextureToI420(texture {})", texture_id);
    webrtc::ptr::OwnedRc::from_ptr(fake_i420_frame_buffer(width, height))
}

pub(crate) fn new_video_track(id: u32) -> *const RffiVideoTrack {
    Box::into_raw(Box::new(RffiVideoTrack::with_id(id)))
}

pub(crate) fn new_audio_track() -> *const RffiAudioTrack {
    Box::into_raw(Box::new(RffiAudioTrack {
        enabled: AtomicBool::new(true),
    }))
}

pub(crate) fn new_video_source() -> *const RffiVideoSource {
    Box::into_raw(Box::new(RffiVideoSource::default()))
}
