//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Media streams, tracks, sources, and video frames.

use crate::common::Result;
use crate::error::NativeRtcError;
use crate::webrtc;
use crate::webrtc::video_frame_buffer::{FrameBuffer, I420Buffer, Nv12Buffer, Nv21Buffer, Rotation};

pub use crate::webrtc::peer_connection_factory::RffiPeerConnectionFactoryOwner;

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::media;
#[cfg(feature = "sim")]
use crate::webrtc::sim::media;

pub use media::{RffiAudioTrack, RffiMediaStream, RffiVideoFrameBuffer, RffiVideoSource, RffiVideoTrack};

/// Rust wrapper around WebRTC C++ MediaStream object.
#[derive(Clone, Debug)]
pub struct MediaStream {
    rffi: webrtc::Arc<RffiMediaStream>,
}

impl MediaStream {
    pub fn new(rffi: webrtc::Arc<RffiMediaStream>) -> Self {
        Self { rffi }
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiMediaStream> {
        &self.rffi
    }

    pub fn into_owned(self) -> webrtc::ptr::OwnedRc<RffiMediaStream> {
        self.rffi.into_owned()
    }

    /// The stream's first video track, if it has one.
    pub fn incoming_video_track(&self) -> Result<Option<VideoTrack>> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("MediaStream").into());
        }
        let track = webrtc::Arc::from_owned(unsafe {
            media::Rust_getFirstVideoTrack(self.rffi.as_borrowed())
        });
        if track.is_null() {
            return Ok(None);
        }
        Ok(Some(VideoTrack::new(track, None)))
    }

    /// Releases the native stream. Fails if already disposed.
    pub fn dispose(&mut self) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("MediaStream").into());
        }
        self.rffi = webrtc::Arc::null();
        Ok(())
    }
}

/// Rust wrapper around WebRTC C++ AudioTrackInterface object.
#[derive(Clone, Debug)]
pub struct AudioTrack {
    rffi: webrtc::Arc<RffiAudioTrack>,
    // We keep this around as an easy way to make sure the PeerConnectionFactory
    // outlives the AudioTrack.
    _owner: Option<webrtc::Arc<RffiPeerConnectionFactoryOwner>>,
}

impl Drop for AudioTrack {
    fn drop(&mut self) {
        // Delete the rffi before the _owner.
        self.rffi = webrtc::Arc::null();
    }
}

impl AudioTrack {
    pub fn new(
        rffi: webrtc::Arc<RffiAudioTrack>,
        owner: Option<webrtc::Arc<RffiPeerConnectionFactoryOwner>>,
    ) -> Self {
        Self {
            rffi,
            _owner: owner,
        }
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiAudioTrack> {
        &self.rffi
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("AudioTrack").into());
        }
        unsafe { media::Rust_setAudioTrackEnabled(self.rffi.as_borrowed(), enabled) };
        Ok(())
    }

    pub fn dispose(&mut self) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("AudioTrack").into());
        }
        self.rffi = webrtc::Arc::null();
        Ok(())
    }
}

/// Rust wrapper around WebRTC C++ VideoTrackInterface object.
#[derive(Clone, Debug)]
pub struct VideoTrack {
    rffi: webrtc::Arc<RffiVideoTrack>,
    // We keep this around as an easy way to make sure the PeerConnectionFactory
    // outlives the VideoTrack.
    _owner: Option<webrtc::Arc<RffiPeerConnectionFactoryOwner>>,
}

impl Drop for VideoTrack {
    fn drop(&mut self) {
        // Delete the rffi before the _owner.
        self.rffi = webrtc::Arc::null();
    }
}

impl VideoTrack {
    pub fn new(
        rffi: webrtc::Arc<RffiVideoTrack>,
        owner: Option<webrtc::Arc<RffiPeerConnectionFactoryOwner>>,
    ) -> Self {
        Self {
            rffi,
            _owner: owner,
        }
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiVideoTrack> {
        &self.rffi
    }

    pub fn id(&self) -> Result<u32> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("VideoTrack").into());
        }
        Ok(unsafe { media::Rust_getTrackIdAsUint32(self.rffi.as_borrowed()) })
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("VideoTrack").into());
        }
        unsafe { media::Rust_setVideoTrackEnabled(self.rffi.as_borrowed(), enabled) };
        Ok(())
    }

    pub fn set_content_hint(&self, is_screenshare: bool) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("VideoTrack").into());
        }
        unsafe { media::Rust_setVideoTrackContentHint(self.rffi.as_borrowed(), is_screenshare) };
        Ok(())
    }

    /// Registers a sink for the track's incoming frames. The sink is handed
    /// to the engine and kept alive for the lifetime of the native track.
    pub fn add_sink(&self, sink: Box<dyn VideoSink>) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("VideoTrack").into());
        }
        let sink = Box::into_raw(Box::new(sink));
        unsafe {
            media::Rust_addVideoSink(
                self.rffi.as_borrowed(),
                webrtc::ptr::Borrowed::from_ptr(sink as *const std::ffi::c_void),
                deliver_video_frame,
            )
        };
        Ok(())
    }

    pub fn dispose(&mut self) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("VideoTrack").into());
        }
        self.rffi = webrtc::Arc::null();
        Ok(())
    }
}

/// Signature of the frame-delivery trampoline registered with the engine.
pub type VideoFrameDeliveryCallback = extern "C" fn(
    sink: webrtc::ptr::Borrowed<std::ffi::c_void>,
    track_id: u32,
    metadata: VideoFrameMetadata,
    rffi_buffer: webrtc::ptr::OwnedRc<RffiVideoFrameBuffer>,
);

/// Delivery trampoline handed to the engine by [`VideoTrack::add_sink`].
pub(crate) extern "C" fn deliver_video_frame(
    sink: webrtc::ptr::Borrowed<std::ffi::c_void>,
    track_id: u32,
    metadata: VideoFrameMetadata,
    rffi_buffer: webrtc::ptr::OwnedRc<RffiVideoFrameBuffer>,
) {
    if sink.is_null() {
        error!("deliver_video_frame(): null sink");
        return;
    }
    let sink = unsafe { &*(sink.as_ptr() as *const Box<dyn VideoSink>) };
    let buffer = crate::webrtc::video_frame_buffer::WrappedNativeBuffer::new(
        webrtc::Arc::from_owned(rffi_buffer),
        metadata.width,
        metadata.height,
    );
    sink.on_video_frame(
        track_id,
        VideoFrame::from_buffer(metadata, FrameBuffer::WrappedNative(buffer)),
    );
}

// You could have a non-Sync, non-Send VideoSink, but
// it's more convenient to put those traits here than anywhere else.
pub trait VideoSink: Sync + Send {
    // Warning: this video frame's buffer may be shared with a video decoder,
    // and so must quickly be dropped (by copying it and dropping the original)
    // or the video decoder will soon stall and video will be choppy.
    fn on_video_frame(&self, track_id: u32, frame: VideoFrame);
    fn box_clone(&self) -> Box<dyn VideoSink>;
}

impl Clone for Box<dyn VideoSink> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VideoFrameMetadata {
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
}

impl VideoFrameMetadata {
    #[must_use]
    pub fn apply_rotation(&self) -> Self {
        match self.rotation {
            Rotation::None | Rotation::Clockwise180 => Self {
                width: self.width,
                height: self.height,
                rotation: Rotation::None,
            },
            Rotation::Clockwise90 | Rotation::Clockwise270 => Self {
                width: self.height,
                height: self.width,
                rotation: Rotation::None,
            },
        }
    }
}

/// CPU pixel layouts accepted by [`VideoFrame::copy_from_slice`].
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, num_enum::TryFromPrimitive)]
pub enum VideoPixelFormat {
    I420 = 0,
    Nv12,
    Nv21,
}

pub struct VideoFrame {
    metadata: VideoFrameMetadata,
    buffer: FrameBuffer,
}

impl VideoFrame {
    pub fn metadata(&self) -> VideoFrameMetadata {
        self.metadata
    }

    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    pub fn height(&self) -> u32 {
        self.metadata.height
    }

    pub fn from_buffer(metadata: VideoFrameMetadata, buffer: FrameBuffer) -> Self {
        Self { metadata, buffer }
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn copy_from_slice(
        width: u32,
        height: u32,
        pixel_format: VideoPixelFormat,
        data: &[u8],
    ) -> Result<Self> {
        let metadata = VideoFrameMetadata {
            width,
            height,
            rotation: Rotation::None,
        };
        let buffer = match pixel_format {
            VideoPixelFormat::I420 => {
                FrameBuffer::I420(I420Buffer::wrap(width, height, data.to_vec(), None)?)
            }
            VideoPixelFormat::Nv12 => FrameBuffer::Nv12(Nv12Buffer::wrap(
                width,
                height,
                width,
                height,
                data.to_vec(),
                None,
            )?),
            VideoPixelFormat::Nv21 => {
                FrameBuffer::Nv21(Nv21Buffer::wrap(width, height, data.to_vec(), None)?)
            }
        };
        Ok(Self::from_buffer(metadata, buffer))
    }

    pub fn to_i420(&self) -> Result<I420Buffer> {
        self.buffer.to_i420()
    }

    /// Bakes the metadata rotation into the pixel data.
    #[must_use = "rotation produces a new frame"]
    pub fn apply_rotation(self) -> Result<Self> {
        if self.metadata.rotation == Rotation::None {
            return Ok(self);
        }
        let rotated = match &self.buffer {
            FrameBuffer::WrappedNative(b) => {
                let rffi = webrtc::Arc::from_owned(unsafe {
                    media::Rust_copyAndRotateVideoFrameBuffer(
                        b.rffi().as_borrowed(),
                        self.metadata.rotation,
                    )
                });
                if rffi.is_null() {
                    return Err(NativeRtcError::NullPointer(
                        "VideoFrame::apply_rotation()".to_string(),
                        "rffi".to_string(),
                    )
                    .into());
                }
                let metadata = self.metadata.apply_rotation();
                FrameBuffer::WrappedNative(
                    crate::webrtc::video_frame_buffer::WrappedNativeBuffer::new(
                        rffi,
                        metadata.width,
                        metadata.height,
                    ),
                )
            }
            buffer => FrameBuffer::I420(buffer.to_i420()?.rotate(self.metadata.rotation)),
        };
        Ok(Self {
            metadata: self.metadata.apply_rotation(),
            buffer: rotated,
        })
    }

    /// Scales the frame to the given dimensions.
    ///
    /// Both scaling up and down are supported.
    pub fn scale(&self, width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            metadata: VideoFrameMetadata {
                width,
                height,
                rotation: self.metadata.rotation,
            },
            buffer: self.buffer.crop_and_scale(
                0,
                0,
                self.buffer.width(),
                self.buffer.height(),
                width,
                height,
            )?,
        })
    }
}

/// Rust wrapper around WebRTC C++ VideoTrackSourceInterface object.
#[derive(Clone, Debug)]
pub struct VideoSource {
    rffi: webrtc::Arc<RffiVideoSource>,
}

impl VideoSource {
    pub fn new(rffi: webrtc::Arc<RffiVideoSource>) -> Self {
        Self { rffi }
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiVideoSource> {
        &self.rffi
    }

    /// Hands a captured frame to the engine. CPU buffers are copied into an
    /// engine-owned I420 buffer on the way in.
    pub fn push_frame(&self, frame: &VideoFrame) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("VideoSource").into());
        }
        match frame.buffer() {
            FrameBuffer::WrappedNative(b) => unsafe {
                media::Rust_pushVideoFrame(self.rffi.as_borrowed(), b.rffi().as_borrowed());
            },
            buffer => {
                let i420 = buffer.to_i420()?;
                let mut contiguous =
                    Vec::with_capacity(i420.data_y().len() + i420.data_u().len() + i420.data_v().len());
                contiguous.extend_from_slice(i420.data_y());
                contiguous.extend_from_slice(i420.data_u());
                contiguous.extend_from_slice(i420.data_v());
                let rffi = webrtc::Arc::from_owned(unsafe {
                    media::Rust_copyVideoFrameBufferFromI420(
                        i420.width(),
                        i420.height(),
                        webrtc::ptr::Borrowed::from_ptr(contiguous.as_ptr()),
                    )
                });
                if rffi.is_null() {
                    return Err(NativeRtcError::NullPointer(
                        "VideoSource::push_frame()".to_string(),
                        "rffi".to_string(),
                    )
                    .into());
                }
                unsafe {
                    media::Rust_pushVideoFrame(self.rffi.as_borrowed(), rffi.as_borrowed());
                }
            }
        }
        Ok(())
    }

    /// Asks the engine to adapt the source's output format.
    pub fn adapt_output_format(&self, width: u16, height: u16, fps: u8) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("VideoSource").into());
        }
        unsafe {
            media::Rust_adaptOutputVideoFormat(self.rffi.as_borrowed(), width, height, fps);
        }
        Ok(())
    }

    pub fn dispose(&mut self) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("VideoSource").into());
        }
        self.rffi = webrtc::Arc::null();
        Ok(())
    }
}
