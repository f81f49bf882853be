//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC RTP senders, receivers, and capabilities.

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::common::{units::DataRate, MediaType, Result};
use crate::error::NativeRtcError;
use crate::webrtc;

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::rtp;
#[cfg(not(feature = "sim"))]
pub use crate::webrtc::ffi::rtp::{RffiRtpReceiver, RffiRtpSender};

#[cfg(feature = "sim")]
use crate::webrtc::sim::rtp;
#[cfg(feature = "sim")]
pub use crate::webrtc::sim::rtp::{RffiRtpReceiver, RffiRtpSender};

/// Per-encoding send parameters, the useful subset of the engine's
/// RtpEncodingParameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtpEncodingParameters {
    pub active: bool,
    pub max_bitrate: Option<DataRate>,
}

/// Mirror of the engine-side row struct.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RffiRtpEncodingParameters {
    pub active: bool,
    // Negative means unset.
    pub max_bitrate_bps: i64,
}

impl From<&RtpEncodingParameters> for RffiRtpEncodingParameters {
    fn from(parameters: &RtpEncodingParameters) -> Self {
        Self {
            active: parameters.active,
            max_bitrate_bps: parameters
                .max_bitrate
                .map(|rate| rate.as_bps() as i64)
                .unwrap_or(-1),
        }
    }
}

impl From<&RffiRtpEncodingParameters> for RtpEncodingParameters {
    fn from(rffi: &RffiRtpEncodingParameters) -> Self {
        Self {
            active: rffi.active,
            max_bitrate: if rffi.max_bitrate_bps < 0 {
                None
            } else {
                Some(DataRate::from_bps(rffi.max_bitrate_bps as u64))
            },
        }
    }
}

/// The send parameters of an RTP sender.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RtpParameters {
    pub encodings: Vec<RtpEncodingParameters>,
}

/// One codec the engine can send or receive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtpCodecCapability {
    pub name: String,
    pub kind: MediaType,
    pub clock_rate: i32,
    pub num_channels: i32,
    pub sdp_fmtp_line: String,
}

/// Mirror of the engine-side row struct.
#[repr(C)]
pub struct RffiRtpCodecCapability {
    pub name: webrtc::ptr::Borrowed<c_char>,
    pub kind: i32,
    pub clock_rate: i32,
    pub num_channels: i32,
    pub sdp_fmtp_line: webrtc::ptr::Borrowed<c_char>,
}

/// What the engine can send or receive for a media kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RtpCapabilities {
    pub codecs: Vec<RtpCodecCapability>,
}

impl RtpCodecCapability {
    /// Converts an engine row, skipping it if the kind is unknown.
    pub(crate) fn from_rffi(rffi: &RffiRtpCodecCapability) -> Option<Self> {
        let kind = match rffi.kind {
            0 => MediaType::Audio,
            1 => MediaType::Video,
            other => {
                warn!("Skipping codec capability with unknown kind {}", other);
                return None;
            }
        };
        let string_at = |ptr: webrtc::ptr::Borrowed<c_char>| {
            if ptr.is_null() {
                String::new()
            } else {
                unsafe { CStr::from_ptr(ptr.as_ptr()).to_string_lossy().into_owned() }
            }
        };
        Some(Self {
            name: string_at(rffi.name),
            kind,
            clock_rate: rffi.clock_rate,
            num_channels: rffi.num_channels,
            sdp_fmtp_line: string_at(rffi.sdp_fmtp_line),
        })
    }
}

/// Rust wrapper around WebRTC C++ RtpSender object.
#[derive(Clone, Debug)]
pub struct RtpSender {
    rffi: webrtc::Arc<RffiRtpSender>,
}

impl RtpSender {
    pub fn new(rffi: webrtc::Arc<RffiRtpSender>) -> Self {
        Self { rffi }
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiRtpSender> {
        &self.rffi
    }

    fn checked_rffi(&self) -> Result<webrtc::ptr::BorrowedRc<RffiRtpSender>> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("RtpSender").into());
        }
        Ok(self.rffi.as_borrowed())
    }

    pub fn media_type(&self) -> Result<MediaType> {
        let raw = unsafe { rtp::Rust_getSenderMediaType(self.checked_rffi()?) };
        match raw {
            0 => Ok(MediaType::Audio),
            _ => Ok(MediaType::Video),
        }
    }

    pub fn parameters(&self) -> Result<RtpParameters> {
        let rffi = self.checked_rffi()?;
        let mut rffi_encodings: Vec<RffiRtpEncodingParameters> = Vec::with_capacity(8);
        let mut len = 0usize;
        let len_ptr: *mut usize = &mut len;
        unsafe {
            rtp::Rust_getSenderParameters(
                rffi,
                webrtc::ptr::Borrowed::from_ptr(rffi_encodings.as_mut_ptr()),
                rffi_encodings.capacity(),
                webrtc::ptr::Borrowed::from_ptr(len_ptr as *const usize),
            );
            rffi_encodings.set_len(std::ptr::read(len_ptr));
        }
        Ok(RtpParameters {
            encodings: rffi_encodings.iter().map(RtpEncodingParameters::from).collect(),
        })
    }

    pub fn set_parameters(&self, parameters: &RtpParameters) -> Result<()> {
        let rffi_encodings: Vec<RffiRtpEncodingParameters> = parameters
            .encodings
            .iter()
            .map(RffiRtpEncodingParameters::from)
            .collect();
        let ok = unsafe {
            rtp::Rust_setSenderParameters(
                self.checked_rffi()?,
                webrtc::ptr::Borrowed::from_ptr(rffi_encodings.as_ptr()),
                rffi_encodings.len(),
            )
        };
        if ok {
            Ok(())
        } else {
            Err(NativeRtcError::SetRtpParameters.into())
        }
    }

    /// Releases the native RtpSender. Fails if already disposed.
    pub fn dispose(&mut self) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("RtpSender").into());
        }
        self.rffi = webrtc::Arc::null();
        Ok(())
    }
}

/// Rust wrapper around WebRTC C++ RtpReceiver object.
#[derive(Clone, Debug)]
pub struct RtpReceiver {
    rffi: webrtc::Arc<RffiRtpReceiver>,
}

impl RtpReceiver {
    pub fn new(rffi: webrtc::Arc<RffiRtpReceiver>) -> Self {
        Self { rffi }
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiRtpReceiver> {
        &self.rffi
    }

    fn checked_rffi(&self) -> Result<webrtc::ptr::BorrowedRc<RffiRtpReceiver>> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("RtpReceiver").into());
        }
        Ok(self.rffi.as_borrowed())
    }

    pub fn media_type(&self) -> Result<MediaType> {
        let raw = unsafe { rtp::Rust_getReceiverMediaType(self.checked_rffi()?) };
        match raw {
            0 => Ok(MediaType::Audio),
            _ => Ok(MediaType::Video),
        }
    }

    pub fn track_id(&self) -> Result<u32> {
        Ok(unsafe { rtp::Rust_getReceiverTrackIdAsUint32(self.checked_rffi()?) })
    }

    /// Releases the native RtpReceiver. Fails if already disposed.
    pub fn dispose(&mut self) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("RtpReceiver").into());
        }
        self.rffi = webrtc::Arc::null();
        Ok(())
    }
}
