//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC Data Channel.

use std::ffi::CStr;
use std::fmt;

use bytes::Bytes;
use num_enum::TryFromPrimitive;

use crate::common::Result;
use crate::error::NativeRtcError;
use crate::webrtc;

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::data_channel as dc;
#[cfg(not(feature = "sim"))]
pub use crate::webrtc::ffi::data_channel::RffiDataChannel;

#[cfg(feature = "sim")]
use crate::webrtc::sim::data_channel as dc;
#[cfg(feature = "sim")]
pub use crate::webrtc::sim::data_channel::RffiDataChannel;

/// Rust version of WebRTC RTCDataChannelState.
///
/// See [RTCDataChannelState](https://www.w3.org/TR/webrtc/#dom-rtcdatachannelstate)
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum DataChannelState {
    Connecting = 0,
    Open,
    Closing,
    Closed,
}

/// Rust wrapper around WebRTC C++ DataChannel object.
pub struct DataChannel {
    rffi: webrtc::Arc<RffiDataChannel>,
}

impl fmt::Debug for DataChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataChannel({:?})", self.rffi)
    }
}

impl DataChannel {
    pub fn new(rffi: webrtc::Arc<RffiDataChannel>) -> Self {
        Self { rffi }
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiDataChannel> {
        &self.rffi
    }

    fn checked_rffi(&self) -> Result<webrtc::ptr::BorrowedRc<RffiDataChannel>> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("DataChannel").into());
        }
        Ok(self.rffi.as_borrowed())
    }

    /// The label the channel was negotiated with.
    pub fn label(&self) -> Result<String> {
        let label_ptr = unsafe { dc::Rust_dataChannelGetLabel(self.checked_rffi()?) };
        if label_ptr.is_null() {
            return Err(NativeRtcError::NullPointer(
                "DataChannel::label()".to_string(),
                "label".to_string(),
            )
            .into());
        }
        let label = unsafe { CStr::from_ptr(label_ptr).to_string_lossy().into_owned() };
        unsafe { libc::free(label_ptr as *mut libc::c_void) };
        Ok(label)
    }

    /// The channel's negotiated stream id, or None before negotiation.
    pub fn id(&self) -> Result<Option<u16>> {
        let raw = unsafe { dc::Rust_dataChannelGetId(self.checked_rffi()?) };
        if raw < 0 {
            Ok(None)
        } else {
            Ok(Some(raw as u16))
        }
    }

    pub fn state(&self) -> Result<DataChannelState> {
        let raw = unsafe { dc::Rust_dataChannelGetState(self.checked_rffi()?) };
        DataChannelState::try_from(raw)
            .map_err(|_| NativeRtcError::UnknownDataChannelState(raw).into())
    }

    /// Bytes queued engine-side but not yet handed to the transport.
    pub fn buffered_amount(&self) -> Result<u64> {
        Ok(unsafe { dc::Rust_dataChannelGetBufferedAmount(self.checked_rffi()?) })
    }

    /// Send data via the DataChannel, as a binary message.
    pub fn send_data(&self, bytes: &Bytes) -> Result<()> {
        let result = unsafe {
            dc::Rust_dataChannelSend(
                self.checked_rffi()?,
                webrtc::ptr::Borrowed::from_ptr(bytes.as_ptr()),
                bytes.len(),
                true,
            )
        };

        if result {
            Ok(())
        } else {
            Err(NativeRtcError::DataChannelSend.into())
        }
    }

    /// Releases the native DataChannel. Fails if already disposed.
    pub fn dispose(&mut self) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("DataChannel").into());
        }
        self.rffi = webrtc::Arc::null();
        Ok(())
    }
}
