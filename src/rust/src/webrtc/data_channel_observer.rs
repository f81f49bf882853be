//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC Data Channel Observer Interface.

use std::ffi::c_void;

use bytes::Bytes;

use crate::common::Result;
use crate::error::NativeRtcError;
use crate::webrtc;
use crate::webrtc::data_channel::{DataChannel, DataChannelState};

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::data_channel as dc;
#[cfg(not(feature = "sim"))]
pub use crate::webrtc::ffi::data_channel::RffiDataChannelObserver;

#[cfg(feature = "sim")]
use crate::webrtc::sim::data_channel as dc;
#[cfg(feature = "sim")]
pub use crate::webrtc::sim::data_channel::RffiDataChannelObserver;

/// The callbacks an application registers for data channel events.
///
/// These run on engine threads and must not block.
pub trait DataChannelObserverTrait {
    fn handle_state_changed(&mut self, state: DataChannelState) -> Result<()>;
    fn handle_message_received(&mut self, message: Bytes) -> Result<()>;
}

/// DataChannelObserver OnStateChange() callback.
#[allow(non_snake_case)]
extern "C" fn dc_observer_OnStateChange<T>(
    observer: webrtc::ptr::Borrowed<c_void>,
    state: i32,
) where
    T: DataChannelObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() {
        return;
    }
    let observer = unsafe { &mut *observer };
    match DataChannelState::try_from(state) {
        Ok(state) => observer
            .handle_state_changed(state)
            .unwrap_or_else(|e| error!("Problems handling data channel state: {}", e)),
        Err(_) => error!("dc_observer_OnStateChange(): unknown state {}", state),
    }
}

/// DataChannelObserver OnMessage() callback.
#[allow(non_snake_case)]
extern "C" fn dc_observer_OnMessage<T>(
    observer: webrtc::ptr::Borrowed<c_void>,
    message: webrtc::ptr::Borrowed<u8>,
    size: usize,
) where
    T: DataChannelObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() || message.is_null() {
        return;
    }
    let observer = unsafe { &mut *observer };
    let message =
        Bytes::copy_from_slice(unsafe { std::slice::from_raw_parts(message.as_ptr(), size) });
    observer
        .handle_message_received(message)
        .unwrap_or_else(|e| error!("Problems handling data channel message: {}", e));
}

/// DataChannelObserver callback function pointers.
#[repr(C)]
#[allow(non_snake_case)]
#[derive(Clone, Copy)]
pub struct DataChannelObserverCallbacks {
    pub onStateChange: extern "C" fn(webrtc::ptr::Borrowed<c_void>, i32),
    pub onMessage: extern "C" fn(webrtc::ptr::Borrowed<c_void>, webrtc::ptr::Borrowed<u8>, usize),
}

/// Rust wrapper around the engine-side DataChannelObserver.
pub struct DataChannelObserver<T>
where
    T: DataChannelObserverTrait,
{
    rffi: webrtc::ptr::Unique<RffiDataChannelObserver>,
    _observer_type: std::marker::PhantomData<T>,
}

impl<T> DataChannelObserver<T>
where
    T: DataChannelObserverTrait,
{
    /// Creates and registers the native observer on a data channel.
    ///
    /// # Safety
    ///
    /// `observer` must outlive this DataChannelObserver; the engine calls
    /// back through it from its worker threads.
    pub unsafe fn register(
        data_channel: &DataChannel,
        observer: webrtc::ptr::Borrowed<T>,
    ) -> Result<Self> {
        let callbacks = DataChannelObserverCallbacks {
            onStateChange: dc_observer_OnStateChange::<T>,
            onMessage: dc_observer_OnMessage::<T>,
        };
        let callbacks_ptr = &callbacks as *const DataChannelObserverCallbacks;

        let rffi = dc::Rust_registerDataChannelObserver(
            data_channel.rffi().as_borrowed(),
            webrtc::ptr::Borrowed::from_ptr(observer.as_ptr() as *const c_void),
            webrtc::ptr::Borrowed::from_ptr(callbacks_ptr as *const c_void),
        );
        if rffi.is_null() {
            return Err(NativeRtcError::CreateDataChannel.into());
        }
        Ok(Self {
            rffi,
            _observer_type: std::marker::PhantomData,
        })
    }

    /// Unregisters and deletes the native observer.
    pub fn unregister(mut self, data_channel: &DataChannel) {
        unsafe {
            dc::Rust_unregisterDataChannelObserver(
                data_channel.rffi().as_borrowed(),
                self.rffi.take(),
            )
        };
    }
}
