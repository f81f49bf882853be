//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of the WebRTC DataChannel.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::Mutex;

use libc::strdup;

use crate::webrtc;
use crate::webrtc::data_channel_observer::DataChannelObserverCallbacks;

struct DataChannelObserverRegistration {
    observer: *const c_void,
    callbacks: DataChannelObserverCallbacks,
}

// The observer pointer is only touched from test threads.
unsafe impl Send for DataChannelObserverRegistration {}

/// Simulation type for C++ DataChannel.
pub struct RffiDataChannel {
    label: CString,
    id: i32,
    // DataChannelState as i32; starts Open so sends succeed.
    state: AtomicI32,
    buffered_amount: AtomicU64,
    sent: Mutex<Vec<Vec<u8>>>,
    observer: Mutex<Option<DataChannelObserverRegistration>>,
}

impl webrtc::RefCounted for RffiDataChannel {}

impl RffiDataChannel {
    /// Test hook: every payload sent on this channel.
    pub fn sent_messages(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    /// Test hook: pretends the transport has queued bytes.
    pub fn set_buffered_amount(&self, amount: u64) {
        self.buffered_amount.store(amount, Ordering::SeqCst);
    }

    /// Test hook: drives the registered observer's state callback.
    pub fn inject_state_change(&self, state: i32) {
        self.state.store(state, Ordering::SeqCst);
        let registration = self.observer.lock().unwrap();
        if let Some(registration) = &*registration {
            (registration.callbacks.onStateChange)(
                webrtc::ptr::Borrowed::from_ptr(registration.observer),
                state,
            );
        }
    }

    /// Test hook: drives the registered observer's message callback.
    pub fn inject_message(&self, message: &[u8]) {
        let registration = self.observer.lock().unwrap();
        if let Some(registration) = &*registration {
            (registration.callbacks.onMessage)(
                webrtc::ptr::Borrowed::from_ptr(registration.observer),
                webrtc::ptr::Borrowed::from_ptr(message.as_ptr()),
                message.len(),
            );
        }
    }
}

pub(crate) fn new_data_channel(label: &str) -> *const RffiDataChannel {
    Box::into_raw(Box::new(RffiDataChannel {
        label: CString::new(label).expect("CString of label"),
        id: 0,
        state: AtomicI32::new(1), // Open
        buffered_amount: AtomicU64::new(0),
        sent: Mutex::new(Vec::new()),
        observer: Mutex::new(None),
    }))
}

/// Simulation type for the engine-side DataChannelObserver.
pub struct RffiDataChannelObserver {
    _observer: *const c_void,
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_dataChannelGetLabel(
    data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
) -> *const c_char {
    debug!("Rust_dataChannelGetLabel()");
    match data_channel.as_ref() {
        Some(data_channel) => strdup(data_channel.label.as_ptr()),
        None => ptr::null(),
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_dataChannelGetId(
    data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
) -> i32 {
    debug!("Rust_dataChannelGetId()");
    data_channel
        .as_ref()
        .map(|data_channel| data_channel.id)
        .unwrap_or(-1)
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_dataChannelGetState(
    data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
) -> i32 {
    debug!("Rust_dataChannelGetState()");
    data_channel
        .as_ref()
        .map(|data_channel| data_channel.state.load(Ordering::SeqCst))
        .unwrap_or(3) // Closed
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_dataChannelGetBufferedAmount(
    data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
) -> u64 {
    debug!("Rust_dataChannelGetBufferedAmount()");
    data_channel
        .as_ref()
        .map(|data_channel| data_channel.buffered_amount.load(Ordering::SeqCst))
        .unwrap_or(0)
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_dataChannelSend(
    data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
    data: webrtc::ptr::Borrowed<u8>,
    data_size: usize,
    _binary: bool,
) -> bool {
    debug!("Rust_dataChannelSend({} bytes)", data_size);
    match data_channel.as_ref() {
        Some(data_channel) => {
            if data_channel.state.load(Ordering::SeqCst) != 1 {
                return false;
            }
            let payload = std::slice::from_raw_parts(data.as_ptr(), data_size).to_vec();
            data_channel.sent.lock().unwrap().push(payload);
            true
        }
        None => false,
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_registerDataChannelObserver(
    data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
    observer: webrtc::ptr::Borrowed<c_void>,
    callbacks: webrtc::ptr::Borrowed<c_void>,
) -> webrtc::ptr::Unique<RffiDataChannelObserver> {
    info!("Rust_registerDataChannelObserver():");
    let callbacks = *(callbacks.as_ptr() as *const DataChannelObserverCallbacks);
    if let Some(data_channel) = data_channel.as_ref() {
        *data_channel.observer.lock().unwrap() = Some(DataChannelObserverRegistration {
            observer: observer.as_ptr(),
            callbacks,
        });
    }
    webrtc::ptr::Unique::from_ptr(Box::into_raw(Box::new(RffiDataChannelObserver {
        _observer: observer.as_ptr(),
    })))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_unregisterDataChannelObserver(
    data_channel: webrtc::ptr::BorrowedRc<RffiDataChannel>,
    observer: webrtc::ptr::Unique<RffiDataChannelObserver>,
) {
    info!("Rust_unregisterDataChannelObserver():");
    if let Some(data_channel) = data_channel.as_ref() {
        *data_channel.observer.lock().unwrap() = None;
    }
    if !observer.is_null() {
        drop(Box::from_raw(observer.as_mut_ptr()));
    }
}
