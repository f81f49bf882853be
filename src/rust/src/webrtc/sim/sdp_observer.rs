//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of the Create / Set Session Description interface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::ptr;

use libc::strdup;

use crate::webrtc;
use crate::webrtc::sdp_observer::{
    CreateSessionDescriptionObserver, CreateSessionDescriptionObserverCallbacks,
    SetSessionDescriptionObserver, SetSessionDescriptionObserverCallbacks,
};

pub static FAKE_SDP: &str = "FAKE SDP";
pub static FAKE_SDP_OFFER: &str = "FAKE SDP OFFER";
pub static FAKE_SDP_ANSWER: &str = "FAKE SDP ANSWER";

/// Simulation type for SessionDescriptionInterface.
pub struct RffiSessionDescription {
    sdp: &'static str,
}

fn leak_description(sdp: &'static str) -> *mut RffiSessionDescription {
    Box::into_raw(Box::new(RffiSessionDescription { sdp }))
}

/// Simulation type for CreateSessionDescriptionObserverRffi.
pub struct RffiCreateSessionDescriptionObserver {
    _observer: *const c_void,
}

impl webrtc::RefCounted for RffiCreateSessionDescriptionObserver {}

/// Simulation type for SetSessionDescriptionObserverRffi.
pub struct RffiSetSessionDescriptionObserver {
    _observer: *const c_void,
}

impl webrtc::RefCounted for RffiSetSessionDescriptionObserver {}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createCreateSessionDescriptionObserver(
    csd_observer: webrtc::ptr::Borrowed<c_void>,
    callbacks: webrtc::ptr::Borrowed<c_void>,
) -> webrtc::ptr::OwnedRc<RffiCreateSessionDescriptionObserver> {
    info!("Rust_createCreateSessionDescriptionObserver():");

    // Hit the onSuccess() callback with a fake description.
    let callbacks = &*(callbacks.as_ptr() as *const CreateSessionDescriptionObserverCallbacks);
    (callbacks.onSuccess)(
        webrtc::ptr::Borrowed::from_ptr(
            csd_observer.as_ptr() as *const CreateSessionDescriptionObserver
        ),
        webrtc::ptr::Owned::from_ptr(leak_description(FAKE_SDP)),
    );

    webrtc::ptr::OwnedRc::from_ptr(Box::into_raw(Box::new(
        RffiCreateSessionDescriptionObserver {
            _observer: csd_observer.as_ptr(),
        },
    )))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createSetSessionDescriptionObserver(
    ssd_observer: webrtc::ptr::Borrowed<c_void>,
    callbacks: webrtc::ptr::Borrowed<c_void>,
) -> webrtc::ptr::OwnedRc<RffiSetSessionDescriptionObserver> {
    info!("Rust_createSetSessionDescriptionObserver():");

    // Hit the onSuccess() callback
    let callbacks = &*(callbacks.as_ptr() as *const SetSessionDescriptionObserverCallbacks);
    (callbacks.onSuccess)(webrtc::ptr::Borrowed::from_ptr(
        ssd_observer.as_ptr() as *const SetSessionDescriptionObserver
    ));

    webrtc::ptr::OwnedRc::from_ptr(Box::into_raw(Box::new(RffiSetSessionDescriptionObserver {
        _observer: ssd_observer.as_ptr(),
    })))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_toSdp(
    session_description: webrtc::ptr::Borrowed<RffiSessionDescription>,
) -> *const c_char {
    info!("Rust_toSdp():");
    match session_description.as_ref() {
        Some(session_description) => match CString::new(session_description.sdp) {
            Ok(cstr) => strdup(cstr.as_ptr()),
            Err(_) => ptr::null(),
        },
        None => ptr::null(),
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_offerFromSdp(
    _sdp: webrtc::ptr::Borrowed<c_char>,
) -> webrtc::ptr::Unique<RffiSessionDescription> {
    info!("Rust_offerFromSdp():");
    webrtc::ptr::Unique::from_ptr(leak_description(FAKE_SDP_OFFER))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_answerFromSdp(
    _sdp: webrtc::ptr::Borrowed<c_char>,
) -> webrtc::ptr::Unique<RffiSessionDescription> {
    info!("Rust_answerFromSdp():");
    webrtc::ptr::Unique::from_ptr(leak_description(FAKE_SDP_ANSWER))
}
