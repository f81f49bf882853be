//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC Peer Connection Observer Interface.

use std::ffi::c_void;
use std::fmt;

use crate::common::Result;
use crate::error::NativeRtcError;
use crate::webrtc;
use crate::webrtc::data_channel::DataChannel;
use crate::webrtc::ice_candidate::{IceCandidate, RffiIceCandidate};
use crate::webrtc::media::{MediaStream, RffiMediaStream};
use crate::webrtc::peer_connection::RffiDataChannel;

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::peer_connection_observer as pc_observer;
#[cfg(not(feature = "sim"))]
pub use crate::webrtc::ffi::peer_connection_observer::RffiPeerConnectionObserver;

#[cfg(feature = "sim")]
use crate::webrtc::sim::peer_connection_observer as pc_observer;
#[cfg(feature = "sim")]
pub use crate::webrtc::sim::peer_connection_observer::RffiPeerConnectionObserver;

/// Rust version of WebRTC RTCSignalingState enum
///
/// See [RTCSignalingState](https://www.w3.org/TR/webrtc/#rtcsignalingstate-enum)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveLocalPrAnswer,
    HaveRemoteOffer,
    HaveRemotePrAnswer,
    Closed,
}

/// Rust version of WebRTC RTCIceGatheringState enum
///
/// See [RTCIceGatheringState](https://www.w3.org/TR/webrtc/#rtcicegatheringstate-enum)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IceGatheringState {
    New,
    Gathering,
    Complete,
}

/// Rust version of WebRTC RTCIceConnectionState enum
///
/// See [RTCIceConnectionState](https://w3c.github.io/webrtc-pc/#dom-rtciceconnectionstate)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Failed,
    Disconnected,
    Closed,
    Max,
}

/// The callbacks an application registers for engine-side events.
///
/// These run on engine threads and must not block.
pub trait PeerConnectionObserverTrait {
    fn log_id(&self) -> &dyn fmt::Display;

    fn handle_ice_candidate_gathered(&mut self, ice_candidate: IceCandidate) -> Result<()>;

    fn handle_ice_candidates_removed(&mut self, removed: Vec<IceCandidate>) -> Result<()> {
        debug!("handle_ice_candidates_removed(): {} candidates", removed.len());
        Ok(())
    }

    fn handle_ice_connection_state_changed(&mut self, new_state: IceConnectionState) -> Result<()>;

    fn handle_signaling_state_changed(&mut self, new_state: SignalingState) -> Result<()> {
        debug!("handle_signaling_state_changed(): {:?}", new_state);
        Ok(())
    }

    fn handle_ice_gathering_state_changed(&mut self, new_state: IceGatheringState) -> Result<()> {
        debug!("handle_ice_gathering_state_changed(): {:?}", new_state);
        Ok(())
    }

    fn handle_incoming_media_added(&mut self, incoming_stream: MediaStream) -> Result<()>;

    fn handle_incoming_data_channel(&mut self, data_channel: DataChannel) -> Result<()>;

    fn handle_renegotiation_needed(&mut self) -> Result<()> {
        debug!("handle_renegotiation_needed()");
        Ok(())
    }
}

/// PeerConnectionObserver OnIceCandidate() callback.
#[allow(non_snake_case)]
extern "C" fn pc_observer_OnIceCandidate<T>(
    observer: webrtc::ptr::Borrowed<c_void>,
    candidate: webrtc::ptr::Borrowed<RffiIceCandidate>,
) where
    T: PeerConnectionObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() {
        error!("pc_observer_OnIceCandidate(): null observer");
        return;
    }
    let observer = unsafe { &mut *observer };
    match unsafe { candidate.as_ref() } {
        Some(candidate) => {
            let ice_candidate = IceCandidate::from(candidate);
            observer
                .handle_ice_candidate_gathered(ice_candidate)
                .unwrap_or_else(|e| error!("Problems handling ice candidate: {}", e));
        }
        None => {
            error!("pc_observer_OnIceCandidate(): null candidate");
        }
    }
}

/// PeerConnectionObserver OnIceCandidatesRemoved() callback.
#[allow(non_snake_case)]
extern "C" fn pc_observer_OnIceCandidatesRemoved<T>(
    observer: webrtc::ptr::Borrowed<c_void>,
    removed: webrtc::ptr::Borrowed<RffiIceCandidate>,
    removed_size: usize,
) where
    T: PeerConnectionObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() {
        return;
    }
    let observer = unsafe { &mut *observer };
    let removed = if removed.is_null() || removed_size == 0 {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(removed.as_ptr(), removed_size) }
            .iter()
            .map(IceCandidate::from)
            .collect()
    };
    observer
        .handle_ice_candidates_removed(removed)
        .unwrap_or_else(|e| error!("Problems handling removed ice candidates: {}", e));
}

/// PeerConnectionObserver OnSignalingChange() callback.
#[allow(non_snake_case)]
extern "C" fn pc_observer_OnSignalingChange<T>(
    observer: webrtc::ptr::Borrowed<c_void>,
    new_state: SignalingState,
) where
    T: PeerConnectionObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() {
        return;
    }
    let observer = unsafe { &mut *observer };
    observer
        .handle_signaling_state_changed(new_state)
        .unwrap_or_else(|e| error!("Problems handling signaling change: {}", e));
}

/// PeerConnectionObserver OnIceConnectionChange() callback.
#[allow(non_snake_case)]
extern "C" fn pc_observer_OnIceConnectionChange<T>(
    observer: webrtc::ptr::Borrowed<c_void>,
    new_state: IceConnectionState,
) where
    T: PeerConnectionObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() {
        return;
    }
    let observer = unsafe { &mut *observer };
    observer
        .handle_ice_connection_state_changed(new_state)
        .unwrap_or_else(|e| error!("Problems handling ice connection change: {}", e));
}

/// PeerConnectionObserver OnIceGatheringChange() callback.
#[allow(non_snake_case)]
extern "C" fn pc_observer_OnIceGatheringChange<T>(
    observer: webrtc::ptr::Borrowed<c_void>,
    new_state: IceGatheringState,
) where
    T: PeerConnectionObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() {
        return;
    }
    let observer = unsafe { &mut *observer };
    observer
        .handle_ice_gathering_state_changed(new_state)
        .unwrap_or_else(|e| error!("Problems handling ice gathering change: {}", e));
}

/// PeerConnectionObserver OnAddStream() callback.
#[allow(non_snake_case)]
extern "C" fn pc_observer_OnAddStream<T>(
    observer: webrtc::ptr::Borrowed<c_void>,
    native_stream: webrtc::ptr::OwnedRc<RffiMediaStream>,
) where
    T: PeerConnectionObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() {
        return;
    }
    let observer = unsafe { &mut *observer };
    let stream = MediaStream::new(webrtc::Arc::from_owned(native_stream));
    observer
        .handle_incoming_media_added(stream)
        .unwrap_or_else(|e| error!("Problems handling incoming media: {}", e));
}

/// PeerConnectionObserver OnDataChannel() callback.
#[allow(non_snake_case)]
extern "C" fn pc_observer_OnDataChannel<T>(
    observer: webrtc::ptr::Borrowed<c_void>,
    rffi_data_channel: webrtc::ptr::OwnedRc<RffiDataChannel>,
) where
    T: PeerConnectionObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() {
        return;
    }
    let observer = unsafe { &mut *observer };
    let data_channel = DataChannel::new(webrtc::Arc::from_owned(rffi_data_channel));
    observer
        .handle_incoming_data_channel(data_channel)
        .unwrap_or_else(|e| error!("Problems handling incoming data channel: {}", e));
}

/// PeerConnectionObserver OnRenegotiationNeeded() callback.
#[allow(non_snake_case)]
extern "C" fn pc_observer_OnRenegotiationNeeded<T>(observer: webrtc::ptr::Borrowed<c_void>)
where
    T: PeerConnectionObserverTrait,
{
    let observer = observer.as_ptr() as *mut T;
    if observer.is_null() {
        return;
    }
    let observer = unsafe { &mut *observer };
    observer
        .handle_renegotiation_needed()
        .unwrap_or_else(|e| error!("Problems handling renegotiation: {}", e));
}

/// PeerConnectionObserver callback function pointers.
///
/// A structure containing function pointers for each PeerConnection event
/// callback.
#[repr(C)]
#[allow(non_snake_case)]
#[derive(Clone, Copy)]
pub struct PeerConnectionObserverCallbacks {
    pub onIceCandidate:
        extern "C" fn(webrtc::ptr::Borrowed<c_void>, webrtc::ptr::Borrowed<RffiIceCandidate>),
    pub onIceCandidatesRemoved:
        extern "C" fn(webrtc::ptr::Borrowed<c_void>, webrtc::ptr::Borrowed<RffiIceCandidate>, usize),
    pub onSignalingChange: extern "C" fn(webrtc::ptr::Borrowed<c_void>, SignalingState),
    pub onIceConnectionChange: extern "C" fn(webrtc::ptr::Borrowed<c_void>, IceConnectionState),
    pub onIceGatheringChange: extern "C" fn(webrtc::ptr::Borrowed<c_void>, IceGatheringState),
    pub onAddStream:
        extern "C" fn(webrtc::ptr::Borrowed<c_void>, webrtc::ptr::OwnedRc<RffiMediaStream>),
    pub onDataChannel:
        extern "C" fn(webrtc::ptr::Borrowed<c_void>, webrtc::ptr::OwnedRc<RffiDataChannel>),
    pub onRenegotiationNeeded: extern "C" fn(webrtc::ptr::Borrowed<c_void>),
}

/// Rust wrapper around the engine-side PeerConnectionObserver.
///
/// The native observer is *not* owned by the native PeerConnection; the
/// Rust PeerConnection keeps it alive for as long as the engine may call
/// back into it.
pub struct PeerConnectionObserver<T>
where
    T: PeerConnectionObserverTrait,
{
    rffi: webrtc::ptr::Unique<RffiPeerConnectionObserver>,
    _observer_type: std::marker::PhantomData<T>,
}

impl<T> PeerConnectionObserver<T>
where
    T: PeerConnectionObserverTrait,
{
    /// Creates the native observer around the application's trait object.
    ///
    /// # Safety
    ///
    /// `observer` must outlive the native PeerConnection this gets attached
    /// to; the engine calls back through it from its worker threads.
    pub unsafe fn new(observer: webrtc::ptr::Borrowed<T>) -> Result<Self> {
        debug!("PeerConnectionObserver::new()");

        let callbacks = PeerConnectionObserverCallbacks {
            onIceCandidate: pc_observer_OnIceCandidate::<T>,
            onIceCandidatesRemoved: pc_observer_OnIceCandidatesRemoved::<T>,
            onSignalingChange: pc_observer_OnSignalingChange::<T>,
            onIceConnectionChange: pc_observer_OnIceConnectionChange::<T>,
            onIceGatheringChange: pc_observer_OnIceGatheringChange::<T>,
            onAddStream: pc_observer_OnAddStream::<T>,
            onDataChannel: pc_observer_OnDataChannel::<T>,
            onRenegotiationNeeded: pc_observer_OnRenegotiationNeeded::<T>,
        };
        let callbacks_ptr = &callbacks as *const PeerConnectionObserverCallbacks;

        let rffi = pc_observer::Rust_createPeerConnectionObserver(
            webrtc::ptr::Borrowed::from_ptr(observer.as_ptr() as *const c_void),
            webrtc::ptr::Borrowed::from_ptr(callbacks_ptr as *const c_void),
        );
        if rffi.is_null() {
            return Err(NativeRtcError::CreatePeerConnectionObserver.into());
        }
        Ok(Self {
            rffi,
            _observer_type: std::marker::PhantomData,
        })
    }

    /// Passes ownership of the native observer to the Rust PeerConnection.
    pub fn into_rffi(mut self) -> webrtc::ptr::Unique<RffiPeerConnectionObserver> {
        self.rffi.take()
    }
}
