//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of the engine-side PeerConnectionObserver.

use std::ffi::c_void;

use crate::webrtc;
use crate::webrtc::data_channel::RffiDataChannel;
use crate::webrtc::ice_candidate::RffiIceCandidate;
use crate::webrtc::media::RffiMediaStream;
use crate::webrtc::peer_connection_observer::{
    IceConnectionState, IceGatheringState, PeerConnectionObserverCallbacks, SignalingState,
};

/// Simulation type for the engine-side observer: it remembers where to call
/// back into Rust, and the tests poke it to simulate engine events.
pub struct RffiPeerConnectionObserver {
    observer: *const c_void,
    callbacks: PeerConnectionObserverCallbacks,
}

impl RffiPeerConnectionObserver {
    pub fn on_ice_candidate(&self, candidate: &RffiIceCandidate) {
        (self.callbacks.onIceCandidate)(
            webrtc::ptr::Borrowed::from_ptr(self.observer),
            webrtc::ptr::Borrowed::from_ptr(candidate),
        );
    }

    pub fn on_ice_candidates_removed(&self, removed: &[RffiIceCandidate]) {
        (self.callbacks.onIceCandidatesRemoved)(
            webrtc::ptr::Borrowed::from_ptr(self.observer),
            webrtc::ptr::Borrowed::from_ptr(removed.as_ptr()),
            removed.len(),
        );
    }

    pub fn on_signaling_change(&self, new_state: SignalingState) {
        (self.callbacks.onSignalingChange)(
            webrtc::ptr::Borrowed::from_ptr(self.observer),
            new_state,
        );
    }

    pub fn on_ice_connection_change(&self, new_state: IceConnectionState) {
        (self.callbacks.onIceConnectionChange)(
            webrtc::ptr::Borrowed::from_ptr(self.observer),
            new_state,
        );
    }

    pub fn on_ice_gathering_change(&self, new_state: IceGatheringState) {
        (self.callbacks.onIceGatheringChange)(
            webrtc::ptr::Borrowed::from_ptr(self.observer),
            new_state,
        );
    }

    pub fn on_add_stream(&self, stream: webrtc::ptr::OwnedRc<RffiMediaStream>) {
        (self.callbacks.onAddStream)(webrtc::ptr::Borrowed::from_ptr(self.observer), stream);
    }

    pub fn on_data_channel(&self, data_channel: webrtc::ptr::OwnedRc<RffiDataChannel>) {
        (self.callbacks.onDataChannel)(
            webrtc::ptr::Borrowed::from_ptr(self.observer),
            data_channel,
        );
    }

    pub fn on_renegotiation_needed(&self) {
        (self.callbacks.onRenegotiationNeeded)(webrtc::ptr::Borrowed::from_ptr(self.observer));
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createPeerConnectionObserver(
    observer: webrtc::ptr::Borrowed<c_void>,
    callbacks: webrtc::ptr::Borrowed<c_void>,
) -> webrtc::ptr::Unique<RffiPeerConnectionObserver> {
    info!("Rust_createPeerConnectionObserver():");
    let callbacks = *(callbacks.as_ptr() as *const PeerConnectionObserverCallbacks);
    webrtc::ptr::Unique::from_ptr(Box::into_raw(Box::new(RffiPeerConnectionObserver {
        observer: observer.as_ptr(),
        callbacks,
    })))
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_deletePeerConnectionObserver(
    observer: webrtc::ptr::Unique<RffiPeerConnectionObserver>,
) {
    info!("Rust_deletePeerConnectionObserver():");
    if !observer.is_null() {
        drop(Box::from_raw(observer.as_mut_ptr()));
    }
}
