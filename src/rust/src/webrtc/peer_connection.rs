//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC Peer Connection Interface.

use std::ffi::CString;

use crate::common::{units::DataRate, Result};
use crate::error::NativeRtcError;
use crate::webrtc;
use crate::webrtc::data_channel::DataChannel;
use crate::webrtc::ice_candidate::{IceCandidate, RffiIceCandidate};
use crate::webrtc::peer_connection_factory::RffiPeerConnectionFactoryOwner;
use crate::webrtc::peer_connection_observer::RffiPeerConnectionObserver;
use crate::webrtc::rtp::{RffiRtpReceiver, RffiRtpSender, RtpReceiver, RtpSender};
use crate::webrtc::sdp_observer::{
    CreateSessionDescriptionObserver, SessionDescription, SetSessionDescriptionObserver,
};
use crate::webrtc::stats_observer::StatsObserver;

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::peer_connection as pc;
#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::peer_connection_observer as pc_observer;

#[cfg(feature = "sim")]
use crate::webrtc::sim::peer_connection as pc;
#[cfg(feature = "sim")]
use crate::webrtc::sim::peer_connection_observer as pc_observer;

pub use crate::webrtc::data_channel::RffiDataChannel;
pub use pc::RffiPeerConnection;

/// Rust wrapper around WebRTC C++ PeerConnection object.
#[derive(Debug)]
pub struct PeerConnection {
    rffi: webrtc::Arc<RffiPeerConnection>,
    // We keep this around as an easy way to make sure the PeerConnectionFactory
    // outlives the PeerConnection.  A PCF must outlive a PC because the PCF
    // owns the threads that the PC relies on.  If the PCF closes those threads,
    // not only will the PC do nothing, but methods called on it will block
    // indefinitely.
    _owner: Option<webrtc::Arc<RffiPeerConnectionFactoryOwner>>,

    // The native PeerConnectionObserver is not owned by the native
    // PeerConnection, so we hold it here and delete it after the
    // PeerConnection is gone.
    rffi_pc_observer: Option<webrtc::ptr::Unique<RffiPeerConnectionObserver>>,
}

impl Drop for PeerConnection {
    fn drop(&mut self) {
        // Delete the rffi before the observer and the _owner.
        self.rffi = webrtc::Arc::null();

        if let Some(mut observer) = self.rffi_pc_observer.take() {
            unsafe { pc_observer::Rust_deletePeerConnectionObserver(observer.take()) };
        }
    }
}

// See PeerConnection::set_send_rates for more info.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SendRates {
    pub min: Option<DataRate>,
    pub start: Option<DataRate>,
    pub max: Option<DataRate>,
}

impl PeerConnection {
    pub fn new(
        rffi: webrtc::Arc<RffiPeerConnection>,
        rffi_pc_observer: Option<webrtc::ptr::Unique<RffiPeerConnectionObserver>>,
        owner: Option<webrtc::Arc<RffiPeerConnectionFactoryOwner>>,
    ) -> Self {
        Self {
            rffi,
            rffi_pc_observer,
            _owner: owner,
        }
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiPeerConnection> {
        &self.rffi
    }

    fn checked_rffi(&self) -> Result<webrtc::ptr::BorrowedRc<RffiPeerConnection>> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("PeerConnection").into());
        }
        Ok(self.rffi.as_borrowed())
    }

    /// Rust wrapper around C++ webrtc::CreateSessionDescription(kOffer).
    pub fn create_offer(&self, csd_observer: &CreateSessionDescriptionObserver) -> Result<()> {
        unsafe { pc::Rust_createOffer(self.checked_rffi()?, csd_observer.rffi().as_borrowed()) };
        Ok(())
    }

    /// Rust wrapper around C++ webrtc::CreateSessionDescription(kAnswer).
    pub fn create_answer(&self, csd_observer: &CreateSessionDescriptionObserver) -> Result<()> {
        unsafe { pc::Rust_createAnswer(self.checked_rffi()?, csd_observer.rffi().as_borrowed()) };
        Ok(())
    }

    /// Rust wrapper around C++ PeerConnection::SetLocalDescription().
    pub fn set_local_description(
        &self,
        ssd_observer: &SetSessionDescriptionObserver,
        session_description: SessionDescription,
    ) -> Result<()> {
        // Rust_setLocalDescription takes ownership of the description; we
        // take the rffi out so the SessionDescription doesn't double delete.
        unsafe {
            pc::Rust_setLocalDescription(
                self.checked_rffi()?,
                ssd_observer.rffi().as_borrowed(),
                session_description.take_rffi(),
            )
        };
        Ok(())
    }

    /// Rust wrapper around C++ PeerConnection::SetRemoteDescription().
    pub fn set_remote_description(
        &self,
        ssd_observer: &SetSessionDescriptionObserver,
        session_description: SessionDescription,
    ) -> Result<()> {
        // Rust_setRemoteDescription takes ownership of the description; we
        // take the rffi out so the SessionDescription doesn't double delete.
        unsafe {
            pc::Rust_setRemoteDescription(
                self.checked_rffi()?,
                ssd_observer.rffi().as_borrowed(),
                session_description.take_rffi(),
            )
        };
        Ok(())
    }

    /// Does something like:
    /// let sender = pc.get_audio_sender();
    /// sender.set_parameters({active: enabled});
    /// Which disables/enables the sending of any audio.
    /// Must be called *after* the answer has been set via
    /// set_remote_description or set_local_description.
    pub fn set_outgoing_media_enabled(&self, enabled: bool) -> Result<()> {
        unsafe { pc::Rust_setOutgoingMediaEnabled(self.checked_rffi()?, enabled) };
        Ok(())
    }

    pub fn set_incoming_media_enabled(&self, enabled: bool) -> Result<()> {
        unsafe { pc::Rust_setIncomingMediaEnabled(self.checked_rffi()?, enabled) };
        Ok(())
    }

    /// Rust wrapper around C++ PeerConnection::CreateDataChannel().
    pub fn create_data_channel(&self, label: &str) -> Result<DataChannel> {
        let label_c = CString::new(label)?;
        let rffi_data_channel = webrtc::Arc::from_owned(unsafe {
            pc::Rust_createDataChannel(
                self.checked_rffi()?,
                webrtc::ptr::Borrowed::from_ptr(label_c.as_ptr()),
            )
        });
        if rffi_data_channel.is_null() {
            return Err(NativeRtcError::CreateDataChannel.into());
        }
        Ok(DataChannel::new(rffi_data_channel))
    }

    /// Rust wrapper around C++ PeerConnection::AddIceCandidate().
    pub fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<()> {
        info!("Remote ICE candidate: {}", candidate);

        let sdp_mid_c = CString::new(candidate.sdp_mid.as_str())?;
        let sdp_c = CString::new(candidate.sdp.as_str())?;
        let rffi_candidate = RffiIceCandidate {
            sdp_mid: webrtc::ptr::Borrowed::from_ptr(sdp_mid_c.as_ptr()),
            sdp_mline_index: candidate.sdp_mline_index,
            sdp: webrtc::ptr::Borrowed::from_ptr(sdp_c.as_ptr()),
        };
        let add_ok = unsafe {
            pc::Rust_addIceCandidate(
                self.checked_rffi()?,
                webrtc::ptr::Borrowed::from_ptr(&rffi_candidate),
            )
        };
        if add_ok {
            Ok(())
        } else {
            Err(NativeRtcError::AddIceCandidate.into())
        }
    }

    /// Rust wrapper around C++ PeerConnection::RemoveIceCandidates().
    pub fn remove_ice_candidates(&self, removed: &[IceCandidate]) -> Result<()> {
        info!("Removing {} remote ICE candidates", removed.len());

        // The CStrings own the text for the duration of the call.
        let strings: Vec<(CString, CString)> = removed
            .iter()
            .map(|candidate| {
                Ok((
                    CString::new(candidate.sdp_mid.as_str())?,
                    CString::new(candidate.sdp.as_str())?,
                ))
            })
            .collect::<Result<_>>()?;
        let rffi_candidates: Vec<RffiIceCandidate> = removed
            .iter()
            .zip(strings.iter())
            .map(|(candidate, (sdp_mid, sdp))| RffiIceCandidate {
                sdp_mid: webrtc::ptr::Borrowed::from_ptr(sdp_mid.as_ptr()),
                sdp_mline_index: candidate.sdp_mline_index,
                sdp: webrtc::ptr::Borrowed::from_ptr(sdp.as_ptr()),
            })
            .collect();
        unsafe {
            pc::Rust_removeIceCandidates(
                self.checked_rffi()?,
                webrtc::ptr::Borrowed::from_ptr(rffi_candidates.as_ptr()),
                rffi_candidates.len(),
            )
        };
        Ok(())
    }

    /// Rust wrapper around C++ PeerConnection::GetStats().
    pub fn get_stats(&self, stats_observer: &StatsObserver) -> Result<()> {
        unsafe { pc::Rust_getStats(self.checked_rffi()?, stats_observer.rffi().as_borrowed()) };
        Ok(())
    }

    // Rust wrapper around C++ PeerConnection::SetBitrate().
    // The meaning is a bit complicated, but it's close to something like:
    // - If you don't set the min, you get a default min which is very low or 0.
    // - If you don't set the max, you get a default max which is high (2mbps or above).
    // - If you don't set the start, you keep it how it is.
    // - The whole thing is no-op unless you change something from the last set of values.
    pub fn set_send_rates(&self, rates: SendRates) -> Result<()> {
        let as_bps = |rate: Option<DataRate>| rate.map(|rate| rate.as_bps() as i32).unwrap_or(-1);
        unsafe {
            pc::Rust_setSendBitrates(
                self.checked_rffi()?,
                as_bps(rates.min),
                as_bps(rates.start),
                as_bps(rates.max),
            )
        };
        Ok(())
    }

    /// The connection's RTP senders, one per outgoing track.
    pub fn senders(&self) -> Result<Vec<RtpSender>> {
        let rffi = self.checked_rffi()?;
        let mut rffi_senders: Vec<webrtc::ptr::OwnedRc<RffiRtpSender>> = Vec::with_capacity(16);
        let mut len = 0usize;
        let len_ptr: *mut usize = &mut len;
        unsafe {
            pc::Rust_getSenders(
                rffi,
                webrtc::ptr::Borrowed::from_ptr(rffi_senders.as_mut_ptr()),
                rffi_senders.capacity(),
                webrtc::ptr::Borrowed::from_ptr(len_ptr as *const usize),
            );
            rffi_senders.set_len(std::ptr::read(len_ptr));
        }
        Ok(rffi_senders
            .into_iter()
            .map(|rffi_sender| RtpSender::new(webrtc::Arc::from_owned(rffi_sender)))
            .collect())
    }

    /// The connection's RTP receivers, one per incoming track.
    pub fn receivers(&self) -> Result<Vec<RtpReceiver>> {
        let rffi = self.checked_rffi()?;
        let mut rffi_receivers: Vec<webrtc::ptr::OwnedRc<RffiRtpReceiver>> = Vec::with_capacity(16);
        let mut len = 0usize;
        let len_ptr: *mut usize = &mut len;
        unsafe {
            pc::Rust_getReceivers(
                rffi,
                webrtc::ptr::Borrowed::from_ptr(rffi_receivers.as_mut_ptr()),
                rffi_receivers.capacity(),
                webrtc::ptr::Borrowed::from_ptr(len_ptr as *const usize),
            );
            rffi_receivers.set_len(std::ptr::read(len_ptr));
        }
        Ok(rffi_receivers
            .into_iter()
            .map(|rffi_receiver| RtpReceiver::new(webrtc::Arc::from_owned(rffi_receiver)))
            .collect())
    }

    pub fn close(&self) -> Result<()> {
        unsafe { pc::Rust_closePeerConnection(self.checked_rffi()?) };
        Ok(())
    }

    /// Releases the native PeerConnection. Fails if already disposed.
    pub fn dispose(&mut self) -> Result<()> {
        if self.rffi.is_null() {
            return Err(NativeRtcError::AlreadyDisposed("PeerConnection").into());
        }
        self.rffi = webrtc::Arc::null();
        Ok(())
    }
}
