//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC Peer Connection Factory.
//!
//! The factory is the process-scoped entry point into the engine. All
//! configuration is passed explicitly at construction; there is no global
//! state on the Rust side of the boundary.

use std::ffi::CString;
use std::os::raw::c_char;

use crate::common::{MediaType, Result};
use crate::error::NativeRtcError;
use crate::webrtc;
use crate::webrtc::field_trial;
use crate::webrtc::media::{AudioTrack, VideoSource, VideoTrack};
use crate::webrtc::peer_connection::PeerConnection;
use crate::webrtc::peer_connection_observer::{
    PeerConnectionObserver, PeerConnectionObserverTrait,
};
use crate::webrtc::rtp::{RffiRtpCodecCapability, RtpCapabilities, RtpCodecCapability};

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::peer_connection_factory as pcf;

#[cfg(feature = "sim")]
use crate::webrtc::sim::peer_connection_factory as pcf;

pub use pcf::{RffiPeerConnectionFactoryInterface, RffiPeerConnectionFactoryOwner};

#[repr(C)]
pub struct RffiIceServer {
    pub username: webrtc::ptr::Borrowed<c_char>,
    pub password: webrtc::ptr::Borrowed<c_char>,
    pub urls: webrtc::ptr::Borrowed<webrtc::ptr::Borrowed<c_char>>,
    pub urls_size: usize,
}

#[derive(Clone, Debug, Default)]
pub struct IceServer {
    username: CString,
    password: CString,
    // To own the strings
    _urls: Vec<CString>,
    // To hand the strings to C
    url_ptrs: Vec<webrtc::ptr::Borrowed<c_char>>,
}

unsafe impl Send for IceServer {}
unsafe impl Sync for IceServer {}

impl IceServer {
    pub fn new(username: String, password: String, urls_in: Vec<String>) -> Self {
        let mut urls = Vec::new();
        for url in urls_in {
            urls.push(CString::new(url).expect("CString of URL"));
        }
        let url_ptrs = urls
            .iter()
            .map(|s| webrtc::ptr::Borrowed::from_ptr(s.as_ptr()))
            .collect();
        Self {
            username: CString::new(username).expect("CString of username"),
            password: CString::new(password).expect("CString of password"),
            _urls: urls,
            url_ptrs,
        }
    }

    pub fn none() -> Self {
        // In the FFI C++, no urls means no IceServer is added
        Self::new(
            "".to_string(), // username
            "".to_string(), // password
            vec![],         // urls
        )
    }

    pub fn rffi(&self) -> RffiIceServer {
        RffiIceServer {
            username: webrtc::ptr::Borrowed::from_ptr(self.username.as_ptr()),
            password: webrtc::ptr::Borrowed::from_ptr(self.password.as_ptr()),
            urls: webrtc::ptr::Borrowed::from_ptr(self.url_ptrs.as_ptr()),
            urls_size: self.url_ptrs.len(),
        }
    }
}

#[repr(C)]
pub struct RffiIceServers {
    pub servers: webrtc::ptr::Borrowed<RffiIceServer>,
    pub servers_size: usize,
}

/// Stays in sync with RffiAudioConfig in peer_connection_factory.h.
#[repr(C)]
pub struct RffiAudioConfig {
    pub high_pass_filter_enabled: bool,
    pub aec_enabled: bool,
    pub ns_enabled: bool,
    pub agc_enabled: bool,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub high_pass_filter_enabled: bool,
    pub aec_enabled: bool,
    pub ns_enabled: bool,
    pub agc_enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            high_pass_filter_enabled: true,
            aec_enabled: true,
            ns_enabled: true,
            agc_enabled: true,
        }
    }
}

impl AudioConfig {
    fn rffi(&self) -> RffiAudioConfig {
        RffiAudioConfig {
            high_pass_filter_enabled: self.high_pass_filter_enabled,
            aec_enabled: self.aec_enabled,
            ns_enabled: self.ns_enabled,
            agc_enabled: self.agc_enabled,
        }
    }
}

/// Stays in sync with RffiAudioJitterBufferConfig in peer_connection_factory.h.
#[repr(C)]
pub struct RffiAudioJitterBufferConfig {
    pub max_packets: i32,
    pub min_delay_ms: i32,
    pub max_target_delay_ms: i32,
    pub fast_accelerate: bool,
}

#[derive(Clone, Debug)]
pub struct AudioJitterBufferConfig {
    pub max_packets: i32,
    pub min_delay_ms: i32,
    pub max_target_delay_ms: i32,
    pub fast_accelerate: bool,
}

impl Default for AudioJitterBufferConfig {
    fn default() -> Self {
        Self {
            max_packets: 50,
            min_delay_ms: 0,
            max_target_delay_ms: 500,
            fast_accelerate: false,
        }
    }
}

impl AudioJitterBufferConfig {
    fn rffi(&self) -> RffiAudioJitterBufferConfig {
        RffiAudioJitterBufferConfig {
            max_packets: self.max_packets,
            min_delay_ms: self.min_delay_ms,
            max_target_delay_ms: self.max_target_delay_ms,
            fast_accelerate: self.fast_accelerate,
        }
    }
}

/// Everything the engine needs at initialization time.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub audio_config: AudioConfig,
    pub audio_jitter_buffer_config: AudioJitterBufferConfig,
    /// Engine field trials, applied before the factory is created.
    pub field_trials: Vec<(String, String)>,
}

/// Rust wrapper around WebRTC C++ PeerConnectionFactory object.
#[derive(Clone, Debug)]
pub struct PeerConnectionFactory {
    rffi: webrtc::Arc<RffiPeerConnectionFactoryOwner>,
}

impl PeerConnectionFactory {
    /// Create a new Rust PeerConnectionFactory object from a WebRTC C++
    /// PeerConnectionFactory object.
    pub fn new(config: &Config) -> Result<Self> {
        debug!("PeerConnectionFactory::new()");

        field_trial::set(&config.field_trials)?;

        let rffi = webrtc::Arc::from_owned(unsafe {
            pcf::Rust_createPeerConnectionFactory(webrtc::ptr::Borrowed::from_ptr(
                &config.audio_config.rffi(),
            ))
        });
        if rffi.is_null() {
            return Err(NativeRtcError::CreatePeerConnectionFactory.into());
        }
        Ok(Self { rffi })
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiPeerConnectionFactoryOwner> {
        &self.rffi
    }

    /// Wrap an existing C++ PeerConnectionFactory (not a PeerConnectionFactoryOwner).
    ///
    /// # Safety
    ///
    /// `native` must point to a C++ PeerConnectionFactory.
    pub unsafe fn from_native_factory(
        native: webrtc::Arc<RffiPeerConnectionFactoryInterface>,
    ) -> Self {
        let rffi = webrtc::Arc::from_owned(pcf::Rust_createPeerConnectionFactoryWrapper(
            native.as_borrowed(),
        ));
        Self { rffi }
    }

    pub fn create_peer_connection<T: PeerConnectionObserverTrait>(
        &self,
        pc_observer: PeerConnectionObserver<T>,
        audio_jitter_buffer_config: &AudioJitterBufferConfig,
        ice_servers: &[IceServer],
        outgoing_audio_track: &AudioTrack,
        outgoing_video_track: Option<&VideoTrack>,
    ) -> Result<PeerConnection> {
        debug!(
            "PeerConnectionFactory::create_peer_connection() {:?}",
            self.rffi
        );
        // The RffiPeerConnectionObserver is *not* passed as owned by
        // Rust_createPeerConnection, so we need to keep it alive for as long
        // as the native PeerConnection is alive. We do this by handing it to
        // the Rust-level PeerConnection and letting it own it.
        let pc_observer_rffi = pc_observer.into_rffi();
        let servers: Vec<RffiIceServer> = ice_servers.iter().map(|s| s.rffi()).collect();
        let rffi_ice_servers = RffiIceServers {
            servers: webrtc::ptr::Borrowed::from_ptr(servers.as_ptr()),
            servers_size: servers.len(),
        };

        let rffi = webrtc::Arc::from_owned(unsafe {
            pcf::Rust_createPeerConnection(
                self.rffi.as_borrowed(),
                pc_observer_rffi.borrow(),
                webrtc::ptr::Borrowed::from_ptr(&audio_jitter_buffer_config.rffi()),
                webrtc::ptr::Borrowed::from_ptr(&rffi_ice_servers),
                outgoing_audio_track.rffi().as_borrowed(),
                outgoing_video_track.map_or_else(webrtc::ptr::BorrowedRc::null, |track| {
                    track.rffi().as_borrowed()
                }),
            )
        });
        if rffi.is_null() {
            return Err(NativeRtcError::CreatePeerConnection.into());
        }
        debug!(
            "PeerConnectionFactory::create_peer_connection() finished: {:?}",
            rffi
        );
        Ok(PeerConnection::new(
            rffi,
            Some(pc_observer_rffi),
            Some(self.rffi.clone()),
        ))
    }

    pub fn create_outgoing_audio_track(&self) -> Result<AudioTrack> {
        debug!("PeerConnectionFactory::create_outgoing_audio_track()");
        let rffi =
            webrtc::Arc::from_owned(unsafe { pcf::Rust_createAudioTrack(self.rffi.as_borrowed()) });
        if rffi.is_null() {
            return Err(NativeRtcError::CreateAudioTrack.into());
        }
        Ok(AudioTrack::new(rffi, Some(self.rffi.clone())))
    }

    pub fn create_outgoing_video_source(&self) -> Result<VideoSource> {
        debug!("PeerConnectionFactory::create_outgoing_video_source()");
        let rffi = webrtc::Arc::from_owned(unsafe { pcf::Rust_createVideoSource() });
        if rffi.is_null() {
            return Err(NativeRtcError::CreateVideoSource.into());
        }
        Ok(VideoSource::new(rffi))
    }

    // Rust_createVideoTrack takes ownership of one ref count to the source.
    pub fn create_outgoing_video_track(
        &self,
        outgoing_video_source: &VideoSource,
    ) -> Result<VideoTrack> {
        debug!("PeerConnectionFactory::create_outgoing_video_track()");
        let rffi = webrtc::Arc::from_owned(unsafe {
            pcf::Rust_createVideoTrack(
                self.rffi.as_borrowed(),
                outgoing_video_source.rffi().as_borrowed(),
            )
        });
        if rffi.is_null() {
            return Err(NativeRtcError::CreateVideoTrack.into());
        }
        Ok(VideoTrack::new(rffi, Some(self.rffi.clone())))
    }

    /// The codecs the engine can send for the given media kind.
    pub fn rtp_sender_capabilities(&self, media_type: MediaType) -> Result<RtpCapabilities> {
        let mut rffi_codecs: Vec<RffiRtpCodecCapability> = Vec::with_capacity(32);
        let mut len = 0usize;
        let len_ptr: *mut usize = &mut len;
        unsafe {
            pcf::Rust_getRtpSenderCapabilities(
                self.rffi.as_borrowed(),
                media_type as i32,
                webrtc::ptr::Borrowed::from_ptr(rffi_codecs.as_mut_ptr()),
                rffi_codecs.capacity(),
                webrtc::ptr::Borrowed::from_ptr(len_ptr as *const usize),
            );
            rffi_codecs.set_len(std::ptr::read(len_ptr));
        }
        Ok(RtpCapabilities {
            codecs: rffi_codecs
                .iter()
                .filter_map(RtpCodecCapability::from_rffi)
                .collect(),
        })
    }
}
