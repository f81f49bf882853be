//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! # nativeRTC -- A Rust Binding Layer for WebRTC
//!
//! This crate wraps a native [WebRTC](https://webrtc.org/) media engine
//! behind typed pointer handles. The engine owns the hard parts (ICE,
//! RTP/RTCP, codecs, congestion control); this layer forwards calls across
//! the FFI boundary, manages reference counts, and converts between Rust
//! and native representations of SDP, ICE candidates, codec capabilities,
//! stats reports, and video frames.
//!
//! Built with the `sim` feature (the default), the engine entry points are
//! replaced with in-process fakes so the crate is usable without the
//! prebuilt native library.

#[macro_use]
extern crate log;

pub mod common;

mod error;

pub use error::NativeRtcError;

/// Core, platform independent functionality.
pub mod core {
    pub mod util;
}

/// Foreign Function Interface (FFI) to the WebRTC C++ library.
pub mod webrtc {
    pub mod arc;
    pub mod bitrate_adjuster;
    pub mod data_channel;
    pub mod data_channel_observer;
    pub mod field_trial;
    pub mod ice_candidate;
    #[cfg(not(feature = "sim"))]
    pub mod logging;
    pub mod media;
    pub mod peer_connection;
    pub mod peer_connection_factory;
    pub mod peer_connection_observer;
    pub mod ptr;
    pub mod ref_count;
    pub mod rtp;
    pub mod sdp_observer;
    pub mod stats_observer;
    pub mod video_frame_buffer;

    pub use arc::Arc;
    pub use ptr::RefCounted;

    #[cfg(not(feature = "sim"))]
    pub mod ffi {
        pub mod data_channel;
        pub mod field_trial;
        pub mod logging;
        pub mod media;
        pub mod peer_connection;
        pub mod peer_connection_factory;
        pub mod peer_connection_observer;
        pub mod ref_count;
        pub mod rtp;
        pub mod sdp_observer;
        pub mod stats_observer;
    }

    #[cfg(feature = "sim")]
    pub mod sim {
        pub mod data_channel;
        pub mod field_trial;
        pub mod media;
        pub mod peer_connection;
        pub mod peer_connection_factory;
        pub mod peer_connection_observer;
        pub mod ref_count;
        pub mod rtp;
        pub mod sdp_observer;
        pub mod stats_observer;
    }
}
