//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Simulation of the stats observer.

use std::ffi::c_void;

use crate::webrtc;
use crate::webrtc::stats_observer::{
    AudioSenderStatistics, MediaStatistics, StatsObserver, StatsObserverCallbacks,
    VideoSenderStatistics,
};

/// Simulation type for C++ StatsObserverRffi.
pub struct RffiStatsObserver {
    observer: *const c_void,
    callbacks: StatsObserverCallbacks,
}

impl webrtc::RefCounted for RffiStatsObserver {}

impl RffiStatsObserver {
    /// Delivers a canned stats report through the registered callback.
    pub fn deliver_fake_stats(&self) {
        let audio_senders = [AudioSenderStatistics {
            ssrc: 1001,
            packets_sent: 250,
            bytes_sent: 20_000,
            remote_packets_lost: 1,
            remote_jitter: 0.004,
            remote_round_trip_time: 0.052,
            audio_level: 0.5,
            total_audio_energy: 1.25,
        }];
        let video_senders = [VideoSenderStatistics {
            ssrc: 2002,
            packets_sent: 1200,
            bytes_sent: 1_200_000,
            frames_encoded: 150,
            key_frames_encoded: 5,
            total_encode_time: 0.9,
            frame_width: 640,
            frame_height: 480,
            retransmitted_packets_sent: 3,
            retransmitted_bytes_sent: 3000,
            nack_count: 2,
            pli_count: 1,
            remote_packets_lost: 2,
            remote_jitter: 0.007,
            remote_round_trip_time: 0.061,
        }];
        let media_statistics = MediaStatistics {
            timestamp_us: 1_000_000,
            audio_sender_statistics_size: audio_senders.len() as u32,
            audio_sender_statistics: webrtc::ptr::Borrowed::from_ptr(audio_senders.as_ptr()),
            video_sender_statistics_size: video_senders.len() as u32,
            video_sender_statistics: webrtc::ptr::Borrowed::from_ptr(video_senders.as_ptr()),
            audio_receiver_statistics_size: 0,
            audio_receiver_statistics: webrtc::ptr::Borrowed::null(),
            video_receiver_statistics_size: 0,
            video_receiver_statistics: webrtc::ptr::Borrowed::null(),
        };
        (self.callbacks.OnStatsComplete)(
            webrtc::ptr::Borrowed::from_ptr(self.observer as *const StatsObserver),
            webrtc::ptr::Borrowed::from_ptr(&media_statistics),
        );
    }
}

#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe fn Rust_createStatsObserver(
    stats_observer: webrtc::ptr::Borrowed<c_void>,
    callbacks: webrtc::ptr::Borrowed<c_void>,
) -> webrtc::ptr::OwnedRc<RffiStatsObserver> {
    info!("Rust_createStatsObserver():");
    let callbacks = *(callbacks.as_ptr() as *const StatsObserverCallbacks);
    webrtc::ptr::OwnedRc::from_ptr(Box::into_raw(Box::new(RffiStatsObserver {
        observer: stats_observer.as_ptr(),
        callbacks,
    })))
}
