//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! WebRTC Stats Observer Interface.

use std::ffi::c_void;
use std::slice;
use std::sync::Mutex;

use serde::Serialize;

use crate::common::Result;
use crate::core::util::ptr_as_ref;
use crate::webrtc;

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::stats_observer as stats;
#[cfg(not(feature = "sim"))]
pub use crate::webrtc::ffi::stats_observer::RffiStatsObserver;

#[cfg(feature = "sim")]
use crate::webrtc::sim::stats_observer as stats;
#[cfg(feature = "sim")]
pub use crate::webrtc::sim::stats_observer::RffiStatsObserver;

/// Stays in sync with the engine-side row struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct AudioSenderStatistics {
    pub ssrc: u32,
    pub packets_sent: u32,
    pub bytes_sent: u64,
    pub remote_packets_lost: i32,
    pub remote_jitter: f64,
    pub remote_round_trip_time: f64,
    pub audio_level: f64,
    pub total_audio_energy: f64,
}

/// Stays in sync with the engine-side row struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct VideoSenderStatistics {
    pub ssrc: u32,
    pub packets_sent: u32,
    pub bytes_sent: u64,
    pub frames_encoded: u32,
    pub key_frames_encoded: u32,
    pub total_encode_time: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub retransmitted_packets_sent: u64,
    pub retransmitted_bytes_sent: u64,
    pub nack_count: u32,
    pub pli_count: u32,
    pub remote_packets_lost: i32,
    pub remote_jitter: f64,
    pub remote_round_trip_time: f64,
}

/// Stays in sync with the engine-side row struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct AudioReceiverStatistics {
    pub ssrc: u32,
    pub packets_received: u32,
    pub packets_lost: i32,
    pub bytes_received: u64,
    pub jitter: f64,
    pub audio_level: f64,
    pub total_audio_energy: f64,
}

/// Stays in sync with the engine-side row struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct VideoReceiverStatistics {
    pub ssrc: u32,
    pub packets_received: u32,
    pub packets_lost: i32,
    pub bytes_received: u64,
    pub frames_decoded: u32,
    pub key_frames_decoded: u32,
    pub total_decode_time: f64,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// The engine's stats callback payload: row arrays owned by the engine for
/// the duration of the callback.
#[repr(C)]
#[derive(Debug)]
pub struct MediaStatistics {
    pub timestamp_us: i64,
    pub audio_sender_statistics_size: u32,
    pub audio_sender_statistics: webrtc::ptr::Borrowed<AudioSenderStatistics>,
    pub video_sender_statistics_size: u32,
    pub video_sender_statistics: webrtc::ptr::Borrowed<VideoSenderStatistics>,
    pub audio_receiver_statistics_size: u32,
    pub audio_receiver_statistics: webrtc::ptr::Borrowed<AudioReceiverStatistics>,
    pub video_receiver_statistics_size: u32,
    pub video_receiver_statistics: webrtc::ptr::Borrowed<VideoReceiverStatistics>,
}

/// An owned snapshot of one stats collection.
#[derive(Clone, Debug, Default, Serialize)]
pub struct StatsReport {
    pub timestamp_us: i64,
    pub audio_senders: Vec<AudioSenderStatistics>,
    pub video_senders: Vec<VideoSenderStatistics>,
    pub audio_receivers: Vec<AudioReceiverStatistics>,
    pub video_receivers: Vec<VideoReceiverStatistics>,
}

impl StatsReport {
    fn from_media_statistics(media_statistics: &MediaStatistics) -> Self {
        fn rows<T: Copy>(ptr: webrtc::ptr::Borrowed<T>, size: u32) -> Vec<T> {
            if ptr.is_null() || size == 0 {
                return Vec::new();
            }
            unsafe { slice::from_raw_parts(ptr.as_ptr(), size as usize) }.to_vec()
        }

        Self {
            timestamp_us: media_statistics.timestamp_us,
            audio_senders: rows(
                media_statistics.audio_sender_statistics,
                media_statistics.audio_sender_statistics_size,
            ),
            video_senders: rows(
                media_statistics.video_sender_statistics,
                media_statistics.video_sender_statistics_size,
            ),
            audio_receivers: rows(
                media_statistics.audio_receiver_statistics,
                media_statistics.audio_receiver_statistics_size,
            ),
            video_receivers: rows(
                media_statistics.video_receiver_statistics,
                media_statistics.video_receiver_statistics_size,
            ),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub type StatsHandler = Box<dyn Fn(&StatsReport) + Send + Sync>;

/// Collector object for obtaining statistics.
pub struct StatsObserver {
    last_report: Mutex<Option<StatsReport>>,
    handler: StatsHandler,
    rffi: webrtc::Arc<RffiStatsObserver>,
}

impl StatsObserver {
    fn new(handler: StatsHandler) -> Self {
        Self {
            last_report: Mutex::new(None),
            handler,
            rffi: webrtc::Arc::null(),
        }
    }

    /// Invoked when statistics are received via the stats observer callback.
    fn on_stats_complete(&self, media_statistics: &MediaStatistics) {
        let report = StatsReport::from_media_statistics(media_statistics);
        info!(
            "stats! timestamp_us: {}, audio_send: {}, video_send: {}, audio_recv: {}, video_recv: {}",
            report.timestamp_us,
            report.audio_senders.len(),
            report.video_senders.len(),
            report.audio_receivers.len(),
            report.video_receivers.len(),
        );
        (self.handler)(&report);
        if let Ok(mut last_report) = self.last_report.lock() {
            *last_report = Some(report);
        }
    }

    /// The most recent report, if any collection has completed.
    pub fn last_report(&self) -> Option<StatsReport> {
        self.last_report.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn set_rffi(&mut self, rffi: webrtc::Arc<RffiStatsObserver>) {
        self.rffi = rffi;
    }

    pub fn rffi(&self) -> &webrtc::Arc<RffiStatsObserver> {
        &self.rffi
    }
}

/// StatsObserver OnStatsComplete() callback.
#[allow(non_snake_case)]
extern "C" fn stats_observer_OnStatsComplete(
    stats_observer: webrtc::ptr::Borrowed<StatsObserver>,
    values: webrtc::ptr::Borrowed<MediaStatistics>,
) {
    match (
        unsafe { ptr_as_ref(stats_observer.as_ptr()) },
        unsafe { values.as_ref() },
    ) {
        (Ok(v), Some(values)) => v.on_stats_complete(values),
        (Err(e), _) => error!("stats_observer_OnStatsComplete(): {}", e),
        (_, None) => error!("stats_observer_OnStatsComplete(): null values"),
    };
}

/// StatsObserver callback function pointers.
#[repr(C)]
#[allow(non_snake_case)]
#[derive(Clone, Copy)]
pub struct StatsObserverCallbacks {
    pub OnStatsComplete: extern "C" fn(
        stats_observer: webrtc::ptr::Borrowed<StatsObserver>,
        values: webrtc::ptr::Borrowed<MediaStatistics>,
    ),
}

static STATS_OBSERVER_CBS: StatsObserverCallbacks = StatsObserverCallbacks {
    OnStatsComplete: stats_observer_OnStatsComplete,
};

/// Creates a StatsObserver, pinned so the engine can call back into it.
pub fn create_stats_observer(handler: StatsHandler) -> Box<StatsObserver> {
    let mut stats_observer = Box::new(StatsObserver::new(handler));
    let stats_observer_ptr = &*stats_observer as *const StatsObserver;
    let rffi = webrtc::Arc::from_owned(unsafe {
        stats::Rust_createStatsObserver(
            webrtc::ptr::Borrowed::from_ptr(stats_observer_ptr as *const c_void),
            webrtc::ptr::Borrowed::from_ptr(
                &STATS_OBSERVER_CBS as *const StatsObserverCallbacks as *const c_void,
            ),
        )
    });
    stats_observer.set_rffi(rffi);
    stats_observer
}
