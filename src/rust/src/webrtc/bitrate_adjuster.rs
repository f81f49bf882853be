//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Bitrate adjustment heuristics for video encoders.
//!
//! Some hardware encoders do not hit the bitrate they are configured with.
//! An adjuster sits between the send-side target and the encoder config,
//! translating encoded-frame feedback into an adjusted target.

use crate::common::units::DataRate;

/// Nominal framerate assumed by encoders that cannot be configured with a
/// dynamic framerate.
const NOMINAL_FRAMERATE_FPS: f64 = 30.0;

/// Window of encoded-frame time between adjustments, and also the
/// saturation bound of the deviation accumulator.
const BITRATE_ADJUSTMENT_SEC: f64 = 3.0;

/// Maximum adjustment at full exponent, i.e. adjusted bitrate stays within
/// [target / 4, target * 4].
const BITRATE_ADJUSTMENT_MAX_SCALE: f64 = 4.0;

/// Number of exponent steps between no adjustment and the max scale.
const BITRATE_ADJUSTMENT_STEPS: i32 = 20;

const BITS_PER_BYTE: f64 = 8.0;

pub trait BitrateAdjuster {
    /// Updates the send-side targets. May be called at any time.
    fn set_targets(&mut self, target_bitrate: DataRate, target_framerate_fps: f64);

    /// Reports the size of a frame the encoder produced.
    fn report_encoded_frame(&mut self, size_bytes: usize);

    /// The bitrate the encoder should currently be configured with.
    fn adjusted_bitrate(&self) -> DataRate;

    /// The framerate the encoder should currently be configured with.
    fn adjusted_framerate_fps(&self) -> f64;
}

/// Identity adjuster; reports the targets unchanged.
#[derive(Debug, Default)]
pub struct BaseBitrateAdjuster {
    target_bitrate: DataRate,
    target_framerate_fps: f64,
}

impl BitrateAdjuster for BaseBitrateAdjuster {
    fn set_targets(&mut self, target_bitrate: DataRate, target_framerate_fps: f64) {
        self.target_bitrate = target_bitrate;
        self.target_framerate_fps = target_framerate_fps;
    }

    fn report_encoded_frame(&mut self, _size_bytes: usize) {}

    fn adjusted_bitrate(&self) -> DataRate {
        self.target_bitrate
    }

    fn adjusted_framerate_fps(&self) -> f64 {
        self.target_framerate_fps
    }
}

/// Adjuster for encoders that don't track their target bitrate well.
///
/// Accumulates the deviation between reported and expected frame sizes and
/// every three seconds of frame time moves a log-domain scale exponent one
/// step toward compensating it. The accumulator saturates at three seconds
/// worth of target bytes so stale history can't dominate, and the exponent
/// is bounded so the adjusted bitrate stays within 4x of target either way.
#[derive(Debug, Default)]
pub struct DynamicBitrateAdjuster {
    target_bitrate: DataRate,
    target_framerate_fps: f64,
    deviation_bytes: f64,
    time_since_last_adjustment_ms: f64,
    bitrate_adjustment_scale_exp: i32,
}

impl DynamicBitrateAdjuster {
    fn deviation_threshold_bytes(&self) -> f64 {
        self.target_bitrate.as_bps() as f64 * BITRATE_ADJUSTMENT_SEC / BITS_PER_BYTE
    }

    fn bitrate_adjustment_scale(&self) -> f64 {
        BITRATE_ADJUSTMENT_MAX_SCALE
            .powf(self.bitrate_adjustment_scale_exp as f64 / BITRATE_ADJUSTMENT_STEPS as f64)
    }
}

impl BitrateAdjuster for DynamicBitrateAdjuster {
    fn set_targets(&mut self, target_bitrate: DataRate, target_framerate_fps: f64) {
        if self.target_bitrate.as_bps() > 0 && target_bitrate < self.target_bitrate {
            // The accumulator is scaled to the target; rescale it when the
            // target shrinks so old overshoot doesn't saturate the new range.
            self.deviation_bytes = self.deviation_bytes * target_bitrate.as_bps() as f64
                / self.target_bitrate.as_bps() as f64;
        }
        self.target_bitrate = target_bitrate;
        self.target_framerate_fps = target_framerate_fps;
    }

    fn report_encoded_frame(&mut self, size_bytes: usize) {
        if self.target_framerate_fps <= 0.0 {
            return;
        }

        let expected_bytes_per_frame =
            (self.target_bitrate.as_bps() as f64 / BITS_PER_BYTE) / self.target_framerate_fps;
        self.deviation_bytes += size_bytes as f64 - expected_bytes_per_frame;
        self.time_since_last_adjustment_ms += 1000.0 / self.target_framerate_fps;

        let deviation_threshold_bytes = self.deviation_threshold_bytes();
        self.deviation_bytes = self
            .deviation_bytes
            .clamp(-deviation_threshold_bytes, deviation_threshold_bytes);

        if self.time_since_last_adjustment_ms <= 1000.0 * BITRATE_ADJUSTMENT_SEC {
            return;
        }

        // One step per adjustment window, in the direction that pulls the
        // produced bitrate back toward the target.
        if self.deviation_bytes >= deviation_threshold_bytes / 2.0 {
            self.bitrate_adjustment_scale_exp =
                (self.bitrate_adjustment_scale_exp - 1).max(-BITRATE_ADJUSTMENT_STEPS);
            self.deviation_bytes = 0.0;
        } else if self.deviation_bytes <= -deviation_threshold_bytes / 2.0 {
            self.bitrate_adjustment_scale_exp =
                (self.bitrate_adjustment_scale_exp + 1).min(BITRATE_ADJUSTMENT_STEPS);
            self.deviation_bytes = 0.0;
        }
        self.time_since_last_adjustment_ms = 0.0;
    }

    fn adjusted_bitrate(&self) -> DataRate {
        DataRate::from_bps(
            (self.target_bitrate.as_bps() as f64 * self.bitrate_adjustment_scale()) as u64,
        )
    }

    fn adjusted_framerate_fps(&self) -> f64 {
        self.target_framerate_fps
    }
}

/// Adjuster for encoders that assume a constant nominal framerate.
///
/// The encoder splits its configured bitrate across nominal-framerate
/// frames, so when the capture rate differs the configured bitrate has to
/// be rescaled to keep the per-frame budget right.
#[derive(Debug, Default)]
pub struct FramerateBitrateAdjuster {
    target_bitrate: DataRate,
    target_framerate_fps: f64,
}

impl BitrateAdjuster for FramerateBitrateAdjuster {
    fn set_targets(&mut self, target_bitrate: DataRate, target_framerate_fps: f64) {
        self.target_bitrate = target_bitrate;
        self.target_framerate_fps = if target_framerate_fps <= 0.0 {
            NOMINAL_FRAMERATE_FPS
        } else {
            target_framerate_fps
        };
    }

    fn report_encoded_frame(&mut self, _size_bytes: usize) {}

    fn adjusted_bitrate(&self) -> DataRate {
        DataRate::from_bps(
            (self.target_bitrate.as_bps() as f64 * NOMINAL_FRAMERATE_FPS
                / self.target_framerate_fps) as u64,
        )
    }

    fn adjusted_framerate_fps(&self) -> f64 {
        NOMINAL_FRAMERATE_FPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: DataRate = DataRate::from_kbps(600);
    const FPS: f64 = 30.0;

    fn expected_frame_bytes() -> usize {
        ((TARGET.as_bps() as f64 / 8.0) / FPS) as usize
    }

    // Runs `seconds` worth of frames, each `overshoot` times the expected size.
    fn run_frames(adjuster: &mut DynamicBitrateAdjuster, seconds: f64, overshoot: f64) {
        let frames = (seconds * FPS) as usize;
        let size = (expected_frame_bytes() as f64 * overshoot) as usize;
        for _ in 0..frames {
            adjuster.report_encoded_frame(size);
        }
    }

    #[test]
    fn base_adjuster_is_identity() {
        let mut adjuster = BaseBitrateAdjuster::default();
        adjuster.set_targets(TARGET, FPS);
        adjuster.report_encoded_frame(100_000);
        assert_eq!(TARGET, adjuster.adjusted_bitrate());
        assert_eq!(FPS, adjuster.adjusted_framerate_fps());
    }

    #[test]
    fn dynamic_adjuster_starts_at_target() {
        let mut adjuster = DynamicBitrateAdjuster::default();
        adjuster.set_targets(TARGET, FPS);
        assert_eq!(TARGET, adjuster.adjusted_bitrate());
    }

    #[test]
    fn dynamic_adjuster_scales_down_on_overshoot() {
        let mut adjuster = DynamicBitrateAdjuster::default();
        adjuster.set_targets(TARGET, FPS);
        run_frames(&mut adjuster, 4.0, 2.0);
        assert!(adjuster.adjusted_bitrate() < TARGET);
    }

    #[test]
    fn dynamic_adjuster_scales_up_on_undershoot() {
        let mut adjuster = DynamicBitrateAdjuster::default();
        adjuster.set_targets(TARGET, FPS);
        run_frames(&mut adjuster, 4.0, 0.25);
        assert!(adjuster.adjusted_bitrate() > TARGET);
    }

    #[test]
    fn dynamic_adjuster_on_target_stays_put() {
        let mut adjuster = DynamicBitrateAdjuster::default();
        adjuster.set_targets(TARGET, FPS);
        run_frames(&mut adjuster, 10.0, 1.0);
        assert_eq!(TARGET, adjuster.adjusted_bitrate());
    }

    #[test]
    fn dynamic_adjuster_deviation_stays_clamped() {
        let mut adjuster = DynamicBitrateAdjuster::default();
        adjuster.set_targets(TARGET, FPS);
        let threshold = adjuster.deviation_threshold_bytes();
        // Grossly oversized frames for a minute.
        let size = expected_frame_bytes() * 50;
        for _ in 0..(60.0 * FPS) as usize {
            adjuster.report_encoded_frame(size);
            assert!(adjuster.deviation_bytes.abs() <= threshold);
        }
    }

    #[test]
    fn dynamic_adjuster_scale_never_exceeds_bounds() {
        let mut adjuster = DynamicBitrateAdjuster::default();
        adjuster.set_targets(TARGET, FPS);
        // Sustained massive overshoot: exponent must bottom out at -20,
        // scale at 1/4 of target.
        run_frames(&mut adjuster, 600.0, 50.0);
        assert_eq!(-BITRATE_ADJUSTMENT_STEPS, adjuster.bitrate_adjustment_scale_exp);
        let floor = (TARGET.as_bps() as f64 / BITRATE_ADJUSTMENT_MAX_SCALE) as i64;
        assert!((adjuster.adjusted_bitrate().as_bps() as i64 - floor).abs() <= 1);

        // And the other direction: tiny frames forever.
        let mut adjuster = DynamicBitrateAdjuster::default();
        adjuster.set_targets(TARGET, FPS);
        run_frames(&mut adjuster, 600.0, 0.0);
        assert_eq!(BITRATE_ADJUSTMENT_STEPS, adjuster.bitrate_adjustment_scale_exp);
        let ceiling = (TARGET.as_bps() as f64 * BITRATE_ADJUSTMENT_MAX_SCALE) as i64;
        assert!((adjuster.adjusted_bitrate().as_bps() as i64 - ceiling).abs() <= 1);
    }

    #[test]
    fn dynamic_adjuster_rescales_deviation_when_target_drops() {
        let mut adjuster = DynamicBitrateAdjuster::default();
        adjuster.set_targets(TARGET, FPS);
        run_frames(&mut adjuster, 2.0, 2.0);
        let deviation_before = adjuster.deviation_bytes;
        adjuster.set_targets(DataRate::from_kbps(300), FPS);
        assert!((adjuster.deviation_bytes - deviation_before / 2.0).abs() < 1.0);
    }

    #[test]
    fn dynamic_adjuster_ignores_frames_without_framerate() {
        let mut adjuster = DynamicBitrateAdjuster::default();
        adjuster.set_targets(TARGET, 0.0);
        adjuster.report_encoded_frame(1_000_000);
        assert_eq!(TARGET, adjuster.adjusted_bitrate());
    }

    #[test]
    fn framerate_adjuster_reports_nominal_framerate() {
        let mut adjuster = FramerateBitrateAdjuster::default();
        adjuster.set_targets(TARGET, 15.0);
        assert_eq!(NOMINAL_FRAMERATE_FPS, adjuster.adjusted_framerate_fps());
        // Half the nominal framerate doubles the configured bitrate, which
        // keeps the per-frame budget unchanged.
        assert_eq!(TARGET.as_bps() * 2, adjuster.adjusted_bitrate().as_bps());
    }

    #[test]
    fn framerate_adjuster_identity_at_nominal() {
        let mut adjuster = FramerateBitrateAdjuster::default();
        adjuster.set_targets(TARGET, 30.0);
        assert_eq!(TARGET, adjuster.adjusted_bitrate());
    }

    #[test]
    fn framerate_adjuster_treats_zero_framerate_as_nominal() {
        let mut adjuster = FramerateBitrateAdjuster::default();
        adjuster.set_targets(TARGET, 0.0);
        assert_eq!(TARGET, adjuster.adjusted_bitrate());
    }
}
