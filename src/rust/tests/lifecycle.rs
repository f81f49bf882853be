//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Dispose-once and ref-count lifecycle rules across the handle wrappers.
//!
//! Requires the 'sim' feature.

extern crate nativertc;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use nativertc::webrtc;
use nativertc::webrtc::media::{
    MediaStream, VideoFrame, VideoPixelFormat, VideoSink,
};
use nativertc::webrtc::peer_connection_factory::{Config, PeerConnectionFactory};
use nativertc::webrtc::sim::media::FAKE_MEDIA_STREAM;
use nativertc::webrtc::video_frame_buffer::{
    FrameBuffer, I420Buffer, TextureBuffer, TextureType, IDENTITY_TRANSFORM,
};
use nativertc::NativeRtcError;

mod common;

fn factory() -> PeerConnectionFactory {
    common::test_init();
    PeerConnectionFactory::new(&Config::default()).expect("create factory")
}

fn assert_already_disposed(result: nativertc::common::Result<()>) {
    let error = result.expect_err("second dispose must fail");
    match error.downcast_ref::<NativeRtcError>() {
        Some(NativeRtcError::AlreadyDisposed(_)) => {}
        other => panic!("expected AlreadyDisposed, got {:?}", other),
    }
}

#[test]
fn media_stream_disposes_once() {
    common::test_init();
    let mut stream = MediaStream::new(webrtc::Arc::from_owned(unsafe {
        webrtc::ptr::OwnedRc::from_ptr(&FAKE_MEDIA_STREAM)
    }));
    assert!(stream.incoming_video_track().expect("track").is_some());

    stream.dispose().expect("first dispose");
    assert_already_disposed(stream.dispose());
    assert_already_disposed(stream.dispose());
    // Use after dispose is a usage error too.
    assert!(stream.incoming_video_track().is_err());
}

#[test]
fn tracks_dispose_once() {
    let factory = factory();

    let mut audio_track = factory.create_outgoing_audio_track().expect("audio track");
    audio_track.set_enabled(false).expect("set_enabled");
    audio_track.dispose().expect("first dispose");
    assert_already_disposed(audio_track.dispose());
    assert!(audio_track.set_enabled(true).is_err());

    let video_source = factory.create_outgoing_video_source().expect("source");
    let mut video_track = factory
        .create_outgoing_video_track(&video_source)
        .expect("video track");
    video_track.set_content_hint(true).expect("content hint");
    video_track.dispose().expect("first dispose");
    assert_already_disposed(video_track.dispose());
    assert!(video_track.set_enabled(true).is_err());
}

#[test]
fn video_source_disposes_once_and_forwards_frames() {
    let factory = factory();
    let mut source = factory.create_outgoing_video_source().expect("source");

    let frame_data: Vec<u8> = (0..4 * 4 + 2 * 2 * 2)
        .map(|_| common::PRNG.gen::<u8>())
        .collect();
    let frame =
        VideoFrame::copy_from_slice(4, 4, VideoPixelFormat::I420, &frame_data).expect("frame");
    source.push_frame(&frame).expect("push");
    source.adapt_output_format(640, 480, 30).expect("adapt");

    {
        let rffi = unsafe { source.rffi().as_ref() }.expect("live sim source");
        assert_eq!(vec![(4, 4)], rffi.pushed_frames());
        assert_eq!(Some((640, 480, 30)), rffi.adapted_format());
    }

    source.dispose().expect("first dispose");
    assert_already_disposed(source.dispose());
    assert!(source.push_frame(&frame).is_err());
}

#[test]
fn rtp_wrappers_dispose_once() {
    let factory = factory();
    // A peer connection is not required to build senders in the sim, but
    // going through one exercises the real plumbing.
    let audio_track = factory.create_outgoing_audio_track().expect("audio track");
    let observer = Box::new(NullObserver);
    let pc_observer = unsafe {
        nativertc::webrtc::peer_connection_observer::PeerConnectionObserver::new(
            webrtc::ptr::Borrowed::from_ptr(&*observer),
        )
        .expect("observer")
    };
    let pc = factory
        .create_peer_connection(
            pc_observer,
            &Default::default(),
            &[],
            &audio_track,
            None,
        )
        .expect("pc");

    let mut senders = pc.senders().expect("senders");
    let sender = &mut senders[0];
    sender.dispose().expect("first dispose");
    assert_already_disposed(sender.dispose());
    assert!(sender.parameters().is_err());

    let mut receivers = pc.receivers().expect("receivers");
    let receiver = &mut receivers[0];
    receiver.dispose().expect("first dispose");
    assert_already_disposed(receiver.dispose());
    assert!(receiver.track_id().is_err());
}

#[test]
fn peer_connection_disposes_once() {
    let factory = factory();
    let audio_track = factory.create_outgoing_audio_track().expect("audio track");
    let observer = Box::new(NullObserver);
    let pc_observer = unsafe {
        nativertc::webrtc::peer_connection_observer::PeerConnectionObserver::new(
            webrtc::ptr::Borrowed::from_ptr(&*observer),
        )
        .expect("observer")
    };
    let mut pc = factory
        .create_peer_connection(
            pc_observer,
            &Default::default(),
            &[],
            &audio_track,
            None,
        )
        .expect("pc");

    pc.dispose().expect("first dispose");
    assert_already_disposed(pc.dispose());
    assert!(pc.close().is_err());
}

#[test]
fn data_channel_disposes_once() {
    let factory = factory();
    let audio_track = factory.create_outgoing_audio_track().expect("audio track");
    let observer = Box::new(NullObserver);
    let pc_observer = unsafe {
        nativertc::webrtc::peer_connection_observer::PeerConnectionObserver::new(
            webrtc::ptr::Borrowed::from_ptr(&*observer),
        )
        .expect("observer")
    };
    let pc = factory
        .create_peer_connection(
            pc_observer,
            &Default::default(),
            &[],
            &audio_track,
            None,
        )
        .expect("pc");

    let mut data_channel = pc.create_data_channel("signaling").expect("channel");
    data_channel.dispose().expect("first dispose");
    assert_already_disposed(data_channel.dispose());
    assert!(data_channel.label().is_err());
    assert!(data_channel
        .send_data(&bytes::Bytes::from_static(b"late"))
        .is_err());
}

#[test]
fn frame_buffer_safe_retain_races_with_release() {
    common::test_init();
    let released = Arc::new(AtomicU32::new(0));
    let released_in_callback = released.clone();
    let buffer = FrameBuffer::I420(
        I420Buffer::wrap(
            4,
            4,
            vec![0u8; 4 * 4 + 2 * 2 * 2],
            Some(Box::new(move || {
                released_in_callback.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .expect("buffer"),
    );

    assert!(buffer.safe_retain());
    buffer.release().expect("release retained");
    buffer.release().expect("release last");
    assert_eq!(1, released.load(Ordering::SeqCst));

    // Fully released: no resurrection.
    assert!(!buffer.safe_retain());
    assert!(buffer.retain().is_err());
}

#[test]
fn cropped_buffer_owns_a_fresh_count() {
    common::test_init();
    let buffer = I420Buffer::wrap(4, 4, vec![0u8; 4 * 4 + 2 * 2 * 2], None).expect("buffer");
    let cropped = buffer.crop_and_scale(0, 0, 2, 2, 2, 2).expect("crop");
    assert_eq!(1, cropped.ref_count().count());
    assert_eq!(1, buffer.ref_count().count());
}

#[test]
fn texture_chain_releases_bottom_up() {
    common::test_init();
    let released = Arc::new(AtomicU32::new(0));
    let released_in_callback = released.clone();
    let texture = TextureBuffer::new(
        9,
        TextureType::Oes,
        1280,
        720,
        IDENTITY_TRANSFORM,
        Some(Box::new(move || {
            released_in_callback.fetch_add(1, Ordering::SeqCst);
        })),
    );

    let first = texture.crop_and_scale(0, 0, 640, 720, 640, 720).expect("crop");
    let second = first.crop_and_scale(0, 0, 320, 360, 320, 360).expect("crop");
    assert_eq!(2, texture.ref_count().count());
    assert_eq!(2, first.ref_count().count());

    second.ref_count().release().expect("release second");
    assert_eq!(1, first.ref_count().count());
    first.ref_count().release().expect("release first");
    assert_eq!(1, texture.ref_count().count());
    assert_eq!(0, released.load(Ordering::SeqCst));

    texture.ref_count().release().expect("release original");
    assert_eq!(1, released.load(Ordering::SeqCst));
}

#[test]
fn frame_rotation_swaps_dimensions() {
    common::test_init();
    let frame_data: Vec<u8> = vec![7; 4 * 6 + 2 * 2 * 3];
    let frame = VideoFrame::copy_from_slice(4, 6, VideoPixelFormat::I420, &frame_data)
        .expect("frame");
    let rotated = VideoFrame::from_buffer(
        nativertc::webrtc::media::VideoFrameMetadata {
            width: 4,
            height: 6,
            rotation: nativertc::webrtc::video_frame_buffer::Rotation::Clockwise90,
        },
        FrameBuffer::I420(frame.to_i420().expect("i420")),
    )
    .apply_rotation()
    .expect("rotate");
    assert_eq!(6, rotated.width());
    assert_eq!(4, rotated.height());
    assert_eq!(
        nativertc::webrtc::video_frame_buffer::Rotation::None,
        rotated.metadata().rotation
    );
}

#[test]
fn texture_reads_back_through_the_engine() {
    common::test_init();
    let texture = TextureBuffer::new(3, TextureType::Rgb, 64, 48, IDENTITY_TRANSFORM, None);
    let i420 = texture.to_i420().expect("read back");
    assert_eq!(64, i420.width());
    assert_eq!(48, i420.height());
    assert!(i420.data_y().iter().all(|&sample| sample == 0x80));
}

struct CountingSink {
    frames: Arc<Mutex<Vec<(u32, u32, u32)>>>,
}

impl VideoSink for CountingSink {
    fn on_video_frame(&self, track_id: u32, frame: VideoFrame) {
        let i420 = frame.to_i420().expect("to_i420");
        assert_eq!(0x80, i420.data_y()[0]);
        self.frames
            .lock()
            .unwrap()
            .push((track_id, frame.width(), frame.height()));
    }

    fn box_clone(&self) -> Box<dyn VideoSink> {
        Box::new(CountingSink {
            frames: self.frames.clone(),
        })
    }
}

#[test]
fn video_sink_receives_decoded_frames() {
    let factory = factory();
    let source = factory.create_outgoing_video_source().expect("source");
    let track = factory
        .create_outgoing_video_track(&source)
        .expect("video track");

    let frames = Arc::new(Mutex::new(Vec::new()));
    track
        .add_sink(Box::new(CountingSink {
            frames: frames.clone(),
        }))
        .expect("add sink");

    let rffi = unsafe { track.rffi().as_ref() }.expect("live sim track");
    rffi.deliver_fake_frame(320, 240);
    rffi.deliver_fake_frame(640, 480);

    assert_eq!(
        vec![(0x2002, 320, 240), (0x2002, 640, 480)],
        frames.lock().unwrap().clone()
    );
}

struct NullObserver;

static NULL_OBSERVER_ID: &str = "null";

impl nativertc::webrtc::peer_connection_observer::PeerConnectionObserverTrait for NullObserver {
    fn log_id(&self) -> &dyn std::fmt::Display {
        &NULL_OBSERVER_ID
    }

    fn handle_ice_candidate_gathered(
        &mut self,
        _ice_candidate: nativertc::webrtc::ice_candidate::IceCandidate,
    ) -> nativertc::common::Result<()> {
        Ok(())
    }

    fn handle_ice_connection_state_changed(
        &mut self,
        _new_state: nativertc::webrtc::peer_connection_observer::IceConnectionState,
    ) -> nativertc::common::Result<()> {
        Ok(())
    }

    fn handle_incoming_media_added(
        &mut self,
        _incoming_stream: MediaStream,
    ) -> nativertc::common::Result<()> {
        Ok(())
    }

    fn handle_incoming_data_channel(
        &mut self,
        _data_channel: nativertc::webrtc::data_channel::DataChannel,
    ) -> nativertc::common::Result<()> {
        Ok(())
    }
}
