//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Offer/answer session flow against the sim engine.
//!
//! Requires the 'sim' feature.

extern crate nativertc;

use std::fmt;
use std::sync::{Arc, Mutex};

use nativertc::common::MediaType;
use nativertc::webrtc;
use nativertc::webrtc::data_channel::{DataChannel, DataChannelState};
use nativertc::webrtc::ice_candidate::IceCandidate;
use nativertc::webrtc::media::MediaStream;
use nativertc::webrtc::peer_connection::PeerConnection;
use nativertc::webrtc::peer_connection_factory::{
    AudioJitterBufferConfig, Config, IceServer, PeerConnectionFactory,
};
use nativertc::webrtc::peer_connection_observer::{
    IceConnectionState, PeerConnectionObserver, PeerConnectionObserverTrait,
};
use nativertc::webrtc::rtp::{RtpEncodingParameters, RtpParameters};
use nativertc::webrtc::sdp_observer::{create_csd_observer, create_ssd_observer, SessionDescription};
use nativertc::webrtc::stats_observer::create_stats_observer;

use nativertc::common::units::DataRate;

mod common;

#[derive(Clone, Debug, PartialEq)]
enum Event {
    IceCandidateGathered(String),
    IceConnectionChanged(IceConnectionState),
    IncomingMedia,
    IncomingDataChannel(String),
}

#[derive(Default)]
struct RecordingObserver {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

static OBSERVER_ID: &str = "test";

impl PeerConnectionObserverTrait for RecordingObserver {
    fn log_id(&self) -> &dyn fmt::Display {
        &OBSERVER_ID
    }

    fn handle_ice_candidate_gathered(
        &mut self,
        ice_candidate: IceCandidate,
    ) -> nativertc::common::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(Event::IceCandidateGathered(ice_candidate.sdp));
        Ok(())
    }

    fn handle_ice_connection_state_changed(
        &mut self,
        new_state: IceConnectionState,
    ) -> nativertc::common::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(Event::IceConnectionChanged(new_state));
        Ok(())
    }

    fn handle_incoming_media_added(
        &mut self,
        _incoming_stream: MediaStream,
    ) -> nativertc::common::Result<()> {
        self.events.lock().unwrap().push(Event::IncomingMedia);
        Ok(())
    }

    fn handle_incoming_data_channel(
        &mut self,
        data_channel: DataChannel,
    ) -> nativertc::common::Result<()> {
        let label = data_channel.label()?;
        self.events
            .lock()
            .unwrap()
            .push(Event::IncomingDataChannel(label));
        Ok(())
    }
}

struct TestSession {
    // Order matters: the peer connection must drop before the observer.
    pc: PeerConnection,
    factory: PeerConnectionFactory,
    observer: Box<RecordingObserver>,
}

fn connect() -> TestSession {
    common::test_init();

    let factory = PeerConnectionFactory::new(&Config {
        field_trials: vec![("WebRTC-Audio-OpusPlc".to_string(), "Enabled".to_string())],
        ..Default::default()
    })
    .expect("create factory");

    let audio_track = factory
        .create_outgoing_audio_track()
        .expect("create audio track");
    let video_source = factory
        .create_outgoing_video_source()
        .expect("create video source");
    let video_track = factory
        .create_outgoing_video_track(&video_source)
        .expect("create video track");

    let observer = Box::new(RecordingObserver::default());
    let pc_observer = unsafe {
        PeerConnectionObserver::new(webrtc::ptr::Borrowed::from_ptr(&*observer))
            .expect("create observer")
    };

    let pc = factory
        .create_peer_connection(
            pc_observer,
            &AudioJitterBufferConfig::default(),
            &[IceServer::new(
                "user".to_string(),
                "pass".to_string(),
                vec!["turn:turn.example.com".to_string()],
            )],
            &audio_track,
            Some(&video_track),
        )
        .expect("create peer connection");

    TestSession {
        pc,
        factory,
        observer,
    }
}

fn sim_pc(pc: &PeerConnection) -> &nativertc::webrtc::sim::peer_connection::RffiPeerConnection {
    unsafe { pc.rffi().as_ref() }.expect("live sim peer connection")
}

#[test]
fn offer_answer_flow() {
    let session = connect();
    let pc = &session.pc;

    let csd_observer = create_csd_observer();
    pc.create_offer(&csd_observer).expect("create offer");
    let offer = csd_observer.get_result().expect("offer result");
    assert_eq!("FAKE SDP", offer.to_sdp().expect("offer sdp"));

    let ssd_observer = create_ssd_observer();
    pc.set_local_description(&ssd_observer, offer)
        .expect("set local description");
    ssd_observer.get_result().expect("local description set");
    assert!(sim_pc(pc).local_description_set());

    let answer =
        SessionDescription::answer_from_sdp("answer sdp".to_string()).expect("parse answer");
    let ssd_observer = create_ssd_observer();
    pc.set_remote_description(&ssd_observer, answer)
        .expect("set remote description");
    ssd_observer.get_result().expect("remote description set");
    assert!(sim_pc(pc).remote_description_set());

    // Only valid once both descriptions are in place.
    pc.set_outgoing_media_enabled(true)
        .expect("enable outgoing media");
    assert_eq!(Some(true), sim_pc(pc).outgoing_media_enabled());
}

#[test]
fn ice_candidates_flow_both_ways() {
    let session = connect();
    let pc = &session.pc;

    let port = 1024 + (common::PRNG.gen::<u16>() % 10_000);
    let candidate = IceCandidate::new(
        "audio".to_string(),
        0,
        format!("candidate:842163049 1 udp 1677729535 198.51.100.5 {} typ srflx", port),
    );
    pc.add_ice_candidate(&candidate).expect("add candidate");
    assert_eq!(1, sim_pc(pc).ice_candidates().len());

    pc.remove_ice_candidates(std::slice::from_ref(&candidate))
        .expect("remove candidates");
    assert_eq!(1, sim_pc(pc).removed_ice_candidates());

    sim_pc(pc).inject_ice_candidate_gathered("audio", 0, "candidate:local 1 udp 1 10.0.0.1 5000");
    sim_pc(pc).inject_ice_connection_change(IceConnectionState::Connected);

    let events = session.observer.events();
    assert!(events.contains(&Event::IceCandidateGathered(
        "candidate:local 1 udp 1 10.0.0.1 5000".to_string()
    )));
    assert!(events.contains(&Event::IceConnectionChanged(IceConnectionState::Connected)));
}

#[test]
fn incoming_media_and_data_channels_reach_the_observer() {
    let session = connect();
    let pc = &session.pc;

    sim_pc(pc).inject_incoming_stream();
    sim_pc(pc).inject_incoming_data_channel("signaling");

    let events = session.observer.events();
    assert!(events.contains(&Event::IncomingMedia));
    assert!(events.contains(&Event::IncomingDataChannel("signaling".to_string())));
}

#[test]
fn data_channel_send_and_state() {
    let session = connect();
    let pc = &session.pc;

    let data_channel = pc.create_data_channel("signaling").expect("create channel");
    assert_eq!("signaling", data_channel.label().expect("label"));
    assert_eq!(Some(0), data_channel.id().expect("id"));
    assert_eq!(DataChannelState::Open, data_channel.state().expect("state"));
    assert_eq!(0, data_channel.buffered_amount().expect("buffered"));

    let payload = bytes::Bytes::from_static(b"hello");
    data_channel.send_data(&payload).expect("send");

    let rffi = unsafe { data_channel.rffi().as_ref() }.expect("live sim channel");
    assert_eq!(vec![b"hello".to_vec()], rffi.sent_messages());
}

#[derive(Default)]
struct RecordingDataChannelObserver {
    states: Arc<Mutex<Vec<DataChannelState>>>,
    messages: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl nativertc::webrtc::data_channel_observer::DataChannelObserverTrait
    for RecordingDataChannelObserver
{
    fn handle_state_changed(
        &mut self,
        state: DataChannelState,
    ) -> nativertc::common::Result<()> {
        self.states.lock().unwrap().push(state);
        Ok(())
    }

    fn handle_message_received(&mut self, message: bytes::Bytes) -> nativertc::common::Result<()> {
        self.messages.lock().unwrap().push(message.to_vec());
        Ok(())
    }
}

#[test]
fn data_channel_observer_sees_states_and_messages() {
    let session = connect();
    let pc = &session.pc;

    let data_channel = pc.create_data_channel("signaling").expect("create channel");
    let observer = Box::new(RecordingDataChannelObserver::default());
    let registration = unsafe {
        nativertc::webrtc::data_channel_observer::DataChannelObserver::register(
            &data_channel,
            webrtc::ptr::Borrowed::from_ptr(&*observer),
        )
    }
    .expect("register observer");

    let rffi = unsafe { data_channel.rffi().as_ref() }.expect("live sim channel");
    rffi.inject_message(b"ping");
    rffi.inject_state_change(2); // Closing
    rffi.inject_state_change(3); // Closed

    assert_eq!(vec![b"ping".to_vec()], observer.messages.lock().unwrap().clone());
    assert_eq!(
        vec![DataChannelState::Closing, DataChannelState::Closed],
        observer.states.lock().unwrap().clone()
    );
    assert_eq!(
        DataChannelState::Closed,
        data_channel.state().expect("state")
    );

    registration.unregister(&data_channel);
}

#[test]
fn stats_are_collected_and_serializable() {
    let session = connect();
    let pc = &session.pc;

    let handler_count = Arc::new(Mutex::new(0u32));
    let handler_count_in_handler = handler_count.clone();
    let stats_observer = create_stats_observer(Box::new(move |_report| {
        *handler_count_in_handler.lock().unwrap() += 1;
    }));

    pc.get_stats(&stats_observer).expect("get stats");

    assert_eq!(1, *handler_count.lock().unwrap());
    let report = stats_observer.last_report().expect("have report");
    assert_eq!(1, report.audio_senders.len());
    assert_eq!(1, report.video_senders.len());
    assert_eq!(640, report.video_senders[0].frame_width);

    let json = report.to_json().expect("serialize");
    assert!(json.contains("\"frames_encoded\":150"));
}

#[test]
fn sender_parameters_round_trip() {
    let session = connect();
    let pc = &session.pc;

    let senders = pc.senders().expect("senders");
    assert_eq!(2, senders.len());

    let video_sender = &senders[1];
    assert_eq!(MediaType::Video, video_sender.media_type().expect("kind"));

    let parameters = video_sender.parameters().expect("parameters");
    assert_eq!(1, parameters.encodings.len());
    assert_eq!(None, parameters.encodings[0].max_bitrate);

    video_sender
        .set_parameters(&RtpParameters {
            encodings: vec![RtpEncodingParameters {
                active: true,
                max_bitrate: Some(DataRate::from_kbps(1500)),
            }],
        })
        .expect("set parameters");

    let parameters = video_sender.parameters().expect("parameters");
    assert_eq!(
        Some(DataRate::from_kbps(1500)),
        parameters.encodings[0].max_bitrate
    );

    let receivers = pc.receivers().expect("receivers");
    assert_eq!(2, receivers.len());
    assert_eq!(MediaType::Audio, receivers[0].media_type().expect("kind"));
    assert_eq!(0x1001, receivers[0].track_id().expect("track id"));
}

#[test]
fn sender_capabilities_include_expected_codecs() {
    let session = connect();

    let audio = session
        .factory
        .rtp_sender_capabilities(MediaType::Audio)
        .expect("audio capabilities");
    assert_eq!(1, audio.codecs.len());
    assert_eq!("opus", audio.codecs[0].name);
    assert_eq!(48_000, audio.codecs[0].clock_rate);

    let video = session
        .factory
        .rtp_sender_capabilities(MediaType::Video)
        .expect("video capabilities");
    let names: Vec<&str> = video.codecs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(vec!["VP8", "VP9", "H264"], names);
    assert_eq!("profile-level-id=42e01f", video.codecs[2].sdp_fmtp_line);
}

#[test]
fn send_rates_reach_the_engine() {
    let session = connect();
    let pc = &session.pc;

    pc.set_send_rates(nativertc::webrtc::peer_connection::SendRates {
        min: Some(DataRate::from_kbps(100)),
        start: Some(DataRate::from_kbps(500)),
        max: Some(DataRate::from_kbps(2000)),
    })
    .expect("set send rates");

    assert_eq!(
        Some((100_000, 500_000, 2_000_000)),
        sim_pc(pc).send_rates()
    );
}

#[test]
fn close_marks_the_native_connection() {
    let session = connect();
    let pc = &session.pc;

    pc.close().expect("close");
    assert!(sim_pc(pc).closed());
}
