use crate::{
    num::{u14, u7},
    transport::SliceError,
    Channel, ChannelFilter, Config, Decoder, ErrorKind, FnHandler, Handler, MemoryTransport,
    Message, Parameter, Session, Step, SysExBuffer, DEFAULT_BAUD,
};

fn ch(n: u8) -> Channel {
    Channel::new(n).unwrap()
}

fn note_on(channel: u8, note: u8, velocity: u8) -> Message {
    Message::NoteOn {
        channel: ch(channel),
        note: u7::new(note),
        velocity: u7::new(velocity),
    }
}

fn note_off(channel: u8, note: u8, velocity: u8) -> Message {
    Message::NoteOff {
        channel: ch(channel),
        note: u7::new(note),
        velocity: u7::new(velocity),
    }
}

fn control_change(channel: u8, controller: u8, value: u8) -> Message {
    Message::ControlChange {
        channel: ch(channel),
        controller: u7::new(controller),
        value: u7::new(value),
    }
}

/// Decode a byte slice in one go, with the given configuration.
fn decode_with(bytes: &[u8], config: &Config) -> Vec<Message> {
    let mut msgs = Vec::new();
    Decoder::new().feed(bytes, config, &mut msgs, &mut ());
    msgs
}

fn decode(bytes: &[u8]) -> Vec<Message> {
    decode_with(bytes, &Config::new())
}

/// A session over an in-memory transport, collecting every message.
fn session() -> Session<MemoryTransport, Vec<Message>, SysExBuffer> {
    Session::with_sink(MemoryTransport::new(), Vec::new(), SysExBuffer::new())
}

mod decoder {
    use super::*;

    #[test]
    fn channel_messages() {
        assert_eq!(
            decode(&[
                0x85, 60, 20, // note off
                0x91, 61, 21, // note on
                0xA2, 62, 22, // velocity change
                0xB3, 7, 100, // control change
                0xC4, 5, // program change
                0xD5, 99, // after touch
            ]),
            [
                note_off(6, 60, 20),
                note_on(2, 61, 21),
                Message::VelocityChange {
                    channel: ch(3),
                    note: u7::new(62),
                    value: u7::new(22),
                },
                control_change(4, 7, 100),
                Message::ProgramChange {
                    channel: ch(5),
                    program: u7::new(5),
                },
                Message::ChannelAfterTouch {
                    channel: ch(6),
                    value: u7::new(99),
                },
            ]
        );
    }

    #[test]
    fn system_messages() {
        assert_eq!(
            decode(&[
                0xF2, 0x10, 0x02, 0xF3, 9, 0xF6, 0xF8, 0xFA, 0xFB, 0xFC, 0xFE, 0xFF
            ]),
            [
                Message::SongPosition(u14::new(0x02 << 7 | 0x10)),
                Message::SongSelect(u7::new(9)),
                Message::TuneRequest,
                Message::Sync,
                Message::Start,
                Message::Continue,
                Message::Stop,
                Message::ActiveSense,
                Message::Reset,
            ]
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert_eq!(decode(&[0x90, 0x3C, 0x00]), [note_off(1, 60, 0)]);
    }

    #[test]
    fn pitch_change_joins_halves() {
        assert_eq!(
            decode(&[0xE0, 0x7F, 0x01]),
            [Message::PitchChange {
                channel: ch(1),
                value: u14::new(255),
            }]
        );
        assert_eq!(
            decode(&[0xE3, 0x00, 0x40]),
            [Message::PitchChange {
                channel: ch(4),
                value: u14::new(0x2000),
            }]
        );
    }

    #[test]
    fn running_status() {
        assert_eq!(
            decode(&[0xB0, 7, 100, 10, 64, 11, 127]),
            [
                control_change(1, 7, 100),
                control_change(1, 10, 64),
                control_change(1, 11, 127),
            ]
        );
        // One-argument kinds too
        assert_eq!(
            decode(&[0xC2, 5, 6]),
            [
                Message::ProgramChange {
                    channel: ch(3),
                    program: u7::new(5),
                },
                Message::ProgramChange {
                    channel: ch(3),
                    program: u7::new(6),
                },
            ]
        );
    }

    #[test]
    fn running_status_applies_zero_velocity_rule() {
        assert_eq!(
            decode(&[0x90, 60, 100, 60, 0]),
            [note_on(1, 60, 100), note_off(1, 60, 0)]
        );
    }

    #[test]
    fn realtime_interleaves_with_partial_message() {
        assert_eq!(
            decode(&[0x90, 0x3C, 0xF8, 0x40]),
            [Message::Sync, note_on(1, 60, 64)]
        );
        assert_eq!(
            decode(&[0xF8, 0xB0, 0xFE, 7, 0xFA, 100]),
            [
                Message::Sync,
                Message::ActiveSense,
                Message::Start,
                control_change(1, 7, 100),
            ]
        );
    }

    #[test]
    fn realtime_keeps_running_status() {
        assert_eq!(
            decode(&[0x90, 60, 100, 0xF8, 62, 100]),
            [note_on(1, 60, 100), Message::Sync, note_on(1, 62, 100)]
        );
    }

    #[test]
    fn status_byte_abandons_partial_message() {
        assert_eq!(
            decode(&[0x90, 0x3C, 0xB0, 0x07, 0x64]),
            [control_change(1, 7, 100)]
        );
    }

    #[test]
    fn stray_data_bytes_are_ignored() {
        let mut decoder = Decoder::new();
        let mut msgs = Vec::new();
        decoder.feed(&[1, 2, 3], &Config::new(), &mut msgs, &mut ());
        assert!(msgs.is_empty());
        assert_eq!(decoder.args_received(), 0);
        assert_eq!(decoder.args_needed(), 0);
        decoder.feed(&[0x90, 60, 100], &Config::new(), &mut msgs, &mut ());
        assert_eq!(msgs, [note_on(1, 60, 100)]);
    }

    #[test]
    fn undefined_system_common_drops_running_status() {
        let mut decoder = Decoder::new();
        let mut msgs = Vec::new();
        decoder.feed(&[0x90, 60, 100, 0xF4, 62, 100], &Config::new(), &mut msgs, &mut ());
        assert_eq!(msgs, [note_on(1, 60, 100)]);
        assert_eq!(decoder.pending_status(), None);
        assert_eq!(decoder.args_needed(), 0);
    }

    #[test]
    fn undefined_realtime_is_transparent() {
        assert_eq!(
            decode(&[0x90, 60, 0xF9, 100, 0xFD, 62, 100]),
            [note_on(1, 60, 100), note_on(1, 62, 100)]
        );
    }

    #[test]
    fn state_accessors() {
        let mut decoder = Decoder::new();
        assert_eq!(decoder.step(0x93, ChannelFilter::All), Step::Nothing);
        assert_eq!(decoder.pending_status(), Some(0x93));
        assert_eq!(decoder.args_needed(), 2);
        assert_eq!(decoder.step(60, ChannelFilter::All), Step::Nothing);
        assert_eq!(decoder.args_received(), 1);
        assert!(decoder.is_partial());
        assert_eq!(
            decoder.step(100, ChannelFilter::All),
            Step::Message(note_on(4, 60, 100))
        );
        assert_eq!(decoder.args_received(), 0);
        assert_eq!(decoder.pending_status(), Some(0x93));
        assert!(!decoder.is_partial());

        decoder.reset();
        assert_eq!(decoder, Decoder::new());
    }

    #[test]
    fn channel_filter_keeps_alignment() {
        let only_2 = Config::new().with_channel_filter(ChannelFilter::Only(ch(2)));
        assert!(decode_with(&[0x90, 60, 100], &only_2).is_empty());
        assert_eq!(
            decode_with(&[0x90, 60, 100, 0x91, 61, 101, 0x90, 62, 102], &only_2),
            [note_on(2, 61, 101)]
        );
        // Filtered running status messages are consumed in full as well
        assert_eq!(
            decode_with(&[0x90, 60, 100, 62, 102, 0xF8, 0x91, 64, 1], &only_2),
            [Message::Sync, note_on(2, 64, 1)]
        );
    }

    #[test]
    fn channel_filter_ignores_system_messages() {
        let only_5 = Config::new().with_channel_filter(ChannelFilter::Only(ch(5)));
        assert_eq!(
            decode_with(&[0xF2, 1, 1, 0xF3, 2, 0xF6], &only_5),
            [
                Message::SongPosition(u14::new(129)),
                Message::SongSelect(u7::new(2)),
                Message::TuneRequest,
            ]
        );
    }

    #[test]
    fn channel_filter_change_applies_to_next_completion() {
        let mut decoder = Decoder::new();
        let mut config = Config::new().with_channel_filter(ChannelFilter::Only(ch(3)));
        let mut msgs = Vec::new();
        decoder.feed(&[0x90, 60], &config, &mut msgs, &mut ());
        config.set_channel_filter(ChannelFilter::All);
        decoder.feed(&[100], &config, &mut msgs, &mut ());
        assert_eq!(msgs, [note_on(1, 60, 100)]);
    }

    #[test]
    fn proprietary_passthrough() {
        let mut decoder = Decoder::new();
        let mut msgs = Vec::new();
        let mut sysex = SysExBuffer::new();
        decoder.feed(
            &[0xF0, 0x41, 0x90, 0xF8, 0x00, 0xFF, 0xF7, 0xF8],
            &Config::new(),
            &mut msgs,
            &mut sysex,
        );
        assert_eq!(sysex.dumps(), [vec![0x41, 0x90, 0xF8, 0x00, 0xFF]]);
        assert_eq!(sysex.partial(), None);
        // Only the realtime byte after the bracket is a message
        assert_eq!(msgs, [Message::Sync]);
    }

    #[test]
    fn proprietary_bracket_survives_chunking() {
        let mut decoder = Decoder::new();
        let mut msgs = Vec::new();
        let mut sysex = SysExBuffer::new();
        decoder.feed(&[0xF0, 1, 2], &Config::new(), &mut msgs, &mut sysex);
        assert!(decoder.in_proprietary());
        assert_eq!(sysex.partial(), Some(&[1, 2][..]));
        decoder.feed(&[0x93, 4, 0xF7], &Config::new(), &mut msgs, &mut sysex);
        assert!(!decoder.in_proprietary());
        assert_eq!(sysex.take_dumps(), [vec![1, 2, 0x93, 4]]);
        assert!(msgs.is_empty());
    }

    #[test]
    fn running_status_carries_across_proprietary_bracket() {
        let mut decoder = Decoder::new();
        let mut msgs = Vec::new();
        let mut sysex = SysExBuffer::new();
        decoder.feed(
            &[0x90, 60, 100, 0xF0, 0x01, 0xF7, 62, 100],
            &Config::new(),
            &mut msgs,
            &mut sysex,
        );
        assert_eq!(msgs, [note_on(1, 60, 100), note_on(1, 62, 100)]);
        assert_eq!(sysex.dumps(), [vec![0x01]]);
        assert_eq!(decoder.pending_status(), Some(0x90));
    }

    #[test]
    fn stray_end_of_proprietary_data() {
        let mut decoder = Decoder::new();
        assert_eq!(decoder.step(0xF7, ChannelFilter::All), Step::Nothing);
        assert_eq!(decoder.step(0xF0, ChannelFilter::All), Step::BracketOpen);
        assert_eq!(decoder.step(0x80, ChannelFilter::All), Step::BracketData(0x80));
        assert_eq!(decoder.step(0xF7, ChannelFilter::All), Step::BracketClose);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn chunking_does_not_change_dispatch(
            bytes in prop::collection::vec(any::<u8>(), 0..512),
            cuts in prop::collection::vec(any::<usize>(), 0..16),
            filter in 0u8..=16,
        ) {
            let filter = ChannelFilter::from_int(filter).unwrap();
            let config = Config::new().with_channel_filter(filter);
            let mut whole_msgs = Vec::new();
            let mut whole_sysex = SysExBuffer::new();
            Decoder::new().feed(&bytes, &config, &mut whole_msgs, &mut whole_sysex);

            // Filtering only drops messages, it never changes how the rest are decoded
            let unfiltered: Vec<Message> = decode(&bytes)
                .into_iter()
                .filter(|msg| msg.channel().map_or(true, |channel| filter.accepts(channel)))
                .collect();
            prop_assert_eq!(&whole_msgs, &unfiltered);

            let mut cuts: Vec<usize> = cuts.into_iter().map(|cut| cut % (bytes.len() + 1)).collect();
            cuts.sort_unstable();
            let mut decoder = Decoder::new();
            let mut chunked_msgs = Vec::new();
            let mut chunked_sysex = SysExBuffer::new();
            let mut start = 0;
            for cut in cuts.into_iter().chain(Some(bytes.len())) {
                decoder.feed(&bytes[start..cut], &config, &mut chunked_msgs, &mut chunked_sysex);
                start = cut;
            }

            prop_assert_eq!(whole_msgs, chunked_msgs);
            prop_assert_eq!(whole_sysex, chunked_sysex);
        }

        #[test]
        fn decoder_never_overruns_arguments(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let mut decoder = Decoder::new();
            for byte in bytes {
                decoder.step(byte, ChannelFilter::All);
                prop_assert!(decoder.args_received() <= decoder.args_needed());
                prop_assert!(decoder.args_received() < 2);
            }
        }
    }
}

mod encoder {
    use super::*;

    #[test]
    fn round_trip_full_command() {
        let mut session = session();
        session.set_parameter(Parameter::SendFullCommands, 1).unwrap();
        session.send_note_on(ch(1), u7::new(60), u7::new(100)).unwrap();
        let bytes = session.transport_mut().take_written();
        assert_eq!(bytes, [0x90, 60, 100]);
        assert_eq!(decode(&bytes), [note_on(1, 60, 100)]);
    }

    #[test]
    fn running_status_skips_repeated_status() {
        let mut session = session();
        session.send_control_change(ch(1), u7::new(7), u7::new(100)).unwrap();
        session.send_control_change(ch(1), u7::new(10), u7::new(64)).unwrap();
        let bytes = session.transport_mut().take_written();
        assert_eq!(bytes, [0xB0, 7, 100, 10, 64]);
        assert_eq!(
            decode(&bytes),
            [control_change(1, 7, 100), control_change(1, 10, 64)]
        );
    }

    #[test]
    fn status_changes_with_kind_and_channel() {
        let mut session = session();
        session.send_note_on(ch(1), u7::new(60), u7::new(100)).unwrap();
        session.send_note_on(ch(2), u7::new(60), u7::new(100)).unwrap();
        session.send_note_off(ch(2), u7::new(60), u7::new(0)).unwrap();
        session.send_velocity_change(ch(16), u7::new(1), u7::new(2)).unwrap();
        session.send_program_change(ch(16), u7::new(3)).unwrap();
        session.send_after_touch(ch(16), u7::new(4)).unwrap();
        session.send_after_touch(ch(16), u7::new(5)).unwrap();
        assert_eq!(
            session.transport().written(),
            &[
                0x90, 60, 100, 0x91, 60, 100, 0x81, 60, 0, 0xAF, 1, 2, 0xCF, 3, 0xDF, 4, 5
            ][..]
        );
    }

    #[test]
    fn full_commands_repeat_status() {
        let mut session = session();
        session.config_mut().set_send_full_commands(true);
        session.send_note_on(ch(1), u7::new(60), u7::new(100)).unwrap();
        session.send_note_on(ch(1), u7::new(62), u7::new(100)).unwrap();
        // The status is still tracked while full commands are on
        session.config_mut().set_send_full_commands(false);
        session.send_note_on(ch(1), u7::new(64), u7::new(100)).unwrap();
        assert_eq!(
            session.transport().written(),
            &[0x90, 60, 100, 0x90, 62, 100, 64, 100][..]
        );
    }

    #[test]
    fn global_messages_always_send_status() {
        let mut session = session();
        session.send_pitch_change(u14::new(0x2000)).unwrap();
        session.send_pitch_change(u14::new(0x3FFF)).unwrap();
        session.send_song_position(u14::new(300)).unwrap();
        session.send_song_position(u14::new(301)).unwrap();
        session.send_song_select(u7::new(1)).unwrap();
        session.send_song_select(u7::new(2)).unwrap();
        session.send_tune_request().unwrap();
        assert_eq!(
            session.transport().written(),
            &[
                0xE0, 0x00, 0x40, 0xE0, 0x7F, 0x7F, 0xF2, 44, 2, 0xF2, 45, 2, 0xF3, 1, 0xF3, 2,
                0xF6
            ][..]
        );
    }

    #[test]
    fn system_common_resets_running_status() {
        let mut session = session();
        session.send_note_on(ch(1), u7::new(60), u7::new(100)).unwrap();
        session.send_song_select(u7::new(3)).unwrap();
        session.send_note_on(ch(1), u7::new(62), u7::new(100)).unwrap();
        let bytes = session.transport_mut().take_written();
        assert_eq!(bytes, [0x90, 60, 100, 0xF3, 3, 0x90, 62, 100]);
        assert_eq!(
            decode(&bytes),
            [
                note_on(1, 60, 100),
                Message::SongSelect(u7::new(3)),
                note_on(1, 62, 100)
            ]
        );
    }

    #[test]
    fn realtime_replaces_running_status() {
        let mut session = session();
        session.send_control_change(ch(1), u7::new(7), u7::new(1)).unwrap();
        session.send_sync().unwrap();
        assert_eq!(session.encoder().last_status(), Some(0xF8));
        session.send_control_change(ch(1), u7::new(7), u7::new(2)).unwrap();
        session.send_start().unwrap();
        session.send_continue().unwrap();
        session.send_stop().unwrap();
        session.send_active_sense().unwrap();
        session.send_reset().unwrap();
        let bytes = session.transport_mut().take_written();
        assert_eq!(
            bytes,
            [0xB0, 7, 1, 0xF8, 0xB0, 7, 2, 0xFA, 0xFB, 0xFC, 0xFE, 0xFF]
        );
        assert_eq!(session.encoder().last_status(), Some(0xFF));
        assert_eq!(
            decode(&bytes),
            [
                control_change(1, 7, 1),
                Message::Sync,
                control_change(1, 7, 2),
                Message::Start,
                Message::Continue,
                Message::Stop,
                Message::ActiveSense,
                Message::Reset,
            ]
        );
    }

    #[test]
    fn data_is_masked_to_seven_bits() {
        let mut session = session();
        session
            .send_control_change(ch(1), u7::from(200), u7::from(0xFF))
            .unwrap();
        session.send_song_position(u14::from(0xFFFF)).unwrap();
        assert_eq!(
            session.transport().written(),
            &[0xB0, 200 & 0x7F, 0x7F, 0xF2, 0x7F, 0x7F][..]
        );
    }

    #[test]
    fn reset_forgets_status() {
        let mut session = session();
        session.send_note_on(ch(1), u7::new(60), u7::new(100)).unwrap();
        session.reset_encoder();
        session.send_note_on(ch(1), u7::new(62), u7::new(100)).unwrap();
        assert_eq!(
            session.transport().written(),
            &[0x90, 60, 100, 0x90, 62, 100][..]
        );
    }

    #[test]
    fn slice_transport_runs_out_of_space() {
        let mut out = [0; 4];
        let mut transport = crate::transport::SliceTransport::new(&[], &mut out);
        let mut encoder = crate::Encoder::new();
        encoder
            .encode(&note_on(1, 60, 100), false, &mut transport)
            .unwrap();
        assert_eq!(
            encoder.encode(&note_on(2, 60, 100), false, &mut transport),
            Err(SliceError::OutOfSpace)
        );
        assert_eq!(transport.written(), &[0x90, 60, 100, 0x91][..]);
    }
}

mod message {
    use super::*;

    #[test]
    fn parse_packets() {
        assert_eq!(Message::parse(&[0x94, 60, 100]).unwrap(), note_on(5, 60, 100));
        // Kept as-is, unlike the streaming decoder
        assert_eq!(Message::parse(&[0x90, 60, 0]).unwrap(), note_on(1, 60, 0));
        assert_eq!(
            Message::parse(&[0xE0, 0x7F, 0x01]).unwrap(),
            Message::PitchChange {
                channel: ch(1),
                value: u14::new(255),
            }
        );
        assert_eq!(Message::parse(&[0xF8]).unwrap(), Message::Sync);
        assert_eq!(
            Message::parse(&[0xF3, 7]).unwrap(),
            Message::SongSelect(u7::new(7))
        );
    }

    #[test]
    fn parse_rejects_bad_packets() {
        for raw in &[
            &[][..],
            &[60, 100][..],
            &[0x90, 60][..],
            &[0x90, 0x80, 0x00][..],
            &[0xF0, 1, 0xF7][..],
            &[0xF7][..],
            &[0xF1, 0][..],
            &[0xFD][..],
        ] {
            let err = Message::parse(raw).unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::Invalid(_)),
                "unexpected error for {:?}: {}",
                raw,
                err
            );
        }
    }

    #[test]
    fn parse_error_causes() {
        let err = Message::parse(&[0x90, 0x80, 0x00]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid("failed to read data byte"));
        assert_eq!(
            err.to_string(),
            "rejected midi input: failed to read data byte"
        );
        let causes: Vec<ErrorKind> = err.causes().map(|cause| cause.kind()).collect();
        if cfg!(all(debug_assertions, feature = "alloc")) {
            assert_eq!(
                causes,
                [
                    ErrorKind::Invalid("failed to read data byte"),
                    ErrorKind::Invalid("invalid integer with top bits set"),
                ]
            );
            assert!(format!("{:?}", err).contains("caused by: rejected midi input"));
        } else {
            assert_eq!(causes, [ErrorKind::Invalid("failed to read data byte")]);
            assert!(err.source().is_none());
        }
    }

    #[test]
    fn parse_trailing_bytes() {
        let res = Message::parse(&[0xC0, 5, 9]);
        if cfg!(feature = "strict") {
            assert!(matches!(res.unwrap_err().kind(), ErrorKind::Malformed(_)));
        } else {
            assert_eq!(
                res.unwrap(),
                Message::ProgramChange {
                    channel: ch(1),
                    program: u7::new(5),
                }
            );
        }
    }

    #[test]
    fn status_and_channel() {
        assert_eq!(note_off(16, 1, 1).status(), 0x8F);
        assert_eq!(control_change(3, 1, 1).channel(), Some(ch(3)));
        assert_eq!(Message::SongSelect(u7::new(1)).channel(), None);
        assert!(Message::Reset.is_realtime());
        assert!(Message::Sync.is_realtime());
        assert!(!Message::TuneRequest.is_realtime());
        assert!(!note_on(1, 1, 1).is_realtime());
    }

    #[test]
    fn channel_numbers() {
        assert_eq!(Channel::new(0), None);
        assert_eq!(Channel::new(17), None);
        assert_eq!(ch(16).nibble().as_int(), 15);
        assert_eq!(Channel::from_int_lossy(17), ch(1));
        assert_eq!(Channel::from_int_lossy(0), ch(16));
        assert_eq!(u14::new(0x1234).halves(), (u7::new(0x34), u7::new(0x24)));
    }
}

mod session {
    use super::*;

    #[test]
    fn begin_configures_transport_and_filter() {
        let mut session = session();
        session
            .begin(ChannelFilter::Only(ch(10)), DEFAULT_BAUD)
            .unwrap();
        assert_eq!(session.transport().baud(), Some(31_250));
        assert_eq!(session.get_parameter(Parameter::ChannelFilter), 10);
        session.begin_default().unwrap();
        assert_eq!(session.config().channel_filter(), ChannelFilter::All);
    }

    #[test]
    fn poll_drains_transport() {
        let mut session = session();
        session.transport_mut().receive(&[0x90, 60]);
        assert_eq!(session.poll(), 2);
        assert!(session.handler().is_empty());
        assert!(session.decoder().is_partial());
        assert_eq!(session.poll(), 0);
        session.transport_mut().receive(&[100, 0xF0, 1, 2, 0xF7]);
        assert_eq!(session.poll(), 5);
        assert_eq!(session.transport().pending(), 0);

        let (_, msgs, sysex) = session.into_parts();
        assert_eq!(msgs, [note_on(1, 60, 100)]);
        assert_eq!(sysex.dumps(), [vec![1, 2]]);
    }

    #[test]
    fn parameters() {
        let mut session = session();
        assert_eq!(session.get_parameter(Parameter::ChannelFilter), 0);
        assert_eq!(session.get_parameter(Parameter::SendFullCommands), 0);

        session.set_parameter(Parameter::ChannelFilter, 16).unwrap();
        assert_eq!(
            session.config().channel_filter(),
            ChannelFilter::Only(ch(16))
        );
        let err = session
            .set_parameter(Parameter::ChannelFilter, 17)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Invalid(_)));
        assert_eq!(session.get_parameter(Parameter::ChannelFilter), 16);

        session.set_parameter(Parameter::ChannelFilter, 0).unwrap();
        assert_eq!(session.config().channel_filter(), ChannelFilter::All);

        session.set_parameter(Parameter::SendFullCommands, 42).unwrap();
        assert!(session.config().send_full_commands());
        assert_eq!(session.get_parameter(Parameter::SendFullCommands), 1);
    }

    #[test]
    fn loopback() {
        let mut sender = session();
        sender.send_note_on(ch(1), u7::new(60), u7::new(100)).unwrap();
        sender.send_note_on(ch(1), u7::new(60), u7::new(0)).unwrap();
        sender.send_pitch_change(u14::new(8192)).unwrap();
        sender.send_sync().unwrap();
        let bytes = sender.transport_mut().take_written();

        let mut receiver = session();
        // Feed the bytes one poll at a time
        for &byte in &bytes {
            receiver.transport_mut().receive(&[byte]);
            receiver.poll();
        }
        assert_eq!(
            receiver.handler(),
            &[
                note_on(1, 60, 100),
                note_off(1, 60, 0),
                Message::PitchChange {
                    channel: ch(1),
                    value: u14::new(8192),
                },
                Message::Sync,
            ]
        );
    }

    #[test]
    fn handler_hooks() {
        #[derive(Default)]
        struct Counts {
            notes: u32,
            controls: u32,
            continues: u32,
            pitch: Option<u16>,
        }
        impl Handler for Counts {
            fn note_on(&mut self, _: Channel, _: u7, _: u7) {
                self.notes += 1;
            }
            fn note_off(&mut self, _: Channel, _: u7, _: u7) {
                self.notes += 1;
            }
            fn control_change(&mut self, channel: Channel, _: u7, _: u7) {
                assert_eq!(channel, 2);
                self.controls += 1;
            }
            fn pitch_change(&mut self, _: Channel, value: u14) {
                self.pitch = Some(value.as_int());
            }
            fn continue_playback(&mut self) {
                self.continues += 1;
            }
        }
        let mut counts = Counts::default();
        Decoder::new().feed(
            &[0x90, 1, 2, 1, 0, 0xB1, 3, 4, 0xFB, 0xE5, 0, 1, 0xFC],
            &Config::new(),
            &mut counts,
            &mut (),
        );
        assert_eq!(counts.notes, 2);
        assert_eq!(counts.controls, 1);
        assert_eq!(counts.continues, 1);
        assert_eq!(counts.pitch, Some(128));
    }

    #[test]
    fn closure_handler() {
        let mut seen = 0;
        let mut session = Session::new(
            MemoryTransport::new(),
            FnHandler(|msg: Message| {
                assert!(msg.is_realtime());
                seen += 1;
            }),
        );
        session.transport_mut().receive(&[0xF8, 0xF8, 0xFE]);
        session.poll();
        drop(session);
        assert_eq!(seen, 3);
    }

    #[cfg(feature = "std")]
    #[test]
    fn io_transport() {
        use crate::transport::IoTransport;
        use std::io::{self, Read, Write};

        struct Pipe {
            input: io::Cursor<Vec<u8>>,
            output: Vec<u8>,
        }
        impl Read for Pipe {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                self.input.read(buf)
            }
        }
        impl Write for Pipe {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.output.write(buf)
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let pipe = Pipe {
            input: io::Cursor::new(vec![0xB0, 1, 2, 3, 4]),
            output: Vec::new(),
        };
        let mut session = Session::new(IoTransport(pipe), Vec::<Message>::new());
        assert_eq!(session.poll(), 5);
        session.send_stop().unwrap();
        let (IoTransport(pipe), msgs, ()) = session.into_parts();
        assert_eq!(msgs, [control_change(1, 1, 2), control_change(1, 3, 4)]);
        assert_eq!(pipe.output, [0xFC]);
    }
}
