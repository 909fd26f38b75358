//! The typed MIDI messages carried over the serial line, and their wire constants.

use crate::{
    prelude::*,
    transport::{Transport, WriteResult},
};

/// Status bytes as they appear on the wire.
///
/// Channel message constants carry channel nibble `0`; or them with
/// [`Channel::nibble`](../struct.Channel.html#method.nibble) to address another channel.
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const VELOCITY_CHANGE: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const AFTER_TOUCH: u8 = 0xD0;
    pub const PITCH_CHANGE: u8 = 0xE0;
    pub const START_PROPRIETARY: u8 = 0xF0;
    pub const SONG_POSITION: u8 = 0xF2;
    pub const SONG_SELECT: u8 = 0xF3;
    pub const TUNE_REQUEST: u8 = 0xF6;
    pub const END_PROPRIETARY: u8 = 0xF7;
    pub const SYNC: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;
    pub const ACTIVE_SENSE: u8 = 0xFE;
    pub const RESET: u8 = 0xFF;
}

/// The kind part of a status byte: the high nibble for channel messages, the byte itself for
/// system messages.
#[inline]
pub(crate) fn status_kind(status: u8) -> u8 {
    if status < 0xF0 {
        status & 0xF0
    } else {
        status
    }
}

/// How many data bytes follow the given status byte, or `None` if the status does not start a
/// message this crate understands (including both proprietary bracket bytes).
pub(crate) fn data_len(status: u8) -> Option<usize> {
    use self::status::*;
    match status_kind(status) {
        NOTE_OFF | NOTE_ON | VELOCITY_CHANGE | CONTROL_CHANGE | PITCH_CHANGE | SONG_POSITION => {
            Some(2)
        }
        PROGRAM_CHANGE | AFTER_TOUCH | SONG_SELECT => Some(1),
        TUNE_REQUEST | SYNC | START | CONTINUE | STOP | ACTIVE_SENSE | RESET => Some(0),
        _ => None,
    }
}

/// A single MIDI message, as sent or received over a serial link.
///
/// Channel messages carry the channel they are addressed to.
/// System messages are global and carry no channel.
///
/// Pitch changes are channel messages on the wire, but the classic serial protocol sends them as
/// global messages on status `0xE0`. Received pitch changes keep the channel they arrived on.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Message {
    /// Stop playing a note.
    NoteOff {
        channel: Channel,
        note: u7,
        velocity: u7,
    },
    /// Start playing a note.
    ///
    /// Receivers treat a `NoteOn` with velocity `0` as a `NoteOff`.
    NoteOn {
        channel: Channel,
        note: u7,
        velocity: u7,
    },
    /// Change the pressure of a note that is already playing (polyphonic aftertouch).
    VelocityChange {
        channel: Channel,
        note: u7,
        value: u7,
    },
    /// Set a controller to a new value.
    ControlChange {
        channel: Channel,
        controller: u7,
        value: u7,
    },
    /// Select the instrument to play on a channel.
    ProgramChange { channel: Channel, program: u7 },
    /// Change the pressure of all notes on a channel at once.
    ChannelAfterTouch { channel: Channel, value: u7 },
    /// Bend the pitch of a channel. `0x2000` is the center position.
    PitchChange { channel: Channel, value: u14 },
    /// The number of MIDI beats (6 x MIDI clocks) elapsed since the start of the song.
    SongPosition(u14),
    /// Select a song by index.
    SongSelect(u7),
    /// Request all oscillators to be tuned.
    TuneRequest,
    /// Timing clock, sent 24 times per quarter note.
    Sync,
    /// Start playing from the beginning of the song.
    Start,
    /// Continue playing from the current song position.
    Continue,
    /// Stop playing, keeping the current song position.
    Stop,
    /// Keep-alive, sent at least every 300ms once a sender begins transmitting it.
    ActiveSense,
    /// Reset to the power-up state.
    Reset,
}
impl Message {
    /// Parse a complete, delimited message from its raw bytes: one status byte followed by
    /// exactly the data bytes its kind needs.
    ///
    /// This is the checked counterpart of the streaming [`Decoder`](../struct.Decoder.html),
    /// suitable for packet-oriented APIs. Unlike the decoder it reports errors, does not apply
    /// the channel filter, and keeps zero-velocity `NoteOn`s as they are.
    ///
    /// Proprietary bracket bytes (`0xF0`, `0xF7`) and reserved status bytes are rejected.
    /// Extra trailing bytes are ignored, unless the `strict` feature is enabled.
    pub fn parse(raw: &[u8]) -> Result<Message> {
        let (&status, data) = raw
            .split_first()
            .ok_or_else(|| err_invalid!("no status byte"))?;
        ensure!(status >= 0x80, err_invalid!("first byte is not a status byte"));
        let len = data_len(status).ok_or_else(|| err_invalid!("unsupported status byte"))?;
        let data = data
            .get(..len)
            .ok_or_else(|| err_invalid!("not enough data bytes"))?;
        if cfg!(feature = "strict") {
            ensure!(
                raw.len() == 1 + len,
                err_malformed!("trailing bytes after message")
            );
        }
        let mut args = [u7::new(0); 2];
        for (arg, &byte) in args.iter_mut().zip(data) {
            *arg = u7::check_int(byte).context(err_invalid!("failed to read data byte"))?;
        }
        let (first, second) = match len {
            2 => (args[0], args[1]),
            _ => (u7::new(0), args[0]),
        };
        Message::from_parts(status, first, second)
            .ok_or_else(|| err_invalid!("unsupported status byte").into())
    }

    /// Build a message from its status byte and its data arguments.
    ///
    /// `second` is the last data byte received, which is the only argument of one-argument
    /// kinds. `first` is only meaningful for two-argument kinds.
    pub(crate) fn from_parts(status: u8, first: u7, second: u7) -> Option<Message> {
        use self::status::*;
        let channel = Channel::from_nibble(u4::new(status));
        let msg = match status_kind(status) {
            NOTE_OFF => Message::NoteOff {
                channel,
                note: first,
                velocity: second,
            },
            NOTE_ON => Message::NoteOn {
                channel,
                note: first,
                velocity: second,
            },
            VELOCITY_CHANGE => Message::VelocityChange {
                channel,
                note: first,
                value: second,
            },
            CONTROL_CHANGE => Message::ControlChange {
                channel,
                controller: first,
                value: second,
            },
            PROGRAM_CHANGE => Message::ProgramChange {
                channel,
                program: second,
            },
            AFTER_TOUCH => Message::ChannelAfterTouch {
                channel,
                value: second,
            },
            PITCH_CHANGE => Message::PitchChange {
                channel,
                value: u14::from_halves(first, second),
            },
            SONG_POSITION => Message::SongPosition(u14::from_halves(first, second)),
            SONG_SELECT => Message::SongSelect(second),
            TUNE_REQUEST => Message::TuneRequest,
            SYNC => Message::Sync,
            START => Message::Start,
            CONTINUE => Message::Continue,
            STOP => Message::Stop,
            ACTIVE_SENSE => Message::ActiveSense,
            RESET => Message::Reset,
            _ => return None,
        };
        Some(msg)
    }

    /// Rewrite a `NoteOn` with velocity `0` as the `NoteOff` it stands for.
    /// Any other message is returned unchanged.
    #[inline]
    pub fn normalized(self) -> Message {
        match self {
            Message::NoteOn {
                channel,
                note,
                velocity,
            } if velocity.as_int() == 0 => Message::NoteOff {
                channel,
                note,
                velocity,
            },
            msg => msg,
        }
    }

    /// The canonical status byte of this message.
    pub fn status(&self) -> u8 {
        use self::status::*;
        let (base, channel) = match *self {
            Message::NoteOff { channel, .. } => (NOTE_OFF, channel),
            Message::NoteOn { channel, .. } => (NOTE_ON, channel),
            Message::VelocityChange { channel, .. } => (VELOCITY_CHANGE, channel),
            Message::ControlChange { channel, .. } => (CONTROL_CHANGE, channel),
            Message::ProgramChange { channel, .. } => (PROGRAM_CHANGE, channel),
            Message::ChannelAfterTouch { channel, .. } => (AFTER_TOUCH, channel),
            Message::PitchChange { channel, .. } => (PITCH_CHANGE, channel),
            Message::SongPosition(_) => return SONG_POSITION,
            Message::SongSelect(_) => return SONG_SELECT,
            Message::TuneRequest => return TUNE_REQUEST,
            Message::Sync => return SYNC,
            Message::Start => return START,
            Message::Continue => return CONTINUE,
            Message::Stop => return STOP,
            Message::ActiveSense => return ACTIVE_SENSE,
            Message::Reset => return RESET,
        };
        base | channel.nibble().as_int()
    }

    /// The channel this message is addressed to, or `None` for system messages.
    pub fn channel(&self) -> Option<Channel> {
        match *self {
            Message::NoteOff { channel, .. }
            | Message::NoteOn { channel, .. }
            | Message::VelocityChange { channel, .. }
            | Message::ControlChange { channel, .. }
            | Message::ProgramChange { channel, .. }
            | Message::ChannelAfterTouch { channel, .. }
            | Message::PitchChange { channel, .. } => Some(channel),
            _ => None,
        }
    }

    /// Whether this is a one-byte System Realtime message, which may appear anywhere in a stream,
    /// even between the data bytes of another message.
    #[inline]
    pub fn is_realtime(&self) -> bool {
        self.status() >= status::SYNC
    }

    /// Whether the encoder may skip this message's status byte when it repeats.
    ///
    /// Only channel voice messages take part in running status. Pitch changes are sent as global
    /// messages and always include their status.
    #[inline]
    pub(crate) fn uses_running_status(&self) -> bool {
        match self {
            Message::PitchChange { .. } => false,
            msg => msg.channel().is_some(),
        }
    }

    /// Write the data bytes of this message, without the status byte.
    pub(crate) fn write_data<T: Transport + ?Sized>(&self, out: &mut T) -> WriteResult<T> {
        match *self {
            Message::NoteOff { note, velocity, .. } | Message::NoteOn { note, velocity, .. } => {
                out.write_byte(note.as_int())?;
                out.write_byte(velocity.as_int())
            }
            Message::VelocityChange { note, value, .. } => {
                out.write_byte(note.as_int())?;
                out.write_byte(value.as_int())
            }
            Message::ControlChange {
                controller, value, ..
            } => {
                out.write_byte(controller.as_int())?;
                out.write_byte(value.as_int())
            }
            Message::ProgramChange { program, .. } => out.write_byte(program.as_int()),
            Message::ChannelAfterTouch { value, .. } => out.write_byte(value.as_int()),
            Message::PitchChange { value, .. } | Message::SongPosition(value) => {
                let (low, high) = value.halves();
                out.write_byte(low.as_int())?;
                out.write_byte(high.as_int())
            }
            Message::SongSelect(song) => out.write_byte(song.as_int()),
            Message::TuneRequest
            | Message::Sync
            | Message::Start
            | Message::Continue
            | Message::Stop
            | Message::ActiveSense
            | Message::Reset => Ok(()),
        }
    }
}
