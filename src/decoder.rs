//! The streaming decoder: a resumable state machine turning raw serial bytes into messages.
//!
//! Bytes on a serial MIDI line are not delimited in any way, so the decoder keeps track of the
//! message being assembled across calls. Feeding bytes one at a time or all at once produces the
//! exact same dispatch sequence.
//!
//! The decoder handles the usual quirks of a live MIDI stream:
//!
//! - **Running status**: after a complete channel message further data bytes are decoded as more
//!     messages of the same status, until a new status byte arrives.
//! - **Realtime interleaving**: single-byte system messages may appear anywhere, even between the
//!     data bytes of another message, without disturbing it.
//! - **Resynchronization**: any other status byte abandons a partial message, so a glitch on the
//!     line never affects more than one message.
//! - **Proprietary brackets**: everything between `0xF0` and `0xF7` is handed to a
//!     [`ProprietarySink`](../trait.ProprietarySink.html) without interpretation. The message
//!     state from before the bracket is picked up again once it closes.

use crate::{
    handler::{Handler, ProprietarySink},
    message::{status, status_kind},
    prelude::*,
};

/// What a single byte turned into.
///
/// Produced by [`Decoder::step`](struct.Decoder.html#method.step).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Step {
    /// The byte was consumed without completing anything.
    Nothing,
    /// The byte completed a message that passed the channel filter.
    Message(Message),
    /// A proprietary bracket was opened.
    BracketOpen,
    /// A payload byte inside a proprietary bracket.
    BracketData(u8),
    /// The open proprietary bracket was closed.
    BracketClose,
}

/// A streaming raw MIDI decoder, taking undelimited bytes straight off a serial line.
///
/// The decoder owns all of its state and never allocates. Read the
/// [module documentation](decoder/index.html) for details on how the stream is interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Decoder {
    in_proprietary: bool,
    pending_status: Option<u8>,
    args_received: u8,
    args_needed: u8,
    first_arg: u7,
}
impl Decoder {
    /// Create a decoder waiting for its first status byte.
    #[inline]
    pub fn new() -> Decoder {
        Decoder::default()
    }

    /// Forget any partial message, running status and open bracket.
    #[inline]
    pub fn reset(&mut self) {
        *self = Decoder::new();
    }

    /// Whether the decoder is inside a proprietary bracket.
    #[inline]
    pub fn in_proprietary(&self) -> bool {
        self.in_proprietary
    }

    /// The status byte that incoming data bytes are decoded against, if any.
    ///
    /// This is kept after a message completes, to decode running status.
    #[inline]
    pub fn pending_status(&self) -> Option<u8> {
        self.pending_status
    }

    /// How many data bytes of the current message have arrived.
    #[inline]
    pub fn args_received(&self) -> u8 {
        self.args_received
    }

    /// How many data bytes the current status needs, `0` if there is no pending status.
    #[inline]
    pub fn args_needed(&self) -> u8 {
        self.args_needed
    }

    /// Whether part of a message has been received but not completed yet.
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.args_received > 0
    }

    /// Advance the state machine by one byte, returning what the byte produced.
    ///
    /// `filter` decides whether a completed channel message is reported. Filtered messages are
    /// still consumed in full, so the decoder stays aligned either way.
    pub fn step(&mut self, byte: u8, filter: ChannelFilter) -> Step {
        if self.in_proprietary && byte != status::END_PROPRIETARY {
            return Step::BracketData(byte);
        }
        if byte >= 0x80 {
            self.status_byte(byte)
        } else {
            self.data_byte(u7::new(byte), filter)
        }
    }

    fn status_byte(&mut self, byte: u8) -> Step {
        use crate::message::status::*;
        match status_kind(byte) {
            NOTE_OFF | NOTE_ON | VELOCITY_CHANGE | CONTROL_CHANGE | PITCH_CHANGE | SONG_POSITION => {
                self.expect(byte, 2);
                Step::Nothing
            }
            PROGRAM_CHANGE | AFTER_TOUCH | SONG_SELECT => {
                self.expect(byte, 1);
                Step::Nothing
            }
            // Brackets leave the pending status alone, so running status carries across them.
            START_PROPRIETARY => {
                self.in_proprietary = true;
                Step::BracketOpen
            }
            END_PROPRIETARY => {
                if mem::replace(&mut self.in_proprietary, false) {
                    Step::BracketClose
                } else {
                    tracing::trace!("end of proprietary data outside of a bracket");
                    Step::Nothing
                }
            }
            // Single-byte system messages leave any partial message untouched, so it can resume
            // right after them.
            TUNE_REQUEST | SYNC | START | CONTINUE | STOP | ACTIVE_SENSE | RESET => {
                match Message::from_parts(byte, u7::new(0), u7::new(0)) {
                    Some(msg) => Step::Message(msg),
                    None => Step::Nothing,
                }
            }
            0xF8..=0xFF => {
                // Undefined realtime
                tracing::trace!(status = byte, "ignoring undefined realtime byte");
                Step::Nothing
            }
            _ => {
                // Undefined system common
                tracing::trace!(status = byte, "dropping running status on undefined status byte");
                self.clear_status();
                Step::Nothing
            }
        }
    }

    fn data_byte(&mut self, byte: u7, filter: ChannelFilter) -> Step {
        let status = match self.pending_status {
            Some(status) if self.args_needed > 0 => status,
            _ => {
                tracing::trace!(data = byte.as_int(), "stray data byte without a status");
                return Step::Nothing;
            }
        };
        self.args_received += 1;
        if self.args_received < self.args_needed {
            self.first_arg = byte;
            return Step::Nothing;
        }
        // Keep the status around for running status.
        self.args_received = 0;
        let msg = match Message::from_parts(status, self.first_arg, byte) {
            Some(msg) => msg.normalized(),
            None => return Step::Nothing,
        };
        match msg.channel() {
            Some(channel) if !filter.accepts(channel) => {
                tracing::trace!(%channel, "filtered out message");
                Step::Nothing
            }
            _ => Step::Message(msg),
        }
    }

    fn expect(&mut self, status: u8, args: u8) {
        self.pending_status = Some(status);
        self.args_needed = args;
        self.args_received = 0;
    }

    fn clear_status(&mut self) {
        self.pending_status = None;
        self.args_needed = 0;
        self.args_received = 0;
    }

    /// Feed a single byte, delivering its outcome to `handler` or `sink`.
    pub fn feed_byte<H, S>(&mut self, byte: u8, config: &Config, handler: &mut H, sink: &mut S)
    where
        H: Handler + ?Sized,
        S: ProprietarySink + ?Sized,
    {
        match self.step(byte, config.channel_filter()) {
            Step::Nothing => {}
            Step::Message(msg) => handler.on_message(msg),
            Step::BracketOpen => {
                tracing::debug!("proprietary bracket opened");
                sink.bracket_open()
            }
            Step::BracketData(byte) => sink.data(byte),
            Step::BracketClose => {
                tracing::debug!("proprietary bracket closed");
                sink.bracket_close()
            }
        }
    }

    /// Feed a slice of bytes, calling `handler` whenever a message completes and `sink` for
    /// proprietary data.
    ///
    /// Calling `feed` with many small slices is equivalent to calling `feed` once with their
    /// concatenation.
    pub fn feed<H, S>(&mut self, bytes: &[u8], config: &Config, handler: &mut H, sink: &mut S)
    where
        H: Handler + ?Sized,
        S: ProprietarySink + ?Sized,
    {
        for &byte in bytes {
            self.feed_byte(byte, config, handler, sink);
        }
    }
}
