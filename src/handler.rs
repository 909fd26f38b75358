//! The receiving side of a session: where decoded messages and proprietary data end up.
//!
//! Implement [`Handler`](trait.Handler.html) and override only the hooks of interest; every hook
//! defaults to doing nothing.
//!
//! ```rust
//! use midiwire::{num::u7, Channel, Decoder, Config, Handler};
//!
//! #[derive(Default)]
//! struct Held(Vec<u8>);
//! impl Handler for Held {
//!     fn note_on(&mut self, _channel: Channel, note: u7, _velocity: u7) {
//!         self.0.push(note.as_int());
//!     }
//!     fn note_off(&mut self, _channel: Channel, note: u7, _velocity: u7) {
//!         self.0.retain(|&held| held != note.as_int());
//!     }
//! }
//!
//! let mut held = Held::default();
//! let mut decoder = Decoder::new();
//! decoder.feed(&[0x90, 60, 100, 64, 100, 60, 0], &Config::new(), &mut held, &mut ());
//! assert_eq!(held.0, [64]);
//! ```

use crate::prelude::*;

/// Receives decoded messages, one hook per message kind.
///
/// The decoder calls [`on_message`](#method.on_message) exactly once per completed message that
/// passes the channel filter, synchronously, before looking at the next byte.
/// The default `on_message` forwards to the hook for the message kind.
pub trait Handler {
    /// Entry point for every dispatched message.
    ///
    /// Override this to receive all messages in one place; the per-kind hooks are then only
    /// called if the override forwards to [`dispatch`](fn.dispatch.html).
    #[inline]
    fn on_message(&mut self, msg: Message) {
        dispatch(self, msg)
    }

    fn note_off(&mut self, _channel: Channel, _note: u7, _velocity: u7) {}
    fn note_on(&mut self, _channel: Channel, _note: u7, _velocity: u7) {}
    fn velocity_change(&mut self, _channel: Channel, _note: u7, _value: u7) {}
    fn control_change(&mut self, _channel: Channel, _controller: u7, _value: u7) {}
    fn program_change(&mut self, _channel: Channel, _program: u7) {}
    fn after_touch(&mut self, _channel: Channel, _value: u7) {}
    fn pitch_change(&mut self, _channel: Channel, _value: u14) {}
    fn song_position(&mut self, _position: u14) {}
    fn song_select(&mut self, _song: u7) {}
    fn tune_request(&mut self) {}
    fn sync(&mut self) {}
    fn start(&mut self) {}
    fn continue_playback(&mut self) {}
    fn stop(&mut self) {}
    fn active_sense(&mut self) {}
    fn reset(&mut self) {}
}

/// Call the hook of `handler` that corresponds to the kind of `msg`.
///
/// `Message::Continue` is routed to `Handler::continue_playback`, since `continue` is a keyword.
pub fn dispatch<H: Handler + ?Sized>(handler: &mut H, msg: Message) {
    match msg {
        Message::NoteOff {
            channel,
            note,
            velocity,
        } => handler.note_off(channel, note, velocity),
        Message::NoteOn {
            channel,
            note,
            velocity,
        } => handler.note_on(channel, note, velocity),
        Message::VelocityChange {
            channel,
            note,
            value,
        } => handler.velocity_change(channel, note, value),
        Message::ControlChange {
            channel,
            controller,
            value,
        } => handler.control_change(channel, controller, value),
        Message::ProgramChange { channel, program } => handler.program_change(channel, program),
        Message::ChannelAfterTouch { channel, value } => handler.after_touch(channel, value),
        Message::PitchChange { channel, value } => handler.pitch_change(channel, value),
        Message::SongPosition(position) => handler.song_position(position),
        Message::SongSelect(song) => handler.song_select(song),
        Message::TuneRequest => handler.tune_request(),
        Message::Sync => handler.sync(),
        Message::Start => handler.start(),
        Message::Continue => handler.continue_playback(),
        Message::Stop => handler.stop(),
        Message::ActiveSense => handler.active_sense(),
        Message::Reset => handler.reset(),
    }
}

/// Ignores every message.
impl Handler for () {
    #[inline]
    fn on_message(&mut self, _msg: Message) {}
}

impl<'a, H: Handler + ?Sized> Handler for &'a mut H {
    #[inline]
    fn on_message(&mut self, msg: Message) {
        (**self).on_message(msg)
    }
}

/// Collects every dispatched message, in order.
#[cfg(feature = "alloc")]
impl Handler for Vec<Message> {
    #[inline]
    fn on_message(&mut self, msg: Message) {
        self.push(msg);
    }
}

/// Adapts a closure taking a [`Message`](enum.Message.html) into a `Handler`.
pub struct FnHandler<F>(pub F);
impl<F: FnMut(Message)> Handler for FnHandler<F> {
    #[inline]
    fn on_message(&mut self, msg: Message) {
        (self.0)(msg)
    }
}

/// Receives the payload of proprietary (system exclusive) brackets, the bytes sent between an
/// opening `0xF0` and a closing `0xF7`.
///
/// Payload bytes are forwarded verbatim, even if they have the top bit set.
pub trait ProprietarySink {
    /// A `0xF0` byte opened a bracket.
    fn bracket_open(&mut self) {}
    /// A payload byte arrived inside the bracket.
    fn data(&mut self, _byte: u8) {}
    /// A `0xF7` byte closed the bracket.
    fn bracket_close(&mut self) {}
}

/// Discards all proprietary data.
impl ProprietarySink for () {}

impl<'a, S: ProprietarySink + ?Sized> ProprietarySink for &'a mut S {
    #[inline]
    fn bracket_open(&mut self) {
        (**self).bracket_open()
    }
    #[inline]
    fn data(&mut self, byte: u8) {
        (**self).data(byte)
    }
    #[inline]
    fn bracket_close(&mut self) {
        (**self).bracket_close()
    }
}

/// Collects the payload of complete proprietary brackets.
///
/// Each closed bracket becomes one entry in [`dumps`](#method.dumps). A bracket that is still
/// open can be inspected through [`partial`](#method.partial).
///
/// This type is only available with the `alloc` feature enabled.
#[cfg(feature = "alloc")]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SysExBuffer {
    dumps: Vec<Vec<u8>>,
    current: Option<Vec<u8>>,
}
#[cfg(feature = "alloc")]
impl SysExBuffer {
    #[inline]
    pub fn new() -> SysExBuffer {
        SysExBuffer::default()
    }

    /// The payloads of all closed brackets, oldest first.
    #[inline]
    pub fn dumps(&self) -> &[Vec<u8>] {
        &self.dumps
    }

    /// Take the payloads of all closed brackets.
    #[inline]
    pub fn take_dumps(&mut self) -> Vec<Vec<u8>> {
        mem::take(&mut self.dumps)
    }

    /// The payload received so far for the bracket that is currently open, if any.
    #[inline]
    pub fn partial(&self) -> Option<&[u8]> {
        self.current.as_deref()
    }
}
#[cfg(feature = "alloc")]
impl ProprietarySink for SysExBuffer {
    fn bracket_open(&mut self) {
        self.current = Some(Vec::new());
    }
    fn data(&mut self, byte: u8) {
        if let Some(current) = &mut self.current {
            current.push(byte);
        }
    }
    fn bracket_close(&mut self) {
        if let Some(current) = self.current.take() {
            self.dumps.push(current);
        }
    }
}
