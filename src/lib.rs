//! # Overview
//!
//! `midiwire` reads and writes MIDI over a raw, byte-serial link, such as the 5-pin DIN port of a
//! synthesizer wired to a UART.
//!
//! Bytes on such a link arrive one at a time and are not delimited, so the decoder is a small
//! resumable state machine that can be fed any amount of bytes at once. The encoder makes use of
//! running status, omitting the status byte of a message when it repeats the previous one.
//!
//! Most users want a [`Session`](struct.Session.html), which ties a
//! [`Transport`](transport/trait.Transport.html) to a decoder, an encoder and a
//! [`Handler`](trait.Handler.html) receiving the decoded messages:
//!
//! ```rust
//! use midiwire::{num::u7, Channel, Handler, MemoryTransport, Session};
//!
//! struct Keys;
//! impl Handler for Keys {
//!     fn note_on(&mut self, channel: Channel, note: u7, velocity: u7) {
//!         println!("note {} on channel {} at velocity {}", note, channel, velocity);
//!     }
//! }
//!
//! let mut session = Session::new(MemoryTransport::new(), Keys);
//! session.begin_default().unwrap();
//!
//! // Somewhere in the main loop
//! session.transport_mut().receive(&[0x90, 60, 100]);
//! session.poll();
//! ```
//!
//! # Decoding without a session
//!
//! The [`Decoder`](struct.Decoder.html) can be used on its own, either by feeding it slices of
//! bytes and a handler, or one byte at a time through the
//! [`Decoder::step`](struct.Decoder.html#method.step) transition function:
//!
//! ```rust
//! use midiwire::{ChannelFilter, Decoder, Message, Step};
//!
//! let mut decoder = Decoder::new();
//! let mut messages = Vec::new();
//! for &byte in &[0xB0, 7, 100, 10, 64] {
//!     if let Step::Message(msg) = decoder.step(byte, ChannelFilter::All) {
//!         messages.push(msg);
//!     }
//! }
//! assert_eq!(messages.len(), 2);
//! ```
//!
//! Complete, delimited packets (as handed out by OS MIDI APIs) can be parsed with
//! [`Message::parse`](enum.Message.html#method.parse) instead.
//!
//! # About features
//!
//! - The `alloc` feature (enabled by default) adds the in-memory
//!   [`MemoryTransport`](transport/struct.MemoryTransport.html), the
//!   [`SysExBuffer`](struct.SysExBuffer.html) sink, and makes `Vec<Message>` a handler.
//! - The `std` feature (enabled by default) implements `std::error::Error` and adds the
//!   [`IoTransport`](transport/struct.IoTransport.html) adapter.
//!   Disabling it makes the crate `no_std`.
//! - The `strict` feature makes `Message::parse` reject packets with trailing bytes.
//!
//! # Logging
//!
//! Anomalies on the line (stray data bytes, undefined status bytes) and filtered messages are
//! reported as `tracing` events at the `trace` level. Decoding itself never fails.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

macro_rules! bail {
    ($err:expr) => {{
        return Err($err.into());
    }};
}
macro_rules! ensure {
    ($cond:expr, $err:expr) => {{
        if !$cond {
            bail!($err)
        }
    }};
}

/// All of the errors this crate produces.
#[macro_use]
mod error;

mod prelude {
    pub(crate) use crate::{
        config::{ChannelFilter, Config},
        error::{ErrorKind, Result, ResultExt, StdResult},
        message::Message,
        primitive::{u14, u4, u7, Channel},
    };
    #[cfg(feature = "alloc")]
    pub(crate) use alloc::vec::Vec;
    pub(crate) use core::{fmt, mem};
    #[cfg(feature = "std")]
    pub(crate) use std::io;
}

mod config;
mod decoder;
mod encoder;
mod handler;
mod message;
mod primitive;
mod session;
pub mod transport;

#[cfg(feature = "alloc")]
pub use crate::{handler::SysExBuffer, transport::MemoryTransport};
pub use crate::{
    config::{ChannelFilter, Config, Parameter, DEFAULT_BAUD},
    decoder::{Decoder, Step},
    encoder::Encoder,
    error::{Causes, Error, ErrorKind, Result},
    handler::{dispatch, FnHandler, Handler, ProprietarySink},
    message::{status, Message},
    primitive::Channel,
    session::Session,
    transport::Transport,
};

/// Exotically-sized integers used by the MIDI standard.
pub mod num {
    pub use crate::primitive::{u14, u4, u7};
}

#[cfg(test)]
mod test;
