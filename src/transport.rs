//! The byte-oriented link that a [`Session`](../struct.Session.html) reads from and writes to.
//!
//! A physical MIDI port is a serial line running at [`DEFAULT_BAUD`](../constant.DEFAULT_BAUD.html)
//! bits per second: bytes arrive one at a time, and reading must never block.
//! The [`Transport`](trait.Transport.html) trait captures exactly that, and a few adapters are
//! provided for buffers and `std::io` streams.

use crate::prelude::*;
#[cfg(feature = "alloc")]
use alloc::collections::VecDeque;
#[cfg(feature = "alloc")]
use core::convert::Infallible;

/// The result of writing to a transport.
pub type WriteResult<T> = StdResult<(), <T as Transport>::Error>;

/// A serial link carrying raw MIDI bytes.
pub trait Transport {
    /// The error produced when a byte cannot be written.
    type Error;

    /// Read the next available byte, or `None` if nothing has arrived yet.
    ///
    /// This method must not block.
    fn try_read_byte(&mut self) -> Option<u8>;

    /// Write a single byte to the link.
    fn write_byte(&mut self, byte: u8) -> WriteResult<Self>;

    /// Bring the link up at the given line speed.
    ///
    /// Most transports are configured elsewhere, so the default does nothing.
    #[inline]
    fn begin(&mut self, _baud: u32) -> WriteResult<Self> {
        Ok(())
    }
}

impl<'a, T: Transport + ?Sized> Transport for &'a mut T {
    type Error = T::Error;
    #[inline]
    fn try_read_byte(&mut self) -> Option<u8> {
        (**self).try_read_byte()
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> StdResult<(), T::Error> {
        (**self).write_byte(byte)
    }
    #[inline]
    fn begin(&mut self, baud: u32) -> StdResult<(), T::Error> {
        (**self).begin(baud)
    }
}

/// A write-only transport that appends every byte to the vector.
#[cfg(feature = "alloc")]
impl Transport for Vec<u8> {
    type Error = Infallible;
    #[inline]
    fn try_read_byte(&mut self) -> Option<u8> {
        None
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<Self> {
        self.push(byte);
        Ok(())
    }
}

/// An in-memory transport: bytes pushed with [`receive`](#method.receive) are handed out by
/// `try_read_byte`, and written bytes are recorded.
///
/// Mostly useful to test handlers, or to loop a session back onto itself.
///
/// This type is only available with the `alloc` feature enabled.
#[cfg(feature = "alloc")]
#[derive(Clone, Debug, Default)]
pub struct MemoryTransport {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
    baud: Option<u32>,
}
#[cfg(feature = "alloc")]
impl MemoryTransport {
    /// Create an empty transport.
    #[inline]
    pub fn new() -> MemoryTransport {
        MemoryTransport::default()
    }

    /// Queue bytes as if they had arrived over the line.
    pub fn receive(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes.iter().copied());
    }

    /// How many received bytes have not been read yet.
    #[inline]
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }

    /// All bytes written so far.
    #[inline]
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Take all bytes written so far, leaving the record empty.
    #[inline]
    pub fn take_written(&mut self) -> Vec<u8> {
        mem::take(&mut self.written)
    }

    /// The line speed passed to the last `begin` call, if any.
    #[inline]
    pub fn baud(&self) -> Option<u32> {
        self.baud
    }
}
#[cfg(feature = "alloc")]
impl Transport for MemoryTransport {
    type Error = Infallible;
    #[inline]
    fn try_read_byte(&mut self) -> Option<u8> {
        self.incoming.pop_front()
    }
    #[inline]
    fn write_byte(&mut self, byte: u8) -> WriteResult<Self> {
        self.written.push(byte);
        Ok(())
    }
    #[inline]
    fn begin(&mut self, baud: u32) -> WriteResult<Self> {
        self.baud = Some(baud);
        Ok(())
    }
}

/// A fixed-size transport for `no_std` targets without allocation, reading from one slice and
/// writing into another.
pub struct SliceTransport<'a> {
    input: &'a [u8],
    output: &'a mut [u8],
    cur: usize,
}
impl<'a> SliceTransport<'a> {
    /// Create a transport that yields the bytes in `input` and writes into `output`.
    pub fn new(input: &'a [u8], output: &'a mut [u8]) -> SliceTransport<'a> {
        SliceTransport {
            input,
            output,
            cur: 0,
        }
    }

    /// The input bytes that have not been read yet.
    #[inline]
    pub fn remaining(&self) -> &[u8] {
        self.input
    }

    /// The part of the output buffer written so far.
    #[inline]
    pub fn written(&self) -> &[u8] {
        &self.output[..self.cur]
    }

    /// Split into the unread input, the output buffer and the amount of bytes written.
    pub fn into_parts(self) -> (&'a [u8], &'a mut [u8], usize) {
        (self.input, self.output, self.cur)
    }
}
impl<'a> Transport for SliceTransport<'a> {
    type Error = SliceError;
    #[inline]
    fn try_read_byte(&mut self) -> Option<u8> {
        let (&byte, rest) = self.input.split_first()?;
        self.input = rest;
        Some(byte)
    }
    fn write_byte(&mut self, byte: u8) -> WriteResult<Self> {
        // `cur <= output.len()` always holds, so only the equal case is out of space.
        let slot = self.output.get_mut(self.cur).ok_or(SliceError::OutOfSpace)?;
        *slot = byte;
        self.cur += 1;
        Ok(())
    }
}

/// The error produced by a full [`SliceTransport`](struct.SliceTransport.html).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SliceError {
    OutOfSpace,
}
impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SliceError::OutOfSpace => write!(f, "output buffer is full"),
        }
    }
}

/// Adapts any `std::io::Read + std::io::Write` stream, such as an already-configured serial
/// port, into a transport.
///
/// Reading treats end-of-file, `WouldBlock`, `TimedOut` and any other read error as "no byte
/// available", so the stream should be in non-blocking mode (or have a short timeout).
/// Written bytes are flushed immediately.
///
/// This type is only available with the `std` feature enabled.
#[cfg(feature = "std")]
pub struct IoTransport<T>(pub T);
#[cfg(feature = "std")]
impl<T: io::Read + io::Write> Transport for IoTransport<T> {
    type Error = io::Error;
    fn try_read_byte(&mut self) -> Option<u8> {
        let mut buf = [0; 1];
        loop {
            match self.0.read(&mut buf) {
                Ok(1) => return Some(buf[0]),
                Ok(_) => return None,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    if err.kind() != io::ErrorKind::WouldBlock
                        && err.kind() != io::ErrorKind::TimedOut
                    {
                        tracing::trace!(error = %err, "serial read failed");
                    }
                    return None;
                }
            }
        }
    }
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.0.write_all(&[byte])?;
        self.0.flush()
    }
}
