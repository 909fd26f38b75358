use crate::{
    prelude::*,
    transport::{Transport, WriteResult},
};

/// Writes messages to a transport, skipping status bytes that the receiver already knows
/// (running status).
///
/// Running status rules:
/// - Channel voice messages use running status: their status byte is only written when it
///     differs from the last status written, or when full-command mode is on.
/// - System messages and pitch changes always write their status byte.
/// - Every message sent replaces the remembered status, so a channel message following any
///     other kind of message writes its status again, even after a single realtime byte.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Encoder {
    last_status: Option<u8>,
}
impl Encoder {
    /// Create an encoder that writes the status byte of the first message it sends.
    #[inline]
    pub fn new() -> Encoder {
        Encoder::default()
    }

    /// The status byte of the last message sent, whether it was written or skipped.
    #[inline]
    pub fn last_status(&self) -> Option<u8> {
        self.last_status
    }

    /// Forget the last status sent, so that the next message writes its status byte.
    #[inline]
    pub fn reset(&mut self) {
        self.last_status = None;
    }

    /// Write a message, omitting its status byte if running status allows it.
    ///
    /// When `full_commands` is set the status byte is always written, but it is still remembered
    /// for the following calls.
    pub fn encode<T: Transport + ?Sized>(
        &mut self,
        msg: &Message,
        full_commands: bool,
        out: &mut T,
    ) -> WriteResult<T> {
        let status = msg.status();
        let repeated = msg.uses_running_status() && self.last_status == Some(status);
        // Remember the status before writing, so a failed write still counts as an attempt.
        self.last_status = Some(status);
        if full_commands || !repeated {
            out.write_byte(status)?;
        } else {
            tracing::trace!(status, "running status, skipping status byte");
        }
        msg.write_data(out)
    }
}
