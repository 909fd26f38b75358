//! Runtime-settable session parameters.

use crate::prelude::*;

/// The classic line speed of a MIDI serial link, in bits per second.
pub const DEFAULT_BAUD: u32 = 31_250;

/// Which channels a decoder delivers channel messages for.
///
/// Filtering never changes how bytes are consumed: messages for other channels are still read in
/// full, just not dispatched. System messages are always dispatched.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum ChannelFilter {
    /// Accept messages on every channel.
    All,
    /// Only accept messages on the given channel.
    Only(Channel),
}
impl ChannelFilter {
    /// Convert from the numeric form, where `0` means all channels and `1 ..= 16` selects a
    /// single channel.
    ///
    /// Values above 16 yield `None`.
    #[inline]
    pub fn from_int(raw: u8) -> Option<ChannelFilter> {
        match raw {
            0 => Some(ChannelFilter::All),
            n => Channel::new(n).map(ChannelFilter::Only),
        }
    }

    /// Convert to the numeric form, where `0` means all channels.
    #[inline]
    pub fn as_int(self) -> u8 {
        match self {
            ChannelFilter::All => 0,
            ChannelFilter::Only(channel) => channel.as_int(),
        }
    }

    /// Whether a message on the given channel passes this filter.
    #[inline]
    pub fn accepts(self, channel: Channel) -> bool {
        match self {
            ChannelFilter::All => true,
            ChannelFilter::Only(only) => only == channel,
        }
    }
}
impl Default for ChannelFilter {
    #[inline]
    fn default() -> ChannelFilter {
        ChannelFilter::All
    }
}
impl From<Channel> for ChannelFilter {
    #[inline]
    fn from(channel: Channel) -> ChannelFilter {
        ChannelFilter::Only(channel)
    }
}

/// The parameters that can be changed through
/// [`Config::set_parameter`](struct.Config.html#method.set_parameter).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Parameter {
    /// The receive channel filter. `0` means all channels, `1 ..= 16` a single channel.
    ChannelFilter,
    /// Whether every sent message includes its status byte. Any non-zero value turns it on.
    SendFullCommands,
}

/// The configuration shared by the decoder and the encoder of a session.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Default)]
pub struct Config {
    channel_filter: ChannelFilter,
    send_full_commands: bool,
}
impl Config {
    /// A configuration accepting every channel, with running status enabled for sending.
    #[inline]
    pub fn new() -> Config {
        Config::default()
    }

    /// The channel filter applied to received channel messages.
    #[inline]
    pub fn channel_filter(&self) -> ChannelFilter {
        self.channel_filter
    }

    /// Change the receive channel filter.
    ///
    /// Takes effect on the next completed message; a partially received message is unaffected.
    #[inline]
    pub fn set_channel_filter(&mut self, filter: ChannelFilter) {
        self.channel_filter = filter;
    }

    /// Whether every sent message includes its status byte, disabling running status.
    #[inline]
    pub fn send_full_commands(&self) -> bool {
        self.send_full_commands
    }

    /// Enable or disable sending the status byte with every message.
    #[inline]
    pub fn set_send_full_commands(&mut self, full: bool) {
        self.send_full_commands = full;
    }

    /// Builder-style version of `set_channel_filter`.
    #[inline]
    pub fn with_channel_filter(mut self, filter: ChannelFilter) -> Config {
        self.channel_filter = filter;
        self
    }

    /// Builder-style version of `set_send_full_commands`.
    #[inline]
    pub fn with_send_full_commands(mut self, full: bool) -> Config {
        self.send_full_commands = full;
        self
    }

    /// Set a parameter from its numeric value.
    ///
    /// Fails, leaving the configuration untouched, if a channel filter above 16 is given.
    pub fn set_parameter(&mut self, param: Parameter, value: u8) -> Result<()> {
        match param {
            Parameter::ChannelFilter => {
                let filter = match value {
                    0 => ChannelFilter::All,
                    n => ChannelFilter::Only(
                        Channel::check_int(n)
                            .context(err_invalid!("invalid channel filter parameter"))?,
                    ),
                };
                self.set_channel_filter(filter);
            }
            Parameter::SendFullCommands => self.set_send_full_commands(value != 0),
        }
        tracing::debug!(?param, value, "session parameter changed");
        Ok(())
    }

    /// Get the numeric value of a parameter.
    pub fn get_parameter(&self, param: Parameter) -> u8 {
        match param {
            Parameter::ChannelFilter => self.channel_filter.as_int(),
            Parameter::SendFullCommands => self.send_full_commands as u8,
        }
    }
}
