//! Exotically-sized integers found on the wire, and the 1-based MIDI channel number.

use crate::prelude::*;

/// Restricted integers.
macro_rules! restricted_int {
    {$(#[$attr:meta])* $name:ident : $inner:tt => $bits:expr} => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
        #[repr(transparent)]
        #[allow(non_camel_case_types)]
        pub struct $name($inner);
        impl From<$inner> for $name {
            /// Lossy conversion, masks off the top bits.
            #[inline]
            fn from(raw: $inner) -> $name {
                $name::from_int_lossy(raw)
            }
        }
        impl From<$name> for $inner {
            #[inline]
            fn from(restricted: $name) -> $inner {restricted.0}
        }
        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
        impl $name {
            const MASK: $inner = (1 << $bits) - 1;

            /// The maximum value that this restricted integer can hold.
            #[inline]
            pub const fn max_value() -> $name {
                $name (Self::MASK)
            }

            /// Creates a restricted int from its non-restricted counterpart by masking off the
            /// extra bits.
            #[inline]
            pub const fn new(raw: $inner) -> $name {
                $name (raw & Self::MASK)
            }

            /// Creates a restricted int from its non-restricted counterpart by masking off the
            /// extra bits.
            #[inline]
            pub const fn from_int_lossy(raw: $inner) -> $name {
                $name (raw & Self::MASK)
            }

            /// Returns `Some` if the raw integer is within range of the restricted integer, and
            /// `None` otherwise.
            #[inline]
            pub fn try_from(raw: $inner) -> Option<$name> {
                if raw <= Self::MASK {
                    Some($name(raw))
                } else {
                    None
                }
            }

            /// Get the inner integer out of the wrapper.
            /// The inner integer is guaranteed to be in range of the restricted wrapper.
            #[inline]
            pub const fn as_int(self) -> $inner {
                self.0
            }

            #[allow(dead_code)]
            #[inline]
            pub(crate) fn check_int(raw: $inner) -> StdResult<$name, &'static ErrorKind> {
                Self::try_from(raw).ok_or_else(
                    || err_invalid!("invalid integer with top bits set")
                )
            }
        }
        impl PartialEq<$inner> for $name {
            fn eq(&self, rhs: &$inner) -> bool {
                self.as_int() == *rhs
            }
        }
        impl PartialEq<$name> for $inner {
            fn eq(&self, rhs: &$name) -> bool {
                *self == rhs.as_int()
            }
        }
    };
}

restricted_int! {
    /// A 14-bit integer type, used for pitch-bend values and song positions.
    ///
    /// Wraps the `u16` type and ensures that the top two bits are always zero.
    u14: u16 => 14
}
restricted_int! {
    /// A 7-bit integer type, the payload of a single data byte.
    ///
    /// Wraps the `u8` type and ensures that the top bit is always zero.
    u7: u8 => 7
}
restricted_int! {
    /// A 4-bit integer type, the low nibble of a channel status byte.
    ///
    /// Wraps the `u8` type and ensures that the top 4 bits are always zero.
    u4: u8 => 4
}

impl u14 {
    /// Join two data bytes, sent low half first, into a 14-bit value.
    #[inline]
    pub fn from_halves(low: u7, high: u7) -> u14 {
        u14::new((high.as_int() as u16) << 7 | low.as_int() as u16)
    }

    /// Split into the `(low, high)` 7-bit halves, in transmission order.
    #[inline]
    pub fn halves(self) -> (u7, u7) {
        (
            u7::new(self.as_int() as u8),
            u7::new((self.as_int() >> 7) as u8),
        )
    }
}

/// A MIDI channel number, always in the `1 ..= 16` range.
///
/// On the wire a channel is carried as the low nibble of the status byte, offset by one
/// (nibble `0` is channel `1`).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Channel(u8);
impl Channel {
    /// The lowest channel, also used for messages sent to no particular channel.
    pub const FIRST: Channel = Channel(1);

    /// Create a channel from its 1-based number, returning `None` outside `1 ..= 16`.
    #[inline]
    pub fn new(number: u8) -> Option<Channel> {
        match number {
            1..=16 => Some(Channel(number)),
            _ => None,
        }
    }

    /// Create a channel from its 1-based number, keeping only the low four bits of
    /// `number - 1`, the way the wire encoding does.
    ///
    /// `0` wraps around to channel 16 and `17` wraps around to channel 1.
    #[inline]
    pub fn from_int_lossy(number: u8) -> Channel {
        Channel::from_nibble(u4::new(number.wrapping_sub(1)))
    }

    /// Create a channel from the low nibble of a status byte.
    #[inline]
    pub fn from_nibble(nibble: u4) -> Channel {
        Channel(nibble.as_int() + 1)
    }

    /// The 1-based channel number.
    #[inline]
    pub const fn as_int(self) -> u8 {
        self.0
    }

    /// The status byte nibble for this channel.
    #[inline]
    pub fn nibble(self) -> u4 {
        u4::new(self.0 - 1)
    }

    pub(crate) fn check_int(number: u8) -> StdResult<Channel, &'static ErrorKind> {
        Channel::new(number).ok_or_else(|| err_invalid!("channel outside of the 1..=16 range"))
    }
}
impl Default for Channel {
    #[inline]
    fn default() -> Channel {
        Channel::FIRST
    }
}
impl fmt::Display for Channel {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
impl From<Channel> for u8 {
    #[inline]
    fn from(channel: Channel) -> u8 {
        channel.0
    }
}
impl PartialEq<u8> for Channel {
    fn eq(&self, rhs: &u8) -> bool {
        self.0 == *rhs
    }
}
