//! A complete protocol session over a single transport.

use crate::{
    config::{Parameter, DEFAULT_BAUD},
    decoder::Decoder,
    encoder::Encoder,
    handler::{Handler, ProprietarySink},
    prelude::*,
    transport::{Transport, WriteResult},
};

/// One end of a serial MIDI link: a transport together with the decoder state, the encoder state
/// and the configuration that belong to it.
///
/// Receiving is driven by calling [`poll`](#method.poll) regularly; it drains whatever bytes are
/// available and returns without blocking. Decoded messages are handed to the handler `H`, and
/// proprietary data to the sink `S`.
///
/// Sending is done through the `send_*` methods, which make use of running status unless
/// full-command mode is enabled.
///
/// ```rust
/// use midiwire::{num::u7, Channel, Message, MemoryTransport, Session};
///
/// let mut session = Session::new(MemoryTransport::new(), Vec::<Message>::new());
/// session.transport_mut().receive(&[0x90, 60, 100, 62, 100]);
/// session.poll();
/// assert_eq!(session.handler().len(), 2);
///
/// let ch = Channel::new(1).unwrap();
/// session.send_note_on(ch, u7::new(60), u7::new(100)).unwrap();
/// session.send_note_on(ch, u7::new(62), u7::new(100)).unwrap();
/// assert_eq!(session.transport().written(), &[0x90, 60, 100, 62, 100]);
/// ```
pub struct Session<T, H = (), S = ()> {
    transport: T,
    handler: H,
    sink: S,
    config: Config,
    decoder: Decoder,
    encoder: Encoder,
}
impl<T: Transport, H: Handler> Session<T, H> {
    /// Create a session that discards proprietary data.
    #[inline]
    pub fn new(transport: T, handler: H) -> Session<T, H> {
        Session::with_sink(transport, handler, ())
    }
}
impl<T: Transport, H: Handler, S: ProprietarySink> Session<T, H, S> {
    /// Create a session that hands proprietary data to `sink`.
    pub fn with_sink(transport: T, handler: H, sink: S) -> Session<T, H, S> {
        Session {
            transport,
            handler,
            sink,
            config: Config::new(),
            decoder: Decoder::new(),
            encoder: Encoder::new(),
        }
    }

    /// Use the given configuration instead of the default one.
    #[inline]
    pub fn with_config(mut self, config: Config) -> Session<T, H, S> {
        self.config = config;
        self
    }

    /// Bring the transport up at `baud` and start listening on the channels accepted by
    /// `filter`.
    ///
    /// Most callers want `ChannelFilter::All` and [`DEFAULT_BAUD`](constant.DEFAULT_BAUD.html),
    /// which is what [`begin_default`](#method.begin_default) does.
    pub fn begin(&mut self, filter: ChannelFilter, baud: u32) -> WriteResult<T> {
        tracing::debug!(channel_filter = filter.as_int(), baud, "starting midi session");
        self.config.set_channel_filter(filter);
        self.transport.begin(baud)
    }

    /// Start listening on all channels, at the standard MIDI line speed.
    #[inline]
    pub fn begin_default(&mut self) -> WriteResult<T> {
        self.begin(ChannelFilter::All, DEFAULT_BAUD)
    }

    /// Read and decode every byte currently available from the transport.
    ///
    /// Returns the amount of bytes consumed. Never blocks.
    pub fn poll(&mut self) -> usize {
        let mut consumed = 0;
        while let Some(byte) = self.transport.try_read_byte() {
            self.decoder
                .feed_byte(byte, &self.config, &mut self.handler, &mut self.sink);
            consumed += 1;
        }
        consumed
    }

    /// Send any message, applying running status.
    #[inline]
    pub fn send(&mut self, msg: &Message) -> WriteResult<T> {
        self.encoder
            .encode(msg, self.config.send_full_commands(), &mut self.transport)
    }

    pub fn send_note_off(&mut self, channel: Channel, note: u7, velocity: u7) -> WriteResult<T> {
        self.send(&Message::NoteOff {
            channel,
            note,
            velocity,
        })
    }

    pub fn send_note_on(&mut self, channel: Channel, note: u7, velocity: u7) -> WriteResult<T> {
        self.send(&Message::NoteOn {
            channel,
            note,
            velocity,
        })
    }

    /// Send a polyphonic aftertouch message for a single note.
    pub fn send_velocity_change(
        &mut self,
        channel: Channel,
        note: u7,
        value: u7,
    ) -> WriteResult<T> {
        self.send(&Message::VelocityChange {
            channel,
            note,
            value,
        })
    }

    pub fn send_control_change(
        &mut self,
        channel: Channel,
        controller: u7,
        value: u7,
    ) -> WriteResult<T> {
        self.send(&Message::ControlChange {
            channel,
            controller,
            value,
        })
    }

    pub fn send_program_change(&mut self, channel: Channel, program: u7) -> WriteResult<T> {
        self.send(&Message::ProgramChange { channel, program })
    }

    /// Send a channel-wide aftertouch message.
    pub fn send_after_touch(&mut self, channel: Channel, value: u7) -> WriteResult<T> {
        self.send(&Message::ChannelAfterTouch { channel, value })
    }

    /// Send a global pitch change, on status `0xE0`.
    ///
    /// Use [`send`](#method.send) with `Message::PitchChange` to address another channel.
    pub fn send_pitch_change(&mut self, value: u14) -> WriteResult<T> {
        self.send(&Message::PitchChange {
            channel: Channel::FIRST,
            value,
        })
    }

    pub fn send_song_position(&mut self, position: u14) -> WriteResult<T> {
        self.send(&Message::SongPosition(position))
    }

    pub fn send_song_select(&mut self, song: u7) -> WriteResult<T> {
        self.send(&Message::SongSelect(song))
    }

    pub fn send_tune_request(&mut self) -> WriteResult<T> {
        self.send(&Message::TuneRequest)
    }

    /// Send a timing clock tick.
    pub fn send_sync(&mut self) -> WriteResult<T> {
        self.send(&Message::Sync)
    }

    pub fn send_start(&mut self) -> WriteResult<T> {
        self.send(&Message::Start)
    }

    pub fn send_continue(&mut self) -> WriteResult<T> {
        self.send(&Message::Continue)
    }

    pub fn send_stop(&mut self) -> WriteResult<T> {
        self.send(&Message::Stop)
    }

    pub fn send_active_sense(&mut self) -> WriteResult<T> {
        self.send(&Message::ActiveSense)
    }

    pub fn send_reset(&mut self) -> WriteResult<T> {
        self.send(&Message::Reset)
    }

    /// Set a parameter from its numeric value. See [`Config::set_parameter`].
    ///
    /// [`Config::set_parameter`]: struct.Config.html#method.set_parameter
    #[inline]
    pub fn set_parameter(&mut self, param: Parameter, value: u8) -> Result<()> {
        self.config.set_parameter(param, value)
    }

    /// Get the numeric value of a parameter.
    #[inline]
    pub fn get_parameter(&self, param: Parameter) -> u8 {
        self.config.get_parameter(param)
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// The receive state, mostly useful for diagnostics.
    #[inline]
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// The send state, mostly useful for diagnostics.
    #[inline]
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    #[inline]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    #[inline]
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Direct access to the transport.
    ///
    /// Bytes written directly bypass running status tracking, so the encoder should be
    /// [`reset`](#method.reset_encoder) afterwards.
    #[inline]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Forget the last status sent, so the next message includes its status byte.
    #[inline]
    pub fn reset_encoder(&mut self) {
        self.encoder.reset();
    }

    /// Forget any partially received message, running status and open proprietary bracket.
    #[inline]
    pub fn reset_decoder(&mut self) {
        self.decoder.reset();
    }

    /// Tear the session down into its transport, handler and sink.
    #[inline]
    pub fn into_parts(self) -> (T, H, S) {
        (self.transport, self.handler, self.sink)
    }
}
