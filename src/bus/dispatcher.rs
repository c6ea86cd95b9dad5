//! # Protocol Dispatcher
//!
//! Decides, for each bus transaction, whether the device is being opened,
//! closed, talked to or listened to, and routes accordingly: listen-phase
//! bytes go to the print pipeline, a talk on the command channel gets the
//! identification reply, everything else is channel bookkeeping.
//!
//! The dispatcher never raises protocol errors of its own. Reset and
//! attention-decode failures resynchronize it silently (state back to
//! idle, partial line discarded); the only `Err` that escapes
//! [`Dispatcher::service_cycle`] is a raster sink I/O failure.

use crate::error::PetprintError;
use crate::font::FontSet;
use crate::render::pipeline::PrintPipeline;
use crate::transport::RasterSink;

use super::command::{AtnCommand, CMD_CHANNEL, Verb};
use super::driver::{Attention, IecBus};

/// Identification string sent when the command channel is read
/// (`OPEN 15,4,15 : GET#15,...`). The final byte goes out with EOI.
pub const IDENT: &str = concat!("IEC-PRINTER V", env!("CARGO_PKG_VERSION"));

/// Queued status sentinel, CBM DOS style.
///
/// Channel state carries the code a status query would report. Only the
/// power-up sentinel is meaningful to a printer; it is restored on every
/// reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DosError {
    Ok,
    /// 73, the power-up / reset announcement.
    #[default]
    Intro,
}

impl DosError {
    pub fn code(self) -> u8 {
        match self {
            DosError::Ok => 0,
            DosError::Intro => 73,
        }
    }
}

/// Open/closed state of the logical channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OpenState {
    /// No channel open.
    #[default]
    Nothing,
    /// A channel was opened, with whatever argument string followed.
    Open { channel: u8, arg: Vec<u8> },
}

/// Dispatcher-owned state that persists across transactions.
///
/// Reset to defaults on bus reset or attention-decode error.
#[derive(Debug, Clone, Default)]
pub struct ChannelState {
    pub open: OpenState,
    pub queued_error: DosError,
}

/// Outcome of one service cycle, for host diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// No attention activity.
    Idle,
    /// Bus reset line seen; everything aborted to idle.
    Reset,
    /// Attention decode failed; resynchronized like a reset.
    Error,
    /// A channel was opened.
    Open,
    /// We talked (identification reply sent).
    Talk,
    /// We listened (print data drained into the pipeline).
    Listen,
    /// Command-only transaction handled, no reply sent.
    Command,
    /// A channel was closed.
    Close,
    /// Pure bus-level verb, fully handled by the bus driver.
    BusLevel,
}

/// The bus command state machine.
///
/// Owns the [`ChannelState`] and the [`PrintPipeline`]; the host calls
/// [`Dispatcher::service_cycle`] in a loop with its bus driver and raster
/// sink.
pub struct Dispatcher {
    state: ChannelState,
    pipeline: PrintPipeline,
    cmd: AtnCommand,
}

impl Dispatcher {
    pub fn new(fonts: FontSet) -> Dispatcher {
        Dispatcher {
            state: ChannelState::default(),
            pipeline: PrintPipeline::new(fonts),
            cmd: AtnCommand::new(),
        }
    }

    /// Channel state, for status queries and diagnostics.
    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    /// The print pipeline (sticky font, pending line).
    pub fn pipeline(&self) -> &PrintPipeline {
        &self.pipeline
    }

    /// Hard abort to idle: channel state back to defaults (queued error
    /// returns to the power-up sentinel), partial line discarded, font
    /// back to uppercase.
    pub fn reset(&mut self) {
        self.state = ChannelState::default();
        self.pipeline.reset();
    }

    /// Run one poll: at most one reset check, one attention decode and one
    /// dispatch. Returns the transaction outcome; the only error path is a
    /// raster sink failure while flushing print data.
    pub fn service_cycle(
        &mut self,
        bus: &mut impl IecBus,
        sink: &mut impl RasterSink,
    ) -> Result<BusEvent, PetprintError> {
        if bus.poll_reset() {
            self.reset();
            return Ok(BusEvent::Reset);
        }

        self.cmd.clear();
        match bus.check_attention(&mut self.cmd) {
            Attention::Idle => Ok(BusEvent::Idle),
            Attention::Error => {
                self.reset();
                Ok(BusEvent::Error)
            }
            atn => self.dispatch(atn, bus, sink),
        }
    }

    fn dispatch(
        &mut self,
        atn: Attention,
        bus: &mut impl IecBus,
        sink: &mut impl RasterSink,
    ) -> Result<BusEvent, PetprintError> {
        let chan = self.cmd.channel();
        match self.cmd.verb() {
            Verb::Open => {
                self.handle_open(chan);
                Ok(BusEvent::Open)
            }
            Verb::Data => match atn {
                Attention::Talk => {
                    // Reading the command channel implies an open first;
                    // the reply itself is the same either way.
                    if chan == CMD_CHANNEL {
                        self.handle_open(chan);
                    }
                    self.handle_talk(bus);
                    Ok(BusEvent::Talk)
                }
                Attention::Listen => {
                    self.handle_listen(chan, bus, sink)?;
                    Ok(BusEvent::Listen)
                }
                Attention::Command => {
                    // Command with no data phase: decode only, result is
                    // reported out of band (status channel), never here.
                    self.handle_open(chan);
                    Ok(BusEvent::Command)
                }
                Attention::Idle | Attention::Error => Ok(BusEvent::Idle),
            },
            Verb::Close => {
                self.handle_close();
                Ok(BusEvent::Close)
            }
            // Device-level addressing is consumed by the bus driver; the
            // broadcast releases need nothing from us either.
            Verb::Listen | Verb::Talk | Verb::Unlisten | Verb::Untalk | Verb::Unknown(_) => {
                Ok(BusEvent::BusLevel)
            }
        }
    }

    /// OPEN: record the channel and argument. Hook for per-channel
    /// initialization; no bus I/O happens here.
    fn handle_open(&mut self, channel: u8) {
        self.state.open = OpenState::Open {
            channel,
            arg: self.cmd.arg.clone(),
        };
    }

    /// CLOSE: channel teardown.
    fn handle_close(&mut self) {
        self.state.open = OpenState::Nothing;
    }

    /// Talk phase: emit the identification string, last byte with EOI.
    /// A failed send abandons the reply; the peer retries at the protocol
    /// level.
    fn handle_talk(&mut self, bus: &mut impl IecBus) {
        let bytes = IDENT.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            let delivered = if i + 1 == bytes.len() {
                bus.send_eoi(byte)
            } else {
                bus.send(byte)
            };
            if !delivered {
                return;
            }
        }
    }

    /// Listen phase: select the font from the channel, then drain bytes
    /// into the pipeline until end-of-data or a transfer error.
    ///
    /// On a transfer error the partial line is dropped, never flushed; the
    /// peer sees the missing printout and retries. End-of-data keeps the
    /// partial line buffered; a line may span several listen sessions
    /// (`PRINT#4,"A";` style).
    fn handle_listen(
        &mut self,
        channel: u8,
        bus: &mut impl IecBus,
        sink: &mut impl RasterSink,
    ) -> Result<(), PetprintError> {
        self.pipeline.select_font(channel);
        loop {
            let byte = bus.receive();
            if byte.error {
                self.pipeline.discard_line();
                return Ok(());
            }
            self.pipeline.feed(byte.value, sink)?;
            if byte.eoi {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::command::{ATN_CODE_CLOSE, ATN_CODE_DATA, ATN_CODE_OPEN, ATN_CODE_UNLISTEN};
    use crate::bus::driver::BusByte;
    use crate::font::{CHARGEN_LEN, Font, PC_FONT_LEN};
    use crate::transport::MemorySink;
    use std::collections::VecDeque;

    fn fonts() -> FontSet {
        FontSet::from_bytes(vec![0xAA; CHARGEN_LEN], vec![0x55; PC_FONT_LEN]).unwrap()
    }

    /// One scripted transaction for the fake bus.
    enum Cycle {
        Reset,
        Atn(Attention, u8, &'static [u8]),
    }

    #[derive(Default)]
    struct TestBus {
        cycles: VecDeque<Cycle>,
        rx: VecDeque<BusByte>,
        sent: Vec<u8>,
        eoi_sent: Vec<bool>,
    }

    impl TestBus {
        fn push_atn(&mut self, atn: Attention, code: u8, arg: &'static [u8]) {
            self.cycles.push_back(Cycle::Atn(atn, code, arg));
        }

        fn push_rx(&mut self, value: u8, eoi: bool, error: bool) {
            self.rx.push_back(BusByte { value, eoi, error });
        }
    }

    impl IecBus for TestBus {
        fn poll_reset(&mut self) -> bool {
            if matches!(self.cycles.front(), Some(Cycle::Reset)) {
                self.cycles.pop_front();
                true
            } else {
                false
            }
        }

        fn check_attention(&mut self, cmd: &mut AtnCommand) -> Attention {
            match self.cycles.pop_front() {
                Some(Cycle::Atn(atn, code, arg)) => {
                    cmd.code = code;
                    for &b in arg {
                        cmd.push_arg(b);
                    }
                    atn
                }
                _ => Attention::Idle,
            }
        }

        fn send(&mut self, byte: u8) -> bool {
            self.sent.push(byte);
            self.eoi_sent.push(false);
            true
        }

        fn send_eoi(&mut self, byte: u8) -> bool {
            self.sent.push(byte);
            self.eoi_sent.push(true);
            true
        }

        fn receive(&mut self) -> BusByte {
            self.rx.pop_front().unwrap_or(BusByte {
                value: 0,
                eoi: true,
                error: true,
            })
        }
    }

    #[test]
    fn test_idle_cycle() {
        let mut dispatcher = Dispatcher::new(fonts());
        let mut bus = TestBus::default();
        let mut sink = MemorySink::default();
        let event = dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        assert_eq!(event, BusEvent::Idle);
    }

    #[test]
    fn test_open_records_channel_and_arg() {
        let mut dispatcher = Dispatcher::new(fonts());
        let mut bus = TestBus::default();
        let mut sink = MemorySink::default();
        bus.push_atn(Attention::Command, ATN_CODE_OPEN | 4, b"TITLE");

        let event = dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        assert_eq!(event, BusEvent::Open);
        assert_eq!(
            dispatcher.state().open,
            OpenState::Open {
                channel: 4,
                arg: b"TITLE".to_vec()
            }
        );
    }

    #[test]
    fn test_close_clears_channel() {
        let mut dispatcher = Dispatcher::new(fonts());
        let mut bus = TestBus::default();
        let mut sink = MemorySink::default();
        bus.push_atn(Attention::Command, ATN_CODE_OPEN | 4, b"");
        bus.push_atn(Attention::Command, ATN_CODE_CLOSE | 4, b"");

        dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        let event = dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        assert_eq!(event, BusEvent::Close);
        assert_eq!(dispatcher.state().open, OpenState::Nothing);
    }

    #[test]
    fn test_command_channel_talk_sends_ident_with_final_eoi() {
        let mut dispatcher = Dispatcher::new(fonts());
        let mut bus = TestBus::default();
        let mut sink = MemorySink::default();
        bus.push_atn(Attention::Talk, ATN_CODE_DATA | CMD_CHANNEL, b"");

        let event = dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        assert_eq!(event, BusEvent::Talk);
        assert_eq!(bus.sent, IDENT.as_bytes());
        // EOI on the last byte only
        assert_eq!(bus.eoi_sent.pop(), Some(true));
        assert!(bus.eoi_sent.iter().all(|&eoi| !eoi));
        // No raster output for a talk
        assert!(sink.blocks.is_empty());
        // The talk on the command channel implied an open
        assert!(matches!(
            dispatcher.state().open,
            OpenState::Open { channel: 15, .. }
        ));
    }

    #[test]
    fn test_bus_level_verbs_are_noops() {
        let mut dispatcher = Dispatcher::new(fonts());
        let mut bus = TestBus::default();
        let mut sink = MemorySink::default();
        bus.push_atn(Attention::Command, ATN_CODE_UNLISTEN, b"");

        let event = dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        assert_eq!(event, BusEvent::BusLevel);
        assert_eq!(dispatcher.state().open, OpenState::Nothing);
    }

    #[test]
    fn test_decode_error_resets() {
        let mut dispatcher = Dispatcher::new(fonts());
        let mut bus = TestBus::default();
        let mut sink = MemorySink::default();
        bus.push_atn(Attention::Command, ATN_CODE_OPEN | 4, b"X");
        bus.push_atn(Attention::Error, 0, b"");

        dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        let event = dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        assert_eq!(event, BusEvent::Error);
        assert_eq!(dispatcher.state().open, OpenState::Nothing);
        assert_eq!(dispatcher.state().queued_error, DosError::Intro);
    }

    #[test]
    fn test_reset_restores_default_font_and_empty_line() {
        let mut dispatcher = Dispatcher::new(fonts());
        let mut bus = TestBus::default();
        let mut sink = MemorySink::default();
        // Listen on channel 7 (lowercase), partial line, end-of-data
        bus.push_atn(Attention::Listen, ATN_CODE_DATA | 7, b"");
        bus.push_rx(0x41, true, false);
        bus.cycles.push_back(Cycle::Reset);

        dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        assert_eq!(dispatcher.pipeline().font(), Font::C64Lower);
        assert_eq!(dispatcher.pipeline().pending(), 1);

        let event = dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        assert_eq!(event, BusEvent::Reset);
        assert_eq!(dispatcher.pipeline().font(), Font::C64Upper);
        assert_eq!(dispatcher.pipeline().pending(), 0);
        assert!(sink.blocks.is_empty());
    }

    #[test]
    fn test_transfer_error_drops_partial_line() {
        let mut dispatcher = Dispatcher::new(fonts());
        let mut bus = TestBus::default();
        let mut sink = MemorySink::default();
        bus.push_atn(Attention::Listen, ATN_CODE_DATA | 0, b"");
        bus.push_rx(0x41, false, false);
        bus.push_rx(0x42, false, false);
        bus.push_rx(0, false, true); // transfer error

        let event = dispatcher.service_cycle(&mut bus, &mut sink).unwrap();
        assert_eq!(event, BusEvent::Listen);
        assert!(sink.blocks.is_empty());
        assert_eq!(dispatcher.pipeline().pending(), 0);
    }
}
