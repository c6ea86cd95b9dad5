//! # Bus Driver Interface
//!
//! The electrical side of the serial bus (line sampling, the attention
//! handshake, bit-level timing) lives outside this crate, behind the
//! [`IecBus`] trait. A hardware implementation wraps GPIO or a bus adapter;
//! tests use scripted doubles.
//!
//! ## Timing Contract
//!
//! The core is single-threaded and cooperative. Implementations must
//! guarantee that [`IecBus::check_attention`] and [`IecBus::receive`] are
//! not preempted mid-byte by other interrupt sources (on bare-metal targets
//! this means a brief critical section around each call). `receive` is a
//! blocking suspension point: it returns only when a byte has arrived or
//! the transfer failed, and there is no timeout: a stalled bus peer stalls
//! the device, which is acceptable because the bus is the sole
//! synchronization source.

use super::command::AtnCommand;

/// Outcome of one attention poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attention {
    /// Nothing addressed to this device.
    Idle,
    /// We are addressed as talker; a data phase follows in which we send.
    Talk,
    /// We are addressed as listener; a data phase follows in which we
    /// receive.
    Listen,
    /// A command with no data phase (e.g. `OPEN 4,4,15,"..."` style
    /// command strings); decode the command, send nothing back.
    Command,
    /// The attention sequence could not be decoded; the dispatcher resets.
    Error,
}

/// One received byte plus the transfer flags that accompanied it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusByte {
    pub value: u8,
    /// End-of-transmission: this is the final byte of the data phase.
    pub eoi: bool,
    /// The transfer failed; `value` is garbage and the session is over.
    pub error: bool,
}

/// Byte-level access to the serial bus, provided by the platform.
pub trait IecBus {
    /// Whether the bus reset line is asserted. Polled once per service
    /// cycle; a `true` aborts everything in progress.
    fn poll_reset(&mut self) -> bool;

    /// Check for an attention sequence addressed to this device and decode
    /// it into `cmd` (code, plus argument bytes for OPEN).
    fn check_attention(&mut self, cmd: &mut AtnCommand) -> Attention;

    /// Send one byte during a talk session. Returns `false` if the
    /// transfer failed; the caller abandons the reply and lets the peer
    /// retry at the protocol level.
    fn send(&mut self, byte: u8) -> bool;

    /// Send the final byte of a talk session, signalling end-of-
    /// transmission alongside it.
    fn send_eoi(&mut self, byte: u8) -> bool;

    /// Receive one byte during a listen session (blocking, see module
    /// docs). Flags on the returned [`BusByte`] report end-of-data and
    /// transfer errors.
    fn receive(&mut self) -> BusByte;
}
