//! # Serial Bus Front End
//!
//! Everything between the bus wires and the print pipeline:
//!
//! - [`command`]: attention command codes and decoding
//! - [`driver`]: the [`driver::IecBus`] trait the platform implements
//! - [`dispatcher`]: the per-transaction state machine
//!
//! The electrical layer (line sampling, handshake timing) is the
//! platform's job; this module only consumes its decoded byte stream.

pub mod command;
pub mod dispatcher;
pub mod driver;

pub use command::{AtnCommand, CMD_CHANNEL, Verb};
pub use dispatcher::{BusEvent, ChannelState, Dispatcher, DosError, IDENT, OpenState};
pub use driver::{Attention, BusByte, IecBus};
