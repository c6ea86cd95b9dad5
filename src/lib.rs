//! # Petprint - Commodore IEC Printer Emulation Library
//!
//! Petprint turns a host with a serial-bus adapter into a printer on the
//! Commodore IEC bus. It provides:
//!
//! - **Bus protocol**: the attention-command state machine of a bus
//!   peripheral (open/close/talk/listen on a channel)
//! - **Text rendering**: PETSCII stream to 384×9 dot raster lines, with
//!   reverse video, case shift and three character sets
//! - **Printer protocol**: ESC/POS-style command builders for 58 mm
//!   thermal mechanisms
//! - **Transport**: raw-TTY serial output, plus an in-memory sink for
//!   tests and previews
//!
//! ## Quick Start
//!
//! ```no_run
//! use petprint::{FontSet, PrintPipeline, PrinterConfig, SerialTransport, petscii};
//!
//! // Glyph ROM images (C64 character generator + optional PC font)
//! let fonts = FontSet::load("chargen.bin", Some("pcfont.bin"))?;
//!
//! // Thermal head on a serial line
//! let mut printer = SerialTransport::open("/dev/ttyUSB0", PrinterConfig::MINI58)?;
//!
//! // Render one line the way a listen session would deliver it
//! let mut pipeline = PrintPipeline::new(fonts);
//! pipeline.select_font(0); // channel 0: uppercase set
//! for byte in petscii::encode("hello from the bus\n") {
//!     pipeline.feed(byte, &mut printer)?;
//! }
//! # Ok::<(), petprint::PetprintError>(())
//! ```
//!
//! On a device with a bus adapter, wire a [`bus::IecBus`] implementation
//! and a [`Dispatcher`] together instead and call
//! [`Dispatcher::service_cycle`] in the host loop; the pipeline is then
//! fed by listen sessions on the bus.
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bus`] | IEC attention commands, bus driver trait, dispatcher |
//! | [`render`] | line buffering and rasterization |
//! | [`font`] | character sets and glyph ROM tables |
//! | [`petscii`] | PETSCII encoding and screen-code translation |
//! | [`protocol`] | thermal head command builders |
//! | [`printer`] | printer hardware profiles |
//! | [`transport`] | raster sinks (serial, in-memory) |
//! | [`error`] | error types |
//!
//! ## Character Sets
//!
//! The listen channel's secondary address picks the character set, sticky
//! until the next session: 0 for C64 uppercase/graphics, 7 for C64
//! lowercase, 1 for the PC codepage font.

pub mod bus;
pub mod error;
pub mod font;
pub mod petscii;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use bus::{BusEvent, Dispatcher, IecBus};
pub use error::PetprintError;
pub use font::{Font, FontSet};
pub use printer::PrinterConfig;
pub use render::PrintPipeline;
pub use transport::{MemorySink, RasterSink, SerialTransport};
