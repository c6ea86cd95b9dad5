//! # Printer Transport Layer
//!
//! This module carries finished raster lines to a printer.
//!
//! ## Available Transports
//!
//! - [`serial`]: raw-TTY serial link to a thermal print head
//! - [`MemorySink`]: in-memory capture for tests and PNG preview
//!
//! The pipeline only sees the [`RasterSink`] trait; what is on the other
//! end (hardware, a file, a test buffer) is the host's choice.

pub mod serial;

pub use serial::SerialTransport;

use crate::error::PetprintError;

/// Consumer of rendered raster lines.
///
/// Synchronous from the pipeline's point of view: when a method returns,
/// the data has been handed off.
pub trait RasterSink {
    /// Render one raster block of `rows` dot rows, each `width_dots` wide
    /// (packed 8 dots per byte, bit 7 leftmost).
    fn print_raster(&mut self, width_dots: u16, rows: u16, data: &[u8])
    -> Result<(), PetprintError>;

    /// Advance the paper by `rows` blank dot rows.
    fn feed(&mut self, rows: u8) -> Result<(), PetprintError>;
}

/// One captured raster block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBlock {
    pub width_dots: u16,
    pub rows: u16,
    pub data: Vec<u8>,
}

/// A sink that records everything it is handed.
///
/// Used by the test suites and by the CLI's PNG preview.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub blocks: Vec<RasterBlock>,
    pub fed_rows: u32,
}

impl RasterSink for MemorySink {
    fn print_raster(
        &mut self,
        width_dots: u16,
        rows: u16,
        data: &[u8],
    ) -> Result<(), PetprintError> {
        self.blocks.push(RasterBlock {
            width_dots,
            rows,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn feed(&mut self, rows: u8) -> Result<(), PetprintError> {
        self.fed_rows += u32::from(rows);
        Ok(())
    }
}
