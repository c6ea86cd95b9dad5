//! # Print Pipeline
//!
//! Turns the incoming PETSCII byte stream into raster lines. Bytes
//! accumulate in a 48-column buffer; a carriage return, or the buffer
//! reaching 48 columns, flushes it as one 384×9 dot bitmap (8 glyph rows
//! plus a blank feed row) to the raster sink.
//!
//! ## Rendering Model
//!
//! The head prints a line as 8 independent dot rows. For each row the
//! whole line is re-scanned from the left with row-local state: an
//! end-of-line latch (set by CR), a reverse-video flag and a skip count.
//! Printable bytes emit one glyph-row byte each, placed `skip` columns to
//! the left of their buffer position; control codes emit nothing and bump
//! the skip count, so the printed text closes up over them.
//!
//! The active character set is NOT row-local: the case-shift codes switch
//! the sticky font the moment the scan passes them, and the switch stays,
//! across the remaining rows, lines and listen sessions, until the next
//! channel selection. Rows after the first therefore render the whole
//! line in the switched set, the same quirk the MPS-series printers show
//! on a mid-line case shift.

use crate::error::PetprintError;
use crate::font::{Font, FontSet, GLYPH_ROWS};
use crate::petscii;
use crate::transport::RasterSink;

use super::line::{COLUMNS, LineBuffer};

/// Printed line width in dots (48 columns × 8 dots).
pub const WIDTH_DOTS: u16 = (COLUMNS * 8) as u16;

/// Dot rows per transmitted bitmap: 8 glyph rows + 1 blank feed row.
pub const LINE_ROWS: usize = GLYPH_ROWS + 1;

/// The text-to-raster pipeline.
///
/// Owns the line buffer and the sticky font. One instance per device;
/// state survives across bus transactions until a reset.
pub struct PrintPipeline {
    line: LineBuffer,
    font: Font,
    fonts: FontSet,
}

impl PrintPipeline {
    pub fn new(fonts: FontSet) -> PrintPipeline {
        PrintPipeline {
            line: LineBuffer::new(),
            font: Font::C64Upper,
            fonts,
        }
    }

    /// Select the character set for a listen session from its channel
    /// number. Runs at the start of every session: the selection is
    /// sticky, but each session re-derives it from its own channel.
    pub fn select_font(&mut self, channel: u8) {
        self.font = Font::from_channel(channel);
    }

    /// The currently active character set.
    pub fn font(&self) -> Font {
        self.font
    }

    /// Bytes buffered for the (unflushed) current line.
    pub fn pending(&self) -> usize {
        self.line.len()
    }

    /// Ingest one PETSCII byte.
    ///
    /// A carriage return flushes the buffered line (even when empty).
    /// Anything else is appended; reaching 48 columns forces a flush, so
    /// the buffer can never overflow.
    pub fn feed(&mut self, byte: u8, sink: &mut impl RasterSink) -> Result<(), PetprintError> {
        if byte != petscii::CR {
            self.line.push(byte);
            if self.line.is_full() {
                self.flush(sink)?;
            }
        } else {
            self.flush(sink)?;
        }
        Ok(())
    }

    /// Drop the buffered partial line without printing it. Used when a
    /// transfer error or bus reset voids the in-flight session.
    pub fn discard_line(&mut self) {
        self.line.clear();
    }

    /// Back to power-on defaults: empty buffer, uppercase set.
    pub fn reset(&mut self) {
        self.line.clear();
        self.font = Font::C64Upper;
    }

    /// Render the buffered line and hand it to the sink.
    fn flush(&mut self, sink: &mut impl RasterSink) -> Result<(), PetprintError> {
        let bitmap = self.rasterize();
        sink.print_raster(WIDTH_DOTS, LINE_ROWS as u16, &bitmap)?;
        self.line.clear();
        Ok(())
    }

    /// Build the 9-row bitmap for the current line (last row stays blank).
    fn rasterize(&mut self) -> Vec<u8> {
        let cells = self.line.terminated();
        let mut bitmap = vec![0u8; COLUMNS * LINE_ROWS];

        for row in 0..GLYPH_ROWS {
            let mut eol = false;
            let mut reverse = false;
            let mut skip = 0usize;

            for (x, &byte) in cells.iter().enumerate() {
                if !eol && petscii::is_printable(byte) {
                    let index = self.font.glyph_index(byte, reverse);
                    bitmap[COLUMNS * row + x - skip] = self.fonts.row(self.font, index, row);
                } else {
                    match byte {
                        petscii::CR => eol = true,
                        petscii::RVS_ON if self.font.is_legacy() => reverse = true,
                        petscii::RVS_OFF if self.font.is_legacy() => reverse = false,
                        petscii::LOWER_CASE if self.font.is_legacy() => {
                            self.font = Font::C64Lower;
                        }
                        petscii::UPPER_CASE if self.font.is_legacy() => {
                            self.font = Font::C64Upper;
                        }
                        // Unknown control code: gobble
                        _ => {}
                    }
                    skip += 1;
                }
            }
        }

        bitmap
    }

    /// Print the self-test banner through the normal pipeline.
    ///
    /// Forces the uppercase set first, like power-on. `primary_address` is
    /// the bus device number the banner reports.
    pub fn test_page(
        &mut self,
        sink: &mut impl RasterSink,
        primary_address: u8,
    ) -> Result<(), PetprintError> {
        self.font = Font::C64Upper;

        for line in [
            "************************************",
            "**                                **",
            "**            TEST PAGE           **",
            "**                                **",
            "************************************",
            "",
            "PETPRINT IEC PRINTER EMULATOR",
            "",
        ] {
            self.print_line(sink, line)?;
        }

        self.print_line(sink, &format!("PRIMARY ADDRESS SET TO {}", primary_address))?;
        self.print_line(sink, concat!("SOFTWARE VERSION ", env!("CARGO_PKG_VERSION")))?;
        self.print_line(sink, "")?;
        self.print_line(sink, " SECONDARY ADDRESS 0  C64 UPPERCASE")?;
        self.print_line(sink, " SECONDARY ADDRESS 7  C64 LOWERCASE")?;
        self.print_line(sink, " SECONDARY ADDRESS 1  PC FONT")?;

        sink.feed(2)
    }

    /// Feed one line of ASCII text plus a terminator.
    ///
    /// ASCII uppercase and digits coincide with the PETSCII unshifted
    /// letter band, so plain uppercase strings print as-is on the
    /// uppercase set.
    fn print_line(&mut self, sink: &mut impl RasterSink, text: &str) -> Result<(), PetprintError> {
        for &byte in text.as_bytes() {
            self.feed(byte, sink)?;
        }
        self.feed(petscii::CR, sink)
    }
}
