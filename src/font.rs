//! # Font Tables
//!
//! Glyph data comes from two ROM images supplied by the embedder:
//!
//! | Table | Size | Layout |
//! |-------|------|--------|
//! | C64 character generator | 4096 bytes | 512 glyphs × 8 rows (uppercase set, then lowercase set, each with a reverse-video half) |
//! | PC font | 2048 bytes | 256 glyphs × 8 rows, indexed by raw byte value |
//!
//! The C64 image is the standard character generator ROM dump: glyphs
//! 0–127 are the unshifted set, 128–255 their reverse-video forms, 256–383
//! the shifted (lowercase) set and 384–511 its reverse-video forms. The PC
//! image is an 8×8 codepage font indexed directly by the incoming byte,
//! with no screen-code translation and no reverse-video half.
//!
//! Each glyph row byte holds 8 horizontal dots, bit 7 leftmost.

use std::path::Path;

use crate::error::PetprintError;
use crate::petscii;

/// Dot rows per glyph.
pub const GLYPH_ROWS: usize = 8;

/// Expected size of the C64 character generator image.
pub const CHARGEN_LEN: usize = 512 * GLYPH_ROWS;

/// Expected size of the PC font image.
pub const PC_FONT_LEN: usize = 256 * GLYPH_ROWS;

/// The character set used to render incoming bytes.
///
/// Selected from the secondary address of each listen session and switched
/// mid-stream by the PETSCII case-shift codes (C64 sets only). Sticky: the
/// last selection stays active until the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// C64 uppercase/graphics set, PETSCII translated through screen codes.
    C64Upper,
    /// C64 lowercase (shifted) set.
    C64Lower,
    /// PC codepage font, bytes index the table directly.
    Pc,
}

impl Font {
    /// Select the font for a listen session from its channel number.
    ///
    /// Channel 0 is the uppercase set, 7 the lowercase set, 1 the PC font.
    /// Anything else falls back to uppercase.
    pub fn from_channel(channel: u8) -> Font {
        match channel {
            0 => Font::C64Upper,
            7 => Font::C64Lower,
            1 => Font::Pc,
            _ => Font::C64Upper,
        }
    }

    /// Whether this is one of the two C64 sets (the ones that honor
    /// reverse video and case-shift control codes).
    #[inline]
    pub fn is_legacy(self) -> bool {
        !matches!(self, Font::Pc)
    }

    /// Glyph index for a printable PETSCII byte in this font's table.
    ///
    /// C64 sets: `(shifted ? 256 : 0) + (reverse ? 128 : 0) + screen code`.
    /// PC font: the byte itself; `reverse` is ignored (the table has no
    /// reverse-video half).
    pub fn glyph_index(self, byte: u8, reverse: bool) -> usize {
        match self {
            Font::C64Upper | Font::C64Lower => {
                let set = if self == Font::C64Lower { 256 } else { 0 };
                let rvs = if reverse { 128 } else { 0 };
                set + rvs + petscii::to_screen_code(byte) as usize
            }
            Font::Pc => byte as usize,
        }
    }
}

/// The pair of glyph tables the renderer draws from.
#[derive(Debug, Clone)]
pub struct FontSet {
    chargen: Vec<u8>,
    pc: Vec<u8>,
}

impl FontSet {
    /// Build a font set from raw table bytes, validating sizes.
    pub fn from_bytes(chargen: Vec<u8>, pc: Vec<u8>) -> Result<FontSet, PetprintError> {
        if chargen.len() != CHARGEN_LEN {
            return Err(PetprintError::Font(format!(
                "Character generator image must be {} bytes, got {}",
                CHARGEN_LEN,
                chargen.len()
            )));
        }
        if pc.len() != PC_FONT_LEN {
            return Err(PetprintError::Font(format!(
                "PC font image must be {} bytes, got {}",
                PC_FONT_LEN,
                pc.len()
            )));
        }
        Ok(FontSet { chargen, pc })
    }

    /// Load the tables from ROM image files.
    ///
    /// The PC font is optional; without one, PC-font output renders blank.
    pub fn load<P: AsRef<Path>>(chargen: P, pc: Option<P>) -> Result<FontSet, PetprintError> {
        let chargen_path = chargen.as_ref();
        let chargen = std::fs::read(chargen_path).map_err(|e| {
            PetprintError::Font(format!("Failed to read {}: {}", chargen_path.display(), e))
        })?;
        let pc = match pc {
            Some(path) => {
                let path = path.as_ref();
                std::fs::read(path).map_err(|e| {
                    PetprintError::Font(format!("Failed to read {}: {}", path.display(), e))
                })?
            }
            None => vec![0u8; PC_FONT_LEN],
        };
        FontSet::from_bytes(chargen, pc)
    }

    /// One row byte of a glyph.
    ///
    /// `index` must come from [`Font::glyph_index`]; `row` is 0–7 top to
    /// bottom.
    #[inline]
    pub fn row(&self, font: Font, index: usize, row: usize) -> u8 {
        debug_assert!(row < GLYPH_ROWS);
        match font {
            Font::C64Upper | Font::C64Lower => self.chargen[index * GLYPH_ROWS + row],
            Font::Pc => self.pc[index * GLYPH_ROWS + row],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Synthetic tables where every glyph row encodes its own position, so
    /// lookups can be checked exactly.
    fn synthetic() -> FontSet {
        let chargen: Vec<u8> = (0..CHARGEN_LEN).map(|i| (i % 251) as u8).collect();
        let pc: Vec<u8> = (0..PC_FONT_LEN).map(|i| (i % 241) as u8).collect();
        FontSet::from_bytes(chargen, pc).unwrap()
    }

    #[test]
    fn test_channel_selection() {
        assert_eq!(Font::from_channel(0), Font::C64Upper);
        assert_eq!(Font::from_channel(7), Font::C64Lower);
        assert_eq!(Font::from_channel(1), Font::Pc);
        // Everything else defaults to uppercase
        assert_eq!(Font::from_channel(2), Font::C64Upper);
        assert_eq!(Font::from_channel(15), Font::C64Upper);
    }

    #[test]
    fn test_glyph_index_upper() {
        // 'H' (0x48) -> screen code 0x08
        assert_eq!(Font::C64Upper.glyph_index(0x48, false), 0x08);
        assert_eq!(Font::C64Upper.glyph_index(0x48, true), 0x88);
    }

    #[test]
    fn test_glyph_index_lower_set_offset() {
        assert_eq!(Font::C64Lower.glyph_index(0x48, false), 256 + 0x08);
        assert_eq!(Font::C64Lower.glyph_index(0x48, true), 256 + 128 + 0x08);
    }

    #[test]
    fn test_glyph_index_pc_is_raw_byte() {
        assert_eq!(Font::Pc.glyph_index(0x48, false), 0x48);
        // The PC table has no reverse-video half
        assert_eq!(Font::Pc.glyph_index(0x48, true), 0x48);
        assert_eq!(Font::Pc.glyph_index(0xFF, false), 0xFF);
    }

    #[test]
    fn test_row_lookup() {
        let fonts = synthetic();
        let idx = Font::C64Upper.glyph_index(0x41, false); // 'A' -> 1
        assert_eq!(fonts.row(Font::C64Upper, idx, 0), ((idx * 8) % 251) as u8);
        assert_eq!(fonts.row(Font::C64Upper, idx, 7), ((idx * 8 + 7) % 251) as u8);
        assert_eq!(fonts.row(Font::Pc, 0x41, 3), ((0x41 * 8 + 3) % 241) as u8);
    }

    #[test]
    fn test_max_legacy_index_in_bounds() {
        let fonts = synthetic();
        // Highest reachable index: lowercase set, reverse, screen code 0x7F
        let idx = Font::C64Lower.glyph_index(0xBF, true);
        assert_eq!(idx, 511);
        let _ = fonts.row(Font::C64Lower, idx, 7);
    }

    #[test]
    fn test_from_bytes_validates_sizes() {
        assert!(FontSet::from_bytes(vec![0; CHARGEN_LEN], vec![0; PC_FONT_LEN]).is_ok());
        assert!(FontSet::from_bytes(vec![0; 100], vec![0; PC_FONT_LEN]).is_err());
        assert!(FontSet::from_bytes(vec![0; CHARGEN_LEN], vec![0; 100]).is_err());
    }
}
