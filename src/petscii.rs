//! # PETSCII Encoding
//!
//! PETSCII is the 8-bit text encoding of the Commodore 8-bit machines. It
//! differs from ASCII in three ways that matter to a printer: the letter
//! bands are case-swapped relative to ASCII, the ranges 0x00–0x1F and
//! 0x80–0x9F are control bands (reverse video, case shift, colors, cursor
//! movement), and 0xA0–0xFF carry the block-graphics characters.
//!
//! Glyph lookup does not index font tables with PETSCII directly; it goes
//! through the *screen code* translation ([`to_screen_code`]), the same
//! mapping the VIC-II character generator uses.

/// Carriage return, the line terminator and explicit flush trigger.
pub const CR: u8 = 0x0D;

/// Reverse video on (CHR$(18)).
pub const RVS_ON: u8 = 0x12;

/// Reverse video off (CHR$(146)).
pub const RVS_OFF: u8 = 0x92;

/// Switch to the lowercase (shifted) character set (CHR$(17)).
///
/// On screen this code moves the cursor down; Commodore printers reuse it
/// as the "business mode" (lowercase) selector.
pub const LOWER_CASE: u8 = 0x11;

/// Switch to the uppercase (unshifted) character set (CHR$(145)).
pub const UPPER_CASE: u8 = 0x91;

/// Whether a PETSCII byte produces a glyph column.
///
/// Printable bands are 0x20–0x7F and 0xA0–0xFF; everything else is a
/// control code and is consumed without printing.
#[inline]
pub fn is_printable(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7F | 0xA0..=0xFF)
}

/// Translate a PETSCII byte to its screen code (character generator index).
///
/// This is the standard PETSCII → screen code range mapping. Control bytes
/// map into 0x80–0xFF reverse-video territory and are never looked up by
/// the renderer; printable bytes always land in 0x00–0x7F.
pub fn to_screen_code(byte: u8) -> u8 {
    match byte {
        0x00..=0x1F => byte + 0x80,
        0x20..=0x3F => byte,
        0x40..=0x5F => byte - 0x40,
        0x60..=0x7F => byte - 0x20,
        0x80..=0x9F => byte + 0x40,
        0xA0..=0xBF => byte - 0x40,
        0xC0..=0xFE => byte - 0x80,
        0xFF => 0x5E, // pi shares the 0x5E glyph
    }
}

/// Encode a Unicode string as PETSCII bytes.
///
/// - ASCII lowercase maps to the unshifted letter band (0x41–0x5A), ASCII
///   uppercase to the shifted band (0xC1–0xDA), the usual case swap, so
///   text prints with the expected case on the lowercase character set
/// - LF and CR both become the PETSCII carriage return
/// - A few non-ASCII characters with PETSCII equivalents are mapped
/// - Anything else is replaced with `?` and a warning printed to stderr
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        if let Some(byte) = char_to_petscii(ch) {
            out.push(byte);
        } else {
            eprintln!(
                "petscii: unmapped character '{}' (U+{:04X}), replacing with '?'",
                ch, ch as u32
            );
            out.push(b'?');
        }
    }
    out
}

/// Map a single character to its PETSCII byte, if it has one.
fn char_to_petscii(ch: char) -> Option<u8> {
    let byte = match ch {
        '\n' | '\r' => CR,
        'a'..='z' => ch as u8 - 0x20,
        'A'..='Z' => ch as u8 + 0x80,
        ' '..='@' => ch as u8, // digits and common punctuation coincide
        '[' => 0x5B,
        ']' => 0x5D,
        '£' => 0x5C, // U+00A3, PETSCII pound
        '↑' => 0x5E, // U+2191, up arrow
        '←' => 0x5F, // U+2190, left arrow
        'π' => 0xFF, // U+03C0
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_bands_not_printable() {
        for byte in 0x00..=0x1F {
            assert!(!is_printable(byte), "{:#04X} should be a control code", byte);
        }
        for byte in 0x80..=0x9F {
            assert!(!is_printable(byte), "{:#04X} should be a control code", byte);
        }
    }

    #[test]
    fn test_printable_bands() {
        assert!(is_printable(0x20)); // space
        assert!(is_printable(b'A'));
        assert!(is_printable(0x7F));
        assert!(is_printable(0xA0)); // shifted space
        assert!(is_printable(0xFF)); // pi
        assert!(!is_printable(CR));
        assert!(!is_printable(RVS_ON));
        assert!(!is_printable(RVS_OFF));
    }

    #[test]
    fn test_screen_code_letters() {
        // Unshifted letters 0x41-0x5A land at the start of the table
        assert_eq!(to_screen_code(0x41), 0x01); // A
        assert_eq!(to_screen_code(0x48), 0x08); // H
        assert_eq!(to_screen_code(0x5A), 0x1A); // Z
        // Shifted letters 0xC1-0xDA land in the 0x41-0x5A glyph slots
        assert_eq!(to_screen_code(0xC1), 0x41);
        assert_eq!(to_screen_code(0xDA), 0x5A);
    }

    #[test]
    fn test_screen_code_punctuation() {
        // 0x20-0x3F is identity-mapped
        assert_eq!(to_screen_code(0x20), 0x20);
        assert_eq!(to_screen_code(b'0'), 0x30);
        assert_eq!(to_screen_code(b'?'), 0x3F);
        assert_eq!(to_screen_code(0x40), 0x00); // @
    }

    #[test]
    fn test_screen_code_graphics() {
        assert_eq!(to_screen_code(0xA0), 0x60); // shifted space
        assert_eq!(to_screen_code(0xBF), 0x7F);
        assert_eq!(to_screen_code(0x60), 0x40);
        assert_eq!(to_screen_code(0xFF), 0x5E); // pi
    }

    #[test]
    fn test_printable_bytes_stay_below_reverse_offset() {
        // The renderer adds 0x80 to the glyph index for reverse video, so
        // every printable byte must translate into 0x00-0x7F.
        for byte in 0u8..=255 {
            if is_printable(byte) {
                assert!(
                    to_screen_code(byte) < 0x80,
                    "{:#04X} -> {:#04X}",
                    byte,
                    to_screen_code(byte)
                );
            }
        }
    }

    #[test]
    fn test_encode_case_swap() {
        assert_eq!(encode("hello"), vec![0x48, 0x45, 0x4C, 0x4C, 0x4F]);
        assert_eq!(encode("HELLO"), vec![0xC8, 0xC5, 0xCC, 0xCC, 0xCF]);
    }

    #[test]
    fn test_encode_digits_and_punctuation() {
        assert_eq!(encode("10 COPIES!"), b"\x31\x30\x20\xC3\xCF\xD0\xC9\xC5\xD3\x21".to_vec());
    }

    #[test]
    fn test_encode_newline_is_cr() {
        assert_eq!(encode("a\nb"), vec![0x41, CR, 0x42]);
        assert_eq!(encode("a\r"), vec![0x41, CR]);
    }

    #[test]
    fn test_encode_petscii_specials() {
        assert_eq!(encode("£"), vec![0x5C]);
        assert_eq!(encode("π"), vec![0xFF]);
        assert_eq!(encode("↑←"), vec![0x5E, 0x5F]);
    }

    #[test]
    fn test_encode_unmapped_becomes_question_mark() {
        assert_eq!(encode("~"), vec![b'?']);
        assert_eq!(encode("★"), vec![b'?']);
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(""), Vec::<u8>::new());
    }
}
