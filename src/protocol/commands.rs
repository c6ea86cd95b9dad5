//! # Thermal Head Commands
//!
//! Command builders for the ESC/POS-style serial thermal print mechanisms
//! (58 mm, 384-dot heads). Each builder returns the raw byte sequence; the
//! transport decides when to send it.
//!
//! ## Command Summary
//!
//! | Command | Bytes | Description |
//! |---------|-------|-------------|
//! | Init | ESC @ | reset to power-on defaults |
//! | Heat config | ESC 7 n1 n2 n3 | heating dots / time / interval |
//! | Bitmap | DC2 * r n d1...dk | raster block, r rows of n bytes |
//! | Feed | ESC d n | advance n text lines |

/// ESC (Escape) - command prefix byte
pub const ESC: u8 = 0x1B;

/// DC2 (Device Control 2) - graphics command prefix
pub const DC2: u8 = 0x12;

/// # Initialize Printer (ESC @)
///
/// Resets formatting and clears the print buffer. Sent once at transport
/// open, before the heat configuration.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Heat Configuration (ESC 7 n1 n2 n3)
///
/// Tunes the thermal element drive. Higher heating time prints darker but
/// slower; a longer heat interval sharpens output at the cost of speed.
///
/// | Format  | Bytes          |
/// |---------|----------------|
/// | Hex     | 1B 37 n1 n2 n3 |
/// | Decimal | 27 55 n1 n2 n3 |
///
/// ## Parameters
///
/// - `dots`: concurrently heated dots, in units of 8 ((n1+1)*8 dots)
/// - `time`: heating time in units of 10 µs
/// - `interval`: heat interval in units of 10 µs
#[inline]
pub fn heat_config(dots: u8, time: u8, interval: u8) -> Vec<u8> {
    vec![ESC, b'7', dots, time, interval]
}

/// # Print Bitmap Header (DC2 * r n)
///
/// Announces a raster block of `rows` dot rows, each `row_bytes` wide
/// (8 dots per byte, bit 7 leftmost). The `rows × row_bytes` data bytes
/// follow immediately.
///
/// | Format  | Bytes      |
/// |---------|------------|
/// | Hex     | 12 2A r n  |
/// | Decimal | 18 42 r n  |
///
/// ## Example
///
/// ```
/// use petprint::protocol::commands;
///
/// // One 384-dot wide, 9-row text line: 48 bytes per row
/// let header = commands::bitmap_header(48, 9);
/// assert_eq!(header, vec![0x12, 0x2A, 9, 48]);
/// ```
#[inline]
pub fn bitmap_header(row_bytes: u8, rows: u8) -> Vec<u8> {
    vec![DC2, b'*', rows, row_bytes]
}

/// # Feed Lines (ESC d n)
///
/// Prints anything buffered and advances the paper `n` lines.
///
/// | Format  | Bytes   |
/// |---------|---------|
/// | Hex     | 1B 64 n |
/// | Decimal | 27 100 n |
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}
