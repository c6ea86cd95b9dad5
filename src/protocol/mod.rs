//! # Thermal Printer Protocol
//!
//! Low-level command builders for the serial thermal mechanism on the
//! output side of the bridge.
//!
//! - [`commands`]: init, heat configuration, bitmap header, paper feed
//!
//! ## Usage Example
//!
//! ```
//! use petprint::protocol::commands;
//!
//! // Bring-up sequence: init, then heat tuning
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(commands::heat_config(3, 160, 80));
//!
//! // One raster line: header then 9 rows of 48 bytes
//! data.extend(commands::bitmap_header(48, 9));
//! data.extend([0u8; 48 * 9]);
//! ```

pub mod commands;
