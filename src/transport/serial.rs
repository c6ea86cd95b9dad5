//! # Serial Thermal Transport
//!
//! Drives the thermal print mechanism over a serial line (USB-TTL adapter
//! or an on-board UART).
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so binary raster data passes through
//! unmodified:
//!
//! - **No input processing**: disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8, no parity
//! - **No echo**: disable ECHO, ECHONL
//! - **Non-canonical mode**: disable ICANON (no line buffering)
//!
//! IXON/IXOFF/IXANY are disabled as well: 0x11 (XON/DC1) and 0x13
//! (XOFF/DC3) appear routinely in raster data and must not be eaten as
//! flow control. The baud rate comes from the printer profile.
//!
//! ## Chunked Writes
//!
//! The mechanism has a small input buffer and prints slower than the line
//! can deliver. Large blocks are written in chunks with a short delay in
//! between so the head keeps up.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::PetprintError;
use crate::printer::PrinterConfig;
use crate::protocol::commands;

use super::RasterSink;

/// Default serial device path
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 1024;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Serial Printer Transport
///
/// Manages a connection to the thermal head over a raw serial line.
/// Opening the transport also runs the bring-up sequence: printer init
/// followed by the profile's heat configuration.
///
/// ## Example
///
/// ```no_run
/// use petprint::printer::PrinterConfig;
/// use petprint::transport::SerialTransport;
///
/// let mut transport = SerialTransport::open("/dev/ttyUSB0", PrinterConfig::MINI58)?;
/// # Ok::<(), petprint::error::PetprintError>(())
/// ```
pub struct SerialTransport {
    file: File,
    config: PrinterConfig,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl SerialTransport {
    /// Open the serial device and bring up the printer.
    ///
    /// ## Errors
    ///
    /// Returns an error if the device doesn't exist, the permissions are
    /// wrong (dialout group), the profile's baud rate is unsupported, or
    /// TTY configuration fails.
    pub fn open<P: AsRef<Path>>(device: P, config: PrinterConfig) -> Result<Self, PetprintError> {
        let path = device.as_ref();

        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            PetprintError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_tty_raw(file.as_raw_fd(), config.baud)?;

        let mut transport = Self {
            file,
            config,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        };

        // Bring-up: defaults, then heat tuning from the profile
        transport.write_all(&commands::init())?;
        transport.write_all(&commands::heat_config(
            config.heating_dots,
            config.heating_time,
            config.heat_interval,
        ))?;

        Ok(transport)
    }

    /// Open with the default device path (/dev/ttyUSB0) and profile.
    pub fn open_default() -> Result<Self, PetprintError> {
        Self::open(DEFAULT_DEVICE, PrinterConfig::default())
    }

    /// The active printer profile.
    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Set the chunk size for large writes.
    ///
    /// Larger chunks are faster but can overrun the head's buffer.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size;
    }

    /// Set the delay between chunks.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    /// Write raw bytes to the printer, chunking large blocks.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), PetprintError> {
        if data.len() <= self.chunk_size {
            self.file
                .write_all(data)
                .map_err(|e| PetprintError::Transport(format!("Write failed: {}", e)))?;
        } else {
            for chunk in data.chunks(self.chunk_size) {
                self.file
                    .write_all(chunk)
                    .map_err(|e| PetprintError::Transport(format!("Write failed: {}", e)))?;

                if !self.chunk_delay.is_zero() {
                    thread::sleep(self.chunk_delay);
                }
            }
        }

        self.file
            .flush()
            .map_err(|e| PetprintError::Transport(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

impl RasterSink for SerialTransport {
    fn print_raster(
        &mut self,
        width_dots: u16,
        rows: u16,
        data: &[u8],
    ) -> Result<(), PetprintError> {
        let row_bytes = width_dots.div_ceil(8);
        if data.len() != row_bytes as usize * rows as usize {
            return Err(PetprintError::Transport(format!(
                "Raster data length mismatch: expected {} ({} bytes x {} rows), got {}",
                row_bytes as usize * rows as usize,
                row_bytes,
                rows,
                data.len()
            )));
        }
        if row_bytes > 255 || rows > 255 {
            return Err(PetprintError::Transport(format!(
                "Raster block too large for the bitmap command: {}x{}",
                width_dots, rows
            )));
        }

        let mut block = commands::bitmap_header(row_bytes as u8, rows as u8);
        block.extend_from_slice(data);
        self.write_all(&block)
    }

    fn feed(&mut self, rows: u8) -> Result<(), PetprintError> {
        self.write_all(&commands::feed_lines(rows))
    }
}

/// Configure a file descriptor for raw TTY mode at the given baud rate.
///
/// Disables all input/output processing so binary data passes through
/// unmodified.
#[cfg(unix)]
fn configure_tty_raw(fd: i32, baud: u32) -> Result<(), PetprintError> {
    use std::mem::MaybeUninit;

    let speed = baud_constant(baud)?;

    // Get current terminal attributes
    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(PetprintError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    // Input flags: disable all processing, including XON/XOFF flow control
    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    // Output flags: disable post-processing
    termios.c_oflag &= !libc::OPOST;

    // Local flags: disable echo, canonical mode, signals
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    // Control flags: 8-bit characters, no parity
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe {
        libc::cfsetispeed(&mut termios, speed)
            | libc::cfsetospeed(&mut termios, speed)
            | libc::tcsetattr(fd, libc::TCSANOW, &termios)
    };
    if result != 0 {
        return Err(PetprintError::Transport(format!(
            "TTY configuration failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_fd: i32, _baud: u32) -> Result<(), PetprintError> {
    // On non-Unix platforms, skip TTY configuration
    Ok(())
}

/// Map a numeric baud rate to its termios speed constant.
#[cfg(unix)]
fn baud_constant(baud: u32) -> Result<libc::speed_t, PetprintError> {
    match baud {
        9600 => Ok(libc::B9600),
        19200 => Ok(libc::B19200),
        38400 => Ok(libc::B38400),
        57600 => Ok(libc::B57600),
        115200 => Ok(libc::B115200),
        other => Err(PetprintError::Transport(format!(
            "Unsupported baud rate: {}",
            other
        ))),
    }
}
