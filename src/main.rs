//! # Petprint CLI
//!
//! Drives the print pipeline directly, handy for exercising the renderer
//! and the thermal head without a Commodore on the bus.
//!
//! ## Usage
//!
//! ```bash
//! # Print a PETSCII file (raw bytes, CR line ends)
//! petprint print --chargen chargen.bin listing.seq
//!
//! # Print UTF-8 text from stdin, encoded to PETSCII
//! echo "hello world" | petprint print --chargen chargen.bin --encode
//!
//! # Render to a PNG instead of a printer, lowercase set
//! petprint print --chargen chargen.bin --channel 7 --png out.png --encode notes.txt
//!
//! # Print the self-test page
//! petprint test-page --chargen chargen.bin
//!
//! # Show the identification string the device answers on channel 15
//! petprint ident
//! ```

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use petprint::{
    FontSet, MemorySink, PetprintError, PrintPipeline, PrinterConfig, RasterSink, SerialTransport,
    bus, petscii,
    render::WIDTH_DOTS,
};

/// Petprint - Commodore IEC printer emulator utility
#[derive(Parser, Debug)]
#[command(name = "petprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a PETSCII stream through the print pipeline
    Print {
        /// Input file (omit to read stdin)
        file: Option<PathBuf>,

        /// C64 character generator ROM image (4096 bytes)
        #[arg(long)]
        chargen: PathBuf,

        /// PC font ROM image (2048 bytes); PC-font output is blank without it
        #[arg(long)]
        pcfont: Option<PathBuf>,

        /// Treat input as UTF-8 text and encode it to PETSCII
        #[arg(long)]
        encode: bool,

        /// Listen channel deciding the character set (0 upper, 7 lower, 1 PC)
        #[arg(long, default_value = "0")]
        channel: u8,

        /// Printer device path
        #[arg(long, default_value = "/dev/ttyUSB0")]
        device: String,

        /// Render to a PNG file instead of printing
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },

    /// Print the self-test page
    TestPage {
        /// C64 character generator ROM image (4096 bytes)
        #[arg(long)]
        chargen: PathBuf,

        /// PC font ROM image (2048 bytes)
        #[arg(long)]
        pcfont: Option<PathBuf>,

        /// Bus device number to report on the page
        #[arg(long, default_value = "4")]
        address: u8,

        /// Printer device path
        #[arg(long, default_value = "/dev/ttyUSB0")]
        device: String,

        /// Render to a PNG file instead of printing
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },

    /// Show the identification string sent on the command channel
    Ident,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), PetprintError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Print {
            file,
            chargen,
            pcfont,
            encode,
            channel,
            device,
            png,
        } => {
            let fonts = FontSet::load(&chargen, pcfont.as_ref())?;
            let bytes = read_input(file.as_deref(), encode)?;

            let mut pipeline = PrintPipeline::new(fonts);
            pipeline.select_font(channel);

            if let Some(png_path) = png {
                let mut sink = MemorySink::default();
                feed_stream(&mut pipeline, &mut sink, &bytes)?;
                save_png(&png_path, &sink)?;
                println!("Saved to {}", png_path.display());
            } else {
                let mut sink = SerialTransport::open(&device, PrinterConfig::default())?;
                feed_stream(&mut pipeline, &mut sink, &bytes)?;
                sink.feed(2)?;
                println!("Printed successfully!");
            }
        }

        Commands::TestPage {
            chargen,
            pcfont,
            address,
            device,
            png,
        } => {
            let fonts = FontSet::load(&chargen, pcfont.as_ref())?;
            let mut pipeline = PrintPipeline::new(fonts);

            if let Some(png_path) = png {
                let mut sink = MemorySink::default();
                pipeline.test_page(&mut sink, address)?;
                save_png(&png_path, &sink)?;
                println!("Saved to {}", png_path.display());
            } else {
                let mut sink = SerialTransport::open(&device, PrinterConfig::default())?;
                pipeline.test_page(&mut sink, address)?;
                println!("Printed successfully!");
            }
        }

        Commands::Ident => {
            println!("{}", bus::IDENT);
        }
    }

    Ok(())
}

/// Read the input bytes, optionally encoding UTF-8 text to PETSCII.
fn read_input(file: Option<&std::path::Path>, encode: bool) -> Result<Vec<u8>, PetprintError> {
    let raw = match file {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    if encode {
        Ok(petscii::encode(&String::from_utf8_lossy(&raw)))
    } else {
        Ok(raw)
    }
}

/// Feed a byte stream through the pipeline, flushing any trailing partial
/// line (a file rarely ends in CR; on the bus the peer would keep the
/// line open instead).
fn feed_stream(
    pipeline: &mut PrintPipeline,
    sink: &mut impl RasterSink,
    bytes: &[u8],
) -> Result<(), PetprintError> {
    for &byte in bytes {
        pipeline.feed(byte, sink)?;
    }
    if pipeline.pending() > 0 {
        pipeline.feed(petscii::CR, sink)?;
    }
    Ok(())
}

/// Save captured raster output as a stacked grayscale PNG.
fn save_png(path: &PathBuf, sink: &MemorySink) -> Result<(), PetprintError> {
    use image::{GrayImage, Luma};

    let width = WIDTH_DOTS as usize;
    let height: usize = sink.blocks.iter().map(|b| b.rows as usize).sum::<usize>()
        + sink.fed_rows as usize;
    if height == 0 {
        return Err(PetprintError::Image("No output to save".to_string()));
    }

    // White paper; feed rows stay blank
    let mut img = GrayImage::from_pixel(width as u32, height as u32, Luma([255u8]));

    let mut y = 0usize;
    for block in &sink.blocks {
        let row_bytes = (block.width_dots as usize).div_ceil(8);
        for row in 0..block.rows as usize {
            for x in 0..block.width_dots as usize {
                let byte = block.data[row * row_bytes + x / 8];
                let bit = 7 - (x % 8);
                if (byte >> bit) & 1 == 1 {
                    img.put_pixel(x as u32, (y + row) as u32, Luma([0u8]));
                }
            }
        }
        y += block.rows as usize;
    }

    img.save(path)
        .map_err(|e| PetprintError::Image(format!("Failed to save PNG: {}", e)))?;

    Ok(())
}
