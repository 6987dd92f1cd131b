//! bitmap-rle - bake a monochrome bitmap into a source-code byte array
//!
//! Pipeline: image -> 1 bit per pixel -> optional RLE -> array / binary / hex

use bitmap_rle::{pack_image, ArrayWriter, Mode, Padding, Radix, Rle};
use clap::{Parser, ValueEnum};
use image::DynamicImage;
use log::{debug, info, LevelFilter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `{0xff, 0x2b, 0x05};` initializer
    Array,
    /// Raw bytes
    Binary,
    /// One lowercase hex string
    Hex,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RadixArg {
    Hex,
    Decimal,
}

impl From<RadixArg> for Radix {
    fn from(radix: RadixArg) -> Self {
        match radix {
            RadixArg::Hex => Radix::Hex,
            RadixArg::Decimal => Radix::Decimal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "bitmap-rle")]
#[command(about = "Convert a 2-color image into a packed, optionally RLE compressed byte array")]
struct Args {
    /// Input image; pure white (255, 255, 255) pixels are foreground
    image: PathBuf,

    /// `rle` enables run-length encoding, anything else passes bytes through
    mode: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Array)]
    format: Format,

    /// Radix of array elements
    #[arg(short, long, value_enum, default_value_t = RadixArg::Hex)]
    radix: RadixArg,

    /// Array elements per line, 0 keeps everything on one line
    #[arg(long, default_value_t = 0)]
    per_line: usize,

    /// Start every pixel row on a byte boundary
    #[arg(long)]
    row_padding: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug logging (RUST_LOG still takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn mode(&self) -> Mode {
        self.mode.as_deref().map(Mode::from_arg).unwrap_or_default()
    }

    fn padding(&self) -> Padding {
        if self.row_padding {
            Padding::Row
        } else {
            Padding::Stream
        }
    }
}

/// Collects the encoded stream for formats that need all of it up front.
fn encode_to_vec(image: &DynamicImage, mode: Mode, padding: Padding) -> io::Result<Vec<u8>> {
    let rle = Rle::new(Vec::new(), mode);
    pack_image(image, padding, rle)?.finalize()
}

fn run(args: &Args, out: &mut dyn Write) -> Result<(), String> {
    let mode = args.mode();
    let padding = args.padding();

    let image = image::open(&args.image)
        .map_err(|e| format!("Failed to load {}: {}", args.image.display(), e))?;
    info!(
        "loaded {} ({}x{}), mode {:?}",
        args.image.display(),
        image.width(),
        image.height(),
        mode
    );

    let io_err = |e: io::Error| format!("Failed to write output: {}", e);
    match args.format {
        Format::Array => {
            let array = ArrayWriter::new(&mut *out, args.radix.into())
                .map_err(io_err)?
                .per_line(args.per_line);
            let rle = Rle::new(array, mode);
            let rle = pack_image(&image, padding, rle).map_err(io_err)?;
            rle.finalize().map_err(io_err)?.finalize().map_err(io_err)?;
        }
        Format::Binary => {
            let rle = Rle::new(&mut *out, mode);
            pack_image(&image, padding, rle)
                .and_then(Rle::finalize)
                .map_err(io_err)?;
        }
        Format::Hex => {
            let bytes = encode_to_vec(&image, mode, padding).map_err(io_err)?;
            writeln!(out, "{}", hex::encode(bytes)).map_err(io_err)?;
        }
    }
    out.flush().map_err(io_err)
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
    debug!("{:?}", args);

    execute(&args)
}

fn execute(args: &Args) -> Result<(), String> {
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
            let mut out = BufWriter::new(file);
            run(args, &mut out)
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run(args, &mut out)
        }
    }
}
