//! Packs a monochrome view of an image into bytes, 8 pixels per byte,
//! most significant bit first.

use image::DynamicImage;
use std::io;

/// The only color treated as foreground.
const FOREGROUND: [u8; 3] = [255, 255, 255];

/// Where zero padding bits go when the pixel count is not a multiple of 8.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Padding {
    /// one continuous bit stream, only the final byte is padded
    #[default]
    Stream,
    /// every row starts on a byte boundary
    Row,
}

pub struct BitPacker<W> {
    buf: u8,
    bit_len: u8,
    writer: W,
}

impl<W: io::Write> BitPacker<W> {
    pub fn new(writer: W) -> Self {
        BitPacker {
            buf: 0,
            bit_len: 0,
            writer,
        }
    }

    #[inline(always)]
    pub fn push(&mut self, bit: bool) -> io::Result<()> {
        self.buf |= (bit as u8) << (7 - self.bit_len);
        self.bit_len += 1;
        if self.bit_len == 8 {
            trace!("pack: {:08b}", self.buf);
            self.writer.write_all(&[self.buf])?;
            self.buf = 0;
            self.bit_len = 0;
        }
        Ok(())
    }

    /// Emit the partial byte, if any, with the unused low bits cleared.
    pub fn align(&mut self) -> io::Result<()> {
        if self.bit_len != 0 {
            trace!("pack: {:08b}, padded {} bits", self.buf, 8 - self.bit_len);
            self.writer.write_all(&[self.buf])?;
            self.buf = 0;
            self.bit_len = 0;
        }
        Ok(())
    }

    pub fn finalize(mut self) -> io::Result<W> {
        self.align()?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Bytes [`pack_image`] produces for an image of the given size.
pub fn packed_len(width: u32, height: u32, padding: Padding) -> usize {
    let (width, height) = (width as usize, height as usize);
    match padding {
        Padding::Stream => (width * height).div_ceil(8),
        Padding::Row => width.div_ceil(8) * height,
    }
}

/// Walk the image row by row, feeding one bit per pixel into `writer`.
pub fn pack_image<W: io::Write>(
    image: &DynamicImage,
    padding: Padding,
    writer: W,
) -> io::Result<W> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    debug!("packing {width}x{height} image with {padding:?} padding");
    let mut packer = BitPacker::new(writer);
    for row in rgb.rows() {
        for pixel in row {
            packer.push(pixel.0 == FOREGROUND)?;
        }
        if padding == Padding::Row {
            packer.align()?;
        }
    }
    packer.finalize()
}
