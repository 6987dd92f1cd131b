//! Renders a byte stream as a source-code array initializer, e.g.
//! `{0xff, 0x2b, 0x05};`.

use std::io;

/// How each element of the array is spelled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Radix {
    /// `0x1f`
    #[default]
    Hex,
    /// `31`
    Decimal,
}

pub struct ArrayWriter<W> {
    radix: Radix,
    per_line: Option<usize>,
    count: usize,
    writer: W,
}

impl<W: io::Write> ArrayWriter<W> {
    /// Opens the array; the opening brace is written immediately.
    pub fn new(mut writer: W, radix: Radix) -> io::Result<Self> {
        writer.write_all(b"{")?;
        Ok(ArrayWriter {
            radix,
            per_line: None,
            count: 0,
            writer,
        })
    }

    /// Break the line after every `n` elements. `0` disables wrapping.
    pub fn per_line(mut self, n: usize) -> Self {
        self.per_line = (n != 0).then_some(n);
        self
    }

    #[inline(always)]
    pub fn update(&mut self, byte: u8) -> io::Result<()> {
        if self.count != 0 {
            match self.per_line {
                Some(n) if self.count % n == 0 => self.writer.write_all(b",\n    ")?,
                _ => self.writer.write_all(b", ")?,
            }
        }
        match self.radix {
            Radix::Hex => write!(self.writer, "0x{byte:02x}")?,
            Radix::Decimal => write!(self.writer, "{byte}")?,
        }
        self.count += 1;
        Ok(())
    }

    /// Closes the array and hands back the writer.
    pub fn finalize(mut self) -> io::Result<W> {
        self.writer.write_all(b"};\n")?;
        debug!("rendered {} elements", self.count);
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: io::Write> io::Write for ArrayWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for byte in buf.iter() {
            self.update(*byte)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
