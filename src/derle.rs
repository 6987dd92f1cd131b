use crate::ESCAPE;
use std::io;

pub struct DeRle<W> {
    status: DeRleStatus,
    writer: W,
}

#[derive(Debug, Copy, Clone)]
enum DeRleStatus {
    /// expecting the first byte of a token
    Literal,
    /// saw the escape byte, expecting the length
    Length,
    /// saw the escape byte and the length, expecting the value
    Value { length: u8 },
}

impl<W: io::Write> DeRle<W> {
    pub fn new(writer: W) -> DeRle<W> {
        DeRle {
            status: DeRleStatus::Literal,
            writer,
        }
    }

    #[inline(always)]
    pub fn update(&mut self, enc: u8) -> io::Result<()> {
        trace!("status: {:?}, byte: 0x{enc:02X}", self.status);
        match self.status {
            DeRleStatus::Literal => {
                if enc == ESCAPE {
                    self.status = DeRleStatus::Length;
                } else {
                    trace!("decode: 0x{enc:02X}");
                    self.writer.write_all(&[enc])?;
                }
            }
            DeRleStatus::Length => {
                self.status = DeRleStatus::Value { length: enc };
            }
            DeRleStatus::Value { length } => {
                let repeats = length as usize + 1;
                trace!("decode: 0x{enc:02X} x {repeats}");
                let run = [enc; u8::MAX as usize + 1];
                self.writer.write_all(&run[..repeats])?;
                self.status = DeRleStatus::Literal;
            }
        }
        Ok(())
    }

    #[inline(always)]
    pub fn finalize(mut self) -> io::Result<W> {
        if !matches!(self.status, DeRleStatus::Literal) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated escape token",
            ));
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: io::Write> io::Write for DeRle<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for byte in buf.iter() {
            self.update(*byte)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Decode a complete RLE token stream.
pub fn decode(input: &[u8]) -> io::Result<Vec<u8>> {
    let mut derle = DeRle::new(Vec::with_capacity(input.len()));
    for byte in input {
        derle.update(*byte)?;
    }
    derle.finalize()
}
