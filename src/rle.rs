use crate::{ESCAPE, MAX_RUN};
use std::fmt::Debug;
use std::{fmt, io, slice};

/// Output mode, fixed for the lifetime of an encoder.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// bytes are passed through unchanged
    #[default]
    Raw,
    /// bytes are run-length encoded
    Rle,
}

impl Mode {
    /// `"rle"` selects RLE, anything else falls back to raw passthrough.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "rle" {
            Mode::Rle
        } else {
            Mode::Raw
        }
    }
}

pub struct Rle<W> {
    mode: Mode,
    status: RleStatus,
    read: usize,
    wrote: usize,
    writer: W,
}

#[derive(Copy, Clone)]
enum RleStatus {
    Run { value: u8, count: u16 },
    Wait,
}

enum Token {
    Literal(u8),
    Escape([u8; 3]),
}

impl<W: io::Write> Rle<W> {
    pub fn new(writer: W, mode: Mode) -> Self {
        Rle {
            mode,
            status: RleStatus::Wait,
            read: 0,
            wrote: 0,
            writer,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Feed one byte.
    ///
    /// In RLE mode nothing derived from `byte` is written yet: the run it
    /// belongs to is only encoded once a different byte arrives, the run
    /// reaches 256 repeats, or the encoder is finalized.
    #[inline(always)]
    pub fn update(&mut self, byte: u8) -> io::Result<()> {
        self.read += 1;
        if self.mode == Mode::Raw {
            trace!("pass through 0x{byte:02X}");
            self.wrote += 1;
            return self.writer.write_all(&[byte]);
        }
        trace!("update byte 0x{byte:02X}");
        trace!("current status {:?}", self.status);
        match self.status {
            RleStatus::Wait => {
                self.status = RleStatus::Run {
                    value: byte,
                    count: 1,
                };
                trace!("transit to {:?}", self.status);
            }
            RleStatus::Run { value, count } if value == byte => {
                if count < MAX_RUN {
                    self.status = RleStatus::Run {
                        value,
                        count: count + 1,
                    };
                } else {
                    trace!("cut! run of 0x{value:02X} hit {MAX_RUN}");
                    self.emit(self.status.try_encode())?;
                    // the byte just read opens the next run
                    self.status = RleStatus::Run { value, count: 1 };
                    trace!("transit to {:?}", self.status);
                }
            }
            RleStatus::Run { .. } => {
                self.emit(self.status.try_encode())?;
                self.status = RleStatus::Run {
                    value: byte,
                    count: 1,
                };
                trace!("transit to {:?}", self.status);
            }
        }
        Ok(())
    }

    #[inline(always)]
    fn emit(&mut self, token: Option<Token>) -> io::Result<()> {
        if let Some(token) = token {
            let bytes = token.as_bytes();
            trace!("emit {}", hex::encode(bytes));
            self.wrote += bytes.len();
            self.writer.write_all(bytes)?;
        }
        Ok(())
    }

    /// Flush the pending run and hand back the writer.
    pub fn finalize(mut self) -> io::Result<W> {
        trace!("last block: {:?}", self.status);
        self.emit(self.status.try_encode())?;
        self.status = RleStatus::Wait;
        debug!(
            "{:?} encoding done: read {} bytes, wrote {} bytes",
            self.mode, self.read, self.wrote
        );
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl RleStatus {
    #[inline(always)]
    fn try_encode(self) -> Option<Token> {
        match self {
            RleStatus::Wait => None,
            RleStatus::Run { value, count: 1 } if value != ESCAPE => Some(Token::Literal(value)),
            RleStatus::Run { value, count } => {
                debug_assert!(count >= 1);
                debug_assert!(count <= MAX_RUN);
                Some(Token::Escape([ESCAPE, (count - 1) as u8, value]))
            }
        }
    }
}

impl Token {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Token::Literal(byte) => slice::from_ref(byte),
            Token::Escape(bytes) => bytes,
        }
    }
}

impl Debug for RleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RleStatus::Run { value, count } => f
                .debug_struct("Run")
                .field("value", &format_args!("0x{value:02X}"))
                .field("count", &count)
                .finish(),
            RleStatus::Wait => f.write_str("Wait"),
        }
    }
}

impl<W: io::Write> io::Write for Rle<W> {
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

/// Encode a complete buffer in one go.
pub fn encode(input: &[u8], mode: Mode) -> io::Result<Vec<u8>> {
    let mut rle = Rle::new(Vec::with_capacity(input.len()), mode);
    for byte in input {
        rle.update(*byte)?;
    }
    rle.finalize()
}

#[cfg(test)]
mod tests {
    use super::{encode, Mode, Rle};
    use crate::decode;
    use crate::tests::setup;
    use std::io::Write;

    const TEST_VECTOR: [(&str, &str); 14] = [
        ("", ""),
        ("03", "03"),
        ("ff", "ff00ff"),
        ("050507", "ff010507"),
        ("ffff", "ff01ff"),
        ("00ff00", "00ff00ff00"),
        ("0102030405", "0102030405"),
        ("00000000", "ff0300"),
        ("ff00ff", "ff00ff00ff00ff"),
        ("fefefeff", "ff02feff00ff"),
        ("aaaa55aaaa", "ff01aa55ff01aa"),
        ("0f0f0f0ff0", "ff030ff0"),
        ("ffffffff00", "ff03ff00"),
        ("7e", "7e"),
    ];

    fn xorshift(state: &mut u32) -> u32 {
        *state ^= *state << 13;
        *state ^= *state >> 17;
        *state ^= *state << 5;
        *state
    }

    /// Bytes drawn from a tiny alphabet with long runs, the shape of a packed
    /// monochrome bitmap.
    fn bitmap_like(seed: u32, len: usize) -> Vec<u8> {
        let mut state = seed;
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            let value = match xorshift(&mut state) % 5 {
                0 => 0x00,
                1 => 0xFF,
                2 => 0x0F,
                _ => xorshift(&mut state) as u8,
            };
            let run = (xorshift(&mut state) % 600) as usize + 1;
            out.extend(std::iter::repeat(value).take(run.min(len - out.len())));
        }
        out
    }

    #[test]
    fn test_rle_encode() {
        setup();
        for (input, expected) in TEST_VECTOR.into_iter() {
            let input = hex::decode(input).unwrap();
            let expected = hex::decode(expected).unwrap();
            let mut out = vec![];
            let mut rle = Rle::new(&mut out, Mode::Rle);
            rle.write_all(&input).unwrap();
            rle.finalize().unwrap();
            assert_eq!(expected, out, "input {}", hex::encode(&input));
        }
    }

    #[test]
    fn test_run_cap() {
        setup();
        let out = encode(&[0x05; 300], Mode::Rle).unwrap();
        assert_eq!(out, [0xFF, 255, 0x05, 0xFF, 43, 0x05]);

        let out = encode(&[0xAA; 256], Mode::Rle).unwrap();
        assert_eq!(out, [0xFF, 255, 0xAA]);

        let out = encode(&[0xAA; 257], Mode::Rle).unwrap();
        assert_eq!(out, [0xFF, 255, 0xAA, 0xAA]);

        let out = encode(&[0xFF; 257], Mode::Rle).unwrap();
        assert_eq!(out, [0xFF, 255, 0xFF, 0xFF, 0x00, 0xFF]);

        let out = encode(&[0x00; 512], Mode::Rle).unwrap();
        assert_eq!(out, [0xFF, 255, 0x00, 0xFF, 255, 0x00]);
    }

    #[test]
    fn test_emits_after_run_ends() {
        setup();
        let mut rle = Rle::new(vec![], Mode::Rle);
        rle.update(0x05).unwrap();
        assert!(rle.get_ref().is_empty());
        rle.update(0x05).unwrap();
        assert!(rle.get_ref().is_empty());
        rle.update(0x07).unwrap();
        assert_eq!(rle.get_ref(), &[0xFF, 0x01, 0x05]);
        let out = rle.finalize().unwrap();
        assert_eq!(out, [0xFF, 0x01, 0x05, 0x07]);
    }

    #[test]
    fn test_cap_emits_immediately() {
        setup();
        let mut rle = Rle::new(vec![], Mode::Rle);
        for _ in 0..256 {
            rle.update(0x11).unwrap();
        }
        assert!(rle.get_ref().is_empty());
        rle.update(0x11).unwrap();
        assert_eq!(rle.get_ref(), &[0xFF, 0xFF, 0x11]);
        let out = rle.finalize().unwrap();
        assert_eq!(out, [0xFF, 0xFF, 0x11, 0x11]);
    }

    #[test]
    fn test_raw_identity() {
        setup();
        assert!(encode(&[], Mode::Raw).unwrap().is_empty());
        assert!(encode(&[], Mode::Rle).unwrap().is_empty());
        let input = bitmap_like(0x1234_5678, 4096);
        assert_eq!(encode(&input, Mode::Raw).unwrap(), input);

        let mut rle = Rle::new(vec![], Mode::Raw);
        rle.update(0xFF).unwrap();
        assert_eq!(rle.get_ref(), &[0xFF]);
        assert_eq!(rle.finalize().unwrap(), [0xFF]);
    }

    #[test]
    fn test_round_trip() {
        setup();
        for seed in 1..64u32 {
            let input = bitmap_like(seed.wrapping_mul(2_654_435_761), 2000);
            let encoded = encode(&input, Mode::Rle).unwrap();
            assert_eq!(decode(&encoded).unwrap(), input, "seed {seed}");
        }
    }

    #[test]
    fn test_mode_from_arg() {
        assert_eq!(Mode::from_arg("rle"), Mode::Rle);
        assert_eq!(Mode::from_arg("RLE"), Mode::Raw);
        assert_eq!(Mode::from_arg("raw"), Mode::Raw);
        assert_eq!(Mode::from_arg(""), Mode::Raw);
        assert_eq!(Mode::default(), Mode::Raw);
    }
}
