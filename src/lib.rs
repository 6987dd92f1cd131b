//! # RLE Encoding Scheme
//!
//! The input is a stream of bytes, usually a monochrome bitmap packed 8 pixels
//! per byte (see [`BitPacker`]). The output is a stream of tokens.
//!
//! A literal token is one byte, emitted verbatim:
//!
//! ```text
//!         XXXX XXXX      (any value except 0xFF)
//! ```
//!
//! An escape token is three bytes:
//!
//! ```text
//!         0xFF  N  V
//!          ▲    ▲  ▲
//!  ESCAPE ─┘    │  └─ repeated byte
//!               └──── run length - 1
//! ```
//!
//! `V` is repeated `N + 1` times, so one token covers 1 to 256 repeats.
//! Longer runs are split into several tokens of at most 256 repeats each.
//!
//! A run of length 1 is a literal token, unless its value is `0xFF`: a bare
//! `0xFF` would be read back as the start of an escape token, so it is always
//! encoded as `0xFF 0x00 0xFF`.
//!
//! The encoding carries no size or header. The stream ends when the input ends.
//!
//! # Raw mode
//!
//! In raw mode the encoder passes every byte through unchanged.

#[macro_use]
extern crate log;

mod derle;
mod pack;
mod render;
mod rle;

pub use derle::{decode, DeRle};
pub use pack::{pack_image, packed_len, BitPacker, Padding};
pub use render::{ArrayWriter, Radix};
pub use rle::{encode, Mode, Rle};

/// marks the start of an escape token
const ESCAPE: u8 = 0xFF;
/// longest run a single escape token can carry
const MAX_RUN: u16 = u8::MAX as u16 + 1;
