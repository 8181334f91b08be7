//! Tag/length/close framing
//!
//! - Composite element: `tag child* CLOSE`
//! - Leaf element: `tag varint(len) payload`
//! - Integers: minimal big-endian payload, zero is empty
//!
//! Lengths are unsigned LEB128.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::tags;
use crate::error::CodecError;

/// Longest integer payload accepted
const MAX_INTEGER_LEN: usize = 8;

/// Longest LEB128 length prefix accepted
const MAX_VARINT_LEN: usize = 10;

/// Append-only element writer
#[derive(Debug, Default)]
pub struct WireEncoder {
    buf: BytesMut,
}

impl WireEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, tag: u8) {
        self.buf.put_u8(tag);
    }

    pub fn close(&mut self) {
        self.buf.put_u8(tags::CLOSE);
    }

    pub fn leaf(&mut self, tag: u8, payload: &[u8]) {
        self.buf.put_u8(tag);
        self.put_varint(payload.len() as u64);
        self.buf.put_slice(payload);
    }

    pub fn integer(&mut self, tag: u8, value: u64) {
        let bytes = value.to_be_bytes();
        let skip = bytes.iter().take_while(|&&b| b == 0).count();
        self.leaf(tag, &bytes[skip..]);
    }

    fn put_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.put_u8(byte);
                return;
            }
            self.buf.put_u8(byte | 0x80);
        }
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Cursor over an encoded element stream
#[derive(Debug)]
pub struct WireDecoder<'a> {
    buf: &'a [u8],
}

impl<'a> WireDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Next tag without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.buf.first().copied()
    }

    pub fn peek_is(&self, tag: u8) -> bool {
        self.peek() == Some(tag)
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Consume the opening tag of a composite element
    pub fn open(&mut self, tag: u8, expected: &'static str) -> Result<(), CodecError> {
        self.expect_tag(tag, expected)
    }

    /// Consume a closing marker
    pub fn close(&mut self, context: &'static str) -> Result<(), CodecError> {
        self.expect_tag(tags::CLOSE, context)
    }

    /// Consume a leaf element and return its payload
    pub fn leaf(&mut self, tag: u8, expected: &'static str) -> Result<&'a [u8], CodecError> {
        self.expect_tag(tag, expected)?;
        self.payload(expected)
    }

    /// Payload of a leaf whose tag was already consumed
    pub fn payload(&mut self, context: &'static str) -> Result<&'a [u8], CodecError> {
        let len = self.varint(context)?;
        let len = usize::try_from(len).map_err(|_| CodecError::InvalidLength(len))?;
        if len > self.buf.len() {
            return Err(CodecError::Truncated { context });
        }
        let (payload, rest) = self.buf.split_at(len);
        self.buf = rest;
        Ok(payload)
    }

    pub fn integer(&mut self, tag: u8, element: &'static str) -> Result<u64, CodecError> {
        let payload = self.leaf(tag, element)?;
        if payload.len() > MAX_INTEGER_LEN {
            return Err(CodecError::IntegerOverflow {
                element,
                len: payload.len(),
            });
        }
        Ok(payload.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    pub fn integer_u32(&mut self, tag: u8, element: &'static str) -> Result<u32, CodecError> {
        let value = self.integer(tag, element)?;
        u32::try_from(value).map_err(|_| CodecError::IntegerOverflow {
            element,
            len: MAX_INTEGER_LEN - value.leading_zeros() as usize / 8,
        })
    }

    pub fn integer_usize(&mut self, tag: u8, element: &'static str) -> Result<usize, CodecError> {
        let value = self.integer(tag, element)?;
        usize::try_from(value).map_err(|_| CodecError::IntegerOverflow {
            element,
            len: MAX_INTEGER_LEN - value.leading_zeros() as usize / 8,
        })
    }

    /// Skip one unknown leaf element, tag included
    pub fn skip_leaf(&mut self, context: &'static str) -> Result<u8, CodecError> {
        let tag = self.tag(context)?;
        self.payload(context)?;
        Ok(tag)
    }

    /// Drop everything left in the buffer
    pub fn skip_rest(&mut self) -> usize {
        let skipped = self.buf.len();
        self.buf = &[];
        skipped
    }

    /// Consume one tag byte
    pub fn tag(&mut self, context: &'static str) -> Result<u8, CodecError> {
        if !self.buf.has_remaining() {
            return Err(CodecError::Truncated { context });
        }
        Ok(self.buf.get_u8())
    }

    fn expect_tag(&mut self, tag: u8, expected: &'static str) -> Result<(), CodecError> {
        let found = self.tag(expected)?;
        if found != tag {
            return Err(CodecError::UnexpectedTag { expected, found });
        }
        Ok(())
    }

    fn varint(&mut self, context: &'static str) -> Result<u64, CodecError> {
        let mut value = 0u64;
        for index in 0..MAX_VARINT_LEN {
            let byte = self.tag(context)?;
            let bits = u64::from(byte & 0x7f);
            if index == MAX_VARINT_LEN - 1 && bits > 1 {
                return Err(CodecError::InvalidLength(value));
            }
            value |= bits << (7 * index);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::InvalidLength(value))
    }
}
