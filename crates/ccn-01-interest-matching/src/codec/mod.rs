//! Wire codec for protocol objects
//!
//! Each encodable type implements [`WireEncodable`] on top of the shared
//! [`WireEncoder`]/[`WireDecoder`] framing.

mod elements;
pub mod wire;

use bytes::Bytes;

pub use wire::{WireDecoder, WireEncoder};

use crate::error::CodecError;

/// Element tags
pub mod tags {
    pub const CLOSE: u8 = 0x00;
    pub const INTEREST: u8 = 0x01;
    pub const NAME: u8 = 0x02;
    pub const COMPONENT: u8 = 0x03;
    pub const NAME_COMPONENT_COUNT: u8 = 0x04;
    pub const ADDITIONAL_NAME_COMPONENTS: u8 = 0x05;
    pub const PUBLISHER_KEY: u8 = 0x06;
    pub const PUBLISHER_CERTIFICATE: u8 = 0x07;
    pub const PUBLISHER_ISSUER_KEY: u8 = 0x08;
    pub const PUBLISHER_ISSUER_CERTIFICATE: u8 = 0x09;
    pub const EXCLUDE: u8 = 0x0a;
    pub const ANY: u8 = 0x0b;
    pub const ORDER_PREFERENCE: u8 = 0x0c;
    pub const ANSWER_ORIGIN_KIND: u8 = 0x0d;
    pub const SCOPE: u8 = 0x0e;
    pub const COUNT: u8 = 0x0f;
    pub const NONCE: u8 = 0x10;
    pub const RESPONSE_FILTER: u8 = 0x11;
}

/// A protocol object with a wire form
pub trait WireEncodable: Sized {
    fn encode_to(&self, encoder: &mut WireEncoder) -> Result<(), CodecError>;

    fn decode_from(decoder: &mut WireDecoder<'_>) -> Result<Self, CodecError>;

    fn encode(&self) -> Result<Bytes, CodecError> {
        let mut encoder = WireEncoder::new();
        self.encode_to(&mut encoder)?;
        Ok(encoder.finish())
    }

    /// Decode exactly one element from `bytes`
    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut decoder = WireDecoder::new(bytes);
        let value = Self::decode_from(&mut decoder)?;
        match decoder.remaining() {
            0 => Ok(value),
            remaining => Err(CodecError::TrailingData { remaining }),
        }
    }
}
