//! Token-2022 `TokenMetadata` extension packing.
//!
//! The metadata lives in the mint account as a TLV entry:
//!
//! ```text
//! type                 u16 LE   (19 = TokenMetadata)
//! length               u16 LE   (size of everything below)
//! update_authority     32 bytes (all zeros = none)
//! mint                 32 bytes
//! name                 u32 LE length + UTF-8
//! symbol               u32 LE length + UTF-8
//! uri                  u32 LE length + UTF-8
//! additional_count     u32 LE
//! (key, value) * n     each u32 LE length + UTF-8
//! ```
//!
//! The value part is the Borsh layout the token program decodes, so this
//! must stay byte-for-byte compatible with it.

use crate::address::{to_base58, Pubkey};
use crate::error::SolError;

/// Extension type tag of the metadata TLV entry.
pub const TOKEN_METADATA_EXTENSION_TYPE: u16 = 19;

/// Size of the TLV type tag.
pub const TYPE_SIZE: usize = 2;

/// Size of the TLV length field.
pub const LENGTH_SIZE: usize = 2;

/// On-chain token metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub update_authority: Option<Pubkey>,
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub additional_metadata: Vec<(String, String)>,
}

impl TokenMetadata {
    /// Encode the full TLV entry (type tag, length, value).
    pub fn pack(&self) -> Result<Vec<u8>, SolError> {
        let value = self.pack_value()?;
        let len = u16::try_from(value.len()).map_err(|_| {
            SolError::EncodingError(format!(
                "metadata value is {} bytes, length field holds at most {}",
                value.len(),
                u16::MAX
            ))
        })?;

        let mut out = Vec::with_capacity(TYPE_SIZE + LENGTH_SIZE + value.len());
        out.extend_from_slice(&TOKEN_METADATA_EXTENSION_TYPE.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&value);
        Ok(out)
    }

    /// Encode only the value part of the entry.
    pub fn pack_value(&self) -> Result<Vec<u8>, SolError> {
        let mut out = Vec::with_capacity(
            64 + 16 + self.name.len() + self.symbol.len() + self.uri.len(),
        );

        match self.update_authority {
            Some(authority) if authority == [0u8; 32] => {
                return Err(SolError::EncodingError(
                    "update authority cannot be the zero address".into(),
                ));
            }
            Some(authority) => out.extend_from_slice(&authority),
            None => out.extend_from_slice(&[0u8; 32]),
        }
        out.extend_from_slice(&self.mint);

        write_string(&mut out, "name", &self.name)?;
        write_string(&mut out, "symbol", &self.symbol)?;
        write_string(&mut out, "uri", &self.uri)?;

        let count = u32::try_from(self.additional_metadata.len()).map_err(|_| {
            SolError::EncodingError("too many additional metadata fields".into())
        })?;
        out.extend_from_slice(&count.to_le_bytes());
        for (key, value) in &self.additional_metadata {
            write_string(&mut out, "additional key", key)?;
            write_string(&mut out, "additional value", value)?;
        }

        Ok(out)
    }

    /// Size of the packed TLV entry, used to fund the mint account.
    pub fn tlv_size(&self) -> Result<usize, SolError> {
        self.pack().map(|bytes| bytes.len())
    }

    /// Decode a TLV entry produced by [`TokenMetadata::pack`].
    pub fn unpack(bytes: &[u8]) -> Result<Self, SolError> {
        let mut reader = Reader::new(bytes);

        let tag = u16::from_le_bytes(reader.array::<2>()?);
        if tag != TOKEN_METADATA_EXTENSION_TYPE {
            return Err(SolError::SerializationError(format!(
                "expected extension type {TOKEN_METADATA_EXTENSION_TYPE}, got {tag}"
            )));
        }
        let len = u16::from_le_bytes(reader.array::<2>()?) as usize;
        if reader.remaining() != len {
            return Err(SolError::SerializationError(format!(
                "length field says {len} bytes, {} present",
                reader.remaining()
            )));
        }

        let authority: Pubkey = reader.array()?;
        let update_authority = (authority != [0u8; 32]).then_some(authority);
        let mint: Pubkey = reader.array()?;
        let name = reader.string()?;
        let symbol = reader.string()?;
        let uri = reader.string()?;

        let count = u32::from_le_bytes(reader.array::<4>()?);
        let mut additional_metadata = Vec::new();
        for _ in 0..count {
            let key = reader.string()?;
            let value = reader.string()?;
            additional_metadata.push((key, value));
        }

        if reader.remaining() != 0 {
            return Err(SolError::SerializationError(format!(
                "{} trailing bytes after metadata",
                reader.remaining()
            )));
        }

        Ok(Self {
            update_authority,
            mint,
            name,
            symbol,
            uri,
            additional_metadata,
        })
    }
}

impl std::fmt::Display for TokenMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) mint={}", self.name, self.symbol, to_base58(&self.mint))
    }
}

fn write_string(out: &mut Vec<u8>, field: &str, value: &str) -> Result<(), SolError> {
    let len = u32::try_from(value.len()).map_err(|_| {
        SolError::EncodingError(format!(
            "{field} is {} bytes, overflows its u32 length prefix",
            value.len()
        ))
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SolError> {
        if self.remaining() < n {
            return Err(SolError::SerializationError(format!(
                "truncated metadata: need {n} bytes at offset {}, have {}",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], SolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn string(&mut self) -> Result<String, SolError> {
        let len = u32::from_le_bytes(self.array::<4>()?) as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| SolError::SerializationError(format!("invalid UTF-8: {e}")))
    }
}
