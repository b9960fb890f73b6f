// Copyright 2026 the Tessera authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! On-disk layout of the binary archive.
//!
//! A file is a fixed [`BinaryHeader`] followed by a payload of records.
//! Each record carries the fnv1a-32 hash of its field name, a type
//! code, and a length-prefixed payload, so a reader can skip records it
//! does not recognize and tolerate reordered or added fields.
//!
//! Record layout: `name_hash: u32 LE`, `code: u8`, `payload_len: u32
//! LE`, then `payload_len` payload bytes. Struct, container, pointer
//! and pair payloads nest further records.

use crate::error::ArchiveError;

/// Identifies a Tessera binary archive. ("TSRABIN\0")
pub const HEADER_MAGIC_BYTES: [u8; 8] = *b"TSRABIN\0";

/// Current payload format version.
pub const FORMAT_VERSION: u8 = 1;

/// Bytes of a record header: name hash, type code, payload length.
pub const RECORD_HEADER_SIZE: usize = 4 + 1 + 4;

/// The fixed-size header at the beginning of every binary archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryHeader {
    /// Magic bytes identifying the file type; must be
    /// [`HEADER_MAGIC_BYTES`].
    pub magic_bytes: [u8; 8],
    /// Payload format version.
    pub format_version: u8,
    /// Length of the record payload following this header, in bytes.
    pub payload_length: u64,
}

impl BinaryHeader {
    /// Total header size in bytes.
    pub const SIZE: usize = 8 + 1 + 8;

    /// Builds the header for a payload of `payload_length` bytes at the
    /// current format version.
    pub fn new(payload_length: u64) -> Self {
        Self {
            magic_bytes: HEADER_MAGIC_BYTES,
            format_version: FORMAT_VERSION,
            payload_length,
        }
    }

    /// Serializes the header into its fixed byte layout.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.magic_bytes);
        bytes[8] = self.format_version;
        bytes[9..Self::SIZE].copy_from_slice(&self.payload_length.to_le_bytes());
        bytes
    }

    /// Parses a header from the beginning of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArchiveError> {
        if bytes.len() < Self::SIZE {
            return Err(ArchiveError::Header("not enough bytes for a header"));
        }
        let magic_bytes: [u8; 8] = bytes[0..8].try_into().unwrap();
        if magic_bytes != HEADER_MAGIC_BYTES {
            return Err(ArchiveError::Header("invalid magic bytes"));
        }
        let format_version = bytes[8];
        if format_version != FORMAT_VERSION {
            return Err(ArchiveError::Header("unsupported format version"));
        }
        let payload_length = u64::from_le_bytes(bytes[9..Self::SIZE].try_into().unwrap());
        Ok(Self {
            magic_bytes,
            format_version,
            payload_length,
        })
    }
}

/// The kind of data a record payload holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TypeCode {
    /// One byte, zero or one.
    Bool = 0,
    /// `i8` as one byte.
    I8 = 1,
    /// `i16` little-endian.
    I16 = 2,
    /// `i32` little-endian.
    I32 = 3,
    /// `i64` little-endian.
    I64 = 4,
    /// `u8` as one byte.
    U8 = 5,
    /// `u16` little-endian.
    U16 = 6,
    /// `u32` little-endian.
    U32 = 7,
    /// `u64` little-endian.
    U64 = 8,
    /// IEEE-754 single little-endian.
    F32 = 9,
    /// IEEE-754 double little-endian.
    F64 = 10,
    /// Unicode scalar as `u32` little-endian.
    Char = 11,
    /// `u32 LE` byte length followed by UTF-8 bytes.
    Str = 12,
    /// Nested records of the struct's fields.
    Struct = 13,
    /// `u32 LE` element count followed by one record per element.
    Container = 14,
    /// Length-prefixed type-name string followed by the pointee's
    /// records; an empty name means null.
    Pointer = 15,
    /// A key record followed by a value record.
    Pair = 16,
}

impl TypeCode {
    /// Maps a raw byte back to its code.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Bool,
            1 => Self::I8,
            2 => Self::I16,
            3 => Self::I32,
            4 => Self::I64,
            5 => Self::U8,
            6 => Self::U16,
            7 => Self::U32,
            8 => Self::U64,
            9 => Self::F32,
            10 => Self::F64,
            11 => Self::Char,
            12 => Self::Str,
            13 => Self::Struct,
            14 => Self::Container,
            15 => Self::Pointer,
            16 => Self::Pair,
            _ => return None,
        })
    }
}

/// fnv1a-32 over a field name. Collisions inside one record block are
/// resolved by type code and visit order.
pub fn name_hash(name: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let header = BinaryHeader::new(42);
        let parsed = BinaryHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_rejects_foreign_magic() {
        let mut bytes = BinaryHeader::new(0).to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            BinaryHeader::from_bytes(&bytes),
            Err(ArchiveError::Header(_))
        ));
    }

    #[test]
    fn test_header_rejects_short_input() {
        assert!(BinaryHeader::from_bytes(&[0u8; 4]).is_err());
    }

    #[test]
    fn test_name_hash_is_stable() {
        // fnv1a-32 reference values; the on-disk format depends on them.
        assert_eq!(name_hash(""), 0x811c_9dc5);
        assert_eq!(name_hash("a"), 0xe40c_292c);
        assert_ne!(name_hash("position"), name_hash("rotation"));
    }
}
