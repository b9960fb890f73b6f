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

//! Compact binary serialization.
//!
//! Output is a framed record payload (see [`format`]) keyed by field
//! name hashes, so files survive field reordering and version drift.

pub mod format;
mod reader;
mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;

use std::io::{Read, Write};
use std::path::Path;

use tessera_reflect::Serialize;

use crate::error::ArchiveError;

/// Serializes `value` into a framed binary archive.
pub fn to_bytes<T: Serialize>(value: &mut T) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    if !value.serialize(&mut writer) {
        log::warn!("binary save skipped one or more fields");
    }
    writer.into_bytes()
}

/// Deserializes `value` from a framed binary archive. `Ok(false)` means
/// the container was readable but some fields were missing or skipped.
pub fn from_bytes<T: Serialize>(value: &mut T, bytes: &[u8]) -> Result<bool, ArchiveError> {
    let mut reader = BinaryReader::new(bytes)?;
    Ok(value.serialize(&mut reader))
}

/// Serializes `value` into any [`Write`] sink.
pub fn to_writer<T: Serialize, W: Write>(value: &mut T, mut sink: W) -> Result<(), ArchiveError> {
    sink.write_all(&to_bytes(value))?;
    Ok(())
}

/// Deserializes `value` from any [`Read`] source.
pub fn from_reader<T: Serialize, R: Read>(
    value: &mut T,
    mut source: R,
) -> Result<bool, ArchiveError> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    from_bytes(value, &bytes)
}

/// Serializes `value` to a file.
pub fn save_file<T: Serialize>(value: &mut T, path: &Path) -> Result<(), ArchiveError> {
    std::fs::write(path, to_bytes(value))?;
    Ok(())
}

/// Deserializes `value` from a file.
pub fn load_file<T: Serialize>(value: &mut T, path: &Path) -> Result<bool, ArchiveError> {
    let bytes = std::fs::read(path)?;
    from_bytes(value, &bytes)
}
