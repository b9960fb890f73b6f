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

//! Human-readable JSON serialization.

mod reader;
mod writer;

pub use reader::TextReader;
pub use writer::TextWriter;

use std::path::Path;

use serde_json::Value;
use tessera_reflect::Serialize;

use crate::error::ArchiveError;

/// Serializes `value` into a JSON tree.
pub fn to_value<T: Serialize>(value: &mut T) -> Value {
    let mut writer = TextWriter::new();
    if !value.serialize(&mut writer) {
        log::warn!("text save skipped one or more fields");
    }
    writer.into_value()
}

/// Serializes `value` into compact JSON text.
pub fn to_string<T: Serialize>(value: &mut T) -> String {
    to_value(value).to_string()
}

/// Serializes `value` into pretty-printed JSON text.
pub fn to_string_pretty<T: Serialize>(value: &mut T) -> Result<String, ArchiveError> {
    Ok(serde_json::to_string_pretty(&to_value(value))?)
}

/// Deserializes `value` from an already-parsed JSON tree. `Ok(false)`
/// means the document was readable but some fields were missing or
/// skipped.
pub fn from_value<T: Serialize>(value: &mut T, document: Value) -> Result<bool, ArchiveError> {
    let mut reader = TextReader::new(document)?;
    Ok(value.serialize(&mut reader))
}

/// Deserializes `value` from JSON text.
pub fn from_str<T: Serialize>(value: &mut T, text: &str) -> Result<bool, ArchiveError> {
    from_value(value, serde_json::from_str(text)?)
}

/// Serializes `value` to a pretty-printed JSON file.
pub fn save_file<T: Serialize>(value: &mut T, path: &Path) -> Result<(), ArchiveError> {
    std::fs::write(path, to_string_pretty(value)?)?;
    Ok(())
}

/// Deserializes `value` from a JSON file.
pub fn load_file<T: Serialize>(value: &mut T, path: &Path) -> Result<bool, ArchiveError> {
    let text = std::fs::read_to_string(path)?;
    from_str(value, &text)
}
