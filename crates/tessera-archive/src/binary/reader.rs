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

//! The binary input archive.
//!
//! Each nested record block is pre-parsed into a record table. Lookups
//! start at a cursor and wrap around, so a payload whose records arrive
//! in visit order is matched without searching, while reordered,
//! missing, or unknown records still resolve correctly. A missing
//! record is a soft failure; the visited field keeps its current value.

use tessera_reflect::{
    Archive, ArchiveCaps, ContextStack, KeyValue, PolymorphicPointer, Sequence, StringValue,
    StructRef,
};

use crate::binary::format::{name_hash, BinaryHeader, TypeCode, RECORD_HEADER_SIZE};
use crate::error::ArchiveError;

#[derive(Debug, Clone, Copy)]
struct Record {
    hash: u32,
    code: TypeCode,
    start: usize,
    end: usize,
}

struct Block {
    records: Vec<Record>,
    cursor: usize,
}

impl Block {
    /// Scans `data[start..end]` into a record table.
    fn parse(data: &[u8], start: usize, end: usize) -> Result<Self, ArchiveError> {
        let mut records = Vec::new();
        let mut at = start;
        while at < end {
            if at + RECORD_HEADER_SIZE > end {
                return Err(ArchiveError::Truncated(at));
            }
            let hash = u32::from_le_bytes(data[at..at + 4].try_into().unwrap());
            let code = TypeCode::from_byte(data[at + 4])
                .ok_or(ArchiveError::Truncated(at + 4))?;
            let len = u32::from_le_bytes(data[at + 5..at + 9].try_into().unwrap()) as usize;
            let payload_start = at + RECORD_HEADER_SIZE;
            let payload_end = payload_start + len;
            if payload_end > end {
                return Err(ArchiveError::Truncated(at));
            }
            records.push(Record {
                hash,
                code,
                start: payload_start,
                end: payload_end,
            });
            at = payload_end;
        }
        Ok(Self { records, cursor: 0 })
    }

    /// Finds the next record with the given hash and code, starting at
    /// the cursor and wrapping once.
    fn take(&mut self, hash: u32, code: TypeCode) -> Option<(usize, usize)> {
        let count = self.records.len();
        for offset in 0..count {
            let index = (self.cursor + offset) % count;
            let record = self.records[index];
            if record.hash == hash && record.code == code {
                self.cursor = index + 1;
                return Some((record.start, record.end));
            }
        }
        None
    }
}

/// Deserializes an object graph from a framed binary payload.
pub struct BinaryReader {
    data: Vec<u8>,
    blocks: Vec<Block>,
    context: ContextStack,
}

impl BinaryReader {
    /// Parses the header and the root record block. Fails hard on a
    /// foreign or truncated container; individual records stay soft.
    pub fn new(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let header = BinaryHeader::from_bytes(bytes)?;
        let payload_end = usize::try_from(header.payload_length)
            .ok()
            .and_then(|len| BinaryHeader::SIZE.checked_add(len))
            .ok_or(ArchiveError::Truncated(bytes.len()))?;
        if bytes.len() < payload_end {
            return Err(ArchiveError::Truncated(bytes.len()));
        }
        let data = bytes[..payload_end].to_vec();
        let root = Block::parse(&data, BinaryHeader::SIZE, payload_end)?;
        Ok(Self {
            data,
            blocks: vec![root],
            context: ContextStack::new(),
        })
    }

    fn take(&mut self, name: &str, code: TypeCode) -> Option<(usize, usize)> {
        let hash = name_hash(name);
        let block = self.blocks.last_mut()?;
        let range = block.take(hash, code);
        if range.is_none() {
            log::debug!("binary record '{name}' ({code:?}) not present; keeping current value");
        }
        range
    }

    fn take_scalar<const N: usize>(&mut self, name: &str, code: TypeCode) -> Option<[u8; N]> {
        let (start, end) = self.take(name, code)?;
        if end - start != N {
            log::warn!("binary record '{name}' has payload length {}", end - start);
            return None;
        }
        Some(self.data[start..end].try_into().unwrap())
    }

    /// Reads a length-prefixed UTF-8 string at `start`, returning it and
    /// the offset of the byte after it.
    fn read_str(&self, start: usize, end: usize) -> Option<(String, usize)> {
        if start + 4 > end {
            return None;
        }
        let len = u32::from_le_bytes(self.data[start..start + 4].try_into().unwrap()) as usize;
        let text_end = start + 4 + len;
        if text_end > end {
            return None;
        }
        let text = std::str::from_utf8(&self.data[start + 4..text_end]).ok()?;
        Some((text.to_owned(), text_end))
    }

    fn push_block(&mut self, start: usize, end: usize) -> bool {
        match Block::parse(&self.data, start, end) {
            Ok(block) => {
                self.blocks.push(block);
                true
            }
            Err(err) => {
                log::warn!("skipping corrupt binary block: {err}");
                false
            }
        }
    }

    fn pop_block(&mut self) {
        self.blocks.pop();
    }
}

impl Archive for BinaryReader {
    fn caps(&self) -> ArchiveCaps {
        ArchiveCaps::INPUT | ArchiveCaps::BINARY
    }

    fn as_dyn(&mut self) -> &mut dyn Archive {
        self
    }

    fn context(&self) -> &ContextStack {
        &self.context
    }

    fn context_mut(&mut self) -> &mut ContextStack {
        &mut self.context
    }

    fn value_bool(&mut self, value: &mut bool, name: &str, _label: &str) -> bool {
        match self.take_scalar::<1>(name, TypeCode::Bool) {
            Some(bytes) => {
                *value = bytes[0] != 0;
                true
            }
            None => false,
        }
    }

    fn value_i8(&mut self, value: &mut i8, name: &str, _label: &str) -> bool {
        match self.take_scalar::<1>(name, TypeCode::I8) {
            Some(bytes) => {
                *value = i8::from_le_bytes(bytes);
                true
            }
            None => false,
        }
    }

    fn value_i16(&mut self, value: &mut i16, name: &str, _label: &str) -> bool {
        match self.take_scalar::<2>(name, TypeCode::I16) {
            Some(bytes) => {
                *value = i16::from_le_bytes(bytes);
                true
            }
            None => false,
        }
    }

    fn value_i32(&mut self, value: &mut i32, name: &str, _label: &str) -> bool {
        match self.take_scalar::<4>(name, TypeCode::I32) {
            Some(bytes) => {
                *value = i32::from_le_bytes(bytes);
                true
            }
            None => false,
        }
    }

    fn value_i64(&mut self, value: &mut i64, name: &str, _label: &str) -> bool {
        match self.take_scalar::<8>(name, TypeCode::I64) {
            Some(bytes) => {
                *value = i64::from_le_bytes(bytes);
                true
            }
            None => false,
        }
    }

    fn value_u8(&mut self, value: &mut u8, name: &str, _label: &str) -> bool {
        match self.take_scalar::<1>(name, TypeCode::U8) {
            Some(bytes) => {
                *value = bytes[0];
                true
            }
            None => false,
        }
    }

    fn value_u16(&mut self, value: &mut u16, name: &str, _label: &str) -> bool {
        match self.take_scalar::<2>(name, TypeCode::U16) {
            Some(bytes) => {
                *value = u16::from_le_bytes(bytes);
                true
            }
            None => false,
        }
    }

    fn value_u32(&mut self, value: &mut u32, name: &str, _label: &str) -> bool {
        match self.take_scalar::<4>(name, TypeCode::U32) {
            Some(bytes) => {
                *value = u32::from_le_bytes(bytes);
                true
            }
            None => false,
        }
    }

    fn value_u64(&mut self, value: &mut u64, name: &str, _label: &str) -> bool {
        match self.take_scalar::<8>(name, TypeCode::U64) {
            Some(bytes) => {
                *value = u64::from_le_bytes(bytes);
                true
            }
            None => false,
        }
    }

    fn value_f32(&mut self, value: &mut f32, name: &str, _label: &str) -> bool {
        match self.take_scalar::<4>(name, TypeCode::F32) {
            Some(bytes) => {
                *value = f32::from_le_bytes(bytes);
                true
            }
            None => false,
        }
    }

    fn value_f64(&mut self, value: &mut f64, name: &str, _label: &str) -> bool {
        match self.take_scalar::<8>(name, TypeCode::F64) {
            Some(bytes) => {
                *value = f64::from_le_bytes(bytes);
                true
            }
            None => false,
        }
    }

    fn value_char(&mut self, value: &mut char, name: &str, _label: &str) -> bool {
        match self.take_scalar::<4>(name, TypeCode::Char) {
            Some(bytes) => match char::from_u32(u32::from_le_bytes(bytes)) {
                Some(decoded) => {
                    *value = decoded;
                    true
                }
                None => {
                    log::warn!("record '{name}' is not a Unicode scalar");
                    false
                }
            },
            None => false,
        }
    }

    fn value_string(&mut self, value: &mut dyn StringValue, name: &str, _label: &str) -> bool {
        let Some((start, end)) = self.take(name, TypeCode::Str) else {
            return false;
        };
        match self.read_str(start, end) {
            Some((text, _)) => {
                value.set(&text);
                true
            }
            None => {
                log::warn!("record '{name}' holds a malformed string");
                false
            }
        }
    }

    fn struct_value(&mut self, mut value: StructRef<'_>, name: &str, _label: &str) -> bool {
        let Some((start, end)) = self.take(name, TypeCode::Struct) else {
            return false;
        };
        if !self.push_block(start, end) {
            return false;
        }
        let ok = value.serialize(self.as_dyn());
        self.pop_block();
        ok
    }

    fn container(&mut self, value: &mut dyn Sequence, name: &str, label: &str) -> bool {
        let Some((start, end)) = self.take(name, TypeCode::Container) else {
            return false;
        };
        if start + 4 > end {
            log::warn!("container record '{name}' is missing its count");
            return false;
        }
        let count = u32::from_le_bytes(self.data[start..start + 4].try_into().unwrap()) as usize;
        if !value.resize(count) {
            log::warn!("fixed sequence '{name}' cannot take {count} elements");
            return false;
        }
        if !self.push_block(start + 4, end) {
            return false;
        }
        let mut ok = true;
        for index in 0..count {
            ok &= value.serialize_element(self.as_dyn(), "", label);
            if index + 1 < count {
                value.advance();
            }
        }
        self.pop_block();
        ok
    }

    fn pointer(&mut self, value: &mut dyn PolymorphicPointer, name: &str, _label: &str) -> bool {
        // A missing or malformed record resets the pointer to null so a
        // stale pointee never survives a failed read.
        let Some((start, end)) = self.take(name, TypeCode::Pointer) else {
            value.create("");
            return false;
        };
        let Some((type_name, data_start)) = self.read_str(start, end) else {
            log::warn!("pointer record '{name}' holds a malformed type name");
            value.create("");
            return false;
        };
        let current = value.registered_type_name().unwrap_or("");
        if type_name != current && !value.create(&type_name) {
            value.create("");
            return false;
        }
        if type_name.is_empty() {
            return true;
        }
        if !self.push_block(data_start, end) {
            return false;
        }
        let ok = match value.serializer() {
            Some(mut pointee) => pointee.serialize(self.as_dyn()),
            None => false,
        };
        self.pop_block();
        ok
    }

    fn key_value(&mut self, value: &mut dyn KeyValue, name: &str, _label: &str) -> bool {
        let Some((start, end)) = self.take(name, TypeCode::Pair) else {
            return false;
        };
        if !self.push_block(start, end) {
            return false;
        }
        let key_ok = value.serialize_key(self.as_dyn());
        let value_ok = value.serialize_value(self.as_dyn());
        self.pop_block();
        key_ok && value_ok
    }
}
