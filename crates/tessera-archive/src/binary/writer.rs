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

//! The binary output archive.

use tessera_reflect::{
    Archive, ArchiveCaps, ContextStack, KeyValue, PolymorphicPointer, Sequence, StringValue,
    StructRef,
};

use crate::binary::format::{name_hash, BinaryHeader, TypeCode};

/// Serializes an object graph into the record payload, one record per
/// visited field. Nested record lengths are back-patched once the
/// nested traversal returns.
pub struct BinaryWriter {
    buffer: Vec<u8>,
    context: ContextStack,
}

impl BinaryWriter {
    /// Creates a writer with an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            context: ContextStack::new(),
        }
    }

    /// Consumes the writer and frames the payload with a
    /// [`BinaryHeader`].
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        let header = BinaryHeader::new(self.buffer.len() as u64);
        let mut bytes = Vec::with_capacity(BinaryHeader::SIZE + self.buffer.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&self.buffer);
        bytes
    }

    fn begin_record(&mut self, name: &str, code: TypeCode) -> usize {
        self.buffer.extend_from_slice(&name_hash(name).to_le_bytes());
        self.buffer.push(code as u8);
        let at = self.buffer.len();
        self.buffer.extend_from_slice(&0u32.to_le_bytes());
        at
    }

    fn end_record(&mut self, at: usize) {
        let len = (self.buffer.len() - at - 4) as u32;
        self.buffer[at..at + 4].copy_from_slice(&len.to_le_bytes());
    }

    fn scalar(&mut self, name: &str, code: TypeCode, payload: &[u8]) -> bool {
        let at = self.begin_record(name, code);
        self.buffer.extend_from_slice(payload);
        self.end_record(at);
        true
    }

    fn put_str(&mut self, value: &str) {
        self.buffer
            .extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.buffer.extend_from_slice(value.as_bytes());
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Archive for BinaryWriter {
    fn caps(&self) -> ArchiveCaps {
        ArchiveCaps::OUTPUT | ArchiveCaps::BINARY
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
        self.scalar(name, TypeCode::Bool, &[u8::from(*value)])
    }

    fn value_i8(&mut self, value: &mut i8, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::I8, &value.to_le_bytes())
    }

    fn value_i16(&mut self, value: &mut i16, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::I16, &value.to_le_bytes())
    }

    fn value_i32(&mut self, value: &mut i32, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::I32, &value.to_le_bytes())
    }

    fn value_i64(&mut self, value: &mut i64, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::I64, &value.to_le_bytes())
    }

    fn value_u8(&mut self, value: &mut u8, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::U8, &value.to_le_bytes())
    }

    fn value_u16(&mut self, value: &mut u16, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::U16, &value.to_le_bytes())
    }

    fn value_u32(&mut self, value: &mut u32, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::U32, &value.to_le_bytes())
    }

    fn value_u64(&mut self, value: &mut u64, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::U64, &value.to_le_bytes())
    }

    fn value_f32(&mut self, value: &mut f32, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::F32, &value.to_le_bytes())
    }

    fn value_f64(&mut self, value: &mut f64, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::F64, &value.to_le_bytes())
    }

    fn value_char(&mut self, value: &mut char, name: &str, _label: &str) -> bool {
        self.scalar(name, TypeCode::Char, &u32::from(*value).to_le_bytes())
    }

    fn value_string(&mut self, value: &mut dyn StringValue, name: &str, _label: &str) -> bool {
        let at = self.begin_record(name, TypeCode::Str);
        self.put_str(value.get());
        self.end_record(at);
        true
    }

    fn struct_value(&mut self, mut value: StructRef<'_>, name: &str, _label: &str) -> bool {
        let at = self.begin_record(name, TypeCode::Struct);
        let ok = value.serialize(self.as_dyn());
        self.end_record(at);
        ok
    }

    fn container(&mut self, value: &mut dyn Sequence, name: &str, label: &str) -> bool {
        let at = self.begin_record(name, TypeCode::Container);
        let count = value.len();
        self.buffer
            .extend_from_slice(&(count as u32).to_le_bytes());
        let mut ok = true;
        for index in 0..count {
            ok &= value.serialize_element(self.as_dyn(), "", label);
            if index + 1 < count {
                value.advance();
            }
        }
        self.end_record(at);
        ok
    }

    fn pointer(&mut self, value: &mut dyn PolymorphicPointer, name: &str, _label: &str) -> bool {
        let at = self.begin_record(name, TypeCode::Pointer);
        let type_name = value.registered_type_name().unwrap_or("");
        self.put_str(type_name);
        let ok = match value.serializer() {
            Some(mut pointee) => pointee.serialize(self.as_dyn()),
            None => true,
        };
        self.end_record(at);
        ok
    }

    fn key_value(&mut self, value: &mut dyn KeyValue, name: &str, _label: &str) -> bool {
        let at = self.begin_record(name, TypeCode::Pair);
        let key_ok = value.serialize_key(self.as_dyn());
        let value_ok = value.serialize_value(self.as_dyn());
        self.end_record(at);
        key_ok && value_ok
    }
}
