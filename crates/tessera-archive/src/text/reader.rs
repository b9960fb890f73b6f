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

//! The text input archive.
//!
//! Works on an owned JSON tree: object fields resolve by name in any
//! order, array elements resolve positionally. Everything missing or
//! mistyped is a soft failure that keeps the visited field's current
//! value, except for pointers, which reset to null rather than keep a
//! stale pointee.

use serde_json::{Map, Value};
use tessera_reflect::{
    Archive, ArchiveCaps, ContextStack, KeyValue, PolymorphicPointer, Sequence, StringValue,
    StructRef,
};

use crate::error::ArchiveError;

enum Frame {
    Object(Map<String, Value>),
    Array { items: Vec<Value>, cursor: usize },
}

impl Frame {
    fn take(&mut self, name: &str) -> Option<Value> {
        match self {
            Frame::Object(map) => {
                let key = if name.is_empty() { "value" } else { name };
                map.remove(key)
            }
            Frame::Array { items, cursor } => {
                let slot = items.get_mut(*cursor)?;
                *cursor += 1;
                Some(std::mem::replace(slot, Value::Null))
            }
        }
    }
}

/// Deserializes an object graph from a parsed JSON document.
pub struct TextReader {
    frames: Vec<Frame>,
    context: ContextStack,
}

impl TextReader {
    /// Takes ownership of a parsed document whose root must be an
    /// object.
    pub fn new(document: Value) -> Result<Self, ArchiveError> {
        let Value::Object(root) = document else {
            return Err(ArchiveError::RootNotObject);
        };
        Ok(Self {
            frames: vec![Frame::Object(root)],
            context: ContextStack::new(),
        })
    }

    fn take(&mut self, name: &str) -> Option<Value> {
        let taken = self.frames.last_mut()?.take(name);
        if taken.is_none() {
            log::debug!("text field '{name}' not present; keeping current value");
        }
        taken
    }

    fn take_i64(&mut self, name: &str) -> Option<i64> {
        let value = self.take(name)?;
        let number = value.as_i64();
        if number.is_none() {
            log::warn!("text field '{name}' is not an integer");
        }
        number
    }

    fn take_u64(&mut self, name: &str) -> Option<u64> {
        let value = self.take(name)?;
        let number = value.as_u64();
        if number.is_none() {
            log::warn!("text field '{name}' is not an unsigned integer");
        }
        number
    }

    fn take_f64(&mut self, name: &str) -> Option<f64> {
        let value = self.take(name)?;
        let number = value.as_f64();
        if number.is_none() {
            log::warn!("text field '{name}' is not a number");
        }
        number
    }
}

fn assign<T, U: TryFrom<T>>(target: &mut U, raw: T, name: &str) -> bool {
    match U::try_from(raw) {
        Ok(converted) => {
            *target = converted;
            true
        }
        Err(_) => {
            log::warn!("text field '{name}' is out of range");
            false
        }
    }
}

impl Archive for TextReader {
    fn caps(&self) -> ArchiveCaps {
        ArchiveCaps::INPUT | ArchiveCaps::TEXT | ArchiveCaps::NO_EMPTY_NAMES
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
        match self.take(name).and_then(|v| v.as_bool()) {
            Some(flag) => {
                *value = flag;
                true
            }
            None => false,
        }
    }

    fn value_i8(&mut self, value: &mut i8, name: &str, _label: &str) -> bool {
        match self.take_i64(name) {
            Some(raw) => assign(value, raw, name),
            None => false,
        }
    }

    fn value_i16(&mut self, value: &mut i16, name: &str, _label: &str) -> bool {
        match self.take_i64(name) {
            Some(raw) => assign(value, raw, name),
            None => false,
        }
    }

    fn value_i32(&mut self, value: &mut i32, name: &str, _label: &str) -> bool {
        match self.take_i64(name) {
            Some(raw) => assign(value, raw, name),
            None => false,
        }
    }

    fn value_i64(&mut self, value: &mut i64, name: &str, _label: &str) -> bool {
        match self.take_i64(name) {
            Some(raw) => {
                *value = raw;
                true
            }
            None => false,
        }
    }

    fn value_u8(&mut self, value: &mut u8, name: &str, _label: &str) -> bool {
        match self.take_u64(name) {
            Some(raw) => assign(value, raw, name),
            None => false,
        }
    }

    fn value_u16(&mut self, value: &mut u16, name: &str, _label: &str) -> bool {
        match self.take_u64(name) {
            Some(raw) => assign(value, raw, name),
            None => false,
        }
    }

    fn value_u32(&mut self, value: &mut u32, name: &str, _label: &str) -> bool {
        match self.take_u64(name) {
            Some(raw) => assign(value, raw, name),
            None => false,
        }
    }

    fn value_u64(&mut self, value: &mut u64, name: &str, _label: &str) -> bool {
        match self.take_u64(name) {
            Some(raw) => {
                *value = raw;
                true
            }
            None => false,
        }
    }

    fn value_f32(&mut self, value: &mut f32, name: &str, _label: &str) -> bool {
        match self.take_f64(name) {
            Some(raw) => {
                *value = raw as f32;
                true
            }
            None => false,
        }
    }

    fn value_f64(&mut self, value: &mut f64, name: &str, _label: &str) -> bool {
        match self.take_f64(name) {
            Some(raw) => {
                *value = raw;
                true
            }
            None => false,
        }
    }

    fn value_char(&mut self, value: &mut char, name: &str, _label: &str) -> bool {
        let Some(text) = self.take(name) else {
            return false;
        };
        let mut chars = text.as_str().unwrap_or("").chars();
        match (chars.next(), chars.next()) {
            (Some(decoded), None) => {
                *value = decoded;
                true
            }
            _ => {
                log::warn!("text field '{name}' is not a single character");
                false
            }
        }
    }

    fn value_string(&mut self, value: &mut dyn StringValue, name: &str, _label: &str) -> bool {
        match self.take(name) {
            Some(Value::String(text)) => {
                value.set(&text);
                true
            }
            Some(_) => {
                log::warn!("text field '{name}' is not a string");
                false
            }
            None => false,
        }
    }

    fn struct_value(&mut self, mut value: StructRef<'_>, name: &str, _label: &str) -> bool {
        match self.take(name) {
            Some(Value::Object(map)) => {
                self.frames.push(Frame::Object(map));
                let ok = value.serialize(self.as_dyn());
                self.frames.pop();
                ok
            }
            Some(_) => {
                log::warn!("text field '{name}' is not an object");
                false
            }
            None => false,
        }
    }

    fn container(&mut self, value: &mut dyn Sequence, name: &str, label: &str) -> bool {
        let items = match self.take(name) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                log::warn!("text field '{name}' is not an array");
                return false;
            }
            None => return false,
        };
        let count = items.len();
        if !value.resize(count) {
            log::warn!("fixed sequence '{name}' cannot take {count} elements");
            return false;
        }
        self.frames.push(Frame::Array { items, cursor: 0 });
        let mut ok = true;
        for index in 0..count {
            ok &= value.serialize_element(self.as_dyn(), "", label);
            if index + 1 < count {
                value.advance();
            }
        }
        self.frames.pop();
        ok
    }

    fn pointer(&mut self, value: &mut dyn PolymorphicPointer, name: &str, _label: &str) -> bool {
        let mut wrapper = match self.take(name) {
            Some(Value::Null) => {
                value.create("");
                return true;
            }
            Some(Value::Object(map)) => map,
            Some(_) | None => {
                value.create("");
                return false;
            }
        };
        let type_name = wrapper
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_owned();
        let current = value.registered_type_name().unwrap_or("");
        if type_name != current && !value.create(&type_name) {
            value.create("");
            return false;
        }
        if type_name.is_empty() {
            return true;
        }
        let data = match wrapper.remove("data") {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        self.frames.push(Frame::Object(data));
        let ok = match value.serializer() {
            Some(mut pointee) => pointee.serialize(self.as_dyn()),
            None => false,
        };
        self.frames.pop();
        ok
    }

    fn key_value(&mut self, value: &mut dyn KeyValue, name: &str, _label: &str) -> bool {
        match self.take(name) {
            Some(Value::Object(map)) => {
                self.frames.push(Frame::Object(map));
                let key_ok = value.serialize_key(self.as_dyn());
                let value_ok = value.serialize_value(self.as_dyn());
                self.frames.pop();
                key_ok && value_ok
            }
            Some(_) => {
                log::warn!("text field '{name}' is not a key/value object");
                false
            }
            None => false,
        }
    }
}
