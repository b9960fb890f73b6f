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

//! The text output archive.

use serde_json::{Map, Number, Value};
use tessera_reflect::{
    Archive, ArchiveCaps, ContextStack, KeyValue, PolymorphicPointer, Sequence, StringValue,
    StructRef,
};

enum Frame {
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

/// Serializes an object graph into a JSON value tree. Structs become
/// objects, sequences become arrays, pairs become `{"key", "value"}`
/// objects and pointers become `{"type", "data"}` objects or `null`.
pub struct TextWriter {
    frames: Vec<Frame>,
    context: ContextStack,
}

impl TextWriter {
    /// Creates a writer with an empty root object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::Object(Map::new())],
            context: ContextStack::new(),
        }
    }

    /// Consumes the writer and returns the root object.
    #[must_use]
    pub fn into_value(mut self) -> Value {
        match self.frames.pop() {
            Some(Frame::Object(map)) => Value::Object(map),
            _ => Value::Object(Map::new()),
        }
    }

    fn put(&mut self, name: &str, value: Value) -> bool {
        match self.frames.last_mut() {
            Some(Frame::Object(map)) => {
                let key = if name.is_empty() { "value" } else { name };
                map.insert(key.to_owned(), value);
                true
            }
            Some(Frame::Array(items)) => {
                items.push(value);
                true
            }
            None => false,
        }
    }

    fn put_f64(&mut self, name: &str, value: f64) -> bool {
        match Number::from_f64(value) {
            Some(number) => self.put(name, Value::Number(number)),
            None => {
                log::warn!("field '{name}' is not a finite number; writing null");
                self.put(name, Value::Null)
            }
        }
    }
}

impl Default for TextWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Archive for TextWriter {
    fn caps(&self) -> ArchiveCaps {
        ArchiveCaps::OUTPUT | ArchiveCaps::TEXT | ArchiveCaps::NO_EMPTY_NAMES
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
        self.put(name, Value::Bool(*value))
    }

    fn value_i8(&mut self, value: &mut i8, name: &str, _label: &str) -> bool {
        self.put(name, Value::Number(Number::from(*value)))
    }

    fn value_i16(&mut self, value: &mut i16, name: &str, _label: &str) -> bool {
        self.put(name, Value::Number(Number::from(*value)))
    }

    fn value_i32(&mut self, value: &mut i32, name: &str, _label: &str) -> bool {
        self.put(name, Value::Number(Number::from(*value)))
    }

    fn value_i64(&mut self, value: &mut i64, name: &str, _label: &str) -> bool {
        self.put(name, Value::Number(Number::from(*value)))
    }

    fn value_u8(&mut self, value: &mut u8, name: &str, _label: &str) -> bool {
        self.put(name, Value::Number(Number::from(*value)))
    }

    fn value_u16(&mut self, value: &mut u16, name: &str, _label: &str) -> bool {
        self.put(name, Value::Number(Number::from(*value)))
    }

    fn value_u32(&mut self, value: &mut u32, name: &str, _label: &str) -> bool {
        self.put(name, Value::Number(Number::from(*value)))
    }

    fn value_u64(&mut self, value: &mut u64, name: &str, _label: &str) -> bool {
        self.put(name, Value::Number(Number::from(*value)))
    }

    fn value_f32(&mut self, value: &mut f32, name: &str, _label: &str) -> bool {
        self.put_f64(name, f64::from(*value))
    }

    fn value_f64(&mut self, value: &mut f64, name: &str, _label: &str) -> bool {
        self.put_f64(name, *value)
    }

    fn value_char(&mut self, value: &mut char, name: &str, _label: &str) -> bool {
        self.put(name, Value::String(value.to_string()))
    }

    fn value_string(&mut self, value: &mut dyn StringValue, name: &str, _label: &str) -> bool {
        self.put(name, Value::String(value.get().to_owned()))
    }

    fn struct_value(&mut self, mut value: StructRef<'_>, name: &str, _label: &str) -> bool {
        self.frames.push(Frame::Object(Map::new()));
        let ok = value.serialize(self.as_dyn());
        let frame = self.frames.pop();
        match frame {
            Some(Frame::Object(map)) => self.put(name, Value::Object(map)) && ok,
            _ => false,
        }
    }

    fn container(&mut self, value: &mut dyn Sequence, name: &str, label: &str) -> bool {
        self.frames.push(Frame::Array(Vec::new()));
        let count = value.len();
        let mut ok = true;
        for index in 0..count {
            ok &= value.serialize_element(self.as_dyn(), "", label);
            if index + 1 < count {
                value.advance();
            }
        }
        match self.frames.pop() {
            Some(Frame::Array(items)) => self.put(name, Value::Array(items)) && ok,
            _ => false,
        }
    }

    fn pointer(&mut self, value: &mut dyn PolymorphicPointer, name: &str, _label: &str) -> bool {
        let Some(type_name) = value.registered_type_name() else {
            return self.put(name, Value::Null);
        };
        self.frames.push(Frame::Object(Map::new()));
        let ok = match value.serializer() {
            Some(mut pointee) => pointee.serialize(self.as_dyn()),
            None => false,
        };
        let data = match self.frames.pop() {
            Some(Frame::Object(map)) => Value::Object(map),
            _ => Value::Null,
        };
        let mut wrapper = Map::new();
        wrapper.insert("type".to_owned(), Value::String(type_name.to_owned()));
        wrapper.insert("data".to_owned(), data);
        self.put(name, Value::Object(wrapper)) && ok
    }

    fn key_value(&mut self, value: &mut dyn KeyValue, name: &str, _label: &str) -> bool {
        self.frames.push(Frame::Object(Map::new()));
        let key_ok = value.serialize_key(self.as_dyn());
        let value_ok = value.serialize_value(self.as_dyn());
        match self.frames.pop() {
            Some(Frame::Object(map)) => self.put(name, Value::Object(map)) && key_ok && value_ok,
            _ => false,
        }
    }
}
