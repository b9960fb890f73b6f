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

//! The validation archive.
//!
//! A validation pass walks the object graph without moving any data;
//! serialization code checks its own fields and reports through
//! [`Archive::error`] and [`Archive::warning`]. Each diagnostic carries
//! the dotted path of the field it was reported against.
//!
//! Only available in debug builds unless the `diagnostics` feature is
//! enabled.

use tessera_reflect::{
    Archive, ArchiveCaps, ContextStack, KeyValue, PolymorphicPointer, Sequence, Serialize,
    StringListSelection, StringValue, StructRef,
};

/// How serious a reported problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The value is suspicious but usable.
    Warning,
    /// The value is invalid.
    Error,
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Dotted field path from the root, e.g. `emitters.[2].rate`.
    pub path: String,
    /// Problem severity.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

/// Collects path-qualified diagnostics from a traversal.
pub struct Validator {
    path: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    context: ContextStack,
}

impl Validator {
    /// Creates a validator with an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: Vec::new(),
            diagnostics: Vec::new(),
            context: ContextStack::new(),
        }
    }

    /// The diagnostics collected so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the validator and returns its report.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// `true` when no error-severity diagnostic was reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics
            .iter()
            .all(|d| d.severity != Severity::Error)
    }

    fn qualified(&self, name: &str) -> String {
        let mut path = self.path.join(".");
        if !name.is_empty() {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(name);
        }
        path
    }

    fn report(&mut self, name: &str, severity: Severity, message: &str) {
        self.diagnostics.push(Diagnostic {
            path: self.qualified(name),
            severity,
            message: message.to_owned(),
        });
    }

    fn scoped(&mut self, name: &str, walk: impl FnOnce(&mut Self) -> bool) -> bool {
        if name.is_empty() {
            return walk(self);
        }
        self.path.push(name.to_owned());
        let ok = walk(self);
        self.path.pop();
        ok
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a validation pass over `value` and returns the report.
pub fn check<T: Serialize>(value: &mut T) -> Vec<Diagnostic> {
    let mut validator = Validator::new();
    value.serialize(&mut validator);
    validator.into_diagnostics()
}

impl Archive for Validator {
    fn caps(&self) -> ArchiveCaps {
        ArchiveCaps::OUTPUT | ArchiveCaps::VALIDATION
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

    fn value_bool(&mut self, _value: &mut bool, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_i8(&mut self, _value: &mut i8, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_i16(&mut self, _value: &mut i16, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_i32(&mut self, _value: &mut i32, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_i64(&mut self, _value: &mut i64, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_u8(&mut self, _value: &mut u8, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_u16(&mut self, _value: &mut u16, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_u32(&mut self, _value: &mut u32, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_u64(&mut self, _value: &mut u64, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_f32(&mut self, _value: &mut f32, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_f64(&mut self, _value: &mut f64, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_char(&mut self, _value: &mut char, _name: &str, _label: &str) -> bool {
        true
    }

    fn value_string(&mut self, _value: &mut dyn StringValue, _name: &str, _label: &str) -> bool {
        true
    }

    fn string_list(&mut self, _value: &mut StringListSelection, _name: &str, _label: &str) -> bool {
        true
    }

    fn struct_value(&mut self, mut value: StructRef<'_>, name: &str, _label: &str) -> bool {
        self.scoped(name, |ar| value.serialize(ar.as_dyn()))
    }

    fn container(&mut self, value: &mut dyn Sequence, name: &str, label: &str) -> bool {
        self.scoped(name, |ar| {
            let count = value.len();
            let mut ok = true;
            for index in 0..count {
                ok &= ar.scoped(&format!("[{index}]"), |ar| {
                    value.serialize_element(ar.as_dyn(), "", label)
                });
                if index + 1 < count {
                    value.advance();
                }
            }
            ok
        })
    }

    fn pointer(&mut self, value: &mut dyn PolymorphicPointer, name: &str, _label: &str) -> bool {
        self.scoped(name, |ar| match value.serializer() {
            Some(mut pointee) => pointee.serialize(ar.as_dyn()),
            None => true,
        })
    }

    fn key_value(&mut self, value: &mut dyn KeyValue, name: &str, _label: &str) -> bool {
        self.scoped(name, |ar| {
            let key_ok = value.serialize_key(ar.as_dyn());
            let value_ok = value.serialize_value(ar.as_dyn());
            key_ok && value_ok
        })
    }

    fn error(&mut self, name: &str, message: &str) {
        self.report(name, Severity::Error, message);
    }

    fn warning(&mut self, name: &str, message: &str) {
        self.report(name, Severity::Warning, message);
    }
}
