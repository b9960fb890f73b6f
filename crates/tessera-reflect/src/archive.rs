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

//! The archive dispatch protocol.
//!
//! An [`Archive`] is a visitor over an object graph: one `value_*`
//! operation per primitive, plus operations for strings, opaque structs,
//! containers, polymorphic pointers, key/value pairs, and edit-mode
//! choice lists. Concrete archives (binary writer, text reader, property
//! model, validator) override only the operations they support; the
//! defaults degrade to a soft failure so an unsupported field kind never
//! aborts a traversal.
//!
//! Capability bits are fixed when an archive is constructed and tell
//! serialization code which direction and representation it is talking
//! to. Every operation returns `bool`; a `false` stays local to the
//! failing field and the caller decides whether to continue with
//! siblings.

use std::any::Any;
use std::sync::Arc;

use crate::adapters::{KeyValue, PolymorphicPointer, Sequence, StringValue};
use crate::context::ContextStack;
use crate::serialize::{Field, StructRef};
use crate::tessera_bitflags;

tessera_bitflags! {
    /// Capability bits describing what kind of traversal an archive
    /// performs. Fixed at construction time.
    pub struct ArchiveCaps: u16 {
        /// The archive reads values into the visited object.
        const INPUT = 1 << 0;
        /// The archive writes values out of the visited object.
        const OUTPUT = 1 << 1;
        /// Human-readable representation.
        const TEXT = 1 << 2;
        /// Compact machine representation.
        const BINARY = 1 << 3;
        /// Interactive property-editing traversal; enums route through
        /// display labels instead of short names.
        const EDIT = 1 << 4;
        /// The archive works on memory in place through raw element
        /// pointers.
        const IN_PLACE = 1 << 5;
        /// The representation cannot store unnamed fields.
        const NO_EMPTY_NAMES = 1 << 6;
        /// Diagnostic `error`/`warning` calls are meaningful.
        const VALIDATION = 1 << 7;
        /// `doc` calls are collected.
        const DOCUMENTATION = 1 << 8;
    }
}

/// An edit-mode choice list: the options to present and the selected
/// index, if the current value maps to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringListSelection {
    /// The options to present, in table order.
    pub options: Vec<&'static str>,
    /// Index of the selected option; `None` when the current value is
    /// not in the list.
    pub index: Option<usize>,
}

/// The visitor interface implemented by every concrete archive.
///
/// Serialization code reaches it through [`ArchiveExt::field`], which
/// dispatches on the visited value's static type.
pub trait Archive {
    /// The capability bits this archive was constructed with.
    fn caps(&self) -> ArchiveCaps;

    /// Re-borrows `self` as a trait object; every concrete archive
    /// implements this as `self`. Needed by default method bodies that
    /// hand the archive to adapter callbacks.
    fn as_dyn(&mut self) -> &mut dyn Archive;

    /// The ancestor-object context stack.
    fn context(&self) -> &ContextStack;

    /// Mutable access to the context stack.
    fn context_mut(&mut self) -> &mut ContextStack;

    /// Output filter mask; fields tagged with filter bits are visited
    /// only when their mask intersects this one. All bits set by
    /// default.
    fn filter(&self) -> u32 {
        !0
    }

    /// Visits a `bool` field.
    fn value_bool(&mut self, value: &mut bool, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("bool", name)
    }

    /// Visits an `i8` field.
    fn value_i8(&mut self, value: &mut i8, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("i8", name)
    }

    /// Visits an `i16` field.
    fn value_i16(&mut self, value: &mut i16, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("i16", name)
    }

    /// Visits an `i32` field.
    fn value_i32(&mut self, value: &mut i32, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("i32", name)
    }

    /// Visits an `i64` field.
    fn value_i64(&mut self, value: &mut i64, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("i64", name)
    }

    /// Visits a `u8` field.
    fn value_u8(&mut self, value: &mut u8, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("u8", name)
    }

    /// Visits a `u16` field.
    fn value_u16(&mut self, value: &mut u16, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("u16", name)
    }

    /// Visits a `u32` field.
    fn value_u32(&mut self, value: &mut u32, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("u32", name)
    }

    /// Visits a `u64` field.
    fn value_u64(&mut self, value: &mut u64, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("u64", name)
    }

    /// Visits an `f32` field.
    fn value_f32(&mut self, value: &mut f32, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("f32", name)
    }

    /// Visits an `f64` field.
    fn value_f64(&mut self, value: &mut f64, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("f64", name)
    }

    /// Visits a `char` field.
    fn value_char(&mut self, value: &mut char, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("char", name)
    }

    /// Visits a string field through its adapter.
    fn value_string(&mut self, value: &mut dyn StringValue, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("string", name)
    }

    /// Visits an opaque struct. The default passes straight through to
    /// the struct's own `serialize`, which suits flat traversals; block
    /// or tree representations override this to open a scope first.
    fn struct_value(&mut self, mut value: StructRef<'_>, name: &str, label: &str) -> bool {
        let _ = (name, label);
        value.serialize(self.as_dyn())
    }

    /// Visits a sequence container. The default walks the existing
    /// elements in place; archives that need length framing override.
    fn container(&mut self, value: &mut dyn Sequence, name: &str, label: &str) -> bool {
        let _ = name;
        let count = value.len();
        let mut ok = true;
        for index in 0..count {
            ok &= value.serialize_element(self.as_dyn(), "", label);
            if index + 1 < count {
                value.advance();
            }
        }
        ok
    }

    /// Visits a polymorphic pointer. The default implements the generic
    /// (type-name, data) algorithm: on output the registered name is
    /// written and the pointee serialized; on input the name is read,
    /// the pointee recreated when the name changed, and the data read
    /// only for a non-empty name. A failed name read or an unknown type
    /// name resets the pointer to null as conservative recovery.
    fn pointer(&mut self, value: &mut dyn PolymorphicPointer, name: &str, label: &str) -> bool {
        if self.caps().contains(ArchiveCaps::INPUT) {
            let mut type_name = String::new();
            if !self.value_string(&mut type_name, name, label) {
                value.create("");
                return false;
            }
            let current = value.registered_type_name().unwrap_or("");
            if type_name != current && !value.create(&type_name) {
                value.create("");
                return false;
            }
            if type_name.is_empty() {
                return true;
            }
            match value.serializer() {
                Some(pointee) => self.struct_value(pointee, name, label),
                None => false,
            }
        } else {
            let mut type_name = String::from(value.registered_type_name().unwrap_or(""));
            let ok = self.value_string(&mut type_name, name, label);
            match value.serializer() {
                Some(pointee) => self.struct_value(pointee, name, label) && ok,
                None => ok,
            }
        }
    }

    /// Visits one key/value pair. The default serializes the key, then
    /// the value, through the pair's own adapters.
    fn key_value(&mut self, value: &mut dyn KeyValue, name: &str, label: &str) -> bool {
        let _ = (name, label);
        let ok = value.serialize_key(self.as_dyn());
        value.serialize_value(self.as_dyn()) && ok
    }

    /// Visits an edit-mode choice list. Only meaningful on archives with
    /// the `EDIT` capability.
    fn string_list(&mut self, value: &mut StringListSelection, name: &str, label: &str) -> bool {
        let _ = (value, label);
        self.unsupported("string list", name)
    }

    /// Reports a validation error for the field currently being visited.
    /// No-op unless the archive has the `VALIDATION` capability.
    fn error(&mut self, name: &str, message: &str) {
        let _ = (name, message);
    }

    /// Reports a validation warning for the field currently being
    /// visited. No-op unless the archive has the `VALIDATION` capability.
    fn warning(&mut self, name: &str, message: &str) {
        let _ = (name, message);
    }

    /// Attaches documentation to the field currently being visited.
    /// No-op unless the archive has the `DOCUMENTATION` capability.
    fn doc(&mut self, text: &str) {
        let _ = text;
    }

    /// Fallback for field kinds this archive does not implement: logs
    /// and reports a soft failure.
    #[doc(hidden)]
    fn unsupported(&mut self, kind: &str, name: &str) -> bool {
        log::debug!(
            "archive (caps {:?}) does not support {kind} fields; skipping '{name}'",
            self.caps()
        );
        false
    }
}

/// Blanket conveniences over any [`Archive`]: the single field entry
/// point, capability shorthands, and scoped context pushes.
pub trait ArchiveExt: Archive {
    /// Visits one field of the object graph. This is the call-site entry
    /// point for all serialization code; it dispatches on `T`'s [`Field`]
    /// implementation.
    fn field<T: Field>(&mut self, value: &mut T, name: &str, label: &str) -> bool {
        value.visit(self.as_dyn(), name, label)
    }

    /// `true` if the archive reads values into the visited object.
    fn is_input(&self) -> bool {
        self.caps().contains(ArchiveCaps::INPUT)
    }

    /// `true` if the archive writes values out of the visited object.
    fn is_output(&self) -> bool {
        self.caps().contains(ArchiveCaps::OUTPUT)
    }

    /// `true` for interactive property-editing traversals.
    fn is_edit(&self) -> bool {
        self.caps().contains(ArchiveCaps::EDIT)
    }

    /// `true` if the given filter mask passes this archive's filter.
    fn filter_matches(&self, mask: u32) -> bool {
        mask == 0 || (self.filter() & mask) != 0
    }

    /// Looks up the nearest context entry of type `T`.
    fn find_context<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.context().get::<T>()
    }

    /// Runs `f` with `value` pushed onto the context stack, popping it
    /// afterwards.
    fn with_context<T, R>(&mut self, value: Arc<T>, f: impl FnOnce(&mut dyn Archive) -> R) -> R
    where
        T: Any + Send + Sync,
        Self: Sized,
    {
        self.context_mut().push(value);
        let result = f(self.as_dyn());
        self.context_mut().pop();
        result
    }
}

impl<A: Archive + ?Sized> ArchiveExt for A {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::TypeTag;

    /// An archive that supports nothing; exercises the soft-failure
    /// defaults.
    struct InertArchive {
        context: ContextStack,
    }

    impl Archive for InertArchive {
        fn caps(&self) -> ArchiveCaps {
            ArchiveCaps::OUTPUT
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
    }

    #[test]
    fn test_defaults_fail_softly() {
        let mut ar = InertArchive {
            context: ContextStack::new(),
        };
        let mut flag = true;
        assert!(!ar.value_bool(&mut flag, "flag", "Flag"));
        // The failed visit must not disturb the value.
        assert!(flag);
    }

    #[test]
    fn test_capability_shorthands() {
        let ar = InertArchive {
            context: ContextStack::new(),
        };
        assert!(ar.is_output());
        assert!(!ar.is_input());
        assert!(!ar.is_edit());
        assert!(ar.filter_matches(0));
        assert!(ar.filter_matches(0b100));
    }

    #[test]
    fn test_with_context_scopes_entry() {
        struct Marker {
            value: i32,
        }

        let mut ar = InertArchive {
            context: ContextStack::new(),
        };
        let seen = ar.with_context(Arc::new(Marker { value: 7 }), |ar| {
            ar.find_context::<Marker>().map(|m| m.value)
        });
        assert_eq!(seen, Some(7));
        assert!(ar.find_context::<Marker>().is_none());
    }

    /// An input archive that hands out one fixed type-name string.
    struct NameFeedArchive {
        fed_name: &'static str,
        context: ContextStack,
    }

    impl Archive for NameFeedArchive {
        fn caps(&self) -> ArchiveCaps {
            ArchiveCaps::INPUT
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

        fn value_string(&mut self, value: &mut dyn StringValue, _name: &str, _label: &str) -> bool {
            value.set(self.fed_name);
            true
        }
    }

    struct FakePointer {
        pointee: Option<&'static str>,
    }

    impl PolymorphicPointer for FakePointer {
        fn registered_type_name(&self) -> Option<&'static str> {
            self.pointee
        }

        fn create(&mut self, name: &str) -> bool {
            match name {
                "" => {
                    self.pointee = None;
                    true
                }
                "Known" => {
                    self.pointee = Some("Known");
                    true
                }
                _ => false,
            }
        }

        fn base_tag(&self) -> TypeTag {
            TypeTag::of::<u8>()
        }

        fn pointer_tag(&self) -> TypeTag {
            TypeTag::of::<u8>()
        }

        fn serializer(&mut self) -> Option<StructRef<'_>> {
            None
        }

        fn type_choices(&self) -> Vec<(&'static str, &'static str)> {
            Vec::new()
        }
    }

    #[test]
    fn test_pointer_input_resets_to_null_on_unknown_name() {
        let mut ar = NameFeedArchive {
            fed_name: "Nonesuch",
            context: ContextStack::new(),
        };
        let mut pointer = FakePointer {
            pointee: Some("Known"),
        };
        assert!(!ar.pointer(&mut pointer, "shape", "Shape"));
        assert!(pointer.pointee.is_none());
    }
}
