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

//! Serialization entry traits and the type-erased struct view.
//!
//! [`Serialize`] is implemented (usually derived) by structs that expose
//! their fields to an archive. [`Field`] is the dispatch seam behind
//! [`ArchiveExt::field`](crate::ArchiveExt::field): its impls select the
//! right visitor operation for each static type — primitives, strings,
//! containers, polymorphic pointers, described enums, and nested structs.
//! [`Reflected`] adds a dynamic type tag so a live object behind a base
//! trait object can report its concrete identity to a class factory.

use crate::archive::{Archive, ArchiveCaps};
use crate::identity::TypeTag;

/// A type that exposes its fields to an archive.
///
/// Derive this with `#[derive(Serializable)]` (from `tessera-macros`) or
/// implement it by hand:
///
/// ```rust
/// use tessera_reflect::{Archive, ArchiveExt, Serialize};
///
/// struct Transform {
///     position: [f32; 3],
///     uniform_scale: f32,
/// }
///
/// impl Serialize for Transform {
///     fn serialize(&mut self, ar: &mut dyn Archive) -> bool {
///         let mut ok = ar.field(&mut self.position, "position", "Position");
///         ok &= ar.field(&mut self.uniform_scale, "uniform_scale", "Uniform scale");
///         ok
///     }
/// }
/// ```
pub trait Serialize {
    /// Visits every field through the archive; returns `false` if any
    /// field visit failed.
    fn serialize(&mut self, ar: &mut dyn Archive) -> bool;
}

/// Object-safe identity and serialization for live objects reached
/// through a base trait object.
///
/// Blanket-implemented for every `Serialize + 'static` type. Base traits
/// of polymorphic hierarchies declare it as a supertrait
/// (`trait Shape: Reflected {}`) so a factory can recover the concrete
/// registered type of any live instance — the replacement for probing
/// vtable pointers.
pub trait Reflected: 'static {
    /// The tag of the concrete type behind this reference.
    fn type_tag(&self) -> TypeTag;

    /// Serializes the concrete object's fields.
    fn serialize_value(&mut self, ar: &mut dyn Archive) -> bool;

    /// Re-borrows `self` as a `Reflected` trait object.
    fn as_reflected_mut(&mut self) -> &mut dyn Reflected;
}

impl<T: Serialize + 'static> Reflected for T {
    fn type_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn serialize_value(&mut self, ar: &mut dyn Archive) -> bool {
        self.serialize(ar)
    }

    fn as_reflected_mut(&mut self) -> &mut dyn Reflected {
        self
    }
}

/// A type-erased view of a serializable object: the object reference
/// plus its concrete type tag, borrowed for the duration of one visit.
pub struct StructRef<'a> {
    value: &'a mut dyn Reflected,
}

impl<'a> StructRef<'a> {
    /// Erases a concrete serializable object.
    pub fn new<T: Serialize + 'static>(value: &'a mut T) -> Self {
        Self { value }
    }

    /// Wraps an already-erased object.
    pub fn from_dyn(value: &'a mut dyn Reflected) -> Self {
        Self { value }
    }

    /// The concrete type tag of the viewed object.
    pub fn type_tag(&self) -> TypeTag {
        self.value.type_tag()
    }

    /// Serializes the viewed object's fields.
    pub fn serialize(&mut self, ar: &mut dyn Archive) -> bool {
        self.value.serialize_value(ar)
    }
}

/// Selects the archive operation for a value's static type.
///
/// Implemented here for primitives and strings, by the adapter modules
/// for containers and pointers, by `describe_enum!` for enums, and by
/// the `Serializable` derive for structs (routing through
/// [`Archive::struct_value`]).
pub trait Field {
    /// Visits this value as one field of the enclosing object.
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool;
}

macro_rules! primitive_field {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl Field for $ty {
                fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
                    ar.$method(self, name, label)
                }
            }
        )*
    };
}

primitive_field! {
    bool => value_bool,
    i8 => value_i8,
    i16 => value_i16,
    i32 => value_i32,
    i64 => value_i64,
    u8 => value_u8,
    u16 => value_u16,
    u32 => value_u32,
    u64 => value_u64,
    f32 => value_f32,
    f64 => value_f64,
    char => value_char,
}

impl Field for String {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        ar.value_string(self, name, label)
    }
}

// usize/isize travel as u64/i64 so the representation does not depend on
// the host word size.
impl Field for usize {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        let mut wide = *self as u64;
        let ok = ar.value_u64(&mut wide, name, label);
        if ok && ar.caps().contains(ArchiveCaps::INPUT) {
            match usize::try_from(wide) {
                Ok(narrow) => *self = narrow,
                Err(_) => return false,
            }
        }
        ok
    }
}

impl Field for isize {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        let mut wide = *self as i64;
        let ok = ar.value_i64(&mut wide, name, label);
        if ok && ar.caps().contains(ArchiveCaps::INPUT) {
            match isize::try_from(wide) {
                Ok(narrow) => *self = narrow,
                Err(_) => return false,
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveExt;
    use crate::context::ContextStack;

    /// Records the primitive visits it receives.
    struct TraceArchive {
        context: ContextStack,
        visited: Vec<String>,
    }

    impl TraceArchive {
        fn new() -> Self {
            Self {
                context: ContextStack::new(),
                visited: Vec::new(),
            }
        }
    }

    impl Archive for TraceArchive {
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

        fn value_f32(&mut self, _value: &mut f32, name: &str, _label: &str) -> bool {
            self.visited.push(format!("f32:{name}"));
            true
        }

        fn value_u64(&mut self, _value: &mut u64, name: &str, _label: &str) -> bool {
            self.visited.push(format!("u64:{name}"));
            true
        }
    }

    struct Particle {
        mass: f32,
        generation: usize,
    }

    impl Serialize for Particle {
        fn serialize(&mut self, ar: &mut dyn Archive) -> bool {
            let mut ok = ar.field(&mut self.mass, "mass", "Mass");
            ok &= ar.field(&mut self.generation, "generation", "Generation");
            ok
        }
    }

    #[test]
    fn test_struct_fields_route_to_primitive_visits() {
        let mut ar = TraceArchive::new();
        let mut particle = Particle {
            mass: 1.5,
            generation: 3,
        };
        assert!(particle.serialize(&mut ar));
        assert_eq!(ar.visited, vec!["f32:mass", "u64:generation"]);
    }

    #[test]
    fn test_struct_ref_reports_concrete_tag() {
        let mut particle = Particle {
            mass: 1.0,
            generation: 0,
        };
        let sref = StructRef::new(&mut particle);
        assert_eq!(sref.type_tag().name(), "Particle");
    }
}
