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

//! Process-wide type identity.
//!
//! [`TypeTag`] assigns a comparable, nameable identity to each Rust type.
//! The first request for a given type interns one [`TypeInfo`] record
//! (normalized name plus byte size); every later request returns a handle
//! to the same record, so comparison is usually a pointer comparison.
//!
//! Records interned by this process compare by pointer. Two handles that
//! hold *different* record pointers (for example records produced by a
//! second registry inside a dynamically loaded module) fall back to
//! comparing their (name, size) pairs, which keeps equality consistent
//! across module boundaries.

use std::any;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock};

/// The interned record backing a [`TypeTag`]: a normalized type name and
/// the type's size in bytes (zero for unsized types).
#[derive(Debug)]
pub struct TypeInfo {
    name: String,
    size: usize,
}

impl TypeInfo {
    /// Creates a record from an already-normalized name.
    ///
    /// Exposed so embedders that bridge types from another registry can
    /// construct comparable tags; library code goes through
    /// [`TypeTag::of`].
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// The normalized type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type's size in bytes; zero for unsized (`dyn`) types.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// A process-stable, comparable, nameable identity for a type.
///
/// Obtained via [`TypeTag::of`] (sized types) or [`TypeTag::of_unsized`]
/// (trait-object bases). Cheap to copy and compare.
#[derive(Clone, Copy)]
pub struct TypeTag(&'static TypeInfo);

impl TypeTag {
    /// Returns the tag for a sized type, interning its record on first use.
    pub fn of<T: 'static>() -> Self {
        Self::intern(
            any::TypeId::of::<T>(),
            any::type_name::<T>(),
            std::mem::size_of::<T>(),
        )
    }

    /// Returns the tag for a possibly-unsized type (e.g. `dyn Base`).
    ///
    /// Unsized types record a size of zero.
    pub fn of_unsized<T: ?Sized + 'static>() -> Self {
        Self::intern(any::TypeId::of::<T>(), any::type_name::<T>(), 0)
    }

    /// Wraps a foreign record. Equality against tags interned here falls
    /// back to (name, size) comparison, since the pointers differ.
    pub fn from_info(info: &'static TypeInfo) -> Self {
        Self(info)
    }

    fn intern(id: any::TypeId, raw_name: &'static str, size: usize) -> Self {
        static INTERNER: OnceLock<Mutex<HashMap<any::TypeId, &'static TypeInfo>>> =
            OnceLock::new();

        let mut map = INTERNER
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let info = *map.entry(id).or_insert_with(|| {
            let info = TypeInfo::new(normalize_type_name(raw_name), size);
            log::debug!("interned type {:?} ({} bytes)", info.name, size);
            Box::leak(Box::new(info))
        });
        Self(info)
    }

    /// The normalized type name.
    pub fn name(self) -> &'static str {
        &self.0.name
    }

    /// The type's size in bytes; zero for unsized types.
    pub fn size(self) -> usize {
        self.0.size
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
            || (self.0.name == other.0.name && self.0.size == other.0.size)
    }
}

impl Eq for TypeTag {}

impl PartialOrd for TypeTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeTag {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0.name.as_str(), self.0.size).cmp(&(other.0.name.as_str(), other.0.size))
    }
}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
        self.0.size.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Strips module paths from a `core::any::type_name` string, including
/// inside generic argument lists: `alloc::vec::Vec<alloc::string::String>`
/// becomes `Vec<String>`.
fn normalize_type_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut ident = String::new();
    for c in raw.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            ident.push(c);
        } else {
            flush_ident(&mut out, &mut ident);
            out.push(c);
        }
    }
    flush_ident(&mut out, &mut ident);
    out
}

fn flush_ident(out: &mut String, ident: &mut String) {
    if ident.is_empty() {
        return;
    }
    match ident.rsplit("::").next() {
        Some(last) => out.push_str(last),
        None => out.push_str(ident),
    }
    ident.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        _value: u64,
    }

    #[test]
    fn test_same_type_compares_equal() {
        let a = TypeTag::of::<Sample>();
        let b = TypeTag::of::<Sample>();
        assert_eq!(a, b);
        assert_eq!(a.name(), "Sample");
        assert_eq!(a.size(), std::mem::size_of::<Sample>());
    }

    #[test]
    fn test_different_types_compare_unequal() {
        assert_ne!(TypeTag::of::<u32>(), TypeTag::of::<i32>());
        assert_ne!(TypeTag::of::<u32>(), TypeTag::of::<u64>());
    }

    #[test]
    fn test_generic_name_normalization() {
        let tag = TypeTag::of::<Vec<String>>();
        assert_eq!(tag.name(), "Vec<String>");
        let nested = TypeTag::of::<Vec<Vec<u8>>>();
        assert_eq!(nested.name(), "Vec<Vec<u8>>");
    }

    #[test]
    fn test_foreign_record_falls_back_to_name_and_size() {
        // Simulates a record interned by a second registry in another
        // module: same name and size, different pointer.
        let local = TypeTag::of::<u32>();
        let foreign: &'static TypeInfo = Box::leak(Box::new(TypeInfo::new("u32", 4)));
        assert_eq!(local, TypeTag::from_info(foreign));

        let other: &'static TypeInfo = Box::leak(Box::new(TypeInfo::new("u32", 8)));
        assert_ne!(local, TypeTag::from_info(other));
    }

    #[test]
    fn test_unsized_tag_has_zero_size() {
        trait Marker {}
        let tag = TypeTag::of_unsized::<dyn Marker>();
        assert_eq!(tag.size(), 0);
        assert!(tag.name().contains("Marker"));
    }
}
