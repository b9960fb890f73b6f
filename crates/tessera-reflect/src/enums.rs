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

//! Per-enum metadata tables.
//!
//! An [`EnumDescription`] maps between an enum's integer values, short
//! names (used by text and binary representations), and display labels
//! (used by edit-mode archives). Tables are declared with
//! [`describe_enum!`](crate::describe_enum) and built lazily on first
//! use.
//!
//! Flag-style enums serialize unions of values through
//! [`BitVector`], encoded as a `|`-joined short-name string.

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::archive::{Archive, ArchiveCaps, StringListSelection};
use crate::serialize::Field;

/// One registered enum entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumEntry {
    /// The enum's integer value.
    pub value: i64,
    /// Short name, stable across representations.
    pub name: &'static str,
    /// Human-readable display label.
    pub label: &'static str,
}

/// A per-enum-type table of (value, name, label) entries.
#[derive(Debug, Default)]
pub struct EnumDescription {
    type_name: &'static str,
    entries: Vec<EnumEntry>,
    by_name: HashMap<&'static str, usize>,
    by_label: HashMap<&'static str, usize>,
    by_value: HashMap<i64, usize>,
}

impl EnumDescription {
    /// Creates an empty table for the named enum type.
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            ..Self::default()
        }
    }

    /// Appends an entry. A registration identical to an existing one
    /// (same name and value, e.g. from a shared header included twice)
    /// is tolerated and deduplicated; a conflicting reuse of a name or
    /// label is a logic error.
    pub fn add(&mut self, value: i64, name: &'static str, label: &'static str) {
        if let Some(&index) = self.by_name.get(name) {
            let existing = self.entries[index];
            debug_assert_eq!(
                existing.value, value,
                "enum {}: name '{}' re-registered with a different value",
                self.type_name, name
            );
            return;
        }
        debug_assert!(
            !self.by_label.contains_key(label),
            "enum {}: label '{}' registered twice",
            self.type_name,
            label
        );
        let index = self.entries.len();
        self.entries.push(EnumEntry { value, name, label });
        self.by_name.insert(name, index);
        self.by_label.insert(label, index);
        self.by_value.entry(value).or_insert(index);
    }

    /// The enum type's name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[EnumEntry] {
        &self.entries
    }

    /// The value registered under a short name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).map(|&i| self.entries[i].value)
    }

    /// The value registered under a display label.
    #[must_use]
    pub fn value_by_label(&self, label: &str) -> Option<i64> {
        self.by_label.get(label).map(|&i| self.entries[i].value)
    }

    /// The short name of a value.
    #[must_use]
    pub fn name(&self, value: i64) -> Option<&'static str> {
        self.by_value.get(&value).map(|&i| self.entries[i].name)
    }

    /// The display label of a value.
    #[must_use]
    pub fn label(&self, value: i64) -> Option<&'static str> {
        self.by_value.get(&value).map(|&i| self.entries[i].label)
    }

    /// Registration-order index of a value.
    #[must_use]
    pub fn index_of(&self, value: i64) -> Option<usize> {
        self.by_value.get(&value).copied()
    }

    /// The value at a registration-order index.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<i64> {
        self.entries.get(index).map(|e| e.value)
    }

    /// All short names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// All display labels, in registration order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.label).collect()
    }

    /// Serializes a raw enum value through the archive: edit-capable
    /// archives get the display-label choice list with a selection
    /// index; everything else reads/writes the short name.
    pub fn serialize(
        &self,
        ar: &mut dyn Archive,
        value: &mut i64,
        name: &str,
        label: &str,
    ) -> bool {
        debug_assert!(
            !self.entries.is_empty(),
            "enum {} serialized without any registered entries",
            self.type_name
        );
        if ar.caps().contains(ArchiveCaps::EDIT) {
            let mut selection = StringListSelection {
                options: self.labels(),
                index: self.index_of(*value),
            };
            if selection.index.is_none() {
                ar.error(name, &format!("unregistered {} value {value}", self.type_name));
            }
            let ok = ar.string_list(&mut selection, name, label);
            if ok && ar.caps().contains(ArchiveCaps::INPUT) {
                match selection.index.and_then(|i| self.value_at(i)) {
                    Some(selected) => *value = selected,
                    None => return false,
                }
            }
            ok
        } else if ar.caps().contains(ArchiveCaps::INPUT) {
            let mut text = String::new();
            if !ar.value_string(&mut text, name, label) {
                return false;
            }
            match self.value(&text) {
                Some(parsed) => {
                    *value = parsed;
                    true
                }
                None => {
                    log::warn!(
                        "enum {}: unknown name '{text}' read for field '{name}'",
                        self.type_name
                    );
                    false
                }
            }
        } else {
            match self.name(*value) {
                Some(short) => {
                    let mut text = String::from(short);
                    ar.value_string(&mut text, name, label)
                }
                None => {
                    ar.error(name, &format!("unregistered {} value {value}", self.type_name));
                    false
                }
            }
        }
    }

    /// Encodes a union of flag values as a `|`-joined short-name string.
    /// Bits not explained by any registered flag are dropped with a
    /// warning.
    #[must_use]
    pub fn encode_bit_vector(&self, bits: i64) -> String {
        let mut remaining = bits;
        let mut parts: Vec<&'static str> = Vec::new();
        for entry in &self.entries {
            if entry.value != 0 && (remaining & entry.value) == entry.value {
                parts.push(entry.name);
                remaining &= !entry.value;
            }
        }
        if remaining != 0 {
            log::warn!(
                "enum {}: bit vector {bits:#x} has residual bits {remaining:#x} not covered by any registered flag",
                self.type_name
            );
        }
        parts.join("|")
    }

    /// Decodes a `|`-joined short-name string back to a union of flag
    /// values. Unknown names are skipped with a warning.
    #[must_use]
    pub fn decode_bit_vector(&self, text: &str) -> i64 {
        let mut bits = 0;
        for part in text.split('|') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match self.value(part) {
                Some(value) => bits |= value,
                None => log::warn!(
                    "enum {}: unknown flag name '{part}' in bit vector",
                    self.type_name
                ),
            }
        }
        bits
    }
}

/// An enum with a registered [`EnumDescription`]; implemented by
/// [`describe_enum!`](crate::describe_enum).
pub trait DescribedEnum: Copy + 'static {
    /// The enum's metadata table, built on first use.
    fn description() -> &'static EnumDescription;

    /// The raw integer value.
    fn to_raw(self) -> i64;

    /// Converts back from a raw value; `None` for unregistered values.
    fn from_raw(raw: i64) -> Option<Self>;
}

/// A flag union over a described enum, serialized as a `|`-joined
/// short-name string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitVector<E: DescribedEnum> {
    /// The raw OR of flag values.
    pub bits: i64,
    _marker: PhantomData<E>,
}

impl<E: DescribedEnum> BitVector<E> {
    /// An empty flag set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bits: 0,
            _marker: PhantomData,
        }
    }

    /// A flag set from raw bits.
    #[must_use]
    pub fn from_bits(bits: i64) -> Self {
        Self {
            bits,
            _marker: PhantomData,
        }
    }

    /// Inserts one flag.
    pub fn insert(&mut self, flag: E) {
        self.bits |= flag.to_raw();
    }

    /// `true` if the flag's bits are all set.
    #[must_use]
    pub fn contains(&self, flag: E) -> bool {
        let raw = flag.to_raw();
        (self.bits & raw) == raw
    }
}

impl<E: DescribedEnum> Default for BitVector<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DescribedEnum> Field for BitVector<E> {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        let description = E::description();
        if ar.caps().contains(ArchiveCaps::INPUT) {
            let mut text = String::new();
            if !ar.value_string(&mut text, name, label) {
                return false;
            }
            self.bits = description.decode_bit_vector(&text);
            true
        } else {
            let mut text = description.encode_bit_vector(self.bits);
            ar.value_string(&mut text, name, label)
        }
    }
}

/// Declares the metadata table for a C-like enum and wires it into the
/// field dispatch.
///
/// ```rust
/// use tessera_reflect::describe_enum;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// enum Axis {
///     X = 0,
///     Y = 1,
///     Z = 2,
/// }
///
/// describe_enum! {
///     Axis {
///         X => ("X", "X axis"),
///         Y => ("Y", "Y axis"),
///         Z => ("Z", "Z axis"),
///     }
/// }
///
/// use tessera_reflect::DescribedEnum;
/// assert_eq!(Axis::description().value("Y"), Some(1));
/// ```
#[macro_export]
macro_rules! describe_enum {
    ($ty:ident { $($variant:ident => ($name:expr, $label:expr)),* $(,)? }) => {
        impl $crate::DescribedEnum for $ty {
            fn description() -> &'static $crate::EnumDescription {
                static TABLE: ::std::sync::OnceLock<$crate::EnumDescription> =
                    ::std::sync::OnceLock::new();
                TABLE.get_or_init(|| {
                    let mut table = $crate::EnumDescription::new(stringify!($ty));
                    $(
                        table.add($ty::$variant as i64, $name, $label);
                    )*
                    table
                })
            }

            fn to_raw(self) -> i64 {
                self as i64
            }

            fn from_raw(raw: i64) -> Option<Self> {
                $(
                    if raw == $ty::$variant as i64 {
                        return Some($ty::$variant);
                    }
                )*
                None
            }
        }

        impl $crate::Field for $ty {
            fn visit(
                &mut self,
                ar: &mut dyn $crate::Archive,
                name: &str,
                label: &str,
            ) -> bool {
                let mut raw = $crate::DescribedEnum::to_raw(*self);
                let ok = <$ty as $crate::DescribedEnum>::description()
                    .serialize(ar, &mut raw, name, label);
                if ok && $crate::Archive::caps(ar).contains($crate::ArchiveCaps::INPUT) {
                    match <$ty as $crate::DescribedEnum>::from_raw(raw) {
                        Some(value) => *self = value,
                        None => return false,
                    }
                }
                ok
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag_table() -> EnumDescription {
        let mut table = EnumDescription::new("RenderPass");
        table.add(1, "A", "Alpha");
        table.add(2, "B", "Beta");
        table.add(4, "C", "Gamma");
        table
    }

    #[test]
    fn test_lookups() {
        let table = flag_table();
        assert_eq!(table.value("B"), Some(2));
        assert_eq!(table.name(4), Some("C"));
        assert_eq!(table.label(1), Some("Alpha"));
        assert_eq!(table.value_by_label("Beta"), Some(2));
        assert_eq!(table.value("missing"), None);
        assert_eq!(table.index_of(4), Some(2));
    }

    #[test]
    fn test_duplicate_registration_is_deduplicated() {
        let mut table = flag_table();
        table.add(1, "A", "Alpha");
        assert_eq!(table.len(), 3);
        assert_eq!(table.value("A"), Some(1));
    }

    #[test]
    fn test_bit_vector_round_trip() {
        let table = flag_table();
        let encoded = table.encode_bit_vector(3);
        // Order depends on registration order; compare as a set.
        let mut parts: Vec<&str> = encoded.split('|').collect();
        parts.sort_unstable();
        assert_eq!(parts, vec!["A", "B"]);
        assert_eq!(table.decode_bit_vector(&encoded), 3);
        assert_eq!(table.decode_bit_vector("A|B"), 3);
    }

    #[test]
    fn test_bit_vector_residual_bits_are_dropped() {
        let table = flag_table();
        assert_eq!(table.encode_bit_vector(8 | 1), "A");
        assert_eq!(table.decode_bit_vector("A|Unknown"), 1);
    }
}
