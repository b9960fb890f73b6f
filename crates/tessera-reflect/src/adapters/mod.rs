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

//! Type-erased adapters between concrete data structures and the
//! archive protocol.
//!
//! Archives never see `Vec<T>` or `Option<Box<dyn Base>>` directly;
//! they see a [`Sequence`], [`KeyValue`], [`PolymorphicPointer`] or
//! [`StringValue`] borrowed over the real data for the duration of one
//! visit. The adapter owns the cursor state and the element-level
//! dispatch, the archive owns the representation.

mod map;
mod pointer;
mod sequence;

pub use map::MapEntry;
pub use pointer::{ArcPointer, BoxPointer};
pub use sequence::{ArraySequence, VecDequeSequence, VecSequence};

use crate::archive::Archive;
use crate::identity::TypeTag;
use crate::serialize::StructRef;

/// A resizable (or fixed-size) sequence viewed one element at a time.
///
/// The adapter keeps a cursor over the underlying container. A fresh
/// adapter starts on element 0; [`advance`](Sequence::advance) moves to
/// the next element and reports whether one more element follows it, so
/// a loop of `len() - 1` advances visits every element and ends on the
/// last one with `false`.
pub trait Sequence {
    /// Current element count.
    fn len(&self) -> usize;

    /// `true` when the sequence holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` for fixed-capacity sequences that cannot be resized.
    fn is_fixed(&self) -> bool;

    /// The element type's tag.
    fn element_tag(&self) -> TypeTag;

    /// In-memory size of one element, for in-place archives.
    fn element_size(&self) -> usize;

    /// Resizes to `len` elements, default-constructing new ones.
    /// Returns `false` when the sequence is fixed and `len` differs
    /// from the current count; the cursor resets to element 0 either
    /// way.
    fn resize(&mut self, len: usize) -> bool;

    /// Moves the cursor to the next element. Returns `true` while at
    /// least one more element follows the new cursor position; the
    /// cursor never leaves the valid range.
    fn advance(&mut self) -> bool;

    /// Raw pointer to the element under the cursor, for archives with
    /// the `IN_PLACE` capability. `None` when the sequence is empty.
    fn element_ptr(&mut self) -> Option<*mut u8>;

    /// Serializes the element under the cursor through the archive.
    fn serialize_element(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool;
}

/// One key/value pair of an associative container, each side serialized
/// through its own `Field` dispatch.
pub trait KeyValue {
    /// Serializes the key side.
    fn serialize_key(&mut self, ar: &mut dyn Archive) -> bool;

    /// Serializes the value side.
    fn serialize_value(&mut self, ar: &mut dyn Archive) -> bool;
}

/// An owning nullable pointer to a factory-registered polymorphic
/// object.
pub trait PolymorphicPointer {
    /// The registered name of the current pointee's concrete type.
    /// `None` when the pointer is null or the type was never
    /// registered.
    fn registered_type_name(&self) -> Option<&'static str>;

    /// Replaces the pointee with a default-constructed instance of the
    /// type registered under `name`; an empty name resets to null.
    /// Returns `false` when the name is not registered, leaving the
    /// pointer untouched.
    fn create(&mut self, name: &str) -> bool;

    /// The tag of the base type the factory is keyed on.
    fn base_tag(&self) -> TypeTag;

    /// The concrete pointee's tag; the base tag when null.
    fn pointer_tag(&self) -> TypeTag;

    /// A struct view of the current pointee, for serializing its data
    /// block. `None` when the pointer is null.
    fn serializer(&mut self) -> Option<StructRef<'_>>;

    /// (name, label) pairs of every type the pointer could hold, for
    /// edit-mode dropdowns.
    fn type_choices(&self) -> Vec<(&'static str, &'static str)>;
}

/// A mutable string slot. Lets one `value_string` operation serve every
/// string-like storage.
pub trait StringValue {
    /// The current contents.
    fn get(&self) -> &str;

    /// Replaces the contents.
    fn set(&mut self, value: &str);
}

impl StringValue for String {
    fn get(&self) -> &str {
        self
    }

    fn set(&mut self, value: &str) {
        self.clear();
        self.push_str(value);
    }
}
