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

//! [`Sequence`] adapters for the standard growable and fixed
//! containers, plus the `Field` impls that route them into
//! [`Archive::container`].

use std::collections::VecDeque;
use std::mem;

use crate::adapters::Sequence;
use crate::archive::Archive;
use crate::identity::TypeTag;
use crate::serialize::Field;

/// [`Sequence`] view over a `Vec`.
pub struct VecSequence<'a, T> {
    items: &'a mut Vec<T>,
    cursor: usize,
}

impl<'a, T> VecSequence<'a, T> {
    /// Borrows `items` with the cursor on element 0.
    pub fn new(items: &'a mut Vec<T>) -> Self {
        Self { items, cursor: 0 }
    }
}

impl<T: Field + Default + 'static> Sequence for VecSequence<'_, T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_fixed(&self) -> bool {
        false
    }

    fn element_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn element_size(&self) -> usize {
        mem::size_of::<T>()
    }

    fn resize(&mut self, len: usize) -> bool {
        self.items.resize_with(len, T::default);
        self.cursor = 0;
        true
    }

    fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
        self.cursor + 1 < self.items.len()
    }

    fn element_ptr(&mut self) -> Option<*mut u8> {
        self.items
            .get_mut(self.cursor)
            .map(|element| element as *mut T as *mut u8)
    }

    fn serialize_element(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        if self.cursor >= self.items.len() {
            self.items.push(T::default());
        }
        self.items[self.cursor].visit(ar, name, label)
    }
}

impl<T: Field + Default + 'static> Field for Vec<T> {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        ar.container(&mut VecSequence::new(self), name, label)
    }
}

/// [`Sequence`] view over a `VecDeque`.
pub struct VecDequeSequence<'a, T> {
    items: &'a mut VecDeque<T>,
    cursor: usize,
}

impl<'a, T> VecDequeSequence<'a, T> {
    /// Borrows `items` with the cursor on element 0.
    pub fn new(items: &'a mut VecDeque<T>) -> Self {
        Self { items, cursor: 0 }
    }
}

impl<T: Field + Default + 'static> Sequence for VecDequeSequence<'_, T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_fixed(&self) -> bool {
        false
    }

    fn element_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn element_size(&self) -> usize {
        mem::size_of::<T>()
    }

    fn resize(&mut self, len: usize) -> bool {
        self.items.resize_with(len, T::default);
        self.cursor = 0;
        true
    }

    fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
        self.cursor + 1 < self.items.len()
    }

    fn element_ptr(&mut self) -> Option<*mut u8> {
        self.items
            .get_mut(self.cursor)
            .map(|element| element as *mut T as *mut u8)
    }

    fn serialize_element(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        if self.cursor >= self.items.len() {
            self.items.push_back(T::default());
        }
        self.items[self.cursor].visit(ar, name, label)
    }
}

impl<T: Field + Default + 'static> Field for VecDeque<T> {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        ar.container(&mut VecDequeSequence::new(self), name, label)
    }
}

/// Fixed-size [`Sequence`] view over a mutable slice. Resizing to any
/// other length is refused; element count and storage stay as they are.
pub struct ArraySequence<'a, T> {
    items: &'a mut [T],
    cursor: usize,
}

impl<'a, T> ArraySequence<'a, T> {
    /// Borrows `items` with the cursor on element 0.
    pub fn new(items: &'a mut [T]) -> Self {
        Self { items, cursor: 0 }
    }
}

impl<T: Field + 'static> Sequence for ArraySequence<'_, T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_fixed(&self) -> bool {
        true
    }

    fn element_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    fn element_size(&self) -> usize {
        mem::size_of::<T>()
    }

    fn resize(&mut self, len: usize) -> bool {
        self.cursor = 0;
        if len != self.items.len() {
            log::warn!(
                "refusing to resize fixed sequence of {} to {len}",
                self.items.len()
            );
            return false;
        }
        true
    }

    fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
        self.cursor + 1 < self.items.len()
    }

    fn element_ptr(&mut self) -> Option<*mut u8> {
        self.items
            .get_mut(self.cursor)
            .map(|element| element as *mut T as *mut u8)
    }

    fn serialize_element(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        match self.items.get_mut(self.cursor) {
            Some(element) => element.visit(ar, name, label),
            None => false,
        }
    }
}

impl<T: Field + 'static, const N: usize> Field for [T; N] {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        ar.container(&mut ArraySequence::new(&mut self[..]), name, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_visits_each_element_once() {
        let mut items = vec![1u32, 2, 3];
        let mut seq = VecSequence::new(&mut items);
        // Two advances walk a three-element sequence; the second one
        // lands on the last element and reports no further elements.
        assert!(seq.advance());
        assert!(!seq.advance());
        assert!(!seq.advance());
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_resize_grows_with_defaults_and_resets_cursor() {
        let mut items = vec![7u32];
        let mut seq = VecSequence::new(&mut items);
        assert!(seq.resize(3));
        assert_eq!(items, vec![7, 0, 0]);
    }

    #[test]
    fn test_fixed_sequence_refuses_resize() {
        let mut items = [1u32, 2];
        let mut seq = ArraySequence::new(&mut items);
        assert!(!seq.resize(5));
        assert!(seq.resize(2));
        assert!(seq.is_fixed());
    }

    #[test]
    fn test_empty_sequence_has_no_element_ptr() {
        let mut items: Vec<u32> = Vec::new();
        let mut seq = VecSequence::new(&mut items);
        assert!(seq.element_ptr().is_none());
        assert!(!seq.advance());
    }
}
