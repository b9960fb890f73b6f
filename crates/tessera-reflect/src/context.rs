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

//! A type-keyed stack of ancestor objects for nested visits.
//!
//! While an archive traverses an object graph, a caller can push an
//! object onto the [`ContextStack`] so that visits deeper in the graph
//! can find it by type without threading it through every `serialize`
//! signature. Entries shadow: a lookup returns the entry pushed most
//! recently for the requested type.
//!
//! Entries are shared (`Arc`) handles; a context object that needs
//! mutation from below brings its own interior mutability.

use std::any::{Any, TypeId};
use std::sync::Arc;

/// A stack of `(TypeId, value)` entries with nearest-match lookup.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tessera_reflect::ContextStack;
///
/// struct EditorServices { grid_step: f32 }
///
/// let mut stack = ContextStack::new();
/// stack.push(Arc::new(EditorServices { grid_step: 0.5 }));
///
/// let services = stack.get::<EditorServices>().unwrap();
/// assert_eq!(services.grid_step, 0.5);
/// ```
#[derive(Default)]
pub struct ContextStack {
    entries: Vec<(TypeId, Arc<dyn Any + Send + Sync>)>,
}

impl ContextStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Pushes an entry, keyed by `T`'s [`TypeId`].
    ///
    /// An entry of the same type already on the stack is shadowed, not
    /// replaced; it becomes visible again after the newer entry is
    /// popped.
    pub fn push<T: Any + Send + Sync>(&mut self, value: Arc<T>) {
        self.entries.push((TypeId::of::<T>(), value));
    }

    /// Pops the most recently pushed entry, whatever its type.
    pub fn pop(&mut self) {
        self.entries.pop();
    }

    /// Returns the nearest entry of type `T`, searching from the top of
    /// the stack down.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let key = TypeId::of::<T>();
        self.entries
            .iter()
            .rev()
            .find(|(id, _)| *id == key)
            .and_then(|(_, value)| Arc::clone(value).downcast::<T>().ok())
    }

    /// Returns `true` if an entry of type `T` is on the stack.
    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        let key = TypeId::of::<T>();
        self.entries.iter().any(|(id, _)| *id == key)
    }

    /// Returns the number of entries on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are on the stack.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeScene {
        name: String,
    }

    struct FakeSelection {}

    #[test]
    fn test_push_and_get() {
        let mut stack = ContextStack::new();
        stack.push(Arc::new(FakeScene {
            name: "level_01".to_string(),
        }));

        let scene = stack.get::<FakeScene>().unwrap();
        assert_eq!(scene.name, "level_01");
    }

    #[test]
    fn test_get_missing_returns_none() {
        let stack = ContextStack::new();
        assert!(stack.get::<FakeScene>().is_none());
    }

    #[test]
    fn test_nearest_entry_shadows() {
        let mut stack = ContextStack::new();
        stack.push(Arc::new(FakeScene {
            name: "outer".to_string(),
        }));
        stack.push(Arc::new(FakeSelection {}));
        stack.push(Arc::new(FakeScene {
            name: "inner".to_string(),
        }));

        assert_eq!(stack.get::<FakeScene>().unwrap().name, "inner");
        stack.pop();
        assert_eq!(stack.get::<FakeScene>().unwrap().name, "outer");
        assert!(stack.contains::<FakeSelection>());
    }

    #[test]
    fn test_pop_removes_top_entry() {
        let mut stack = ContextStack::new();
        stack.push(Arc::new(FakeSelection {}));
        assert_eq!(stack.len(), 1);
        stack.pop();
        assert!(stack.is_empty());
        assert!(!stack.contains::<FakeSelection>());
    }
}
