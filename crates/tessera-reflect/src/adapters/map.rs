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

//! Associative containers on the archive protocol.
//!
//! Maps serialize as a sequence of [`MapEntry`] pairs: the map is
//! drained into a `Vec` of entries, the entries travel through the
//! ordinary sequence path (each one as a key/value visit), and the map
//! is rebuilt afterwards. An input archive can therefore grow or shrink
//! a map exactly like a `Vec`.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::adapters::KeyValue;
use crate::archive::Archive;
use crate::serialize::Field;

/// One key/value pair in transit between a map and an archive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MapEntry<K, V> {
    /// The key side of the pair.
    pub key: K,
    /// The value side of the pair.
    pub value: V,
}

impl<K: Field, V: Field> KeyValue for MapEntry<K, V> {
    fn serialize_key(&mut self, ar: &mut dyn Archive) -> bool {
        self.key.visit(ar, "key", "Key")
    }

    fn serialize_value(&mut self, ar: &mut dyn Archive) -> bool {
        self.value.visit(ar, "value", "Value")
    }
}

impl<K: Field, V: Field> Field for MapEntry<K, V> {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        ar.key_value(self, name, label)
    }
}

impl<K, V, S> Field for HashMap<K, V, S>
where
    K: Field + Default + Eq + Hash + 'static,
    V: Field + Default + 'static,
    S: BuildHasher + Default,
{
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        let mut entries: Vec<MapEntry<K, V>> = self
            .drain()
            .map(|(key, value)| MapEntry { key, value })
            .collect();
        let ok = entries.visit(ar, name, label);
        self.extend(entries.into_iter().map(|e| (e.key, e.value)));
        ok
    }
}

impl<K, V> Field for BTreeMap<K, V>
where
    K: Field + Default + Ord + 'static,
    V: Field + Default + 'static,
{
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        let mut entries: Vec<MapEntry<K, V>> = std::mem::take(self)
            .into_iter()
            .map(|(key, value)| MapEntry { key, value })
            .collect();
        let ok = entries.visit(ar, name, label);
        self.extend(entries.into_iter().map(|e| (e.key, e.value)));
        ok
    }
}
