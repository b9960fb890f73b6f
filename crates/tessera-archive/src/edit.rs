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

//! The property-model archive for editor UIs.
//!
//! An edit traversal turns an object graph into a tree of
//! [`PropertyRow`]s: one row per visited field, with display labels,
//! enum choice lists routed through display labels, pointer type
//! dropdowns from the class factory, and `doc` texts attached as
//! tooltips. The tree is plain data and serializes with `serde` for
//! UI processes living outside this crate.

use serde::Serialize as SerdeSerialize;
use tessera_reflect::{
    Archive, ArchiveCaps, ContextStack, KeyValue, PolymorphicPointer, Sequence, Serialize,
    StringListSelection, StringValue, StructRef,
};

/// What a property row holds and how a UI should render it.
#[derive(Debug, Clone, PartialEq, SerdeSerialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowKind {
    /// A checkbox.
    Bool {
        /// Current state.
        value: bool,
    },
    /// A signed integer spinbox.
    Int {
        /// Current value.
        value: i64,
    },
    /// An unsigned integer spinbox.
    UInt {
        /// Current value.
        value: u64,
    },
    /// A floating-point spinbox.
    Float {
        /// Current value.
        value: f64,
    },
    /// A one-line text box.
    Text {
        /// Current contents.
        value: String,
    },
    /// A dropdown over a fixed choice list.
    Choice {
        /// Options in table order.
        options: Vec<&'static str>,
        /// Selected option, if the current value maps to one.
        index: Option<usize>,
    },
    /// An expandable struct node; the fields are in `children`.
    Struct,
    /// An expandable sequence node; the elements are in `children`.
    Container {
        /// Element count.
        len: usize,
    },
    /// A polymorphic pointer: a type dropdown plus the pointee's fields
    /// in `children`.
    Pointer {
        /// Registered name of the current pointee; empty when null.
        type_name: String,
        /// (name, label) pairs the dropdown offers.
        choices: Vec<(&'static str, &'static str)>,
    },
    /// A key/value pair node.
    Pair,
}

/// One row of the property tree.
#[derive(Debug, Clone, PartialEq, SerdeSerialize)]
pub struct PropertyRow {
    /// Field name, as stored in archives.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Row payload.
    #[serde(flatten)]
    pub kind: RowKind,
    /// Tooltip collected from `doc` calls, if any.
    pub tooltip: Option<String>,
    /// Nested rows for struct, container, pointer and pair nodes.
    pub children: Vec<PropertyRow>,
}

impl PropertyRow {
    fn leaf(name: &str, label: &str, kind: RowKind) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            kind,
            tooltip: None,
            children: Vec::new(),
        }
    }
}

/// Builds a [`PropertyRow`] tree from an object graph.
pub struct PropertyModel {
    stack: Vec<Vec<PropertyRow>>,
    context: ContextStack,
}

impl PropertyModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![Vec::new()],
            context: ContextStack::new(),
        }
    }

    /// Consumes the model and returns the collected top-level rows.
    #[must_use]
    pub fn into_rows(mut self) -> Vec<PropertyRow> {
        self.stack.pop().unwrap_or_default()
    }

    fn push_row(&mut self, row: PropertyRow) -> bool {
        match self.stack.last_mut() {
            Some(rows) => {
                rows.push(row);
                true
            }
            None => false,
        }
    }

    fn nested(&mut self, serialize: impl FnOnce(&mut dyn Archive) -> bool) -> (Vec<PropertyRow>, bool) {
        self.stack.push(Vec::new());
        let ok = serialize(self.as_dyn());
        (self.stack.pop().unwrap_or_default(), ok)
    }
}

impl Default for PropertyModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the property tree for `value`.
pub fn inspect<T: Serialize>(value: &mut T) -> Vec<PropertyRow> {
    let mut model = PropertyModel::new();
    value.serialize(&mut model);
    model.into_rows()
}

impl Archive for PropertyModel {
    fn caps(&self) -> ArchiveCaps {
        ArchiveCaps::OUTPUT | ArchiveCaps::EDIT | ArchiveCaps::DOCUMENTATION
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

    fn value_bool(&mut self, value: &mut bool, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(name, label, RowKind::Bool { value: *value }))
    }

    fn value_i8(&mut self, value: &mut i8, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::Int {
                value: i64::from(*value),
            },
        ))
    }

    fn value_i16(&mut self, value: &mut i16, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::Int {
                value: i64::from(*value),
            },
        ))
    }

    fn value_i32(&mut self, value: &mut i32, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::Int {
                value: i64::from(*value),
            },
        ))
    }

    fn value_i64(&mut self, value: &mut i64, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(name, label, RowKind::Int { value: *value }))
    }

    fn value_u8(&mut self, value: &mut u8, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::UInt {
                value: u64::from(*value),
            },
        ))
    }

    fn value_u16(&mut self, value: &mut u16, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::UInt {
                value: u64::from(*value),
            },
        ))
    }

    fn value_u32(&mut self, value: &mut u32, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::UInt {
                value: u64::from(*value),
            },
        ))
    }

    fn value_u64(&mut self, value: &mut u64, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(name, label, RowKind::UInt { value: *value }))
    }

    fn value_f32(&mut self, value: &mut f32, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::Float {
                value: f64::from(*value),
            },
        ))
    }

    fn value_f64(&mut self, value: &mut f64, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(name, label, RowKind::Float { value: *value }))
    }

    fn value_char(&mut self, value: &mut char, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::Text {
                value: value.to_string(),
            },
        ))
    }

    fn value_string(&mut self, value: &mut dyn StringValue, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::Text {
                value: value.get().to_owned(),
            },
        ))
    }

    fn struct_value(&mut self, mut value: StructRef<'_>, name: &str, label: &str) -> bool {
        let (children, ok) = self.nested(|ar| value.serialize(ar));
        let mut row = PropertyRow::leaf(name, label, RowKind::Struct);
        row.children = children;
        self.push_row(row) && ok
    }

    fn container(&mut self, value: &mut dyn Sequence, name: &str, label: &str) -> bool {
        let count = value.len();
        self.stack.push(Vec::new());
        let mut ok = true;
        for index in 0..count {
            ok &= value.serialize_element(self.as_dyn(), &format!("[{index}]"), "");
            if index + 1 < count {
                value.advance();
            }
        }
        let children = self.stack.pop().unwrap_or_default();
        let mut row = PropertyRow::leaf(name, label, RowKind::Container { len: count });
        row.children = children;
        self.push_row(row) && ok
    }

    fn pointer(&mut self, value: &mut dyn PolymorphicPointer, name: &str, label: &str) -> bool {
        let type_name = value.registered_type_name().unwrap_or("").to_owned();
        let choices = value.type_choices();
        self.stack.push(Vec::new());
        let ok = match value.serializer() {
            Some(mut pointee) => pointee.serialize(self.as_dyn()),
            None => true,
        };
        let children = self.stack.pop().unwrap_or_default();
        let mut row = PropertyRow::leaf(name, label, RowKind::Pointer { type_name, choices });
        row.children = children;
        self.push_row(row) && ok
    }

    fn key_value(&mut self, value: &mut dyn KeyValue, name: &str, label: &str) -> bool {
        self.stack.push(Vec::new());
        let key_ok = value.serialize_key(self.as_dyn());
        let value_ok = value.serialize_value(self.as_dyn());
        let children = self.stack.pop().unwrap_or_default();
        let mut row = PropertyRow::leaf(name, label, RowKind::Pair);
        row.children = children;
        self.push_row(row) && key_ok && value_ok
    }

    fn string_list(&mut self, value: &mut StringListSelection, name: &str, label: &str) -> bool {
        self.push_row(PropertyRow::leaf(
            name,
            label,
            RowKind::Choice {
                options: value.options.clone(),
                index: value.index,
            },
        ))
    }

    fn doc(&mut self, text: &str) {
        if let Some(row) = self.stack.last_mut().and_then(|rows| rows.last_mut()) {
            row.tooltip = Some(text.to_owned());
        }
    }
}
