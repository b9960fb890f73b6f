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

//! Integration tests for the editor property model and the validation
//! pass.

use tessera_archive::edit::{inspect, RowKind};
use tessera_macros::Serializable;
use tessera_reflect::{
    class_factory, describe_enum, register_class, Archive, ArchiveExt, Reflected, Serialize,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
enum Space {
    #[default]
    Local = 0,
    World = 1,
}

describe_enum! {
    Space {
        Local => ("Local", "Local space"),
        World => ("World", "World space"),
    }
}

trait Shape: Reflected {
    fn area(&self) -> f32;
}

class_factory!(Shape);

#[derive(Serializable, Default)]
struct Circle {
    radius: f32,
}

impl Shape for Circle {
    fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius
    }
}

register_class!(Shape, Circle, "Circle", "Circle shape");

#[derive(Serializable, Default)]
struct Square {
    side: f32,
}

impl Shape for Square {
    fn area(&self) -> f32 {
        self.side * self.side
    }
}

register_class!(Shape, Square, "Square", "Square shape");

#[derive(Default)]
struct Collider {
    enabled: bool,
    space: Space,
    margin: f32,
    shape: Option<Box<dyn Shape>>,
}

impl Serialize for Collider {
    fn serialize(&mut self, ar: &mut dyn Archive) -> bool {
        let mut ok = true;
        ok &= ar.field(&mut self.enabled, "enabled", "Enabled");
        ok &= ar.field(&mut self.space, "space", "Space");
        ok &= ar.field(&mut self.margin, "margin", "Margin");
        ar.doc("Collision margin in world units");
        ok &= ar.field(&mut self.shape, "shape", "Shape");
        ok
    }
}

fn sample_collider() -> Collider {
    Collider {
        enabled: true,
        space: Space::World,
        margin: 0.05,
        shape: Some(Box::new(Square { side: 2.0 })),
    }
}

#[test]
fn test_rows_mirror_field_order() {
    let rows = inspect(&mut sample_collider());
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["enabled", "space", "margin", "shape"]);
    assert_eq!(rows[0].label, "Enabled");
    assert_eq!(rows[0].kind, RowKind::Bool { value: true });
}

#[test]
fn test_enum_rows_offer_display_labels() {
    let rows = inspect(&mut sample_collider());
    // Edit traversals route enums through their display labels.
    assert_eq!(
        rows[1].kind,
        RowKind::Choice {
            options: vec!["Local space", "World space"],
            index: Some(1),
        }
    );
}

#[test]
fn test_doc_attaches_to_the_preceding_row() {
    let rows = inspect(&mut sample_collider());
    assert_eq!(
        rows[2].tooltip.as_deref(),
        Some("Collision margin in world units")
    );
    assert_eq!(rows[0].tooltip, None);
}

#[test]
fn test_pointer_rows_carry_type_dropdown() {
    let rows = inspect(&mut sample_collider());
    let RowKind::Pointer { type_name, choices } = &rows[3].kind else {
        panic!("expected a pointer row, got {:?}", rows[3].kind);
    };
    assert_eq!(type_name, "Square");
    assert_eq!(
        *choices,
        vec![("Circle", "Circle shape"), ("Square", "Square shape")]
    );
    // The pointee's own fields nest under the pointer row.
    assert_eq!(rows[3].children.len(), 1);
    assert_eq!(rows[3].children[0].name, "side");
}

#[test]
fn test_null_pointer_row_has_no_children() {
    let mut collider = Collider::default();
    let rows = inspect(&mut collider);
    let RowKind::Pointer { type_name, .. } = &rows[3].kind else {
        panic!("expected a pointer row");
    };
    assert!(type_name.is_empty());
    assert!(rows[3].children.is_empty());
}

#[test]
fn test_rows_export_as_json() {
    let rows = inspect(&mut sample_collider());
    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(json[0]["kind"], "bool");
    assert_eq!(json[0]["value"], true);
    assert_eq!(json[3]["kind"], "pointer");
}

#[cfg(any(debug_assertions, feature = "diagnostics"))]
mod validation {
    use super::*;
    use tessera_archive::validate::{check, Severity};

    #[derive(Default)]
    struct Clamp {
        value: f32,
    }

    impl Serialize for Clamp {
        fn serialize(&mut self, ar: &mut dyn Archive) -> bool {
            let ok = ar.field(&mut self.value, "value", "Value");
            if !(0.0..=1.0).contains(&self.value) {
                ar.error("value", "must lie in [0, 1]");
            }
            ok
        }
    }

    impl tessera_reflect::Field for Clamp {
        fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
            ar.struct_value(tessera_reflect::StructRef::new(self), name, label)
        }
    }

    #[derive(Default)]
    struct Curve {
        keys: Vec<Clamp>,
    }

    impl Serialize for Curve {
        fn serialize(&mut self, ar: &mut dyn Archive) -> bool {
            ar.field(&mut self.keys, "keys", "Keys")
        }
    }

    #[test]
    fn test_validation_reports_dotted_paths() {
        let mut curve = Curve {
            keys: vec![
                Clamp { value: 0.5 },
                Clamp { value: 7.0 },
                Clamp { value: 1.0 },
            ],
        };
        let diagnostics = check(&mut curve);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path, "keys.[1].value");
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_clean_graph_produces_no_diagnostics() {
        let mut curve = Curve {
            keys: vec![Clamp { value: 0.25 }],
        };
        assert!(check(&mut curve).is_empty());
    }
}
