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

//! Integration tests for binary and text serialization of a realistic
//! material graph: enums, flag sets, containers, maps and polymorphic
//! pointers.

use std::collections::BTreeMap;

use tessera_archive::{binary, text};
use tessera_macros::Serializable;
use tessera_reflect::{class_factory, describe_enum, register_class, BitVector, Reflected};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
enum Blend {
    #[default]
    Opaque = 0,
    Add = 1,
    Multiply = 2,
}

describe_enum! {
    Blend {
        Opaque => ("Opaque", "Opaque blending"),
        Add => ("Add", "Additive blending"),
        Multiply => ("Multiply", "Multiplicative blending"),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PassFlag {
    Shadow = 1,
    Depth = 2,
    Color = 4,
}

describe_enum! {
    PassFlag {
        Shadow => ("Shadow", "Shadow pass"),
        Depth => ("Depth", "Depth prepass"),
        Color => ("Color", "Color pass"),
    }
}

trait Modifier: Reflected {
    fn apply(&self, value: f32) -> f32;
}

class_factory!(Modifier);

#[derive(Serializable, Default)]
struct Scale {
    factor: f32,
}

impl Modifier for Scale {
    fn apply(&self, value: f32) -> f32 {
        value * self.factor
    }
}

register_class!(Modifier, Scale, "Scale", "Scale modifier");

#[derive(Serializable, Default)]
struct Offset {
    amount: f32,
}

impl Modifier for Offset {
    fn apply(&self, value: f32) -> f32 {
        value + self.amount
    }
}

register_class!(Modifier, Offset, "Offset", "Offset modifier");

#[derive(Serializable, Default)]
struct Material {
    name: String,
    blend: Blend,
    passes: BitVector<PassFlag>,
    opacity: f32,
    levels: Vec<u8>,
    params: BTreeMap<String, f32>,
    modifier: Option<Box<dyn Modifier>>,
}

fn sample_material() -> Material {
    let mut material = Material {
        name: "rock_wall".to_owned(),
        blend: Blend::Add,
        opacity: 0.75,
        levels: vec![0, 64, 255],
        ..Material::default()
    };
    material.passes.insert(PassFlag::Shadow);
    material.passes.insert(PassFlag::Color);
    material.params.insert("roughness".to_owned(), 0.4);
    material.params.insert("metalness".to_owned(), 0.1);
    material.modifier = Some(Box::new(Scale { factor: 2.0 }));
    material
}

#[test]
fn test_binary_round_trip_restores_every_field() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut saved = sample_material();
    let bytes = binary::to_bytes(&mut saved);

    let mut loaded = Material::default();
    assert!(binary::from_bytes(&mut loaded, &bytes).unwrap());

    assert_eq!(loaded.name, "rock_wall");
    assert_eq!(loaded.blend, Blend::Add);
    assert!(loaded.passes.contains(PassFlag::Shadow));
    assert!(loaded.passes.contains(PassFlag::Color));
    assert!(!loaded.passes.contains(PassFlag::Depth));
    assert_eq!(loaded.opacity, 0.75);
    assert_eq!(loaded.levels, vec![0, 64, 255]);
    assert_eq!(loaded.params.get("roughness"), Some(&0.4));
    assert_eq!(loaded.params.get("metalness"), Some(&0.1));
    // The pointer round trip must reconstruct the registered type.
    let modifier = loaded.modifier.as_ref().expect("modifier survives");
    assert_eq!(modifier.apply(3.0), 6.0);
}

#[test]
fn test_binary_save_is_idempotent() {
    let mut saved = sample_material();
    let first = binary::to_bytes(&mut saved);

    let mut loaded = Material::default();
    assert!(binary::from_bytes(&mut loaded, &first).unwrap());
    let second = binary::to_bytes(&mut loaded);

    assert_eq!(first, second);
}

#[test]
fn test_binary_rejects_foreign_bytes() {
    let mut material = Material::default();
    assert!(binary::from_bytes(&mut material, b"not an archive").is_err());
}

#[test]
fn test_binary_rejects_oversized_payload_length() {
    // A valid header whose declared length cannot fit in the buffer
    // must come back as an error, even at the u64 extreme.
    for length in [u64::MAX, u64::MAX - binary::format::BinaryHeader::SIZE as u64, 1] {
        let bytes = binary::format::BinaryHeader::new(length).to_bytes();
        let mut material = Material::default();
        assert!(binary::from_bytes(&mut material, &bytes).is_err());
    }
}

#[test]
fn test_text_round_trip_restores_every_field() {
    let mut saved = sample_material();
    let json = text::to_string(&mut saved);

    let mut loaded = Material::default();
    assert!(text::from_str(&mut loaded, &json).unwrap());

    assert_eq!(loaded.name, "rock_wall");
    assert_eq!(loaded.blend, Blend::Add);
    assert_eq!(loaded.passes.bits, saved.passes.bits);
    assert_eq!(loaded.levels, vec![0, 64, 255]);
    assert_eq!(loaded.params.get("roughness"), Some(&0.4));
    let modifier = loaded.modifier.as_ref().expect("modifier survives");
    assert_eq!(modifier.apply(3.0), 6.0);
}

#[test]
fn test_text_output_uses_readable_names() {
    let mut material = sample_material();
    let value = text::to_value(&mut material);

    // Enums write short names, flag sets write |-joined names.
    assert_eq!(value["blend"], "Add");
    assert_eq!(value["passes"], "Shadow|Color");
    assert_eq!(value["modifier"]["type"], "Scale");
    assert_eq!(value["modifier"]["data"]["factor"], 2.0);
}

#[test]
fn test_text_null_pointer_round_trip() {
    let mut material = Material::default();
    let value = text::to_value(&mut material);
    assert!(value["modifier"].is_null());

    let mut loaded = sample_material();
    assert!(text::from_value(&mut loaded, value).unwrap());
    assert!(loaded.modifier.is_none());
}

#[test]
fn test_text_reads_fields_in_any_order() {
    let json = r#"{
        "modifier": { "type": "Offset", "data": { "amount": 1.5 } },
        "opacity": 0.5,
        "blend": "Multiply",
        "name": "glass"
    }"#;

    let mut loaded = Material::default();
    // Some fields are absent, so the load reports a partial read.
    assert!(!text::from_str(&mut loaded, json).unwrap());

    assert_eq!(loaded.name, "glass");
    assert_eq!(loaded.blend, Blend::Multiply);
    assert_eq!(loaded.opacity, 0.5);
    let modifier = loaded.modifier.as_ref().expect("modifier read");
    assert_eq!(modifier.apply(1.0), 2.5);
}

#[test]
fn test_missing_field_keeps_current_value() {
    let mut loaded = sample_material();
    assert!(!text::from_str(&mut loaded, r#"{ "name": "patched" }"#).unwrap());
    assert_eq!(loaded.name, "patched");
    // Untouched fields keep what they had.
    assert_eq!(loaded.opacity, 0.75);
    assert_eq!(loaded.blend, Blend::Add);
}

#[test]
fn test_unknown_field_is_ignored() {
    let mut saved = sample_material();
    let mut value = text::to_value(&mut saved);
    value["legacy_field"] = serde_json::json!({ "a": 1 });

    let mut loaded = Material::default();
    assert!(text::from_value(&mut loaded, value).unwrap());
    assert_eq!(loaded.name, "rock_wall");
}

#[test]
fn test_unknown_pointer_type_fails_softly() {
    let json = r#"{ "modifier": { "type": "Bogus", "data": {} } }"#;
    let mut loaded = Material::default();
    assert!(!text::from_str(&mut loaded, json).unwrap());
    assert!(loaded.modifier.is_none());

    // An unknown type name must also clear a live pointee, not keep it.
    let mut loaded = sample_material();
    assert!(!text::from_str(&mut loaded, json).unwrap());
    assert!(loaded.modifier.is_none());
}

#[test]
fn test_binary_unknown_pointer_type_resets_to_null() {
    let mut saved = sample_material();
    let bytes = binary::to_bytes(&mut saved);

    // Corrupt the stored pointer type name; field names are hashed, so
    // the only literal "Scale" in the stream is the pointee's tag.
    let pos = bytes
        .windows(5)
        .position(|window| window == b"Scale")
        .expect("pointer type name present");
    let mut bytes = bytes;
    bytes[pos..pos + 5].copy_from_slice(b"Bogus");

    let mut loaded = sample_material();
    assert!(!binary::from_bytes(&mut loaded, &bytes).unwrap());
    assert!(loaded.modifier.is_none());
}

#[test]
fn test_text_container_resizes_on_load() {
    let mut loaded = sample_material();
    assert!(!text::from_str(&mut loaded, r#"{ "levels": [9] }"#).unwrap());
    assert_eq!(loaded.levels, vec![9]);

    assert!(!text::from_str(&mut loaded, r#"{ "levels": [1, 2, 3, 4] }"#).unwrap());
    assert_eq!(loaded.levels, vec![1, 2, 3, 4]);
}

#[test]
fn test_binary_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("material.tsra");

    let mut saved = sample_material();
    binary::save_file(&mut saved, &path).unwrap();

    let mut loaded = Material::default();
    assert!(binary::load_file(&mut loaded, &path).unwrap());
    assert_eq!(loaded.name, "rock_wall");
    assert_eq!(loaded.levels, vec![0, 64, 255]);
}

#[test]
fn test_text_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("material.json");

    let mut saved = sample_material();
    text::save_file(&mut saved, &path).unwrap();

    let mut loaded = Material::default();
    assert!(text::load_file(&mut loaded, &path).unwrap());
    assert_eq!(loaded.blend, Blend::Add);
    assert_eq!(loaded.params.len(), 2);
}
