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

//! [`PolymorphicPointer`] adapters over owning smart pointers.
//!
//! A nullable `Option<Box<dyn Base>>` or `Option<Arc<dyn Base>>` field
//! serializes as a (type name, data) pair against the base trait's
//! class factory. The `Arc` flavor requires the serialized handle to be
//! the only one alive; shared handles cannot be written through.

use std::sync::Arc;

use crate::adapters::PolymorphicPointer;
use crate::archive::Archive;
use crate::factory::FactoryBase;
use crate::identity::TypeTag;
use crate::serialize::{Field, StructRef};

/// [`PolymorphicPointer`] view over an `Option<Box<B>>`.
pub struct BoxPointer<'a, B: FactoryBase + ?Sized> {
    slot: &'a mut Option<Box<B>>,
}

impl<'a, B: FactoryBase + ?Sized> BoxPointer<'a, B> {
    /// Borrows the pointer slot.
    pub fn new(slot: &'a mut Option<Box<B>>) -> Self {
        Self { slot }
    }
}

impl<B: FactoryBase + ?Sized> PolymorphicPointer for BoxPointer<'_, B> {
    fn registered_type_name(&self) -> Option<&'static str> {
        let object = self.slot.as_deref()?;
        B::factory().registered_type_name(object)
    }

    fn create(&mut self, name: &str) -> bool {
        if name.is_empty() {
            *self.slot = None;
            return true;
        }
        match B::factory().create(name) {
            Some(object) => {
                *self.slot = Some(object);
                true
            }
            None => false,
        }
    }

    fn base_tag(&self) -> TypeTag {
        TypeTag::of_unsized::<B>()
    }

    fn pointer_tag(&self) -> TypeTag {
        match self.slot.as_deref() {
            Some(object) => B::dyn_tag(object),
            None => self.base_tag(),
        }
    }

    fn serializer(&mut self) -> Option<StructRef<'_>> {
        let object = self.slot.as_deref_mut()?;
        Some(StructRef::from_dyn(B::as_reflected(object)))
    }

    fn type_choices(&self) -> Vec<(&'static str, &'static str)> {
        B::factory().type_choices()
    }
}

impl<B: FactoryBase + ?Sized> Field for Option<Box<B>> {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        ar.pointer(&mut BoxPointer::new(self), name, label)
    }
}

/// [`PolymorphicPointer`] view over an `Option<Arc<B>>`.
///
/// Serializing through the pointee needs exclusive access, so
/// [`serializer`](PolymorphicPointer::serializer) returns `None` when
/// other handles to the same object are alive. That situation is a
/// caller bug and trips a debug assertion.
pub struct ArcPointer<'a, B: FactoryBase + ?Sized> {
    slot: &'a mut Option<Arc<B>>,
}

impl<'a, B: FactoryBase + ?Sized> ArcPointer<'a, B> {
    /// Borrows the pointer slot.
    pub fn new(slot: &'a mut Option<Arc<B>>) -> Self {
        Self { slot }
    }
}

impl<B: FactoryBase + ?Sized> PolymorphicPointer for ArcPointer<'_, B> {
    fn registered_type_name(&self) -> Option<&'static str> {
        let object = self.slot.as_deref()?;
        B::factory().registered_type_name(object)
    }

    fn create(&mut self, name: &str) -> bool {
        if name.is_empty() {
            *self.slot = None;
            return true;
        }
        match B::factory().create(name) {
            Some(object) => {
                *self.slot = Some(Arc::from(object));
                true
            }
            None => false,
        }
    }

    fn base_tag(&self) -> TypeTag {
        TypeTag::of_unsized::<B>()
    }

    fn pointer_tag(&self) -> TypeTag {
        match self.slot.as_deref() {
            Some(object) => B::dyn_tag(object),
            None => self.base_tag(),
        }
    }

    fn serializer(&mut self) -> Option<StructRef<'_>> {
        let base = self.base_tag();
        let handle = self.slot.as_mut()?;
        let Some(object) = Arc::get_mut(handle) else {
            debug_assert!(false, "serializing a shared Arc pointee");
            log::warn!("skipping shared Arc pointee of {base}");
            return None;
        };
        Some(StructRef::from_dyn(B::as_reflected(object)))
    }

    fn type_choices(&self) -> Vec<(&'static str, &'static str)> {
        B::factory().type_choices()
    }
}

impl<B: FactoryBase + ?Sized> Field for Option<Arc<B>> {
    fn visit(&mut self, ar: &mut dyn Archive, name: &str, label: &str) -> bool {
        ar.pointer(&mut ArcPointer::new(self), name, label)
    }
}
