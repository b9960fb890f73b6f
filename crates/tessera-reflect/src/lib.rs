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

//! # Tessera Reflect
//!
//! Runtime reflection core: type identity, enum description tables,
//! polymorphic class factories, and the archive visitor protocol that
//! serialization formats and editor tooling build on.

#![warn(missing_docs)]

pub mod adapters;
pub mod archive;
pub mod context;
pub mod enums;
pub mod error;
pub mod factory;
pub mod identity;
pub mod serialize;
pub mod utils;

pub use adapters::{
    ArcPointer, ArraySequence, BoxPointer, KeyValue, MapEntry, PolymorphicPointer, Sequence,
    StringValue, VecDequeSequence, VecSequence,
};
pub use archive::{Archive, ArchiveCaps, ArchiveExt, StringListSelection};
pub use context::ContextStack;
pub use enums::{BitVector, DescribedEnum, EnumDescription, EnumEntry};
pub use error::ReflectError;
pub use factory::{ClassFactory, ClassRegistration, Creator, FactoryBase};
pub use identity::{TypeInfo, TypeTag};
pub use serialize::{Field, Reflected, Serialize, StructRef};

// Used by the registration macros; not part of the public surface.
#[doc(hidden)]
pub use inventory;
