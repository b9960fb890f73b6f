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

//! # Tessera Archive
//!
//! Concrete archives over the `tessera-reflect` protocol: a compact
//! binary format, a human-readable JSON format, a property-row model
//! for editor UIs, and a validation pass with path-qualified
//! diagnostics.

#![warn(missing_docs)]

pub mod binary;
pub mod edit;
pub mod error;
pub mod text;
#[cfg(any(debug_assertions, feature = "diagnostics"))]
pub mod validate;

pub use binary::{BinaryReader, BinaryWriter};
pub use edit::{inspect, PropertyModel, PropertyRow, RowKind};
pub use error::ArchiveError;
pub use text::{TextReader, TextWriter};
#[cfg(any(debug_assertions, feature = "diagnostics"))]
pub use validate::{check, Diagnostic, Severity, Validator};
