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

//! Error types for the reflection core.
//!
//! Per-field serialization failure is reported through `bool` returns on
//! the visitor protocol and stays local to the failing field; the types
//! here cover registry operations with a caller that can meaningfully
//! react (explicit registration, hot-reload unregistration).

use std::fmt;

/// An error raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectError {
    /// A creator with the same registered name already exists in the
    /// factory for this base type.
    DuplicateCreator {
        /// The base type the factory serves.
        base: &'static str,
        /// The registered name that collided.
        name: &'static str,
    },
    /// A lookup or unregistration referenced a name no creator was
    /// registered under.
    UnknownTypeName {
        /// The base type the factory serves.
        base: &'static str,
        /// The name that was not found.
        name: String,
    },
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectError::DuplicateCreator { base, name } => {
                write!(f, "creator '{name}' is already registered for base '{base}'")
            }
            ReflectError::UnknownTypeName { base, name } => {
                write!(f, "no creator named '{name}' is registered for base '{base}'")
            }
        }
    }
}

impl std::error::Error for ReflectError {}
