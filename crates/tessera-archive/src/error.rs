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

//! Hard archive failures.
//!
//! Field-level problems (missing record, wrong kind, unknown type name)
//! stay soft: the operation returns `false` and traversal continues.
//! [`ArchiveError`] is reserved for problems that invalidate a whole
//! load or save, such as an unreadable file or a corrupt container
//! header.

use thiserror::Error;

/// A failure that aborts a whole load or save.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Reading or writing the underlying stream failed.
    #[error("archive i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The input does not start with the expected container header.
    #[error("bad archive header: {0}")]
    Header(&'static str),

    /// The payload ends mid-record.
    #[error("truncated archive payload at byte {0}")]
    Truncated(usize),

    /// The input is not well-formed JSON.
    #[error("malformed text archive: {0}")]
    Json(#[from] serde_json::Error),

    /// The parsed document's root is not a JSON object.
    #[error("text archive root must be an object")]
    RootNotObject,
}
