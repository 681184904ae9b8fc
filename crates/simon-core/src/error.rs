// Copyright 2025 eraflo
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

//! The error taxonomy of the Simon registry.

use crate::simon::SimonKind;

/// A specialized `Result` type for Simon operations.
pub type SimonResult<T> = Result<T, SimonError>;

/// An error that can occur within the Simon registry or its maintenance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimonError {
    /// The name is malformed (empty segment, illegal character) or cannot be
    /// used for the requested operation (e.g. the root).
    #[error("invalid simon name '{name}': {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The name is already bound to a different kind of measurement point.
    #[error("simon '{name}' is a {found}, not a {expected}")]
    TypeMismatch {
        /// The name that was looked up.
        name: String,
        /// The kind the caller asked for.
        expected: SimonKind,
        /// The kind already registered under the name.
        found: SimonKind,
    },
    /// A leaf-only removal targeted a node that still has children.
    #[error("node '{0}' has children and cannot be removed")]
    HasChildren(String),
    /// A lifecycle method was called out of order.
    #[error("illegal state: {0}")]
    IllegalState(String),
    /// A purge strategy failed during a tick.
    #[error("purge strategy failed: {0}")]
    StrategyFailure(String),
    /// The scheduler could not register a task.
    #[error("scheduling failed: {0}")]
    Schedule(String),
}

impl SimonError {
    /// Shorthand for [`SimonError::InvalidName`].
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SimonError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
