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

//! Hierarchical, dot-separated Simon names.
//!
//! A name is a sequence of non-empty segments joined by [`SEPARATOR`]. The empty
//! string is the root of the hierarchy. Every non-root name is its parent's
//! name extended by exactly one segment.

use crate::error::{SimonError, SimonResult};
use std::fmt::{self, Display};

/// The separator between name segments.
pub const SEPARATOR: char = '.';

/// Characters allowed in a segment besides ASCII alphanumerics.
const EXTRA_CHARS: &[char] = &['-', '_', '[', ']', ',', '@', '$', '%', '(', ')', '<', '>'];

/// A validated Simon name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SimonName(String);

impl SimonName {
    /// The root name (empty string).
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parses and validates a name. The empty string yields the root.
    pub fn parse(name: &str) -> SimonResult<Self> {
        validate(name)?;
        Ok(Self(name.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the root name.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the segments; the root has none.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments (0 for the root).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The last segment, or `""` for the root.
    pub fn local(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or("")
    }

    /// The parent name. The root has no parent; a single-segment name has the root.
    pub fn parent(&self) -> Option<SimonName> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(SEPARATOR) {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Extends this name by one segment.
    pub fn child(&self, segment: &str) -> SimonResult<SimonName> {
        let full = if self.is_root() {
            segment.to_string()
        } else {
            format!("{}{}{}", self.0, SEPARATOR, segment)
        };
        if segment.is_empty() || segment.contains(SEPARATOR) {
            return Err(SimonError::invalid_name(full, "child must be exactly one segment"));
        }
        validate(&full)?;
        Ok(Self(full))
    }

    /// Every non-root prefix of this name, shortest first, ending with the name itself.
    ///
    /// `"a.b.c"` yields `["a", "a.b", "a.b.c"]`.
    pub fn prefixes(&self) -> Vec<&str> {
        let mut prefixes = Vec::with_capacity(self.depth());
        for (idx, ch) in self.0.char_indices() {
            if ch == SEPARATOR {
                prefixes.push(&self.0[..idx]);
            }
        }
        if !self.is_root() {
            prefixes.push(self.0.as_str());
        }
        prefixes
    }
}

impl Display for SimonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SimonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validates a raw name without allocating.
pub fn validate(name: &str) -> SimonResult<()> {
    if name.is_empty() {
        return Ok(());
    }
    for segment in name.split(SEPARATOR) {
        if segment.is_empty() {
            return Err(SimonError::invalid_name(name, "empty segment"));
        }
        if let Some(bad) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || EXTRA_CHARS.contains(c)))
        {
            return Err(SimonError::invalid_name(
                name,
                format!("illegal character '{bad}'"),
            ));
        }
    }
    Ok(())
}
