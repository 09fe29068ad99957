//! Object naming.

use std::fmt;

use uuid::Uuid;

/// Storage key for an upload: `<original-filename>-<uuid>`.
///
/// The UUID is version 7, so names sort by creation time and two uploads of
/// the same file never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName(String);

impl ObjectName {
    /// Generates a fresh name for `filename`.
    #[must_use]
    pub fn generate(filename: &str) -> Self {
        Self::with_id(filename, Uuid::now_v7())
    }

    /// Builds the name for `filename` with a given ID.
    #[must_use]
    pub fn with_id(filename: &str, id: Uuid) -> Self {
        Self(format!("{filename}-{id}"))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
