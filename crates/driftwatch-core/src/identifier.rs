//! Resource identifiers parsed from report names
//!
//! A report is stored as `<resource>@<attribute>.json`: `resource` is the
//! owning project or organization and `attribute` the kind of records the
//! report holds (`firewalls`, `networks`, ...). The identifier is the only
//! thing that pairs a current report with its previous counterpart.

use crate::errors::DriftError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Reserved separator between the two identifier components
pub const SEPARATOR: char = '@';

/// `(resource, attribute)` pair identifying one report across generations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    pub resource: String,
    pub attribute: String,
}

impl ResourceId {
    pub fn new(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    /// Parse an identifier from a report path or file name
    ///
    /// Directories and the final extension are stripped first. The stem must
    /// contain exactly one `@` with a non-empty component on each side.
    ///
    /// # Errors
    ///
    /// Returns `DriftError::MalformedIdentifier` when the stem has no
    /// separator, more than one, or an empty component.
    pub fn parse(name: &str) -> Result<Self, DriftError> {
        let malformed = |reason: &str| DriftError::MalformedIdentifier {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| malformed("no file name"))?;

        let mut parts = stem.split(SEPARATOR);
        let (resource, attribute) = match (parts.next(), parts.next(), parts.next()) {
            (Some(resource), Some(attribute), None) => (resource, attribute),
            (_, _, Some(_)) => return Err(malformed("more than one '@' separator")),
            _ => return Err(malformed("missing '@' separator")),
        };

        if resource.is_empty() || attribute.is_empty() {
            return Err(malformed("empty component"));
        }

        Ok(Self::new(resource, attribute))
    }

    /// Canonical report file name for this identifier
    pub fn file_name(&self) -> String {
        format!("{}{}{}.json", self.resource, SEPARATOR, self.attribute)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.resource, SEPARATOR, self.attribute)
    }
}
