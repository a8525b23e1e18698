//! Lock document: the reproducible record of a successful resolution.
//!
//! The on-disk form is JSON with a `resolution_version` compatibility tag.
//! Packages are sorted by name so that identical resolutions encode to
//! byte-identical documents.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use verlock_util::errors::{VerlockError, VerlockResult};
use verlock_util::hash::sha256_str;

use crate::version::Version;

/// Format revision this build reads and writes.
pub const RESOLUTION_VERSION: u32 = 1;

/// A fully-resolved lock document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDocument {
    pub resolution_version: u32,
    #[serde(default)]
    pub packages: Vec<LockEntry>,
}

/// One locked package: exact version plus the exact versions of its direct
/// dependencies. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub name: String,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, Version>,
}

impl LockEntry {
    /// Canonical line hashed into `checksum`: name, version, then each
    /// dependency as `name=version` in name order.
    pub fn content_line(&self) -> String {
        let mut line = format!("{} {}", self.name, self.version);
        for (dep, version) in &self.dependencies {
            line.push_str(&format!(" {dep}={version}"));
        }
        line
    }

    pub fn compute_checksum(&self) -> String {
        sha256_str(&self.content_line())
    }
}

impl LockDocument {
    /// Build a document at the current format revision. Entries are sorted
    /// by package name.
    pub fn new(mut packages: Vec<LockEntry>) -> Self {
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            resolution_version: RESOLUTION_VERSION,
            packages,
        }
    }

    pub fn entry(&self, name: &str) -> Option<&LockEntry> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Serialize to the canonical pretty-printed JSON form.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a lock document.
    ///
    /// The compatibility tag is checked before the rest of the schema so a
    /// document from a newer format revision fails with
    /// `UnsupportedLockVersion` rather than a parse error.
    pub fn decode(text: &str) -> VerlockResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| VerlockError::MalformedLockFile {
                message: e.to_string(),
            })?;

        let found = value
            .get("resolution_version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| VerlockError::MalformedLockFile {
                message: "missing or non-integer `resolution_version`".to_string(),
            })?;
        if found != u64::from(RESOLUTION_VERSION) {
            return Err(VerlockError::UnsupportedLockVersion {
                found: found.try_into().unwrap_or(u32::MAX),
                expected: RESOLUTION_VERSION,
            });
        }

        let doc: LockDocument =
            serde_json::from_value(value).map_err(|e| VerlockError::MalformedLockFile {
                message: e.to_string(),
            })?;

        for pair in doc.packages.windows(2) {
            if pair[0].name >= pair[1].name {
                return Err(VerlockError::MalformedLockFile {
                    message: format!(
                        "packages not sorted by name: `{}` before `{}`",
                        pair[0].name, pair[1].name
                    ),
                });
            }
        }

        Ok(doc)
    }

    /// Load a lock document from disk.
    pub fn from_path(path: &Path) -> VerlockResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::decode(&text)
    }

    /// Write the encoded document to disk with a trailing newline.
    pub fn write_path(&self, path: &Path) -> VerlockResult<()> {
        let mut text = self.encode().map_err(|e| VerlockError::MalformedLockFile {
            message: e.to_string(),
        })?;
        text.push('\n');
        std::fs::write(path, text)?;
        Ok(())
    }
}
