//! Semantic version parsing, total ordering, and version ranges.
//!
//! Ordering follows SemVer precedence: the numeric triple compares first,
//! and a pre-release sorts below the release with the same triple.
//! Pre-release identifiers compare dot-segment-wise, numeric segments as
//! numbers (ordered before alphanumeric ones), alphanumeric segments
//! lexically, and a shorter identifier list below a longer one it prefixes.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use verlock_util::errors::{VerlockError, VerlockResult};

/// A parsed semantic version. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Pre-release identifiers joined by `.`, e.g. `beta.2`.
    pub pre: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    /// Parse a full `MAJOR.MINOR.PATCH[-PRE]` version.
    pub fn parse(text: &str) -> VerlockResult<Self> {
        Self::parse_inner(text, false)
    }

    /// Parse a version with trailing segments omitted (`1` and `1.2` pad the
    /// missing positions with zero). Used when reading constraint
    /// expressions, where partial versions are conventional.
    pub fn parse_lenient(text: &str) -> VerlockResult<Self> {
        Self::parse_inner(text, true)
    }

    fn parse_inner(text: &str, lenient: bool) -> VerlockResult<Self> {
        let s = text.trim();
        if s.is_empty() {
            return Err(VerlockError::Parse {
                message: "empty version".to_string(),
            });
        }

        let (head, pre) = match s.split_once('-') {
            Some((head, pre)) => (head, Some(pre)),
            None => (s, None),
        };

        let segments: Vec<&str> = head.split('.').collect();
        if segments.len() > 3 || (!lenient && segments.len() != 3) {
            return Err(VerlockError::Parse {
                message: format!("expected MAJOR.MINOR.PATCH, got `{text}`"),
            });
        }

        let mut numbers = [0u64; 3];
        for (i, seg) in segments.iter().enumerate() {
            numbers[i] = seg.parse().map_err(|_| VerlockError::Parse {
                message: format!("non-numeric version segment `{seg}` in `{text}`"),
            })?;
        }

        let pre = match pre {
            Some(p) if p.is_empty() || p.split('.').any(|id| id.is_empty()) => {
                return Err(VerlockError::Parse {
                    message: format!("empty pre-release identifier in `{text}`"),
                });
            }
            Some(p) => Some(p.to_string()),
            None => None,
        };

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre.is_some()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VerlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| compare_pre(self.pre.as_deref(), other.pre.as_deref()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn compare_pre(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        // Pre-release sorts below the plain release.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(a), Some(b)) => compare_pre_segments(a, b),
    }
}

fn compare_pre_segments(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = compare_pre_identifiers(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_pre_identifiers(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        // Tie-break numerically-equal identifiers lexically so the ordering
        // stays consistent with field equality (`2` vs `02`).
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// A contiguous version interval, used for the analytic disjointness check
/// between constraint terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl VersionRange {
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    pub fn exact(version: Version) -> Self {
        Self {
            lower: Some(Bound {
                version: version.clone(),
                inclusive: true,
            }),
            upper: Some(Bound {
                version,
                inclusive: true,
            }),
        }
    }

    /// Check if a version falls inside this range.
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(ref lower) = self.lower {
            let cmp = version.cmp(&lower.version);
            if lower.inclusive {
                if cmp == Ordering::Less {
                    return false;
                }
            } else if cmp != Ordering::Greater {
                return false;
            }
        }
        if let Some(ref upper) = self.upper {
            let cmp = version.cmp(&upper.version);
            if upper.inclusive {
                if cmp == Ordering::Greater {
                    return false;
                }
            } else if cmp != Ordering::Less {
                return false;
            }
        }
        true
    }

    /// Whether two ranges share at least one version.
    pub fn intersects(&self, other: &Self) -> bool {
        if let (Some(upper), Some(lower)) = (&self.upper, &other.lower) {
            if bounds_disjoint(upper, lower) {
                return false;
            }
        }
        if let (Some(upper), Some(lower)) = (&other.upper, &self.lower) {
            if bounds_disjoint(upper, lower) {
                return false;
            }
        }
        true
    }
}

fn bounds_disjoint(upper: &Bound, lower: &Bound) -> bool {
    match upper.version.cmp(&lower.version) {
        Ordering::Less => true,
        Ordering::Equal => !(upper.inclusive && lower.inclusive),
        Ordering::Greater => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn basic_ordering() {
        assert!(v("1.0.0") < v("2.0.0"));
        assert!(v("1.0.0") < v("1.0.1"));
        assert!(v("1.0.1") < v("1.1.0"));
    }

    #[test]
    fn pre_release_below_release() {
        assert!(v("1.0.0-alpha") < v("1.0.0"));
        assert!(v("1.0.0") < v("1.0.1-alpha"));
    }

    #[test]
    fn pre_release_precedence() {
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.1") < v("1.0.0-alpha.beta"));
        assert!(v("1.0.0-alpha.beta") < v("1.0.0-beta"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11"));
        assert!(v("1.0.0-rc.1") < v("1.0.0"));
    }

    #[test]
    fn display_round_trip() {
        for s in ["1.2.3", "0.1.0", "1.0.0-beta.2"] {
            assert_eq!(v(s).to_string(), s);
        }
    }

    #[test]
    fn strict_parse_requires_triple() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
    }

    #[test]
    fn lenient_parse_pads_zeros() {
        assert_eq!(Version::parse_lenient("1").unwrap(), v("1.0.0"));
        assert_eq!(Version::parse_lenient("1.2").unwrap(), v("1.2.0"));
        assert_eq!(
            Version::parse_lenient("1-beta").unwrap(),
            v("1.0.0-beta")
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("a.b.c").is_err());
        assert!(Version::parse("1.2.x").is_err());
        assert!(Version::parse("1.2.3-").is_err());
        assert!(Version::parse("1.2.3-a..b").is_err());
    }

    #[test]
    fn range_contains() {
        let range = VersionRange {
            lower: Some(Bound {
                version: v("1.0.0"),
                inclusive: true,
            }),
            upper: Some(Bound {
                version: v("2.0.0"),
                inclusive: false,
            }),
        };
        assert!(range.contains(&v("1.0.0")));
        assert!(range.contains(&v("1.9.9")));
        assert!(!range.contains(&v("2.0.0")));
        assert!(!range.contains(&v("0.9.0")));
    }

    #[test]
    fn range_intersection() {
        let a = VersionRange {
            lower: Some(Bound {
                version: v("1.0.0"),
                inclusive: true,
            }),
            upper: Some(Bound {
                version: v("2.0.0"),
                inclusive: false,
            }),
        };
        let b = VersionRange {
            lower: Some(Bound {
                version: v("2.0.0"),
                inclusive: true,
            }),
            upper: None,
        };
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));

        let c = VersionRange {
            lower: Some(Bound {
                version: v("1.5.0"),
                inclusive: true,
            }),
            upper: None,
        };
        assert!(a.intersects(&c));
    }

    #[test]
    fn touching_inclusive_bounds_intersect() {
        let le = VersionRange {
            lower: None,
            upper: Some(Bound {
                version: v("2.0.0"),
                inclusive: true,
            }),
        };
        let ge = VersionRange {
            lower: Some(Bound {
                version: v("2.0.0"),
                inclusive: true,
            }),
            upper: None,
        };
        assert!(le.intersects(&ge));
    }

    #[test]
    fn serde_as_string() {
        let version = v("1.2.3-rc.1");
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"1.2.3-rc.1\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);
    }
}
