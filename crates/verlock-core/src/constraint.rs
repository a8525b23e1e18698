//! Version constraint parsing, matching, and intersection.
//!
//! A `VersionConstraint` is a conjunction of terms; each term is one of the
//! closed set of operators below. Caret follows the npm/Cargo narrowing for
//! the `^0.x.y` cases: `^0.2.3` pins the minor, `^0.0.3` pins the patch.
//! Pre-release versions participate in plain ordering; a term neither
//! includes nor excludes them beyond what the comparison says.

use std::fmt;
use std::str::FromStr;

use verlock_util::errors::{VerlockError, VerlockResult};

use crate::version::{Bound, Version, VersionRange};

/// A single constraint operator applied to a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintTerm {
    Exact(Version),
    NotEqual(Version),
    Greater(Version),
    GreaterEq(Version),
    Less(Version),
    LessEq(Version),
    /// `^X.Y.Z`: same major (narrowed per the module docs when `X == 0`),
    /// at least `X.Y.Z`.
    Caret(Version),
    /// `~X.Y.Z`: same major.minor, at least `X.Y.Z`.
    Tilde(Version),
    /// `*`, `X.*`, or `X.Y.*`.
    Wildcard {
        major: Option<u64>,
        minor: Option<u64>,
    },
}

impl ConstraintTerm {
    pub fn parse(text: &str) -> VerlockResult<Self> {
        let s = text.trim();
        if s.is_empty() {
            return Err(VerlockError::Parse {
                message: "empty constraint".to_string(),
            });
        }
        if s.contains('*') {
            return parse_wildcard(s);
        }
        if let Some(rest) = s.strip_prefix("==") {
            Ok(Self::Exact(Version::parse_lenient(rest)?))
        } else if let Some(rest) = s.strip_prefix("!=") {
            Ok(Self::NotEqual(Version::parse_lenient(rest)?))
        } else if let Some(rest) = s.strip_prefix(">=") {
            Ok(Self::GreaterEq(Version::parse_lenient(rest)?))
        } else if let Some(rest) = s.strip_prefix("<=") {
            Ok(Self::LessEq(Version::parse_lenient(rest)?))
        } else if let Some(rest) = s.strip_prefix('>') {
            Ok(Self::Greater(Version::parse_lenient(rest)?))
        } else if let Some(rest) = s.strip_prefix('<') {
            Ok(Self::Less(Version::parse_lenient(rest)?))
        } else if let Some(rest) = s.strip_prefix('^') {
            Ok(Self::Caret(Version::parse_lenient(rest)?))
        } else if let Some(rest) = s.strip_prefix('~') {
            Ok(Self::Tilde(Version::parse_lenient(rest)?))
        } else {
            // A bare version is an exact pin.
            Ok(Self::Exact(Version::parse_lenient(s)?))
        }
    }

    /// Pure predicate; total over well-formed versions.
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Exact(t) => version == t,
            Self::NotEqual(t) => version != t,
            Self::Greater(t) => version > t,
            Self::GreaterEq(t) => version >= t,
            Self::Less(t) => version < t,
            Self::LessEq(t) => version <= t,
            Self::Caret(t) => {
                if version < t {
                    return false;
                }
                if t.major > 0 {
                    version.major == t.major
                } else if t.minor > 0 {
                    version.major == 0 && version.minor == t.minor
                } else {
                    version.major == 0 && version.minor == 0 && version.patch == t.patch
                }
            }
            Self::Tilde(t) => {
                version.major == t.major && version.minor == t.minor && version >= t
            }
            Self::Wildcard { major, minor } => {
                major.map_or(true, |m| version.major == m)
                    && minor.map_or(true, |m| version.minor == m)
            }
        }
    }

    /// The interval this term accepts. `!=` and the full wildcard map to the
    /// unbounded range; the result over-approximates only for `!=`.
    pub fn range(&self) -> VersionRange {
        match self {
            Self::Exact(v) => VersionRange::exact(v.clone()),
            Self::NotEqual(_) => VersionRange::unbounded(),
            Self::Greater(v) => VersionRange {
                lower: Some(Bound {
                    version: v.clone(),
                    inclusive: false,
                }),
                upper: None,
            },
            Self::GreaterEq(v) => VersionRange {
                lower: Some(Bound {
                    version: v.clone(),
                    inclusive: true,
                }),
                upper: None,
            },
            Self::Less(v) => VersionRange {
                lower: None,
                upper: Some(Bound {
                    version: v.clone(),
                    inclusive: false,
                }),
            },
            Self::LessEq(v) => VersionRange {
                lower: None,
                upper: Some(Bound {
                    version: v.clone(),
                    inclusive: true,
                }),
            },
            Self::Caret(v) => {
                let upper = if v.major > 0 {
                    Version::new(v.major + 1, 0, 0)
                } else if v.minor > 0 {
                    Version::new(0, v.minor + 1, 0)
                } else {
                    Version::new(0, 0, v.patch + 1)
                };
                half_open(v.clone(), upper)
            }
            Self::Tilde(v) => half_open(v.clone(), Version::new(v.major, v.minor + 1, 0)),
            Self::Wildcard { major: None, .. } => VersionRange::unbounded(),
            Self::Wildcard {
                major: Some(m),
                minor: None,
            } => half_open(Version::new(*m, 0, 0), Version::new(m + 1, 0, 0)),
            Self::Wildcard {
                major: Some(m),
                minor: Some(n),
            } => half_open(Version::new(*m, *n, 0), Version::new(*m, n + 1, 0)),
        }
    }

    /// Whether no version can satisfy both terms. Range-based, so a `false`
    /// answer is not a proof of satisfiability.
    pub fn disjoint_with(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotEqual(a), Self::Exact(b)) | (Self::Exact(a), Self::NotEqual(b)) => a == b,
            (Self::NotEqual(_), _) | (_, Self::NotEqual(_)) => false,
            _ => !self.range().intersects(&other.range()),
        }
    }
}

fn half_open(lower: Version, upper: Version) -> VersionRange {
    VersionRange {
        lower: Some(Bound {
            version: lower,
            inclusive: true,
        }),
        upper: Some(Bound {
            version: upper,
            inclusive: false,
        }),
    }
}

fn parse_wildcard(s: &str) -> VerlockResult<ConstraintTerm> {
    let parts: Vec<&str> = s.split('.').collect();
    match parts.as_slice() {
        ["*"] => Ok(ConstraintTerm::Wildcard {
            major: None,
            minor: None,
        }),
        [major, "*"] => Ok(ConstraintTerm::Wildcard {
            major: Some(parse_segment(major, s)?),
            minor: None,
        }),
        [major, minor, "*"] => Ok(ConstraintTerm::Wildcard {
            major: Some(parse_segment(major, s)?),
            minor: Some(parse_segment(minor, s)?),
        }),
        _ => Err(VerlockError::Parse {
            message: format!("unsupported wildcard pattern `{s}`"),
        }),
    }
}

fn parse_segment(seg: &str, whole: &str) -> VerlockResult<u64> {
    seg.parse().map_err(|_| VerlockError::Parse {
        message: format!("non-numeric version segment `{seg}` in `{whole}`"),
    })
}

impl fmt::Display for ConstraintTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "=={v}"),
            Self::NotEqual(v) => write!(f, "!={v}"),
            Self::Greater(v) => write!(f, ">{v}"),
            Self::GreaterEq(v) => write!(f, ">={v}"),
            Self::Less(v) => write!(f, "<{v}"),
            Self::LessEq(v) => write!(f, "<={v}"),
            Self::Caret(v) => write!(f, "^{v}"),
            Self::Tilde(v) => write!(f, "~{v}"),
            Self::Wildcard {
                major: None,
                ..
            } => write!(f, "*"),
            Self::Wildcard {
                major: Some(m),
                minor: None,
            } => write!(f, "{m}.*"),
            Self::Wildcard {
                major: Some(m),
                minor: Some(n),
            } => write!(f, "{m}.{n}.*"),
        }
    }
}

/// A conjunction of constraint terms. Empty means "any version".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionConstraint {
    terms: Vec<ConstraintTerm>,
}

impl VersionConstraint {
    /// The constraint that accepts every version.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn from_term(term: ConstraintTerm) -> Self {
        Self { terms: vec![term] }
    }

    /// Parse a constraint expression. Comma-separated terms form a
    /// conjunction, e.g. `>=1.2, <2`.
    pub fn parse(text: &str) -> VerlockResult<Self> {
        if text.trim().is_empty() {
            return Err(VerlockError::Parse {
                message: "empty constraint".to_string(),
            });
        }
        let terms = text
            .split(',')
            .map(ConstraintTerm::parse)
            .collect::<VerlockResult<Vec<_>>>()?;
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[ConstraintTerm] {
        &self.terms
    }

    /// Pure predicate; total over well-formed versions.
    pub fn matches(&self, version: &Version) -> bool {
        self.terms.iter().all(|t| t.matches(version))
    }

    /// The conjunction of both constraints. Commutative and associative on
    /// the matched set; duplicate terms collapse.
    pub fn intersect(&self, other: &Self) -> Self {
        let mut terms = self.terms.clone();
        for term in &other.terms {
            if !terms.contains(term) {
                terms.push(term.clone());
            }
        }
        Self { terms }
    }

    /// Greatest candidate the conjunction accepts. `candidates` must already
    /// be sorted descending; the first match wins and no sorting happens
    /// here, so repeated calls during backtracking stay linear.
    pub fn highest_satisfying<'a>(&self, candidates: &'a [Version]) -> Option<&'a Version> {
        candidates.iter().find(|v| self.matches(v))
    }

    /// Whether the two conjunctions are provably unsatisfiable together
    /// (some pair of terms accepts disjoint ranges).
    pub fn disjoint(&self, other: &Self) -> bool {
        self.terms
            .iter()
            .any(|a| other.terms.iter().any(|b| a.disjoint_with(b)))
    }
}

impl FromStr for VersionConstraint {
    type Err = VerlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "*");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}
