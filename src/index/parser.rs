//! Grammar for one index line:
//!
//! ```text
//! <package_name> <version_int> : <dep_list>
//! <dep_list>   ::= ε | <dep> ("," <dep>)*
//! <dep>        ::= <package_name> <range>
//! <range>      ::= <int> | <int> ".." <int>
//! ```

use crate::package::VersionedPackage;
use crate::version::{Version, VersionRange};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {reason} (in {text:?})")]
pub struct ParseError {
    pub line: usize,
    pub text: String,
    pub reason: ParseErrorReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorReason {
    MissingColon,
    MissingVersion,
    InvalidVersion(String),
    MissingDependencyRange,
    InvalidRange(String),
}

impl fmt::Display for ParseErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColon => write!(f, "expected a ':' separating the package header from its dependency list"),
            Self::MissingVersion => write!(f, "expected '<package_name> <version>' before ':'"),
            Self::InvalidVersion(s) => write!(f, "'{s}' is not a non-negative integer version"),
            Self::MissingDependencyRange => write!(f, "expected '<package_name> <range>' for a dependency"),
            Self::InvalidRange(s) => write!(f, "'{s}' is not a valid version or version range"),
        }
    }
}

fn parse_version(line: usize, text: &str, s: &str) -> Result<Version, ParseError> {
    s.trim()
        .parse::<u32>()
        .map(Version::new)
        .map_err(|_| ParseError {
            line,
            text: text.to_string(),
            reason: ParseErrorReason::InvalidVersion(s.trim().to_string()),
        })
}

fn parse_range(line: usize, text: &str, s: &str) -> Result<VersionRange, ParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseError {
            line,
            text: text.to_string(),
            reason: ParseErrorReason::InvalidRange(s.to_string()),
        });
    }
    match s.split_once("..") {
        Some((start, end)) => {
            let start = parse_version(line, text, start)?;
            let end = parse_version(line, text, end)?;
            if end < start {
                return Err(ParseError {
                    line,
                    text: text.to_string(),
                    reason: ParseErrorReason::InvalidRange(s.to_string()),
                });
            }
            Ok(VersionRange::new(start, end))
        }
        None => Ok(VersionRange::single(parse_version(line, text, s)?)),
    }
}

fn parse_dependency(
    line: usize,
    text: &str,
    s: &str,
) -> Result<(String, VersionRange), ParseError> {
    let s = s.trim();
    let (name, range) = s.split_once(' ').ok_or_else(|| ParseError {
        line,
        text: text.to_string(),
        reason: ParseErrorReason::MissingDependencyRange,
    })?;
    let range = parse_range(line, text, range)?;
    Ok((name.trim().to_string(), range))
}

fn parse_dependency_list(
    line: usize,
    text: &str,
    s: &str,
) -> Result<Vec<(String, VersionRange)>, ParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|dep| parse_dependency(line, text, dep))
        .collect()
}

/// Parses one well-formed (non-empty, non-blank) index line.
pub fn parse_entry(
    line: usize,
    text: &str,
) -> Result<(VersionedPackage, Vec<(String, VersionRange)>), ParseError> {
    let (header, deps) = text.split_once(':').ok_or_else(|| ParseError {
        line,
        text: text.to_string(),
        reason: ParseErrorReason::MissingColon,
    })?;

    let header = header.trim();
    let (name, version) = header.split_once(' ').ok_or_else(|| ParseError {
        line,
        text: text.to_string(),
        reason: ParseErrorReason::MissingVersion,
    })?;
    let version = parse_version(line, text, version)?;
    let vp = VersionedPackage::new(name.trim(), version);

    let deps = parse_dependency_list(line, text, deps)?;
    Ok((vp, deps))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(a: u32, b: u32) -> VersionRange {
        VersionRange::new(Version::new(a), Version::new(b))
    }

    #[test]
    fn parses_the_requests_fixture() {
        let (vp, deps) =
            parse_entry(1, " requests 123:  beautifulsoup 1..10  , multiset 12").unwrap();
        assert_eq!(vp, VersionedPackage::new("requests", Version::new(123)));
        assert_eq!(
            deps,
            vec![
                ("beautifulsoup".to_string(), r(1, 10)),
                ("multiset".to_string(), VersionRange::single(Version::new(12))),
            ]
        );
    }

    #[test]
    fn empty_dependency_body_is_no_dependencies() {
        let (vp, deps) = parse_entry(1, "without_dependencies 123:").unwrap();
        assert_eq!(
            vp,
            VersionedPackage::new("without_dependencies", Version::new(123))
        );
        assert!(deps.is_empty());
    }

    #[test]
    fn missing_colon_is_a_parse_error() {
        let err = parse_entry(3, "a 1 b 2").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.reason, ParseErrorReason::MissingColon);
    }

    #[test]
    fn non_integer_version_is_a_parse_error() {
        let err = parse_entry(1, "a 1.2:").unwrap_err();
        assert!(matches!(err.reason, ParseErrorReason::InvalidVersion(_)));
    }

    #[test]
    fn backwards_range_is_a_parse_error() {
        let err = parse_entry(1, "a 1: b 10..1").unwrap_err();
        assert!(matches!(err.reason, ParseErrorReason::InvalidRange(_)));
    }
}
