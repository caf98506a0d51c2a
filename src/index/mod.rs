//! Building `index: name → set⟨Version⟩` and `deps: VersionedPackage → (name → VersionSet)`
//! from index file text.

mod parser;

pub use parser::{ParseError, ParseErrorReason};

use crate::package::VersionedPackage;
use crate::version::{Version, VersionRange, VersionSet};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

/// How multiple ranges given for the same requirement within one entry combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// Successive ranges narrow the allowed set: the dependee must satisfy all of them.
    #[default]
    Intersection,
    /// Successive ranges widen the allowed set: the dependee need satisfy only one of them.
    Union,
}

impl CombineMode {
    fn combine(self, current: &VersionSet, next: &VersionRange) -> VersionSet {
        let next_set = VersionSet::from_ranges(vec![*next]);
        match self {
            Self::Intersection => current.intersection(&next_set),
            Self::Union => current.union(&next_set),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognized combine mode (expected 'intersection' or 'union')")]
pub struct InvalidMode(pub String);

impl FromStr for CombineMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "intersection" => Ok(Self::Intersection),
            "union" => Ok(Self::Union),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}

/// The catalog of all packages and their known versions.
#[derive(Debug, Clone, Default)]
pub struct Index {
    versions: HashMap<String, BTreeSet<Version>>,
}

impl Index {
    pub fn versions(&self, name: &str) -> Option<&BTreeSet<Version>> {
        self.versions.get(name)
    }

    pub fn contains(&self, vp: &VersionedPackage) -> bool {
        self.versions
            .get(&vp.name)
            .is_some_and(|vs| vs.contains(&vp.version))
    }

    pub fn latest(&self, name: &str) -> Option<Version> {
        self.versions.get(name).and_then(|vs| vs.iter().next_back().copied())
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.versions.keys().map(String::as_str)
    }

    fn add(&mut self, name: &str, version: Version) -> bool {
        self.versions
            .entry(name.to_string())
            .or_default()
            .insert(version)
    }
}

/// `VersionedPackage -> (requirement name -> acceptable VersionSet)`.
pub type Dependencies = HashMap<VersionedPackage, HashMap<String, VersionSet>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("line {line}: package '{name}' version {version} is declared more than once")]
    Duplicate {
        line: usize,
        name: String,
        version: Version,
    },
}

/// Parses an entire index file and builds the normalized `Index`/`Dependencies` pair.
///
/// Blank lines (after trimming) are skipped rather than rejected, so a trailing newline at
/// end of file doesn't make every caller pre-filter its input.
pub fn load(text: &str, combine: CombineMode) -> Result<(Index, Dependencies), LoadError> {
    let mut index = Index::default();
    let mut deps: Dependencies = HashMap::new();

    for (offset, raw_line) in text.lines().enumerate() {
        let line_number = offset + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (vp, requirements) = parser::parse_entry(line_number, trimmed)?;

        if !index.add(&vp.name, vp.version) {
            return Err(LoadError::Duplicate {
                line: line_number,
                name: vp.name,
                version: vp.version,
            });
        }

        let entry = deps.entry(vp).or_default();
        for (req_name, range) in requirements {
            entry
                .entry(req_name)
                .and_modify(|set| *set = combine.combine(set, &range))
                .or_insert_with(|| VersionSet::from_ranges(vec![range]));
        }
    }

    Ok((index, deps))
}
