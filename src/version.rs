//! Version algebra: single integers, closed ranges of them, and disjoint sets of ranges.

use std::fmt;

/// A non-negative integer tag identifying one release of a package.
///
/// Versions are totally ordered by the wrapped integer; there is no multi-component
/// semantic versioning here (see the crate's non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u32);

impl Version {
    pub fn new(v: u32) -> Self {
        Self(v)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Version {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// A closed, non-empty interval `[start, end]` of versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    start: Version,
    end: Version,
}

impl VersionRange {
    /// Builds a range from `start` to `end`, inclusive.
    ///
    /// # Panics
    /// Panics if `end < start` — a caller asking for an empty or backwards range has a bug,
    /// not bad input (malformed index lines are rejected earlier, during parsing).
    pub fn new(start: Version, end: Version) -> Self {
        assert!(end >= start, "VersionRange end {end} is before start {start}");
        Self { start, end }
    }

    /// A range containing exactly one version.
    pub fn single(v: Version) -> Self {
        Self { start: v, end: v }
    }

    pub fn start(&self) -> Version {
        self.start
    }

    pub fn end(&self) -> Version {
        self.end
    }

    pub fn contains(&self, v: Version) -> bool {
        self.start <= v && v <= self.end
    }

    /// Two ranges touch or overlap when neither ends strictly before the other begins.
    fn touches(&self, other: &Self) -> bool {
        !(self.end < other.start) && !(other.end < self.start)
    }

    /// Merges two touching or overlapping ranges into their span.
    ///
    /// # Panics
    /// Panics if the ranges are disjoint (neither touch nor overlap) — callers are expected
    /// to check [`VersionRange::touches`] first, which is exactly what [`VersionSet`]'s sweep does.
    pub fn union(&self, other: &Self) -> Self {
        assert!(
            self.touches(other),
            "cannot union disjoint ranges {self} and {other}"
        );
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// A finite union of pairwise-disjoint, non-touching `VersionRange`s, sorted by start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionSet {
    ranges: Vec<VersionRange>,
}

impl VersionSet {
    pub fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[VersionRange] {
        &self.ranges
    }

    /// Builds a normalized set from an arbitrary (possibly overlapping, unsorted) multiset
    /// of ranges by sorting on start and sweeping, merging as we go.
    pub fn from_ranges(mut ranges: Vec<VersionRange>) -> Self {
        if ranges.is_empty() {
            return Self::empty();
        }

        ranges.sort_by_key(|r| r.start());

        let mut merged = Vec::new();
        let mut current = ranges[0];
        for r in ranges.into_iter().skip(1) {
            if current.touches(&r) {
                current = current.union(&r);
            } else {
                merged.push(current);
                current = r;
            }
        }
        merged.push(current);

        Self { ranges: merged }
    }

    pub fn contains(&self, v: Version) -> bool {
        self.ranges.iter().any(|r| r.contains(v))
    }

    /// Sort-merge union over the two already-disjoint sequences.
    pub fn union(&self, other: &Self) -> Self {
        let mut all = self.ranges.clone();
        all.extend(other.ranges.iter().copied());
        Self::from_ranges(all)
    }

    /// Two-pointer sweep intersection: advance whichever range ends first, emitting the
    /// overlap whenever the current pair overlaps.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < self.ranges.len() && j < other.ranges.len() {
            let left = self.ranges[i];
            let right = other.ranges[j];

            if left.end() < right.start() {
                i += 1;
                continue;
            }
            if right.end() < left.start() {
                j += 1;
                continue;
            }

            let overlap_start = left.start().max(right.start());
            if left.end() < right.end() {
                result.push(VersionRange::new(overlap_start, left.end()));
                i += 1;
            } else {
                result.push(VersionRange::new(overlap_start, right.end()));
                j += 1;
            }
        }

        // `result` is already sorted and disjoint by construction of the sweep, but we run it
        // through the normalizing constructor anyway to keep a single source of truth for the
        // invariant rather than asserting it held here.
        Self::from_ranges(result)
    }

    /// Returns the subset of `versions` that is a member of this set.
    pub fn pick<'a, I>(&self, versions: I) -> Vec<Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        versions
            .into_iter()
            .copied()
            .filter(|v| self.contains(*v))
            .collect()
    }
}

impl fmt::Display for VersionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", parts.join("∪"))
    }
}
