//! Ordered find/replace table
//!
//! [`SubstitutionTable`] holds literal `from → to` pairs and applies them in
//! insertion order. Matching is plain substring matching with no knowledge of
//! the target language's tokens.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A single literal substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Pattern to find
    pub from: String,
    /// Text to put in its place
    pub to: String,
}

impl Replacement {
    /// Create new replacement
    #[inline]
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Ordered mapping from literal pattern to literal replacement
///
/// Re-inserting an existing pattern keeps its original position and replaces
/// its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    entries: IndexMap<String, String>,
}

impl SubstitutionTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update an entry, returning the previous replacement if any
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) -> Option<String> {
        let from = from.into();
        let to = to.into();
        let previous = self.entries.insert(from.clone(), to);
        if let Some(old) = &previous {
            tracing::warn!("Pattern '{}' listed twice, '{}' replaced", from, old);
        }
        previous
    }

    /// Builder-style insert
    #[inline]
    #[must_use]
    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.insert(from, to);
        self
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if table has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the replacement for a pattern
    #[inline]
    #[must_use]
    pub fn get(&self, from: &str) -> Option<&str> {
        self.entries.get(from).map(String::as_str)
    }

    /// Iterate entries in application order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate patterns in application order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries as owned [`Replacement`] values
    #[must_use]
    pub fn to_replacements(&self) -> Vec<Replacement> {
        self.iter().map(|(from, to)| Replacement::new(from, to)).collect()
    }

    /// Apply every entry in order, returning the new text and the total
    /// number of substitutions made
    ///
    /// Each entry operates on the output of the previous one. Empty patterns
    /// are ignored.
    #[must_use]
    pub fn apply(&self, text: &str) -> (String, usize) {
        let mut out = text.to_string();
        let mut total = 0;
        for (from, to) in self.iter() {
            if from.is_empty() {
                continue;
            }
            let hits = out.matches(from).count();
            if hits > 0 {
                out = out.replace(from, to);
                total += hits;
            }
        }
        (out, total)
    }

    /// Pairs of entries whose relative order affects the result
    ///
    /// An empty result means every entry acts on text no other entry
    /// produces or consumes.
    #[must_use]
    pub fn chain_hazards(&self) -> Vec<ChainHazard> {
        let entries: Vec<(&str, &str)> = self.iter().collect();
        let mut hazards = Vec::new();

        for (i, (from_i, to_i)) in entries.iter().enumerate() {
            for (j, (from_j, to_j)) in entries.iter().enumerate().skip(i + 1) {
                if from_i.is_empty() || from_j.is_empty() {
                    continue;
                }
                let mut push = |kind| {
                    hazards.push(ChainHazard {
                        earlier: i,
                        later: j,
                        kind,
                    });
                };
                if to_i.contains(from_j) {
                    push(HazardKind::Feeds);
                }
                if from_j.contains(from_i) {
                    push(HazardKind::Shadowed);
                }
                if to_j.contains(from_i) {
                    push(HazardKind::Reintroduces);
                }
            }
        }
        hazards
    }
}

impl<F, T> FromIterator<(F, T)> for SubstitutionTable
where
    F: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, T)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (from, to) in iter {
            table.insert(from, to);
        }
        table
    }
}

impl From<Vec<Replacement>> for SubstitutionTable {
    fn from(replacements: Vec<Replacement>) -> Self {
        replacements.into_iter().map(|r| (r.from, r.to)).collect()
    }
}

impl Serialize for SubstitutionTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_replacements().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SubstitutionTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<Replacement>::deserialize(deserializer).map(Self::from)
    }
}

/// How two table entries interact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    /// The earlier replacement produces text the later pattern matches
    Feeds,
    /// The later pattern contains the earlier one, so its matches are
    /// rewritten before it gets a chance
    Shadowed,
    /// The later replacement produces text the earlier pattern would match
    Reintroduces,
}

/// Order-sensitive pair of entries, by position in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainHazard {
    /// Index of the entry applied first
    pub earlier: usize,
    /// Index of the entry applied second
    pub later: usize,
    /// Interaction
    pub kind: HazardKind,
}

impl Display for ChainHazard {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            HazardKind::Feeds => "feeds",
            HazardKind::Shadowed => "is shadowed by",
            HazardKind::Reintroduces => "is reintroduced by",
        };
        write!(f, "entry #{} {} entry #{}", self.earlier, what, self.later)
    }
}
