//! Resolve selected location codes into the countries they stand for.
//!
//! A selected code is either a country (resolves to itself) or a region
//! (resolves to its member countries). Per-code results are folded with set
//! union, so overlapping regions never produce duplicates and re-expanding
//! an already expanded country list returns it unchanged.

use crate::error::FetchError;
use crate::models::{Location, Resolution};
use log::warn;
use std::collections::BTreeSet;

/// Answers "is this code a region, and who belongs to it?".
pub trait Resolver {
    fn resolve(&self, code: &str) -> Result<Resolution, FetchError>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, code: &str) -> Result<Resolution, FetchError> {
        (**self).resolve(code)
    }
}

/// Result of expanding a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// At least one selected code was a region.
    pub any_region: bool,
    pub names: BTreeSet<String>,
    pub codes: BTreeSet<String>,
    /// Codes kept best-effort: unknown to the catalog, or their lookup failed.
    pub unresolved: BTreeSet<String>,
}

impl Expansion {
    /// Sorted member names as a sentence, e.g. `"France, Germany."`.
    pub fn member_listing(&self) -> String {
        if self.names.is_empty() {
            return String::new();
        }
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        format!("{}.", names.join(", "))
    }

    pub fn codes_vec(&self) -> Vec<String> {
        self.codes.iter().cloned().collect()
    }

    fn union(mut self, other: Expansion) -> Self {
        self.any_region |= other.any_region;
        self.names.extend(other.names);
        self.codes.extend(other.codes);
        self.unresolved.extend(other.unresolved);
        self
    }

    fn single(code: String, name: String, resolved: bool) -> Self {
        let mut e = Expansion::default();
        if !resolved {
            e.unresolved.insert(code.clone());
        }
        e.names.insert(name);
        e.codes.insert(code);
        e
    }
}

/// Expand each selected code and union the results.
///
/// `locations` supplies display names for standalone codes. A code that is
/// neither a region nor a known location is kept under its own code and
/// reported in [`Expansion::unresolved`]; so is a code whose lookup failed.
pub fn expand<R, S>(resolver: &R, locations: &[Location], selected: &[S]) -> Expansion
where
    R: Resolver + ?Sized,
    S: AsRef<str>,
{
    let unique: BTreeSet<&str> = selected
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect();

    unique
        .into_iter()
        .map(|code| expand_one(resolver, locations, code))
        .fold(Expansion::default(), Expansion::union)
}

fn expand_one<R: Resolver + ?Sized>(resolver: &R, locations: &[Location], code: &str) -> Expansion {
    let known = locations.iter().find(|l| l.code.eq_ignore_ascii_case(code));
    let standalone = |resolved: bool| match known {
        Some(l) => Expansion::single(l.code.clone(), l.name.clone(), resolved),
        None => Expansion::single(code.to_string(), code.to_string(), false),
    };

    match resolver.resolve(code) {
        Ok(Resolution::Region { members, .. }) => {
            let mut e = Expansion {
                any_region: true,
                ..Expansion::default()
            };
            for m in members {
                e.names.insert(m.name);
                e.codes.insert(m.code);
            }
            e
        }
        Ok(Resolution::Standalone { .. }) => {
            if known.is_none() {
                warn!("code '{code}' is neither a known country nor a region");
            }
            standalone(true)
        }
        Err(err) => {
            warn!("could not resolve '{code}': {err}");
            standalone(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoRegions;

    impl Resolver for NoRegions {
        fn resolve(&self, code: &str) -> Result<Resolution, FetchError> {
            Ok(Resolution::Standalone { code: code.into() })
        }
    }

    #[test]
    fn empty_selection_is_empty() {
        let e = expand(&NoRegions, &[], &[] as &[&str]);
        assert_eq!(e, Expansion::default());
        assert_eq!(e.member_listing(), "");
    }

    #[test]
    fn unknown_standalone_code_is_flagged() {
        let locs = vec![Location { code: "FRA".into(), name: "France".into() }];
        let e = expand(&NoRegions, &locs, &["fra", "ZZZ"]);
        assert!(!e.any_region);
        assert_eq!(e.codes_vec(), ["FRA", "ZZZ"]);
        assert!(e.unresolved.contains("ZZZ"));
        assert!(!e.unresolved.contains("FRA"));
        assert_eq!(e.member_listing(), "France, ZZZ.");
    }
}
