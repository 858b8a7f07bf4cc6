use crate::il;
use serde::Serialize;
use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;

/// A call instruction, identified by its location in the program.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CallSite {
    location: il::ProgramLocation,
    line: Option<u32>,
}

impl CallSite {
    pub fn new(location: il::ProgramLocation, line: Option<u32>) -> CallSite {
        CallSite { location, line }
    }

    pub fn location(&self) -> il::ProgramLocation {
        self.location
    }

    /// The source line of the call, if known.
    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}", line),
            None => write!(f, "{}", self.location),
        }
    }
}

/// The names of the functions each call site may invoke.
///
/// Entries only ever grow over a run of the analysis.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CallSiteRecord {
    sites: BTreeMap<CallSite, BTreeSet<String>>,
}

impl CallSiteRecord {
    pub fn new() -> CallSiteRecord {
        CallSiteRecord::default()
    }

    /// Add `names` to the candidates of `site`. Returns true if the record
    /// grew.
    pub fn insert<I>(&mut self, site: CallSite, names: I) -> bool
    where
        I: IntoIterator<Item = String>,
    {
        let entry = self.sites.entry(site).or_default();
        let before = entry.len();
        entry.extend(names);
        entry.len() != before
    }

    pub fn get(&self, site: &CallSite) -> Option<&BTreeSet<String>> {
        self.sites.get(site)
    }

    /// The candidates of the first call site at the given source line.
    pub fn line(&self, line: u32) -> Option<&BTreeSet<String>> {
        self.sites
            .iter()
            .find(|(site, _)| site.line() == Some(line))
            .map(|(_, names)| names)
    }

    /// The candidates of the call site at `location`.
    pub fn location(&self, location: il::ProgramLocation) -> Option<&BTreeSet<String>> {
        self.sites
            .iter()
            .find(|(site, _)| site.location() == location)
            .map(|(_, names)| names)
    }

    pub fn iter(&self) -> btree_map::Iter<CallSite, BTreeSet<String>> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl fmt::Display for CallSiteRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (site, names) in &self.sites {
            writeln!(
                f,
                "{} : {}",
                site,
                names.iter().cloned().collect::<Vec<String>>().join(", ")
            )?;
        }
        Ok(())
    }
}
