//! Consistency warnings raised while analysing a program.
//!
//! A warning never stops the analysis. Each distinct warning is logged once,
//! when it is first raised, and kept for the caller.

use crate::il;
use log::warn;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum WarningKind {
    /// An operand which should already be tracked was not.
    UntrackedOperand,
    /// A store of an untracked pointer.
    UntrackedStoreSource,
    /// An aggregate pointer with more than one pointee.
    AmbiguousAggregate,
    /// A call was not followed into its callee.
    CallNotFollowed,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            WarningKind::UntrackedOperand => write!(f, "untracked operand"),
            WarningKind::UntrackedStoreSource => write!(f, "untracked store source"),
            WarningKind::AmbiguousAggregate => write!(f, "ambiguous aggregate"),
            WarningKind::CallNotFollowed => write!(f, "call not followed"),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Warning {
    kind: WarningKind,
    location: Option<il::ProgramLocation>,
    message: String,
}

impl Warning {
    pub fn kind(&self) -> WarningKind {
        self.kind
    }

    /// The instruction which raised this warning. Warnings raised while
    /// merging states have no location.
    pub fn location(&self) -> Option<il::ProgramLocation> {
        self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} at {}: {}", self.kind, location, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Diagnostics {
    warnings: BTreeSet<Warning>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    /// Record a warning.
    pub fn warn(
        &mut self,
        kind: WarningKind,
        location: Option<il::ProgramLocation>,
        message: String,
    ) {
        let warning = Warning {
            kind,
            location,
            message,
        };
        if !self.warnings.contains(&warning) {
            warn!("{}", warning);
            self.warnings.insert(warning);
        }
    }

    /// The number of distinct warnings of the given kind.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings
            .iter()
            .filter(|warning| warning.kind == kind)
            .count()
    }

    pub fn warnings(&self) -> &BTreeSet<Warning> {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "{}", warning)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_are_deduplicated() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(WarningKind::UntrackedOperand, None, "p".to_string());
        diagnostics.warn(WarningKind::UntrackedOperand, None, "p".to_string());
        diagnostics.warn(WarningKind::UntrackedOperand, None, "q".to_string());

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.count(WarningKind::UntrackedOperand), 2);
        assert_eq!(diagnostics.count(WarningKind::AmbiguousAggregate), 0);
    }
}
