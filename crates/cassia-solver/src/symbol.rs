use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The role a tableau column plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SymbolKind {
    Invalid,
    /// A user variable
    External,
    /// Turns an inequality into an equation
    Slack,
    /// Absorbs the violation of a non-required constraint
    Error,
    /// Marks a required equality; never pivoted on
    Dummy,
}

/// An internal tableau column.
///
/// Identity is the id alone: two symbols with the same id are the same column
/// regardless of kind. Ordering by id gives the solver a deterministic
/// iteration order over rows and cells.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Symbol {
    id: u64,
    kind: SymbolKind,
}

impl Symbol {
    pub(crate) fn new(id: u64, kind: SymbolKind) -> Self {
        Self { id, kind }
    }

    pub(crate) fn invalid() -> Self {
        Self {
            id: 0,
            kind: SymbolKind::Invalid,
        }
    }

    pub(crate) fn is_invalid(&self) -> bool {
        self.kind == SymbolKind::Invalid
    }

    pub(crate) fn is_external(&self) -> bool {
        self.kind == SymbolKind::External
    }

    pub(crate) fn is_error(&self) -> bool {
        self.kind == SymbolKind::Error
    }

    pub(crate) fn is_dummy(&self) -> bool {
        self.kind == SymbolKind::Dummy
    }

    /// Slack and error symbols are the only ones the insertion algorithm may
    /// pivot into the basis on its own.
    pub(crate) fn is_pivotable(&self) -> bool {
        matches!(self.kind, SymbolKind::Slack | SymbolKind::Error)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            SymbolKind::Invalid => 'i',
            SymbolKind::External => 'v',
            SymbolKind::Slack => 's',
            SymbolKind::Error => 'e',
            SymbolKind::Dummy => 'd',
        };
        write!(f, "{}{}", prefix, self.id)
    }
}
