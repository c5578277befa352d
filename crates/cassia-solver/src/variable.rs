use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_VARIABLE_ID: AtomicUsize = AtomicUsize::new(1);

/// A handle to an unknown the solver can assign a value to.
///
/// Variables compare by identity: every call to [`Variable::new`] yields a
/// distinct variable, and copies of a handle refer to the same one. The solved
/// value is owned by the [`Solver`](crate::Solver) and read back with
/// [`Solver::get_value`](crate::Solver::get_value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Variable(usize);

impl Variable {
    pub fn new() -> Self {
        Self(NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The process-wide unique id of this variable
    pub fn id(&self) -> usize {
        self.0
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new()
    }
}
