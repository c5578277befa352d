use indexmap::IndexSet;

use crate::variable::Variable;

/// Variables touched since the last fetch, double buffered.
///
/// Writes land in the recording buffer. Closing a generation swaps the
/// buffers, so the set handed to the reader is never written to while it is
/// being read, and anything flagged afterwards goes to the next generation.
#[derive(Debug, Default)]
pub(crate) struct ChangeLog {
    generation: u64,
    recording: IndexSet<Variable>,
    closed: IndexSet<Variable>,
}

impl ChangeLog {
    pub(crate) fn mark(&mut self, variable: Variable) {
        self.recording.insert(variable);
    }

    /// Close the current generation and return the variables flagged during it,
    /// in the order they were first flagged.
    pub(crate) fn close_generation(&mut self) -> Vec<Variable> {
        self.closed.clear();
        std::mem::swap(&mut self.recording, &mut self.closed);
        self.generation += 1;
        self.closed.iter().copied().collect()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn pending(&self) -> usize {
        self.recording.len()
    }
}
