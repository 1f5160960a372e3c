#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Clean,
    Dirty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateStats {
    /// Writes seen since the gate was created
    pub writes: u64,
    /// Commits handed out since the gate was created
    pub commits: u64,
    /// Writes folded into the commit currently owed
    pub pending_writes: u32,
}

/// Per-frame coalescing of camera writes
///
/// Any number of pose writes between two frames collapse into one commit.
/// The gate owns the dirty flag; nothing else can observe or clear it except
/// through [`FrameInvalidationGate::take_and_clear`].
#[derive(Debug)]
pub struct FrameInvalidationGate {
    state: GateState,
    stats: GateStats,
}

impl FrameInvalidationGate {
    /// Starts dirty so the first frame pushes the initial pose
    pub fn new() -> Self {
        Self {
            state: GateState::Dirty,
            stats: GateStats::default(),
        }
    }

    pub fn mark_dirty(&mut self) {
        self.state = GateState::Dirty;
        self.stats.writes += 1;
        self.stats.pending_writes = self.stats.pending_writes.saturating_add(1);
    }

    /// Returns `true` once per dirty period and leaves the gate clean
    pub fn take_and_clear(&mut self) -> bool {
        match self.state {
            GateState::Clean => false,
            GateState::Dirty => {
                self.state = GateState::Clean;
                self.stats.commits += 1;
                self.stats.pending_writes = 0;
                true
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state == GateState::Dirty
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn stats(&self) -> GateStats {
        self.stats
    }
}

impl Default for FrameInvalidationGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_many_writes_one_commit() {
        let mut gate = FrameInvalidationGate::new();
        assert!(gate.take_and_clear());

        for n in [1usize, 2, 17] {
            for _ in 0..n {
                gate.mark_dirty();
            }
            assert_eq!(gate.stats().pending_writes as usize, n);
            assert!(gate.take_and_clear());
            assert!(!gate.take_and_clear());
        }

        assert_eq!(gate.stats().commits, 4);
        assert_eq!(gate.stats().writes, 20);
    }

    #[test]
    fn test_clean_gate_stays_clean() {
        let mut gate = FrameInvalidationGate::new();
        gate.take_and_clear();
        assert_eq!(gate.state(), GateState::Clean);
        for _ in 0..5 {
            assert!(!gate.take_and_clear());
        }
        assert_eq!(gate.stats().commits, 1);
    }
}
