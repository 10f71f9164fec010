/// One-shot latch for the "all 100 claimed" celebration.
///
/// The celebration starts on the transition into the full state and plays
/// until the renderer reports it finished. The latch re-arms only when the
/// count is below 100 and nothing is playing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CelebrationLatch {
    showing: bool,
    celebrated: bool,
}

impl CelebrationLatch {
    /// Latch primed for a restored count, so a set that was already full
    /// when loaded does not celebrate again.
    pub fn primed(count: usize) -> Self {
        Self {
            showing: false,
            celebrated: count == super::TOTAL,
        }
    }

    /// Feed the current count. Returns true when a celebration should start.
    pub fn observe(&mut self, count: usize) -> bool {
        if count == super::TOTAL && !self.showing && !self.celebrated {
            self.showing = true;
            self.celebrated = true;
            return true;
        }
        if count < super::TOTAL && self.celebrated && !self.showing {
            self.celebrated = false;
        }
        false
    }

    /// The renderer finished playing the celebration.
    pub fn finish(&mut self) {
        self.showing = false;
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }
}
