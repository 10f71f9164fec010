/// Two-state latch that turns a level signal into a single rising edge.
///
/// `observe(true)` reports `true` only on the first call after the latch was
/// armed; it re-arms once `observe(false)` is seen. The top-of-hour handler
/// uses this so a signal that stays high for several polls fires once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLatch {
    latched: bool,
}

impl EdgeLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, level: bool) -> bool {
        match (level, self.latched) {
            (true, false) => {
                self.latched = true;
                true
            }
            (false, true) => {
                self.latched = false;
                false
            }
            _ => false,
        }
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }
}
