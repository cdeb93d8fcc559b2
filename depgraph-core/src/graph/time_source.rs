//! Time Source

/// Graph-wide node representing the current evaluation time.
#[derive(Debug, Default)]
pub struct TimeSource {
    needs_update: bool,
}

impl TimeSource {
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Mark time as changed.
    pub fn tag_update(&mut self) {
        self.needs_update = true;
    }

    pub fn clear_update(&mut self) {
        self.needs_update = false;
    }
}
