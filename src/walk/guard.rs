use std::collections::HashSet;

/// Type names already entered during one walk.
#[derive(Debug, Default)]
pub struct CycleGuard {
    seen: HashSet<String>,
}

impl CycleGuard {
    pub fn new() -> Self { Self::default() }

    /// Record `name`; returns `true` when it had been recorded before.
    ///
    /// A trailing non-null marker is ignored, so `Widget!` and `Widget` are
    /// the same entry.
    pub fn register(&mut self, name: &str) -> bool {
        let name = name.trim_end_matches('!');
        !self.seen.insert(name.to_string())
    }
}
