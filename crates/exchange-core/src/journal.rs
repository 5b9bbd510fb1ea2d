/// Undo journal for atomic operations
///
/// Each open frame remembers the value a key held before the frame first
/// wrote it. Only touched keys are recorded, so opening a frame costs nothing
/// regardless of how much state exists. Frames nest: committing a frame folds
/// its originals into the frame below, rolling one back hands them to the
/// owner to restore.
use std::collections::HashMap;
use std::hash::Hash;

// ============================================================================
// Journal Types
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct Journal<K, V> {
    /// Original values per open frame, innermost last
    frames: Vec<HashMap<K, V>>,
}

impl<K, V> Default for Journal<K, V> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

// ============================================================================
// Frame Management
// ============================================================================

impl<K: Eq + Hash, V> Journal<K, V> {
    pub(crate) fn begin(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Remember the value of `key` before its first write in the open frame
    ///
    /// Writes made while no frame is open are not recorded.
    pub(crate) fn record(&mut self, key: K, original: impl FnOnce() -> V) {
        if let Some(frame) = self.frames.last_mut() {
            frame.entry(key).or_insert_with(original);
        }
    }

    /// Close the innermost frame, keeping its writes
    pub(crate) fn commit(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if let Some(parent) = self.frames.last_mut() {
            for (key, original) in frame {
                // The parent's original predates this frame's
                parent.entry(key).or_insert(original);
            }
        }
    }

    /// Close the innermost frame, returning the values to restore
    pub(crate) fn rollback(&mut self) -> HashMap<K, V> {
        self.frames.pop().unwrap_or_default()
    }
}
