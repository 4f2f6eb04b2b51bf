/// Typed options for a merge invocation.
///
/// The default is copy semantics: source directories are read but never
/// modified or removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Move artifacts instead of copying them, and remove every source
    /// directory once the destination has been persisted.
    pub move_files: bool,
}

impl MergeOptions {
    /// Options with copy semantics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select move-vs-copy semantics.
    pub fn move_files(mut self, move_files: bool) -> Self {
        self.move_files = move_files;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_copy() {
        assert!(!MergeOptions::default().move_files);
    }

    #[test]
    fn builder_sets_move() {
        assert!(MergeOptions::new().move_files(true).move_files);
    }
}
