use std::path::PathBuf;

/// Path used for declarations that did not come from a file.
const INLINE_PATH: &str = "<inline>.h";

/// One header's text, as handed to an extractor.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub content: String,
    line_starts: Vec<u32>,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, content: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i as u32 + 1))
            .collect();

        Self {
            path: path.into(),
            content,
            line_starts,
        }
    }

    /// Wrap a declaration string that was passed on the command line.
    pub fn inline(content: impl Into<String>) -> Self {
        Self::new(INLINE_PATH, content.into())
    }

    /// Text of a 1-based line, as numbered in diagnostics.
    pub fn line(&self, line: u32) -> Option<&str> {
        let idx = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)? as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(self.content.len(), |&e| e as usize);
        Some(self.content[start..end].trim_end_matches(['\r', '\n']))
    }
}
