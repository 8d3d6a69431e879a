//! Source file storage with line indexing.

use crate::{FileId, SourceSpan};

/// A single source file held in memory for the duration of a compile.
pub struct SourceFile {
    name: String,
    text: String,
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            name: name.into(),
            text,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// The text of line `index` (zero-based), without its trailing newline.
    pub fn line(&self, index: u32) -> &str {
        let index = index as usize;
        let start = match self.line_starts.get(index) {
            Some(&s) => s,
            None => return "",
        };
        let end = self
            .line_starts
            .get(index + 1)
            .map(|&e| e - 1)
            .unwrap_or(self.text.len());
        &self.text[start..end]
    }

    /// The span covering the entire file.
    pub fn extent(&self, file: FileId) -> SourceSpan {
        let last = self.line_count() - 1;
        SourceSpan::new(file, 0, 0, last, self.line(last).chars().count() as u32)
    }

    /// The zero-width span one past the last character, where the end-of-file
    /// token lives.
    pub fn end_position(&self, file: FileId) -> SourceSpan {
        self.extent(file).after()
    }
}

/// All files participating in a compile, addressed by [`FileId`].
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile::new(name, text));
        id
    }

    pub fn get(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index() {
        let file = SourceFile::new("t.co", "ab\ncd\n\nef");
        assert_eq!(file.line_count(), 4);
        assert_eq!(file.line(0), "ab");
        assert_eq!(file.line(1), "cd");
        assert_eq!(file.line(2), "");
        assert_eq!(file.line(3), "ef");
        assert_eq!(file.line(9), "");
    }

    #[test]
    fn extent_covers_last_line() {
        let file = SourceFile::new("t.co", "ab\ncde");
        let extent = file.extent(FileId(0));
        assert_eq!(extent, SourceSpan::new(FileId(0), 0, 0, 1, 3));
        assert_eq!(file.end_position(FileId(0)), SourceSpan::point(FileId(0), 1, 3));
    }

    #[test]
    fn trailing_newline_yields_empty_final_line() {
        let file = SourceFile::new("t.co", "ab\n");
        assert_eq!(file.line_count(), 2);
        assert_eq!(file.line(1), "");
        assert_eq!(file.end_position(FileId(0)), SourceSpan::point(FileId(0), 1, 0));
    }
}
