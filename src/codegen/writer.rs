//! Indentation-aware text sink with scoped blocks, files and deferred
//! sections.
//!
//! All output of a run stays in memory. A file is only handed out once it
//! has been closed, and files abandoned by a failed run are dropped.

use std::path::PathBuf;

const INDENT: &str = "\t";

/// A generated source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Default)]
pub struct SourceWriter {
    out: String,
    indent: usize,
    at_line_start: bool,
    /// Outer buffers suspended while a section is being deferred.
    suspended: Vec<(String, bool)>,
    current_file: Option<PathBuf>,
    files: Vec<OutputFile>,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self {
            at_line_start: true,
            ..Self::default()
        }
    }

    /// Forget everything from a previous run.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    pub fn write_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.write(c.encode_utf8(&mut buf));
    }

    pub fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    pub fn write_line(&mut self, text: &str) {
        self.write(text);
        self.newline();
    }

    /// Write possibly multi-line text, indenting every line.
    pub fn write_lines(&mut self, text: &str) {
        for line in text.lines() {
            self.write_line(line);
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent below column zero");
        self.indent = self.indent.saturating_sub(1);
    }

    /// `{` and one level deeper.
    pub fn open_block(&mut self) {
        self.write_line("{");
        self.indent();
    }

    /// One level shallower and `}`.
    pub fn close_block(&mut self) {
        self.dedent();
        self.write_line("}");
    }

    // ── Deferred sections ─────────────────────────────────────────

    /// Start collecting output into a separate buffer.
    pub fn begin_section(&mut self) {
        let outer = std::mem::take(&mut self.out);
        self.suspended.push((outer, self.at_line_start));
        self.at_line_start = true;
    }

    /// Stop collecting and return the collected text.
    pub fn end_section(&mut self) -> String {
        let (outer, at_line_start) = self.suspended.pop().unwrap_or_default();
        self.at_line_start = at_line_start;
        std::mem::replace(&mut self.out, outer)
    }

    /// Append already formatted text as is.
    pub fn write_raw(&mut self, text: &str) {
        self.out.push_str(text);
        self.at_line_start = text.is_empty() || text.ends_with('\n');
    }

    // ── Files ─────────────────────────────────────────────────────

    pub fn create_file(&mut self, path: PathBuf) {
        debug_assert!(self.current_file.is_none(), "file already open");
        self.out.clear();
        self.indent = 0;
        self.at_line_start = true;
        self.current_file = Some(path);
    }

    pub fn close_file(&mut self) {
        debug_assert_eq!(self.indent, 0, "unbalanced blocks at end of file");
        if let Some(path) = self.current_file.take() {
            let contents = std::mem::take(&mut self.out);
            log::debug!("closed {} ({} bytes)", path.display(), contents.len());
            self.files.push(OutputFile { path, contents });
        }
        self.indent = 0;
        self.at_line_start = true;
    }

    pub fn take_files(&mut self) -> Vec<OutputFile> {
        std::mem::take(&mut self.files)
    }
}
