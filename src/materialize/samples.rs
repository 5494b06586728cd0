//! Sample fixture extraction from problem descriptions.
//!
//! A description marks its samples with headings such as `## 範例輸入` /
//! `## 範例輸出`, each followed by a fenced code block. Every block found
//! under such a heading becomes `in{N}.txt` or `out{N}.txt`.
//!
//! Only closing an output block advances `N`. Inputs reuse the current
//! index, so `in0`/`out0`, `in1`/`out1` pair up only when the description
//! alternates input and output blocks. Existing tooling relies on this
//! numbering.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::ProblemError;

pub const SAMPLE_INPUT_MARKER: &str = "# 範例輸入";
pub const SAMPLE_OUTPUT_MARKER: &str = "# 範例輸出";
const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Input,
    Output,
}

impl SampleKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Input => "in",
            Self::Output => "out",
        }
    }
}

/// One finished code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub kind: SampleKind,
    pub index: usize,
    pub content: String,
}

impl Fixture {
    pub fn file_name(&self) -> String {
        format!("{}{}.txt", self.kind.prefix(), self.index)
    }
}

/// Line-at-a-time scanner over a description.
///
/// States: no label (seeking), label without open fence (awaiting fence),
/// label with open fence (in block).
#[derive(Debug, Default)]
pub struct SampleScanner<'a> {
    label: Option<SampleKind>,
    fence_open: bool,
    buffer: Vec<&'a str>,
    out_counter: usize,
}

impl<'a> SampleScanner<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line; returns a fixture when this line closes a block.
    pub fn feed(&mut self, line: &'a str) -> Option<Fixture> {
        if self.label.is_none() {
            if line.contains(SAMPLE_INPUT_MARKER) {
                self.label = Some(SampleKind::Input);
                return None;
            }
            if line.contains(SAMPLE_OUTPUT_MARKER) {
                self.label = Some(SampleKind::Output);
                return None;
            }
        }

        if let Some(kind) = self.label.filter(|_| line.contains(FENCE)) {
            if !self.fence_open {
                self.fence_open = true;
                return None;
            }

            let fixture = Fixture {
                kind,
                index: self.out_counter,
                content: self.buffer.join("\n"),
            };
            if kind == SampleKind::Output {
                self.out_counter += 1;
            }
            self.label = None;
            self.fence_open = false;
            self.buffer.clear();
            return Some(fixture);
        }

        if self.fence_open {
            self.buffer.push(line);
        }
        None
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Lines split on every Unicode line boundary, `\r\n` counting as one.
/// A trailing break does not produce a final empty line.
pub struct SplitLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SplitLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let Some((i, c)) = self.rest.char_indices().find(|&(_, c)| is_line_break(c)) else {
            return Some(std::mem::take(&mut self.rest));
        };

        let line = &self.rest[..i];
        let mut end = i + c.len_utf8();
        if c == '\r' && self.rest[end..].starts_with('\n') {
            end += 1;
        }
        self.rest = &self.rest[end..];
        Some(line)
    }
}

pub fn split_lines(text: &str) -> SplitLines<'_> {
    SplitLines { rest: text }
}

/// Scans `markdown` and returns every completed fixture in document order.
/// Unterminated labels or fences at the end are dropped.
pub fn scan(markdown: &str) -> Vec<Fixture> {
    let mut scanner = SampleScanner::new();
    split_lines(markdown)
        .filter_map(|line| scanner.feed(line))
        .collect()
}

/// Writes the fixtures found in `markdown` into `output_dir`.
pub fn extract(markdown: &str, output_dir: &Path) -> Result<Vec<PathBuf>, ProblemError> {
    let mut written = Vec::new();
    for fixture in scan(markdown) {
        let path = output_dir.join(fixture.file_name());
        std::fs::write(&path, &fixture.content).map_err(ProblemError::io(&path))?;
        debug!(path = %path.display(), "wrote sample fixture");
        written.push(path);
    }
    Ok(written)
}
