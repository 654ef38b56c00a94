//! Markdown exchange format.
//!
//! Prose cells are written as-is; code cells become fenced blocks tagged with
//! the notebook language:
//!
//! ````text
//! Some prose.
//!
//! ```python
//! print(1)
//! ```
//! ````
//!
//! Blank cells are not written. On reading, all prose between two fences
//! forms one text cell, so adjacent text cells merge.
//!
//! A prose line that would read back as a fence is written with a leading
//! backslash, which Markdown renders as a literal backtick. Lines already
//! starting with backslashes before a fence get one more, so the escape is
//! reversible.

use tessera_core::{CellRecord, CellVariant, Serializer};

use crate::error::{SyncError, SyncResult};

/// Serializer for the Markdown format.
#[derive(Debug, Clone)]
pub struct MarkdownSerializer {
    language: String,
}

impl MarkdownSerializer {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Render cells as a Markdown document.
    pub fn render(&self, cells: &[CellRecord]) -> String {
        let blocks: Vec<String> = cells
            .iter()
            .filter(|cell| !cell.content.trim().is_empty())
            .map(|cell| match cell.variant {
                CellVariant::Text => escape_prose(cell.content.trim_end()),
                CellVariant::Code => {
                    let fence = fence_for(&cell.content);
                    format!(
                        "{fence}{}\n{}\n{fence}",
                        self.language,
                        cell.content.trim_end_matches('\n')
                    )
                }
            })
            .collect();

        if blocks.is_empty() {
            return String::new();
        }
        let mut doc = blocks.join("\n\n");
        doc.push('\n');
        doc
    }

    /// Parse a Markdown document into cells.
    pub fn parse(&self, doc: &str) -> SyncResult<Vec<CellRecord>> {
        let mut cells = Vec::new();
        let mut prose: Vec<&str> = Vec::new();
        let mut code: Option<(usize, usize, Vec<&str>)> = None;

        for (line_no, line) in doc.lines().enumerate() {
            match code {
                Some((width, _, ref mut body)) => {
                    if is_closing_fence(line, width) {
                        cells.push(CellRecord::code(body.join("\n")));
                        code = None;
                    } else {
                        body.push(line);
                    }
                }
                None => {
                    if let Some(width) = opening_fence(line) {
                        flush_prose(&mut prose, &mut cells);
                        code = Some((width, line_no + 1, Vec::new()));
                    } else {
                        prose.push(line);
                    }
                }
            }
        }

        if let Some((_, line, _)) = code {
            return Err(SyncError::ParseError(format!(
                "unterminated code fence opened at line {line}"
            )));
        }
        flush_prose(&mut prose, &mut cells);

        Ok(cells)
    }
}

impl Default for MarkdownSerializer {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl Serializer for MarkdownSerializer {
    fn serialize(&self, cells: &[CellRecord]) -> tessera_core::Result<String> {
        Ok(self.render(cells))
    }

    fn deserialize(&self, text: &str) -> tessera_core::Result<Vec<CellRecord>> {
        Ok(self.parse(text)?)
    }
}

fn flush_prose(prose: &mut Vec<&str>, cells: &mut Vec<CellRecord>) {
    let text = prose
        .iter()
        .map(|line| unescape_line(line))
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();
    if !text.is_empty() {
        cells.push(CellRecord::text(text));
    }
    prose.clear();
}

/// Whether `line`, minus any leading backslashes, starts like a fence.
fn is_fence_like(line: &str) -> bool {
    line.trim_start_matches('\\').starts_with("```")
}

fn escape_prose(text: &str) -> String {
    text.lines()
        .map(|line| {
            if is_fence_like(line) {
                format!("\\{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape_line(line: &str) -> &str {
    match line.strip_prefix('\\') {
        Some(rest) if is_fence_like(rest) => rest,
        _ => line,
    }
}

/// Backtick fence longer than any backtick run opening a line of `content`.
fn fence_for(content: &str) -> String {
    let longest = content
        .lines()
        .map(|line| line.trim_start().chars().take_while(|&c| c == '`').count())
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Width of the fence opened by `line`, if it opens one.
fn opening_fence(line: &str) -> Option<usize> {
    let width = line.chars().take_while(|&c| c == '`').count();
    if width < 3 {
        return None;
    }
    // An info string never contains backticks.
    (!line[width..].contains('`')).then_some(width)
}

fn is_closing_fence(line: &str, width: usize) -> bool {
    let trimmed = line.trim_end();
    trimmed.len() >= width && trimmed.chars().all(|c| c == '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serializer() -> MarkdownSerializer {
        MarkdownSerializer::new("python")
    }

    #[test]
    fn test_writes_prose_and_fenced_code() {
        let doc = serializer().render(&[
            CellRecord::text("# Title\n\nIntro."),
            CellRecord::code("x = 1\nprint(x)"),
        ]);
        assert_eq!(doc, "# Title\n\nIntro.\n\n```python\nx = 1\nprint(x)\n```\n");
    }

    #[test]
    fn test_blank_cells_are_skipped() {
        let s = serializer();
        assert_eq!(s.render(&[CellRecord::code(""), CellRecord::text("  \n")]), "");
        assert_eq!(
            s.render(&[CellRecord::code(" "), CellRecord::code("1")]),
            "```python\n1\n```\n"
        );
    }

    #[test]
    fn test_reads_cells_in_order() {
        let doc = "Intro\n\n```python\na = 1\n```\n\nMiddle\n```\nb = 2\n```\n";
        let cells = serializer().parse(doc).unwrap();
        assert_eq!(
            cells,
            vec![
                CellRecord::text("Intro"),
                CellRecord::code("a = 1"),
                CellRecord::text("Middle"),
                CellRecord::code("b = 2"),
            ]
        );
    }

    #[test]
    fn test_code_containing_fences_survives() {
        let s = serializer();
        let cell = CellRecord::code("echo '```'\n```\nstill code");
        let doc = s.render(std::slice::from_ref(&cell));
        assert!(doc.starts_with("````python\n"));
        assert_eq!(s.parse(&doc).unwrap(), vec![cell]);
    }

    #[test]
    fn test_prose_fence_lines_are_escaped() {
        let s = serializer();
        let cells = vec![
            CellRecord::text("Use a fence:\n```"),
            CellRecord::code("echo 1"),
        ];
        let doc = s.render(&cells);
        assert_eq!(doc, "Use a fence:\n\\```\n\n```python\necho 1\n```\n");
        assert_eq!(s.parse(&doc).unwrap(), cells);
    }

    #[test]
    fn test_escaped_looking_prose_survives() {
        let s = serializer();
        let cells = vec![CellRecord::text("\\```already escaped\n\\not a fence")];
        assert_eq!(s.parse(&s.render(&cells)).unwrap(), cells);
    }

    #[test]
    fn test_empty_code_block_is_kept() {
        let cells = serializer().parse("```python\n```\n").unwrap();
        assert_eq!(cells, vec![CellRecord::code("")]);
    }

    #[test]
    fn test_unterminated_fence_is_an_error() {
        let err = serializer().parse("text\n```python\nx = 1\n").unwrap_err();
        assert!(matches!(err, SyncError::ParseError(ref m) if m.contains("line 2")));
    }

    #[test]
    fn test_deserialize_maps_errors() {
        let err = serializer().deserialize("```\nopen").unwrap_err();
        assert!(matches!(err, tessera_core::Error::Deserialization(_)));
    }
}
