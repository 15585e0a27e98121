//! Logical line splitting shared by the OBJ and MTL readers.

use std::io::{self, BufRead};

/// One statement after comment skipping and continuation joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line.
    pub number: usize,
    /// Lowercased keyword.
    pub keyword: String,
    /// Everything after the keyword, trimmed.
    pub args: String,
}

impl LogicalLine {
    fn split(number: usize, text: &str) -> Self {
        let (keyword, args) = match text.split_once(char::is_whitespace) {
            Some((keyword, args)) => (keyword, args.trim()),
            None => (text, ""),
        };
        Self {
            number,
            keyword: keyword.to_ascii_lowercase(),
            args: args.to_string(),
        }
    }
}

/// Iterator over the logical lines of a text stream.
///
/// Blank lines and lines starting with `#` are skipped. A line ending in a
/// backslash is joined with the next non-empty line.
pub struct Lines<R> {
    inner: io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            line_number: 0,
        }
    }

    fn next_physical(&mut self) -> Option<io::Result<String>> {
        let line = self.inner.next()?;
        self.line_number += 1;
        Some(line)
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.next_physical()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            let start = self.line_number;
            let mut text = line.trim().to_string();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            while let Some(head) = text.strip_suffix('\\') {
                let head = head.trim_end().to_string();
                let continuation = loop {
                    match self.next_physical() {
                        Some(Ok(next)) if next.trim().is_empty() => continue,
                        Some(Ok(next)) => break Some(next.trim().to_string()),
                        Some(Err(e)) => return Some(Err(e)),
                        None => break None,
                    }
                };
                text = match continuation {
                    Some(rest) => format!("{head} {rest}"),
                    None => head,
                };
            }

            if text.is_empty() {
                continue;
            }
            return Some(Ok(LogicalLine::split(start, &text)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Vec<LogicalLine> {
        Lines::new(text.as_bytes())
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        let lines = collect("# header\n\n   \nv 1 2 3\n  # indented comment\nVN 0 0 1\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].keyword, "v");
        assert_eq!(lines[0].args, "1 2 3");
        assert_eq!(lines[0].number, 4);
        assert_eq!(lines[1].keyword, "vn");
        assert_eq!(lines[1].number, 6);
    }

    #[test]
    fn test_continuation_joins_next_non_empty_line() {
        let lines = collect("f 1 2 \\\n\n  3 4\ng top\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].keyword, "f");
        assert_eq!(lines[0].args, "1 2 3 4");
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].number, 4);
    }

    #[test]
    fn test_continuation_at_end_of_stream() {
        let lines = collect("g name \\");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].args, "name");
    }

    #[test]
    fn test_keyword_without_arguments() {
        let lines = collect("g\ns\toff\n");
        assert_eq!(lines[0].keyword, "g");
        assert_eq!(lines[0].args, "");
        assert_eq!(lines[1].keyword, "s");
        assert_eq!(lines[1].args, "off");
    }
}
