use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Comment markers used by GROMACS `.xvg` output: `#` for provenance
/// headers and `@` for xmgrace legend directives.
pub const XVG_COMMENT_MARKERS: [char; 2] = ['#', '@'];

pub const DEFAULT_SEPARATOR: char = ',';

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Separator {0:?} is whitespace and would be collapsed into itself")]
    WhitespaceSeparator(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub lines_read: usize,
    pub lines_written: usize,
    pub comments_dropped: usize,
    pub blank_dropped: usize,
}

/// Turns whitespace-aligned tool output into delimiter-separated rows.
///
/// A line is dropped when its first character is one of the configured
/// comment markers. Every other line is trimmed and each maximal run of
/// whitespace becomes exactly one separator, so the token count and order
/// are preserved. Leading whitespace never yields an empty first field, and
/// a line with no tokens is not emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    comment_markers: Vec<char>,
    separator: char,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            comment_markers: XVG_COMMENT_MARKERS.to_vec(),
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl Converter {
    pub fn new(
        comment_markers: impl IntoIterator<Item = char>,
        separator: char,
    ) -> Result<Self, ConvertError> {
        if separator.is_whitespace() {
            return Err(ConvertError::WhitespaceSeparator(separator));
        }
        Ok(Self {
            comment_markers: comment_markers.into_iter().collect(),
            separator,
        })
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn comment_markers(&self) -> &[char] {
        &self.comment_markers
    }

    pub fn is_comment(&self, line: &str) -> bool {
        line.chars()
            .next()
            .is_some_and(|c| self.comment_markers.contains(&c))
    }

    /// Converts one line, returning `None` when the line is not retained.
    pub fn convert_line(&self, line: &str) -> Option<String> {
        if self.is_comment(line) {
            return None;
        }

        let mut tokens = line.split_whitespace();
        let first = tokens.next()?;

        let mut out = String::with_capacity(line.len());
        out.push_str(first);
        for token in tokens {
            out.push(self.separator);
            out.push_str(token);
        }
        Some(out)
    }

    pub fn convert<R: BufRead, W: Write>(
        &self,
        reader: R,
        writer: &mut W,
    ) -> Result<ConversionStats, ConvertError> {
        let mut stats = ConversionStats::default();

        for line in reader.lines() {
            let line = line?;
            stats.lines_read += 1;

            if self.is_comment(&line) {
                stats.comments_dropped += 1;
                continue;
            }

            match self.convert_line(&line) {
                Some(converted) => {
                    writer.write_all(converted.as_bytes())?;
                    writer.write_all(b"\n")?;
                    stats.lines_written += 1;
                }
                None => {
                    trace!("Dropping blank line {}", stats.lines_read);
                    stats.blank_dropped += 1;
                }
            }
        }

        writer.flush()?;
        Ok(stats)
    }

    /// Converts `src` into `dst`. When conversion fails partway, the
    /// partially written `dst` is removed.
    pub fn convert_file(&self, src: &Path, dst: &Path) -> Result<ConversionStats, ConvertError> {
        debug!("Converting {:?} -> {:?}", src, dst);
        let reader = BufReader::new(File::open(src)?);
        let mut writer = BufWriter::new(File::create(dst)?);
        let stats = match self.convert(reader, &mut writer) {
            Ok(stats) => stats,
            Err(e) => {
                drop(writer);
                if let Err(rm) = fs::remove_file(dst) {
                    warn!("Could not remove partial output {:?}: {}", dst, rm);
                }
                return Err(e);
            }
        };
        debug!(
            "Converted {:?}: {} rows written, {} comment lines dropped",
            src, stats.lines_written, stats.comments_dropped
        );
        Ok(stats)
    }
}
