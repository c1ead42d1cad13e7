//! Recursive character text splitter with markdown-aware separators.
//!
//! The text is split on the first separator (in priority order) that occurs
//! in it. Pieces short enough are merged greedily into chunks of at most
//! `chunk_size` characters, carrying up to `chunk_overlap` characters of the
//! previous chunk forward. Pieces that are still too long are split again
//! with the remaining, finer separators. Separators stay attached to the
//! start of the piece that follows them.

use std::collections::VecDeque;

use graphrag_core::{ChunkMetadata, SourceDocument};

use crate::error::{IngestError, Result};

/// Markdown separators, coarsest first. The empty separator splits into
/// single characters and always applies.
pub const MARKDOWN_SEPARATORS: &[&str] = &[
    "\n## ",
    "\n### ",
    "\n#### ",
    "\n##### ",
    "\n###### ",
    "```\n\n",
    "\n\n***\n\n",
    "\n\n---\n\n",
    "\n\n___\n\n",
    "\n\n",
    "\n",
    " ",
    "",
];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    /// A splitter using [`MARKDOWN_SEPARATORS`].
    pub fn markdown(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::new(chunk_size, chunk_overlap, MARKDOWN_SEPARATORS)
    }

    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: &[&str]) -> Result<Self> {
        if chunk_size == 0 {
            return Err(IngestError::Splitter("chunk size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(IngestError::Splitter(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: separators.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Split `text` into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Split `text` into source documents tagged with their position and
    /// line range in `source`.
    pub fn create_documents(&self, text: &str, source: &str) -> Vec<SourceDocument> {
        let mut documents = Vec::new();
        let mut search_from = 0;
        let mut last_line = 1;

        for (chunk_index, chunk) in self.split_text(text).into_iter().enumerate() {
            let offset = text[search_from..]
                .find(chunk.as_str())
                .map(|i| i + search_from)
                .or_else(|| text.find(chunk.as_str()));

            let (line_from, line_to) = match offset {
                Some(offset) => {
                    let from = 1 + text[..offset].matches('\n').count();
                    let to = from + chunk.matches('\n').count();
                    let first_char = chunk.chars().next().map_or(1, char::len_utf8);
                    search_from = offset + first_char;
                    (from, to)
                }
                None => (last_line, last_line + chunk.matches('\n').count()),
            };
            last_line = line_to;

            documents.push(SourceDocument::new(
                chunk,
                ChunkMetadata {
                    source: source.to_string(),
                    chunk_index,
                    line_from,
                    line_to,
                },
            ));
        }

        documents
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, finer) = pick_separator(text, separators);

        let mut chunks = Vec::new();
        let mut short = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                short.push(piece);
                continue;
            }

            if !short.is_empty() {
                chunks.extend(self.merge_splits(&short));
                short.clear();
            }
            if finer.is_empty() {
                if let Some(chunk) = trimmed(piece) {
                    chunks.push(chunk);
                }
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !short.is_empty() {
            chunks.extend(self.merge_splits(&short));
        }

        chunks
    }

    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &split in splits {
            let len = char_len(split);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        length = total,
                        chunk_size = self.chunk_size,
                        "Created a chunk longer than the configured size"
                    );
                }
                if !current.is_empty() {
                    if let Some(doc) = join(&current) {
                        docs.push(doc);
                    }
                    while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                        match current.pop_front() {
                            Some(first) => total -= char_len(first),
                            None => break,
                        }
                    }
                }
            }

            current.push_back(split);
            total += len;
        }

        if let Some(doc) = join(&current) {
            docs.push(doc);
        }
        docs
    }
}

/// First separator present in `text`, plus the finer separators after it.
fn pick_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
    let none = &separators[separators.len()..];
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return (separator.as_str(), none);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }
    (separators.last().map_or("", String::as_str), none)
}

/// Split before every occurrence of `separator`, dropping empty pieces.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
            start = idx;
        }
    }
    pieces.push(&text[start..]);
    pieces.retain(|p| !p.is_empty());
    pieces
}

fn join(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    trimmed(&joined)
}

fn trimmed(text: &str) -> Option<String> {
    let t = text.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
