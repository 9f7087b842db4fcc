use std::collections::VecDeque;

/// Paragraph, line, sentence, word, then single characters.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

pub trait TextSplitter: Send + Sync {
    fn split_text(&self, text: &str) -> Vec<String>;
}

#[derive(Debug, PartialEq)]
pub enum SplitterConfigError {
    ZeroChunkSize,
    OverlapTooLarge {
        chunk_size: usize,
        chunk_overlap: usize,
    },
}

impl std::fmt::Display for SplitterConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitterConfigError::ZeroChunkSize => write!(f, "Chunk size must be greater than 0"),
            SplitterConfigError::OverlapTooLarge {
                chunk_size,
                chunk_overlap,
            } => write!(
                f,
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            ),
        }
    }
}

impl std::error::Error for SplitterConfigError {}

/// Splits text into windows of at most `chunk_size` characters, consecutive
/// windows sharing up to `chunk_overlap` characters. Cuts are made at the
/// first separator in the list that occurs in the text; pieces that are still
/// too long are split again with the remaining separators.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, SplitterConfigError> {
        if chunk_size == 0 {
            return Err(SplitterConfigError::ZeroChunkSize);
        }

        if chunk_overlap >= chunk_size {
            return Err(SplitterConfigError::OverlapTooLarge {
                chunk_size,
                chunk_overlap,
            });
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn recursive_split(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];

        for (index, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[index + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut short_splits: Vec<String> = Vec::new();

        for split in split_keeping_separator(text, separator) {
            if char_len(&split) < self.chunk_size {
                short_splits.push(split);
                continue;
            }

            if !short_splits.is_empty() {
                chunks.extend(self.merge_splits(&short_splits));
                short_splits.clear();
            }

            if remaining.is_empty() {
                let trimmed = split.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.recursive_split(&split, remaining));
            }
        }

        if !short_splits.is_empty() {
            chunks.extend(self.merge_splits(&short_splits));
        }

        chunks
    }

    /// Greedily packs splits into windows, carrying the tail of each window
    /// (at most `chunk_overlap` characters) into the next one.
    fn merge_splits(&self, splits: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);

            if total + len > self.chunk_size && !window.is_empty() {
                push_window(&window, &mut chunks);

                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            window.push_back(split);
            total += len;
        }

        push_window(&window, &mut chunks);
        chunks
    }
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        self.recursive_split(text, &self.separators)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn push_window(window: &VecDeque<&str>, chunks: &mut Vec<String>) {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Splits on `separator`, re-attaching it to the front of every piece after
/// the first so no text is lost. An empty separator splits into characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    let mut parts = text.split(separator);
    let mut pieces = Vec::new();

    if let Some(first) = parts.next() {
        if !first.is_empty() {
            pieces.push(first.to_string());
        }
    }

    for part in parts {
        pieces.push(format!("{}{}", separator, part));
    }

    pieces
}
