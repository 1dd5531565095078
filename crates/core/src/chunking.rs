use crate::error::ConfigError;
use crate::models::{Chunk, ChunkingConfig, Document};

const SEPARATORS: [&[char]; 3] = [&['\n', '\n'], &['\n'], &[' ']];

/// Splits `text` into windows of at most `chunk_size` characters where
/// consecutive windows share `chunk_overlap` characters. Each window
/// prefers to end on the last paragraph break, line break, or space it
/// contains, falling back to a hard cut when none exists past the overlap
/// region. Text no longer than `chunk_size` comes back as a single chunk.
pub fn split_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>, ConfigError> {
    config.validate()?;

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= config.chunk_size {
        return Ok(vec![text.to_string()]);
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let hard_end = (start + config.chunk_size).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            natural_break(&chars, start, hard_end, config.chunk_overlap).unwrap_or(hard_end)
        };

        chunks.push(chars[start..end].iter().collect());

        if end == chars.len() {
            break;
        }
        start = end - config.chunk_overlap;
    }

    Ok(chunks)
}

// Searches backward from the window end for the latest separator whose end
// lies past start + overlap, so the next window always advances.
fn natural_break(chars: &[char], start: usize, hard_end: usize, overlap: usize) -> Option<usize> {
    let floor = start + overlap + 1;

    for separator in SEPARATORS {
        let Some(mut pos) = hard_end.checked_sub(separator.len()) else {
            continue;
        };
        while pos + separator.len() >= floor && pos >= start {
            if chars[pos..pos + separator.len()] == *separator {
                return Some(pos + separator.len());
            }
            if pos == 0 {
                break;
            }
            pos -= 1;
        }
    }

    None
}

pub fn split_documents(
    documents: &[Document],
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>, ConfigError> {
    config.validate()?;

    let mut chunks = Vec::new();
    for document in documents {
        for piece in split_text(&document.text, config)? {
            chunks.push(Chunk {
                text: piece,
                metadata: document.metadata.clone(),
            });
        }
    }

    Ok(chunks)
}
