//! Corpus ingestion: file loading and text chunking

use std::path::Path;

use tracing::{debug, warn};

use crate::domain::DomainError;

pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 200;

/// One chunk of a corpus document, ready for embedding
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    pub text: String,
    pub source: String,
}

/// Split a text into overlapping chunks of roughly `CHUNK_SIZE` characters.
///
/// Boundaries are snapped to char boundaries so multi-byte text never
/// splits mid-character.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    // Boundary snapping moves an edge by up to 3 bytes; the window must
    // still advance past the previous start on every iteration.
    assert!(
        overlap + 4 <= chunk_size,
        "overlap must be at least 4 bytes smaller than chunk size"
    );

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.len() <= chunk_size {
        return vec![trimmed.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < trimmed.len() {
        let mut end = (start + chunk_size).min(trimmed.len());
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }

        chunks.push(trimmed[start..end].to_string());

        if end == trimmed.len() {
            break;
        }

        let mut next = end - overlap;
        while !trimmed.is_char_boundary(next) {
            next += 1;
        }
        start = next;
    }

    chunks
}

/// Load every markdown and plain-text file in `dir` and chunk it.
///
/// Unreadable files are skipped with a warning; an unreadable directory
/// is a configuration error.
pub fn load_corpus(dir: &Path) -> Result<Vec<DocumentChunk>, DomainError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        DomainError::configuration(format!("Cannot read corpus directory {:?}: {}", dir, e))
    })?;

    let mut chunks = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        let path = entry.path();
        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext, "md" | "txt"))
            .unwrap_or(false);
        if !is_text {
            continue;
        }

        let source = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let file_chunks = chunk_text(&content, CHUNK_SIZE, CHUNK_OVERLAP);
                debug!(source = %source, chunks = file_chunks.len(), "Chunked corpus file");
                chunks.extend(file_chunks.into_iter().map(|text| DocumentChunk {
                    text,
                    source: source.clone(),
                }));
            }
            Err(e) => {
                warn!(source = %source, error = %e, "Skipping unreadable corpus file");
            }
        }
    }

    Ok(chunks)
}
