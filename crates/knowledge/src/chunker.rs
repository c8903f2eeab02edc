//! Text chunking with configurable size and overlap.

use crate::types::{Chunk, TextUnit};
use docqa_core::config::ChunkingSettings;
use docqa_core::{AppError, AppResult};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Splits text units into overlapping chunks measured in characters.
///
/// Splits prefer paragraph, then line, sentence and word boundaries before
/// falling back to raw characters. Chunks inherit the unit's metadata, so a
/// PDF chunk keeps its `page_number`.
pub struct Chunker {
    splitter: TextSplitter<Characters>,
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(overlap)
            .map_err(|e| {
                AppError::Config(format!(
                    "Invalid chunking (size {}, overlap {}): {}",
                    chunk_size, overlap, e
                ))
            })?;

        Ok(Self {
            splitter: TextSplitter::new(config),
            chunk_size,
            overlap,
        })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> AppResult<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    /// Split one unit. Whitespace-only pieces are dropped.
    pub fn split(&self, unit: &TextUnit) -> Vec<Chunk> {
        self.splitter
            .chunks(&unit.text)
            .filter(|piece| !piece.trim().is_empty())
            .map(|piece| Chunk::new(piece, unit.metadata.clone()))
            .collect()
    }

    pub fn split_all(&self, units: &[TextUnit]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = units.iter().flat_map(|unit| self.split(unit)).collect();

        tracing::debug!(
            "Chunked {} units into {} chunks (size: {}, overlap: {})",
            units.len(),
            chunks.len(),
            self.chunk_size,
            self.overlap
        );

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PAGE_NUMBER_KEY, SOURCE_KEY};

    fn numbered_words(n: usize) -> String {
        (0..n)
            .map(|i| format!("w{:04}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_chunks_respect_size() {
        let chunker = Chunker::new(500, 50).unwrap();
        let unit = TextUnit::new(numbered_words(1000), "a.txt");

        let chunks = chunker.split(&unit);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 500);
            assert!(!chunk.text.trim().is_empty());
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let chunker = Chunker::new(100, 30).unwrap();
        let unit = TextUnit::new(numbered_words(200), "a.txt");

        let chunks = chunker.split(&unit);
        assert!(chunks.len() >= 2);

        let first_word_of_second = chunks[1].text.split_whitespace().next().unwrap();
        assert!(
            chunks[0].text.contains(first_word_of_second),
            "Expected '{}' to be shared with the previous chunk",
            first_word_of_second
        );
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = Chunker::new(500, 50).unwrap();
        let unit = TextUnit::new("Paris is the capital of France.", "a.txt");

        let chunks = chunker.split(&unit);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Paris is the capital of France.");
    }

    #[test]
    fn test_metadata_inherited() {
        let chunker = Chunker::new(50, 10).unwrap();
        let unit = TextUnit::new(numbered_words(50), "doc.pdf").with_page(7);

        for chunk in chunker.split(&unit) {
            assert_eq!(chunk.metadata[SOURCE_KEY], "doc.pdf");
            assert_eq!(chunk.metadata[PAGE_NUMBER_KEY], 7);
        }
    }

    #[test]
    fn test_empty_and_blank_units_produce_nothing() {
        let chunker = Chunker::new(100, 10).unwrap();
        assert!(chunker.split(&TextUnit::new("", "a.txt")).is_empty());
        assert!(chunker.split(&TextUnit::new("   \n\n  ", "a.txt")).is_empty());
    }

    #[test]
    fn test_utf8_text() {
        let chunker = Chunker::new(40, 8).unwrap();
        let text = "Gamedex é um aplicativo 🎮 com acentuação: ã, õ, ç. ".repeat(20);
        let chunks = chunker.split(&TextUnit::new(text, "a.txt"));

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 40);
        }
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(matches!(Chunker::new(50, 50), Err(AppError::Config(_))));
    }

    #[test]
    fn test_split_all_keeps_unit_order() {
        let chunker = Chunker::new(500, 50).unwrap();
        let units = vec![
            TextUnit::new("page one", "doc.pdf").with_page(1),
            TextUnit::new("page two", "doc.pdf").with_page(2),
        ];

        let chunks = chunker.split_all(&units);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_number(), Some(1));
        assert_eq!(chunks[1].page_number(), Some(2));
    }
}
