//! Overlapping, sentence-aware text chunking
//!
//! Windows are measured in characters, not bytes, so Greek transcripts chunk
//! the same way as ASCII ones.

use crate::config::ChunkingConfig;

/// Cut points searched for (last occurrence wins) inside a window
const BREAK_PATTERNS: [&str; 3] = [". ", ".\n", "\n"];

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Window size in characters
    chunk_size: usize,
    /// Overlap between windows
    overlap: usize,
    /// Chunks must be longer than this after trimming
    min_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize, min_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
            min_size,
        }
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, config.min_chunk_size)
    }

    /// Split text into overlapping chunks
    ///
    /// Each window of `chunk_size` characters that does not reach the end of
    /// the text is cut just after its last sentence or line break. The next
    /// window starts `overlap` characters before the cut, and always at least
    /// one character after the previous start.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        // Byte offset of every character, plus the end of the text
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let len = offsets.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < len {
            let mut end = start + self.chunk_size;
            let mut window = &text[offsets[start]..offsets[end.min(len)]];

            if end < len {
                if let Some(cut) = last_break(window) {
                    // Break characters are ASCII, so cut + 1 is a char boundary
                    window = &window[..cut + 1];
                    end = start + window.chars().count();
                }
            }

            let trimmed = window.trim();
            if trimmed.chars().count() > self.min_size {
                chunks.push(trimmed.to_string());
            }

            if end >= len {
                break;
            }
            start = end.saturating_sub(self.overlap).max(start + 1);
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

/// Byte index of the last break character in the window
fn last_break(window: &str) -> Option<usize> {
    BREAK_PATTERNS
        .iter()
        .filter_map(|pattern| window.rfind(pattern))
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Numbered sentences so every chunk has a unique position in the text
    fn transcript(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Ο βουλευτής {:04} μίλησε για τον προϋπολογισμό. ", i))
            .collect()
    }

    #[test]
    fn test_cut_at_period_and_overlap() {
        // 1050 characters, the only sentence break is the period at 980
        let text = format!("{}. {}", "x".repeat(980), "y".repeat(68));
        assert_eq!(text.chars().count(), 1050);

        let chunks = TextChunker::default().chunk_text(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], text[..981]);
        assert!(chunks[0].ends_with('.'));
        // Second window starts at 981 - 100
        assert_eq!(chunks[1], text[881..]);
    }

    #[test]
    fn test_long_text_is_covered() {
        let text = transcript(200);
        let chunks = TextChunker::default().chunk_text(&text);

        assert!(!chunks.is_empty());
        assert!(text.starts_with(&chunks[0]));
        assert!(text.trim_end().ends_with(chunks.last().unwrap().as_str()));

        let mut previous_end = 0usize;
        for chunk in &chunks {
            assert!(chunk.chars().count() > 100);
            assert!(chunk.chars().count() <= 1000);

            let start = text.find(chunk.as_str()).expect("chunk must be a slice of the text");
            // Consecutive chunks overlap or touch, so nothing is skipped
            assert!(start <= previous_end, "gap before chunk at byte {}", start);
            previous_end = start + chunk.len();
        }
    }

    #[test]
    fn test_windows_count_characters_not_bytes() {
        let text = "α".repeat(2500);
        let chunks = TextChunker::default().chunk_text(&text);

        let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lengths, vec![1000, 1000, 700]);
    }

    #[test]
    fn test_prefers_last_break_in_window() {
        let text = format!("{}\n{}. {}", "a".repeat(300), "b".repeat(400), "c".repeat(800));
        let chunks = TextChunker::default().chunk_text(&text);

        // ". " at 701 is later than the newline at 300
        assert_eq!(chunks[0].chars().count(), 702);
        assert!(chunks[0].ends_with("b."));
    }

    #[test]
    fn test_short_and_empty_text() {
        let chunker = TextChunker::default();
        assert!(chunker.chunk_text("").is_empty());
        assert!(chunker.chunk_text("Σύντομο κείμενο.").is_empty());
        assert!(chunker.chunk_text(&" ".repeat(5000)).is_empty());
        assert_eq!(chunker.chunk_text(&"z".repeat(101)).len(), 1);
        assert!(chunker.chunk_text(&"z".repeat(100)).is_empty());
    }

    #[test]
    fn test_break_at_window_start_still_advances() {
        // The only break is the leading newline, so the first cut is one character long
        let text = format!("\n{}", "q".repeat(1500));
        let chunks = TextChunker::default().chunk_text(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "q".repeat(1000));
        assert_eq!(chunks[1].chars().count(), 600);
    }

    #[test]
    fn test_overlap_larger_than_progress_terminates() {
        let chunker = TextChunker::new(10, 9, 0);
        let text = "ab\ncd\nef\ngh\nij\nkl\nmn\nop";
        let chunks = chunker.chunk_text(text);

        assert!(!chunks.is_empty());
        assert!(chunks.len() <= text.chars().count());
    }

    #[test]
    fn test_deterministic() {
        let text = transcript(50);
        let chunker = TextChunker::default();
        assert_eq!(chunker.chunk_text(&text), chunker.chunk_text(&text));
    }
}
