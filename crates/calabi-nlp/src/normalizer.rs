//! Text normalization and tokenization
//!
//! Tokens are whitespace separated; punctuation at either edge of a word
//! becomes its own token. Offsets are character offsets into the raw input,
//! so spans built from tokens map straight back onto what the user typed.

use crate::error::PipelineError;
use calabi_domain::Token;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Splits raw text into tokens
#[derive(Debug, Clone)]
pub struct Normalizer {
    max_input_chars: usize,
    lowercase: bool,
}

impl Normalizer {
    /// Create a normalizer
    pub fn new(max_input_chars: usize, lowercase: bool) -> Self {
        Self {
            max_input_chars,
            lowercase,
        }
    }

    /// Tokenize `raw_text`
    ///
    /// Whitespace-only input gives an empty sequence. Input longer than the
    /// configured maximum fails before any work is done.
    pub fn normalize(&self, raw_text: &str) -> Result<Vec<Token>, PipelineError> {
        let chars: Vec<char> = raw_text.chars().collect();
        if chars.len() > self.max_input_chars {
            return Err(PipelineError::InvalidInput(format!(
                "Text too long: {} chars (max: {})",
                chars.len(),
                self.max_input_chars
            )));
        }

        let mut tokens = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            if chars[i].is_whitespace() {
                i += 1;
                continue;
            }
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            self.push_word(&chars, start, i, &mut tokens);
        }

        Ok(tokens)
    }

    /// Split one whitespace-delimited word `[start, end)` into tokens
    fn push_word(&self, chars: &[char], start: usize, end: usize, tokens: &mut Vec<Token>) {
        let mut core_start = start;
        while core_start < end && is_edge_punctuation(chars[core_start]) {
            core_start += 1;
        }
        let mut core_end = end;
        while core_end > core_start && is_edge_punctuation(chars[core_end - 1]) {
            core_end -= 1;
        }

        for i in start..core_start {
            tokens.push(self.token(chars, i, i + 1));
        }
        if core_start < core_end {
            tokens.push(self.token(chars, core_start, core_end));
        }
        for i in core_end.max(core_start)..end {
            tokens.push(self.token(chars, i, i + 1));
        }
    }

    fn token(&self, chars: &[char], start: usize, end: usize) -> Token {
        let composed: String = chars[start..end].iter().copied().nfc().collect();
        let text = if self.lowercase {
            composed.to_lowercase()
        } else {
            composed
        };
        Token::new(text, start, end)
    }
}

/// Joins token texts with single spaces
pub fn normalized_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_edge_punctuation(c: char) -> bool {
    !c.is_alphanumeric() && !is_combining_mark(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_whitespace_collapsed() {
        let n = Normalizer::new(100, false);
        let tokens = n.normalize("  Book   a\tflight \n").unwrap();
        assert_eq!(texts(&tokens), vec!["Book", "a", "flight"]);
        assert_eq!((tokens[0].start_offset, tokens[0].end_offset), (2, 6));
        assert_eq!((tokens[2].start_offset, tokens[2].end_offset), (12, 18));
    }

    #[test]
    fn test_empty_and_blank() {
        let n = Normalizer::new(100, false);
        assert!(n.normalize("").unwrap().is_empty());
        assert!(n.normalize(" \t\n ").unwrap().is_empty());
    }

    #[test]
    fn test_edge_punctuation_split() {
        let n = Normalizer::new(100, false);
        let tokens = n.normalize("(Seoul), Tokyo!").unwrap();
        assert_eq!(texts(&tokens), vec!["(", "Seoul", ")", ",", "Tokyo", "!"]);
        assert_eq!((tokens[1].start_offset, tokens[1].end_offset), (1, 6));
    }

    #[test]
    fn test_inner_punctuation_kept() {
        let n = Normalizer::new(100, false);
        let tokens = n.normalize("on 2024-05-01, at 15:00.").unwrap();
        assert_eq!(texts(&tokens), vec!["on", "2024-05-01", ",", "at", "15:00", "."]);
    }

    #[test]
    fn test_punctuation_only_word() {
        let n = Normalizer::new(100, false);
        let tokens = n.normalize("...").unwrap();
        assert_eq!(texts(&tokens), vec![".", ".", "."]);
    }

    #[test]
    fn test_lowercase_option() {
        let n = Normalizer::new(100, true);
        assert_eq!(texts(&n.normalize("SEOUL Station").unwrap()), vec!["seoul", "station"]);
    }

    #[test]
    fn test_char_offsets_not_bytes() {
        let n = Normalizer::new(100, false);
        let tokens = n.normalize("한강 공원").unwrap();
        assert_eq!((tokens[1].start_offset, tokens[1].end_offset), (3, 5));
    }

    #[test]
    fn test_nfc_composition() {
        let n = Normalizer::new(100, false);
        let tokens = n.normalize("Cafe\u{301}").unwrap();
        assert_eq!(tokens[0].text, "Café");
        assert_eq!(tokens[0].end_offset, 5);
    }

    #[test]
    fn test_too_long() {
        let n = Normalizer::new(5, false);
        assert!(n.normalize("12345").is_ok());
        assert!(matches!(n.normalize("123456"), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn test_normalized_text() {
        let n = Normalizer::new(100, false);
        let tokens = n.normalize("  Seoul   City ").unwrap();
        assert_eq!(normalized_text(&tokens), "Seoul City");
    }

    proptest! {
        #[test]
        fn offsets_strictly_increasing(s in "\\PC{0,60}") {
            let tokens = Normalizer::new(1_000, false).normalize(&s).unwrap();
            for t in &tokens {
                prop_assert!(t.start_offset < t.end_offset);
            }
            for pair in tokens.windows(2) {
                prop_assert!(pair[0].end_offset <= pair[1].start_offset);
            }
        }

        #[test]
        fn empty_iff_blank(s in "[ \\ta-z.,!]{0,30}") {
            let tokens = Normalizer::new(1_000, false).normalize(&s).unwrap();
            prop_assert_eq!(tokens.is_empty(), s.trim().is_empty());
        }

        #[test]
        fn tokens_within_input(s in "\\PC{0,60}") {
            let len = s.chars().count();
            let tokens = Normalizer::new(1_000, false).normalize(&s).unwrap();
            prop_assert!(tokens.iter().all(|t| t.end_offset <= len));
        }
    }
}
