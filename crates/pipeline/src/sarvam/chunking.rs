//! Text chunking for speech synthesis
//!
//! Whole sentences are packed up to the limit. A sentence that alone exceeds
//! it is split at whitespace, and a single word that exceeds it is split on
//! grapheme boundaries so no combining mark is separated from its base.

use unicode_segmentation::UnicodeSegmentation;

/// Sentence terminators, including the Devanagari danda and double danda
const TERMINATORS: [char; 5] = ['.', '!', '?', '।', '॥'];

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` into sentences, each keeping its terminator
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        if TERMINATORS.contains(&c) {
            let end = idx + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
        }
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

/// Split one over-long word into pieces of at most `max_chars`
fn split_word(word: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut piece = String::new();
    let mut piece_len = 0;
    for grapheme in word.graphemes(true) {
        let len = char_len(grapheme);
        if piece_len + len > max_chars && !piece.is_empty() {
            out.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece.push_str(grapheme);
        piece_len += len;
    }
    if !piece.is_empty() {
        out.push(piece);
    }
}

/// Split one over-long sentence at whitespace
fn split_sentence(sentence: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0;

    for word in sentence.split_whitespace() {
        let len = char_len(word);
        if len > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            split_word(word, max_chars, out);
            continue;
        }

        let needed = if current.is_empty() { len } else { current_len + 1 + len };
        if needed > max_chars {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}

/// Split `text` into chunks of at most `max_chars` characters
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let max_chars = max_chars.max(1);
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences(text) {
        let len = char_len(sentence);

        if len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            split_sentence(sentence, max_chars, &mut chunks);
            continue;
        }

        let needed = if current.is_empty() { len } else { current_len + 1 + len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
            current_len = len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
            current_len = needed;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(chunk_text("  Hello there.  ", 450), vec!["Hello there."]);
        assert!(chunk_text("   ", 450).is_empty());
    }

    #[test]
    fn test_packs_whole_sentences() {
        let chunks = chunk_text("One two. Three four! Five six?", 20);
        assert_eq!(chunks, vec!["One two. Three four!", "Five six?"]);
    }

    #[test]
    fn test_danda_terminates_sentences() {
        let text = "आप पात्र हैं। कृपया दस्तावेज़ तैयार रखें॥ धन्यवाद।";
        let chunks = chunk_text(text, 25);
        assert!(chunks.len() >= 2);
        assert!(chunks[0].ends_with('।'));
        assert!(chunks.iter().all(|c| c.chars().count() <= 25));
    }

    #[test]
    fn test_long_sentence_splits_at_whitespace() {
        let sentence = "word ".repeat(30);
        let chunks = chunk_text(&sentence, 22);
        assert!(chunks.iter().all(|c| c.chars().count() <= 22));
        assert!(chunks.iter().all(|c| !c.starts_with(' ') && !c.ends_with(' ')));
        assert_eq!(chunks.join(" ").split_whitespace().count(), 30);
    }

    #[test]
    fn test_long_word_splits_by_grapheme() {
        let word = "क्षि".repeat(10);
        let chunks = chunk_text(&word, 8);
        assert!(chunks.iter().all(|c| c.chars().count() <= 8));
        assert_eq!(chunks.concat(), word);
    }

    #[test]
    fn test_nothing_is_lost() {
        let text = "First sentence here. ".repeat(40);
        let chunks = chunk_text(&text, 450);
        assert!(chunks.len() > 1);
        assert_eq!(
            chunks.join(" ").split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }
}
