use once_cell::sync::Lazy;
use regex::Regex;

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

/// Maps byte offsets produced by `regex` onto character offsets.
pub(crate) struct CharIndex {
    starts: Vec<usize>,
    byte_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            starts: text.char_indices().map(|(i, _)| i).collect(),
            byte_len: text.len(),
        }
    }

    /// `byte` must sit on a char boundary (or equal the text length).
    pub(crate) fn char_offset(&self, byte: usize) -> usize {
        if byte >= self.byte_len {
            return self.starts.len();
        }
        match self.starts.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i,
        }
    }

    pub(crate) fn byte_offset(&self, chr: usize) -> usize {
        self.starts.get(chr).copied().unwrap_or(self.byte_len)
    }
}

/// Snap a byte offset to a valid char boundary.
/// If `forward` is true, snap forward; otherwise snap backward.
pub(crate) fn snap_to_char_boundary(text: &str, pos: usize, forward: bool) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut p = pos;
    if forward {
        while p < text.len() && !text.is_char_boundary(p) {
            p += 1;
        }
    } else {
        while p > 0 && !text.is_char_boundary(p) {
            p -= 1;
        }
    }
    p
}

/// Window of `width` bytes centred on `start..end`, elided with `...`.
pub(crate) fn context_around(text: &str, start: usize, end: usize, width: usize) -> String {
    let mid = (start + end) / 2;
    let half = width / 2;
    let ctx_start = snap_to_char_boundary(text, mid.saturating_sub(half), false);
    let ctx_end = snap_to_char_boundary(text, std::cmp::min(text.len(), mid + half), true);

    let snippet = text[ctx_start..ctx_end].replace('\n', " ");
    let prefix = if ctx_start > 0 { "..." } else { "" };
    let suffix = if ctx_end < text.len() { "..." } else { "" };
    format!("{prefix}{snippet}{suffix}")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ---------------------------------------------------------------------------
// Sentences
// ---------------------------------------------------------------------------

static SENTENCE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// A sentence and the byte offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SentenceSpan<'a> {
    pub(crate) start: usize,
    pub(crate) text: &'a str,
}

/// Terminator-based split: a sentence ends at `.`, `!` or `?` followed by
/// whitespace. The terminator stays with its sentence. Abbreviations
/// ("Dr. Smith") split early; decimals ("3.5") do not split.
pub(crate) fn sentence_spans(text: &str) -> Vec<SentenceSpan<'_>> {
    let mut spans = Vec::new();
    let mut cursor = text.len() - text.trim_start().len();

    for m in SENTENCE_BREAK_RE.find_iter(text) {
        if m.start() < cursor {
            continue;
        }
        // Terminators are ASCII, so +1 stays on a char boundary.
        let sentence = &text[cursor..m.start() + 1];
        if !sentence.trim().is_empty() {
            spans.push(SentenceSpan {
                start: cursor,
                text: sentence,
            });
        }
        cursor = m.end();
    }

    let tail = text[cursor..].trim_end();
    if !tail.is_empty() {
        spans.push(SentenceSpan {
            start: cursor,
            text: tail,
        });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_index_handles_multibyte() {
        let text = "caf\u{e9} \u{2014} ok";
        let index = CharIndex::new(text);
        let dash = text.find('\u{2014}').unwrap();
        assert_eq!(index.char_offset(dash), 5);
        assert_eq!(index.char_offset(text.len()), text.chars().count());
        assert_eq!(index.byte_offset(5), dash);
    }

    #[test]
    fn sentences_keep_terminators_and_offsets() {
        let text = "  First one. Second?  Third!";
        let spans = sentence_spans(text);
        let texts: Vec<&str> = spans.iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["First one.", "Second?", "Third!"]);
        assert_eq!(spans[0].start, 2);
        assert_eq!(&text[spans[2].start..], "Third!");
    }

    #[test]
    fn decimals_do_not_split() {
        let spans = sentence_spans("Revenue grew 3.5 percent. Costs fell.");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Revenue grew 3.5 percent.");
    }

    #[test]
    fn context_is_elided() {
        let text = "a".repeat(100);
        let ctx = context_around(&text, 50, 52, 20);
        assert!(ctx.starts_with("..."));
        assert!(ctx.ends_with("..."));
    }
}
