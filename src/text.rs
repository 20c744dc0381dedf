//! Text utilities shared by the extractor, scorer and shift detector:
//! sentence splitting with explicit boundary rules, lenient normalization and
//! word-boundary-aware term lookup.
//!
//! Boundary rules for `split_sentences`:
//! - candidates are `.`, `!`, `?` (runs like `?!` or `...` count as one), plus any
//!   closing quotes/brackets right after them;
//! - a candidate is a boundary only when followed by whitespace or end of text,
//!   so decimals (`5.25`) and fractions (`5-1/4`) never split;
//! - a `.` after a known abbreviation (`U.S.`, `Jan.`, `e.g.`) or a single
//!   letter is not a boundary, and neither is a `.` followed by a lowercase word.

/// One sentence: a trimmed, verbatim slice of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub text: &'a str,
    /// Byte span in the source text.
    pub start: usize,
    pub end: usize,
    /// 0-based position in the sentence sequence.
    pub index: usize,
}

const ABBREVIATIONS: &[&str] = &[
    "u.s", "u.k", "mr", "mrs", "ms", "dr", "prof", "st", "no", "vs", "etc", "e.g", "i.e", "inc",
    "co", "corp", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
    "dec", "approx", "p.m", "a.m",
];

/// Split `text` into sentences. Never allocates sentence text; every returned
/// sentence is a substring of `text`.
pub fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut seg_start = 0usize;

    let mut i = 0;
    while i < chars.len() {
        let (pos, c) = chars[i];
        if !is_terminator(c) {
            i += 1;
            continue;
        }

        // Absorb the whole terminator run plus closing quotes/brackets.
        let mut j = i + 1;
        while j < chars.len() && (is_terminator(chars[j].1) || is_closer(chars[j].1)) {
            j += 1;
        }
        let boundary = chars.get(j).map(|(p, _)| *p).unwrap_or(text.len());
        let followed_by_space = chars.get(j).is_none_or(|(_, ch)| ch.is_whitespace());

        if followed_by_space && !(c == '.' && period_continues(text, pos, &chars[j..])) {
            push_trimmed(&mut out, text, seg_start, boundary);
            seg_start = boundary;
        }
        i = j;
    }
    push_trimmed(&mut out, text, seg_start, text.len());
    out
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}

/// True when the period at byte `pos` does not end the sentence.
fn period_continues(text: &str, pos: usize, rest: &[(usize, char)]) -> bool {
    // Next visible character is lowercase → mid-sentence ("e.g. the", "approx. two").
    if let Some((_, next)) = rest.iter().find(|(_, ch)| !ch.is_whitespace()) {
        if next.is_lowercase() {
            return true;
        }
    }

    let before = &text[..pos];
    let word_start = before
        .char_indices()
        .rev()
        .take_while(|(_, ch)| ch.is_alphanumeric() || *ch == '.')
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(pos);
    let word = before[word_start..].to_ascii_lowercase();
    if word.is_empty() {
        return false;
    }

    let mut letters = word.chars();
    let single_letter = matches!((letters.next(), letters.next()), (Some(ch), None) if ch.is_alphabetic());
    single_letter || ABBREVIATIONS.contains(&word.as_str())
}

fn push_trimmed<'a>(out: &mut Vec<Sentence<'a>>, text: &'a str, start: usize, end: usize) {
    let raw = &text[start..end];
    let lead = raw.len() - raw.trim_start().len();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let s = start + lead;
    out.push(Sentence {
        text: trimmed,
        start: s,
        end: s + trimmed.len(),
        index: out.len(),
    });
}

/// Lowercase + collapse whitespace runs into one space + trim.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(ch.to_ascii_lowercase());
            last_space = false;
        }
    }
    out.trim().to_string()
}

/// Byte offset of the first occurrence of `term` in `haystack` that does not
/// start or end inside a word. Both sides are expected to be `normalize`d.
pub fn find_term(haystack: &str, term: &str) -> Option<usize> {
    if term.is_empty() {
        return None;
    }
    haystack.match_indices(term).map(|(at, _)| at).find(|&at| {
        let before_ok = haystack[..at]
            .chars()
            .next_back()
            .is_none_or(|ch| !ch.is_alphanumeric());
        let after_ok = haystack[at + term.len()..]
            .chars()
            .next()
            .is_none_or(|ch| !ch.is_alphanumeric());
        before_ok && after_ok
    })
}

/// Plain case/whitespace-insensitive containment (no word-boundary check).
pub fn contains_phrase(haystack_norm: &str, phrase: &str) -> bool {
    let p = normalize(phrase);
    !p.is_empty() && haystack_norm.contains(p.as_str())
}
