//! Re-chunk cleaned article text into display-sized paragraphs.
//!
//! Cleaning flattens the extracted body into a single run of prose, so the
//! segmenter rebuilds paragraph breaks heuristically: sentences are packed
//! into paragraphs up to a soft length bound, and shouty all-caps lines
//! (section headings, "BREAKING NEWS" banners) always open a new paragraph,
//! terminated like any other sentence so they read apart from what follows.

/// Paragraphs are closed before they reach this many characters. A single
/// sentence longer than this still becomes its own segment.
pub const SOFT_MAX_SEGMENT_CHARS: usize = 350;

const SENTENCE_BREAK: &str = ". ";
const HEADING_MIN_LETTERS: usize = 3;
const HEADING_UPPERCASE_RATIO: f64 = 0.8;

/// True for lines with more than three letters of which over 80% are
/// uppercase.
pub fn is_heading(line: &str) -> bool {
    let (letters, uppercase) = line
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(letters, upper), c| {
            (letters + 1, upper + usize::from(c.is_uppercase()))
        });

    letters > HEADING_MIN_LETTERS && uppercase as f64 / letters as f64 > HEADING_UPPERCASE_RATIO
}

/// Split `text` into ordered, non-empty paragraphs.
///
/// Empty or whitespace-only input yields a single segment holding the input
/// unchanged.
pub fn segment(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split(SENTENCE_BREAK).map(str::trim).filter(|l| !l.is_empty()) {
        let sentence = if line.ends_with('.') {
            line.to_string()
        } else {
            format!("{line}.")
        };
        let sentence_len = sentence.chars().count();

        if is_heading(line) {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            current = sentence;
            current_len = sentence_len;
            continue;
        }

        if current.is_empty() {
            current = sentence;
            current_len = sentence_len;
        } else if current_len + 1 + sentence_len < SOFT_MAX_SEGMENT_CHARS {
            current.push(' ');
            current.push_str(&sentence);
            current_len += 1 + sentence_len;
        } else {
            segments.push(std::mem::replace(&mut current, sentence));
            current_len = sentence_len;
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    if segments.is_empty() {
        return vec![text.to_string()];
    }
    segments
}
