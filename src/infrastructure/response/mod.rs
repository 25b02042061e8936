use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_ICEBREAKER_CHARS: usize = 280;

static HIDDEN_BLOCK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(think|reasoning|internal)>.*?</(think|reasoning|internal)>|<think\s*/>")
        .expect("hidden block pattern is valid")
});

static LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(icebreaker|opening line|answer)\s*:\s*")
        .expect("label pattern is valid")
});

static WHITESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Strips model artifacts (hidden reasoning blocks, labels, wrapping quotes)
/// and folds the answer onto a single line no longer than `MAX_ICEBREAKER_CHARS`.
pub fn clean_icebreaker(response: &str) -> String {
    let without_blocks = HIDDEN_BLOCK_PATTERN.replace_all(response, "");
    let first_paragraph = without_blocks
        .trim()
        .split("\n\n")
        .next()
        .unwrap_or_default();
    let unlabeled = LABEL_PATTERN.replace(first_paragraph, "");
    let single_line = WHITESPACE_PATTERN.replace_all(unlabeled.trim(), " ");
    let unquoted = single_line
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '`'))
        .trim();
    truncate_at_word(unquoted, MAX_ICEBREAKER_CHARS)
}

fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(space) if space > 0 => format!("{}…", cut[..space].trim_end_matches([',', ';', ':'])),
        _ => cut,
    }
}
