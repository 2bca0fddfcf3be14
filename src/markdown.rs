use std::sync::OnceLock;

use regex::Regex;

// Applied in order; images go before links so `![alt](src)` keeps its alt text.
const RULES: [(&str, &str); 20] = [
    (r"(?s)```.*?```", ""),
    (r"`([^`]+)`", "${1}"),
    (r"(?m)^#{1,6}\s+(.+)$", "${1}"),
    (r"\*\*([^*]+)\*\*", "${1}"),
    (r"__([^_]+)__", "${1}"),
    (r"\*([^*]+)\*", "${1}"),
    (r"_([^_]+)_", "${1}"),
    (r"~~([^~]+)~~", "${1}"),
    (r"!\[([^\]]*)\]\([^)]+\)", "${1}"),
    (r"\[([^\]]+)\]\([^)]+\)", "${1}"),
    (r"(?m)^>\s+(.+)$", "${1}"),
    (r"(?m)^[-*]{3,}$", ""),
    (r"(?m)^\s*[-*+]\s+(.+)$", "${1}"),
    (r"(?m)^\s*\d+\.\s+(.+)$", "${1}"),
    (r"<[^>]*>", ""),
    (r"\n\s*\n", "\n\n"),
    (r"\n{3,}", "\n\n"),
    // trim happens here
    (r"\n\n", ". "),
    (r"\n", " "),
    (r"\s+", " "),
];

const TRIM_AFTER: usize = 17;

fn rules() -> &'static [(Regex, &'static str)] {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .map(|(pattern, rep)| (Regex::new(pattern).expect("markdown rule must compile"), *rep))
            .collect()
    })
}

/// Flattens markdown into a single paragraph of plain text: formatting
/// markers, code blocks and HTML are dropped, paragraph breaks become `. `.
pub fn markdown_to_plain_text(markdown: &str) -> String {
    let mut text = markdown.to_string();
    for (i, (re, rep)) in rules().iter().enumerate() {
        if i == TRIM_AFTER {
            text = text.trim().to_string();
        }
        text = re.replace_all(&text, *rep).into_owned();
    }
    text
}
