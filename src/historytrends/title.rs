use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{Z}\t\r\n]+").expect("space regex"));

/// Collapse runs of Unicode separators and tab/CR/LF into one space.
///
/// The extension only folds `[\t\r\n]` and then repeated `\s`, which leaves
/// lone non-ASCII spaces such as U+00A0 in place.
pub fn normalize_title(title: &str) -> String {
    SPACE_RUN.replace_all(title, " ").into_owned()
}
