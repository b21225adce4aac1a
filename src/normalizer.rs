use std::sync::OnceLock;

use regex::Regex;

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // \s is Unicode-aware, so non-ASCII whitespace survives like ASCII spaces do.
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("static pattern compiles"))
}

fn fold_accent(c: char) -> char {
    match c {
        'á' => 'a',
        'é' => 'e',
        'í' => 'i',
        'ó' => 'o',
        'ú' => 'u',
        'Á' => 'A',
        'É' => 'E',
        'Í' => 'I',
        'Ó' => 'O',
        'Ú' => 'U',
        other => other,
    }
}

/// Canonical storage form of a comment: acute-accented vowels folded to
/// plain ASCII, then everything except ASCII alphanumerics and whitespace
/// dropped. Folding has to run first or the accented vowels would be
/// stripped along with the punctuation.
pub fn normalize(text: &str) -> String {
    let folded: String = text.chars().map(fold_accent).collect();
    disallowed_chars().replace_all(&folded, "").into_owned()
}
