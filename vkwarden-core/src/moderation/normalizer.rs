//! Case folding plus Latin -> Cyrillic homoglyph folding, so that
//! "kазинo" and "казино" compare equal.
//!
//! Two folds exist. [`normalize_text`] maps by shape (`p` -> `р`), and
//! [`transliterate_text`] maps by sound (`p` -> `п`, `r` -> `р`, `n` -> `н`). Spam
//! typed as "kрipta" only folds to "крипта" through the second one.

/// Lowercases `text` and rewrites every Latin letter that looks like a Cyrillic one
/// into that Cyrillic letter. Everything else passes through unchanged.
///
/// Applying it twice yields the same result as applying it once.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase().chars().map(fold_by_shape).collect()
}

/// Like [`normalize_text`], but Latin letters that stand in for a Cyrillic sound are
/// mapped to that letter instead.
pub fn transliterate_text(text: &str) -> String {
    text.to_lowercase().chars().map(fold_by_sound).collect()
}

fn fold_by_shape(c: char) -> char {
    match c {
        'a' => 'а',
        'b' => 'в',
        'c' => 'с',
        'e' => 'е',
        'o' => 'о',
        'p' => 'р',
        'k' => 'к',
        'x' => 'х',
        'y' => 'у',
        'h' => 'н',
        'm' => 'м',
        'i' => 'и',
        't' => 'т',
        other => other,
    }
}

fn fold_by_sound(c: char) -> char {
    match c {
        'p' => 'п',
        'r' => 'р',
        'n' => 'н',
        other => fold_by_shape(other),
    }
}
