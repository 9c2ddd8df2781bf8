//! 行政區名稱正規化
//!
//! Folds a Vietnamese place name to a comparison key: diacritics removed,
//! lowercase, administrative prefix dropped, whitespace collapsed.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Single-token prefixes, already folded.
const PREFIX_TOKENS: [&str; 5] = ["tinh", "quan", "huyen", "phuong", "xa"];

/// "thành phố", folded.
const CITY_PREFIX: [&str; 2] = ["thanh", "pho"];

/// Total and deterministic; empty input yields an empty string.
///
/// Leading prefixes are stripped until the first token is no longer one, but
/// the last remaining word is never removed. Stripping repeatedly keeps the
/// function idempotent for names such as "Phường Quán Thánh", whose name part
/// itself starts with a prefix word.
pub fn normalize(input: &str) -> String {
    let folded = fold(input);
    let words: Vec<&str> = folded.split_whitespace().collect();
    let mut tokens = words.as_slice();

    loop {
        if tokens.len() > CITY_PREFIX.len() && tokens[..CITY_PREFIX.len()] == CITY_PREFIX {
            tokens = &tokens[CITY_PREFIX.len()..];
        } else if tokens.len() > 1 && PREFIX_TOKENS.contains(&tokens[0]) {
            tokens = &tokens[1..];
        } else {
            break;
        }
    }

    tokens.join(" ")
}

/// NFD-decomposes, drops combining marks and lowercases. `đ` has no
/// decomposition and is mapped to `d` explicitly.
fn fold(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'đ' | 'Đ' => 'd',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}
