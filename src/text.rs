//! Normalization applied to article text before it becomes a typing target.

/// First and last code point of the CJK ideograph block that gets separated
/// from adjacent Latin letters.
const CJK_FIRST: char = '\u{4e00}';
const CJK_LAST: char = '\u{9fa5}';

pub fn is_cjk(c: char) -> bool {
    (CJK_FIRST..=CJK_LAST).contains(&c)
}

fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Newlines (`\r\n`, `\n`, `\r`) become single spaces, the result is
/// trimmed, and a space is inserted wherever a CJK ideograph touches a Latin
/// letter.
pub fn normalize(raw: &str) -> String {
    let flattened = raw.replace("\r\n", " ").replace(['\n', '\r'], " ");
    space_cjk_latin(flattened.trim())
}

/// Inserts a space at every CJK/Latin boundary, in either direction.
pub fn space_cjk_latin(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if let Some(p) = prev {
            let boundary =
                (is_cjk(p) && is_latin_letter(c)) || (is_latin_letter(p) && is_cjk(c));
            if boundary {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }

    out
}

/// Number of typing targets the text produces once normalized.
pub fn target_len(raw: &str) -> usize {
    normalize(raw).chars().count()
}
