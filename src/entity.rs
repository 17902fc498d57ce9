// WHY: XML character entity resolution used when extracting inter-token whitespace
// and finalizing the original text of words

use regex_automata::meta::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

const ENTITY_PATTERN: &str = r"&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});";

fn entity_regex() -> &'static Regex {
    static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
    ENTITY_REGEX.get_or_init(|| Regex::new(ENTITY_PATTERN).expect("entity pattern is valid"))
}

/// Byte ranges of every entity-shaped sequence in `text`, known or not
pub fn find_entities(text: &str) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
    entity_regex().find_iter(text).map(|m| m.range())
}

/// Resolve a single entity sequence such as `&amp;` or `&#x20;`
pub fn resolve(entity: &str) -> Option<char> {
    let body = entity.strip_prefix('&')?.strip_suffix(';')?;

    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    let ch = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "ensp" => '\u{2002}',
        "emsp" => '\u{2003}',
        "thinsp" => '\u{2009}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "sbquo" => '\u{201A}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "bdquo" => '\u{201E}',
        "laquo" => '\u{00AB}',
        "raquo" => '\u{00BB}',
        "hellip" => '\u{2026}',
        "bull" => '\u{2022}',
        "middot" => '\u{00B7}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "deg" => '\u{00B0}',
        "euro" => '\u{20AC}',
        "pound" => '\u{00A3}',
        "yen" => '\u{00A5}',
        "cent" => '\u{00A2}',
        "sect" => '\u{00A7}',
        "para" => '\u{00B6}',
        "times" => '\u{00D7}',
        "divide" => '\u{00F7}',
        "iexcl" => '\u{00A1}',
        "iquest" => '\u{00BF}',
        "shy" => '\u{00AD}',
        _ => return None,
    };
    Some(ch)
}

/// Replace every known entity in `text`; unknown sequences are kept verbatim
pub fn unescape_all(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    let mut replaced = false;

    for range in find_entities(text) {
        if let Some(ch) = resolve(&text[range.clone()]) {
            result.push_str(&text[last..range.start]);
            result.push(ch);
            last = range.end;
            replaced = true;
        }
    }

    if !replaced {
        return Cow::Borrowed(text);
    }

    result.push_str(&text[last..]);
    Cow::Owned(result)
}
