//! Translation tag detection.
//!
//! Live translators annotate their messages with the language they are
//! translating into. Two conventions are recognized:
//!
//! - a bracket block at the start, e.g. `[en] hello` or `【EN】- hello`
//! - a short prefix before a delimiter, e.g. `en: hello` or `en- hello`
//!
//! Bracket blocks are tried first.

use serde::{Deserialize, Serialize};

/// Furthest position (in characters) a prefix delimiter may appear at.
pub const MAX_LANG_TAG_LEN: usize = 7;

/// Opening tokens and the closing token each one pairs with.
const LANG_TOKENS: [(char, char); 12] = [
    ('[', ']'),
    ('{', '}'),
    ('(', ')'),
    ('|', '|'),
    ('<', '>'),
    ('【', '】'),
    ('「', '」'),
    ('『', '』'),
    ('〚', '〛'),
    ('（', '）'),
    ('〈', '〉'),
    ('⁽', '₎'),
];

/// Prefix delimiters, in the order they are tried.
const TRANS_DELIMITERS: [char; 2] = ['-', ':'];

/// A language tag pulled out of a message, plus the rest of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationTag {
    /// Raw tag text, unnormalized. May be empty.
    pub lang: String,
    /// Message text with the tag and separator removed.
    pub msg: String,
}

impl TranslationTag {
    pub fn new(lang: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            msg: msg.into(),
        }
    }
}

/// Whitespace plus the byte-order mark, which chat clients sometimes leave
/// at the start of a message.
fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn trim(s: &str) -> &str {
    s.trim_matches(is_trimmable)
}

fn closing_token(open: char) -> Option<char> {
    LANG_TOKENS
        .iter()
        .find(|(opener, _)| *opener == open)
        .map(|(_, closer)| *closer)
}

/// Detect a translation tag in `message`.
///
/// Returns `None` when the message carries no recognizable tag. Never panics.
///
/// # Example
/// ```
/// use livechat_filter::translation::{parse_translation, TranslationTag};
///
/// assert_eq!(
///     parse_translation("[en] - hello"),
///     Some(TranslationTag::new("en", "hello"))
/// );
/// assert_eq!(parse_translation("no structure here"), None);
/// ```
pub fn parse_translation(message: &str) -> Option<TranslationTag> {
    let trimmed = trim(message);
    parse_bracket_block(trimmed).or_else(|| parse_delimited(trimmed))
}

/// `[lang] msg`, `[lang] - msg`, `[lang]: msg`.
///
/// The closer is the first occurrence of the token paired with the opener,
/// wherever it is. For `|`, which closes itself, that is the opener, so the
/// tag comes out empty.
fn parse_bracket_block(trimmed: &str) -> Option<TranslationTag> {
    let open = trimmed.chars().next()?;
    let close = closing_token(open)?;
    let close_idx = trimmed.find(close)?;

    let lang = trimmed.get(open.len_utf8()..close_idx).unwrap_or_default();

    let mut msg = trim(&trimmed[close_idx + close.len_utf8()..]);
    if let Some(rest) = msg.strip_prefix(['-', ':']) {
        msg = trim(rest);
    }

    Some(TranslationTag::new(lang, msg))
}

/// `lang- msg`, `lang: msg`, with the delimiter within the first
/// `MAX_LANG_TAG_LEN` characters.
fn parse_delimited(trimmed: &str) -> Option<TranslationTag> {
    for delim in TRANS_DELIMITERS {
        let Some((char_idx, (byte_idx, _))) = trimmed
            .char_indices()
            .enumerate()
            .find(|(_, (_, c))| *c == delim)
        else {
            continue;
        };

        if char_idx < MAX_LANG_TAG_LEN {
            let lang: String = trim(&trimmed[..byte_idx])
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            let msg = trim(&trimmed[byte_idx + delim.len_utf8()..]);

            return Some(TranslationTag::new(lang, msg));
        }
    }

    None
}
