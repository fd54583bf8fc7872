//! Grammar of the hash tokens the exporter appends to names.
//!
//! A token is 32 lowercase hex characters separated from the preceding text
//! by a delimiter. Every rule that strips tokens, whether from a file name or
//! from document text, is compiled from the two fragments below.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// A 32 character lowercase hex digest.
pub const HASH_TOKEN: &str = "[0-9a-f]{32}";

/// Separator between a name and its token: spaces, `%20`, `-` or `_`.
pub const DELIMITER: &str = "(?: +|%20|-|_)";

/// `<base><delimiter><token>[<extension>]` anchored to the whole name.
pub static NAME_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?P<base>.+?){DELIMITER}{HASH_TOKEN}(?P<ext>\.[^.]+)?$"))
        .unwrap()
});

/// A token embedded in a path inside document text, followed by `.md` or `/`.
pub static EMBEDDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{DELIMITER}{HASH_TOKEN}(?P<tail>\.md|/)")).unwrap()
});

/// A token left dangling at the end of a link target, e.g. `Foo%20<token>.md)`.
pub static LINK_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{DELIMITER}{HASH_TOKEN}\.md\)$")).unwrap());

/// Remove every token embedded in `text` before `.md` or a path separator.
///
/// Repeats until nothing matches, so stacked tokens are removed too.
pub fn strip_embedded(text: &str) -> Cow<'_, str> {
    if !EMBEDDED_RE.is_match(text) {
        return Cow::Borrowed(text);
    }

    let mut current = text.to_string();
    while EMBEDDED_RE.is_match(&current) {
        current = EMBEDDED_RE.replace_all(&current, "${tail}").into_owned();
    }
    Cow::Owned(current)
}
