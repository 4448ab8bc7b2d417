//! Heading identifier generation.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left verbatim by the identifier encoding, beyond
/// alphanumerics. Matches the conventional URI-component escape set so the
/// generated ids survive round-trips through `href="#..."` fragments.
const ID_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Derive a stable identifier from a heading's flattened text.
///
/// Spaces become underscores, then the result is percent-encoded. The same
/// text always yields the same identifier.
///
/// # Examples
///
/// ```
/// use quillpress_core::anchor::anchor_id;
///
/// assert_eq!(anchor_id("Hello World"), "Hello_World");
/// assert_eq!(anchor_id("Favicons & Caching"), "Favicons_%26_Caching");
/// ```
pub fn anchor_id(text: &str) -> String {
    let underscored = text.replace(' ', "_");
    utf8_percent_encode(&underscored, ID_ESCAPE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(anchor_id("Hello World"), "Hello_World");
        assert_eq!(anchor_id("a b c"), "a_b_c");
    }

    #[test]
    fn test_plain_words_unchanged() {
        assert_eq!(anchor_id("References"), "References");
        assert_eq!(anchor_id("already_joined"), "already_joined");
    }

    #[test]
    fn test_reserved_characters_are_encoded() {
        assert_eq!(anchor_id("Q&A"), "Q%26A");
        assert_eq!(anchor_id("50% done"), "50%25_done");
        assert_eq!(anchor_id("a/b"), "a%2Fb");
    }

    #[test]
    fn test_unreserved_punctuation_survives() {
        assert_eq!(anchor_id("v1.2-rc_3"), "v1.2-rc_3");
        assert_eq!(anchor_id("What's new"), "What's_new");
    }

    #[test]
    fn test_non_ascii_is_percent_encoded() {
        assert_eq!(anchor_id("Café"), "Caf%C3%A9");
    }

    #[test]
    fn test_stable() {
        assert_eq!(anchor_id("Stable Heading"), anchor_id("Stable Heading"));
    }
}
