//! UTM checks against the referring URL.
//!
//! These are case-insensitive substring checks on the raw URL, not query-string
//! parsing, so `utm_source=` appearing anywhere in the URL (a slug, a fragment) counts.
//! Existing campaign configurations depend on that behaviour.

use std::borrow::Cow;

const EMAIL_MEDIUM: &str = "utm_medium=email";

/// Form-style URL decoding: `+` is a space, then percent escapes are resolved.
/// Invalid UTF-8 after decoding is replaced rather than rejected.
pub fn url_decode(input: &str) -> String {
    let spaced: Cow<'_, str> = if input.contains('+') {
        Cow::Owned(input.replace('+', " "))
    } else {
        Cow::Borrowed(input)
    };
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes()))
            .into_owned(),
    }
}

/// True when the referer carries `utm_source=<source>`, comparing decoded forms so that
/// `Our+Newsletter`, `Our%20Newsletter` and `Our Newsletter` are equivalent.
pub fn matches_utm_source(referer: &str, source: &str) -> bool {
    let source = url_decode(source);
    if referer.is_empty() || source.is_empty() {
        return false;
    }
    let needle = format!("utm_source={source}").to_lowercase();
    url_decode(referer).to_lowercase().contains(&needle)
}

/// True when the visitor arrived from an email campaign link.
pub fn has_email_medium(referer: &str) -> bool {
    !referer.is_empty() && referer.to_lowercase().contains(EMAIL_MEDIUM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_decode_plus_and_percent() {
        assert_eq!(url_decode("Our+Newsletter"), "Our Newsletter");
        assert_eq!(url_decode("Our%20Newsletter"), "Our Newsletter");
        assert_eq!(url_decode("plain"), "plain");
    }

    #[test]
    fn test_url_decode_invalid_utf8_is_lossy() {
        assert_eq!(url_decode("a%FFb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_utm_source_space_encodings() {
        let source = "Our Newsletter";
        assert!(matches_utm_source(
            "http://example.com?utm_source=Our+Newsletter",
            source
        ));
        assert!(matches_utm_source(
            "http://example.com?utm_source=Our%20Newsletter",
            source
        ));
        assert!(!matches_utm_source(
            "http://example.com?utm_source=twitter",
            source
        ));
    }

    #[test]
    fn test_utm_source_case_insensitive() {
        assert!(matches_utm_source(
            "http://example.com/?UTM_SOURCE=our+newsletter&x=1",
            "Our Newsletter"
        ));
    }

    #[test]
    fn test_utm_source_encoded_setting() {
        assert!(matches_utm_source(
            "http://example.com?utm_source=Our+Newsletter",
            "Our%20Newsletter"
        ));
    }

    #[test]
    fn test_utm_source_empty_inputs_never_match() {
        assert!(!matches_utm_source("", "twitter"));
        assert!(!matches_utm_source("http://example.com?utm_source=", ""));
    }

    #[test]
    fn test_substring_false_positive_preserved() {
        // Matched outside the query string too.
        assert!(matches_utm_source(
            "http://example.com/why-utm_source=twitter-matters/",
            "twitter"
        ));
    }

    #[test]
    fn test_email_medium() {
        assert!(has_email_medium("http://example.com?utm_medium=email"));
        assert!(has_email_medium("http://example.com?UTM_MEDIUM=Email&utm_source=x"));
        assert!(!has_email_medium("http://example.com?utm_medium=conduit"));
        assert!(!has_email_medium(""));
    }
}
