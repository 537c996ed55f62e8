//! String casing helpers used to name synthesized types and normalize keys.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ACRONYM_BOUNDARY: Regex = Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap();
    static ref CAMEL_BOUNDARY: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[-\s]+").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"\W").unwrap();
}

fn capitalize_first(piece: &str) -> String {
    let mut chars = piece.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"fooBar-baz"` -> `"FooBarBaz"`. Letters after the first of each piece keep their case.
pub fn camel_case(input: &str) -> String {
    input
        .split(['_', '-', ' '])
        .filter(|piece| !piece.is_empty())
        .map(capitalize_first)
        .collect()
}

/// `"FooBar baz"` -> `"foo_bar_baz"`, `"HTTPServer"` -> `"http_server"`.
pub fn snake_case(input: &str) -> String {
    let out = ACRONYM_BOUNDARY.replace_all(input, "${1}_${2}");
    let out = CAMEL_BOUNDARY.replace_all(&out, "${1}_${2}");
    let out = SEPARATORS.replace_all(&out, "_");
    out.to_lowercase()
}

/// Replace every non-word character with an underscore: `"foo*bar"` -> `"foo_bar"`.
pub fn sanitize_to_word_chars(input: &str) -> String {
    NON_WORD.replace_all(input, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("foo"), "Foo");
        assert_eq!(camel_case("foo_bar_baz"), "FooBarBaz");
        assert_eq!(camel_case("foo-bar_baz"), "FooBarBaz");
        assert_eq!(camel_case("foobarbaz"), "Foobarbaz");
        assert_eq!(camel_case("fooBarBaz"), "FooBarBaz");
        assert_eq!(camel_case("foo bar baz"), "FooBarBaz");
        assert_eq!(camel_case("foo Bar-baz"), "FooBarBaz");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("fooBar"), "foo_bar");
        assert_eq!(snake_case("FooBarBaz"), "foo_bar_baz");
        assert_eq!(snake_case("HTTPServer"), "http_server");
        assert_eq!(snake_case("foo-bar baz"), "foo_bar_baz");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_to_word_chars("foo*bar"), "foo_bar");
        assert_eq!(sanitize_to_word_chars("a.b c"), "a_b_c");
        assert_eq!(sanitize_to_word_chars("plain_1"), "plain_1");
    }
}
