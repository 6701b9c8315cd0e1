//! Query-string and form-body encoding.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that would change the meaning of a query or form component.
/// Unreserved characters and `@` pass through, so `username=a@b.com` stays
/// readable on the wire.
const COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// `k1=v1&k2=v2` with each key and value encoded.
pub fn form_encode(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append a query string to `path`. Returns `path` unchanged when `pairs`
/// is empty.
pub fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    format!("{path}?{}", form_encode(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_keeps_email_readable() {
        let body = form_encode(&[("username", "user@example.com"), ("password", "secret")]);
        assert_eq!(body, "username=user@example.com&password=secret");
    }

    #[test]
    fn form_escapes_separators() {
        let body = form_encode(&[("password", "a&b=c+d %")]);
        assert_eq!(body, "password=a%26b%3Dc%2Bd%20%25");
    }

    #[test]
    fn non_ascii_is_percent_encoded() {
        assert_eq!(encode_component("кино"), "%D0%BA%D0%B8%D0%BD%D0%BE");
    }

    #[test]
    fn query_is_appended() {
        assert_eq!(
            with_query("/cinema/search", &[("query", "blade runner")]),
            "/cinema/search?query=blade%20runner"
        );
        assert_eq!(with_query("/cinema/trending", &[]), "/cinema/trending");
    }
}
