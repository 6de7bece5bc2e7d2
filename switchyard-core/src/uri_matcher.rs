//! Incremental URI matching.
//!
//! A [`UriMatcher`] tracks one in-flight match attempt against a request
//! path. Every successful [`UriMatcher::match_pattern`] consumes the matched
//! prefix of the current remainder, so nested routes only see
//! what their ancestors left behind.

use crate::logging::trace;
use crate::{Captures, HttpMethod, HttpRequest};
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct UriMatcher {
    uri_path: String,
    scheme: String,
    method: String,
    /// `None` until the first successful match.
    current_uri: Option<String>,
    captures: Captures,
}

impl UriMatcher {
    pub fn new(
        uri_path: impl Into<String>,
        scheme: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            uri_path: uri_path.into(),
            scheme: scheme.into(),
            method: method.into(),
            current_uri: None,
            captures: Captures::new(),
        }
    }

    pub fn from_request(request: &HttpRequest) -> Self {
        Self::new(request.path_info(), request.scheme(), request.method.as_str())
    }

    pub fn uri_path(&self) -> &str {
        &self.uri_path
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn http_method(&self) -> Option<HttpMethod> {
        HttpMethod::from_str(&self.method)
    }

    /// The unmatched remainder of the path.
    pub fn current_uri(&self) -> &str {
        self.current_uri.as_deref().unwrap_or(&self.uri_path)
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn into_captures(self) -> Captures {
        self.captures
    }

    /// Whether every character of the path has been consumed.
    pub fn is_consumed(&self) -> bool {
        self.current_uri().is_empty()
    }

    /// Match `pattern` against the current remainder.
    ///
    /// The match must begin at the front of the remainder; a match found
    /// further in counts as a failure. On failure nothing changes. On
    /// success the matched prefix is consumed and the captures are merged:
    /// named groups keep their name, positional group `n` takes the name
    /// `params[n - 1]` and is dropped when no such name was declared. Groups
    /// that did not take part in the match are skipped.
    pub fn match_pattern(&mut self, pattern: &Regex, params: &[String]) -> bool {
        let current = self.current_uri();
        let Some(caps) = pattern.captures(current) else {
            trace!(pattern = %pattern, uri = %current, "pattern did not match");
            return false;
        };

        let (start, consumed) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
        if start != 0 {
            trace!(pattern = %pattern, uri = %current, start, "match is not a prefix");
            return false;
        }
        let remainder = current[consumed..].to_string();

        let mut merged = Vec::new();
        for (index, name) in pattern.capture_names().enumerate().skip(1) {
            let Some(group) = caps.get(index) else {
                continue;
            };
            let key = match name {
                Some(name) => name,
                None => match params.get(index - 1) {
                    Some(param) => param.as_str(),
                    None => continue,
                },
            };
            merged.push((key.to_string(), group.as_str().to_string()));
        }

        trace!(
            pattern = %pattern,
            consumed,
            remainder = %remainder,
            captures = merged.len(),
            "pattern matched"
        );

        for (key, value) in merged {
            self.captures.insert(&key, value);
        }
        self.current_uri = Some(remainder);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_capture_is_renamed() {
        let mut matcher = UriMatcher::new("/users/42", "http", "GET");
        let pattern = Regex::new(r"^/users/(\d+)$").unwrap();

        assert!(matcher.match_pattern(&pattern, &params(&["id"])));
        assert_eq!(matcher.captures().get("id"), Some("42"));
        assert!(!matcher.captures().contains("1"));
        assert!(matcher.is_consumed());
    }

    #[test]
    fn test_unnamed_capture_without_param_is_dropped() {
        let mut matcher = UriMatcher::new("/a/b", "http", "GET");
        let pattern = Regex::new(r"^/(\w)/(\w)").unwrap();

        assert!(matcher.match_pattern(&pattern, &params(&["first"])));
        assert_eq!(matcher.captures().len(), 1);
        assert_eq!(matcher.captures().get("first"), Some("a"));
    }

    #[test]
    fn test_named_groups_keep_their_names() {
        let mut matcher = UriMatcher::new("/blog/2024/rust", "http", "GET");
        let pattern = Regex::new(r"^/blog/(?P<year>\d{4})/(\w+)").unwrap();

        assert!(matcher.match_pattern(&pattern, &params(&["ignored", "slug"])));
        assert_eq!(matcher.captures().get("year"), Some("2024"));
        assert_eq!(matcher.captures().get("slug"), Some("rust"));
        assert!(!matcher.captures().contains("ignored"));
    }

    #[test]
    fn test_successive_matches_consume_prefixes() {
        let mut matcher = UriMatcher::new("/admin/users/7/edit", "https", "POST");
        let admin = Regex::new("^/admin").unwrap();
        let users = Regex::new(r"^/users/(\d+)").unwrap();

        assert_eq!(matcher.current_uri(), "/admin/users/7/edit");
        assert!(matcher.match_pattern(&admin, &[]));
        assert_eq!(matcher.current_uri(), "/users/7/edit");
        assert!(matcher.match_pattern(&users, &params(&["id"])));
        assert_eq!(matcher.current_uri(), "/edit");
        assert_eq!(matcher.uri_path(), "/admin/users/7/edit");
        assert!(!matcher.is_consumed());
    }

    #[test]
    fn test_failed_match_leaves_state_untouched() {
        let mut matcher = UriMatcher::new("/admin/users", "http", "GET");
        assert!(matcher.match_pattern(&Regex::new("^/(admin)").unwrap(), &params(&["area"])));
        let before = matcher.clone();

        assert!(!matcher.match_pattern(&Regex::new(r"^/posts/(\d+)").unwrap(), &params(&["id"])));
        assert_eq!(matcher, before);
    }

    #[test]
    fn test_later_capture_overwrites_same_name() {
        let mut matcher = UriMatcher::new("/en/fr", "http", "GET");
        let lang = Regex::new("^/(\\w+)").unwrap();

        assert!(matcher.match_pattern(&lang, &params(&["lang"])));
        assert!(matcher.match_pattern(&lang, &params(&["lang"])));
        assert_eq!(matcher.captures().get("lang"), Some("fr"));
        assert_eq!(matcher.captures().len(), 1);
    }

    #[test]
    fn test_optional_group_that_did_not_participate_is_skipped() {
        let mut matcher = UriMatcher::new("/foo", "http", "GET");
        let pattern = Regex::new("^/foo(bar)?").unwrap();

        assert!(matcher.match_pattern(&pattern, &params(&["suffix"])));
        assert!(matcher.captures().is_empty());
    }

    #[test]
    fn test_match_must_start_at_front_of_remainder() {
        let mut matcher = UriMatcher::new("/junk/users", "http", "GET");
        let users = Regex::new("/users").unwrap();

        assert!(!matcher.match_pattern(&users, &[]));
        assert_eq!(matcher.current_uri(), "/junk/users");

        let mut matcher = UriMatcher::new("/users/7", "http", "GET");
        assert!(matcher.match_pattern(&users, &[]));
        assert_eq!(matcher.current_uri(), "/7");
    }
}
