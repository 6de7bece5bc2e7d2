//! Hierarchical route nodes.
//!
//! An [`ActionRoute`] owns its children, addressed by the final segment of
//! their dotted key: `admin` owns `admin.users`, which owns
//! `admin.users.edit`. Ancestry is decided on whole segments, so `users` is
//! never treated as an ancestor of `userslist`.

use crate::logging::{trace, warn};
use crate::route_spec::KEY_DELIMITER;
use crate::{Error, MatchedRoute, RouteCollectionBuilder, RouteSpec, UriMatcher};
use regex::Regex;

#[derive(Debug, Clone)]
pub struct ActionRoute {
    spec: RouteSpec,
    regex: Regex,
    children: Vec<ActionRoute>,
}

impl ActionRoute {
    /// Build a node from a spec whose pattern is already delimited
    /// (`#body#modifiers`).
    pub fn new(spec: RouteSpec) -> Result<Self, Error> {
        let regex =
            RouteCollectionBuilder::build_regex(spec.pattern()).map_err(|reason| {
                Error::InvalidPattern {
                    pattern: spec.pattern().to_string(),
                    compiled: spec.pattern().to_string(),
                    reason,
                }
            })?;

        Ok(Self {
            spec,
            regex,
            children: Vec::new(),
        })
    }

    pub fn spec(&self) -> &RouteSpec {
        &self.spec
    }

    pub fn key(&self) -> &str {
        self.spec.key()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn children(&self) -> &[ActionRoute] {
        &self.children
    }

    pub fn child(&self, suffix: &str) -> Option<&ActionRoute> {
        self.children.iter().find(|c| c.spec.suffix() == suffix)
    }

    fn child_mut(&mut self, suffix: &str) -> Option<&mut ActionRoute> {
        self.children.iter_mut().find(|c| c.spec.suffix() == suffix)
    }

    /// `key` relative to this node, if this node is a proper ancestor of it.
    fn relative<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.key())?
            .strip_prefix(KEY_DELIMITER)
            .filter(|rest| !rest.is_empty())
    }

    /// Add a descendant route.
    ///
    /// A route one level below this node is stored directly; deeper routes
    /// are handed to the existing child on their path, failing when that
    /// child has not been added yet. A route whose suffix is already taken
    /// replaces the existing node.
    pub fn add(&mut self, route: ActionRoute) -> Result<(), Error> {
        let relative = self
            .relative(route.key())
            .map(str::to_string)
            .ok_or_else(|| Error::MissingAncestor {
                key: route.key().to_string(),
                ancestor: self.key().to_string(),
            })?;

        match relative.split_once(KEY_DELIMITER) {
            None => {
                match self.child_mut(&relative) {
                    Some(existing) => existing.replace(route),
                    None => self.children.push(route),
                }
                Ok(())
            }
            Some((head, _)) => {
                let ancestor = format!("{}{}{}", self.key(), KEY_DELIMITER, head);
                match self.child_mut(head) {
                    Some(child) => child.add(route),
                    None => Err(Error::MissingAncestor {
                        key: route.key().to_string(),
                        ancestor,
                    }),
                }
            }
        }
    }

    /// Swap in `route` for this node, keeping the current children when
    /// `route` brings none of its own.
    pub(crate) fn replace(&mut self, mut route: ActionRoute) {
        warn!(key = route.key(), "replacing previously registered route");
        if route.children.is_empty() {
            route.children = std::mem::take(&mut self.children);
        }
        *self = route;
    }

    /// Look up this node or one of its descendants by full key.
    pub fn get(&self, key: &str) -> Option<&ActionRoute> {
        if key == self.key() {
            return Some(self);
        }

        let relative = self.relative(key)?;
        let mut node = self;
        for segment in relative.split(KEY_DELIMITER) {
            node = node.child(segment)?;
        }
        Some(node)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Try to match this subtree against the matcher's remainder.
    ///
    /// Children are tried first so the most specific route wins; this node
    /// itself matches only when nothing is left of the path. A branch that
    /// fails restores the matcher to the state it had before the branch.
    pub fn match_uri(&self, matcher: &mut UriMatcher) -> Option<MatchedRoute> {
        if let Some(required) = self.spec.http_method() {
            if matcher.http_method() != Some(required) {
                trace!(key = self.key(), method = matcher.method(), "method mismatch");
                return None;
            }
        }

        let checkpoint = matcher.clone();
        if !matcher.match_pattern(&self.regex, self.spec.params()) {
            return None;
        }

        for child in &self.children {
            if let Some(found) = child.match_uri(matcher) {
                return Some(found);
            }
        }

        if matcher.is_consumed() {
            return Some(MatchedRoute::from_spec(&self.spec, matcher.captures().clone()));
        }

        *matcher = checkpoint;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(key: &str, pattern: &str) -> ActionRoute {
        let spec = RouteSpec::new(key, format!("#{}#", pattern), "Controller").unwrap();
        ActionRoute::new(spec).unwrap()
    }

    #[test]
    fn test_add_and_get_nested() {
        let mut admin = route("admin", "^/admin");
        admin.add(route("admin.users", "^/users")).unwrap();
        admin.add(route("admin.users.edit", "^/edit")).unwrap();

        assert_eq!(admin.get("admin").unwrap().key(), "admin");
        assert_eq!(admin.get("admin.users").unwrap().key(), "admin.users");
        assert_eq!(admin.get("admin.users.edit").unwrap().key(), "admin.users.edit");
        assert!(admin.exists("admin.users"));
        assert!(!admin.exists("admin.posts"));
    }

    #[test]
    fn test_add_without_parent_fails() {
        let mut admin = route("admin", "^/admin");
        let err = admin.add(route("admin.users.edit", "^/edit")).unwrap_err();

        assert_eq!(
            err,
            Error::MissingAncestor {
                key: "admin.users.edit".into(),
                ancestor: "admin.users".into()
            }
        );
    }

    #[test]
    fn test_prefix_without_delimiter_is_not_ancestor() {
        let mut user = route("user", "^/user");
        assert!(user.add(route("users.list", "^/list")).is_err());
        assert!(user.get("users").is_none());
        assert!(user.get("users.list").is_none());
    }

    #[test]
    fn test_duplicate_suffix_replaces() {
        let mut admin = route("admin", "^/admin");
        admin.add(route("admin.users", "^/users")).unwrap();
        admin.add(route("admin.users", "^/people")).unwrap();

        assert_eq!(admin.children().len(), 1);
        assert_eq!(admin.get("admin.users").unwrap().spec().pattern(), "#^/people#");
    }

    #[test]
    fn test_replacement_keeps_descendants() {
        let mut admin = route("admin", "^/admin");
        admin.add(route("admin.users", "^/users")).unwrap();
        admin.add(route("admin.users.edit", "^/edit")).unwrap();
        admin.add(route("admin.users", "^/people")).unwrap();

        assert!(admin.exists("admin.users.edit"));
    }

    #[test]
    fn test_match_prefers_children() {
        let mut admin = route("admin", "^/admin$|^/admin");
        admin.add(route("admin.users", r"^/users/(\d+)$")).unwrap();

        let mut matcher = UriMatcher::new("/admin/users/5", "http", "GET");
        let matched = admin.match_uri(&mut matcher).unwrap();
        assert_eq!(matched.key(), "admin.users");
    }

    #[test]
    fn test_partial_match_is_rolled_back() {
        let mut admin = route("admin", "^/admin");
        admin.add(route("admin.users", "^/users$")).unwrap();

        let mut matcher = UriMatcher::new("/admin/posts", "http", "GET");
        assert!(admin.match_uri(&mut matcher).is_none());
        assert_eq!(matcher.current_uri(), "/admin/posts");
    }

    #[test]
    fn test_method_constraint() {
        let spec = RouteSpec::new("save", "#^/save$#", "Save")
            .unwrap()
            .with_http_method(crate::HttpMethod::POST);
        let save = ActionRoute::new(spec).unwrap();

        let mut get = UriMatcher::new("/save", "http", "GET");
        assert!(save.match_uri(&mut get).is_none());

        let mut post = UriMatcher::new("/save", "http", "post");
        assert!(save.match_uri(&mut post).is_some());
    }

    #[test]
    fn test_undelimited_pattern_rejected() {
        let spec = RouteSpec::new("raw", "^/raw$", "Raw").unwrap();
        assert!(matches!(
            ActionRoute::new(spec),
            Err(Error::InvalidPattern { .. })
        ));
    }
}
