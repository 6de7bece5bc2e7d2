//! Top-level route registry.
//!
//! A [`RouteCollection`] holds the root [`ActionRoute`]s in the order they
//! were registered and delegates dotted keys to the root that owns them.
//! It is assembled once at startup and only read while serving requests.

use crate::logging::trace;
use crate::route_spec::KEY_DELIMITER;
use crate::{ActionRoute, Error, MatchedRoute, UriMatcher};

#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    roots: Vec<ActionRoute>,
    registration_order: Vec<String>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route; dotted keys require every ancestor to be present.
    pub fn add(&mut self, route: ActionRoute) -> Result<(), Error> {
        let key = route.key().to_string();

        match key.split_once(KEY_DELIMITER) {
            None => match self.roots.iter_mut().find(|r| r.key() == key) {
                Some(existing) => existing.replace(route),
                None => self.roots.push(route),
            },
            Some((root_key, _)) => {
                let root = self
                    .roots
                    .iter_mut()
                    .find(|r| r.key() == root_key)
                    .ok_or_else(|| Error::MissingAncestor {
                        key: key.clone(),
                        ancestor: root_key.to_string(),
                    })?;
                root.add(route)?;
            }
        }

        self.registration_order.retain(|k| *k != key);
        self.registration_order.push(key);
        Ok(())
    }

    /// Look up a route by key, walking dotted keys through the tree.
    pub fn get(&self, key: &str) -> Option<&ActionRoute> {
        let root_key = key.split(KEY_DELIMITER).next()?;
        self.roots
            .iter()
            .find(|r| r.key() == root_key)
            .and_then(|root| root.get(key))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn roots(&self) -> &[ActionRoute] {
        &self.roots
    }

    /// Every registered key, in the order it was added.
    pub fn registration_order(&self) -> &[String] {
        &self.registration_order
    }

    pub fn len(&self) -> usize {
        self.registration_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registration_order.is_empty()
    }

    /// Find the route matching the matcher's path.
    ///
    /// Roots are tried in registration order and the first subtree that
    /// consumes the whole path wins.
    pub fn match_uri(&self, matcher: &mut UriMatcher) -> Option<MatchedRoute> {
        let found = self.roots.iter().find_map(|root| root.match_uri(matcher));

        match &found {
            Some(matched) => trace!(key = matched.key(), uri = matcher.uri_path(), "uri matched"),
            None => trace!(uri = matcher.uri_path(), "no route matched"),
        }
        found
    }
}
