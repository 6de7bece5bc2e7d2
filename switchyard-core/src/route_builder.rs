//! Compiles raw route definitions into a [`RouteCollection`].
//!
//! Patterns are stored in a delimited form, `#body#modifiers`. `#` was
//! chosen as the delimiter so that `/` in URI paths needs no escaping; any
//! `#` the author left unescaped in the body is escaped during compilation.
//!
//! Routes are bucketed by key depth and added shallowest first, which
//! guarantees a parent exists before any child that names it.

use crate::logging::debug;
use crate::{ActionRoute, Error, RawPattern, RouteCollection, RouteData, RouteSpec};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

/// Delimiter wrapped around compiled pattern bodies.
pub const PATTERN_DELIMITER: char = '#';

// An escaped character (kept as-is) or a bare delimiter (to be escaped).
static DELIMITER_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\\.|#").unwrap());

/// Accumulates routes by depth and assembles the collection.
#[derive(Debug, Default)]
pub struct RouteCollectionBuilder {
    buckets: BTreeMap<usize, Vec<ActionRoute>>,
}

impl RouteCollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a raw pattern in delimiters, escaping stray `#` in its body.
    ///
    /// Characters the author already escaped, including `\#` and a trailing
    /// `\$`, pass through untouched, so compiling an already-escaped body
    /// yields the same body again.
    pub fn compile_regex(raw: &RawPattern) -> String {
        format!(
            "{delim}{}{delim}{}",
            escape_delimiters(raw.body()),
            raw.modifiers(),
            delim = PATTERN_DELIMITER
        )
    }

    /// Trial-compile a delimited pattern and run it against the empty string.
    ///
    /// Returns the engine's error text on failure.
    pub fn validate_regex(compiled: &str) -> Result<(), String> {
        let regex = Self::build_regex(compiled)?;
        let _ = regex.is_match("");
        Ok(())
    }

    /// Turn a delimited pattern into a [`Regex`], applying its modifiers.
    ///
    /// Supported modifiers: `i`, `m`, `s`, `x`, `U` (swap greed), `u`
    /// (unicode, already the default) and `D` (accepted, no effect).
    pub fn build_regex(compiled: &str) -> Result<Regex, String> {
        let (body, modifiers) = split_delimited(compiled)?;

        let mut builder = RegexBuilder::new(body);
        for flag in modifiers.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                'U' => builder.swap_greed(true),
                'u' => builder.unicode(true),
                'D' => &mut builder,
                other => return Err(format!("unknown pattern modifier '{}'", other)),
            };
        }

        builder.build().map_err(|e| e.to_string())
    }

    /// Validate, compile and bucket a single route definition.
    pub fn load_route(&mut self, data: RouteData) -> Result<(), Error> {
        let spec = RouteSpec::from_data(&data)?;
        let raw = data
            .pattern
            .as_ref()
            .ok_or_else(|| Error::InvalidRoute("route pattern is required".to_string()))?;

        let compiled = Self::compile_regex(raw);
        if let Err(reason) = Self::validate_regex(&compiled) {
            return Err(Error::InvalidPattern {
                pattern: raw.body().to_string(),
                compiled,
                reason,
            });
        }

        let route = ActionRoute::new(spec.with_pattern(compiled))?;
        let depth = route.spec().depth();

        debug!(key = route.key(), depth, pattern = route.spec().pattern(), "route loaded");
        self.buckets.entry(depth).or_default().push(route);
        Ok(())
    }

    pub fn load_routes<I>(&mut self, routes: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = RouteData>,
    {
        for data in routes {
            self.load_route(data)?;
        }
        Ok(())
    }

    /// Depths that currently hold at least one route, ascending.
    pub fn depths(&self) -> Vec<usize> {
        self.buckets.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Add every bucket, shallowest first, to a fresh collection.
    pub fn create_route_collection(self) -> Result<RouteCollection, Error> {
        let mut collection = RouteCollection::new();

        for (depth, routes) in self.buckets {
            debug!(depth, count = routes.len(), "registering route bucket");
            for route in routes {
                collection.add(route)?;
            }
        }

        Ok(collection)
    }
}

fn escape_delimiters(body: &str) -> String {
    DELIMITER_ESCAPE
        .replace_all(body, |caps: &regex::Captures<'_>| {
            let matched = &caps[0];
            if matched.len() == 1 {
                format!("\\{}", PATTERN_DELIMITER)
            } else {
                matched.to_string()
            }
        })
        .into_owned()
}

/// Split `#body#mods` at the first unescaped delimiter after the opening one.
fn split_delimited(compiled: &str) -> Result<(&str, &str), String> {
    let inner = compiled
        .strip_prefix(PATTERN_DELIMITER)
        .ok_or_else(|| format!("pattern must start with '{}'", PATTERN_DELIMITER))?;

    let mut escaped = false;
    for (index, ch) in inner.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            PATTERN_DELIMITER => return Ok((&inner[..index], &inner[index + 1..])),
            _ => {}
        }
    }

    Err(format!("pattern has no closing '{}'", PATTERN_DELIMITER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_with_modifiers() {
        let compiled = RouteCollectionBuilder::compile_regex(&("foo(bar)?", "i").into());
        assert_eq!(compiled, "#foo(bar)?#i");
        assert_eq!(RouteCollectionBuilder::validate_regex(&compiled), Ok(()));
    }

    #[test]
    fn test_compile_escapes_bare_delimiter() {
        let compiled = RouteCollectionBuilder::compile_regex(&"^/tag/#(\\w+)$".into());
        assert_eq!(compiled, "#^/tag/\\#(\\w+)$#");
    }

    #[test]
    fn test_compile_is_idempotent_on_escaped_input() {
        let once = RouteCollectionBuilder::compile_regex(&"^/a\\#b/c\\$".into());
        assert_eq!(once, "#^/a\\#b/c\\$#");

        let (body, _) = split_delimited(&once).unwrap();
        let twice = RouteCollectionBuilder::compile_regex(&RawPattern::Plain(body.to_string()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_escaped_backslash_before_delimiter() {
        let compiled = RouteCollectionBuilder::compile_regex(&"a\\\\#".into());
        assert_eq!(compiled, "#a\\\\\\##");
        let regex = RouteCollectionBuilder::build_regex(&compiled).unwrap();
        assert!(regex.is_match("a\\#"));
    }

    #[test]
    fn test_modifiers_take_effect() {
        let regex = RouteCollectionBuilder::build_regex("#^/users$#i").unwrap();
        assert!(regex.is_match("/USERS"));

        let greedy = RouteCollectionBuilder::build_regex("#^a+#U").unwrap();
        assert_eq!(greedy.find("aaa").map(|m| m.as_str()), Some("a"));
    }

    #[test]
    fn test_validate_reports_engine_errors() {
        let err = RouteCollectionBuilder::validate_regex("#foo(#").unwrap_err();
        assert!(!err.is_empty());

        let err = RouteCollectionBuilder::validate_regex("#foo#q").unwrap_err();
        assert!(err.contains("modifier"));

        assert!(RouteCollectionBuilder::validate_regex("foo").is_err());
        assert!(RouteCollectionBuilder::validate_regex("#foo").is_err());
    }

    #[test]
    fn test_load_route_rejects_broken_pattern() {
        let mut builder = RouteCollectionBuilder::new();
        let err = builder
            .load_route(RouteData::new("broken", "^/(unclosed", "Broken"))
            .unwrap_err();

        match err {
            Error::InvalidPattern {
                pattern, compiled, ..
            } => {
                assert_eq!(pattern, "^/(unclosed");
                assert_eq!(compiled, "#^/(unclosed#");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(builder.is_empty());
    }

    #[test]
    fn test_buckets_are_ordered_by_depth() {
        let mut builder = RouteCollectionBuilder::new();
        builder
            .load_routes([
                RouteData::new("admin.users.edit", "^/edit", "Edit"),
                RouteData::new("admin.users", "^/users", "Users"),
                RouteData::new("admin", "^/admin", "Admin"),
            ])
            .unwrap();

        assert_eq!(builder.depths(), vec![0, 1, 2]);
        assert_eq!(builder.len(), 3);

        let collection = builder.create_route_collection().unwrap();
        assert_eq!(
            collection.registration_order(),
            ["admin", "admin.users", "admin.users.edit"]
        );
    }
}
