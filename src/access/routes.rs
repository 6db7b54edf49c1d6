//! Route patterns compiled once into anchored matchers.

use anyhow::{Context, Result};
use regex::Regex;

use super::catalog::AppRoute;

#[derive(Clone, Debug)]
pub struct RoutePattern {
    pattern: String,
    matcher: Regex,
    required: Vec<String>,
}

impl RoutePattern {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Empty means no declared requirement.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}

/// Ordered route -> required-permission table.
#[derive(Clone, Debug)]
pub struct RouteTable {
    routes: Vec<RoutePattern>,
}

impl RouteTable {
    pub fn compile<P, R>(entries: impl IntoIterator<Item = (P, R)>) -> Result<Self>
    where
        P: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let marker = Regex::new(r":\w+").context("compile segment marker")?;
        let mut routes = Vec::new();
        for (pattern, required) in entries {
            let pattern = pattern.as_ref();
            let source = matcher_source(&marker, pattern);
            let matcher = Regex::new(&source)
                .with_context(|| format!("compile route pattern {}", pattern))?;
            routes.push(RoutePattern {
                pattern: pattern.to_string(),
                matcher,
                required: required
                    .into_iter()
                    .map(|p| p.as_ref().to_string())
                    .collect(),
            });
        }
        Ok(Self { routes })
    }

    /// The application's own route catalogue.
    pub fn standard() -> Result<Self> {
        Self::compile(
            AppRoute::ALL
                .iter()
                .map(|route| (route.pattern(), route.permissions().iter().copied())),
        )
    }

    /// First entry whose pattern matches the whole path.
    pub fn find(&self, path: &str) -> Option<&RoutePattern> {
        self.routes.iter().find(|r| r.matches(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutePattern> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Literal text is escaped; each `:name` marker becomes `[^/]+`; the result is anchored.
fn matcher_source(marker: &Regex, pattern: &str) -> String {
    let mut out = String::from("^");
    let mut last = 0;
    for m in marker.find_iter(pattern) {
        out.push_str(&regex::escape(&pattern[last..m.start()]));
        out.push_str("[^/]+");
        last = m.end();
    }
    out.push_str(&regex::escape(&pattern[last..]));
    out.push('$');
    out
}
