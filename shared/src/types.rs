//! Core domain values: routes, route sets, and the deployment naming family

use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

use crate::errors::SharedError;

/// A fully-qualified HTTP route: host plus domain.
///
/// Two routes are equal iff both host and domain are equal. Routes are
/// ordered so that [`RouteSet`] iteration is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Route {
    pub host: String,
    pub domain: String,
}

impl Route {
    pub fn new(host: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            domain: domain.into(),
        }
    }

    /// The externally resolvable address, `host.domain`.
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.host, self.domain)
    }

    /// Parse a route from its FQDN form, splitting at the first dot.
    pub fn from_fqdn(fqdn: &str) -> Result<Self, SharedError> {
        match fqdn.split_once('.') {
            Some((host, domain)) if !host.is_empty() && !domain.is_empty() => {
                Ok(Self::new(host, domain))
            }
            _ => Err(SharedError::InvalidRoute {
                input: fqdn.to_string(),
            }),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.host, self.domain)
    }
}

/// A set of routes keyed by (host, domain) value equality.
///
/// Iteration order is the routes' natural order, so tests and platform
/// calls driven from a set are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteSet(BTreeSet<Route>);

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route; returns false if a value-equal route was present.
    pub fn insert(&mut self, route: Route) -> bool {
        self.0.insert(route)
    }

    pub fn contains(&self, route: &Route) -> bool {
        self.0.contains(route)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Route> {
        self.0.iter()
    }

    /// Deduplicated union of two route sets. Pure and total; the caller is
    /// responsible for substituting a default when the result is empty.
    pub fn union(&self, other: &RouteSet) -> RouteSet {
        Self(self.0.union(&other.0).cloned().collect())
    }
}

impl FromIterator<Route> for RouteSet {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RouteSet {
    type Item = Route;
    type IntoIter = btree_set::IntoIter<Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RouteSet {
    type Item = &'a Route;
    type IntoIter = btree_set::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RouteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for route in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{route}")?;
            first = false;
        }
        Ok(())
    }
}

/// The naming family one logical application occupies during a deployment
/// cycle: the live name plus the `-new` / `-old` / `-failed` derivations.
///
/// Pure string derivation; platform-side naming restrictions are the
/// platform client's concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppNames {
    base: String,
}

impl AppNames {
    pub fn new(base: impl Into<String>) -> Result<Self, SharedError> {
        let base = base.into();
        if base.is_empty() {
            return Err(SharedError::EmptyAppName);
        }
        Ok(Self { base })
    }

    /// The public name held by the currently live version.
    pub fn live(&self) -> &str {
        &self.base
    }

    /// The candidate pushed this cycle.
    pub fn candidate(&self) -> String {
        format!("{}-new", self.base)
    }

    /// The previous live version, retained briefly after promotion.
    pub fn old(&self) -> String {
        format!("{}-old", self.base)
    }

    /// A candidate quarantined after failing validation.
    pub fn failed(&self) -> String {
        format!("{}-failed", self.base)
    }

    /// True for any auxiliary family member left over from a prior cycle.
    /// The live name itself is never stale.
    pub fn is_stale(&self, name: &str) -> bool {
        name == self.candidate() || name == self.old() || name == self.failed()
    }
}

impl fmt::Display for AppNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes(fqdns: &[&str]) -> RouteSet {
        fqdns
            .iter()
            .map(|f| Route::from_fqdn(f).unwrap())
            .collect()
    }

    #[test]
    fn route_equality_is_by_value() {
        let a = Route::new("web", "example.com");
        let b = Route::new("web", "example.com");
        let c = Route::new("web", "example.org");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn fqdn_joins_host_and_domain() {
        let route = Route::new("app-new", "apps.example.com");
        assert_eq!(route.fqdn(), "app-new.apps.example.com");
    }

    #[test]
    fn from_fqdn_splits_at_first_dot() {
        let route = Route::from_fqdn("web.apps.example.com").unwrap();
        assert_eq!(route.host, "web");
        assert_eq!(route.domain, "apps.example.com");
    }

    #[test]
    fn from_fqdn_rejects_input_without_domain() {
        assert!(Route::from_fqdn("no-dot-here").is_err());
        assert!(Route::from_fqdn(".example.com").is_err());
        assert!(Route::from_fqdn("host.").is_err());
    }

    #[test]
    fn union_is_commutative() {
        let a = routes(&["a.example.com", "b.example.com"]);
        let b = routes(&["b.example.com", "c.example.com"]);

        assert_eq!(a.union(&b), b.union(&a));
    }

    #[test]
    fn union_is_idempotent() {
        let a = routes(&["a.example.com", "b.example.com"]);
        assert_eq!(a.union(&a), a);
    }

    #[test]
    fn union_deduplicates_by_value() {
        let a = routes(&["a.example.com", "shared.example.com"]);
        let b = routes(&["b.example.com", "shared.example.com"]);

        let merged = a.union(&b);
        assert_eq!(merged.len(), 3);
        assert!(merged.contains(&Route::new("shared", "example.com")));
    }

    #[test]
    fn union_with_empty_set_is_identity() {
        let a = routes(&["a.example.com"]);
        assert_eq!(a.union(&RouteSet::new()), a);
        assert_eq!(RouteSet::new().union(&a), a);
    }

    #[test]
    fn route_set_iteration_is_deterministic() {
        let a = routes(&["c.example.com", "a.example.com", "b.example.com"]);
        let hosts: Vec<&str> = a.iter().map(|r| r.host.as_str()).collect();
        assert_eq!(hosts, vec!["a", "b", "c"]);
    }

    #[test]
    fn derived_names_are_pairwise_distinct() {
        let names = AppNames::new("myapp").unwrap();
        let derived = [
            names.live().to_string(),
            names.candidate(),
            names.old(),
            names.failed(),
        ];

        for (i, a) in derived.iter().enumerate() {
            for (j, b) in derived.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn empty_base_name_is_rejected() {
        assert_eq!(AppNames::new(""), Err(SharedError::EmptyAppName));
    }

    #[test]
    fn stale_family_excludes_the_live_name() {
        let names = AppNames::new("myapp").unwrap();

        assert!(names.is_stale("myapp-new"));
        assert!(names.is_stale("myapp-old"));
        assert!(names.is_stale("myapp-failed"));
        assert!(!names.is_stale("myapp"));
        assert!(!names.is_stale("otherapp-new"));
    }
}
