//! Site lookup.
//!
//! # Responsibilities
//! - Store compiled sites
//! - Look up the site serving a request
//! - Fall back to the configured default site
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in priority order (acceptable for typical site counts)
//! - Explicit `None` rather than silent default when no fallback is set

use crate::config::SiteConfig;
use crate::http::RequestParams;
use crate::routing::matcher::{AndMatcher, HostMatcher, Matcher, PathPrefixMatcher};

/// A compiled virtual host.
#[derive(Debug)]
pub struct Site {
    pub name: String,
    pub priority: u32,
    matcher: AndMatcher,
}

impl Site {
    fn compile(config: &SiteConfig) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> =
            vec![Box::new(HostMatcher::new(config.hostname.clone(), config.port))];
        if let Some(prefix) = &config.path_prefix {
            matchers.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
        }

        Self {
            name: config.name.clone(),
            priority: config.priority,
            matcher: AndMatcher::new(matchers),
        }
    }

    /// Returns true if this site serves the request.
    pub fn matches(&self, params: &RequestParams) -> bool {
        self.matcher.matches(params)
    }
}

/// Immutable table of virtual hosts.
#[derive(Debug, Default)]
pub struct Router {
    sites: Vec<Site>,
    default_site: Option<usize>,
}

impl Router {
    /// Compile sites, highest priority first. Ties keep config order.
    pub fn from_config(sites: &[SiteConfig], default_site: Option<&str>) -> Self {
        let mut compiled: Vec<Site> = sites.iter().map(Site::compile).collect();
        compiled.sort_by(|a, b| b.priority.cmp(&a.priority));

        let default_site =
            default_site.and_then(|name| compiled.iter().position(|s| s.name == name));

        tracing::debug!(sites = compiled.len(), default = ?default_site, "Site table compiled");

        Self {
            sites: compiled,
            default_site,
        }
    }

    /// Find the site serving `params`.
    pub fn match_request(&self, params: &RequestParams) -> Option<&Site> {
        self.sites
            .iter()
            .find(|site| site.matches(params))
            .or_else(|| self.default_site.map(|index| &self.sites[index]))
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(
        name: &str,
        hostname: &str,
        port: Option<u16>,
        prefix: Option<&str>,
        priority: u32,
    ) -> SiteConfig {
        SiteConfig {
            name: name.into(),
            hostname: hostname.into(),
            port,
            path_prefix: prefix.map(Into::into),
            priority,
        }
    }

    fn params(hostname: &str, port: u16, path: &str) -> RequestParams {
        RequestParams {
            hostname: hostname.into(),
            port,
            path: path.into(),
            ..RequestParams::default()
        }
    }

    #[test]
    fn test_priority_order() {
        let router = Router::from_config(
            &[
                site("catch-all", "example.com", None, None, 0),
                site("api", "example.com", None, Some("/api"), 10),
            ],
            None,
        );

        let name = |path: &str| {
            router.match_request(&params("example.com", 80, path)).unwrap().name.clone()
        };
        assert_eq!(name("/api/x"), "api");
        assert_eq!(name("/"), "catch-all");
    }

    #[test]
    fn test_port_selects_site() {
        let router = Router::from_config(
            &[
                site("plain", "example.com", Some(80), None, 0),
                site("alt", "example.com", Some(8080), None, 0),
            ],
            None,
        );

        assert_eq!(router.match_request(&params("example.com", 80, "/")).unwrap().name, "plain");
        assert_eq!(router.match_request(&params("example.com", 8080, "/")).unwrap().name, "alt");
        assert!(router.match_request(&params("example.com", 443, "/")).is_none());
    }

    #[test]
    fn test_default_site() {
        let router = Router::from_config(
            &[
                site("main", "example.com", None, None, 0),
                site("fallback", "localhost", None, None, 0),
            ],
            Some("fallback"),
        );

        let name = |host: &str| router.match_request(&params(host, 80, "/")).unwrap().name.clone();
        assert_eq!(name("unknown.test"), "fallback");
        assert_eq!(name(""), "fallback");
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_no_match() {
        let router = Router::from_config(&[site("main", "example.com", None, None, 0)], None);
        assert!(router.match_request(&params("other.test", 80, "/")).is_none());
        assert!(Router::default().is_empty());
    }
}
