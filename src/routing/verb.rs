//! HTTP verbs understood by the dispatch table.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use thiserror::Error;

/// Returned when a specification key is not a known verb.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not a valid http verb")]
pub struct UnknownVerb(pub String);

/// A verb a route can be bound to.
///
/// `All` matches every request method, like express' `router.all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    All,
}

impl Verb {
    /// Every verb, in display order.
    pub const ALL: [Verb; 8] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Patch,
        Verb::Delete,
        Verb::Head,
        Verb::Options,
        Verb::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
            Verb::All => "ALL",
        }
    }

    /// Returns true if a request with `method` should run a route bound to this verb.
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            Verb::All => true,
            Verb::Get => method == Method::GET,
            Verb::Post => method == Method::POST,
            Verb::Put => method == Method::PUT,
            Verb::Patch => method == Method::PATCH,
            Verb::Delete => method == Method::DELETE,
            Verb::Head => method == Method::HEAD,
            Verb::Options => method == Method::OPTIONS,
        }
    }
}

impl FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .iter()
            .copied()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVerb(s.to_string()))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
