//! Response header filtering.
//!
//! # Responsibilities
//! - Hold the process-wide set of header names never returned to clients
//! - Strip those headers from upstream responses
//!
//! # Design Decisions
//! - `HeaderName` is always lowercase, so set membership is case-insensitive
//! - Filtering is a plain function over `HeaderMap`; it copies every kept value
//!   in its original order and multiplicity

use std::collections::HashSet;

use axum::http::header::InvalidHeaderName;
use axum::http::{HeaderMap, HeaderName};

use crate::config::FilterConfig;

/// Header names that must never reach a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: HashSet<HeaderName>,
}

impl ExclusionSet {
    /// Build a set from header names, in any case.
    pub fn from_names<I, S>(names: I) -> Result<Self, InvalidHeaderName>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| HeaderName::from_bytes(name.as_ref().as_bytes()))
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(Self { names })
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self, InvalidHeaderName> {
        Self::from_names(&config.excluded_headers)
    }

    pub fn contains(&self, name: &HeaderName) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Copy `headers`, dropping every entry whose name is in `exclusions`.
pub fn filter_headers(headers: &HeaderMap, exclusions: &ExclusionSet) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.keys_len());
    for name in headers.keys() {
        if exclusions.contains(name) {
            continue;
        }
        for value in headers.get_all(name) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}
