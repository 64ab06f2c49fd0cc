// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Endpoint registry: the static list of daemons every dispatch fans out to.

use std::fmt;
use std::sync::{Arc, OnceLock};

/// Process-wide registry, set once before the first dispatch.
static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Base address of one daemon (e.g. `http://10.0.0.5:29091`).
///
/// Identity is the address string as configured. Two equal entries are two
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint(Arc<str>);

impl Endpoint {
    pub fn new(addr: impl AsRef<str>) -> Self {
        Self(Arc::from(addr.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a request path onto the base address.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.0.trim_end_matches('/'), path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(addr: &str) -> Self {
        Self::new(addr)
    }
}

/// Ordered, read-only list of endpoints. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    endpoints: Arc<[Endpoint]>,
}

impl Registry {
    /// Build a registry from raw addresses, in order.
    ///
    /// Surrounding whitespace is trimmed and blank entries are skipped.
    /// Duplicates are kept.
    pub fn new<I, S>(addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let endpoints: Vec<Endpoint> = addrs
            .into_iter()
            .filter_map(|a| {
                let a = a.as_ref().trim();
                (!a.is_empty()).then(|| Endpoint::new(a))
            })
            .collect();
        Self { endpoints: endpoints.into() }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    /// Install the process-wide registry. Fails if one is already installed.
    pub fn install_global(self) -> anyhow::Result<&'static Registry> {
        GLOBAL.set(self).map_err(|_| anyhow::anyhow!("endpoint registry already installed"))?;
        Ok(Self::global())
    }

    /// The process-wide registry, or an empty one if none was installed.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::default)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Endpoint;
    type IntoIter = std::slice::Iter<'a, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.iter()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
