//! Name resolution
//!
//! The remote API addresses resources only by `href`, while the declared
//! configuration only knows human names. Resolution lists a collection and
//! reads each member until one carries the requested `properties.name`.

use crate::api::CloudApi;
use crate::error::{CloudError, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Maps `(collection, name)` to an href, caching positive hits for the
/// lifetime of one invocation
pub struct NameResolver<'a> {
    api: &'a dyn CloudApi,
    cache: Mutex<HashMap<(String, String), String>>,
}

impl<'a> NameResolver<'a> {
    pub fn new(api: &'a dyn CloudApi) -> Self {
        Self {
            api,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Find the first member of `collection` named `name`
    ///
    /// Members are visited in listing order and the first exact match wins.
    #[instrument(skip(self))]
    pub async fn find(&self, collection: &str, name: &str) -> Result<Option<String>> {
        if let Some(href) = self.cached(collection, name) {
            debug!(%href, "Resolved from cache");
            return Ok(Some(href));
        }

        for item in self.api.list(collection).await? {
            let resource = self.api.get(&item.href).await?;
            if resource.name() == Some(name) {
                debug!(href = %item.href, "Resolved");
                self.remember(collection, name, &item.href);
                return Ok(Some(item.href));
            }
        }
        Ok(None)
    }

    /// Like [`find`](Self::find), failing with `NotFound` when nothing matches
    pub async fn resolve(&self, collection: &str, name: &str, kind: &str) -> Result<String> {
        self.find(collection, name)
            .await?
            .ok_or_else(|| CloudError::not_found(kind, name))
    }

    /// Record an href learned from a create response
    pub fn remember(&self, collection: &str, name: &str, href: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert((collection.to_string(), name.to_string()), href.to_string());
        }
    }

    /// Drop every cached entry pointing at a deleted resource
    pub fn forget(&self, href: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.retain(|_, cached| cached != href);
        }
    }

    fn cached(&self, collection: &str, name: &str) -> Option<String> {
        self.cache
            .lock()
            .ok()?
            .get(&(collection.to_string(), name.to_string()))
            .cloned()
    }
}
