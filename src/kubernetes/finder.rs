// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! kubectl get-like lookup: resolve a name, then list the collection

use kube::api::DynamicObject;
use std::sync::Arc;
use tracing::warn;

use super::descriptor::ResourceDescriptor;
use super::lister::Lister;
use super::providers::{DiscoveryProvider, ListOptions, ListingProvider, MappingProvider};
use super::resolver::Resolver;
use crate::error::{GetError, ResolveError};

/// Resolves resource identifiers and lists the matching objects
///
/// Holds shared references to its capabilities and no other state, so one
/// `Finder` can serve many concurrent calls. Any locking or caching is up to
/// the capabilities themselves.
pub struct Finder {
    resolver: Resolver,
    lister: Lister,
}

impl Finder {
    pub fn new(
        mapper: Arc<dyn MappingProvider>,
        discovery: Arc<dyn DiscoveryProvider>,
        listing: Arc<dyn ListingProvider>,
    ) -> Self {
        Self {
            resolver: Resolver::new(mapper, discovery),
            lister: Lister::new(listing),
        }
    }

    /// Resolve `identifier` without listing anything
    pub async fn resolve(&self, identifier: &str) -> Result<ResourceDescriptor, ResolveError> {
        self.resolver.resolve(identifier).await
    }

    /// Resolve `identifier` and list its objects in `namespace` (empty for all)
    ///
    /// Returns the descriptor alongside the items so callers can report what an
    /// alias or Kind actually resolved to. If listing fails, the error still
    /// carries the descriptor (see [`GetError::descriptor`]).
    ///
    /// Nothing is retried. `options.timeout` is forwarded to the listing call;
    /// dropping the returned future cancels any in-flight request.
    pub async fn get(
        &self,
        identifier: &str,
        namespace: &str,
        options: &ListOptions,
    ) -> Result<(ResourceDescriptor, Vec<DynamicObject>), GetError> {
        let descriptor =
            self.resolver
                .resolve(identifier)
                .await
                .map_err(|source| GetError::Resolve {
                    identifier: identifier.to_string(),
                    source,
                })?;

        match self.lister.list(&descriptor, namespace, options).await {
            Ok(items) => Ok((descriptor, items)),
            Err(source) => {
                warn!(identifier = %identifier, resource = %descriptor, error = %source, "Listing failed");
                Err(GetError::List {
                    identifier: identifier.to_string(),
                    descriptor,
                    source,
                })
            }
        }
    }
}
