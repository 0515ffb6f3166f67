// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use anyhow::Result;
use kube::api::DynamicObject;
use std::sync::Arc;
use tracing::debug;

use super::descriptor::ResourceDescriptor;
use super::providers::{ListOptions, ListingProvider};

/// Lists a resolved collection, optionally scoped to one namespace
///
/// The scope is passed through as given: listing a cluster-scoped resource
/// with a namespace surfaces whatever error the listing capability returns.
pub struct Lister {
    provider: Arc<dyn ListingProvider>,
}

impl Lister {
    pub fn new(provider: Arc<dyn ListingProvider>) -> Self {
        Self { provider }
    }

    /// An empty `namespace` lists across all namespaces (or cluster-wide)
    pub async fn list(
        &self,
        descriptor: &ResourceDescriptor,
        namespace: &str,
        options: &ListOptions,
    ) -> Result<Vec<DynamicObject>> {
        let scope = (!namespace.is_empty()).then_some(namespace);

        debug!(
            resource = %descriptor,
            namespace = ?scope,
            label_selector = ?options.label_selector,
            field_selector = ?options.field_selector,
            "Listing resources"
        );

        let items = self.provider.list(descriptor, scope, options).await?;

        debug!(resource = %descriptor, count = items.len(), "Listed resources");
        Ok(items)
    }
}
