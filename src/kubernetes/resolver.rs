// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Resolution of kubectl-style resource names
//!
//! A user may type a plural name (`pods`), a singular or Kind name (`Pod`),
//! a shortname (`po`, `dspa`) or the fully qualified `resource.version.group`
//! form. Strategies are tried in order and the first hit wins:
//!
//! 1. fully qualified parse (no cluster access)
//! 2. direct resource-name lookup through the mapper
//! 3. exact Kind lookup through the mapper
//! 4. Kind lookup over case variations of the input
//! 5. scan of every preferred resource for plural name, Kind or shortname
//!
//! Mapper failures in 2-4 count as misses. Only a failure to fetch the
//! discovery snapshot in step 5 aborts resolution. When step 5 misses on a
//! snapshot that was not fetched live, discovery is invalidated and the scan
//! runs once more so newly installed CRDs are found.

use std::sync::Arc;
use tracing::{debug, info, trace};

use super::descriptor::{PartialResource, ResourceDescriptor};
use super::providers::{ApiResourceList, DiscoveryProvider, MappingProvider};
use crate::error::ResolveError;

/// Resolves raw identifiers into [`ResourceDescriptor`]s
pub struct Resolver {
    mapper: Arc<dyn MappingProvider>,
    discovery: Arc<dyn DiscoveryProvider>,
}

impl Resolver {
    pub fn new(mapper: Arc<dyn MappingProvider>, discovery: Arc<dyn DiscoveryProvider>) -> Self {
        Self { mapper, discovery }
    }

    /// Resolve an identifier to a descriptor
    ///
    /// When a Kind exists in several API groups, the first mapping returned by
    /// the mapper is used. That order is provider-defined and may differ between
    /// calls or cluster versions; use the fully qualified form to pin a group.
    pub async fn resolve(&self, identifier: &str) -> Result<ResourceDescriptor, ResolveError> {
        if identifier.is_empty() {
            return Err(ResolveError::InvalidInput);
        }

        if let Some(descriptor) = ResourceDescriptor::parse_fully_qualified(identifier) {
            debug!(identifier = %identifier, resolved = %descriptor, "Parsed fully qualified name");
            return Ok(descriptor);
        }

        match self.mapper.resource_for(&PartialResource::named(identifier)).await {
            Ok(descriptor) => {
                info!(identifier = %identifier, resolved = %descriptor, "Resolved by resource name");
                return Ok(descriptor);
            }
            Err(e) => trace!(identifier = %identifier, error = %e, "No resource name match"),
        }

        if let Some(descriptor) = self.first_kind_mapping(identifier).await {
            info!(identifier = %identifier, resolved = %descriptor, "Resolved by Kind");
            return Ok(descriptor);
        }

        for kind in kind_variations(identifier) {
            if let Some(descriptor) = self.first_kind_mapping(&kind).await {
                info!(
                    identifier = %identifier,
                    kind = %kind,
                    resolved = %descriptor,
                    "Resolved by Kind case variation"
                );
                return Ok(descriptor);
            }
        }

        if let Some(descriptor) = self.scan_discovery(identifier).await? {
            info!(identifier = %identifier, resolved = %descriptor, "Resolved by alias scan");
            return Ok(descriptor);
        }

        if !self.discovery.is_fresh().await {
            debug!(identifier = %identifier, "Alias scan missed on cached discovery, refreshing");
            self.discovery.invalidate().await;
            if let Some(descriptor) = self.scan_discovery(identifier).await? {
                info!(identifier = %identifier, resolved = %descriptor, "Resolved by alias scan after refresh");
                return Ok(descriptor);
            }
        }

        debug!(identifier = %identifier, "No resolution strategy matched");
        Err(ResolveError::NotFound {
            identifier: identifier.to_string(),
        })
    }

    async fn scan_discovery(&self, identifier: &str) -> Result<Option<ResourceDescriptor>, ResolveError> {
        let snapshot = self
            .discovery
            .preferred_resources()
            .await
            .map_err(|source| ResolveError::Provider {
                identifier: identifier.to_string(),
                source,
            })?;
        Ok(scan_aliases(&snapshot, identifier))
    }

    async fn first_kind_mapping(&self, kind: &str) -> Option<ResourceDescriptor> {
        match self.mapper.mappings_for(kind).await {
            Ok(mappings) => {
                if mappings.len() > 1 {
                    debug!(kind = %kind, count = mappings.len(), "Ambiguous Kind, using first mapping");
                }
                mappings.into_iter().next()
            }
            Err(e) => {
                trace!(kind = %kind, error = %e, "Kind lookup failed");
                None
            }
        }
    }
}

/// Case variations tried as Kind names, in order:
/// unchanged, first letter upper, all upper, first letter upper with the rest lower
///
/// Repeated spellings are dropped so each distinct candidate costs one lookup.
pub fn kind_variations(identifier: &str) -> Vec<String> {
    let mut chars = identifier.chars();
    let (first, rest) = match chars.next() {
        Some(c) => (c.to_uppercase().collect::<String>(), chars.as_str()),
        None => return vec![String::new()],
    };

    let candidates = [
        identifier.to_string(),
        format!("{}{}", first, rest),
        identifier.to_uppercase(),
        format!("{}{}", first, rest.to_lowercase()),
    ];

    let mut variations: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !variations.contains(&candidate) {
            variations.push(candidate);
        }
    }
    variations
}

/// Find the first preferred resource whose plural name (case-sensitive),
/// Kind (case-insensitive, Unicode lowercase) or shortname (exact) matches
pub fn scan_aliases(snapshot: &[ApiResourceList], identifier: &str) -> Option<ResourceDescriptor> {
    let folded = identifier.to_lowercase();
    for list in snapshot {
        let Ok(gv) = list.group_version() else {
            trace!(group_version = %list.group_version, "Skipping unparseable group version");
            continue;
        };

        for entry in &list.resources {
            if entry.name == identifier
                || entry.kind.to_lowercase() == folded
                || entry.short_names.iter().any(|s| s == identifier)
            {
                return Some(gv.with_resource(&entry.name));
            }
        }
    }
    None
}
