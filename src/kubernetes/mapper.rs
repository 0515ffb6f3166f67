// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! REST mapping backed by resource discovery
//!
//! Answers resource-name and Kind lookups from the preferred-resources snapshot.
//! A miss is reported as-is; refreshing a stale snapshot is left to the
//! alias scan, which sees every name the cluster serves.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::descriptor::{PartialResource, ResourceDescriptor};
use super::providers::{ApiResourceList, DiscoveryProvider, MappingProvider};

pub struct RestMapper {
    discovery: Arc<dyn DiscoveryProvider>,
}

impl RestMapper {
    pub fn new(discovery: Arc<dyn DiscoveryProvider>) -> Self {
        Self { discovery }
    }
}

/// Every descriptor whose plural or singular name matches, in discovery order
fn match_resource(snapshot: &[ApiResourceList], partial: &PartialResource) -> Vec<ResourceDescriptor> {
    let wanted = partial.resource.to_lowercase();
    let mut matches = Vec::new();

    for list in snapshot {
        let Ok(gv) = list.group_version() else {
            continue;
        };
        if partial.group.as_ref().is_some_and(|g| *g != gv.group)
            || partial.version.as_ref().is_some_and(|v| *v != gv.version)
        {
            continue;
        }

        for entry in &list.resources {
            if entry.name == wanted || entry.singular() == wanted {
                matches.push(gv.with_resource(&entry.name));
            }
        }
    }

    matches
}

/// Every descriptor whose Kind matches exactly, in discovery order
fn match_kind(snapshot: &[ApiResourceList], kind: &str) -> Vec<ResourceDescriptor> {
    snapshot
        .iter()
        .filter_map(|list| list.group_version().ok().map(|gv| (gv, list)))
        .flat_map(|(gv, list)| {
            list.resources
                .iter()
                .filter(move |entry| entry.kind == kind)
                .map(move |entry| gv.with_resource(&entry.name))
        })
        .collect()
}

#[async_trait]
impl MappingProvider for RestMapper {
    async fn resource_for(&self, partial: &PartialResource) -> Result<ResourceDescriptor> {
        let snapshot = self.discovery.preferred_resources().await?;
        let matches = match_resource(&snapshot, partial);
        if matches.len() > 1 {
            debug!(
                resource = %partial.resource,
                candidates = matches.len(),
                "Resource name served by several groups, using first"
            );
        }

        matches.into_iter().next().ok_or_else(|| {
            anyhow!(
                "the server doesn't have a resource type \"{}\"",
                partial.resource
            )
        })
    }

    async fn mappings_for(&self, kind: &str) -> Result<Vec<ResourceDescriptor>> {
        let snapshot = self.discovery.preferred_resources().await?;
        Ok(match_kind(&snapshot, kind))
    }
}
