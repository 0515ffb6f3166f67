// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Capabilities the finder consumes
//!
//! Resolution and listing only talk to the cluster through these traits, so
//! the kube-backed implementations in `client` can be swapped for fakes.

use anyhow::Result;
use async_trait::async_trait;
use kube::api::DynamicObject;
use std::time::Duration;

use super::descriptor::{GroupVersion, PartialResource, ResourceDescriptor};

/// One resource advertised under a group-version
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiscoveryEntry {
    /// Plural resource name ("pods")
    pub name: String,
    /// Singular name ("pod"); may be empty on older API servers
    #[serde(default)]
    pub singular_name: String,
    pub kind: String,
    #[serde(default)]
    pub short_names: Vec<String>,
    #[serde(default)]
    pub namespaced: bool,
}

impl DiscoveryEntry {
    /// Singular name, falling back to the lowercased Kind
    pub fn singular(&self) -> String {
        if self.singular_name.is_empty() {
            self.kind.to_lowercase()
        } else {
            self.singular_name.clone()
        }
    }
}

/// Resources served under one group-version ("v1", "apps/v1")
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ApiResourceList {
    pub group_version: String,
    pub resources: Vec<DiscoveryEntry>,
}

impl ApiResourceList {
    pub fn group_version(&self) -> Result<GroupVersion> {
        GroupVersion::parse(&self.group_version)
    }
}

/// Options forwarded to the listing capability
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Label selector string (e.g., "app=nginx,version=v1")
    pub label_selector: Option<String>,
    /// Field selector string (e.g., "status.phase=Running")
    pub field_selector: Option<String>,
    /// Server-side deadline for the list call; honored only as far as the
    /// listing capability honors it
    pub timeout: Option<Duration>,
}

/// Resolves resource names and Kinds to descriptors
#[async_trait]
pub trait MappingProvider: Send + Sync {
    /// Resolve a (possibly singular or differently cased) resource name
    async fn resource_for(&self, partial: &PartialResource) -> Result<ResourceDescriptor>;

    /// All descriptors whose Kind matches exactly, in provider order
    async fn mappings_for(&self, kind: &str) -> Result<Vec<ResourceDescriptor>>;
}

/// Supplies the preferred-version resources of every API group
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    async fn preferred_resources(&self) -> Result<Vec<ApiResourceList>>;

    /// Whether the last snapshot came straight from the API server
    ///
    /// Caching providers return false while serving persisted data.
    async fn is_fresh(&self) -> bool {
        true
    }

    /// Drop any cached snapshot so the next call refetches
    async fn invalidate(&self) {}
}

/// Lists the objects of a collection
#[async_trait]
pub trait ListingProvider: Send + Sync {
    /// `namespace` of `None` lists without a namespace restriction
    async fn list(
        &self,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
        options: &ListOptions,
    ) -> Result<Vec<DynamicObject>>;
}
