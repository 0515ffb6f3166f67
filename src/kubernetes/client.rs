// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! kube-rs backed discovery and listing

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as meta;
use kube::api::{ApiResource, DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use super::cache::{DiscoveryCache, SnapshotStore};
use super::descriptor::ResourceDescriptor;
use super::finder::Finder;
use super::mapper::RestMapper;
use super::providers::{
    ApiResourceList, DiscoveryEntry, DiscoveryProvider, ListOptions, ListingProvider,
};

/// Namespace used when the kubeconfig context does not set one
pub const DEFAULT_NAMESPACE: &str = "default";

/// How to reach the cluster
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Kubeconfig context; the current context when `None`
    pub context: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            context: None,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
        }
    }
}

/// A client bound to one kubeconfig context
pub struct ClusterConnection {
    pub client: Client,
    pub context: String,
    /// Namespace configured on the context, or "default"
    pub default_namespace: String,
}

/// Build a client from kubeconfig
pub async fn connect(options: &ConnectOptions) -> Result<ClusterConnection> {
    let kubeconfig = Kubeconfig::read().context("Failed to load kubeconfig")?;

    let context_name = options
        .context
        .clone()
        .or_else(|| kubeconfig.current_context.clone())
        .ok_or_else(|| anyhow!("No context specified and no current context in kubeconfig"))?;

    let named = kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == context_name)
        .ok_or_else(|| anyhow!("Context '{}' not found in kubeconfig", context_name))?;

    let default_namespace = named
        .context
        .as_ref()
        .and_then(|c| c.namespace.clone())
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    let start = Instant::now();
    let mut config = Config::from_custom_kubeconfig(
        kubeconfig.clone(),
        &KubeConfigOptions {
            context: Some(context_name.clone()),
            ..Default::default()
        },
    )
    .await
    .with_context(|| format!("Failed to load kubeconfig for context '{}'", context_name))?;

    config.connect_timeout = Some(options.connect_timeout);
    config.read_timeout = Some(options.read_timeout);

    let client = Client::try_from(config)
        .with_context(|| format!("Failed to create client for context '{}'", context_name))?;

    info!(
        context = %context_name,
        namespace = %default_namespace,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Created Kubernetes client"
    );

    Ok(ClusterConnection {
        client,
        context: context_name,
        default_namespace,
    })
}

fn convert_resource_list(list: meta::APIResourceList) -> ApiResourceList {
    let resources = list
        .resources
        .into_iter()
        // Skip subresources (e.g., pods/log, pods/exec)
        .filter(|r| !r.name.contains('/'))
        .map(|r| DiscoveryEntry {
            name: r.name,
            singular_name: r.singular_name,
            kind: r.kind,
            short_names: r.short_names.unwrap_or_default(),
            namespaced: r.namespaced,
        })
        .collect();

    ApiResourceList {
        group_version: list.group_version,
        resources,
    }
}

/// Preferred-version discovery against the API server
///
/// Core `v1` comes first, then API groups in the order the server lists them.
/// Groups that fail to answer are skipped with a warning.
pub struct KubeDiscovery {
    client: Client,
}

impl KubeDiscovery {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DiscoveryProvider for KubeDiscovery {
    async fn preferred_resources(&self) -> Result<Vec<ApiResourceList>> {
        let start = Instant::now();
        let mut lists = Vec::new();

        let core_versions = self
            .client
            .list_core_api_versions()
            .await
            .context("Failed to list core API versions")?;
        if let Some(version) = core_versions.versions.first() {
            let core = self
                .client
                .list_core_api_resources(version)
                .await
                .with_context(|| format!("Failed to list core API resources for {}", version))?;
            lists.push(convert_resource_list(core));
        }

        let groups = self
            .client
            .list_api_groups()
            .await
            .context("Failed to list API groups")?;

        let group_versions: Vec<String> = groups
            .groups
            .iter()
            .filter_map(|g| {
                g.preferred_version
                    .as_ref()
                    .or_else(|| g.versions.first())
                    .map(|v| v.group_version.clone())
            })
            .collect();

        let fetches = group_versions.iter().map(|gv| async move {
            (gv, self.client.list_api_group_resources(gv).await)
        });

        for (gv, result) in futures::future::join_all(fetches).await {
            match result {
                Ok(list) => lists.push(convert_resource_list(list)),
                Err(e) => {
                    warn!(group_version = %gv, error = %e, "Skipping API group that failed discovery")
                }
            }
        }

        debug!(
            group_versions = lists.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Discovery complete"
        );
        Ok(lists)
    }
}

/// Lists objects through the dynamic API
pub struct KubeLister {
    client: Client,
}

impl KubeLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build ListParams from the list options (selectors, server-side timeout)
    fn build_list_params(options: &ListOptions) -> ListParams {
        let mut params = ListParams::default();

        if let Some(ref label_sel) = options.label_selector {
            params = params.labels(label_sel);
        }

        if let Some(ref field_sel) = options.field_selector {
            params = params.fields(field_sel);
        }

        if let Some(timeout) = options.timeout {
            params.timeout = Some(u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX).max(1));
        }

        trace!(
            label_selector = ?options.label_selector,
            field_selector = ?options.field_selector,
            timeout = ?params.timeout,
            "Built ListParams"
        );

        params
    }
}

#[async_trait]
impl ListingProvider for KubeLister {
    async fn list(
        &self,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
        options: &ListOptions,
    ) -> Result<Vec<DynamicObject>> {
        // Listing only needs the URL parts; the Kind is not known here
        let ar = ApiResource {
            group: descriptor.group.clone(),
            version: descriptor.version.clone(),
            api_version: descriptor.api_version(),
            kind: String::new(),
            plural: descriptor.resource.clone(),
        };

        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        };

        let list = api
            .list(&Self::build_list_params(options))
            .await
            .with_context(|| format!("Failed to list {}", descriptor))?;

        Ok(list.items)
    }
}

/// Discovery caching for a cluster-backed finder
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub ttl: Duration,
    /// Persist snapshots under ~/.kubeget/cache
    pub disk_cache: bool,
}

impl Finder {
    /// Wire a finder to a live cluster
    ///
    /// Discovery is shared between the mapper and the alias scan through one cache.
    pub fn for_cluster(connection: &ClusterConnection, settings: &DiscoverySettings) -> Self {
        let mut cache = DiscoveryCache::new(
            Arc::new(KubeDiscovery::new(connection.client.clone())),
            settings.ttl,
        );

        if settings.disk_cache {
            match SnapshotStore::new() {
                Ok(store) => cache = cache.with_store(store, &connection.context),
                Err(e) => warn!(error = %e, "Discovery disk cache unavailable"),
            }
        }

        let discovery: Arc<dyn DiscoveryProvider> = Arc::new(cache);
        Finder::new(
            Arc::new(RestMapper::new(discovery.clone())),
            discovery,
            Arc::new(KubeLister::new(connection.client.clone())),
        )
    }
}
