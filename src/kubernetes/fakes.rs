// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Deterministic in-memory capabilities for unit tests

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use kube::api::{ApiResource, DynamicObject};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::descriptor::{PartialResource, ResourceDescriptor};
use super::providers::{
    ApiResourceList, DiscoveryEntry, DiscoveryProvider, ListOptions, ListingProvider,
    MappingProvider,
};

pub fn entry(name: &str, kind: &str, short_names: &[&str]) -> DiscoveryEntry {
    DiscoveryEntry {
        name: name.to_string(),
        singular_name: String::new(),
        kind: kind.to_string(),
        short_names: short_names.iter().map(|s| s.to_string()).collect(),
        namespaced: true,
    }
}

pub fn resource_list(group_version: &str, resources: Vec<DiscoveryEntry>) -> ApiResourceList {
    ApiResourceList {
        group_version: group_version.to_string(),
        resources,
    }
}

/// A small cluster: core pods/services, apps deployments, and one CRD with a shortname
pub fn sample_snapshot() -> Vec<ApiResourceList> {
    vec![
        resource_list(
            "v1",
            vec![
                entry("pods", "Pod", &["po"]),
                entry("services", "Service", &["svc"]),
            ],
        ),
        resource_list("apps/v1", vec![entry("deployments", "Deployment", &["deploy"])]),
        resource_list(
            "datasciencepipelinesapplications.opendatahub.io/v1",
            vec![entry(
                "datasciencepipelinesapplications",
                "DataSciencePipelinesApplication",
                &["dspa"],
            )],
        ),
    ]
}

/// Mapping capability with scripted answers; records every call
#[derive(Default)]
pub struct FakeMapper {
    pub resources: HashMap<String, ResourceDescriptor>,
    pub kinds: HashMap<String, Vec<ResourceDescriptor>>,
    pub fail: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeMapper {
    pub fn with_resource(mut self, name: &str, descriptor: ResourceDescriptor) -> Self {
        self.resources.insert(name.to_string(), descriptor);
        self
    }

    pub fn with_kind(mut self, kind: &str, descriptors: Vec<ResourceDescriptor>) -> Self {
        self.kinds.insert(kind.to_string(), descriptors);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MappingProvider for FakeMapper {
    async fn resource_for(&self, partial: &PartialResource) -> Result<ResourceDescriptor> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("resource_for:{}", partial.resource));
        if self.fail {
            return Err(anyhow!("mapper unavailable"));
        }
        self.resources
            .get(&partial.resource)
            .cloned()
            .ok_or_else(|| anyhow!("no matches for resource {}", partial.resource))
    }

    async fn mappings_for(&self, kind: &str) -> Result<Vec<ResourceDescriptor>> {
        self.calls.lock().unwrap().push(format!("mappings_for:{}", kind));
        if self.fail {
            return Err(anyhow!("mapper unavailable"));
        }
        Ok(self.kinds.get(kind).cloned().unwrap_or_default())
    }
}

/// Discovery capability serving a fixed snapshot
///
/// A stale fake reports `is_fresh() == false` until invalidated; invalidation
/// swaps in the `refreshed` snapshot when one is set.
#[derive(Default)]
pub struct FakeDiscovery {
    pub snapshot: Mutex<Vec<ApiResourceList>>,
    pub refreshed: Mutex<Option<Vec<ApiResourceList>>>,
    pub fail: bool,
    pub stale: AtomicBool,
    pub calls: AtomicUsize,
    pub invalidations: AtomicUsize,
}

impl FakeDiscovery {
    pub fn new(snapshot: Vec<ApiResourceList>) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn stale(self) -> Self {
        self.stale.store(true, Ordering::SeqCst);
        self
    }

    pub fn refreshing_to(self, snapshot: Vec<ApiResourceList>) -> Self {
        *self.refreshed.lock().unwrap() = Some(snapshot);
        self
    }

    pub fn set_snapshot(&self, snapshot: Vec<ApiResourceList>) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryProvider for FakeDiscovery {
    async fn preferred_resources(&self) -> Result<Vec<ApiResourceList>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("the server is currently unable to handle the request"));
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn is_fresh(&self) -> bool {
        !self.stale.load(Ordering::SeqCst)
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.stale.store(false, Ordering::SeqCst);
        if let Some(snapshot) = self.refreshed.lock().unwrap().take() {
            *self.snapshot.lock().unwrap() = snapshot;
        }
    }
}

/// A recorded list call
#[derive(Debug, Clone, PartialEq)]
pub struct ListCall {
    pub descriptor: ResourceDescriptor,
    pub namespace: Option<String>,
    pub label_selector: Option<String>,
}

/// Listing capability holding objects keyed by (resource, namespace)
#[derive(Default)]
pub struct FakeLister {
    pub objects: Vec<(String, DynamicObject)>,
    pub fail: bool,
    pub calls: Mutex<Vec<ListCall>>,
}

impl FakeLister {
    pub fn with_object(mut self, resource: &str, name: &str, namespace: Option<&str>) -> Self {
        let ar = ApiResource {
            group: String::new(),
            version: "v1".to_string(),
            api_version: "v1".to_string(),
            kind: String::new(),
            plural: resource.to_string(),
        };
        let mut obj = DynamicObject::new(name, &ar);
        if let Some(ns) = namespace {
            obj = obj.within(ns);
        }
        self.objects.push((resource.to_string(), obj));
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<ListCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingProvider for FakeLister {
    async fn list(
        &self,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
        options: &ListOptions,
    ) -> Result<Vec<DynamicObject>> {
        self.calls.lock().unwrap().push(ListCall {
            descriptor: descriptor.clone(),
            namespace: namespace.map(String::from),
            label_selector: options.label_selector.clone(),
        });
        if self.fail {
            return Err(anyhow!("the server could not find the requested resource"));
        }
        Ok(self
            .objects
            .iter()
            .filter(|(resource, obj)| {
                *resource == descriptor.resource
                    && namespace.is_none_or(|ns| obj.metadata.namespace.as_deref() == Some(ns))
            })
            .map(|(_, obj)| obj.clone())
            .collect())
    }
}
