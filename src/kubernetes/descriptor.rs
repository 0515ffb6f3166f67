// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Group/version/resource descriptors and their textual forms.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified collection endpoint (group, version, plural resource)
///
/// An empty `group` is the core API group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub group: String,
    pub version: String,
    /// Plural, lowercase collection name (e.g., "pods", "deployments")
    pub resource: String,
}

impl ResourceDescriptor {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Parse the dot-delimited `resource.version.group` form
    ///
    /// The group may itself contain dots, and may be empty for core resources
    /// (`pods.v1.`). Returns `None` when fewer than three segments are present.
    /// This is purely syntactic: the result may name a resource that does not exist.
    pub fn parse_fully_qualified(identifier: &str) -> Option<Self> {
        if !identifier.contains('.') {
            return None;
        }

        let parts: Vec<&str> = identifier.split('.').collect();
        if parts.len() < 3 {
            return None;
        }

        Some(Self {
            group: parts[2..].join("."),
            version: parts[1].to_string(),
            resource: parts[0].to_string(),
        })
    }

    /// apiVersion string as it appears in manifests ("v1", "apps/v1")
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    /// Renders the same `resource.version.group` form that `parse_fully_qualified` accepts
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.resource, self.version, self.group)
    }
}

/// A resource name with optional group/version constraints, used for direct lookups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialResource {
    pub group: Option<String>,
    pub version: Option<String>,
    pub resource: String,
}

impl PartialResource {
    /// Unconstrained lookup by resource name only
    pub fn named(resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
            ..Default::default()
        }
    }
}

/// Parsed apiVersion / groupVersion string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl GroupVersion {
    /// Parse "v1" (core group) or "apps/v1"
    pub fn parse(group_version: &str) -> Result<Self> {
        if group_version.is_empty() {
            return Err(anyhow!("empty group version"));
        }

        match group_version.split_once('/') {
            None => Ok(Self {
                group: String::new(),
                version: group_version.to_string(),
            }),
            Some((group, version)) if !version.is_empty() && !version.contains('/') => Ok(Self {
                group: group.to_string(),
                version: version.to_string(),
            }),
            Some(_) => Err(anyhow!("unexpected group version string: '{}'", group_version)),
        }
    }

    pub fn with_resource(&self, resource: &str) -> ResourceDescriptor {
        ResourceDescriptor::new(&self.group, &self.version, resource)
    }
}
