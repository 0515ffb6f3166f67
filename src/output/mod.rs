mod json;
mod table;
mod yaml;

pub use json::JsonFormatter;
pub use table::TableFormatter;
pub use yaml::YamlFormatter;

use chrono::{DateTime, Utc};
use kube::api::DynamicObject;
use kubeget::ResourceDescriptor;

use crate::cli::OutputFormat;

/// Listed objects together with what they were resolved to
#[derive(Debug, Clone)]
pub struct ListResult {
    pub descriptor: ResourceDescriptor,
    pub items: Vec<DynamicObject>,
    /// Listing spanned all namespaces
    pub unscoped: bool,
}

/// The columns shown for one object
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub name: String,
    pub namespace: Option<String>,
    pub age: String,
}

/// "Resource: deploy (Group: apps, Version: v1, Resource: deployments)"
///
/// The core group is shown as `core`.
pub fn resource_header(identifier: &str, descriptor: &ResourceDescriptor) -> String {
    let group = if descriptor.group.is_empty() {
        "core"
    } else {
        descriptor.group.as_str()
    };
    format!(
        "Resource: {} (Group: {}, Version: {}, Resource: {})",
        identifier, group, descriptor.version, descriptor.resource
    )
}

impl ListResult {
    pub fn format(&self, format: &OutputFormat, no_headers: bool) -> String {
        match format {
            OutputFormat::Table => TableFormatter::format(self, no_headers),
            OutputFormat::Json => JsonFormatter::format(self),
            OutputFormat::Yaml => YamlFormatter::format(self),
            OutputFormat::Name => self.names().join("\n"),
        }
    }

    pub fn rows(&self, now: DateTime<Utc>) -> Vec<ItemRow> {
        self.items
            .iter()
            .map(|item| ItemRow {
                name: item.metadata.name.clone().unwrap_or_default(),
                namespace: item.metadata.namespace.clone(),
                age: creation_time(item)
                    .map(|created| format_age(now.signed_duration_since(created)))
                    .unwrap_or_else(|| "<unknown>".to_string()),
            })
            .collect()
    }

    /// kubectl `-o name` style: "pods/web-1", "deployments.apps/web"
    pub fn names(&self) -> Vec<String> {
        let prefix = if self.descriptor.group.is_empty() {
            self.descriptor.resource.clone()
        } else {
            format!("{}.{}", self.descriptor.resource, self.descriptor.group)
        };
        self.items
            .iter()
            .filter_map(|item| item.metadata.name.as_deref())
            .map(|name| format!("{}/{}", prefix, name))
            .collect()
    }

    /// Objects wrapped in a v1 List, as `kubectl get -o json` prints them
    pub fn to_list_value(&self) -> serde_json::Value {
        serde_json::json!({
            "apiVersion": "v1",
            "kind": "List",
            "items": self.items,
        })
    }
}

/// Creation timestamp, read through its RFC 3339 serialization
fn creation_time(item: &DynamicObject) -> Option<DateTime<Utc>> {
    let ts = item.metadata.creation_timestamp.as_ref()?;
    let value = serde_json::to_value(ts).ok()?;
    DateTime::parse_from_rfc3339(value.as_str()?)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Compact human duration like kubectl's AGE column ("45s", "3m20s", "5h", "12d")
pub fn format_age(age: chrono::Duration) -> String {
    let secs = age.num_seconds().max(0);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if secs < 120 {
        format!("{}s", secs)
    } else if mins < 10 {
        format!("{}m{}s", mins, secs % 60)
    } else if hours < 3 {
        format!("{}m", mins)
    } else if hours < 8 {
        format!("{}h{}m", hours, mins % 60)
    } else if hours < 48 {
        format!("{}h", hours)
    } else if days < 8 {
        format!("{}d{}h", days, hours % 24)
    } else if days < 365 * 2 {
        format!("{}d", days)
    } else {
        format!("{}y{}d", days / 365, days % 365)
    }
}
