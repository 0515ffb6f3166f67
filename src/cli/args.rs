// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "kubeget")]
#[command(author, version, about = "List Kubernetes resources by plural name, Kind, shortname or resource.version.group")]
pub struct Args {
    /// Resource to list (e.g., pods, po, Deployment, deployments.v1.apps)
    #[arg(value_name = "RESOURCE")]
    pub resource: String,

    /// Namespace to list in (same as --namespace)
    #[arg(value_name = "NAMESPACE", conflicts_with_all = ["namespace", "all_namespaces"])]
    pub namespace_arg: Option<String>,

    /// Namespace to list in; defaults to the context's namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// List across all namespaces
    #[arg(short = 'A', long, conflicts_with = "namespace")]
    pub all_namespaces: bool,

    /// Kubernetes context to use
    #[arg(short, long, value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Label selector (e.g., "app=nginx,tier!=cache")
    #[arg(short = 'l', long = "selector")]
    pub label_selector: Option<String>,

    /// Field selector (e.g., "status.phase=Running")
    #[arg(long)]
    pub field_selector: Option<String>,

    /// Server-side timeout for the list call, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub request_timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Omit column headers in table output
    #[arg(long)]
    pub no_headers: bool,

    /// Make the context used for this run the default for later runs
    #[arg(long)]
    pub save_context: bool,

    /// Ignore cached discovery data and query the API server
    #[arg(long)]
    pub refresh_discovery: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Namespace to scope the listing to, or `None` when the context default applies
    ///
    /// `-A` yields `Some("")`, meaning unscoped.
    pub fn requested_namespace(&self) -> Option<String> {
        if self.all_namespaces {
            return Some(String::new());
        }
        self.namespace.clone().or_else(|| self.namespace_arg.clone())
    }
}

#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
    Name,
}
