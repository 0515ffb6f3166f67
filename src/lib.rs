// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! kubectl get-style resource lookup
//!
//! Resolves what a user types (`po`, `Deployment`, `dspa`,
//! `deployments.v1.apps`) into a group/version/resource and lists the objects.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use kubeget::{ConnectOptions, DiscoverySettings, Finder, ListOptions, connect};
//!
//! let connection = connect(&ConnectOptions::default()).await?;
//! let finder = Finder::for_cluster(
//!     &connection,
//!     &DiscoverySettings { ttl: kubeget::DEFAULT_DISCOVERY_TTL, disk_cache: true },
//! );
//! let (resource, items) = finder.get("po", "kube-system", &ListOptions::default()).await?;
//! println!("{}: {} items", resource, items.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod kubernetes;

pub use error::{GetError, ResolveError};
pub use kubernetes::{
    ConnectOptions, DEFAULT_DISCOVERY_TTL, DiscoverySettings, Finder, ListOptions,
    ResourceDescriptor, connect,
};
