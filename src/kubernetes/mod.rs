mod cache;
mod client;
mod descriptor;
mod finder;
mod lister;
mod mapper;
mod providers;
mod resolver;

#[cfg(test)]
pub(crate) mod fakes;

pub use cache::{DEFAULT_DISCOVERY_TTL, DiscoveryCache, SnapshotStore};
pub use client::{
    ClusterConnection, ConnectOptions, DEFAULT_NAMESPACE, DiscoverySettings, KubeDiscovery,
    KubeLister, connect,
};
pub use descriptor::{GroupVersion, PartialResource, ResourceDescriptor};
pub use finder::Finder;
pub use lister::Lister;
pub use mapper::RestMapper;
pub use providers::{
    ApiResourceList, DiscoveryEntry, DiscoveryProvider, ListOptions, ListingProvider,
    MappingProvider,
};
pub use resolver::{Resolver, kind_variations, scan_aliases};
