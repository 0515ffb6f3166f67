// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Errors returned by resolution and by the combined get operation

use thiserror::Error;

use crate::kubernetes::ResourceDescriptor;

/// Failure to turn an identifier into a descriptor
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The identifier was empty; no lookup was attempted
    #[error("resource name cannot be empty")]
    InvalidInput,

    /// Every resolution strategy missed
    #[error("resource {identifier:?} not found in any API group")]
    NotFound { identifier: String },

    /// The discovery snapshot needed for the alias scan could not be fetched
    #[error("failed to discover API resources while resolving {identifier:?}")]
    Provider {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure of [`Finder::get`](crate::Finder::get)
#[derive(Debug, Error)]
pub enum GetError {
    #[error("failed to find resource {identifier:?}")]
    Resolve {
        identifier: String,
        #[source]
        source: ResolveError,
    },

    /// Listing failed after the identifier resolved; the descriptor is kept for reporting
    #[error("failed to list {descriptor} (resolved from {identifier:?})")]
    List {
        identifier: String,
        descriptor: ResourceDescriptor,
        #[source]
        source: anyhow::Error,
    },
}

impl GetError {
    /// Descriptor the identifier resolved to, when resolution got that far
    pub fn descriptor(&self) -> Option<&ResourceDescriptor> {
        match self {
            GetError::Resolve { .. } => None,
            GetError::List { descriptor, .. } => Some(descriptor),
        }
    }

    /// The identifier as the caller supplied it
    pub fn identifier(&self) -> &str {
        match self {
            GetError::Resolve { identifier, .. } | GetError::List { identifier, .. } => identifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_found_message_names_identifier() {
        let err = ResolveError::NotFound {
            identifier: "widgets".to_string(),
        };
        assert!(err.to_string().contains("\"widgets\""));
    }

    #[test]
    fn test_list_error_keeps_descriptor_and_source() {
        let err = GetError::List {
            identifier: "deploy".to_string(),
            descriptor: ResourceDescriptor::new("apps", "v1", "deployments"),
            source: anyhow::anyhow!("forbidden"),
        };
        assert_eq!(
            err.descriptor(),
            Some(&ResourceDescriptor::new("apps", "v1", "deployments"))
        );
        assert_eq!(err.identifier(), "deploy");
        assert!(err.to_string().contains("deployments.v1.apps"));
        assert_eq!(err.source().unwrap().to_string(), "forbidden");
    }

    #[test]
    fn test_resolve_error_has_no_descriptor() {
        let err = GetError::Resolve {
            identifier: String::new(),
            source: ResolveError::InvalidInput,
        };
        assert!(err.descriptor().is_none());
        assert!(err.source().unwrap().to_string().contains("empty"));
    }
}
