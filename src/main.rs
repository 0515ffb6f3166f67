// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Args;
use kubeget::config::{self, Config};
use kubeget::kubernetes::SnapshotStore;
use kubeget::{Finder, ListOptions, connect};
use output::{ListResult, resource_header};

fn open_log_file() -> Result<RollingFileAppenderBase> {
    let log_dir = config::base_dir()?.join("log");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Could not create log directory: {}", log_dir.display()))?;

    // Rotate at 5MB, keep 3 files
    let condition = RollingConditionBase::new().max_size(5 * 1024 * 1024);
    RollingFileAppenderBase::new(log_dir.join("kubeget.log"), condition, 3)
        .context("Could not create log file")
}

/// Log to ~/.kubeget/log/kubeget.log, and to stderr with --verbose
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "kubeget=debug" } else { "kubeget=info" })
    });

    let file_layer = match open_log_file() {
        Ok(appender) => Some(fmt::layer().with_writer(Mutex::new(appender)).with_ansi(false)),
        Err(e) => {
            eprintln!("Warning: {:#}", e);
            None
        }
    };
    let stderr_layer = verbose.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Warning: rustls crypto provider was already installed");
    }

    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}; using defaults", e);
        Config::default()
    });

    if args.refresh_discovery
        && let Ok(store) = SnapshotStore::new()
        && let Err(e) = store.clear()
    {
        eprintln!("Warning: Failed to clear discovery cache: {}", e);
    }

    let connection = connect(&config.connect_options(args.context.as_deref())).await?;

    if args.save_context {
        let saved = Config::config_path()
            .and_then(|path| config.set_default_context(&connection.context, &path));
        match saved {
            Ok(()) => info!(context = %connection.context, "Saved default context"),
            Err(e) => warn!(error = %e, "Failed to save default context"),
        }
    }

    let finder = Finder::for_cluster(&connection, &config.discovery_settings());

    let namespace = args
        .requested_namespace()
        .unwrap_or_else(|| connection.default_namespace.clone());

    let options = ListOptions {
        label_selector: args.label_selector.clone(),
        field_selector: args.field_selector.clone(),
        timeout: args.request_timeout.map(Duration::from_secs),
    };

    debug!(
        resource = %args.resource,
        namespace = %namespace,
        context = %connection.context,
        "Running get"
    );

    let (descriptor, items) = match finder.get(&args.resource, &namespace, &options).await {
        Ok(found) => found,
        Err(e) => {
            if let Some(descriptor) = e.descriptor() {
                eprintln!("{}", resource_header(e.identifier(), descriptor));
            }
            return Err(e.into());
        }
    };

    info!(resource = %descriptor, count = items.len(), "Listed resources");

    eprintln!("{}", resource_header(&args.resource, &descriptor));
    if namespace.is_empty() {
        eprintln!("Namespace: <all>\n");
    } else {
        eprintln!("Namespace: {}\n", namespace);
    }

    let result = ListResult {
        descriptor,
        items,
        unscoped: namespace.is_empty(),
    };
    println!("{}", result.format(&args.output, args.no_headers));

    Ok(())
}
