// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Project and configuration stores.
//!
//! Reconciliation never touches disk itself. It reads and writes persisted
//! project state through two collaborators: a [`ProjectStore`] that owns the
//! build dependencies of each project module, and a [`ConfigStore`] that owns
//! the Spring property files.
//!
//! # Project Layout
//!
//! The filesystem stores expect the following layout under a project root:
//!
//! ```text
//! <root>/project.toml
//! <root>/src/main/resources/application.properties
//! <root>/src/main/resources/application-<profile>.properties
//! <root>/<module>/project.toml
//! <root>/<module>/src/main/resources/application.properties
//! ```
//!
//! The empty module name refers to the root module. Installed features are
//! always read from the root manifest.
//!
//! # Atomicity
//!
//! Neither store offers transactions. Dependency edits and property edits are
//! separate writes, so a failure between them leaves the project partially
//! updated.

pub mod manifest;
pub mod properties;

#[cfg(test)]
pub(crate) mod memory;

pub use manifest::ManifestStore;
pub use properties::ApplicationProperties;

use crate::config::DependencyRef;

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

/// Access to project build descriptors.
pub trait ProjectStore {
    /// Check if there is a project to configure at all.
    fn is_project_available(&self) -> bool;

    /// Declare dependencies in module.
    ///
    /// Existing declarations take on an incoming version, but keep their own
    /// when the incoming dependency has none.
    fn add_dependencies(&self, module: &str, dependencies: &BTreeSet<DependencyRef>)
        -> Result<()>;

    /// Drop dependencies from module regardless of version.
    fn remove_dependencies(
        &self,
        module: &str,
        dependencies: &BTreeSet<DependencyRef>,
    ) -> Result<()>;

    /// List dependencies currently declared by module.
    fn dependencies(&self, module: &str) -> Result<BTreeSet<DependencyRef>>;

    /// Name of project module.
    fn project_name(&self, module: &str) -> Result<String>;

    /// Check if feature is installed into the project.
    fn is_feature_installed(&self, name: &str) -> bool;
}

/// Access to namespaced Spring properties.
///
/// Keys passed in and out are relative to the namespace unless stated
/// otherwise, e.g., key "url" in namespace "spring.datasource" is the
/// property "spring.datasource.url".
pub trait ConfigStore {
    /// Get value of property under optional profile.
    fn property(&self, namespace: &str, key: &str, profile: Option<&str>)
        -> Result<Option<String>>;

    /// Insert or overwrite a set of properties.
    ///
    /// Writing to a profile that has no property file yet requires `force`.
    fn add_properties(
        &self,
        namespace: &str,
        properties: &BTreeMap<String, String>,
        profile: Option<&str>,
        force: bool,
    ) -> Result<()>;

    /// Remove property. Removing an absent property is not an error.
    fn remove_property(&self, namespace: &str, key: &str, profile: Option<&str>) -> Result<()>;

    /// List keys under namespace.
    ///
    /// Keys come back fully qualified when `qualified` is set, and relative
    /// to the namespace otherwise.
    fn property_keys(
        &self,
        namespace: &str,
        qualified: bool,
        profile: Option<&str>,
    ) -> Result<BTreeSet<String>>;
}

/// All possible error types for store interaction.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File cannot be read from.
    #[error("failed to read from {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be written to.
    #[error("failed to write to {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Parent directory cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Module has no manifest.
    #[error("no project manifest at {:?}", path.display())]
    MissingManifest { path: PathBuf },

    /// Profile has no property file, and writing was not forced.
    #[error("profile {profile:?} has no property file at {:?}, use force to create it", path.display())]
    MissingProfile { profile: String, path: PathBuf },

    /// Manifest cannot be parsed or rendered.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Profile file pattern is invalid.
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
