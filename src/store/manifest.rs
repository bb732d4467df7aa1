// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Project manifest handling.
//!
//! Filesystem [`ProjectStore`] backed by the "project.toml" manifest of each
//! project module.

use crate::{
    config::{DependencyRef, ProjectManifest},
    path::manifest_path,
    store::{ProjectStore, Result, StoreError},
};

use std::{
    collections::BTreeSet,
    fs::{read_to_string, write},
    io::ErrorKind,
    path::PathBuf,
};
use tracing::{debug, info, instrument, warn};

/// Project manifests rooted at a project directory.
#[derive(Clone, Debug)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    /// Construct new manifest store over project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path to project root.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Load manifest of project module.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::MissingManifest`] if module has no manifest.
    /// - Return [`StoreError::Read`] if manifest cannot be read.
    /// - Return [`StoreError::Config`] if manifest cannot be parsed.
    pub fn load(&self, module: &str) -> Result<ProjectManifest> {
        let path = manifest_path(&self.root, module);
        match read_to_string(&path) {
            Ok(content) => Ok(content.parse()?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::MissingManifest { path })
            }
            Err(err) => Err(StoreError::Read { source: err, path }),
        }
    }

    /// Edit manifest of project module.
    ///
    /// The editor reports whether it changed the manifest. Nothing is written
    /// back unless it did.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::MissingManifest`] if module has no manifest.
    /// - Return [`StoreError::Config`] if manifest cannot be parsed.
    /// - Return [`StoreError::Write`] if manifest cannot be written.
    pub fn edit<E>(&self, module: &str, editor: E) -> Result<()>
    where
        E: FnOnce(&mut ProjectManifest) -> bool,
    {
        let mut manifest = self.load(module)?;
        if !editor(&mut manifest) {
            debug!("no changes for module {module:?}");
            return Ok(());
        }

        let path = manifest_path(&self.root, module);
        write(&path, manifest.to_string().as_bytes())
            .map_err(|err| StoreError::Write { source: err, path: path.clone() })?;
        info!("update {:?}", path.display());

        Ok(())
    }
}

impl ProjectStore for ManifestStore {
    fn is_project_available(&self) -> bool {
        manifest_path(&self.root, "").is_file()
    }

    #[instrument(skip(self, dependencies), level = "debug")]
    fn add_dependencies(
        &self,
        module: &str,
        dependencies: &BTreeSet<DependencyRef>,
    ) -> Result<()> {
        self.edit(module, |manifest| {
            let mut changed = false;
            for dependency in dependencies {
                if manifest.declare(dependency) {
                    debug!("declare {dependency}");
                    changed = true;
                }
            }
            changed
        })
    }

    #[instrument(skip(self, dependencies), level = "debug")]
    fn remove_dependencies(
        &self,
        module: &str,
        dependencies: &BTreeSet<DependencyRef>,
    ) -> Result<()> {
        self.edit(module, |manifest| {
            let mut changed = false;
            for dependency in dependencies {
                if manifest.undeclare(dependency) {
                    debug!("undeclare {dependency}");
                    changed = true;
                }
            }
            changed
        })
    }

    fn dependencies(&self, module: &str) -> Result<BTreeSet<DependencyRef>> {
        Ok(self.load(module)?.dependencies.into_iter().collect())
    }

    fn project_name(&self, module: &str) -> Result<String> {
        Ok(self.load(module)?.project.name)
    }

    fn is_feature_installed(&self, name: &str) -> bool {
        match self.load("") {
            Ok(manifest) => manifest.project.features.iter().any(|feature| feature == name),
            Err(err) => {
                warn!("cannot check feature {name:?}: {err}");
                false
            }
        }
    }
}
