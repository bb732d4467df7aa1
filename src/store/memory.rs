// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! In-memory stores for unit tests.

use crate::{
    config::{DependencyRef, ProjectManifest},
    store::{ConfigStore, ProjectStore, Result, StoreError},
};

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

/// Project store holding manifests by module name.
#[derive(Debug, Default)]
pub(crate) struct MemoryProject {
    pub(crate) manifests: RefCell<BTreeMap<String, ProjectManifest>>,
}

impl MemoryProject {
    pub(crate) fn with_root(manifest: ProjectManifest) -> Self {
        Self {
            manifests: RefCell::new(BTreeMap::from([(String::new(), manifest)])),
        }
    }

    fn with_manifest<T>(&self, module: &str, f: impl FnOnce(&mut ProjectManifest) -> T) -> Result<T> {
        let mut manifests = self.manifests.borrow_mut();
        let manifest = manifests
            .get_mut(module)
            .ok_or_else(|| StoreError::MissingManifest {
                path: PathBuf::from(module),
            })?;
        Ok(f(manifest))
    }
}

impl ProjectStore for MemoryProject {
    fn is_project_available(&self) -> bool {
        self.manifests.borrow().contains_key("")
    }

    fn add_dependencies(&self, module: &str, dependencies: &BTreeSet<DependencyRef>) -> Result<()> {
        self.with_manifest(module, |manifest| {
            for dependency in dependencies {
                manifest.declare(dependency);
            }
        })
    }

    fn remove_dependencies(
        &self,
        module: &str,
        dependencies: &BTreeSet<DependencyRef>,
    ) -> Result<()> {
        self.with_manifest(module, |manifest| {
            for dependency in dependencies {
                manifest.undeclare(dependency);
            }
        })
    }

    fn dependencies(&self, module: &str) -> Result<BTreeSet<DependencyRef>> {
        self.with_manifest(module, |manifest| {
            manifest.dependencies.iter().cloned().collect()
        })
    }

    fn project_name(&self, module: &str) -> Result<String> {
        self.with_manifest(module, |manifest| manifest.project.name.clone())
    }

    fn is_feature_installed(&self, name: &str) -> bool {
        self.manifests
            .borrow()
            .get("")
            .is_some_and(|manifest| manifest.project.features.iter().any(|f| f == name))
    }
}

/// Config store holding fully qualified properties by profile.
///
/// The empty profile name stands for the default property file.
#[derive(Debug, Default)]
pub(crate) struct MemoryConfig {
    pub(crate) profiles: RefCell<BTreeMap<String, BTreeMap<String, String>>>,
    pub(crate) writes: Cell<usize>,
}

impl MemoryConfig {
    pub(crate) fn with_properties<'a>(
        properties: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let properties = properties
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();

        Self {
            profiles: RefCell::new(BTreeMap::from([(String::new(), properties)])),
            writes: Cell::new(0),
        }
    }

    /// Snapshot of qualified properties under optional profile.
    pub(crate) fn snapshot(&self, profile: Option<&str>) -> BTreeMap<String, String> {
        self.profiles
            .borrow()
            .get(profile.unwrap_or_default())
            .cloned()
            .unwrap_or_default()
    }
}

impl ConfigStore for MemoryConfig {
    fn property(&self, namespace: &str, key: &str, profile: Option<&str>) -> Result<Option<String>> {
        Ok(self.snapshot(profile).get(&format!("{namespace}.{key}")).cloned())
    }

    fn add_properties(
        &self,
        namespace: &str,
        properties: &BTreeMap<String, String>,
        profile: Option<&str>,
        force: bool,
    ) -> Result<()> {
        let mut profiles = self.profiles.borrow_mut();
        let name = profile.unwrap_or_default();
        if profile.is_some() && !force && !profiles.contains_key(name) {
            return Err(StoreError::MissingProfile {
                profile: name.into(),
                path: PathBuf::from(name),
            });
        }

        let target = profiles.entry(name.into()).or_default();
        for (key, value) in properties {
            target.insert(format!("{namespace}.{key}"), value.clone());
        }
        self.writes.set(self.writes.get() + 1);

        Ok(())
    }

    fn remove_property(&self, namespace: &str, key: &str, profile: Option<&str>) -> Result<()> {
        if let Some(target) = self
            .profiles
            .borrow_mut()
            .get_mut(profile.unwrap_or_default())
        {
            target.remove(&format!("{namespace}.{key}"));
        }
        self.writes.set(self.writes.get() + 1);

        Ok(())
    }

    fn property_keys(
        &self,
        namespace: &str,
        qualified: bool,
        profile: Option<&str>,
    ) -> Result<BTreeSet<String>> {
        let prefix = format!("{namespace}.");
        Ok(self
            .snapshot(profile)
            .into_keys()
            .filter_map(|key| {
                let relative = key.strip_prefix(prefix.as_str())?.to_owned();
                Some(if qualified { key } else { relative })
            })
            .collect())
    }
}
