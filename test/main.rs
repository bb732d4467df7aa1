// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use jpaconf::{
    config::ProjectManifest,
    path::{manifest_path, resources_dir},
    ApplicationProperties, DependencyRef, ManifestStore,
};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

pub(crate) struct ProjectFixture {
    root: PathBuf,
}

impl ProjectFixture {
    pub(crate) fn new(
        root: impl AsRef<Path>,
        name: &str,
        dependencies: &[(&str, &str)],
    ) -> Result<Self> {
        let fixture = Self {
            root: root.as_ref().to_path_buf(),
        };

        let mut manifest = ProjectManifest::new(name);
        for (group_id, artifact_id) in dependencies {
            manifest.declare(&DependencyRef::new(*group_id, *artifact_id));
        }
        fixture.write_manifest("", &manifest)?;

        Ok(fixture)
    }

    pub(crate) fn write_manifest(&self, module: &str, manifest: &ProjectManifest) -> Result<()> {
        let path = manifest_path(&self.root, module);
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            mkdirp::mkdirp(parent)?;
        }
        write(path, manifest.to_string())?;

        Ok(())
    }

    pub(crate) fn write_properties(
        &self,
        profile: Option<&str>,
        content: impl AsRef<str>,
    ) -> Result<()> {
        let properties = self.properties("");
        mkdirp::mkdirp(resources_dir(&self.root, ""))?;
        write(properties.path(profile), content.as_ref())?;

        Ok(())
    }

    pub(crate) fn read_properties(&self, profile: Option<&str>) -> Result<String> {
        Ok(read_to_string(self.properties("").path(profile))?)
    }

    pub(crate) fn manifests(&self) -> ManifestStore {
        ManifestStore::new(&self.root)
    }

    pub(crate) fn properties(&self, module: &str) -> ApplicationProperties {
        ApplicationProperties::new(resources_dir(&self.root, module))
    }
}
