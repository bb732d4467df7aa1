// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where the manifest and property files of a project module live
//! relative to the project root.

use std::path::{Path, PathBuf};

/// File name of a module's manifest.
pub const MANIFEST_FILE: &str = "project.toml";

/// Determine directory of project module.
///
/// The empty module name refers to the project root itself.
pub fn module_dir(root: impl AsRef<Path>, module: &str) -> PathBuf {
    match module {
        "" => root.as_ref().to_path_buf(),
        module => root.as_ref().join(module),
    }
}

/// Determine path to manifest of project module.
pub fn manifest_path(root: impl AsRef<Path>, module: &str) -> PathBuf {
    module_dir(root, module).join(MANIFEST_FILE)
}

/// Determine resources directory of project module.
pub fn resources_dir(root: impl AsRef<Path>, module: &str) -> PathBuf {
    module_dir(root, module)
        .join("src")
        .join("main")
        .join("resources")
}

/// Determine path to Spring property file for optional profile.
pub fn properties_path(resources: impl AsRef<Path>, profile: Option<&str>) -> PathBuf {
    match profile {
        Some(profile) => resources
            .as_ref()
            .join(format!("application-{profile}.properties")),
        None => resources.as_ref().join("application.properties"),
    }
}

/// Expand user supplied project root.
///
/// Performs shell expansion, e.g., "~/work/$PROJECT" becomes
/// "/home/user/work/petclinic".
///
/// # Errors
///
/// - Return [`ExpandError`] if a variable in the path cannot be resolved.
pub fn expand_project_root(raw: impl AsRef<str>) -> Result<PathBuf> {
    Ok(PathBuf::from(shellexpand::full(raw.as_ref())?.into_owned()))
}

/// Project root cannot be shell expanded.
#[derive(Debug, thiserror::Error)]
#[error("cannot expand project path")]
pub struct ExpandError(#[from] shellexpand::LookupError<std::env::VarError>);

/// Friendly result alias :3
pub type Result<T, E = ExpandError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn resolve_module_paths() {
        assert_eq!(manifest_path("/work/app", ""), PathBuf::from("/work/app/project.toml"));
        assert_eq!(
            manifest_path("/work/app", "domain"),
            PathBuf::from("/work/app/domain/project.toml")
        );
        assert_eq!(
            resources_dir("/work/app", "web"),
            PathBuf::from("/work/app/web/src/main/resources")
        );
    }

    #[test]
    fn resolve_properties_path_by_profile() {
        let resources = resources_dir("/work/app", "");
        assert_eq!(
            properties_path(&resources, None),
            PathBuf::from("/work/app/src/main/resources/application.properties")
        );
        assert_eq!(
            properties_path(&resources, Some("dev")),
            PathBuf::from("/work/app/src/main/resources/application-dev.properties")
        );
    }

    #[sealed_test(env = [("PROJECT", "petclinic")])]
    fn expand_project_root_variables() -> anyhow::Result<()> {
        let result = expand_project_root("/work/$PROJECT")?;
        assert_eq!(result, PathBuf::from("/work/petclinic"));
        assert!(expand_project_root("/work/$JPACONF_UNSET_VARIABLE").is_err());

        Ok(())
    }
}
