// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for the project manifest that jpaconf reads and edits,
//! along with the dependency coordinates shared by the manifest and the
//! persistence catalog. File I/O is left to the caller to figure out.

use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    str::FromStr,
};

/// Project manifest layout.
///
/// Every project module managed by jpaconf comes with a __manifest__ file
/// named "project.toml". The manifest is the build descriptor of the module:
/// it names the module, lists the features installed into it, and declares
/// its build dependencies.
///
/// # General Layout
///
/// A manifest is composed of two basic parts: project settings and
/// dependencies. The settings section names the project and its installed
/// features. The dependencies section lists every build dependency the module
/// declares, keyed by group and artifact identifier.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ProjectManifest {
    /// Settings for the project module.
    pub project: ProjectSettings,

    /// Declared build dependencies.
    #[serde(rename = "dependency", default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyRef>,
}

impl ProjectManifest {
    /// Construct new manifest for project module with no dependencies.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            project: ProjectSettings {
                name: name.into(),
                features: Vec::new(),
            },
            dependencies: Vec::new(),
        }
    }

    /// Check if dependency with same coordinates is declared.
    pub fn declares(&self, dependency: &DependencyRef) -> bool {
        self.dependencies.iter().any(|declared| declared == dependency)
    }

    /// Declare dependency.
    ///
    /// Returns true if the manifest changed. A dependency already declared
    /// under the same coordinates takes on the incoming version, unless the
    /// incoming dependency has no version at all.
    pub fn declare(&mut self, dependency: &DependencyRef) -> bool {
        match self.dependencies.iter_mut().find(|declared| *declared == dependency) {
            Some(_) if dependency.version.is_none() => false,
            Some(declared) if declared.version == dependency.version => false,
            Some(declared) => {
                declared.version = dependency.version.clone();
                true
            }
            None => {
                self.dependencies.push(dependency.clone());
                true
            }
        }
    }

    /// Drop dependency regardless of its version.
    ///
    /// Returns true if the manifest changed.
    pub fn undeclare(&mut self, dependency: &DependencyRef) -> bool {
        let before = self.dependencies.len();
        self.dependencies.retain(|declared| declared != dependency);
        before != self.dependencies.len()
    }
}

impl FromStr for ProjectManifest {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        toml::de::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl Display for ProjectManifest {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Project module settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ProjectSettings {
    /// Name of the project module.
    pub name: String,

    /// Features installed into the project, e.g., "gwt".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

/// Build dependency coordinates.
///
/// Two dependencies are the same dependency if they share group and artifact
/// identifiers. The version only matters when a dependency gets declared.
#[derive(Default, Debug, Clone, Deserialize, Serialize)]
pub struct DependencyRef {
    pub group_id: String,
    pub artifact_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl DependencyRef {
    /// Construct new dependency without a version.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
        }
    }

    /// Attach version to dependency.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    fn key(&self) -> (&str, &str) {
        (self.group_id.as_str(), self.artifact_id.as_str())
    }
}

impl PartialEq for DependencyRef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for DependencyRef {}

impl PartialOrd for DependencyRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DependencyRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for DependencyRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Display for DependencyRef {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match &self.version {
            Some(version) => write!(fmt, "{}:{}:{version}", self.group_id, self.artifact_id),
            None => write!(fmt, "{}:{}", self.group_id, self.artifact_id),
        }
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}
