// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Persistence catalog.
//!
//! The __catalog__ is a static table of every database and ORM provider that
//! jpaconf knows how to configure. Each entry declares the build dependencies
//! it needs. The catalog also carries two provider-agnostic dependency groups,
//! the JPA API group and the Spring persistence group, which are required no
//! matter what gets selected.
//!
//! # Catalog Layout
//!
//! The built-in catalog is a TOML table compiled into the binary. Databases
//! are listed as `[[database]]` entries, ORM providers as `[[orm_provider]]`
//! entries, and the fixed groups live under `[jpa]` and `[spring]`. Entries
//! keep their declared order.
//!
//! The catalog is never edited at runtime. Parse it once, and lend it out to
//! whoever needs it.

use crate::config::DependencyRef;

use serde::Deserialize;
use std::str::FromStr;

const BUILTIN_CATALOG: &str = include_str!("catalog.toml");

/// Static table of persistence backends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(rename = "database")]
    databases: Vec<DatabaseProfile>,

    #[serde(rename = "orm_provider")]
    orm_providers: Vec<OrmProviderProfile>,

    jpa: DependencyGroup,
    spring: DependencyGroup,
}

impl Catalog {
    /// Parse the catalog shipped with jpaconf.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::Deserialize`] if the table is malformed.
    /// - Return [`CatalogError::DuplicateId`] if two entries share an id.
    pub fn builtin() -> Result<Self> {
        BUILTIN_CATALOG.parse()
    }

    /// All known databases in declared order.
    pub fn databases(&self) -> &[DatabaseProfile] {
        &self.databases
    }

    /// All known ORM providers in declared order.
    pub fn orm_providers(&self) -> &[OrmProviderProfile] {
        &self.orm_providers
    }

    /// Find database by id.
    pub fn database(&self, id: impl AsRef<str>) -> Option<&DatabaseProfile> {
        self.databases.iter().find(|db| db.id == id.as_ref())
    }

    /// Find ORM provider by id.
    pub fn orm_provider(&self, id: impl AsRef<str>) -> Option<&OrmProviderProfile> {
        self.orm_providers.iter().find(|orm| orm.id == id.as_ref())
    }

    /// Dependencies of the JPA API group.
    pub fn jpa_dependencies(&self) -> &[DependencyRef] {
        &self.jpa.dependencies
    }

    /// Dependencies of the Spring persistence group.
    pub fn spring_dependencies(&self) -> &[DependencyRef] {
        &self.spring.dependencies
    }
}

impl FromStr for Catalog {
    type Err = CatalogError;

    fn from_str(data: &str) -> Result<Self> {
        let catalog: Catalog = toml::de::from_str(data)?;

        // INVARIANT: Profile identity is its id, so ids must be unique per table.
        let database_ids = catalog.databases.iter().map(|db| db.id.as_str());
        let provider_ids = catalog.orm_providers.iter().map(|orm| orm.id.as_str());
        for ids in [database_ids.collect::<Vec<_>>(), provider_ids.collect()] {
            for (index, id) in ids.iter().enumerate() {
                if ids[..index].contains(id) {
                    return Err(CatalogError::DuplicateId(id.to_string()));
                }
            }
        }

        Ok(catalog)
    }
}

/// Static descriptor of one supported database engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseProfile {
    pub id: String,
    pub driver_class_name: String,

    /// JDBC URL template with `HOST_NAME` and `TO_BE_CHANGED_BY_ADDON`
    /// placeholders.
    pub connection_template: String,

    /// Separator placed before a database name appended to a template that
    /// lacks the name placeholder.
    #[serde(default = "default_name_delimiter")]
    pub name_delimiter: String,

    /// Username to fall back on when none is given. Only embedded engines
    /// have one.
    #[serde(default)]
    pub default_username: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
}

fn default_name_delimiter() -> String {
    "/".into()
}

/// Static descriptor of one supported ORM provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrmProviderProfile {
    pub id: String,

    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct DependencyGroup {
    #[serde(default)]
    dependencies: Vec<DependencyRef>,
}

/// Catalog error types.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Failed to deserialize catalog table.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Two profiles of the same table share an id.
    #[error("catalog declares profile {0:?} more than once")]
    DuplicateId(String),
}

/// Friendly result alias :3
type Result<T, E = CatalogError> = std::result::Result<T, E>;
