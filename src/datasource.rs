// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Datasource property reconciliation.
//!
//! Spring Boot finds its datasource through properties in the
//! `spring.datasource` namespace. A project either connects directly over
//! JDBC, described by a driver class, URL, and credentials, or it looks the
//! datasource up by a single JNDI name. The two modes are mutually exclusive:
//! writing one set of properties always removes the other.
//!
//! Reconciliation is a pure comparison of what is persisted against what is
//! desired. The outcome is a [`DatasourceChange`] that either states no
//! change is required, or describes which properties to upsert and remove.
//! Nothing is written until the caller applies it to a [`ConfigStore`].

use crate::{
    catalog::DatabaseProfile,
    store::{ConfigStore, StoreError},
};

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// Property namespace of the datasource settings.
pub const DATASOURCE_PREFIX: &str = "spring.datasource";
pub const DRIVER_CLASS_NAME: &str = "driver-class-name";
pub const URL: &str = "url";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const JNDI_NAME: &str = "jndi-name";

const JDBC_KEYS: [&str; 4] = [URL, DRIVER_CLASS_NAME, USERNAME, PASSWORD];
const HOST_PLACEHOLDER: &str = "HOST_NAME";
const NAME_PLACEHOLDER: &str = "TO_BE_CHANGED_BY_ADDON";
const DEFAULT_HOST: &str = "localhost";

/// Datasource properties as currently persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CurrentDatasource {
    pub driver_class_name: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub jndi_name: Option<String>,
}

impl CurrentDatasource {
    /// Read datasource properties under optional profile.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError`] if the config store cannot be read.
    pub fn load(store: &impl ConfigStore, profile: Option<&str>) -> Result<Self, StoreError> {
        let get = |key| store.property(DATASOURCE_PREFIX, key, profile);

        Ok(Self {
            driver_class_name: get(DRIVER_CLASS_NAME)?,
            url: get(URL)?,
            username: get(USERNAME)?,
            password: get(PASSWORD)?,
            jndi_name: get(JNDI_NAME)?,
        })
    }

    /// Build from properties keyed relative to the datasource namespace.
    pub fn from_properties(properties: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| properties.get(key).cloned();

        Self {
            driver_class_name: get(DRIVER_CLASS_NAME),
            url: get(URL),
            username: get(USERNAME),
            password: get(PASSWORD),
            jndi_name: get(JNDI_NAME),
        }
    }

    fn has_jdbc_properties(&self) -> bool {
        [
            &self.driver_class_name,
            &self.url,
            &self.username,
            &self.password,
        ]
        .iter()
        .any(|value| value.is_some())
    }
}

/// Connection settings supplied by the caller for JDBC mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: Option<String>,
    pub database_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Datasource the caller wants persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredDatasource {
    /// Connect directly through JDBC driver.
    Jdbc {
        driver_class_name: String,
        url: String,
        username: Option<String>,
        password: Option<String>,
    },

    /// Look datasource up by JNDI name.
    Jndi { name: String },
}

impl DesiredDatasource {
    /// Resolve JDBC datasource for database.
    ///
    /// Builds the connection URL from the database's template, and falls back
    /// on the database's default username when no username is given.
    pub fn jdbc(database: &DatabaseProfile, target: &ConnectionTarget, project_name: &str) -> Self {
        let url = connection_string(
            database,
            target.host.as_deref(),
            target.database_name.as_deref(),
            project_name,
        );

        let username = match (&database.default_username, &target.username) {
            (Some(default), None) => Some(default.clone()),
            (Some(default), Some(username)) if username.is_empty() => Some(default.clone()),
            (_, username) => username.clone(),
        };

        Self::Jdbc {
            driver_class_name: database.driver_class_name.clone(),
            url,
            username,
            password: target.password.clone(),
        }
    }

    /// Resolve JNDI datasource.
    pub fn jndi(name: impl Into<String>) -> Self {
        Self::Jndi { name: name.into() }
    }
}

/// Build JDBC URL for database.
///
/// The name placeholder of the template is replaced by the database name, or
/// by the project name when no database name is given. Templates without the
/// placeholder get a given database name appended after the database's
/// delimiter. A blank host means "localhost".
pub fn connection_string(
    database: &DatabaseProfile,
    host: Option<&str>,
    database_name: Option<&str>,
    project_name: &str,
) -> String {
    let database_name = database_name.filter(|name| !name.trim().is_empty());
    let mut url = database.connection_template.clone();

    if url.contains(NAME_PLACEHOLDER) {
        url = url.replace(NAME_PLACEHOLDER, database_name.unwrap_or(project_name));
    } else if let Some(name) = database_name {
        url.push_str(&database.name_delimiter);
        url.push_str(name);
    }

    let host = host
        .filter(|host| !host.trim().is_empty())
        .unwrap_or(DEFAULT_HOST);
    url.replace(HOST_PLACEHOLDER, host)
}

/// Where and how the datasource properties get written.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PropertyScope {
    /// Named profile, or the default property file if [`None`].
    pub profile: Option<String>,

    /// Write even if the profile has no property file yet.
    pub force: bool,
}

/// Outcome of datasource reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasourceChange {
    /// Persisted properties already match.
    NoChangeRequired,

    /// Persisted properties must be updated.
    Update(DatasourceDelta),
}

impl DatasourceChange {
    /// Check if reconciliation requires any write.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Update(_))
    }

    /// Apply change to config store.
    ///
    /// Does nothing if no change is required.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError`] if any write fails. Earlier writes are not
    ///   rolled back.
    pub fn apply(&self, store: &impl ConfigStore) -> Result<(), StoreError> {
        match self {
            Self::NoChangeRequired => Ok(()),
            Self::Update(delta) => delta.apply(store),
        }
    }
}

/// Property writes required to reach the desired datasource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceDelta {
    upsert: BTreeMap<String, String>,
    remove: BTreeSet<String>,
    scope: PropertyScope,
}

impl DatasourceDelta {
    /// Properties to insert or overwrite, keyed relative to the namespace.
    pub fn upsert(&self) -> &BTreeMap<String, String> {
        &self.upsert
    }

    /// Properties to remove, keyed relative to the namespace.
    pub fn remove(&self) -> &BTreeSet<String> {
        &self.remove
    }

    pub fn scope(&self) -> &PropertyScope {
        &self.scope
    }

    /// Apply delta to config store.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError`] if any write fails.
    #[instrument(skip(self, store), level = "debug")]
    pub fn apply(&self, store: &impl ConfigStore) -> Result<(), StoreError> {
        let profile = self.scope.profile.as_deref();
        store.add_properties(DATASOURCE_PREFIX, &self.upsert, profile, self.scope.force)?;
        for key in &self.remove {
            store.remove_property(DATASOURCE_PREFIX, key, profile)?;
        }

        Ok(())
    }
}

/// Compare persisted datasource against desired datasource.
///
/// In JDBC mode the datasource changed if the driver or URL differ, or if
/// the trimmed username or password differ. A credential the caller did not
/// supply matches whatever is persisted, and is left untouched when an update
/// happens. In JNDI mode the datasource changed if the trimmed JNDI
/// name differs. Either mode also counts leftover properties of the other
/// mode as a change, so the two never coexist after an update.
pub fn reconcile_datasource(
    current: &CurrentDatasource,
    desired: &DesiredDatasource,
    scope: PropertyScope,
) -> DatasourceChange {
    let mut upsert = BTreeMap::new();
    let mut remove = BTreeSet::new();

    match desired {
        DesiredDatasource::Jdbc {
            driver_class_name,
            url,
            username,
            password,
        } => {
            let changed = current.driver_class_name.as_deref() != Some(driver_class_name.as_str())
                || current.url.as_deref() != Some(url.as_str())
                || !credential_matches(current.username.as_deref(), username.as_deref())
                || !credential_matches(current.password.as_deref(), password.as_deref())
                || current.jndi_name.is_some();
            if !changed {
                debug!("jdbc datasource already up to date");
                return DatasourceChange::NoChangeRequired;
            }

            upsert.insert(URL.to_string(), url.clone());
            upsert.insert(DRIVER_CLASS_NAME.to_string(), driver_class_name.clone());
            for (key, value) in [(USERNAME, username), (PASSWORD, password)] {
                if let Some(value) = value {
                    upsert.insert(key.to_string(), value.trim().to_string());
                }
            }
            remove.insert(JNDI_NAME.to_string());
        }
        DesiredDatasource::Jndi { name } => {
            let name = name.trim();
            let changed =
                current.jndi_name.as_deref() != Some(name) || current.has_jdbc_properties();
            if !changed {
                debug!("jndi datasource already up to date");
                return DatasourceChange::NoChangeRequired;
            }

            upsert.insert(JNDI_NAME.to_string(), name.to_string());
            remove.extend(JDBC_KEYS.iter().map(|key| key.to_string()));
        }
    }

    DatasourceChange::Update(DatasourceDelta {
        upsert,
        remove,
        scope,
    })
}

fn credential_matches(current: Option<&str>, desired: Option<&str>) -> bool {
    match desired {
        Some(desired) => current == Some(desired.trim()),
        None => true,
    }
}
