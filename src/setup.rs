// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Persistence setup.
//!
//! [`JpaSetup`] ties the catalog, the reconcilers, and the two stores
//! together. Configuring persistence is a two step affair: first both the
//! dependency delta and the datasource change are computed in full, then
//! both are applied. A selection that fails to resolve never reaches the
//! stores.
//!
//! # Preconditions
//!
//! Setup does not lock the project. Callers must make sure only one setup
//! runs against the same project at a time.

use crate::{
    catalog::Catalog,
    config::DependencyRef,
    datasource::{
        reconcile_datasource, ConnectionTarget, CurrentDatasource, DatasourceChange,
        DesiredDatasource, PropertyScope, DATASOURCE_PREFIX,
    },
    reconcile::{dependency_delta, DependencyDelta, ReconcileError, SelectionKind},
    store::{ConfigStore, ProjectStore, StoreError},
};

use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Feature whose projects bundle the App Engine SDK on their own.
pub const GWT_FEATURE: &str = "gwt";

/// Persistence setup request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SetupRequest {
    /// ORM provider id from the catalog.
    pub orm_provider: String,

    /// Database id from the catalog.
    pub database: String,

    /// JNDI name. A non-blank name selects JNDI mode over JDBC mode.
    pub jndi: Option<String>,

    /// JDBC connection settings.
    pub connection: ConnectionTarget,

    /// Project module to configure, empty for the root module.
    pub module: String,

    /// Where to write datasource properties.
    pub scope: PropertyScope,
}

/// What a setup changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub dependencies: DependencyDelta,
    pub datasource: DatasourceChange,
}

/// Persistence setup over a project and its configuration.
#[derive(Debug)]
pub struct JpaSetup<'catalog, P, C>
where
    P: ProjectStore,
    C: ConfigStore,
{
    catalog: &'catalog Catalog,
    project: P,
    config: C,
}

impl<'catalog, P, C> JpaSetup<'catalog, P, C>
where
    P: ProjectStore,
    C: ConfigStore,
{
    /// Construct new persistence setup.
    pub fn new(catalog: &'catalog Catalog, project: P, config: C) -> Self {
        Self {
            catalog,
            project,
            config,
        }
    }

    pub fn project(&self) -> &P {
        &self.project
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Check if there is a project to set persistence up for.
    pub fn is_installation_possible(&self) -> bool {
        self.project.is_project_available()
    }

    /// Configure persistence of project module.
    ///
    /// Declares everything the selected database and ORM provider need,
    /// drops what only other databases and providers need, and reconciles
    /// the datasource properties.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::PreconditionMissing`] if there is no project.
    /// - Return [`SetupError::InvalidSelection`] if the database or ORM
    ///   provider is unknown.
    /// - Return [`SetupError::Store`] if a store fails. Dependency and
    ///   property writes are not atomic with respect to one another.
    #[instrument(skip(self, request), fields(database = %request.database, orm = %request.orm_provider), level = "debug")]
    pub fn configure(&self, request: &SetupRequest) -> Result<SetupReport> {
        if !self.project.is_project_available() {
            return Err(SetupError::PreconditionMissing("project manifest"));
        }

        let mut dependencies =
            dependency_delta(self.catalog, &request.database, &request.orm_provider)?;
        if self.project.is_feature_installed(GWT_FEATURE) {
            let sdk = DependencyRef::new("com.google.appengine", "appengine-api-1.0-sdk");
            if dependencies.preserve(&sdk) {
                debug!("keep {sdk} for {GWT_FEATURE} feature");
            }
        }

        let desired = self.desired_datasource(request)?;
        let current = CurrentDatasource::load(&self.config, request.scope.profile.as_deref())?;
        let datasource = reconcile_datasource(&current, &desired, request.scope.clone());

        self.project
            .add_dependencies(&request.module, dependencies.to_add())?;
        self.project
            .remove_dependencies(&request.module, dependencies.to_remove())?;
        info!(
            "declared {} and dropped {} dependencies",
            dependencies.to_add().len(),
            dependencies.to_remove().len()
        );

        match &datasource {
            DatasourceChange::NoChangeRequired => info!("datasource already up to date"),
            DatasourceChange::Update(delta) => {
                delta.apply(&self.config)?;
                info!("datasource properties updated");
            }
        }

        Ok(SetupReport {
            dependencies,
            datasource,
        })
    }

    /// List qualified datasource property keys under optional profile.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::PreconditionMissing`] if there is no project.
    /// - Return [`SetupError::Store`] if the config store fails.
    pub fn database_properties(&self, profile: Option<&str>) -> Result<BTreeSet<String>> {
        if !self.project.is_project_available() {
            return Err(SetupError::PreconditionMissing("project manifest"));
        }

        Ok(self.config.property_keys(DATASOURCE_PREFIX, true, profile)?)
    }

    /// Check if default property file has any datasource property.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Store`] if the config store fails.
    pub fn has_database_properties(&self) -> Result<bool> {
        Ok(!self
            .config
            .property_keys(DATASOURCE_PREFIX, false, None)?
            .is_empty())
    }

    /// Check if project module declares the Spring Data JPA starter.
    ///
    /// # Errors
    ///
    /// - Return [`SetupError::Store`] if the project store fails.
    pub fn has_spring_data_dependency(&self, module: &str) -> Result<bool> {
        let starter = DependencyRef::new("org.springframework.boot", "spring-boot-starter-data-jpa");
        Ok(self.project.dependencies(module)?.contains(&starter))
    }

    fn desired_datasource(&self, request: &SetupRequest) -> Result<DesiredDatasource> {
        if let Some(jndi) = request.jndi.as_deref().filter(|jndi| !jndi.trim().is_empty()) {
            return Ok(DesiredDatasource::jndi(jndi));
        }

        // INVARIANT: Selection already resolved by dependency reconciliation.
        let database = self.catalog.database(&request.database).ok_or_else(|| {
            ReconcileError::InvalidSelection {
                kind: SelectionKind::Database,
                id: request.database.clone(),
            }
        })?;
        let project_name = self.project.project_name(&request.module)?;

        Ok(DesiredDatasource::jdbc(
            database,
            &request.connection,
            &project_name,
        ))
    }
}

/// All possible error types for persistence setup.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Database or ORM provider is not in the catalog.
    #[error(transparent)]
    InvalidSelection(#[from] ReconcileError),

    /// A required collaborator is unavailable.
    #[error("{0} is required but not available")]
    PreconditionMissing(&'static str),

    /// Project or config store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Friendly result alias :3
type Result<T, E = SetupError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ProjectManifest,
        datasource::{JNDI_NAME, URL},
        store::memory::{MemoryConfig, MemoryProject},
    };
    use pretty_assertions::assert_eq;

    fn manifest(dependencies: &[(&str, &str)], features: &[&str]) -> ProjectManifest {
        let mut manifest = ProjectManifest::new("petclinic");
        manifest.project.features = features.iter().map(|f| f.to_string()).collect();
        for (group_id, artifact_id) in dependencies {
            manifest.declare(&DependencyRef::new(*group_id, *artifact_id));
        }
        manifest
    }

    fn request(database: &str, orm_provider: &str) -> SetupRequest {
        SetupRequest {
            orm_provider: orm_provider.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    #[test]
    fn configure_switches_database() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let project = MemoryProject::with_root(manifest(
            &[
                ("mysql", "mysql-connector-java"),
                ("org.springframework.boot", "spring-boot-starter-data-jpa"),
                ("org.springframework.boot", "spring-boot-starter-web"),
            ],
            &[],
        ));
        let config = MemoryConfig::with_properties([
            ("spring.datasource.url", "jdbc:mysql://localhost:3306/petclinic"),
            ("spring.datasource.driver-class-name", "com.mysql.jdbc.Driver"),
        ]);
        let setup = JpaSetup::new(&catalog, project, config);

        let report = setup.configure(&request("POSTGRESQL", "HIBERNATE"))?;
        assert!(report.datasource.changed());

        let declared = setup.project().dependencies("")?;
        assert!(!declared.contains(&DependencyRef::new("mysql", "mysql-connector-java")));
        assert!(declared.contains(&DependencyRef::new("org.postgresql", "postgresql")));
        assert!(declared.contains(&DependencyRef::new(
            "org.springframework.boot",
            "spring-boot-starter-web"
        )));
        assert!(setup.has_spring_data_dependency("")?);
        assert_eq!(
            setup.config().property(DATASOURCE_PREFIX, URL, None)?.as_deref(),
            Some("jdbc:postgresql://localhost:5432/petclinic")
        );

        Ok(())
    }

    #[test]
    fn configure_twice_leaves_datasource_alone() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let setup = JpaSetup::new(
            &catalog,
            MemoryProject::with_root(manifest(&[], &[])),
            MemoryConfig::default(),
        );

        let request = request("H2_IN_MEMORY", "HIBERNATE");
        assert!(setup.configure(&request)?.datasource.changed());
        let writes = setup.config().writes.get();

        let report = setup.configure(&request)?;
        assert_eq!(report.datasource, DatasourceChange::NoChangeRequired);
        assert_eq!(setup.config().writes.get(), writes);
        assert_eq!(
            setup.config().property(DATASOURCE_PREFIX, "username", None)?.as_deref(),
            Some("sa")
        );

        Ok(())
    }

    #[test]
    fn configure_jndi_under_profile() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let setup = JpaSetup::new(
            &catalog,
            MemoryProject::with_root(manifest(&[], &[])),
            MemoryConfig::default(),
        );

        let mut request = request("MYSQL", "ECLIPSELINK");
        request.jndi = Some("jdbc/petclinic".into());
        request.scope = PropertyScope {
            profile: Some("prod".into()),
            force: false,
        };
        let result = setup.configure(&request);
        assert!(matches!(
            result,
            Err(SetupError::Store(StoreError::MissingProfile { .. }))
        ));

        request.scope.force = true;
        setup.configure(&request)?;
        assert_eq!(
            setup.database_properties(Some("prod"))?,
            BTreeSet::from([format!("{DATASOURCE_PREFIX}.{JNDI_NAME}")])
        );
        assert!(!setup.has_database_properties()?);

        Ok(())
    }

    #[test]
    fn configure_keeps_app_engine_sdk_for_gwt() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let sdk = ("com.google.appengine", "appengine-api-1.0-sdk");
        let setup = JpaSetup::new(
            &catalog,
            MemoryProject::with_root(manifest(&[sdk], &[GWT_FEATURE])),
            MemoryConfig::default(),
        );

        let report = setup.configure(&request("MYSQL", "HIBERNATE"))?;
        let sdk = DependencyRef::new(sdk.0, sdk.1);
        assert!(!report.dependencies.to_remove().contains(&sdk));
        assert!(setup.project().dependencies("")?.contains(&sdk));

        Ok(())
    }

    #[test]
    fn configure_drops_app_engine_sdk_without_gwt() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let sdk = ("com.google.appengine", "appengine-api-1.0-sdk");
        let setup = JpaSetup::new(
            &catalog,
            MemoryProject::with_root(manifest(&[sdk], &[])),
            MemoryConfig::default(),
        );

        setup.configure(&request("MYSQL", "HIBERNATE"))?;
        assert!(!setup
            .project()
            .dependencies("")?
            .contains(&DependencyRef::new(sdk.0, sdk.1)));

        Ok(())
    }

    #[test]
    fn configure_rejects_invalid_selection_before_writing() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let setup = JpaSetup::new(
            &catalog,
            MemoryProject::with_root(manifest(&[("mysql", "mysql-connector-java")], &[])),
            MemoryConfig::default(),
        );

        let result = setup.configure(&request("MONGODB", "HIBERNATE"));
        assert!(matches!(result, Err(SetupError::InvalidSelection(_))));
        assert_eq!(setup.project().dependencies("")?.len(), 1);
        assert_eq!(setup.config().writes.get(), 0);

        Ok(())
    }

    #[test]
    fn configure_requires_project() -> anyhow::Result<()> {
        let catalog = Catalog::builtin()?;
        let setup = JpaSetup::new(&catalog, MemoryProject::default(), MemoryConfig::default());

        assert!(!setup.is_installation_possible());
        let result = setup.configure(&request("MYSQL", "HIBERNATE"));
        assert!(matches!(result, Err(SetupError::PreconditionMissing(_))));
        assert!(matches!(
            setup.database_properties(None),
            Err(SetupError::PreconditionMissing(_))
        ));

        Ok(())
    }
}
