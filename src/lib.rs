// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Persistence setup for Spring Boot projects.
//!
//! jpaconf configures JPA persistence for a project. Pick an ORM provider
//! and a database from the [`Catalog`], and jpaconf reconciles two things:
//!
//! 1. The build dependencies declared in the project manifest, adding what
//!    the selection needs and dropping what only other databases or
//!    providers need.
//! 2. The `spring.datasource` properties of the project, either as direct
//!    JDBC settings or as a single JNDI name.
//!
//! Both reconciliations are pure computations. Persisted state is only ever
//! touched through the [`ProjectStore`] and [`ConfigStore`] collaborators.

pub mod catalog;
pub mod config;
pub mod datasource;
pub mod path;
pub mod reconcile;
pub mod setup;
pub mod store;

pub use catalog::{Catalog, DatabaseProfile, OrmProviderProfile};
pub use config::{DependencyRef, ProjectManifest};
pub use datasource::{
    reconcile_datasource, ConnectionTarget, CurrentDatasource, DatasourceChange, DesiredDatasource,
    PropertyScope,
};
pub use reconcile::{dependency_delta, DependencyDelta};
pub use setup::{JpaSetup, SetupReport, SetupRequest};
pub use store::{ApplicationProperties, ConfigStore, ManifestStore, ProjectStore};
