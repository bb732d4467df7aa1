// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dependency reconciliation.
//!
//! Selecting a database and an ORM provider for a project means two things
//! for its build dependencies: everything the selection needs must be
//! declared, and everything that only some _other_ database or provider
//! needs must go. The pair of sets that describes this change is called a
//! __dependency delta__.
//!
//! # Compatible Databases
//!
//! A database counts as unwanted only when both its id and its driver class
//! differ from the selection. Engines that share a driver under different
//! ids, e.g., the in-memory and persistent Hypersonic variants, are treated
//! as compatible with one another, so their dependencies are left alone.

use crate::{catalog::Catalog, config::DependencyRef};

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter, Result as FmtResult},
};
use tracing::{debug, instrument};

/// Build dependency changes required by a persistence selection.
///
/// # Invariant
///
/// - Nothing in `to_remove` is also in `to_add`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DependencyDelta {
    to_add: BTreeSet<DependencyRef>,
    to_remove: BTreeSet<DependencyRef>,
}

impl DependencyDelta {
    /// Dependencies that must be declared.
    pub fn to_add(&self) -> &BTreeSet<DependencyRef> {
        &self.to_add
    }

    /// Dependencies that must no longer be declared.
    pub fn to_remove(&self) -> &BTreeSet<DependencyRef> {
        &self.to_remove
    }

    /// Keep dependency out of the removal set.
    ///
    /// Returns true if the dependency was scheduled for removal.
    pub fn preserve(&mut self, dependency: &DependencyRef) -> bool {
        self.to_remove.remove(dependency)
    }
}

impl Display for DependencyDelta {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for dependency in &self.to_add {
            writeln!(fmt, "+ {dependency}")?;
        }

        for dependency in &self.to_remove {
            writeln!(fmt, "- {dependency}")?;
        }

        Ok(())
    }
}

/// Compute dependency delta for database and ORM provider selection.
///
/// Required dependencies are those of the selected database, the selected
/// ORM provider, and the JPA and Spring groups. Removal candidates are those
/// of every unwanted database and ORM provider. Anything required is never
/// removed.
///
/// # Errors
///
/// - Return [`ReconcileError::InvalidSelection`] if either id is not in the
///   catalog.
#[instrument(skip(catalog), level = "debug")]
pub fn dependency_delta(
    catalog: &Catalog,
    database: &str,
    orm_provider: &str,
) -> Result<DependencyDelta> {
    let selected_db = catalog
        .database(database)
        .ok_or_else(|| ReconcileError::InvalidSelection {
            kind: SelectionKind::Database,
            id: database.into(),
        })?;
    let selected_orm =
        catalog
            .orm_provider(orm_provider)
            .ok_or_else(|| ReconcileError::InvalidSelection {
                kind: SelectionKind::OrmProvider,
                id: orm_provider.into(),
            })?;

    let mut required = BTreeSet::new();
    let groups = [
        selected_db.dependencies.as_slice(),
        selected_orm.dependencies.as_slice(),
        catalog.jpa_dependencies(),
        catalog.spring_dependencies(),
    ];
    for dependency in groups.into_iter().flatten() {
        // INVARIANT: First declaration wins, so its version is the one kept.
        if !required.contains(dependency) {
            required.insert(dependency.clone());
        }
    }

    let unwanted_databases = catalog.databases().iter().filter(|db| {
        db.id != selected_db.id && db.driver_class_name != selected_db.driver_class_name
    });
    let unwanted_orm_providers = catalog
        .orm_providers()
        .iter()
        .filter(|orm| orm.id != selected_orm.id);

    let candidates = unwanted_databases
        .flat_map(|db| db.dependencies.iter())
        .chain(unwanted_orm_providers.flat_map(|orm| orm.dependencies.iter()));

    let mut to_remove = BTreeSet::new();
    for dependency in candidates {
        if !required.contains(dependency) && !to_remove.contains(dependency) {
            to_remove.insert(dependency.clone());
        }
    }

    debug!(
        "{} required and {} redundant dependencies for {}/{}",
        required.len(),
        to_remove.len(),
        selected_db.id,
        selected_orm.id
    );

    Ok(DependencyDelta {
        to_add: required,
        to_remove,
    })
}

/// Kind of catalog entry a selection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Database,
    OrmProvider,
}

impl Display for SelectionKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Database => fmt.write_str("database"),
            Self::OrmProvider => fmt.write_str("ORM provider"),
        }
    }
}

/// Dependency reconciliation error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// Selected id is not in the catalog.
    #[error("unknown {kind} {id:?}")]
    InvalidSelection { kind: SelectionKind, id: String },
}

/// Friendly result alias :3
type Result<T, E = ReconcileError> = std::result::Result<T, E>;
