// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Spring property file handling.
//!
//! Spring Boot reads its settings from `application.properties`, and from
//! `application-<profile>.properties` for each named profile. jpaconf only
//! ever manages a handful of keys in one namespace, so property files are
//! edited line by line: lines that are not touched, comments and blank lines
//! included, are written back exactly as they were read.
//!
//! # Supported Syntax
//!
//! Each non-blank line that does not start with `#` or `!` is a property.
//! The key runs up to the first `=`, `:` or whitespace. A separator made of
//! whitespace may be followed by one `=` or `:`, and the rest of the line is
//! the value. Surrounding whitespace is trimmed from the value. Line
//! continuations and escape sequences are not interpreted.

use crate::{
    path::properties_path,
    store::{ConfigStore, Result, StoreError},
};

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{read_to_string, write},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Spring property files of one project module.
#[derive(Clone, Debug)]
pub struct ApplicationProperties {
    resources: PathBuf,
}

impl ApplicationProperties {
    /// Construct new property file store over resources directory.
    pub fn new(resources: impl Into<PathBuf>) -> Self {
        Self {
            resources: resources.into(),
        }
    }

    /// Path to property file of optional profile.
    pub fn path(&self, profile: Option<&str>) -> PathBuf {
        properties_path(&self.resources, profile)
    }

    /// List profiles that have a property file.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Pattern`] if the resources path cannot be
    ///   turned into a file pattern.
    pub fn profiles(&self) -> Result<Vec<String>> {
        let pattern = format!(
            "{}/application-*.properties",
            glob::Pattern::escape(&self.resources.to_string_lossy())
        );

        let mut profiles = glob::glob(&pattern)?
            .filter_map(std::result::Result::ok)
            .filter_map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_prefix("application-"))
                    .and_then(|name| name.strip_suffix(".properties"))
                    .map(str::to_owned)
            })
            .collect::<Vec<_>>();
        profiles.sort();

        Ok(profiles)
    }

    /// Read property file of optional profile.
    ///
    /// Returns [`None`] if the file does not exist.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Read`] if the file exists but cannot be read.
    pub fn read(&self, profile: Option<&str>) -> Result<Option<PropertiesEdit>> {
        read_properties(&self.path(profile))
    }

    /// Edit property file of optional profile.
    ///
    /// Read current file into [`PropertiesEdit`] instance, and directly edit
    /// each property before writing the results back. Nothing is written if
    /// the editor left the content unchanged. A missing file is treated as
    /// empty when `create` is set, and left alone otherwise.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Read`] if the file cannot be read.
    /// - Return [`StoreError::CreateDir`] if the resources directory cannot
    ///   be created.
    /// - Return [`StoreError::Write`] if the file cannot be written.
    pub fn edit<E>(&self, profile: Option<&str>, create: bool, editor: E) -> Result<()>
    where
        E: FnOnce(&mut PropertiesEdit),
    {
        let path = self.path(profile);
        let mut properties = match read_properties(&path)? {
            Some(properties) => properties,
            None if create => PropertiesEdit::new(),
            None => return Ok(()),
        };

        editor(&mut properties);
        if !properties.changed {
            debug!("no changes for {:?}", path.display());
            return Ok(());
        }

        mkdirp::mkdirp(&self.resources).map_err(|err| StoreError::CreateDir {
            source: err,
            path: self.resources.clone(),
        })?;
        write(&path, properties.to_string().as_bytes()).map_err(|err| StoreError::Write {
            source: err,
            path: path.clone(),
        })?;
        info!("update {:?}", path.display());

        Ok(())
    }
}

impl ConfigStore for ApplicationProperties {
    fn property(
        &self,
        namespace: &str,
        key: &str,
        profile: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(self
            .read(profile)?
            .and_then(|properties| properties.get(qualify(namespace, key)).map(str::to_owned)))
    }

    #[instrument(skip(self, properties), level = "debug")]
    fn add_properties(
        &self,
        namespace: &str,
        properties: &BTreeMap<String, String>,
        profile: Option<&str>,
        force: bool,
    ) -> Result<()> {
        let path = self.path(profile);
        if let Some(profile) = profile {
            // INVARIANT: Never create a profile file unless forced to.
            if !force && !path.exists() {
                return Err(StoreError::MissingProfile {
                    profile: profile.into(),
                    path,
                });
            }
        }

        self.edit(profile, true, |edit| {
            for (key, value) in properties {
                edit.set(qualify(namespace, key), value);
            }
        })
    }

    #[instrument(skip(self), level = "debug")]
    fn remove_property(&self, namespace: &str, key: &str, profile: Option<&str>) -> Result<()> {
        self.edit(profile, false, |edit| edit.remove(qualify(namespace, key)))
    }

    fn property_keys(
        &self,
        namespace: &str,
        qualified: bool,
        profile: Option<&str>,
    ) -> Result<BTreeSet<String>> {
        let Some(properties) = self.read(profile)? else {
            return Ok(BTreeSet::new());
        };

        let prefix = format!("{namespace}.");
        Ok(properties
            .keys()
            .filter_map(|key| {
                key.strip_prefix(prefix.as_str()).map(|relative| match qualified {
                    true => key.to_owned(),
                    false => relative.to_owned(),
                })
            })
            .collect())
    }
}

fn qualify(namespace: &str, key: &str) -> String {
    format!("{namespace}.{key}")
}

fn read_properties(path: &Path) -> Result<Option<PropertiesEdit>> {
    match read_to_string(path) {
        Ok(content) => Ok(Some(PropertiesEdit::from(content.as_str()))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::Read {
            source: err,
            path: path.to_path_buf(),
        }),
    }
}

/// Property file editor.
///
/// # Invariant
///
/// - Untouched lines render exactly as they were parsed.
/// - Setting a key that is absent appends it to the end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PropertiesEdit {
    lines: Vec<Line>,
    changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Property {
        key: String,
        value: String,
        raw: String,
    },
    Other(String),
}

impl PropertiesEdit {
    /// Construct new empty property editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any edit changed the content.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Get value of property. The last occurrence of a key wins.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| match line {
            Line::Property { key: k, value, .. } if k == key.as_ref() => Some(value.as_str()),
            _ => None,
        })
    }

    /// Set value of property, overwriting every occurrence of its key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        let mut found = false;

        for line in self.lines.iter_mut() {
            if let Line::Property { key: k, value: v, raw } = line {
                if *k == key {
                    found = true;
                    if *v != value {
                        *v = value.clone();
                        *raw = format!("{key}={value}");
                        self.changed = true;
                    }
                }
            }
        }

        if !found {
            self.lines.push(Line::Property {
                raw: format!("{key}={value}"),
                key,
                value,
            });
            self.changed = true;
        }
    }

    /// Remove every occurrence of property.
    pub fn remove(&mut self, key: impl AsRef<str>) {
        let key = key.as_ref();
        let before = self.lines.len();
        self.lines
            .retain(|line| !matches!(line, Line::Property { key: k, .. } if k == key));
        if before != self.lines.len() {
            self.changed = true;
        }
    }

    /// List property keys in order of first appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let mut seen = BTreeSet::new();
        self.lines.iter().filter_map(move |line| match line {
            Line::Property { key, .. } if seen.insert(key.as_str()) => Some(key.as_str()),
            _ => None,
        })
    }
}

impl Display for PropertiesEdit {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        for line in &self.lines {
            match line {
                Line::Property { raw, .. } => writeln!(fmt, "{raw}")?,
                Line::Other(raw) => writeln!(fmt, "{raw}")?,
            }
        }

        Ok(())
    }
}

impl From<&str> for PropertiesEdit {
    fn from(content: &str) -> Self {
        let lines = content.lines().map(parse_line).collect();

        Self {
            lines,
            changed: false,
        }
    }
}

fn parse_line(raw: &str) -> Line {
    let trimmed = raw.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
        return Line::Other(raw.to_owned());
    }

    let (key, rest) = match trimmed.find(['=', ':', ' ', '\t', '\x0c']) {
        Some(index) => trimmed.split_at(index),
        None => (trimmed, ""),
    };
    let rest = rest.trim_start();
    let value = rest.strip_prefix(['=', ':']).unwrap_or(rest);

    Line::Property {
        key: key.to_owned(),
        value: value.trim().to_owned(),
        raw: raw.to_owned(),
    }
}
