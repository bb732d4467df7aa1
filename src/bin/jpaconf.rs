// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use jpaconf::{
    path::{expand_project_root, resources_dir},
    ApplicationProperties, Catalog, ConnectionTarget, DatasourceChange, JpaSetup, ManifestStore,
    PropertyScope, SetupRequest,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  jpaconf [options] <jpaconf-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to project root.
    #[arg(short = 'C', long, global = true, default_value = ".", value_name = "path")]
    pub project: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let root = expand_project_root(&self.project)?;
        match self.command {
            Command::Setup(opts) => run_setup(root, opts),
            Command::Databases => run_databases(),
            Command::Providers => run_providers(),
            Command::Properties(opts) => run_properties(root, opts),
            Command::Status(opts) => run_status(root, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Configure persistence for project module.
    #[command(override_usage = "jpaconf setup [options] --provider <provider> --database <database>")]
    Setup(SetupOptions),

    /// List known databases.
    #[command(override_usage = "jpaconf databases")]
    Databases,

    /// List known ORM providers.
    #[command(override_usage = "jpaconf providers")]
    Providers,

    /// List datasource properties of project module.
    #[command(override_usage = "jpaconf properties [options]")]
    Properties(PropertiesOptions),

    /// Show persistence status of project module.
    #[command(override_usage = "jpaconf status [options]")]
    Status(StatusOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SetupOptions {
    /// ORM provider to use.
    #[arg(long, value_name = "provider")]
    pub provider: String,

    /// Database to connect to.
    #[arg(long, value_name = "database")]
    pub database: String,

    /// JNDI name of datasource, replaces JDBC settings.
    #[arg(long, value_name = "name")]
    pub jndi: Option<String>,

    /// Host name of database server.
    #[arg(long, value_name = "host")]
    pub host: Option<String>,

    /// Name of database, defaults to project name.
    #[arg(long, value_name = "name")]
    pub database_name: Option<String>,

    /// Username to connect with.
    #[arg(short, long, value_name = "username")]
    pub username: Option<String>,

    /// Password to connect with.
    #[arg(short, long, value_name = "password")]
    pub password: Option<String>,

    /// Project module to configure.
    #[arg(short, long, default_value = "", value_name = "module")]
    pub module: String,

    /// Profile to write datasource properties under.
    #[arg(long, value_name = "profile")]
    pub profile: Option<String>,

    /// Create profile property file if missing.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PropertiesOptions {
    /// Project module to inspect.
    #[arg(short, long, default_value = "", value_name = "module")]
    pub module: String,

    /// Profile to read datasource properties from.
    #[arg(long, value_name = "profile")]
    pub profile: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct StatusOptions {
    /// Project module to inspect.
    #[arg(short, long, default_value = "", value_name = "module")]
    pub module: String,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn open_setup<'catalog>(
    catalog: &'catalog Catalog,
    root: PathBuf,
    module: &str,
) -> JpaSetup<'catalog, ManifestStore, ApplicationProperties> {
    let config = ApplicationProperties::new(resources_dir(&root, module));
    JpaSetup::new(catalog, ManifestStore::new(root), config)
}

fn run_setup(root: PathBuf, opts: SetupOptions) -> Result<()> {
    let catalog = Catalog::builtin()?;
    let setup = open_setup(&catalog, root, &opts.module);
    let request = SetupRequest {
        orm_provider: opts.provider,
        database: opts.database,
        jndi: opts.jndi,
        connection: ConnectionTarget {
            host: opts.host,
            database_name: opts.database_name,
            username: opts.username,
            password: opts.password,
        },
        module: opts.module,
        scope: PropertyScope {
            profile: opts.profile,
            force: opts.force,
        },
    };

    let report = setup.configure(&request)?;
    print!("{}", report.dependencies);
    if let DatasourceChange::Update(delta) = &report.datasource {
        for (key, value) in delta.upsert() {
            println!("+ spring.datasource.{key}={value}");
        }
        for key in delta.remove() {
            println!("- spring.datasource.{key}");
        }
    }

    Ok(())
}

fn run_databases() -> Result<()> {
    let catalog = Catalog::builtin()?;
    for database in catalog.databases() {
        println!(
            "{:<24}{:<40}{}",
            database.id, database.driver_class_name, database.connection_template
        );
    }

    Ok(())
}

fn run_providers() -> Result<()> {
    let catalog = Catalog::builtin()?;
    for provider in catalog.orm_providers() {
        println!("{}", provider.id);
    }

    Ok(())
}

fn run_properties(root: PathBuf, opts: PropertiesOptions) -> Result<()> {
    let catalog = Catalog::builtin()?;
    let setup = open_setup(&catalog, root, &opts.module);
    for key in setup.database_properties(opts.profile.as_deref())? {
        println!("{key}");
    }

    Ok(())
}

fn run_status(root: PathBuf, opts: StatusOptions) -> Result<()> {
    let catalog = Catalog::builtin()?;
    let setup = open_setup(&catalog, root, &opts.module);
    if !setup.is_installation_possible() {
        info!("no project manifest found, persistence cannot be configured");
        return Ok(());
    }

    println!("spring data jpa:      {}", setup.has_spring_data_dependency(&opts.module)?);
    println!("datasource defined:   {}", setup.has_database_properties()?);
    println!("profiles:             {}", setup.config().profiles()?.join(", "));

    Ok(())
}
