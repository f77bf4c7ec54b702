//! `healthdb` operator binary.
//!
//! Reads `healthdb.toml` (or the path given with `--config`) layered with
//! `HEALTHDB_*` environment variables, and works against a SQLite store.
//!
//! ```
//! healthdb init
//! healthdb --store ~/data/clinic.sqlite count encounter
//! healthdb coerce telephone "1 (800) 555-0100"
//! healthdb coerce uuid 1234 --integer
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use healthdb_core::{
  coerce::{Coercion, IntegerCoercion, TelephoneCoercion, UuidCoercion},
  schema::{Cardinality, RELATIONS, TABLES, Table, insertion_order},
  store::ClinicalStore,
  value::Value,
};
use healthdb_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "healthdb", version, about = "Clinical record store tooling")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "healthdb.toml")]
  config: PathBuf,

  /// SQLite store path; overrides `store_path` from the configuration.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create the store if needed and apply the schema.
  Init,
  /// Print the generated schema DDL.
  Ddl,
  /// Print every declared relationship.
  Relations,
  /// Print the tables in an order that satisfies every foreign key.
  Order,
  /// Run one value through a coercion and print the stored form.
  Coerce {
    converter: Converter,
    value:     String,
    /// Read `value` as an integer rather than text.
    #[arg(long)]
    integer:   bool,
  },
  /// Print row counts, for one table or all of them.
  Count { table: Option<Table> },
  /// Print one row as JSON.
  Show { table: Table, id: Uuid },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Converter {
  Uuid,
  Integer,
  Telephone,
}

// ─── Config ───────────────────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct CliConfig {
  store_path: PathBuf,
}

fn load_config(path: PathBuf) -> anyhow::Result<CliConfig> {
  let settings = config::Config::builder()
    .set_default("store_path", "healthdb.sqlite")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("HEALTHDB"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise CliConfig")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let Cli { config, store, command } = Cli::parse();

  match command {
    Command::Ddl => print!("{}", healthdb_store_sqlite::ddl()),
    Command::Relations => print_relations(),
    Command::Order => {
      for table in insertion_order() {
        println!("{table}");
      }
    }
    Command::Coerce { converter, value, integer } => {
      match coerce(converter, &value, integer)? {
        Some(stored) => println!("{stored}"),
        None => println!("NULL"),
      }
    }
    Command::Init => {
      let store = open_store(config, store).await?;
      let mut rows = 0;
      for def in TABLES {
        rows += store.count(def.table).await?;
      }
      tracing::info!(tables = TABLES.len(), rows, "store ready");
    }
    Command::Count { table } => {
      let store = open_store(config, store).await?;
      let tables: Vec<Table> = match table {
        Some(table) => vec![table],
        None => TABLES.iter().map(|d| d.table).collect(),
      };
      for table in tables {
        println!("{:<14} {}", table.name(), store.count(table).await?);
      }
    }
    Command::Show { table, id } => {
      let store = open_store(config, store).await?;
      let row = store
        .get(table, id)
        .await?
        .with_context(|| format!("no {table} row with id {id}"))?;
      println!("{}", serde_json::to_string_pretty(&row)?);
    }
  }

  Ok(())
}

async fn open_store(
  config: PathBuf,
  store: Option<PathBuf>,
) -> anyhow::Result<SqliteStore> {
  let store_path = match store {
    Some(path) => path,
    None => load_config(config)?.store_path,
  };
  let store_path = expand_tilde(&store_path);

  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

fn print_relations() {
  for relation in RELATIONS {
    let multiplicity = match relation.cardinality {
      Cardinality::OneToMany => "1",
      Cardinality::ZeroOrOneToMany => "0..1",
    };
    println!(
      "{}.{} -> {}.{} ({multiplicity} to many, via {}.{})",
      relation.parent,
      relation.parent_navigate,
      relation.child,
      relation.child_navigate,
      relation.child,
      relation.foreign_key,
    );
  }
}

/// Coerce `raw` and render the stored form; `None` stands for NULL.
fn coerce(
  converter: Converter,
  raw: &str,
  integer: bool,
) -> anyhow::Result<Option<String>> {
  let value = if integer {
    let raw = raw.trim();
    match raw.parse::<i64>() {
      Ok(n) => Value::Int(n),
      Err(_) => Value::U128(
        raw
          .parse()
          .with_context(|| format!("{raw:?} is not an integer"))?,
      ),
    }
  } else {
    Value::Text(raw.to_owned())
  };

  Ok(match converter {
    Converter::Uuid => UuidCoercion.bind(value)?,
    Converter::Integer => IntegerCoercion.bind(value)?.map(|n| n.to_string()),
    Converter::Telephone => TelephoneCoercion.bind(value)?,
  })
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
