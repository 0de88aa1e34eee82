//! Command-line front end for the catalog index.
//!
//! Loads the catalog once from `--source`, `CATALOG_SOURCE`, or
//! `data/catalog.json`, runs one query, and prints the result as pretty JSON.
//! `diff` works on two entity files and does not need a catalog.

use anyhow::{Context, Result, bail};
use catalog_index::{
    AttributeConflicts, CatalogIndex, CatalogSource, DatasetRef, Nullability, diff,
};
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CATALOG_LOG";

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse(env::args_os().skip(1))?;
    match cli.command {
        Command::Diff { original, updated } => {
            let original = read_json(&original)?;
            let updated = read_json(&updated)?;
            print_json(&diff(&original, &updated))
        }
        command => {
            let source = CatalogSource::resolve(cli.source.as_deref());
            let index = source
                .loader()
                .load()
                .with_context(|| format!("loading catalog from {source}"))?;
            run_query(&index, command)
        }
    }
}

fn run_query(index: &CatalogIndex, command: Command) -> Result<()> {
    match command {
        Command::Summary => print_json(&index.summary()),
        Command::Datasets { query } => {
            let hits = index.filter_datasets(query.as_deref().unwrap_or(""));
            print_json(&hits)
        }
        Command::Dataset { id } => {
            let Some(dataset) = index.dataset(&id) else {
                bail!("no dataset with id '{id}'");
            };
            let attributes: Vec<&str> = index
                .attributes_for_dataset(dataset)
                .into_iter()
                .map(|attribute| attribute.name.as_str())
                .collect();
            print_json(&serde_json::json!({
                "dataset": dataset,
                "attributes": attributes,
            }))
        }
        Command::Attributes { query } => {
            let rows: Vec<AttributeRow<'_>> = index
                .filter_attributes(query.as_deref().unwrap_or(""))
                .into_iter()
                .map(|attribute| AttributeRow {
                    name: attribute.name.as_str(),
                    label: &attribute.label,
                    data_type: attribute.data_type.as_deref(),
                    nullable: attribute.nullable,
                    datasets: &attribute.datasets,
                    conflicts: attribute.conflicts(),
                })
                .collect();
            print_json(&rows)
        }
        Command::Attribute { id } => {
            let Some(attribute) = index.attribute(&id) else {
                bail!("no attribute named '{id}'");
            };
            let used_by: Vec<&str> = index
                .datasets_for_attribute(&id)
                .into_iter()
                .map(|dataset| dataset.title.as_str())
                .collect();
            print_json(&serde_json::json!({
                "attribute": attribute,
                "conflicts": attribute.conflicts(),
                "used_by": used_by,
            }))
        }
        Command::Conflicts => print_json(&index.conflicts()),
        Command::Skipped => print_json(index.diagnostics()),
        Command::Diff { .. } => bail!("diff does not take a catalog"),
    }
}

#[derive(Serialize)]
struct AttributeRow<'a> {
    name: &'a str,
    label: &'a str,
    #[serde(rename = "type")]
    data_type: Option<&'a str>,
    nullable: Nullability,
    datasets: &'a [DatasetRef],
    conflicts: AttributeConflicts,
}

fn read_json(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Command {
    Summary,
    Datasets { query: Option<String> },
    Dataset { id: String },
    Attributes { query: Option<String> },
    Attribute { id: String },
    Conflicts,
    Skipped,
    Diff { original: PathBuf, updated: PathBuf },
}

#[derive(Debug, PartialEq)]
struct Cli {
    source: Option<String>,
    command: Command,
}

impl Cli {
    fn parse(args: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut source: Option<String> = None;
        let mut positional: Vec<String> = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--source" => {
                    if source.is_some() {
                        bail!("--source may only be provided once");
                    }
                    source = Some(next_value(&mut args, "--source")?);
                }
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => bail!("unknown flag: {flag}"),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let Some(name) = positional.next() else {
            bail!("missing command\n\n{}", usage());
        };
        let mut operand = |label: &str| {
            positional
                .next()
                .ok_or_else(|| anyhow::anyhow!("{name} requires {label}"))
        };
        let command = match name.as_str() {
            "summary" => Command::Summary,
            "datasets" => Command::Datasets {
                query: operand("QUERY").ok(),
            },
            "dataset" => Command::Dataset {
                id: operand("an ID")?,
            },
            "attributes" => Command::Attributes {
                query: operand("QUERY").ok(),
            },
            "attribute" => Command::Attribute {
                id: operand("an ID")?,
            },
            "conflicts" => Command::Conflicts,
            "skipped" => Command::Skipped,
            "diff" => Command::Diff {
                original: PathBuf::from(operand("ORIGINAL")?),
                updated: PathBuf::from(operand("UPDATED")?),
            },
            other => bail!("unknown command: {other}\n\n{}", usage()),
        };

        if let Some(extra) = positional.next() {
            bail!("unexpected argument: {extra}");
        }

        Ok(Cli { source, command })
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow::anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: catalog [--source PATH|URL] <command>\n\
\n\
Commands:\n  summary               Counts of datasets, attributes, conflicts, skipped records.\n  datasets [QUERY]      Datasets whose id/title/description/topics/keywords contain QUERY.\n  dataset ID            One dataset and the attributes it resolves to.\n  attributes [QUERY]    Attributes whose name/label/type/description/examples contain QUERY.\n  attribute ID          One merged attribute with its definitions and conflicts.\n  conflicts             Attributes whose datasets disagree on type or description.\n  skipped               Records dropped while indexing.\n  diff ORIGINAL UPDATED Field changes between two entity JSON files.\n\
\n\
The source defaults to $CATALOG_SOURCE, then data/catalog.json. Set CATALOG_LOG for logs.\n"
}
