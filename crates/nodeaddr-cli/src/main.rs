use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tabwriter::TabWriter;

use nodeaddr_io::content::{collect_field_slots, parse_form_content};
use nodeaddr_io::prelude::*;

mod schema;
mod store_file;

#[derive(Debug, Parser)]
#[command(
    name = "nodeaddr",
    version,
    about = "Hybrid address and content tooling"
)]
struct Cli {
    /// Log filter (overrides RUST_LOG), e.g. `debug` or `nodeaddr_io=debug`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check an address against the grammar and print the parsed parts.
    ValidateAddress { address: String },

    /// Rewrite bracket notation (`a[0]`, `a["k"]`) as dot notation.
    NormalizePath { path: String },

    /// Build the path of a field occurrence.
    FieldPath {
        ancestor: String,
        item_ref: String,
        #[arg(long)]
        instance: Option<u32>,
        #[arg(long)]
        index: Option<usize>,
    },

    /// Render `{{token}}` placeholders in a JSON payload.
    Interpolate {
        payload: PathBuf,
        /// Context JSON file
        #[arg(long)]
        context: Option<PathBuf>,
        /// Force `job.id` in the context
        #[arg(long)]
        job: Option<String>,
        /// Fail (exit 2) when any token stays unresolved
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        min: bool,
    },

    /// Validate a content document (schema, then contract).
    CheckContent {
        kind: ContentKind,
        document: PathBuf,
    },

    /// Strip runtime instances and print the library form of a document.
    Sanitize {
        kind: ContentKind,
        document: PathBuf,
        #[arg(long)]
        min: bool,
    },

    /// Print the library fingerprint of a document.
    Fingerprint {
        kind: ContentKind,
        document: PathBuf,
    },

    /// List every field occurrence of a form document.
    Refs {
        document: PathBuf,
        /// Ancestor path the form lives under
        #[arg(long, default_value = "")]
        root: String,
    },

    /// Read the value at an address.
    Get {
        #[command(flatten)]
        store: StoreArgs,
        job: String,
        address: String,
    },

    /// Write a JSON value at an address.
    Set {
        #[command(flatten)]
        store: StoreArgs,
        job: String,
        address: String,
        /// JSON text of the value
        value: String,
    },

    /// Interpolate a payload and write it at an address.
    Push {
        #[command(flatten)]
        store: StoreArgs,
        job: String,
        address: String,
        payload: PathBuf,
        #[arg(long)]
        context: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Args)]
struct StoreArgs {
    /// Store file (`{job: {ltree: content}}`)
    #[arg(long)]
    store: PathBuf,
    /// Error text that marks a missing node
    #[arg(long, default_value = "Node not found")]
    not_found_marker: String,
}

impl StoreArgs {
    fn service(&self) -> Result<HybridAddressService<MemoryStore>> {
        let store = store_file::load(&self.store)?;
        tracing::debug!(path = %self.store.display(), "store loaded");
        Ok(HybridAddressService::with_options(
            store,
            ServiceOptions {
                not_found_marker: self.not_found_marker.clone(),
                ..ServiceOptions::default()
            },
        ))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.cmd {
        Command::ValidateAddress { address } => {
            let validation = validate_address(&address);
            println!("{}", serde_json::to_string_pretty(&validation)?);
            if let Some(err) = validation.error {
                eprintln!("{err}");
                process::exit(2);
            }
        }
        Command::NormalizePath { path } => {
            println!("{}", normalize_path(&path));
        }
        Command::FieldPath {
            ancestor,
            item_ref,
            instance,
            index,
        } => {
            let path = generate_field_path(&ancestor, &item_ref, instance, index);
            println!("{path}");
        }
        Command::Interpolate {
            payload,
            context,
            job,
            strict,
            min,
        } => {
            let payload = read_json(&payload)?;
            let mut ctx = match context {
                Some(path) => read_json(&path)?,
                None => Value::Object(Default::default()),
            };
            if let Some(job_id) = job {
                ctx = nodeaddr_io::interp::merge_job(&ctx, &job_id);
            }

            let unresolved = unresolved_tokens(&payload, &ctx);
            if strict && !unresolved.is_empty() {
                eprintln!("unresolved tokens: {}", unresolved.join(", "));
                process::exit(2);
            }
            print_json(&interpolate_json(&payload, &ctx), min)?;
        }
        Command::CheckContent { kind, document } => {
            let doc = read_json(&document)?;
            let errors = schema::schema_errors(kind, &doc)?;
            if !errors.is_empty() {
                for e in &errors {
                    eprintln!("{e}");
                }
                process::exit(1);
            }

            let check = check_content(kind, &doc);
            println!("{}", serde_json::to_string(&check)?);
            if let Some(why) = check.why {
                eprintln!("{why}");
                process::exit(2);
            }
        }
        Command::Sanitize {
            kind,
            document,
            min,
        } => {
            let doc = read_json(&document)?;
            match sanitize_for_library(kind, &doc) {
                Ok(clean) => print_json(&clean, min)?,
                Err(v) => semantic_failure(v),
            }
        }
        Command::Fingerprint { kind, document } => {
            let doc = read_json(&document)?;
            match library_fingerprint(kind, &doc) {
                Ok(fp) => println!("{fp}"),
                Err(v) => semantic_failure(v),
            }
        }
        Command::Refs { document, root } => {
            let doc = read_json(&document)?;
            let form = match parse_form_content(&doc) {
                Ok(form) => form,
                Err(v) => semantic_failure(v),
            };

            let mut tw = TabWriter::new(std::io::stdout());
            writeln!(tw, "path\tref\tinstance\tvalue")?;
            for slot in collect_field_slots(&form.items, &root) {
                let value = slot.value.map_or_else(|| "-".to_string(), Value::to_string);
                writeln!(
                    tw,
                    "{}\t{}\t{}\t{}",
                    slot.path, slot.item_ref, slot.instance_id, value
                )?;
            }
            tw.flush()?;
        }
        Command::Get {
            store,
            job,
            address,
        } => {
            let svc = store.service()?;
            match svc.get_item_at(&job, &address).await {
                Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                Err(e @ (EngineError::NotFound { .. } | EngineError::Format(_))) => {
                    semantic_failure(e)
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Set {
            store,
            job,
            address,
            value,
        } => {
            let value: Value = serde_json::from_str(&value)
                .context("value is not valid JSON")?;
            let svc = store.service()?;
            match svc.set_item_at(&job, &address, &value).await {
                Ok(()) => store_file::save(&store.store, svc.store())?,
                Err(e @ EngineError::Format(_)) => semantic_failure(e),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Push {
            store,
            job,
            address,
            payload,
            context,
        } => {
            let payload = read_json(&payload)?;
            let ctx = match context {
                Some(path) => read_json(&path)?,
                None => Value::Object(Default::default()),
            };
            let svc = store.service()?;
            match svc.push_payload(&job, &address, &payload, &ctx).await {
                Ok(()) => store_file::save(&store.store, svc.store())?,
                Err(e @ EngineError::Format(_)) => semantic_failure(e),
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(l) => tracing_subscriber::EnvFilter::new(l),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    };
    // Logs go to stderr so stdout stays machine-readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parse {}", path.display()))
}

fn print_json(value: &Value, min: bool) -> Result<()> {
    let out = if min {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{out}");
    Ok(())
}

/// Report a validation failure and exit 2.
fn semantic_failure(err: impl std::fmt::Display) -> ! {
    eprintln!("{err}");
    process::exit(2);
}
