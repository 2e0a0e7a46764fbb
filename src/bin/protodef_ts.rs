//! Generate TypeScript typings from a protodef `protocol.json`.
//!
//! Usage:
//!   protodef-ts [OPTIONS] <PROTOCOL.json>
//!
//! Writes the declarations once, after every entry has been attempted. Entries
//! that fail to compile are reported on stderr (name, error, raw node) and left
//! out; the exit code is 1 if any entry failed.
//!
//! Set `RUST_LOG=protodef_ts=debug` to see every compiled entry.

use anyhow::Context;
use clap::Parser;
use protodef_ts::{generate, AnonymousFields, CompileOptions, ErrorPolicy, Protocol};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "protodef-ts")]
#[command(about = "Compile a protodef protocol definition into TypeScript typings")]
struct Cli {
    /// Path to the protocol JSON document
    input: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "typings.d.ts")]
    output: PathBuf,

    /// `/`-separated object path to the type mapping (e.g. `toClient`)
    #[arg(long, default_value = "")]
    namespace: String,

    /// Splice anonymous container fields into their parent instead of omitting them
    #[arg(long)]
    flatten_anonymous: bool,

    /// Stop at the first failing entry and write nothing
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "protodef_ts=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let root: serde_json::Value = serde_json::from_str(&source)
        .with_context(|| format!("parsing {}", cli.input.display()))?;
    let protocol = Protocol::from_value(root, &cli.namespace)
        .with_context(|| format!("loading types from {}", cli.input.display()))?;
    info!("Loaded {} entries from {}", protocol.len(), cli.input.display());

    let options = CompileOptions {
        anonymous_fields: if cli.flatten_anonymous {
            AnonymousFields::Flatten
        } else {
            AnonymousFields::Omit
        },
        on_error: if cli.fail_fast {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::SkipEntry
        },
    };

    let doc = match generate(&protocol, options) {
        Ok(doc) => doc,
        Err(failure) => {
            error!("{}; nothing written", failure);
            std::process::exit(1);
        }
    };

    std::fs::write(&cli.output, doc.render())
        .with_context(|| format!("writing {}", cli.output.display()))?;
    info!(
        "TypeScript definitions for {} entries saved to {} ({} skipped, {} failed)",
        doc.declarations().len(),
        cli.output.display(),
        doc.skipped().len(),
        doc.failures().len()
    );

    if !doc.is_complete() {
        let names: Vec<_> = doc.failures().iter().map(|f| f.name.as_str()).collect();
        error!("{} entries failed: {}", names.len(), names.join(", "));
        std::process::exit(1);
    }
    Ok(())
}
