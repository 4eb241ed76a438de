mod cli;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use eyre::{eyre, WrapErr};
use futures::StreamExt;

use ballot_core::backend::FixtureChain;
use ballot_core::{ElectionsApi, KnownSpecs, OverrideTable};

use cli::{Command, ElectionsArgs, OverridesArgs};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr; stdout carries the JSON output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    match args.command {
        Command::Overrides(cmd) => run_overrides(cmd, args.pretty).await,
        Command::Elections(cmd) => run_elections(cmd, args.pretty).await,
    }
}

async fn run_overrides(args: OverridesArgs, pretty: bool) -> eyre::Result<()> {
    let resolved = match (&args.spec, &args.table) {
        (_, Some(path)) => {
            let table = load_table(path).await?;
            tracing::info!(
                path = %path.display(),
                intervals = table.intervals().len(),
                "loaded override table"
            );
            table.resolve(args.version)
        }
        (Some(spec), None) => {
            let specs = KnownSpecs::builtin().context("load built-in override tables")?;
            if specs.get(spec).is_none() {
                let known: Vec<&str> = specs.spec_names().collect();
                tracing::warn!(spec = %spec, ?known, "no override table for spec; no overrides apply");
            }
            specs.resolve(spec, args.version)
        }
        (None, None) => return Err(eyre!("either --spec or --table is required")),
    };

    print_json(&resolved, pretty)
}

async fn load_table(path: &Path) -> eyre::Result<OverrideTable> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read override table {}", path.display()))?;
    OverrideTable::from_json_str(&json)
        .with_context(|| format!("parse override table {}", path.display()))
}

async fn run_elections(args: ElectionsArgs, pretty: bool) -> eyre::Result<()> {
    let json = tokio::fs::read_to_string(&args.fixture)
        .await
        .with_context(|| format!("read fixture {}", args.fixture.display()))?;
    let chain = FixtureChain::from_json_str(&json).context("parse node state fixture")?;

    let api = ElectionsApi::new(Arc::new(chain));
    tracing::info!(strategy = %api.strategy(), "deriving election info");

    let mut stream = api.info().take(args.updates);
    let mut printed = 0usize;
    while let Some(item) = stream.next().await {
        let info = item.context("derive election info")?;
        print_json(&info, pretty)?;
        printed += 1;
    }

    if printed == 0 {
        return Err(eyre!("fixture produced no election info"));
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> eyre::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("serialize output")?;
    println!("{out}");
    Ok(())
}
