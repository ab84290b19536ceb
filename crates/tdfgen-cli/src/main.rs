mod output;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tdfgen::{render::render, schema::Schema};

#[derive(Parser, Debug)]
#[command(name = "tdfgen")]
#[command(about = "Generate Rust TDF decoders from a JSON schema.")]
struct Cli {
    /// TDF JSON description
    #[arg(long)]
    json: PathBuf,

    /// Output folder for decoders.rs
    #[arg(short, long)]
    out: PathBuf,

    /// Log each compiled struct and definition
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(filter));

    let json = fs::read_to_string(&cli.json)
        .with_context(|| format!("reading schema: {}", cli.json.display()))?;
    let schema = Schema::from_json(&json)
        .with_context(|| format!("loading schema: {}", cli.json.display()))?;

    let code = render(&schema);
    let path = output::write_decoders(&cli.out, &code)
        .with_context(|| format!("writing output: {}", cli.out.display()))?;

    info!(
        "wrote {} definitions to {}",
        schema.definitions.len(),
        path.display()
    );

    Ok(())
}
