use crate::config::load_config;
use crate::document::Document;
use crate::route_dump::write_route_dump;
use crate::routing::RouteOptions;
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "elbow", version, about = "Re-route elbow arrows in a scene document")]
pub struct Args {
    /// Input scene (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output scene. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON5 file (routing tunables)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Default clearance for endpoints whose binding carries no gap
    #[arg(long = "gap")]
    pub gap: Option<f64>,

    /// Write computed routes and headings as JSON to this path
    #[arg(long = "dump")]
    pub dump: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let mut document = Document::from_json(&input)?;

    let mut options = RouteOptions::new(config.routing.clone());
    if let Some(gap) = args.gap {
        if gap < 0.0 {
            return Err(anyhow::anyhow!("--gap must not be negative, got {gap}"));
        }
        options = options.with_gap(gap);
    }

    let outcomes = document.reroute_all(&options);
    tracing::info!(arrows = outcomes.len(), "routed scene");

    if let Some(path) = args.dump.as_deref() {
        write_route_dump(path, &outcomes)?;
    }

    let output = document.to_json(config.output.pretty)?;
    write_output(&output, args.output.as_deref())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(contents: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, contents)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
