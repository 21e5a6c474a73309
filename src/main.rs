use std::{io::Write, path::PathBuf};

use anyhow::anyhow;
use clap::{CommandFactory, Parser};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    config::{Config, ConfigOverrides},
    context::Context,
};

mod asset;
mod config;
mod context;
mod error;
mod page;
mod rewrite;
mod site;

#[derive(Parser, Debug)]
#[command(name = "mksite")]
#[command(author, version, long_about = None)]
#[command(about = "Rewrites a downloaded web page into a relocatable site package")]
struct Args {
    /// Site name, used for the output directories and rewritten links
    site: Option<String>,
    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    overrides: ConfigOverrides,
    /// Remove existing output for this site before building
    #[arg(long)]
    clean: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}

fn print_usage(out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "{}", Args::command().render_help())?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    debug!("running with {args:?}");

    let Some(site_name) = args.site.as_deref() else {
        print_usage(&mut std::io::stdout())?;
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_overrides(args.overrides);

    let context = Context::new(site_name, config)?;

    if args.clean {
        context.clean_output_dirs()?;
    }

    site::build_site(&context)?;

    Ok(())
}
