use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod document;
mod error;
mod repository;
mod source;
mod transform;
mod update;

use cli::Cli;
use error::Error;
use repository::HttpRepository;
use transform::transform;
use update::Updater;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let is_configuration = err
                .downcast_ref::<Error>()
                .is_some_and(Error::is_configuration);
            if is_configuration {
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.transform_options();
    let updater = if cli.no_upload {
        None
    } else {
        build_updater(cli)?
    };

    let summary = transform(&cli.input, &options, updater.as_ref())
        .with_context(|| format!("transform {}", cli.input.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("serialize run summary")?;
        println!("{json}");
    } else {
        let dir_name = options
            .output_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| options.output_dir.display().to_string());
        println!("Created {} XML files in {dir_name}", summary.documents);
    }
    Ok(())
}

fn build_updater(cli: &Cli) -> Result<Option<Updater>> {
    let Some(credentials) = config::resolve_credentials(cli.credentials.as_deref())? else {
        println!("No repository credentials found; documents will not be uploaded");
        return Ok(None);
    };
    tracing::debug!(domain = %credentials.domain, "repository updates enabled");
    let client = HttpRepository::new(&credentials);
    Ok(Some(Updater::new(Box::new(client), cli.namespace.clone())))
}
