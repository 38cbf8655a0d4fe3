// src/bin/cli.rs

//! Command-line entry point for the U-Cursos scraper.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ucursos_scraper::calendar;
use ucursos_scraper::error::{AppError, Result};
use ucursos_scraper::models::{Config, Section};
use ucursos_scraper::pipeline::{self, ScrapeOptions};
use ucursos_scraper::session::Credentials;

#[derive(Parser)]
#[command(name = "ucursos", version, about = "U-Cursos portal scraper")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download course files and build the ICS calendar
    ///
    /// Credentials come from the UCURSOS_USERNAME and UCURSOS_PASSWORD
    /// environment variables.
    Scrape {
        /// Only scrape courses whose name contains this text
        #[arg(long)]
        course: Option<String>,

        /// Scrape the calendario section
        #[arg(long)]
        calendario: bool,

        /// Scrape the material docente section
        #[arg(long)]
        material: bool,

        /// Scrape the novedades feed
        #[arg(long)]
        novedades: bool,

        /// Scrape the tareas section
        #[arg(long)]
        tareas: bool,

        /// Show the browser window instead of running headless
        #[arg(long)]
        headed: bool,

        /// Override the output root directory
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Serve the generated calendar over HTTP for subscription
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn credentials_from_env() -> Result<Credentials> {
    let username = std::env::var("UCURSOS_USERNAME")
        .map_err(|_| AppError::auth("UCURSOS_USERNAME is not set"))?;
    let password = std::env::var("UCURSOS_PASSWORD")
        .map_err(|_| AppError::auth("UCURSOS_PASSWORD is not set"))?;
    Ok(Credentials { username, password })
}

/// Sections picked by flags; no flag at all means every section.
fn selected_sections(calendario: bool, material: bool, novedades: bool, tareas: bool) -> Vec<Section> {
    let mut sections = Vec::new();
    if calendario {
        sections.push(Section::Calendario);
    }
    if material {
        sections.push(Section::MaterialDocente);
    }
    if novedades {
        sections.push(Section::Novedades);
    }
    if tareas {
        sections.push(Section::Tareas);
    }
    if sections.is_empty() {
        Section::ALL.to_vec()
    } else {
        sections
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Scrape {
            course,
            calendario,
            material,
            novedades,
            tareas,
            headed,
            output,
        } => {
            if let Some(output) = output {
                config.output.root = output.to_string_lossy().into_owned();
            }
            let credentials = credentials_from_env()?;
            let options = ScrapeOptions {
                course_filter: course,
                sections: selected_sections(calendario, material, novedades, tareas),
                headless: !headed,
            };
            pipeline::run(&config, &credentials, &options).await
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let calendar_path =
                PathBuf::from(&config.output.root).join(&config.output.calendar_file);
            calendar::server::run(&config.server, calendar_path).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        log::error!("{e}");
        std::process::exit(1);
    }
}
