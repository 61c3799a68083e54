//! matrix-marquee - HTTP-fed text and idle demos on an LED matrix
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use marquee_app::config;

/// Shows HTTP-submitted text on an LED matrix, with rotating demos when idle
#[derive(Parser, Debug)]
#[command(name = "marquee")]
#[command(about = "Shows HTTP-submitted text on an LED matrix", long_about = None)]
struct Args {
    /// Settings file (default: /etc/matrix-marquee/config.toml, then the
    /// user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.bind`
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Log directory, overrides `logging.directory`
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a commented default settings file
    InitConfig {
        /// Where to write it (default: the user config directory)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(Command::InitConfig { path }) = args.command {
        let written = config::init_config_file(path.as_deref())?;
        eprintln!("Wrote {}", written.display());
        return Ok(());
    }

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        settings.server.bind = bind;
    }
    if let Some(dir) = args.log_dir {
        settings.logging.directory = Some(dir);
    }

    marquee_core::logging::init(settings.logging.directory.as_deref())?;

    matrix_marquee::run(settings).await?;
    Ok(())
}
