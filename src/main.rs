use std::{path::PathBuf, time::Duration};

use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spafcli::{
    cli,
    config::{self, Config, EmptyOutput, TokenStrategy},
    error,
    export::RunSource,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Export audio features for all playlists of a user
    User(UserOptions),

    /// Export audio features for the given playlists
    Playlists(PlaylistsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct UserOptions {
    /// Spotify user ID whose playlists are exported
    pub user_id: String,

    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Spotify playlist IDs, exported in the given order
    #[clap(required = true, num_args = 1..)]
    pub playlist_ids: Vec<String>,

    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Args, Debug, Clone)]
pub struct RunOptions {
    /// Write the CSV to this file instead of the derived name
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Directory for the CSV file (defaults to SPAFCLI_OUTPUT_DIR or ".")
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Attempts per request while rate limited
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: Option<u32>,

    /// Backoff before the first retry when no Retry-After is sent
    #[clap(long)]
    pub initial_backoff_ms: Option<u64>,

    /// Request a new access token before every request
    #[clap(long)]
    pub token_per_request: bool,

    /// Do not create the CSV file if the playlist listing fails
    #[clap(long)]
    pub no_file_on_failure: bool,
}

impl RunOptions {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }
        if let Some(ms) = self.initial_backoff_ms {
            config.retry.initial_backoff = Duration::from_millis(ms);
        }
        if self.token_per_request {
            config.token_strategy = TokenStrategy::PerRequest;
        }
        if self.no_file_on_failure {
            config.on_enumeration_failure = EmptyOutput::NoFile;
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn load_config(run: &RunOptions) -> Config {
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };
    run.apply(&mut config);
    config
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::User(opt) => {
            let config = load_config(&opt.run);
            cli::export(config, RunSource::User(opt.user_id), opt.run.output).await
        }
        Command::Playlists(opt) => {
            let config = load_config(&opt.run);
            cli::export(config, RunSource::Playlists(opt.playlist_ids), opt.run.output).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
