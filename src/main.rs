use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spreorder::{
    cli, config, error,
    policy::{self, Policy, SortOrder},
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

/// Spotify playlist modifier. Without arguments it asks for a playlist and a
/// modification, then offers to set up a periodic job.
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
    /// Path to the configuration file
    #[clap(long, default_value = "config.json", global = true)]
    conf: PathBuf,

    /// Don't open the browser for the authentication
    #[clap(long, global = true)]
    no_browser: bool,

    /// Playlist to modify
    #[clap(long)]
    playlist: Option<String>,

    /// Modification to apply to the playlist (nop, shuffle, sort-popularity,
    /// sort-alphabetical, sort-audio-feature-<feature>)
    #[clap(long, value_parser = policy::parse_policy)]
    playlist_modification: Option<Policy>,

    /// Order of the playlist after modification
    #[clap(long, value_enum, default_value_t = SortOrder::Asc)]
    playlist_sort_order: SortOrder,

    /// Start the interactive mode
    #[clap(long)]
    interactive: bool,

    /// Generate a cover image for the playlist
    #[clap(long)]
    image: bool,

    /// Upload the generated cover image to Spotify (implies --image)
    #[clap(long)]
    upload_image: bool,

    /// Keep only the first occurrence of duplicated tracks before updating
    #[clap(long)]
    dedupe: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API and cache the token
    Auth,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment overrides. Err: {}", e);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Auth) => cli::auth(&cli.conf, cli.no_browser).await,
        Some(Command::Completions(opt)) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            cli::reorder(cli::ReorderOptions {
                conf: cli.conf,
                playlist: cli.playlist,
                policy: cli.playlist_modification,
                order: cli.playlist_sort_order,
                interactive: cli.interactive,
                image: cli.image || cli.upload_image,
                upload_image: cli.upload_image,
                no_browser: cli.no_browser,
                dedupe: cli.dedupe,
            })
            .await
        }
    };

    if let Err(e) = result {
        error!("{}", e);
    }
}
