//! Argument parsing and command dispatch.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use url::Url;
use uuid::Uuid;
use vidshelf_core::config::DEFAULT_SUBTITLE_ROOT;

use crate::client::{AppContext, CliResult, init_logging, parse_url};
use crate::commands::library::{handle_list, handle_remove, handle_stream, handle_upload};

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Parses CLI arguments and executes the requested command. Returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.log_format) {
        eprintln!("warning: {err:#}");
    }
    let trace_id = Uuid::new_v4().to_string();
    tracing::debug!(%trace_id, api = %cli.api_url, "vidshelf invoked");

    match dispatch(cli, &trace_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let ctx = AppContext::new(
        cli.api_url,
        Duration::from_secs(cli.timeout),
        &cli.subtitle_root,
        trace_id,
    )?;

    match cli.command {
        Command::Ls => handle_list(&ctx, cli.output).await,
        Command::Upload(args) => handle_upload(&ctx, args, cli.output).await,
        Command::Rm(args) => handle_remove(&ctx, args, cli.output).await,
        Command::Stream(args) => handle_stream(&ctx, args, cli.output).await,
    }
}

#[derive(Parser)]
#[command(name = "vidshelf", about = "Manage and stream a Vidshelf video library")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "VIDSHELF_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "VIDSHELF_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "VIDSHELF_SUBTITLE_ROOT",
        default_value = DEFAULT_SUBTITLE_ROOT,
        help = "Path under which per-video subtitle folders are served"
    )]
    pub(crate) subtitle_root: String,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "VIDSHELF_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the videos in the library.
    Ls,
    /// Upload a video file.
    Upload(UploadArgs),
    /// Delete one or more videos.
    Rm(RemoveArgs),
    /// Resolve the stream and subtitle locations for a video.
    Stream(StreamArgs),
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    /// Path of the file to upload.
    pub(crate) path: PathBuf,
}

#[derive(Args)]
pub(crate) struct RemoveArgs {
    /// Video ids to delete, as listed by `vidshelf ls`.
    #[arg(required = true, num_args = 1..)]
    pub(crate) ids: Vec<String>,
}

#[derive(Args)]
pub(crate) struct StreamArgs {
    /// Video id, as listed by `vidshelf ls`.
    pub(crate) id: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}
