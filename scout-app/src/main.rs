use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use scout_agents::{LengthTier, SummaryRequest};
use scout_common::observability::{LogConfig, init_logging};
use scout_config::{ScoutConfig, ScoutConfigLoader};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use wiring::Scout;

mod command;
mod wiring;

use command::{CHAT_HELP, Command, parse_command};

#[derive(Debug, Parser)]
#[command(name = "scout", version, about = "Search the web, extract pages and summarize them")]
struct Cli {
    /// YAML config file; defaults to ./scout.yaml and the user config dir.
    #[arg(long, global = true, env = "SCOUT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Web search with a direct answer when available.
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Extract the main content of a page.
    Extract {
        url: String,
        /// Also summarize the extracted text (short, medium or long).
        #[arg(long, value_name = "LENGTH")]
        summarize: Option<String>,
    },
    /// Truncating summary of text, a file, or a page extracted earlier.
    Summarize(SummarizeArgs),
    /// One coordinator turn.
    Ask {
        #[arg(required = true, num_args = 1..)]
        request: Vec<String>,
    },
    /// Interactive session; extracted pages persist between requests.
    Chat,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "text", "file"])))]
struct SummarizeArgs {
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    text: Option<String>,
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    #[arg(long, default_value = "medium")]
    length: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so both the loader and the key lookups see it
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_path = init_logging(LogConfig {
        app_name: "scout",
        log_dir: config.logging.dir.clone(),
        emit_stderr: config.logging.emit_stderr,
        format: config.logging.format,
        default_filter: config.logging.filter.clone(),
    })?;
    tracing::info!(log = %log_path.display(), command = ?cli.command, "app.start");

    let mut scout = Scout::new(config);
    match cli.command {
        Cmd::Search { query } => {
            println!("{}", scout.search(&query.join(" ")).await?);
        }
        Cmd::Extract { url, summarize } => {
            let result = scout.extract(&url).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if let Some(length) = summarize {
                let request = SummaryRequest::url(result.url, LengthTier::parse_lenient(&length));
                println!("\n{}", scout.summarize(&request)?);
            }
        }
        Cmd::Summarize(args) => {
            let request = summary_request(args).await?;
            println!("{}", scout.summarize(&request)?);
        }
        Cmd::Ask { request } => {
            let turn = scout.ask(&request.join(" ")).await?;
            println!("{}", turn.answer);
        }
        Cmd::Chat => chat(&mut scout).await?,
    }
    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<ScoutConfig> {
    let loader = match explicit {
        Some(path) => ScoutConfigLoader::new().with_file(path),
        // later sources win, so ./scout.yaml goes last
        None => ScoutConfigLoader::default_paths()
            .into_iter()
            .rev()
            .fold(ScoutConfigLoader::new(), |loader, path| {
                loader.with_optional_file(path)
            }),
    };
    loader.load().context("failed to load configuration")
}

async fn summary_request(args: SummarizeArgs) -> Result<SummaryRequest> {
    let length = LengthTier::parse_lenient(&args.length);
    if let Some(url) = args.url {
        return Ok(SummaryRequest::url(url, length));
    }
    let content = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => String::new(),
    };
    Ok(SummaryRequest::text(content, length))
}

async fn chat(scout: &mut Scout) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout
        .write_all(b"scout chat. /help for commands.\n> ")
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_command(&line) {
            Command::Quit => break,
            Command::Empty => String::new(),
            Command::Help => CHAT_HELP.to_string(),
            Command::Reset => {
                scout.reset();
                "Session cleared.".to_string()
            }
            Command::Sources => {
                let urls: Vec<&str> = scout.session().extracted_urls().collect();
                if urls.is_empty() {
                    "Nothing extracted yet.".to_string()
                } else {
                    urls.join("\n")
                }
            }
            Command::Unknown(text) => format!("Unknown command: {text}. Try /help."),
            Command::Ask(request) => match scout.ask(&request).await {
                Ok(turn) => turn.answer,
                Err(e) => {
                    tracing::warn!(error = %e, "app.chat.turn_failed");
                    format!("Error: {e:#}")
                }
            },
        };
        if !reply.is_empty() {
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }
    tracing::info!(session = %scout.session().id(), "app.chat.end");
    Ok(())
}
