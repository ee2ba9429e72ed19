//! ssai CLI - summarise a URL, PDF, or YouTube video
//!
//! The pipeline lives in lib.rs; this file parses arguments, resolves the
//! stored credential and reports top-level errors.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use ssai::agent::{self, OpenAiClient, SummaryRequest, DEFAULT_LANGUAGE};
use ssai::clipboard;
use ssai::config::API_KEY_NAME;
use ssai::{target, Config, Extractor, SourceKind};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ssai")]
#[command(author, version, about = "Summarise a URL, PDF, or YouTube video using ChatGPT", long_about = None)]
struct Cli {
    /// The URL, PDF, or YouTube video URL to be summarised
    target: Option<String>,

    /// Target language for the summary
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// Add context to the summary
    #[arg(long)]
    context: Option<String>,

    /// Set the OpenAI API key and store it (get one at https://platform.openai.com/api-keys)
    #[arg(long = "OPENAI_KEY", value_name = "KEY")]
    openai_key: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, env = "SSAI_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Model to use for this run
    #[arg(long)]
    model: Option<String>,

    /// Print the extracted text instead of summarising it
    #[arg(long)]
    raw: bool,

    /// Also print the summary to stdout
    #[arg(long)]
    print: bool,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<clap_complete::Shell>,

    /// Serve clipboard text read from stdin until another program takes ownership
    #[arg(long = clipboard::DAEMON_FLAG, hide = true)]
    clipboard_daemon: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "ssai=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.clipboard_daemon {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        clipboard::serve_clipboard(&text)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    // Storing a key ends the run, whatever else was passed; a blank key counts as not passed
    if let Some(key) = cli.openai_key.filter(|k| !k.trim().is_empty()) {
        Config::store_api_key(&config_path, &key)
            .with_context(|| format!("Failed to store {} in {}", API_KEY_NAME, config_path.display()))?;
        println!("{} has been set and stored.", API_KEY_NAME);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "ssai", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if config.api_key().is_err() {
        print_setup_instructions();
        return Ok(ExitCode::FAILURE);
    }
    if let Some(model) = cli.model {
        config.agent.model = model;
    }

    let Some(target) = cli.target else {
        println!("No TARGET specified. Use: ssai <TARGET to be summarised>");
        return Ok(ExitCode::FAILURE);
    };

    let source = target::classify(&target);
    println!("Extracting data from: {}", target);

    let extractor = Extractor::new(&config)?;
    let document = extractor
        .extract(&target, source)
        .await
        .with_context(|| match source {
            SourceKind::Pdf => format!("Failed to extract data from pdf: {}", target),
            _ => format!("Failed to extract data from: {}", target),
        })?;
    println!("Data extracted ({})", document.source);

    if cli.raw {
        println!("\n{}", document.text);
        println!("\n--- Extracted {} characters ---", document.text.len());
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(context) = &cli.context {
        println!("Context: {}", context);
    }
    println!(
        "Creating ChatGPT summary in {}. This may take a while...",
        cli.lang
    );

    let client = OpenAiClient::new(&config)?;
    let request = SummaryRequest::new(document, cli.lang, cli.context);
    let result = agent::summarize(&client, &request)
        .await
        .context("Failed to create ChatGPT summary")?;

    let rendered = result.render(&target);
    if cli.print {
        println!("\n{}\n", "--- Summary ---".bold());
        println!("{}", rendered);
    }

    clipboard::copy_to_clipboard(&rendered)?;
    println!("Summary copied to clipboard.");

    Ok(ExitCode::SUCCESS)
}

fn print_setup_instructions() {
    println!(
        "{} is not set. To use ssai, you need a valid OpenAI API key.",
        API_KEY_NAME
    );
    println!("1. Visit https://platform.openai.com/signup to create an OpenAI account.");
    println!("2. Once registered, create a key at https://platform.openai.com/api-keys.");
    println!("3. Set your key using: ssai --OPENAI_KEY=YOUR_OPENAI_KEY");
}
