//! parley binary: interactive chat with optional web search.

use std::path::PathBuf;

use clap::Parser;
use cli::{display, logging, Repl, DEFAULT_THREAD_ID};
use parley::{build_chat_runner, generate_text, render_graph_image, ChatConfig};
use tokio::io::BufReader;

#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "parley: chat with an LLM that can search the web")]
struct Args {
    /// Session thread; history is kept per thread for the life of the process
    #[arg(long, value_name = "ID", default_value = DEFAULT_THREAD_ID)]
    thread_id: String,

    /// Maximum tool rounds per turn (overrides PARLEY_MAX_TOOL_ROUNDS)
    #[arg(long, value_name = "N")]
    max_tool_rounds: Option<usize>,

    /// Write the agent graph to this file (.dot as source, anything else as PNG via graphviz)
    #[arg(long, value_name = "PATH")]
    graph: Option<PathBuf>,

    /// Verbose: info-level logs and token usage after each model call
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", env = "PARLEY_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loaded = config::load_and_apply("parley", None::<&std::path::Path>);
    let args = Args::parse();
    let log_guard = logging::init(args.verbose, args.log_file.as_deref())?;

    match loaded {
        Ok(keys) => tracing::debug!(count = keys.len(), "applied config env"),
        Err(e) => tracing::warn!(error = %e, "config not loaded"),
    }

    let mut chat_config = match ChatConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(n) = args.max_tool_rounds {
        chat_config.max_tool_rounds = n;
    }
    tracing::info!(config = ?chat_config, "starting");

    let runner = build_chat_runner(&chat_config).await?;

    if let Some(path) = &args.graph {
        match render_graph_image(&runner.topology(), path) {
            Ok(p) => println!("Graph visualization saved as {}", p.display()),
            Err(e) => {
                println!("Could not generate graph visualization: {}", e);
                println!("{}", generate_text(&runner.topology()));
            }
        }
    }

    println!("{}", display::banner(&args.thread_id, runner.has_tools()));

    let repl = Repl::new(runner, args.thread_id).with_verbose(args.verbose);
    let mut stdout = std::io::stdout();
    let result = repl
        .run(
            BufReader::new(tokio::io::stdin()),
            &mut stdout,
            async {
                let _ = tokio::signal::ctrl_c().await;
            },
        )
        .await;

    // A pending read on tokio's stdin cannot be cancelled and would hold runtime shutdown
    // until the next line arrives, so leave the process directly.
    drop(log_guard);
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
