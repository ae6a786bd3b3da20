//! mnemo: persistent memory for agents
//!
//! Usage:
//!   mnemo                 - Start interactive CLI mode
//!   mnemo --exec "<cmd>"  - Run one slash command and exit
//!   mnemo --tools         - Print tool definitions as JSON
//!   mnemo --help          - Show help

mod cli;

use mnemo_core::{Config, MemoryStore, ToolManager};
use mnemo_tools::register_default_tools;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq)]
enum RunMode {
    /// Interactive CLI mode
    Cli,
    /// Run a single command
    Exec(String),
    /// Print tool definitions
    Tools,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_args(&args);

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("mnemo {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    let store = MemoryStore::from_config(&config.memory)
        .map_err(|e| anyhow::anyhow!("Failed to open memory store: {}", e))?;
    tracing::info!(
        "Memory store at {} ({} entries)",
        store.path().display(),
        store.count()?
    );

    let mut tool_manager = ToolManager::new();
    register_default_tools(&mut tool_manager, &store, &config);
    tracing::debug!(
        "Registered {} tools: {:?}",
        tool_manager.len(),
        tool_manager.tool_names()
    );

    match mode {
        RunMode::Cli => cli::run_cli(&tool_manager).await,
        RunMode::Exec(line) => cli::run_execute(&tool_manager, &line).await,
        RunMode::Tools => {
            println!("{}", serde_json::to_string_pretty(&tool_manager.definitions())?);
            Ok(())
        }
        RunMode::Help | RunMode::Version => Ok(()),
    }
}

/// Parse command line arguments (program name already stripped)
fn parse_args(args: &[String]) -> RunMode {
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--cli" | "-c" => return RunMode::Cli,
            "--exec" | "-e" => {
                return match iter.next() {
                    Some(line) => RunMode::Exec(line.clone()),
                    None => RunMode::Help,
                };
            }
            "--tools" | "-t" => return RunMode::Tools,
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Cli
}

/// Print help message
fn print_help() {
    println!("mnemo - persistent memory for agents");
    println!();
    println!("Usage:");
    println!("  mnemo                  Start interactive CLI mode");
    println!("  mnemo --cli            Start interactive CLI mode");
    println!("  mnemo --exec \"<cmd>\"   Run one command, e.g. \"/recall name\"");
    println!("  mnemo --tools          Print tool definitions as JSON");
    println!("  mnemo --help           Show this help message");
    println!("  mnemo --version        Show version");
    println!();
    println!("Configuration is read from mnemo.toml, then overridden by:");
    println!("  MNEMO_DB_PATH              Database file (default: data/mnemo.db)");
    println!("  MNEMO_BUSY_TIMEOUT_MS      SQLite busy timeout (default: 5000)");
    println!("  MNEMO_PDF_MAX_CHARS        PDF text budget (default: 8000)");
    println!("  EXA_API_KEY                Exa search API key (optional)");
    println!("  MNEMO_SEARCH_TIMEOUT_SECS  Web search timeout (default: 10)");
    println!("  MNEMO_SEARCH_LIMIT         Default web result count (default: 5)");
    println!("  RUST_LOG                   Log filter (default: info)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults_to_cli() {
        assert_eq!(parse_args(&[]), RunMode::Cli);
        assert_eq!(parse_args(&args(&["--unknown"])), RunMode::Cli);
    }

    #[test]
    fn test_parse_args_modes() {
        assert_eq!(parse_args(&args(&["-c"])), RunMode::Cli);
        assert_eq!(parse_args(&args(&["--tools"])), RunMode::Tools);
        assert_eq!(parse_args(&args(&["-h"])), RunMode::Help);
        assert_eq!(parse_args(&args(&["--version"])), RunMode::Version);
    }

    #[test]
    fn test_parse_args_exec() {
        assert_eq!(
            parse_args(&args(&["--exec", "/recall name"])),
            RunMode::Exec("/recall name".to_string())
        );
        assert_eq!(parse_args(&args(&["-e"])), RunMode::Help);
    }
}
