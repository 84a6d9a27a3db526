use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;

use rollcall::app::App;
use rollcall::config::Config;
use rollcall::logging;

#[derive(Debug, Default)]
struct Args {
    config_path: Option<PathBuf>,
    api_url: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("rollcall {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--api-url" => {
                if i + 1 < args.len() {
                    parsed.api_url = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("Error: --api-url requires a URL argument");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"rollcall - classroom attendance from a single photo

USAGE:
    rollcall [OPTIONS]

OPTIONS:
    --config, -c PATH   Path to config file
    --api-url URL       Backend address (overrides [api] base_url)
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    ROLLCALL_CONFIG     Path to config file (overrides default location)
    ROLLCALL_LOG        Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/rollcall/config.toml

See also: rollcall-cli --help"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    // Initialize logging (uses journald on Linux, file fallback otherwise)
    let _ = logging::init(Some(logging::default_log_dir()));

    let mut config = match args.config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }
    tracing::info!(base_url = %config.api.base_url, "starting rollcall");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
