//! keysession demo server entry point.

use std::process::ExitCode;
use std::sync::Arc;

use keysession::api::{serve_with_state, AppState};
use keysession::cli::{parse_args, print_help, print_version};
use keysession::config::Config;
use keysession::{logging, MemoryEngine, SessionManager};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run with --help for usage.");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _ = logging::init_with_filter(config.log_filter());
    info!("keysession v{}", env!("CARGO_PKG_VERSION"));

    let (server_config, session_config) =
        match (config.to_server_config(), config.to_session_config()) {
            (Ok(server), Ok(session)) => (server, session),
            (Err(e), _) | (_, Err(e)) => {
                error!("invalid configuration: {}", e);
                return ExitCode::FAILURE;
            }
        };

    let manager = SessionManager::new(session_config, Arc::new(MemoryEngine::new()));
    if let Err(e) = serve_with_state(server_config, AppState::with_manager(manager)).await {
        error!("server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
