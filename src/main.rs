use clap::Parser;
use std::sync::Arc;

mod api;
mod config;
mod logger;
mod server;

/// Tiny HTTP status API that answers every request with a JSON document
#[derive(Parser, Debug)]
#[command(name = "status-api")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path, extension optional (missing file uses defaults)
    #[arg(short, long, default_value = "config")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let cfg = config::Config::load_from(&cli.config)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("Using {workers} worker threads"));
    } else {
        logger::log_info("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    server::start_signal_handler(Arc::clone(&state.shutdown));

    logger::log_server_start(&addr, &cfg);

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["status-api"]).unwrap();
        assert_eq!(cli.config, "config");
    }

    #[test]
    fn test_config_flag_forms() {
        for argv in [
            vec!["status-api", "-c", "/etc/status-api/prod"],
            vec!["status-api", "--config", "/etc/status-api/prod"],
            vec!["status-api", "--config=/etc/status-api/prod"],
        ] {
            let cli = Cli::try_parse_from(argv).unwrap();
            assert_eq!(cli.config, "/etc/status-api/prod");
        }
    }

    #[test]
    fn test_help_and_version() {
        let err = Cli::try_parse_from(["status-api", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["status-api", "-V"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_bad_arguments() {
        assert!(Cli::try_parse_from(["status-api", "-c"]).is_err());
        assert!(Cli::try_parse_from(["status-api", "--verbose"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
