use colored::*;
use stackit::auth::EnvAuthenticator;
use stackit::cli::params::CmdParams;
use stackit::cli::parser::VERSION_INFO;
use stackit::config::Config;
use stackit::print::Printer;
use stackit::services::HttpClientFactory;
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "STACKIT_LOG";

#[tokio::main]
async fn main() {
    // Printer debug events are gated by --verbosity, so let them through
    // unless the user configured the filter explicitly.
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();
    if std::env::var_os(LOG_ENV_VAR).is_none() {
        if let Ok(directive) = "stackit=debug".parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let config_path = match Config::default_path() {
        Ok(path) => path,
        Err(e) => fail(&e.to_string()),
    };
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => fail(&e.to_string()),
    };

    let params = CmdParams {
        printer: Arc::new(Printer::stdio()),
        cli_version: VERSION_INFO.to_string(),
        authenticator: Arc::new(EnvAuthenticator::new()),
        clients: Arc::new(HttpClientFactory),
        config,
        config_path,
        cancel,
    };

    let code = stackit::cli::execute(std::env::args_os(), &params).await;
    process::exit(code);
}

fn fail(message: &str) -> ! {
    eprintln!("{}: {}", "Error".red().bold(), message);
    process::exit(1);
}
