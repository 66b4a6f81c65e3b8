pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod documents;
pub mod guard;
pub mod models;
pub mod screens;
pub mod session;

#[cfg(test)]
mod testing;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

pub fn run() -> ExitCode {
    // Logs go to stderr so screen output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(cli::run_from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            if e.is_stale_session() {
                eprintln!("La sesión expiró. Ejecute `recetas-admin login` de nuevo.");
            }
            tracing::debug!(error = ?e, "Command failed");
            ExitCode::FAILURE
        }
    }
}
