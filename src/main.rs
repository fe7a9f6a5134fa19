use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "dirlist", about = "Serve sortable directory listings over HTTP")]
struct Opts {
    /// Path to the server configuration file
    #[arg(long, short, default_value = "server.conf")]
    config: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt = fmt().with_env_filter(filter).with_target(false);
    if std::env::var("DIRLIST_LOG_JSON").ok().as_deref() == Some("1") {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

#[cfg(unix)]
fn main() -> std::process::ExitCode {
    use dirlist::config::parse_config_file;
    use dirlist::network::Server;

    init_tracing();
    let opts = Opts::parse();

    let config = match parse_config_file(&opts.config) {
        Ok(config) => config,
        Err(e) => {
            error!(config = %opts.config.display(), error = %e, "failed to load config");
            return std::process::ExitCode::FAILURE;
        }
    };

    if let Err(e) = Server::new(config).run() {
        error!(error = %e, "server error");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

#[cfg(not(unix))]
fn main() {
    init_tracing();
    let _ = Opts::parse();
    error!("this server only works on Unix/Linux systems");
}
