// Configuration module

mod parser;
mod types;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use parser::{parse_config_file, parse_config_string};
pub use types::{RouteConfig, ServerConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: syntax error")]
    Syntax { line: usize },

    #[error("line {line}: unknown setting `{key}`")]
    UnknownKey { line: usize, key: String },

    #[error("line {line}: invalid value `{value}` for `{key}`")]
    InvalidValue { line: usize, key: String, value: String },

    #[error("route `{path}` opened on line {line} is never closed")]
    UnclosedRoute { path: String, line: usize },

    #[error("route `{0}` has no root")]
    MissingRoot(String),

    #[error("no `{0}` configured")]
    Missing(&'static str),
}
