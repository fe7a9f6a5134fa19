use std::fs;
use std::path::{Path, PathBuf};

use super::ConfigError;
use super::types::{RouteConfig, ServerConfig};

const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

pub fn parse_config_file(path: impl AsRef<Path>) -> Result<ServerConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_string(&content)
}

pub fn parse_config_string(content: &str) -> Result<ServerConfig, ConfigError> {
    let mut listen_addresses = Vec::new();
    let mut client_body_size_limit = DEFAULT_BODY_LIMIT;
    let mut error_path = String::new();
    let mut routes = Vec::new();

    // Where are we in the file?
    let mut context = ParsingContext::TopLevel;
    let mut current = RouteBuilder::default();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match context {
            ParsingContext::TopLevel => {
                if let Some(rest) = line.strip_prefix("route ") {
                    // "route /files {" → "/files"
                    let path = rest
                        .strip_suffix('{')
                        .map(str::trim)
                        .filter(|p| !p.is_empty() && !p.contains(char::is_whitespace))
                        .ok_or(ConfigError::Syntax { line: line_no })?;
                    current = RouteBuilder::new(path, line_no);
                    context = ParsingContext::InsideRoute;
                    continue;
                }

                if line == "}" {
                    return Err(ConfigError::Syntax { line: line_no });
                }

                let (key, value) = split_setting(line, line_no)?;
                match key {
                    "listen" => {
                        listen_addresses = split_list(value);
                    }
                    "client_body_size_limit" => {
                        client_body_size_limit = value.parse().map_err(|_| ConfigError::InvalidValue {
                            line: line_no,
                            key: key.to_string(),
                            value: value.to_string(),
                        })?;
                    }
                    "error_path" => {
                        error_path = value.to_string();
                    }
                    _ => {
                        return Err(ConfigError::UnknownKey {
                            line: line_no,
                            key: key.to_string(),
                        });
                    }
                }
            }

            ParsingContext::InsideRoute => {
                if line == "}" {
                    routes.push(std::mem::take(&mut current).build()?);
                    context = ParsingContext::TopLevel;
                    continue;
                }

                let (key, value) = split_setting(line, line_no)?;
                match key {
                    "methods" => current.methods = split_list(value),
                    "root" => current.root = Some(PathBuf::from(value)),
                    "autoindex" => current.autoindex = parse_bool(key, value, line_no)?,
                    "exclude" => current.exclude = split_list(value),
                    "show_hidden" => current.show_hidden = parse_bool(key, value, line_no)?,
                    "title" => current.title = Some(value.to_string()),
                    "default_file" => current.default_file = Some(value.to_string()),
                    _ => {
                        return Err(ConfigError::UnknownKey {
                            line: line_no,
                            key: key.to_string(),
                        });
                    }
                }
            }
        }
    }

    if let ParsingContext::InsideRoute = context {
        return Err(ConfigError::UnclosedRoute {
            path: current.path,
            line: current.line,
        });
    }

    if listen_addresses.is_empty() {
        return Err(ConfigError::Missing("listen"));
    }

    if routes.is_empty() {
        return Err(ConfigError::Missing("route"));
    }

    Ok(ServerConfig {
        listen_addresses,
        client_body_size_limit,
        routes,
        error_path,
    })
}

// The context tracker
enum ParsingContext {
    TopLevel,
    InsideRoute,
}

// Temporary storage while building a route
#[derive(Default)]
struct RouteBuilder {
    path: String,
    line: usize,
    methods: Vec<String>,
    root: Option<PathBuf>,
    autoindex: bool,
    exclude: Vec<String>,
    show_hidden: bool,
    title: Option<String>,
    default_file: Option<String>,
}

impl RouteBuilder {
    fn new(path: &str, line: usize) -> Self {
        Self {
            path: path.to_string(),
            line,
            ..Default::default()
        }
    }

    fn build(self) -> Result<RouteConfig, ConfigError> {
        let root = self.root.ok_or_else(|| ConfigError::MissingRoot(self.path.clone()))?;
        let methods = if self.methods.is_empty() {
            vec!["GET".to_string()]
        } else {
            self.methods
        };

        Ok(RouteConfig {
            path: self.path,
            methods,
            root,
            autoindex: self.autoindex,
            exclude: self.exclude,
            show_hidden: self.show_hidden,
            title: self.title,
            default_file: self.default_file,
        })
    }
}

fn split_setting(line: &str, line_no: usize) -> Result<(&str, &str), ConfigError> {
    line.split_once('=')
        .map(|(key, value)| (key.trim(), value.trim()))
        .ok_or(ConfigError::Syntax { line: line_no })
}

// "GET, HEAD" → ["GET", "HEAD"]
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, value: &str, line_no: usize) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            line: line_no,
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
