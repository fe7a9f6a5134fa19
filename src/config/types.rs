use std::path::PathBuf;

use crate::listing::ListingOptions;

/// This holds the server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addresses: Vec<String>,
    pub client_body_size_limit: usize,
    pub routes: Vec<RouteConfig>,
    /// Directory holding `<status>.html` error pages
    pub error_path: String,
}

/// Configuration for ONE route
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// The URL path (e.g., "/files", "/")
    pub path: String,

    /// Allowed HTTP methods (e.g., ["GET", "HEAD"])
    pub methods: Vec<String>,

    /// Where to serve files from (e.g., "www")
    pub root: PathBuf,

    /// Render a directory listing at the route path
    pub autoindex: bool,

    /// Names left out of the listing of `root` itself
    pub exclude: Vec<String>,

    pub show_hidden: bool,

    /// Listing heading; defaults to the last component of `root`
    pub title: Option<String>,

    /// File served at the route path when autoindex is off
    pub default_file: Option<String>,
}

impl RouteConfig {
    pub fn listing_options(&self) -> ListingOptions {
        ListingOptions {
            exclude: self.exclude.clone(),
            show_hidden: self.show_hidden,
        }
    }

    pub fn title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => self
                .root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    pub fn allows(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}
