mod directory;
mod static_files;

pub use directory::{ListingPage, list_directory, render_listing};
pub use static_files::{content_type, serve_file, serve_static};
