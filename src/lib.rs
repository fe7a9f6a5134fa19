pub mod config;
pub mod handlers;
pub mod http;
pub mod listing;
#[cfg(unix)]
pub mod network;

#[cfg(test)]
mod tests;
