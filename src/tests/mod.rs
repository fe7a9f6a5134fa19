mod test_config;
#[cfg(unix)]
mod test_server;
