use std::path::PathBuf;

use crate::config::*;

#[test]
fn test_parse_simple_config() {
    let config_str = r#"
        listen = 127.0.0.1:8080
        client_body_size_limit = 5000000

        route / {
            methods = GET,HEAD
            root = www
            autoindex = on
        }
    "#;

    let config = parse_config_string(config_str).unwrap();

    assert_eq!(config.listen_addresses, vec!["127.0.0.1:8080"]);
    assert_eq!(config.client_body_size_limit, 5000000);
    assert_eq!(config.routes.len(), 1);
    assert_eq!(config.routes[0].path, "/");
    assert_eq!(config.routes[0].methods, vec!["GET", "HEAD"]);
    assert_eq!(config.routes[0].root, PathBuf::from("www"));
    assert!(config.routes[0].autoindex);
}

#[test]
fn test_parse_listing_options() {
    let config_str = r#"
        # two ports, one listing route and one plain route
        listen = 127.0.0.1:8080, 127.0.0.1:8081
        error_path = errors

        route /files {
            root = /srv/files
            autoindex = on
            exclude = index.html, server.conf
            show_hidden = yes
            title = Downloads
        }

        route / {
            root = www
            default_file = index.html
        }
    "#;

    let config = parse_config_string(config_str).unwrap();

    assert_eq!(config.listen_addresses.len(), 2);
    assert_eq!(config.error_path, "errors");

    let files = &config.routes[0];
    assert_eq!(files.methods, vec!["GET"]);
    assert_eq!(files.exclude, vec!["index.html", "server.conf"]);
    assert!(files.show_hidden);
    assert_eq!(files.title(), "Downloads");
    assert_eq!(files.listing_options().exclude.len(), 2);

    let site = &config.routes[1];
    assert!(!site.autoindex);
    assert_eq!(site.default_file.as_deref(), Some("index.html"));
    assert_eq!(site.title(), "www");
}

#[test]
fn test_unknown_key() {
    let config_str = "listen = 127.0.0.1:8080\nworkers = 4\n";
    assert!(matches!(
        parse_config_string(config_str),
        Err(ConfigError::UnknownKey { line: 2, .. })
    ));
}

#[test]
fn test_invalid_config() {
    let config_str = "invalid syntax here";
    assert!(matches!(
        parse_config_string(config_str),
        Err(ConfigError::Syntax { line: 1 })
    ));
}

#[test]
fn test_unclosed_route() {
    let config_str = "listen = 127.0.0.1:8080\nroute / {\n  root = www\n";
    assert!(matches!(
        parse_config_string(config_str),
        Err(ConfigError::UnclosedRoute { line: 2, .. })
    ));
}

#[test]
fn test_route_requires_root() {
    let config_str = "listen = 127.0.0.1:8080\nroute / {\n  autoindex = on\n}\n";
    assert!(matches!(
        parse_config_string(config_str),
        Err(ConfigError::MissingRoot(_))
    ));
}

#[test]
fn test_bad_boolean() {
    let config_str = "listen = 127.0.0.1:8080\nroute / {\n  root = www\n  autoindex = maybe\n}\n";
    assert!(matches!(
        parse_config_string(config_str),
        Err(ConfigError::InvalidValue { line: 4, .. })
    ));
}

#[test]
fn test_missing_listen_and_routes() {
    assert!(matches!(
        parse_config_string("route / {\n root = www\n}\n"),
        Err(ConfigError::Missing("listen"))
    ));
    assert!(matches!(
        parse_config_string("listen = 127.0.0.1:8080\n"),
        Err(ConfigError::Missing("route"))
    ));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        parse_config_file("/definitely/not/here.conf"),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_shipped_sample_config() {
    let config = parse_config_string(include_str!("../../server.conf")).unwrap();
    assert_eq!(config.listen_addresses, vec!["127.0.0.1:8080".to_string()]);

    let route = &config.routes[0];
    assert_eq!(route.path, "/");
    assert_eq!(route.root, PathBuf::from("www"));
    assert!(route.autoindex);
    assert_eq!(route.exclude, vec!["index.html".to_string()]);
    assert!(!route.show_hidden);
}
