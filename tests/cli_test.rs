//! Command line parsing tests
//!
//! Tests that the global listener flags work on either side of the
//! exporter subcommand.

use clap::Parser;
use horizon_exporter::cli::{Args, Exporter};

#[test]
fn test_port_after_subcommand_is_accepted() {
    // Given: The port flag placed after the `uag` subcommand
    let argv = ["horizon-exporter", "uag", "--port", "19555"];

    // When: Parsing
    let args = Args::try_parse_from(argv).expect("flag after subcommand should parse");

    // Then: The port is picked up and the UAG exporter selected
    assert_eq!(args.port, Some(19555));
    assert!(matches!(args.exporter, Exporter::Uag { .. }));
}

#[test]
fn test_port_before_subcommand_is_accepted() {
    let args = Args::try_parse_from(["horizon-exporter", "--port", "18001", "connection-server"])
        .unwrap();

    assert_eq!(args.port, Some(18001));
    assert!(matches!(args.exporter, Exporter::ConnectionServer { .. }));
}

#[test]
fn test_config_and_addr_after_subcommand() {
    // Given: Config path and bind address after the subcommand
    let argv = [
        "horizon-exporter",
        "connection-server",
        "--config",
        "config/Other.toml",
        "--addr",
        "127.0.0.1",
        "--url",
        "https://horizon.example.com",
    ];

    // When: Parsing
    let args = Args::try_parse_from(argv).unwrap();

    // Then: Global and subcommand values are both kept
    assert_eq!(args.config, "config/Other.toml");
    assert_eq!(args.addr.as_deref(), Some("127.0.0.1"));
    match args.exporter {
        Exporter::ConnectionServer { url, .. } => {
            assert_eq!(url.as_deref(), Some("https://horizon.example.com"));
        }
        other => panic!("expected connection-server, got {:?}", other),
    }
}

#[test]
fn test_missing_subcommand_is_rejected() {
    let result = Args::try_parse_from(["horizon-exporter", "--port", "19000"]);

    assert!(result.is_err());
}
