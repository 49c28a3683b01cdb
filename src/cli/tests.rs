//! Tests for CLI parsing and command execution

use super::*;
use crate::error::{Error, ErrorKind};
use crate::pagination::FilterDimension;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("account-api").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_parse_list_defaults() {
    let cli = parse(&["list", "--url", "http://localhost/v1/account"]);

    assert_eq!(cli.url.as_deref(), Some("http://localhost/v1/account"));
    assert_eq!(cli.format, OutputFormat::Json);
    match cli.command {
        Commands::List {
            page,
            page_size,
            filter,
            all,
        } => {
            assert_eq!(page, 0);
            assert_eq!(page_size, 100);
            assert!(filter.to_filter().is_empty());
            assert!(!all);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_list_filters() {
    let cli = parse(&[
        "list",
        "--page",
        "3",
        "--page-size",
        "-1",
        "--country",
        "GB,FR",
        "--iban",
        "GB33BUKB20201555555555",
        "--all",
    ]);

    let Commands::List {
        page,
        page_size,
        filter,
        all,
    } = cli.command
    else {
        panic!("expected list");
    };
    assert_eq!(page, 3);
    assert_eq!(page_size, -1);
    assert!(all);

    let filter = filter.to_filter();
    assert_eq!(filter.values(FilterDimension::Country), ["GB", "FR"]);
    assert_eq!(
        filter.values(FilterDimension::Iban),
        ["GB33BUKB20201555555555"]
    );
    assert!(filter.values(FilterDimension::BankId).is_empty());
}

#[test]
fn test_parse_create() {
    let cli = parse(&[
        "create",
        "--organisation-id",
        "org-1",
        "--country",
        "GB",
        "--name",
        "Jane",
        "--name",
        "Doe",
        "--bank-id",
        "400300",
    ]);

    let Commands::Create(args) = cli.command else {
        panic!("expected create");
    };
    assert!(args.id.is_none());
    let attributes = args.to_attributes();
    assert_eq!(attributes.country, "GB");
    assert_eq!(attributes.name, vec!["Jane".to_string(), "Doe".to_string()]);
    assert_eq!(attributes.bank_id.as_deref(), Some("400300"));
}

#[test]
fn test_parse_create_requires_name() {
    let result = Cli::try_parse_from([
        "account-api",
        "create",
        "--organisation-id",
        "org-1",
        "--country",
        "GB",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_parse_delete_and_serve() {
    let cli = parse(&["delete", "acc-1", "--version", "2", "-v"]);
    assert!(cli.verbose);
    assert!(matches!(
        cli.command,
        Commands::Delete { ref id, version: 2 } if id == "acc-1"
    ));

    let cli = parse(&["serve", "--port", "9000", "--database", "/tmp/a.duckdb"]);
    assert!(matches!(
        cli.command,
        Commands::Serve { port: 9000, ref database } if database == "/tmp/a.duckdb"
    ));
}

#[tokio::test]
async fn test_runner_requires_url() {
    let mut cli = parse(&["fetch", "acc-1"]);
    cli.url = None;

    let err = Runner::new(cli).run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_runner_list_all_reports_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .and(query_param("page[number]", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "type": "accounts",
                "id": "acc-1",
                "organisation_id": "org-1",
                "version": 0,
                "attributes": { "country": "GB", "name": ["Jane"] }
            }]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .and(query_param("page[number]", "1"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let url = format!("{}/v1/account", mock_server.uri());
    let cli = parse(&["list", "--all", "--page-size", "1", "--url", &url]);

    let err = Runner::new(cli).run().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
}

#[tokio::test]
async fn test_runner_list_pages_ends_cleanly() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/v1/account", mock_server.uri());
    let cli = parse(&["list", "--url", &url]);

    Runner::new(cli).run().await.unwrap();
}

#[tokio::test]
async fn test_runner_delete_wrong_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/account/acc-1"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&mock_server)
        .await;

    let url = format!("{}/v1/account", mock_server.uri());
    let cli = parse(&["delete", "acc-1", "--version", "4", "--url", &url]);

    let err = Runner::new(cli).run().await.unwrap_err();
    assert_eq!(
        err,
        Error::WrongVersion {
            id: "acc-1".to_string(),
            version: 4
        }
    );
}
