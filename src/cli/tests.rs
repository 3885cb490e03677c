use super::*;
use crate::error::Error;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn fixture_file() -> NamedTempFile {
    let items: Vec<_> = (0..9)
        .map(|id| {
            let status = if id % 2 == 0 { "open" } else { "closed" };
            json!({"pk": "user#1", "id": id, "status": status})
        })
        .collect();
    let fixture = json!({
        "tables": {
            "events": {"key_schema": ["pk", "id"], "items": items}
        }
    });

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{fixture}").unwrap();
    file
}

async fn execute(fixture: &NamedTempFile, args: &[&str]) -> crate::Result<serde_json::Value> {
    let path = fixture.path().to_str().unwrap();
    let mut argv = vec!["docstore-pager", "--fixture", path, "--page-size", "3"];
    argv.extend_from_slice(args);
    Runner::new(Cli::try_parse_from(argv).unwrap()).execute().await
}

fn ids(value: &serde_json::Value) -> Vec<i64> {
    value["Items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect()
}

#[test]
fn test_parse_range_command() {
    let cli = Cli::try_parse_from([
        "docstore-pager",
        "range",
        "query",
        "--min",
        "2",
        "--max",
        "4",
        "--table",
        "events",
        "--key-condition",
        "pk = :pk",
        "--values",
        r#"{":pk": "user#1"}"#,
        "--format",
        "pretty",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Pretty);
    match cli.command {
        Commands::Range {
            operation,
            min,
            max,
            request,
        } => {
            assert_eq!(operation, "query");
            assert_eq!((min, max), (Some(2), Some(4)));
            let request = request.to_request().unwrap();
            assert_eq!(request.table_name, "events");
            assert_eq!(request.key_condition_expression.as_deref(), Some("pk = :pk"));
            assert_eq!(request.expression_attribute_values[":pk"], json!("user#1"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_request_args_reject_bad_json() {
    let args = RequestArgs {
        table: "events".to_string(),
        names: Some("[1, 2]".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        args.to_request().unwrap_err(),
        Error::InvalidRequest { .. }
    ));
}

#[test]
fn test_fixture_and_endpoint_conflict() {
    let result = Cli::try_parse_from([
        "docstore-pager",
        "--fixture",
        "f.json",
        "--endpoint",
        "http://localhost:8000",
        "count",
        "scan",
        "--table",
        "events",
    ]);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_range_over_fixture() {
    let fixture = fixture_file();
    let args = ["range", "scan", "--min", "2", "--max", "5", "--table", "events"];
    let output = execute(&fixture, &args).await.unwrap();

    assert_eq!(ids(&output), vec![2, 3, 4]);
    assert_eq!(output["Count"], json!(3));
    assert_eq!(output["PagesFetched"], json!(2));
}

#[tokio::test]
async fn test_range_rejects_missing_bound() {
    let fixture = fixture_file();
    let err = execute(&fixture, &["range", "scan", "--min", "2", "--table", "events"])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }));
}

#[tokio::test]
async fn test_range_rejects_unknown_operation() {
    let fixture = fixture_file();
    let err = execute(
        &fixture,
        &["range", "update", "--min", "0", "--max", "1", "--table", "events"],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidOperation { .. }));
}

#[tokio::test]
async fn test_all_with_filter() {
    let fixture = fixture_file();
    let output = execute(
        &fixture,
        &[
            "all",
            "query",
            "--table",
            "events",
            "--key-condition",
            "pk = :pk",
            "--filter",
            "#s = :s",
            "--values",
            r#"{":pk": "user#1", ":s": "closed"}"#,
            "--names",
            r##"{"#s": "status"}"##,
        ],
    )
    .await
    .unwrap();

    assert_eq!(ids(&output), vec![1, 3, 5, 7]);
    assert_eq!(output["Count"], json!(4));
}

#[tokio::test]
async fn test_count_over_fixture() {
    let fixture = fixture_file();
    let output = execute(&fixture, &["count", "scan", "--table", "events"])
        .await
        .unwrap();
    assert_eq!(output, json!({"Count": 9}));
}

#[tokio::test]
async fn test_get_over_fixture() {
    let fixture = fixture_file();
    let output = execute(
        &fixture,
        &["get", "--table", "events", "--key", r#"{"pk": "user#1", "id": 4}"#],
    )
    .await
    .unwrap();
    assert_eq!(output["Item"]["status"], json!("open"));

    let output = execute(
        &fixture,
        &["get", "--table", "events", "--key", r#"{"pk": "user#1", "id": 40}"#],
    )
    .await
    .unwrap();
    assert_eq!(output, json!({"Item": null}));
}

#[tokio::test]
async fn test_update_over_fixture() {
    let fixture = fixture_file();
    let output = execute(
        &fixture,
        &[
            "update",
            "--table",
            "events",
            "--key",
            r#"{"pk": "user#1", "id": 3}"#,
            "--expression",
            "SET #s = :s",
            "--values",
            r#"{":s": "archived"}"#,
            "--names",
            r##"{"#s": "status"}"##,
        ],
    )
    .await
    .unwrap();

    assert_eq!(
        output,
        json!({"Attributes": {"pk": "user#1", "id": 3, "status": "archived"}})
    );
}

#[tokio::test]
async fn test_update_rejects_bad_placeholders() {
    let fixture = fixture_file();
    let err = execute(
        &fixture,
        &[
            "update",
            "--table",
            "events",
            "--key",
            r#"{"pk": "user#1", "id": 3}"#,
            "--expression",
            "SET #s = :s",
            "--values",
            "not json",
        ],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_missing_fixture_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let cli = Cli::try_parse_from([
        "docstore-pager",
        "--fixture",
        path.to_str().unwrap(),
        "count",
        "scan",
        "--table",
        "events",
    ])
    .unwrap();

    let err = Runner::new(cli).execute().await.unwrap_err();
    let Error::Other(ref message) = err else {
        panic!("unexpected error: {err}");
    };
    assert!(message.starts_with("Failed to read fixture"));
    assert!(message.contains("absent.json"));
}

#[test]
fn test_invalid_fixture_json_gets_context() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{\"tables\": [").unwrap();
    let err = Fixture::load(file.path()).unwrap_err();
    assert!(err.to_string().starts_with("Invalid fixture JSON in"));
}

#[tokio::test]
async fn test_no_store_configured() {
    let cli =
        Cli::try_parse_from(["docstore-pager", "count", "scan", "--table", "events"]).unwrap();
    let err = Runner::new(cli).execute().await.unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_log_level() {
    let cli =
        Cli::try_parse_from(["docstore-pager", "-v", "count", "scan", "--table", "t"]).unwrap();
    assert_eq!(Runner::new(cli).log_level(), tracing::Level::DEBUG);

    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "log_level: WARN").unwrap();
    let path = config.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["docstore-pager", "-C", path, "count", "scan", "--table", "t"])
        .unwrap();
    assert_eq!(Runner::new(cli).log_level(), tracing::Level::WARN);
}

#[test]
fn test_fixture_into_store_page_size() {
    let fixture: Fixture = serde_json::from_value(json!({
        "tables": {"t": {"key_schema": ["id"], "items": [{"id": 1}]}}
    }))
    .unwrap();
    assert_eq!(fixture.into_store(5).page_size(), 5);
}
