//! Integration tests for `trellis collect` command.
//!
//! Runs the collection flow against the reactor manifests used by the
//! collector crate's tests.

use std::path::PathBuf;

use serial_test::serial;
use tempfile::TempDir;
use trellis_cli::cli::{CollectArgs, OutputFormat};
use trellis_cli::commands::collect::{collect_inventory, execute};
use trellis_cli::error::CliError;
use trellis_cli::output::OutputWriter;
use trellis_collector::report::UPDATE_REQUEST_FILE;
use trellis_collector::{AggregationStrategy, CollectorError, UpdateRequest};
use trellis_core::config::TrellisConfig;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../crates/collector/tests/fixtures")
        .join(name)
}

fn collect_args(manifest: PathBuf, output_dir: &TempDir) -> CollectArgs {
    CollectArgs {
        manifest,
        output_dir: Some(output_dir.path().to_path_buf()),
        aggregate: false,
        preserve_module_info: false,
        tolerate_resolution_errors: false,
        dry_run: false,
    }
}

fn config_with_token() -> TrellisConfig {
    let mut config = TrellisConfig::default();
    config.service.org_token = Some("org-token".to_owned());
    config
}

#[tokio::test]
async fn test_collect_writes_update_request() {
    let out = TempDir::new().expect("should create temp dir");
    let mut config = config_with_token();
    config.service.product_version = Some("2.5".to_owned());
    config.service.force_update = true;

    let report = collect_inventory(&collect_args(fixture_path("aggregate.json"), &out), &config)
        .await
        .expect("collection should succeed");

    assert!(!report.skipped);
    assert_eq!(report.product.as_deref(), Some("module-a"));
    let summary = report.summary.expect("summary present");
    assert_eq!(summary.strategy, AggregationStrategy::None);
    assert_eq!(summary.projects.len(), 2);

    let request_path = out.path().join(UPDATE_REQUEST_FILE);
    assert_eq!(
        report.request_path.as_deref(),
        Some(request_path.display().to_string().as_str())
    );

    let content = std::fs::read_to_string(&request_path).expect("request file written");
    let request: UpdateRequest = serde_json::from_str(&content).expect("valid request JSON");
    assert_eq!(request.org_token, "org-token");
    assert_eq!(request.product, "module-a");
    assert_eq!(request.product_version.as_deref(), Some("2.5"));
    assert!(request.force_update);
    assert_eq!(request.inventory.projects.len(), 2);
}

#[tokio::test]
async fn test_collect_aggregate_flag_selects_flat_strategy() {
    let out = TempDir::new().expect("should create temp dir");
    let args = CollectArgs {
        aggregate: true,
        ..collect_args(fixture_path("aggregate.json"), &out)
    };

    let report = collect_inventory(&args, &config_with_token())
        .await
        .expect("collection should succeed");

    let summary = report.summary.expect("summary present");
    assert_eq!(summary.strategy, AggregationStrategy::Flat);
    assert_eq!(summary.projects.len(), 1);
    assert_eq!(summary.projects[0].coordinates, "com.acme:module-a-2.5:2.5");
    assert_eq!(summary.total_dependencies(), 3);
}

#[tokio::test]
async fn test_collect_flag_conflicting_with_file_strategy() {
    let out = TempDir::new().expect("should create temp dir");
    let mut config = config_with_token();
    config.collector.preserve_module_info = true;
    let args = CollectArgs {
        aggregate: true,
        ..collect_args(fixture_path("aggregate.json"), &out)
    };

    let err = collect_inventory(&args, &config)
        .await
        .expect_err("strategy conflicts are reported, not resolved");

    assert!(matches!(
        err,
        CliError::Collect(CollectorError::ConfigurationConflict { .. })
    ));
    assert_eq!(err.exit_code(), 2);
    assert!(!out.path().join(UPDATE_REQUEST_FILE).exists());
}

#[tokio::test]
async fn test_collect_dry_run_needs_no_token() {
    let out = TempDir::new().expect("should create temp dir");
    let args = CollectArgs {
        dry_run: true,
        ..collect_args(fixture_path("scopes.json"), &out)
    };

    let report = collect_inventory(&args, &TrellisConfig::default())
        .await
        .expect("dry run should succeed without a token");

    assert!(report.dry_run);
    assert!(report.request_path.is_none());
    assert!(!out.path().join(UPDATE_REQUEST_FILE).exists());
    assert_eq!(report.summary.expect("summary present").total_dependencies(), 1);
}

#[tokio::test]
async fn test_collect_missing_token_is_config_error() {
    let out = TempDir::new().expect("should create temp dir");

    let err = collect_inventory(
        &collect_args(fixture_path("scopes.json"), &out),
        &TrellisConfig::default(),
    )
    .await
    .expect_err("a token is required to write the request");

    assert!(matches!(err, CliError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_collect_token_file_wins() {
    let out = TempDir::new().expect("should create temp dir");
    let token_file = out.path().join("org-token.txt");
    std::fs::write(&token_file, "file-token\nignored second line\n").expect("write token");

    let mut config = config_with_token();
    config.service.org_token_file = Some(token_file.display().to_string());
    config.service.product = Some("shop".to_owned());

    collect_inventory(&collect_args(fixture_path("scopes.json"), &out), &config)
        .await
        .expect("collection should succeed");

    let content =
        std::fs::read_to_string(out.path().join(UPDATE_REQUEST_FILE)).expect("request written");
    let request: UpdateRequest = serde_json::from_str(&content).expect("valid request JSON");
    assert_eq!(request.org_token, "file-token");
    assert_eq!(request.product, "shop");
}

#[tokio::test]
async fn test_collect_skip_does_nothing() {
    let out = TempDir::new().expect("should create temp dir");
    let mut config = TrellisConfig::default();
    config.service.skip = true;

    let report = collect_inventory(
        &collect_args(PathBuf::from("/nonexistent/reactor.json"), &out),
        &config,
    )
    .await
    .expect("skip short-circuits before reading the manifest");

    assert!(report.skipped);
    assert!(report.summary.is_none());
}

#[tokio::test]
async fn test_collect_tolerates_resolution_errors_when_flagged() {
    let out = TempDir::new().expect("should create temp dir");
    let manifest = out.path().join("reactor.json");
    std::fs::write(
        &manifest,
        r#"{
          "modules": [
            { "groupId": "com.acme", "artifactId": "app", "version": "1.0" },
            { "groupId": "com.acme", "artifactId": "broken", "version": "1.0",
              "resolutionError": "could not resolve org.gone:gone:1.0" }
          ]
        }"#,
    )
    .expect("write manifest");

    let strict = collect_inventory(&collect_args(manifest.clone(), &out), &config_with_token())
        .await
        .expect_err("resolution failure aborts by default");
    assert!(matches!(
        strict,
        CliError::Collect(CollectorError::GraphResolution { .. })
    ));
    assert_eq!(strict.exit_code(), 3);

    let args = CollectArgs {
        tolerate_resolution_errors: true,
        ..collect_args(manifest, &out)
    };
    let report = collect_inventory(&args, &config_with_token())
        .await
        .expect("tolerated failure still produces an inventory");
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("broken"));
}

#[tokio::test]
async fn test_collect_missing_manifest_is_collect_error() {
    let out = TempDir::new().expect("should create temp dir");

    let err = collect_inventory(
        &collect_args(out.path().join("missing.json"), &out),
        &config_with_token(),
    )
    .await
    .expect_err("missing manifest should fail");

    assert!(matches!(err, CliError::Collect(CollectorError::Io { .. })));
}

#[tokio::test]
#[serial]
async fn test_execute_respects_fail_on_error() {
    let dir = TempDir::new().expect("should create temp dir");
    let writer = OutputWriter::new(OutputFormat::Json);
    let args = collect_args(dir.path().join("missing.json"), &dir);

    // fail_on_error = false (기본값): 실패해도 성공 종료
    let lenient = dir.path().join("lenient.toml");
    std::fs::write(&lenient, "[service]\norg_token = \"org\"\n").expect("write config");
    execute(args.clone(), &lenient, &writer)
        .await
        .expect("failure is only logged when fail_on_error is disabled");

    let strict = dir.path().join("strict.toml");
    std::fs::write(
        &strict,
        "[service]\norg_token = \"org\"\nfail_on_error = true\n",
    )
    .expect("write config");
    let err = execute(args, &strict, &writer)
        .await
        .expect_err("failure propagates when fail_on_error is enabled");
    assert_eq!(err.exit_code(), 3);
}
