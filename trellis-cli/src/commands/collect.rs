//! `trellis collect` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use trellis_collector::manifest::DEFAULT_MAX_MANIFEST_SIZE;
use trellis_collector::{
    CollectionResult, CollectorConfig, CollectorError, InventoryCollector, InventoryReporter,
    InventorySummary, Module, OfflineRequestWriter, ReactorManifest, UpdateRequest,
};
use trellis_core::config::TrellisConfig;

use crate::cli::CollectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `collect` command.
///
/// A missing configuration file is tolerated (defaults + env overrides).
/// When `service.fail_on_error` is false, a failed collection is logged
/// and the command still succeeds.
pub async fn execute(
    args: CollectArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = TrellisConfig::load_or_default(config_path).await?;

    match collect_inventory(&args, &config).await {
        Ok(report) => writer.render(&report),
        Err(e) if !config.service.fail_on_error => {
            error!(
                error = %e,
                "inventory collection failed (service.fail_on_error is disabled)"
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Run the whole collection flow and build the command report.
///
/// Loads the reactor manifest, collects the inventory on a blocking thread
/// and, unless `--dry-run` is set, writes the update request.
///
/// # Errors
///
/// - `CliError::Config` when the organization token cannot be resolved
/// - `CliError::Collect` for manifest, collection and report failures
pub async fn collect_inventory(
    args: &CollectArgs,
    config: &TrellisConfig,
) -> Result<CollectReport, CliError> {
    let manifest_display = args.manifest.display().to_string();

    if config.service.skip {
        info!(manifest = %manifest_display, "collection skipped (service.skip = true)");
        return Ok(CollectReport::skipped(manifest_display));
    }

    let collector_config = effective_collector_config(args, config)?;

    // 수집 전에 토큰을 확인해 실패를 빠르게 보고
    let org_token = if args.dry_run {
        None
    } else {
        Some(config.service.resolve_org_token().await?)
    };

    info!(manifest = %manifest_display, "starting inventory collection");

    let manifest_path = args.manifest.clone();
    let (result, root) =
        tokio::task::spawn_blocking(move || run_collection(&manifest_path, collector_config))
            .await
            .map_err(|e| CliError::Command(format!("collection task failed: {e}")))??;

    for warning in &result.warnings {
        warn!(warning = %warning, "module skipped during collection");
    }

    let product = config
        .service
        .product
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| root.display_name().to_owned());

    let summary = InventorySummary::from_inventory(&result.inventory);

    let request_path = match org_token {
        None => {
            info!("dry run, update request not written");
            None
        }
        Some(token) => {
            let output_dir = args
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.service.output_dir));
            let reporter = OfflineRequestWriter::new(output_dir);

            let request = UpdateRequest::new(token, product.clone(), result.inventory)
                .with_user_key(config.service.resolve_user_key().await)
                .with_product_version(config.service.product_version.clone())
                .with_requester_email(config.service.requester_email.clone())
                .with_force_update(config.service.force_update)
                .with_force_check_all_dependencies(config.service.force_check_all_dependencies);

            reporter.report(&request)?;
            Some(reporter.request_path().display().to_string())
        }
    };

    Ok(CollectReport {
        manifest: manifest_display,
        skipped: false,
        dry_run: args.dry_run,
        product: Some(product),
        summary: Some(summary),
        warnings: result.warnings,
        request_path,
    })
}

/// Load the manifest and collect; runs on a blocking thread.
fn run_collection(
    manifest_path: &Path,
    config: CollectorConfig,
) -> Result<(CollectionResult, Module), CollectorError> {
    let manifest = ReactorManifest::load(manifest_path, DEFAULT_MAX_MANIFEST_SIZE)?;
    let collector = InventoryCollector::new(config)?;
    let result = collector.collect(&manifest.resolver, &manifest.modules, &manifest.root)?;
    Ok((result, manifest.root))
}

/// Apply command-line flags on top of the `[collector]` section.
///
/// Strategy flags only add to the file's selection.
///
/// # Errors
///
/// Returns `CollectorError::ConfigurationConflict` when a strategy flag
/// contradicts the strategy chosen in the file.
pub fn effective_collector_config(
    args: &CollectArgs,
    config: &TrellisConfig,
) -> Result<CollectorConfig, CollectorError> {
    let mut collector = CollectorConfig::from_core(&config.collector);
    if args.aggregate && collector.preserve_module_info {
        return Err(CollectorError::ConfigurationConflict {
            first: "--aggregate".to_owned(),
            second: "collector.preserve_module_info".to_owned(),
        });
    }
    if args.preserve_module_info && collector.aggregate_modules {
        return Err(CollectorError::ConfigurationConflict {
            first: "--preserve-module-info".to_owned(),
            second: "collector.aggregate_modules".to_owned(),
        });
    }
    collector.aggregate_modules |= args.aggregate;
    collector.preserve_module_info |= args.preserve_module_info;
    collector.ignore_dependency_resolution_errors |= args.tolerate_resolution_errors;
    Ok(collector)
}

/// Collection report.
#[derive(Debug, Serialize)]
pub struct CollectReport {
    /// Reactor manifest path
    pub manifest: String,
    /// Collection skipped by configuration
    pub skipped: bool,
    /// Update request was not written
    pub dry_run: bool,
    /// Product name used for the update request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Inventory summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<InventorySummary>,
    /// Non-fatal warnings (skipped modules)
    pub warnings: Vec<String>,
    /// Written update request file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
}

impl CollectReport {
    fn skipped(manifest: String) -> Self {
        Self {
            manifest,
            skipped: true,
            dry_run: false,
            product: None,
            summary: None,
            warnings: Vec::new(),
            request_path: None,
        }
    }
}

impl Render for CollectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Collect: {}", self.manifest.bold())?;

        if self.skipped {
            writeln!(w, "  Result: {}", "SKIPPED".yellow().bold())?;
            return Ok(());
        }

        if let Some(ref product) = self.product {
            writeln!(w, "  Product: {}", product)?;
        }

        if let Some(ref summary) = self.summary {
            writeln!(w, "  Strategy: {}", summary.strategy)?;
            writeln!(w, "  Projects: {}", summary.projects.len())?;
            writeln!(w)?;
            writeln!(
                w,
                "  {:<50} {:>8} {:>8} {:>8}",
                "PROJECT", "DIRECT", "TOTAL", "HASHED"
            )?;
            writeln!(w, "  {}", "-".repeat(77))?;
            for project in &summary.projects {
                writeln!(
                    w,
                    "  {:<50} {:>8} {:>8} {:>8}",
                    project.coordinates,
                    project.top_level_dependencies,
                    project.total_dependencies,
                    project.hashed_dependencies
                )?;
            }
            writeln!(w)?;
            writeln!(
                w,
                "  Dependencies: {} ({} without checksum)",
                summary.total_dependencies(),
                summary.unhashed_dependencies()
            )?;
        }

        for warning in &self.warnings {
            writeln!(w, "  Warning: {}", warning.yellow())?;
        }

        match self.request_path {
            Some(ref path) => writeln!(w, "  Update request: {}", path.green())?,
            None if self.dry_run => {
                writeln!(w, "  Update request: {}", "not written (dry run)".dimmed())?
            }
            None => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_collector::types::{
        AggregateInventory, AggregationStrategy, Coordinates, DependencyRecord, ProjectRecord,
    };

    fn args() -> CollectArgs {
        CollectArgs {
            manifest: PathBuf::from("reactor.json"),
            output_dir: None,
            aggregate: false,
            preserve_module_info: false,
            tolerate_resolution_errors: false,
            dry_run: false,
        }
    }

    fn summary() -> InventorySummary {
        let mut project = ProjectRecord::new(Coordinates::new("com.acme", "shop-api", "1.0"));
        let mut dep = DependencyRecord::new(Coordinates::new("org.lib", "x", "1.0"));
        dep.sha1 = Some("0a1b".to_owned());
        project.dependencies.push(dep);
        project
            .dependencies
            .push(DependencyRecord::new(Coordinates::new("org.lib", "y", "2.0")));

        InventorySummary::from_inventory(&AggregateInventory {
            strategy: AggregationStrategy::None,
            projects: vec![project],
        })
    }

    fn render(report: &CollectReport) -> String {
        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_strategy_flag_contradicting_file_is_conflict() {
        let mut config = TrellisConfig::default();
        config.collector.preserve_module_info = true;

        let err = effective_collector_config(
            &CollectArgs {
                aggregate: true,
                ..args()
            },
            &config,
        )
        .expect_err("flag must not silently replace the file's strategy");
        assert!(matches!(err, CollectorError::ConfigurationConflict { .. }));
        assert!(err.to_string().contains("--aggregate"));

        let mut config = TrellisConfig::default();
        config.collector.aggregate_modules = true;
        let err = effective_collector_config(
            &CollectArgs {
                preserve_module_info: true,
                ..args()
            },
            &config,
        )
        .expect_err("flag must not silently replace the file's strategy");
        assert!(err.to_string().contains("--preserve-module-info"));
        assert_eq!(CliError::from(err).exit_code(), 2);
    }

    #[test]
    fn test_strategy_flag_agreeing_with_file() {
        let mut config = TrellisConfig::default();
        config.collector.aggregate_modules = true;

        let collector = effective_collector_config(
            &CollectArgs {
                aggregate: true,
                ..args()
            },
            &config,
        )
        .expect("same strategy twice is not a conflict");
        assert_eq!(
            collector.aggregation_strategy().expect("valid strategy"),
            AggregationStrategy::Flat
        );
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let mut config = TrellisConfig::default();
        config.collector.ignore_dependency_resolution_errors = true;
        config.collector.excludes = vec!["*-it".to_owned()];

        let collector = effective_collector_config(&args(), &config).expect("no conflict");
        assert!(collector.ignore_dependency_resolution_errors);
        assert_eq!(collector.excludes, vec!["*-it".to_owned()]);
        assert!(!collector.aggregate_modules);
    }

    #[test]
    fn test_tolerate_flag_enables_resolution_tolerance() {
        let collector = effective_collector_config(
            &CollectArgs {
                tolerate_resolution_errors: true,
                ..args()
            },
            &TrellisConfig::default(),
        )
        .expect("no conflict");
        assert!(collector.ignore_dependency_resolution_errors);
    }

    #[test]
    fn test_render_text_skipped() {
        let output = render(&CollectReport::skipped("reactor.json".to_owned()));
        assert!(output.contains("reactor.json"));
        assert!(output.contains("SKIPPED"));
        assert!(!output.contains("Projects"));
    }

    #[test]
    fn test_render_text_summary() {
        let report = CollectReport {
            manifest: "reactor.json".to_owned(),
            skipped: false,
            dry_run: false,
            product: Some("shop".to_owned()),
            summary: Some(summary()),
            warnings: vec![
                "skipped com.acme:broken:1.0: dependency resolution failed: boom".to_owned(),
            ],
            request_path: Some("target/trellis/update-request.json".to_owned()),
        };

        let output = render(&report);
        assert!(output.contains("Product: shop"));
        assert!(output.contains("Strategy: none"));
        assert!(output.contains("com.acme:shop-api:1.0"));
        assert!(output.contains("Dependencies: 2 (1 without checksum)"));
        assert!(output.contains("com.acme:broken:1.0"));
        assert!(output.contains("update-request.json"));
    }

    #[test]
    fn test_render_text_dry_run() {
        let report = CollectReport {
            manifest: "reactor.json".to_owned(),
            skipped: false,
            dry_run: true,
            product: Some("shop".to_owned()),
            summary: Some(summary()),
            warnings: Vec::new(),
            request_path: None,
        };
        assert!(render(&report).contains("dry run"));
    }

    #[test]
    fn test_report_json_omits_absent_fields() {
        let json = serde_json::to_value(CollectReport::skipped("reactor.json".to_owned()))
            .expect("JSON serialization should succeed");
        assert_eq!(json["skipped"].as_bool(), Some(true));
        assert!(json.get("summary").is_none());
        assert!(json.get("request_path").is_none());
    }
}
