//! 수집기 오케스트레이터 -- 한 번의 수집 흐름 관리
//!
//! [`InventoryCollector`]는 생성 시 설정을 검증하고 필터와 토큰 맵을 한 번만
//! 구성합니다. 이후 [`collect`](InventoryCollector::collect)를 호출할 때마다
//! 다음 순서로 진행합니다.
//!
//! ```text
//! modules --> ModuleFilter --> DependencyGraphResolver --> ScopeFilter --> DependencyMapper
//!                                                                              |
//!                                                                       Vec<ProjectRecord>
//!                                                                              |
//!                                                     Aggregator --> empty-project suppression
//!                                                                              |
//!                                                                    AggregateInventory
//! ```

use std::time::Instant;

use tracing::{debug, enabled, info, Level};
use trellis_core::metrics as m;

use crate::aggregate::Aggregator;
use crate::builder::ProjectTreeBuilder;
use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::reactor::{DependencyGraphResolver, Module};
use crate::types::{AggregateInventory, AggregationStrategy, ProjectRecord};

/// 한 번의 수집 결과
#[derive(Debug, Clone)]
pub struct CollectionResult {
    /// 최종 인벤토리
    pub inventory: AggregateInventory,
    /// 건너뛴 모듈 등 비치명적 경고
    pub warnings: Vec<String>,
}

/// 의존성 인벤토리 수집기
#[derive(Debug, Clone)]
pub struct InventoryCollector {
    config: CollectorConfig,
    builder: ProjectTreeBuilder,
    aggregator: Aggregator,
}

impl InventoryCollector {
    /// 설정을 검증하고 수집기를 생성합니다.
    ///
    /// # Errors
    ///
    /// - 두 집계 전략이 모두 켜져 있으면 `ConfigurationConflict`
    /// - 그 외 잘못된 설정 값은 `Config`
    pub fn new(config: CollectorConfig) -> Result<Self, CollectorError> {
        config.validate()?;
        let strategy = config.aggregation_strategy()?;
        let builder = ProjectTreeBuilder::from_config(&config)?;
        let aggregator = Aggregator::new(
            strategy,
            config.aggregate_project_name.clone(),
            config.aggregate_project_token.clone(),
        );

        debug!(
            strategy = %strategy,
            ignored_scopes = ?builder.scope_filter().ignored_scopes().collect::<Vec<_>>(),
            "inventory collector initialized"
        );

        Ok(Self {
            config,
            builder,
            aggregator,
        })
    }

    /// 수집기 설정
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// 적용되는 집계 전략
    pub fn strategy(&self) -> AggregationStrategy {
        self.aggregator.strategy()
    }

    /// reactor 모듈 목록에서 인벤토리를 수집합니다.
    ///
    /// 중간에 실패하면 누적된 레코드는 모두 버려집니다.
    pub fn collect(
        &self,
        resolver: &dyn DependencyGraphResolver,
        modules: &[Module],
        root: &Module,
    ) -> Result<CollectionResult, CollectorError> {
        let started = Instant::now();

        let outcome = self.builder.build(resolver, modules, root)?;
        dump_projects(&outcome.projects);

        let mut inventory = self.aggregator.aggregate(outcome.projects, root);

        if !self.config.update_empty_project {
            inventory.projects.retain(|project| {
                if project.is_empty() {
                    info!(project = %project.coordinates, "dropping project without dependencies");
                    metrics::counter!(m::COLLECTOR_EMPTY_PROJECTS_DROPPED_TOTAL).increment(1);
                    false
                } else {
                    true
                }
            });
        }

        let elapsed = started.elapsed();
        metrics::histogram!(
            m::COLLECTOR_COLLECTION_DURATION_SECONDS,
            m::LABEL_STRATEGY => inventory.strategy.as_str()
        )
        .record(elapsed.as_secs_f64());

        info!(
            strategy = %inventory.strategy,
            projects = inventory.project_count(),
            dependencies = inventory.dependency_count(),
            warnings = outcome.warnings.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "inventory collected"
        );

        Ok(CollectionResult {
            inventory,
            warnings: outcome.warnings,
        })
    }
}

/// 수집된 프로젝트 레코드를 `debug`로 덤프합니다.
fn dump_projects(projects: &[ProjectRecord]) {
    if !enabled!(Level::DEBUG) {
        return;
    }

    debug!("----------------- dumping projects -----------------");
    debug!("total number of projects: {}", projects.len());
    for project in projects {
        debug!(
            coordinates = %project.coordinates,
            parent = %project
                .parent_coordinates
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            token = project.project_token.as_deref().unwrap_or(""),
            dependencies = project.dependencies.len(),
            "project"
        );
        for dependency in &project.dependencies {
            debug!(
                "{} sha1: {}",
                dependency,
                dependency.sha1.as_deref().unwrap_or("-")
            );
        }
    }
    debug!("----------------- dump finished -----------------");
}
