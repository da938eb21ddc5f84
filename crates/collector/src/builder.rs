//! 프로젝트 트리 빌더 -- reactor 모듈 목록에서 [`ProjectRecord`] 생성
//!
//! 모듈을 선언 순서대로 처리합니다. 필터를 통과한 모듈마다 의존성 그래프를
//! 해석하고, 최상위 간선에만 scope 필터를 적용한 뒤 나머지 하위 트리는
//! 그대로 매핑합니다.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, enabled, error, info, warn, Level};
use trellis_core::metrics as m;

use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::filter::{ModuleDecision, ModuleFilter, ScopeFilter};
use crate::mapper::DependencyMapper;
use crate::reactor::{DependencyGraphResolver, Module};
use crate::types::{DependencyRecord, ProjectRecord};

/// 빌드 결과
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    /// 모듈 선언 순서의 프로젝트 레코드
    pub projects: Vec<ProjectRecord>,
    /// 건너뛴 모듈에 대한 비치명적 경고
    pub warnings: Vec<String>,
}

/// 모듈 토큰 할당
///
/// 루트 모듈은 프로젝트 토큰을, 그 외 모듈은 artifactId로 조회한 토큰을 받습니다.
#[derive(Debug, Clone, Default)]
pub struct ModuleTokens {
    project_token: Option<String>,
    module_tokens: BTreeMap<String, String>,
}

impl ModuleTokens {
    /// 프로젝트 토큰과 (특수 토큰이 병합된) 모듈 토큰 맵으로 생성합니다.
    pub fn new(project_token: Option<String>, module_tokens: BTreeMap<String, String>) -> Self {
        Self {
            project_token,
            module_tokens,
        }
    }

    /// 모듈에 할당할 토큰
    pub fn token_for(&self, module: &Module, is_root: bool) -> Option<String> {
        if is_root {
            self.project_token.clone()
        } else {
            self.module_tokens
                .get(&module.coordinates.artifact_id)
                .cloned()
        }
    }
}

/// 프로젝트 트리 빌더
#[derive(Debug, Clone)]
pub struct ProjectTreeBuilder {
    scope_filter: ScopeFilter,
    module_filter: ModuleFilter,
    mapper: DependencyMapper,
    tokens: ModuleTokens,
    tolerate_resolution_errors: bool,
}

impl ProjectTreeBuilder {
    /// 설정에서 필터와 토큰 맵을 한 번 구성합니다.
    pub fn from_config(config: &CollectorConfig) -> Result<Self, CollectorError> {
        Ok(Self {
            scope_filter: ScopeFilter::new(&config.ignored_scopes, &config.legacy_scopes),
            module_filter: ModuleFilter::new(
                config.ignore_pom_modules,
                &config.includes,
                &config.excludes,
            )?,
            mapper: DependencyMapper::new(config.max_graph_depth),
            tokens: ModuleTokens::new(
                config.project_token.clone(),
                config.effective_module_tokens(),
            ),
            tolerate_resolution_errors: config.ignore_dependency_resolution_errors,
        })
    }

    /// scope 필터
    pub fn scope_filter(&self) -> &ScopeFilter {
        &self.scope_filter
    }

    /// 모든 모듈을 처리하여 프로젝트 레코드를 생성합니다.
    ///
    /// # Errors
    ///
    /// - 해석 실패를 허용하지 않는 설정에서 `GraphResolution`
    /// - 순환 그래프는 설정과 관계없이 `CyclicGraph`
    pub fn build(
        &self,
        resolver: &dyn DependencyGraphResolver,
        modules: &[Module],
        root: &Module,
    ) -> Result<BuildOutcome, CollectorError> {
        let mut outcome = BuildOutcome::default();

        for module in modules {
            let is_root = module.coordinates == root.coordinates;

            if let ModuleDecision::Skip(reason) = self.module_filter.decide(module, is_root) {
                info!(module = %module.coordinates, reason = %reason, "skipping module");
                metrics::counter!(m::COLLECTOR_MODULES_SKIPPED_TOTAL, m::LABEL_REASON => reason.as_str())
                    .increment(1);
                continue;
            }

            match self.process_module(resolver, module, is_root) {
                Ok(project) => outcome.projects.push(project),
                Err(CollectorError::GraphResolution { module: id, reason })
                    if self.tolerate_resolution_errors =>
                {
                    warn!(
                        module = %id,
                        error = %reason,
                        "skipping module, dependency resolution failed (resolution errors tolerated)"
                    );
                    metrics::counter!(m::COLLECTOR_RESOLUTION_FAILURES_TOTAL).increment(1);
                    metrics::counter!(m::COLLECTOR_MODULES_SKIPPED_TOTAL, m::LABEL_REASON => "resolution")
                        .increment(1);
                    outcome
                        .warnings
                        .push(format!("skipped {id}: dependency resolution failed: {reason}"));
                }
                Err(e) => {
                    if matches!(e, CollectorError::GraphResolution { .. }) {
                        metrics::counter!(m::COLLECTOR_RESOLUTION_FAILURES_TOTAL).increment(1);
                    }
                    error!(module = %module.coordinates, error = %e, "failed to process module, aborting");
                    return Err(e);
                }
            }
        }

        Ok(outcome)
    }

    fn process_module(
        &self,
        resolver: &dyn DependencyGraphResolver,
        module: &Module,
        is_root: bool,
    ) -> Result<ProjectRecord, CollectorError> {
        let started = Instant::now();
        info!(module = %module.coordinates, "processing module");

        let root_node = resolver.resolve(module)?;

        let mut dependencies = Vec::with_capacity(root_node.children.len());
        for node in &root_node.children {
            if self.scope_filter.should_ignore_scope(node.scope.as_deref()) {
                debug!(
                    module = %module.coordinates,
                    dependency = %node.artifact.coordinates,
                    scope = node.scope.as_deref().unwrap_or(""),
                    "dropping dependency with ignored scope"
                );
                continue;
            }
            dependencies.push(self.mapper.map(node)?);
        }

        let mapped: usize = dependencies.iter().map(DependencyRecord::total_count).sum();
        metrics::counter!(m::COLLECTOR_MODULES_PROCESSED_TOTAL).increment(1);
        metrics::counter!(m::COLLECTOR_DEPENDENCIES_MAPPED_TOTAL).increment(mapped as u64);

        log_dependency_tree(module, &dependencies);
        debug!(
            module = %module.coordinates,
            dependencies = mapped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "module processed"
        );

        Ok(ProjectRecord {
            coordinates: module.coordinates.clone(),
            parent_coordinates: module.parent.clone(),
            project_token: self.tokens.token_for(module, is_root),
            dependencies,
        })
    }
}

/// 모듈 의존성 트리를 들여쓰기된 `group:artifact:version:scope` 목록으로 기록합니다.
fn log_dependency_tree(module: &Module, dependencies: &[DependencyRecord]) {
    if !enabled!(Level::DEBUG) {
        return;
    }

    debug!("*** dependency graph for {} ***", module.display_name());
    let mut stack: Vec<(&DependencyRecord, usize)> =
        dependencies.iter().rev().map(|d| (d, 0)).collect();
    while let Some((record, depth)) = stack.pop() {
        debug!("{}{}", "   ".repeat(depth), record);
        stack.extend(record.children.iter().rev().map(|c| (c, depth + 1)));
    }
}
