//! 수집기 설정
//!
//! [`CollectorConfig`]는 core의 [`CollectorSection`](trellis_core::config::CollectorSection)에서
//! 파생되는 불변 설정 값입니다. 수집 시작 전에 한 번 검증되며, 각 구성 요소에
//! 명시적으로 전달됩니다.
//!
//! # 사용 예시
//!
//! ```
//! use trellis_collector::{CollectorConfig, CollectorConfigBuilder};
//!
//! // 기본값으로 생성
//! let config = CollectorConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! let config = CollectorConfigBuilder::new()
//!     .excludes(vec!["*-it".to_owned()])
//!     .aggregate_modules(true)
//!     .build()
//!     .unwrap();
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use trellis_core::config::MAX_GRAPH_DEPTH_LIMIT;

use crate::error::CollectorError;
use crate::mapper::DEFAULT_MAX_GRAPH_DEPTH;
use crate::types::AggregationStrategy;

/// 수집기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// 무시할 scope 목록
    pub ignored_scopes: Vec<String>,
    /// 구버전 호환 scope 목록 (`ignored_scopes`와 합집합)
    pub legacy_scopes: Vec<String>,
    /// include 패턴
    pub includes: Vec<String>,
    /// exclude 패턴
    pub excludes: Vec<String>,
    /// packaging-only 모듈 무시
    pub ignore_pom_modules: bool,
    /// 평탄화 집계
    pub aggregate_modules: bool,
    /// 모듈 보존 집계
    pub preserve_module_info: bool,
    /// 집계 프로젝트 이름
    pub aggregate_project_name: Option<String>,
    /// 집계 프로젝트 토큰
    pub aggregate_project_token: Option<String>,
    /// 루트 모듈 프로젝트 토큰
    pub project_token: Option<String>,
    /// 모듈 artifactId -> 토큰
    pub module_tokens: BTreeMap<String, String>,
    /// 특수 이름 모듈 토큰 (같은 키는 `module_tokens`보다 우선)
    pub special_module_tokens: BTreeMap<String, String>,
    /// 그래프 해석 실패 모듈 건너뛰기
    pub ignore_dependency_resolution_errors: bool,
    /// 빈 프로젝트 유지
    pub update_empty_project: bool,
    /// 의존성 트리 최대 깊이
    pub max_graph_depth: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            ignored_scopes: Vec::new(),
            legacy_scopes: Vec::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            ignore_pom_modules: true,
            aggregate_modules: false,
            preserve_module_info: false,
            aggregate_project_name: None,
            aggregate_project_token: None,
            project_token: None,
            module_tokens: BTreeMap::new(),
            special_module_tokens: BTreeMap::new(),
            ignore_dependency_resolution_errors: false,
            update_empty_project: true,
            max_graph_depth: DEFAULT_MAX_GRAPH_DEPTH,
        }
    }
}

impl CollectorConfig {
    /// core의 `[collector]` 섹션에서 설정을 생성합니다.
    pub fn from_core(core: &trellis_core::config::CollectorSection) -> Self {
        Self {
            ignored_scopes: core.ignored_scopes.clone(),
            legacy_scopes: core.scope.clone(),
            includes: core.includes.clone(),
            excludes: core.excludes.clone(),
            ignore_pom_modules: core.ignore_pom_modules,
            aggregate_modules: core.aggregate_modules,
            preserve_module_info: core.preserve_module_info,
            aggregate_project_name: non_blank(core.aggregate_project_name.as_deref()),
            aggregate_project_token: non_blank(core.aggregate_project_token.as_deref()),
            project_token: non_blank(core.project_token.as_deref()),
            module_tokens: core.module_tokens.clone(),
            special_module_tokens: core.special_module_tokens.clone(),
            ignore_dependency_resolution_errors: core.ignore_dependency_resolution_errors,
            update_empty_project: core.update_empty_project,
            max_graph_depth: core.max_graph_depth,
        }
    }

    /// 설정된 집계 전략을 반환합니다.
    ///
    /// # Errors
    ///
    /// 두 집계 전략이 모두 켜져 있으면 `ConfigurationConflict`
    pub fn aggregation_strategy(&self) -> Result<AggregationStrategy, CollectorError> {
        match (self.aggregate_modules, self.preserve_module_info) {
            (true, true) => Err(CollectorError::ConfigurationConflict {
                first: "aggregate_modules".to_owned(),
                second: "preserve_module_info".to_owned(),
            }),
            (true, false) => Ok(AggregationStrategy::Flat),
            (false, true) => Ok(AggregationStrategy::ModulePreserving),
            (false, false) => Ok(AggregationStrategy::None),
        }
    }

    /// 특수 토큰을 병합한 모듈 토큰 맵을 반환합니다.
    pub fn effective_module_tokens(&self) -> BTreeMap<String, String> {
        let mut tokens = self.module_tokens.clone();
        tokens.extend(
            self.special_module_tokens
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        tokens
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `aggregate_modules`와 `preserve_module_info`는 동시에 켤 수 없음
    /// - `max_graph_depth`: 1-2000
    pub fn validate(&self) -> Result<(), CollectorError> {
        self.aggregation_strategy()?;

        if self.max_graph_depth == 0 || self.max_graph_depth > MAX_GRAPH_DEPTH_LIMIT {
            return Err(CollectorError::Config {
                field: "max_graph_depth".to_owned(),
                reason: format!("must be 1-{MAX_GRAPH_DEPTH_LIMIT}"),
            });
        }

        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// 수집기 설정 빌더
#[derive(Default)]
pub struct CollectorConfigBuilder {
    config: CollectorConfig,
}

impl CollectorConfigBuilder {
    /// 기본값으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 무시할 scope 목록
    pub fn ignored_scopes(mut self, scopes: Vec<String>) -> Self {
        self.config.ignored_scopes = scopes;
        self
    }

    /// 구버전 호환 scope 목록
    pub fn legacy_scopes(mut self, scopes: Vec<String>) -> Self {
        self.config.legacy_scopes = scopes;
        self
    }

    /// include 패턴
    pub fn includes(mut self, patterns: Vec<String>) -> Self {
        self.config.includes = patterns;
        self
    }

    /// exclude 패턴
    pub fn excludes(mut self, patterns: Vec<String>) -> Self {
        self.config.excludes = patterns;
        self
    }

    /// packaging-only 모듈 무시
    pub fn ignore_pom_modules(mut self, ignore: bool) -> Self {
        self.config.ignore_pom_modules = ignore;
        self
    }

    /// 평탄화 집계
    pub fn aggregate_modules(mut self, enabled: bool) -> Self {
        self.config.aggregate_modules = enabled;
        self
    }

    /// 모듈 보존 집계
    pub fn preserve_module_info(mut self, enabled: bool) -> Self {
        self.config.preserve_module_info = enabled;
        self
    }

    /// 집계 프로젝트 이름
    pub fn aggregate_project_name(mut self, name: impl Into<String>) -> Self {
        self.config.aggregate_project_name = Some(name.into());
        self
    }

    /// 집계 프로젝트 토큰
    pub fn aggregate_project_token(mut self, token: impl Into<String>) -> Self {
        self.config.aggregate_project_token = Some(token.into());
        self
    }

    /// 루트 모듈 프로젝트 토큰
    pub fn project_token(mut self, token: impl Into<String>) -> Self {
        self.config.project_token = Some(token.into());
        self
    }

    /// 모듈 토큰 추가
    pub fn module_token(mut self, artifact_id: impl Into<String>, token: impl Into<String>) -> Self {
        self.config
            .module_tokens
            .insert(artifact_id.into(), token.into());
        self
    }

    /// 특수 모듈 토큰 추가
    pub fn special_module_token(
        mut self,
        artifact_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        self.config
            .special_module_tokens
            .insert(artifact_id.into(), token.into());
        self
    }

    /// 그래프 해석 실패 모듈 건너뛰기
    pub fn ignore_dependency_resolution_errors(mut self, ignore: bool) -> Self {
        self.config.ignore_dependency_resolution_errors = ignore;
        self
    }

    /// 빈 프로젝트 유지
    pub fn update_empty_project(mut self, update: bool) -> Self {
        self.config.update_empty_project = update;
        self
    }

    /// 의존성 트리 최대 깊이
    pub fn max_graph_depth(mut self, depth: usize) -> Self {
        self.config.max_graph_depth = depth;
        self
    }

    /// 설정을 검증하고 반환합니다.
    pub fn build(self) -> Result<CollectorConfig, CollectorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
