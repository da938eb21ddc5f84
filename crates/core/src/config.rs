//! 설정 관리 -- trellis.toml 파싱 및 런타임 설정
//!
//! [`TrellisConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`TRELLIS_COLLECTOR_AGGREGATE_MODULES=true` 형식)
//! 3. 설정 파일 (`trellis.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), trellis_core::error::TrellisError> {
//! use trellis_core::config::TrellisConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = TrellisConfig::load("trellis.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = TrellisConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, TrellisError};

/// 의존성 그래프 최대 깊이 상한
pub const MAX_GRAPH_DEPTH_LIMIT: usize = 2_000;

/// Trellis 통합 설정
///
/// `trellis.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrellisConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 의존성 수집 설정
    #[serde(default)]
    pub collector: CollectorSection,
    /// 리포팅 서비스 설정
    #[serde(default)]
    pub service: ServiceConfig,
}

impl TrellisConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TrellisError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값에 환경변수 오버라이드만 적용합니다.
    ///
    /// 파일이 존재하지만 읽거나 파싱할 수 없는 경우에는 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, TrellisError> {
        match Self::load(path.as_ref()).await {
            Err(TrellisError::Config(ConfigError::FileNotFound { path })) => {
                tracing::debug!(path = %path, "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TrellisError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TrellisError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                TrellisError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, TrellisError> {
        toml::from_str(toml_str).map_err(|e| {
            TrellisError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `TRELLIS_{SECTION}_{FIELD}`
    /// 예: `TRELLIS_COLLECTOR_EXCLUDES=*-it,*-bench`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "TRELLIS_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "TRELLIS_GENERAL_LOG_FORMAT");

        // Collector
        let collector = &mut self.collector;
        override_csv(&mut collector.ignored_scopes, "TRELLIS_COLLECTOR_IGNORED_SCOPES");
        override_csv(&mut collector.includes, "TRELLIS_COLLECTOR_INCLUDES");
        override_csv(&mut collector.excludes, "TRELLIS_COLLECTOR_EXCLUDES");
        override_bool(
            &mut collector.ignore_pom_modules,
            "TRELLIS_COLLECTOR_IGNORE_POM_MODULES",
        );
        override_bool(
            &mut collector.aggregate_modules,
            "TRELLIS_COLLECTOR_AGGREGATE_MODULES",
        );
        override_bool(
            &mut collector.preserve_module_info,
            "TRELLIS_COLLECTOR_PRESERVE_MODULE_INFO",
        );
        override_opt_string(
            &mut collector.aggregate_project_name,
            "TRELLIS_COLLECTOR_AGGREGATE_PROJECT_NAME",
        );
        override_opt_string(
            &mut collector.aggregate_project_token,
            "TRELLIS_COLLECTOR_AGGREGATE_PROJECT_TOKEN",
        );
        override_opt_string(&mut collector.project_token, "TRELLIS_COLLECTOR_PROJECT_TOKEN");
        override_bool(
            &mut collector.ignore_dependency_resolution_errors,
            "TRELLIS_COLLECTOR_IGNORE_DEPENDENCY_RESOLUTION_ERRORS",
        );
        override_bool(
            &mut collector.update_empty_project,
            "TRELLIS_COLLECTOR_UPDATE_EMPTY_PROJECT",
        );
        override_usize(
            &mut collector.max_graph_depth,
            "TRELLIS_COLLECTOR_MAX_GRAPH_DEPTH",
        );

        // Service
        let service = &mut self.service;
        override_opt_string(&mut service.org_token, "TRELLIS_SERVICE_ORG_TOKEN");
        override_opt_string(&mut service.org_token_file, "TRELLIS_SERVICE_ORG_TOKEN_FILE");
        override_opt_string(&mut service.user_key, "TRELLIS_SERVICE_USER_KEY");
        override_opt_string(&mut service.user_key_file, "TRELLIS_SERVICE_USER_KEY_FILE");
        override_opt_string(&mut service.product, "TRELLIS_SERVICE_PRODUCT");
        override_opt_string(
            &mut service.product_version,
            "TRELLIS_SERVICE_PRODUCT_VERSION",
        );
        override_opt_string(
            &mut service.requester_email,
            "TRELLIS_SERVICE_REQUESTER_EMAIL",
        );
        override_bool(&mut service.force_update, "TRELLIS_SERVICE_FORCE_UPDATE");
        override_bool(
            &mut service.force_check_all_dependencies,
            "TRELLIS_SERVICE_FORCE_CHECK_ALL_DEPENDENCIES",
        );
        override_string(&mut service.output_dir, "TRELLIS_SERVICE_OUTPUT_DIR");
        override_bool(&mut service.skip, "TRELLIS_SERVICE_SKIP");
        override_bool(&mut service.fail_on_error, "TRELLIS_SERVICE_FAIL_ON_ERROR");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), TrellisError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 집계 전략은 하나만 선택 가능
        if self.collector.aggregate_modules && self.collector.preserve_module_info {
            return Err(ConfigError::Conflict {
                first: "collector.aggregate_modules".to_owned(),
                second: "collector.preserve_module_info".to_owned(),
            }
            .into());
        }

        if self.collector.max_graph_depth == 0
            || self.collector.max_graph_depth > MAX_GRAPH_DEPTH_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "collector.max_graph_depth".to_owned(),
                reason: format!("must be 1-{MAX_GRAPH_DEPTH_LIMIT}"),
            }
            .into());
        }

        if self.service.output_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "service.output_dir".to_owned(),
                reason: "output_dir must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 의존성 수집 설정 (`[collector]` 섹션)
///
/// 모듈 필터링, scope 필터링, 모듈 토큰, 집계 전략을 지정합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSection {
    /// 무시할 의존성 scope 목록 (비어있으면 `test`, `provided`)
    pub ignored_scopes: Vec<String>,
    /// 구버전 호환 scope 목록 (`ignored_scopes`와 합집합으로 사용)
    pub scope: Vec<String>,
    /// artifactId가 이 패턴 중 하나와 일치하는 모듈만 처리
    pub includes: Vec<String>,
    /// artifactId가 이 패턴 중 하나와 일치하는 모듈은 제외
    pub excludes: Vec<String>,
    /// packaging이 `pom`인 모듈 무시 여부
    pub ignore_pom_modules: bool,
    /// 모든 모듈을 하나의 평탄화된 프로젝트로 집계
    pub aggregate_modules: bool,
    /// 모든 모듈을 하나의 프로젝트로 집계하되 모듈 계층을 보존
    pub preserve_module_info: bool,
    /// 집계 프로젝트 이름
    pub aggregate_project_name: Option<String>,
    /// 집계 프로젝트 토큰
    pub aggregate_project_token: Option<String>,
    /// 루트 모듈 프로젝트 토큰
    pub project_token: Option<String>,
    /// 모듈 artifactId -> 프로젝트 토큰
    pub module_tokens: BTreeMap<String, String>,
    /// 식별자로 쓸 수 없는 이름의 모듈 토큰 (`module_tokens`보다 우선)
    pub special_module_tokens: BTreeMap<String, String>,
    /// 의존성 해석 실패 시 해당 모듈만 건너뛰고 계속 진행
    pub ignore_dependency_resolution_errors: bool,
    /// 의존성이 없는 프로젝트도 리포트에 포함
    pub update_empty_project: bool,
    /// 의존성 트리 최대 깊이
    pub max_graph_depth: usize,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            ignored_scopes: Vec::new(),
            scope: Vec::new(),
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
            max_graph_depth: 500,
        }
    }
}

/// 리포팅 서비스 설정 (`[service]` 섹션)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// 조직 토큰
    pub org_token: Option<String>,
    /// 조직 토큰 파일 경로 (첫 줄을 토큰으로 사용, `org_token`보다 우선)
    pub org_token_file: Option<String>,
    /// 사용자 키
    pub user_key: Option<String>,
    /// 사용자 키 파일 경로 (`user_key`보다 우선)
    pub user_key_file: Option<String>,
    /// 제품 이름 (없으면 루트 모듈 이름 또는 artifactId)
    pub product: Option<String>,
    /// 제품 버전
    pub product_version: Option<String>,
    /// 요청자 이메일
    pub requester_email: Option<String>,
    /// 정책 위반과 관계없이 인벤토리 갱신
    pub force_update: bool,
    /// 신규 의존성뿐 아니라 전체 의존성에 대해 정책 검사
    pub force_check_all_dependencies: bool,
    /// 업데이트 요청 파일 출력 디렉토리
    pub output_dir: String,
    /// 실행 자체를 건너뜀
    pub skip: bool,
    /// 수집 실패 시 비정상 종료
    pub fail_on_error: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            org_token: None,
            org_token_file: None,
            user_key: None,
            user_key_file: None,
            product: None,
            product_version: None,
            requester_email: None,
            force_update: false,
            force_check_all_dependencies: false,
            output_dir: "target/trellis".to_owned(),
            skip: false,
            fail_on_error: false,
        }
    }
}

impl ServiceConfig {
    /// 조직 토큰을 결정합니다.
    ///
    /// 토큰 파일의 첫 줄이 있으면 그 값을, 없으면 `org_token`을 사용합니다.
    ///
    /// # Errors
    ///
    /// 어느 쪽에서도 토큰을 얻을 수 없으면 `ConfigError::InvalidValue`
    pub async fn resolve_org_token(&self) -> Result<String, ConfigError> {
        resolve_secret(self.org_token_file.as_deref(), self.org_token.as_deref())
            .await
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "service.org_token".to_owned(),
                reason: "the organization token is missing or empty".to_owned(),
            })
    }

    /// 사용자 키를 결정합니다 (선택 사항).
    pub async fn resolve_user_key(&self) -> Option<String> {
        resolve_secret(self.user_key_file.as_deref(), self.user_key.as_deref()).await
    }
}

/// 파일 우선, 인라인 값 차선으로 비밀 값을 결정합니다.
async fn resolve_secret(file: Option<&str>, inline: Option<&str>) -> Option<String> {
    if let Some(path) = file.filter(|f| !f.trim().is_empty()) {
        if let Some(value) = read_first_line(path).await {
            return Some(value);
        }
    }
    inline
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// 파일의 첫 줄을 읽습니다. 읽을 수 없거나 비어있으면 `None`.
async fn read_first_line(path: &str) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => content
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned),
        Err(e) => {
            warn!(path, error = %e, "failed to read token file, falling back to inline value");
            None
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = if val.trim().is_empty() { None } else { Some(val) };
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
