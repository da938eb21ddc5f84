//! 수집기 에러 타입
//!
//! [`CollectorError`]는 의존성 수집 과정에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<CollectorError> for TrellisError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **아티팩트 해시**: `HashComputation` (비치명적, 해시 없이 계속 진행)
//! - **그래프 해석**: `GraphResolution` (설정에 따라 건너뛰기 가능)
//! - **그래프 구조**: `CyclicGraph` (항상 치명적)
//! - **설정**: `ConfigurationConflict`, `Config`
//! - **매니페스트**: `Manifest`, `ManifestTooBig`
//! - **파일 I/O / 리포트**: `Io`, `Report`

use trellis_core::error::{CollectError, ConfigError, TrellisError};

/// 수집기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// 아티팩트 파일 해시 계산 실패
    #[error("hash computation failed: {path}: {reason}")]
    HashComputation {
        /// 아티팩트 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 모듈 의존성 그래프 해석 실패
    #[error("dependency resolution failed for {module}: {reason}")]
    GraphResolution {
        /// 모듈 좌표 (`group:artifact:version`)
        module: String,
        /// 실패 사유
        reason: String,
    },

    /// 순환 또는 비정상적으로 깊은 의존성 그래프
    #[error("cyclic dependency graph at {artifact}: {reason}")]
    CyclicGraph {
        /// 문제가 발견된 아티팩트 좌표
        artifact: String,
        /// 상세 사유
        reason: String,
    },

    /// 상호 배타적인 집계 전략이 동시에 요청됨
    #[error("configuration conflict: {first} and {second} cannot both be enabled")]
    ConfigurationConflict {
        /// 첫 번째 설정 필드명
        first: String,
        /// 두 번째 설정 필드명
        second: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// reactor 매니페스트 파싱 실패
    #[error("manifest error: {path}: {reason}")]
    Manifest {
        /// 매니페스트 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 매니페스트 크기 초과
    #[error("manifest too large: {path}: {size} bytes (max: {max})")]
    ManifestTooBig {
        /// 매니페스트 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: u64,
        /// 최대 허용 크기 (바이트)
        max: u64,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 업데이트 요청 전달 실패
    #[error("report error: {0}")]
    Report(String),
}

impl From<CollectorError> for TrellisError {
    fn from(err: CollectorError) -> Self {
        match err {
            CollectorError::HashComputation { path, reason } => TrellisError::Collect(
                CollectError::Artifact(format!("hash computation failed: {path}: {reason}")),
            ),
            CollectorError::GraphResolution { module, reason } => {
                TrellisError::Collect(CollectError::Resolution(format!("{module}: {reason}")))
            }
            CollectorError::CyclicGraph { artifact, reason } => {
                TrellisError::Collect(CollectError::CyclicGraph(format!("{artifact}: {reason}")))
            }
            CollectorError::ConfigurationConflict { first, second } => {
                TrellisError::Config(ConfigError::Conflict { first, second })
            }
            CollectorError::Config { field, reason } => {
                TrellisError::Config(ConfigError::InvalidValue { field, reason })
            }
            CollectorError::Manifest { path, reason } => {
                TrellisError::Collect(CollectError::Manifest(format!("{path}: {reason}")))
            }
            CollectorError::ManifestTooBig { path, size, max } => TrellisError::Collect(
                CollectError::Manifest(format!("{path}: {size} bytes (max: {max})")),
            ),
            CollectorError::Io { path, source } => TrellisError::Io(std::io::Error::new(
                source.kind(),
                format!("{path}: {source}"),
            )),
            CollectorError::Report(msg) => TrellisError::Collect(CollectError::Report(msg)),
        }
    }
}
