//! 에러 타입 -- 도메인별 에러 정의

/// Trellis 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum TrellisError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 의존성 수집 에러
    #[error("collect error: {0}")]
    Collect(#[from] CollectError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 상호 배타적인 설정이 동시에 지정됨
    #[error("conflicting config values: {first} and {second} are mutually exclusive")]
    Conflict { first: String, second: String },
}

/// 의존성 수집 에러
///
/// `trellis-collector`의 도메인 에러가 최상위로 전파될 때 사용하는 요약 형태입니다.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// 모듈 의존성 그래프 해석 실패
    #[error("dependency resolution failed: {0}")]
    Resolution(String),

    /// 아티팩트 파일 처리 실패
    #[error("artifact error: {0}")]
    Artifact(String),

    /// 순환 의존성 그래프 (상위 빌드 도구 계약 위반)
    #[error("cyclic dependency graph: {0}")]
    CyclicGraph(String),

    /// 매니페스트 파싱 실패
    #[error("manifest error: {0}")]
    Manifest(String),

    /// 리포트 전달 실패
    #[error("report error: {0}")]
    Report(String),
}
