//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않은 경우 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `trellis_`
//! - 구성 요소명: `collector_`, `report_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(trellis_core::metrics::COLLECTOR_HASH_FAILURES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 모듈 건너뜀 사유 레이블 키 (pom, ignored, excluded, not_included, resolution)
pub const LABEL_REASON: &str = "reason";

/// 집계 전략 레이블 키 (none, flat, module_preserving)
pub const LABEL_STRATEGY: &str = "strategy";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Collector 메트릭 ──────────────────────────────────────────────

/// Collector: 처리된 모듈 수 (counter)
pub const COLLECTOR_MODULES_PROCESSED_TOTAL: &str = "trellis_collector_modules_processed_total";

/// Collector: 필터 또는 해석 실패로 건너뛴 모듈 수 (counter, label: reason)
pub const COLLECTOR_MODULES_SKIPPED_TOTAL: &str = "trellis_collector_modules_skipped_total";

/// Collector: 매핑된 의존성 레코드 수 (counter)
pub const COLLECTOR_DEPENDENCIES_MAPPED_TOTAL: &str =
    "trellis_collector_dependencies_mapped_total";

/// Collector: 콘텐츠 해시 계산 실패 수 (counter)
pub const COLLECTOR_HASH_FAILURES_TOTAL: &str = "trellis_collector_hash_failures_total";

/// Collector: 의존성 그래프 해석 실패 수 (counter)
pub const COLLECTOR_RESOLUTION_FAILURES_TOTAL: &str =
    "trellis_collector_resolution_failures_total";

/// Collector: 의존성이 없어 제외된 프로젝트 수 (counter)
pub const COLLECTOR_EMPTY_PROJECTS_DROPPED_TOTAL: &str =
    "trellis_collector_empty_projects_dropped_total";

/// Collector: 한 번의 수집 소요 시간 (histogram, 초, label: strategy)
pub const COLLECTOR_COLLECTION_DURATION_SECONDS: &str =
    "trellis_collector_collection_duration_seconds";

// ─── Report 메트릭 ──────────────────────────────────────────────────

/// Report: 전달된 업데이트 요청 수 (counter, label: result)
pub const REPORT_REQUESTS_TOTAL: &str = "trellis_report_requests_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 수집 소요 시간 히스토그램 버킷 (초)
///
/// 10ms ~ 120s 범위 (대형 reactor는 아티팩트 해시 I/O 포함)
pub const COLLECTION_DURATION_BUCKETS: [f64; 9] = [0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 120.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더가 설치된 뒤 한 번만 호출하면 됩니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Collector
    describe_counter!(
        COLLECTOR_MODULES_PROCESSED_TOTAL,
        "Total number of reactor modules accepted and mapped"
    );
    describe_counter!(
        COLLECTOR_MODULES_SKIPPED_TOTAL,
        "Total number of reactor modules skipped, by reason"
    );
    describe_counter!(
        COLLECTOR_DEPENDENCIES_MAPPED_TOTAL,
        "Total number of dependency records produced by the graph walk"
    );
    describe_counter!(
        COLLECTOR_HASH_FAILURES_TOTAL,
        "Total number of artifact files that could not be hashed"
    );
    describe_counter!(
        COLLECTOR_RESOLUTION_FAILURES_TOTAL,
        "Total number of module dependency graph resolution failures"
    );
    describe_counter!(
        COLLECTOR_EMPTY_PROJECTS_DROPPED_TOTAL,
        "Total number of projects dropped because they had no dependencies"
    );
    describe_histogram!(
        COLLECTOR_COLLECTION_DURATION_SECONDS,
        "Time to collect one reactor inventory in seconds"
    );

    // Report
    describe_counter!(
        REPORT_REQUESTS_TOTAL,
        "Total number of update requests handed to a reporter, by result"
    );
}
