//! 업데이트 요청 조립 및 전달
//!
//! [`UpdateRequest`]는 최종 인벤토리를 리포팅 서비스로 넘기기 위한 봉투입니다.
//! [`InventoryReporter`] trait이 전달 경계이며, 기본 구현인 [`OfflineRequestWriter`]는
//! 요청을 `update-request.json` 파일로 기록합니다.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::info;
use trellis_core::metrics as m;

use crate::error::CollectorError;
use crate::types::{AggregateInventory, AggregationStrategy};

/// 요청을 생성한 에이전트 이름
pub const AGENT_NAME: &str = "trellis-collector";

/// 에이전트 버전
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 오프라인 업데이트 요청 파일 이름
pub const UPDATE_REQUEST_FILE: &str = "update-request.json";

/// 인벤토리 업데이트 요청
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// 요청 ID (UUID v4)
    pub request_id: String,
    /// 에이전트 이름
    pub agent: String,
    /// 에이전트 버전
    pub agent_version: String,
    /// 조직 토큰
    pub org_token: String,
    /// 사용자 키
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_key: Option<String>,
    /// 제품 이름
    pub product: String,
    /// 제품 버전
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_version: Option<String>,
    /// 요청자 이메일
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_email: Option<String>,
    /// 정책 위반과 관계없이 갱신
    pub force_update: bool,
    /// 전체 의존성 정책 검사
    pub force_check_all_dependencies: bool,
    /// 생성 시각 (epoch 밀리초)
    pub timestamp: u64,
    /// 인벤토리
    pub inventory: AggregateInventory,
}

impl UpdateRequest {
    /// 새 요청 ID와 현재 시각으로 요청을 생성합니다.
    pub fn new(
        org_token: impl Into<String>,
        product: impl Into<String>,
        inventory: AggregateInventory,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            agent: AGENT_NAME.to_owned(),
            agent_version: AGENT_VERSION.to_owned(),
            org_token: org_token.into(),
            user_key: None,
            product: product.into(),
            product_version: None,
            requester_email: None,
            force_update: false,
            force_check_all_dependencies: false,
            timestamp,
            inventory,
        }
    }

    /// 사용자 키
    pub fn with_user_key(mut self, user_key: Option<String>) -> Self {
        self.user_key = user_key;
        self
    }

    /// 제품 버전
    pub fn with_product_version(mut self, version: Option<String>) -> Self {
        self.product_version = version;
        self
    }

    /// 요청자 이메일
    pub fn with_requester_email(mut self, email: Option<String>) -> Self {
        self.requester_email = email;
        self
    }

    /// 강제 갱신 플래그
    pub fn with_force_update(mut self, force: bool) -> Self {
        self.force_update = force;
        self
    }

    /// 전체 의존성 검사 플래그
    pub fn with_force_check_all_dependencies(mut self, force: bool) -> Self {
        self.force_check_all_dependencies = force;
        self
    }
}

/// 업데이트 요청 전달자
pub trait InventoryReporter {
    /// 요청을 전달합니다.
    fn report(&self, request: &UpdateRequest) -> Result<(), CollectorError>;
}

/// 요청을 JSON 파일로 기록하는 오프라인 전달자
#[derive(Debug, Clone)]
pub struct OfflineRequestWriter {
    output_dir: PathBuf,
}

impl OfflineRequestWriter {
    /// 출력 디렉토리를 지정하여 생성합니다.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 출력 디렉토리
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 요청 파일 경로
    pub fn request_path(&self) -> PathBuf {
        self.output_dir.join(UPDATE_REQUEST_FILE)
    }

    fn write(&self, request: &UpdateRequest) -> Result<PathBuf, CollectorError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| CollectorError::Io {
            path: self.output_dir.display().to_string(),
            source: e,
        })?;

        let json = serde_json::to_string_pretty(request)
            .map_err(|e| CollectorError::Report(format!("failed to serialize request: {e}")))?;

        let path = self.request_path();
        std::fs::write(&path, json).map_err(|e| CollectorError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(path)
    }
}

impl InventoryReporter for OfflineRequestWriter {
    fn report(&self, request: &UpdateRequest) -> Result<(), CollectorError> {
        match self.write(request) {
            Ok(path) => {
                metrics::counter!(m::REPORT_REQUESTS_TOTAL, m::LABEL_RESULT => "success")
                    .increment(1);
                info!(
                    path = %path.display(),
                    request_id = %request.request_id,
                    projects = request.inventory.project_count(),
                    "update request written"
                );
                Ok(())
            }
            Err(e) => {
                metrics::counter!(m::REPORT_REQUESTS_TOTAL, m::LABEL_RESULT => "failure")
                    .increment(1);
                Err(e)
            }
        }
    }
}

/// 프로젝트별 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    /// 프로젝트 좌표 (`group:artifact:version`)
    pub coordinates: String,
    /// 프로젝트 토큰 존재 여부
    pub has_token: bool,
    /// 최상위 의존성 수
    pub top_level_dependencies: usize,
    /// 전체 의존성 수
    pub total_dependencies: usize,
    /// 해시가 계산된 의존성 수
    pub hashed_dependencies: usize,
}

/// 인벤토리 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    /// 집계 전략
    pub strategy: AggregationStrategy,
    /// 프로젝트별 요약
    pub projects: Vec<ProjectSummary>,
}

impl InventorySummary {
    /// 인벤토리에서 요약을 계산합니다.
    pub fn from_inventory(inventory: &AggregateInventory) -> Self {
        let projects = inventory
            .projects
            .iter()
            .map(|p| ProjectSummary {
                coordinates: p.coordinates.to_string(),
                has_token: p.project_token.is_some(),
                top_level_dependencies: p.dependencies.len(),
                total_dependencies: p.total_dependencies(),
                hashed_dependencies: p.dependencies.iter().map(|d| d.hashed_count()).sum(),
            })
            .collect();

        Self {
            strategy: inventory.strategy,
            projects,
        }
    }

    /// 전체 의존성 수 합계
    pub fn total_dependencies(&self) -> usize {
        self.projects.iter().map(|p| p.total_dependencies).sum()
    }

    /// 해시가 없는 의존성 수 합계
    pub fn unhashed_dependencies(&self) -> usize {
        self.projects
            .iter()
            .map(|p| p.total_dependencies - p.hashed_dependencies)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, DependencyRecord, ProjectRecord};

    fn inventory() -> AggregateInventory {
        let mut x = DependencyRecord::new(Coordinates::new("org.lib", "x", "1.0"));
        x.sha1 = Some("abc".to_owned());
        x.children
            .push(DependencyRecord::new(Coordinates::new("org.lib", "z", "1.0")));
        let mut project = ProjectRecord::new(Coordinates::new("com.acme", "app", "1.0"));
        project.project_token = Some("token".to_owned());
        project.dependencies.push(x);

        AggregateInventory {
            strategy: AggregationStrategy::None,
            projects: vec![
                project,
                ProjectRecord::new(Coordinates::new("com.acme", "empty", "1.0")),
            ],
        }
    }

    #[test]
    fn request_has_unique_id_and_agent_info() {
        let a = UpdateRequest::new("org", "shop", inventory());
        let b = UpdateRequest::new("org", "shop", inventory());
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.agent, AGENT_NAME);
        assert!(a.timestamp > 0);
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = UpdateRequest::new("org", "shop", inventory())
            .with_product_version(Some("2.0".to_owned()))
            .with_force_check_all_dependencies(true);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["orgToken"], "org");
        assert_eq!(json["productVersion"], "2.0");
        assert_eq!(json["forceCheckAllDependencies"], true);
        assert!(json.get("userKey").is_none());
        assert_eq!(json["inventory"]["strategy"], "none");
        assert_eq!(
            json["inventory"]["projects"][0]["dependencies"][0]["artifactId"],
            "x"
        );
    }

    #[test]
    fn offline_writer_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OfflineRequestWriter::new(dir.path().join("nested").join("out"));
        let request = UpdateRequest::new("org", "shop", inventory()).with_force_update(true);

        writer.report(&request).unwrap();

        let content = std::fs::read_to_string(writer.request_path()).unwrap();
        let parsed: UpdateRequest = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn offline_writer_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        // 디렉토리 자리에 파일이 있으면 생성 실패
        let blocker = dir.path().join("out");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let writer = OfflineRequestWriter::new(blocker.clone());
        let err = writer
            .report(&UpdateRequest::new("org", "shop", inventory()))
            .unwrap_err();
        assert!(matches!(err, CollectorError::Io { .. }));
    }

    #[test]
    fn summary_counts() {
        let summary = InventorySummary::from_inventory(&inventory());
        assert_eq!(summary.projects.len(), 2);
        let app = &summary.projects[0];
        assert_eq!(app.coordinates, "com.acme:app:1.0");
        assert!(app.has_token);
        assert_eq!(app.top_level_dependencies, 1);
        assert_eq!(app.total_dependencies, 2);
        assert_eq!(app.hashed_dependencies, 1);
        assert_eq!(summary.total_dependencies(), 2);
        assert_eq!(summary.unhashed_dependencies(), 1);
    }
}
