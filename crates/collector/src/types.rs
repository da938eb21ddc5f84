//! 도메인 타입 -- 수집 결과 데이터 구조
//!
//! 좌표, 의존성 레코드, 프로젝트 레코드, 집계 인벤토리 등 수집기의
//! 핵심 타입을 정의합니다. 모든 타입은 JSON 직렬화 시 camelCase 필드명을 사용합니다.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// `group:artifact:version` 좌표
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// 그룹 ID
    pub group_id: String,
    /// 아티팩트 ID
    pub artifact_id: String,
    /// 버전
    pub version: String,
}

impl Coordinates {
    /// 새 좌표를 생성합니다.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// 의존성 제외 규칙 (버전 없는 groupId + artifactId 쌍)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    /// 그룹 ID
    pub group_id: String,
    /// 아티팩트 ID
    pub artifact_id: String,
}

/// 해석된 의존성 트리의 한 간선
///
/// 자식 레코드가 모두 완성된 뒤에 부모가 완성됩니다 (후위 순회 구성).
/// 생성 후에는 집계 단계의 평탄화를 제외하고 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    /// 의존성 좌표
    #[serde(flatten)]
    pub coordinates: Coordinates,
    /// 의존성 scope (compile, runtime, test 등)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// classifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// 아티팩트 확장자 (jar, war, pom 등)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// optional 의존성 여부
    #[serde(default)]
    pub optional: bool,
    /// 콘텐츠 SHA-1 (소문자 hex). 파일이 없거나 읽을 수 없으면 `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    /// 로컬 파일 절대 경로
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_path: Option<PathBuf>,
    /// 표시용 파일 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// 제외 규칙
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Exclusion>,
    /// 자식 의존성 (해석 순서 유지)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DependencyRecord>,
}

impl DependencyRecord {
    /// 좌표만 가진 레코드를 생성합니다.
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            scope: None,
            classifier: None,
            extension: None,
            optional: false,
            sha1: None,
            system_path: None,
            filename: None,
            exclusions: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 자신과 모든 하위 레코드의 수를 반환합니다.
    pub fn total_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(record) = stack.pop() {
            count += 1;
            stack.extend(record.children.iter());
        }
        count
    }

    /// 자신과 모든 하위 레코드 중 해시가 있는 레코드 수를 반환합니다.
    pub fn hashed_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(record) = stack.pop() {
            if record.sha1.is_some() {
                count += 1;
            }
            stack.extend(record.children.iter());
        }
        count
    }
}

impl fmt::Display for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.coordinates,
            self.scope.as_deref().unwrap_or("")
        )
    }
}

/// 빌드 가능한 모듈 하나의 수집 결과
///
/// 모듈 필터를 통과한 모듈에 대해서만 생성되며, 의존성이 없어도 생성됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// 모듈 좌표
    pub coordinates: Coordinates,
    /// 부모 모듈 좌표
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_coordinates: Option<Coordinates>,
    /// 프로젝트 토큰
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_token: Option<String>,
    /// 최상위 의존성 목록
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
}

impl ProjectRecord {
    /// 의존성이 없는 프로젝트 레코드를 생성합니다.
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            parent_coordinates: None,
            project_token: None,
            dependencies: Vec::new(),
        }
    }

    /// 모든 깊이의 의존성 레코드 수를 반환합니다.
    pub fn total_dependencies(&self) -> usize {
        self.dependencies.iter().map(DependencyRecord::total_count).sum()
    }

    /// 의존성이 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

impl fmt::Display for ProjectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProjectRecord({}, {} dependencies)",
            self.coordinates,
            self.dependencies.len()
        )
    }
}

/// 모듈 집계 전략
///
/// 실행당 하나만 선택되며 순회 시작 전에 결정됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// 집계하지 않음 (모듈마다 프로젝트 하나)
    #[default]
    None,
    /// 모든 모듈의 의존성을 평탄화하여 하나의 프로젝트로 집계
    Flat,
    /// 모듈을 가상 아티팩트로 두고 하나의 프로젝트로 집계
    ModulePreserving,
}

impl AggregationStrategy {
    /// 메트릭 레이블 및 로그용 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Flat => "flat",
            Self::ModulePreserving => "module_preserving",
        }
    }
}

impl fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 집계 결과 인벤토리
///
/// 집계 전략에서는 `projects`가 정확히 하나의 합성 프로젝트를 가집니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateInventory {
    /// 적용된 집계 전략
    pub strategy: AggregationStrategy,
    /// 프로젝트 목록
    pub projects: Vec<ProjectRecord>,
}

impl AggregateInventory {
    /// 프로젝트 수를 반환합니다.
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// 모든 프로젝트의 전체 의존성 레코드 수를 반환합니다.
    pub fn dependency_count(&self) -> usize {
        self.projects.iter().map(ProjectRecord::total_dependencies).sum()
    }
}
