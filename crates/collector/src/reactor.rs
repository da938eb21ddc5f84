//! 빌드 도구 협력자 인터페이스 -- reactor 모듈과 해석된 의존성 그래프
//!
//! [`DependencyGraphResolver`] trait은 빌드 도구가 모듈의 의존성 그래프를
//! 해석해 주는 지점입니다. 수집기는 이 trait만 알고, 실제 해석 방식은
//! 구현체([`ManifestResolver`](crate::manifest::ManifestResolver) 등)가 결정합니다.

use std::path::PathBuf;

use crate::error::CollectorError;
use crate::types::{Coordinates, Exclusion};

/// 부모 집계용(packaging-only) 모듈의 packaging 값
pub const POM_PACKAGING: &str = "pom";

/// reactor 내 빌드 모듈 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// 모듈 좌표
    pub coordinates: Coordinates,
    /// packaging 유형 (jar, war, pom 등)
    pub packaging: String,
    /// 표시용 이름
    pub name: Option<String>,
    /// 부모 모듈 좌표
    pub parent: Option<Coordinates>,
    /// 모듈 스스로 선언한 무시 여부 (루트 모듈에만 적용)
    pub ignore: bool,
}

impl Module {
    /// 기본값(jar packaging, 부모 없음)으로 모듈을 생성합니다.
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            packaging: "jar".to_owned(),
            name: None,
            parent: None,
            ignore: false,
        }
    }

    /// packaging-only 모듈인지 확인합니다.
    pub fn is_pom(&self) -> bool {
        self.packaging == POM_PACKAGING
    }

    /// 표시용 이름 (없으면 artifactId)
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.coordinates.artifact_id)
    }
}

/// 해석된 아티팩트 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// 아티팩트 좌표
    pub coordinates: Coordinates,
    /// classifier
    pub classifier: Option<String>,
    /// 확장자 (jar, pom 등)
    pub extension: Option<String>,
    /// 로컬 저장소의 파일 경로 (메타데이터만 해석된 경우 없음)
    pub file: Option<PathBuf>,
}

impl ArtifactDescriptor {
    /// 좌표만 가진 아티팩트를 생성합니다.
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            classifier: None,
            extension: None,
            file: None,
        }
    }
}

/// 빌드 도구가 해석한 의존성 트리 노드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    /// 아티팩트
    pub artifact: ArtifactDescriptor,
    /// 간선 scope
    pub scope: Option<String>,
    /// optional 여부
    pub optional: bool,
    /// 제외 규칙
    pub exclusions: Vec<Exclusion>,
    /// 자식 노드 (해석 순서)
    pub children: Vec<ResolvedNode>,
}

impl ResolvedNode {
    /// 자식이 없는 노드를 생성합니다.
    pub fn new(artifact: ArtifactDescriptor) -> Self {
        Self {
            artifact,
            scope: None,
            optional: false,
            exclusions: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// 모듈 의존성 그래프 해석기
///
/// 반환되는 루트 노드는 모듈 자신을 나타내며, 그 자식이 최상위 의존성입니다.
/// 해석 실패는 [`CollectorError::GraphResolution`]으로 반환해야 합니다.
pub trait DependencyGraphResolver: Send + Sync {
    /// 모듈의 의존성 그래프 루트를 해석합니다.
    fn resolve(&self, module: &Module) -> Result<ResolvedNode, CollectorError>;
}
