//! 집계 엔진 -- 여러 [`ProjectRecord`]를 하나의 인벤토리로 병합
//!
//! # 전략
//!
//! - **None**: 프로젝트 목록을 그대로 반환
//! - **Flat**: 모든 모듈의 최상위 의존성을 전위 순서로 평탄화하여 하나의 합성 프로젝트로 병합
//! - **ModulePreserving**: 각 모듈을 합성 프로젝트의 직접 의존성(가상 아티팩트)으로 두고,
//!   모듈의 원래 의존성을 그 자식으로 유지
//!
//! # 합성 프로젝트 이름
//!
//! 명시적 집계 이름 > `{rootArtifactId}-{rootVersion}` (집계 토큰이 있으면 이름은 식별에 쓰이지 않음).
//! 합성 프로젝트는 루트 모듈의 groupId와 버전을 사용하고 부모가 없습니다.

use crate::reactor::Module;
use crate::types::{AggregateInventory, AggregationStrategy, Coordinates, DependencyRecord, ProjectRecord};

/// 집계 엔진
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    strategy: AggregationStrategy,
    project_name: Option<String>,
    project_token: Option<String>,
}

impl Aggregator {
    /// 전략과 집계 프로젝트 이름/토큰으로 생성합니다.
    pub fn new(
        strategy: AggregationStrategy,
        project_name: Option<String>,
        project_token: Option<String>,
    ) -> Self {
        Self {
            strategy,
            project_name,
            project_token,
        }
    }

    /// 적용할 전략
    pub fn strategy(&self) -> AggregationStrategy {
        self.strategy
    }

    /// 프로젝트 목록을 소비하여 인벤토리를 생성합니다.
    pub fn aggregate(&self, projects: Vec<ProjectRecord>, root: &Module) -> AggregateInventory {
        let projects = match self.strategy {
            AggregationStrategy::None => projects,
            AggregationStrategy::Flat => {
                let mut synthetic = self.synthetic_project(root);
                let top_level = projects.into_iter().flat_map(|p| p.dependencies).collect();
                synthetic.dependencies = flatten(top_level);
                vec![synthetic]
            }
            AggregationStrategy::ModulePreserving => {
                let mut synthetic = self.synthetic_project(root);
                synthetic.dependencies = projects.into_iter().map(module_as_artifact).collect();
                vec![synthetic]
            }
        };

        AggregateInventory {
            strategy: self.strategy,
            projects,
        }
    }

    /// 합성 프로젝트의 좌표를 결정합니다.
    ///
    /// 이름이 없으면 토큰 유무와 관계없이 루트 모듈의 `artifactId-version`을 씁니다.
    /// 토큰이 있으면 서버는 이름 대신 토큰으로 프로젝트를 찾습니다.
    pub fn synthetic_coordinates(&self, root: &Module) -> Coordinates {
        let root_coords = &root.coordinates;
        let artifact_id = match &self.project_name {
            Some(name) => name.clone(),
            None => format!("{}-{}", root_coords.artifact_id, root_coords.version),
        };
        Coordinates::new(
            root_coords.group_id.clone(),
            artifact_id,
            root_coords.version.clone(),
        )
    }

    fn synthetic_project(&self, root: &Module) -> ProjectRecord {
        ProjectRecord {
            coordinates: self.synthetic_coordinates(root),
            parent_coordinates: None,
            project_token: self.project_token.clone(),
            dependencies: Vec::new(),
        }
    }
}

/// 모듈을 가상 아티팩트 의존성으로 변환합니다.
fn module_as_artifact(project: ProjectRecord) -> DependencyRecord {
    let mut record = DependencyRecord::new(project.coordinates);
    record.children = project.dependencies;
    record
}

/// 레코드와 모든 하위 레코드를 전위 순서의 평탄한 목록으로 만듭니다.
///
/// 반환되는 레코드는 자식을 갖지 않으며 중복은 제거하지 않습니다.
/// 이미 평탄한 목록은 그대로 반환됩니다.
pub fn flatten(records: Vec<DependencyRecord>) -> Vec<DependencyRecord> {
    let mut flat = Vec::with_capacity(records.len());
    let mut stack: Vec<DependencyRecord> = records.into_iter().rev().collect();

    while let Some(mut record) = stack.pop() {
        let children = std::mem::take(&mut record.children);
        flat.push(record);
        stack.extend(children.into_iter().rev());
    }

    flat
}
