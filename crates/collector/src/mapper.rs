//! 의존성 노드 매퍼 -- 해석된 트리 노드를 [`DependencyRecord`]로 변환
//!
//! 후위 깊이 우선 순회로 자식을 모두 변환한 뒤 부모 레코드를 완성합니다.
//! 입력은 이미 펼쳐진 트리이므로 같은 아티팩트가 조상 경로에 다시 나와도
//! 그대로 기록합니다. 트리가 `max_depth`를 넘으면 순환으로 간주하고
//! [`CollectorError::CyclicGraph`]로 실패합니다.

use crate::error::CollectorError;
use crate::identity;
use crate::reactor::ResolvedNode;
use crate::types::DependencyRecord;

/// 기본 최대 트리 깊이
pub const DEFAULT_MAX_GRAPH_DEPTH: usize = 500;

/// 남은 스택이 이보다 적으면 재귀 전에 새 세그먼트를 할당
pub(crate) const STACK_RED_ZONE: usize = 64 * 1024;
/// 새로 할당하는 스택 세그먼트 크기
pub(crate) const STACK_SEGMENT: usize = 1024 * 1024;

/// 의존성 노드 매퍼
#[derive(Debug, Clone)]
pub struct DependencyMapper {
    max_depth: usize,
}

impl DependencyMapper {
    /// 최대 트리 깊이를 지정하여 매퍼를 생성합니다.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// 최대 트리 깊이
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// 노드와 모든 하위 노드를 레코드로 변환합니다.
    ///
    /// # Errors
    ///
    /// - 깊이가 `max_depth`를 넘으면 `CyclicGraph`
    pub fn map(&self, node: &ResolvedNode) -> Result<DependencyRecord, CollectorError> {
        self.map_node(node, 0)
    }

    fn map_node(
        &self,
        node: &ResolvedNode,
        depth: usize,
    ) -> Result<DependencyRecord, CollectorError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.map_one(node, depth))
    }

    fn map_one(
        &self,
        node: &ResolvedNode,
        depth: usize,
    ) -> Result<DependencyRecord, CollectorError> {
        let artifact = &node.artifact;

        if depth >= self.max_depth {
            return Err(CollectorError::CyclicGraph {
                artifact: artifact.coordinates.to_string(),
                reason: format!("dependency tree exceeds max depth {}", self.max_depth),
            });
        }

        let identity = identity::resolve_identity(artifact);

        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            children.push(self.map_node(child, depth + 1)?);
        }

        Ok(DependencyRecord {
            coordinates: artifact.coordinates.clone(),
            scope: node.scope.clone(),
            classifier: artifact.classifier.clone(),
            extension: artifact.extension.clone(),
            optional: node.optional,
            sha1: identity.sha1,
            system_path: identity.system_path,
            filename: identity.filename,
            exclusions: node.exclusions.clone(),
            children,
        })
    }
}

impl Default for DependencyMapper {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_GRAPH_DEPTH)
    }
}
