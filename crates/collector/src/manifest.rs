//! reactor 매니페스트 -- 빌드 도구가 내보낸 JSON 문서로부터 모듈과 그래프 로딩
//!
//! [`ReactorManifest`]는 모듈 목록, 루트 모듈, 그리고 [`ManifestResolver`]를 제공합니다.
//! `ManifestResolver`는 [`DependencyGraphResolver`]를 구현하므로 수집기를
//! 빌드 도구 밖에서 구동할 수 있습니다.
//!
//! # 매니페스트 형식 예시
//!
//! ```json
//! {
//!   "root": "shop",
//!   "modules": [
//!     {
//!       "groupId": "com.acme", "artifactId": "shop", "version": "1.0", "packaging": "jar",
//!       "dependencies": [
//!         { "groupId": "org.slf4j", "artifactId": "slf4j-api", "version": "2.0.13",
//!           "scope": "compile", "extension": "jar", "file": "repo/slf4j-api-2.0.13.jar",
//!           "children": [] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! 상대 `file` 경로는 매니페스트가 있는 디렉토리를 기준으로 해석합니다.
//!
//! 트리 깊이는 JSON 파서의 재귀 한도가 아니라 [`MAX_MANIFEST_NESTING`]으로 제한되고,
//! 실제 깊이 한도는 수집기의 `max_graph_depth`가 적용합니다.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use trellis_core::config::MAX_GRAPH_DEPTH_LIMIT;

use crate::error::CollectorError;
use crate::mapper::{STACK_RED_ZONE, STACK_SEGMENT};
use crate::reactor::{ArtifactDescriptor, DependencyGraphResolver, Module, ResolvedNode};
use crate::types::{Coordinates, Exclusion};

/// 기본 매니페스트 파일 이름
pub const DEFAULT_MANIFEST_FILE: &str = "reactor.json";

/// 기본 최대 매니페스트 크기 (64 MiB)
pub const DEFAULT_MAX_MANIFEST_SIZE: u64 = 64 * 1024 * 1024;

/// 허용하는 최대 JSON 중첩 깊이
///
/// 의존성 노드 하나가 객체와 `children` 배열로 두 단계를 차지합니다.
pub const MAX_MANIFEST_NESTING: usize = 2 * MAX_GRAPH_DEPTH_LIMIT + 8;

/// 매니페스트 문서 (파싱용)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestFile {
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    modules: Vec<ManifestModule>,
}

/// 매니페스트 내 모듈 (파싱용)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestModule {
    group_id: String,
    artifact_id: String,
    version: String,
    #[serde(default = "default_packaging")]
    packaging: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parent: Option<Coordinates>,
    #[serde(default)]
    ignore: bool,
    #[serde(default)]
    resolution_error: Option<String>,
    #[serde(default)]
    dependencies: Vec<ManifestNode>,
}

/// 매니페스트 내 의존성 노드 (파싱용)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestNode {
    group_id: String,
    artifact_id: String,
    version: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    classifier: Option<String>,
    #[serde(default)]
    extension: Option<String>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default)]
    exclusions: Vec<Exclusion>,
    #[serde(default)]
    children: Vec<ManifestNode>,
}

fn default_packaging() -> String {
    "jar".to_owned()
}

/// 모듈별 해석 결과
#[derive(Debug, Clone)]
enum ModuleGraph {
    Resolved(ResolvedNode),
    Failed(String),
}

/// 매니페스트에 기록된 그래프를 돌려주는 해석기
#[derive(Debug, Clone, Default)]
pub struct ManifestResolver {
    graphs: HashMap<Coordinates, ModuleGraph>,
}

impl DependencyGraphResolver for ManifestResolver {
    fn resolve(&self, module: &Module) -> Result<ResolvedNode, CollectorError> {
        match self.graphs.get(&module.coordinates) {
            Some(ModuleGraph::Resolved(node)) => Ok(node.clone()),
            Some(ModuleGraph::Failed(reason)) => Err(CollectorError::GraphResolution {
                module: module.coordinates.to_string(),
                reason: reason.clone(),
            }),
            None => Err(CollectorError::GraphResolution {
                module: module.coordinates.to_string(),
                reason: "module is not declared in the reactor manifest".to_owned(),
            }),
        }
    }
}

/// 로딩된 reactor 매니페스트
#[derive(Debug, Clone)]
pub struct ReactorManifest {
    /// 선언 순서의 모듈 목록
    pub modules: Vec<Module>,
    /// 루트 모듈
    pub root: Module,
    /// 그래프 해석기
    pub resolver: ManifestResolver,
}

impl ReactorManifest {
    /// 파일에서 매니페스트를 로드합니다.
    ///
    /// # Errors
    ///
    /// - 파일 크기가 `max_size`를 넘으면 `ManifestTooBig`
    /// - 읽기 실패 시 `Io`, 형식 오류 시 `Manifest`
    pub fn load(path: &Path, max_size: u64) -> Result<Self, CollectorError> {
        let io_err = |e: std::io::Error| CollectorError::Io {
            path: path.display().to_string(),
            source: e,
        };

        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > max_size {
            return Err(CollectorError::ManifestTooBig {
                path: path.display().to_string(),
                size,
                max: max_size,
            });
        }

        let content = std::fs::read_to_string(path).map_err(io_err)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base_dir, &path.display().to_string())
    }

    /// JSON 문자열에서 매니페스트를 파싱합니다.
    ///
    /// 상대 파일 경로는 `base_dir` 기준으로 해석합니다.
    pub fn parse(content: &str, base_dir: &Path, source: &str) -> Result<Self, CollectorError> {
        let manifest_err = |reason: String| CollectorError::Manifest {
            path: source.to_owned(),
            reason,
        };

        if exceeds_nesting(content, MAX_MANIFEST_NESTING) {
            return Err(manifest_err(format!(
                "JSON nesting exceeds {MAX_MANIFEST_NESTING} levels"
            )));
        }
        let file = parse_document(content).map_err(|e| manifest_err(e.to_string()))?;

        if file.modules.is_empty() {
            return Err(manifest_err("manifest declares no modules".to_owned()));
        }

        let mut modules = Vec::with_capacity(file.modules.len());
        let mut graphs = HashMap::with_capacity(file.modules.len());

        for entry in file.modules {
            let coordinates = Coordinates::new(entry.group_id, entry.artifact_id, entry.version);
            if graphs.contains_key(&coordinates) {
                return Err(manifest_err(format!("duplicate module {coordinates}")));
            }

            let graph = match entry.resolution_error {
                Some(reason) => ModuleGraph::Failed(reason),
                None => {
                    let mut artifact = ArtifactDescriptor::new(coordinates.clone());
                    artifact.extension = Some(entry.packaging.clone());
                    let mut root = ResolvedNode::new(artifact);
                    root.children = entry
                        .dependencies
                        .into_iter()
                        .map(|n| into_resolved(n, base_dir))
                        .collect();
                    ModuleGraph::Resolved(root)
                }
            };
            graphs.insert(coordinates.clone(), graph);

            modules.push(Module {
                coordinates,
                packaging: entry.packaging,
                name: entry.name,
                parent: entry.parent,
                ignore: entry.ignore,
            });
        }

        let root = match file.root.as_deref() {
            Some(artifact_id) => modules
                .iter()
                .find(|m| m.coordinates.artifact_id == artifact_id)
                .cloned()
                .ok_or_else(|| manifest_err(format!("root module '{artifact_id}' not found")))?,
            None => modules[0].clone(),
        };

        debug!(
            source,
            modules = modules.len(),
            root = %root.coordinates,
            "reactor manifest loaded"
        );

        Ok(Self {
            modules,
            root,
            resolver: ManifestResolver { graphs },
        })
    }
}

/// 재귀 한도 없이 문서를 파싱합니다. 스택은 필요할 때 힙에서 확장됩니다.
fn parse_document(content: &str) -> Result<ManifestFile, serde_json::Error> {
    let mut json = serde_json::Deserializer::from_str(content);
    json.disable_recursion_limit();
    let file = ManifestFile::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(file)
}

/// 문자열 밖의 `{`/`[` 중첩이 `limit`을 넘는지 검사합니다.
fn exceeds_nesting(content: &str, limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in content.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    false
}

fn into_resolved(node: ManifestNode, base_dir: &Path) -> ResolvedNode {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || convert_node(node, base_dir))
}

fn convert_node(node: ManifestNode, base_dir: &Path) -> ResolvedNode {
    let file = node.file.map(|f| if f.is_relative() { base_dir.join(f) } else { f });
    ResolvedNode {
        artifact: ArtifactDescriptor {
            coordinates: Coordinates::new(node.group_id, node.artifact_id, node.version),
            classifier: node.classifier,
            extension: node.extension,
            file,
        },
        scope: node.scope,
        optional: node.optional,
        exclusions: node.exclusions,
        children: node
            .children
            .into_iter()
            .map(|c| into_resolved(c, base_dir))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "root": "shop",
        "modules": [
            { "groupId": "com.acme", "artifactId": "shop-parent", "version": "1.0", "packaging": "pom" },
            {
                "groupId": "com.acme", "artifactId": "shop", "version": "1.0",
                "name": "Shop",
                "parent": { "groupId": "com.acme", "artifactId": "shop-parent", "version": "1.0" },
                "dependencies": [
                    {
                        "groupId": "org.slf4j", "artifactId": "slf4j-api", "version": "2.0.13",
                        "scope": "compile", "extension": "jar", "file": "repo/slf4j-api.jar",
                        "exclusions": [ { "groupId": "log4j", "artifactId": "log4j" } ],
                        "children": [
                            { "groupId": "org.lib", "artifactId": "deep", "version": "1.0",
                              "file": "/abs/deep.jar" }
                        ]
                    }
                ]
            },
            { "groupId": "com.acme", "artifactId": "shop-broken", "version": "1.0",
              "resolutionError": "could not find artifact org.gone:gone:1.0" }
        ]
    }"#;

    fn sample() -> ReactorManifest {
        ReactorManifest::parse(SAMPLE, Path::new("/work"), "reactor.json").unwrap()
    }

    #[test]
    fn parses_modules_in_order() {
        let manifest = sample();
        let ids: Vec<&str> = manifest
            .modules
            .iter()
            .map(|m| m.coordinates.artifact_id.as_str())
            .collect();
        assert_eq!(ids, vec!["shop-parent", "shop", "shop-broken"]);
        assert!(manifest.modules[0].is_pom());
        assert_eq!(manifest.modules[1].packaging, "jar");
        assert_eq!(manifest.modules[1].display_name(), "Shop");
        assert_eq!(
            manifest.modules[1].parent.as_ref().map(|p| p.artifact_id.as_str()),
            Some("shop-parent")
        );
    }

    #[test]
    fn root_selected_by_name() {
        assert_eq!(sample().root.coordinates.artifact_id, "shop");
    }

    #[test]
    fn root_defaults_to_first_module() {
        let manifest = ReactorManifest::parse(
            r#"{ "modules": [ { "groupId": "g", "artifactId": "first", "version": "1" },
                              { "groupId": "g", "artifactId": "second", "version": "1" } ] }"#,
            Path::new("."),
            "inline",
        )
        .unwrap();
        assert_eq!(manifest.root.coordinates.artifact_id, "first");
    }

    #[test]
    fn unknown_root_is_an_error() {
        let err = ReactorManifest::parse(
            r#"{ "root": "ghost", "modules": [ { "groupId": "g", "artifactId": "a", "version": "1" } ] }"#,
            Path::new("."),
            "inline",
        )
        .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn empty_and_malformed_manifests_are_errors() {
        let empty = ReactorManifest::parse(r#"{ "modules": [] }"#, Path::new("."), "inline");
        assert!(matches!(empty, Err(CollectorError::Manifest { .. })));

        let malformed = ReactorManifest::parse("{ not json", Path::new("."), "inline");
        assert!(matches!(malformed, Err(CollectorError::Manifest { .. })));
    }

    #[test]
    fn duplicate_modules_are_rejected() {
        let err = ReactorManifest::parse(
            r#"{ "modules": [ { "groupId": "g", "artifactId": "a", "version": "1" },
                              { "groupId": "g", "artifactId": "a", "version": "1" } ] }"#,
            Path::new("."),
            "inline",
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn resolver_returns_graph_with_resolved_paths() {
        let manifest = sample();
        let root = manifest.resolver.resolve(&manifest.modules[1]).unwrap();
        assert_eq!(root.artifact.extension.as_deref(), Some("jar"));
        assert_eq!(root.children.len(), 1);

        let slf4j = &root.children[0];
        assert_eq!(slf4j.scope.as_deref(), Some("compile"));
        assert_eq!(slf4j.exclusions.len(), 1);
        assert_eq!(
            slf4j.artifact.file.as_deref(),
            Some(Path::new("/work/repo/slf4j-api.jar"))
        );
        assert_eq!(
            slf4j.children[0].artifact.file.as_deref(),
            Some(Path::new("/abs/deep.jar"))
        );
    }

    #[test]
    fn resolver_reports_declared_failure() {
        let manifest = sample();
        let err = manifest.resolver.resolve(&manifest.modules[2]).unwrap_err();
        match err {
            CollectorError::GraphResolution { module, reason } => {
                assert_eq!(module, "com.acme:shop-broken:1.0");
                assert!(reason.contains("org.gone"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolver_rejects_unknown_module() {
        let manifest = sample();
        let stranger = Module::new(Coordinates::new("x", "y", "z"));
        assert!(manifest.resolver.resolve(&stranger).is_err());
    }

    /// `depth`개 노드가 한 줄로 이어진 의존성 체인을 가진 매니페스트
    fn chain_manifest(depth: usize) -> String {
        let mut node =
            r#"{ "groupId": "org.lib", "artifactId": "leaf", "version": "1.0" }"#.to_owned();
        for level in (1..depth).rev() {
            node = format!(
                r#"{{ "groupId": "org.lib", "artifactId": "lib-{level}", "version": "1.0", "children": [{node}] }}"#
            );
        }
        format!(
            r#"{{ "modules": [ {{ "groupId": "com.acme", "artifactId": "app", "version": "1.0", "dependencies": [{node}] }} ] }}"#
        )
    }

    fn chain_length(root: &ResolvedNode) -> usize {
        let mut length = 0;
        let mut current = root.children.first();
        while let Some(node) = current {
            length += 1;
            current = node.children.first();
        }
        length
    }

    #[test]
    fn deep_dependency_chain_parses() {
        for depth in [100, 500] {
            let manifest = ReactorManifest::parse(&chain_manifest(depth), Path::new("."), "inline")
                .unwrap_or_else(|e| panic!("depth {depth}: {e}"));
            let root = manifest.resolver.resolve(&manifest.root).unwrap();
            assert_eq!(chain_length(&root), depth);
        }
    }

    #[test]
    fn excessive_nesting_is_rejected() {
        let content = format!(
            r#"{{ "modules": {}{} }}"#,
            "[".repeat(MAX_MANIFEST_NESTING + 1),
            "]".repeat(MAX_MANIFEST_NESTING + 1)
        );
        let err = ReactorManifest::parse(&content, Path::new("."), "inline").unwrap_err();
        assert!(matches!(err, CollectorError::Manifest { .. }));
        assert!(err.to_string().contains("nesting"));
    }

    #[test]
    fn brackets_inside_strings_do_not_count_as_nesting() {
        let name = format!("[{{\\\"{}", "[".repeat(20));
        let content = format!(
            r#"{{ "modules": [ {{ "groupId": "g", "artifactId": "a", "version": "1", "name": "{name}" }} ] }}"#
        );
        assert!(!exceeds_nesting(&content, 4));
        let manifest = ReactorManifest::parse(&content, Path::new("."), "inline").unwrap();
        assert!(manifest.modules[0].name.as_deref().unwrap().ends_with("[[["));
    }

    #[test]
    fn load_rejects_oversized_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reactor.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let err = ReactorManifest::load(&path, 16).unwrap_err();
        assert!(matches!(err, CollectorError::ManifestTooBig { .. }));
        assert!(ReactorManifest::load(&path, DEFAULT_MAX_MANIFEST_SIZE).is_ok());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = ReactorManifest::load(Path::new("/nonexistent/reactor.json"), 1024).unwrap_err();
        assert!(matches!(err, CollectorError::Io { .. }));
    }
}
