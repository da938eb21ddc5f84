//! 수집기 벤치마크
//!
//! 그래프 매핑, 평탄화, 모듈 패턴 매칭, 매니페스트 파싱 성능을 측정합니다.

use std::path::Path;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use trellis_collector::types::{Coordinates, DependencyRecord};
use trellis_collector::{
    ArtifactDescriptor, DependencyMapper, Module, ModuleFilter, ReactorManifest, ResolvedNode,
    flatten,
};

/// fan-out이 `width`, 깊이가 `depth`인 해석 트리 생성 (파일 없음)
fn generate_tree(width: usize, depth: usize) -> ResolvedNode {
    fn build(prefix: &str, width: usize, depth: usize) -> ResolvedNode {
        let mut node = ResolvedNode::new(ArtifactDescriptor::new(Coordinates::new(
            "org.bench",
            prefix,
            "1.0",
        )));
        node.scope = Some("compile".to_owned());
        if depth > 0 {
            node.children = (0..width)
                .map(|i| build(&format!("{prefix}-{i}"), width, depth - 1))
                .collect();
        }
        node
    }
    build("root", width, depth)
}

fn count_nodes(node: &ResolvedNode) -> u64 {
    1 + node.children.iter().map(count_nodes).sum::<u64>()
}

/// 깊이 `depth`의 단일 체인 레코드
fn generate_chain(depth: usize) -> DependencyRecord {
    let mut chain = DependencyRecord::new(Coordinates::new("org.bench", "leaf", "1.0"));
    for i in 0..depth {
        let mut parent =
            DependencyRecord::new(Coordinates::new("org.bench", format!("n{i}"), "1.0"));
        parent.children.push(chain);
        chain = parent;
    }
    chain
}

/// 모듈 `count`개, 모듈당 의존성 10개인 매니페스트 JSON
fn generate_manifest(count: usize) -> String {
    let modules: Vec<String> = (0..count)
        .map(|i| {
            let deps: Vec<String> = (0..10)
                .map(|d| {
                    format!(
                        r#"{{ "groupId": "org.lib", "artifactId": "lib-{d}", "version": "1.{i}",
                             "scope": "compile", "extension": "jar" }}"#
                    )
                })
                .collect();
            format!(
                r#"{{ "groupId": "com.acme", "artifactId": "module-{i}", "version": "1.0",
                     "dependencies": [{}] }}"#,
                deps.join(",")
            )
        })
        .collect();
    format!(r#"{{ "modules": [{}] }}"#, modules.join(","))
}

fn bench_graph_mapping(c: &mut Criterion) {
    let mapper = DependencyMapper::default();
    let mut group = c.benchmark_group("graph_mapping");

    for (width, depth) in [(4, 3), (8, 3), (4, 5)] {
        let tree = generate_tree(width, depth);
        let nodes = count_nodes(&tree);
        group.throughput(Throughput::Elements(nodes));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("w{width}_d{depth}")),
            &tree,
            |b, tree| b.iter(|| mapper.map(black_box(tree)).unwrap()),
        );
    }

    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let mapper = DependencyMapper::default();
    let wide = mapper.map(&generate_tree(8, 3)).unwrap().children;
    let chain = generate_chain(1_000);

    let mut group = c.benchmark_group("flatten");

    let wide_count: usize = wide.iter().map(DependencyRecord::total_count).sum();
    group.throughput(Throughput::Elements(wide_count as u64));
    group.bench_function("wide_tree", |b| b.iter(|| flatten(black_box(wide.clone()))));

    // 깊은 체인 (재귀 없이 처리)
    group.throughput(Throughput::Elements(1_001));
    group.bench_function("deep_chain_1000", |b| {
        b.iter(|| flatten(black_box(vec![chain.clone()])))
    });

    group.finish();
}

fn bench_module_filter(c: &mut Criterion) {
    let filter = ModuleFilter::new(
        true,
        &["shop-*".to_owned(), "*-api".to_owned()],
        &["*-test*".to_owned(), "legacy-*-impl".to_owned()],
    )
    .unwrap();

    let modules: Vec<Module> = (0..100)
        .map(|i| {
            let name = match i % 4 {
                0 => format!("shop-core-{i}"),
                1 => format!("billing-{i}-api"),
                2 => format!("legacy-{i}-impl"),
                _ => format!("shop-{i}-test-utils"),
            };
            Module::new(Coordinates::new("com.acme", name, "1.0"))
        })
        .collect();

    let mut group = c.benchmark_group("module_filter");
    group.throughput(Throughput::Elements(modules.len() as u64));
    group.bench_function("decide_100_modules", |b| {
        b.iter(|| {
            modules
                .iter()
                .filter(|m| filter.should_process_module(black_box(m), false))
                .count()
        })
    });
    group.finish();
}

fn bench_manifest_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest_parsing");

    for size in [10, 50, 100].iter() {
        let manifest = generate_manifest(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                ReactorManifest::parse(black_box(&manifest), Path::new("."), "bench").unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_graph_mapping,
    bench_flatten,
    bench_module_filter,
    bench_manifest_parsing
);
criterion_main!(benches);
