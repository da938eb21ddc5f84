#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use trellis_collector::filter::{GlobPattern, ModuleDecision, SkipReason};
use trellis_collector::types::Coordinates;
use trellis_collector::{Module, ModuleFilter};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    includes: Vec<String>,
    excludes: Vec<String>,
    artifact_id: String,
    pom: bool,
    ignore_pom_modules: bool,
    is_root: bool,
}

fuzz_target!(|input: FuzzInput| {
    // 패턴 수 제한 (퍼징 성능)
    let includes: Vec<String> = input.includes.into_iter().take(8).collect();
    let excludes: Vec<String> = input.excludes.into_iter().take(8).collect();

    let Ok(filter) = ModuleFilter::new(input.ignore_pom_modules, &includes, &excludes) else {
        return;
    };

    let mut module = Module::new(Coordinates::new("fuzz", input.artifact_id.clone(), "1.0"));
    if input.pom {
        module.packaging = "pom".to_owned();
    }

    let decision = filter.decide(&module, input.is_root);

    // exclude에 걸린 비루트 모듈은 include와 관계없이 처리되지 않음
    let excluded = excludes
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .filter_map(|p| GlobPattern::compile(p).ok())
        .any(|p| p.matches(&input.artifact_id));
    if excluded && !input.is_root {
        assert!(matches!(decision, ModuleDecision::Skip(_)));
    }

    // 루트 모듈은 pom 규칙 외에는 건너뛰지 않음
    if input.is_root {
        match decision {
            ModuleDecision::Accept => {}
            ModuleDecision::Skip(reason) => assert_eq!(reason, SkipReason::PomPackaging),
        }
    }
});
