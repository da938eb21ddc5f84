#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use trellis_collector::flatten;
use trellis_collector::types::{Coordinates, DependencyRecord};

/// 퍼저용 구조적 의존성 트리
#[derive(Arbitrary, Debug)]
struct FuzzNode {
    artifact_id: u8,
    children: Vec<FuzzNode>,
}

fn to_record(node: &FuzzNode, budget: &mut usize) -> DependencyRecord {
    let mut record =
        DependencyRecord::new(Coordinates::new("fuzz", format!("a{}", node.artifact_id), "1.0"));
    for child in &node.children {
        // 노드 수 제한 (퍼징 성능)
        if *budget == 0 {
            break;
        }
        *budget -= 1;
        record.children.push(to_record(child, budget));
    }
    record
}

fuzz_target!(|roots: Vec<FuzzNode>| {
    let mut budget = 1_000;
    let records: Vec<DependencyRecord> = roots.iter().map(|r| to_record(r, &mut budget)).collect();
    let expected: usize = records.iter().map(DependencyRecord::total_count).sum();

    let flat = flatten(records);
    assert_eq!(flat.len(), expected);
    assert!(flat.iter().all(|r| r.children.is_empty()));

    // 평탄화는 멱등
    assert_eq!(flatten(flat.clone()), flat);
});
