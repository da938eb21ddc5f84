#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use trellis_collector::{CollectorConfig, InventoryCollector, ReactorManifest};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(manifest) = ReactorManifest::parse(content, Path::new("/nonexistent"), "fuzz") else {
        return;
    };

    // 파싱에 성공한 매니페스트는 panic 없이 수집되어야 함
    let Ok(collector) = InventoryCollector::new(CollectorConfig::default()) else {
        return;
    };
    if let Ok(result) = collector.collect(&manifest.resolver, &manifest.modules, &manifest.root) {
        assert!(result.inventory.project_count() <= manifest.modules.len());
    }
});
