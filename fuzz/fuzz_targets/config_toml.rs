#![no_main]

use libfuzzer_sys::fuzz_target;
use trellis_collector::CollectorConfig;
use trellis_core::config::TrellisConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = TrellisConfig::parse(content) else {
        return;
    };

    // core 검증을 통과한 설정은 collector 검증도 통과해야 함
    if config.validate().is_ok() {
        let collector = CollectorConfig::from_core(&config.collector);
        assert!(collector.validate().is_ok());
        assert!(collector.aggregation_strategy().is_ok());
    }
});
