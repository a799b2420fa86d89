use std::time::Duration;

use prong_uplink::app::run_demo;
use prong_uplink::UploadConfig;

#[test]
fn demo_delivers_through_diagnostic_backend() {
    let config = UploadConfig {
        tick_interval_ms: 20,
        ..UploadConfig::default()
    };
    let metrics = run_demo(config, 3, Duration::from_millis(40)).unwrap();
    assert_eq!(metrics.worker_starts, 1);
    assert_eq!(metrics.submitted + metrics.rejected, 3);
    assert!(metrics.delivered >= 1);
    assert_eq!(metrics.delivery_failures, 0);
}

#[test]
fn demo_rejects_invalid_config() {
    let config = UploadConfig {
        tick_interval_ms: 0,
        ..UploadConfig::default()
    };
    assert!(run_demo(config, 1, Duration::ZERO).is_err());
}
