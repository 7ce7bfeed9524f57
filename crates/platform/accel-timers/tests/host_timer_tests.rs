//! Host Timer Tests
//!
//! 主机计时器集成测试

use std::thread;
use std::time::Duration;

use accel_timers::{HostTimer, TimerConfig};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 解析 `<前缀><数值>ms` 形式的报告行
fn parse_report(line: &str, prefix: &str) -> f64 {
    let body = line
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix("ms\n"))
        .unwrap_or_else(|| panic!("malformed report line: {line:?}"));
    body.parse().unwrap()
}

#[test]
fn test_immediate_stop_is_small() {
    init_logging();
    let mut timer = HostTimer::new();
    let mut out = Vec::new();

    timer.start();
    let elapsed = timer.stop_to(Some("elapsed: "), &mut out).unwrap();

    let line = String::from_utf8(out).unwrap();
    assert!(line.starts_with("elapsed: "));
    assert!(line.trim_end().ends_with("ms"));
    assert!((0.0..50.0).contains(&elapsed), "elapsed {elapsed}ms");
}

#[test]
fn test_sleep_is_covered() {
    init_logging();
    let mut timer = HostTimer::new();
    timer.start();
    thread::sleep(Duration::from_millis(20));
    let elapsed = timer.stop_to(None, &mut std::io::sink()).unwrap();
    assert!(elapsed >= 20.0, "elapsed {elapsed}ms");
}

#[test]
fn test_reuse_gives_independent_intervals() {
    init_logging();
    let mut timer = HostTimer::new();

    timer.start();
    thread::sleep(Duration::from_millis(30));
    let long = timer.stop_to(None, &mut std::io::sink()).unwrap();

    timer.start();
    let short = timer.stop_to(None, &mut std::io::sink()).unwrap();

    timer.start();
    thread::sleep(Duration::from_millis(5));
    let medium = timer.stop_to(None, &mut std::io::sink()).unwrap();

    assert!(long >= 30.0);
    assert!(short < long);
    assert!(medium >= 5.0);
    assert!(medium < long + 30.0);
}

#[test]
fn test_report_value_matches_return() {
    init_logging();
    let mut timer = HostTimer::with_config(TimerConfig::host().with_prefix("parse: ")).unwrap();
    let mut out = Vec::new();

    timer.start();
    thread::sleep(Duration::from_millis(3));
    let elapsed = timer.stop_to(None, &mut out).unwrap();

    let line = String::from_utf8(out).unwrap();
    let printed = parse_report(&line, "parse: ");
    assert!(printed.is_finite());
    assert!(printed >= 0.0);
    // 六位有效数字
    assert!((printed - elapsed).abs() <= elapsed * 1e-5);
}

#[test]
fn test_stop_prints_to_stdout() {
    init_logging();
    let mut timer = HostTimer::default();
    timer.start();
    let elapsed = timer.stop(None);
    assert!(elapsed >= 0.0);
}
