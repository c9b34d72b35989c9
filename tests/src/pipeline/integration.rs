#![cfg(test)]
use std::fs;
use std::time::Duration;

use cleanip_common::config::Config;
use cleanip_common::error::CleanIpError;
use cleanip_common::network::subnet::SubnetKey;
use cleanip_core::signal::{StopHandle, StopSignal};

use crate::support::{Reply, ScriptedProber, config_in, scan_body, seeded_service, write_scan};

const HOUR: Duration = Duration::from_secs(3_600);

/// Three addresses, two subnets, one of them too slow: each subnet keeps the
/// address inside the 50-100 ms window.
#[tokio::test(start_paused = true)]
async fn selects_from_newest_scan() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    fs::create_dir(&results).unwrap();

    write_scan(&results, "old.json", &scan_body(&["172.16.0.1"]), HOUR);
    write_scan(
        &results,
        "new.json",
        &scan_body(&["10.0.0.1", "10.0.0.2", "192.168.1.1"]),
        Duration::ZERO,
    );

    let prober = ScriptedProber::new(&[
        ("10.0.0.1", Reply::After(60)),
        ("10.0.0.2", Reply::After(150)),
        ("192.168.1.1", Reply::After(80)),
        ("172.16.0.1", Reply::After(70)),
    ]);
    let cfg = config_in(dir.path());

    let report = seeded_service(prober, 1)
        .run(&cfg, StopSignal::never())
        .await
        .unwrap();

    assert_eq!(report.source_file, Some(results.join("new.json")));
    assert_eq!(report.candidates, 3);
    assert_eq!(report.groups, 2);
    assert_eq!(report.latency_of(&"10.0.0.2".parse().unwrap()), Some(150.0));
    assert_eq!(
        fs::read_to_string(&cfg.output_path).unwrap(),
        "10.0.0.1,192.168.1.1"
    );
}

#[tokio::test(start_paused = true)]
async fn legacy_config_drives_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("scans");
    fs::create_dir(&results).unwrap();
    write_scan(
        &results,
        "scan.json",
        &scan_body(&["1.1.1.1", "8.8.8.8"]),
        Duration::ZERO,
    );

    let config_path = dir.path().join("config.json");
    let legacy = serde_json::json!({
        "Threshold1": 10,
        "Threshold2": 30,
        "SearchDirectory": results,
        "output_path": dir.path().join("picked.txt"),
    });
    fs::write(&config_path, legacy.to_string()).unwrap();
    let cfg = Config::load(&config_path).unwrap();

    let prober = ScriptedProber::new(&[
        ("1.1.1.1", Reply::After(20)),
        ("8.8.8.8", Reply::After(60)),
    ]);

    seeded_service(prober, 2)
        .run(&cfg, StopSignal::never())
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("picked.txt")).unwrap(),
        "1.1.1.1"
    );
}

#[tokio::test(start_paused = true)]
async fn empty_window_writes_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    fs::create_dir(&results).unwrap();
    write_scan(
        &results,
        "scan.json",
        &scan_body(&["1.1.1.1", "9.9.9.9"]),
        Duration::ZERO,
    );
    let prober = ScriptedProber::new(&[("1.1.1.1", Reply::After(500))]);
    let cfg = config_in(dir.path());

    let report = seeded_service(prober, 3)
        .run(&cfg, StopSignal::never())
        .await
        .unwrap();

    assert!(report.selection.is_empty());
    assert_eq!(fs::read_to_string(&cfg.output_path).unwrap(), "");
}

#[tokio::test]
async fn missing_results_directory_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config_in(dir.path());

    let err = seeded_service(ScriptedProber::new(&[]), 4)
        .run(&cfg, StopSignal::never())
        .await
        .unwrap_err();

    assert!(matches!(err, CleanIpError::NotFound(_)), "{err:?}");
    assert!(!cfg.output_path.exists());
}

#[tokio::test]
async fn malformed_newest_scan_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    fs::create_dir(&results).unwrap();
    write_scan(&results, "good.json", &scan_body(&["1.1.1.1"]), HOUR);
    write_scan(&results, "broken.json", "{ \"results\": [", Duration::ZERO);

    let prober = ScriptedProber::new(&[("1.1.1.1", Reply::After(60))]);
    let err = seeded_service(prober.clone(), 5)
        .run(&config_in(dir.path()), StopSignal::never())
        .await
        .unwrap_err();

    assert!(matches!(err, CleanIpError::Parse { .. }), "{err:?}");
    assert_eq!(prober.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn large_groups_are_sampled_before_probing() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    fs::create_dir(&results).unwrap();

    let ips: Vec<String> = (1..=40).map(|n| format!("104.16.{n}.1")).collect();
    let refs: Vec<&str> = ips.iter().map(String::as_str).collect();
    write_scan(&results, "scan.json", &scan_body(&refs), Duration::ZERO);

    let replies: Vec<(&str, Reply)> = refs.iter().map(|ip| (*ip, Reply::After(75))).collect();
    let prober = ScriptedProber::new(&replies);
    let cfg = Config {
        max_group_size: 3,
        probe_attempts: 2,
        ..config_in(dir.path())
    };

    let report = seeded_service(prober.clone(), 6)
        .run(&cfg, StopSignal::never())
        .await
        .unwrap();

    assert_eq!(report.candidates, 40);
    assert_eq!(report.probed, 3);
    assert_eq!(prober.calls(), 3 * 2);

    let picked = &report.selection[&SubnetKey::new("104")];
    assert!(report.latencies.contains_key(picked));
    assert_eq!(
        fs::read_to_string(&cfg.output_path).unwrap(),
        picked.as_str()
    );
}

#[tokio::test(start_paused = true)]
async fn same_seed_same_choice() {
    let ips: Vec<String> = (1..=12).map(|n| format!("45.{n}.0.1")).collect();
    let replies: Vec<(&str, Reply)> = ips
        .iter()
        .map(|ip| (ip.as_str(), Reply::After(55)))
        .collect();
    let addresses = || ips.iter().map(|ip| ip.parse().unwrap()).collect::<Vec<_>>();
    let cfg = Config {
        max_group_size: 4,
        ..Config::default()
    };

    let first = seeded_service(ScriptedProber::new(&replies), 42)
        .select(addresses(), &cfg, StopSignal::never())
        .await
        .unwrap();
    let second = seeded_service(ScriptedProber::new(&replies), 42)
        .select(addresses(), &cfg, StopSignal::never())
        .await
        .unwrap();

    assert_eq!(first.selection, second.selection);
}

/// Stopping mid-run keeps whatever was measured so far.
#[tokio::test(start_paused = true)]
async fn stop_request_keeps_partial_results() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    fs::create_dir(&results).unwrap();
    write_scan(
        &results,
        "scan.json",
        &scan_body(&["10.0.0.1", "20.0.0.1"]),
        Duration::ZERO,
    );

    let prober = ScriptedProber::new(&[
        ("10.0.0.1", Reply::After(60)),
        ("20.0.0.1", Reply::Silent),
    ]);
    let cfg = Config {
        probe_attempts: 1,
        probe_timeout_ms: 3_600_000,
        ..config_in(dir.path())
    };

    let stop = StopHandle::new();
    let signal = stop.signal();
    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        stop.stop();
    });

    let report = seeded_service(prober, 7).run(&cfg, signal).await.unwrap();
    stopper.await.unwrap();

    assert_eq!(report.latencies.len(), 1);
    assert_eq!(fs::read_to_string(&cfg.output_path).unwrap(), "10.0.0.1");
}

#[tokio::test(start_paused = true)]
async fn run_timeout_bounds_probing() {
    let prober = ScriptedProber::new(&[
        ("10.0.0.1", Reply::After(70)),
        ("20.0.0.1", Reply::Silent),
        ("30.0.0.1", Reply::Silent),
    ]);
    let cfg = Config {
        probe_timeout_ms: 3_600_000,
        run_timeout_ms: Some(2_000),
        ..Config::default()
    };

    let started = tokio::time::Instant::now();
    let report = seeded_service(prober, 8)
        .select(
            ["10.0.0.1", "20.0.0.1", "30.0.0.1"]
                .iter()
                .map(|ip| ip.parse().unwrap()),
            &cfg,
            StopSignal::never(),
        )
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(report.selection.len(), 1);
    assert_eq!(
        report.selection[&SubnetKey::new("10")].as_str(),
        "10.0.0.1"
    );
}
