//! Graphite bridge tests against a real TCP listener

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use promgate::bridge::{Bridge, BridgeConfig, BridgeState};
use promgate::metrics::{
    Gatherer, MetricFamily, MetricType, PrefixingGatherer, ReservedPrefixes, Sample,
    StaticGatherer,
};
use promgate::runtime::Shutdown;

fn snapshot() -> Arc<dyn Gatherer> {
    Arc::new(PrefixingGatherer::new(
        StaticGatherer::new(vec![
            MetricFamily::new("api_requests_total", "", MetricType::Counter).with_sample(
                Sample::new(12.0)
                    .with_label("route", "/api/search")
                    .with_label("code", "200"),
            ),
            MetricFamily::new("process_open_fds", "", MetricType::Gauge)
                .with_sample(Sample::new(42.0)),
        ]),
        ReservedPrefixes::default(),
    ))
}

async fn read_all(listener: &TcpListener) -> String {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut received = String::new();
    socket.read_to_string(&mut received).await.unwrap();
    received
}

// =============================================================================
// Delivery
// =============================================================================

#[tokio::test]
async fn test_push_delivers_plaintext_lines() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    let mut config = BridgeConfig::new(address, Duration::from_secs(10));
    config.prefix = "prod.grafana.".into();
    let bridge = Bridge::new(config, snapshot())
        .unwrap()
        .with_trim_prefix("grafana_");

    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let (pushed, received) = tokio::join!(bridge.push(now), read_all(&listener));

    assert_eq!(pushed.unwrap(), 2);
    assert_eq!(
        received,
        "prod.grafana.api_requests_total.code.200.route._api_search 12 1700000000\n\
         prod.grafana.process_open_fds 42 1700000000\n"
    );
}

#[tokio::test]
async fn test_run_delivers_on_interval() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    let bridge = Bridge::new(BridgeConfig::new(address, Duration::from_millis(50)), snapshot())
        .unwrap();
    let stats = bridge.stats();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(bridge.run(shutdown.clone()));

    let first = tokio::time::timeout(Duration::from_secs(2), read_all(&listener))
        .await
        .unwrap();
    assert!(first.contains("process_open_fds 42 "));

    tokio::time::timeout(Duration::from_secs(2), async {
        while stats.pushes() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("push should be counted");

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stats.state(), BridgeState::Stopped);
    assert!(stats.pushes() >= 1);
}

// =============================================================================
// Failures
// =============================================================================

async fn unused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);
    address
}

#[tokio::test]
async fn test_unreachable_sink_is_counted_not_fatal() {
    let config = BridgeConfig::new(unused_address().await, Duration::from_millis(30));
    let bridge = Bridge::new(config, snapshot()).unwrap();
    let stats = bridge.stats();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(bridge.run(shutdown.clone()));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(stats.state(), BridgeState::Running);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();
    assert!(stats.failures() >= 2);
    assert_eq!(stats.pushes(), 0);
}
