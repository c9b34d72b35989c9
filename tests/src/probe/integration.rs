#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use cleanip_core::prober::EchoProber;
use cleanip_core::prober::icmp::IcmpProber;

/// Sends real echo requests to the loopback interface.
/// Needs raw-socket privileges, hence ignored by default.
#[tokio::test]
#[ignore = "requires root for raw ICMP sockets"]
async fn loopback_answers_echo() {
    let prober = IcmpProber::new().expect("raw ICMP socket");
    let localhost: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let rtt = prober
        .echo(localhost, Duration::from_millis(1_000))
        .await
        .expect("loopback did not answer");

    assert!(rtt < Duration::from_millis(1_000));
}

#[tokio::test]
#[ignore = "requires root for raw ICMP sockets"]
async fn unroutable_address_times_out() {
    let prober = IcmpProber::new().expect("raw ICMP socket");
    // TEST-NET-1, never routed.
    let target: IpAddr = "192.0.2.1".parse().unwrap();

    let result = prober.echo(target, Duration::from_millis(300)).await;

    assert!(result.is_err());
}
