//! **ICMP echo** prober over raw sockets.
//!
//! One raw socket per address family is opened for the lifetime of the prober.
//! A listener thread per socket pushes every received ICMP packet into a queue;
//! a dispatcher task matches echo replies carrying our identifier to the
//! request waiting for them, keyed by `(source address, sequence number)`.
//! This lets any number of echo requests be in flight on the same socket.
//!
//! Raw sockets require **root privileges** (or `CAP_NET_RAW` on Linux).

use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use is_root::is_root;
use pnet::packet::Packet;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::icmpv6::{self, Icmpv6Code, Icmpv6Packet, Icmpv6Types};
use pnet::transport::TransportSender;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use cleanip_common::error::{CleanIpError, Result};
use cleanip_common::{debug, warn};

use super::{EchoProber, ProbeError};
use crate::network::transport::{self, Captured, TransportType};

const ICMP_ECHO_HDR_LEN: usize = 8;
const ECHO_PAYLOAD: &[u8] = b"cleanip latency probe 0123456789";
const ECHO_PACKET_LEN: usize = ICMP_ECHO_HDR_LEN + ECHO_PAYLOAD.len();

type ReplyKey = (IpAddr, u16);

pub struct IcmpProber {
    v4: Arc<Mutex<TransportSender>>,
    v6: Option<Arc<Mutex<TransportSender>>>,
    replies: ReplyTable,
    identifier: u16,
    sequence: AtomicU16,
    dispatchers: Vec<JoinHandle<()>>,
}

impl IcmpProber {
    /// Opens the raw sockets and starts matching replies.
    ///
    /// Must be called from within a tokio runtime. Failing to open the IPv4
    /// socket is fatal; without an IPv6 socket, IPv6 targets simply never answer.
    pub fn new() -> Result<Self> {
        if !is_root() {
            warn!("Not running as root, raw ICMP sockets will most likely be refused");
        }

        let identifier: u16 = rand::random();
        let replies = ReplyTable::default();

        let v4 = transport::start_packet_capture(TransportType::IcmpV4)
            .map_err(CleanIpError::Socket)?;
        let mut dispatchers = vec![spawn_dispatcher(
            v4.rx,
            TransportType::IcmpV4,
            identifier,
            replies.clone(),
        )];

        let v6 = match transport::start_packet_capture(TransportType::IcmpV6) {
            Ok(handle) => {
                dispatchers.push(spawn_dispatcher(
                    handle.rx,
                    TransportType::IcmpV6,
                    identifier,
                    replies.clone(),
                ));
                Some(handle.tx)
            }
            Err(e) => {
                warn!("IPv6 echo disabled: {e}");
                None
            }
        };

        debug!("ICMP prober ready (identifier {identifier:#06x})");
        Ok(Self {
            v4: v4.tx,
            v6,
            replies,
            identifier,
            sequence: AtomicU16::new(0),
            dispatchers,
        })
    }

    fn sender_for(
        &self,
        target: IpAddr,
    ) -> std::result::Result<Arc<Mutex<TransportSender>>, ProbeError> {
        match target {
            IpAddr::V4(_) => Ok(self.v4.clone()),
            IpAddr::V6(_) => self.v6.clone().ok_or(ProbeError::Unsupported(target)),
        }
    }
}

impl Drop for IcmpProber {
    fn drop(&mut self) {
        for dispatcher in &self.dispatchers {
            dispatcher.abort();
        }
    }
}

#[async_trait]
impl EchoProber for IcmpProber {
    async fn echo(
        &self,
        target: IpAddr,
        timeout: Duration,
    ) -> std::result::Result<Duration, ProbeError> {
        let sender = self.sender_for(target)?;
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let packet = build_echo_request(target, self.identifier, sequence)?;

        // Registered before sending so a fast reply cannot slip past.
        let pending = self.replies.register((target, sequence));

        let sent_at = tokio::task::spawn_blocking(move || send_packet(&sender, target, packet))
            .await
            .map_err(io::Error::other)??;

        match tokio::time::timeout(timeout, pending.wait()).await {
            Ok(Some(received_at)) => Ok(received_at.saturating_duration_since(sent_at)),
            Ok(None) | Err(_) => Err(ProbeError::Timeout(timeout)),
        }
    }
}

/// Outstanding echo requests waiting for their reply.
#[derive(Clone, Default)]
struct ReplyTable {
    pending: Arc<Mutex<HashMap<ReplyKey, oneshot::Sender<Instant>>>>,
}

impl ReplyTable {
    fn lock(&self) -> MutexGuard<'_, HashMap<ReplyKey, oneshot::Sender<Instant>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, key: ReplyKey) -> PendingReply<'_> {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(key, tx);
        PendingReply {
            table: self,
            key,
            rx: Some(rx),
        }
    }

    fn complete(&self, key: ReplyKey, received_at: Instant) -> bool {
        match self.lock().remove(&key) {
            Some(tx) => tx.send(received_at).is_ok(),
            None => false,
        }
    }

    fn forget(&self, key: &ReplyKey) {
        self.lock().remove(key);
    }
}

/// Deregisters its request when dropped, answered or not.
struct PendingReply<'a> {
    table: &'a ReplyTable,
    key: ReplyKey,
    rx: Option<oneshot::Receiver<Instant>>,
}

impl PendingReply<'_> {
    async fn wait(mut self) -> Option<Instant> {
        let rx = self.rx.take()?;
        rx.await.ok()
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        self.table.forget(&self.key);
    }
}

fn spawn_dispatcher(
    mut rx: mpsc::UnboundedReceiver<Captured>,
    transport_type: TransportType,
    identifier: u16,
    replies: ReplyTable,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some((bytes, source, received_at)) = rx.recv().await {
            if let Some(sequence) = parse_echo_reply(transport_type, &bytes, identifier) {
                replies.complete((source, sequence), received_at);
            }
        }
    })
}

fn build_echo_request(
    target: IpAddr,
    identifier: u16,
    sequence: u16,
) -> std::result::Result<Vec<u8>, ProbeError> {
    let mut buffer: Vec<u8> = vec![0u8; ECHO_PACKET_LEN];

    match target {
        IpAddr::V4(_) => {
            let mut echo = icmp::echo_request::MutableEchoRequestPacket::new(&mut buffer)
                .ok_or_else(|| ProbeError::Packet("ICMP buffer too small".into()))?;
            echo.set_icmp_type(IcmpTypes::EchoRequest);
            echo.set_icmp_code(IcmpCode(0));
            echo.set_identifier(identifier);
            echo.set_sequence_number(sequence);
            echo.set_payload(ECHO_PAYLOAD);

            echo.set_checksum(0);
            let echo_imm = echo.to_immutable();
            let icmp_pkt = IcmpPacket::new(echo_imm.packet())
                .ok_or_else(|| ProbeError::Packet("failed to view ICMP packet".into()))?;
            let csm = icmp::checksum(&icmp_pkt);
            echo.set_checksum(csm);
        }
        IpAddr::V6(_) => {
            let mut echo = icmpv6::echo_request::MutableEchoRequestPacket::new(&mut buffer)
                .ok_or_else(|| ProbeError::Packet("ICMPv6 buffer too small".into()))?;
            echo.set_icmpv6_type(Icmpv6Types::EchoRequest);
            echo.set_icmpv6_code(Icmpv6Code(0));
            echo.set_identifier(identifier);
            echo.set_sequence_number(sequence);
            echo.set_payload(ECHO_PAYLOAD);
            // The kernel fills in ICMPv6 checksums on raw sockets.
            echo.set_checksum(0);
        }
    }

    Ok(buffer)
}

/// Sends `bytes` to `target` and returns the moment the packet left.
fn send_packet(
    sender: &Mutex<TransportSender>,
    target: IpAddr,
    bytes: Vec<u8>,
) -> io::Result<Instant> {
    let truncated = || io::Error::new(io::ErrorKind::InvalidInput, "truncated echo request");
    let mut sender = sender.lock().unwrap_or_else(PoisonError::into_inner);
    let sent_at = Instant::now();

    match target {
        IpAddr::V4(_) => {
            let packet = IcmpPacket::new(&bytes).ok_or_else(truncated)?;
            sender.send_to(packet, target)?;
        }
        IpAddr::V6(_) => {
            let packet = Icmpv6Packet::new(&bytes).ok_or_else(truncated)?;
            sender.send_to(packet, target)?;
        }
    }
    Ok(sent_at)
}

/// Returns the sequence number of an echo reply addressed to `identifier`.
fn parse_echo_reply(transport_type: TransportType, bytes: &[u8], identifier: u16) -> Option<u16> {
    let (reply_id, sequence) = match transport_type {
        TransportType::IcmpV4 => {
            let packet = IcmpPacket::new(bytes)?;
            if packet.get_icmp_type() != IcmpTypes::EchoReply {
                return None;
            }
            let reply = icmp::echo_reply::EchoReplyPacket::new(bytes)?;
            (reply.get_identifier(), reply.get_sequence_number())
        }
        TransportType::IcmpV6 => {
            let packet = Icmpv6Packet::new(bytes)?;
            if packet.get_icmpv6_type() != Icmpv6Types::EchoReply {
                return None;
            }
            let reply = icmpv6::echo_reply::EchoReplyPacket::new(bytes)?;
            (reply.get_identifier(), reply.get_sequence_number())
        }
    };

    (reply_id == identifier).then_some(sequence)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
