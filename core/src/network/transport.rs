use std::io;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pnet::packet::Packet;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
};
use tokio::sync::mpsc;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const LISTENER_POLL: Duration = Duration::from_millis(250);
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
const CHANNEL_TYPE_ICMPV6: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv6(IpNextHeaderProtocols::Icmpv6));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    IcmpV4,
    IcmpV6,
}

/// A received packet, its source and the moment it was read off the socket.
pub type Captured = (Vec<u8>, IpAddr, Instant);

pub struct TransportHandle {
    pub tx: Arc<Mutex<TransportSender>>,
    pub rx: mpsc::UnboundedReceiver<Captured>,
}

// The listener thread exits once the receiving half of the queue is gone.
macro_rules! spawn_listener {
    ($tx:expr, $rx:expr, $iter_func:path) => {
        std::thread::spawn(move || {
            let mut iterator = $iter_func(&mut $rx);
            while !$tx.is_closed() {
                if let Ok(Some((packet, source_ip))) = iterator.next_with_timeout(LISTENER_POLL) {
                    let captured = (packet.packet().to_vec(), source_ip, Instant::now());
                    if $tx.send(captured).is_err() {
                        break;
                    }
                }
            }
        })
    };
}

pub fn start_packet_capture(transport_type: TransportType) -> io::Result<TransportHandle> {
    let (tx, mut rx_socket) = open_channel(transport_type)?;
    let (queue_tx, queue_rx) = mpsc::unbounded_channel();

    match transport_type {
        TransportType::IcmpV4 => spawn_listener!(queue_tx, rx_socket, transport::icmp_packet_iter),
        TransportType::IcmpV6 => spawn_listener!(queue_tx, rx_socket, transport::icmpv6_packet_iter),
    };

    Ok(TransportHandle {
        tx: Arc::new(Mutex::new(tx)),
        rx: queue_rx,
    })
}

fn open_channel(transport_type: TransportType) -> io::Result<(TransportSender, TransportReceiver)> {
    let channel_type: TransportChannelType = match transport_type {
        TransportType::IcmpV4 => CHANNEL_TYPE_ICMP,
        TransportType::IcmpV6 => CHANNEL_TYPE_ICMPV6,
    };
    transport::transport_channel(TRANSPORT_BUFFER_SIZE, channel_type)
}
