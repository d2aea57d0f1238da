//! Wire layout and transport seam.
//!
//! Goals:
//! - One fixed-size record per send, so a receiver never has to guess.
//! - Keep encoding explicit: ten little-endian `i32`s in protocol order.
//! - The transport is a collaborator behind [`InputTransport`]; a UDP
//!   implementation is provided for the client binary.

use std::net::SocketAddr;

use anyhow::{ensure, Context};
use async_trait::async_trait;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::net::UdpSocket;
use tracing::trace;

use crate::input::{ActionSnapshot, ActorSlot, StatusFlags};

/// Number of `i32` fields in a wire record.
pub const SNAPSHOT_FIELDS: usize = 10;

/// Exact byte length of an encoded [`ActionSnapshot`].
pub const SNAPSHOT_SIZE: usize = SNAPSHOT_FIELDS * 4;

impl ActionSnapshot {
    /// Appends the fixed-layout record to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(SNAPSHOT_SIZE);
        buf.put_i32_le(self.direction);
        buf.put_i32_le(self.target_x);
        buf.put_i32_le(self.target_y);
        buf.put_i32_le(self.jump);
        buf.put_i32_le(self.fire);
        buf.put_i32_le(self.hook);
        buf.put_i32_le(self.player_flags.bits() as i32);
        buf.put_i32_le(self.wanted_weapon);
        buf.put_i32_le(self.next_weapon);
        buf.put_i32_le(self.prev_weapon);
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(SNAPSHOT_SIZE);
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Decodes one record. Unknown flag bits are dropped.
    pub fn decode(mut b: &[u8]) -> anyhow::Result<Self> {
        ensure!(
            b.len() >= SNAPSHOT_SIZE,
            "short input record: {} < {SNAPSHOT_SIZE} bytes",
            b.len()
        );
        Ok(Self {
            direction: b.get_i32_le(),
            target_x: b.get_i32_le(),
            target_y: b.get_i32_le(),
            jump: b.get_i32_le(),
            fire: b.get_i32_le(),
            hook: b.get_i32_le(),
            player_flags: StatusFlags::from_bits_truncate(b.get_i32_le() as u32),
            wanted_weapon: b.get_i32_le(),
            next_weapon: b.get_i32_le(),
            prev_weapon: b.get_i32_le(),
        })
    }
}

/// Hands encoded input records to the network.
#[async_trait]
pub trait InputTransport: Send {
    async fn send_input(&mut self, slot: ActorSlot, payload: Bytes) -> anyhow::Result<()>;
}

/// Unreliable channel over UDP: one datagram per record, prefixed with the
/// actor slot byte.
#[derive(Debug)]
pub struct UdpInputTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpInputTransport {
    pub async fn connect(bind_addr: SocketAddr, peer: SocketAddr) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind(bind_addr).await.context("udp bind")?;
        socket.connect(peer).await.context("udp connect")?;
        Ok(Self { socket, peer })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl InputTransport for UdpInputTransport {
    async fn send_input(&mut self, slot: ActorSlot, payload: Bytes) -> anyhow::Result<()> {
        let mut datagram = BytesMut::with_capacity(1 + payload.len());
        datagram.put_u8(slot.index() as u8);
        datagram.extend_from_slice(&payload);
        self.socket.send(&datagram).await.context("udp send")?;
        trace!(?slot, len = payload.len(), "input datagram sent");
        Ok(())
    }
}

/// Splits a datagram produced by [`UdpInputTransport`].
pub fn decode_datagram(b: &[u8]) -> anyhow::Result<(ActorSlot, ActionSnapshot)> {
    let (&slot, rest) = b.split_first().context("empty datagram")?;
    let slot = match slot {
        0 => ActorSlot::Primary,
        1 => ActorSlot::Shadow,
        other => anyhow::bail!("bad actor slot {other}"),
    };
    Ok((slot, ActionSnapshot::decode(rest)?))
}
