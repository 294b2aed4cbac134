//! OSC over UDP: the renderer-facing transport.
//!
//! # Address map
//!
//! | Event              | Address                    | Args    |
//! |--------------------|----------------------------|---------|
//! | position           | `{prefix}/{n}/xyz`         | `f f f` |
//! | aperture           | `{prefix}/{n}/aperture`    | `f`     |
//! | orientation        | `{prefix}/{n}/ypr`         | `f f f` |
//! | group member added | `/group/{name}/add`        | `i`     |
//! | member removed     | `/group/{name}/remove`     | `i`     |
//!
//! `n` is the source id plus `index_base`.  Orientation is sent in radians.
//! Every message goes out as its own datagram.
//!
//! The socket is non-blocking: a message the kernel cannot take right away
//! is counted as failed and dropped, so a stalled renderer never delays the
//! next frame.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use sm_core::SourceId;
use sm_engine::{FrameOutput, GroupEvent, OutputTransport, ParamUpdate, TransportStats};
use tracing::{debug, info};

use crate::{OscMessage, OutputError, OutputResult};

/// Where and how to send.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OscConfig {
    /// `host:port` of the renderer.
    pub target:         String,
    /// Prepended to every per-source address.
    pub address_prefix: String,
    /// Added to the source id to form the renderer's index.
    pub index_base:     u32,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            target:         "127.0.0.1:4003".to_owned(),
            address_prefix: "/source".to_owned(),
            index_base:     1,
        }
    }
}

/// Sends each frame as OSC messages over a connected UDP socket.
pub struct UdpOscTransport {
    config: OscConfig,
    socket: UdpSocket,
    target: SocketAddr,
    stats:  TransportStats,
    /// Reused encode buffer.
    buf:    Vec<u8>,
}

impl UdpOscTransport {
    /// Resolve `config.target`, bind an ephemeral local port and connect in
    /// non-blocking mode.
    pub fn connect(config: OscConfig) -> OutputResult<Self> {
        // Validate the prefix once; per-source addresses only append to it.
        OscMessage::new(format!("{}/1/xyz", config.address_prefix))?;

        let target = config
            .target
            .to_socket_addrs()
            .map_err(|_| OutputError::Address(config.target.clone()))?
            .next()
            .ok_or_else(|| OutputError::Address(config.target.clone()))?;
        let local: SocketAddr = if target.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(target)?;
        socket.set_nonblocking(true)?;

        info!(%target, prefix = %config.address_prefix, "OSC transport connected");
        Ok(Self {
            config,
            socket,
            target,
            stats: TransportStats::default(),
            buf: Vec::with_capacity(64),
        })
    }

    pub fn config(&self) -> &OscConfig {
        &self.config
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// The renderer's index for `id`.
    pub fn index_of(&self, id: SourceId) -> i64 {
        i64::from(id.0) + i64::from(self.config.index_base)
    }

    fn source_address(&self, id: SourceId, leaf: &str) -> String {
        format!("{}/{}/{leaf}", self.config.address_prefix, self.index_of(id))
    }

    /// Encode and send one message, counting the outcome.
    fn send(&mut self, msg: OutputResult<OscMessage>) {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                self.stats.failed += 1;
                debug!(error = %e, "OSC message dropped");
                return;
            }
        };
        self.buf.clear();
        msg.encode_into(&mut self.buf);
        match self.socket.send(&self.buf) {
            Ok(_) => self.stats.sent += 1,
            Err(e) => {
                self.stats.failed += 1;
                debug!(address = msg.address(), error = %e, "OSC message dropped");
            }
        }
    }
}

impl OutputTransport for UdpOscTransport {
    fn send_frame(&mut self, frame: &FrameOutput<'_>) {
        for &(id, position) in frame.positions {
            let msg = OscMessage::new(self.source_address(id, "xyz"))
                .map(|m| m.floats(position.to_f32_array()));
            self.send(msg);
        }
        for update in frame.params {
            let msg = match *update {
                ParamUpdate::Aperture { id, value } => {
                    OscMessage::new(self.source_address(id, "aperture")).map(|m| m.float(value as f32))
                }
                ParamUpdate::Orientation { id, value } => {
                    OscMessage::new(self.source_address(id, "ypr")).map(|m| m.floats(value.to_f32_array()))
                }
            };
            self.send(msg);
        }
    }

    fn send_group_event(&mut self, event: &GroupEvent) {
        let (group, id, action) = match event {
            GroupEvent::Added { group, id } => (group, *id, "add"),
            GroupEvent::Removed { group, id } => (group, *id, "remove"),
        };
        let index = i32::try_from(self.index_of(id))
            .map_err(|_| OutputError::Encode(format!("index for {id} exceeds int32")));
        let msg = index.and_then(|n| OscMessage::new(format!("/group/{group}/{action}")).map(|m| m.int(n)));
        self.send(msg);
    }

    fn stats(&self) -> TransportStats {
        self.stats
    }
}
