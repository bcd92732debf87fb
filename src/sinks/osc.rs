/// OSC/UDP sink adapters
///
/// Production implementations of the sink traits. Each adapter owns an
/// unbound-port UDP socket and encodes one OSC message per call; sends are
/// fire-and-forget datagrams, so a dead receiver costs nothing but the
/// per-record error the dispatcher logs.
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use rosc::encoder;
use rosc::{OscMessage, OscPacket, OscType};

use super::{PlaybackSink, SpatialSink, SpatialUpdate};
use crate::error::SinkError;

/// OSC address the spatialization renderer listens on
pub const SPATIAL_ADDRESS: &str = "/spat/serv";

/// OSC addresses for the playback engine's clip transport
pub const FIRE_CLIP_ADDRESS: &str = "/clip/fire";
pub const STOP_CLIP_ADDRESS: &str = "/clip/stop";

fn resolve(addr: &str) -> Result<SocketAddr, SinkError> {
    addr.to_socket_addrs()
        .map_err(|_| SinkError::InvalidAddress(addr.to_string()))?
        .next()
        .ok_or_else(|| SinkError::InvalidAddress(addr.to_string()))
}

fn bind_ephemeral() -> Result<UdpSocket, SinkError> {
    UdpSocket::bind("0.0.0.0:0").map_err(SinkError::BindFailed)
}

fn send_message(
    socket: &UdpSocket,
    target: SocketAddr,
    addr: &str,
    args: Vec<OscType>,
) -> Result<(), SinkError> {
    let packet = OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    });

    let bytes = encoder::encode(&packet).map_err(|e| SinkError::EncodeFailed {
        address: addr.to_string(),
        source: Box::new(e),
    })?;

    socket
        .send_to(&bytes, target)
        .map_err(|e| SinkError::SendFailed {
            address: addr.to_string(),
            source: e,
        })?;

    Ok(())
}

/// Spatialization renderer sink over UDP
///
/// Sends `/spat/serv ["deg", channel, azimuth, elevation, radius, hspan,
/// vspan]`, the renderer's spherical-degrees convention.
pub struct OscSpatialSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl OscSpatialSink {
    /// Create a sink sending to the given renderer address
    pub fn new(target: &str) -> Result<Self, SinkError> {
        Ok(Self {
            socket: bind_ephemeral()?,
            target: resolve(target)?,
        })
    }
}

impl SpatialSink for OscSpatialSink {
    fn send_update(&self, update: &SpatialUpdate) -> Result<(), SinkError> {
        let args = vec![
            OscType::String("deg".to_string()),
            OscType::Int(i32::from(update.channel)),
            OscType::Float(update.azimuth),
            OscType::Float(update.elevation),
            OscType::Float(update.radius),
            OscType::Float(update.horizontal_span),
            OscType::Float(update.vertical_span),
        ];
        send_message(&self.socket, self.target, SPATIAL_ADDRESS, args)
    }
}

/// Clip playback engine sink over UDP
///
/// Sends `/clip/fire` and `/clip/stop` with `[target, clip_index]` args.
pub struct OscPlaybackSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl OscPlaybackSink {
    /// Create a sink sending to the given playback-engine address
    pub fn new(target: &str) -> Result<Self, SinkError> {
        Ok(Self {
            socket: bind_ephemeral()?,
            target: resolve(target)?,
        })
    }

    fn send_clip(&self, addr: &str, target: &str, clip_index: usize) -> Result<(), SinkError> {
        let args = vec![
            OscType::String(target.to_string()),
            OscType::Int(clip_index as i32),
        ];
        send_message(&self.socket, self.target, addr, args)
    }
}

impl PlaybackSink for OscPlaybackSink {
    fn fire_clip(&self, target: &str, clip_index: usize) -> Result<(), SinkError> {
        self.send_clip(FIRE_CLIP_ADDRESS, target, clip_index)
    }

    fn stop_clip(&self, target: &str, clip_index: usize) -> Result<(), SinkError> {
        self.send_clip(STOP_CLIP_ADDRESS, target, clip_index)
    }
}
