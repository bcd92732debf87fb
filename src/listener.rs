/// Inbound OSC listener
///
/// Receives UDP datagrams from the event source, decodes each OSC packet
/// (bundles are flattened), renders every `/sound/*` message into the
/// canonical record-string format and forwards the batch to the dispatch
/// loop over a channel. The wire contract: each message carries the sound
/// identifier as its first argument, followed by the five spatial floats
/// for play/update.
///
/// One socket, one reader thread, one consumer; records reach the
/// dispatcher strictly in arrival order.
use std::net::{SocketAddr, UdpSocket};
use std::thread;

use crossbeam_channel::Sender;
use rosc::{decoder, OscMessage, OscPacket, OscType};

use crate::error::ListenerError;

/// Address prefix of messages the router handles
const SOUND_PREFIX: &str = "/sound/";

/// UDP OSC receiver feeding the dispatch loop
pub struct OscListener {
    socket: UdpSocket,
}

impl OscListener {
    /// Bind the listener socket
    pub fn bind(addr: &str) -> Result<Self, ListenerError> {
        let socket = UdpSocket::bind(addr).map_err(|e| ListenerError::BindFailed {
            addr: addr.to_string(),
            source: e,
        })?;
        Ok(Self { socket })
    }

    /// The locally bound address (useful when binding port 0)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive datagrams forever, forwarding record batches to `tx`
    ///
    /// Returns when the receiving side of the channel is gone. Undecodable
    /// datagrams are per-packet warnings, never fatal.
    pub fn run(self, tx: Sender<Vec<String>>) {
        let mut buf = [0u8; decoder::MTU];

        loop {
            let size = match self.socket.recv_from(&mut buf) {
                Ok((size, _)) => size,
                Err(err) => {
                    tracing::warn!("Error receiving datagram: {err}");
                    continue;
                }
            };

            let packet = match decoder::decode_udp(&buf[..size]) {
                Ok((_, packet)) => packet,
                Err(err) => {
                    tracing::warn!("Dropping undecodable OSC packet: {err}");
                    continue;
                }
            };

            let mut messages = Vec::new();
            collect_messages(packet, &mut messages);

            let batch: Vec<String> = messages.iter().filter_map(format_record).collect();
            if batch.is_empty() {
                continue;
            }

            if tx.send(batch).is_err() {
                tracing::info!("Dispatch loop is gone, stopping listener");
                return;
            }
        }
    }

    /// Run the receive loop on a background thread
    pub fn spawn(self, tx: Sender<Vec<String>>) -> thread::JoinHandle<()> {
        thread::spawn(move || self.run(tx))
    }
}

/// Flatten a packet into its messages, recursing through bundles
fn collect_messages(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                collect_messages(inner, out);
            }
        }
    }
}

/// Render one `/sound/*` message as a record row
///
/// Other addresses and messages with unsupported argument types are
/// skipped.
fn format_record(msg: &OscMessage) -> Option<String> {
    if !msg.addr.starts_with(SOUND_PREFIX) {
        tracing::debug!("Ignoring message for {}", msg.addr);
        return None;
    }

    let mut record = msg.addr.clone();
    for arg in &msg.args {
        let token = match format_arg(arg) {
            Some(token) => token,
            None => {
                tracing::warn!(
                    "Dropping message for {}: unsupported argument type {:?}",
                    msg.addr,
                    arg
                );
                return None;
            }
        };
        record.push(' ');
        record.push_str(&token);
    }

    Some(record)
}

fn format_arg(arg: &OscType) -> Option<String> {
    match arg {
        OscType::String(s) => Some(format!("\"{s}\"")),
        OscType::Float(v) => Some(v.to_string()),
        OscType::Double(v) => Some(v.to_string()),
        OscType::Int(v) => Some(v.to_string()),
        OscType::Long(v) => Some(v.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use rosc::encoder;
    use rosc::{OscBundle, OscTime};
    use std::time::Duration;

    fn play_message(sound_id: &str) -> OscMessage {
        OscMessage {
            addr: "/sound/play".to_string(),
            args: vec![
                OscType::String(sound_id.to_string()),
                OscType::Float(10.0),
                OscType::Float(0.0),
                OscType::Float(1.0),
                OscType::Float(30.0),
                OscType::Float(10.0),
            ],
        }
    }

    #[test]
    fn test_format_play_record() {
        let record = format_record(&play_message("p0")).expect("should format");
        assert_eq!(record, "/sound/play \"p0\" 10 0 1 30 10");
    }

    #[test]
    fn test_format_stop_record() {
        let msg = OscMessage {
            addr: "/sound/stop".to_string(),
            args: vec![OscType::String("p0".to_string())],
        };
        assert_eq!(format_record(&msg).unwrap(), "/sound/stop \"p0\"");
    }

    #[test]
    fn test_other_addresses_are_ignored() {
        let msg = OscMessage {
            addr: "/spat/serv".to_string(),
            args: vec![],
        };
        assert!(format_record(&msg).is_none());
    }

    #[test]
    fn test_unsupported_argument_drops_message() {
        let msg = OscMessage {
            addr: "/sound/play".to_string(),
            args: vec![OscType::Nil],
        };
        assert!(format_record(&msg).is_none());
    }

    #[test]
    fn test_bundles_are_flattened() {
        let bundle = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 0,
            },
            content: vec![
                OscPacket::Message(play_message("p0")),
                OscPacket::Message(play_message("p1")),
            ],
        });

        let mut messages = Vec::new();
        collect_messages(bundle, &mut messages);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].args[0], OscType::String("p1".to_string()));
    }

    #[test]
    fn test_listener_forwards_record_batches() {
        let listener = OscListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");

        let (tx, rx) = unbounded();
        let _handle = listener.spawn(tx);

        let sender = UdpSocket::bind("127.0.0.1:0").expect("bind sender");
        let packet = OscPacket::Message(play_message("p0"));
        let bytes = encoder::encode(&packet).expect("encode");
        sender.send_to(&bytes, addr).expect("send");

        let batch = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("batch should arrive");
        assert_eq!(batch, vec!["/sound/play \"p0\" 10 0 1 30 10".to_string()]);
    }
}
