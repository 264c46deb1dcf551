use std::fmt::{Display, Formatter};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

use educe::Educe;
use log::{debug, info, warn};

use crate::concepts::interface::{Direction, Interface};
use crate::concepts::packet::{NetworkPacket, Protocol};
use crate::feedback::PacketError;
use crate::framework::{NodeName, Worker};

/// A traffic source and sink with a single interface
#[derive(Educe)]
#[educe(Debug)]
pub struct Host {
    pub addr: NodeName,
    #[educe(Debug(ignore))]
    interfaces: [Arc<Interface>; 1],
    /// data packets received so far
    inbox: Mutex<Vec<NetworkPacket>>,
    #[educe(Debug(ignore))]
    stop: AtomicBool,
}

impl Host {
    pub fn new(addr: impl Into<NodeName>) -> Self {
        Self {
            addr: addr.into(),
            interfaces: [Arc::new(Interface::new(0))],
            inbox: Mutex::new(Vec::new()),
            stop: AtomicBool::new(false),
        }
    }

    pub fn interface(&self) -> &Arc<Interface> {
        &self.interfaces[0]
    }

    pub fn interfaces(&self) -> &[Arc<Interface>] {
        &self.interfaces
    }

    /// Creates a data packet and enqueues it for transmission
    pub fn send(&self, dst: impl Into<NodeName>, payload: impl Into<Vec<u8>>) -> Result<(), PacketError> {
        let pkt = NetworkPacket::data(dst, payload);
        let frame = pkt.encode()?;
        info!("{}: sending packet \"{pkt}\"", self.addr);
        if let Err(err) = self.interface().put(frame, Direction::Out, false) {
            warn!("{}: packet \"{pkt}\" lost: {err}", self.addr);
        }
        Ok(())
    }

    /// Receives at most one packet from the network layer
    pub fn receive(&self) -> Option<NetworkPacket> {
        let frame = self.interface().get(Direction::In)?;
        let pkt = match NetworkPacket::decode(&frame) {
            Ok(pkt) => pkt,
            Err(err) => {
                warn!("{}: dropping undecodable frame: {err}", self.addr);
                return None;
            }
        };
        match pkt.prot {
            Protocol::Data => {
                info!("{}: received packet \"{pkt}\"", self.addr);
                self.inbox
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(pkt.clone());
            }
            Protocol::Control => debug!("{}: received routing update \"{pkt}\"", self.addr),
        }
        Some(pkt)
    }

    /// the data packets received so far, oldest first
    pub fn received(&self) -> Vec<NetworkPacket> {
        self.inbox.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Display for Host {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.addr)
    }
}

impl Worker for Host {
    fn label(&self) -> String {
        self.addr.clone()
    }

    fn step(&self) {
        self.receive();
    }

    fn stop_flag(&self) -> &AtomicBool {
        &self.stop
    }
}
