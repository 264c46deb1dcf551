use std::fmt::{Display, Formatter};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use educe::Educe;
use log::{trace, warn};

use crate::concepts::interface::{Direction, Interface};
use crate::framework::{NodeName, Worker};

/// One side of a link, an interface on a named node
#[derive(Educe, Clone)]
#[educe(Debug)]
pub struct Endpoint {
    pub node: NodeName,
    pub itf: usize,
    #[educe(Debug(ignore))]
    pub interface: Arc<Interface>,
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.node, self.itf)
    }
}

/// A one way link, from one interface's outbound queue to another's inbound queue
#[derive(Debug, Clone)]
pub struct Link {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Link {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self { from, to }
    }

    /// Moves at most one frame across the link, returns true if a frame was delivered
    pub fn transmit(&self) -> bool {
        let Some(frame) = self.from.interface.get(Direction::Out) else {
            return false;
        };
        match self.to.interface.put(frame, Direction::In, false) {
            Ok(()) => {
                trace!("{self}: transmitted frame");
                true
            }
            Err(err) => {
                warn!("{self}: frame lost: {err}");
                false
            }
        }
    }
}

impl Display for Link {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Drives every link in the network
#[derive(Educe, Default)]
#[educe(Debug)]
pub struct LinkLayer {
    pub links: Vec<Link>,
    #[educe(Debug(ignore))]
    stop: AtomicBool,
}

impl LinkLayer {
    pub fn new(links: Vec<Link>) -> Self {
        Self {
            links,
            stop: AtomicBool::new(false),
        }
    }

    /// one frame per link, returns the number of frames delivered
    pub fn transfer(&self) -> usize {
        self.links.iter().filter(|link| link.transmit()).count()
    }
}

impl Worker for LinkLayer {
    fn label(&self) -> String {
        "Network".to_string()
    }

    fn step(&self) {
        self.transfer();
    }

    fn stop_flag(&self) -> &AtomicBool {
        &self.stop
    }
}
