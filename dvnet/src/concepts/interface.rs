use std::fmt::{Display, Formatter};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError, TrySendError};
use educe::Educe;
use serde::{Deserialize, Serialize};

use crate::concepts::packet::Frame;
use crate::feedback::InterfaceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

#[derive(Educe)]
#[educe(Debug)]
struct Queue {
    #[educe(Debug(ignore))]
    tx: Sender<Frame>,
    #[educe(Debug(ignore))]
    rx: Receiver<Frame>,
}

impl Queue {
    fn new(capacity: usize) -> Self {
        // a zero capacity crossbeam channel is a rendezvous, not an unbounded queue
        let (tx, rx) = if capacity == 0 {
            unbounded()
        } else {
            bounded(capacity)
        };
        Self { tx, rx }
    }
}

/// A simulated link endpoint, a pair of FIFO queues of frames.
///
/// An interface is shared between the node that owns it and the link layer,
/// all operations take `&self` and are safe to call from any thread.
#[derive(Educe)]
#[educe(Debug)]
pub struct Interface {
    /// 0 for unbounded
    pub capacity: usize,
    inbound: Queue,
    outbound: Queue,
}

impl Interface {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inbound: Queue::new(capacity),
            outbound: Queue::new(capacity),
        }
    }

    fn queue(&self, direction: Direction) -> &Queue {
        match direction {
            Direction::In => &self.inbound,
            Direction::Out => &self.outbound,
        }
    }

    /// Enqueues a frame.
    ///
    /// With `block` set, waits until the queue has room. Otherwise a full queue fails with
    /// [`InterfaceError::QueueFull`], which the caller should treat as packet loss.
    pub fn put(&self, frame: Frame, direction: Direction, block: bool) -> Result<(), InterfaceError> {
        let queue = self.queue(direction);
        if block {
            queue
                .tx
                .send(frame)
                .map_err(|_| InterfaceError::Disconnected { direction })
        } else {
            queue.tx.try_send(frame).map_err(|err| match err {
                TrySendError::Full(_) => InterfaceError::QueueFull { direction },
                TrySendError::Disconnected(_) => InterfaceError::Disconnected { direction },
            })
        }
    }

    /// Dequeues the oldest frame, never blocks
    pub fn get(&self, direction: Direction) -> Option<Frame> {
        match self.queue(direction).rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// number of frames waiting in the queue
    pub fn len(&self, direction: Direction) -> usize {
        self.queue(direction).rx.len()
    }

    pub fn is_empty(&self, direction: Direction) -> bool {
        self.queue(direction).rx.is_empty()
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self::new(0)
    }
}
