use crate::concepts::interface::Direction;
use crate::framework::NodeName;
use thiserror::Error;

/// Errors raised while turning packets into frames and back
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// The destination does not fit in the fixed width field. Never truncated.
    #[error("destination {dst:?} is wider than {width} characters")]
    DestinationTooWide { dst: String, width: usize },
    #[error("unknown protocol tag {0:?}")]
    UnknownProtocol(char),
    #[error("frame of {0} bytes is shorter than the packet header")]
    Truncated(usize),
    #[error("packet header is not valid utf-8")]
    InvalidUtf8,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterfaceError {
    /// Raised by non-blocking puts, callers must treat this as packet loss
    #[error("{direction} queue is full")]
    QueueFull { direction: Direction },
    #[error("{direction} queue is disconnected")]
    Disconnected { direction: Direction },
}

/// A single advertisement entry that could not be parsed. Only that entry is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvertError {
    #[error("entry {entry:?} is missing a field")]
    MissingField { entry: String },
    #[error("entry {entry:?} has an invalid cost")]
    InvalidCost { entry: String },
}

/// Although this is an error enum, these should be treated as warnings.
/// The router logs them and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingWarning {
    /// The advertiser is not a direct neighbour, so there is no link cost to add.
    #[error("advertisement from {advertiser}, which is not in the cost table")]
    UnknownAdvertiser { advertiser: NodeName },
    /// The cost table points at an interface the router does not have.
    /// This can only happen if the topology was wired inconsistently.
    #[error("no interface {itf}")]
    NoSuchInterface { itf: usize },
}

/// Problems found while building a network from a topology description
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("node {0} is defined more than once")]
    DuplicateNode(NodeName),
    #[error("link references unknown node {0}")]
    UnknownNode(NodeName),
    #[error("node {node} has no interface {itf}")]
    InterfaceOutOfRange { node: NodeName, itf: usize },
    #[error("unable to read topology: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse topology: {0}")]
    Json(#[from] serde_json::Error),
}
