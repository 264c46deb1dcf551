use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log::info;
use serde::{Deserialize, Serialize};

/// Name of a router or host, MUST be unique within a network
pub type NodeName = String;

/// How an advertised route is compared against the route already in the table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// Replace when the stored total is lower than the raw advertised cost.
    /// This is not Bellman-Ford relaxation, and it readily produces routing loops.
    #[default]
    Observed,
    /// Replace when advertised cost plus link cost is strictly lower than the stored total.
    Relaxation,
}

impl ReplacementPolicy {
    /// Decides whether the candidate replaces the stored route
    ///
    /// # Arguments
    ///
    /// * `current`: total cost of the stored route
    /// * `advertised`: cost as advertised by the neighbour
    /// * `link_cost`: cost of the link to the advertising neighbour
    pub fn should_replace(self, current: u32, advertised: u32, link_cost: u32) -> bool {
        match self {
            ReplacementPolicy::Observed => current < advertised,
            ReplacementPolicy::Relaxation => crate::util::sum_cost(advertised, link_cost) < current,
        }
    }
}

/// Router parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// capacity of each interface queue, 0 for unbounded
    pub max_queue_size: usize,
    /// block on a full outbound queue instead of dropping the packet
    pub blocking_forward: bool,
    pub replacement: ReplacementPolicy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 0,
            blocking_forward: true,
            replacement: ReplacementPolicy::Observed,
        }
    }
}

/// Something that is driven by its own thread until asked to stop
pub trait Worker: Send + Sync {
    fn label(&self) -> String;
    /// one pass over the worker's queues, must never block on an empty queue
    fn step(&self);
    fn stop_flag(&self) -> &AtomicBool;

    fn stop(&self) {
        self.stop_flag().store(true, Ordering::Release);
    }

    fn run(&self) {
        info!("{}: Starting", self.label());
        loop {
            self.step();
            if self.stop_flag().load(Ordering::Acquire) {
                info!("{}: Ending", self.label());
                return;
            }
            thread::yield_now();
        }
    }
}
