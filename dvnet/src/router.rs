use crate::concepts::interface::{Direction, Interface};
use crate::concepts::neighbour::CostTable;
use crate::concepts::packet::{Frame, NetworkPacket, Protocol};
use crate::concepts::route::{Route, RouteAdvert, RoutingTable};
use crate::feedback::RoutingWarning;
use crate::framework::{NodeName, RouterConfig, Worker};
use crate::util::sum_cost;
use educe::Educe;
use log::{debug, info, trace, warn};
use std::fmt::{Display, Formatter, Write};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything the distance-vector engine mutates, guarded by one lock per router
#[derive(Debug, Default)]
struct RoutingState {
    routes: RoutingTable,
    /// every node seen so far, only used for rendering
    known_hosts: Vec<NodeName>,
}

/// A multi-interface router running a distance-vector protocol over its interfaces
#[derive(Educe)]
#[educe(Debug)]
pub struct Router {
    pub name: NodeName,
    pub config: RouterConfig,
    cost_table: CostTable,
    #[educe(Debug(ignore))]
    interfaces: Vec<Arc<Interface>>,
    state: Mutex<RoutingState>,
    #[educe(Debug(ignore))]
    stop: AtomicBool,
}

impl Router {
    /// Creates a router with one interface per cost table entry, and a routing table
    /// holding a direct route to every neighbour in the cost table.
    pub fn new(name: impl Into<NodeName>, cost_table: CostTable, config: RouterConfig) -> Self {
        let name = name.into();
        let interfaces = (0..cost_table.len())
            .map(|_| Arc::new(Interface::new(config.max_queue_size)))
            .collect();

        let mut state = RoutingState {
            routes: RoutingTable::new(),
            known_hosts: vec![name.clone()],
        };
        for (neighbour, link) in cost_table.iter() {
            if *neighbour == name {
                continue; // never route to ourself
            }
            state.routes.insert(
                neighbour.clone(),
                Route {
                    via: name.clone(),
                    itf: link.itf,
                    cost: link.link_cost,
                },
            );
        }

        info!("{name}: Initialized routing table\n{}", render_table(&name, &state));

        Self {
            name,
            config,
            cost_table,
            interfaces,
            state: Mutex::new(state),
            stop: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, RoutingState> {
        // the table is always left consistent between statements, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // region Inspection
    pub fn interfaces(&self) -> &[Arc<Interface>] {
        &self.interfaces
    }

    pub fn cost_table(&self) -> &CostTable {
        &self.cost_table
    }

    pub fn route(&self, dst: &str) -> Option<Route> {
        self.state().routes.get(dst).cloned()
    }

    /// a snapshot of the routing table
    pub fn routes(&self) -> RoutingTable {
        self.state().routes.clone()
    }

    pub fn known_hosts(&self) -> Vec<NodeName> {
        self.state().known_hosts.clone()
    }

    /// renders the table as a known hosts x destinations grid
    pub fn render_routes(&self) -> String {
        render_table(&self.name, &self.state())
    }
    // endregion

    /// Looks through every inbound queue once, and handles at most one packet per interface
    pub fn process_queues(&self) {
        self.scan(self.config.blocking_forward);
    }

    /// [`Router::process_queues`], but a full outbound queue always drops the packet.
    ///
    /// Use this when the same thread that steps the router also drains its links.
    pub fn poll(&self) {
        self.scan(false);
    }

    fn scan(&self, block: bool) {
        for (i, itf) in self.interfaces.iter().enumerate() {
            let Some(frame) = itf.get(Direction::In) else {
                continue;
            };
            match NetworkPacket::decode(&frame) {
                Ok(pkt) => match pkt.prot {
                    Protocol::Data => self.forward(&pkt, i, block),
                    Protocol::Control => self.learn(&pkt, i, block),
                },
                Err(err) => {
                    warn!("{}: dropping undecodable frame on interface {i}: {err}", self.name);
                }
            }
        }
    }

    // region Forwarding
    /// Forwards a data packet according to the routing table
    ///
    /// # Arguments
    ///
    /// * `pkt`: the packet to forward
    /// * `i`: the interface the packet arrived on
    pub fn forward_packet(&self, pkt: &NetworkPacket, i: usize) {
        self.forward(pkt, i, self.config.blocking_forward);
    }

    fn forward(&self, pkt: &NetworkPacket, i: usize, block: bool) {
        let Some(route) = self.route(&pkt.dst) else {
            // no negative acknowledgement, the packet just disappears
            return;
        };
        let frame = match pkt.encode() {
            Ok(frame) => frame,
            Err(err) => {
                warn!("{}: unable to re-encode packet \"{pkt}\": {err}", self.name);
                return;
            }
        };
        if self.transmit(route.itf, frame, pkt, i, block) {
            trace!(
                "{}: forwarding packet \"{pkt}\" from interface {i} to {}",
                self.name,
                route.itf
            );
        }
    }

    /// puts a frame on an outbound queue, returns false if it was lost
    fn transmit(&self, itf: usize, frame: Frame, pkt: &NetworkPacket, from: usize, block: bool) -> bool {
        let Some(interface) = self.interfaces.get(itf) else {
            warn!("{}: {}", self.name, RoutingWarning::NoSuchInterface { itf });
            return false;
        };
        match interface.put(frame, Direction::Out, block) {
            Ok(()) => true,
            Err(err) => {
                warn!("{}: packet \"{pkt}\" lost on interface {from}: {err}", self.name);
                false
            }
        }
    }
    // endregion

    // region Distance Vector
    /// Sends our whole routing table out of a single interface.
    ///
    /// Costs are advertised exactly as stored, whichever neighbour is listening.
    pub fn send_routes(&self, i: usize) {
        let payload = RouteAdvert::encode_table(&self.name, &self.state().routes);
        self.send_advert(i, payload, self.config.blocking_forward);
    }

    /// [`Router::send_routes`] on every interface
    pub fn advertise(&self) {
        self.advertise_with(self.config.blocking_forward);
    }

    pub(crate) fn advertise_with(&self, block: bool) {
        for i in 0..self.interfaces.len() {
            let payload = RouteAdvert::encode_table(&self.name, &self.state().routes);
            self.send_advert(i, payload, block);
        }
    }

    fn send_advert(&self, i: usize, payload: String, block: bool) {
        let pkt = NetworkPacket::control(payload);
        match pkt.encode() {
            Ok(frame) => {
                if self.transmit(i, frame, &pkt, i, block) {
                    trace!("{}: sending routing update \"{pkt}\" from interface {i}", self.name);
                }
            }
            Err(err) => warn!("{}: unable to encode routing update: {err}", self.name),
        }
    }

    /// Updates the routing table from an advertisement
    ///
    /// # Arguments
    ///
    /// * `pkt`: control packet carrying `advertiser:destination:cost;` entries
    /// * `i`: the interface the packet arrived on, learned routes leave through it
    pub fn update_routes(&self, pkt: &NetworkPacket, i: usize) {
        self.learn(pkt, i, self.config.blocking_forward);
    }

    fn learn(&self, pkt: &NetworkPacket, i: usize, block: bool) {
        let Ok(payload) = std::str::from_utf8(&pkt.payload) else {
            warn!("{}: ignoring routing update on interface {i}, payload is not utf-8", self.name);
            return;
        };

        // each newly learned destination is advertised back out of `i`, with the table as it
        // was right after the insertion. sent once the lock is released.
        let mut triggered = Vec::new();
        {
            let mut state = self.state();
            for advert in RouteAdvert::parse_batch(payload) {
                let advert = match advert {
                    Ok(advert) => advert,
                    Err(err) => {
                        warn!("{}: skipping advertisement entry: {err}", self.name);
                        continue;
                    }
                };
                let Some(neighbour) = self.cost_table.get(&advert.advertiser) else {
                    warn!(
                        "{}: skipping advertisement entry: {}",
                        self.name,
                        RoutingWarning::UnknownAdvertiser {
                            advertiser: advert.advertiser.clone()
                        }
                    );
                    continue;
                };
                let link_cost = neighbour.link_cost;
                debug!(
                    "{}: {} | {link_cost} | {} | {}",
                    self.name, advert.advertiser, advert.dst, advert.cost
                );

                if !state.known_hosts.contains(&advert.advertiser) {
                    state.known_hosts.push(advert.advertiser.clone());
                }
                if advert.dst == self.name {
                    continue;
                }

                let candidate = Route {
                    via: advert.advertiser,
                    itf: i,
                    cost: sum_cost(advert.cost, link_cost),
                };
                match state.routes.get(&advert.dst).map(|route| route.cost) {
                    None => {
                        state.routes.insert(advert.dst, candidate);
                        triggered.push(RouteAdvert::encode_table(&self.name, &state.routes));
                    }
                    Some(current) => {
                        if self
                            .config
                            .replacement
                            .should_replace(current, advert.cost, link_cost)
                        {
                            debug!(
                                "{}: replacing route to {} ({current}) with {} via {}",
                                self.name, advert.dst, candidate.cost, candidate.via
                            );
                            state.routes.insert(advert.dst, candidate);
                        }
                    }
                }
            }
            debug!("{}: routing table\n{}", self.name, render_table(&self.name, &state));
        }

        for payload in triggered {
            self.send_advert(i, payload, block);
        }
    }
    // endregion
}

impl Display for Router {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Worker for Router {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn step(&self) {
        self.process_queues();
    }

    fn stop_flag(&self) -> &AtomicBool {
        &self.stop
    }
}

/// One row per known host, one column per destination. A cell holds the cost if the
/// route to that destination goes via that host.
fn render_table(name: &str, state: &RoutingState) -> String {
    let width = state
        .known_hosts
        .iter()
        .map(String::len)
        .chain(state.routes.keys().map(String::len))
        .chain(state.routes.values().map(|route| route.cost.to_string().len()))
        .chain(std::iter::once(name.len()))
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    let _ = write!(out, "{name:>width$} |");
    for dst in state.routes.keys() {
        let _ = write!(out, " {dst:>width$} |");
    }
    for host in &state.known_hosts {
        let _ = write!(out, "\n{host:>width$} |");
        for route in state.routes.values() {
            if route.via == *host {
                let _ = write!(out, " {:>width$} |", route.cost);
            } else {
                let _ = write!(out, " {:>width$} |", "");
            }
        }
    }
    out
}
