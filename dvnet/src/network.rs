use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use educe::Educe;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::concepts::neighbour::CostTable;
use crate::feedback::TopologyError;
use crate::framework::{NodeName, RouterConfig, Worker};
use crate::host::Host;
use crate::link::{Endpoint, Link, LinkLayer};
use crate::router::Router;

/// An interface on a node, `["RA", 1]` in json
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port(pub NodeName, pub usize);

/// A duplex link between two ports
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub from: Port,
    pub to: Port,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterSpec {
    pub name: NodeName,
    /// {neighbour: {interface: cost}}
    #[serde_as(as = "BTreeMap<_, BTreeMap<DisplayFromStr, _>>")]
    pub costs: BTreeMap<NodeName, BTreeMap<usize, u32>>,
}

impl RouterSpec {
    /// Only the first interface listed for a neighbour is used
    pub fn cost_table(&self) -> CostTable {
        let mut table = CostTable::new();
        for (neighbour, links) in &self.costs {
            match links.iter().next() {
                Some((itf, cost)) => table.insert(neighbour.clone(), *itf, *cost),
                None => warn!("{}: no interface given for neighbour {neighbour}", self.name),
            }
        }
        table
    }
}

impl From<(&str, &CostTable)> for RouterSpec {
    fn from((name, table): (&str, &CostTable)) -> Self {
        Self {
            name: name.to_string(),
            costs: table
                .iter()
                .map(|(neighbour, link)| (neighbour.clone(), BTreeMap::from([(link.itf, link.link_cost)])))
                .collect(),
        }
    }
}

/// Description of a whole network, typically loaded from json
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// shared by every router
    #[serde(default)]
    pub config: RouterConfig,
    #[serde(default)]
    pub hosts: Vec<NodeName>,
    #[serde(default)]
    pub routers: Vec<RouterSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

impl Topology {
    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TopologyError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String, TopologyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_host(mut self, name: impl Into<NodeName>) -> Self {
        self.hosts.push(name.into());
        self
    }

    pub fn with_router(mut self, name: &str, costs: &CostTable) -> Self {
        self.routers.push((name, costs).into());
        self
    }

    pub fn with_link(mut self, from: (&str, usize), to: (&str, usize)) -> Self {
        self.links.push(LinkSpec {
            from: Port(from.0.to_string(), from.1),
            to: Port(to.0.to_string(), to.1),
        });
        self
    }
}

/// A running (or runnable) set of routers, hosts and the links between them
#[derive(Educe)]
#[educe(Debug)]
pub struct Network {
    routers: BTreeMap<NodeName, Arc<Router>>,
    hosts: BTreeMap<NodeName, Arc<Host>>,
    links: Arc<LinkLayer>,
    /// router and host threads
    #[educe(Debug(ignore))]
    handles: Vec<JoinHandle<()>>,
    #[educe(Debug(ignore))]
    link_handle: Option<JoinHandle<()>>,
}

impl Network {
    /// Builds every node and wires both directions of every link.
    ///
    /// The cost tables are trusted to match the wiring, only names and interface indexes are checked.
    pub fn from_topology(topology: &Topology) -> Result<Self, TopologyError> {
        let mut seen = BTreeSet::new();
        let names = topology
            .hosts
            .iter()
            .chain(topology.routers.iter().map(|spec| &spec.name));
        for name in names {
            if !seen.insert(name.clone()) {
                return Err(TopologyError::DuplicateNode(name.clone()));
            }
        }

        let hosts: BTreeMap<_, _> = topology
            .hosts
            .iter()
            .map(|name| (name.clone(), Arc::new(Host::new(name.clone()))))
            .collect();
        let routers: BTreeMap<_, _> = topology
            .routers
            .iter()
            .map(|spec| {
                let router = Router::new(spec.name.clone(), spec.cost_table(), topology.config.clone());
                (spec.name.clone(), Arc::new(router))
            })
            .collect();

        let mut network = Self {
            routers,
            hosts,
            links: Arc::new(LinkLayer::default()),
            handles: Vec::new(),
            link_handle: None,
        };

        let mut links = Vec::with_capacity(topology.links.len() * 2);
        for spec in &topology.links {
            let a = network.endpoint(&spec.from)?;
            let b = network.endpoint(&spec.to)?;
            links.push(Link::new(a.clone(), b.clone()));
            links.push(Link::new(b, a));
        }
        network.links = Arc::new(LinkLayer::new(links));
        Ok(network)
    }

    fn endpoint(&self, Port(node, itf): &Port) -> Result<Endpoint, TopologyError> {
        let interfaces = if let Some(router) = self.routers.get(node) {
            router.interfaces()
        } else if let Some(host) = self.hosts.get(node) {
            host.interfaces()
        } else {
            return Err(TopologyError::UnknownNode(node.clone()));
        };
        let interface = interfaces.get(*itf).ok_or_else(|| TopologyError::InterfaceOutOfRange {
            node: node.clone(),
            itf: *itf,
        })?;
        Ok(Endpoint {
            node: node.clone(),
            itf: *itf,
            interface: interface.clone(),
        })
    }

    pub fn router(&self, name: &str) -> Option<&Arc<Router>> {
        self.routers.get(name)
    }

    pub fn host(&self, name: &str) -> Option<&Arc<Host>> {
        self.hosts.get(name)
    }

    pub fn routers(&self) -> impl Iterator<Item = &Arc<Router>> {
        self.routers.values()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Arc<Host>> {
        self.hosts.values()
    }

    pub fn links(&self) -> &[Link] {
        &self.links.links
    }

    fn nodes(&self) -> Vec<Arc<dyn Worker>> {
        let mut workers: Vec<Arc<dyn Worker>> = Vec::new();
        workers.extend(self.routers.values().map(|r| r.clone() as Arc<dyn Worker>));
        workers.extend(self.hosts.values().map(|h| h.clone() as Arc<dyn Worker>));
        workers
    }

    /// Seeds the protocol: every router sends its table out of every interface.
    ///
    /// Outbound puts only block while the network is started, since nothing drains the links otherwise.
    pub fn advertise_all(&self) {
        let running = self.is_running();
        for router in self.routers.values() {
            router.advertise_with(running && router.config.blocking_forward);
        }
    }

    /// A single deterministic pass over the whole network, for use when the network is not started.
    /// Links move one frame each, then every node handles at most one frame per interface.
    ///
    /// Routers never block here, a full outbound queue is packet loss.
    pub fn tick(&self) {
        self.links.step();
        for router in self.routers.values() {
            router.poll();
        }
        for host in self.hosts.values() {
            host.step();
        }
    }

    pub fn tick_n(&self, times: usize) {
        for _ in 0..times {
            self.tick();
        }
    }

    /// Spawns one thread per router, per host, and one for the link layer
    pub fn start(&mut self) -> std::io::Result<()> {
        let links = self.links.clone();
        self.link_handle = Some(spawn(links)?);
        for worker in self.nodes() {
            self.handles.push(spawn(worker)?);
        }
        info!("Started {} threads", self.handles.len() + 1);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.link_handle.is_some() || !self.handles.is_empty()
    }

    /// Asks every node to stop, and waits for their threads to finish.
    ///
    /// The link layer goes last, so routers blocked on a full outbound queue can still finish their step.
    pub fn stop(&mut self) {
        for worker in self.nodes() {
            worker.stop();
        }
        for handle in self.handles.drain(..) {
            join(handle);
        }
        self.links.stop();
        if let Some(handle) = self.link_handle.take() {
            join(handle);
        }
    }
}

fn spawn(worker: Arc<dyn Worker>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(worker.label())
        .spawn(move || worker.run())
}

fn join(handle: JoinHandle<()>) {
    let name = handle.thread().name().unwrap_or("<unnamed>").to_string();
    if handle.join().is_err() {
        error!("{name}: thread panicked");
    }
}

impl Drop for Network {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}
