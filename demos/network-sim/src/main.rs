use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use dvnet::concepts::neighbour::CostTable;
use dvnet::framework::{ReplacementPolicy, RouterConfig};
use dvnet::network::{Network, Topology};
use log::{info, warn};
use simplelog::*;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    Observed,
    Relaxation,
}

impl From<Policy> for ReplacementPolicy {
    fn from(value: Policy) -> Self {
        match value {
            Policy::Observed => ReplacementPolicy::Observed,
            Policy::Relaxation => ReplacementPolicy::Relaxation,
        }
    }
}

/// Runs a distance-vector network simulation
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// topology json file, a small built-in network is used if omitted
    #[arg(short, long)]
    topology: Option<PathBuf>,
    /// overrides the route replacement policy of the topology
    #[arg(short, long, value_enum)]
    policy: Option<Policy>,
    /// how long to let the protocol settle before and after sending, in milliseconds
    #[arg(long, default_value_t = 500)]
    settle_ms: u64,
    #[arg(long, default_value = "H1")]
    from: String,
    #[arg(long, default_value = "H2")]
    to: String,
    #[arg(short, long, default_value = "hello from the other side")]
    message: String,
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

/// H1 - RA - RB - H2
fn builtin_topology() -> Topology {
    Topology::default()
        .with_config(RouterConfig::default())
        .with_host("H1")
        .with_host("H2")
        .with_router("RA", &CostTable::new().with("H1", 0, 1).with("RB", 1, 1))
        .with_router("RB", &CostTable::new().with("RA", 0, 1).with("H2", 1, 1))
        .with_link(("H1", 0), ("RA", 0))
        .with_link(("RA", 1), ("RB", 0))
        .with_link(("RB", 1), ("H2", 0))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    CombinedLogger::init(vec![TermLogger::new(
        args.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .context("Failed to init logger")?;

    let mut topology = match &args.topology {
        Some(path) => Topology::load(path)
            .with_context(|| format!("Failed to load topology from {}", path.display()))?,
        None => builtin_topology(),
    };
    if let Some(policy) = args.policy {
        topology.config.replacement = policy.into();
    }
    if topology.config.replacement == ReplacementPolicy::Observed {
        warn!("Using the observed replacement policy, routes may loop. Pass \"--policy relaxation\" for shortest paths.");
    }

    let mut network = Network::from_topology(&topology).context("Invalid topology")?;
    let sender = network
        .host(&args.from)
        .ok_or_else(|| anyhow!("No host named {}", args.from))?
        .clone();

    network.start().context("Failed to spawn node threads")?;
    network.advertise_all();
    sleep(Duration::from_millis(args.settle_ms));

    sender.send(args.to.clone(), args.message.clone())?;
    sleep(Duration::from_millis(args.settle_ms));

    network.stop();

    for router in network.routers() {
        info!("{}: final routing table\n{}", router.name, router.render_routes());
        info!("{}: {}", router.name, serde_json::to_string(&router.routes())?);
    }
    for host in network.hosts() {
        let received = host.received();
        info!("{}: received {} data packet(s)", host.addr, received.len());
        for pkt in received {
            info!("{}:   \"{}\"", host.addr, pkt.payload_str());
        }
    }
    Ok(())
}
