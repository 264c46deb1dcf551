use dvnet::concepts::neighbour::CostTable;
use dvnet::framework::{ReplacementPolicy, RouterConfig};
use dvnet::network::Topology;

/// H1 - RA - RB - H2
pub fn line(replacement: ReplacementPolicy) -> Topology {
    Topology::default()
        .with_config(RouterConfig {
            replacement,
            ..Default::default()
        })
        .with_host("H1")
        .with_host("H2")
        .with_router("RA", &CostTable::new().with("H1", 0, 1).with("RB", 1, 1))
        .with_router("RB", &CostTable::new().with("RA", 0, 1).with("H2", 1, 1))
        .with_link(("H1", 0), ("RA", 0))
        .with_link(("RA", 1), ("RB", 0))
        .with_link(("RB", 1), ("H2", 0))
}

///        RB
///   2 /     \ 2
/// H1 - RA    RD - H2
///   5 \     / 1
///        RC
pub fn diamond(replacement: ReplacementPolicy) -> Topology {
    Topology::default()
        .with_config(RouterConfig {
            replacement,
            ..Default::default()
        })
        .with_host("H1")
        .with_host("H2")
        .with_router(
            "RA",
            &CostTable::new().with("H1", 0, 1).with("RB", 1, 2).with("RC", 2, 5),
        )
        .with_router("RB", &CostTable::new().with("RA", 0, 2).with("RD", 1, 2))
        .with_router("RC", &CostTable::new().with("RA", 0, 5).with("RD", 1, 1))
        .with_router(
            "RD",
            &CostTable::new().with("RB", 0, 2).with("RC", 1, 1).with("H2", 2, 1),
        )
        .with_link(("H1", 0), ("RA", 0))
        .with_link(("RA", 1), ("RB", 0))
        .with_link(("RA", 2), ("RC", 0))
        .with_link(("RB", 1), ("RD", 0))
        .with_link(("RC", 1), ("RD", 1))
        .with_link(("RD", 2), ("H2", 0))
}

///                 / H2
/// H1 - RA - RB <
///                 \ H3
pub fn fork(config: RouterConfig) -> Topology {
    Topology::default()
        .with_config(config)
        .with_host("H1")
        .with_host("H2")
        .with_host("H3")
        .with_router("RA", &CostTable::new().with("H1", 0, 1).with("RB", 1, 1))
        .with_router(
            "RB",
            &CostTable::new().with("RA", 0, 1).with("H2", 1, 1).with("H3", 2, 1),
        )
        .with_link(("H1", 0), ("RA", 0))
        .with_link(("RA", 1), ("RB", 0))
        .with_link(("RB", 1), ("H2", 0))
        .with_link(("RB", 2), ("H3", 0))
}
