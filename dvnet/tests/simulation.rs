use dvnet::concepts::packet::NetworkPacket;
use dvnet::concepts::route::Route;
use dvnet::feedback::TopologyError;
use dvnet::framework::{ReplacementPolicy, RouterConfig};
use dvnet::network::{Network, Topology};

mod common;
use common::{finishes, graphs, wait_until};

#[test]
fn loads_topology_from_json() {
    let topology = Topology::from_json(
        r#"{
            "config": { "max_queue_size": 16, "replacement": "relaxation" },
            "hosts": ["H1"],
            "routers": [ { "name": "RA", "costs": { "H1": { "0": 3 } } } ],
            "links": [ { "from": ["H1", 0], "to": ["RA", 0] } ]
        }"#,
    )
    .unwrap();

    assert_eq!(
        topology.config,
        RouterConfig {
            max_queue_size: 16,
            blocking_forward: true,
            replacement: ReplacementPolicy::Relaxation,
        }
    );
    let network = Network::from_topology(&topology).unwrap();
    let ra = network.router("RA").unwrap();
    assert_eq!(
        ra.route("H1"),
        Some(Route {
            via: "RA".into(),
            itf: 0,
            cost: 3
        })
    );
    assert_eq!(ra.interfaces()[0].capacity, 16);
    assert_eq!(network.links().len(), 2);
}

#[test]
fn rejects_bad_topologies() {
    let duplicate = graphs::line(ReplacementPolicy::Observed).with_host("RA");
    assert!(matches!(
        Network::from_topology(&duplicate),
        Err(TopologyError::DuplicateNode(name)) if name == "RA"
    ));

    let unknown = graphs::line(ReplacementPolicy::Observed).with_link(("RA", 0), ("RZ", 0));
    assert!(matches!(
        Network::from_topology(&unknown),
        Err(TopologyError::UnknownNode(name)) if name == "RZ"
    ));

    let out_of_range = graphs::line(ReplacementPolicy::Observed).with_link(("H1", 1), ("RB", 0));
    assert!(matches!(
        Network::from_topology(&out_of_range),
        Err(TopologyError::InterfaceOutOfRange { itf: 1, .. })
    ));

    assert!(matches!(Topology::from_json("{ not json"), Err(TopologyError::Json(_))));
}

#[test]
fn delivers_across_a_line() {
    let network = Network::from_topology(&graphs::line(ReplacementPolicy::Relaxation)).unwrap();
    network.advertise_all();
    network.tick_n(10);

    let ra = network.router("RA").unwrap();
    assert_eq!(
        ra.route("H2"),
        Some(Route {
            via: "RB".into(),
            itf: 1,
            cost: 2
        })
    );
    assert_eq!(ra.route("H1").map(|r| r.via), Some("RA".to_string()));

    let h1 = network.host("H1").unwrap();
    h1.send("H2", "hello over there").unwrap();
    network.tick_n(20);

    let h2 = network.host("H2").unwrap();
    assert_eq!(h2.received(), vec![NetworkPacket::data("H2", "hello over there")]);
    assert!(network.host("H1").unwrap().received().is_empty());
}

#[test]
fn observed_policy_points_direct_neighbours_back_upstream() {
    let network = Network::from_topology(&graphs::line(ReplacementPolicy::Observed)).unwrap();
    network.advertise_all();
    network.tick_n(10);

    // new destinations are always learned
    let ra = network.router("RA").unwrap();
    let rb = network.router("RB").unwrap();
    assert_eq!(ra.route("H2").map(|r| r.cost), Some(2));
    assert_eq!(rb.route("H1").map(|r| r.cost), Some(2));

    // but each router replaces its direct host route with the costlier one its peer advertised
    assert_eq!(
        ra.route("H1"),
        Some(Route {
            via: "RB".into(),
            itf: 1,
            cost: 3
        })
    );
    assert_eq!(
        rb.route("H2"),
        Some(Route {
            via: "RA".into(),
            itf: 0,
            cost: 3
        })
    );
    assert_eq!(ra.known_hosts(), vec!["RA".to_string(), "RB".to_string()]);
}

#[test]
fn periodic_advertisement_converges_on_the_cheapest_path() {
    let network = Network::from_topology(&graphs::diamond(ReplacementPolicy::Relaxation)).unwrap();
    for _ in 0..5 {
        network.advertise_all();
        network.tick_n(20);
    }

    let ra = network.router("RA").unwrap();
    assert_eq!(
        ra.route("H2"),
        Some(Route {
            via: "RB".into(),
            itf: 1,
            cost: 5
        })
    );
    let rd = network.router("RD").unwrap();
    assert_eq!(rd.route("H1").map(|r| (r.via, r.cost)), Some(("RB".to_string(), 5)));

    network.host("H2").unwrap().send("H1", "back").unwrap();
    network.tick_n(40);
    assert_eq!(
        network.host("H1").unwrap().received(),
        vec![NetworkPacket::data("H1", "back")]
    );
}

#[test]
fn threaded_network_delivers_and_stops() {
    let mut network = Network::from_topology(&graphs::line(ReplacementPolicy::Relaxation)).unwrap();
    network.start().unwrap();
    assert!(network.is_running());
    network.advertise_all();

    let ra = network.router("RA").unwrap().clone();
    let rb = network.router("RB").unwrap().clone();
    wait_until("routes to both hosts", || {
        ra.route("H2").is_some() && rb.route("H1").is_some()
    });

    network.host("H1").unwrap().send("H2", "threads").unwrap();
    let h2 = network.host("H2").unwrap().clone();
    wait_until("delivery to H2", || !h2.received().is_empty());
    assert_eq!(h2.received(), vec![NetworkPacket::data("H2", "threads")]);

    network.stop();
    assert!(!network.is_running());
}

#[test]
fn topology_survives_json() {
    let topology = graphs::diamond(ReplacementPolicy::Relaxation);
    let json = topology.to_json().unwrap();
    assert_eq!(Topology::from_json(&json).unwrap(), topology);
}

fn bounded() -> RouterConfig {
    RouterConfig {
        max_queue_size: 1,
        replacement: ReplacementPolicy::Relaxation,
        ..Default::default()
    }
}

#[test]
fn ticking_with_bounded_queues_drops_instead_of_blocking() {
    // RB advertises two new destinations to RA at once, RA's second triggered update finds its
    // outbound queue full, and nothing else would drain it while `tick` runs
    let network = Network::from_topology(&graphs::fork(bounded())).unwrap();
    let network = finishes("ticking", move || {
        network.advertise_all();
        network.tick_n(10);
        network
    });

    let ra = network.router("RA").unwrap();
    assert_eq!(ra.route("H2").map(|r| (r.via, r.cost)), Some(("RB".to_string(), 2)));
    assert_eq!(ra.route("H3").map(|r| (r.via, r.cost)), Some(("RB".to_string(), 2)));
    assert_eq!(
        network.router("RB").unwrap().route("H1").map(|r| (r.via, r.cost)),
        Some(("RA".to_string(), 2))
    );
}

#[test]
fn threaded_bounded_network_stops() {
    let mut network = Network::from_topology(&graphs::fork(bounded())).unwrap();
    let network = finishes("bounded network", move || {
        network.start().unwrap();
        let ra = network.router("RA").unwrap().clone();
        let rb = network.router("RB").unwrap().clone();
        // updates may be lost on full queues, so keep advertising until everything is known
        wait_until("routes to every host", || {
            network.advertise_all();
            ra.route("H2").is_some() && ra.route("H3").is_some() && rb.route("H1").is_some()
        });

        let h1 = network.host("H1").unwrap().clone();
        let h3 = network.host("H3").unwrap().clone();
        wait_until("delivery to H3", || {
            h1.send("H3", "bounded").unwrap();
            !h3.received().is_empty()
        });

        network.stop();
        network
    });

    assert!(!network.is_running());
    assert!(network
        .host("H3")
        .unwrap()
        .received()
        .iter()
        .all(|pkt| *pkt == NetworkPacket::data("H3", "bounded")));
    assert!(network.host("H2").unwrap().received().is_empty());
}
