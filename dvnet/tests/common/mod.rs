#![allow(dead_code)]

pub mod graphs;

use std::sync::mpsc;
use std::thread::{self, sleep};
use std::time::{Duration, Instant};

use dvnet::concepts::interface::{Direction, Interface};
use dvnet::concepts::packet::NetworkPacket;

/// polls until the condition holds, or panics after the deadline
pub fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !cond() {
        if Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        sleep(Duration::from_millis(5));
    }
}

/// runs `f` on its own thread, and panics if it has not returned after the deadline
pub fn finishes<T: Send + 'static>(what: &str, f: impl FnOnce() -> T + Send + 'static) -> T {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    match rx.recv_timeout(Duration::from_secs(10)) {
        Ok(value) => value,
        Err(_) => panic!("{what} did not finish"),
    }
}

/// decodes everything waiting on an outbound queue
pub fn drain_out(itf: &Interface) -> Vec<NetworkPacket> {
    let mut packets = Vec::new();
    while let Some(frame) = itf.get(Direction::Out) {
        packets.push(NetworkPacket::decode(&frame).expect("router emitted an undecodable frame"));
    }
    packets
}

pub fn deliver(itf: &Interface, pkt: &NetworkPacket) {
    itf.put(pkt.encode().unwrap(), Direction::In, false).unwrap();
}

/// the entries of an advertisement, sorted so payloads can be compared structurally
pub fn entries(pkt: &NetworkPacket) -> Vec<String> {
    let mut entries: Vec<String> = pkt
        .payload_str()
        .split(';')
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect();
    entries.sort();
    entries
}
