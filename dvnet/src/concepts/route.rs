use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::feedback::AdvertError;
use crate::framework::NodeName;

/// separates the fields of one advertisement entry
pub const FIELD_SEP: char = ':';
/// terminates each advertisement entry
pub const ENTRY_SEP: char = ';';

/// The single best known route to a destination
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// the neighbour this route was learned from, or the router itself for a direct neighbour
    pub via: NodeName,
    /// the interface packets for this destination leave on
    pub itf: usize,
    pub cost: u32,
}

/// Destination, Route. At most one route per destination.
pub type RoutingTable = BTreeMap<NodeName, Route>;

/// One `advertiser:destination:cost` entry of a control packet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteAdvert {
    pub advertiser: NodeName,
    pub dst: NodeName,
    pub cost: u32,
}

impl RouteAdvert {
    pub fn parse(entry: &str) -> Result<Self, AdvertError> {
        let mut fields = entry.split(FIELD_SEP);
        let (Some(advertiser), Some(dst), Some(cost)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(AdvertError::MissingField {
                entry: entry.to_string(),
            });
        };
        if advertiser.is_empty() || dst.is_empty() || fields.next().is_some() {
            return Err(AdvertError::MissingField {
                entry: entry.to_string(),
            });
        }
        let cost = cost.trim().parse().map_err(|_| AdvertError::InvalidCost {
            entry: entry.to_string(),
        })?;
        Ok(Self {
            advertiser: advertiser.to_string(),
            dst: dst.to_string(),
            cost,
        })
    }

    /// Splits a control payload into entries. Empty segments are ignored,
    /// every other segment yields either an advert or the reason it was rejected.
    pub fn parse_batch(payload: &str) -> impl Iterator<Item = Result<Self, AdvertError>> + '_ {
        payload
            .split(ENTRY_SEP)
            .filter(|entry| !entry.is_empty())
            .map(Self::parse)
    }

    /// Builds the payload a router sends to advertise its own table
    pub fn encode_table(advertiser: &str, table: &RoutingTable) -> String {
        table
            .iter()
            .map(|(dst, route)| {
                RouteAdvert {
                    advertiser: advertiser.to_string(),
                    dst: dst.clone(),
                    cost: route.cost,
                }
                .to_string()
            })
            .collect()
    }
}

impl Display for RouteAdvert {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{FIELD_SEP}{}{FIELD_SEP}{}{ENTRY_SEP}",
            self.advertiser, self.dst, self.cost
        )
    }
}
