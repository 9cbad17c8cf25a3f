//! Stations and channels assembled from the station control headers.
use log::warn;

use crate::blockettes::{Blockette, Blockette50, Blockette51, Blockette52};

/// One channel: its Blockette 52 and the response-stage blockettes (53-62)
/// in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    pub b52: Blockette52,
    pub response: Vec<Blockette>,
}

impl Channel {
    pub fn new(b52: Blockette52) -> Self {
        Channel {
            b52,
            response: Vec::new(),
        }
    }

    /// Attach a response blockette (53-62) to this channel.
    pub fn add(&mut self, b: Blockette) {
        match b.kind() {
            Some(53..=62) => self.response.push(b),
            _ => {}
        }
    }
}

/// All blockettes belonging to a single Blockette 50: the ordered station
/// comments (51) and the channels with their responses.
///
/// Identity is `(network, station)`; the framer replaces a station when a
/// later Blockette 50 carries the same identity.
#[derive(Debug, Clone, Default)]
pub struct Station {
    pub b50: Blockette50,
    pub b51: Vec<Blockette51>,
    pub channels: Vec<Channel>,
}

impl Station {
    pub fn new(b50: Blockette50) -> Self {
        Station {
            b50,
            b51: Vec::new(),
            channels: Vec::new(),
        }
    }

    /// Attach a blockette of type 51-62 to this station. Response blockettes
    /// go to the most recent channel.
    pub fn add(&mut self, b: Blockette) {
        match b {
            Blockette::B51(x) => self.b51.push(x),
            Blockette::B52(x) => self.channels.push(Channel::new(x)),
            other => {
                if let Some(53..=62) = other.kind() {
                    match self.channels.last_mut() {
                        Some(chan) => chan.add(other),
                        None => {
                            warn!(
                                "blockette {} found before blockette 52",
                                other.kind().unwrap_or(0)
                            );
                        }
                    }
                }
            }
        }
    }

    /// Find a channel by its location and channel codes.
    pub fn channel(&self, location: &str, channel: &str) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|c| c.b52.channel == channel && c.b52.location == location)
    }
}
