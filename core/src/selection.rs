//! The candidate-selection stages.
//!
//! Each stage consumes the previous stage's output whole and hands a new value
//! to the next one:
//!
//! 1. [`group_by_subnet`] partitions the extracted addresses by [`SubnetKey`].
//! 2. [`limit_group_size`] samples every group down to a probing budget.
//! 3. latencies are measured by the [`prober`](crate::prober).
//! 4. [`filter_by_threshold`] keeps addresses inside the latency window.
//! 5. [`select_representatives`] picks one survivor per group.
//!
//! The random stages take the generator as an argument so callers decide how it
//! is seeded.

use std::collections::{BTreeMap, HashMap};

use cleanip_common::network::address::Address;
use cleanip_common::network::subnet::SubnetKey;

mod grouping;
mod representative;
mod sampling;
mod threshold;

pub use grouping::group_by_subnet;
pub use representative::select_representatives;
pub use sampling::limit_group_size;
pub use threshold::filter_by_threshold;

/// Candidate addresses partitioned by subnet key. Member order has no meaning.
pub type SubnetGroups = BTreeMap<SubnetKey, Vec<Address>>;

/// Mean round-trip time in milliseconds, present only for reachable addresses.
pub type LatencyMap = HashMap<Address, f64>;

/// One representative address per surviving group.
pub type Selection = BTreeMap<SubnetKey, Address>;

pub fn total_members(groups: &SubnetGroups) -> usize {
    groups.values().map(Vec::len).sum()
}
