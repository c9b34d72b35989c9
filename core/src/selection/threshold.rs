use super::{LatencyMap, SubnetGroups};

/// Keeps addresses whose measured latency lies in `low..=high`.
///
/// Addresses without a measurement are dropped, and so is any group left with
/// no members.
pub fn filter_by_threshold(
    groups: SubnetGroups,
    latencies: &LatencyMap,
    low: f64,
    high: f64,
) -> SubnetGroups {
    groups
        .into_iter()
        .filter_map(|(key, members)| {
            let survivors: Vec<_> = members
                .into_iter()
                .filter(|addr| {
                    latencies
                        .get(addr)
                        .is_some_and(|&ms| low <= ms && ms <= high)
                })
                .collect();
            (!survivors.is_empty()).then_some((key, survivors))
        })
        .collect()
}
