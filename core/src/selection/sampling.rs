use rand::Rng;
use rand::seq::IndexedRandom;

use super::SubnetGroups;

/// Shrinks every group larger than `max_size` to exactly `max_size` members.
///
/// Members are drawn uniformly without replacement. Groups already within the
/// bound are returned untouched and no key is ever dropped.
pub fn limit_group_size<R>(groups: SubnetGroups, max_size: usize, rng: &mut R) -> SubnetGroups
where
    R: Rng + ?Sized,
{
    groups
        .into_iter()
        .map(|(key, members)| {
            if members.len() <= max_size {
                return (key, members);
            }
            let sampled = members.choose_multiple(rng, max_size).cloned().collect();
            (key, sampled)
        })
        .collect()
}
