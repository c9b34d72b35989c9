use rand::Rng;
use rand::seq::IndexedRandom;

use cleanip_common::error::{CleanIpError, Result};

use super::{Selection, SubnetGroups};

/// Picks one member of every group uniformly at random.
///
/// A group without members is a caller bug and reported as
/// [`CleanIpError::EmptyGroup`] instead of being skipped.
pub fn select_representatives<R>(groups: &SubnetGroups, rng: &mut R) -> Result<Selection>
where
    R: Rng + ?Sized,
{
    groups
        .iter()
        .map(|(key, members)| {
            let chosen = members
                .choose(rng)
                .ok_or_else(|| CleanIpError::EmptyGroup(key.to_string()))?;
            Ok((key.clone(), chosen.clone()))
        })
        .collect()
}
