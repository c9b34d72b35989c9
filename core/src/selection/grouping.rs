use cleanip_common::network::address::Address;

use super::SubnetGroups;

/// Places every address into the group of its [`SubnetKey`](cleanip_common::network::subnet::SubnetKey).
///
/// Each input address ends up in exactly one group, so the member count across
/// all groups equals the number of addresses supplied.
pub fn group_by_subnet<I>(addresses: I) -> SubnetGroups
where
    I: IntoIterator<Item = Address>,
{
    let mut groups = SubnetGroups::new();
    for addr in addresses {
        groups.entry(addr.subnet_key()).or_default().push(addr);
    }
    groups
}
