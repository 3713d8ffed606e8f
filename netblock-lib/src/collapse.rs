//! Collapsing the raw network collection into its canonical form.
use ipnet::{Ipv4Net, Ipv4Subnets};

/// Merge overlapping and adjacent networks into the minimal covering set.
///
/// The result covers exactly the same addresses as the input: duplicates
/// and subsets disappear, touching ranges are merged, and each merged
/// range is re-emitted as its minimal CIDR cover. Non-adjacent ranges are
/// never bridged into a wider supernet.
///
/// The output is strictly increasing by (address, prefix length). The
/// function is pure; any permutation of the same input multiset yields the
/// identical output.
#[must_use]
pub fn collapse<I>(networks: I) -> Vec<Ipv4Net>
where
    I: IntoIterator<Item = Ipv4Net>,
{
    let mut ranges: Vec<(u32, u32)> = networks
        .into_iter()
        .map(|net| (u32::from(net.network()), u32::from(net.broadcast())))
        .collect();
    ranges.sort_unstable();

    // Linear sweep over the address-sorted ranges. A range is folded into
    // its predecessor when it overlaps it or starts directly after its
    // last address.
    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some((_, prev_end)) if start <= prev_end.saturating_add(1) => {
                *prev_end = (*prev_end).max(end);
            }
            _ => merged.push((start, end)),
        }
    }

    merged
        .into_iter()
        .flat_map(|(start, end)| Ipv4Subnets::new(start.into(), end.into(), 0))
        .collect()
}
