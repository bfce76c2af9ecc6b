use super::types::{SplitGroups, SplitTargets};
use crate::config::RebalancePolicy;
use crate::types::{EntityRecord, SplitTag};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// What one rebalancing call moved out of an oversized group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceStep {
    pub from: SplitTag,
    pub excess: usize,
    pub moved: Vec<(SplitTag, usize)>,
    pub moved_countries: Vec<String>,
}

impl RebalanceStep {
    fn untouched(from: SplitTag) -> Self {
        Self {
            from,
            excess: 0,
            moved: Vec::new(),
            moved_countries: Vec::new(),
        }
    }

    pub fn moved_rows(&self) -> usize {
        self.moved.iter().map(|(_, n)| n).sum()
    }
}

/// Moves rows out of groups that exceed their target row count.
///
/// Undersized groups are never topped up, so targets are best-effort.
pub struct SizeRebalancer {
    policy: RebalancePolicy,
}

impl SizeRebalancer {
    pub fn new(policy: RebalancePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RebalancePolicy {
        self.policy
    }

    /// Rebalance train, then val, then test; each step sees the previous moves
    pub fn rebalance_all<R: Rng + ?Sized>(
        &self,
        targets: &SplitTargets,
        groups: &mut SplitGroups,
        rng: &mut R,
    ) -> Vec<RebalanceStep> {
        SplitTag::all()
            .into_iter()
            .map(|tag| self.rebalance(tag, targets, groups, rng))
            .collect()
    }

    pub fn rebalance<R: Rng + ?Sized>(
        &self,
        tag: SplitTag,
        targets: &SplitTargets,
        groups: &mut SplitGroups,
        rng: &mut R,
    ) -> RebalanceStep {
        let target = targets.get(tag);
        let current = groups.get(tag).len();
        if current <= target {
            return RebalanceStep::untouched(tag);
        }
        let excess = current - target;

        let step = match self.policy {
            RebalancePolicy::CountryExclusive => {
                log::info!(
                    "{} holds {} rows against a target of {}; keeping it country-exclusive",
                    tag,
                    current,
                    target
                );
                RebalanceStep {
                    excess,
                    ..RebalanceStep::untouched(tag)
                }
            }
            RebalancePolicy::RowLevel => Self::move_rows(tag, excess, groups, rng),
            RebalancePolicy::CountryLevel => Self::move_countries(tag, excess, targets, groups, rng),
        };

        log::debug!(
            "Rebalanced {}: excess {}, moved {:?}",
            tag,
            step.excess,
            step.moved
        );
        step
    }

    /// Sample `excess` rows; the first half goes to the first other group, the rest to the second
    fn move_rows<R: Rng + ?Sized>(
        tag: SplitTag,
        excess: usize,
        groups: &mut SplitGroups,
        rng: &mut R,
    ) -> RebalanceStep {
        let group = groups.get_mut(tag);
        let picked = index::sample(rng, group.len(), excess).into_vec();

        let mut slots: Vec<Option<EntityRecord>> =
            std::mem::take(&mut group.rows).into_iter().map(Some).collect();
        let mut first_half: Vec<EntityRecord> =
            picked.iter().filter_map(|&i| slots[i].take()).collect();
        group.rows = slots.into_iter().flatten().collect();

        let moved_countries: BTreeSet<String> =
            first_half.iter().map(|r| r.country.clone()).collect();
        // Odd excess leaves the extra row to the second group
        let second_half = first_half.split_off(first_half.len() / 2);

        let [first, second] = tag.others();
        let moved = vec![(first, first_half.len()), (second, second_half.len())];
        groups.get_mut(first).rows.extend(first_half);
        groups.get_mut(second).rows.extend(second_half);

        RebalanceStep {
            from: tag,
            excess,
            moved,
            moved_countries: moved_countries.into_iter().collect(),
        }
    }

    /// Move whole countries that fit in the remaining excess, each to the neediest other group
    fn move_countries<R: Rng + ?Sized>(
        tag: SplitTag,
        excess: usize,
        targets: &SplitTargets,
        groups: &mut SplitGroups,
        rng: &mut R,
    ) -> RebalanceStep {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for row in &groups.get(tag).rows {
            *counts.entry(row.country.clone()).or_insert(0) += 1;
        }
        let mut candidates: Vec<(String, usize)> = groups
            .get(tag)
            .countries()
            .into_iter()
            .map(|c| {
                let n = counts.get(&c).copied().unwrap_or(0);
                (c, n)
            })
            .collect();
        candidates.shuffle(rng);

        let [first, second] = tag.others();
        let mut moved = vec![(first, 0), (second, 0)];
        let mut moved_countries = Vec::new();
        let mut remaining = excess;

        for (country, count) in candidates {
            if remaining == 0 {
                break;
            }
            if count > remaining {
                continue;
            }

            let deficit = |t: SplitTag, groups: &SplitGroups| {
                targets.get(t) as i64 - groups.get(t).len() as i64
            };
            let slot = if deficit(second, &*groups) > deficit(first, &*groups) { 1 } else { 0 };
            let destination = moved[slot].0;

            let group = groups.get_mut(tag);
            let (leaving, staying): (Vec<EntityRecord>, Vec<EntityRecord>) =
                std::mem::take(&mut group.rows)
                    .into_iter()
                    .partition(|r| r.country == country);
            group.rows = staying;
            groups.get_mut(destination).rows.extend(leaving);

            moved[slot].1 += count;
            remaining -= count;
            moved_countries.push(country);
        }

        if remaining > 0 {
            log::info!(
                "{} keeps {} rows over target; no remaining country fits",
                tag,
                remaining
            );
        }

        RebalanceStep {
            from: tag,
            excess,
            moved,
            moved_countries,
        }
    }

    /// Countries whose rows ended up in more than one group
    pub fn leaked_countries(groups: &SplitGroups) -> Vec<String> {
        let mut homes: HashMap<&str, BTreeSet<SplitTag>> = HashMap::new();
        for group in groups.iter() {
            for row in &group.rows {
                homes.entry(row.country.as_str()).or_default().insert(group.tag);
            }
        }
        let mut leaked: Vec<String> = homes
            .into_iter()
            .filter(|(_, tags)| tags.len() > 1)
            .map(|(country, _)| country.to_string())
            .collect();
        leaked.sort();
        leaked
    }
}
