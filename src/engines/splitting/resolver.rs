use super::types::SplitIndexSet;
use crate::config::DuplicateIdPolicy;
use crate::error::{CountrysplitError, Result};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Maps split ids back to positions in the master id list
pub struct IndexResolver {
    policy: DuplicateIdPolicy,
}

impl IndexResolver {
    pub fn new(policy: DuplicateIdPolicy) -> Self {
        Self { policy }
    }

    /// Positions (ascending) of the ids in `split_ids` that also appear in `master_ids`.
    ///
    /// Each id resolves to its first occurrence in `master_ids`; later duplicates are
    /// unreachable under `FirstMatch` and an error under `Reject`.
    pub fn resolve<T, S>(&self, split_ids: &[S], master_ids: &[T]) -> Result<SplitIndexSet>
    where
        T: Eq + Hash + std::fmt::Debug,
        S: Borrow<T>,
    {
        let positions = self.first_positions(master_ids)?;

        let mut resolved = Vec::with_capacity(split_ids.len());
        let mut missing = 0usize;
        for id in split_ids {
            let key: &T = id.borrow();
            match positions.get(key) {
                Some(&position) => resolved.push(position),
                None => missing += 1,
            }
        }

        if missing > 0 {
            log::debug!("{} split ids are absent from the master list", missing);
        }
        Ok(SplitIndexSet::new(resolved))
    }

    fn first_positions<'a, T>(&self, master_ids: &'a [T]) -> Result<HashMap<&'a T, usize>>
    where
        T: Eq + Hash + std::fmt::Debug,
    {
        let mut positions = HashMap::with_capacity(master_ids.len());
        for (position, id) in master_ids.iter().enumerate() {
            if positions.contains_key(id) {
                match self.policy {
                    DuplicateIdPolicy::FirstMatch => {
                        log::debug!("Id {:?} repeats at position {}; keeping the first", id, position);
                    }
                    DuplicateIdPolicy::Reject => {
                        return Err(CountrysplitError::Configuration(format!(
                            "Id {:?} appears more than once in the master id list (position {})",
                            id, position
                        )));
                    }
                }
            } else {
                positions.insert(id, position);
            }
        }
        Ok(positions)
    }
}
