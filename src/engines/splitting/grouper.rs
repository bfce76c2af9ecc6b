use super::types::{CountryAssignment, SplitGroups, SplitRatios};
use crate::data::EntityTable;
use crate::types::SplitTag;
use rand::seq::SliceRandom;
use rand::Rng;

/// Draws disjoint country sets for train, validation and test
pub struct CountryGrouper {
    ratios: SplitRatios,
}

impl CountryGrouper {
    pub fn new(ratios: SplitRatios) -> Self {
        Self { ratios }
    }

    /// Shuffle `countries` and cut at `floor(n*train)` and `floor(n*(train+val))`
    pub fn group<R: Rng + ?Sized>(&self, countries: &[String], rng: &mut R) -> CountryAssignment {
        let mut shuffled = countries.to_vec();
        shuffled.shuffle(rng);

        let n = shuffled.len();
        let train_cutoff = ((n as f64 * self.ratios.train) as usize).min(n);
        let val_cutoff =
            ((n as f64 * (self.ratios.train + self.ratios.val)) as usize).clamp(train_cutoff, n);

        let test = shuffled.split_off(val_cutoff);
        let val = shuffled.split_off(train_cutoff);

        log::debug!(
            "Grouped {} countries into {}/{}/{}",
            n,
            shuffled.len(),
            val.len(),
            test.len()
        );

        CountryAssignment {
            train: shuffled,
            val,
            test,
        }
    }

    /// Put every entity row into the group its country was drawn for
    pub fn partition(&self, entities: &EntityTable, assignment: &CountryAssignment) -> SplitGroups {
        let mut groups = SplitGroups::new();
        for record in entities.records() {
            match assignment.tag_of(&record.country) {
                Some(tag) => groups.get_mut(tag).rows.push(record.clone()),
                None => log::warn!(
                    "Country '{}' of entity '{}' was not assigned to any split",
                    record.country,
                    record.id
                ),
            }
        }
        groups
    }

    /// Splits that were asked for rows but received no country
    pub fn empty_splits(&self, assignment: &CountryAssignment) -> Vec<SplitTag> {
        SplitTag::all()
            .into_iter()
            .filter(|tag| self.ratios.get(*tag) > 0.0 && assignment.get(*tag).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::splitting::random_source;
    use crate::types::EntityRecord;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn countries(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("C{}", i)).collect()
    }

    #[test]
    fn test_cut_points() {
        let grouper = CountryGrouper::new(SplitRatios::new(0.6, 0.2, 0.2));
        let assignment = grouper.group(&countries(10), &mut random_source(Some(1)));
        assert_eq!(assignment.train.len(), 6);
        assert_eq!(assignment.val.len(), 2);
        assert_eq!(assignment.test.len(), 2);
    }

    #[test]
    fn test_disjoint_and_exhaustive() {
        let grouper = CountryGrouper::new(SplitRatios::new(0.5, 0.3, 0.2));
        let input = countries(17);
        let assignment = grouper.group(&input, &mut random_source(Some(3)));

        let mut seen = HashSet::new();
        for tag in SplitTag::all() {
            for country in assignment.get(tag) {
                assert!(seen.insert(country.clone()), "{} assigned twice", country);
            }
        }
        assert_eq!(seen.len(), input.len());
    }

    #[test]
    fn test_two_countries_leave_val_empty() {
        let grouper = CountryGrouper::new(SplitRatios::new(0.6, 0.2, 0.2));
        let assignment = grouper.group(&countries(2), &mut random_source(Some(9)));
        assert_eq!(assignment.train.len(), 1);
        assert!(assignment.val.is_empty());
        assert_eq!(assignment.test.len(), 1);
        assert_eq!(grouper.empty_splits(&assignment), vec![SplitTag::Val]);
    }

    #[test]
    fn test_single_country_lands_in_one_split() {
        let grouper = CountryGrouper::new(SplitRatios::new(0.6, 0.2, 0.2));
        let assignment = grouper.group(&countries(1), &mut random_source(Some(0)));
        let holding: Vec<SplitTag> = SplitTag::all()
            .into_iter()
            .filter(|tag| !assignment.get(*tag).is_empty())
            .collect();
        assert_eq!(holding, vec![SplitTag::Test]);
    }

    #[test]
    fn test_seed_reproduces_assignment() {
        let grouper = CountryGrouper::new(SplitRatios::new(0.6, 0.2, 0.2));
        let a = grouper.group(&countries(12), &mut random_source(Some(42)));
        let b = grouper.group(&countries(12), &mut random_source(Some(42)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_partition_follows_assignment() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let records = ["FR", "DE", "FR", "IT"]
            .iter()
            .enumerate()
            .map(|(i, c)| EntityRecord {
                id: i.to_string(),
                country: c.to_string(),
                reference_date: date,
                label: Some(0),
            })
            .collect();
        let table = EntityTable::new(records);
        let assignment = CountryAssignment {
            train: vec!["FR".to_string()],
            val: vec!["DE".to_string()],
            test: vec!["IT".to_string()],
        };

        let groups = CountryGrouper::new(SplitRatios::new(0.6, 0.2, 0.2)).partition(&table, &assignment);
        assert_eq!(groups.get(SplitTag::Train).ids(), vec!["0", "2"]);
        assert_eq!(groups.get(SplitTag::Val).ids(), vec!["1"]);
        assert_eq!(groups.get(SplitTag::Test).ids(), vec!["3"]);
        assert_eq!(groups.total(), 4);
    }
}
