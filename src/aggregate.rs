use crate::types::{AggregateCount, GroupField, RecordTable};
use std::collections::BTreeMap;

/// Counts records per distinct value of `field`, sorted by key.
pub fn count_by(table: &RecordTable, field: GroupField) -> Vec<AggregateCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in table {
        *counts.entry(field.value(record)).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(key, count)| AggregateCount {
            key: key.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{self, DataSource};
    use crate::filter::{self, FilterCriteria, Selection};
    use std::collections::{HashMap, HashSet};

    fn sample() -> RecordTable {
        data::load(&DataSource::Embedded).unwrap().table
    }

    fn as_map(counts: &[AggregateCount]) -> HashMap<&str, usize> {
        counts.iter().map(|c| (c.key.as_str(), c.count)).collect()
    }

    #[test]
    fn test_category_counts_on_sample() {
        let counts = count_by(&sample(), GroupField::Category);
        let expected: HashMap<&str, usize> = [
            ("Kuliner", 4),
            ("Fashion", 1),
            ("Sembako", 1),
            ("Kerajinan", 1),
            ("Otomotif", 1),
            ("Jasa", 1),
            ("Elektronik", 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(as_map(&counts), expected);
    }

    #[test]
    fn test_district_counts_sorted_by_key() {
        let counts = count_by(&sample(), GroupField::District);
        let keys: Vec<&str> = counts.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["Majene", "Mamuju", "Mamuju Tengah", "Pasangkayu", "Polewali Mandar"]);
        assert_eq!(as_map(&counts)["Mamuju"], 3);
        assert_eq!(as_map(&counts)["Polewali Mandar"], 3);
    }

    #[test]
    fn test_counts_sum_to_table_length_with_distinct_keys() {
        let table = sample();
        let subsets = [
            table.clone(),
            filter::apply(&table, &FilterCriteria::new(Selection::Only("Majene".into()), Selection::All, "")),
            filter::apply(&table, &FilterCriteria::new(Selection::All, Selection::All, "toko")),
            RecordTable::default(),
        ];

        for subset in &subsets {
            for field in [GroupField::District, GroupField::Category] {
                let counts = count_by(subset, field);
                let total: usize = counts.iter().map(|c| c.count).sum();
                assert_eq!(total, subset.len());

                let keys: HashSet<&str> = counts.iter().map(|c| c.key.as_str()).collect();
                assert_eq!(keys.len(), counts.len());
            }
        }
    }

    #[test]
    fn test_empty_table_has_no_groups() {
        assert!(count_by(&RecordTable::default(), GroupField::Category).is_empty());
    }
}
