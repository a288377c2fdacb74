//! Tag-based categorization of point-of-interest records into canonical buckets.

use std::collections::BTreeMap;

use crate::model::{EssentialService, PlaceRecord};

#[derive(Debug, Clone, Copy)]
/// Single `key=value` tag equality matcher.
pub struct TagMatcher {
    /// Tag key, e.g. "amenity".
    pub key: &'static str,
    /// Tag value, e.g. "pharmacy".
    pub value: &'static str,
}

#[derive(Debug, Clone, Copy)]
/// Named category bucket defined by one or more tag matchers.
pub struct CategoryRule {
    /// Canonical category name used in the report vocabulary.
    pub name: &'static str,
    /// Matchers for this category; a record satisfying any of them belongs here.
    pub matchers: &'static [TagMatcher],
}

/// Canonical category table. Evaluated in declaration order per record;
/// the first matching rule wins, so a record lands in at most one bucket.
/// The same table drives the upstream place query.
pub const CATEGORY_TABLE: &[CategoryRule] = &[
    CategoryRule {
        name: "supermarkets",
        matchers: &[TagMatcher { key: "shop", value: "supermarket" }],
    },
    CategoryRule {
        name: "convenience",
        matchers: &[TagMatcher { key: "shop", value: "convenience" }],
    },
    CategoryRule {
        name: "pharmacies",
        matchers: &[TagMatcher { key: "amenity", value: "pharmacy" }],
    },
    CategoryRule {
        name: "post_offices",
        matchers: &[TagMatcher { key: "amenity", value: "post_office" }],
    },
    CategoryRule {
        name: "parks",
        matchers: &[TagMatcher { key: "leisure", value: "park" }],
    },
    CategoryRule {
        name: "playgrounds",
        matchers: &[TagMatcher { key: "leisure", value: "playground" }],
    },
    CategoryRule {
        name: "cafes",
        matchers: &[TagMatcher { key: "amenity", value: "cafe" }],
    },
    CategoryRule {
        name: "restaurants",
        matchers: &[TagMatcher { key: "amenity", value: "restaurant" }],
    },
    CategoryRule {
        name: "pubs",
        matchers: &[TagMatcher { key: "amenity", value: "pub" }],
    },
    CategoryRule {
        name: "banks",
        matchers: &[TagMatcher { key: "amenity", value: "bank" }],
    },
    CategoryRule {
        name: "doctors",
        matchers: &[TagMatcher { key: "amenity", value: "doctors" }],
    },
    CategoryRule {
        name: "clinics",
        matchers: &[TagMatcher { key: "amenity", value: "clinic" }],
    },
    CategoryRule {
        name: "hospitals",
        matchers: &[TagMatcher { key: "amenity", value: "hospital" }],
    },
    CategoryRule {
        name: "dentists",
        matchers: &[TagMatcher { key: "amenity", value: "dentist" }],
    },
    CategoryRule {
        name: "police",
        matchers: &[TagMatcher { key: "amenity", value: "police" }],
    },
    CategoryRule {
        name: "fire_stations",
        matchers: &[TagMatcher { key: "amenity", value: "fire_station" }],
    },
];

/// Assign each record to the first category whose matcher set it satisfies.
///
/// Records matching no rule are dropped from the categorized view; they stay
/// available in the flat list for essential-service extraction. No record is
/// double-counted across buckets.
#[must_use]
pub fn categorize(records: &[PlaceRecord]) -> BTreeMap<&'static str, Vec<PlaceRecord>> {
    let mut buckets: BTreeMap<&'static str, Vec<PlaceRecord>> = BTreeMap::new();

    for record in records {
        let rule = CATEGORY_TABLE.iter().find(|rule| {
            rule.matchers
                .iter()
                .any(|matcher| record.tag_matches(matcher.key, matcher.value))
        });

        if let Some(rule) = rule {
            buckets.entry(rule.name).or_default().push(record.clone());
        }
    }

    buckets
}

/// Scan the flat record list and return the first record matching the given
/// single-tag predicate, independent of the category table.
#[must_use]
pub fn extract_essential(
    records: &[PlaceRecord],
    tag_key: &str,
    tag_value: &str,
) -> Option<EssentialService> {
    records
        .iter()
        .find(|record| record.tag_matches(tag_key, tag_value))
        .map(EssentialService::from_record)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::model::{Coordinates, PlaceKind};

    fn record(id: i64, tags: &[(&str, &str)]) -> PlaceRecord {
        PlaceRecord {
            id,
            kind: PlaceKind::Point,
            coordinates: Coordinates {
                latitude: 51.5,
                longitude: -0.12,
            },
            tags: tags
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn records_land_in_at_most_one_bucket() {
        let records = vec![
            record(1, &[("shop", "supermarket"), ("name", "Big Shop")]),
            record(2, &[("amenity", "cafe")]),
            record(3, &[("amenity", "cafe"), ("name", "Corner Cafe")]),
            record(4, &[("building", "yes")]),
        ];

        let buckets = categorize(&records);

        let categorized: usize = buckets.values().map(Vec::len).sum();
        assert_eq!(categorized, 3, "unmatched records are dropped");
        assert_eq!(buckets.get("supermarkets").map(Vec::len), Some(1));
        assert_eq!(buckets.get("cafes").map(Vec::len), Some(2));
        assert!(buckets.get("banks").is_none());

        // Partition check: every categorized id appears exactly once.
        let mut seen = Vec::new();
        for bucket in buckets.values() {
            for place in bucket {
                assert!(!seen.contains(&place.id), "record counted twice");
                seen.push(place.id);
            }
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        // Tagged as both a supermarket and a cafe; the table lists
        // supermarkets first.
        let records = vec![record(
            7,
            &[("shop", "supermarket"), ("amenity", "cafe")],
        )];

        let buckets = categorize(&records);

        assert_eq!(buckets.get("supermarkets").map(Vec::len), Some(1));
        assert!(buckets.get("cafes").is_none());
    }

    #[test]
    fn categorize_is_idempotent() {
        let records = vec![
            record(1, &[("amenity", "pub")]),
            record(2, &[("leisure", "park")]),
        ];

        let first = categorize(&records);
        let second = categorize(&records);

        assert_eq!(first.len(), second.len());
        for (name, bucket) in &first {
            let other = second.get(name).expect("same buckets on repeat runs");
            let ids: Vec<i64> = bucket.iter().map(|place| place.id).collect();
            let other_ids: Vec<i64> = other.iter().map(|place| place.id).collect();
            assert_eq!(ids, other_ids);
        }
    }

    #[test]
    fn essential_extraction_returns_first_match() {
        let records = vec![
            record(1, &[("amenity", "cafe")]),
            record(
                2,
                &[("amenity", "pharmacy"), ("name", "Test Pharmacy")],
            ),
            record(3, &[("amenity", "pharmacy"), ("name", "Second")]),
        ];

        let pharmacy =
            extract_essential(&records, "amenity", "pharmacy").expect("pharmacy present");
        assert_eq!(pharmacy.name.as_deref(), Some("Test Pharmacy"));
        assert_eq!(
            pharmacy.tags.get("amenity").map(String::as_str),
            Some("pharmacy")
        );

        assert!(extract_essential(&records, "amenity", "hospital").is_none());
    }

    #[test]
    fn essential_extraction_sees_uncategorized_records() {
        // A record no category rule matches is still reachable here.
        let records = vec![record(9, &[("healthcare", "midwife"), ("name", "Clinic")])];

        assert!(categorize(&records).is_empty());
        assert!(extract_essential(&records, "healthcare", "midwife").is_some());
    }
}
