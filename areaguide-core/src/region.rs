//! Heuristic gate deciding whether London-specific transit data applies.

use crate::model::AdminMetadata;

/// Marker looked for in the region field.
const REGION_MARKER: &str = "london";

/// Locality keywords looked for in the district and ward fields.
const LOCALITY_KEYWORDS: &[&str] = &[
    "london",
    "westminster",
    "camden",
    "islington",
    "hackney",
    "tower hamlets",
    "southwark",
    "lambeth",
    "greenwich",
];

/// Decide whether the metro provider should be queried for this location.
///
/// Keyword match over free-text administrative fields, not an authoritative
/// boundary lookup. False positives and negatives are expected and accepted;
/// the worst case is an extra empty section or a missed one.
#[must_use]
pub fn should_fetch_metro(admin: &AdminMetadata) -> bool {
    if admin
        .region
        .as_deref()
        .is_some_and(|region| region.to_lowercase().contains(REGION_MARKER))
    {
        return true;
    }

    [admin.district.as_deref(), admin.ward.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| {
            let lowered = field.to_lowercase();
            LOCALITY_KEYWORDS
                .iter()
                .any(|keyword| lowered.contains(keyword))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(region: Option<&str>, district: Option<&str>, ward: Option<&str>) -> AdminMetadata {
        AdminMetadata {
            district: district.map(str::to_owned),
            ward: ward.map(str::to_owned),
            region: region.map(str::to_owned),
            lsoa_code: None,
        }
    }

    #[test]
    fn greater_london_region_opens_the_gate() {
        assert!(should_fetch_metro(&admin(
            Some("Greater London"),
            Some("Camden"),
            None
        )));
        assert!(should_fetch_metro(&admin(Some("London"), None, None)));
    }

    #[test]
    fn non_london_regions_keep_the_gate_closed() {
        assert!(!should_fetch_metro(&admin(
            Some("Scotland"),
            Some("Fife"),
            None
        )));
        assert!(!should_fetch_metro(&admin(
            Some("North West"),
            Some("Manchester"),
            Some("Didsbury East")
        )));
        assert!(!should_fetch_metro(&AdminMetadata::default()));
    }

    #[test]
    fn locality_keywords_open_the_gate_without_a_region() {
        assert!(should_fetch_metro(&admin(None, Some("Camden"), None)));
        assert!(should_fetch_metro(&admin(
            None,
            None,
            Some("City of Westminster")
        )));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(should_fetch_metro(&admin(Some("GREATER LONDON"), None, None)));
        assert!(should_fetch_metro(&admin(None, Some("hackney"), None)));
    }
}
