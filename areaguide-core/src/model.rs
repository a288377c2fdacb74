//! Domain data structures for locations, places, transit stops, and the guide report.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// UK non-emergency police phone number, included verbatim in every report.
pub const NON_EMERGENCY_PHONE: &str = "101";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic point in WGS84 degrees.
pub struct Coordinates {
    /// Latitude in degrees, within [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, within [-180, 180].
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting non-finite or out-of-range values.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        in_range.then_some(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Administrative metadata attached to a resolved postcode.
///
/// Derived once per request and immutable afterwards. Fields are free-text
/// labels from the geocoding source, not authoritative boundary data.
pub struct AdminMetadata {
    /// Local authority district, e.g. "Camden".
    pub district: Option<String>,
    /// Electoral ward.
    pub ward: Option<String>,
    /// Region label, e.g. "Greater London" or "Scotland".
    pub region: Option<String>,
    /// Lower Layer Super Output Area code, e.g. "E01000001".
    #[serde(rename = "lsoaCode")]
    pub lsoa_code: Option<String>,
}

#[derive(Debug, Clone)]
/// Result of resolving a postcode: where it is and what it belongs to.
pub struct ResolvedLocation {
    /// Centroid of the postcode.
    pub coordinates: Coordinates,
    /// Administrative context of the postcode.
    pub admin: AdminMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Geometry flavour of a point-of-interest record.
pub enum PlaceKind {
    /// Element with its own coordinates.
    #[serde(rename = "point")]
    Point,
    /// Area element represented by its computed center.
    #[serde(rename = "area-center")]
    AreaCenter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Single point of interest with the raw tag vocabulary of the upstream source.
pub struct PlaceRecord {
    /// Upstream element id.
    pub id: i64,
    /// Whether the coordinates are the element's own or an area center.
    pub kind: PlaceKind,
    /// Location of the place.
    pub coordinates: Coordinates,
    /// Raw key/value tags, e.g. `amenity=pharmacy`, `name=...`.
    pub tags: HashMap<String, String>,
}

impl PlaceRecord {
    /// The `name` tag, when the upstream source provided one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }

    /// Check a single tag for equality against the given value.
    #[must_use]
    pub fn tag_matches(&self, key: &str, value: &str) -> bool {
        self.tags.get(key).is_some_and(|tag_value| tag_value == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Nearest-match highlight for a single essential service.
///
/// "Nearest" means first in the provider's result ordering; no distance is
/// computed for this extraction.
pub struct EssentialService {
    /// Display name, when the record carried one.
    pub name: Option<String>,
    /// Full tag set of the matched record.
    pub tags: HashMap<String, String>,
}

impl EssentialService {
    /// Build the highlight from a matched place record.
    #[must_use]
    pub fn from_record(record: &PlaceRecord) -> Self {
        Self {
            name: record.name().map(str::to_owned),
            tags: record.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Mode of a public transit stop.
pub enum TransitKind {
    /// National rail station.
    Train,
    /// Bus stop.
    Bus,
    /// Underground/metro station.
    Metro,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Nearby public transit stop.
pub struct TransitStop {
    /// Display name of the stop.
    pub name: String,
    /// Straight-line distance from the request coordinates.
    pub distance_meters: f64,
    /// Mode of the stop.
    pub kind: TransitKind,
    /// Provider-specific description, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lines serving the stop, when the provider reports them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
}

/// Sort stops ascending by distance. Contract requirement for every
/// transit list handed to the consumer, not an optimization.
pub fn sort_stops_by_distance(stops: &mut [TransitStop]) {
    stops.sort_by(|left, right| left.distance_meters.total_cmp(&right.distance_meters));
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Train stations and bus stops near a location.
pub struct NearbyTransit {
    /// National rail stations, sorted ascending by distance.
    pub train_stations: Vec<TransitStop>,
    /// Bus stops, sorted ascending by distance.
    pub bus_stops: Vec<TransitStop>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Combined transport section of the report.
pub struct TransportLinks {
    /// National rail stations, sorted ascending by distance.
    pub train_stations: Vec<TransitStop>,
    /// Bus stops, sorted ascending by distance.
    pub bus_stops: Vec<TransitStop>,
    /// Underground stations, sorted ascending by distance. Empty outside
    /// the metro region.
    pub tube_stations: Vec<TransitStop>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Single street-level crime report.
pub struct CrimeRecord {
    /// Crime category slug, e.g. "burglary".
    pub category: String,
    /// Month of the report in `YYYY-MM`, when reported.
    #[serde(default)]
    pub month: Option<String>,
}

/// Crime counts grouped by category.
pub type CrimeSummary = BTreeMap<String, u64>;

/// Group a crime report list into per-category counts.
#[must_use]
pub fn summarize_crimes_by_category(crimes: &[CrimeRecord]) -> CrimeSummary {
    let mut summary = CrimeSummary::new();
    for crime in crimes {
        *summary.entry(crime.category.clone()).or_insert(0) += 1;
    }
    summary
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Age share of the local population, as percentages.
pub struct AgeStructure {
    /// Share of residents aged 0-17.
    #[serde(rename = "0-17")]
    pub age_0_17: f64,
    /// Share of residents aged 18-64.
    #[serde(rename = "18-64")]
    pub age_18_64: f64,
    /// Share of residents aged 65 and over.
    #[serde(rename = "65+")]
    pub age_65_plus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Census demographics for the area unit of the postcode.
pub struct Demographics {
    /// People per square kilometre.
    pub population_density: f64,
    /// Age distribution of the resident population.
    pub age_structure: AgeStructure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Local authority details derived from the admin district.
pub struct Council {
    /// Local authority name.
    pub name: String,
    /// Web search URL for the council's official site.
    #[serde(rename = "websiteSearchUrl")]
    pub website_search_url: String,
}

impl Council {
    /// Derive council details from admin metadata; `None` without a district.
    #[must_use]
    pub fn from_admin(admin: &AdminMetadata) -> Option<Self> {
        let district = admin.district.as_deref()?.trim();
        if district.is_empty() {
            return None;
        }

        let query = format!("{district} council").replace(' ', "+");

        Some(Self {
            name: district.to_owned(),
            website_search_url: format!("https://www.google.com/search?q={query}"),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Nearest healthcare highlights.
pub struct Healthcare {
    /// General practice surgery or clinic.
    pub gp: Option<EssentialService>,
    /// Pharmacy.
    pub pharmacy: Option<EssentialService>,
    /// Hospital.
    pub hospital: Option<EssentialService>,
    /// Dental practice.
    pub dentist: Option<EssentialService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Nearest emergency service highlights.
pub struct EmergencyServices {
    /// Police station.
    pub police: Option<EssentialService>,
    /// Fire station.
    pub fire_station: Option<EssentialService>,
    /// Non-emergency contact number.
    pub non_emergency_phone: String,
}

impl Default for EmergencyServices {
    fn default() -> Self {
        Self {
            police: None,
            fire_station: None,
            non_emergency_phone: NON_EMERGENCY_PHONE.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Aggregate root handed to the report consumer.
///
/// Assembled once per request and never mutated afterwards. Every optional
/// field is serialized as `null` (and every list as `[]`) rather than
/// omitted, so consumers can rely on the keys being present.
pub struct GuideReport {
    /// Postcode as supplied by the caller.
    pub postcode: String,
    /// Name of the person the guide is addressed to.
    #[serde(rename = "recipientName")]
    pub recipient_name: Option<String>,
    /// Interests used to personalize the narrative.
    pub interests: Vec<String>,
    /// Resolved centroid of the postcode.
    pub coordinates: Coordinates,
    /// Administrative context of the postcode.
    pub admin: AdminMetadata,
    /// Local authority details, when a district was resolved.
    pub council: Option<Council>,
    /// Generated narrative summary of the area.
    pub summary: String,
    /// Flat list of nearby points of interest, sorted by name.
    pub places: Vec<PlaceRecord>,
    /// Nearby public transport, per mode.
    pub transport: TransportLinks,
    /// Census demographics, when available.
    pub demographics: Option<Demographics>,
    /// Nearest healthcare highlights.
    pub healthcare: Healthcare,
    /// Nearest emergency service highlights.
    pub emergency_services: EmergencyServices,
    /// Nearest post office.
    pub post_office: Option<EssentialService>,
    /// Crime counts by category; empty when the feed was busy.
    pub crime_summary: Option<CrimeSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_reject_out_of_range_values() {
        assert!(Coordinates::new(51.5, -0.12).is_some());
        assert!(Coordinates::new(90.0, 180.0).is_some());
        assert!(Coordinates::new(90.5, 0.0).is_none());
        assert!(Coordinates::new(0.0, -180.5).is_none());
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn crime_summary_groups_by_category() {
        let crimes = vec![
            CrimeRecord {
                category: "burglary".to_owned(),
                month: Some("2024-02".to_owned()),
            },
            CrimeRecord {
                category: "anti-social-behaviour".to_owned(),
                month: None,
            },
            CrimeRecord {
                category: "burglary".to_owned(),
                month: Some("2024-02".to_owned()),
            },
        ];

        let summary = summarize_crimes_by_category(&crimes);

        assert_eq!(summary.get("burglary"), Some(&2));
        assert_eq!(summary.get("anti-social-behaviour"), Some(&1));
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn crime_summary_of_empty_input_is_empty() {
        assert!(summarize_crimes_by_category(&[]).is_empty());
    }

    #[test]
    fn council_is_derived_from_district() {
        let admin = AdminMetadata {
            district: Some("Tower Hamlets".to_owned()),
            ..AdminMetadata::default()
        };

        let council = Council::from_admin(&admin).expect("district present");
        assert_eq!(council.name, "Tower Hamlets");
        assert_eq!(
            council.website_search_url,
            "https://www.google.com/search?q=Tower+Hamlets+council"
        );

        assert!(Council::from_admin(&AdminMetadata::default()).is_none());
    }

    #[test]
    fn stops_sort_ascending_by_distance() {
        let mut stops = vec![
            TransitStop {
                name: "Far".to_owned(),
                distance_meters: 840.0,
                kind: TransitKind::Bus,
                description: None,
                lines: Vec::new(),
            },
            TransitStop {
                name: "Near".to_owned(),
                distance_meters: 120.5,
                kind: TransitKind::Bus,
                description: None,
                lines: Vec::new(),
            },
        ];

        sort_stops_by_distance(&mut stops);

        for pair in stops.windows(2) {
            assert!(
                pair[0].distance_meters <= pair[1].distance_meters,
                "stops must be ordered by distance"
            );
        }
        assert_eq!(stops[0].name, "Near");
    }

    #[test]
    fn report_serializes_optional_fields_as_null() {
        let report = GuideReport {
            postcode: "SW1A 1AA".to_owned(),
            recipient_name: None,
            interests: Vec::new(),
            coordinates: Coordinates {
                latitude: 51.501,
                longitude: -0.1416,
            },
            admin: AdminMetadata::default(),
            council: None,
            summary: "A quiet area.".to_owned(),
            places: Vec::new(),
            transport: TransportLinks::default(),
            demographics: None,
            healthcare: Healthcare::default(),
            emergency_services: EmergencyServices::default(),
            post_office: None,
            crime_summary: None,
        };

        let json = serde_json::to_value(&report).expect("report serializes");
        let object = json.as_object().expect("report is an object");

        for key in [
            "postcode",
            "recipientName",
            "interests",
            "coordinates",
            "admin",
            "council",
            "summary",
            "places",
            "transport",
            "demographics",
            "healthcare",
            "emergency_services",
            "post_office",
            "crime_summary",
        ] {
            assert!(object.contains_key(key), "missing report key {key}");
        }

        assert!(object["council"].is_null());
        assert!(object["demographics"].is_null());
        assert!(object["post_office"].is_null());
        assert_eq!(object["emergency_services"]["non_emergency_phone"], "101");
        assert_eq!(object["admin"]["lsoaCode"], serde_json::Value::Null);
        assert!(
            object["transport"]["tube_stations"]
                .as_array()
                .is_some_and(|list| list.is_empty()),
            "tube_stations key must be present and empty"
        );
    }
}
