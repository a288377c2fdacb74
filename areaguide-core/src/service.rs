//! Orchestrating service: resolve the postcode, fan out to providers,
//! apply per-provider failure policy, and compose the final report.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::categories::{categorize, extract_essential};
use crate::model::{
    Council, EmergencyServices, GuideReport, Healthcare, NearbyTransit, TransportLinks,
    summarize_crimes_by_category, NON_EMERGENCY_PHONE,
};
use crate::ports::{
    CrimePort, DemographicsPort, GeocodePort, MetroPort, NarrativePort, NarrativeRequest,
    PlacesPort, PortError, TransitPort,
};
use crate::region;

#[derive(Debug, Clone)]
/// Single guide request as received from the consumer.
pub struct GuideRequest {
    /// Postcode to build the guide for.
    pub postcode: String,
    /// Name of the person the guide is addressed to.
    pub recipient_name: Option<String>,
    /// Interests used to personalize the narrative.
    pub interests: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
/// Request-level failures surfaced to the consumer.
pub enum GuideError {
    /// The postcode could not be resolved to a location.
    #[error("Invalid postcode")]
    InvalidPostcode,
    /// A fatal-class provider failed; no partial report is returned.
    #[error("Failed to generate neighbourhood guide: {0}")]
    Upstream(#[from] PortError),
}

impl GuideError {
    /// HTTP status the consumer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidPostcode => 404,
            Self::Upstream(_) => 500,
        }
    }
}

/// Bundle of provider ports the service fans out to.
pub struct ProviderSet {
    /// Postcode resolution.
    pub geocode: Arc<dyn GeocodePort>,
    /// Point-of-interest search. Fatal-class.
    pub places: Arc<dyn PlacesPort>,
    /// Train stations and bus stops. Degraded-class.
    pub transit: Arc<dyn TransitPort>,
    /// Metro stations, invoked only when the region gate fires. Degraded-class.
    pub metro: Arc<dyn MetroPort>,
    /// Street-level crime feed. Degraded on busy, fatal otherwise.
    pub crime: Arc<dyn CrimePort>,
    /// Census demographics. Degraded-class.
    pub demographics: Arc<dyn DemographicsPort>,
    /// Narrative generation. Fatal-class.
    pub narrative: Arc<dyn NarrativePort>,
}

/// Public entry point that turns a postcode into a [`GuideReport`].
///
/// Stateless across requests: each call resolves, fans out, and composes
/// from scratch. No retries, no caching.
pub struct GuideService {
    providers: ProviderSet,
    search_radius_meters: u32,
}

impl GuideService {
    /// Create a new service over the given providers.
    #[must_use]
    pub fn new(providers: ProviderSet, search_radius_meters: u32) -> Self {
        Self {
            providers,
            search_radius_meters,
        }
    }

    /// Build the full guide report for one request.
    ///
    /// # Errors
    ///
    /// Returns [`GuideError::InvalidPostcode`] for an unresolvable postcode
    /// and [`GuideError::Upstream`] when a fatal-class provider fails.
    /// Degraded-class provider failures never surface here; their sections
    /// come back empty or null instead.
    pub async fn build_guide(&self, request: &GuideRequest) -> Result<GuideReport, GuideError> {
        let location = match self.providers.geocode.resolve(&request.postcode).await {
            Ok(location) => location,
            Err(PortError::PostcodeNotFound) => return Err(GuideError::InvalidPostcode),
            Err(err) => return Err(GuideError::Upstream(err)),
        };

        let center = location.coordinates;
        info!(
            postcode = %request.postcode,
            latitude = center.latitude,
            longitude = center.longitude,
            "postcode resolved"
        );

        let fetch_metro = region::should_fetch_metro(&location.admin);
        debug!(fetch_metro, "region gate evaluated");

        let narrative_request = NarrativeRequest {
            postcode: request.postcode.clone(),
            coordinates: center,
            recipient_name: request.recipient_name.clone(),
            interests: request.interests.clone(),
        };

        let radius = self.search_radius_meters;

        // Outside the gated region the metro branch is a pre-resolved empty
        // placeholder; the provider is never invoked.
        let metro_lookup = async {
            if fetch_metro {
                self.providers.metro.nearby_stations(center, radius).await
            } else {
                Ok(Vec::new())
            }
        };

        // Demographics need an area-unit code; without one there is nothing
        // to look up.
        let demographics_lookup = async {
            match location.admin.lsoa_code.as_deref() {
                Some(code) => self.providers.demographics.for_area(code).await,
                None => Ok(None),
            }
        };

        // Fan out. Every dispatched call runs to completion; nothing is
        // cancelled when a sibling fails.
        let (places, summary, transit, tube, crimes, demographics) = tokio::join!(
            self.providers.places.search(center, radius),
            self.providers.narrative.summarize(&narrative_request),
            self.providers.transit.nearby(center),
            metro_lookup,
            self.providers.crime.street_level(center, None),
            demographics_lookup,
        );

        // Fatal-class providers: a report without them is not useful.
        let place_records = places?;
        let summary = summary?;

        // Degraded-class providers: absence only reduces richness.
        let transit = transit.unwrap_or_else(|err| {
            warn!(error = %err, "transit lookup failed, returning empty results");
            NearbyTransit::default()
        });
        let tube_stations = tube.unwrap_or_else(|err| {
            warn!(error = %err, "metro lookup failed, returning empty results");
            Vec::new()
        });
        let crimes = match crimes {
            Ok(reports) => reports,
            Err(err) if err.is_busy() => {
                warn!("crime feed busy, returning empty summary");
                Vec::new()
            }
            Err(err) => return Err(GuideError::Upstream(err)),
        };
        let demographics = demographics.unwrap_or_else(|err| {
            warn!(error = %err, "demographics lookup failed");
            None
        });

        let buckets = categorize(&place_records);
        debug!(
            places = place_records.len(),
            categorized = buckets.values().map(Vec::len).sum::<usize>(),
            categories = buckets.len(),
            "places categorized"
        );

        let healthcare = Healthcare {
            gp: extract_essential(&place_records, "amenity", "doctors"),
            pharmacy: extract_essential(&place_records, "amenity", "pharmacy"),
            hospital: extract_essential(&place_records, "amenity", "hospital"),
            dentist: extract_essential(&place_records, "amenity", "dentist"),
        };
        let emergency_services = EmergencyServices {
            police: extract_essential(&place_records, "amenity", "police"),
            fire_station: extract_essential(&place_records, "amenity", "fire_station"),
            non_emergency_phone: NON_EMERGENCY_PHONE.to_owned(),
        };
        let post_office = extract_essential(&place_records, "amenity", "post_office");
        let council = Council::from_admin(&location.admin);
        let crime_summary = Some(summarize_crimes_by_category(&crimes));

        Ok(GuideReport {
            postcode: request.postcode.clone(),
            recipient_name: request.recipient_name.clone(),
            interests: request.interests.clone(),
            coordinates: center,
            admin: location.admin,
            council,
            summary,
            places: place_records,
            transport: TransportLinks {
                train_stations: transit.train_stations,
                bus_stops: transit.bus_stops,
                tube_stations,
            },
            demographics,
            healthcare,
            emergency_services,
            post_office,
            crime_summary,
        })
    }
}
