use crate::config::SeismicConfig;
use crate::constants::SEISMIC_SOURCE;
use crate::domain::{PostalCode, SeismicEvent};
use crate::error::{PrepError, Result};
use crate::infra::http_client::HttpFetcher;
use crate::types::SourceReader;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Reads past seismic events from an FDSN event service (or a saved GeoJSON response).
pub struct SeismicReader {
    fetcher: HttpFetcher,
    config: SeismicConfig,
    postal_codes: Vec<PostalCode>,
}

impl SeismicReader {
    pub fn new(fetcher: HttpFetcher, config: SeismicConfig) -> Result<Self> {
        let postal_codes = config
            .postal_codes
            .iter()
            .map(|code| PostalCode::parse(code))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            fetcher,
            config,
            postal_codes,
        })
    }

    fn query(&self) -> Result<Vec<(&'static str, String)>> {
        let start = self.config.start_date()?;
        Ok(vec![
            ("format", "geojson".to_string()),
            ("minlatitude", self.config.min_latitude.to_string()),
            ("maxlatitude", self.config.max_latitude.to_string()),
            ("minlongitude", self.config.min_longitude.to_string()),
            ("maxlongitude", self.config.max_longitude.to_string()),
            ("starttime", start.format("%Y-%m-%d").to_string()),
            ("minmagnitude", self.config.min_magnitude.to_string()),
        ])
    }
}

#[async_trait::async_trait]
impl SourceReader for SeismicReader {
    type Record = SeismicEvent;

    fn source_name(&self) -> &'static str {
        SEISMIC_SOURCE
    }

    #[instrument(skip(self))]
    async fn read(&self) -> Result<Vec<SeismicEvent>> {
        let body = match &self.config.path {
            Some(path) => {
                debug!("Reading seismic events from {}", path.display());
                super::read_text_file(SEISMIC_SOURCE, path)?
            }
            None => {
                info!("Querying seismic events from {}", self.config.endpoint);
                let query = self.query()?;
                self.fetcher
                    .get_text(SEISMIC_SOURCE, &self.config.endpoint, &query)
                    .await?
            }
        };
        let events = parse_feature_collection(&body, &self.postal_codes)?;
        info!("Parsed {} seismic events", events.len());
        Ok(events)
    }
}

/// Flatten a GeoJSON feature collection of events.
///
/// Postal codes are assigned by feature position in the response, so a rejected
/// feature does not shift the codes of the ones after it.
pub fn parse_feature_collection(body: &str, postal_codes: &[PostalCode]) -> Result<Vec<SeismicEvent>> {
    let data: Value = serde_json::from_str(body)?;
    let features = data["features"].as_array().ok_or_else(|| {
        PrepError::source_unavailable(SEISMIC_SOURCE, "response has no features array")
    })?;

    if features.len() > postal_codes.len() {
        warn!(
            "{} events but only {} postal codes supplied; the rest have no postal code",
            features.len(),
            postal_codes.len()
        );
    }

    let mut events = Vec::with_capacity(features.len());
    for (i, feature) in features.iter().enumerate() {
        match parse_feature(i, feature, postal_codes.get(i).cloned()) {
            Some(event) => events.push(event),
            None => warn!("Rejecting seismic feature {}: magnitude, coordinates or time missing", i),
        }
    }
    Ok(events)
}

fn parse_feature(index: usize, feature: &Value, postal_code: Option<PostalCode>) -> Option<SeismicEvent> {
    let properties = &feature["properties"];
    let magnitude = properties["mag"].as_f64()?;
    let coordinates = feature["geometry"]["coordinates"].as_array()?;
    let longitude = coordinates.first()?.as_f64()?;
    let latitude = coordinates.get(1)?.as_f64()?;
    let time = Utc.timestamp_millis_opt(properties["time"].as_i64()?).single()?;

    let id = feature["id"]
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("event-{}", index));
    let place = properties["place"].as_str().unwrap_or_default().to_string();

    Some(SeismicEvent {
        id,
        magnitude,
        time,
        place,
        latitude,
        longitude,
        postal_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codes(raw: &[&str]) -> Vec<PostalCode> {
        raw.iter().map(|c| PostalCode::parse(c).unwrap()).collect()
    }

    #[test]
    fn test_flattens_geometry_and_assigns_codes() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "id": "ci3347678",
                    "properties": {"mag": 6.7, "time": 758809831000i64, "place": "Northridge"},
                    "geometry": {"type": "Point", "coordinates": [-118.537, 34.213, 18.2]}
                },
                {
                    "id": "ci731691",
                    "properties": {"mag": 5.9, "time": 560168046000i64, "place": "Whittier"},
                    "geometry": {"type": "Point", "coordinates": [-118.079, 34.049, 14.6]}
                }
            ]
        })
        .to_string();

        let events = parse_feature_collection(&body, &codes(&["91326", "90601"])).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "ci3347678");
        assert_eq!(events[0].latitude, 34.213);
        assert_eq!(events[0].longitude, -118.537);
        assert_eq!(events[0].time.format("%Y-%m-%d").to_string(), "1994-01-17");
        assert_eq!(events[1].postal_code.as_ref().unwrap().as_str(), "90601");
    }

    #[test]
    fn test_rejects_features_missing_magnitude_or_coordinates() {
        let body = json!({
            "features": [
                {"properties": {"mag": null, "time": 0, "place": "a"},
                 "geometry": {"coordinates": [-118.0, 34.0]}},
                {"properties": {"mag": 5.0, "time": 0, "place": "b"},
                 "geometry": null},
                {"properties": {"mag": 5.2, "time": 0, "place": "c"},
                 "geometry": {"coordinates": [-118.0, 34.0]}}
            ]
        })
        .to_string();

        let events = parse_feature_collection(&body, &codes(&["90001", "90002", "90003"])).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].place, "c");
        // positional assignment is not shifted by the rejected features
        assert_eq!(events[0].postal_code.as_ref().unwrap().as_str(), "90003");
        assert_eq!(events[0].id, "event-2");
    }

    #[test]
    fn test_more_events_than_codes() {
        let body = json!({
            "features": [
                {"properties": {"mag": 5.0, "time": 0}, "geometry": {"coordinates": [-118.0, 34.0]}},
                {"properties": {"mag": 5.1, "time": 0}, "geometry": {"coordinates": [-118.1, 34.1]}}
            ]
        })
        .to_string();
        let events = parse_feature_collection(&body, &codes(&["90001"])).unwrap();
        assert!(events[0].postal_code.is_some());
        assert!(events[1].postal_code.is_none());
    }

    #[test]
    fn test_missing_features_array() {
        let err = parse_feature_collection("{\"type\": \"FeatureCollection\"}", &[]).unwrap_err();
        assert!(matches!(err, PrepError::SourceUnavailable { .. }));
    }
}
