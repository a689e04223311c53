//! Interactive map document: two choropleths, a hover layer, event and shelter markers.
//!
//! Colors are assigned here so the page only draws what it is given. Regions with
//! no value are painted in [`MISSING_COLOR`], never with a data color.

use crate::config::MapConfig;
use crate::domain::{PostalCode, SeismicEvent, ShelterAggregate, ShelterRecord, ZipBoundary};
use crate::engine::merge::FinalTable;
use crate::error::Result;
use askama::Template;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

pub const MISSING_COLOR: &str = "#808080";

/// Red-yellow-green, low shelter coverage is red
const RD_YL_GN: [&str; 6] = ["#d73027", "#fc8d59", "#fee08b", "#d9ef8b", "#91cf60", "#1a9850"];
const YL_OR_RD: [&str; 6] = ["#ffffb2", "#fed976", "#feb24c", "#fd8d3c", "#f03b20", "#bd0026"];

/// Shelter circle radius in meters per unit of evacuation capacity
const SHELTER_RADIUS_PER_CAPACITY: f64 = 0.5;

/// Equal-width bins between the smallest and largest value.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
    colors: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendBin {
    pub lower: f64,
    pub upper: f64,
    pub color: &'static str,
}

impl ColorScale {
    /// `None` when there are no values to scale.
    pub fn from_values(values: &[f64], colors: &'static [&'static str]) -> Option<Self> {
        let min = values.iter().copied().reduce(f64::min)?;
        let max = values.iter().copied().reduce(f64::max)?;
        Some(Self { min, max, colors })
    }

    fn width(&self) -> f64 {
        (self.max - self.min) / self.colors.len() as f64
    }

    pub fn color(&self, value: f64) -> &'static str {
        let width = self.width();
        if width <= 0.0 {
            return self.colors[0];
        }
        let idx = ((value - self.min) / width).floor() as isize;
        self.colors[idx.clamp(0, self.colors.len() as isize - 1) as usize]
    }

    pub fn legend(&self) -> Vec<LegendBin> {
        let width = self.width();
        self.colors
            .iter()
            .enumerate()
            .map(|(i, color)| LegendBin {
                lower: self.min + width * i as f64,
                upper: self.min + width * (i + 1) as f64,
                color: *color,
            })
            .collect()
    }
}

fn colorize(value: Option<f64>, scale: Option<&ColorScale>) -> &'static str {
    match (value, scale) {
        (Some(v), Some(scale)) => scale.color(v),
        _ => MISSING_COLOR,
    }
}

/// Marker color for an event magnitude
pub fn magnitude_color(magnitude: f64) -> &'static str {
    match magnitude {
        m if m >= 6.5 => "#7f0000",
        m if m >= 6.0 => "#bd0026",
        m if m >= 5.5 => "#f03b20",
        _ => "#fd8d3c",
    }
}

/// Marker radius in pixels for an event magnitude
pub fn magnitude_radius(magnitude: f64) -> f64 {
    (magnitude * magnitude / 2.0).max(4.0)
}

#[derive(Debug, Serialize)]
struct EventMarker<'a> {
    latitude: f64,
    longitude: f64,
    magnitude: f64,
    time: String,
    place: &'a str,
    radius: f64,
    color: &'static str,
}

#[derive(Debug, Serialize)]
struct ShelterMarker<'a> {
    latitude: f64,
    longitude: f64,
    capacity: u64,
    name: Option<&'a str>,
    radius_m: f64,
}

#[derive(Debug, Serialize)]
struct Legend {
    title: &'static str,
    layer: &'static str,
    bins: Vec<LegendBin>,
}

/// Everything the map page needs, borrowed from the pipeline outputs.
pub struct MapInputs<'a> {
    pub boundaries: &'a [ZipBoundary],
    pub shelter_aggregate: &'a [ShelterAggregate],
    pub final_table: &'a FinalTable,
    pub events: &'a [SeismicEvent],
    pub shelters: &'a [ShelterRecord],
}

#[derive(Template)]
#[template(path = "map.html")]
pub struct MapTemplate {
    pub title: String,
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: u8,
    pub payload: String,
}

/// Build the JSON payload embedded in the map page.
pub fn map_payload(inputs: &MapInputs) -> Value {
    let shelter_pct: HashMap<&PostalCode, f64> = inputs
        .shelter_aggregate
        .iter()
        .filter_map(|s| Some((&s.postal_code, s.shelter_capacity_pct?.known()?)))
        .collect();
    let insurance: HashMap<&PostalCode, f64> = inputs
        .final_table
        .rows()
        .iter()
        .filter_map(|r| Some((&r.postal_code, r.coverage_cost_10pct()?)))
        .collect();

    let shown_pct: Vec<f64> = inputs
        .boundaries
        .iter()
        .filter_map(|b| shelter_pct.get(&b.postal_code).copied())
        .collect();
    let shown_insurance: Vec<f64> = inputs
        .boundaries
        .iter()
        .filter_map(|b| insurance.get(&b.postal_code).copied())
        .collect();
    let pct_scale = ColorScale::from_values(&shown_pct, &RD_YL_GN);
    let insurance_scale = ColorScale::from_values(&shown_insurance, &YL_OR_RD);

    let features: Vec<Value> = inputs
        .boundaries
        .iter()
        .map(|b| {
            let pct = shelter_pct.get(&b.postal_code).copied();
            let cost = insurance.get(&b.postal_code).copied();
            let mut feature = b.feature.clone();
            if !feature["properties"].is_object() {
                feature["properties"] = json!({});
            }
            let props = &mut feature["properties"];
            props["zip"] = json!(b.postal_code.as_str());
            props["shelter_pct"] = json!(pct);
            props["shelter_color"] = json!(colorize(pct, pct_scale.as_ref()));
            props["insurance_cost"] = json!(cost);
            props["insurance_color"] = json!(colorize(cost, insurance_scale.as_ref()));
            feature
        })
        .collect();

    let events: Vec<EventMarker> = inputs
        .events
        .iter()
        .map(|e| EventMarker {
            latitude: e.latitude,
            longitude: e.longitude,
            magnitude: e.magnitude,
            time: e.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            place: &e.place,
            radius: magnitude_radius(e.magnitude),
            color: magnitude_color(e.magnitude),
        })
        .collect();

    let shelters: Vec<ShelterMarker> = inputs
        .shelters
        .iter()
        .filter_map(|s| {
            let (latitude, longitude) = s.location?;
            Some(ShelterMarker {
                latitude,
                longitude,
                capacity: s.evacuation_capacity,
                name: s.name.as_deref(),
                radius_m: s.evacuation_capacity as f64 * SHELTER_RADIUS_PER_CAPACITY,
            })
        })
        .collect();

    let mut legends = Vec::new();
    if let Some(scale) = &pct_scale {
        legends.push(Legend {
            title: "Shelter Capacity (%)",
            layer: "Shelter Capacity",
            bins: scale.legend(),
        });
    }
    if let Some(scale) = &insurance_scale {
        legends.push(Legend {
            title: "Insurance Cost ($)",
            layer: "Insurance Cost",
            bins: scale.legend(),
        });
    }

    json!({
        "boundaries": {"type": "FeatureCollection", "features": features},
        "events": events,
        "shelters": shelters,
        "legends": legends,
        "missingColor": MISSING_COLOR,
    })
}

/// Serialize for a `<script>` block; `</` is escaped so data cannot close the tag.
fn script_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn render_map(config: &MapConfig, inputs: &MapInputs) -> Result<String> {
    let template = MapTemplate {
        title: "Earthquake preparation map".to_string(),
        center_latitude: config.center_latitude,
        center_longitude: config.center_longitude,
        zoom: config.zoom,
        payload: script_json(&map_payload(inputs))?,
    };
    Ok(template.render()?)
}

#[instrument(skip(path, config, inputs), fields(path = %path.display()))]
pub fn write_map(path: &Path, config: &MapConfig, inputs: &MapInputs) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_map(config, inputs)?)?;
    info!(
        regions = inputs.boundaries.len(),
        events = inputs.events.len(),
        shelters = inputs.shelters.len(),
        "Wrote map"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HousingInsurance, HousingRecord, Percentage};
    use crate::engine::merge::merge_final;
    use chrono::{TimeZone, Utc};

    fn code(raw: &str) -> PostalCode {
        PostalCode::parse(raw).unwrap()
    }

    fn boundary(zip: &str) -> ZipBoundary {
        ZipBoundary {
            postal_code: code(zip),
            feature: json!({"type": "Feature", "properties": {"name": zip}, "geometry": null}),
        }
    }

    fn aggregate(zip: &str, pct: Option<Percentage>) -> ShelterAggregate {
        ShelterAggregate {
            postal_code: code(zip),
            shelter_capacity: Some(10),
            population: Some(100),
            shelter_capacity_pct: pct,
        }
    }

    #[test]
    fn test_color_scale_bins() {
        let scale = ColorScale::from_values(&[0.0, 60.0], &RD_YL_GN).unwrap();
        assert_eq!(scale.color(0.0), RD_YL_GN[0]);
        assert_eq!(scale.color(15.0), RD_YL_GN[1]);
        assert_eq!(scale.color(60.0), RD_YL_GN[5]);
        assert_eq!(scale.legend().len(), 6);
        assert_eq!(scale.legend()[5].upper, 60.0);

        let flat = ColorScale::from_values(&[5.0], &YL_OR_RD).unwrap();
        assert_eq!(flat.color(5.0), YL_OR_RD[0]);
        assert!(ColorScale::from_values(&[], &YL_OR_RD).is_none());
    }

    #[test]
    fn test_payload_colors_missing_regions_neutral() {
        let boundaries = vec![boundary("90001"), boundary("90002"), boundary("90003")];
        let aggregate = vec![
            aggregate("90001", Some(Percentage::Known(1.0))),
            aggregate("90002", Some(Percentage::Known(9.0))),
            aggregate("90003", None),
        ];
        let insured = HousingInsurance {
            housing: HousingRecord {
                postal_code: code("90001"),
                housing_units: 10.0,
                median_home_value: 1.0,
                home_value_imputed: false,
            },
            raw_insurance_per_house: 1.0,
            coverage_cost_10pct: 1.0,
        };
        let table = merge_final(&[insured], &aggregate);
        let inputs = MapInputs {
            boundaries: &boundaries,
            shelter_aggregate: &aggregate,
            final_table: &table,
            events: &[],
            shelters: &[],
        };
        let payload = map_payload(&inputs);
        let features = payload["boundaries"]["features"].as_array().unwrap();
        assert_eq!(features[0]["properties"]["shelter_color"], RD_YL_GN[0]);
        assert_eq!(features[1]["properties"]["shelter_color"], RD_YL_GN[5]);
        assert_eq!(features[2]["properties"]["shelter_color"], MISSING_COLOR);
        assert!(features[2]["properties"]["shelter_pct"].is_null());
        assert_eq!(features[1]["properties"]["insurance_color"], MISSING_COLOR);
        assert_eq!(features[0]["properties"]["zip"], "90001");
        assert_eq!(payload["legends"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_rendered_page_has_every_layer() {
        let events = vec![SeismicEvent {
            id: "ci1".to_string(),
            magnitude: 6.7,
            time: Utc.with_ymd_and_hms(1994, 1, 17, 12, 30, 55).unwrap(),
            place: "</script><b>x</b>".to_string(),
            latitude: 34.2,
            longitude: -118.5,
            postal_code: None,
        }];
        let shelters = vec![
            ShelterRecord {
                postal_code: code("90001"),
                name: None,
                evacuation_capacity: 200,
                location: Some((33.97, -118.25)),
            },
            ShelterRecord {
                postal_code: code("90001"),
                name: None,
                evacuation_capacity: 50,
                location: None,
            },
        ];
        let table = FinalTable::default();
        let inputs = MapInputs {
            boundaries: &[],
            shelter_aggregate: &[],
            final_table: &table,
            events: &events,
            shelters: &shelters,
        };

        let payload = map_payload(&inputs);
        assert_eq!(payload["shelters"].as_array().unwrap().len(), 1);
        assert_eq!(payload["shelters"][0]["radius_m"], 100.0);
        assert_eq!(payload["events"][0]["color"], magnitude_color(6.7));

        let html = render_map(&MapConfig::default(), &inputs).unwrap();
        for layer in ["Shelter Capacity", "Insurance Cost", "Earthquakes", "Shelters"] {
            assert!(html.contains(layer), "missing layer {}", layer);
        }
        assert!(!html.contains("</script><b>"));
    }
}
