//! Turns filtered records into what the map, listing and charts consume.

use crate::aggregate;
use crate::config::MapConfig;
use crate::filter::{self, FilterCriteria};
use crate::types::{AggregateCount, BusinessRecord, GroupField, RecordTable};
use askama::Template;
use geo::{Centroid, MultiPoint, Point};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDetail {
    pub name: String,
    pub category: String,
    pub district: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    pub detail: MarkerDetail,
    /// Escaped hover text, safe to hand to the map as markup.
    pub tooltip: String,
    pub popup: String,
}

#[derive(Template)]
#[template(path = "popup.html")]
struct PopupTemplate<'a> {
    detail: &'a MarkerDetail,
}

#[derive(Template)]
#[template(path = "tooltip.html")]
struct TooltipTemplate<'a> {
    label: &'a str,
}

impl Marker {
    pub fn from_record(record: &BusinessRecord) -> Self {
        let detail = MarkerDetail {
            name: record.name.clone(),
            category: record.category.clone(),
            district: record.district.clone(),
            address: record.address.clone(),
        };
        let popup = PopupTemplate { detail: &detail }.to_string();
        let tooltip = TooltipTemplate { label: &record.name }.to_string();

        Self {
            lat: record.lat,
            lon: record.lon,
            label: record.name.clone(),
            detail,
            tooltip,
            popup,
        }
    }
}

/// Mean (lat, lon) of `table`, or `None` when it is empty.
fn mean_position(table: &RecordTable) -> Option<(f64, f64)> {
    let points: MultiPoint<f64> = table.iter().map(|r| Point::new(r.lon, r.lat)).collect();
    points.centroid().map(|c| (c.y(), c.x()))
}

/// Map center: mean of the filtered records, falling back to the full table
/// when the filter matched nothing. `None` only if both are empty.
pub fn center_point(filtered: &RecordTable, full: &RecordTable) -> Option<(f64, f64)> {
    mean_position(filtered).or_else(|| mean_position(full))
}

/// One marker per record. Records sharing coordinates each get their own marker.
pub fn markers(filtered: &RecordTable) -> Vec<Marker> {
    filtered.iter().map(Marker::from_record).collect()
}

pub fn feature_collection(markers: &[Marker]) -> FeatureCollection {
    let features = markers
        .iter()
        .map(|marker| {
            let mut properties = serde_json::Map::new();
            properties.insert("label".to_string(), marker.label.clone().into());
            properties.insert("name".to_string(), marker.detail.name.clone().into());
            properties.insert("category".to_string(), marker.detail.category.clone().into());
            properties.insert("district".to_string(), marker.detail.district.clone().into());
            properties.insert("address".to_string(), marker.detail.address.clone().into());
            properties.insert("tooltip".to_string(), marker.tooltip.clone().into());
            properties.insert("popup".to_string(), marker.popup.clone().into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![marker.lon, marker.lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

impl From<Vec<AggregateCount>> for ChartSeries {
    fn from(counts: Vec<AggregateCount>) -> Self {
        let (labels, values) = counts.into_iter().map(|c| (c.key, c.count)).unzip();
        Self { labels, values }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewWarning {
    EmptyResult,
}

impl ViewWarning {
    pub fn message(&self) -> &'static str {
        match self {
            ViewWarning::EmptyResult => "Tidak ada UMKM yang cocok dengan filter",
        }
    }
}

/// Everything one interaction renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub total: usize,
    pub center: MapCenter,
    pub markers: Vec<Marker>,
    pub records: RecordTable,
    pub district_chart: ChartSeries,
    pub category_chart: ChartSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ViewWarning>,
}

impl DashboardView {
    pub fn build(full: &RecordTable, criteria: &FilterCriteria, map: &MapConfig) -> Self {
        let filtered = filter::apply(full, criteria);

        let (lat, lon) = center_point(&filtered, full)
            .unwrap_or((map.default_center[0], map.default_center[1]));

        // Charts summarise the whole table, not the filtered view.
        let district_chart = aggregate::count_by(full, GroupField::District).into();
        let category_chart = aggregate::count_by(full, GroupField::Category).into();

        let warning = filtered.is_empty().then_some(ViewWarning::EmptyResult);
        if warning.is_some() {
            tracing::debug!(?criteria, "Filter matched no records");
        }

        Self {
            total: filtered.len(),
            center: MapCenter {
                lat,
                lon,
                zoom: map.zoom_start,
            },
            markers: markers(&filtered),
            records: filtered,
            district_chart,
            category_chart,
            warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{self, DataSource};
    use crate::filter::Selection;

    const EPS: f64 = 1e-9;

    fn sample() -> RecordTable {
        data::load(&DataSource::Embedded).unwrap().table
    }

    fn record(name: &str, lat: f64, lon: f64) -> BusinessRecord {
        BusinessRecord {
            name: name.to_string(),
            category: "Jasa".to_string(),
            district: "Majene".to_string(),
            address: "Jl. A".to_string(),
            lat,
            lon,
        }
    }

    #[test]
    fn test_center_is_mean_of_filtered() {
        let full = sample();
        let mamuju = filter::apply(&full, &FilterCriteria::new(Selection::Only("Mamuju".into()), Selection::All, ""));

        let (lat, lon) = center_point(&mamuju, &full).unwrap();
        assert!((lat - (-2.6744 + -2.6901 + -2.6749) / 3.0).abs() < EPS);
        assert!((lon - (118.8877 + 118.9012 + 118.8966) / 3.0).abs() < EPS);
    }

    #[test]
    fn test_center_falls_back_to_full_table() {
        let full = sample();
        let none = filter::apply(&full, &FilterCriteria::new(Selection::All, Selection::All, "zzz"));
        assert!(none.is_empty());

        let (lat, lon) = center_point(&none, &full).unwrap();
        let mean_lat = full.iter().map(|r| r.lat).sum::<f64>() / full.len() as f64;
        let mean_lon = full.iter().map(|r| r.lon).sum::<f64>() / full.len() as f64;
        assert!(!lat.is_nan() && !lon.is_nan());
        assert!((lat - mean_lat).abs() < EPS);
        assert!((lon - mean_lon).abs() < EPS);
    }

    #[test]
    fn test_center_of_two_empty_tables_is_none() {
        assert!(center_point(&RecordTable::default(), &RecordTable::default()).is_none());
    }

    #[test]
    fn test_markers_are_not_deduplicated() {
        let table = RecordTable::new(vec![record("A", -3.0, 119.0), record("B", -3.0, 119.0)]);
        let markers = markers(&table);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].label, "A");
        assert_eq!(markers[1].label, "B");
        assert_eq!(markers[0].detail.district, "Majene");
    }

    #[test]
    fn test_tooltip_escapes_uploaded_markup() {
        let marker = Marker::from_record(&record("<img src=x onerror=alert(1)>", -3.0, 119.0));
        assert_eq!(marker.tooltip, "&lt;img src=x onerror=alert(1)&gt;");
        assert!(!marker.popup.contains("<img"));
        assert_eq!(marker.label, "<img src=x onerror=alert(1)>");
    }

    #[test]
    fn test_popup_escapes_html() {
        let marker = Marker::from_record(&record("Toko <Baru> & Co", -3.0, 119.0));
        assert_eq!(
            marker.popup,
            "<b>Toko &lt;Baru&gt; &amp; Co</b><br>Kategori: Jasa<br>Kabupaten: Majene<br>Alamat: Jl. A"
        );
    }

    #[test]
    fn test_feature_collection_uses_lon_lat_order() {
        let markers = markers(&RecordTable::new(vec![record("A", -3.5, 118.9)]));
        let collection = feature_collection(&markers);
        assert_eq!(collection.features.len(), 1);

        let feature = &collection.features[0];
        match &feature.geometry.as_ref().unwrap().value {
            Value::Point(coords) => assert_eq!(coords, &vec![118.9, -3.5]),
            other => panic!("expected point, got {:?}", other),
        }
        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties["name"], "A");
        assert_eq!(properties["address"], "Jl. A");
    }

    #[test]
    fn test_view_charts_ignore_district_filter() {
        let full = sample();
        let map = MapConfig::default();

        let unfiltered = DashboardView::build(&full, &FilterCriteria::default(), &map);
        let filtered = DashboardView::build(
            &full,
            &FilterCriteria::new(Selection::Only("Mamuju".into()), Selection::All, ""),
            &map,
        );

        assert_eq!(filtered.total, 3);
        assert_eq!(filtered.markers.len(), 3);
        assert_eq!(filtered.category_chart, unfiltered.category_chart);
        assert_eq!(filtered.district_chart, unfiltered.district_chart);

        let kuliner = filtered.category_chart.labels.iter().position(|l| l == "Kuliner").unwrap();
        assert_eq!(filtered.category_chart.values[kuliner], 4);
        assert_eq!(filtered.category_chart.values.iter().sum::<usize>(), 10);
    }

    #[test]
    fn test_view_empty_result_warns_and_centers_on_full() {
        let full = sample();
        let map = MapConfig::default();
        let view = DashboardView::build(&full, &FilterCriteria::new(Selection::All, Selection::All, "zzz"), &map);

        assert_eq!(view.total, 0);
        assert!(view.markers.is_empty());
        assert!(view.records.is_empty());
        assert_eq!(view.warning, Some(ViewWarning::EmptyResult));
        let (lat, lon) = center_point(&full, &full).unwrap();
        assert!((view.center.lat - lat).abs() < EPS);
        assert!((view.center.lon - lon).abs() < EPS);
        assert_eq!(view.center.zoom, 8);
    }

    #[test]
    fn test_view_on_empty_table_uses_default_center() {
        let map = MapConfig::default();
        let view = DashboardView::build(&RecordTable::default(), &FilterCriteria::default(), &map);
        assert_eq!(view.center.lat, map.default_center[0]);
        assert_eq!(view.center.lon, map.default_center[1]);
        assert!(view.district_chart.labels.is_empty());
    }

    #[test]
    fn test_view_serializes_source_column_names() {
        let view = DashboardView::build(&sample(), &FilterCriteria::default(), &MapConfig::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["total"], 10);
        assert_eq!(json["records"][0]["nama_umkm"], "Warung Makan Sederhana");
        assert!(json.get("warning").is_none());
    }
}
