//! Query pipeline
//!
//! The single entry point that turns a dataset and a filter request into a
//! response:
//! 1. Filters the dataset
//! 2. Computes metadata (counts, cascading availability, legends, date statistics)
//! 3. Derives the age coloring range from the filtered subset
//! 4. Assigns display colors
//!
//! Availability lists are always computed against the full dataset, never
//! the filtered subset, so that constraints cascade instead of dead-ending.

use crate::config::EngineConfig;
use crate::map::color_processor::{assign_colors, ramp_name, DisplayFeature};
use crate::map::filters::{apply_filters, Constraints};
use crate::map::record::{Category, Record};
use crate::map::request::{ColorBy, FilterRequest};
use crate::map::statistics::{
    build_haplotree_legend, build_legend, compute_available, compute_available_date_range,
    date_extent, date_statistics, filter_by_search_prefix, DateRange, DateStatistics, LegendEntry,
};
use crate::memprof;
use log::debug;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Derived, read-only description of the current filter state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMeta {
    pub total_count: usize,
    pub filtered_count: usize,

    /// Selectable values per dimension, narrowed by the other dimensions and the search prefix
    pub available_cultures: Vec<String>,
    pub available_y_haplogroups: Vec<String>,
    pub available_mt_dnas: Vec<String>,

    /// Name → color rows for the currently selected values
    pub culture_legend: Vec<LegendEntry>,
    pub y_haplogroup_legend: Vec<LegendEntry>,
    pub mt_dna_legend: Vec<LegendEntry>,
    pub y_haplotree_legend: Vec<LegendEntry>,

    /// Age extent reachable under the non-date constraints
    pub available_date_range: DateRange,
    /// Statistics of the full dataset (drives the range slider)
    pub date_statistics: DateStatistics,
    /// Range used to normalize ages for coloring
    pub age_color_range: Option<DateRange>,
}

/// Filtered, colored features plus metadata
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse<'a> {
    pub features: Vec<DisplayFeature<'a>>,
    pub meta: FilterMeta,
}

impl Serialize for QueryResponse<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QueryResponse", 3)?;
        state.serialize_field("type", "FeatureCollection")?;
        state.serialize_field("features", &self.features)?;
        state.serialize_field("meta", &self.meta)?;
        state.end()
    }
}

/// Compute counts, cascading availability, legends and date statistics
///
/// # Arguments
/// * `all_records` - The full dataset (candidate pool for availability)
/// * `filtered` - Records that passed every filter
/// * `request` - Current filter state
/// * `config` - Supplies default age range, point color and ramp
pub fn build_filter_meta(
    all_records: &[Record],
    filtered: &[&Record],
    request: &FilterRequest,
    config: &EngineConfig,
) -> FilterMeta {
    let constraints = Constraints::from_request(request);
    let defaults = config.age_defaults();

    let available = |category: Category| {
        let values = compute_available(all_records, &constraints, category);
        filter_by_search_prefix(&values, request.search(category))
    };

    let legend = |category: Category, color_by: ColorBy| {
        build_legend(
            request.selected(category),
            ramp_name(request, color_by, config),
            &config.default_point_color,
        )
    };

    FilterMeta {
        total_count: all_records.len(),
        filtered_count: filtered.len(),
        available_cultures: available(Category::Culture),
        available_y_haplogroups: available(Category::YHaplogroup),
        available_mt_dnas: available(Category::MtDna),
        culture_legend: legend(Category::Culture, ColorBy::Culture),
        y_haplogroup_legend: legend(Category::YHaplogroup, ColorBy::YHaplogroup),
        mt_dna_legend: legend(Category::MtDna, ColorBy::MtDna),
        y_haplotree_legend: build_haplotree_legend(
            &request.y_haplotree_terms,
            ramp_name(request, ColorBy::YHaplotree, config),
            &config.default_point_color,
        ),
        available_date_range: compute_available_date_range(all_records, &constraints, defaults),
        date_statistics: date_statistics(all_records, defaults),
        age_color_range: None,
    }
}

/// Run one query: filter, describe, color
///
/// Pure with respect to `all_records`; colors live only in the returned view.
pub fn process_query<'a>(
    all_records: &'a [Record],
    request: &FilterRequest,
    config: &EngineConfig,
) -> QueryResponse<'a> {
    let t0 = memprof::time_start("process_query");

    let filtered = apply_filters(all_records, request);
    let t1 = memprof::time_elapsed("apply_filters", t0);

    let mut meta = build_filter_meta(all_records, &filtered, request, config);
    let t2 = memprof::time_elapsed("build_filter_meta", t1);

    // Local contrast: color against the visible subset, not the whole dataset
    let age_range = date_extent(filtered.iter().copied()).unwrap_or_else(|| meta.date_statistics.range());
    meta.age_color_range = Some(age_range);

    debug!(
        "process_query: {}/{} records, age color range [{}, {}]",
        meta.filtered_count, meta.total_count, age_range.min, age_range.max
    );

    let features = assign_colors(filtered, request, age_range, config);
    memprof::time_elapsed("assign_colors", t2);

    QueryResponse { features, meta }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::request::CategoryFilter;

    fn rec(id: &str, age: Option<f64>, culture: Option<&str>) -> Record {
        Record::new(id, 0.0, 0.0).with_age(age).with_culture(culture)
    }

    fn scenario() -> Vec<Record> {
        vec![
            rec("yamnaya-5000", Some(5000.0), Some("Yamnaya")),
            rec("bb-8000", Some(8000.0), Some("BellBeaker")),
            rec("yamnaya-12000", Some(12000.0), Some("Yamnaya")),
            rec("cw-undated", None, Some("CordedWare")),
            rec("none-6000", Some(6000.0), None),
        ]
    }

    fn ids(response: &QueryResponse<'_>) -> Vec<String> {
        response
            .features
            .iter()
            .map(|f| f.record.id().to_string())
            .collect()
    }

    #[test]
    fn test_end_to_end_date_window() {
        let records = scenario();
        let config = EngineConfig::default();
        let mut request = FilterRequest {
            date_min: Some(4000.0),
            date_max: Some(9000.0),
            include_undated: true,
            ..Default::default()
        };

        let response = process_query(&records, &request, &config);
        assert_eq!(response.features.len(), 4);
        assert_eq!(response.meta.total_count, 5);
        assert_eq!(response.meta.filtered_count, 4);
        assert!(ids(&response).contains(&"cw-undated".to_string()));

        request.include_undated = false;
        let response = process_query(&records, &request, &config);
        assert_eq!(response.features.len(), 3);
        assert_eq!(
            ids(&response),
            vec!["yamnaya-5000", "bb-8000", "none-6000"]
        );
    }

    #[test]
    fn test_meta_cascades_against_full_dataset() {
        let records = scenario();
        let config = EngineConfig::default();
        let request = FilterRequest {
            date_min: Some(4000.0),
            date_max: Some(9000.0),
            include_undated: false,
            culture_filter: Some(CategoryFilter::new(["Yamnaya"])),
            ..Default::default()
        };

        // Absent cultures pass unless excluded
        let response = process_query(&records, &request, &config);
        assert_eq!(ids(&response), vec!["yamnaya-5000", "none-6000"]);

        let request = FilterRequest {
            include_no_culture: false,
            ..request
        };
        let response = process_query(&records, &request, &config);
        assert_eq!(ids(&response), vec!["yamnaya-5000"]);
        // BellBeaker stays selectable: only the date window applies to the culture list
        assert_eq!(
            response.meta.available_cultures,
            vec!["BellBeaker".to_string(), "Yamnaya".to_string()]
        );
        // The date projection ignores the date window but respects the culture selection
        assert_eq!(
            response.meta.available_date_range,
            DateRange::new(5000.0, 12000.0)
        );
        assert_eq!(response.meta.date_statistics.min, 5000.0);
        assert_eq!(response.meta.date_statistics.max, 12000.0);
    }

    #[test]
    fn test_search_prefix_narrows_available_values() {
        let records = vec![
            Record::new("a", 0.0, 0.0).with_y_haplogroup(Some("R1b1")),
            Record::new("b", 0.0, 0.0).with_y_haplogroup(Some("R1a")),
            Record::new("c", 0.0, 0.0).with_y_haplogroup(Some("I2a")),
        ];
        let request = FilterRequest {
            y_haplogroup_filter: Some(CategoryFilter::new(["R1b1"]).with_search("r1")),
            ..Default::default()
        };
        let response = process_query(&records, &request, &EngineConfig::default());
        assert_eq!(
            response.meta.available_y_haplogroups,
            vec!["R1a".to_string(), "R1b1".to_string()]
        );
        assert_eq!(response.meta.y_haplogroup_legend.len(), 1);
    }

    #[test]
    fn test_empty_result_still_has_meta() {
        let records = scenario();
        let config = EngineConfig::default();
        let request = FilterRequest {
            culture_filter: Some(CategoryFilter::new(Vec::<String>::new())),
            include_no_culture: false,
            ..Default::default()
        };

        let response = process_query(&records, &request, &config);
        assert!(response.features.is_empty());
        assert_eq!(response.meta.filtered_count, 0);
        assert_eq!(response.meta.total_count, 5);
        // Coloring range falls back to the full-dataset statistics
        assert_eq!(
            response.meta.age_color_range,
            Some(DateRange::new(5000.0, 12000.0))
        );
        // Culture list is computed without the culture constraint
        assert_eq!(response.meta.available_cultures.len(), 3);
    }

    #[test]
    fn test_empty_dataset() {
        let config = EngineConfig::default();
        let response = process_query(&[], &FilterRequest::default(), &config);
        assert!(response.features.is_empty());
        assert_eq!(response.meta.date_statistics.p2, 25000.0);
        assert_eq!(response.meta.date_statistics.p98, 25000.0);
        assert_eq!(response.meta.available_date_range, config.age_defaults());
        assert!(response.meta.available_cultures.is_empty());
    }

    #[test]
    fn test_age_coloring_is_relative_to_filtered_subset() {
        let records = scenario();
        let config = EngineConfig::default();
        let request = FilterRequest {
            date_min: Some(5000.0),
            date_max: Some(8000.0),
            include_undated: false,
            color_by: ColorBy::Age,
            ..Default::default()
        };

        let response = process_query(&records, &request, &config);
        assert_eq!(
            response.meta.age_color_range,
            Some(DateRange::new(5000.0, 8000.0))
        );
        let colors: Vec<&str> = response
            .features
            .iter()
            .map(|f| f.display_color.as_str())
            .collect();
        let middle = crate::map::palettes::interpolate("viridis", 2.0 / 3.0);
        // Oldest visible record (8000) gets the ramp start, youngest (5000) the end
        assert_eq!(colors, vec!["#fde725", "#440154", middle.as_str()]);
    }

    #[test]
    fn test_source_records_are_untouched() {
        let records = scenario();
        let before = records.clone();
        let request = FilterRequest {
            color_by: ColorBy::Culture,
            culture_filter: Some(CategoryFilter::new(["Yamnaya", "BellBeaker"])),
            ..Default::default()
        };
        let _ = process_query(&records, &request, &EngineConfig::default());
        assert_eq!(records, before);
    }

    #[test]
    fn test_response_serializes_as_feature_collection() {
        let records = scenario();
        let request = FilterRequest {
            color_by: ColorBy::Culture,
            culture_filter: Some(CategoryFilter::new(["Yamnaya", "BellBeaker"])),
            ..Default::default()
        };
        let response = process_query(&records, &request, &EngineConfig::default());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        // Absent cultures pass by default
        assert_eq!(value["features"].as_array().unwrap().len(), 4);
        assert_eq!(value["features"][0]["properties"]["displayColor"], "#440154");
        assert_eq!(value["meta"]["filteredCount"], 4);
        assert_eq!(value["meta"]["cultureLegend"][1]["name"], "BellBeaker");
        assert_eq!(value["meta"]["dateStatistics"]["p98"], 12000.0);
    }
}
