//! Display color assignment for filtered records
//!
//! Attaches a hex color to every record of the filtered set according to
//! the request's coloring mode. Records are never dropped or reordered.

use super::colors::{categorical_color, token_match_color};
use super::palettes;
use super::record::{Category, Record};
use super::request::{ColorBy, FilterRequest};
use super::statistics::DateRange;
use crate::config::EngineConfig;
use log::debug;

/// A filtered record paired with the color it is drawn with
///
/// Borrowed from the source dataset: colors live only in the per-query view.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFeature<'a> {
    pub record: &'a Record,
    pub display_color: String,
}

/// Resolve the ramp for a coloring mode (request value or configured default)
pub fn ramp_name<'r>(request: &'r FilterRequest, color_by: ColorBy, config: &'r EngineConfig) -> &'r str {
    request
        .ramp_for(color_by)
        .unwrap_or(config.default_ramp.as_str())
}

/// Color an age so that the older bound maps to the ramp start and the younger to its end
///
/// A zero-width range gives the ramp midpoint; an absent age gives `default_color`.
pub fn age_color(age: Option<f64>, range: DateRange, ramp: &str, default_color: &str) -> String {
    let age = match age {
        Some(age) => age,
        None => return default_color.to_string(),
    };

    let older = range.max;
    let younger = range.min;
    let span = older - younger;
    let t = if span.abs() <= f64::EPSILON {
        0.5
    } else {
        (older - age) / span
    };

    palettes::interpolate(ramp, t)
}

/// Attach display colors to the filtered records
///
/// # Arguments
/// * `filtered` - Records that passed filtering, in output order
/// * `request` - Supplies the coloring mode, selections and ramp names
/// * `age_range` - Range used to normalize ages (computed from the filtered set)
/// * `config` - Supplies the default point color and default ramp
pub fn assign_colors<'a>(
    filtered: Vec<&'a Record>,
    request: &FilterRequest,
    age_range: DateRange,
    config: &EngineConfig,
) -> Vec<DisplayFeature<'a>> {
    let color_by = request.color_by;
    let ramp = ramp_name(request, color_by, config);
    let default_color = config.default_point_color.as_str();

    debug!(
        "assign_colors: {} records, color_by={:?}, ramp='{}'",
        filtered.len(),
        color_by,
        ramp
    );

    filtered
        .into_iter()
        .map(|record| {
            let display_color = match color_by {
                ColorBy::None => default_color.to_string(),
                ColorBy::Age => age_color(record.age(), age_range, ramp, default_color),
                ColorBy::Culture => categorical_color(
                    record.culture(),
                    request.selected(Category::Culture),
                    ramp,
                    default_color,
                ),
                ColorBy::YHaplogroup => categorical_color(
                    record.y_haplogroup(),
                    request.selected(Category::YHaplogroup),
                    ramp,
                    default_color,
                ),
                ColorBy::MtDna => categorical_color(
                    record.mt_dna(),
                    request.selected(Category::MtDna),
                    ramp,
                    default_color,
                ),
                ColorBy::YHaplotree => token_match_color(
                    record.y_haplotree_path(),
                    &request.y_haplotree_terms,
                    ramp,
                    default_color,
                ),
            };
            DisplayFeature {
                record,
                display_color,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::request::CategoryFilter;

    fn records() -> Vec<Record> {
        vec![
            Record::new("old", 0.0, 0.0)
                .with_age(Some(9000.0))
                .with_culture(Some("Yamnaya"))
                .with_y_haplotree_path(Some("R>M269")),
            Record::new("young", 0.0, 0.0)
                .with_age(Some(1000.0))
                .with_culture(Some("BellBeaker")),
            Record::new("undated", 0.0, 0.0).with_culture(Some("Other")),
        ]
    }

    fn colors(features: &[DisplayFeature<'_>]) -> Vec<String> {
        features.iter().map(|f| f.display_color.clone()).collect()
    }

    #[test]
    fn test_no_coloring_uses_default() {
        let records = records();
        let config = EngineConfig::default();
        let features = assign_colors(
            records.iter().collect(),
            &FilterRequest::default(),
            DateRange::new(1000.0, 9000.0),
            &config,
        );
        assert_eq!(features.len(), 3);
        assert!(features
            .iter()
            .all(|f| f.display_color == config.default_point_color));
    }

    #[test]
    fn test_age_coloring_oldest_first() {
        let records = records();
        let config = EngineConfig::default();
        let request = FilterRequest {
            color_by: ColorBy::Age,
            ..Default::default()
        };
        let features = assign_colors(
            records.iter().collect(),
            &request,
            DateRange::new(1000.0, 9000.0),
            &config,
        );
        assert_eq!(
            colors(&features),
            vec![
                "#440154".to_string(),
                "#fde725".to_string(),
                config.default_point_color.clone()
            ]
        );
    }

    #[test]
    fn test_age_coloring_zero_width_range() {
        assert_eq!(
            age_color(Some(500.0), DateRange::new(500.0, 500.0), "greys", "#000000"),
            "#808080"
        );
    }

    #[test]
    fn test_culture_coloring_uses_selection_and_ramp() {
        let records = records();
        let config = EngineConfig::default();
        let request = FilterRequest {
            color_by: ColorBy::Culture,
            culture_filter: Some(CategoryFilter::new(["BellBeaker", "Yamnaya"])),
            culture_color_ramp: Some("greys".to_string()),
            ..Default::default()
        };
        let features = assign_colors(
            records.iter().collect(),
            &request,
            DateRange::new(1000.0, 9000.0),
            &config,
        );
        assert_eq!(
            colors(&features),
            vec![
                "#000000".to_string(),
                "#ffffff".to_string(),
                config.default_point_color.clone()
            ]
        );
    }

    #[test]
    fn test_haplotree_coloring() {
        let records = records();
        let config = EngineConfig::default();
        let request = FilterRequest {
            color_by: ColorBy::YHaplotree,
            y_haplotree_terms: vec!["M269".to_string()],
            ..Default::default()
        };
        let features = assign_colors(
            records.iter().collect(),
            &request,
            DateRange::new(1000.0, 9000.0),
            &config,
        );
        // Single term sits at the ramp midpoint
        assert_eq!(features[0].display_color, palettes::interpolate("viridis", 0.5));
        assert_eq!(features[1].display_color, config.default_point_color);
    }

    #[test]
    fn test_unknown_ramp_is_gray() {
        let records = records();
        let config = EngineConfig::default();
        let request = FilterRequest {
            color_by: ColorBy::Age,
            age_color_ramp: Some("does-not-exist".to_string()),
            ..Default::default()
        };
        let features = assign_colors(
            records.iter().take(1).collect(),
            &request,
            DateRange::new(1000.0, 9000.0),
            &config,
        );
        assert_eq!(features[0].display_color, palettes::FALLBACK_COLOR);
    }
}
