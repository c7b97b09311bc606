//! Decoded filter-and-color request
//!
//! Every field is optional on the wire and defaults to "let everything
//! through, color nothing". Unknown fields are ignored.

use super::record::Category;
use serde::{Deserialize, Deserializer, Serialize};

/// Which attribute drives point colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorBy {
    #[default]
    None,
    Age,
    Culture,
    #[serde(alias = "y_haplogroup")]
    YHaplogroup,
    #[serde(alias = "mt_dna", alias = "mtdna")]
    MtDna,
    #[serde(alias = "y_haplotree")]
    YHaplotree,
}

/// Value selection for one categorical dimension
///
/// `selected` is ordered: categorical colors are assigned by position in
/// this list, so reordering it changes colors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryFilter {
    #[serde(deserialize_with = "null_as_default")]
    pub selected: Vec<String>,
    /// Prefix used to narrow the dropdown of available values
    #[serde(deserialize_with = "null_as_default")]
    pub search: String,
}

impl CategoryFilter {
    pub fn new<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: selected.into_iter().map(Into::into).collect(),
            search: String::new(),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterRequest {
    pub date_min: Option<f64>,
    pub date_max: Option<f64>,
    #[serde(deserialize_with = "null_as_true")]
    pub include_undated: bool,

    /// `None` means no value selection on this dimension
    pub culture_filter: Option<CategoryFilter>,
    #[serde(deserialize_with = "null_as_true")]
    pub include_no_culture: bool,

    pub y_haplogroup_filter: Option<CategoryFilter>,
    #[serde(deserialize_with = "null_as_true")]
    pub include_no_y_haplogroup: bool,

    pub mt_dna_filter: Option<CategoryFilter>,
    #[serde(deserialize_with = "null_as_true")]
    pub include_no_mt_dna: bool,

    /// Haplotree node labels; when non-empty this replaces the Y-haplogroup filter
    #[serde(deserialize_with = "null_as_default")]
    pub y_haplotree_terms: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub color_by: ColorBy,

    /// Ramp names per colorable dimension; `None` uses the configured default
    pub age_color_ramp: Option<String>,
    pub culture_color_ramp: Option<String>,
    pub y_haplogroup_color_ramp: Option<String>,
    pub mt_dna_color_ramp: Option<String>,
    pub y_haplotree_color_ramp: Option<String>,
}

impl Default for FilterRequest {
    fn default() -> Self {
        Self {
            date_min: None,
            date_max: None,
            include_undated: true,
            culture_filter: None,
            include_no_culture: true,
            y_haplogroup_filter: None,
            include_no_y_haplogroup: true,
            mt_dna_filter: None,
            include_no_mt_dna: true,
            y_haplotree_terms: Vec::new(),
            color_by: ColorBy::None,
            age_color_ramp: None,
            culture_color_ramp: None,
            y_haplogroup_color_ramp: None,
            mt_dna_color_ramp: None,
            y_haplotree_color_ramp: None,
        }
    }
}

impl FilterRequest {
    /// Date bounds with NaN dropped and min/max swapped when inverted
    pub fn date_bounds(&self) -> (Option<f64>, Option<f64>) {
        let min = self.date_min.filter(|v| !v.is_nan());
        let max = self.date_max.filter(|v| !v.is_nan());
        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
            bounds => bounds,
        }
    }

    pub fn category_filter(&self, category: Category) -> Option<&CategoryFilter> {
        match category {
            Category::Culture => self.culture_filter.as_ref(),
            Category::YHaplogroup => self.y_haplogroup_filter.as_ref(),
            Category::MtDna => self.mt_dna_filter.as_ref(),
            Category::YHaplotreePath => None,
        }
    }

    pub fn include_absent(&self, category: Category) -> bool {
        match category {
            Category::Culture => self.include_no_culture,
            Category::YHaplogroup => self.include_no_y_haplogroup,
            Category::MtDna => self.include_no_mt_dna,
            // There is no include-no-path flag: the token filter always drops absent paths
            Category::YHaplotreePath => false,
        }
    }

    /// Selected values in request order (empty when the dimension has no filter)
    pub fn selected(&self, category: Category) -> &[String] {
        self.category_filter(category)
            .map(|f| f.selected.as_slice())
            .unwrap_or(&[])
    }

    /// Search prefix for a dimension's dropdown
    pub fn search(&self, category: Category) -> &str {
        self.category_filter(category)
            .map(|f| f.search.as_str())
            .unwrap_or("")
    }

    /// Whether the haplotree token filter replaces the Y-haplogroup filter
    pub fn uses_haplotree(&self) -> bool {
        self.y_haplotree_terms.iter().any(|t| !t.trim().is_empty())
    }

    /// Ramp explicitly requested for a coloring mode
    pub fn ramp_for(&self, color_by: ColorBy) -> Option<&str> {
        let ramp = match color_by {
            ColorBy::None => None,
            ColorBy::Age => self.age_color_ramp.as_deref(),
            ColorBy::Culture => self.culture_color_ramp.as_deref(),
            ColorBy::YHaplogroup => self.y_haplogroup_color_ramp.as_deref(),
            ColorBy::MtDna => self.mt_dna_color_ramp.as_deref(),
            ColorBy::YHaplotree => self.y_haplotree_color_ramp.as_deref(),
        };
        ramp.filter(|r| !r.trim().is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Include switches default to letting records through, so null means true
fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}
