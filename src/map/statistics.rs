//! Dataset statistics and cascading filter-option discovery
//!
//! Availability is always computed over the full dataset, checking every
//! constraint except the one on the dimension being listed. Narrowing the
//! date range therefore shrinks the culture list, but selecting a culture
//! never hides the other cultures from its own dropdown.

use super::colors::{categorical_color, token_match_color};
use super::filters::{Constraints, Dimension};
use super::record::{Category, NumericField, Record};
use serde::Serialize;
use std::collections::BTreeSet;

/// Closed range of ages in cal BP
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateRange {
    pub min: f64,
    pub max: f64,
}

impl DateRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Date extent plus the 2nd/98th percentiles that drive the range slider
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateStatistics {
    pub min: f64,
    pub max: f64,
    pub p2: f64,
    pub p98: f64,
}

impl DateStatistics {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.min, self.max)
    }
}

/// One legend row: a selected value and the color it is drawn with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub color: String,
}

/// Present values of a numeric field, in record order
pub fn extract_numeric<'a, I>(records: I, field: NumericField) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter_map(|r| r.numeric(field))
        .collect()
}

/// Sorted unique present values of a categorical field
pub fn extract_categorical<'a, I>(records: I, category: Category) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter_map(|r| r.category(category))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Min, max and 2nd/98th percentile of the dated records
///
/// With no dated records the configured default range is returned and both
/// percentiles sit at its midpoint.
pub fn date_statistics<'a, I>(records: I, defaults: DateRange) -> DateStatistics
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut ages = extract_numeric(records, NumericField::Age);
    if ages.is_empty() {
        let mid = defaults.midpoint();
        return DateStatistics {
            min: defaults.min,
            max: defaults.max,
            p2: mid,
            p98: mid,
        };
    }

    ages.sort_by(f64::total_cmp);
    let n = ages.len();
    let p2_index = ((n as f64 * 0.02).floor() as usize).min(n - 1);
    let p98_index = ((n as f64 * 0.98).ceil() as usize)
        .saturating_sub(1)
        .min(n - 1)
        .max(p2_index);

    DateStatistics {
        min: ages[0],
        max: ages[n - 1],
        p2: ages[p2_index],
        p98: ages[p98_index],
    }
}

/// Values of `category` present on records that pass every other constraint
///
/// `category` selects which dimension is being listed; its own constraint
/// is skipped. Haplotree paths are listed against the Y dimension too.
pub fn compute_available<'a, I>(
    records: I,
    constraints: &Constraints<'_>,
    category: Category,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let skipped = match category {
        Category::Culture => Dimension::Culture,
        Category::YHaplogroup | Category::YHaplotreePath => Dimension::Y,
        Category::MtDna => Dimension::MtDna,
    };

    extract_categorical(
        records
            .into_iter()
            .filter(|r| r.category(category).is_some())
            .filter(|r| constraints.admits_except(r, skipped)),
        category,
    )
}

/// Age extent of dated records that pass every non-date constraint
///
/// Falls back to `defaults` when no such record exists.
pub fn compute_available_date_range<'a, I>(
    records: I,
    constraints: &Constraints<'_>,
    defaults: DateRange,
) -> DateRange
where
    I: IntoIterator<Item = &'a Record>,
{
    let extent = records
        .into_iter()
        .filter(|r| constraints.admits_except(r, Dimension::Date))
        .filter_map(Record::age)
        .fold(None, |acc: Option<DateRange>, age| match acc {
            None => Some(DateRange::new(age, age)),
            Some(range) => Some(DateRange::new(range.min.min(age), range.max.max(age))),
        });

    extent.unwrap_or(defaults)
}

/// `(min, max)` of a numeric field, `None` when no record carries it
pub fn numeric_extent<'a, I>(records: I, field: NumericField) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a Record>,
{
    let values = extract_numeric(records, field);
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    Some((min, max))
}

/// Age extent of the given records, `None` when none of them is dated
pub fn date_extent<'a, I>(records: I) -> Option<DateRange>
where
    I: IntoIterator<Item = &'a Record>,
{
    numeric_extent(records, NumericField::Age).map(|(min, max)| DateRange::new(min, max))
}

/// Legend for a categorical selection, in selection order
///
/// Selected values that are not currently available are kept.
pub fn build_legend(selected: &[String], ramp: &str, default_color: &str) -> Vec<LegendEntry> {
    selected
        .iter()
        .map(|name| LegendEntry {
            name: name.clone(),
            color: categorical_color(Some(name), selected, ramp, default_color),
        })
        .collect()
}

/// Legend for haplotree terms, in term order
pub fn build_haplotree_legend(terms: &[String], ramp: &str, default_color: &str) -> Vec<LegendEntry> {
    terms
        .iter()
        .map(|term| LegendEntry {
            name: term.clone(),
            color: token_match_color(Some(term), terms, ramp, default_color),
        })
        .collect()
}

/// Case-insensitive prefix filter; a blank search returns everything
pub fn filter_by_search_prefix(values: &[String], search: &str) -> Vec<String> {
    let search = search.trim().to_lowercase();
    if search.is_empty() {
        return values.to_vec();
    }
    values
        .iter()
        .filter(|v| v.to_lowercase().starts_with(&search))
        .cloned()
        .collect()
}
