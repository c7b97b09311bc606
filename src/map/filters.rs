//! Per-dimension record predicates and their fixed composition
//!
//! Each `filter_*` function is pure and order-preserving. The same
//! constraint types are reused by the cascading-availability code in
//! `statistics`, so "passes the filter" means exactly one thing everywhere.

use super::record::{Category, Record};
use super::request::FilterRequest;
use log::debug;
use std::collections::HashSet;

/// Independently filterable dimensions (for cascading availability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Date,
    Culture,
    /// Y-haplogroup selection or, when terms are given, the haplotree token filter
    Y,
    MtDna,
}

/// Inclusive date range plus the undated switch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateConstraint {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub include_undated: bool,
}

impl DateConstraint {
    /// Bounds are swapped when given in the wrong order
    pub fn new(min: Option<f64>, max: Option<f64>, include_undated: bool) -> Self {
        let (min, max) = match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
            bounds => bounds,
        };
        Self {
            min,
            max,
            include_undated,
        }
    }

    pub fn from_request(request: &FilterRequest) -> Self {
        let (min, max) = request.date_bounds();
        Self::new(min, max, request.include_undated)
    }

    pub fn admits(&self, age: Option<f64>) -> bool {
        match age {
            None => self.include_undated,
            Some(age) => {
                age >= self.min.unwrap_or(f64::NEG_INFINITY)
                    && age <= self.max.unwrap_or(f64::INFINITY)
            }
        }
    }
}

/// Value selection on one categorical dimension
///
/// `selected == None` means no selection was made: every present value
/// passes and only the absent-value switch applies.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryConstraint<'a> {
    selected: Option<HashSet<&'a str>>,
    include_absent: bool,
}

impl<'a> CategoryConstraint<'a> {
    pub fn new(selected: Option<&'a [String]>, include_absent: bool) -> Self {
        Self {
            selected: selected.map(|values| values.iter().map(String::as_str).collect()),
            include_absent,
        }
    }

    pub fn from_request(request: &'a FilterRequest, category: Category) -> Self {
        Self::new(
            request
                .category_filter(category)
                .map(|f| f.selected.as_slice()),
            request.include_absent(category),
        )
    }

    /// True when nothing can pass (empty selection and absent values excluded)
    pub fn rejects_everything(&self) -> bool {
        !self.include_absent && self.selected.as_ref().is_some_and(HashSet::is_empty)
    }

    pub fn admits(&self, value: Option<&str>) -> bool {
        match value {
            None => self.include_absent,
            Some(v) => match &self.selected {
                None => true,
                Some(selected) => selected.contains(v),
            },
        }
    }
}

/// Case-insensitive exact match of any term against any haplotree node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HaplotreeConstraint {
    terms: Vec<String>,
}

impl HaplotreeConstraint {
    pub fn new(terms: &[String]) -> Self {
        Self {
            terms: terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Inactive constraints admit everything; active ones never admit an absent path
    pub fn admits(&self, record: &Record) -> bool {
        if !self.is_active() {
            return true;
        }
        if record.y_haplotree_path().is_none() {
            return false;
        }
        let nodes = record.haplotree_nodes();
        self.terms.iter().any(|term| nodes.contains(term))
    }
}

/// The Y-chromosome constraint: haplotree terms take precedence over the haplogroup selection
#[derive(Debug, Clone, PartialEq)]
pub enum YConstraint<'a> {
    Haplogroup(CategoryConstraint<'a>),
    Haplotree(HaplotreeConstraint),
}

impl<'a> YConstraint<'a> {
    pub fn from_request(request: &'a FilterRequest) -> Self {
        let haplotree = HaplotreeConstraint::new(&request.y_haplotree_terms);
        if haplotree.is_active() {
            YConstraint::Haplotree(haplotree)
        } else {
            YConstraint::Haplogroup(CategoryConstraint::from_request(
                request,
                Category::YHaplogroup,
            ))
        }
    }

    pub fn admits(&self, record: &Record) -> bool {
        match self {
            YConstraint::Haplogroup(c) => c.admits(record.y_haplogroup()),
            YConstraint::Haplotree(c) => c.admits(record),
        }
    }
}

/// All constraints of a request, for per-record checks
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints<'a> {
    pub date: DateConstraint,
    pub culture: CategoryConstraint<'a>,
    pub y: YConstraint<'a>,
    pub mt_dna: CategoryConstraint<'a>,
}

impl<'a> Constraints<'a> {
    pub fn from_request(request: &'a FilterRequest) -> Self {
        Self {
            date: DateConstraint::from_request(request),
            culture: CategoryConstraint::from_request(request, Category::Culture),
            y: YConstraint::from_request(request),
            mt_dna: CategoryConstraint::from_request(request, Category::MtDna),
        }
    }

    pub fn admits(&self, record: &Record) -> bool {
        self.date.admits(record.age())
            && self.culture.admits(record.culture())
            && self.y.admits(record)
            && self.mt_dna.admits(record.mt_dna())
    }

    /// Check every constraint except the one on `skipped`
    pub fn admits_except(&self, record: &Record, skipped: Dimension) -> bool {
        (skipped == Dimension::Date || self.date.admits(record.age()))
            && (skipped == Dimension::Culture || self.culture.admits(record.culture()))
            && (skipped == Dimension::Y || self.y.admits(record))
            && (skipped == Dimension::MtDna || self.mt_dna.admits(record.mt_dna()))
    }
}

/// Keep records inside the inclusive date range (undated per `include_undated`)
pub fn filter_by_date<'a>(
    records: &[&'a Record],
    date_min: Option<f64>,
    date_max: Option<f64>,
    include_undated: bool,
) -> Vec<&'a Record> {
    let constraint = DateConstraint::new(date_min, date_max, include_undated);
    records
        .iter()
        .copied()
        .filter(|r| constraint.admits(r.age()))
        .collect()
}

/// Keep records whose `category` value is selected (or absent, if allowed)
pub fn filter_by_category<'a>(
    records: &[&'a Record],
    category: Category,
    selected: Option<&[String]>,
    include_absent: bool,
) -> Vec<&'a Record> {
    let constraint = CategoryConstraint::new(selected, include_absent);
    if constraint.rejects_everything() {
        return Vec::new();
    }
    records
        .iter()
        .copied()
        .filter(|r| constraint.admits(r.category(category)))
        .collect()
}

/// Keep records whose haplotree path contains any of `terms`; identity when `terms` is empty
pub fn filter_by_haplotree<'a>(records: &[&'a Record], terms: &[String]) -> Vec<&'a Record> {
    let constraint = HaplotreeConstraint::new(terms);
    if !constraint.is_active() {
        return records.to_vec();
    }
    records
        .iter()
        .copied()
        .filter(|r| constraint.admits(r))
        .collect()
}

/// Apply date, culture, Y (haplotree XOR haplogroup) and mtDNA filters in that order
///
/// When haplotree terms are present the Y-haplogroup selection is ignored
/// entirely, whatever it contains.
pub fn apply_filters<'a>(records: &'a [Record], request: &FilterRequest) -> Vec<&'a Record> {
    let all: Vec<&Record> = records.iter().collect();
    let (date_min, date_max) = request.date_bounds();

    let by_date = filter_by_date(&all, date_min, date_max, request.include_undated);
    let by_culture = filter_by_category(
        &by_date,
        Category::Culture,
        request
            .category_filter(Category::Culture)
            .map(|f| f.selected.as_slice()),
        request.include_no_culture,
    );

    let by_y = if request.uses_haplotree() {
        filter_by_haplotree(&by_culture, &request.y_haplotree_terms)
    } else {
        filter_by_category(
            &by_culture,
            Category::YHaplogroup,
            request
                .category_filter(Category::YHaplogroup)
                .map(|f| f.selected.as_slice()),
            request.include_no_y_haplogroup,
        )
    };

    let by_mt_dna = filter_by_category(
        &by_y,
        Category::MtDna,
        request
            .category_filter(Category::MtDna)
            .map(|f| f.selected.as_slice()),
        request.include_no_mt_dna,
    );

    debug!(
        "apply_filters: {} -> date {} -> culture {} -> y {} -> mtDNA {}",
        records.len(),
        by_date.len(),
        by_culture.len(),
        by_y.len(),
        by_mt_dna.len()
    );

    by_mt_dna
}
