//! Sample records (map features) and their optional attributes
//!
//! Absence is normalized once, here: `None`, a missing property and an
//! empty or whitespace-only string all become `None`. Every predicate and
//! color function downstream only checks `Option::is_none`.

/// WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

/// Categorical attributes that can be filtered, listed and colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Culture,
    YHaplogroup,
    MtDna,
    YHaplotreePath,
}

/// Numeric attributes that can be extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Age,
    Longitude,
    Latitude,
}

/// An immutable sample point with optional metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    position: Position,
    /// Calibrated years BP (larger = older)
    age: Option<f64>,
    culture: Option<String>,
    y_haplogroup: Option<String>,
    mt_dna: Option<String>,
    /// `>`-delimited node labels from root to terminal node
    y_haplotree_path: Option<String>,
}

impl Record {
    pub fn new(id: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            id: id.into(),
            position: Position {
                longitude,
                latitude,
            },
            age: None,
            culture: None,
            y_haplogroup: None,
            mt_dna: None,
            y_haplotree_path: None,
        }
    }

    /// Set the age; negative or non-finite values are treated as absent
    pub fn with_age(mut self, age: Option<f64>) -> Self {
        self.age = normalize_age(age);
        self
    }

    pub fn with_culture<S: AsRef<str>>(mut self, culture: Option<S>) -> Self {
        self.culture = normalize_text(culture);
        self
    }

    pub fn with_y_haplogroup<S: AsRef<str>>(mut self, value: Option<S>) -> Self {
        self.y_haplogroup = normalize_text(value);
        self
    }

    pub fn with_mt_dna<S: AsRef<str>>(mut self, value: Option<S>) -> Self {
        self.mt_dna = normalize_text(value);
        self
    }

    pub fn with_y_haplotree_path<S: AsRef<str>>(mut self, value: Option<S>) -> Self {
        self.y_haplotree_path = normalize_text(value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn age(&self) -> Option<f64> {
        self.age
    }

    pub fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    pub fn y_haplogroup(&self) -> Option<&str> {
        self.y_haplogroup.as_deref()
    }

    pub fn mt_dna(&self) -> Option<&str> {
        self.mt_dna.as_deref()
    }

    pub fn y_haplotree_path(&self) -> Option<&str> {
        self.y_haplotree_path.as_deref()
    }

    /// Look up a categorical attribute by kind
    pub fn category(&self, category: Category) -> Option<&str> {
        match category {
            Category::Culture => self.culture(),
            Category::YHaplogroup => self.y_haplogroup(),
            Category::MtDna => self.mt_dna(),
            Category::YHaplotreePath => self.y_haplotree_path(),
        }
    }

    /// Look up a numeric attribute by kind
    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Age => self.age,
            NumericField::Longitude => Some(self.position.longitude),
            NumericField::Latitude => Some(self.position.latitude),
        }
    }

    /// Haplotree node labels, trimmed and lowercased, empty nodes dropped
    pub fn haplotree_nodes(&self) -> Vec<String> {
        self.y_haplotree_path()
            .map(split_haplotree_path)
            .unwrap_or_default()
    }
}

/// Split a `>`-delimited path into trimmed, lowercased node labels
pub fn split_haplotree_path(path: &str) -> Vec<String> {
    path.split('>')
        .map(|node| node.trim().to_lowercase())
        .filter(|node| !node.is_empty())
        .collect()
}

/// Collapse empty and whitespace-only strings to `None`
pub fn normalize_text<S: AsRef<str>>(value: Option<S>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Ages must be finite and non-negative to count as present
pub fn normalize_age(age: Option<f64>) -> Option<f64> {
    age.filter(|a| a.is_finite() && *a >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_strings_are_absent() {
        let r = Record::new("a", 0.0, 0.0)
            .with_culture(Some(""))
            .with_y_haplogroup(Some("   "))
            .with_mt_dna(None::<&str>)
            .with_y_haplotree_path(Some(""));
        assert_eq!(r.culture(), None);
        assert_eq!(r.y_haplogroup(), None);
        assert_eq!(r.mt_dna(), None);
        assert_eq!(r.y_haplotree_path(), None);
    }

    #[test]
    fn test_invalid_ages_are_absent() {
        assert_eq!(Record::new("a", 0.0, 0.0).with_age(Some(-1.0)).age(), None);
        assert_eq!(Record::new("a", 0.0, 0.0).with_age(Some(f64::NAN)).age(), None);
        assert_eq!(Record::new("a", 0.0, 0.0).with_age(Some(0.0)).age(), Some(0.0));
    }

    #[test]
    fn test_haplotree_nodes() {
        let r = Record::new("a", 0.0, 0.0).with_y_haplotree_path(Some("R-M207> M173 >M343>>M269"));
        assert_eq!(r.haplotree_nodes(), vec!["r-m207", "m173", "m343", "m269"]);
    }

    #[test]
    fn test_category_lookup() {
        let r = Record::new("a", 10.0, 50.0)
            .with_culture(Some("Yamnaya"))
            .with_mt_dna(Some("U5a"));
        assert_eq!(r.category(Category::Culture), Some("Yamnaya"));
        assert_eq!(r.category(Category::MtDna), Some("U5a"));
        assert_eq!(r.category(Category::YHaplogroup), None);
        assert_eq!(r.numeric(NumericField::Latitude), Some(50.0));
    }
}
