use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Deserialize a weight from a number, a numeric string or null.
///
/// Imported city rows carry population as either a float or a string, and
/// blank strings stand for "unknown".
fn deserialize_weight<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WeightValue {
        Float(f64),
        String(String),
        Null,
    }

    match WeightValue::deserialize(deserializer)? {
        WeightValue::Float(f) if f.is_nan() => Ok(None),
        WeightValue::Float(f) => Ok(Some(f)),
        WeightValue::String(s) if s.trim().is_empty() => Ok(None),
        WeightValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| if f.is_nan() { None } else { Some(f) })
            .map_err(|_| Error::custom(format!("Invalid weight string: {}", s))),
        WeightValue::Null => Ok(None),
    }
}

/// Monthly weather readings for a city on one date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperatureReading {
    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub suburb: Option<String>,

    /// Average temperature (°C)
    #[serde(default)]
    pub avg_temperature: Option<f64>,

    /// Maximum temperature (°C)
    #[serde(default)]
    pub max_temperature: Option<f64>,

    /// Minimum temperature (°C)
    #[serde(default)]
    pub min_temperature: Option<f64>,

    /// Precipitation (mm)
    #[serde(default)]
    pub precipitation: Option<f64>,
}

/// Monthly sunshine hours for a city
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SunshineReading {
    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub state: Option<String>,

    /// Sunshine hours per month, January first
    #[serde(default)]
    pub monthly_hours: Vec<Option<f64>>,
}

/// Display payload carried through the sampler untouched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CityPayload {
    Temperature(TemperatureReading),
    Sunshine(SunshineReading),
}

impl CityPayload {
    /// City name for logging/UI
    pub fn city(&self) -> &str {
        match self {
            CityPayload::Temperature(t) => &t.city,
            CityPayload::Sunshine(s) => &s.city,
        }
    }
}

/// One sampleable point.
///
/// Only `id`, `category`, `weight`, `lat` and `long` are inspected by the
/// sampling pipeline; `payload` is opaque cargo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate<P = CityPayload> {
    /// Stable identifier
    pub id: String,

    /// Fairness grouping key (country)
    pub category: String,

    /// Ranking weight (population), often unknown
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_weight")]
    pub weight: Option<f64>,

    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub long: f64,

    pub payload: P,
}

impl<P> Candidate<P> {
    /// Create a new candidate
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        weight: Option<f64>,
        lat: f64,
        long: f64,
        payload: P,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            weight: weight.filter(|w| !w.is_nan()),
            lat,
            long,
            payload,
        }
    }

    /// Weight with NaN folded into "unknown"
    pub fn effective_weight(&self) -> Option<f64> {
        self.weight.filter(|w| !w.is_nan())
    }

    /// Priority order: heavier first, unknown weight last, then id ascending.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        compare_weight_desc(self.effective_weight(), other.effective_weight())
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Descending weight order with `None` after every known weight
pub fn compare_weight_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
