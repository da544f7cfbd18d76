//! The itinerary document: trip metadata plus an ordered list of days.
//!
//! The whole [`Itinerary`] is the unit of persistence. Field names match the
//! persisted JSON exactly, including the camel-cased `dayNumber`.
//!
//! A few fields are deliberately free-form and never cross-checked:
//! `days_count` is not compared with `days.len()`, `dayNumber` values need not
//! be unique or ascending, and currency codes are not checked against any list.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ItineraryError, Result};

pub const DEFAULT_LOCATION: &str = "日本東北";
pub const DEFAULT_START_DATE: &str = "2026-04-15";
pub const DEFAULT_HOME_CURRENCY: &str = "TWD";
pub const DEFAULT_DESTINATION_CURRENCY: &str = "JPY";
pub const DEFAULT_EXCHANGE_RATE: f64 = 0.215;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripMeta {
    pub title: String,
    pub days_count: u32,
    pub travelers: u32,
    /// Total budget in the home currency.
    pub budget: f64,
    #[serde(default = "default_location", deserialize_with = "location_or_default")]
    pub location: String,
    #[serde(default = "default_start_date", deserialize_with = "start_date_or_default")]
    pub start_date: String,
    #[serde(
        default = "default_home_currency",
        deserialize_with = "home_currency_or_default"
    )]
    pub home_currency: String,
    #[serde(
        default = "default_destination_currency",
        deserialize_with = "destination_currency_or_default"
    )]
    pub destination_currency: String,
    /// Home-currency units per destination-currency unit.
    #[serde(
        default = "default_exchange_rate",
        deserialize_with = "exchange_rate_or_default"
    )]
    pub exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub icon: String,
    pub temp: String,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub time: String,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub transport: String,
    /// Amount in `currency`.
    pub cost: i64,
    /// Parsed documents that omit it get the trip's destination currency.
    #[serde(default, deserialize_with = "nullable")]
    pub currency: String,
    #[serde(default, deserialize_with = "nullable")]
    pub lat: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    #[serde(rename = "dayNumber")]
    pub day_number: u32,
    /// Human-readable label, not parsed.
    pub date: String,
    pub theme: String,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default, deserialize_with = "nullable")]
    pub alternatives: String,
    #[serde(default, deserialize_with = "nullable")]
    pub checklist: Vec<String>,
    pub stops: Vec<Stop>,
    #[serde(default, deserialize_with = "nullable")]
    pub accommodation: String,
    #[serde(default, deserialize_with = "nullable")]
    pub accommodation_cost: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub accommodation_currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub trip_meta: TripMeta,
    pub days: Vec<Day>,
}

static DEFAULT_ITINERARY: LazyLock<Itinerary> = LazyLock::new(|| Itinerary {
    trip_meta: TripMeta {
        title: "2026 東北櫻花夢幻之旅".to_string(),
        days_count: 7,
        travelers: 2,
        budget: 150_000.0,
        location: DEFAULT_LOCATION.to_string(),
        start_date: DEFAULT_START_DATE.to_string(),
        home_currency: DEFAULT_HOME_CURRENCY.to_string(),
        destination_currency: DEFAULT_DESTINATION_CURRENCY.to_string(),
        exchange_rate: DEFAULT_EXCHANGE_RATE,
    },
    days: vec![Day {
        day_number: 1,
        date: "2026-04-15 (週三)".to_string(),
        theme: "抵達仙台".to_string(),
        weather: None,
        alternatives: String::new(),
        checklist: Vec::new(),
        stops: vec![
            Stop::new("14:35", "仙台機場 (SDJ)", 0, DEFAULT_DESTINATION_CURRENCY)
                .with_description("抵達與入境"),
            Stop::new("16:30", "仙台大都會飯店", 660, DEFAULT_DESTINATION_CURRENCY)
                .with_description("Check-in")
                .with_transport("仙台空港Access線"),
        ],
        accommodation: "仙台大都會飯店".to_string(),
        accommodation_cost: 15_000,
        accommodation_currency: DEFAULT_DESTINATION_CURRENCY.to_string(),
    }],
});

impl Itinerary {
    /// A fresh copy of the built-in one-day sample trip.
    pub fn builtin_default() -> Self {
        DEFAULT_ITINERARY.clone()
    }

    /// Parse and structurally validate a raw JSON document.
    ///
    /// Syntax errors come back as [`ItineraryError::Parse`]; well-formed JSON
    /// with missing fields or wrong types comes back as
    /// [`ItineraryError::Validation`] carrying the offending path.
    ///
    /// Stop and accommodation currencies that are absent or `null` take the
    /// trip's destination currency. An explicit value, even `""`, is kept.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(raw).map_err(ItineraryError::Parse)?;
        fill_currency_defaults(&mut value);

        let doc: Itinerary = serde_path_to_error::deserialize(value).map_err(|err| {
            ItineraryError::invalid(err.path().to_string(), err.inner().to_string())
        })?;

        doc.validate()?;
        Ok(doc)
    }

    /// Indented JSON with non-ASCII text written verbatim.
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ItineraryError::Serialize)
    }

    /// Field-range checks. Structure is already guaranteed by the types.
    pub fn validate(&self) -> Result<()> {
        let meta = &self.trip_meta;

        if meta.days_count == 0 {
            return Err(ItineraryError::invalid(
                "trip_meta.days_count",
                "must be at least 1",
            ));
        }
        if meta.travelers == 0 {
            return Err(ItineraryError::invalid(
                "trip_meta.travelers",
                "must be at least 1",
            ));
        }
        if !meta.budget.is_finite() || meta.budget < 0.0 {
            return Err(ItineraryError::invalid(
                "trip_meta.budget",
                format!("must be a non-negative number, got {}", meta.budget),
            ));
        }
        if !meta.exchange_rate.is_finite() || meta.exchange_rate <= 0.0 {
            return Err(ItineraryError::invalid(
                "trip_meta.exchange_rate",
                format!("must be a positive number, got {}", meta.exchange_rate),
            ));
        }

        Ok(())
    }
}

impl TripMeta {
    /// `start_date` as a calendar date, when it is in `YYYY-MM-DD` form.
    pub fn parsed_start_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d").ok()
    }

    /// Last day of the trip, derived from the start date and `days_count`.
    pub fn end_date(&self) -> Option<NaiveDate> {
        let start = self.parsed_start_date()?;
        let extra = u64::from(self.days_count.saturating_sub(1));
        start.checked_add_days(Days::new(extra))
    }
}

impl Stop {
    pub fn new(
        time: impl Into<String>,
        name: impl Into<String>,
        cost: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            name: name.into(),
            description: String::new(),
            transport: String::new(),
            cost,
            currency: currency.into(),
            lat: 0.0,
            lng: 0.0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = transport.into();
        self
    }
}

impl Day {
    /// An empty day whose accommodation is priced in `currency`.
    pub fn new(
        day_number: u32,
        date: impl Into<String>,
        theme: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            day_number,
            date: date.into(),
            theme: theme.into(),
            weather: None,
            alternatives: String::new(),
            checklist: Vec::new(),
            stops: Vec::new(),
            accommodation: String::new(),
            accommodation_cost: 0,
            accommodation_currency: currency.into(),
        }
    }

    /// Insert a stop, keeping the list ordered by time of day.
    ///
    /// Stops sharing a time keep their insertion order.
    pub fn add_stop(&mut self, stop: Stop) {
        let at = self.stops.partition_point(|s| s.time <= stop.time);
        self.stops.insert(at, stop);
    }
}

// Runs on the untyped document so that "absent" and "explicitly empty" stay
// distinguishable; the typed structs only ever see concrete strings.
fn fill_currency_defaults(doc: &mut Value) {
    let destination = doc
        .pointer("/trip_meta/destination_currency")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_DESTINATION_CURRENCY)
        .to_string();

    let Some(days) = doc.get_mut("days").and_then(Value::as_array_mut) else {
        return;
    };
    for day in days.iter_mut().filter_map(Value::as_object_mut) {
        fill_missing(day, "accommodation_currency", &destination);
        if let Some(stops) = day.get_mut("stops").and_then(Value::as_array_mut) {
            for stop in stops.iter_mut().filter_map(Value::as_object_mut) {
                fill_missing(stop, "currency", &destination);
            }
        }
    }
}

fn fill_missing(object: &mut Map<String, Value>, key: &str, value: &str) {
    let slot = object.entry(key).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::String(value.to_string());
    }
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_start_date() -> String {
    DEFAULT_START_DATE.to_string()
}

fn default_home_currency() -> String {
    DEFAULT_HOME_CURRENCY.to_string()
}

fn default_destination_currency() -> String {
    DEFAULT_DESTINATION_CURRENCY.to_string()
}

fn default_exchange_rate() -> f64 {
    DEFAULT_EXCHANGE_RATE
}

// Optional fields accept an explicit `null` and fall back to their default.

fn nullable<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

fn location_or_default<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<String, D::Error> {
    Ok(Option::deserialize(de)?.unwrap_or_else(default_location))
}

fn start_date_or_default<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<String, D::Error> {
    Ok(Option::deserialize(de)?.unwrap_or_else(default_start_date))
}

fn home_currency_or_default<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<String, D::Error> {
    Ok(Option::deserialize(de)?.unwrap_or_else(default_home_currency))
}

fn destination_currency_or_default<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<String, D::Error> {
    Ok(Option::deserialize(de)?.unwrap_or_else(default_destination_currency))
}

fn exchange_rate_or_default<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::deserialize(de)?.unwrap_or_else(default_exchange_rate))
}
