//! Expense ledger and home-currency totals.

use serde::Serialize;

use crate::model::{Itinerary, TripMeta};

/// Accommodation name that means "no stay booked".
const NO_ACCOMMODATION: &str = "無";
const UNNAMED_ACCOMMODATION: &str = "未定飯店";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Accommodation,
    Transport,
    Activity,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Accommodation => "住宿",
            Category::Transport => "交通",
            Category::Activity => "行程",
        }
    }

    pub const fn all() -> &'static [Category] {
        &[
            Category::Accommodation,
            Category::Transport,
            Category::Activity,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// One priced line: a night's stay or a stop with a cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub date: String,
    pub name: String,
    pub cost: i64,
    pub currency: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub home_currency: String,
    pub budget: f64,
    pub total_home: i64,
    pub remaining: f64,
    pub per_category: Vec<(Category, i64)>,
}

impl TripMeta {
    /// Convert an amount to the home currency, rounding to whole units.
    ///
    /// An empty `currency` means the destination currency.
    pub fn to_home(&self, amount: i64, currency: &str) -> i64 {
        if currency == self.home_currency {
            return amount;
        }
        (amount as f64 * self.exchange_rate).round() as i64
    }
}

/// Every priced item in the trip, in day order.
///
/// Each day contributes its accommodation first, then its stops that cost
/// something, in stop order.
pub fn expenses(doc: &Itinerary) -> Vec<Expense> {
    let destination = &doc.trip_meta.destination_currency;
    let or_destination = |currency: &str| {
        if currency.is_empty() {
            destination.clone()
        } else {
            currency.to_string()
        }
    };

    let mut items = Vec::new();
    for day in &doc.days {
        let booked = !day.accommodation.is_empty() && day.accommodation != NO_ACCOMMODATION;
        if booked || day.accommodation_cost > 0 {
            let name = if day.accommodation.is_empty() {
                UNNAMED_ACCOMMODATION.to_string()
            } else {
                day.accommodation.clone()
            };
            items.push(Expense {
                date: day.date.clone(),
                name,
                cost: day.accommodation_cost,
                currency: or_destination(&day.accommodation_currency),
                category: Category::Accommodation,
            });
        }

        for stop in day.stops.iter().filter(|s| s.cost > 0) {
            let category = if stop.transport.is_empty() {
                Category::Activity
            } else {
                Category::Transport
            };
            items.push(Expense {
                date: day.date.clone(),
                name: stop.name.clone(),
                cost: stop.cost,
                currency: or_destination(&stop.currency),
                category,
            });
        }
    }
    items
}

pub fn summary(doc: &Itinerary) -> BudgetSummary {
    let meta = &doc.trip_meta;
    let items = expenses(doc);

    // Sums saturate; costs are unbounded user input.
    let per_category: Vec<(Category, i64)> = Category::all()
        .iter()
        .map(|&category| {
            let sum = items
                .iter()
                .filter(|e| e.category == category)
                .map(|e| meta.to_home(e.cost, &e.currency))
                .fold(0, i64::saturating_add);
            (category, sum)
        })
        .collect();

    let total_home = per_category
        .iter()
        .map(|&(_, sum)| sum)
        .fold(0, i64::saturating_add);

    BudgetSummary {
        home_currency: meta.home_currency.clone(),
        budget: meta.budget,
        total_home,
        remaining: meta.budget - total_home as f64,
        per_category,
    }
}
