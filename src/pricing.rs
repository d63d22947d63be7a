//! Price calculation
//!
//! Two catalogs feed the calculator and each has its own formula:
//!
//! - the stored catalog: `price * quantity * rate`
//! - the static demo catalog: `price * platform factor * quantity * rate`
//!
//! The formula is chosen by [`PricingSource`]; the two are never mixed.
//! Arithmetic stays unrounded until [`format_amount`].

use serde::{Deserialize, Serialize};

use crate::model::ServiceType;

/// Smallest quantity that can be ordered
pub const MIN_QUANTITY: u32 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PricingSource {
    /// Services stored in the catalog
    #[default]
    Catalog,
    /// Built-in demo price list with per-platform factors
    Demo,
}

/// Result of a price calculation
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Quote {
    /// Quantity actually priced, after clamping
    pub quantity: u32,
    /// True when the requested quantity was raised to [`MIN_QUANTITY`]
    pub clamped: bool,
    pub currency: String,
    /// Unrounded total
    pub total: f64,
    /// Total rendered with two decimals
    pub display: String,
}

/// Raises `quantity` to [`MIN_QUANTITY`] when below it
pub fn clamp_quantity(quantity: u32) -> u32 {
    quantity.max(MIN_QUANTITY)
}

/// Stored-catalog formula: `price * max(quantity, 100) * rate`
///
/// # Arguments
///
/// * `service_price` - unit price of the stored service, USD
/// * `quantity` - requested quantity, clamped before pricing
/// * `currency_rate` - multiplier from [`currency_rate`]
///
/// # Returns
///
/// The unrounded total; use [`format_amount`] for display.
pub fn quote(service_price: f64, quantity: u32, currency_rate: f64) -> f64 {
    service_price * f64::from(clamp_quantity(quantity)) * currency_rate
}

/// Demo-catalog formula: `price * factor * max(quantity, 100) * rate`
///
/// Same as [`quote`] with the platform factor from
/// [`demo_platform_factor`] applied on top.
pub fn quote_with_factor(service_price: f64, platform_factor: f64, quantity: u32, currency_rate: f64) -> f64 {
    service_price * platform_factor * f64::from(clamp_quantity(quantity)) * currency_rate
}

/// Two decimals, no currency symbol
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

impl Quote {
    pub fn new(requested: u32, currency: &str, total: f64) -> Self {
        let quantity = clamp_quantity(requested);
        Self {
            quantity,
            clamped: quantity != requested,
            currency: currency.to_uppercase(),
            total,
            display: format_amount(total),
        }
    }
}

/// Conversion rates from the USD base unit
pub const CURRENCY_RATES: [(&str, f64); 5] = [
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("RUB", 92.5),
    ("INR", 83.2),
];

/// Rate for `code`, case-insensitive; `None` for currencies not in [`CURRENCY_RATES`]
pub fn currency_rate(code: &str) -> Option<f64> {
    CURRENCY_RATES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, rate)| *rate)
}

/// Demo unit prices per service type, USD
const DEMO_PRICES: [(&str, f64); 4] = [
    ("followers", 0.05),
    ("likes", 0.03),
    ("views", 0.01),
    ("comments", 0.10),
];

/// Demo multipliers per platform slug
const DEMO_PLATFORM_FACTORS: [(&str, f64); 9] = [
    ("instagram", 1.0),
    ("facebook", 0.9),
    ("tiktok", 1.1),
    ("youtube", 1.3),
    ("twitter", 1.0),
    ("linkedin", 1.5),
    ("pinterest", 0.8),
    ("snapchat", 1.2),
    ("telegram", 0.9),
];

pub fn demo_price(kind: &ServiceType) -> Option<f64> {
    let name = String::from(kind.clone());
    DEMO_PRICES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, price)| *price)
}

pub fn demo_platform_factor(slug: &str) -> Option<f64> {
    DEMO_PLATFORM_FACTORS
        .iter()
        .find(|(known, _)| *known == slug)
        .map(|(_, factor)| *factor)
}
