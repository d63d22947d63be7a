//! Data models for the storefront
//!
//! Records are persisted as JSON in camelCase, the format the storefront
//! has always written. Stored data carries no schema, so every record is
//! first read into a `Raw*` shape with all fields optional and then
//! coerced into its typed form; records that cannot be repaired are
//! rejected instead of flowing into rendering.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Platform category, extensible with free-form values
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum PlatformType {
    #[default]
    Social,
    Video,
    Messaging,
    Other(String),
}

impl From<String> for PlatformType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "social" => PlatformType::Social,
            "video" => PlatformType::Video,
            "messaging" => PlatformType::Messaging,
            _ => PlatformType::Other(value),
        }
    }
}

impl From<PlatformType> for String {
    fn from(value: PlatformType) -> Self {
        match value {
            PlatformType::Social => "social".to_string(),
            PlatformType::Video => "video".to_string(),
            PlatformType::Messaging => "messaging".to_string(),
            PlatformType::Other(other) => other,
        }
    }
}

/// A social platform services can be bought for
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: String,

    /// Natural unique key, lowercase single token (e.g. "instagram")
    pub slug: String,

    pub name: String,
    pub description: String,
    pub website: String,
    pub color: String,
    pub icon: String,

    #[serde(rename = "type")]
    pub kind: PlatformType,

    /// Inactive platforms stay in storage but are hidden from the storefront
    pub active: bool,

    /// Set at creation, never mutated
    pub created_at: DateTime<Utc>,
}

/// Platform exactly as it may appear in storage
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPlatform {
    pub id: Option<String>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Lowercases and trims a slug; `None` if nothing usable remains
pub fn normalize_slug(slug: &str) -> Option<String> {
    let slug = slug.trim().to_lowercase();
    if slug.is_empty() || slug.chars().any(char::is_whitespace) {
        None
    } else {
        Some(slug)
    }
}

impl RawPlatform {
    /// Coerces into a [`Platform`]; fails only when no usable slug exists
    ///
    /// Legacy records without an id get the slug as id.
    pub fn into_platform(self) -> Option<Platform> {
        let slug = self.slug.as_deref().and_then(normalize_slug)?;
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| slug.clone());

        Some(Platform {
            id,
            name: self.name.unwrap_or_else(|| slug.clone()),
            slug,
            description: self.description.unwrap_or_default(),
            website: self.website.unwrap_or_default(),
            color: self.color.unwrap_or_default(),
            icon: self.icon.unwrap_or_default(),
            kind: self.kind.map(PlatformType::from).unwrap_or_default(),
            active: self.active.unwrap_or(true),
            created_at: self.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        })
    }
}

/// Service identifier; older records used integers, newer ones strings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ServiceId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceId::Int(id) => write!(f, "{}", id),
            ServiceId::Text(id) => f.write_str(id),
        }
    }
}

impl ServiceId {
    /// Parses a path segment, preferring the integer form
    pub fn parse(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(id) => ServiceId::Int(id),
            Err(_) => ServiceId::Text(value.to_string()),
        }
    }

    /// Identity across both encodings: `7` and `"7"` name the same service
    pub fn matches(&self, other: &ServiceId) -> bool {
        match (self, other) {
            (ServiceId::Int(a), ServiceId::Int(b)) => a == b,
            (ServiceId::Text(a), ServiceId::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

/// Kind of engagement a service sells, extensible with free-form values
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Followers,
    Likes,
    Views,
    Comments,
    Other(String),
}

impl From<String> for ServiceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "followers" => ServiceType::Followers,
            "likes" => ServiceType::Likes,
            "views" => ServiceType::Views,
            "comments" => ServiceType::Comments,
            _ => ServiceType::Other(value),
        }
    }
}

impl From<ServiceType> for String {
    fn from(value: ServiceType) -> Self {
        match value {
            ServiceType::Followers => "followers".to_string(),
            ServiceType::Likes => "likes".to_string(),
            ServiceType::Views => "views".to_string(),
            ServiceType::Comments => "comments".to_string(),
            ServiceType::Other(other) => other,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub description: String,

    #[serde(rename = "type")]
    pub kind: ServiceType,

    /// References [`Platform::id`]; services without a live platform are hidden
    pub platform_id: String,

    /// Unit price in USD-equivalent base currency
    pub price: f64,

    pub min_quantity: u32,
    pub max_quantity: u32,
    pub active: bool,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawService {
    pub id: Option<ServiceId>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub platform_id: Option<String>,
    pub price: Option<f64>,
    pub min_quantity: Option<u32>,
    pub max_quantity: Option<u32>,
    pub active: Option<bool>,
}

impl RawService {
    /// Coerces into a [`Service`]
    ///
    /// Rejects records without id or platform, or with a negative price.
    /// Inverted quantity bounds are swapped.
    pub fn into_service(self) -> Option<Service> {
        let id = match self.id? {
            ServiceId::Text(text) if text.trim().is_empty() => return None,
            id => id,
        };
        let platform_id = self.platform_id.filter(|p| !p.trim().is_empty())?;
        let price = self.price.unwrap_or(0.0);
        if !price.is_finite() || price < 0.0 {
            return None;
        }

        let mut min_quantity = self.min_quantity.unwrap_or(100);
        let mut max_quantity = self.max_quantity.unwrap_or(u32::MAX);
        if min_quantity > max_quantity {
            std::mem::swap(&mut min_quantity, &mut max_quantity);
        }

        Some(Service {
            name: self.name.unwrap_or_else(|| id.to_string()),
            id,
            description: self.description.unwrap_or_default(),
            kind: ServiceType::from(self.kind.unwrap_or_else(|| "followers".to_string())),
            platform_id,
            price,
            min_quantity,
            max_quantity,
            active: self.active.unwrap_or(true),
        })
    }
}

/// Order status; the only valid transition is `Processing -> Completed`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Completed,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!((self, next), (OrderStatus::Processing, OrderStatus::Completed))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Processing => f.write_str("processing"),
            OrderStatus::Completed => f.write_str("completed"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `TX` followed by 9 digits, immutable
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub service: String,
    pub platform: String,
    pub account_url: String,
    pub payment_method: String,
    #[serde(default)]
    pub notes: String,
    pub amount: f64,
    pub currency: String,
    pub quantity: u32,
    pub status: OrderStatus,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Fields supplied by the checkout flow when creating an order
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub service: String,
    pub platform: String,
    pub account_url: String,
    pub payment_method: String,
    #[serde(default)]
    pub notes: String,
    pub amount: f64,
    pub currency: String,
    pub quantity: u32,
}

/// Request payload for a status change
///
/// # Example
/// ```json
/// { "status": "completed", "transactionId": "TXN1" }
/// ```
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub transaction_id: Option<String>,
}

/// Request payload for adding a platform from the dashboard
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlatform {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Query parameters for listing services or platforms
#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    /// Restrict to active records (default: false)
    #[serde(default)]
    pub active_only: bool,
}

/// Request payload for a price quote
///
/// # Example
/// ```json
/// { "source": "catalog", "serviceId": 7, "quantity": 250, "currency": "EUR" }
/// { "source": "demo", "serviceType": "likes", "platform": "tiktok", "quantity": 500 }
/// ```
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub source: crate::pricing::PricingSource,
    /// Stored service to price (catalog source)
    pub service_id: Option<ServiceId>,
    /// Demo service type (demo source)
    pub service_type: Option<String>,
    /// Platform slug (demo source)
    pub platform: Option<String>,
    pub quantity: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}
