use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded flyer image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flyer {
    pub id: String,
    #[serde(skip)]
    pub image_data: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A retail store, shared by every campaign that names it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub prefecture: String,
    pub city: String,
    pub street: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub flyer_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignStore {
    pub campaign_id: String,
    pub store_id: String,
}

/// A product, shared by every flyer item that names it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlyerItem {
    pub id: String,
    pub campaign_id: String,
    pub product_id: String,
    pub price_excluding_tax: i64,
    pub price_including_tax: i64,
    pub unit: String,
    pub restriction_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a committed flyer upload.
#[derive(Debug, Clone)]
pub struct SavedFlyer {
    pub flyer: Flyer,
    pub store_id: String,
}

/// A flyer read back by store, with its analysis rebuilt from the tables.
#[derive(Debug, Clone)]
pub struct StoredFlyer {
    pub flyer: Flyer,
    pub store_id: String,
    pub data: super::FlyerAnalysis,
}
