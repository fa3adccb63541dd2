use serde::{Deserialize, Serialize};

/// The parsed result of analyzing a flyer image.
///
/// Produced upstream by the image-understanding step and consumed as-is; the
/// same shape is rebuilt from the tables when a flyer is read back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyerAnalysis {
    #[serde(rename = "store")]
    pub store: StoreInfo,
    #[serde(rename = "campaign")]
    pub campaign: CampaignInfo,
    #[serde(rename = "flyer_items", default)]
    pub items: Vec<FlyerItemInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    #[serde(default)]
    pub prefecture: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub street: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInfo {
    pub name: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyerItemInfo {
    pub product: ProductInfo,
    #[serde(default)]
    pub price_excluding_tax: i64,
    #[serde(default)]
    pub price_including_tax: i64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub restriction_note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    #[serde(default)]
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_analysis() {
        let json = r#"{
            "store": {"name": "Fresh Mart", "prefecture": "Tokyo", "city": "Shibuya", "street": "1-2-3"},
            "campaign": {"name": "Tuesday Sale", "start_date": "2024-05-01", "end_date": "2024-05-07"},
            "flyer_items": [
                {
                    "product": {"name": "Eggs", "category": "Dairy"},
                    "price_excluding_tax": 198,
                    "price_including_tax": 213,
                    "unit": "pack",
                    "restriction_note": "2 per customer"
                }
            ]
        }"#;

        let analysis: FlyerAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.store.name, "Fresh Mart");
        assert_eq!(analysis.campaign.end_date, "2024-05-07");
        assert_eq!(analysis.items.len(), 1);
        assert_eq!(analysis.items[0].product.category, "Dairy");
        assert_eq!(analysis.items[0].price_including_tax, 213);
    }

    #[test]
    fn test_missing_items_defaults_to_empty() {
        let json = r#"{
            "store": {"name": "Fresh Mart"},
            "campaign": {"name": "Opening"}
        }"#;

        let analysis: FlyerAnalysis = serde_json::from_str(json).unwrap();
        assert!(analysis.items.is_empty());
        assert_eq!(analysis.store.city, "");
        assert_eq!(analysis.campaign.start_date, "");
    }

    #[test]
    fn test_serializes_items_as_flyer_items() {
        let analysis = FlyerAnalysis::default();
        let value = serde_json::to_value(&analysis).unwrap();
        assert!(value.get("flyer_items").is_some());
        assert!(value.get("items").is_none());
    }
}
