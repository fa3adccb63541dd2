use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{FlyerAnalysis, SavedFlyer, StoredFlyer};

/// A flyer as returned to clients: the image inline as base64 and the
/// analysis in its nested form.
#[derive(Debug, Serialize)]
pub struct FlyerResponse {
    pub id: String,
    pub store_id: String,
    pub image_data: String,
    pub flyer_data: FlyerAnalysis,
    pub created_at: DateTime<Utc>,
}

impl FlyerResponse {
    #[must_use]
    pub fn from_saved(saved: SavedFlyer, analysis: FlyerAnalysis) -> Self {
        Self {
            image_data: encode_image(&saved.flyer.image_data),
            id: saved.flyer.id,
            store_id: saved.store_id,
            flyer_data: analysis,
            created_at: saved.flyer.created_at,
        }
    }
}

impl From<StoredFlyer> for FlyerResponse {
    fn from(stored: StoredFlyer) -> Self {
        Self {
            image_data: encode_image(&stored.flyer.image_data),
            id: stored.flyer.id,
            store_id: stored.store_id,
            flyer_data: stored.data,
            created_at: stored.flyer.created_at,
        }
    }
}

fn encode_image(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Flyer;

    #[test]
    fn test_image_is_base64() {
        let now = Utc::now();
        let saved = SavedFlyer {
            flyer: Flyer {
                id: "f1".to_string(),
                image_data: b"hello".to_vec(),
                created_at: now,
                updated_at: now,
            },
            store_id: "s1".to_string(),
        };

        let response = FlyerResponse::from_saved(saved, FlyerAnalysis::default());
        assert_eq!(response.image_data, "aGVsbG8=");
        assert_eq!(response.store_id, "s1");

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], "f1");
        assert!(value["flyer_data"]["flyer_items"].is_array());
    }
}
