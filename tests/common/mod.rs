#![allow(dead_code)]

use serde_json::{Value, json};

pub const SAMPLE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nfake-flyer";

/// An analysis with two items listed out of name order.
pub fn sample_analysis(store_name: &str) -> Value {
    json!({
        "store": {
            "name": store_name,
            "prefecture": "Tokyo",
            "city": "Shibuya",
            "street": "1-2-3"
        },
        "campaign": {
            "name": "Weekend Sale",
            "start_date": "2024-05-01",
            "end_date": "2024-05-07"
        },
        "flyer_items": [
            {
                "product": {"name": "B", "category": "Snacks"},
                "price_excluding_tax": 20,
                "price_including_tax": 22,
                "unit": "pack",
                "restriction_note": ""
            },
            {
                "product": {"name": "A", "category": "Produce"},
                "price_excluding_tax": 10,
                "price_including_tax": 12,
                "unit": "each",
                "restriction_note": "2 per customer"
            }
        ]
    })
}
