pub const SCHEMA: &str = r#"
-- One row per uploaded flyer image
CREATE TABLE IF NOT EXISTS flyers (
    id TEXT PRIMARY KEY,
    image_data BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Stores are shared across uploads and keyed by exact name
CREATE TABLE IF NOT EXISTS stores (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    prefecture TEXT NOT NULL DEFAULT '',
    city TEXT NOT NULL DEFAULT '',
    street TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Campaigns are owned by the flyer that produced them
CREATE TABLE IF NOT EXISTS campaigns (
    id TEXT PRIMARY KEY,
    flyer_id TEXT NOT NULL REFERENCES flyers(id),
    name TEXT NOT NULL,
    start_date TEXT,              -- NULL = absent or unparseable
    end_date TEXT,                -- NULL = absent or unparseable
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Many-to-many relationship between campaigns and stores
CREATE TABLE IF NOT EXISTS campaign_stores (
    campaign_id TEXT NOT NULL REFERENCES campaigns(id),
    store_id TEXT NOT NULL REFERENCES stores(id),
    PRIMARY KEY (campaign_id, store_id)
);

-- Products are shared across flyers and keyed by exact name
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Line items, owned by a campaign
CREATE TABLE IF NOT EXISTS flyer_items (
    id TEXT PRIMARY KEY,
    campaign_id TEXT NOT NULL REFERENCES campaigns(id),
    product_id TEXT NOT NULL REFERENCES products(id),
    price_excluding_tax INTEGER NOT NULL,
    price_including_tax INTEGER NOT NULL,
    unit TEXT NOT NULL DEFAULT '',
    restriction_note TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_flyers_created ON flyers(created_at);
CREATE INDEX IF NOT EXISTS idx_campaigns_flyer ON campaigns(flyer_id);
CREATE INDEX IF NOT EXISTS idx_campaign_stores_store ON campaign_stores(store_id);
CREATE INDEX IF NOT EXISTS idx_flyer_items_campaign ON flyer_items(campaign_id);
CREATE INDEX IF NOT EXISTS idx_flyer_items_product ON flyer_items(product_id);
"#;
