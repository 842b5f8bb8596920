use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PLACEHOLDER_BRAND: &str = "未知品牌";
pub const PLACEHOLDER_NAME: &str = "未知产品";
pub const PLACEHOLDER_CATEGORY: &str = "未知类型";
const PLACEHOLDER_IMAGE_MARKER: &str = "placeholder";

/// Anything that can be compared as a catalog product: stored records as well as
/// freshly extracted entries that have not been persisted yet.
pub trait CatalogEntry {
    fn entry_id(&self) -> Option<Uuid>;
    fn brand(&self) -> &str;
    fn name(&self) -> &str;
    fn category(&self) -> &str;
    fn image_url(&self) -> &str;
}

pub trait IngredientEntry {
    fn ingredients_list(&self) -> &str;
    fn items(&self) -> &[IngredientItem];
    fn health(&self) -> Option<&HealthScore>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub brand: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientItem {
    pub name: String,
    #[serde(default)]
    pub is_harmful: bool,
    #[serde(default)]
    pub harmful_level: i32,
}

// score, level and analysis are replaced together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: f64,
    pub level: Option<String>,
    pub analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub ingredients_list: String,
    pub items: Vec<IngredientItem>,
    pub health: Option<HealthScore>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewProduct {
    pub id: Option<Uuid>,
    pub brand: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
}

impl NewProduct {
    pub fn with_placeholders(mut self) -> Self {
        if self.brand.trim().is_empty() {
            self.brand = PLACEHOLDER_BRAND.to_string();
        }
        if self.name.trim().is_empty() {
            self.name = PLACEHOLDER_NAME.to_string();
        }
        if self.category.trim().is_empty() {
            self.category = PLACEHOLDER_CATEGORY.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewIngredients {
    pub ingredients_list: String,
    pub items: Vec<IngredientItem>,
    pub health: Option<HealthScore>,
}

impl NewIngredients {
    pub fn is_blank(&self) -> bool {
        self.ingredients_list.trim().is_empty() && self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPatch {
    pub brand: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.name.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
    }

    pub fn apply(&self, record: &mut ProductRecord) {
        if let Some(brand) = &self.brand {
            record.brand = brand.clone();
        }
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(category) = &self.category {
            record.category = category.clone();
        }
        if let Some(image_url) = &self.image_url {
            record.image_url = image_url.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngredientPatch {
    pub ingredients_list: Option<String>,
    pub items: Option<Vec<IngredientItem>>,
    pub health: Option<HealthScore>,
}

impl IngredientPatch {
    pub fn is_empty(&self) -> bool {
        self.ingredients_list.is_none() && self.items.is_none() && self.health.is_none()
    }

    pub fn apply(&self, record: &mut IngredientRecord) {
        if let Some(list) = &self.ingredients_list {
            record.ingredients_list = list.clone();
        }
        if let Some(items) = &self.items {
            record.items = items.clone();
        }
        if let Some(health) = &self.health {
            record.health = Some(health.clone());
        }
    }
}

pub fn is_placeholder_brand(brand: &str) -> bool {
    let trimmed = brand.trim();
    trimmed.is_empty() || trimmed == PLACEHOLDER_BRAND
}

pub fn is_placeholder_image(url: &str) -> bool {
    let trimmed = url.trim();
    trimmed.is_empty() || trimmed.contains(PLACEHOLDER_IMAGE_MARKER)
}

impl CatalogEntry for ProductRecord {
    fn entry_id(&self) -> Option<Uuid> {
        Some(self.id)
    }

    fn brand(&self) -> &str {
        &self.brand
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn image_url(&self) -> &str {
        &self.image_url
    }
}

impl CatalogEntry for NewProduct {
    fn entry_id(&self) -> Option<Uuid> {
        self.id
    }

    fn brand(&self) -> &str {
        &self.brand
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn image_url(&self) -> &str {
        &self.image_url
    }
}

impl IngredientEntry for IngredientRecord {
    fn ingredients_list(&self) -> &str {
        &self.ingredients_list
    }

    fn items(&self) -> &[IngredientItem] {
        &self.items
    }

    fn health(&self) -> Option<&HealthScore> {
        self.health.as_ref()
    }
}

impl IngredientEntry for NewIngredients {
    fn ingredients_list(&self) -> &str {
        &self.ingredients_list
    }

    fn items(&self) -> &[IngredientItem] {
        &self.items
    }

    fn health(&self) -> Option<&HealthScore> {
        self.health.as_ref()
    }
}
