//! Garment catalog boundary
//!
//! Catalog payloads have come in several shapes over time (bare array or
//! `{items, updatedAt}`, `asset` or `assetUrl`, missing anchors). Everything
//! is normalized here into one canonical `GarmentItem`; the fit controller
//! only ever sees resolved, canonical items.

use crate::error::CatalogError;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GarmentCategory {
    Top,
    Bottom,
    Full,
}

impl GarmentCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "top" => Some(GarmentCategory::Top),
            "bottom" => Some(GarmentCategory::Bottom),
            "full" => Some(GarmentCategory::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GarmentLicense {
    #[serde(rename = "type")]
    pub kind: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Canonical garment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GarmentItem {
    pub id: String,
    pub label: String,
    pub category: GarmentCategory,
    /// Asset reference (path or URL), resolved by the renderer
    pub asset: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Attachment points, in alignment order
    #[serde(default)]
    pub anchors: Vec<String>,
    #[serde(default)]
    pub license: Option<GarmentLicense>,
}

impl GarmentItem {
    pub fn new(id: impl Into<String>, category: GarmentCategory, anchors: &[&str]) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            asset: format!("/garments/{}.glb", id),
            id,
            category,
            thumbnail: None,
            anchors: anchors.iter().map(|a| a.to_string()).collect(),
            license: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GarmentCatalog {
    pub items: Vec<GarmentItem>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Any garment shape seen on the wire
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGarment {
    #[serde(default)]
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default, alias = "assetUrl")]
    asset: Option<String>,
    #[serde(default, alias = "thumbnailUrl")]
    thumbnail: Option<String>,
    #[serde(default)]
    anchors: Option<Vec<String>>,
    #[serde(default)]
    license: Option<GarmentLicense>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCatalog {
    Bare(Vec<RawGarment>),
    Wrapped {
        items: Vec<RawGarment>,
        #[serde(default, rename = "updatedAt", alias = "updated_at")]
        updated_at: Option<DateTime<Utc>>,
    },
}

impl RawGarment {
    fn normalize(self) -> Option<GarmentItem> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            log::warn!("[catalog] dropping garment without id");
            return None;
        }

        let Some(category) = GarmentCategory::parse(&self.category) else {
            log::warn!(
                "[catalog] dropping garment '{}' with unknown category '{}'",
                id,
                self.category
            );
            return None;
        };

        let Some(asset) = self.asset.filter(|a| !a.trim().is_empty()) else {
            log::warn!("[catalog] dropping garment '{}' without asset reference", id);
            return None;
        };

        Some(GarmentItem {
            label: self.label.filter(|l| !l.is_empty()).unwrap_or_else(|| id.clone()),
            id,
            category,
            asset,
            thumbnail: self.thumbnail.filter(|t| !t.is_empty()),
            anchors: self.anchors.unwrap_or_default(),
            license: self.license,
        })
    }
}

impl GarmentCatalog {
    pub fn new(items: Vec<GarmentItem>) -> Self {
        Self { items, updated_at: Some(Utc::now()) }
    }

    /// Parse and normalize any supported catalog shape
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let (raw_items, updated_at) = match raw {
            RawCatalog::Bare(items) => (items, None),
            RawCatalog::Wrapped { items, updated_at } => (items, updated_at),
        };

        let total = raw_items.len();
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(total);
        for item in raw_items.into_iter().filter_map(RawGarment::normalize) {
            if !seen.insert(item.id.clone()) {
                log::warn!("[catalog] duplicate garment id '{}', keeping first", item.id);
                continue;
            }
            items.push(item);
        }

        if items.is_empty() && total > 0 {
            return Err(CatalogError::Empty);
        }
        if items.len() != total {
            log::info!("[catalog] normalized {} of {} garments", items.len(), total);
        }

        Ok(Self { items, updated_at })
    }

    pub fn find(&self, id: &str) -> Option<&GarmentItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Resolve a selection in order; unknown ids are dropped
    pub fn resolve(&self, ids: &[String]) -> Vec<GarmentItem> {
        ids.iter()
            .filter_map(|id| {
                let found = self.find(id);
                if found.is_none() {
                    log::debug!("[catalog] selection '{}' not in catalog, skipping", id);
                }
                found.cloned()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// JSON Schema of the canonical catalog shape
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(GarmentCatalog)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_catalog() {
        let json = r#"{
            "items": [
                {"id": "tee_basic", "label": "Basic Tee", "category": "top",
                 "asset": "/garments/tee.glb", "thumbnail": null,
                 "anchors": ["neck", "shoulder_l", "shoulder_r"],
                 "license": {"type": "CC-BY", "author": "studio"}}
            ],
            "updatedAt": "2025-09-20T00:00:00Z"
        }"#;

        let catalog = GarmentCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.updated_at.is_some());
        let tee = catalog.find("tee_basic").unwrap();
        assert_eq!(tee.anchors.len(), 3);
        assert_eq!(tee.license.as_ref().unwrap().kind, "CC-BY");
    }

    #[test]
    fn test_bare_api_shape() {
        let json = r#"[
            {"id": "jeans", "label": "Jeans", "category": "bottom",
             "assetUrl": "https://cdn/jeans.glb", "anchors": null, "thumbnailUrl": "https://cdn/j.png"}
        ]"#;

        let catalog = GarmentCatalog::from_json(json).unwrap();
        let jeans = catalog.find("jeans").unwrap();
        assert_eq!(jeans.asset, "https://cdn/jeans.glb");
        assert!(jeans.anchors.is_empty());
        assert_eq!(jeans.thumbnail.as_deref(), Some("https://cdn/j.png"));
        assert!(catalog.updated_at.is_none());
    }

    #[test]
    fn test_invalid_items_dropped() {
        let json = r#"[
            {"id": "", "category": "top", "asset": "a.glb"},
            {"id": "hat", "category": "headwear", "asset": "hat.glb"},
            {"id": "coat", "category": "Full", "asset": "coat.glb"},
            {"id": "coat", "category": "top", "asset": "coat2.glb"}
        ]"#;

        let catalog = GarmentCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        let coat = catalog.find("coat").unwrap();
        assert_eq!(coat.category, GarmentCategory::Full);
        assert_eq!(coat.asset, "coat.glb");
        assert_eq!(coat.label, "coat");
    }

    #[test]
    fn test_all_invalid_is_error() {
        let json = r#"[{"id": "x", "category": "nope", "asset": "x.glb"}]"#;
        assert!(matches!(GarmentCatalog::from_json(json), Err(CatalogError::Empty)));
        assert!(matches!(GarmentCatalog::from_json("{"), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_resolve_keeps_selection_order() {
        let catalog = GarmentCatalog::new(vec![
            GarmentItem::new("a", GarmentCategory::Top, &["neck"]),
            GarmentItem::new("b", GarmentCategory::Bottom, &["waist"]),
        ]);

        let ids = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
        let resolved: Vec<_> = catalog.resolve(&ids).into_iter().map(|g| g.id).collect();
        assert_eq!(resolved, vec!["b", "a"]);
    }

    #[test]
    fn test_schema_describes_items() {
        let schema = GarmentCatalog::json_schema();
        assert!(schema["properties"]["items"].is_object());
    }
}
