//! Normalized catalogs must satisfy the published JSON Schema.

use avatar_core::garments::{GarmentCatalog, GarmentCategory};
use avatar_core::CatalogError;
use jsonschema::JSONSchema;

const LEGACY_ARRAY: &str = r#"[
    { "id": "tee", "category": "TOP", "assetUrl": "/g/tee.glb", "thumbnailUrl": "/g/tee.png" },
    { "id": "tee", "category": "top", "assetUrl": "/g/tee-dup.glb" },
    { "id": "cape", "category": "accessory", "assetUrl": "/g/cape.glb" },
    { "category": "bottom", "asset": "/g/anon.glb" },
    { "id": "shorts", "category": "bottom", "asset": "/g/shorts.glb",
      "anchors": ["waist", "hip_l", "hip_r"],
      "license": { "type": "CC-BY-4.0", "author": "studio" } }
]"#;

fn compiled_schema() -> JSONSchema {
    let schema = GarmentCatalog::json_schema();
    JSONSchema::compile(&schema).expect("catalog schema compiles")
}

#[test]
fn normalized_legacy_catalog_validates() {
    let catalog = GarmentCatalog::from_json(LEGACY_ARRAY).unwrap();

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.items[0].asset, "/g/tee.glb");
    assert_eq!(catalog.items[0].category, GarmentCategory::Top);
    assert_eq!(catalog.items[1].anchors.len(), 3);
    assert!(catalog.updated_at.is_none());

    let instance = serde_json::to_value(&catalog).unwrap();
    assert!(compiled_schema().is_valid(&instance));
}

#[test]
fn schema_rejects_unknown_category() {
    let instance = serde_json::json!({
        "items": [{
            "id": "cape",
            "label": "Cape",
            "category": "accessory",
            "asset": "/g/cape.glb",
            "anchors": []
        }]
    });
    assert!(!compiled_schema().is_valid(&instance));
}

#[test]
fn schema_rejects_missing_asset() {
    let instance = serde_json::json!({
        "items": [{ "id": "tee", "label": "Tee", "category": "top", "anchors": [] }]
    });
    assert!(!compiled_schema().is_valid(&instance));
}

#[test]
fn all_invalid_items_is_an_error() {
    let json = r#"[{ "id": "", "category": "top", "asset": "x" }]"#;
    let err = GarmentCatalog::from_json(json).unwrap_err();
    assert!(matches!(err, CatalogError::Empty));
}
