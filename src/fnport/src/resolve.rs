//! Fallback-chain resolvers for per-category presentation metadata.
//!
//! Each category descriptor carries one resolver per output field. A
//! resolver is an ordered chain of lookups that short-circuits on the
//! first hit. Most categories use the default chains; outfits, pickaxes
//! and vehicles override the icon (and for vehicles, the display name)
//! with chains that recurse into referenced objects.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use crate::property::{BlueprintClass, LocalizedText, PropertyBag};
use crate::stats::StatsCache;
use crate::texture::TextureHandle;

/// Fatal per-object resolution failures. These abort the object's export;
/// they never affect other objects in the batch.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no icon resolved for asset {0}")]
    MissingIcon(String),
    #[error("stat row {0} refers to a test asset")]
    TestAsset(String),
}

const PREVIEW_IMAGES: &[&str] = &["SmallPreviewImage", "LargePreviewImage"];

/// Default icon chain: "Icon"/"LargeIcon" on each "DataList" entry, then
/// the icon properties on the object itself.
fn default_icon(asset: &PropertyBag) -> Option<TextureHandle> {
    asset
        .array_any(&["DataList"])
        .and_then(|entries| {
            entries
                .iter()
                .find_map(|entry| entry.texture_any(&["Icon", "LargeIcon"]).cloned())
        })
        .or_else(|| {
            asset
                .texture_any(&["Icon", "LargeIcon", "SmallPreviewImage", "LargePreviewImage"])
                .cloned()
        })
}

/// Default instance's "MarkerDisplay" struct for a blueprint class.
fn marker_display(class: &BlueprintClass) -> Option<Arc<PropertyBag>> {
    class
        .default_object
        .as_ref()?
        .object_any(&["MarkerDisplay"])
        .cloned()
}

/// Vehicle field lookup: the object's own fields, then the referenced
/// "VehicleActorClass" blueprint's marker display, then the same lookup on
/// the blueprint's parent class. A missing or unresolved parent yields
/// nothing rather than an error.
fn vehicle_field<T>(
    asset: &PropertyBag,
    read: impl Fn(&PropertyBag) -> Option<T>,
) -> Option<T> {
    if let Some(value) = read(asset) {
        return Some(value);
    }

    let class = asset.class_any(&["VehicleActorClass"])?;
    if let Some(value) = marker_display(class).and_then(|m| read(&m)) {
        return Some(value);
    }

    let parent = class.super_class.as_ref()?;
    marker_display(parent).and_then(|m| read(&m))
}

/// Icon resolution strategy for one category.
#[derive(Debug, Clone)]
pub enum IconResolver {
    /// The default chain.
    Default,
    /// Cosmetics whose canonical icon lives on an attached sub-definition
    /// ("HeroDefinition" for outfits, "WeaponDefinition" for pickaxes).
    Nested { reference: &'static str },
    /// Vehicles: marker-display chain over the blueprint hierarchy.
    Vehicle,
}

impl IconResolver {
    pub fn resolve(&self, asset: &PropertyBag) -> Option<TextureHandle> {
        match self {
            IconResolver::Default => default_icon(asset),
            IconResolver::Nested { reference } => asset
                .texture_any(PREVIEW_IMAGES)
                .cloned()
                .or_else(|| {
                    asset.object_any(&[*reference]).and_then(|nested| {
                        default_icon(nested)
                            .or_else(|| nested.texture_any(PREVIEW_IMAGES).cloned())
                    })
                })
                .or_else(|| default_icon(asset)),
            IconResolver::Vehicle => vehicle_field(asset, |bag| {
                bag.texture_any(&["SmallPreviewImage", "LargePreviewImage", "Icon"])
                    .cloned()
            }),
        }
    }
}

/// Display name resolution strategy.
#[derive(Debug, Clone)]
pub enum NameResolver {
    Default,
    Vehicle,
}

impl NameResolver {
    /// `None` (and empty text) falls back to the object's unique name at
    /// record construction; name absence is never fatal.
    pub fn resolve(&self, asset: &PropertyBag) -> Option<LocalizedText> {
        match self {
            NameResolver::Default => asset
                .text_any(&["DisplayName", "ItemName"])
                .cloned()
                .or_else(|| Some(LocalizedText::literal(asset.name()))),
            NameResolver::Vehicle => {
                vehicle_field(asset, |bag| bag.text_any(&["DisplayName", "ItemName"]).cloned())
            }
        }
    }
}

/// Description resolution strategy. No category overrides this.
#[derive(Debug, Clone)]
pub enum DescriptionResolver {
    Default,
}

impl DescriptionResolver {
    pub fn resolve(&self, asset: &PropertyBag) -> LocalizedText {
        match self {
            DescriptionResolver::Default => asset
                .text_any(&["Description", "ItemDescription"])
                .cloned()
                .unwrap_or_else(|| LocalizedText::literal("No description.")),
        }
    }
}

/// Output key and source row field for each exported weapon stat.
const WEAPON_STAT_FIELDS: &[(&str, &str)] = &[
    ("firingRate", "FiringRate"),
    ("burstFiringRate", "BurstFiringRate"),
    ("criticalDamageMultiplier", "DamageZone_Critical"),
    // vulnerability reads the same row field as critical
    ("vulnerabilityDamageMultiplier", "DamageZone_Critical"),
    ("diceCritChance", "DiceCritChance"),
    ("diceCritDamageMultiplier", "DiceCritDamageMultiplier"),
    ("reloadTime", "ReloadTime"),
    ("damagePerBullet", "DmgPB"),
    ("environmentDamagePerBullet", "EnvDmgPB"),
    ("clipSize", "ClipSize"),
    ("ammoCostPerFire", "AmmoCostPerFire"),
    ("bulletsPerCartridge", "BulletsPerCartridge"),
];

/// Derived stats resolution strategy.
#[derive(Debug, Clone)]
pub enum StatsResolver {
    /// Empty map.
    None,
    /// Weapon stat row lookup through the shared cache.
    Weapon,
}

impl StatsResolver {
    pub fn resolve(
        &self,
        asset: &PropertyBag,
        cache: &StatsCache,
    ) -> Result<BTreeMap<String, f64>, ResolveError> {
        let mut stats = BTreeMap::new();
        let StatsResolver::Weapon = self else {
            return Ok(stats);
        };
        let Some(handle) = asset.row_handle_any(&["WeaponStatHandle"]) else {
            return Ok(stats);
        };

        // QA guard: rows named Test* mark invalid assets and abort export.
        if handle.row_name.starts_with("Test") {
            return Err(ResolveError::TestAsset(handle.row_name.clone()));
        }

        let row = cache.resolve_row(&handle.row_name, &handle.table);
        for (key, field) in WEAPON_STAT_FIELDS {
            let value = row
                .as_ref()
                .and_then(|r| r.number_any(&[*field]))
                .unwrap_or(0.0);
            stats.insert((*key).to_string(), value);
        }
        Ok(stats)
    }
}

/// Activity predicate for one category.
#[derive(Debug, Clone)]
pub enum ActiveResolver {
    Always,
    /// Active iff the trimmed display name is in the configured set of
    /// currently active item names.
    AllowList(Arc<HashSet<String>>),
}

impl ActiveResolver {
    pub fn resolve(&self, display_name: &str) -> bool {
        match self {
            ActiveResolver::Always => true,
            ActiveResolver::AllowList(names) => names.contains(display_name.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{PropertyValue, StatRowHandle, StatTable};
    use crate::texture::PixelFormat;

    fn texture(name: &str) -> TextureHandle {
        TextureHandle::new(name, 1, 1, PixelFormat::Rgba8, vec![0u8; 4])
    }

    #[test]
    fn default_icon_prefers_data_list_entries() {
        let entry = PropertyBag::new("entry")
            .with("LargeIcon", PropertyValue::Texture(texture("T_FromList")));
        let asset = PropertyBag::new("EID_Dance")
            .with("DataList", PropertyValue::Array(vec![entry]))
            .with("SmallPreviewImage", PropertyValue::Texture(texture("T_Direct")));

        let icon = IconResolver::Default.resolve(&asset).unwrap();
        assert_eq!(icon.name(), "T_FromList");
    }

    #[test]
    fn nested_icon_prefers_direct_preview_over_hero_definition() {
        let hero = PropertyBag::new("HID_001")
            .with("SmallPreviewImage", PropertyValue::Texture(texture("T_Hero")));
        let asset = PropertyBag::new("CID_001")
            .with("SmallPreviewImage", PropertyValue::Texture(texture("T_Direct")))
            .with("HeroDefinition", PropertyValue::Object(Arc::new(hero)));

        let resolver = IconResolver::Nested {
            reference: "HeroDefinition",
        };
        assert_eq!(resolver.resolve(&asset).unwrap().name(), "T_Direct");
    }

    #[test]
    fn nested_icon_recurses_when_preview_absent() {
        let hero = PropertyBag::new("HID_002")
            .with("LargePreviewImage", PropertyValue::Texture(texture("T_Hero")));
        let asset = PropertyBag::new("CID_002")
            .with("HeroDefinition", PropertyValue::Object(Arc::new(hero)));

        let resolver = IconResolver::Nested {
            reference: "HeroDefinition",
        };
        assert_eq!(resolver.resolve(&asset).unwrap().name(), "T_Hero");
    }

    #[test]
    fn vehicle_chain_walks_to_super_class() {
        let parent_marker = PropertyBag::new("marker_super")
            .with("DisplayName", PropertyValue::Text(LocalizedText::literal("Whiplash")));
        let parent_cdo =
            PropertyBag::new("Default__Vehicle_Base").with(
                "MarkerDisplay",
                PropertyValue::Object(Arc::new(parent_marker)),
            );
        let parent = Arc::new(BlueprintClass {
            name: "Vehicle_Base_C".into(),
            default_object: Some(Arc::new(parent_cdo)),
            super_class: None,
        });
        // The direct class has a default object but no MarkerDisplay.
        let class = Arc::new(BlueprintClass {
            name: "Vehicle_Sport_C".into(),
            default_object: Some(Arc::new(PropertyBag::new("Default__Vehicle_Sport"))),
            super_class: Some(parent),
        });
        let asset = PropertyBag::new("VID_Sport")
            .with("VehicleActorClass", PropertyValue::Class(class));

        let name = NameResolver::Vehicle.resolve(&asset).unwrap();
        assert_eq!(name.text(), "Whiplash");
    }

    #[test]
    fn vehicle_chain_tolerates_missing_super() {
        let class = Arc::new(BlueprintClass {
            name: "Vehicle_Orphan_C".into(),
            default_object: None,
            super_class: None,
        });
        let asset = PropertyBag::new("VID_Orphan")
            .with("VehicleActorClass", PropertyValue::Class(class));

        assert!(NameResolver::Vehicle.resolve(&asset).is_none());
        assert!(IconResolver::Vehicle.resolve(&asset).is_none());
    }

    #[test]
    fn weapon_stats_read_row_fields_and_zero_fill() {
        let row = PropertyBag::new("Rifle_01")
            .with("FiringRate", PropertyValue::Number(2.0))
            .with("ClipSize", PropertyValue::Int(30));
        let table = Arc::new(StatTable::new("T", vec![("Rifle_01".into(), row)]));
        let asset = PropertyBag::new("WID_Rifle").with(
            "WeaponStatHandle",
            PropertyValue::RowHandle(StatRowHandle {
                table,
                row_name: "Rifle_01".into(),
            }),
        );

        let cache = StatsCache::new();
        let stats = StatsResolver::Weapon.resolve(&asset, &cache).unwrap();
        assert_eq!(stats["firingRate"], 2.0);
        assert_eq!(stats["clipSize"], 30.0);
        assert_eq!(stats["burstFiringRate"], 0.0);
        assert_eq!(stats["vulnerabilityDamageMultiplier"], 0.0);
        assert_eq!(stats.len(), WEAPON_STAT_FIELDS.len());
    }

    #[test]
    fn test_row_name_is_fatal() {
        let table = Arc::new(StatTable::new("T", Vec::new()));
        let asset = PropertyBag::new("WID_Test").with(
            "WeaponStatHandle",
            PropertyValue::RowHandle(StatRowHandle {
                table,
                row_name: "Test_Rifle".into(),
            }),
        );

        let cache = StatsCache::new();
        match StatsResolver::Weapon.resolve(&asset, &cache) {
            Err(ResolveError::TestAsset(name)) => assert_eq!(name, "Test_Rifle"),
            other => panic!("expected TestAsset error, got {other:?}"),
        }
    }

    #[test]
    fn missing_stat_handle_yields_empty_map() {
        let asset = PropertyBag::new("GID_Gadget");
        let cache = StatsCache::new();
        let stats = StatsResolver::Weapon.resolve(&asset, &cache).unwrap();
        assert!(stats.is_empty());
    }

    #[test]
    fn allow_list_matches_trimmed_name() {
        let names: HashSet<String> = ["Pump Shotgun".to_string()].into_iter().collect();
        let resolver = ActiveResolver::AllowList(Arc::new(names));
        assert!(resolver.resolve("  Pump Shotgun "));
        assert!(!resolver.resolve("Tactical Shotgun"));
        assert!(ActiveResolver::Always.resolve("anything"));
    }
}
