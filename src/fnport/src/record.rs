//! Immutable export records and their JSON schema.
//!
//! [`ExportRecord::build`] snapshots every resolved field for one
//! classified object. Construction is pure except for reading (and, on
//! first table access, populating) the shared [`StatsCache`]. The record
//! serializes to the on-disk JSON schema; the icon field serializes as
//! the texture's unique name, never embedded pixels.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::property::{PropertyBag, TagContainer};
use crate::registry::{AssetCategory, CategoryDescriptor};
use crate::resolve::ResolveError;
use crate::stats::StatsCache;
use crate::texture::TextureHandle;

/// Season value when no season tag is present or parsable.
pub const SEASON_UNKNOWN: i32 = i32::MAX;

const SEASON_TAG_PREFIX: &str = "Cosmetics.Filter.Season.";

/// Item rarity ladder. Serializes as its display text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Rarity {
    Common,
    #[default]
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
    Transcendent,
}

impl Rarity {
    /// Parse from the stored enum literal, with or without the
    /// `EFortRarity::` qualifier.
    pub fn from_enum_name(name: &str) -> Option<Self> {
        let name = name.rsplit("::").next()?;
        match name {
            "Common" => Some(Rarity::Common),
            "Uncommon" => Some(Rarity::Uncommon),
            "Rare" => Some(Rarity::Rare),
            "Epic" => Some(Rarity::Epic),
            "Legendary" => Some(Rarity::Legendary),
            "Mythic" => Some(Rarity::Mythic),
            "Transcendent" => Some(Rarity::Transcendent),
            _ => None,
        }
    }
}

fn icon_name<S: Serializer>(icon: &TextureHandle, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(icon.name())
}

/// Resolved snapshot of one object, ready for serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub gameplay_tags: Option<TagContainer>,
    pub rarity: Rarity,
    pub season: i32,
    pub series: String,
    #[serde(serialize_with = "icon_name")]
    pub icon: TextureHandle,
    #[serde(rename = "type")]
    pub category: AssetCategory,
    pub stats: BTreeMap<String, f64>,
    pub is_active: bool,
}

impl ExportRecord {
    /// Resolve all fields for one classified object.
    ///
    /// A missing icon is fatal; every other absent field falls back to
    /// its documented default.
    pub fn build(
        asset: &PropertyBag,
        descriptor: &CategoryDescriptor,
        cache: &StatsCache,
    ) -> Result<Self, ResolveError> {
        let icon = descriptor
            .icon
            .resolve(asset)
            .ok_or_else(|| ResolveError::MissingIcon(asset.name().to_string()))?;

        let display_name = descriptor
            .display_name
            .resolve(asset)
            .map(|t| t.text().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| asset.name().to_string());

        let description = descriptor.description.resolve(asset).text().to_string();

        let rarity = asset
            .enum_any(&["Rarity"])
            .and_then(Rarity::from_enum_name)
            .unwrap_or_default();

        // Secondary lookup: some objects carry their tags on a DataList entry.
        let gameplay_tags = asset.tags_any(&["GameplayTags"]).cloned().or_else(|| {
            asset.array_any(&["DataList"]).and_then(|entries| {
                entries.iter().find_map(|e| e.tags_any(&["Tags"]).cloned())
            })
        });

        let season = gameplay_tags
            .as_ref()
            .and_then(|tags| tags.first_matching(SEASON_TAG_PREFIX))
            .and_then(|tag| tag.rsplit('.').next())
            .and_then(|n| n.parse::<i32>().ok())
            .unwrap_or(SEASON_UNKNOWN);

        let series = asset
            .object_any(&["Series"])
            .and_then(|series| series.text_any(&["DisplayName", "ItemName"]).cloned())
            .map(|t| t.text().to_string())
            .unwrap_or_default();

        let stats = descriptor.stats.resolve(asset, cache)?;
        let is_active = descriptor.active.resolve(&display_name);

        Ok(Self {
            id: asset.name().to_string(),
            display_name,
            description,
            gameplay_tags,
            rarity,
            season,
            series,
            icon,
            category: descriptor.category,
            stats,
            is_active,
        })
    }
}
