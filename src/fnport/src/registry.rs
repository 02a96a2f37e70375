//! Category registry: maps catalog class names to export categories.
//!
//! Classification scans a fixed, ordered list of descriptors. An object
//! matches a descriptor when its class name is in the descriptor's class
//! set and its unique name contains none of the descriptor's filter
//! substrings. The first match wins; an unmatched object is skipped, not
//! an error.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::property::PropertyBag;
use crate::resolve::{
    ActiveResolver, DescriptionResolver, IconResolver, NameResolver, StatsResolver,
};

/// Closed set of export categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum AssetCategory {
    Outfit,
    Backpack,
    Pickaxe,
    Glider,
    Pet,
    Toy,
    Emoticon,
    Spray,
    Banner,
    LoadingScreen,
    Emote,
    Item,
    Resource,
    Trap,
    Vehicle,
}

impl AssetCategory {
    /// Textual tag used in output paths and the JSON `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetCategory::Outfit => "Outfit",
            AssetCategory::Backpack => "Backpack",
            AssetCategory::Pickaxe => "Pickaxe",
            AssetCategory::Glider => "Glider",
            AssetCategory::Pet => "Pet",
            AssetCategory::Toy => "Toy",
            AssetCategory::Emoticon => "Emoticon",
            AssetCategory::Spray => "Spray",
            AssetCategory::Banner => "Banner",
            AssetCategory::LoadingScreen => "LoadingScreen",
            AssetCategory::Emote => "Emote",
            AssetCategory::Item => "Item",
            AssetCategory::Resource => "Resource",
            AssetCategory::Trap => "Trap",
            AssetCategory::Vehicle => "Vehicle",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration bundle for one category: class match set, name filters,
/// and the five resolvers. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct CategoryDescriptor {
    pub category: AssetCategory,
    classes: &'static [&'static str],
    filters: &'static [&'static str],
    pub icon: IconResolver,
    pub display_name: NameResolver,
    pub description: DescriptionResolver,
    pub stats: StatsResolver,
    pub active: ActiveResolver,
}

impl CategoryDescriptor {
    fn new(
        category: AssetCategory,
        classes: &'static [&'static str],
        filters: &'static [&'static str],
    ) -> Self {
        Self {
            category,
            classes,
            filters,
            icon: IconResolver::Default,
            display_name: NameResolver::Default,
            description: DescriptionResolver::Default,
            stats: StatsResolver::None,
            active: ActiveResolver::Always,
        }
    }

    fn icon(mut self, icon: IconResolver) -> Self {
        self.icon = icon;
        self
    }

    fn display_name(mut self, name: NameResolver) -> Self {
        self.display_name = name;
        self
    }

    fn stats(mut self, stats: StatsResolver) -> Self {
        self.stats = stats;
        self
    }

    fn active(mut self, active: ActiveResolver) -> Self {
        self.active = active;
        self
    }

    /// Class-set membership plus case-sensitive substring filters on the
    /// object's unique name.
    fn matches(&self, asset: &PropertyBag, class_name: &str) -> bool {
        self.classes.contains(&class_name)
            && !self.filters.iter().any(|f| asset.name().contains(f))
    }
}

/// Fixed, ordered descriptor set held for the process lifetime.
pub struct CategoryRegistry {
    descriptors: Vec<CategoryDescriptor>,
}

impl CategoryRegistry {
    /// Build the registry. `active_items` is the externally configured
    /// set of currently active Item display names.
    pub fn new(active_items: HashSet<String>) -> Self {
        let active_items = Arc::new(active_items);
        let descriptors = vec![
            CategoryDescriptor::new(
                AssetCategory::Outfit,
                &["AthenaCharacterItemDefinition"],
                &["_NPC", "_TBD", "CID_VIP", "_Creative", "_SG"],
            )
            .icon(IconResolver::Nested {
                reference: "HeroDefinition",
            }),
            CategoryDescriptor::new(
                AssetCategory::Backpack,
                &["AthenaBackpackItemDefinition"],
                &["_STWHeroNoDefaultBackpack", "_TEST", "Dev_", "_NPC", "_TBD"],
            ),
            CategoryDescriptor::new(
                AssetCategory::Pickaxe,
                &["AthenaPickaxeItemDefinition"],
                &["Dev_", "TBD_"],
            )
            .icon(IconResolver::Nested {
                reference: "WeaponDefinition",
            }),
            CategoryDescriptor::new(AssetCategory::Glider, &["AthenaGliderItemDefinition"], &[]),
            CategoryDescriptor::new(AssetCategory::Pet, &["AthenaPetCarrierItemDefinition"], &[]),
            CategoryDescriptor::new(AssetCategory::Toy, &["AthenaToyItemDefinition"], &[]),
            CategoryDescriptor::new(
                AssetCategory::Emoticon,
                &["AthenaEmojiItemDefinition"],
                &["Emoji_100APlus"],
            ),
            CategoryDescriptor::new(
                AssetCategory::Spray,
                &["AthenaSprayItemDefinition"],
                &["SPID_000", "SPID_001"],
            ),
            CategoryDescriptor::new(
                AssetCategory::Banner,
                &["FortHomebaseBannerIconItemDefinition"],
                &[],
            ),
            CategoryDescriptor::new(
                AssetCategory::LoadingScreen,
                &["AthenaLoadingScreenItemDefinition"],
                &[],
            ),
            CategoryDescriptor::new(
                AssetCategory::Emote,
                &["AthenaDanceItemDefinition"],
                &["_CT", "_NPC"],
            ),
            CategoryDescriptor::new(
                AssetCategory::Item,
                &[
                    "AthenaGadgetItemDefinition",
                    "FortWeaponRangedItemDefinition",
                    "FortWeaponMeleeItemDefinition",
                    "FortCreativeWeaponMeleeItemDefinition",
                    "FortCreativeWeaponRangedItemDefinition",
                    "FortWeaponMeleeDualWieldItemDefinition",
                ],
                &["_Harvest", "Weapon_Pickaxe_", "Weapons_Pickaxe_", "Dev_WID"],
            )
            .stats(StatsResolver::Weapon)
            .active(ActiveResolver::AllowList(active_items)),
            CategoryDescriptor::new(
                AssetCategory::Resource,
                &["FortIngredientItemDefinition", "FortResourceItemDefinition"],
                &["SurvivorItemData", "OutpostUpgrade_StormShieldAmplifier"],
            ),
            CategoryDescriptor::new(
                AssetCategory::Trap,
                &["FortTrapItemDefinition"],
                &["TID_Creative", "TID_Floor_Minigame_Trigger_Plate"],
            ),
            CategoryDescriptor::new(AssetCategory::Vehicle, &["FortVehicleItemDefinition"], &[])
                .icon(IconResolver::Vehicle)
                .display_name(NameResolver::Vehicle),
        ];
        Self { descriptors }
    }

    /// First descriptor matching the object, in priority order.
    pub fn classify(&self, asset: &PropertyBag, class_name: &str) -> Option<&CategoryDescriptor> {
        self.descriptors.iter().find(|d| d.matches(asset, class_name))
    }

    pub fn descriptors(&self) -> &[CategoryDescriptor] {
        &self.descriptors
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new(HashSet::new())
    }
}
