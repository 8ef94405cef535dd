//! Asset Registry: which meshes exist per category, which one is shown by
//! default, where freshly loaded models and the four wheels are placed, and
//! the paint palette. Pure data; built once at startup.

use std::collections::HashSet;

use corelib::{Color, PlacementOptions};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetCategory {
    Body,
    WheelSet,
}

/// What happens to a category's default model once it has loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostLoad {
    /// Attach the model itself to the scene.
    AttachSingle,
    /// Clone it into the four wheel slots.
    MountFour,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 2] = [AssetCategory::Body, AssetCategory::WheelSet];

    pub fn post_load(self) -> PostLoad {
        match self {
            AssetCategory::Body => PostLoad::AttachSingle,
            AssetCategory::WheelSet => PostLoad::MountFour,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetCategory::Body => "body",
            AssetCategory::WheelSet => "wheels",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetEntry {
    pub logical_name: String,
    pub file_path: String,
}

impl AssetEntry {
    pub fn new(logical_name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            file_path: file_path.into(),
        }
    }
}

/// Ordered entries of one category plus the one shown by default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetTable {
    pub entries: Vec<AssetEntry>,
    pub default: String,
}

impl AssetTable {
    pub fn new(entries: Vec<AssetEntry>, default: impl Into<String>) -> Self {
        Self {
            entries,
            default: default.into(),
        }
    }

    pub fn get(&self, logical_name: &str) -> Option<&AssetEntry> {
        self.entries.iter().find(|e| e.logical_name == logical_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.logical_name.as_str())
    }
}

/// The four wheel-mounting positions, in mounting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WheelSlot {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelSlot {
    pub const ALL: [WheelSlot; 4] = [
        WheelSlot::FrontLeft,
        WheelSlot::FrontRight,
        WheelSlot::RearLeft,
        WheelSlot::RearRight,
    ];

    /// 1-based slot number.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    /// Scene object name of the wheel in this slot (`wheel_1` .. `wheel_4`).
    pub fn node_name(self) -> String {
        format!("wheel_{}", self.number())
    }

    pub fn from_number(n: usize) -> Option<Self> {
        Self::ALL.get(n.checked_sub(1)?).copied()
    }
}

/// Paint colours in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<(String, Color)>,
}

impl Palette {
    pub fn new(entries: Vec<(String, Color)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<Color> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, color)| *color)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
        self.entries.iter().map(|(id, c)| (id.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0} table is empty")]
    EmptyTable(&'static str),
    #[error("default {category} '{name}' is not in its table")]
    MissingDefault { category: &'static str, name: String },
    #[error("logical name '{0}' is registered more than once")]
    DuplicateName(String),
    #[error("default colour '{0}' is not in the palette")]
    MissingDefaultColor(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssetRegistry {
    pub bodies: AssetTable,
    pub wheels: AssetTable,
    /// Applied to every model right after it loads.
    pub default_options: PlacementOptions,
    /// Per-slot options, indexed in [`WheelSlot::ALL`] order.
    pub slot_options: [PlacementOptions; 4],
    pub palette: Palette,
    pub default_color: String,
    pub clear_color: Color,
}

impl AssetRegistry {
    /// The shipped car, wheel styles, placements and paint palette.
    pub fn builtin() -> Self {
        let palette = Palette::new(vec![
            ("exColor1".into(), Color::from_hex(0x1c1c1c)),
            ("exColor2".into(), Color::from_hex(0xc0c0c0)),
            ("exColor3".into(), Color::from_hex(0x8a8d8f)),
            ("exColor4".into(), Color::from_hex(0xb8860b)),
            ("exColor5".into(), Color::from_hex(0x8b0000)),
        ]);
        let wheel_color = palette.get("exColor3").unwrap_or(Color::WHITE);
        let pi = std::f32::consts::PI;
        let slot = |name: &str, position: [f32; 3], rotation_y: f32| {
            PlacementOptions::new(name, wheel_color, position, [0.0, rotation_y, 0.0])
        };
        Self {
            bodies: AssetTable::new(vec![AssetEntry::new("audi", "models/audi.json")], "audi"),
            wheels: AssetTable::new(
                vec![
                    AssetEntry::new("vossen", "models/vossen.json"),
                    AssetEntry::new("enkei", "models/enkei.json"),
                ],
                "vossen",
            ),
            default_options: PlacementOptions::new(
                "model",
                Color::from_hex(0x2b2b2b),
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0],
            ),
            slot_options: [
                slot("wheel_1", [172.0, 44.0, 78.0], 0.0),
                slot("wheel_2", [172.0, 44.0, -78.0], pi),
                slot("wheel_3", [-118.0, 44.0, 78.0], 0.0),
                slot("wheel_4", [-118.0, 44.0, -78.0], pi),
            ],
            palette,
            default_color: "exColor3".into(),
            clear_color: Color::from_hex(0xf2f2f2),
        }
    }

    pub fn table(&self, category: AssetCategory) -> &AssetTable {
        match category {
            AssetCategory::Body => &self.bodies,
            AssetCategory::WheelSet => &self.wheels,
        }
    }

    pub fn lookup(&self, category: AssetCategory, logical_name: &str) -> Option<&str> {
        self.table(category)
            .get(logical_name)
            .map(|e| e.file_path.as_str())
    }

    /// Category and entry for a logical name from any table.
    pub fn find(&self, logical_name: &str) -> Option<(AssetCategory, &AssetEntry)> {
        AssetCategory::ALL
            .into_iter()
            .find_map(|c| self.table(c).get(logical_name).map(|e| (c, e)))
    }

    pub fn default_options(&self) -> &PlacementOptions {
        &self.default_options
    }

    pub fn wheel_slot_options(&self, slot: WheelSlot) -> &PlacementOptions {
        &self.slot_options[slot as usize]
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        for category in AssetCategory::ALL {
            let table = self.table(category);
            if table.entries.is_empty() {
                return Err(RegistryError::EmptyTable(category.label()));
            }
            if table.get(&table.default).is_none() {
                return Err(RegistryError::MissingDefault {
                    category: category.label(),
                    name: table.default.clone(),
                });
            }
            for name in table.names() {
                if !seen.insert(name) {
                    return Err(RegistryError::DuplicateName(name.to_string()));
                }
            }
        }
        if self.palette.get(&self.default_color).is_none() {
            return Err(RegistryError::MissingDefaultColor(self.default_color.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_valid() {
        let reg = AssetRegistry::builtin();
        assert_eq!(reg.validate(), Ok(()));
        assert_eq!(reg.lookup(AssetCategory::Body, "audi"), Some("models/audi.json"));
        assert_eq!(reg.lookup(AssetCategory::WheelSet, "audi"), None);
        assert_eq!(reg.wheels.names().collect::<Vec<_>>(), ["vossen", "enkei"]);
    }

    #[test]
    fn slot_options_are_named_after_their_slot() {
        let reg = AssetRegistry::builtin();
        for slot in WheelSlot::ALL {
            assert_eq!(reg.wheel_slot_options(slot).name, slot.node_name());
        }
        assert_eq!(WheelSlot::from_number(4), Some(WheelSlot::RearRight));
        assert_eq!(WheelSlot::from_number(0), None);
        assert_eq!(WheelSlot::from_number(5), None);
    }

    #[test]
    fn category_post_load_actions() {
        assert_eq!(AssetCategory::Body.post_load(), PostLoad::AttachSingle);
        assert_eq!(AssetCategory::WheelSet.post_load(), PostLoad::MountFour);
    }

    #[test]
    fn find_searches_every_table() {
        let reg = AssetRegistry::builtin();
        assert_eq!(reg.find("enkei").map(|(c, _)| c), Some(AssetCategory::WheelSet));
        assert_eq!(reg.find("audi").map(|(c, _)| c), Some(AssetCategory::Body));
        assert!(reg.find("bbs").is_none());
    }

    #[test]
    fn validate_catches_bad_tables() {
        let mut reg = AssetRegistry::builtin();
        reg.wheels.default = "bbs".into();
        assert!(matches!(reg.validate(), Err(RegistryError::MissingDefault { .. })));

        let mut reg = AssetRegistry::builtin();
        reg.wheels.entries.push(AssetEntry::new("audi", "x.obj"));
        assert_eq!(reg.validate(), Err(RegistryError::DuplicateName("audi".into())));

        let mut reg = AssetRegistry::builtin();
        reg.bodies.entries.clear();
        assert_eq!(reg.validate(), Err(RegistryError::EmptyTable("body")));

        let mut reg = AssetRegistry::builtin();
        reg.default_color = "chartreuse".into();
        assert!(matches!(reg.validate(), Err(RegistryError::MissingDefaultColor(_))));
    }
}
