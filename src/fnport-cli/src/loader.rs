//! Asset dump loading.
//!
//! Reads pre-extracted asset dumps (one JSON file per object) into typed
//! property bags. Complex values are wrapped objects keyed by kind
//! (`texture`, `object`, `class`, `tags`, `row`, ...); plain JSON
//! scalars map directly. Texture dumps reference sidecar pixel files and
//! stat rows reference table files, both relative to the dump root.
//! Each table file is parsed once and shared across all assets that
//! reference it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use walkdir::WalkDir;

use fnport::property::{
    BlueprintClass, LocalizedText, PropertyBag, PropertyValue, StatRowHandle, StatTable,
    TagContainer,
};
use fnport::{PixelFormat, TextureHandle};

/// One loaded object, ready for classification.
pub struct LoadedAsset {
    pub class_name: String,
    pub bag: PropertyBag,
}

#[derive(Debug, Deserialize)]
struct AssetDump {
    name: String,
    class: String,
    #[serde(default)]
    properties: HashMap<String, ValueDump>,
}

#[derive(Debug, Deserialize)]
struct ObjectDump {
    #[serde(default)]
    name: String,
    #[serde(default)]
    properties: HashMap<String, ValueDump>,
}

#[derive(Debug, Deserialize)]
struct TextureDump {
    name: String,
    width: u32,
    height: u32,
    format: String,
    /// Pixel payload path, relative to the dump root.
    file: String,
}

#[derive(Debug, Deserialize)]
struct RowDump {
    /// Table file path, relative to the dump root.
    table: String,
    row_name: String,
}

#[derive(Debug, Deserialize)]
struct ClassDump {
    #[serde(default)]
    name: String,
    default_object: Option<ObjectDump>,
    super_class: Option<Box<ClassDump>>,
}

#[derive(Debug, Deserialize)]
struct TableDump {
    id: String,
    #[serde(default)]
    rows: Vec<(String, HashMap<String, ValueDump>)>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueDump {
    Texture {
        texture: TextureDump,
    },
    Text {
        text: String,
    },
    Enum {
        #[serde(rename = "enum")]
        literal: String,
    },
    Tags {
        tags: Vec<String>,
    },
    Row {
        row: RowDump,
    },
    Class {
        class: Box<ClassDump>,
    },
    Object {
        object: Box<ObjectDump>,
    },
    Array {
        array: Vec<ObjectDump>,
    },
    Bool(bool),
    Int(i64),
    Number(f64),
    String(String),
}

/// Loads asset dumps from a directory tree, deduplicating stat tables.
pub struct AssetLoader {
    root: PathBuf,
    tables: HashMap<PathBuf, Arc<StatTable>>,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tables: HashMap::new(),
        }
    }

    /// Load every asset dump under the root. Files that are not asset
    /// dumps (stat tables, stray JSON) are skipped; files that fail to
    /// load are reported and skipped.
    pub fn load_dir(&mut self, verbose: bool) -> Result<Vec<LoadedAsset>> {
        let mut assets = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path().is_file()
                    && e.path().extension().map(|ext| ext == "json").unwrap_or(false)
            })
        {
            match self.load_file(entry.path()) {
                Ok(Some(asset)) => assets.push(asset),
                Ok(None) => {
                    if verbose {
                        eprintln!("Skipping {} (no class field)", entry.path().display());
                    }
                }
                Err(e) => {
                    eprintln!("Warning: failed to load {}: {e:#}", entry.path().display());
                }
            }
        }
        Ok(assets)
    }

    /// Load one dump file. Returns `None` for JSON files that are not
    /// asset dumps.
    pub fn load_file(&mut self, path: &Path) -> Result<Option<LoadedAsset>> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if value.get("class").is_none() {
            return Ok(None);
        }

        let dump: AssetDump = serde_json::from_value(value)
            .with_context(|| format!("Malformed asset dump {}", path.display()))?;
        let bag = self.bag_from(dump.name, dump.properties)?;
        Ok(Some(LoadedAsset {
            class_name: dump.class,
            bag,
        }))
    }

    fn bag_from(
        &mut self,
        name: String,
        properties: HashMap<String, ValueDump>,
    ) -> Result<PropertyBag> {
        let mut bag = PropertyBag::new(name);
        for (key, value) in properties {
            let converted = self.convert(value)?;
            bag.set(key, converted);
        }
        Ok(bag)
    }

    fn convert(&mut self, value: ValueDump) -> Result<PropertyValue> {
        Ok(match value {
            ValueDump::Texture { texture } => {
                let format = PixelFormat::from_name(&texture.format)
                    .with_context(|| format!("Unsupported pixel format {}", texture.format))?;
                let pixel_path = self.root.join(&texture.file);
                let data = fs::read(&pixel_path).with_context(|| {
                    format!("Failed to read pixel data {}", pixel_path.display())
                })?;
                PropertyValue::Texture(TextureHandle::new(
                    texture.name,
                    texture.width,
                    texture.height,
                    format,
                    data,
                ))
            }
            ValueDump::Text { text } => PropertyValue::Text(LocalizedText::literal(text)),
            ValueDump::Enum { literal } => PropertyValue::Enum(literal),
            ValueDump::Tags { tags } => PropertyValue::Tags(TagContainer::new(tags)),
            ValueDump::Row { row } => {
                let table = self.table(&row.table)?;
                PropertyValue::RowHandle(StatRowHandle {
                    table,
                    row_name: row.row_name,
                })
            }
            ValueDump::Class { class } => PropertyValue::Class(self.convert_class(*class)?),
            ValueDump::Object { object } => {
                PropertyValue::Object(Arc::new(self.bag_from(object.name, object.properties)?))
            }
            ValueDump::Array { array } => PropertyValue::Array(
                array
                    .into_iter()
                    .map(|o| self.bag_from(o.name, o.properties))
                    .collect::<Result<Vec<_>>>()?,
            ),
            ValueDump::Bool(b) => PropertyValue::Bool(b),
            ValueDump::Int(i) => PropertyValue::Int(i),
            ValueDump::Number(f) => PropertyValue::Number(f),
            ValueDump::String(s) => PropertyValue::String(s),
        })
    }

    fn convert_class(&mut self, dump: ClassDump) -> Result<Arc<BlueprintClass>> {
        let default_object = dump
            .default_object
            .map(|o| self.bag_from(o.name, o.properties).map(Arc::new))
            .transpose()?;
        let super_class = dump
            .super_class
            .map(|c| self.convert_class(*c))
            .transpose()?;
        Ok(Arc::new(BlueprintClass {
            name: dump.name,
            default_object,
            super_class,
        }))
    }

    /// Parse a stat table file, reusing the shared instance on repeat
    /// references.
    fn table(&mut self, relative: &str) -> Result<Arc<StatTable>> {
        let path = self.root.join(relative);
        if let Some(table) = self.tables.get(&path) {
            return Ok(Arc::clone(table));
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stat table {}", path.display()))?;
        let dump: TableDump = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse stat table {}", path.display()))?;

        let rows = dump
            .rows
            .into_iter()
            .map(|(key, properties)| {
                self.bag_from(key.clone(), properties).map(|bag| (key, bag))
            })
            .collect::<Result<Vec<_>>>()?;

        let table = Arc::new(StatTable::new(dump.id, rows));
        self.tables.insert(path, Arc::clone(&table));
        Ok(table)
    }
}
