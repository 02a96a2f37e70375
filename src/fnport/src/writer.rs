//! Concurrent export of records to JSON metadata and icon images.
//!
//! Each record produces two independent artifacts, written as two joined
//! parallel subtasks: the JSON file under `<root>/json/<Category>/` and a
//! PNG icon at `<root>/<icon name>.png`. The asymmetry is deliberate:
//! metadata is authoritative and any write failure propagates, while the
//! icon is best-effort and I/O failures are logged and swallowed. The
//! batch driver isolates failures per record and never aborts the batch.

use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageEncoder;
use rayon::prelude::*;
use thiserror::Error;

use crate::record::ExportRecord;
use crate::texture::DecodeError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("failed to encode icon: {0}")]
    Encode(#[from] image::ImageError),
}

impl ExportError {
    /// I/O-class failures on the icon path are recoverable; decode and
    /// encode failures are not.
    fn is_io_class(&self) -> bool {
        matches!(
            self,
            ExportError::Io(_) | ExportError::Encode(image::ImageError::IoError(_))
        )
    }
}

/// PNG compression level for exported icons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

impl PngCompression {
    fn to_image(self) -> CompressionType {
        match self {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

/// Per-batch tally. Failed entries carry the record id and the error text.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub exported: usize,
    pub failed: Vec<(String, String)>,
}

/// Persists export records under a configured root directory.
pub struct ExportWriter {
    root: PathBuf,
    compression: PngCompression,
}

impl ExportWriter {
    pub fn new(root: impl Into<PathBuf>, compression: PngCompression) -> Self {
        Self {
            root: root.into(),
            compression,
        }
    }

    /// Export one record: JSON and icon written concurrently, joined
    /// before returning. JSON failures propagate; icon I/O failures are
    /// logged as warnings and swallowed.
    pub fn export(&self, record: &ExportRecord) -> Result<(), ExportError> {
        let (json_result, icon_result) =
            rayon::join(|| self.write_json(record), || self.write_icon(record));

        json_result?;
        match icon_result {
            Ok(()) => Ok(()),
            Err(e) if e.is_io_class() => {
                eprintln!("Warning: failed to export icon for {}: {}", record.id, e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Export many records in parallel. Failures are scoped to their
    /// record; the batch always runs to completion.
    pub fn export_batch(&self, records: &[ExportRecord]) -> ExportSummary {
        let results: Vec<_> = records
            .par_iter()
            .map(|record| (record.id.clone(), self.export(record)))
            .collect();

        let mut summary = ExportSummary::default();
        for (id, result) in results {
            match result {
                Ok(()) => summary.exported += 1,
                Err(e) => summary.failed.push((id, e.to_string())),
            }
        }
        summary
    }

    fn write_json(&self, record: &ExportRecord) -> Result<(), ExportError> {
        let dir = self.root.join("json").join(record.category.as_str());
        fs::create_dir_all(&dir)?;

        let bytes = serde_json::to_vec_pretty(record)?;

        // Write to a sibling temp file and rename, so a failed write never
        // leaves a partial .json behind.
        let tmp = dir.join(format!("{}.json.tmp", record.id));
        if let Err(e) = fs::write(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        fs::rename(&tmp, dir.join(format!("{}.json", record.id)))?;
        Ok(())
    }

    fn write_icon(&self, record: &ExportRecord) -> Result<(), ExportError> {
        fs::create_dir_all(&self.root)?;

        let img = record.icon.decode()?;
        let path = self.root.join(format!("{}.png", record.icon.name()));
        let file = fs::File::create(path)?;

        let encoder = PngEncoder::new_with_quality(
            BufWriter::new(file),
            self.compression.to_image(),
            FilterType::Adaptive,
        );
        encoder.write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::property::{PropertyBag, PropertyValue};
    use crate::registry::CategoryRegistry;
    use crate::stats::StatsCache;
    use crate::texture::{PixelFormat, TextureHandle};

    fn outfit_record(id: &str, icon_name: &str) -> ExportRecord {
        let texture =
            TextureHandle::new(icon_name, 2, 2, PixelFormat::Rgba8, vec![0xFFu8; 16]);
        let asset =
            PropertyBag::new(id).with("SmallPreviewImage", PropertyValue::Texture(texture));
        let registry = CategoryRegistry::default();
        let descriptor = registry
            .classify(&asset, "AthenaCharacterItemDefinition")
            .unwrap();
        ExportRecord::build(&asset, descriptor, &StatsCache::new()).unwrap()
    }

    fn read_json(root: &Path, id: &str) -> serde_json::Value {
        let path = root.join("json").join("Outfit").join(format!("{id}.json"));
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn export_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path(), PngCompression::Fast);

        writer.export(&outfit_record("CID_001", "T_CID_001")).unwrap();

        let json = read_json(dir.path(), "CID_001");
        assert_eq!(json["id"], "CID_001");
        assert_eq!(json["icon"], "T_CID_001");

        let png = fs::read(dir.path().join("T_CID_001.png")).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        // No temp files left behind.
        assert!(!dir.path().join("json/Outfit/CID_001.json.tmp").exists());
    }

    #[test]
    fn icon_io_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path(), PngCompression::Default);

        // A directory squatting on the icon path forces an I/O error.
        fs::create_dir_all(dir.path().join("T_Blocked.png")).unwrap();

        writer.export(&outfit_record("CID_002", "T_Blocked")).unwrap();
        assert_eq!(read_json(dir.path(), "CID_002")["id"], "CID_002");
    }

    #[test]
    fn icon_decode_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path(), PngCompression::Default);

        let truncated = TextureHandle::new("T_Bad", 8, 8, PixelFormat::Bc7, vec![0u8; 4]);
        let asset = PropertyBag::new("CID_003")
            .with("SmallPreviewImage", PropertyValue::Texture(truncated));
        let registry = CategoryRegistry::default();
        let descriptor = registry
            .classify(&asset, "AthenaCharacterItemDefinition")
            .unwrap();
        let record = ExportRecord::build(&asset, descriptor, &StatsCache::new()).unwrap();

        assert!(matches!(
            writer.export(&record),
            Err(ExportError::Decode(_))
        ));
    }

    #[test]
    fn batch_isolates_icon_failures() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path(), PngCompression::Fast);
        fs::create_dir_all(dir.path().join("T_B.png")).unwrap();

        let records = vec![
            outfit_record("CID_A", "T_A"),
            outfit_record("CID_B", "T_B"),
            outfit_record("CID_C", "T_C"),
        ];
        let summary = writer.export_batch(&records);

        assert_eq!(summary.exported, 3);
        assert!(summary.failed.is_empty());
        for id in ["CID_A", "CID_B", "CID_C"] {
            assert_eq!(read_json(dir.path(), id)["id"], id);
        }
        assert!(dir.path().join("T_A.png").is_file());
        assert!(!dir.path().join("T_B.png").is_file());
        assert!(dir.path().join("T_C.png").is_file());
    }
}
