//! # fnport
//!
//! Game catalog classification and export engine.
//!
//! This library provides functionality to:
//! - Classify loaded catalog objects (cosmetics, weapons, vehicles, ...)
//!   into a fixed category set with per-category exclusion filters
//! - Resolve icon, display name, description, derived stats and activity
//!   through overridable fallback chains
//! - Memoize weapon stat table rows in a shared, ingest-once cache
//! - Export each classified object as a JSON record plus a PNG icon,
//!   concurrently and with per-object failure isolation
//!
//! ## Example
//!
//! ```no_run
//! use fnport::{CategoryRegistry, ExportRecord, ExportWriter, PngCompression, StatsCache};
//! use fnport::property::PropertyBag;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = CategoryRegistry::default();
//! let cache = StatsCache::new();
//! let writer = ExportWriter::new("exported", PngCompression::Default);
//!
//! let asset: PropertyBag = PropertyBag::new("CID_028_Athena_Commando_F");
//! if let Some(descriptor) = registry.classify(&asset, "AthenaCharacterItemDefinition") {
//!     let record = ExportRecord::build(&asset, descriptor, &cache)?;
//!     writer.export(&record)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod property;
pub mod record;
pub mod registry;
pub mod resolve;
pub mod stats;
pub mod texture;
pub mod writer;

// Re-export commonly used items
#[doc(inline)]
pub use record::{ExportRecord, Rarity, SEASON_UNKNOWN};
#[doc(inline)]
pub use registry::{AssetCategory, CategoryDescriptor, CategoryRegistry};
#[doc(inline)]
pub use resolve::ResolveError;
#[doc(inline)]
pub use stats::StatsCache;
#[doc(inline)]
pub use texture::{PixelFormat, TextureHandle};
#[doc(inline)]
pub use writer::{ExportError, ExportSummary, ExportWriter, PngCompression};
