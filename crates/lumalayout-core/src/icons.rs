//! Icon catalog collaborator interface.
//!
//! The core treats icons as opaque references with a bounding box. A catalog
//! supplies the natural size used once at placement time; everything else
//! about an icon (vector data, rendering) lives outside the core.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Target longest edge for a freshly placed icon, in world units.
pub const ICON_TARGET_EDGE: f64 = 60.0;

/// Opaque reference to an icon image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconRef {
    /// Key into an external icon catalog.
    Catalog(String),
    /// Inline base64-encoded image payload.
    Inline(String),
}

impl IconRef {
    /// Reference an icon by catalog key.
    pub fn catalog(key: impl Into<String>) -> Self {
        IconRef::Catalog(key.into())
    }

    /// Embed raw image bytes as an inline payload.
    pub fn inline_from_bytes(bytes: &[u8]) -> Self {
        IconRef::Inline(BASE64.encode(bytes))
    }

    /// Decode an inline payload back to raw bytes.
    ///
    /// Returns `None` for catalog references or undecodable payloads; a
    /// broken payload degrades to a placeholder box, it is not an error.
    pub fn inline_bytes(&self) -> Option<Vec<u8>> {
        match self {
            IconRef::Catalog(_) => None,
            IconRef::Inline(data) => BASE64.decode(data).ok(),
        }
    }
}

/// Supplies natural icon dimensions for placement sizing.
pub trait IconCatalog {
    /// Natural (width, height) of the referenced icon, if known.
    fn natural_size(&self, icon: &IconRef) -> Option<(f64, f64)>;
}

/// In-memory catalog of registered icon dimensions.
#[derive(Debug, Clone, Default)]
pub struct MemoryIconCatalog {
    sizes: HashMap<String, (f64, f64)>,
}

impl MemoryIconCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the natural size of a catalog icon.
    pub fn register(&mut self, key: impl Into<String>, width: f64, height: f64) {
        self.sizes.insert(key.into(), (width, height));
    }
}

impl IconCatalog for MemoryIconCatalog {
    fn natural_size(&self, icon: &IconRef) -> Option<(f64, f64)> {
        match icon {
            IconRef::Catalog(key) => self.sizes.get(key).copied(),
            IconRef::Inline(_) => None,
        }
    }
}

/// Size a new element proportionally from an icon's natural dimensions.
///
/// The longest edge lands on [`ICON_TARGET_EDGE`], the other is rounded from
/// the natural aspect ratio. Unknown or degenerate sizes fall back to a
/// square.
pub fn placement_size(natural: Option<(f64, f64)>) -> (f64, f64) {
    let Some((w, h)) = natural else {
        return (ICON_TARGET_EDGE, ICON_TARGET_EDGE);
    };
    if w <= 0.0 || h <= 0.0 {
        return (ICON_TARGET_EDGE, ICON_TARGET_EDGE);
    }
    let ratio = w / h;
    if ratio >= 1.0 {
        (ICON_TARGET_EDGE, (ICON_TARGET_EDGE / ratio).round())
    } else {
        ((ICON_TARGET_EDGE * ratio).round(), ICON_TARGET_EDGE)
    }
}
