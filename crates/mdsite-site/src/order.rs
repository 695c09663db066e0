//! Ordering manifest (`order.yml`).
//!
//! The manifest lists content-relative paths in display order. A path at
//! position `i` gets weight `orderMin + i`; everything else falls back to the
//! default weight.
//!
//! ```yaml
//! default: 10
//! orderMin: 1
//! order:
//!   - sample-01.md
//!   - info/deep-file.txt
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::page::DEFAULT_WEIGHT;

/// Manifest filename inside the configuration directory.
pub const ORDER_FILENAME: &str = "order.yml";

/// Error reading the ordering manifest.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Manifest file does not exist.
    #[error("Order manifest not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Manifest could not be read.
    #[error("Failed to read order manifest: {0}")]
    Io(#[from] std::io::Error),
    /// Manifest is not valid YAML for [`OrderInfo`].
    #[error("Invalid order manifest: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Parsed ordering manifest.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrderInfo {
    /// Weight for paths not listed in `order`.
    #[serde(rename = "default")]
    pub default_weight: f64,
    /// Weight of the first listed path.
    #[serde(rename = "orderMin")]
    pub order_origin: i64,
    /// Content-relative paths in display order.
    pub order: Vec<String>,
}

impl Default for OrderInfo {
    fn default() -> Self {
        Self {
            default_weight: DEFAULT_WEIGHT,
            order_origin: 1,
            order: Vec::new(),
        }
    }
}

impl OrderInfo {
    /// Read `order.yml` from the configuration directory.
    pub fn load(config_dir: &Path) -> Result<Self, OrderError> {
        let path = config_dir.join(ORDER_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OrderError::NotFound(path));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = %path.display(), "Reading page order");
        Self::from_yaml(&content)
    }

    /// Parse a manifest document. An empty document is the default manifest.
    pub fn from_yaml(content: &str) -> Result<Self, OrderError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Path to weight mapping built from an [`OrderInfo`].
#[derive(Clone, Debug, PartialEq)]
pub struct OrderTable {
    weights: HashMap<String, f64>,
    default_weight: f64,
}

impl Default for OrderTable {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
            default_weight: DEFAULT_WEIGHT,
        }
    }
}

impl OrderTable {
    /// Build the table. A path listed twice keeps its last position.
    #[must_use]
    pub fn from_info(info: &OrderInfo) -> Self {
        let mut weights = HashMap::with_capacity(info.order.len());
        for (i, path) in info.order.iter().enumerate() {
            // f64 arithmetic: an extreme orderMin must not overflow
            #[allow(clippy::cast_precision_loss)]
            let weight = info.order_origin as f64 + i as f64;
            weights.insert(path.clone(), weight);
        }

        Self {
            weights,
            default_weight: info.default_weight,
        }
    }

    /// Load the manifest from `config_dir`.
    ///
    /// Never fails: a missing or malformed manifest yields the empty table.
    #[must_use]
    pub fn load(config_dir: &Path) -> Self {
        match OrderInfo::load(config_dir) {
            Ok(info) => Self::from_info(&info),
            Err(OrderError::NotFound(path)) => {
                tracing::debug!(path = %path.display(), "No page order manifest");
                Self::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "Error while parsing order info");
                Self::default()
            }
        }
    }

    /// Weight for a content-relative path.
    #[must_use]
    pub fn weight(&self, path: &str) -> f64 {
        self.weights.get(path).copied().unwrap_or(self.default_weight)
    }

    /// Explicit weight for a path, if the manifest lists it.
    #[must_use]
    pub fn explicit_weight(&self, path: &str) -> Option<f64> {
        self.weights.get(path).copied()
    }

    /// Weight for unlisted paths.
    #[must_use]
    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    /// All explicit weights.
    #[must_use]
    pub fn weights(&self) -> &HashMap<String, f64> {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_info_assigns_positions() {
        let info = OrderInfo {
            order: vec!["a.md".to_owned(), "b.md".to_owned()],
            ..Default::default()
        };

        let table = OrderTable::from_info(&info);

        assert_eq!(table.weight("a.md"), 1.0);
        assert_eq!(table.weight("b.md"), 2.0);
        assert_eq!(table.weight("c.md"), DEFAULT_WEIGHT);
        assert_eq!(table.explicit_weight("c.md"), None);
    }

    #[test]
    fn test_from_info_custom_origin_and_default() {
        let info = OrderInfo::from_yaml("default: 100\norderMin: 5\norder: [x.md, y.md]\n").unwrap();

        let table = OrderTable::from_info(&info);

        assert_eq!(table.weight("x.md"), 5.0);
        assert_eq!(table.weight("y.md"), 6.0);
        assert_eq!(table.default_weight(), 100.0);
        assert_eq!(table.weight("z.md"), 100.0);
    }

    #[test]
    fn test_from_info_extreme_origin_does_not_overflow() {
        let info =
            OrderInfo::from_yaml("orderMin: 9223372036854775807\norder: [a.md, b.md]\n").unwrap();

        let table = OrderTable::from_info(&info);

        let first = table.weight("a.md");
        let second = table.weight("b.md");
        assert!(first > 9.0e18, "{first}");
        assert!(second >= first, "{second}");
    }

    #[test]
    fn test_duplicate_path_last_occurrence_wins() {
        let info = OrderInfo::from_yaml("order: [a.md, b.md, a.md]\n").unwrap();

        let table = OrderTable::from_info(&info);

        assert_eq!(table.weight("a.md"), 3.0);
        assert_eq!(table.weight("b.md"), 2.0);
        assert_eq!(table.weights().len(), 2);
    }

    #[test]
    fn test_from_yaml_partial_document_keeps_defaults() {
        let info = OrderInfo::from_yaml("order: [a.md]\n").unwrap();

        assert_eq!(info.default_weight, DEFAULT_WEIGHT);
        assert_eq!(info.order_origin, 1);
    }

    #[test]
    fn test_from_yaml_empty_document() {
        assert_eq!(OrderInfo::from_yaml("").unwrap(), OrderInfo::default());
    }

    #[test]
    fn test_from_yaml_malformed() {
        let result = OrderInfo::from_yaml("order: {not: [a list");
        assert!(matches!(result, Err(OrderError::Parse(_))));
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp_dir = tempfile::tempdir().unwrap();

        let result = OrderInfo::load(temp_dir.path());
        assert!(matches!(result, Err(OrderError::NotFound(_))));

        let table = OrderTable::load(temp_dir.path());
        assert_eq!(table, OrderTable::default());
    }

    #[test]
    fn test_load_malformed_manifest_is_empty_table() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(ORDER_FILENAME), "order: 12\n").unwrap();

        let table = OrderTable::load(temp_dir.path());

        assert!(table.weights().is_empty());
        assert_eq!(table.default_weight(), DEFAULT_WEIGHT);
    }

    #[test]
    fn test_load_manifest() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(ORDER_FILENAME),
            "order:\n  - sample-01.md\n  - info/deep-file.txt\n",
        )
        .unwrap();

        let table = OrderTable::load(temp_dir.path());

        assert_eq!(table.weight("sample-01.md"), 1.0);
        assert_eq!(table.weight("info/deep-file.txt"), 2.0);
    }
}
