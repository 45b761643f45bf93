//! JSON-backed runtime configuration for the demo binary.
use crate::filter::AmfOptions;
use std::fs;
use std::path::Path;

/// Load filter options from a JSON file.
///
/// The file holds a plain [`AmfOptions`] object, e.g.
/// `{"sigma_s": 16.0, "sigma_r": 0.2, "tree_height": -1,
///   "num_pca_iterations": 1, "adjust_outliers": false,
///   "use_rng": true, "dt_iterations": 1}`.
pub fn load_options(path: &Path) -> Result<AmfOptions, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read options {}: {e}", path.display()))?;
    let options: AmfOptions = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse options {}: {e}", path.display()))?;
    Ok(options)
}
