//! DPJP (attending physician) resolution against a small fixed directory.
//!
//! Raw physician text from SIMRS or OCR ("drg. Ruslin", "Dr. YOSSY Y.A")
//! is reduced to a lowercase alphabetic key and matched against alias
//! keys, then against each canonical name. Anything unmatched is returned
//! exactly as recorded; a near-miss surname is a different physician.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ReviewError;

/// Minimum key length before a key is allowed to match *inside* an alias
/// or canonical name (short keys like "dr" would match everything).
const MIN_REVERSE_KEY_LEN: usize = 4;

/// One canonical physician identity and the alias keys that point to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicianEntry {
    pub canonical: String,
    pub aliases: Vec<String>,
}

/// Immutable lookup table, injected wherever DPJP names are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicianDirectory {
    pub entries: Vec<PhysicianEntry>,
}

impl Default for PhysicianDirectory {
    fn default() -> Self {
        let entry = |canonical: &str, aliases: &[&str]| PhysicianEntry {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        };
        Self {
            entries: vec![
                entry(
                    "drg. Yossy Yoanita Ariestiana, M.KG., Sp.B.M.M., Subsp.Ortognat-D(K).",
                    &["yossy", "yoanita", "ariestiana"],
                ),
                entry(
                    "Prof. drg. Muhammad Ruslin, M.Kes., Ph.D., Sp.B.M.M., Subsp. Orthognat-D (K)",
                    &["ruslin"],
                ),
                entry(
                    "drg. Mohammad Gazali, MARS., Sp.B.M.M., Subsp.T.M.T.M.J(K)",
                    &["gazali"],
                ),
                entry("drg. Carolina Stevanie, Sp.B.M.M.", &["carolina", "stevanie"]),
            ],
        }
    }
}

impl PhysicianDirectory {
    /// Load a directory from a JSON file shaped like `{"entries": [...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, ReviewError> {
        let bytes = std::fs::read(path)?;
        let directory: Self = serde_json::from_slice(&bytes)?;
        tracing::info!(
            path = %path.display(),
            entries = directory.entries.len(),
            "Loaded physician directory"
        );
        Ok(directory)
    }

    /// Canonical names, in directory order (for override pickers).
    pub fn canonical_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.canonical.as_str()).collect()
    }

    /// Resolve raw physician text to a canonical name, or return it unchanged.
    pub fn resolve(&self, raw: &str) -> String {
        let key = alpha_key(raw);
        if key.is_empty() {
            return raw.to_string();
        }

        // Tier 1: alias keys
        for entry in &self.entries {
            for alias in &entry.aliases {
                let alias = alias.to_lowercase();
                if key.contains(&alias) || (key.len() >= MIN_REVERSE_KEY_LEN && alias.contains(&key)) {
                    return entry.canonical.clone();
                }
            }
        }

        // Tier 2: the canonical string itself
        for entry in &self.entries {
            let canon = alpha_key(&entry.canonical);
            if key.contains(&canon) || (key.len() >= MIN_REVERSE_KEY_LEN && canon.contains(&key)) {
                return entry.canonical.clone();
            }
        }

        raw.to_string()
    }
}

/// Resolve the DPJP line: a non-empty override always wins.
pub fn resolve_physician(raw: &str, directory: &PhysicianDirectory, override_name: Option<&str>) -> String {
    match override_name.map(str::trim).filter(|o| !o.is_empty()) {
        Some(name) => name.to_string(),
        None => directory.resolve(raw),
    }
}

/// Lowercase ASCII letters only.
fn alpha_key(raw: &str) -> String {
    raw.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()).collect()
}
