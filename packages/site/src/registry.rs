//! Site registry: built-in profiles plus optional external overrides.
//!
//! Each `.toml` file in `packages/site/sites/` is baked into the binary at
//! compile time via [`include_str!`]. Adding a school is a matter of
//! writing a new TOML file and adding it to the list below, or dropping it
//! into a directory passed to [`SiteRegistry::load_dir`].

use std::collections::BTreeMap;
use std::path::Path;

use gamelog_site_models::{RenderMode, SiteProfile};

use crate::SiteError;
use crate::site_def::parse_site_toml;

/// TOML configs embedded at compile time.
const SITE_TOMLS: &[(&str, &str)] = &[
    // ── Sidearm sites ────────────────────────────────────────────────
    ("belmont", include_str!("../sites/belmont.toml")),
    ("lsu", include_str!("../sites/lsu.toml")),
    ("georgia_tech", include_str!("../sites/georgia_tech.toml")),
    ("north_carolina", include_str!("../sites/north_carolina.toml")),
    ("oklahoma", include_str!("../sites/oklahoma.toml")),
    // ── Presto sites ─────────────────────────────────────────────────
    ("belmont_abbey", include_str!("../sites/belmont_abbey.toml")),
];

/// Total number of built-in sites (used in tests).
#[cfg(test)]
const EXPECTED_SITE_COUNT: usize = 6;

/// Returns all built-in site profiles, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any embedded TOML config is malformed. The configs are part
/// of the binary, so this is caught by the registry tests.
#[must_use]
pub fn all_sites() -> Vec<SiteProfile> {
    SITE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_site_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Read-only lookup of site profiles by key.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: BTreeMap<String, SiteProfile>,
}

impl SiteRegistry {
    /// Registry containing only the built-in profiles.
    #[must_use]
    pub fn builtin() -> Self {
        let sites = all_sites()
            .into_iter()
            .map(|site| (site.key.clone(), site))
            .collect();
        Self { sites }
    }

    /// Builds a registry from already-validated profiles.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::DuplicateKey`] if two profiles share a key.
    pub fn from_profiles(profiles: impl IntoIterator<Item = SiteProfile>) -> Result<Self, SiteError> {
        let mut sites = BTreeMap::new();
        for profile in profiles {
            let key = profile.key.clone();
            if sites.insert(key.clone(), profile).is_some() {
                return Err(SiteError::DuplicateKey { key });
            }
        }
        Ok(Self { sites })
    }

    /// Loads every `*.toml` file in `dir` as a site profile.
    ///
    /// Files are read in name order so that errors are reported
    /// deterministically.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Io`] if the directory cannot be read,
    /// [`SiteError::Load`] wrapping the parse or validation error of the
    /// first bad file, or [`SiteError::DuplicateKey`] if two files declare
    /// the same key.
    pub fn load_dir(dir: &Path) -> Result<Self, SiteError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut profiles = Vec::with_capacity(paths.len());
        for path in paths {
            let text = std::fs::read_to_string(&path).map_err(|e| SiteError::Load {
                path: path.clone(),
                source: Box::new(SiteError::Io(e)),
            })?;
            let profile = parse_site_toml(&text).map_err(|e| SiteError::Load {
                path: path.clone(),
                source: Box::new(e),
            })?;
            log::debug!("Loaded site profile '{}' from {}", profile.key, path.display());
            profiles.push(profile);
        }

        Self::from_profiles(profiles)
    }

    /// Layers `overrides` on top of this registry. A profile in `overrides`
    /// replaces the one with the same key.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Self) -> Self {
        for (key, profile) in overrides.sites {
            if self.sites.insert(key.clone(), profile).is_some() {
                log::info!("Site profile '{key}' overridden by external config");
            }
        }
        self
    }

    /// Looks up a profile by key (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::UnknownSite`] listing the available keys.
    pub fn get(&self, key: &str) -> Result<&SiteProfile, SiteError> {
        self.sites
            .get(&key.trim().to_lowercase())
            .ok_or_else(|| SiteError::UnknownSite {
                key: key.to_string(),
                available: self.keys().collect::<Vec<_>>().join(", "),
            })
    }

    /// Configured keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    /// Iterates profiles in key order.
    pub fn iter(&self) -> impl Iterator<Item = &SiteProfile> {
        self.sites.values()
    }

    /// Number of configured profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether no profiles are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Whether any profile needs a browser to render.
    #[must_use]
    pub fn requires_browser(&self) -> bool {
        self.iter().any(|site| site.render_mode == RenderMode::Dynamic)
    }

    /// Whether any of the profiles named by `keys` needs a browser. Unknown
    /// keys are skipped; looking them up reports the error.
    pub fn requires_browser_for<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        keys.into_iter()
            .filter_map(|key| self.get(key).ok())
            .any(|site| site.render_mode == RenderMode::Dynamic)
    }
}
