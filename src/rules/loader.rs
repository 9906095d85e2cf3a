//! Load rule tables from TOML documents

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::error::{ChargenError, Result};
use crate::rules::career::{CareerDefinition, LifeEvent, Mishap};
use crate::rules::ruleset::Ruleset;
use crate::rules::tables::RuleTables;

/// Classic ruleset shipped with the crate
const BUILTIN_RULES: &str = include_str!("../../data/rules/classic.toml");

/// A complete ruleset document
#[derive(Debug, Deserialize)]
struct TomlRules {
    #[serde(default)]
    ruleset: Ruleset,
    #[serde(default)]
    careers: Vec<CareerDefinition>,
    #[serde(default)]
    mishap_tables: BTreeMap<String, Vec<Mishap>>,
    #[serde(default)]
    event_tables: BTreeMap<String, Vec<LifeEvent>>,
}

impl TomlRules {
    fn into_tables(self) -> Result<RuleTables> {
        RuleTables::new(self.ruleset, self.careers, self.mishap_tables, self.event_tables)
    }
}

/// Extra careers (and the shared tables they bring) merged into a ruleset
#[derive(Debug, Deserialize)]
struct TomlCareerFile {
    #[serde(default)]
    careers: Vec<CareerDefinition>,
    #[serde(default)]
    mishap_tables: BTreeMap<String, Vec<Mishap>>,
    #[serde(default)]
    event_tables: BTreeMap<String, Vec<LifeEvent>>,
}

impl RuleTables {
    /// Parse and validate a ruleset document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: TomlRules = toml::from_str(content)?;
        raw.into_tables()
    }

    /// Load a ruleset document from a file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let raw: TomlRules = toml::from_str(&content).map_err(|e| {
            ChargenError::InvalidRule(format!("{}: {}", path.display(), e))
        })?;
        let tables = raw.into_tables()?;
        tracing::debug!(
            "Loaded {} careers from {}",
            tables.careers().len(),
            path.display()
        );
        Ok(tables)
    }

    /// The embedded classic ruleset
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    /// Merge every .toml career file under `path`, recursively
    ///
    /// Files are read in path order so the merged career order is stable.
    /// The merge is all or nothing: on error `self` is left as it was.
    /// Returns the number of careers added.
    pub fn load_careers_dir(&mut self, path: &Path) -> Result<usize> {
        let mut files = Vec::new();
        collect_toml_files(path, &mut files)?;
        files.sort();

        let mut merged = self.clone();
        let mut added = 0;
        for file in files {
            let content = std::fs::read_to_string(&file)?;
            let raw: TomlCareerFile = toml::from_str(&content).map_err(|e| {
                ChargenError::InvalidRule(format!("{}: {}", file.display(), e))
            })?;
            merged.add_shared_tables(raw.mishap_tables, raw.event_tables)?;
            for career in raw.careers {
                tracing::debug!("Adding career {} from {}", career.id, file.display());
                merged.add_career(career)?;
                added += 1;
            }
        }
        merged.check_references()?;
        *self = merged;
        Ok(added)
    }
}

fn collect_toml_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();

        if entry_path.is_dir() {
            collect_toml_files(&entry_path, files)?;
        } else if entry_path.extension().map_or(false, |ext| ext == "toml") {
            files.push(entry_path);
        }
    }
    Ok(())
}
