//! Fund configuration store: one pretty-printed JSON file per fund.

use std::fs;
use std::path::{Path, PathBuf};

use glidepath::FundConfig;
use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{Error, Result};

/// Identifier and display name of a stored fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundSummary {
    pub id: String,
    pub name: String,
}

/// Read/write access to fund configurations keyed by fund id.
pub trait ConfigStore {
    /// Load and validate a fund configuration.
    fn get(&self, fund_id: &str) -> Result<FundConfig>;
    /// Validate and persist a configuration, replacing any existing one.
    fn save(&self, fund_id: &str, config: &FundConfig) -> Result<()>;
    /// Every readable fund, sorted by id.
    fn list(&self) -> Result<Vec<FundSummary>>;
    /// Create a default configuration named `name`; returns the new id.
    fn create(&self, name: &str) -> Result<String>;
}

/// Derive a fund id from a display name (spaces become `_`).
pub fn fund_id(name: &str) -> Result<String> {
    let id = name.trim().replace(' ', "_");
    check_id(&id)?;
    Ok(id)
}

/// Ids become file names, so they must not escape the store directory.
fn check_id(id: &str) -> Result<()> {
    if id.is_empty()
        || id.starts_with('.')
        || id.contains(['/', '\\'])
        || id.chars().any(char::is_control)
    {
        return Err(Error::InvalidFundId(id.to_string()));
    }
    Ok(())
}

/// Parse and validate a configuration from JSON.
pub fn parse_config(json: &str) -> Result<FundConfig> {
    let config: FundConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// [`ConfigStore`] backed by `<dir>/<fund_id>.json` files.
pub struct JsonFundStore {
    dir: PathBuf,
}

impl JsonFundStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, fund_id: &str) -> PathBuf {
        self.dir.join(format!("{fund_id}.json"))
    }

    fn read(&self, path: &Path) -> Result<FundConfig> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Store {
            path: path.to_path_buf(),
            source: e,
        })?;
        parse_config(&contents)
    }

    fn write(&self, path: &Path, config: &FundConfig) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::Store {
            path: self.dir.clone(),
            source: e,
        })?;
        let json = serde_json::to_string_pretty(config)?;
        fs::write(path, json).map_err(|e| Error::Store {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl ConfigStore for JsonFundStore {
    fn get(&self, fund_id: &str) -> Result<FundConfig> {
        check_id(fund_id)?;
        let path = self.path_for(fund_id);
        if !path.exists() {
            return Err(Error::FundNotFound(fund_id.to_string()));
        }
        debug!("Loading fund {fund_id} from {}", path.display());
        self.read(&path)
    }

    fn save(&self, fund_id: &str, config: &FundConfig) -> Result<()> {
        check_id(fund_id)?;
        config.validate()?;
        let path = self.path_for(fund_id);
        self.write(&path, config)?;
        info!("Saved fund {fund_id} to {}", path.display());
        Ok(())
    }

    fn list(&self) -> Result<Vec<FundSummary>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Store {
                    path: self.dir.clone(),
                    source: e,
                });
            }
        };

        let mut funds = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.read(&path) {
                Ok(config) => funds.push(FundSummary {
                    id: id.to_string(),
                    name: config.fund_name,
                }),
                Err(e) => warn!("Skipping {}: {e}", path.display()),
            }
        }
        funds.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(funds)
    }

    fn create(&self, name: &str) -> Result<String> {
        let id = fund_id(name)?;
        let path = self.path_for(&id);
        if path.exists() {
            return Err(Error::FundExists(id));
        }
        self.write(&path, &FundConfig::new(name.trim()))?;
        info!("Created fund {id}");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glidepath::{AssetClass, FundWeight, GlidePathEntry, Symbol};

    fn configured(name: &str) -> FundConfig {
        let mut config = FundConfig::new(name);
        config.birth_year = 1985;
        config.asset_classes.insert(
            AssetClass::new("us_stock"),
            vec![
                FundWeight::new(Symbol::new("VTI"), 60.0),
                FundWeight::new(Symbol::new("VB"), 40.0),
            ],
        );
        config.glide_path = vec![GlidePathEntry::new(30, [("us_stock", 100.0)])];
        config
    }

    #[test]
    fn fund_id_replaces_spaces() {
        assert_eq!(fund_id("My Retirement Fund").unwrap(), "My_Retirement_Fund");
        assert_eq!(fund_id("  Solo ").unwrap(), "Solo");
    }

    #[test]
    fn fund_id_rejects_paths() {
        assert!(fund_id("").is_err());
        assert!(fund_id("../etc").is_err());
        assert!(fund_id("a/b").is_err());
        assert!(fund_id(".hidden").is_err());
    }

    #[test]
    fn create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFundStore::new(dir.path());

        let id = store.create("Family Fund").unwrap();
        assert_eq!(id, "Family_Fund");
        assert!(dir.path().join("Family_Fund.json").exists());

        let config = store.get(&id).unwrap();
        assert_eq!(config.fund_name, "Family Fund");
        assert_eq!(config.birth_year, 1990);
        assert_eq!(config.asset_classes.len(), 5);
        assert!(config.asset_classes.values().all(Vec::is_empty));
        assert!(config.glide_path.is_empty());
    }

    #[test]
    fn create_rejects_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFundStore::new(dir.path());
        store.create("Dup").unwrap();
        assert!(matches!(store.create("Dup"), Err(Error::FundExists(id)) if id == "Dup"));
    }

    #[test]
    fn save_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFundStore::new(dir.path().join("nested"));
        let config = configured("Core");

        store.save("core", &config).unwrap();
        assert_eq!(store.get("core").unwrap(), config);
    }

    #[test]
    fn save_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFundStore::new(dir.path());
        let mut config = configured("Bad");
        config.asset_classes.insert(
            AssetClass::new("us_stock"),
            vec![FundWeight::new(Symbol::new("VTI"), 90.0)],
        );

        assert!(matches!(
            store.save("bad", &config),
            Err(Error::Validation(glidepath::Error::FundWeightSum { .. }))
        ));
        assert!(!dir.path().join("bad.json").exists());
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFundStore::new(dir.path());
        assert!(matches!(store.get("ghost"), Err(Error::FundNotFound(_))));
    }

    #[test]
    fn list_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFundStore::new(dir.path());
        store.save("b_fund", &configured("B")).unwrap();
        store.save("a_fund", &configured("A")).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let funds = store.list().unwrap();
        let ids: Vec<&str> = funds.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a_fund", "b_fund"]);
        assert_eq!(funds[0].name, "A");
    }

    #[test]
    fn list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFundStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn parse_accepts_legacy_keys() {
        let json = r#"{
            "fund_name": "Legacy",
            "date_of_birth": 1975,
            "funds": {
                "us_stock": [{ "symbol": "VTI", "percentage": 100 }],
                "us_bond": [{ "symbol": "BND", "percentage": 100 }]
            },
            "glide_path": [
                { "age": 60, "allocations": { "us_stock": 40, "us_bond": 60 } },
                { "age": 30, "allocations": { "us_stock": 90, "us_bond": 10 } }
            ]
        }"#;
        let config = parse_config(json).unwrap();
        assert_eq!(config.birth_year, 1975);
        assert_eq!(config.asset_classes.len(), 2);
        assert_eq!(config.glide_path.len(), 2);
    }

    #[test]
    fn parse_rejects_long_symbol() {
        let json = r#"{
            "birth_year": 1980,
            "asset_classes": { "us_stock": [{ "symbol": "TOOLONGNAME", "percentage": 100 }] }
        }"#;
        assert!(matches!(parse_config(json), Err(Error::FundParse(_))));
    }
}
