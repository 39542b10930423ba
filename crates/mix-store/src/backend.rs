//! Storage backends for scenario persistence.
//!
//! The core consumes the [`Backend`] trait and nothing else; the concrete
//! store is an opaque object providing item CRUD, cloning support, and unit
//! registration. Two implementations exist: an in-memory map for tests and
//! ephemeral work, and a filesystem store writing one JSON document per
//! scenario version.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use mix_core::{MixError, MixResult, Scenario, ScenarioId};

/// Contract between the scenario core and the persistence layer.
pub trait Backend {
    /// Load one scenario version. Fails if not found.
    fn load(&self, id: &ScenarioId) -> MixResult<Scenario>;

    /// Persist a scenario under its current identity, overwriting any
    /// previous payload for the same version.
    fn save(&mut self, scn: &Scenario) -> MixResult<()>;

    /// Remove one scenario version.
    fn delete(&mut self, id: &ScenarioId) -> MixResult<()>;

    /// All stored scenario identities, sorted.
    fn list(&self) -> MixResult<Vec<ScenarioId>>;

    /// Highest stored version of (model, scenario), if any.
    fn latest_version(&self, model: &str, scenario: &str) -> MixResult<Option<u32>>;

    /// Register a unit; idempotent.
    fn register_unit(&mut self, unit: &str) -> MixResult<()>;

    /// All registered units, sorted.
    fn units(&self) -> MixResult<Vec<String>>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Backend keeping everything in process memory.
#[derive(Debug, Default)]
pub struct MemBackend {
    scenarios: BTreeMap<ScenarioId, Scenario>,
    units: BTreeSet<String>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemBackend {
    fn load(&self, id: &ScenarioId) -> MixResult<Scenario> {
        self.scenarios
            .get(id)
            .cloned()
            .ok_or_else(|| MixError::NotFound(format!("scenario {id}")))
    }

    fn save(&mut self, scn: &Scenario) -> MixResult<()> {
        self.scenarios.insert(scn.id(), scn.clone());
        Ok(())
    }

    fn delete(&mut self, id: &ScenarioId) -> MixResult<()> {
        self.scenarios
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MixError::NotFound(format!("scenario {id}")))
    }

    fn list(&self) -> MixResult<Vec<ScenarioId>> {
        Ok(self.scenarios.keys().cloned().collect())
    }

    fn latest_version(&self, model: &str, scenario: &str) -> MixResult<Option<u32>> {
        Ok(self
            .scenarios
            .keys()
            .filter(|id| id.model == model && id.scenario == scenario)
            .map(|id| id.version)
            .max())
    }

    fn register_unit(&mut self, unit: &str) -> MixResult<()> {
        self.units.insert(unit.to_string());
        Ok(())
    }

    fn units(&self) -> MixResult<Vec<String>> {
        Ok(self.units.iter().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Filesystem backend
// ---------------------------------------------------------------------------

/// Backend writing one JSON document per scenario version under a root
/// directory, plus a `units.json` registry file.
#[derive(Debug)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> MixResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scenario_path(&self, id: &ScenarioId) -> PathBuf {
        self.root.join(format!(
            "{}__{}__v{}.json",
            sanitize(&id.model),
            sanitize(&id.scenario),
            id.version
        ))
    }

    fn units_path(&self) -> PathBuf {
        self.root.join("units.json")
    }

    fn read_units(&self) -> MixResult<BTreeSet<String>> {
        let path = self.units_path();
        if !path.exists() {
            return Ok(BTreeSet::new());
        }
        let data = fs::read_to_string(&path)?;
        serde_json::from_str(&data)
            .map_err(|e| MixError::Parse(format!("units registry {}: {e}", path.display())))
    }

    fn write_units(&self, units: &BTreeSet<String>) -> MixResult<()> {
        let data = serde_json::to_string_pretty(units)
            .map_err(|e| MixError::Parse(e.to_string()))?;
        fs::write(self.units_path(), data)?;
        Ok(())
    }
}

/// Make a name safe as a file-name component.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Parse `<model>__<scenario>__v<version>.json` back to an identity.
fn parse_file_name(name: &str) -> Option<ScenarioId> {
    let stem = name.strip_suffix(".json")?;
    let mut parts = stem.split("__");
    let model = parts.next()?.to_string();
    let scenario = parts.next()?.to_string();
    let version = parts.next()?.strip_prefix('v')?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(ScenarioId {
        model,
        scenario,
        version,
    })
}

impl Backend for FsBackend {
    fn load(&self, id: &ScenarioId) -> MixResult<Scenario> {
        let path = self.scenario_path(id);
        if !path.exists() {
            return Err(MixError::NotFound(format!("scenario {id}")));
        }
        let data = fs::read_to_string(&path)?;
        serde_json::from_str(&data)
            .map_err(|e| MixError::Parse(format!("scenario file {}: {e}", path.display())))
    }

    fn save(&mut self, scn: &Scenario) -> MixResult<()> {
        let data = serde_json::to_string(scn).map_err(|e| MixError::Parse(e.to_string()))?;
        fs::write(self.scenario_path(&scn.id()), data)?;
        Ok(())
    }

    fn delete(&mut self, id: &ScenarioId) -> MixResult<()> {
        let path = self.scenario_path(id);
        if !path.exists() {
            return Err(MixError::NotFound(format!("scenario {id}")));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    fn list(&self) -> MixResult<Vec<ScenarioId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if let Some(id) = parse_file_name(name) {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn latest_version(&self, model: &str, scenario: &str) -> MixResult<Option<u32>> {
        let stem_model = sanitize(model);
        let stem_scenario = sanitize(scenario);
        let mut latest: Option<u32> = None;
        for id in self.list()? {
            if id.model != stem_model || id.scenario != stem_scenario {
                continue;
            }
            // Distinct names can sanitize to the same file stem, so the
            // identity recorded inside the document decides.
            let scn = self.load(&id)?;
            if scn.model == model && scn.scenario == scenario {
                latest = latest.max(Some(id.version));
            }
        }
        Ok(latest)
    }

    fn register_unit(&mut self, unit: &str) -> MixResult<()> {
        let mut units = self.read_units()?;
        if units.insert(unit.to_string()) {
            self.write_units(&units)?;
        }
        Ok(())
    }

    fn units(&self) -> MixResult<Vec<String>> {
        Ok(self.read_units()?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mix_core::Scheme;
    use tempfile::tempdir;

    fn sample(version: u32) -> Scenario {
        let mut scn = Scenario::new("model", "baseline", Scheme::Message).unwrap();
        scn.add_set_elements("year", &["2020", "2030"]).unwrap();
        scn.commit("initial").unwrap();
        scn.version = version;
        scn
    }

    #[test]
    fn mem_backend_round_trip() {
        let mut backend = MemBackend::new();
        let scn = sample(1);
        backend.save(&scn).unwrap();
        let loaded = backend.load(&scn.id()).unwrap();
        assert_eq!(loaded.set_members("year").unwrap(), vec!["2020", "2030"]);
        assert_eq!(backend.latest_version("model", "baseline").unwrap(), Some(1));
        backend.delete(&scn.id()).unwrap();
        assert!(backend.load(&scn.id()).is_err());
    }

    #[test]
    fn fs_backend_round_trip() {
        let dir = tempdir().unwrap();
        let mut backend = FsBackend::new(dir.path()).unwrap();
        let scn = sample(3);
        backend.save(&scn).unwrap();

        let loaded = backend.load(&scn.id()).unwrap();
        assert_eq!(loaded.set_members("year").unwrap(), vec!["2020", "2030"]);
        assert!(!loaded.is_checked_out());

        assert_eq!(backend.list().unwrap().len(), 1);
        assert_eq!(backend.latest_version("model", "baseline").unwrap(), Some(3));
        assert_eq!(backend.latest_version("model", "other").unwrap(), None);
    }

    #[test]
    fn fs_backend_units_are_idempotent() {
        let dir = tempdir().unwrap();
        let mut backend = FsBackend::new(dir.path()).unwrap();
        backend.register_unit("GWa").unwrap();
        backend.register_unit("GWa").unwrap();
        backend.register_unit("USD").unwrap();
        assert_eq!(backend.units().unwrap(), vec!["GWa", "USD"]);
    }

    #[test]
    fn colliding_file_stems_keep_separate_version_counters() {
        let dir = tempdir().unwrap();
        let mut backend = FsBackend::new(dir.path()).unwrap();

        // "a/b" and "a_b" sanitize to the same file stem.
        let mut slashed = Scenario::new("a/b", "s", Scheme::Message).unwrap();
        slashed.commit("initial").unwrap();
        slashed.version = 2;
        backend.save(&slashed).unwrap();

        let mut flat = Scenario::new("a_b", "s", Scheme::Message).unwrap();
        flat.commit("initial").unwrap();
        flat.version = 5;
        backend.save(&flat).unwrap();

        assert_eq!(backend.latest_version("a/b", "s").unwrap(), Some(2));
        assert_eq!(backend.latest_version("a_b", "s").unwrap(), Some(5));
    }

    #[test]
    fn file_name_parsing_rejects_strays() {
        assert!(parse_file_name("model__scen__v2.json").is_some());
        assert!(parse_file_name("units.json").is_none());
        assert!(parse_file_name("model__scen__2.json").is_none());
    }
}
