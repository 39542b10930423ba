//! Platform front end over a storage backend.
//!
//! A [`Platform`] owns one [`Backend`] and mediates the scenario lifecycle:
//! open, create, clone, persist. It also guarantees the required-unit list
//! is present, auto-adding missing legacy units with a warning (documented
//! as a future error).

use tracing::{debug, warn};

use mix_core::units::REQUIRED_UNITS;
use mix_core::{MixError, MixResult, Scenario, ScenarioId, Scheme};

use crate::backend::Backend;

/// Version reference in a scenario URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRef {
    /// `#new`: create a fresh scenario.
    New,
    /// No fragment: the latest stored version.
    Latest,
    Number(u32),
}

/// Parsed form of `<platform>/<model>/<scenario>#<version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioUrl {
    pub platform: String,
    pub model: String,
    pub scenario: String,
    pub version: VersionRef,
}

impl ScenarioUrl {
    pub fn parse(url: &str) -> MixResult<Self> {
        let (path, fragment) = match url.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (url, None),
        };
        let parts: Vec<&str> = path.split('/').collect();
        let [platform, model, scenario] = parts.as_slice() else {
            return Err(MixError::Parse(format!(
                "scenario URL '{url}' must have the form <platform>/<model>/<scenario>[#<version>]"
            )));
        };
        if platform.is_empty() || model.is_empty() || scenario.is_empty() {
            return Err(MixError::Parse(format!(
                "scenario URL '{url}' has an empty component"
            )));
        }
        let version = match fragment {
            None => VersionRef::Latest,
            Some("new") => VersionRef::New,
            Some(v) => VersionRef::Number(v.parse().map_err(|_| {
                MixError::Parse(format!("invalid version '{v}' in scenario URL '{url}'"))
            })?),
        };
        Ok(Self {
            platform: platform.to_string(),
            model: model.to_string(),
            scenario: scenario.to_string(),
            version,
        })
    }
}

/// Front end combining a backend with the platform-level unit registry.
pub struct Platform<B: Backend> {
    backend: B,
}

impl<B: Backend> Platform<B> {
    /// Open a platform, ensuring all required units exist. Missing units on
    /// a legacy store are added automatically with a warning.
    pub fn open(backend: B) -> MixResult<Self> {
        let mut platform = Self { backend };
        let known = platform.backend.units()?;
        for unit in REQUIRED_UNITS {
            if !known.iter().any(|u| u == unit) {
                // Auto-add for compatibility; this will become an error.
                warn!(unit, "required unit missing from store; adding it");
                platform.backend.register_unit(unit)?;
            }
        }
        Ok(platform)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Register a unit; idempotent, global to the platform.
    pub fn register_unit(&mut self, unit: &str) -> MixResult<()> {
        self.backend.register_unit(unit)
    }

    pub fn units(&self) -> MixResult<Vec<String>> {
        self.backend.units()
    }

    /// Open an existing scenario; `version = None` resolves to the latest.
    pub fn open_scenario(
        &self,
        model: &str,
        scenario: &str,
        version: Option<u32>,
    ) -> MixResult<Scenario> {
        let version = match version {
            Some(v) => v,
            None => self
                .backend
                .latest_version(model, scenario)?
                .ok_or_else(|| {
                    MixError::NotFound(format!("scenario {model}/{scenario} (no versions)"))
                })?,
        };
        self.backend.load(&ScenarioId {
            model: model.to_string(),
            scenario: scenario.to_string(),
            version,
        })
    }

    /// Resolve a scenario URL against this platform.
    pub fn resolve(&self, url: &ScenarioUrl, scheme: Scheme) -> MixResult<Scenario> {
        match url.version {
            VersionRef::New => self.create(&url.model, &url.scenario, scheme),
            VersionRef::Latest => self.open_scenario(&url.model, &url.scenario, None),
            VersionRef::Number(v) => self.open_scenario(&url.model, &url.scenario, Some(v)),
        }
    }

    /// Create a new, checked-out scenario with the next free version.
    pub fn create(&self, model: &str, scenario: &str, scheme: Scheme) -> MixResult<Scenario> {
        let mut scn = Scenario::new(model, scenario, scheme)?;
        scn.version = self.backend.latest_version(model, scenario)?.unwrap_or(0) + 1;
        debug!(%model, %scenario, version = scn.version, "created scenario");
        Ok(scn)
    }

    /// Persist a committed scenario.
    pub fn store(&mut self, scn: &Scenario) -> MixResult<()> {
        if scn.is_checked_out() {
            return Err(MixError::Transaction(format!(
                "scenario {} must be committed before storing",
                scn.id()
            )));
        }
        self.backend.save(scn)
    }

    /// Clone a scenario under a new identity.
    ///
    /// With `keep_solution = false`, solution variables are dropped while
    /// all input data (including pre-firstmodelyear historical rows) is
    /// carried over.
    pub fn clone_scenario(
        &mut self,
        src: &Scenario,
        model: &str,
        scenario: &str,
        keep_solution: bool,
    ) -> MixResult<Scenario> {
        let mut clone = src.clone();
        clone.model = model.to_string();
        clone.scenario = scenario.to_string();
        clone.version = self.backend.latest_version(model, scenario)?.unwrap_or(0) + 1;
        if !keep_solution {
            clone.remove_solution()?;
        }
        if clone.is_checked_out() {
            clone.commit("clone")?;
        }
        self.backend.save(&clone)?;
        Ok(clone)
    }

    /// Remove one stored scenario version.
    pub fn delete(&mut self, id: &ScenarioId) -> MixResult<()> {
        self.backend.delete(id)
    }

    /// The first optimization period of a stored scenario.
    pub fn firstmodelyear(&self, scn: &Scenario) -> MixResult<i32> {
        scn.firstmodelyear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemBackend;
    use mix_core::SolRow;

    #[test]
    fn url_parsing_accepts_all_version_forms() {
        let url = ScenarioUrl::parse("local/model/baseline#3").unwrap();
        assert_eq!(url.platform, "local");
        assert_eq!(url.version, VersionRef::Number(3));
        assert_eq!(
            ScenarioUrl::parse("local/model/baseline#new").unwrap().version,
            VersionRef::New
        );
        assert_eq!(
            ScenarioUrl::parse("local/model/baseline").unwrap().version,
            VersionRef::Latest
        );
        assert!(ScenarioUrl::parse("model/baseline").is_err());
        assert!(ScenarioUrl::parse("local/model/baseline#x").is_err());
    }

    #[test]
    fn open_ensures_required_units() {
        let platform = Platform::open(MemBackend::new()).unwrap();
        let units = platform.units().unwrap();
        for required in ["-", "GWa", "USD/tCO2"] {
            assert!(units.iter().any(|u| u == required), "missing {required}");
        }
    }

    #[test]
    fn create_assigns_increasing_versions() {
        let mut platform = Platform::open(MemBackend::new()).unwrap();
        let mut first = platform.create("model", "base", Scheme::Message).unwrap();
        assert_eq!(first.version, 1);
        first.commit("initial").unwrap();
        platform.store(&first).unwrap();
        let second = platform.create("model", "base", Scheme::Message).unwrap();
        assert_eq!(second.version, 2);
    }

    #[test]
    fn store_rejects_checked_out_scenarios() {
        let mut platform = Platform::open(MemBackend::new()).unwrap();
        let scn = platform.create("model", "base", Scheme::Message).unwrap();
        assert!(matches!(
            platform.store(&scn),
            Err(MixError::Transaction(_))
        ));
    }

    #[test]
    fn clone_drops_solution_when_asked() {
        let mut platform = Platform::open(MemBackend::new()).unwrap();
        let mut scn = platform.create("model", "base", Scheme::Message).unwrap();
        scn.init_item(mix_core::registry().lookup("OBJ").unwrap())
            .unwrap();
        scn.add_set_elements("year", &["2010", "2020"]).unwrap();
        scn.add_par(
            "historical_new_capacity",
            vec![mix_core::ParRow::new(vec!["n", "tec", "2010"], 5.0, "GW")],
        )
        .unwrap();
        scn.set_solution(
            "OBJ",
            vec![SolRow {
                key: vec![],
                level: 1.0,
                marginal: 0.0,
            }],
        )
        .unwrap();
        scn.commit("with solution").unwrap();
        platform.store(&scn).unwrap();

        let kept = platform
            .clone_scenario(&scn, "model", "kept", true)
            .unwrap();
        assert!(kept.has_solution());

        let dropped = platform
            .clone_scenario(&scn, "model", "dropped", false)
            .unwrap();
        assert!(!dropped.has_solution());
        assert!(dropped.sol_rows("OBJ").unwrap().is_empty());
        // Historical input data survives the solution drop.
        assert_eq!(dropped.par_rows("historical_new_capacity").unwrap().len(), 1);
        assert_eq!(dropped.version, 1);
        assert_eq!(dropped.model, "model");
        assert_eq!(dropped.scenario, "dropped");
    }

    #[test]
    fn open_scenario_resolves_latest() {
        let mut platform = Platform::open(MemBackend::new()).unwrap();
        for _ in 0..2 {
            let mut scn = platform.create("model", "base", Scheme::Message).unwrap();
            scn.commit("v").unwrap();
            platform.store(&scn).unwrap();
        }
        let latest = platform.open_scenario("model", "base", None).unwrap();
        assert_eq!(latest.version, 2);
        assert!(platform.open_scenario("model", "missing", None).is_err());
    }
}
