//! CPLEX option files.
//!
//! The solver reads `cplex.opt` from the model directory; the barrier
//! restart pass reads `cplex.op2`, which is the same option set with
//! `barcrossalg = 2` appended.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// One coerced option value. Boolean-like values render as `0`/`1`,
/// numbers in their natural format.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => write!(f, "1"),
            OptionValue::Bool(false) => write!(f, "0"),
            OptionValue::Int(v) => write!(f, "{v}"),
            OptionValue::Float(v) => write!(f, "{v}"),
            OptionValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

/// Solver options as written to `cplex.opt`.
#[derive(Debug, Clone, PartialEq)]
pub struct CplexOptions {
    values: BTreeMap<String, OptionValue>,
}

impl Default for CplexOptions {
    fn default() -> Self {
        let mut options = Self {
            values: BTreeMap::new(),
        };
        options.set("advind", 0i64);
        options.set("lpmethod", 4i64);
        options.set("threads", 4i64);
        options.set("epopt", 1e-6);
        options
    }
}

impl CplexOptions {
    /// Set or override one option.
    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) -> &mut Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// `key = value` lines, sorted by key.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.values {
            out.push_str(&format!("{key} = {value}\n"));
        }
        out
    }

    /// Write `cplex.opt` and `cplex.op2` into the model directory.
    ///
    /// The directory may be shared between processes; two concurrent solves
    /// with differing options race on these files and the last writer wins.
    pub fn write(&self, model_dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let opt = model_dir.join("cplex.opt");
        let op2 = model_dir.join("cplex.op2");
        let rendered = self.render();
        fs::write(&opt, &rendered)
            .with_context(|| format!("writing {}", opt.display()))?;
        fs::write(&op2, format!("{rendered}barcrossalg = 2\n"))
            .with_context(|| format!("writing {}", op2.display()))?;
        debug!(dir = %model_dir.display(), "wrote solver option files");
        Ok((opt, op2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_set() {
        let rendered = CplexOptions::default().render();
        assert_eq!(
            rendered,
            "advind = 0\nepopt = 0.000001\nlpmethod = 4\nthreads = 4\n"
        );
    }

    #[test]
    fn booleans_coerce_to_zero_one() {
        let mut options = CplexOptions::default();
        options.set("predual", true).set("names", false);
        let rendered = options.render();
        assert!(rendered.contains("predual = 1\n"));
        assert!(rendered.contains("names = 0\n"));
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut options = CplexOptions::default();
        options.set("threads", 8i64);
        assert_eq!(options.get("threads"), Some(&OptionValue::Int(8)));
    }

    #[test]
    fn op2_carries_the_barrier_crossover_line() {
        let dir = tempfile::tempdir().unwrap();
        let (opt, op2) = CplexOptions::default().write(dir.path()).unwrap();
        let opt_text = std::fs::read_to_string(opt).unwrap();
        let op2_text = std::fs::read_to_string(op2).unwrap();
        assert!(!opt_text.contains("barcrossalg"));
        assert!(op2_text.starts_with(&opt_text));
        assert!(op2_text.ends_with("barcrossalg = 2\n"));
    }
}
