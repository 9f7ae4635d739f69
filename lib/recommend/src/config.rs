//! Recommender configuration
//!
//! Every field has a default, so an empty JSON object is a valid config
//! describing the three standard categories.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sugang_core::FilterCondition;
use sugang_schema::{SchemaKind, StudentProfile};
use crate::error::{RecommendError, Result};

/// Which rows of a pool a student may be recommended
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolScope {
    /// Every row
    #[default]
    All,
    /// Rows offered by the student's major, sub-major or one of the shared
    /// departments, restricted to the area of the student's year
    Major {
        #[serde(default)]
        shared_departments: Vec<String>,
    },
    /// Students past first year no longer see common-core rows
    Liberal {
        #[serde(default = "default_common_core")]
        common_core: String,
    },
    /// Rows targeted at the student's year
    Career,
    /// Any declarative condition
    Custom { condition: FilterCondition },
}

fn default_common_core() -> String {
    "공통교양".to_string()
}

impl PoolScope {
    /// Condition for `profile`, or `None` when every row qualifies
    pub fn condition(&self, profile: &StudentProfile) -> Option<FilterCondition> {
        match self {
            PoolScope::All => None,
            PoolScope::Major { shared_departments } => {
                let mut departments = shared_departments.clone();
                departments.extend(profile.major.iter().cloned());
                departments.extend(profile.sub_major.iter().cloned());

                let offered_by = FilterCondition::one_of("department", departments);
                match profile.grade {
                    Some(grade) => Some(FilterCondition::And(vec![
                        offered_by,
                        FilterCondition::contains("area", format!("{}영역", grade)),
                    ])),
                    None => Some(offered_by),
                }
            }
            PoolScope::Liberal { common_core } => match profile.grade {
                Some(grade) if grade != 1 => Some(FilterCondition::Not(Box::new(
                    FilterCondition::equals("completion", common_core.clone()),
                ))),
                _ => None,
            },
            PoolScope::Career => profile
                .grade
                .map(|grade| FilterCondition::equals("grade", grade.to_string())),
            PoolScope::Custom { condition } => Some(condition.clone()),
        }
    }
}

/// One output category and the pool feeding it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub name: String,

    pub schema: SchemaKind,

    pub quota: usize,

    /// Pool file, relative to the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub scope: PoolScope,
}

impl PoolConfig {
    pub fn new(name: &str, schema: SchemaKind, quota: usize) -> Self {
        Self {
            name: name.to_string(),
            schema,
            quota,
            file: None,
            scope: PoolScope::All,
        }
    }

    pub fn with_scope(mut self, scope: PoolScope) -> Self {
        self.scope = scope;
        self
    }

    /// `<data_dir>/<file>`, defaulting to `<name>.json`
    pub fn path_in(&self, data_dir: &Path) -> PathBuf {
        match &self.file {
            Some(file) => data_dir.join(file),
            None => data_dir.join(format!("{}.json", self.name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Directory holding pool files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Curriculum catalog; no required lectures when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Categories in output order
    #[serde(default = "default_pools")]
    pub pools: Vec<PoolConfig>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_pools() -> Vec<PoolConfig> {
    vec![
        PoolConfig::new("major", SchemaKind::Major, 5).with_scope(PoolScope::Major {
            shared_departments: vec!["공과대학".to_string()],
        }),
        PoolConfig::new("liberal", SchemaKind::Liberal, 15).with_scope(PoolScope::Liberal {
            common_core: default_common_core(),
        }),
        PoolConfig::new("career", SchemaKind::Liberal, 2).with_scope(PoolScope::Career),
    ]
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog: None,
            pools: default_pools(),
        }
    }
}

impl RecommendConfig {
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pools.is_empty() {
            return Err(RecommendError::InvalidConfig("no pools configured".to_string()));
        }
        let mut names = AHashSet::new();
        for pool in &self.pools {
            if pool.name.trim().is_empty() {
                return Err(RecommendError::InvalidConfig("pool name must not be empty".to_string()));
            }
            if pool.quota == 0 {
                return Err(RecommendError::InvalidConfig(format!(
                    "pool '{}' must have a positive quota",
                    pool.name
                )));
            }
            if !names.insert(pool.name.as_str()) {
                return Err(RecommendError::InvalidConfig(format!("duplicate pool '{}'", pool.name)));
            }
        }
        Ok(())
    }

    pub fn pool(&self, name: &str) -> Option<&PoolConfig> {
        self.pools.iter().find(|p| p.name == name)
    }

    /// Catalog path resolved against the data directory
    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.as_ref().map(|c| self.data_dir.join(c))
    }
}
