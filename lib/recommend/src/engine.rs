//! Recommendation pipeline
//!
//! For each pool, in order: vectorize the preference with the pool's schema,
//! rank the pool, then merge required lectures with the ranked candidates
//! under the pool's quota. Exclusions accumulate across pools so a course
//! listed in one category never shows up in a later one.

use ahash::AHashMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use sugang_core::{rank, retain_matching, ExclusionSet, MetadataFilter};
use sugang_schema::{explain, vectorize, StudentProfile, UserPreference};
use tracing::{debug, info};
use crate::catalog::CurriculumCatalog;
use crate::config::RecommendConfig;
use crate::credits::{taken_courses, CompletedCourse};
use crate::error::{RecommendError, Result};
use crate::inject::{inject, RequiredLecture};
use crate::pool::{CandidatePool, PoolRegistry};
use crate::record::Recommendations;

/// Build category lists for one preference
///
/// `exclusions` holds course names that must not be recommended by
/// similarity; it is not modified. Pools without an entry in
/// `required_by_category` get no required lectures.
///
/// # Errors
/// [`RecommendError::MissingQuota`] if a pool has no quota, and the ranking
/// error if a pool's vectors disagree with its schema.
pub fn recommend<P: AsRef<CandidatePool>>(
    preference: &UserPreference,
    pools: &[P],
    exclusions: &ExclusionSet,
    required_by_category: &AHashMap<String, Vec<RequiredLecture>>,
    quotas: &AHashMap<String, usize>,
) -> Result<Recommendations> {
    let mut excluded = exclusions.clone();
    // courses already placed in an earlier category
    let mut listed = ExclusionSet::new();
    let mut recommendations = Recommendations::new();

    for pool in pools {
        let pool = pool.as_ref();
        let quota = *quotas
            .get(&pool.name)
            .ok_or_else(|| RecommendError::MissingQuota(pool.name.clone()))?;

        let user = vectorize(preference, &pool.schema);
        let ranked = rank(&user, &pool.lectures)?;

        let required: Vec<RequiredLecture> = required_by_category
            .get(&pool.name)
            .map(|lectures| {
                lectures
                    .iter()
                    .filter(|l| !listed.contains(&l.course))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let records = inject(&required, ranked, &mut excluded, quota, |candidate| {
            explain(&user, &candidate.lecture.vector, &pool.schema)
        });

        debug!(
            pool = %pool.name,
            schema = %pool.schema.id(),
            candidates = pool.lectures.len(),
            required = records.iter().filter(|r| r.is_required()).count(),
            listed = records.len(),
            "built category list"
        );

        listed.extend(records.iter().map(|r| r.course.as_str()));
        recommendations.push(pool.name.clone(), records);
    }

    Ok(recommendations)
}

/// A recommendation request as sent by the client
///
/// Accepts either one flat object holding profile fields, preference
/// fields and `history`, or nested `profile` / `preferences` objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentRequest {
    pub profile: StudentProfile,
    pub preferences: UserPreference,
    pub history: Vec<CompletedCourse>,
}

impl<'de> Deserialize<'de> for StudentRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(de::Error::custom("request must be a JSON object"));
        }
        let section = |key: &str| value.get(key).filter(|v| v.is_object()).cloned().unwrap_or_else(|| value.clone());

        let profile = serde_json::from_value(section("profile")).map_err(de::Error::custom)?;
        let preferences = serde_json::from_value(section("preferences")).map_err(de::Error::custom)?;
        let history = match value.get("history").or_else(|| value.get("이전수강")) {
            Some(Value::Null) | None => Vec::new(),
            Some(history) => serde_json::from_value(history.clone()).map_err(de::Error::custom)?,
        };

        Ok(Self {
            profile,
            preferences,
            history,
        })
    }
}

/// Configured recommender over a shared pool registry
pub struct Recommender {
    config: RecommendConfig,
    registry: Arc<PoolRegistry>,
    catalog: CurriculumCatalog,
}

impl Recommender {
    pub fn new(config: RecommendConfig, registry: Arc<PoolRegistry>, catalog: CurriculumCatalog) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            catalog,
        })
    }

    /// Load every configured pool and the catalog from disk
    pub fn load(config: RecommendConfig) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(PoolRegistry::new());
        for pool in &config.pools {
            let path = pool.path_in(&config.data_dir);
            registry.insert(CandidatePool::load_json(&pool.name, pool.schema.schema(), path)?);
        }
        let catalog = match config.catalog_path() {
            Some(path) => CurriculumCatalog::load_json(path)?,
            None => CurriculumCatalog::new(),
        };
        info!(pools = registry.len(), "recommender ready");
        Self::new(config, registry, catalog)
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    pub fn catalog(&self) -> &CurriculumCatalog {
        &self.catalog
    }

    /// Reload one pool from disk; requests in flight keep the old copy
    pub fn reload_pool(&self, name: &str) -> Result<()> {
        let pool = self
            .config
            .pool(name)
            .ok_or_else(|| RecommendError::PoolNotFound(name.to_string()))?;
        let path = pool.path_in(&self.config.data_dir);
        self.registry
            .insert(CandidatePool::load_json(&pool.name, pool.schema.schema(), path)?);
        Ok(())
    }

    /// Scope each configured pool to the student, look up required
    /// lectures, exclude history, and build the category lists
    pub fn recommend(&self, request: &StudentRequest) -> Result<Recommendations> {
        let profile = &request.profile;
        let mut pools = Vec::with_capacity(self.config.pools.len());
        let mut required = AHashMap::new();
        let mut quotas = AHashMap::new();

        for pool_config in &self.config.pools {
            let pool = self
                .registry
                .get(&pool_config.name)
                .ok_or_else(|| RecommendError::PoolNotFound(pool_config.name.clone()))?;
            if pool.schema.dimension_count() != pool_config.schema.schema().dimension_count() {
                return Err(RecommendError::InvalidConfig(format!(
                    "pool '{}' uses schema {}, config expects {:?}",
                    pool.name,
                    pool.schema.id(),
                    pool_config.schema
                )));
            }

            let scoped = match pool_config.scope.condition(profile) {
                Some(condition) => {
                    let lectures = retain_matching(pool.lectures.clone(), &MetadataFilter::new(condition));
                    CandidatePool::new(pool.name.clone(), pool.schema.clone(), lectures)
                }
                None => (*pool).clone(),
            };
            debug!(pool = %scoped.name, total = pool.len(), scoped = scoped.len(), "scoped pool");

            required.insert(pool_config.name.clone(), self.catalog.required_for(&pool_config.name, profile));
            quotas.insert(pool_config.name.clone(), pool_config.quota);
            pools.push(scoped);
        }

        let exclusions = taken_courses(&request.history);
        let recommendations = recommend(&request.preferences, &pools, &exclusions, &required, &quotas)?;
        info!(
            categories = recommendations.len(),
            records = recommendations.record_count(),
            excluded = exclusions.len(),
            "recommendation complete"
        );
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PoolConfig, PoolScope};
    use crate::record::CURRICULUM_REQUIRED;
    use serde_json::json;
    use sugang_core::{LectureId, LectureMetadata, LectureVector, Vector};
    use sugang_schema::{FeatureSchema, PreferenceField, SchemaKind};

    fn liberal_lecture(course: &str, instructor: &str, dims: &[(usize, f32)]) -> LectureVector {
        let mut data = vec![0.0; 20];
        for (i, v) in dims {
            data[*i] = *v;
        }
        LectureVector::new(LectureId::new(course, instructor), Vector::new(data), LectureMetadata::default())
    }

    fn quotas(entries: &[(&str, usize)]) -> AHashMap<String, usize> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_course_never_repeats_across_categories() {
        let shared = liberal_lecture("글쓰기", "한", &[(17, 1.0)]);
        let first = CandidatePool::new("liberal", FeatureSchema::liberal(), vec![shared.clone()]);
        let second = CandidatePool::new(
            "career",
            FeatureSchema::liberal(),
            vec![shared, liberal_lecture("진로탐색", "김", &[(18, 1.0)])],
        );
        let preference = UserPreference::new().with(PreferenceField::Campus, "수정");

        let recs = recommend(
            &preference,
            &[first, second],
            &ExclusionSet::new(),
            &AHashMap::new(),
            &quotas(&[("liberal", 5), ("career", 5)]),
        )
        .unwrap();

        assert_eq!(recs.get("liberal").unwrap().len(), 1);
        let career: Vec<_> = recs.get("career").unwrap().iter().map(|r| r.course.as_str()).collect();
        assert_eq!(career, vec!["진로탐색"]);
    }

    #[test]
    fn test_missing_quota_is_error() {
        let pool = CandidatePool::new("liberal", FeatureSchema::liberal(), Vec::new());
        let result = recommend(&UserPreference::new(), &[pool], &ExclusionSet::new(), &AHashMap::new(), &AHashMap::new());
        assert!(matches!(result, Err(RecommendError::MissingQuota(name)) if name == "liberal"));
    }

    #[test]
    fn test_schema_mismatch_surfaces() {
        let bad = LectureVector::new(LectureId::new("x", "y"), Vector::zeros(18), LectureMetadata::default());
        let pool = CandidatePool::new("liberal", FeatureSchema::liberal(), vec![bad]);
        let result = recommend(
            &UserPreference::new(),
            &[pool],
            &ExclusionSet::new(),
            &AHashMap::new(),
            &quotas(&[("liberal", 3)]),
        );
        assert!(matches!(result, Err(RecommendError::Core(sugang_core::Error::SchemaMismatch { .. }))));
    }

    #[test]
    fn test_empty_pool_gives_empty_list() {
        let pool = CandidatePool::new("major", FeatureSchema::major(), Vec::new());
        let recs = recommend(&UserPreference::new(), &[pool], &ExclusionSet::new(), &AHashMap::new(), &quotas(&[("major", 5)]))
            .unwrap();
        assert_eq!(recs.get("major").unwrap().len(), 0);
    }

    #[test]
    fn test_request_shapes() {
        let flat: StudentRequest = serde_json::from_value(json!({
            "전공": "AI융합학부",
            "학년": 1,
            "캠퍼스": "수정",
            "history": [{"과목명": "글쓰기", "이수구분": "공통교양", "학점": 2}]
        }))
        .unwrap();
        assert_eq!(flat.profile.grade, Some(1));
        assert_eq!(flat.preferences.get(PreferenceField::Campus), Some("수정"));
        assert_eq!(flat.history.len(), 1);

        let nested: StudentRequest = serde_json::from_value(json!({
            "profile": {"major": "AI융합학부", "grade": 1},
            "preferences": {"캠퍼스": "수정"}
        }))
        .unwrap();
        assert_eq!(nested.profile, flat.profile);
        assert_eq!(nested.preferences, flat.preferences);
        assert!(nested.history.is_empty());

        assert!(serde_json::from_value::<StudentRequest>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_recommender_scopes_and_injects() {
        let registry = Arc::new(PoolRegistry::new());
        let mut common = liberal_lecture("파이썬프로그래밍", "장재경", &[(17, 1.0)]);
        common.metadata.completion = Some("공통교양".to_string());
        registry.insert(CandidatePool::new(
            "liberal",
            FeatureSchema::liberal(),
            vec![
                common,
                liberal_lecture("미술의 이해", "이", &[(17, 1.0), (1, 1.0)]),
                liberal_lecture("음악의 이해", "박", &[(18, 1.0)]),
            ],
        ));

        let config = RecommendConfig {
            pools: vec![PoolConfig::new("liberal", SchemaKind::Liberal, 2).with_scope(PoolScope::Liberal {
                common_core: "공통교양".to_string(),
            })],
            ..Default::default()
        };
        let catalog: CurriculumCatalog = serde_json::from_value(json!({
            "rules": [{"pool": "liberal", "grades": [1], "lectures": [{"과목명": "파이썬프로그래밍", "교수명": "장재경"}]}]
        }))
        .unwrap();
        let recommender = Recommender::new(config, registry, catalog).unwrap();

        let first_year: StudentRequest = serde_json::from_value(json!({"학년": 1, "캠퍼스": "수정"})).unwrap();
        let recs = recommender.recommend(&first_year).unwrap();
        let liberal = recs.get("liberal").unwrap();
        assert_eq!(liberal.len(), 2);
        assert_eq!(liberal[0].labels[0], CURRICULUM_REQUIRED);
        assert_eq!(liberal[1].course, "미술의 이해");

        // past first year: no required entry, common-core row scoped out,
        // and history excluded
        let third_year: StudentRequest = serde_json::from_value(json!({
            "학년": 3,
            "캠퍼스": "수정",
            "history": [{"과목명": "미술의 이해"}]
        }))
        .unwrap();
        let recs = recommender.recommend(&third_year).unwrap();
        let names: Vec<_> = recs.get("liberal").unwrap().iter().map(|r| r.course.as_str()).collect();
        assert_eq!(names, vec!["음악의 이해"]);
    }

    #[test]
    fn test_recommender_missing_pool() {
        let recommender = Recommender::new(RecommendConfig::default(), Arc::new(PoolRegistry::new()), CurriculumCatalog::new())
            .unwrap();
        let result = recommender.recommend(&StudentRequest::default());
        assert!(matches!(result, Err(RecommendError::PoolNotFound(_))));
        assert!(matches!(recommender.reload_pool("nope"), Err(RecommendError::PoolNotFound(_))));
    }
}
