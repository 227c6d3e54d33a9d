//! Artifact persistence for the score sources.
//!
//! Every artifact is a standalone JSON file in the models directory. Files
//! are written to a temporary sibling and renamed into place, so a reader
//! never sees a half-written file.

use crate::corpus::CorpusIndex;
use crate::error::{Result, SourceError};
use crate::latent::LatentFactorStore;
use crate::vectorizer::{SparseVector, TfidfVectorizer};
use data_loader::{Activity, Dataset, UserProfile};
use ndarray::Array2;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ACTIVITIES_ARTIFACT: &str = "activities.json";
pub const VECTORS_ARTIFACT: &str = "activity_vectors.json";
pub const VECTORIZER_ARTIFACT: &str = "vectorizer.json";
pub const USER_MAP_ARTIFACT: &str = "cf_user_map.json";
pub const ITEM_MAP_ARTIFACT: &str = "cf_item_map.json";
pub const USER_FACTORS_ARTIFACT: &str = "cf_user_factors.json";
pub const ITEM_FACTORS_ARTIFACT: &str = "cf_item_factors.json";

const CONTENT_ARTIFACTS: [&str; 3] = [ACTIVITIES_ARTIFACT, VECTORS_ARTIFACT, VECTORIZER_ARTIFACT];
const LATENT_ARTIFACTS: [&str; 4] = [
    USER_MAP_ARTIFACT,
    ITEM_MAP_ARTIFACT,
    USER_FACTORS_ARTIFACT,
    ITEM_FACTORS_ARTIFACT,
];

/// Models directory holding the persisted score sources
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn content_exists(&self) -> bool {
        CONTENT_ARTIFACTS.iter().all(|name| self.path(name).exists())
    }

    pub fn latent_exists(&self) -> bool {
        LATENT_ARTIFACTS.iter().all(|name| self.path(name).exists())
    }

    /// Persist the catalog, its content vectors and the fitted vectorizer.
    pub fn save_content(&self, index: &CorpusIndex) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.write_json(ACTIVITIES_ARTIFACT, &index.catalog().activities())?;
        self.write_json(VECTORS_ARTIFACT, &index.vectors())?;
        self.write_json(VECTORIZER_ARTIFACT, index.vectorizer())?;
        info!("Saved content artifacts to {:?}", self.dir);
        Ok(())
    }

    /// Load the content artifacts and attach the given user profiles to the
    /// restored catalog.
    pub fn load_content(&self, profiles: impl IntoIterator<Item = UserProfile>) -> Result<CorpusIndex> {
        let activities: Vec<Activity> = self.read_json(ACTIVITIES_ARTIFACT)?;
        let vectors: Vec<SparseVector> = self.read_json(VECTORS_ARTIFACT)?;
        let vectorizer: TfidfVectorizer = self.read_json(VECTORIZER_ARTIFACT)?;

        let mut catalog = Dataset::from_activities(activities)?;
        for profile in profiles {
            catalog.insert_profile(profile);
        }

        let index = CorpusIndex::from_parts(catalog, vectorizer, vectors)?;
        info!("Loaded content artifacts: {} activities", index.len());
        Ok(index)
    }

    pub fn save_latent(&self, store: &LatentFactorStore) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.write_json(USER_MAP_ARTIFACT, store.user_map())?;
        self.write_json(ITEM_MAP_ARTIFACT, store.item_map())?;
        self.write_json(USER_FACTORS_ARTIFACT, store.user_factors())?;
        self.write_json(ITEM_FACTORS_ARTIFACT, store.item_factors())?;
        info!(
            "Saved latent artifacts to {:?} ({} users, k = {})",
            self.dir,
            store.user_count(),
            store.dimensions()
        );
        Ok(())
    }

    pub fn load_latent(&self) -> Result<LatentFactorStore> {
        let user_map: HashMap<String, usize> = self.read_json(USER_MAP_ARTIFACT)?;
        let item_map: HashMap<String, usize> = self.read_json(ITEM_MAP_ARTIFACT)?;
        let user_factors: Array2<f32> = self.read_json(USER_FACTORS_ARTIFACT)?;
        let item_factors: Array2<f32> = self.read_json(ITEM_FACTORS_ARTIFACT)?;

        let store = LatentFactorStore::from_parts(user_map, item_map, user_factors, item_factors)?;
        info!(
            "Loaded latent artifacts: {} users, {} items, k = {}",
            store.user_count(),
            store.item_count(),
            store.dimensions()
        );
        Ok(store)
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path(name);
        let tmp = self.path(&format!("{}.tmp", name));

        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, value).map_err(|source| SourceError::Json {
            path: tmp.display().to_string(),
            source,
        })?;
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp, &path)?;
        debug!("Wrote {:?}", path);
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.path(name);
        let file = File::open(&path).map_err(|e| SourceError::Artifact {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SourceError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::train_latent_factors;
    use data_loader::{EventKind, InteractionEvent};

    fn catalog() -> Dataset {
        Dataset::from_activities(vec![
            Activity {
                id: "a1".to_string(),
                title: "Trail run".to_string(),
                tags: "running;outdoor".to_string(),
                city: Some("Austin".to_string()),
            },
            Activity {
                id: "a2".to_string(),
                title: "Sound bath".to_string(),
                tags: "relax;calm".to_string(),
                city: None,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_content_round_trip_keeps_scores() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(!store.content_exists());

        let index = CorpusIndex::build(catalog());
        store.save_content(&index).unwrap();
        assert!(store.content_exists());

        let profiles = vec![UserProfile {
            user_id: "u1".to_string(),
            interests: "running".to_string(),
        }];
        let loaded = store.load_content(profiles).unwrap();
        assert_eq!(loaded.catalog().activities(), index.catalog().activities());
        assert!(loaded.catalog().get_profile("u1").is_some());
        assert_eq!(loaded.content_scores("trail running"), index.content_scores("trail running"));
    }

    #[test]
    fn test_latent_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("models"));

        let events = vec![
            InteractionEvent::new("u1", "a1", EventKind::Like),
            InteractionEvent::new("u2", "a2", EventKind::Rate).with_rating(5),
        ];
        let factors = train_latent_factors(&events, &catalog(), 2).unwrap();
        store.save_latent(&factors).unwrap();
        assert!(store.latent_exists());

        let loaded = store.load_latent().unwrap();
        assert_eq!(loaded.user_factors(), factors.user_factors());
        assert_eq!(loaded.item_map(), factors.item_map());
    }

    #[test]
    fn test_missing_artifact_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactStore::new(dir.path()).load_latent().unwrap_err();
        match err {
            SourceError::Artifact { path, .. } => assert!(path.ends_with(USER_MAP_ARTIFACT)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_corrupt_artifact_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save_content(&CorpusIndex::build(catalog())).unwrap();
        fs::write(dir.path().join(VECTORS_ARTIFACT), "{not json").unwrap();

        let err = store.load_content(Vec::new()).unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
    }

    #[test]
    fn test_no_tmp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        ArtifactStore::new(dir.path())
            .save_content(&CorpusIndex::build(catalog()))
            .unwrap();
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
