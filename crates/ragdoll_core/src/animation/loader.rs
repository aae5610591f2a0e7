// crates/ragdoll_core/src/animation/loader.rs
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::action::AnimationClip;

pub const MODELS_DIR: &str = "models";
pub const ANIMATIONS_DIR: &str = "animations";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Fbx,
    Glb,
    Gltf,
}

impl ModelFormat {
    pub const ALL: [ModelFormat; 3] = [ModelFormat::Fbx, ModelFormat::Glb, ModelFormat::Gltf];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "fbx" => Some(ModelFormat::Fbx),
            "glb" => Some(ModelFormat::Glb),
            "gltf" => Some(ModelFormat::Gltf),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ModelFormat::Fbx => "fbx",
            ModelFormat::Glb => "glb",
            ModelFormat::Gltf => "gltf",
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported asset extension `{0}`")]
    UnsupportedFormat(String),
    #[error("no loader registered for {0:?}")]
    NoLoader(ModelFormat),
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// A resolved animation asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Key the clip is stored under, and the state name that plays it.
    pub name: String,
    /// Relative to the asset root.
    pub path: String,
    pub ext: String,
}

impl AssetRef {
    pub fn format(&self) -> Result<ModelFormat, LoadError> {
        ModelFormat::from_extension(&self.ext).ok_or_else(|| LoadError::UnsupportedFormat(self.ext.clone()))
    }
}

/// Which model and clips an entity loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadModelsConfig {
    pub parent_dir: String,
    pub model_name: String,
    pub model_ext: ModelFormat,
    /// Defaults to `parent_dir`.
    #[serde(default)]
    pub anims_dir: Option<String>,
    /// The first entry is the default animation.
    #[serde(default)]
    pub anim_names: Vec<String>,
    /// Layered on top of the state-driven clip, toggled by hand.
    #[serde(default)]
    pub addit_anim_names: Vec<String>,
    /// Defaults to `model_ext`.
    #[serde(default)]
    pub anims_ext: Option<ModelFormat>,
}

impl LoadModelsConfig {
    pub fn new(parent_dir: &str, model_name: &str, model_ext: ModelFormat) -> Self {
        Self {
            parent_dir: parent_dir.to_string(),
            model_name: model_name.to_string(),
            model_ext,
            anims_dir: None,
            anim_names: Vec::new(),
            addit_anim_names: Vec::new(),
            anims_ext: None,
        }
    }

    pub fn anims_dir(&self) -> &str {
        self.anims_dir.as_deref().unwrap_or(&self.parent_dir)
    }

    pub fn anims_ext(&self) -> ModelFormat {
        self.anims_ext.unwrap_or(self.model_ext)
    }

    pub fn model_path(&self) -> String {
        let ext = self.model_ext.extension();
        format!("{MODELS_DIR}/{ext}/{}/{}.{ext}", self.parent_dir, self.model_name)
    }

    /// Accepts `name`, `dir/name` or `dir/name.ext`; the missing parts come
    /// from `anims_dir` and `anims_ext`.
    pub fn resolve_anim(&self, anim: &str) -> AssetRef {
        let (path, ext) = match anim.split_once('.') {
            Some((path, ext)) => (path, ext.to_string()),
            None => (anim, self.anims_ext().extension().to_string()),
        };
        let (dir, name) = match path.split_once('/') {
            Some((dir, name)) => (dir, name),
            None => (self.anims_dir(), path),
        };
        AssetRef {
            name: name.to_string(),
            path: format!("{ANIMATIONS_DIR}/{ext}/{dir}/{name}.{ext}"),
            ext,
        }
    }

    /// Clip key of the first animation.
    pub fn default_anim(&self) -> Option<String> {
        self.anim_names.first().map(|anim| self.resolve_anim(anim).name)
    }

    pub fn additive_names(&self) -> Vec<String> {
        self.addit_anim_names
            .iter()
            .map(|anim| self.resolve_anim(anim).name)
            .collect()
    }
}

/// Turns an animation asset into clip timing.
pub trait ClipLoader: Send + Sync {
    fn load_clip(&self, path: &Path, name: &str) -> Result<AnimationClip, LoadError>;
}

/// Sidecar next to each animation asset (`walk.fbx.ron`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipManifest {
    pub duration: f32,
}

/// Reads clip timing from RON sidecars instead of decoding meshes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn sidecar(path: &Path) -> PathBuf {
        let mut sidecar = OsString::from(path.as_os_str());
        sidecar.push(".ron");
        PathBuf::from(sidecar)
    }

    pub fn read_manifest(path: &Path) -> Result<ClipManifest, LoadError> {
        let sidecar = Self::sidecar(path);
        let text = fs::read_to_string(&sidecar).map_err(|source| LoadError::Io {
            path: sidecar.clone(),
            source,
        })?;
        ron::de::from_str(&text).map_err(|source| LoadError::Manifest { path: sidecar, source })
    }
}

impl ClipLoader for ManifestLoader {
    fn load_clip(&self, path: &Path, name: &str) -> Result<AnimationClip, LoadError> {
        let manifest = Self::read_manifest(path)?;
        Ok(AnimationClip::new(name, manifest.duration))
    }
}

type LoaderFactory = fn() -> Arc<dyn ClipLoader>;

fn manifest_loader() -> Arc<dyn ClipLoader> {
    Arc::new(ManifestLoader)
}

/// Format -> loader factory. Formats are a closed set; nothing is looked up
/// by constructed name.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    factories: HashMap<ModelFormat, LoaderFactory>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest loading for every known format.
    pub fn with_manifests() -> Self {
        let mut registry = Self::new();
        for format in ModelFormat::ALL {
            registry.register(format, manifest_loader);
        }
        registry
    }

    pub fn register(&mut self, format: ModelFormat, factory: LoaderFactory) {
        self.factories.insert(format, factory);
    }

    pub fn loader(&self, format: ModelFormat) -> Result<Arc<dyn ClipLoader>, LoadError> {
        self.factories
            .get(&format)
            .map(|factory| factory())
            .ok_or(LoadError::NoLoader(format))
    }
}

#[derive(Debug)]
pub enum LoadEvent {
    ClipLoaded { clip: AnimationClip, additive: bool },
    Failed { name: String, error: LoadError },
    AllLoaded { loaded: usize, failed: usize },
}

/// Receiving end of a background load.
pub struct LoadHandle {
    receiver: Receiver<LoadEvent>,
    worker: Option<JoinHandle<()>>,
}

impl LoadHandle {
    /// Next event, if one is ready. Never blocks.
    pub fn try_next(&self) -> Option<LoadEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until the worker is done and returns every remaining event.
    pub fn wait(mut self) -> Vec<LoadEvent> {
        let events = self.receiver.iter().collect();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("asset worker panicked");
            }
        }
        events
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished) && self.receiver.is_empty()
    }
}

struct Job {
    asset: AssetRef,
    additive: bool,
}

/// Loads every clip named by `config` on a worker thread, streaming one event
/// per clip and then `AllLoaded`.
pub fn spawn_load(config: &LoadModelsConfig, registry: &LoaderRegistry, root: impl Into<PathBuf>) -> LoadHandle {
    let root = root.into();
    let jobs: Vec<Job> = config
        .anim_names
        .iter()
        .map(|anim| (anim, false))
        .chain(config.addit_anim_names.iter().map(|anim| (anim, true)))
        .map(|(anim, additive)| Job {
            asset: config.resolve_anim(anim),
            additive,
        })
        .collect();
    let registry = registry.clone();
    tracing::debug!(
        model = %config.model_path(),
        clips = jobs.len(),
        root = %root.display(),
        "loading animations"
    );

    let (sender, receiver) = unbounded();
    let worker = thread::spawn(move || {
        let (mut loaded, mut failed) = (0, 0);
        for job in jobs {
            let result = job
                .asset
                .format()
                .and_then(|format| registry.loader(format))
                .and_then(|loader| loader.load_clip(&root.join(&job.asset.path), &job.asset.name));
            let event = match result {
                Ok(clip) => {
                    loaded += 1;
                    LoadEvent::ClipLoaded {
                        clip,
                        additive: job.additive,
                    }
                }
                Err(error) => {
                    failed += 1;
                    LoadEvent::Failed {
                        name: job.asset.name,
                        error,
                    }
                }
            };
            if sender.send(event).is_err() {
                return;
            }
        }
        let _ = sender.send(LoadEvent::AllLoaded { loaded, failed });
    });

    LoadHandle {
        receiver,
        worker: Some(worker),
    }
}
