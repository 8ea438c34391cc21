use core::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wifimap_common::{Band, Sample};
use wifimap_core::metrics::RSSI_DBM;

pub const DEFAULT_PROJECT: &str = "default";

#[derive(Debug)]
pub enum StoreError {
    UnknownProject(String),
    InvalidName(String),
    InvalidFloorplan(String),
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UnknownProject(id) => write!(f, "unknown project '{}'", id),
            StoreError::InvalidName(name) => write!(f, "invalid project name '{}'", name),
            StoreError::InvalidFloorplan(reason) => write!(f, "invalid floor plan: {}", reason),
            StoreError::Io(err) => write!(f, "storage error: {}", err),
            StoreError::Serialization(err) => write!(f, "snapshot error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err)
    }
}

/// Image the samples of a project are placed on. Its size is the default
/// heat map surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floorplan {
    pub content_type: String,
    pub width: f64,
    pub height: f64,
    /// Kept in a file next to the snapshot, not inside it
    #[serde(skip)]
    pub image: Vec<u8>,
}

impl Floorplan {
    fn validate(&self) -> Result<(), StoreError> {
        if self.image.is_empty() {
            return Err(StoreError::InvalidFloorplan("empty image".to_string()));
        }
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(StoreError::InvalidFloorplan(format!(
                "size {}x{} must be positive",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floorplan: Option<Floorplan>,
}

impl Project {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            samples: Vec::new(),
            floorplan: None,
        }
    }
}

#[derive(Deserialize)]
struct Snapshot {
    projects: Vec<Project>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    projects: &'a [Project],
}

/// Flat sample list written by the first versions of the survey tool
#[derive(Deserialize)]
struct LegacySample {
    id: u64,
    x: f64,
    y: f64,
    #[serde(default)]
    rssi: Option<f64>,
    #[serde(default)]
    band: Option<String>,
    #[serde(default)]
    ssid: Option<String>,
    #[serde(default, rename = "createdAt")]
    created_at: Option<String>,
}

impl From<LegacySample> for Sample {
    fn from(legacy: LegacySample) -> Self {
        let mut sample = Sample {
            id: legacy.id,
            x: legacy.x,
            y: legacy.y,
            band: legacy.band.and_then(|b| b.parse::<Band>().ok()),
            ssid: legacy.ssid,
            created_at: legacy.created_at,
            ..Sample::default()
        };
        sample.metrics.insert(RSSI_DBM.to_string(), legacy.rssi);
        sample
    }
}

/// Lowercase, alphanumerics kept, everything else folded into single dashes
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "project".to_string()
    } else {
        slug.to_string()
    }
}

/// Survey projects and their samples.
///
/// The `default` project always exists. When a snapshot path is set every
/// mutation rewrites the whole file, and a mutation whose write fails is
/// undone in memory as well. Floor plan images live in a directory next to
/// the snapshot, one file per project.
pub struct ProjectStore {
    projects: Vec<Project>,
    path: Option<PathBuf>,
}

impl ProjectStore {
    pub fn in_memory() -> Self {
        Self {
            projects: vec![Project::new(DEFAULT_PROJECT, "Default")],
            path: None,
        }
    }

    /// Opens the snapshot at `path`, creating an empty store when the file
    /// doesn't exist yet. A legacy flat sample list is imported into the
    /// default project.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let mut store = Self::in_memory();
        store.path = Some(path.to_path_buf());

        if !path.exists() {
            log::info!("No snapshot at {}, starting empty", path.display());
            return Ok(store);
        }

        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(store);
        }

        match serde_json::from_str::<Snapshot>(&text) {
            Ok(snapshot) => {
                store.projects = snapshot.projects;
            }
            Err(err) => {
                let legacy: Vec<LegacySample> = serde_json::from_str(&text).map_err(|_| err)?;
                log::info!("Importing {} legacy samples into '{}'", legacy.len(), DEFAULT_PROJECT);
                store.projects[0].samples = legacy.into_iter().map(Sample::from).collect();
            }
        }

        if store.find(DEFAULT_PROJECT).is_none() {
            store.projects.insert(0, Project::new(DEFAULT_PROJECT, "Default"));
        }

        for index in 0..store.projects.len() {
            if store.projects[index].floorplan.is_none() {
                continue;
            }
            let Some(image_path) = store.floorplan_path(&store.projects[index].id) else {
                continue;
            };

            let project = &mut store.projects[index];
            match fs::read(&image_path) {
                Ok(image) => {
                    if let Some(floorplan) = project.floorplan.as_mut() {
                        floorplan.image = image;
                    }
                }
                Err(err) => {
                    log::warn!(
                        "Floor plan of '{}' unreadable at {}: {}",
                        project.id,
                        image_path.display(),
                        err
                    );
                    project.floorplan = None;
                }
            }
        }

        log::info!("Loaded {} projects from {}", store.projects.len(), path.display());

        Ok(store)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    fn find(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    fn resolve_id(id: &str) -> &str {
        let id = id.trim();
        if id.is_empty() {
            DEFAULT_PROJECT
        } else {
            id
        }
    }

    pub fn project(&self, id: &str) -> Result<&Project, StoreError> {
        let id = Self::resolve_id(id);
        self.find(id).ok_or_else(|| StoreError::UnknownProject(id.to_string()))
    }

    pub fn create_project(&mut self, name: &str) -> Result<Project, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        let base = slugify(name);
        let mut id = base.clone();
        let mut suffix = 2;
        while self.find(&id).is_some() {
            id = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        let project = Project::new(&id, name);
        self.projects.push(project.clone());
        if let Err(err) = self.save() {
            self.projects.pop();
            return Err(err);
        }

        log::info!("Created project '{}'", id);

        Ok(project)
    }

    /// Appends `sample`. Its id is bumped past the last id in the project so
    /// ids stay unique when samples arrive within the same millisecond.
    pub fn add_sample(&mut self, project: &str, mut sample: Sample) -> Result<Sample, StoreError> {
        let index = self.index_of(project)?;

        let samples = &mut self.projects[index].samples;
        sample.id = sample.id.max(samples.iter().map(|s| s.id).max().unwrap_or(0) + 1);
        samples.push(sample.clone());

        if let Err(err) = self.save() {
            self.projects[index].samples.pop();
            return Err(err);
        }

        Ok(sample)
    }

    pub fn reset(&mut self, project: &str) -> Result<usize, StoreError> {
        let index = self.index_of(project)?;
        let removed = std::mem::take(&mut self.projects[index].samples);

        if let Err(err) = self.save() {
            self.projects[index].samples = removed;
            return Err(err);
        }

        Ok(removed.len())
    }

    /// Replaces the floor plan of `project`, or removes it when `floorplan`
    /// is `None`.
    pub fn set_floorplan(&mut self, project: &str, floorplan: Option<Floorplan>) -> Result<(), StoreError> {
        let index = self.index_of(project)?;
        if let Some(floorplan) = &floorplan {
            floorplan.validate()?;
        }

        let id = self.projects[index].id.clone();
        let image_path = self.floorplan_path(&id);

        // The image goes next to its final name first so a failed snapshot
        // write leaves the previous image in place
        let staged = match (&image_path, &floorplan) {
            (Some(image_path), Some(floorplan)) => {
                let staged = image_path.with_extension("tmp");
                if let Some(dir) = staged.parent() {
                    fs::create_dir_all(dir)?;
                }
                fs::write(&staged, &floorplan.image)?;
                Some(staged)
            }
            _ => None,
        };

        let previous = std::mem::replace(&mut self.projects[index].floorplan, floorplan);

        let committed = self.save().and_then(|()| match (&staged, &image_path) {
            (Some(staged), Some(image_path)) => fs::rename(staged, image_path).map_err(StoreError::from),
            _ => Ok(()),
        });

        if let Err(err) = committed {
            self.projects[index].floorplan = previous;
            if let Some(staged) = &staged {
                let _ = fs::remove_file(staged);
            }
            return Err(err);
        }

        if self.projects[index].floorplan.is_none() {
            if let Some(image_path) = &image_path {
                match fs::remove_file(image_path) {
                    Ok(()) => {}
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(err) => log::warn!("Could not remove {}: {}", image_path.display(), err),
                }
            }
        }

        log::info!(
            "Floor plan of '{}' {}",
            id,
            if self.projects[index].floorplan.is_some() { "updated" } else { "removed" }
        );

        Ok(())
    }

    fn index_of(&self, project: &str) -> Result<usize, StoreError> {
        let id = Self::resolve_id(project);
        self.projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::UnknownProject(id.to_string()))
    }

    /// `<snapshot>.floorplans/<project id>`
    fn floorplan_path(&self, id: &str) -> Option<PathBuf> {
        self.path
            .as_ref()
            .map(|path| path.with_extension("floorplans").join(id))
    }

    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let snapshot = SnapshotRef {
            projects: &self.projects,
        };
        let text = serde_json::to_string_pretty(&snapshot)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }
}
