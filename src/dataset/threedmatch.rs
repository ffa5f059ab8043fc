//! 3DMatch-style dataset loader.
//!
//! Expects the fragment layout used by the 3DMatch reconstruction datasets:
//!
//! ```text
//! <root>/<split>/<sequence>/fragments/cloud_bin_<N>.ply
//! <root>/<split>/<sequence>/poses/cloud_bin_<N>.txt
//! ```
//!
//! Each pose file carries one header line followed by a 4×4 row-major world
//! transform. Clouds without a pose file are skipped with a warning, as are
//! whole sequences that fail to load; a sample is one sequence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Matrix4;
use serde::Deserialize;
use serde_json::Value;

use super::{ply, DatasetLoader};
use crate::core::types::{Sample, Transform};
use crate::error::{Error, Result};

/// Configuration for the 3DMatch loader.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThreeDMatchConfig {
    /// Dataset root directory.
    pub root: PathBuf,
    /// Split subdirectory under the root.
    pub split: String,
    /// Sequence whitelist; empty loads every sequence in the split, sorted.
    pub sequences: Vec<String>,
    /// Maximum number of sequences to load (0 = unlimited).
    pub max_sequences: usize,
    /// Maximum number of point clouds per sequence (0 = unlimited).
    pub max_point_clouds: usize,
}

impl Default for ThreeDMatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("datasets/3dmatch"),
            split: "train".to_string(),
            sequences: Vec::new(),
            max_sequences: 0,
            max_point_clouds: 0,
        }
    }
}

/// Loader for 3DMatch fragment sequences.
pub struct ThreeDMatchLoader {
    config: ThreeDMatchConfig,
}

impl ThreeDMatchLoader {
    /// Create a loader; the root directory must exist.
    pub fn new(config: ThreeDMatchConfig) -> Result<Self> {
        if !config.root.exists() {
            return Err(Error::Dataset(format!(
                "3DMatch root directory does not exist: {}",
                config.root.display()
            )));
        }
        Ok(Self { config })
    }

    /// Create a loader from a JSON capability config.
    pub fn from_config(config: &Value) -> Result<Self> {
        let config: ThreeDMatchConfig = serde_json::from_value(config.clone())
            .map_err(|e| Error::Config(format!("3dmatch: {e}")))?;
        Self::new(config)
    }

    fn sequence_paths(&self, split_path: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        if !self.config.sequences.is_empty() {
            for name in &self.config.sequences {
                let path = split_path.join(name);
                if path.is_dir() {
                    paths.push(path);
                } else {
                    log::warn!("Sequence directory missing: {}", path.display());
                }
            }
        } else {
            for entry in fs::read_dir(split_path)? {
                let entry = entry?;
                if entry.path().is_dir() {
                    paths.push(entry.path());
                }
            }
            paths.sort();
        }

        Ok(paths)
    }

    fn load_sequence(&self, sequence_path: &Path) -> Result<Sample> {
        let fragments_dir = sequence_path.join("fragments");
        let poses_dir = sequence_path.join("poses");

        if !fragments_dir.is_dir() {
            return Err(Error::Dataset(format!(
                "missing fragments directory: {}",
                fragments_dir.display()
            )));
        }
        if !poses_dir.is_dir() {
            return Err(Error::Dataset(format!(
                "missing poses directory: {}",
                poses_dir.display()
            )));
        }

        // Index clouds by fragment number so load order is numeric, not lexical
        let mut indexed_clouds: BTreeMap<usize, PathBuf> = BTreeMap::new();
        for entry in fs::read_dir(&fragments_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem,
                None => continue,
            };
            let index = match stem.strip_prefix("cloud_bin_").and_then(|s| s.parse::<usize>().ok()) {
                Some(index) => index,
                None => continue,
            };
            indexed_clouds.insert(index, path);
        }

        if indexed_clouds.is_empty() {
            return Err(Error::Dataset(format!(
                "no cloud_bin_*.ply files found in {}",
                fragments_dir.display()
            )));
        }

        let mut point_clouds = Vec::new();
        let mut world_transforms = Vec::new();

        for (index, cloud_path) in indexed_clouds {
            if self.config.max_point_clouds > 0 && point_clouds.len() >= self.config.max_point_clouds
            {
                break;
            }

            let pose_path = poses_dir.join(format!("cloud_bin_{index}.txt"));
            if !pose_path.is_file() {
                log::warn!(
                    "Skipping cloud {} due to missing pose file",
                    cloud_path.display()
                );
                continue;
            }

            point_clouds.push(ply::load_ply(&cloud_path)?);
            world_transforms.push(load_pose(&pose_path)?);
        }

        log::info!(
            "Sequence '{}' loaded with {} point clouds",
            sequence_path.file_name().and_then(|n| n.to_str()).unwrap_or("?"),
            point_clouds.len()
        );

        Sample::new(point_clouds, world_transforms)
    }
}

impl DatasetLoader for ThreeDMatchLoader {
    fn name(&self) -> &str {
        "3dmatch"
    }

    fn load_samples(&self) -> Result<Vec<Sample>> {
        let split_path = self.config.root.join(&self.config.split);
        if !split_path.is_dir() {
            return Err(Error::Dataset(format!(
                "3DMatch split directory does not exist: {}",
                split_path.display()
            )));
        }

        log::info!("Loading 3DMatch dataset from {}", split_path.display());

        let mut samples = Vec::new();
        for sequence_path in self.sequence_paths(&split_path)? {
            if self.config.max_sequences > 0 && samples.len() >= self.config.max_sequences {
                break;
            }

            match self.load_sequence(&sequence_path) {
                Ok(sample) if sample.is_empty() => {
                    log::warn!("Sequence '{}' is empty, skipping", sequence_path.display());
                }
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    log::warn!(
                        "Skipping sequence '{}' due to error: {e}",
                        sequence_path.display()
                    );
                }
            }
        }

        log::info!("Loaded {} sample(s)", samples.len());
        Ok(samples)
    }
}

/// Parse a pose file: one header line, then a 4×4 row-major matrix.
fn load_pose(path: &Path) -> Result<Transform> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Dataset(format!("failed to read pose file {}: {e}", path.display())))?;
    let mut lines = contents.lines();

    if lines.next().is_none() {
        return Err(Error::Dataset(format!(
            "pose file is empty: {}",
            path.display()
        )));
    }

    let mut matrix = Matrix4::identity();
    for row in 0..4 {
        let line = lines.next().ok_or_else(|| {
            Error::Dataset(format!("pose file has incomplete matrix: {}", path.display()))
        })?;
        let mut values = line.split_whitespace();
        for col in 0..4 {
            let token = values.next().ok_or_else(|| {
                Error::Dataset(format!(
                    "pose value missing at row {row}, col {col} in {}",
                    path.display()
                ))
            })?;
            matrix[(row, col)] = token.parse::<f64>().map_err(|_| {
                Error::Dataset(format!(
                    "failed to parse pose value at row {row}, col {col} in {}",
                    path.display()
                ))
            })?;
        }
    }

    Ok(Transform::from_matrix(matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_file(path: &Path, contents: &str) {
        let mut file = fs::File::create(path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    fn write_fragment(dir: &Path, index: usize, points: &[(f64, f64, f64)]) {
        let mut ply = String::from("ply\nformat ascii 1.0\n");
        ply.push_str(&format!("element vertex {}\n", points.len()));
        ply.push_str("property float x\nproperty float y\nproperty float z\nend_header\n");
        for (x, y, z) in points {
            ply.push_str(&format!("{x} {y} {z}\n"));
        }
        write_file(&dir.join(format!("cloud_bin_{index}.ply")), &ply);
    }

    fn write_pose(dir: &Path, index: usize, translation_x: f64) {
        let pose = format!(
            "cloud_bin_{index}\n1 0 0 {translation_x}\n0 1 0 0\n0 0 1 0\n0 0 0 1\n"
        );
        write_file(&dir.join(format!("cloud_bin_{index}.txt")), &pose);
    }

    fn build_sequence(root: &Path, split: &str, name: &str, clouds: usize) {
        let sequence = root.join(split).join(name);
        let fragments = sequence.join("fragments");
        let poses = sequence.join("poses");
        fs::create_dir_all(&fragments).unwrap();
        fs::create_dir_all(&poses).unwrap();

        for index in 0..clouds {
            write_fragment(&fragments, index, &[(index as f64, 0.0, 0.0), (0.0, 1.0, 0.0)]);
            write_pose(&poses, index, index as f64);
        }
    }

    #[test]
    fn test_load_samples() {
        let dir = tempfile::tempdir().unwrap();
        build_sequence(dir.path(), "train", "seq-01", 3);
        build_sequence(dir.path(), "train", "seq-02", 2);

        let loader = ThreeDMatchLoader::from_config(&json!({
            "name": "3dmatch",
            "root": dir.path(),
        }))
        .unwrap();

        let samples = loader.load_samples().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].len(), 3);
        assert_eq!(samples[1].len(), 2);

        // Poses parsed row-major with translation in the last column
        let pose = samples[0].world_transforms()[2];
        assert_eq!(pose.translation().x, 2.0);
    }

    #[test]
    fn test_missing_pose_skips_cloud() {
        let dir = tempfile::tempdir().unwrap();
        build_sequence(dir.path(), "train", "seq-01", 3);
        fs::remove_file(
            dir.path()
                .join("train/seq-01/poses/cloud_bin_1.txt"),
        )
        .unwrap();

        let loader = ThreeDMatchLoader::new(ThreeDMatchConfig {
            root: dir.path().to_path_buf(),
            ..ThreeDMatchConfig::default()
        })
        .unwrap();

        let samples = loader.load_samples().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].len(), 2);
    }

    #[test]
    fn test_max_caps_and_whitelist() {
        let dir = tempfile::tempdir().unwrap();
        build_sequence(dir.path(), "train", "seq-01", 4);
        build_sequence(dir.path(), "train", "seq-02", 4);

        let loader = ThreeDMatchLoader::new(ThreeDMatchConfig {
            root: dir.path().to_path_buf(),
            sequences: vec!["seq-02".to_string(), "seq-99".to_string()],
            max_point_clouds: 2,
            ..ThreeDMatchConfig::default()
        })
        .unwrap();

        let samples = loader.load_samples().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].len(), 2);
    }

    #[test]
    fn test_missing_root_fails() {
        let result = ThreeDMatchLoader::new(ThreeDMatchConfig {
            root: PathBuf::from("/nonexistent/3dmatch"),
            ..ThreeDMatchConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_broken_sequence_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        build_sequence(dir.path(), "train", "seq-01", 2);
        // Sequence without fragments/ or poses/
        fs::create_dir_all(dir.path().join("train/seq-broken")).unwrap();

        let loader = ThreeDMatchLoader::new(ThreeDMatchConfig {
            root: dir.path().to_path_buf(),
            ..ThreeDMatchConfig::default()
        })
        .unwrap();

        let samples = loader.load_samples().unwrap();
        assert_eq!(samples.len(), 1);
    }
}
