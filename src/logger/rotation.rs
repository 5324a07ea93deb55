//! Log file rotation and retention.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use jiff::Zoned;
use jiff::civil::Date;

use crate::logger::config::{RotationConfig, RotationStrategy};
use crate::logger::error::LoggerError;

/// Decides when to rotate and moves the active file out of the way.
pub struct RotationManager {
    config: RotationConfig,
    opened_on: Date,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            opened_on: Zoned::now().date(),
        }
    }

    pub fn should_rotate(&self, current_size: u64) -> bool {
        match self.config.strategy {
            RotationStrategy::Never => false,
            RotationStrategy::Size => current_size >= self.config.max_size,
            RotationStrategy::Daily => Zoned::now().date() != self.opened_on,
        }
    }

    /// Renames `active` to a timestamped sibling, optionally gzips it, and
    /// prunes rotated files beyond `max_files`.
    pub fn rotate(&mut self, active: &Path) -> Result<PathBuf, LoggerError> {
        let mut rotated = rotated_path(active, &Zoned::now().strftime("%Y%m%d_%H%M%S").to_string());
        let mut attempt = 1;
        while rotated.exists() {
            rotated = rotated_path(
                active,
                &format!("{}_{attempt}", Zoned::now().strftime("%Y%m%d_%H%M%S")),
            );
            attempt += 1;
        }

        if active.exists() {
            fs::rename(active, &rotated)?;
            if self.config.compress {
                rotated = gzip_file(&rotated)?;
            }
        }

        self.opened_on = Zoned::now().date();
        prune_rotated(active, self.config.max_files)?;
        Ok(rotated)
    }
}

/// `logs/app.log` + `20250101_120000` -> `logs/app.20250101_120000.log`
fn rotated_path(active: &Path, stamp: &str) -> PathBuf {
    let stem = active.file_stem().unwrap_or_default().to_string_lossy();
    let name = match active.extension() {
        Some(ext) => format!("{stem}.{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{stamp}"),
    };
    active.with_file_name(name)
}

/// Compresses `path` into `path.gz` and removes the original.
pub fn gzip_file(path: &Path) -> Result<PathBuf, LoggerError> {
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);

    let mut input = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(gz_path)
}

/// Keeps the newest `max_files` rotated siblings of `active`.
///
/// Rotated names embed a sortable timestamp, so name order is age order.
fn prune_rotated(active: &Path, max_files: usize) -> Result<(), LoggerError> {
    let dir = match active.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let stem = active
        .file_stem()
        .ok_or_else(|| LoggerError::rotation("Log path has no file name"))?
        .to_string_lossy()
        .into_owned();
    let prefix = format!("{stem}.");

    let mut rotated: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.as_path() != active
                && path
                    .file_name()
                    .map(|name| name.to_string_lossy().starts_with(&prefix))
                    .unwrap_or(false)
        })
        .collect();
    rotated.sort();

    let excess = rotated.len().saturating_sub(max_files);
    for old in rotated.into_iter().take(excess) {
        fs::remove_file(old)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use proptest::prelude::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn size_config(max_size: u64, max_files: usize, compress: bool) -> RotationConfig {
        RotationConfig {
            strategy: RotationStrategy::Size,
            max_size,
            max_files,
            compress,
        }
    }

    #[test]
    fn test_never_strategy_does_not_rotate() {
        let manager = RotationManager::new(RotationConfig {
            strategy: RotationStrategy::Never,
            ..Default::default()
        });
        assert!(!manager.should_rotate(u64::MAX));
    }

    #[test]
    fn test_daily_strategy_waits_for_date_change() {
        let manager = RotationManager::new(RotationConfig {
            strategy: RotationStrategy::Daily,
            ..Default::default()
        });
        assert!(!manager.should_rotate(u64::MAX));
    }

    #[test]
    fn test_rotated_path_keeps_extension() {
        assert_eq!(
            rotated_path(Path::new("logs/app.log"), "20250101_120000"),
            PathBuf::from("logs/app.20250101_120000.log")
        );
        assert_eq!(
            rotated_path(Path::new("app"), "20250101_120000"),
            PathBuf::from("app.20250101_120000")
        );
    }

    #[test]
    fn test_rotate_moves_active_file() {
        let dir = tempdir().unwrap();
        let active = dir.path().join("app.log");
        fs::write(&active, "line\n").unwrap();

        let mut manager = RotationManager::new(size_config(1, 5, false));
        let rotated = manager.rotate(&active).unwrap();

        assert!(!active.exists());
        assert_eq!(fs::read_to_string(rotated).unwrap(), "line\n");
    }

    #[test]
    fn test_rotate_with_compression() {
        let dir = tempdir().unwrap();
        let active = dir.path().join("app.log");
        fs::write(&active, "compressed content").unwrap();

        let mut manager = RotationManager::new(size_config(1, 5, true));
        let rotated = manager.rotate(&active).unwrap();

        assert_eq!(rotated.extension().unwrap(), "gz");
        let mut decoded = String::new();
        GzDecoder::new(File::open(&rotated).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "compressed content");
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = tempdir().unwrap();
        let active = dir.path().join("app.log");
        fs::write(&active, "").unwrap();
        for day in 1..=4 {
            fs::write(dir.path().join(format!("app.2025010{day}_000000.log")), "").unwrap();
        }
        fs::write(dir.path().join("other.log"), "").unwrap();

        prune_rotated(&active, 2).unwrap();

        assert!(active.exists());
        assert!(dir.path().join("other.log").exists());
        assert!(!dir.path().join("app.20250101_000000.log").exists());
        assert!(!dir.path().join("app.20250102_000000.log").exists());
        assert!(dir.path().join("app.20250103_000000.log").exists());
        assert!(dir.path().join("app.20250104_000000.log").exists());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn property_size_rotation_triggers_at_threshold(
            current in 0u64..10_000_000,
            max in 1u64..10_000_000
        ) {
            let manager = RotationManager::new(size_config(max, 5, false));
            prop_assert_eq!(manager.should_rotate(current), current >= max);
        }
    }
}
