//! Directory walking implementation using walkdir.

use super::{filter::ImageFilter, PhotoFile, PhotoScanner, ScanResult};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Leave out dot-files and everything under dot-directories
    pub skip_hidden: bool,
}

/// Recursive scanner with a file-name-sorted, reproducible walk order
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    pub fn new(config: ScanConfig) -> Self {
        let filter = ImageFilter::new().with_hidden(!config.skip_hidden);
        Self { config, filter }
    }

    fn io_error_for(path: &Path, err: walkdir::Error) -> ScanError {
        if err.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
            return ScanError::PermissionDenied {
                path: path.to_path_buf(),
            };
        }
        ScanError::ReadDirectory {
            path: path.to_path_buf(),
            source: std::io::Error::other(err.to_string()),
        }
    }
}

impl PhotoScanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &null_sender())
    }

    fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let skip_hidden = self.config.skip_hidden;
        let entries = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !skip_hidden || entry.depth() == 0 || !ImageFilter::is_hidden(entry.path())
            });

        let mut photos = Vec::new();
        let mut errors = Vec::new();

        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let error = Self::io_error_for(&path, e);
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() && !(entry.path_is_symlink() && path.is_file()) {
                continue;
            }
            if !self.filter.should_include(path) {
                continue;
            }

            match fs::metadata(path) {
                Ok(metadata) => {
                    let photo = PhotoFile {
                        path: path.to_path_buf(),
                        modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                        format: self.filter.get_format(path),
                    };
                    events.send(Event::Scan(ScanEvent::PhotoFound {
                        path: photo.path.clone(),
                    }));
                    photos.push(photo);
                }
                Err(e) => {
                    let error = ScanError::ReadDirectory {
                        path: path.to_path_buf(),
                        source: e,
                    };
                    events.send(Event::Scan(ScanEvent::Error {
                        path: path.to_path_buf(),
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_photos: photos.len(),
        }));

        Ok(ScanResult { photos, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        let mut file = File::create(path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
    }

    #[test]
    fn empty_directory_yields_no_photos() {
        let temp_dir = TempDir::new().unwrap();
        let result = WalkDirScanner::new(ScanConfig::default())
            .scan(temp_dir.path())
            .unwrap();

        assert!(result.photos.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn only_recognized_extensions_are_returned() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("a.jpg"));
        touch(&temp_dir.path().join("b.PNG"));
        touch(&temp_dir.path().join("c.heic"));
        touch(&temp_dir.path().join("notes.txt"));

        let result = WalkDirScanner::new(ScanConfig::default())
            .scan(temp_dir.path())
            .unwrap();

        let names: Vec<_> = result
            .photos
            .iter()
            .map(|p| p.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG"]);
    }

    #[test]
    fn walk_order_is_sorted_and_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("2024").join("june");
        fs::create_dir_all(&nested).unwrap();
        touch(&temp_dir.path().join("z.jpg"));
        touch(&nested.join("b.jpg"));
        touch(&nested.join("a.jpg"));

        let result = WalkDirScanner::new(ScanConfig::default())
            .scan(temp_dir.path())
            .unwrap();

        let relative: Vec<PathBuf> = result
            .photos
            .iter()
            .map(|p| p.path.strip_prefix(temp_dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("2024/june/a.jpg"),
                PathBuf::from("2024/june/b.jpg"),
                PathBuf::from("z.jpg"),
            ]
        );
    }

    #[test]
    fn hidden_directories_are_walked_unless_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let hidden = temp_dir.path().join(".thumbnails");
        fs::create_dir(&hidden).unwrap();
        touch(&hidden.join("cache.jpg"));
        touch(&temp_dir.path().join("visible.jpg"));

        let default_scan = WalkDirScanner::new(ScanConfig::default())
            .scan(temp_dir.path())
            .unwrap();
        assert_eq!(default_scan.photos.len(), 2);

        let skipping = WalkDirScanner::new(ScanConfig { skip_hidden: true })
            .scan(temp_dir.path())
            .unwrap();
        assert_eq!(skipping.photos.len(), 1);
        assert!(skipping.photos[0].path.ends_with("visible.jpg"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = WalkDirScanner::new(ScanConfig::default())
            .scan(Path::new("/nonexistent/path/12345"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
