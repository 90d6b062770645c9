//! Sorting the files of an input directory into their roles.

use glob::{glob_with, MatchOptions, Pattern, PatternError};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("input {0:?} is not an existing directory")]
    NotADirectory(PathBuf),

    #[error("input path {0:?} is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error("no segmentation file (name containing \"Segmentation\") in {0:?}")]
    MissingSegmentation(PathBuf),

    #[error("no translation table (name containing \"Transforms\") in {0:?}")]
    MissingTranslations(PathBuf),

    #[error("could not list {path:?}: {source}")]
    Pattern {
        path: PathBuf,
        #[source]
        source: PatternError,
    },
}

/// What a file in the input directory is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Segmentation,
    Translations,
    Ignored,
    Image,
}

/// Decides the role of a file from its name. The checks run in a fixed
/// order, so `Segmentation_Transforms.nii` is a segmentation.
pub fn file_role(file_name: &str) -> FileRole {
    if file_name.contains("Segmentation") {
        FileRole::Segmentation
    } else if file_name.contains("Transforms") {
        FileRole::Translations
    } else if file_name.contains("Volume3D") {
        FileRole::Ignored
    } else {
        FileRole::Image
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputLayout {
    pub segmentation: PathBuf,
    pub translations: PathBuf,
    /// Reference images in listing order.
    pub images: Vec<PathBuf>,
    pub ignored: Vec<PathBuf>,
}

/// Lists `dir` (sorted by path, hidden files and subdirectories skipped) and
/// assigns each file its role.
///
/// When two files claim the segmentation or translation role, the later one
/// wins.
pub fn scan_input_dir(dir: &Path) -> Result<InputLayout, LayoutError> {
    if !dir.is_dir() {
        return Err(LayoutError::NotADirectory(dir.to_path_buf()));
    }
    let dir_str = dir
        .to_str()
        .ok_or_else(|| LayoutError::NonUtf8Path(dir.to_path_buf()))?;
    let pattern = format!("{}/*", Pattern::escape(dir_str));
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let paths = glob_with(&pattern, options).map_err(|source| LayoutError::Pattern {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut segmentation: Option<PathBuf> = None;
    let mut translations: Option<PathBuf> = None;
    let mut images = Vec::new();
    let mut ignored = Vec::new();

    for path in paths.filter_map(Result::ok) {
        if !path.is_file() {
            debug!("Skipping {} (not a file)", path.display());
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_owned(),
            None => {
                debug!("Skipping {} (name is not UTF-8)", path.display());
                continue;
            }
        };
        match file_role(&name) {
            FileRole::Segmentation => replace_role(&mut segmentation, path, "segmentation"),
            FileRole::Translations => replace_role(&mut translations, path, "translation table"),
            FileRole::Ignored => ignored.push(path),
            FileRole::Image => images.push(path),
        }
    }

    Ok(InputLayout {
        segmentation: segmentation.ok_or_else(|| LayoutError::MissingSegmentation(dir.into()))?,
        translations: translations.ok_or_else(|| LayoutError::MissingTranslations(dir.into()))?,
        images,
        ignored,
    })
}

fn replace_role(slot: &mut Option<PathBuf>, path: PathBuf, role: &str) {
    if let Some(previous) = slot.as_ref() {
        warn!(
            "Found more than one {}; using {} instead of {}",
            role,
            path.display(),
            previous.display()
        );
    }
    *slot = Some(path);
}

/// `<input>_output`, next to the input directory.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let trimmed: PathBuf = input.components().collect();
    let mut name = trimmed.into_os_string();
    name.push("_output");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn roles_follow_the_name_checks_in_order() {
        assert_eq!(file_role("Segmentation.nii"), FileRole::Segmentation);
        assert_eq!(file_role("case1_Transforms.csv"), FileRole::Translations);
        assert_eq!(file_role("Volume3D.nii.gz"), FileRole::Ignored);
        assert_eq!(file_role("cine_004.nii"), FileRole::Image);
        assert_eq!(file_role("Segmentation_Transforms.nii"), FileRole::Segmentation);
        // matching is case sensitive
        assert_eq!(file_role("segmentation.nii"), FileRole::Image);
    }

    #[test]
    fn scan_sorts_files_into_roles() {
        let dir = TempDir::new().unwrap();
        for name in [
            "img_b.nii",
            "Segmentation.nii",
            "Transforms.csv",
            "Volume3D.nii",
            "img_a.nii",
            ".DS_Store",
        ] {
            touch(dir.path(), name);
        }
        fs::create_dir(dir.path().join("nested")).unwrap();

        let layout = scan_input_dir(dir.path()).unwrap();
        assert_eq!(layout.segmentation, dir.path().join("Segmentation.nii"));
        assert_eq!(layout.translations, dir.path().join("Transforms.csv"));
        assert_eq!(
            layout.images,
            vec![dir.path().join("img_a.nii"), dir.path().join("img_b.nii")]
        );
        assert_eq!(layout.ignored, vec![dir.path().join("Volume3D.nii")]);
    }

    #[test]
    fn later_duplicate_role_wins() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "A_Segmentation.nii");
        touch(dir.path(), "B_Segmentation.nii");
        touch(dir.path(), "Transforms.csv");
        let layout = scan_input_dir(dir.path()).unwrap();
        assert_eq!(layout.segmentation, dir.path().join("B_Segmentation.nii"));
        assert!(layout.images.is_empty());
    }

    #[test]
    fn missing_roles_are_reported() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Transforms.csv");
        assert!(matches!(
            scan_input_dir(dir.path()),
            Err(LayoutError::MissingSegmentation(_))
        ));

        touch(dir.path(), "Segmentation.nii");
        fs::remove_file(dir.path().join("Transforms.csv")).unwrap();
        assert!(matches!(
            scan_input_dir(dir.path()),
            Err(LayoutError::MissingTranslations(_))
        ));
    }

    #[test]
    fn input_must_be_a_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "file.nii");
        assert!(matches!(
            scan_input_dir(&dir.path().join("file.nii")),
            Err(LayoutError::NotADirectory(_))
        ));
        assert!(matches!(
            scan_input_dir(&dir.path().join("absent")),
            Err(LayoutError::NotADirectory(_))
        ));
    }

    #[test]
    fn output_dir_sits_next_to_the_input() {
        assert_eq!(
            default_output_dir(Path::new("/data/case7")),
            PathBuf::from("/data/case7_output")
        );
        assert_eq!(
            default_output_dir(Path::new("/data/case7/")),
            PathBuf::from("/data/case7_output")
        );
        assert_eq!(
            default_output_dir(Path::new("case7")),
            PathBuf::from("case7_output")
        );
    }
}
