//! MovieLens 100k retrieval and train/test loading.
//!
//! The archive is fetched once and unpacked under a data root:
//!
//! ```text
//! <root>/ml-100k.zip
//! <root>/ml-100k/u.data    all ratings, used for the id bounds
//! <root>/ml-100k/u1.base   training split
//! <root>/ml-100k/u1.test   evaluation split
//! ```

use crate::error::{DataLoadError, Result};
use crate::iter::RatingIter;
use crate::parser;
use crate::types::IdBounds;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Location of the MovieLens 100k archive
pub const MOVIELENS_100K_URL: &str = "https://files.grouplens.org/datasets/movielens/ml-100k.zip";

/// Directory created by unpacking the archive
pub const MOVIELENS_100K_DIR: &str = "ml-100k";

/// Paths of the rating files inside an unpacked MovieLens 100k directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieLensPaths {
    pub dir: PathBuf,
    pub all: PathBuf,
    pub train: PathBuf,
    pub test: PathBuf,
}

impl MovieLensPaths {
    /// Paths under `data_root/ml-100k`; nothing is checked on disk
    pub fn in_root(data_root: &Path) -> Self {
        let dir = data_root.join(MOVIELENS_100K_DIR);
        Self {
            all: dir.join("u.data"),
            train: dir.join("u1.base"),
            test: dir.join("u1.test"),
            dir,
        }
    }
}

/// Make sure MovieLens 100k is available under `data_root`
///
/// When the dataset directory already exists nothing is downloaded.
#[instrument]
pub fn ensure_movielens(data_root: &Path) -> Result<MovieLensPaths> {
    let paths = MovieLensPaths::in_root(data_root);
    if paths.dir.exists() {
        info!("Dataset already present at {}", paths.dir.display());
        return Ok(paths);
    }

    fs::create_dir_all(data_root)?;
    let archive = data_root.join(format!("{}.zip", MOVIELENS_100K_DIR));
    if !archive.exists() {
        download(MOVIELENS_100K_URL, &archive)?;
    }
    extract(&archive, data_root)?;
    Ok(paths)
}

/// Fetch `url` into `dest` with a blocking HTTP GET
pub fn download(url: &str, dest: &Path) -> Result<u64> {
    info!("Downloading {} to {}", url, dest.display());
    let download_err = |e: reqwest::Error| DataLoadError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;

    let bytes = write_via_partial(dest, |file| {
        response.copy_to(file).map_err(download_err)
    })?;

    info!("Downloaded {} bytes", bytes);
    Ok(bytes)
}

/// Fill `<dest>.part` with `fill`, then rename it to `dest`
///
/// The partial file is removed when `fill` or the rename fails.
fn write_via_partial<F>(dest: &Path, fill: F) -> Result<u64>
where
    F: FnOnce(&mut File) -> Result<u64>,
{
    let partial = dest.with_extension("part");
    let written = File::create(&partial)
        .map_err(DataLoadError::from)
        .and_then(|mut file| fill(&mut file))
        .and_then(|bytes| {
            fs::rename(&partial, dest)?;
            Ok(bytes)
        });

    if written.is_err() && partial.exists() {
        let _ = fs::remove_file(&partial);
    }
    written
}

/// Unpack a zip archive into `into`
pub fn extract(archive: &Path, into: &Path) -> Result<()> {
    let archive_err = |e: zip::result::ZipError| DataLoadError::Archive {
        path: archive.display().to_string(),
        reason: e.to_string(),
    };

    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(archive_err)?;
    zip.extract(into).map_err(archive_err)?;

    info!("Extracted {} entries into {}", zip.len(), into.display());
    Ok(())
}

/// Train and test iterators plus the embedding sizes covering both
pub struct RatingSplit {
    pub train: RatingIter,
    pub test: RatingIter,
    pub bounds: IdBounds,
}

/// Load the train/test split of an unpacked dataset
///
/// Both files are parsed in parallel. Bounds come from `u.data` when it is
/// present, otherwise from the union of the two splits.
#[instrument(skip(paths), fields(dir = %paths.dir.display()))]
pub fn load_split(paths: &MovieLensPaths, batch_size: usize) -> Result<RatingSplit> {
    let (train, test) = rayon::join(
        || parser::parse_ratings(&paths.train),
        || parser::parse_ratings(&paths.test),
    );
    let train = train?;
    let test = test?;

    if train.is_empty() {
        return Err(DataLoadError::EmptyDataset {
            file: paths.train.display().to_string(),
        });
    }

    let train = RatingIter::new(train, batch_size)?;
    let test = RatingIter::new(test, batch_size)?;

    let bounds = if paths.all.exists() {
        parser::max_id(&paths.all)?
    } else {
        train.bounds().union(test.bounds())
    };

    info!(
        "Loaded {} train and {} test ratings ({} users, {} items)",
        train.len(),
        test.len(),
        bounds.num_users,
        bounds.num_items
    );

    Ok(RatingSplit {
        train,
        test,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_split(root: &Path, with_all: bool) -> MovieLensPaths {
        let paths = MovieLensPaths::in_root(root);
        fs::create_dir_all(&paths.dir).unwrap();
        fs::write(&paths.train, "1\t1\t5\t0\n2\t3\t4\t0\n3\t2\t1\t0\n").unwrap();
        fs::write(&paths.test, "1\t4\t3\t0\n").unwrap();
        if with_all {
            fs::write(&paths.all, "1\t1\t5\t0\n9\t3\t4\t0\n3\t20\t1\t0\n").unwrap();
        }
        paths
    }

    #[test]
    fn test_paths_layout() {
        let paths = MovieLensPaths::in_root(Path::new("data"));
        assert_eq!(paths.dir, Path::new("data/ml-100k"));
        assert_eq!(paths.train, Path::new("data/ml-100k/u1.base"));
        assert_eq!(paths.test, Path::new("data/ml-100k/u1.test"));
    }

    #[test]
    fn test_existing_dir_skips_download() {
        let root = tempfile::tempdir().unwrap();
        let expected = write_split(root.path(), false);

        let paths = ensure_movielens(root.path()).unwrap();
        assert_eq!(paths, expected);
        assert!(!root.path().join("ml-100k.zip").exists());
    }

    fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, body) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_existing_archive_is_extracted() {
        let root = tempfile::tempdir().unwrap();
        write_archive(
            &root.path().join("ml-100k.zip"),
            &[
                ("ml-100k/u.data", "1\t1\t5\t0\n2\t3\t4\t0\n7\t2\t1\t0\n"),
                ("ml-100k/u1.base", "1\t1\t5\t0\n2\t3\t4\t0\n"),
                ("ml-100k/u1.test", "7\t2\t1\t0\n"),
            ],
        );

        let paths = ensure_movielens(root.path()).unwrap();
        assert!(paths.train.is_file());
        assert!(paths.test.is_file());

        let split = load_split(&paths, 1).unwrap();
        assert_eq!(split.train.len(), 2);
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.bounds, IdBounds::new(8, 4));
    }

    #[test]
    fn test_corrupt_archive() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("ml-100k.zip"), "not a zip archive").unwrap();

        let err = ensure_movielens(root.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::Archive { .. }));
    }

    #[test]
    fn test_failed_write_leaves_no_partial_file() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("ml-100k.zip");

        let err = write_via_partial(&dest, |file| {
            file.write_all(b"half a body")?;
            Err(DataLoadError::Download {
                url: MOVIELENS_100K_URL.to_string(),
                reason: "connection reset".to_string(),
            })
        })
        .unwrap_err();

        assert!(matches!(err, DataLoadError::Download { .. }));
        assert!(!dest.exists());
        assert!(!root.path().join("ml-100k.part").exists());
    }

    #[test]
    fn test_completed_write_is_renamed() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("ml-100k.zip");

        let bytes = write_via_partial(&dest, |file| {
            file.write_all(b"body")?;
            Ok(4)
        })
        .unwrap();

        assert_eq!(bytes, 4);
        assert_eq!(fs::read(&dest).unwrap(), b"body");
        assert!(!root.path().join("ml-100k.part").exists());
    }

    #[test]
    fn test_load_split_bounds_from_all() {
        let root = tempfile::tempdir().unwrap();
        let paths = write_split(root.path(), true);

        let split = load_split(&paths, 2).unwrap();
        assert_eq!(split.train.len(), 3);
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.bounds, IdBounds::new(10, 21));
    }

    #[test]
    fn test_load_split_bounds_from_splits() {
        let root = tempfile::tempdir().unwrap();
        let paths = write_split(root.path(), false);

        let split = load_split(&paths, 2).unwrap();
        assert_eq!(split.bounds, IdBounds::new(4, 5));
    }

    #[test]
    fn test_empty_train_split() {
        let root = tempfile::tempdir().unwrap();
        let paths = write_split(root.path(), false);
        fs::write(&paths.train, "not a rating\n").unwrap();

        let err = load_split(&paths, 2).err().unwrap();
        assert!(matches!(err, DataLoadError::EmptyDataset { .. }));
    }
}
