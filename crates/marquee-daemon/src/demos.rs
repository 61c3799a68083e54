//! Weighted ambient demo selection and video discovery

use std::path::{Path, PathBuf};

use rand::distributions::WeightedIndex;
use rand::prelude::*;

use marquee_core::prelude::*;
use marquee_core::{DemoCategory, DemoJob, SortAlgorithm};

use crate::config::RenderPaths;

/// Indices for the numbered `demo` program. 7 ("game of life") is listed
/// three times so it comes up more often than the rest.
pub const NUMBERED_DEMO_POOL: [u8; 6] = [4, 7, 7, 7, 9, 10];

/// Pick a demo category by its weight
pub fn choose_category<R: Rng + ?Sized>(rng: &mut R) -> DemoCategory {
    let weights = DemoCategory::ALL.map(|c| c.weight());
    match WeightedIndex::new(weights) {
        Ok(dist) => DemoCategory::ALL[dist.sample(rng)],
        // weights are constant and non-zero
        Err(_) => DemoCategory::Fractal,
    }
}

/// Select a complete demo job.
///
/// Fails with [`Error::NoMediaFound`] when the video category is drawn and
/// the media directory has nothing playable; callers re-select.
pub fn select_demo<R: Rng + ?Sized>(rng: &mut R, paths: &RenderPaths) -> Result<DemoJob> {
    let category = choose_category(rng);
    build_demo(category, rng, paths)
}

/// Fill in the per-category choices for `category`
pub fn build_demo<R: Rng + ?Sized>(
    category: DemoCategory,
    rng: &mut R,
    paths: &RenderPaths,
) -> Result<DemoJob> {
    let job = match category {
        DemoCategory::Sort => {
            let algorithm = *SortAlgorithm::ALL
                .choose(rng)
                .unwrap_or(&SortAlgorithm::Insertion);
            DemoJob::Sort { algorithm }
        }
        DemoCategory::Fractal => DemoJob::Fractal,
        DemoCategory::Video => {
            let videos = list_media(&paths.media_dir, &paths.media_extensions)?;
            let file = videos
                .choose(rng)
                .cloned()
                .ok_or_else(|| Error::no_media_found(&paths.media_dir))?;
            DemoJob::Video { file }
        }
        DemoCategory::Train => DemoJob::Train,
        DemoCategory::Numbered => {
            let index = *NUMBERED_DEMO_POOL.choose(rng).unwrap_or(&7);
            DemoJob::Numbered { index }
        }
    };
    Ok(job)
}

/// List the video files directly inside `dir`, sorted by path.
///
/// Extensions are compared case-insensitively. A missing or unreadable
/// directory, or one without a single match, is [`Error::NoMediaFound`].
pub fn list_media(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot read media dir {}: {}", dir.display(), e);
            return Err(Error::no_media_found(dir));
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, extensions))
        .collect();

    if files.is_empty() {
        return Err(Error::no_media_found(dir));
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn paths_with_media(dir: &Path) -> RenderPaths {
        RenderPaths {
            media_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_category_distribution_follows_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 16_000;
        let mut counts: HashMap<DemoCategory, u32> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(choose_category(&mut rng)).or_default() += 1;
        }

        for category in DemoCategory::ALL {
            let expected = draws * category.weight() / DemoCategory::TOTAL_WEIGHT;
            let got = counts.get(&category).copied().unwrap_or(0);
            let tolerance = expected / 10;
            assert!(
                got.abs_diff(expected) < tolerance,
                "{} drawn {} times, expected about {}",
                category,
                got,
                expected
            );
        }
    }

    #[test]
    fn test_numbered_pool_favours_game_of_life() {
        let sevens = NUMBERED_DEMO_POOL.iter().filter(|&&n| n == 7).count();
        assert_eq!(NUMBERED_DEMO_POOL.len(), 6);
        assert_eq!(sevens, 3);
    }

    #[test]
    fn test_build_numbered_uses_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            match build_demo(DemoCategory::Numbered, &mut rng, &RenderPaths::default()).unwrap() {
                DemoJob::Numbered { index } => assert!(NUMBERED_DEMO_POOL.contains(&index)),
                other => panic!("unexpected job {:?}", other),
            }
        }
    }

    #[test]
    fn test_list_media_filters_extensions() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.mp4"), b"").unwrap();
        fs::write(temp.path().join("a.GIF"), b"").unwrap();
        fs::write(temp.path().join("c.webm"), b"").unwrap();
        fs::write(temp.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(temp.path().join("nested.mp4")).unwrap();

        let exts = RenderPaths::default().media_extensions;
        let files = list_media(temp.path(), &exts).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.GIF", "b.mp4", "c.webm"]);
    }

    #[test]
    fn test_list_media_empty_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("readme.md"), b"").unwrap();
        let result = list_media(temp.path(), &["mp4".to_string()]);
        assert!(matches!(result, Err(Error::NoMediaFound { .. })));
    }

    #[test]
    fn test_list_media_missing_dir() {
        let result = list_media(Path::new("/nonexistent/marquee/videos"), &["mp4".to_string()]);
        assert!(matches!(result, Err(Error::NoMediaFound { .. })));
    }

    #[test]
    fn test_video_demo_without_media_fails() {
        let temp = TempDir::new().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let result = build_demo(DemoCategory::Video, &mut rng, &paths_with_media(temp.path()));
        assert!(matches!(result, Err(Error::NoMediaFound { .. })));
    }

    #[test]
    fn test_video_demo_picks_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("only.webm"), b"").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let job = build_demo(DemoCategory::Video, &mut rng, &paths_with_media(temp.path())).unwrap();
        assert_eq!(
            job,
            DemoJob::Video {
                file: temp.path().join("only.webm")
            }
        );
    }
}
