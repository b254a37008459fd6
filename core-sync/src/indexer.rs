//! Group Indexer
//!
//! Walks the local media tree once and classifies files into logical asset
//! groups: original/edited × photo/video, keyed by directory plus the
//! normalized base name (lowercased, case-insensitive `_edited` suffix
//! stripped).
//!
//! Groups are emitted in the order their key is first encountered during the
//! walk. The walk is sorted by file name, so the order is deterministic and
//! stable for a given tree — this ordering is the meaning of a checkpoint
//! index, and resume is only safe because of it.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

const EDITED_SUFFIX: &str = "_edited";

/// A logical unit of replacement: up to four related files in one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAssetGroup {
    /// Directory all member files live in
    pub directory: PathBuf,

    /// Base name (original casing of the first file that created the group)
    pub base_name: String,

    pub original_photo: Option<PathBuf>,
    pub edited_photo: Option<PathBuf>,
    pub original_video: Option<PathBuf>,
    pub edited_video: Option<PathBuf>,
}

impl LocalAssetGroup {
    fn new(directory: PathBuf, base_name: String) -> Self {
        Self {
            directory,
            base_name,
            original_photo: None,
            edited_photo: None,
            original_video: None,
            edited_video: None,
        }
    }

    /// Member files in upload priority order: edited photo, original photo,
    /// edited video, original video
    pub fn files_in_priority_order(&self) -> Vec<&PathBuf> {
        [
            self.edited_photo.as_ref(),
            self.original_photo.as_ref(),
            self.edited_video.as_ref(),
            self.original_video.as_ref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// The (edited, original) pair used for relinking, photos preferred over
    /// videos when the group holds both
    pub fn primary_pair(&self) -> (Option<&PathBuf>, Option<&PathBuf>) {
        if self.edited_photo.is_some() || self.original_photo.is_some() {
            (self.edited_photo.as_ref(), self.original_photo.as_ref())
        } else {
            (self.edited_video.as_ref(), self.original_video.as_ref())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.original_photo.is_none()
            && self.edited_photo.is_none()
            && self.original_video.is_none()
            && self.edited_video.is_none()
    }
}

/// True when `stem` ends with `_edited` in any casing
fn strip_edited_suffix(stem: &str) -> (&str, bool) {
    if stem.len() >= EDITED_SUFFIX.len() {
        if let Some(tail) = stem.get(stem.len() - EDITED_SUFFIX.len()..) {
            if tail.eq_ignore_ascii_case(EDITED_SUFFIX) {
                return (&stem[..stem.len() - EDITED_SUFFIX.len()], true);
            }
        }
    }
    (stem, false)
}

/// Scan the tree under `root` into asset groups, in walk order
pub fn scan(
    root: &Path,
    photo_exts: &HashSet<String>,
    video_exts: &HashSet<String>,
) -> Vec<LocalAssetGroup> {
    let mut groups: Vec<LocalAssetGroup> = Vec::new();
    let mut index: HashMap<(PathBuf, String), usize> = HashMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let ext = ext.to_lowercase();
        let is_photo = photo_exts.contains(&ext);
        let is_video = video_exts.contains(&ext);
        if !is_photo && !is_video {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let (base, is_edited) = strip_edited_suffix(stem);

        let directory = path.parent().unwrap_or(root).to_path_buf();
        let key = (directory.clone(), base.to_lowercase());

        let group_idx = *index.entry(key).or_insert_with(|| {
            groups.push(LocalAssetGroup::new(directory, base.to_string()));
            groups.len() - 1
        });
        let group = &mut groups[group_idx];

        let slot = match (is_photo, is_edited) {
            (true, true) => &mut group.edited_photo,
            (true, false) => &mut group.original_photo,
            (false, true) => &mut group.edited_video,
            (false, false) => &mut group.original_video,
        };

        // First discovered file wins; a second candidate for the same slot
        // (e.g. same stem with two photo extensions) is silently ignored.
        if slot.is_none() {
            *slot = Some(path.to_path_buf());
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn photo_exts() -> HashSet<String> {
        exts(&["jpg", "jpeg", "heic"])
    }

    fn video_exts() -> HashSet<String> {
        exts(&["mov", "mp4"])
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_four_slot_group() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "a_edited.jpg");
        touch(tmp.path(), "a.mov");
        touch(tmp.path(), "a_edited.mov");

        let groups = scan(tmp.path(), &photo_exts(), &video_exts());

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.base_name, "a");
        assert!(group.original_photo.is_some());
        assert!(group.edited_photo.is_some());
        assert!(group.original_video.is_some());
        assert!(group.edited_video.is_some());
    }

    #[test]
    fn test_grouping_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "A.JPG");
        touch(tmp.path(), "a_EDITED.jpg");

        let groups = scan(tmp.path(), &photo_exts(), &video_exts());

        assert_eq!(groups.len(), 1);
        assert!(groups[0].original_photo.is_some());
        assert!(groups[0].edited_photo.is_some());
    }

    #[test]
    fn test_first_discovered_slot_wins() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.heic");
        touch(tmp.path(), "a.jpg");

        let groups = scan(tmp.path(), &photo_exts(), &video_exts());

        assert_eq!(groups.len(), 1);
        // Sorted walk visits a.heic before a.jpg; the later candidate for the
        // same slot is ignored.
        assert_eq!(
            groups[0].original_photo.as_ref().unwrap(),
            &tmp.path().join("a.heic")
        );
    }

    #[test]
    fn test_unrecognized_extensions_ignored() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "a.txt");
        touch(tmp.path(), "notes.md");

        let groups = scan(tmp.path(), &photo_exts(), &video_exts());

        assert_eq!(groups.len(), 1);
        assert!(groups[0].edited_photo.is_none());
    }

    #[test]
    fn test_groups_keyed_per_directory() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        touch(tmp.path(), "a.jpg");
        touch(&sub, "a.jpg");

        let groups = scan(tmp.path(), &photo_exts(), &video_exts());

        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_scan_order_is_stable() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.jpg");
        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "c.jpg");

        let first: Vec<String> = scan(tmp.path(), &photo_exts(), &video_exts())
            .into_iter()
            .map(|g| g.base_name)
            .collect();
        let second: Vec<String> = scan(tmp.path(), &photo_exts(), &video_exts())
            .into_iter()
            .map(|g| g.base_name)
            .collect();

        assert_eq!(first, vec!["a", "b", "c"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_priority_order_and_primary_pair() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "a_edited.jpg");
        touch(tmp.path(), "a.mov");

        let groups = scan(tmp.path(), &photo_exts(), &video_exts());
        let group = &groups[0];

        let ordered: Vec<&PathBuf> = group.files_in_priority_order();
        assert_eq!(ordered.len(), 3);
        assert_eq!(ordered[0], group.edited_photo.as_ref().unwrap());
        assert_eq!(ordered[1], group.original_photo.as_ref().unwrap());
        assert_eq!(ordered[2], group.original_video.as_ref().unwrap());

        // Photos take the primary role when both kinds exist
        let (edited, original) = group.primary_pair();
        assert_eq!(edited, group.edited_photo.as_ref());
        assert_eq!(original, group.original_photo.as_ref());
    }

    #[test]
    fn test_video_only_group_primary_pair() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "clip.mov");
        touch(tmp.path(), "clip_edited.mov");

        let groups = scan(tmp.path(), &photo_exts(), &video_exts());
        let (edited, original) = groups[0].primary_pair();

        assert_eq!(edited, groups[0].edited_video.as_ref());
        assert_eq!(original, groups[0].original_video.as_ref());
    }
}
