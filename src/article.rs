//! Practice texts: identity, file naming, the catalog shown in the picker,
//! and the sources texts are read from.

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{DaziError, Result};
use crate::text::target_len;

static BUNDLED_TEXTS: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets/texts");

/// Folder + file name pair identifying a text. The tracker treats it as
/// opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ArticleId {
    pub folder: String,
    pub file_name: String,
}

impl ArticleId {
    pub fn new(folder: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            file_name: file_name.into(),
        }
    }

    /// Identity used for text passed on the command line.
    pub fn custom() -> Self {
        Self::new("custom", "prompt")
    }

    /// Title without the numeric prefix and extension, falling back to the
    /// raw file name.
    pub fn title(&self) -> &str {
        parse_file_name(&self.file_name)
            .map(|(_, title)| title)
            .unwrap_or(&self.file_name)
    }

    pub fn is_empty(&self) -> bool {
        self.folder.is_empty() && self.file_name.is_empty()
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{} - {}", self.folder, self.title())
        }
    }
}

/// Parses `Folder/NN_title.txt` as given on the command line.
impl std::str::FromStr for ArticleId {
    type Err = DaziError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((folder, file)) if !folder.is_empty() && parse_file_name(file).is_some() => {
                Ok(Self::new(folder, file))
            }
            _ => Err(DaziError::InvalidArticleName {
                input: s.to_string(),
            }),
        }
    }
}

/// Splits `NN_title.txt` into `("NN", "title")`.
pub fn parse_file_name(file_name: &str) -> Option<(&str, &str)> {
    let stem = file_name.strip_suffix(".txt")?;
    let (number, title) = stem.split_once('_')?;
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) || title.is_empty() {
        return None;
    }
    Some((number, title))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleEntry {
    pub id: ArticleId,
    pub number: String,
    pub title: String,
    pub char_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub entries: Vec<ArticleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    pub folders: Vec<Folder>,
}

impl Catalog {
    /// Groups `(folder, file_name, text)` triples, skipping files that do
    /// not follow the `NN_title.txt` convention.
    pub fn from_texts<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        let entries = items
            .into_iter()
            .filter_map(|(folder, file_name, text)| {
                let (number, title) = parse_file_name(file_name)?;
                Some(ArticleEntry {
                    id: ArticleId::new(folder, file_name),
                    number: number.to_string(),
                    title: title.to_string(),
                    char_count: target_len(text),
                })
            })
            .sorted_by(|a, b| {
                a.id.folder.cmp(&b.id.folder).then_with(|| {
                    let an = a.number.parse::<u64>().unwrap_or(u64::MAX);
                    let bn = b.number.parse::<u64>().unwrap_or(u64::MAX);
                    an.cmp(&bn).then_with(|| a.title.cmp(&b.title))
                })
            });

        let chunks = entries.chunk_by(|e| e.id.folder.clone());
        let folders = chunks
            .into_iter()
            .map(|(name, group)| Folder {
                name,
                entries: group.collect(),
            })
            .collect();

        Self { folders }
    }

    pub fn is_empty(&self) -> bool {
        self.folders.iter().all(|f| f.entries.is_empty())
    }

    pub fn entries(&self) -> impl Iterator<Item = &ArticleEntry> {
        self.folders.iter().flat_map(|f| f.entries.iter())
    }

    pub fn find(&self, id: &ArticleId) -> Option<&ArticleEntry> {
        self.entries().find(|e| &e.id == id)
    }

    /// `(folder index, entry index)` of an article.
    pub fn position(&self, id: &ArticleId) -> Option<(usize, usize)> {
        self.folders.iter().enumerate().find_map(|(fi, folder)| {
            folder
                .entries
                .iter()
                .position(|e| &e.id == id)
                .map(|ei| (fi, ei))
        })
    }

    pub fn random(&self) -> Option<&ArticleEntry> {
        use rand::seq::IteratorRandom;
        self.entries().choose(&mut rand::thread_rng())
    }
}

/// Where practice texts come from.
pub trait ArticleSource {
    fn catalog(&self) -> Result<Catalog>;
    fn read(&self, id: &ArticleId) -> Result<String>;
}

/// Texts compiled into the binary from `assets/texts/<Folder>/<NN_title>.txt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledArticles;

impl ArticleSource for BundledArticles {
    fn catalog(&self) -> Result<Catalog> {
        let items = BUNDLED_TEXTS
            .dirs()
            .flat_map(|dir| {
                let folder = dir
                    .path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                dir.files().filter_map(move |file| {
                    let name = file.path().file_name()?.to_str()?;
                    Some((folder, name, file.contents_utf8()?))
                })
            })
            .collect::<Vec<_>>();

        Ok(Catalog::from_texts(items))
    }

    fn read(&self, id: &ArticleId) -> Result<String> {
        let path = Path::new(&id.folder).join(&id.file_name);
        let file = BUNDLED_TEXTS
            .get_file(&path)
            .ok_or_else(|| DaziError::not_found(&id.folder, &id.file_name))?;
        let text = file.contents_utf8().ok_or_else(|| DaziError::InvalidUtf8 {
            folder: id.folder.clone(),
            file_name: id.file_name.clone(),
        })?;
        Ok(text.to_string())
    }
}

/// Texts read from a directory laid out like the bundled assets.
#[derive(Debug, Clone)]
pub struct DirArticles {
    root: PathBuf,
}

impl DirArticles {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn sorted_entries(path: &Path) -> Result<Vec<fs::DirEntry>> {
        let mut entries = fs::read_dir(path)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());
        Ok(entries)
    }
}

impl ArticleSource for DirArticles {
    fn catalog(&self) -> Result<Catalog> {
        let mut texts: Vec<(String, String, String)> = Vec::new();

        for folder in Self::sorted_entries(&self.root)? {
            if !folder.file_type()?.is_dir() {
                continue;
            }
            let folder_name = folder.file_name().to_string_lossy().into_owned();
            for file in Self::sorted_entries(&folder.path())? {
                let file_name = file.file_name().to_string_lossy().into_owned();
                if parse_file_name(&file_name).is_none() {
                    continue;
                }
                match fs::read_to_string(file.path()) {
                    Ok(text) => texts.push((folder_name.clone(), file_name, text)),
                    Err(err) => warn!(path = %file.path().display(), %err, "skipping unreadable text"),
                }
            }
        }

        debug!(root = %self.root.display(), texts = texts.len(), "scanned text directory");
        Ok(Catalog::from_texts(
            texts
                .iter()
                .map(|(f, n, t)| (f.as_str(), n.as_str(), t.as_str())),
        ))
    }

    fn read(&self, id: &ArticleId) -> Result<String> {
        let path = self.root.join(&id.folder).join(&id.file_name);
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes).map_err(|_| DaziError::InvalidUtf8 {
                folder: id.folder.clone(),
                file_name: id.file_name.clone(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(DaziError::not_found(&id.folder, &id.file_name))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn parses_numbered_file_names() {
        assert_eq!(parse_file_name("01_hello.txt"), Some(("01", "hello")));
        assert_eq!(
            parse_file_name("12_with_underscores.txt"),
            Some(("12", "with_underscores"))
        );
    }

    #[test]
    fn rejects_other_file_names() {
        assert_eq!(parse_file_name("hello.txt"), None);
        assert_eq!(parse_file_name("ab_hello.txt"), None);
        assert_eq!(parse_file_name("01_hello.md"), None);
        assert_eq!(parse_file_name("01_.txt"), None);
        assert_eq!(parse_file_name("_x.txt"), None);
    }

    #[test]
    fn article_id_display_and_title() {
        let id = ArticleId::new("Linux", "03_pipes.txt");
        assert_eq!(id.title(), "pipes");
        assert_eq!(id.to_string(), "Linux - pipes");
        assert_eq!(ArticleId::default().to_string(), "-");
    }

    #[test]
    fn article_id_from_str() {
        let id: ArticleId = "Life/01_morning.txt".parse().unwrap();
        assert_eq!(id, ArticleId::new("Life", "01_morning.txt"));
        assert_matches!(
            "morning.txt".parse::<ArticleId>(),
            Err(DaziError::InvalidArticleName { .. })
        );
        assert_matches!(
            "/01_morning.txt".parse::<ArticleId>(),
            Err(DaziError::InvalidArticleName { .. })
        );
    }

    #[test]
    fn catalog_groups_and_sorts() {
        let catalog = Catalog::from_texts([
            ("Vue", "10_router.txt", "abc"),
            ("C", "2_pointers.txt", "pointer\ntext"),
            ("C", "10_macros.txt", "m"),
            ("C", "notes.md", "ignored"),
        ]);

        let names: Vec<_> = catalog.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["C", "Vue"]);

        let c = &catalog.folders[0];
        assert_eq!(c.entries.len(), 2);
        assert_eq!(c.entries[0].number, "2");
        assert_eq!(c.entries[0].char_count, 12);
        assert_eq!(c.entries[1].title, "macros");

        let pos = catalog.position(&ArticleId::new("Vue", "10_router.txt"));
        assert_eq!(pos, Some((1, 0)));
    }

    #[test]
    fn empty_catalog() {
        let catalog = Catalog::from_texts(std::iter::empty::<(&str, &str, &str)>());
        assert!(catalog.is_empty());
        assert!(catalog.random().is_none());
    }

    #[test]
    fn bundled_catalog_is_readable() {
        let source = BundledArticles;
        let catalog = source.catalog().unwrap();
        assert!(!catalog.is_empty());

        for entry in catalog.entries() {
            let text = source.read(&entry.id).unwrap();
            assert_eq!(target_len(&text), entry.char_count);
        }
    }

    #[test]
    fn bundled_missing_article() {
        assert_matches!(
            BundledArticles.read(&ArticleId::new("Nope", "01_missing.txt")),
            Err(DaziError::ArticleNotFound { .. })
        );
    }

    #[test]
    fn dir_source_scans_layout() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("Python");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("01_lists.txt"), "lists\nand tuples").unwrap();
        fs::write(folder.join("README"), "skip me").unwrap();
        fs::write(dir.path().join("stray.txt"), "not in a folder").unwrap();

        let source = DirArticles::new(dir.path());
        let catalog = source.catalog().unwrap();
        assert_eq!(catalog.folders.len(), 1);
        assert_eq!(catalog.folders[0].entries.len(), 1);

        let id = ArticleId::new("Python", "01_lists.txt");
        assert_eq!(source.read(&id).unwrap(), "lists\nand tuples");
        assert_eq!(catalog.find(&id).unwrap().char_count, 16);
    }

    #[test]
    fn dir_source_reports_missing_and_bad_utf8() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("C");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("01_bad.txt"), [0xff, 0xfe, 0x00]).unwrap();

        let source = DirArticles::new(dir.path());
        assert_matches!(
            source.read(&ArticleId::new("C", "01_bad.txt")),
            Err(DaziError::InvalidUtf8 { .. })
        );
        assert_matches!(
            source.read(&ArticleId::new("C", "02_missing.txt")),
            Err(DaziError::ArticleNotFound { .. })
        );
    }
}
