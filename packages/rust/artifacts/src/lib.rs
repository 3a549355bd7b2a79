//! Per-topic artifact store.
//!
//! Every stage hands its output to the next through flat files. Each topic
//! gets its own directory under the output root:
//!
//! ```text
//! <output_dir>/<topic-slug>-<topic-hash>/
//! ├── manifest.json
//! ├── scraped_content.txt
//! ├── internal_links.txt
//! ├── meta_details.json
//! ├── outline.txt
//! └── generated_article.txt
//! ```
//!
//! The directory name carries a short hash of the exact topic, so topics
//! that slugify alike ("C++ basics", "C basics") never share files.
//!
//! Files are written atomically (temp file, then rename) and every write
//! records a SHA-256 checksum in `manifest.json`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};
use uuid::Uuid;

use seoscribe_shared::{Result, SeoScribeError, slugify};

/// Current manifest schema version.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

const MANIFEST_FILE: &str = "manifest.json";

/// Hex digits of the topic hash appended to the directory name.
const TOPIC_HASH_LEN: usize = 8;

const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// The fixed set of files a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ScrapedContent,
    InternalLinks,
    MetaDetails,
    Outline,
    GeneratedArticle,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::ScrapedContent,
        ArtifactKind::InternalLinks,
        ArtifactKind::MetaDetails,
        ArtifactKind::Outline,
        ArtifactKind::GeneratedArticle,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::ScrapedContent => "scraped_content.txt",
            ArtifactKind::InternalLinks => "internal_links.txt",
            ArtifactKind::MetaDetails => "meta_details.json",
            ArtifactKind::Outline => "outline.txt",
            ArtifactKind::GeneratedArticle => "generated_article.txt",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Metadata for a single artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
    pub written_at: DateTime<Utc>,
}

/// `manifest.json` contents for one topic directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: Uuid,
    pub topic: String,
    pub slug: String,
    pub tool_version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Keyed by file name.
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactMeta>,
}

// ---------------------------------------------------------------------------
// ArtifactStore
// ---------------------------------------------------------------------------

/// Handle on one topic's artifact directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    topic: String,
    slug: String,
    run_id: Uuid,
}

impl ArtifactStore {
    /// Open (creating if needed) the directory for `topic` under `root`.
    pub fn open(root: impl AsRef<Path>, topic: &str) -> Result<Self> {
        let slug = topic_dir_name(topic);
        let dir = root.as_ref().join(&slug);
        std::fs::create_dir_all(&dir).map_err(|e| SeoScribeError::io(&dir, e))?;

        debug!(path = %dir.display(), "artifact directory ready");

        Ok(Self {
            dir,
            topic: topic.to_string(),
            slug,
            run_id: Uuid::now_v7(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    pub fn exists(&self, kind: ArtifactKind) -> bool {
        self.path(kind).is_file()
    }

    /// Atomically replace an artifact and record it in the manifest.
    #[instrument(skip_all, fields(artifact = %kind, bytes = content.len()))]
    pub fn write(&self, kind: ArtifactKind, content: &str) -> Result<ArtifactMeta> {
        let filename = kind.file_name();
        let target = self.path(kind);
        let temp = self.dir.join(format!(".{filename}.tmp"));

        std::fs::write(&temp, content).map_err(|e| SeoScribeError::io(&temp, e))?;
        std::fs::rename(&temp, &target).map_err(|e| SeoScribeError::io(&target, e))?;

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());

        let meta = ArtifactMeta {
            filename: filename.to_string(),
            sha256: format!("{:x}", hasher.finalize()),
            size_bytes: content.len(),
            written_at: Utc::now(),
        };

        self.record(meta.clone())?;
        debug!(path = %target.display(), "wrote artifact");

        Ok(meta)
    }

    /// Write a value as pretty-printed JSON.
    pub fn write_json<T: Serialize>(&self, kind: ArtifactKind, value: &T) -> Result<ArtifactMeta> {
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            SeoScribeError::validation(format!("JSON serialization failed: {e}"))
        })?;
        self.write(kind, &json)
    }

    /// Delete an artifact and drop its manifest entry.
    ///
    /// Returns `false` if there was nothing to remove.
    #[instrument(skip_all, fields(artifact = %kind))]
    pub fn remove(&self, kind: ArtifactKind) -> Result<bool> {
        let path = self.path(kind);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(SeoScribeError::io(&path, e)),
        }

        if let Some(mut manifest) = self.manifest()? {
            manifest.artifacts.remove(kind.file_name());
            manifest.updated_at = Utc::now();
            self.save_manifest(&manifest)?;
        }

        debug!(path = %path.display(), "removed artifact");
        Ok(true)
    }

    /// Read an artifact. `None` if it was never written.
    pub fn read(&self, kind: ArtifactKind) -> Result<Option<String>> {
        let path = self.path(kind);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SeoScribeError::io(&path, e)),
        }
    }

    /// Read and deserialize a JSON artifact.
    pub fn read_json<T: DeserializeOwned>(&self, kind: ArtifactKind) -> Result<Option<T>> {
        let Some(content) = self.read(kind)? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SeoScribeError::parse(format!("invalid {kind}: {e}")))
    }

    /// Load `manifest.json`, if any artifact has been written.
    pub fn manifest(&self) -> Result<Option<RunManifest>> {
        let path = self.dir.join(MANIFEST_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SeoScribeError::io(&path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SeoScribeError::validation(format!("invalid manifest.json: {e}")))
    }

    /// Upsert one artifact entry, creating the manifest on first write.
    fn record(&self, meta: ArtifactMeta) -> Result<()> {
        let now = Utc::now();
        let mut manifest = match self.manifest()? {
            Some(existing) if existing.schema_version == MANIFEST_SCHEMA_VERSION => existing,
            _ => RunManifest {
                schema_version: MANIFEST_SCHEMA_VERSION,
                run_id: self.run_id,
                topic: self.topic.clone(),
                slug: self.slug.clone(),
                tool_version: TOOL_VERSION.to_string(),
                created_at: now,
                updated_at: now,
                artifacts: BTreeMap::new(),
            },
        };

        manifest.run_id = self.run_id;
        manifest.topic.clone_from(&self.topic);
        manifest.updated_at = now;
        manifest.artifacts.insert(meta.filename.clone(), meta);

        self.save_manifest(&manifest)
    }

    fn save_manifest(&self, manifest: &RunManifest) -> Result<()> {
        let path = self.dir.join(MANIFEST_FILE);
        let temp = self.dir.join(format!(".{MANIFEST_FILE}.tmp"));
        let json = serde_json::to_string_pretty(manifest).map_err(|e| {
            SeoScribeError::validation(format!("JSON serialization failed: {e}"))
        })?;
        std::fs::write(&temp, json).map_err(|e| SeoScribeError::io(&temp, e))?;
        std::fs::rename(&temp, &path).map_err(|e| SeoScribeError::io(&path, e))?;

        Ok(())
    }
}

/// `<slug>-<hash>` where the hash covers the exact, untrimmed topic.
fn topic_dir_name(topic: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(topic.as_bytes()));
    format!("{}-{}", slugify(topic), &digest[..TOPIC_HASH_LEN])
}
