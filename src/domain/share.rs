//! Share requests and their outcomes.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::asset::ResourceHandle;
use crate::library::CatalogEntry;

/// Fallback MIME type for audio
pub const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

/// Where the audio to share lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioRef {
    /// Payload bundled with the application
    Bundled(ResourceHandle),

    /// URL or filesystem path
    Location(String),
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioRef::Bundled(handle) => write!(f, "bundled {}", handle),
            AudioRef::Location(location) => write!(f, "{}", location),
        }
    }
}

/// Shape of a reference, deciding which strategies apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind {
    Bundled(ResourceHandle),
    RemoteUrl(String),
    LocalFile(PathBuf),
    Unsupported,
}

impl AudioRef {
    /// Classify the reference
    ///
    /// `http(s)://` is remote, `file://` and scheme-less strings are local
    /// paths, anything else (empty, other schemes) is unsupported.
    pub fn classify(&self) -> RefKind {
        match self {
            AudioRef::Bundled(handle) => RefKind::Bundled(*handle),
            AudioRef::Location(location) => {
                let location = location.trim();
                let lower = location.to_ascii_lowercase();

                if location.is_empty() {
                    RefKind::Unsupported
                } else if lower.starts_with("http://") || lower.starts_with("https://") {
                    RefKind::RemoteUrl(location.to_string())
                } else if lower.starts_with("file://") {
                    let path = &location["file://".len()..];
                    if path.is_empty() {
                        RefKind::Unsupported
                    } else {
                        RefKind::LocalFile(PathBuf::from(path))
                    }
                } else if location.contains("://") {
                    RefKind::Unsupported
                } else {
                    RefKind::LocalFile(PathBuf::from(location))
                }
            }
        }
    }
}

/// Infer an audio MIME type from a file name or URL
///
/// Query strings and fragments are ignored; unknown extensions map to
/// `audio/mpeg`.
pub fn infer_mime_type(name: &str) -> &'static str {
    let without_query = name.split(['?', '#']).next().unwrap_or(name);
    let extension = without_query
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        _ => DEFAULT_AUDIO_MIME,
    }
}

/// A single share action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub source: AudioRef,
    pub title: String,

    /// Explicit MIME type; inferred from the source when absent
    pub mime_type: Option<String>,

    pub author: Option<String>,
    pub description: Option<String>,
}

impl ShareRequest {
    pub fn new(source: AudioRef, title: impl Into<String>) -> Self {
        Self {
            source,
            title: title.into(),
            mime_type: None,
            author: None,
            description: None,
        }
    }

    /// Share a URL or path
    pub fn location(location: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(AudioRef::Location(location.into()), title)
    }

    /// Share a bundled catalog entry
    pub fn for_entry(entry: &CatalogEntry, handle: ResourceHandle) -> Self {
        let mut request = Self::new(AudioRef::Bundled(handle), entry.title.clone());
        if !entry.author.is_empty() {
            request.author = Some(entry.author.clone());
        }
        if !entry.description.is_empty() {
            request.description = Some(entry.description.clone());
        }
        request
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Explicit MIME type, or one inferred from `name`
    pub fn mime_type_for(&self, name: &str) -> String {
        self.mime_type
            .clone()
            .unwrap_or_else(|| infer_mime_type(name).to_string())
    }

    /// Descriptive message used when only text can be shared
    pub fn share_text(&self, link: &str) -> String {
        let mut text = match &self.author {
            Some(author) => format!("{} by {}", self.title, author),
            None => self.title.clone(),
        };
        if let Some(description) = &self.description {
            text.push_str("\n\n");
            text.push_str(description);
        }
        text.push_str("\n\n");
        text.push_str(link);
        text
    }
}

/// How a share was (or was attempted to be) delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareMethod {
    AssetDirect,
    AssetCopy,
    RemoteUrl,
    LocalFile,
    Unsupported,
}

impl ShareMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareMethod::AssetDirect => "asset_direct",
            ShareMethod::AssetCopy => "asset_copy",
            ShareMethod::RemoteUrl => "remote_url",
            ShareMethod::LocalFile => "local_file",
            ShareMethod::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ShareMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a share request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareOutcome {
    pub success: bool,
    pub method: ShareMethod,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl ShareOutcome {
    pub fn success(method: ShareMethod) -> Self {
        Self {
            success: true,
            method,
            error: None,
            destination_path: None,
            size_bytes: None,
        }
    }

    pub fn failure(method: ShareMethod, error: impl Into<String>) -> Self {
        Self {
            success: false,
            method,
            error: Some(error.into()),
            destination_path: None,
            size_bytes: None,
        }
    }

    pub fn with_destination(mut self, path: PathBuf) -> Self {
        self.destination_path = Some(path);
        self
    }

    pub fn with_size(mut self, size_bytes: Option<u64>) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// One-line summary for the debug log
    pub fn summary(&self) -> String {
        match (&self.error, self.success) {
            (_, true) => match &self.destination_path {
                Some(path) => format!("share succeeded via {} ({})", self.method, path.display()),
                None => format!("share succeeded via {}", self.method),
            },
            (Some(error), false) => format!("share failed via {}: {}", self.method, error),
            (None, false) => format!("share failed via {}", self.method),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_locations() {
        let handle = ResourceHandle::new(1);
        assert_eq!(AudioRef::Bundled(handle).classify(), RefKind::Bundled(handle));

        assert_eq!(
            AudioRef::Location("https://cdn.example.com/a.mp3".into()).classify(),
            RefKind::RemoteUrl("https://cdn.example.com/a.mp3".into())
        );
        assert_eq!(
            AudioRef::Location("HTTP://cdn.example.com/a.mp3".into()).classify(),
            RefKind::RemoteUrl("HTTP://cdn.example.com/a.mp3".into())
        );
        assert_eq!(
            AudioRef::Location("/data/clips/a.mp3".into()).classify(),
            RefKind::LocalFile(PathBuf::from("/data/clips/a.mp3"))
        );
        assert_eq!(
            AudioRef::Location("file:///data/clips/a.mp3".into()).classify(),
            RefKind::LocalFile(PathBuf::from("/data/clips/a.mp3"))
        );
    }

    #[test]
    fn test_classify_unsupported() {
        assert_eq!(AudioRef::Location("".into()).classify(), RefKind::Unsupported);
        assert_eq!(AudioRef::Location("   ".into()).classify(), RefKind::Unsupported);
        assert_eq!(
            AudioRef::Location("ftp://host/a.mp3".into()).classify(),
            RefKind::Unsupported
        );
        assert_eq!(AudioRef::Location("file://".into()).classify(), RefKind::Unsupported);
    }

    #[test]
    fn test_infer_mime_type() {
        assert_eq!(infer_mime_type("song.mp3"), "audio/mpeg");
        assert_eq!(infer_mime_type("song.wav"), "audio/wav");
        assert_eq!(infer_mime_type("SONG.M4A"), "audio/mp4");
        assert_eq!(infer_mime_type("https://x.io/a.aac?sig=abc"), "audio/aac");
        assert_eq!(infer_mime_type("song.ogg"), "audio/mpeg");
        assert_eq!(infer_mime_type("no_extension"), "audio/mpeg");
    }

    #[test]
    fn test_explicit_mime_type_wins() {
        let request = ShareRequest::location("a.wav", "A").with_mime_type("audio/x-custom");
        assert_eq!(request.mime_type_for("a.wav"), "audio/x-custom");

        let request = ShareRequest::location("a.wav", "A");
        assert_eq!(request.mime_type_for("a.wav"), "audio/wav");
    }

    #[test]
    fn test_share_text() {
        let request = ShareRequest::location("https://x.io/a.mp3", "Rain")
            .with_author("Field Recorder")
            .with_description("Soft rain");
        assert_eq!(
            request.share_text("https://x.io/a.mp3"),
            "Rain by Field Recorder\n\nSoft rain\n\nhttps://x.io/a.mp3"
        );

        let bare = ShareRequest::location("https://x.io/a.mp3", "Rain");
        assert_eq!(bare.share_text("https://x.io/a.mp3"), "Rain\n\nhttps://x.io/a.mp3");
    }

    #[test]
    fn test_for_entry_carries_metadata() {
        let entry = CatalogEntry::new("rain.wav", "Rain").with_author("Field Recorder");
        let request = ShareRequest::for_entry(&entry, ResourceHandle::new(3));

        assert_eq!(request.source, AudioRef::Bundled(ResourceHandle::new(3)));
        assert_eq!(request.author.as_deref(), Some("Field Recorder"));
        assert!(request.description.is_none());
    }

    #[test]
    fn test_method_serialization() {
        let json = serde_json::to_string(&ShareMethod::AssetCopy).unwrap();
        assert_eq!(json, "\"asset_copy\"");
        assert_eq!(ShareMethod::RemoteUrl.to_string(), "remote_url");
    }

    #[test]
    fn test_outcome_summary() {
        let ok = ShareOutcome::success(ShareMethod::AssetDirect);
        assert_eq!(ok.summary(), "share succeeded via asset_direct");

        let failed = ShareOutcome::failure(ShareMethod::LocalFile, "file does not exist");
        assert_eq!(failed.summary(), "share failed via local_file: file does not exist");
    }
}
