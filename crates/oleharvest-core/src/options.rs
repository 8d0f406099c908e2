//! Extraction options

/// Default bound on container nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Path segment marking the embedded-object area of an OOXML package
pub const EMBEDDINGS_SEGMENT: &str = "embeddings";

/// Options for an extraction run
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Containers nested deeper than this are kept as opaque artifacts
    pub max_depth: usize,
    /// Member-name suffixes that mark an archive member as a container
    /// candidate regardless of where it lives
    pub container_suffixes: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            container_suffixes: vec![".zip".to_string()],
        }
    }
}

impl ExtractOptions {
    /// Set the nesting limit
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether an OOXML package member should be classified
    ///
    /// Members under an `embeddings` segment (`word/embeddings/...`,
    /// `xl/embeddings/...`) and members with a container suffix qualify.
    #[must_use]
    pub fn is_package_candidate(&self, member: &str) -> bool {
        let lower = member.to_ascii_lowercase();
        lower
            .split('/')
            .any(|segment| segment == EMBEDDINGS_SEGMENT)
            || self
                .container_suffixes
                .iter()
                .any(|suffix| lower.ends_with(&suffix.to_ascii_lowercase()))
    }
}
