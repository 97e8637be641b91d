//! Parsing options and configuration.

/// Options for the block parser and inline formatter.
///
/// The defaults accept every extension of the markup dialect.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Recognize `->text<-` centered spans
    pub centering: bool,

    /// Recognize the `>> text` centered line prefix
    pub line_prefix_centering: bool,

    /// Recognize `{color}text` color tags and the `{/}` reset
    pub colors: bool,

    /// Tag the paragraphs below a level-1 heading with their role
    pub tag_roles: bool,

    /// Normalize the source to Unicode NFC before parsing
    pub normalize_unicode: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable centered spans.
    pub fn with_centering(mut self, enabled: bool) -> Self {
        self.centering = enabled;
        self
    }

    /// Enable or disable the `>> ` line prefix.
    pub fn with_line_prefix_centering(mut self, enabled: bool) -> Self {
        self.line_prefix_centering = enabled;
        self
    }

    /// Enable or disable color tags.
    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colors = enabled;
        self
    }

    /// Enable or disable role tagging.
    pub fn with_role_tagging(mut self, enabled: bool) -> Self {
        self.tag_roles = enabled;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Plain markdown only: no centering, colors or roles.
    pub fn plain() -> Self {
        Self {
            centering: false,
            line_prefix_centering: false,
            colors: false,
            tag_roles: false,
            normalize_unicode: true,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            centering: true,
            line_prefix_centering: true,
            colors: true,
            tag_roles: true,
            normalize_unicode: true,
        }
    }
}
