//! `Accept`-header format negotiation.
//!
//! Served documents are available in a fixed set of format groups per
//! endpoint. The declared `Accept` value is matched against the union of
//! every media type in the allowed groups by exact string comparison: no
//! quality values, no wildcard expansion, no case folding. `*/*` is an
//! ordinary member of the JSON group, not a pattern.
//!
//! The matcher sits behind [`FormatNegotiator`] so a stricter RFC 7231
//! implementation can replace [`AllowListNegotiator`] without touching
//! handlers.

use serde::Serialize;

/// A family of media types that share one serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatGroup {
    /// `text/x-shellscript`.
    Script,
    /// `application/json`, `text/plain`, `*/*`.
    Json,
    /// `application/yaml`, `text/yaml`.
    Yaml,
}

impl FormatGroup {
    /// The literal media types belonging to this group, in allow-list order.
    #[must_use]
    pub const fn media_types(self) -> &'static [&'static str] {
        match self {
            Self::Script => &["text/x-shellscript"],
            Self::Json => &["application/json", "text/plain", "*/*"],
            Self::Yaml => &["application/yaml", "text/yaml"],
        }
    }

    /// Whether `declared` is literally one of this group's media types.
    #[must_use]
    pub fn contains(self, declared: &str) -> bool {
        self.media_types().contains(&declared)
    }

    /// The serialization used for responses in this group.
    #[must_use]
    pub const fn wire_format(self) -> WireFormat {
        match self {
            Self::Script => WireFormat::Script,
            Self::Json => WireFormat::Json,
            Self::Yaml => WireFormat::Yaml,
        }
    }
}

/// A concrete response serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    Json,
    Yaml,
    Script,
}

impl WireFormat {
    /// The `Content-Type` sent with a response in this format.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
            Self::Script => "text/x-shellscript",
        }
    }
}

/// A rejected negotiation: the declared value is not in the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("unsupported content type '{requested_content_type}'")]
pub struct UnsupportedFormat {
    /// The `Accept` value as received (empty when the header was absent).
    pub requested_content_type: String,
    /// Every accepted media type, in allow-list order.
    pub allowed_content_types: Vec<&'static str>,
}

/// Decides which format, if any, a request may be served in.
pub trait FormatNegotiator: Send + Sync + 'static {
    /// Pick the wire format for `declared` among `allowed` groups.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`] when `declared` matches none of them.
    /// The caller must stop processing and respond with it.
    fn negotiate(
        &self,
        declared: &str,
        allowed: &[FormatGroup],
    ) -> Result<WireFormat, UnsupportedFormat>;
}

/// Literal allow-list membership, matching what cloud-init clients send.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowListNegotiator;

impl FormatNegotiator for AllowListNegotiator {
    fn negotiate(
        &self,
        declared: &str,
        allowed: &[FormatGroup],
    ) -> Result<WireFormat, UnsupportedFormat> {
        allowed
            .iter()
            .find(|group| group.contains(declared))
            .map(|group| group.wire_format())
            .ok_or_else(|| UnsupportedFormat {
                requested_content_type: declared.to_owned(),
                allowed_content_types: allowed
                    .iter()
                    .flat_map(|group| group.media_types().iter().copied())
                    .collect(),
            })
    }
}
