use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{ModelError, ModelResult};

/// File type of an uploaded logo.
///
/// PDFs need a conversion step on the rendering backend before compositing; bitmaps are used as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogoKind {
    Pdf,
    Png,
    Jpg,
}

impl LogoKind {
    /// Whether the backend must convert the logo first.
    pub fn is_pdf(&self) -> bool {
        matches!(self, LogoKind::Pdf)
    }

    /// Decide the kind from the logo URL and an optional hint (file extension or mime subtype).
    ///
    /// The hint wins when it parses; otherwise the URL extension is used.
    /// Returns `None` when neither carries a known kind.
    pub fn detect(url: &str, hint: Option<&str>) -> Option<Self> {
        if let Some(kind) = hint.and_then(|h| h.parse().ok()) {
            return Some(kind);
        }
        let path = url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit_once('.').and_then(|(_, ext)| ext.parse().ok())
    }
}

impl FromStr for LogoKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        let norm = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match norm.as_str() {
            "pdf" | "application/pdf" => Ok(LogoKind::Pdf),
            "png" | "image/png" => Ok(LogoKind::Png),
            "jpg" | "jpeg" | "image/jpeg" => Ok(LogoKind::Jpg),
            _ => Err(ModelError::UnknownLogoKind(s.to_string())),
        }
    }
}

impl fmt::Display for LogoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogoKind::Pdf => "pdf",
            LogoKind::Png => "png",
            LogoKind::Jpg => "jpg",
        };
        f.write_str(s)
    }
}
