use base64::{display::Base64Display, prelude::BASE64_STANDARD, Engine};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Read the image at the given path and encode it as a data URI.
///
/// A missing or empty path yields `None`. A path that can't be read is an error.
pub fn encode_image(path: Option<&Path>) -> Result<Option<EncodedImage>, ImageEncodeError> {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(None);
    };
    let data = fs::read(path).map_err(|source| ImageEncodeError::Read { path: path.to_path_buf(), source })?;
    let mime = MimeType::from_path(path);
    debug!(path = %path.display(), %mime, bytes = data.len(), "encoded issuer image");
    Ok(Some(EncodedImage { mime, data }))
}

/// An image embedded inline as a `data:<mime>;base64,<payload>` URI.
#[derive(Clone, Debug, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct EncodedImage {
    mime: MimeType,
    data: Vec<u8>,
}

impl EncodedImage {
    /// Construct an image from its MIME type and raw bytes.
    pub fn new(mime: MimeType, data: Vec<u8>) -> Self {
        Self { mime, data }
    }

    /// The image's MIME type.
    pub fn mime(&self) -> MimeType {
        self.mime
    }

    /// The raw, decoded image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = Base64Display::new(&self.data, &BASE64_STANDARD);
        write!(f, "{DATA_URI_PREFIX}{}{BASE64_MARKER}{payload}", self.mime)
    }
}

impl FromStr for EncodedImage {
    type Err = ParseEncodedImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(DATA_URI_PREFIX).ok_or(ParseEncodedImageError::NoDataUri)?;
        let (mime, payload) = s.split_once(BASE64_MARKER).ok_or(ParseEncodedImageError::NotBase64)?;
        let mime = mime.parse()?;
        let data = BASE64_STANDARD.decode(payload)?;
        Ok(Self { mime, data })
    }
}

/// The image formats that can be embedded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MimeType {
    #[default]
    Png,
    Jpeg,
    Gif,
    Svg,
    Webp,
    Bmp,
    Icon,
}

impl MimeType {
    /// Detect the MIME type from a path's extension.
    ///
    /// Detection is case insensitive. Unknown or missing extensions fall back to PNG.
    pub fn from_path(path: &Path) -> Self {
        let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("jpg" | "jpeg") => Self::Jpeg,
            Some("gif") => Self::Gif,
            Some("svg") => Self::Svg,
            Some("webp") => Self::Webp,
            Some("bmp") => Self::Bmp,
            Some("ico") => Self::Icon,
            _ => Self::Png,
        }
    }

    /// The MIME type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Icon => "image/x-icon",
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MimeType {
    type Err = ParseEncodedImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mime = match s {
            "image/png" => Self::Png,
            "image/jpeg" => Self::Jpeg,
            "image/gif" => Self::Gif,
            "image/svg+xml" => Self::Svg,
            "image/webp" => Self::Webp,
            "image/bmp" => Self::Bmp,
            "image/x-icon" => Self::Icon,
            other => return Err(ParseEncodedImageError::UnsupportedMime(other.to_string())),
        };
        Ok(mime)
    }
}

/// An error when encoding an image file.
#[derive(Debug, thiserror::Error)]
pub enum ImageEncodeError {
    #[error("reading image {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An error when parsing a data URI.
#[derive(Debug, thiserror::Error)]
pub enum ParseEncodedImageError {
    #[error("not a data URI")]
    NoDataUri,

    #[error("data URI is not base64 encoded")]
    NotBase64,

    #[error("unsupported MIME type: {0}")]
    UnsupportedMime(String),

    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}
