pub mod attributes;
pub mod cli;
pub mod image;
pub mod profile;

pub use attributes::{build_profile, IssuerAttributes, ValidationError};
pub use image::{encode_image, EncodedImage, ImageEncodeError, MimeType};
pub use profile::{IssuerProfile, PublicKeyEntry};
