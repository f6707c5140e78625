use crate::{
    image::{encode_image, EncodedImage, ImageEncodeError},
    profile::{IssuerProfile, ProfileContext, ProfileType},
};
use std::path::PathBuf;
use tracing::debug;

// Helper to pull a required, non-empty field out of the attributes.
macro_rules! require {
    ($value:expr, $field:literal) => {
        non_empty($value).ok_or(ValidationError::MissingField($field))
    };
}

/// The attributes that describe an issuer.
///
/// Optional attributes that are unset or empty are left out of the built profile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IssuerAttributes {
    pub public_keys: Vec<String>,
    pub revocation_list_uri: Option<String>,
    pub id: Option<String>,
    pub url: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub logo_image_path: Option<PathBuf>,
    pub introduction_url: Option<String>,
}

impl IssuerAttributes {
    /// Construct attributes out of the required fields.
    pub fn new<I, K>(id: impl Into<String>, public_keys: I, revocation_list_uri: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            public_keys: public_keys.into_iter().map(Into::into).collect(),
            revocation_list_uri: Some(revocation_list_uri.into()),
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Add a signing key.
    pub fn public_key(mut self, key: impl Into<String>) -> Self {
        self.public_keys.push(key.into());
        self
    }

    /// Set the issuer's main URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the issuer's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the issuer's email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the path to the issuer's logo.
    pub fn logo_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_image_path = Some(path.into());
        self
    }

    /// Set the issuer's introduction URL.
    pub fn introduction_url(mut self, url: impl Into<String>) -> Self {
        self.introduction_url = Some(url.into());
        self
    }

    /// Encode the logo, if one is set.
    pub fn encode_logo(&self) -> Result<Option<EncodedImage>, ImageEncodeError> {
        encode_image(self.logo_image_path.as_deref())
    }

    /// Build the issuer profile.
    ///
    /// Only the presence of the required fields is checked; their contents are taken as is.
    pub fn build(&self, image: Option<EncodedImage>) -> Result<IssuerProfile, ValidationError> {
        let Self { public_keys, revocation_list_uri, id, url, name, email, logo_image_path: _, introduction_url } =
            self;

        let id = require!(id.as_ref(), "id")?;
        if public_keys.is_empty() || public_keys.iter().any(String::is_empty) {
            return Err(ValidationError::MissingField("publicKeys"));
        }
        let revocation_list = require!(revocation_list_uri.as_ref(), "revocationList")?;

        let profile = IssuerProfile {
            context: ProfileContext,
            id,
            url: non_empty(url.as_ref()),
            name: non_empty(name.as_ref()),
            email: non_empty(email.as_ref()),
            image,
            public_keys: public_keys.iter().cloned().map(Into::into).collect(),
            revocation_list,
            profile_type: ProfileType,
            introduction_url: non_empty(introduction_url.as_ref()),
        };
        debug!(
            keys = profile.public_keys.len(),
            url = profile.url.is_some(),
            name = profile.name.is_some(),
            email = profile.email.is_some(),
            image = profile.image.is_some(),
            introduction_url = profile.introduction_url.is_some(),
            "built issuer profile"
        );
        Ok(profile)
    }
}

/// Build an issuer profile out of the given attributes and encoded logo.
pub fn build_profile(
    attributes: &IssuerAttributes,
    image: Option<EncodedImage>,
) -> Result<IssuerProfile, ValidationError> {
    attributes.build(image)
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// An error when validating issuer attributes.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("required field missing: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        image::MimeType,
        profile::{BLOCKCERTS_V2_CONTEXT, OPEN_BADGES_V2_CONTEXT},
    };
    use rstest::rstest;
    use serde_json::{json, Value};

    const REQUIRED_KEYS: [&str; 5] = ["@context", "id", "publicKeys", "revocationList", "type"];

    fn scenario_a() -> IssuerAttributes {
        IssuerAttributes::new("https://issuer.example/1", ["0xABC"], "https://issuer.example/revoked")
    }

    fn build_value(attributes: &IssuerAttributes, image: Option<EncodedImage>) -> serde_json::Map<String, Value> {
        let profile = attributes.build(image).expect("build failed");
        let Value::Object(object) = serde_json::to_value(profile).unwrap() else {
            panic!("profile is not an object");
        };
        object
    }

    fn keys(object: &serde_json::Map<String, Value>) -> Vec<&str> {
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort();
        keys
    }

    #[test]
    fn required_fields_only() {
        let object = build_value(&scenario_a(), None);

        let mut expected = REQUIRED_KEYS.to_vec();
        expected.sort();
        assert_eq!(keys(&object), expected);
        assert_eq!(object["@context"], json!([BLOCKCERTS_V2_CONTEXT, OPEN_BADGES_V2_CONTEXT]));
        assert_eq!(object["type"], json!("Profile"));
        assert_eq!(object["id"], json!("https://issuer.example/1"));
        assert_eq!(object["publicKeys"], json!([{"publicKey": "0xABC"}]));
        assert_eq!(object["revocationList"], json!("https://issuer.example/revoked"));
    }

    #[test]
    fn name_and_url() {
        let attributes = scenario_a().name("Acme University").url("https://acme.example");
        let object = build_value(&attributes, None);

        assert_eq!(object["name"], json!("Acme University"));
        assert_eq!(object["url"], json!("https://acme.example"));
        for key in ["email", "image", "introductionUrl"] {
            assert!(!object.contains_key(key), "{key} should be absent");
        }
    }

    #[rstest]
    #[case::url(|a: IssuerAttributes| a.url("https://acme.example"), "url", "https://acme.example")]
    #[case::name(|a: IssuerAttributes| a.name("Acme"), "name", "Acme")]
    #[case::email(|a: IssuerAttributes| a.email("a@acme.example"), "email", "a@acme.example")]
    #[case::introduction_url(
        |a: IssuerAttributes| a.introduction_url("https://acme.example/intro"),
        "introductionUrl",
        "https://acme.example/intro"
    )]
    fn single_optional_field(
        #[case] set: fn(IssuerAttributes) -> IssuerAttributes,
        #[case] key: &str,
        #[case] value: &str,
    ) {
        let object = build_value(&set(scenario_a()), None);

        assert_eq!(object.len(), REQUIRED_KEYS.len() + 1);
        assert_eq!(object[key], json!(value));
    }

    #[test]
    fn all_optional_fields() {
        let attributes = scenario_a()
            .url("https://acme.example")
            .name("Acme University")
            .email("registrar@acme.example")
            .introduction_url("https://acme.example/intro");
        let image = EncodedImage::new(MimeType::Png, b"hello".to_vec());
        let object = build_value(&attributes, Some(image));

        assert_eq!(object.len(), REQUIRED_KEYS.len() + 5);
        assert_eq!(object["image"], json!("data:image/png;base64,aGVsbG8="));
        assert_eq!(object["email"], json!("registrar@acme.example"));
        assert_eq!(object["introductionUrl"], json!("https://acme.example/intro"));
    }

    #[test]
    fn empty_optional_fields_are_omitted() {
        let attributes = scenario_a().url("").name("").email("").introduction_url("");
        let object = build_value(&attributes, None);

        assert_eq!(object.len(), REQUIRED_KEYS.len());
    }

    #[test]
    fn multiple_keys_keep_order() {
        let attributes = scenario_a().public_key("0xDEF").public_key("0x123");
        let object = build_value(&attributes, None);

        let expected = json!([{"publicKey": "0xABC"}, {"publicKey": "0xDEF"}, {"publicKey": "0x123"}]);
        assert_eq!(object["publicKeys"], expected);
    }

    #[test]
    fn idempotent() {
        let attributes = scenario_a().name("Acme University");
        let image = EncodedImage::new(MimeType::Jpeg, vec![1, 2, 3]);

        let first = attributes.build(Some(image.clone())).unwrap().to_pretty_json().unwrap();
        let second = build_profile(&attributes, Some(image)).unwrap().to_pretty_json().unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    #[case::no_id(IssuerAttributes { id: None, ..scenario_a() }, "id")]
    #[case::empty_id(IssuerAttributes { id: Some(String::new()), ..scenario_a() }, "id")]
    #[case::no_keys(IssuerAttributes { public_keys: vec![], ..scenario_a() }, "publicKeys")]
    #[case::empty_key(scenario_a().public_key(""), "publicKeys")]
    #[case::no_revocation_list(IssuerAttributes { revocation_list_uri: None, ..scenario_a() }, "revocationList")]
    #[case::empty_revocation_list(
        IssuerAttributes { revocation_list_uri: Some(String::new()), ..scenario_a() },
        "revocationList"
    )]
    fn missing_required_field(#[case] attributes: IssuerAttributes, #[case] field: &str) {
        let ValidationError::MissingField(missing) = attributes.build(None).expect_err("build succeeded");
        assert_eq!(missing, field);
    }

    #[test]
    fn missing_logo() {
        let dir = tempfile::tempdir().unwrap();
        let attributes = scenario_a().logo_image_path(dir.path().join("missing.png"));

        attributes.encode_logo().expect_err("encode succeeded");
    }

    #[test]
    fn logo_is_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.jpg");
        std::fs::write(&path, [0xffu8, 0xd8, 0xff]).unwrap();
        let attributes = scenario_a().logo_image_path(&path);

        let image = attributes.encode_logo().expect("encode failed");
        let object = build_value(&attributes, image);
        assert_eq!(object["image"], json!("data:image/jpeg;base64,/9j/"));
    }
}
