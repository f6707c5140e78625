use crate::image::EncodedImage;
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

/// The Blockcerts v2 JSON-LD context.
pub const BLOCKCERTS_V2_CONTEXT: &str = "https://www.blockcerts.org/blockcerts_v2_alpha/context_bc.json";

/// The Open Badges v2 JSON-LD context.
pub const OPEN_BADGES_V2_CONTEXT: &str = "https://openbadgespec.org/v2/context.json";

/// The `@context` of every issuer profile. Order is significant.
pub const CONTEXT: [&str; 2] = [BLOCKCERTS_V2_CONTEXT, OPEN_BADGES_V2_CONTEXT];

/// The `type` of every issuer profile.
pub const PROFILE_TYPE: &str = "Profile";

/// An issuer profile document.
///
/// Optional fields are omitted entirely from the serialized document when unset.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IssuerProfile {
    /// The JSON-LD context.
    #[serde(rename = "@context")]
    pub context: ProfileContext,

    /// The URL this document is published at.
    pub id: String,

    /// The issuer's main URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// The issuer's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The issuer's email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// The issuer's logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EncodedImage>,

    /// The keys the issuer signs with.
    #[serde(rename = "publicKeys")]
    pub public_keys: Vec<PublicKeyEntry>,

    /// The URI of the issuer's revocation list.
    #[serde(rename = "revocationList")]
    pub revocation_list: String,

    /// The profile type.
    #[serde(rename = "type")]
    pub profile_type: ProfileType,

    /// The issuer's introduction URL.
    #[serde(rename = "introductionUrl", default, skip_serializing_if = "Option::is_none")]
    pub introduction_url: Option<String>,
}

impl IssuerProfile {
    /// Serialize this profile as JSON indented with 2 spaces.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A single signing key entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PublicKeyEntry {
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

impl From<String> for PublicKeyEntry {
    fn from(public_key: String) -> Self {
        Self { public_key }
    }
}

/// The fixed JSON-LD context, serialized as [CONTEXT].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProfileContext;

impl Serialize for ProfileContext {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CONTEXT.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProfileContext {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let context = Vec::<String>::deserialize(deserializer)?;
        if context.iter().map(String::as_str).eq(CONTEXT) {
            Ok(Self)
        } else {
            Err(D::Error::custom(format!("unexpected @context: {context:?}")))
        }
    }
}

/// The fixed profile type, serialized as [PROFILE_TYPE].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProfileType;

impl Serialize for ProfileType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(PROFILE_TYPE)
    }
}

impl<'de> Deserialize<'de> for ProfileType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let profile_type = String::deserialize(deserializer)?;
        if profile_type == PROFILE_TYPE {
            Ok(Self)
        } else {
            Err(D::Error::custom(format!("unexpected type: {profile_type}")))
        }
    }
}
