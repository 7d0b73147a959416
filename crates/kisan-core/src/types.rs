use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Who produced a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The farmer asking a question.
    User,
    /// The AI backend answering it.
    Model,
}

impl Role {
    /// Stable string form used in the persisted log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    /// Parse the persisted string form back into a role.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "model" => Some(Role::Model),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display language of the assistant.
///
/// The backend receives the two-letter code; the welcome and apology strings
/// are fixed per language so a failed inference call never depends on a
/// string table lookup at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Kn,
    Te,
}

impl Language {
    /// Two-letter code sent to the inference backend.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Kn => "kn",
            Language::Te => "te",
        }
    }

    /// BCP-47 locale handed to the speech recognizer.
    pub fn speech_locale(&self) -> &'static str {
        match self {
            Language::En => "en-IN",
            Language::Hi => "hi-IN",
            Language::Kn => "kn-IN",
            Language::Te => "te-IN",
        }
    }

    /// Greeting shown as the synthetic first turn of every session.
    pub fn welcome(&self) -> &'static str {
        match self {
            Language::En => {
                "Namaste! I am your agri assistant. Ask me about crops, soil, pests or mandi prices."
            }
            Language::Hi => {
                "नमस्ते! मैं आपका कृषि सहायक हूँ। फसल, मिट्टी, कीट या मंडी भाव के बारे में पूछें।"
            }
            Language::Kn => {
                "ನಮಸ್ಕಾರ! ನಾನು ನಿಮ್ಮ ಕೃಷಿ ಸಹಾಯಕ. ಬೆಳೆ, ಮಣ್ಣು, ಕೀಟ ಅಥವಾ ಮಾರುಕಟ್ಟೆ ಬೆಲೆಗಳ ಬಗ್ಗೆ ಕೇಳಿ."
            }
            Language::Te => {
                "నమస్కారం! నేను మీ వ్యవసాయ సహాయకుడిని. పంటలు, నేల, పురుగులు లేదా మార్కెట్ ధరల గురించి అడగండి."
            }
        }
    }

    /// Fixed apology shown as a synthetic model turn when inference fails.
    pub fn apology(&self) -> &'static str {
        match self {
            Language::En => {
                "Sorry, I am having trouble connecting to the agri-server. Please try again later."
            }
            Language::Hi => {
                "क्षमा करें, मुझे सर्वर से जुड़ने में समस्या हो रही है। कृपया बाद में पुनः प्रयास करें।"
            }
            Language::Kn => {
                "ಕ್ಷಮಿಸಿ, ಸರ್ವರ್\u{200c}ಗೆ ಸಂಪರ್ಕಿಸಲು ತೊಂದರೆಯಾಗುತ್ತಿದೆ. ದಯವಿಟ್ಟು ನಂತರ ಪ್ರಯತ್ನಿಸಿ."
            }
            Language::Te => {
                "క్షమించండి, సర్వర్\u{200c}కు కనెక్ట్ చేయడంలో సమస్య ఉంది. దయచేసి తర్వాత మళ్లీ ప్రయత్నించండి."
            }
        }
    }
}

/// Application log level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Wire format of an inline image attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageFormat {
    /// MIME type used in the data-URI header.
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
        }
    }
}

// =============================================================================
// Newtype Wrappers - Identity
// =============================================================================

/// Identifier of a turn in the live transcript, client-generated.
///
/// This is a UI-side key only. It is never reconciled with the id the store
/// assigns on persistence; the two spaces are independent by design.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalTurnId(pub Uuid);

impl LocalTurnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LocalTurnId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier assigned by the history store when a turn is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoredTurnId(pub i64);

/// Owner of a persisted chat log. Threaded explicitly into every component
/// that touches the store; there is no ambient identity context.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Entity Structs
// =============================================================================

/// An inline image payload attached to an outgoing user turn.
///
/// Self-describing: the format marker plus the raw bytes are enough for both
/// display and transmission. Bytes are base64 in the serialized form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub format: ImageFormat,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl ImageAttachment {
    /// Render as a `data:` URI for display or for the inference request body.
    pub fn to_data_uri(&self) -> String {
        use base64::Engine as _;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.format.mime(), encoded)
    }

    /// Size of the raw payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Base64 (de)serialization for raw attachment bytes.
mod base64_bytes {
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// One persisted turn of a user's chat log.
///
/// `id` and `created_at` are assigned by the store; the store's creation
/// order, not the client's, is the ordering authority for history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTurn {
    pub id: StoredTurnId,
    pub user_id: UserId,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
    }

    #[test]
    fn test_role_round_trip_via_str() {
        for role in [Role::User, Role::Model] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("assistant"), None);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Model.to_string(), "model");
    }

    #[test]
    fn test_language_default_is_english() {
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::En.code(), "en");
        assert_eq!(Language::Hi.code(), "hi");
        assert_eq!(Language::Kn.code(), "kn");
        assert_eq!(Language::Te.code(), "te");
    }

    #[test]
    fn test_language_serialization_matches_code() {
        for lang in [Language::En, Language::Hi, Language::Kn, Language::Te] {
            let json = serde_json::to_string(&lang).unwrap();
            assert_eq!(json, format!("\"{}\"", lang.code()));
            let rt: Language = serde_json::from_str(&json).unwrap();
            assert_eq!(rt, lang);
        }
    }

    #[test]
    fn test_language_speech_locales() {
        assert_eq!(Language::En.speech_locale(), "en-IN");
        assert_eq!(Language::Hi.speech_locale(), "hi-IN");
        assert_eq!(Language::Kn.speech_locale(), "kn-IN");
        assert_eq!(Language::Te.speech_locale(), "te-IN");
    }

    #[test]
    fn test_language_fixed_strings_are_nonempty_and_distinct() {
        let langs = [Language::En, Language::Hi, Language::Kn, Language::Te];
        for lang in langs {
            assert!(!lang.welcome().is_empty());
            assert!(!lang.apology().is_empty());
        }
        // Apologies must differ per language; the table is keyed, not formatted.
        let apologies: Vec<&str> = langs.iter().map(|l| l.apology()).collect();
        for i in 0..apologies.len() {
            for j in (i + 1)..apologies.len() {
                assert_ne!(apologies[i], apologies[j]);
            }
        }
    }

    #[test]
    fn test_english_apology_text() {
        assert_eq!(
            Language::En.apology(),
            "Sorry, I am having trouble connecting to the agri-server. Please try again later."
        );
    }

    #[test]
    fn test_local_turn_ids_are_unique() {
        assert_ne!(LocalTurnId::new(), LocalTurnId::new());
        assert_ne!(LocalTurnId::default(), LocalTurnId::default());
    }

    #[test]
    fn test_stored_turn_id_ordering() {
        assert!(StoredTurnId(1) < StoredTurnId(2));
        assert_eq!(StoredTurnId(7), StoredTurnId(7));
    }

    #[test]
    fn test_user_id_display_and_as_str() {
        let uid = UserId::new("farmer-42");
        assert_eq!(uid.as_str(), "farmer-42");
        assert_eq!(uid.to_string(), "farmer-42");
    }

    #[test]
    fn test_image_format_mime() {
        assert_eq!(ImageFormat::Png.mime(), "image/png");
        assert_eq!(ImageFormat::Jpeg.mime(), "image/jpeg");
        assert_eq!(ImageFormat::Gif.mime(), "image/gif");
        assert_eq!(ImageFormat::WebP.mime(), "image/webp");
    }

    #[test]
    fn test_attachment_data_uri_header() {
        let att = ImageAttachment {
            format: ImageFormat::Png,
            data: vec![1, 2, 3],
        };
        let uri = att.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(att.len(), 3);
        assert!(!att.is_empty());
    }

    #[test]
    fn test_attachment_serde_round_trip() {
        let att = ImageAttachment {
            format: ImageFormat::Jpeg,
            data: vec![0xFF, 0xD8, 0xFF, 0xE0],
        };
        let json = serde_json::to_string(&att).unwrap();
        // Bytes travel as base64 text, not as a JSON array.
        assert!(json.contains("\"data\":\""));
        let rt: ImageAttachment = serde_json::from_str(&json).unwrap();
        assert_eq!(rt, att);
    }

    #[test]
    fn test_attachment_deserialize_rejects_bad_base64() {
        let json = r#"{"format":"png","data":"not base64!!"}"#;
        let result: std::result::Result<ImageAttachment, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_stored_turn_round_trip() {
        let turn = StoredTurn {
            id: StoredTurnId(12),
            user_id: UserId::new("farmer-1"),
            role: Role::User,
            text: "When should I sow wheat?".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&turn).unwrap();
        let rt: StoredTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(rt, turn);
    }

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
