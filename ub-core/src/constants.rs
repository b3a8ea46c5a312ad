//! Application-wide constants.

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Production backend the mobile client talks to.
pub const DEFAULT_BASE_URL: &str = "https://ubicasure-back-402661808663.us-central1.run.app";

/// Default Firebase Auth REST endpoint.
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Fixed search radius for the station directory query.
pub const STATION_SEARCH_RADIUS: u32 = 5000;

/// Default poll interval for the REST-backed live message source.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default capacity of the application event bus.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Database schema version.
pub const DB_SCHEMA_VERSION: i32 = 1;

/// Value shown when no identity is signed in.
pub const NO_IDENTITY: &str = "sin usuario";

/// Local preference storage keys.
pub mod prefs {
    /// Namespace holding the session preference.
    pub const NAMESPACE: &str = "app_prefs";
    /// Key storing the last signed-in identity.
    pub const ACTIVE_IDENTITY: &str = "user";
}

/// Wire values used in message documents and requests.
pub mod wire {
    /// Message `type` for plain text.
    pub const TYPE_TEXT: &str = "Texto";
    /// Message `type` for an uploaded image.
    pub const TYPE_IMAGE: &str = "Imagen";
    /// Position hint for messages authored on this device.
    pub const POSITION_RIGHT: &str = "right";
    /// Position hint for messages authored by the other participant.
    pub const POSITION_LEFT: &str = "left";
    /// Multipart part name carrying the image bytes.
    pub const IMAGE_PART: &str = "data";
    /// Collection holding message documents.
    pub const MESSAGES_COLLECTION: &str = "messages";
}

/// Blood groups accepted by the registration form.
pub const BLOOD_TYPES: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_types() {
        assert_eq!(BLOOD_TYPES.len(), 8);
        assert!(BLOOD_TYPES.contains(&"O-"));
    }

    #[test]
    fn test_default_base_url_has_no_trailing_slash() {
        assert!(!DEFAULT_BASE_URL.ends_with('/'));
    }
}
