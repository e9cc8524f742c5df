use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for sensitive customer data (passport numbers, emails, phone
/// numbers). Debug and Display render a fixed mask so the value cannot leak
/// through log macros; serialization passes the real value through because
/// the store and the notification payloads need it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Masked<T>(T);

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_masked() {
        let passport = Masked::new("N1234567".to_string());
        assert_eq!(format!("{:?}", passport), "********");
        assert_eq!(format!("{}", passport), "********");
    }

    #[test]
    fn serialization_passes_the_real_value() {
        let email = Masked::new("amara@example.com".to_string());
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"amara@example.com\"");
    }

    #[test]
    fn round_trips_through_serde() {
        let original = Masked::new("N1234567".to_string());
        let json = serde_json::to_string(&original).unwrap();
        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expose(), "N1234567");
    }
}
