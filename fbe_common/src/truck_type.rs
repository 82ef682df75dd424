use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;

//--------------------------------------      TruckType       ---------------------------------------------------------
/// The capacity category a load requires and a transporter stocks (e.g. "Flatbed", "Refrigerated").
///
/// Truck types compare case-insensitively: "flatbed" and "Flatbed" name the same pool. The original
/// casing is preserved for display and storage.
#[derive(Debug, Clone, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct TruckType(String);

impl PartialEq for TruckType {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for TruckType {}

impl From<String> for TruckType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TruckType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for TruckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TruckType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn case_insensitive_equality() {
        assert_eq!(TruckType::from("Flatbed"), TruckType::from("flatbed"));
        assert_eq!(TruckType::from("FLATBED"), TruckType::from("Flatbed"));
        assert_ne!(TruckType::from("Flatbed"), TruckType::from("Refrigerated"));
    }

    #[test]
    fn display_preserves_casing() {
        assert_eq!(TruckType::from("Open-Body").to_string(), "Open-Body");
    }
}
