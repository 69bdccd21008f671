use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `failure_ticket` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FailureTicket {
    pub id: i64,
    pub sensor_id: i64,
    pub severity_level: Option<String>,
    pub failure_status: Option<String>,
    pub confidence_score: Option<f64>,
    pub recommendation: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Severity classification driving alert styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Warning,
    Critical,
    Fatal,
}

impl Variant {
    /// Case-insensitive substring match; "critical" wins over "fatal".
    pub fn from_severity(severity: Option<&str>) -> Self {
        let lower = severity.unwrap_or_default().to_lowercase();
        if lower.contains("critical") {
            Variant::Critical
        } else if lower.contains("fatal") {
            Variant::Fatal
        } else {
            Variant::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Warning => "warning",
            Variant::Critical => "critical",
            Variant::Fatal => "fatal",
        }
    }
}

/// Alert card view model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub id: i64,
    pub equipment_name: String,
    pub variant: Variant,
    pub description: String,
    pub action: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_matches_case_insensitively() {
        assert_eq!(Variant::from_severity(Some("CRITICAL")), Variant::Critical);
        assert_eq!(Variant::from_severity(Some("Level: Critical")), Variant::Critical);
        assert_eq!(Variant::from_severity(Some("Fatal error")), Variant::Fatal);
        assert_eq!(Variant::from_severity(Some("nonfatal")), Variant::Fatal);
    }

    #[test]
    fn test_variant_defaults_to_warning() {
        assert_eq!(Variant::from_severity(Some("moderate")), Variant::Warning);
        assert_eq!(Variant::from_severity(Some("")), Variant::Warning);
        assert_eq!(Variant::from_severity(None), Variant::Warning);
    }

    #[test]
    fn test_critical_takes_precedence_over_fatal() {
        assert_eq!(
            Variant::from_severity(Some("fatal / critical")),
            Variant::Critical
        );
    }

    #[test]
    fn test_ticket_view_serializes_camel_case() {
        let view = TicketView {
            id: 7,
            equipment_name: "Machine Sensor #3".to_string(),
            variant: Variant::Fatal,
            description: "Bearing failure (91.0%)".to_string(),
            action: "Replace bearing".to_string(),
            status: "Pending".to_string(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["equipmentName"], "Machine Sensor #3");
        assert_eq!(json["variant"], "fatal");
        assert!(json.get("equipment_name").is_none());
    }
}
