use crate::patching::domain::Severity;

/// Normalizes vendor severity labels into the three levels operators filter by
///
/// Vendors disagree on vocabulary (Microsoft ships `Important`, Ubuntu ships
/// `medium`), so matching is case-insensitive on the trimmed label:
/// 1. critical / important / security / high → Critical
/// 2. recommended / moderate / medium → Recommended
/// 3. anything else, including an empty label → Optional
pub struct SeverityPolicy;

impl SeverityPolicy {
    pub fn normalize(vendor_severity: &str) -> Severity {
        match vendor_severity.trim().to_lowercase().as_str() {
            "critical" | "important" | "security" | "high" => Severity::Critical,
            "recommended" | "moderate" | "medium" => Severity::Recommended,
            _ => Severity::Optional,
        }
    }
}
