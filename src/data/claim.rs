use serde::{Deserialize, Serialize};

/// One claims line-item for a provider in a period
///
/// `service_count` is the weight behind every share and entropy value;
/// `allowed_amount` is the per-service monetary proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimLine {
    pub provider_id: String,
    pub period: i32,
    pub service_code: String,
    pub place_of_service: String,
    pub service_count: f64,
    pub allowed_amount: f64,
}

impl ClaimLine {
    pub fn new(
        provider_id: impl Into<String>,
        period: i32,
        service_code: impl Into<String>,
        place_of_service: impl Into<String>,
        service_count: f64,
        allowed_amount: f64,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            period,
            service_code: service_code.into(),
            place_of_service: place_of_service.into(),
            service_count,
            allowed_amount,
        }
    }

    /// Allowed amount weighted by service volume
    pub fn weighted_allowed(&self) -> f64 {
        self.allowed_amount * self.service_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_allowed() {
        let line = ClaimLine::new("1001", 2023, "99213", "O", 4.0, 75.5);
        assert!((line.weighted_allowed() - 302.0).abs() < 1e-9);
    }

    #[test]
    fn test_serializes_camel_case() {
        let line = ClaimLine::new("1001", 2023, "99213", "O", 1.0, 10.0);
        let json = serde_json::to_value(&line).unwrap();

        assert_eq!(json["providerId"], "1001");
        assert_eq!(json["serviceCode"], "99213");
        assert_eq!(json["placeOfService"], "O");
    }
}
