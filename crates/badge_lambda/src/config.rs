pub use badge_core::environment::{MANAGER_BUCKET_VAR, REGION_VAR, UPLOADER_BUCKET_VAR};

/// Settings a badge function reads from its environment at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub bucket: String,
    /// `None` leaves region resolution to the SDK provider chain.
    pub region: Option<String>,
}

impl HandlerConfig {
    pub fn from_env(bucket_var: &str) -> Result<Self, String> {
        Self::from_lookup(bucket_var, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        bucket_var: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let bucket = lookup(bucket_var)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| format!("{bucket_var} must be configured"))?;
        let region = lookup(REGION_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self { bucket, region })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn reads_bucket_and_region() {
        let config = HandlerConfig::from_lookup(
            UPLOADER_BUCKET_VAR,
            lookup_from(&[
                (UPLOADER_BUCKET_VAR, "badge-uploader-test"),
                (REGION_VAR, "eu-west-1"),
            ]),
        )
        .expect("config should load");

        assert_eq!(config.bucket, "badge-uploader-test");
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn missing_bucket_is_a_configuration_error() {
        let error = HandlerConfig::from_lookup(
            MANAGER_BUCKET_VAR,
            lookup_from(&[(UPLOADER_BUCKET_VAR, "wrong-function-bucket")]),
        )
        .expect_err("config should fail");

        assert_eq!(error, "BADGE_MANAGER_BUCKET must be configured");
    }

    #[test]
    fn blank_region_falls_back_to_provider_chain() {
        let config = HandlerConfig::from_lookup(
            MANAGER_BUCKET_VAR,
            lookup_from(&[(MANAGER_BUCKET_VAR, "badges"), (REGION_VAR, " ")]),
        )
        .expect("config should load");

        assert_eq!(config.region, None);
    }
}
