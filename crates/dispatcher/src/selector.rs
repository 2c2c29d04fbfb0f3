//! EndpointSelector - picks the target of each bulk call
//!
//! Uniform random choice, no stickiness or health tracking.

use contracts::ContractError;
use rand::Rng;

/// Bulk API path appended to every endpoint
pub const BULK_PATH: &str = "/api/_bulk";

/// Immutable set of remote base addresses
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    endpoints: Vec<String>,
}

impl EndpointSelector {
    /// Build from configured addresses
    ///
    /// # Errors
    /// Returns a configuration error when `endpoints` is empty.
    pub fn new(endpoints: Vec<String>) -> Result<Self, ContractError> {
        if endpoints.is_empty() {
            return Err(ContractError::config_validation(
                "addresses",
                "at least one address is required",
            ));
        }
        Ok(Self { endpoints })
    }

    /// Configured endpoints
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Pick one endpoint using the thread-local RNG
    pub fn select(&self) -> &str {
        self.select_with(&mut rand::rng())
    }

    /// Pick one endpoint using the given RNG
    pub fn select_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let idx = rng.random_range(0..self.endpoints.len());
        &self.endpoints[idx]
    }
}

/// `<endpoint>/api/_bulk`, tolerating a trailing slash on the endpoint
pub fn bulk_url(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), BULK_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_empty_set_rejected() {
        let err = EndpointSelector::new(Vec::new()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_single_endpoint_always_selected() {
        let selector = EndpointSelector::new(vec!["http://a:4080".into()]).unwrap();
        for _ in 0..20 {
            assert_eq!(selector.select(), "http://a:4080");
        }
    }

    #[test]
    fn test_selection_covers_all_endpoints() {
        let endpoints: Vec<String> = (0..3).map(|i| format!("http://node{i}:4080")).collect();
        let selector = EndpointSelector::new(endpoints.clone()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let mut hits: HashMap<&str, usize> = HashMap::new();
        for _ in 0..3000 {
            *hits.entry(selector.select_with(&mut rng)).or_default() += 1;
        }

        assert_eq!(hits.len(), 3);
        for endpoint in &endpoints {
            let count = hits[endpoint.as_str()];
            assert!((700..1300).contains(&count), "{endpoint}: {count}");
        }
    }

    #[test]
    fn test_bulk_url() {
        assert_eq!(bulk_url("http://zinc:4080"), "http://zinc:4080/api/_bulk");
        assert_eq!(bulk_url("http://zinc:4080/"), "http://zinc:4080/api/_bulk");
        assert_eq!(bulk_url("http://zinc:4080//"), "http://zinc:4080/api/_bulk");
    }
}
