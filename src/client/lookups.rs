//! Model and region lookups

use tracing::debug;

use super::DashboardClient;
use crate::error::Result;
use crate::types::{LookupParams, ModelInfo, ModelSummary, RegionSummary};

impl DashboardClient {
    /// Look up the basic data of one model
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`](crate::Error::InvalidInput) when `brand` or `model` is
    /// blank; [`Error::Service`](crate::Error::Service) when the model is unknown.
    pub async fn query_model(&self, brand: &str, model: &str) -> Result<ModelInfo> {
        let params = LookupParams::new()
            .required("brand", brand)
            .required("model", model);
        params.validate()?;

        debug!(brand, model, "querying model");
        self.get_data("api/models/", params.as_query(), "model query failed")
            .await
    }

    /// List known brand/model pairs, optionally for a single brand
    pub async fn list_models(&self, brand: Option<&str>) -> Result<Vec<ModelSummary>> {
        let query: Vec<(&str, &str)> = brand
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(|b| ("brand", b))
            .into_iter()
            .collect();

        self.get_data("api/models/list", &query, "model list query failed")
            .await
    }

    /// Aggregated EV data for a state, optionally narrowed by city and county
    ///
    /// `state` is required; a blank `city` or `county` is treated as absent.
    pub async fn query_region(
        &self,
        state: &str,
        city: Option<&str>,
        county: Option<&str>,
    ) -> Result<RegionSummary> {
        let mut params = LookupParams::new().required("state", state);
        if let Some(city) = city.filter(|c| !c.trim().is_empty()) {
            params = params.required("city", city);
        }
        if let Some(county) = county.filter(|c| !c.trim().is_empty()) {
            params = params.required("county", county);
        }
        params.validate()?;

        debug!(state, ?city, ?county, "querying region");
        self.get_data("api/regions/", params.as_query(), "region query failed")
            .await
    }

    /// All states with registered EVs
    pub async fn list_states(&self) -> Result<Vec<String>> {
        self.get_data("api/regions/states", &[] as &[(&str, &str)], "state list query failed")
            .await
    }

    /// Cities of a state
    pub async fn list_cities(&self, state: &str) -> Result<Vec<String>> {
        let params = LookupParams::new().required("state", state);
        params.validate()?;
        self.get_data("api/regions/cities", params.as_query(), "city list query failed")
            .await
    }

    /// Counties of a city within a state
    pub async fn list_counties(&self, state: &str, city: &str) -> Result<Vec<String>> {
        let params = LookupParams::new()
            .required("state", state)
            .required("city", city);
        params.validate()?;
        self.get_data(
            "api/regions/counties",
            params.as_query(),
            "county list query failed",
        )
        .await
    }
}
