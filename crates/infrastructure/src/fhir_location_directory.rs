use async_trait::async_trait;
use locus_application::LocationDirectory;
use locus_core::{AppError, AppResult};
use locus_domain::{FeedKey, Location, LocationId, Page, PageRequest};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::HttpApiClient;

const NEXT_RELATION: &str = "next";

/// FHIR R4 `Location` search adapter.
#[derive(Clone)]
pub struct FhirLocationDirectory {
    client: HttpApiClient,
    location_endpoint: Url,
}

impl FhirLocationDirectory {
    /// Creates an adapter for the FHIR base found at `fhir_path` below the API base.
    pub fn new(client: HttpApiClient, fhir_path: &str) -> AppResult<Self> {
        let location_endpoint = client
            .endpoint(fhir_path)?
            .join("Location")
            .map_err(|error| {
                AppError::Validation(format!("invalid FHIR path '{fhir_path}': {error}"))
            })?;

        Ok(Self {
            client,
            location_endpoint,
        })
    }

    fn search_url(&self, key: &FeedKey, offset: u64) -> Url {
        let mut url = self.location_endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("_summary", "data");

            if key.page_size > 0 {
                query.append_pair("_count", key.page_size.to_string().as_str());
            }

            if offset > 0 {
                query.append_pair("_getpagesoffset", offset.to_string().as_str());
            }

            if let Some(location_tag) = &key.location_tag {
                query.append_pair("_tag", location_tag.as_str());
            }

            if key.has_search() {
                query.append_pair("name:contains", key.search_text.as_str());
            }
        }

        url
    }

    fn lookup_url(&self, location_id: &LocationId) -> Url {
        let mut url = self.location_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("_id", location_id.as_str());
        url
    }
}

#[async_trait]
impl LocationDirectory for FhirLocationDirectory {
    async fn fetch_page(&self, request: &PageRequest) -> AppResult<Page> {
        let url = match request {
            PageRequest::Initial { key, offset } => self.search_url(key, *offset),
            PageRequest::Continuation { link } => {
                self.client.follow_link(link, &self.location_endpoint)?
            }
        };

        debug!(url = %url, "fetching location page");
        let bundle = self.client.get_json::<LocationBundle>(url).await?;

        Ok(bundle.into_page())
    }

    async fn find_location(&self, location_id: &LocationId) -> AppResult<Option<Location>> {
        let bundle = self
            .client
            .get_json::<LocationBundle>(self.lookup_url(location_id))
            .await?;

        Ok(bundle.into_locations().into_iter().next())
    }
}

#[derive(Debug, Deserialize)]
struct LocationBundle {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    link: Vec<BundleLink>,
    #[serde(default)]
    entry: Vec<BundleEntry>,
}

#[derive(Debug, Deserialize)]
struct BundleLink {
    relation: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct BundleEntry {
    #[serde(default)]
    resource: Option<LocationResource>,
}

#[derive(Debug, Deserialize)]
struct LocationResource {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl LocationBundle {
    fn into_page(self) -> Page {
        let next_link = self
            .link
            .iter()
            .find(|link| link.relation == NEXT_RELATION)
            .map(|link| link.url.clone());
        let total = self.total;

        Page {
            locations: self.into_locations(),
            next_link,
            total,
        }
    }

    fn into_locations(self) -> Vec<Location> {
        self.entry
            .into_iter()
            .filter_map(|entry| entry.resource)
            .filter_map(|resource| {
                let id = LocationId::new(resource.id?).ok()?;
                Some(Location::new(id, resource.name.unwrap_or_default()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
