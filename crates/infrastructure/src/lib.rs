//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod fhir_location_directory;
mod http_api_client;
mod rest_user_role_directory;

pub use fhir_location_directory::FhirLocationDirectory;
pub use http_api_client::HttpApiClient;
pub use rest_user_role_directory::RestUserRoleDirectory;
