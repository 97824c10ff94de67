use std::env;
use std::time::Duration;

use locus_application::PickerOptions;
use locus_core::{AppError, AppResult, NonEmptyString};
use locus_domain::{DEFAULT_PAGE_SIZE, LocationId, Role, RoleId, SessionUser, UserId};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct PickerConfig {
    pub api_base_url: Url,
    pub fhir_path: String,
    pub rest_path: String,
    pub api_authorization: Option<String>,
    pub page_size: u32,
    pub location_tag: Option<NonEmptyString>,
    pub default_location_id: Option<LocationId>,
    pub search_debounce_ms: u64,
    pub http_timeout_secs: u64,
    pub http_max_attempts: u8,
    pub http_retry_backoff_ms: u64,
    pub access_policy_path: Option<String>,
    pub user_id: Option<UserId>,
    pub user_roles: Vec<String>,
}

impl PickerConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_source(|name| env::var(name).ok())
    }

    fn from_source(source: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let api_base_url = source("LOCUS_API_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8080/openmrs".to_owned());
        let api_base_url = Url::parse(api_base_url.trim()).map_err(|error| {
            AppError::Validation(format!(
                "invalid LOCUS_API_BASE_URL value '{api_base_url}': {error}"
            ))
        })?;
        let fhir_path = source("LOCUS_FHIR_PATH").unwrap_or_else(|| "ws/fhir2/R4".to_owned());
        let rest_path = source("LOCUS_REST_PATH").unwrap_or_else(|| "ws/rest/v1".to_owned());
        let api_authorization = optional_value(&source, "LOCUS_API_AUTHORIZATION");

        let page_size = parse_env_u32(&source, "LOCUS_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let location_tag = optional_value(&source, "LOCUS_LOCATION_TAG")
            .map(NonEmptyString::new)
            .transpose()?;
        let default_location_id = optional_value(&source, "LOCUS_DEFAULT_LOCATION_ID")
            .map(LocationId::new)
            .transpose()?;
        let search_debounce_ms = parse_env_u64(&source, "LOCUS_SEARCH_DEBOUNCE_MS", 300)?;
        let http_timeout_secs = parse_env_u64(&source, "LOCUS_HTTP_TIMEOUT_SECS", 15)?;
        let http_max_attempts = parse_env_u8(&source, "LOCUS_HTTP_MAX_ATTEMPTS", 3)?;
        let http_retry_backoff_ms = parse_env_u64(&source, "LOCUS_HTTP_RETRY_BACKOFF_MS", 200)?;
        let access_policy_path = optional_value(&source, "LOCUS_ACCESS_POLICY_PATH");
        let user_id = optional_value(&source, "LOCUS_USER_ID")
            .map(UserId::new)
            .transpose()?;
        let user_roles = source("LOCUS_USER_ROLES")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|role| !role.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        if page_size == 0 {
            return Err(AppError::Validation(
                "LOCUS_PAGE_SIZE must be greater than zero".to_owned(),
            ));
        }

        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "LOCUS_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        if http_max_attempts == 0 {
            return Err(AppError::Validation(
                "LOCUS_HTTP_MAX_ATTEMPTS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            fhir_path,
            rest_path,
            api_authorization,
            page_size,
            location_tag,
            default_location_id,
            search_debounce_ms,
            http_timeout_secs,
            http_max_attempts,
            http_retry_backoff_ms,
            access_policy_path,
            user_id,
            user_roles,
        })
    }

    pub fn picker_options(&self) -> PickerOptions {
        PickerOptions {
            page_size: self.page_size,
            location_tag: self.location_tag.clone(),
            default_location_id: self.default_location_id.clone(),
            search_debounce: Duration::from_millis(self.search_debounce_ms),
        }
    }

    /// Session roles carry no upstream id here, so the name doubles as one.
    pub fn session_user(&self) -> AppResult<SessionUser> {
        let roles = self
            .user_roles
            .iter()
            .map(|name| -> AppResult<Role> {
                Ok(Role::new(RoleId::new(name.as_str())?, name.as_str(), None))
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(SessionUser::new(self.user_id.clone(), roles))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn optional_value(source: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    source(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env_u8(source: &impl Fn(&str) -> Option<String>, name: &str, default: u8) -> AppResult<u8> {
    match source(name) {
        Some(value) => value.trim().parse::<u8>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_env_u32(
    source: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u32,
) -> AppResult<u32> {
    match source(name) {
        Some(value) => value.trim().parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_env_u64(
    source: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> AppResult<u64> {
    match source(name) {
        Some(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
