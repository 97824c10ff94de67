use std::sync::Arc;

use locus_core::AppResult;
use locus_domain::{AccessPolicy, AllowedLocations, Location, LocationId, Page, Role, SessionUser};
use tracing::{debug, info, warn};

use crate::{LocationDirectory, PageFetch, RoleResolverService};

/// Application service backing the location picker.
#[derive(Clone)]
pub struct LocationPickerService {
    location_directory: Arc<dyn LocationDirectory>,
    role_resolver: RoleResolverService,
    access_policy: Arc<AccessPolicy>,
}

impl LocationPickerService {
    /// Creates the service from its collaborators.
    #[must_use]
    pub fn new(
        location_directory: Arc<dyn LocationDirectory>,
        role_resolver: RoleResolverService,
        access_policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            location_directory,
            role_resolver,
            access_policy,
        }
    }

    /// Derives the allowlist from the session's own roles.
    ///
    /// Applies until inherited role resolution completes.
    #[must_use]
    pub fn session_allowed_locations(&self, session: &SessionUser) -> AllowedLocations {
        self.access_policy
            .allowed_location_ids(session.roles().iter().map(Role::name))
    }

    /// Resolves the locations the session user may select.
    ///
    /// An empty result means the user is not restricted.
    pub async fn resolve_allowed_locations(&self, session: &SessionUser) -> AllowedLocations {
        let roles = self.role_resolver.effective_roles(session).await;
        let allowed = self
            .access_policy
            .allowed_location_ids(roles.iter().map(Role::name));

        info!(
            roles = roles.len(),
            allowed_locations = allowed.len(),
            unrestricted = allowed.is_unrestricted(),
            "resolved location allowlist"
        );

        allowed
    }

    /// Looks up the pinned default location.
    ///
    /// Lookup failures and unknown ids both mean "no pin".
    pub async fn find_pinned_default(&self, location_id: Option<&LocationId>) -> Option<Location> {
        let location_id = location_id?;

        match self.location_directory.find_location(location_id).await {
            Ok(Some(location)) => Some(location),
            Ok(None) => {
                debug!(location_id = %location_id, "pinned default location not found");
                None
            }
            Err(error) => {
                warn!(
                    location_id = %location_id,
                    error = %error,
                    "failed to load pinned default location"
                );
                None
            }
        }
    }

    /// Executes one page fetch issued by the feed.
    pub async fn fetch_page(&self, fetch: &PageFetch) -> AppResult<Page> {
        let result = self.location_directory.fetch_page(fetch.request()).await;

        if let Err(error) = &result {
            warn!(
                page_index = fetch.page_index(),
                search_text = %fetch.key().search_text,
                error = %error,
                "failed to fetch location page"
            );
        }

        result
    }
}
