//! Locus terminal location picker.

#![forbid(unsafe_code)]

mod picker_command;
mod picker_config;
mod picker_render;

use std::sync::Arc;
use std::time::Duration;

use locus_application::{LocationPicker, LocationPickerService, PageFetch, RoleResolverService};
use locus_core::{AppError, AppResult, NonEmptyString};
use locus_domain::{AccessPolicy, AllowedLocations, Location, LocationId, Page};
use locus_infrastructure::{FhirLocationDirectory, HttpApiClient, RestUserRoleDirectory};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::picker_command::PickerCommand;
use crate::picker_config::{PickerConfig, init_tracing};
use crate::picker_render::write_view;

/// Outcome of a background task, delivered to the event loop.
#[derive(Debug)]
enum PickerEvent {
    PageLoaded {
        fetch: PageFetch,
        outcome: AppResult<Page>,
    },
    AllowedLocationsResolved(AllowedLocations),
    PinnedDefaultResolved(Option<Location>),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = PickerConfig::load()?;
    let service = build_picker_service(&config)?;
    let session = config.session_user()?;

    info!(
        api_base_url = %config.api_base_url,
        page_size = config.page_size,
        location_tag = config.location_tag.as_ref().map(NonEmptyString::as_str),
        default_location_id = config.default_location_id.as_ref().map(LocationId::as_str),
        "locus-picker started"
    );

    let mut picker = LocationPicker::new(config.picker_options());
    picker.set_allowed_locations(service.session_allowed_locations(&session));

    let (events, mut event_receiver) = mpsc::unbounded_channel::<PickerEvent>();

    {
        let service = service.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let allowed = service.resolve_allowed_locations(&session).await;
            let _ = events.send(PickerEvent::AllowedLocationsResolved(allowed));
        });
    }

    {
        let service = service.clone();
        let events = events.clone();
        let default_location_id = config.default_location_id.clone();
        tokio::spawn(async move {
            let pinned = service
                .find_pinned_default(default_location_id.as_ref())
                .await;
            let _ = events.send(PickerEvent::PinnedDefaultResolved(pinned));
        });
    }

    spawn_fetch(&service, &events, picker.start());
    print_view(&picker);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let previous_selection = picker.selected().cloned();

        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|error| {
                    AppError::Internal(format!("failed to read terminal input: {error}"))
                })?;
                let Some(line) = line else {
                    break;
                };

                match PickerCommand::parse(line.as_str()) {
                    PickerCommand::Search(text) => {
                        picker.on_search_input(text.as_str(), Instant::now());
                    }
                    PickerCommand::More => {
                        let fetch = picker.load_more();
                        if fetch.is_none() {
                            println!("No further locations to load right now");
                        }
                        spawn_fetch(&service, &events, fetch);
                    }
                    PickerCommand::Scroll(index) => {
                        spawn_fetch(&service, &events, picker.on_item_visible(index));
                    }
                    PickerCommand::Select(index) => select_at(&mut picker, index),
                    PickerCommand::Quit => break,
                    PickerCommand::Invalid(hint) => {
                        println!("{hint}");
                        continue;
                    }
                }
            }
            Some(event) = event_receiver.recv() => {
                if !apply_event(&mut picker, event) {
                    continue;
                }
            }
            () = settle(picker.search_deadline()) => {
                spawn_fetch(&service, &events, picker.on_search_settled(Instant::now()));
            }
        }

        report_selection_change(&picker, previous_selection.as_ref());
        print_view(&picker);
    }

    match picker.selected() {
        Some(location_id) => {
            info!(location_id = %location_id, "login location chosen");
            println!("{location_id}");
        }
        None => info!("picker closed without a selection"),
    }

    Ok(())
}

fn build_picker_service(config: &PickerConfig) -> AppResult<LocationPickerService> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let api_client = HttpApiClient::new(
        http_client,
        config.api_base_url.clone(),
        config.api_authorization.clone(),
        config.http_max_attempts,
        config.http_retry_backoff_ms,
    );

    let location_directory = FhirLocationDirectory::new(api_client.clone(), &config.fhir_path)?;
    let role_directory = RestUserRoleDirectory::new(api_client, &config.rest_path)?;
    let access_policy = load_access_policy(config.access_policy_path.as_deref())?;

    Ok(LocationPickerService::new(
        Arc::new(location_directory),
        RoleResolverService::new(Arc::new(role_directory)),
        Arc::new(access_policy),
    ))
}

fn load_access_policy(path: Option<&str>) -> AppResult<AccessPolicy> {
    let Some(path) = path else {
        return Ok(AccessPolicy::builtin());
    };

    let document = std::fs::read_to_string(path).map_err(|error| {
        AppError::Validation(format!("failed to read access policy '{path}': {error}"))
    })?;
    let policy = AccessPolicy::from_json(document.as_str())?;

    info!(path, entries = policy.len(), "loaded access policy");
    Ok(policy)
}

fn spawn_fetch(
    service: &LocationPickerService,
    events: &mpsc::UnboundedSender<PickerEvent>,
    fetch: Option<PageFetch>,
) {
    let Some(fetch) = fetch else {
        return;
    };

    debug!(
        page_index = fetch.page_index(),
        search_text = %fetch.key().search_text,
        "requesting location page"
    );

    let service = service.clone();
    let events = events.clone();
    tokio::spawn(async move {
        let outcome = service.fetch_page(&fetch).await;
        let _ = events.send(PickerEvent::PageLoaded { fetch, outcome });
    });
}

/// Applies a background result; returns whether the view may have changed.
fn apply_event(picker: &mut LocationPicker, event: PickerEvent) -> bool {
    match event {
        PickerEvent::PageLoaded { fetch, outcome } => picker.apply_page(&fetch, outcome),
        PickerEvent::AllowedLocationsResolved(allowed) => {
            picker.set_allowed_locations(allowed);
            true
        }
        PickerEvent::PinnedDefaultResolved(pinned) => {
            picker.set_pinned_default(pinned);
            true
        }
    }
}

fn select_at(picker: &mut LocationPicker, index: usize) {
    let Some(location_id) = picker
        .locations()
        .get(index)
        .map(|location| location.id().clone())
    else {
        println!("No location at index {index}");
        return;
    };

    if let Err(error) = picker.select(&location_id) {
        warn!(location_id = %location_id, error = %error, "selection rejected");
    }
}

fn report_selection_change(picker: &LocationPicker, previous: Option<&LocationId>) {
    let current = picker.selected();
    if current == previous {
        return;
    }

    match current {
        Some(location_id) => println!("Selected location {location_id}"),
        None => println!("Selection cleared"),
    }
}

fn print_view(picker: &LocationPicker) {
    let written = write_view(
        &mut std::io::stdout().lock(),
        picker.search_text(),
        &picker.view(),
    );

    if let Err(error) = written {
        warn!(error = %error, "failed to write picker view");
    }
}

async fn settle(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
