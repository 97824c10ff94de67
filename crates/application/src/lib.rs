//! Application services and ports.

#![forbid(unsafe_code)]

mod debounce;
mod location_feed;
mod location_picker;
mod location_picker_service;
mod location_ports;
mod role_resolver_service;

pub use debounce::{DEFAULT_SEARCH_DEBOUNCE, Debouncer};
pub use location_feed::{FeedState, LocationFeed, PageFetch};
pub use location_picker::{
    LOAD_ERROR_MESSAGE, LOADING_PLACEHOLDERS, LocationList, LocationPicker, PickerOptions,
    PickerView,
};
pub use location_picker_service::LocationPickerService;
pub use location_ports::{LocationDirectory, UserRoleDirectory};
pub use role_resolver_service::RoleResolverService;
