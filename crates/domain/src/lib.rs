//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access_policy;
mod location;
mod page;
mod reconcile;
mod role;
mod scroll;
mod session;

pub use access_policy::{AccessPolicy, AllowedLocations, facility};
pub use location::{Location, LocationId};
pub use page::{DEFAULT_PAGE_SIZE, FeedKey, Page, PageRequest};
pub use reconcile::reconcile;
pub use role::{Role, RoleId, RoleNode, UserId, flatten_inherited_roles};
pub use scroll::infinite_scroll_trigger_index;
pub use session::SessionUser;
