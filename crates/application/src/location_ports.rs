mod directory;
mod roles;

pub use directory::LocationDirectory;
pub use roles::UserRoleDirectory;
