pub mod auth;
pub mod image;

pub use auth::{AuthError, AuthService, ProfileChanges};
pub use image::{ImageError, ImageService};
