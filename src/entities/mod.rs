pub mod prelude;

pub mod auth_tokens;
pub mod destination_features;
pub mod destination_tags;
pub mod destinations;
pub mod features;
pub mod tags;
pub mod users;
