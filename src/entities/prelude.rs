pub use super::auth_tokens::Entity as AuthTokens;
pub use super::destination_features::Entity as DestinationFeatures;
pub use super::destination_tags::Entity as DestinationTags;
pub use super::destinations::Entity as Destinations;
pub use super::features::Entity as Features;
pub use super::tags::Entity as Tags;
pub use super::users::Entity as Users;
