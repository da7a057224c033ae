use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::entities::{destinations, features, tags};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Public account representation; the password never appears here.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub email: String,
    pub name: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenDto {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TagDto {
    pub id: i32,
    pub name: String,
}

impl From<tags::Model> for TagDto {
    fn from(model: tags::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeatureDto {
    pub id: i32,
    pub name: String,
}

impl From<features::Model> for FeatureDto {
    fn from(model: features::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Shallow destination representation used by the list endpoint; the
/// detail representation adds the description.
#[derive(Debug, Serialize)]
pub struct DestinationListDto {
    pub id: i32,
    pub name: String,
    pub country: String,
    pub city: String,
    pub rating: f64,
    pub image: Option<String>,
    pub tags: Vec<TagDto>,
    pub features: Vec<FeatureDto>,
}

#[derive(Debug, Serialize)]
pub struct DestinationDetailDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub country: String,
    pub city: String,
    pub rating: f64,
    pub image: Option<String>,
    pub tags: Vec<TagDto>,
    pub features: Vec<FeatureDto>,
}

impl DestinationListDto {
    pub fn from_parts(
        model: destinations::Model,
        tags: Vec<tags::Model>,
        features: Vec<features::Model>,
    ) -> Self {
        Self {
            id: model.id,
            name: model.name,
            country: model.country,
            city: model.city,
            rating: model.rating,
            image: model.image.map(|p| format!("/media/{p}")),
            tags: tags.into_iter().map(TagDto::from).collect(),
            features: features.into_iter().map(FeatureDto::from).collect(),
        }
    }
}

impl DestinationDetailDto {
    pub fn from_parts(
        model: destinations::Model,
        tags: Vec<tags::Model>,
        features: Vec<features::Model>,
    ) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            country: model.country,
            city: model.city,
            rating: model.rating,
            image: model.image.map(|p| format!("/media/{p}")),
            tags: tags.into_iter().map(TagDto::from).collect(),
            features: features.into_iter().map(FeatureDto::from).collect(),
        }
    }
}

/// Nested label reference in a destination payload, `{"name": "..."}`.
#[derive(Debug, Deserialize)]
pub struct LabelInput {
    pub name: String,
}
