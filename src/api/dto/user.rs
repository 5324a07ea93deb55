//! User profile and address DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Address, Role, User};
use crate::services::{AddressInput, Profile};

/// Public view of an account; the password hash never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "john_doe")]
    pub username: String,
    #[schema(example = "user@example.com")]
    pub email: String,
    pub role: Role,
    #[schema(example = "2024-01-01T12:00:00Z")]
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at.to_jiff().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[validate(length(min = 1, max = 200, message = "Street is required"))]
    #[schema(example = "1 Main St")]
    pub street: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    #[schema(example = "Springfield")]
    pub city: String,
    #[validate(length(min = 1, max = 20, message = "Zip code is required"))]
    #[schema(example = "12345")]
    pub zip_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl From<AddressRequest> for AddressInput {
    fn from(req: AddressRequest) -> Self {
        Self {
            street: req.street,
            city: req.city,
            zip_code: req.zip_code,
            is_default: req.is_default,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: Uuid,
    pub street: String,
    pub city: String,
    pub zip_code: String,
    pub is_default: bool,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            street: address.street,
            city: address.city,
            zip_code: address.zip_code,
            is_default: address.is_default,
        }
    }
}

pub fn address_list(addresses: Vec<Address>) -> Vec<AddressResponse> {
    addresses.into_iter().map(AddressResponse::from).collect()
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub addresses: Vec<AddressResponse>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user: profile.user.into(),
            addresses: address_list(profile.addresses),
        }
    }
}
