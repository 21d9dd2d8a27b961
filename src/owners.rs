//! Theatre-owner onboarding: registration, sessions and profile upkeep.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entity::{owner, owner_detail, owner_session};
use crate::error::ApiError;
use crate::validation::{
    self, EMAIL_MAX_LEN, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, PHONE_MAX, PHONE_MIN, PINCODE_MAX,
    PINCODE_MIN,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct Address {
    #[validate(length(min = 10, max = 40, message = "Length must be between 10 and 40."))]
    pub address_line_1: String,
    #[validate(length(min = 10, max = 40, message = "Length must be between 10 and 40."))]
    pub address_line_2: String,
    #[validate(length(min = 3, max = 20, message = "Length must be between 3 and 20."))]
    pub city: String,
    #[validate(length(min = 3, max = 20, message = "Length must be between 3 and 20."))]
    pub state: String,
    #[validate(length(min = 3, max = 20, message = "Length must be between 3 and 20."))]
    pub country: String,
    #[validate(range(min = PINCODE_MIN, max = PINCODE_MAX, message = "Must be a six digit pincode."))]
    pub pincode: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct NewOwner {
    #[validate(
        email(message = "Not a valid email address."),
        length(max = EMAIL_MAX_LEN, message = "Longer than maximum length 64.")
    )]
    pub email: String,
    #[validate(range(min = PHONE_MIN, max = PHONE_MAX, message = "Must be a ten digit phone number."))]
    pub phone: i64,
    #[validate(length(
        min = PASSWORD_MIN_LEN,
        max = PASSWORD_MAX_LEN,
        message = "Length must be between 8 and 16."
    ))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct NewOwnerDetail {
    #[validate(length(min = 3, max = 20, message = "Length must be between 3 and 20."))]
    pub name: String,
    #[validate(custom(function = "validation::adult"))]
    pub dob: DateTime<Utc>,
    #[validate(custom(function = "validation::gender"))]
    pub gender: String,
    #[validate(nested)]
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(nested)]
    pub owner: NewOwner,
    #[validate(nested)]
    pub owner_detail: NewOwnerDetail,
}

/// Email, phone, or both. When both are given the owner must match both.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "login_identity"))]
pub struct LoginRequest {
    #[validate(
        email(message = "Not a valid email address."),
        length(max = EMAIL_MAX_LEN, message = "Longer than maximum length 64.")
    )]
    pub email: Option<String>,
    #[validate(range(min = PHONE_MIN, max = PHONE_MAX, message = "Must be a ten digit phone number."))]
    pub phone: Option<i64>,
    #[validate(length(
        min = PASSWORD_MIN_LEN,
        max = PASSWORD_MAX_LEN,
        message = "Length must be between 8 and 16."
    ))]
    pub password: String,
}

fn login_identity(request: &LoginRequest) -> Result<(), ValidationError> {
    validation::at_least_one(
        request.email.is_some() || request.phone.is_some(),
        "At least one field (email, phone) must be provided.",
    )
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "owner_update_not_empty"))]
pub struct OwnerUpdate {
    #[validate(
        email(message = "Not a valid email address."),
        length(max = EMAIL_MAX_LEN, message = "Longer than maximum length 64.")
    )]
    pub email: Option<String>,
    #[validate(range(min = PHONE_MIN, max = PHONE_MAX, message = "Must be a ten digit phone number."))]
    pub phone: Option<i64>,
    #[validate(length(
        min = PASSWORD_MIN_LEN,
        max = PASSWORD_MAX_LEN,
        message = "Length must be between 8 and 16."
    ))]
    pub password: Option<String>,
}

fn owner_update_not_empty(update: &OwnerUpdate) -> Result<(), ValidationError> {
    validation::at_least_one(
        update.email.is_some() || update.phone.is_some() || update.password.is_some(),
        "At least one field (email, phone, password) must be provided.",
    )
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct OwnerDetailUpdate {
    #[validate(length(min = 3, max = 20, message = "Length must be between 3 and 20."))]
    pub name: Option<String>,
    #[validate(custom(function = "validation::adult"))]
    pub dob: Option<DateTime<Utc>>,
    #[validate(custom(function = "validation::gender"))]
    pub gender: Option<String>,
    #[validate(nested)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "profile_update_not_empty"))]
pub struct UpdateProfileRequest {
    #[validate(nested)]
    pub owner: Option<OwnerUpdate>,
    #[validate(nested)]
    pub owner_detail: Option<OwnerDetailUpdate>,
}

fn profile_update_not_empty(request: &UpdateProfileRequest) -> Result<(), ValidationError> {
    validation::at_least_one(
        request.owner.is_some() || request.owner_detail.is_some(),
        "At least one field (owner, owner_detail) must be provided.",
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OwnerDetailView {
    pub id: Uuid,
    pub name: String,
    pub dob: DateTime<Utc>,
    pub gender: String,
    #[schema(value_type = Address)]
    pub address: serde_json::Value,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<owner_detail::Model> for OwnerDetailView {
    fn from(model: owner_detail::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            dob: model.dob,
            gender: model.gender,
            address: model.address,
            created: model.created,
            updated: model.updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OwnerProfile {
    pub id: Uuid,
    pub email: String,
    pub phone: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub owner_detail: Option<OwnerDetailView>,
}

impl OwnerProfile {
    fn new(owner: owner::Model, detail: Option<owner_detail::Model>) -> Self {
        Self {
            id: owner.id,
            email: owner.email,
            phone: owner.phone,
            created: owner.created,
            updated: owner.updated,
            owner_detail: detail.map(Into::into),
        }
    }
}

fn address_json(address: &Address) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(address).map_err(|err| ApiError::BadData(err.to_string()))
}

/// Creates the owner and their details atomically.
pub async fn register(db: &DatabaseConnection, request: RegisterRequest) -> Result<Uuid, ApiError> {
    request.validate()?;

    let now = Utc::now();
    let owner_id = Uuid::new_v4();
    let RegisterRequest {
        owner,
        owner_detail,
    } = request;

    let txn = db.begin().await?;

    owner::ActiveModel {
        id: Set(owner_id),
        email: Set(owner.email),
        phone: Set(owner.phone),
        password: Set(validation::hash_password(&owner.password)),
        created: Set(now),
        updated: Set(now),
    }
    .insert(&txn)
    .await?;

    owner_detail::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(owner_detail.name),
        dob: Set(owner_detail.dob),
        gender: Set(owner_detail.gender.to_ascii_lowercase()),
        address: Set(address_json(&owner_detail.address)?),
        created: Set(now),
        updated: Set(now),
        owner_id: Set(owner_id),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(%owner_id, "owner registered");
    Ok(owner_id)
}

/// Checks credentials and opens a new session.
pub async fn login(db: &DatabaseConnection, request: LoginRequest) -> Result<Uuid, ApiError> {
    request.validate()?;

    let mut identity = Condition::all();
    if let Some(email) = &request.email {
        identity = identity.add(owner::Column::Email.eq(email.as_str()));
    }
    if let Some(phone) = request.phone {
        identity = identity.add(owner::Column::Phone.eq(phone));
    }
    if identity.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let owner = owner::Entity::find()
        .filter(identity)
        .one(db)
        .await?
        .filter(|owner| owner.password == validation::hash_password(&request.password))
        .ok_or(ApiError::InvalidCredentials)?;

    let session = owner_session::ActiveModel {
        session_id: Set(Uuid::new_v4()),
        owner_id: Set(owner.id),
        created: Set(Utc::now()),
    }
    .insert(db)
    .await?;

    info!(owner_id = %owner.id, "owner logged in");
    Ok(session.session_id)
}

/// Resolves a session id to its owner.
pub async fn session_owner(db: &DatabaseConnection, session_id: Uuid) -> Result<Option<Uuid>, ApiError> {
    let session = owner_session::Entity::find_by_id(session_id).one(db).await?;
    Ok(session.map(|session| session.owner_id))
}

pub async fn logout(db: &DatabaseConnection, session_id: Uuid) -> Result<(), ApiError> {
    owner_session::Entity::delete_by_id(session_id).exec(db).await?;
    Ok(())
}

pub async fn profile(db: &DatabaseConnection, owner_id: Uuid) -> Result<OwnerProfile, ApiError> {
    let owner = owner::Entity::find_by_id(owner_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("owner"))?;
    let detail = owner.find_related(owner_detail::Entity).one(db).await?;
    Ok(OwnerProfile::new(owner, detail))
}

/// Applies a partial update to the owner and/or their details.
pub async fn update_profile(
    db: &DatabaseConnection,
    owner_id: Uuid,
    request: UpdateProfileRequest,
) -> Result<OwnerProfile, ApiError> {
    request.validate()?;

    let now = Utc::now();
    let txn = db.begin().await?;

    let owner = owner::Entity::find_by_id(owner_id)
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("owner"))?;
    let detail = owner.find_related(owner_detail::Entity).one(&txn).await?;

    let owner = match request.owner {
        Some(changes) => {
            let mut active = owner.into_active_model();
            if let Some(email) = changes.email {
                active.email = Set(email);
            }
            if let Some(phone) = changes.phone {
                active.phone = Set(phone);
            }
            if let Some(password) = changes.password {
                active.password = Set(validation::hash_password(&password));
            }
            active.updated = Set(now);
            active.update(&txn).await?
        }
        None => owner,
    };

    let detail = match request.owner_detail {
        Some(changes) => {
            let detail = detail.ok_or(ApiError::NotFound("owner details"))?;
            let mut active = detail.into_active_model();
            if let Some(name) = changes.name {
                active.name = Set(name);
            }
            if let Some(dob) = changes.dob {
                active.dob = Set(dob);
            }
            if let Some(gender) = changes.gender {
                active.gender = Set(gender.to_ascii_lowercase());
            }
            if let Some(address) = &changes.address {
                active.address = Set(address_json(address)?);
            }
            active.updated = Set(now);
            Some(active.update(&txn).await?)
        }
        None => detail,
    };

    txn.commit().await?;

    info!(%owner_id, "owner profile updated");
    Ok(OwnerProfile::new(owner, detail))
}
