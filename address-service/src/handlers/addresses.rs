use crate::auth::Principal;
use crate::dtos::{
    AddressCreatedResponse, AddressListResponse, AddressResponse, AddressUpdatedResponse,
    CreateAddressRequest, ListAddressParams, UpdateAddressRequest,
};
use crate::models::AddressQuery;
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use crate::validation;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

const DUPLICATE_ADDRESS_CODE: &str = "DUPLICATE_ADDRESS";
const DUPLICATE_ADDRESS_MESSAGE: &str = "An identical address already exists for this user";

fn ensure_valid_user_id(user_id: &str) -> Result<(), AppError> {
    if validation::is_valid_user_id(user_id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(anyhow::anyhow!("Invalid userId")))
    }
}

fn ensure_valid_address_id(address_id: &str) -> Result<(), AppError> {
    if validation::is_valid_address_id(address_id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(anyhow::anyhow!("Invalid addressId")))
    }
}

#[tracing::instrument(skip(state, payload))]
pub async fn create_address(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<CreateAddressRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_valid_user_id(&user_id)?;

    let candidate = payload.into_record(&user_id)?;

    // Read-then-write; not isolated against a concurrent create for the
    // same user.
    let existing = state
        .addresses
        .list(&user_id, &AddressQuery::default())
        .await?;
    if existing
        .iter()
        .any(|address| address.is_duplicate_of(&candidate))
    {
        return Err(AppError::Conflict {
            message: DUPLICATE_ADDRESS_MESSAGE.to_string(),
            code: DUPLICATE_ADDRESS_CODE.to_string(),
        });
    }

    state.addresses.insert(&candidate).await?;

    tracing::info!(
        user_id = %user_id,
        address_id = %candidate.address_id,
        "address created"
    );

    let address_id = candidate.address_id.clone();
    Ok((
        StatusCode::CREATED,
        Json(AddressCreatedResponse {
            message: "Address created successfully".to_string(),
            address_id,
            address: AddressResponse::from(candidate),
        }),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn list_addresses(
    State(state): State<AppState>,
    principal: Principal,
    Path(user_id): Path<String>,
    Query(params): Query<ListAddressParams>,
) -> Result<impl IntoResponse, AppError> {
    ensure_valid_user_id(&user_id)?;

    let query = params.into_query()?;
    let addresses = state.addresses.list(&user_id, &query).await?;

    Ok(Json(AddressListResponse {
        message: "Addresses retrieved successfully".to_string(),
        addresses: addresses.into_iter().map(AddressResponse::from).collect(),
    }))
}

#[tracing::instrument(skip(state, payload))]
pub async fn update_address(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, address_id)): Path<(String, String)>,
    ValidatedJson(payload): ValidatedJson<UpdateAddressRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_valid_user_id(&user_id)?;
    ensure_valid_address_id(&address_id)?;

    if payload.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "must have at least 1 key"
        )));
    }

    let patch = payload.into_patch()?;

    // An unknown (userId, addressId) upserts a partial record, mirroring
    // the store's native update semantics.
    let address = state
        .addresses
        .apply_patch(&user_id, &address_id, &patch)
        .await?;

    tracing::info!(user_id = %user_id, address_id = %address_id, "address updated");

    Ok(Json(AddressUpdatedResponse {
        message: "Address updated successfully".to_string(),
        address: AddressResponse::from(address),
        address_id,
    }))
}

#[tracing::instrument(skip(state))]
pub async fn delete_address(
    State(state): State<AppState>,
    principal: Principal,
    Path((user_id, address_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    ensure_valid_user_id(&user_id)?;
    ensure_valid_address_id(&address_id)?;

    state.addresses.delete(&user_id, &address_id).await?;

    tracing::info!(user_id = %user_id, address_id = %address_id, "address deleted");

    Ok(StatusCode::NO_CONTENT)
}
