use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::catalog::{Category, Location, Weekday};
use super::validation::ValidationErrors;
use crate::clock::is_valid_hhmm;

/// Longest accepted description, counted in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// A restaurant listing as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    pub owner: Uuid,
    #[serde(default)]
    pub name: String,
    pub category: Category,
    pub location: Location,
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website_url: Option<String>,
    pub max_pax: i32,
    pub time_open: i32,
    pub time_close: i32,
    #[serde(default)]
    pub days_close: BTreeSet<Weekday>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request: every listing field except the id and owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPayload {
    #[serde(default)]
    pub name: String,
    pub category: Category,
    pub location: Location,
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website_url: Option<String>,
    pub max_pax: i32,
    pub time_open: i32,
    pub time_close: i32,
    #[serde(default)]
    pub days_close: BTreeSet<Weekday>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of an edit request. Absent fields keep their stored value; an empty
/// string clears `websiteUrl` or `image`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestaurantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pax: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_open: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_close: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_close: Option<BTreeSet<Weekday>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Restaurant {
    /// Builds a new listing owned by `owner`. The payload is validated first;
    /// the owner never comes from the payload.
    pub fn create(
        owner: Uuid,
        payload: RestaurantPayload,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationErrors> {
        payload.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            owner,
            name: payload.name.trim().to_string(),
            category: payload.category,
            location: payload.location,
            address: payload.address.trim().to_string(),
            phone: payload.phone.trim().to_string(),
            website_url: non_blank(payload.website_url),
            max_pax: payload.max_pax,
            time_open: payload.time_open,
            time_close: payload.time_close,
            days_close: payload.days_close,
            description: payload.description,
            image: non_blank(payload.image),
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns a copy with the patch merged in. `id`, `owner` and the
    /// timestamps are left alone.
    pub fn apply(&self, patch: RestaurantPatch) -> Self {
        let mut merged = self.clone();

        if let Some(name) = patch.name {
            merged.name = name.trim().to_string();
        }
        if let Some(category) = patch.category {
            merged.category = category;
        }
        if let Some(location) = patch.location {
            merged.location = location;
        }
        if let Some(address) = patch.address {
            merged.address = address.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            merged.phone = phone.trim().to_string();
        }
        if let Some(website_url) = patch.website_url {
            merged.website_url = non_blank(Some(website_url));
        }
        if let Some(max_pax) = patch.max_pax {
            merged.max_pax = max_pax;
        }
        if let Some(time_open) = patch.time_open {
            merged.time_open = time_open;
        }
        if let Some(time_close) = patch.time_close {
            merged.time_close = time_close;
        }
        if let Some(days_close) = patch.days_close {
            merged.days_close = days_close;
        }
        if let Some(description) = patch.description {
            merged.description = description;
        }
        if let Some(image) = patch.image {
            merged.image = non_blank(Some(image));
        }

        merged
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        check_listing(
            &self.address,
            self.max_pax,
            self.time_open,
            self.time_close,
            &self.description,
        )
    }
}

impl RestaurantPayload {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        check_listing(
            &self.address,
            self.max_pax,
            self.time_open,
            self.time_close,
            &self.description,
        )
    }
}

impl From<&Restaurant> for RestaurantPayload {
    fn from(r: &Restaurant) -> Self {
        Self {
            name: r.name.clone(),
            category: r.category,
            location: r.location,
            address: r.address.clone(),
            phone: r.phone.clone(),
            website_url: r.website_url.clone(),
            max_pax: r.max_pax,
            time_open: r.time_open,
            time_close: r.time_close,
            days_close: r.days_close.clone(),
            description: r.description.clone(),
            image: r.image.clone(),
        }
    }
}

impl From<RestaurantPayload> for RestaurantPatch {
    fn from(p: RestaurantPayload) -> Self {
        Self {
            name: Some(p.name),
            category: Some(p.category),
            location: Some(p.location),
            address: Some(p.address),
            phone: Some(p.phone),
            website_url: Some(p.website_url.unwrap_or_default()),
            max_pax: Some(p.max_pax),
            time_open: Some(p.time_open),
            time_close: Some(p.time_close),
            days_close: Some(p.days_close),
            description: Some(p.description),
            image: Some(p.image.unwrap_or_default()),
        }
    }
}

impl From<&Restaurant> for RestaurantPatch {
    fn from(r: &Restaurant) -> Self {
        RestaurantPayload::from(r).into()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_listing(
    address: &str,
    max_pax: i32,
    time_open: i32,
    time_close: i32,
    description: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if address.trim().is_empty() {
        errors.add("address", "Address is required");
    }
    if max_pax < 1 {
        errors.add("maxPax", "Maximum pax must be at least 1");
    }

    let open_ok = is_valid_hhmm(time_open);
    let close_ok = is_valid_hhmm(time_close);
    if !open_ok {
        errors.add("timeOpen", "Opening time must be a valid HHMM time");
    }
    if !close_ok {
        errors.add("timeClose", "Closing time must be a valid HHMM time");
    } else if open_ok && time_close <= time_open {
        errors.add("timeClose", "Closing time must be later than opening time");
    }

    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.add(
            "description",
            format!("Description must be at most {DESCRIPTION_MAX_CHARS} characters"),
        );
    }

    errors.into_result()
}
