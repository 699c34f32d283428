//! Owner-side listing form: local validation, change preview and submission.
//!
//! Nothing here touches the network directly. [`controller::EditController`]
//! is handed a [`controller::RestaurantApi`] and a [`controller::Notifier`].

pub mod controller;
pub mod fields;

pub use controller::{
    Confirmation, EditController, EditSession, LoadOutcome, Notifier, RestaurantApi, SubmitError,
};
pub use fields::{diff, Diff, DiffEntry, Field, FIELDS, NO_DIFF_MESSAGE};

use thiserror::Error;

use crate::clock::{format_time, parse_time, TimeParseError};
use crate::models::{
    Category, Location, Restaurant, RestaurantPayload, ValidationErrors, Weekday,
    DESCRIPTION_MAX_CHARS,
};

pub const DEFAULT_MAX_PAX: i32 = 10;

const MSG_CATEGORY: &str =
    "Please choose a category which best represents your restaurant cuisine";
const MSG_LOCATION: &str =
    "Please choose an area which best represents your restaurant's location";
const MSG_ADDRESS: &str = "Please provide your restaurant address";
const MSG_MAX_PAX: &str =
    "Please enter a number for the max no. of people your restaurant can accept for bookings";
const MSG_TIME_REQUIRED: &str = "Please enter a time";
const MSG_TIME_INVALID: &str = "Please enter a valid time (HH:MM)";
const MSG_TIME_ORDER: &str = "Closing time must be later than opening time.";
const MSG_DESCRIPTION: &str = "Please enter less than 500 characters";

/// Raised by [`RestaurantForm::set`] when a `key=value` pair cannot be applied.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// What the owner has typed, before any of it is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantForm {
    pub name: String,
    pub category: String,
    pub location: String,
    pub address: String,
    pub phone: String,
    pub website_url: String,
    pub max_pax: i32,
    pub time_open: String,
    pub time_close: String,
    pub days_close: Vec<String>,
    pub description: String,
    pub image: String,
}

impl Default for RestaurantForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            location: String::new(),
            address: String::new(),
            phone: String::new(),
            website_url: String::new(),
            max_pax: DEFAULT_MAX_PAX,
            time_open: String::new(),
            time_close: String::new(),
            days_close: Vec::new(),
            description: String::new(),
            image: String::new(),
        }
    }
}

impl RestaurantForm {
    /// Pre-populate from a stored listing.
    pub fn from_record(r: &Restaurant) -> Self {
        let mut form = Self::from(&RestaurantPayload::from(r));
        if form.max_pax <= 0 {
            form.max_pax = DEFAULT_MAX_PAX;
        }
        form
    }

    /// Check every field independently and report all failures together.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.checked().map(|_| ())
    }

    /// Validate, then convert into the body sent to the server.
    pub fn to_payload(&self) -> Result<RestaurantPayload, ValidationErrors> {
        self.checked()
    }

    fn checked(&self) -> Result<RestaurantPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let category: Option<Category> =
            required_choice(&self.category, "category", MSG_CATEGORY, &mut errors);
        let location: Option<Location> =
            required_choice(&self.location, "location", MSG_LOCATION, &mut errors);

        if self.address.trim().is_empty() {
            errors.add("address", MSG_ADDRESS);
        }
        if self.max_pax <= 0 {
            errors.add("maxPax", MSG_MAX_PAX);
        }

        let time_open = required_time(&self.time_open, "timeOpen", &mut errors);
        let time_close = required_time(&self.time_close, "timeClose", &mut errors);
        if let (Some(open), Some(close)) = (time_open, time_close) {
            if close <= open {
                errors.add("timeClose", MSG_TIME_ORDER);
            }
        }

        let mut days_close = std::collections::BTreeSet::new();
        for day in &self.days_close {
            match day.parse::<Weekday>() {
                Ok(d) => {
                    days_close.insert(d);
                }
                Err(e) => errors.add("daysClose", e.to_string()),
            }
        }

        if self.description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.add("description", MSG_DESCRIPTION);
        }

        match (category, location, time_open, time_close) {
            (Some(category), Some(location), Some(time_open), Some(time_close))
                if errors.is_empty() =>
            {
                Ok(RestaurantPayload {
                    name: self.name.clone(),
                    category,
                    location,
                    address: self.address.clone(),
                    phone: self.phone.clone(),
                    website_url: Some(self.website_url.clone()).filter(|s| !s.is_empty()),
                    max_pax: self.max_pax,
                    time_open,
                    time_close,
                    days_close,
                    description: self.description.clone(),
                    image: Some(self.image.clone()).filter(|s| !s.is_empty()),
                })
            }
            _ => Err(errors),
        }
    }

    /// Set one field from its wire key and a string value. `daysClose` takes
    /// a comma separated list; an empty value clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), FormError> {
        let field =
            Field::from_key(key).ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        let value = value.to_string();

        match field {
            Field::Name => self.name = value,
            Field::Image => self.image = value,
            Field::Category => self.category = value,
            Field::Location => self.location = value,
            Field::TimeOpen => self.time_open = value,
            Field::TimeClose => self.time_close = value,
            Field::Address => self.address = value,
            Field::DaysClose => {
                self.days_close = value
                    .split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            Field::Phone => self.phone = value,
            Field::WebsiteUrl => self.website_url = value,
            Field::MaxPax => {
                self.max_pax = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                    FormError::InvalidValue {
                        field: field.key(),
                        reason: e.to_string(),
                    }
                })?
            }
            Field::Description => self.description = value,
        }
        Ok(())
    }
}

impl From<&RestaurantPayload> for RestaurantForm {
    fn from(p: &RestaurantPayload) -> Self {
        Self {
            name: p.name.clone(),
            category: p.category.to_string(),
            location: p.location.to_string(),
            address: p.address.clone(),
            phone: p.phone.clone(),
            website_url: p.website_url.clone().unwrap_or_default(),
            max_pax: p.max_pax,
            time_open: format_time(p.time_open),
            time_close: format_time(p.time_close),
            days_close: p.days_close.iter().map(|d| d.to_string()).collect(),
            description: p.description.clone(),
            image: p.image.clone().unwrap_or_default(),
        }
    }
}

fn required_choice<T>(
    value: &str,
    field: &'static str,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<T>
where
    T: std::str::FromStr<Err = crate::models::UnknownVariant>,
{
    if value.trim().is_empty() {
        errors.add(field, message);
        return None;
    }
    match value.parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

fn required_time(value: &str, field: &'static str, errors: &mut ValidationErrors) -> Option<i32> {
    match parse_time(value) {
        Ok(t) => Some(t),
        Err(TimeParseError::Empty) => {
            errors.add(field, MSG_TIME_REQUIRED);
            None
        }
        Err(_) => {
            errors.add(field, MSG_TIME_INVALID);
            None
        }
    }
}
