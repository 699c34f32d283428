//! The editable fields of a listing and how each one is compared, formatted
//! and labelled when showing the owner what an edit will change.

use std::fmt;

use crate::clock::format_time;
use crate::models::{RestaurantPatch, RestaurantPayload, Weekday};

/// Shown in place of an empty change list.
pub const NO_DIFF_MESSAGE: &str = "No differing values. Pls update the relevant fields.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Image,
    Category,
    Location,
    TimeOpen,
    TimeClose,
    Address,
    DaysClose,
    Phone,
    WebsiteUrl,
    MaxPax,
    Description,
}

/// Every field, in the order changes are listed.
pub const FIELDS: [Field; 12] = [
    Field::Name,
    Field::Image,
    Field::Category,
    Field::Location,
    Field::TimeOpen,
    Field::TimeClose,
    Field::Address,
    Field::DaysClose,
    Field::Phone,
    Field::WebsiteUrl,
    Field::MaxPax,
    Field::Description,
];

/// A field's value reduced to something comparable.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value<'a> {
    Text(&'a str),
    Number(i32),
    Time(i32),
    Days(Vec<Weekday>),
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Time(t) => f.write_str(&format_time(*t)),
            Value::Days(days) => {
                let names: Vec<&str> = days.iter().map(|d| d.as_str()).collect();
                f.write_str(&names.join(", "))
            }
        }
    }
}

impl Field {
    /// JSON key used on the wire.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Image => "image",
            Field::Category => "category",
            Field::Location => "location",
            Field::TimeOpen => "timeOpen",
            Field::TimeClose => "timeClose",
            Field::Address => "address",
            Field::DaysClose => "daysClose",
            Field::Phone => "phone",
            Field::WebsiteUrl => "websiteUrl",
            Field::MaxPax => "maxPax",
            Field::Description => "description",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Image => "Image",
            Field::Category => "Category",
            Field::Location => "Location",
            Field::TimeOpen => "Opening Time",
            Field::TimeClose => "Closing Time",
            Field::Address => "Address",
            Field::DaysClose => "Days Closed",
            Field::Phone => "Phone",
            Field::WebsiteUrl => "Website",
            Field::MaxPax => "Maximum Pax",
            Field::Description => "Description",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        FIELDS.iter().copied().find(|f| f.key() == key)
    }

    fn input_value<'a>(&self, input: &'a RestaurantPayload) -> Value<'a> {
        match self {
            Field::Name => Value::Text(&input.name),
            Field::Image => Value::Text(input.image.as_deref().unwrap_or("")),
            Field::Category => Value::Text(input.category.as_str()),
            Field::Location => Value::Text(input.location.as_str()),
            Field::TimeOpen => Value::Time(input.time_open),
            Field::TimeClose => Value::Time(input.time_close),
            Field::Address => Value::Text(&input.address),
            Field::DaysClose => Value::Days(input.days_close.iter().copied().collect()),
            Field::Phone => Value::Text(&input.phone),
            Field::WebsiteUrl => Value::Text(input.website_url.as_deref().unwrap_or("")),
            Field::MaxPax => Value::Number(input.max_pax),
            Field::Description => Value::Text(&input.description),
        }
    }

    /// `None` when the prior record never carried this field.
    fn prior_value<'a>(&self, prior: &'a RestaurantPatch) -> Option<Value<'a>> {
        match self {
            Field::Name => prior.name.as_deref().map(Value::Text),
            Field::Image => prior.image.as_deref().map(Value::Text),
            Field::Category => prior.category.map(|c| Value::Text(c.as_str())),
            Field::Location => prior.location.map(|l| Value::Text(l.as_str())),
            Field::TimeOpen => prior.time_open.map(Value::Time),
            Field::TimeClose => prior.time_close.map(Value::Time),
            Field::Address => prior.address.as_deref().map(Value::Text),
            // Sets are ordered, so equal day sets compare equal
            Field::DaysClose => prior
                .days_close
                .as_ref()
                .map(|days| Value::Days(days.iter().copied().collect())),
            Field::Phone => prior.phone.as_deref().map(Value::Text),
            Field::WebsiteUrl => prior.website_url.as_deref().map(Value::Text),
            Field::MaxPax => prior.max_pax.map(Value::Number),
            Field::Description => prior.description.as_deref().map(Value::Text),
        }
    }

    /// Compare one field; `Some` with the rendered new value when it changed.
    fn compare(&self, input: &RestaurantPayload, prior: &RestaurantPatch) -> Option<DiffEntry> {
        let before = self.prior_value(prior)?;
        let after = self.input_value(input);
        if before == after {
            return None;
        }

        Some(DiffEntry {
            field: *self,
            before: before.to_string(),
            after: after.to_string(),
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub field: Field,
    pub before: String,
    pub after: String,
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.label(), self.after)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diff {
    Unchanged,
    Changed(Vec<DiffEntry>),
}

impl Diff {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Diff::Unchanged)
    }

    pub fn entries(&self) -> &[DiffEntry] {
        match self {
            Diff::Unchanged => &[],
            Diff::Changed(entries) => entries,
        }
    }

    /// Text for the confirmation prompt: one `Label: value` line per change,
    /// or [`NO_DIFF_MESSAGE`].
    pub fn render(&self) -> String {
        match self {
            Diff::Unchanged => NO_DIFF_MESSAGE.to_string(),
            Diff::Changed(entries) => entries
                .iter()
                .map(|e| format!("- {}", e))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Fields of `input` that differ from `prior`. Fields the prior record does
/// not carry are skipped rather than reported as changed.
pub fn diff(input: &RestaurantPayload, prior: &RestaurantPatch) -> Diff {
    let entries: Vec<DiffEntry> = FIELDS
        .iter()
        .filter_map(|field| field.compare(input, prior))
        .collect();

    if entries.is_empty() {
        Diff::Unchanged
    } else {
        Diff::Changed(entries)
    }
}
