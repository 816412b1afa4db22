//! Dealer domain model.
//!
//! # Responsibility
//! - Define the persisted dealer record and its patch/update carriers.
//! - Own validation, normalization and JSON encode/decode for dealers.
//!
//! # Invariants
//! - `id` is immutable once assigned by `pre_save()`.
//! - `create_at == update_at` right after `pre_save()`.
//! - `brands` never holds duplicates after `pre_save()`/`pre_update()`.
//! - `is_valid()` reports the first failing field in a fixed order.

use crate::model::app_error::{AppError, ErrorKind};
use crate::model::utils::{
    get_millis, is_valid_id, new_id, remove_duplicate_strings, sanitize_unicode,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Read;

pub const DEALER_NAME_MAX_LENGTH: usize = 64;
pub const DEALER_NAME_MIN_LENGTH: usize = 1;

/// Dealership record stored in the `Dealer` table.
///
/// A JSON `null` in any field decodes to that field's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dealer {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    /// Epoch milliseconds. Omitted from JSON while unset.
    #[serde(skip_serializing_if = "is_zero", deserialize_with = "null_as_default")]
    pub create_at: i64,
    /// Epoch milliseconds. Omitted from JSON while unset.
    #[serde(skip_serializing_if = "is_zero", deserialize_with = "null_as_default")]
    pub update_at: i64,
    /// Soft delete tombstone; `0` means active.
    #[serde(deserialize_with = "null_as_default")]
    pub delete_at: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub province: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub postal_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub brands: Vec<String>,
}

/// Sparse dealer update; `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealerPatch {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub brands: Option<Vec<String>>,
}

/// Snapshot pair returned by an update, for change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealerUpdate {
    pub old: Dealer,
    pub new: Dealer,
}

/// Dealer fields in the order `is_valid()` checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerField {
    Id,
    CreateAt,
    UpdateAt,
    Name,
    Address,
    City,
    Province,
    Country,
    PostalCode,
    PhoneNumber,
    Brands,
}

impl DealerField {
    /// JSON key of the field, also used in error ids.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CreateAt => "create_at",
            Self::UpdateAt => "update_at",
            Self::Name => "name",
            Self::Address => "address",
            Self::City => "city",
            Self::Province => "province",
            Self::Country => "country",
            Self::PostalCode => "postal_code",
            Self::PhoneNumber => "phone_number",
            Self::Brands => "brands",
        }
    }
}

/// First dealer field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealerValidationError {
    pub field: DealerField,
    /// Empty when the dealer has no id yet.
    pub dealer_id: String,
}

impl DealerValidationError {
    /// Machine-readable id, e.g. `model.dealer.is_valid.name.app_error`.
    pub fn error_id(&self) -> String {
        format!("model.dealer.is_valid.{}.app_error", self.field.as_str())
    }
}

impl Display for DealerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.dealer_id.is_empty() {
            write!(f, "invalid dealer field `{}`", self.field.as_str())
        } else {
            write!(
                f,
                "invalid dealer field `{}` (dealer_id={})",
                self.field.as_str(),
                self.dealer_id
            )
        }
    }
}

impl Error for DealerValidationError {}

impl From<DealerValidationError> for AppError {
    fn from(value: DealerValidationError) -> Self {
        let details = if value.dealer_id.is_empty() {
            String::new()
        } else {
            format!("dealer_id={}", value.dealer_id)
        };
        AppError::new(
            ErrorKind::Validation,
            "Dealer.IsValid",
            value.error_id(),
            details,
        )
    }
}

impl Dealer {
    /// Validates every persisted invariant.
    ///
    /// Checks run in a fixed order: id, create_at, update_at, name, address,
    /// city, province, country, postal_code, phone_number, brands.
    pub fn is_valid(&self) -> Result<(), DealerValidationError> {
        let invalid = |field| {
            Err(DealerValidationError {
                field,
                dealer_id: self.id.clone(),
            })
        };

        if !is_valid_id(&self.id) {
            return Err(DealerValidationError {
                field: DealerField::Id,
                dealer_id: String::new(),
            });
        }
        if self.create_at == 0 {
            return invalid(DealerField::CreateAt);
        }
        if self.update_at == 0 {
            return invalid(DealerField::UpdateAt);
        }
        if !is_valid_dealer_name(&self.name) {
            return invalid(DealerField::Name);
        }
        if self.address.is_empty() {
            return invalid(DealerField::Address);
        }
        if self.city.is_empty() {
            return invalid(DealerField::City);
        }
        if self.province.is_empty() {
            return invalid(DealerField::Province);
        }
        if self.country.is_empty() {
            return invalid(DealerField::Country);
        }
        if self.postal_code.is_empty() {
            return invalid(DealerField::PostalCode);
        }
        if self.phone_number.is_empty() {
            return invalid(DealerField::PhoneNumber);
        }
        if self.brands.is_empty() || has_duplicates(&self.brands) {
            return invalid(DealerField::Brands);
        }

        Ok(())
    }

    /// Prepares a new dealer for insert.
    ///
    /// Assigns an id when missing, sanitizes free-text fields, stamps
    /// `create_at`/`update_at` with the same instant and dedups brands.
    pub fn pre_save(&mut self) {
        if self.id.is_empty() {
            self.id = new_id();
        }

        self.sanitize_text_fields();

        self.create_at = get_millis();
        self.update_at = self.create_at;

        self.brands = remove_duplicate_strings(std::mem::take(&mut self.brands));
    }

    /// Prepares an existing dealer for update. `create_at` is left untouched.
    pub fn pre_update(&mut self) {
        self.sanitize_text_fields();

        self.update_at = get_millis();

        self.brands = remove_duplicate_strings(std::mem::take(&mut self.brands));
    }

    /// Applies every present patch field in place.
    pub fn patch(&mut self, patch: &DealerPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(city) = &patch.city {
            self.city.clone_from(city);
        }
        if let Some(phone_number) = &patch.phone_number {
            self.phone_number.clone_from(phone_number);
        }
        if let Some(address) = &patch.address {
            self.address.clone_from(address);
        }
        if let Some(province) = &patch.province {
            self.province.clone_from(province);
        }
        if let Some(country) = &patch.country {
            self.country.clone_from(country);
        }
        if let Some(postal_code) = &patch.postal_code {
            self.postal_code.clone_from(postal_code);
        }
        if let Some(brands) = &patch.brands {
            self.brands.clone_from(brands);
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decodes the first JSON value in `data`; malformed input or a bare
    /// `null` yields `None`. Anything after that value is not read.
    pub fn from_json(data: impl Read) -> Option<Self> {
        decode_first(data)
    }

    fn sanitize_text_fields(&mut self) {
        self.name = sanitize_unicode(&self.name);
        self.city = sanitize_unicode(&self.city);
        self.address = sanitize_unicode(&self.address);
        self.postal_code = sanitize_unicode(&self.postal_code);
    }
}

impl DealerPatch {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Same decoding rules as [`Dealer::from_json`].
    pub fn from_json(data: impl Read) -> Option<Self> {
        decode_first(data)
    }
}

/// Name length rule, counted in characters.
pub fn is_valid_dealer_name(name: &str) -> bool {
    let length = name.chars().count();
    (DEALER_NAME_MIN_LENGTH..=DEALER_NAME_MAX_LENGTH).contains(&length)
}

/// Keeps dealers whose name equals any of `names`, in input order.
pub fn filter_by_name(dealers: &[Dealer], names: &[String]) -> Vec<Dealer> {
    dealers
        .iter()
        .filter(|dealer| names.iter().any(|name| *name == dealer.name))
        .cloned()
        .collect()
}

fn has_duplicates(values: &[String]) -> bool {
    let mut seen = std::collections::HashSet::with_capacity(values.len());
    !values.iter().all(|value| seen.insert(value))
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

fn decode_first<T: DeserializeOwned>(data: impl Read) -> Option<T> {
    serde_json::Deserializer::from_reader(data)
        .into_iter::<Option<T>>()
        .next()
        .and_then(Result::ok)
        .flatten()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
