//! Contractor domain types
//!
//! Clients of the business, with optional Polish registry identifiers
//! (NIP, REGON, KRS) and a postal address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{patch, patch_opt, text_enum};

/// Contractor status enum
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContractorStatus {
    #[default]
    Active,
    Inactive,
}

text_enum!(ContractorStatus {
    Active => "active",
    Inactive => "inactive",
});

/// Contractor entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub nip: Option<String>,
    pub regon: Option<String>,
    pub krs: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub status: ContractorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contractor {
    pub fn new(req: CreateContractorRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: req.phone.trim().to_string(),
            nip: req.nip.filter(|s| !s.trim().is_empty()),
            regon: req.regon.filter(|s| !s.trim().is_empty()),
            krs: req.krs.filter(|s| !s.trim().is_empty()),
            street: req.street.filter(|s| !s.trim().is_empty()),
            city: req.city.filter(|s| !s.trim().is_empty()),
            postal_code: req.postal_code.filter(|s| !s.trim().is_empty()),
            country: req.country.filter(|s| !s.trim().is_empty()),
            status: req.status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, req: UpdateContractorRequest) {
        patch(&mut self.name, req.name);
        patch(&mut self.email, req.email);
        patch(&mut self.phone, req.phone);
        patch_opt(&mut self.nip, req.nip);
        patch_opt(&mut self.regon, req.regon);
        patch_opt(&mut self.krs, req.krs);
        patch_opt(&mut self.street, req.street);
        patch_opt(&mut self.city, req.city);
        patch_opt(&mut self.postal_code, req.postal_code);
        patch_opt(&mut self.country, req.country);
        patch(&mut self.status, req.status);
        self.updated_at = Utc::now();
    }
}

/// Request DTO for creating a contractor
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractorRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 3, max = 40, message = "Phone is required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 10, max = 13, message = "NIP must have 10 digits"))]
    pub nip: Option<String>,
    #[serde(default)]
    pub regon: Option<String>,
    #[serde(default)]
    pub krs: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub status: ContractorStatus,
}

/// Request DTO for updating a contractor
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractorRequest {
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 40, message = "Phone cannot be empty"))]
    pub phone: Option<String>,
    pub nip: Option<String>,
    pub regon: Option<String>,
    pub krs: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub status: Option<ContractorStatus>,
}

/// Query params for listing contractors
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContractorQuery {
    #[serde(default)]
    pub status: Option<ContractorStatus>,
}
