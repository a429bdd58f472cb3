//! Domain DTOs for the CRPT document API.
//!
//! # Design
//! Field names follow the registry's JSON schema, which mixes snake_case with
//! a couple of camelCase keys (`importRequest`, `participantInn`); those are
//! renamed explicitly. Dates are plain calendar dates (`YYYY-MM-DD`).
//! The mock-server crate does not share these types; integration tests catch
//! schema drift between the two.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Kind of registry document. Only goods introduction is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocType {
    /// Introduction into circulation of goods produced in the country.
    #[default]
    #[serde(rename = "LP_INTRODUCE_GOODS")]
    LpIntroduceGoods,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "participantInn")]
    pub participant_inn: String,
}

/// One marked item listed in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_document_number: Option<String>,
    pub owner_inn: String,
    pub producer_inn: String,
    pub production_date: NaiveDate,
    pub tnved_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uit_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uitu_code: Option<String>,
}

fn default_import_request() -> bool {
    true
}

/// An "introduce goods" document as posted to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    pub doc_id: String,
    pub doc_status: String,
    #[serde(default)]
    pub doc_type: DocType,
    #[serde(rename = "importRequest", default = "default_import_request")]
    pub import_request: bool,
    pub owner_inn: String,
    pub participant_inn: String,
    pub producer_inn: String,
    pub production_date: NaiveDate,
    pub production_type: String,
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_number: Option<String>,
}

impl Document {
    /// Local checks the registry would otherwise reject the document for.
    pub fn validate(&self) -> Result<()> {
        if self.doc_id.trim().is_empty() {
            return Err(ApiError::Validation("doc_id is empty".to_string()));
        }
        if self.products.is_empty() {
            return Err(ApiError::Validation("document has no products".to_string()));
        }
        for (index, product) in self.products.iter().enumerate() {
            let has_code = [&product.uit_code, &product.uitu_code]
                .iter()
                .any(|code| code.as_deref().is_some_and(|c| !c.is_empty()));
            if !has_code {
                return Err(ApiError::Validation(format!(
                    "product {index} has neither uit_code nor uitu_code"
                )));
            }
        }
        Ok(())
    }
}

/// Body returned by a successful create: the registry-assigned document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentId {
    pub value: String,
}

/// Processing state of a previously submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub doc_id: String,
    pub status: String,
    pub doc_type: DocType,
    pub body: Document,
}
