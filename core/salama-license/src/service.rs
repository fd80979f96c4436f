//! Fetching licenses for a signed-in user.

use crate::mask_license_key;
use salama_api::{ApiResult, LicenseApi};
use salama_types::{EmailAddress, License, LicenseState};
use std::sync::Arc;
use tracing::info;

/// A license prepared for display in the account view.
#[derive(Debug, Clone, PartialEq)]
pub struct LicenseOverview {
    /// Masked key for display (server-provided mask, or a local fallback).
    pub display_key: String,
    /// The full server record.
    pub license: License,
}

/// Read-only license retrieval for the account view.
pub struct LicenseService {
    api: Arc<dyn LicenseApi>,
}

impl LicenseService {
    /// Creates a service over the given API client.
    pub fn new(api: Arc<dyn LicenseApi>) -> Self {
        Self { api }
    }

    /// Fetches all licenses for `email`, active ones first.
    ///
    /// An empty result is a normal answer for an account that has not
    /// completed a purchase yet.
    pub async fn overview_for(&self, email: &EmailAddress) -> ApiResult<Vec<LicenseOverview>> {
        let mut licenses = self.api.licenses(email).await?;
        info!(email = %email, count = licenses.len(), "fetched licenses");

        licenses.sort_by_key(|l| match l.status {
            LicenseState::Active => 0,
            LicenseState::Pending => 1,
            LicenseState::Expired => 2,
        });

        Ok(licenses
            .into_iter()
            .map(|license| LicenseOverview {
                display_key: license
                    .masked_license_key
                    .clone()
                    .unwrap_or_else(|| mask_license_key(&license.license_key)),
                license,
            })
            .collect())
    }
}
