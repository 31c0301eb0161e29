//! IONOS Cloud provider for vdcflow
//!
//! Implements [`vdcflow_cloud::CloudApi`] on top of the IONOS Cloud API v6
//! (`https://api.ionos.com/cloudapi/v6`).

pub mod auth;
pub mod client;
pub mod error;

pub use auth::AuthHeaders;
pub use client::{IONOS_API_URL, IonosClient};
pub use error::{IonosError, Result};
