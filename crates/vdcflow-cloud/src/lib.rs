//! vdcflow cloud
//!
//! Provider-independent reconciliation of declared datacenters against a
//! collection-of-resources cloud API.
//!
//! - [`CloudApi`]: the remote API seam (implemented per provider)
//! - [`NameResolver`]: name → href lookup
//! - [`AvailabilityBarrier`]: wait until resources leave the busy state
//! - [`Reconciler`]: create, delete, attach, detach and firewall sync

pub mod action;
pub mod api;
pub mod barrier;
pub mod confirm;
pub mod engine;
pub mod error;
pub mod payload;
pub mod resolver;
pub mod secret;

pub use action::{Action, ActionType, ApplyResult, ResourceKind};
pub use api::{CloudApi, Collection, Metadata, Resource, ResourceRef, ResourceState};
pub use barrier::{AvailabilityBarrier, BarrierConfig};
pub use confirm::{AlwaysDecline, AssumeYes, Confirm};
pub use engine::{Reconciler, ServerPhase};
pub use error::{CloudError, Result};
pub use payload::PayloadBuilder;
pub use resolver::NameResolver;
pub use secret::ImagePassword;
