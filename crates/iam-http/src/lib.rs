//! IAM HTTP - JSON transport for resource policies and principal lookups
//!
//! - [`IamHttpClient`]: shared HTTP client built from [`IamClientConfig`];
//!   implements [`iam_engine::PrincipalService`] and follows result pages
//! - [`ResourcePolicyClient`]: [`iam_engine::ResourceUpdater`] for one
//!   organization, project or group
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use iam_engine::{PolicySetter, PrincipalResolver};
//! use iam_http::{IamClientConfig, IamHttpClient, ResourceKind};
//!
//! let config = IamClientConfig::new("https://iam.example.com", "org-1")
//!     .with_api_token(token);
//! let client = IamHttpClient::new(&config)?;
//!
//! let resolver = PrincipalResolver::new(Arc::new(client.clone()));
//! let updater = client.resource(ResourceKind::Project, "p-123");
//! let setter = PolicySetter::new(Arc::new(updater), resolver, config.org_id.clone());
//!
//! setter.add_binding("u-42", "viewer").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod error;
mod resource;
mod wire;

pub use client::*;
pub use config::*;
pub use error::{HttpClientError, HttpClientResult};
pub use resource::*;
