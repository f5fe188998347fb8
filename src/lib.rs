//! openHAB provider
//!
//! A provider plugin that manages openHAB items and item-channel links
//! declaratively. The host spawns the binary, reads the handshake line from
//! stdout and drives the provider over gRPC.
//!
//! # Resources
//!
//! - `openhab_item`: an item, keyed by its name. The type is checked against
//!   openHAB's item types, including the unit dimension of `Number:<dim>`.
//! - `openhab_link`: a link between an item and a thing channel, keyed by
//!   `<item_name>-<channel_uid>`. Links cannot be changed in place.
//!
//! # Values
//!
//! Attribute values crossing the protocol are tri-state: known, null, or
//! unknown until apply. [`AttrValue`] models that, and the [`conversion`]
//! functions map it onto the optional fields of the REST payloads.
//!
//! # Handshake Protocol
//!
//! ```text
//! HEMMER_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `HEMMER_PROVIDER|<protocol_version>|<address>`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod conversion;
pub mod error;
pub mod item_type;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod server;
pub mod testing;
pub mod types;
pub mod validation;
pub mod value;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

pub use client::OpenhabClient;
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use item_type::{parse_item_type, BaseType, ItemType, ItemTypeError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{OpenhabProvider, ProviderContext};
pub use schema::{Diagnostic, ProviderSchema};
pub use server::{serve, serve_on, serve_with_options, ProviderService, ServeOptions};
pub use types::{
    ApplyResult, AttributeChange, ImportedResource, PlanResult, ProviderMetadata,
    ServerCapabilities, HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};
pub use value::{AttrValue, ListValue, MapValue, StringValue};
