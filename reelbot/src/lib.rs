//! reelbot - conversational movie-catalog lookup.
//!
//! Free-text queries resolve against a catalog of quality-tagged delivery
//! artifacts; imprecise queries run a short confirmation/selection dialog
//! before anything is delivered. The chat network and the catalog backend
//! are collaborators behind the [`delivery::ChatTransport`] and
//! [`catalog::CatalogStore`] seams.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod delivery;
pub mod engine;
pub mod errors;
pub mod gateway;
pub mod ingest;
pub mod matcher;
pub mod service;
pub mod session;

pub use engine::{DeliveryPlan, ResolutionEngine};
pub use errors::{BotError, BotResult};
pub use service::BotService;
