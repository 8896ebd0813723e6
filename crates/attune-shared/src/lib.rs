//! Shared types for the attune daemon and its control client.
//!
//! Everything here is pure: emotion labels, the tone policy table,
//! prompt composition and the HTTP wire types.

pub mod emotion;
pub mod error;
pub mod prompt;
pub mod rpc;
pub mod tone;

pub use emotion::EmotionLabel;
pub use error::AttuneError;
pub use prompt::{
    compose, compose_rewrite, GenerationRequest, FALLBACK_APOLOGY, REWRITE_INSTRUCTION, SYSTEM_ROLE,
};
pub use rpc::{
    ErrorResponse, HealthResponse, RespondRequest, RespondResponse, RewriteRequest,
    RewriteResponse,
};
pub use tone::{tone_for, tone_for_raw, ToneEntry, TONE_TABLE};
