//! Business logic services.
//!
//! - `auth` - Email/password accounts
//! - `gate` - Session gate state machine and the identity provider seam
//! - `session_identity` - Identity provider backed by tower-sessions
//! - `recipes` - Recipe collection of one identity
//! - `registry` - Loaded collections shared across requests

pub mod auth;
pub mod gate;
pub mod recipes;
pub mod registry;
pub mod session_identity;

pub use gate::{GateError, IdentityError, IdentityProvider, SessionGate};
pub use recipes::{CollectionError, RecipeCollectionStore, WriteOp};
pub use registry::{CollectionRegistry, SharedCollection};
pub use session_identity::SessionIdentity;
