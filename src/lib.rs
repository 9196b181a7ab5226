//! Liftlog
//!
//! A single-user-per-account workout log backed by a hosted JSON document
//! store, with sign-in delegated to an identity provider.

pub mod auth;
pub mod config;
pub mod exercises;
pub mod models;
pub mod revalidate;
pub mod server;
pub mod store;
pub mod view;

pub use auth::{AuthError, IdentityClient, SessionStore};
pub use config::{Config, ConfigError};
pub use exercises::{ExerciseLog, LogError};
pub use models::{
    EntryId, Exercise, ExerciseForm, Logbook, NewExercise, ValidationError, WeightUnit,
};
pub use revalidate::Revalidator;
pub use server::{router, AppState};
pub use store::{DocumentStore, MemoryStore, RemoteStore, Revision, Snapshot, StoreError};
pub use view::WeekView;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
