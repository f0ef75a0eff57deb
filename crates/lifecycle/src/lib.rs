//! Order lifecycle engine.
//!
//! This crate owns every order state change. All transition rules live
//! in the domain's transition table; the engine adds role
//! authorization, the payment gate, atomic persistence through the
//! store's conditional update, and fire-and-forget notifications.

pub mod directory;
pub mod engine;
pub mod error;
pub mod notify;

pub use directory::{InMemoryUserDirectory, UserDirectory, UserProfile};
pub use engine::LifecycleEngine;
pub use error::EngineError;
pub use notify::{
    DispatchError, InMemoryDispatcher, NotificationDispatcher, OrderEventKind, OrderNotification,
};
