//! Application layer: the conversational flows and the dispatcher that
//! routes a user's messages between them.
//!
//! Each flow is a state machine fed one message at a time. Flow state is
//! held per user in a [`session::SessionStore`] owned by [`bot::Bot`].

pub mod admin;
pub mod bot;
pub mod reply;
pub mod session;
pub mod wizard;
