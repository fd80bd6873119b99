//! Client for the Stones video-memorial backend.
//!
//! `api` binds the HTTP endpoints, `flow` drives the content, voice and
//! review steps on top of them, and `render` follows a render job to a
//! terminal state. `ui` holds the presentational primitives the CLI prints.

pub mod api;
pub mod config;
pub mod flow;
pub mod render;
pub mod session;
pub mod ui;

#[cfg(test)]
pub mod test_helpers;
