//! deckhand CLI
//!
//! Named tasks over a presentation tree: bundling, theme compilation,
//! linting, a live-reload dev server, packaging and the headless QUnit
//! suite.

pub mod commands;
pub mod exit;
pub mod output;
pub mod project;
