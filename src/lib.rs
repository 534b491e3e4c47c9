//! Interactive dashboard over the top 100 most bet sports matches.
//!
//! The [`data`] layer loads and cleans the semicolon-delimited dataset,
//! filters it by sport, competition and date range, and computes one
//! aggregate view per chart. [`state`] runs that pipeline after every
//! interaction; [`app`] and [`ui`] draw the results with egui.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod settings;
pub mod state;
pub mod ui;
