//! HondaTune - Hondata datalog validation and tuning analysis
//!
//! This library validates CSV datalog exports, generates synthetic logs for
//! common fault patterns and prepares tuning analysis requests for an AI
//! backend.
//!
//! ## Module Structure
//!
//! - [`datalog`] - Datalog row types, channel summaries and CSV validation
//! - [`simulator`] - Synthetic fault scenarios rendered as datalog CSV
//! - [`analysis`] - Prompt construction, backends and suggestion parsing
//! - [`settings`] - AI provider settings persistence

pub mod analysis;
pub mod datalog;
pub mod settings;
pub mod simulator;
