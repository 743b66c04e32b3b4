//! # talik-io
//!
//! The I/O boundary of the Talik coupling engine: TOML input contract
//! types, cross-model validation, and binary results frames.
//!
//! ## Key Types
//!
//! - [`CouplingSettings`] / [`ModelInput`] — deserialized configuration
//! - [`CoupledInput`] — one coupled run's fully loaded inputs
//! - [`validator::validate_coupled_input`] — construction-time rejection
//!   of every malformed configuration the driver refuses to run
//! - [`FieldFrame`] / [`ResultsWriter`] — periodic field output

pub mod contract;
pub mod results;
pub mod validator;

pub use contract::{
    base_name, load_coupled_input, CoupledInput, CouplingFile, CouplingSettings, ModelInput,
};
pub use results::{read_frames, FieldFrame, ResultsWriter};
pub use validator::{method_category, validate_coupled_input, MethodCategory};
