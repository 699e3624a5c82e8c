#![allow(clippy::field_reassign_with_default)]

//! Crate containing models for techno-economic simulation of geothermal energy projects.
//!
//! A run ingests a flat `Description, Value[, Comment]` input deck, selects one variant of each
//! sub-model family (reservoir, wellbores, surface plant, economics), reads every parameter through
//! the unit-aware [parameter] subsystem and calculates the sub-models in dependency order:
//!
//! ```no_run
//! use geotherm_core::prelude::*;
//!
//! let input = InputParameters::from_path("resources/example1.txt").unwrap();
//! let mut model = Model::new(input);
//! model.read_parameters().unwrap();
//! model.calculate().unwrap();
//! println!("{}", model.render_text().unwrap());
//! ```

#[macro_use]
pub mod macros;

pub mod addons;
pub mod cache;
pub mod combo_error;
pub mod economics;
pub mod imports;
pub mod input;
pub mod model;
pub mod outputs;
pub mod parameter;
pub mod physics;
pub mod prelude;
pub mod reservoir;
pub mod surface_plant;
pub mod traits;
pub mod units;
pub mod utils;
pub mod wellbores;
