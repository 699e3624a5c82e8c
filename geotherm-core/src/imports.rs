pub use anyhow::{anyhow, bail, ensure, Context};
pub use indexmap::IndexMap;
pub use log;
pub use ndarray::{array, s, Array1};
pub use serde::{Deserialize, Serialize};
pub use std::collections::BTreeMap;
pub use std::ffi::OsStr;
pub use std::fs::File;
pub use std::path::{Path, PathBuf};

pub use crate::combo_error::ComboErrors;
pub use crate::input::{InputParameters, ParameterEntry};
pub use crate::parameter::{
    OutputParameter, OutputParameterDict, OutputValue, Parameter, ParameterDict, ParameterValue,
    SubModel,
};
pub use crate::traits::*;
pub use crate::units::{Unit, UnitType};
pub use crate::utils;
