//! Typed, unit-aware input parameters and result containers.

use crate::imports::*;
use crate::units::UnitError;
use thiserror::Error;

mod dict;
mod output;
mod read;

pub use dict::ParameterDict;
pub use output::{OutputParameter, OutputParameterDict, OutputValue};
pub use read::{read_list_parameter, read_parameter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Str(String),
    List(Vec<f64>),
    StrList(Vec<String>),
}

impl ParameterValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::StrList(_) => "string list",
        }
    }
}

/// Validation applied to every parsed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    None,
    /// Inclusive bounds in preferred units, applied to every entry of a list
    Range { min: f64, max: f64 },
    AllowableInts(Vec<i64>),
    AllowableStrs(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("`{name}`: could not parse `{raw}` as {expected}")]
    Parse {
        name: String,
        raw: String,
        expected: &'static str,
    },
    #[error("`{name}`: {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("`{name}`: `{raw}` is not one of the allowed values {allowed}")]
    NotAllowed {
        name: String,
        raw: String,
        allowed: String,
    },
    #[error("`{name}`: {source}")]
    Unit {
        name: String,
        #[source]
        source: UnitError,
    },
    #[error("`{name}`: positional entries {ignored:?} follow a gap and were ignored")]
    ListGap { name: String, ignored: Vec<usize> },
    #[error("`{name}`: unit `{unit}` ignored for an integer value")]
    UnitIgnored { name: String, unit: String },
}

/// Fatal, calculation-time failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("{model}: non-physical result: {detail}")]
    NonPhysical { model: String, detail: String },
    #[error("required parameter `{0}` has no value")]
    MissingRequired(String),
    #[error("accumulated errors:\n{0}")]
    Accumulated(String),
}

/// Shorthand for a boxed [CalculationError::NonPhysical]
pub fn non_physical<M: Into<String>, D: Into<String>>(model: M, detail: D) -> anyhow::Error {
    anyhow::Error::new(CalculationError::NonPhysical {
        model: model.into(),
        detail: detail.into(),
    })
}

/// Named input value with its default, validation and unit metadata.
///
/// Numeric values are held in `current_units`, the unit they were supplied in; typed getters on
/// [ParameterDict] convert to `preferred_units`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: ParameterValue,
    /// `None` when the parameter has no usable default
    pub default: Option<ParameterValue>,
    pub constraint: Constraint,
    pub unit_type: UnitType,
    pub preferred_units: Unit,
    pub current_units: Unit,
    pub required: bool,
    /// Set when the input deck held an entry for this parameter, whether or not it was valid
    pub provided: bool,
    pub valid: bool,
    /// Prefix of positional entries (`"<prefix> 1"`, `"<prefix> 2"`, ...) for list parameters
    pub positional_prefix: Option<String>,
    pub tooltip: String,
    pub err_message: String,
    /// Message left by the last read, if it did not go cleanly
    pub read_message: Option<String>,
}

impl Parameter {
    fn new(name: &str, value: ParameterValue, units: Unit, constraint: Constraint) -> Self {
        Self {
            name: name.to_string(),
            default: Some(value.clone()),
            value,
            constraint,
            unit_type: units.unit_type(),
            preferred_units: units,
            current_units: units,
            required: false,
            provided: false,
            valid: true,
            positional_prefix: None,
            tooltip: String::new(),
            err_message: format!("assume default value for `{name}`"),
            read_message: None,
        }
    }

    pub fn float(name: &str, default: f64, units: Unit, min: f64, max: f64) -> Self {
        Self::new(
            name,
            ParameterValue::Float(default),
            units,
            Constraint::Range { min, max },
        )
    }

    pub fn int(name: &str, default: i64, min: i64, max: i64) -> Self {
        Self::new(
            name,
            ParameterValue::Int(default),
            Unit::Dimensionless,
            Constraint::Range {
                min: min as f64,
                max: max as f64,
            },
        )
    }

    pub fn int_allowable(name: &str, default: i64, allowable: &[i64]) -> Self {
        Self::new(
            name,
            ParameterValue::Int(default),
            Unit::Dimensionless,
            Constraint::AllowableInts(allowable.to_vec()),
        )
    }

    pub fn boolean(name: &str, default: bool) -> Self {
        Self::new(
            name,
            ParameterValue::Bool(default),
            Unit::Dimensionless,
            Constraint::None,
        )
    }

    pub fn string(name: &str, default: &str) -> Self {
        Self::new(
            name,
            ParameterValue::Str(default.to_string()),
            Unit::Dimensionless,
            Constraint::None,
        )
    }

    /// String parameter without a usable default
    pub fn required_string(name: &str) -> Self {
        let mut param = Self::string(name, "");
        param.default = None;
        param.required = true;
        param
    }

    /// Float list read from positional `"<prefix> N"` entries
    pub fn list(
        name: &str,
        prefix: &str,
        default: Vec<f64>,
        units: Unit,
        min: f64,
        max: f64,
    ) -> Self {
        let mut param = Self::new(
            name,
            ParameterValue::List(default),
            units,
            Constraint::Range { min, max },
        );
        param.positional_prefix = Some(prefix.to_string());
        param
    }

    /// String list read from positional `"<prefix> N"` entries
    pub fn str_list(name: &str, prefix: &str) -> Self {
        let mut param = Self::new(
            name,
            ParameterValue::StrList(vec![]),
            Unit::Dimensionless,
            Constraint::None,
        );
        param.positional_prefix = Some(prefix.to_string());
        param
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = tooltip.to_string();
        self
    }

    pub fn err_message(mut self, err_message: &str) -> Self {
        self.err_message = err_message.to_string();
        self
    }

    pub fn allowable_strs(mut self, allowed: &[&str]) -> Self {
        self.constraint = Constraint::AllowableStrs(allowed.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self.value,
            ParameterValue::List(_) | ParameterValue::StrList(_)
        )
    }

    /// True when the user supplied a value that passed validation
    pub fn provided_and_valid(&self) -> bool {
        self.provided && self.valid
    }

    /// Restores the default after a failed read
    pub(crate) fn reset_to_default(&mut self) {
        if let Some(default) = &self.default {
            self.value = default.clone();
        }
        self.current_units = self.preferred_units;
    }
}

/// Shared three-phase contract of every sub-model: construction populates both dictionaries,
/// `read_parameters` consumes the deck and the family-specific `calculate` writes the outputs.
pub trait SubModel {
    /// Display name used in reports and error context
    fn name(&self) -> &str;
    fn parameters(&self) -> &ParameterDict;
    fn parameters_mut(&mut self) -> &mut ParameterDict;
    fn output_parameters(&self) -> &OutputParameterDict;
    fn output_parameters_mut(&mut self) -> &mut OutputParameterDict;

    /// Reads every recognized entry of `input`; unrecognized entries are ignored.
    fn read_parameters(&mut self, input: &InputParameters) -> anyhow::Result<()> {
        self.parameters_mut().read_from(input);
        Ok(())
    }
}
