use super::{read_list_parameter, read_parameter, CalculationError, Parameter, ParameterValue};
use crate::imports::*;
use crate::units::convert;

/// Insertion-ordered map of a sub-model's input parameters.  Keys are fixed once the owning
/// sub-model is constructed.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDict(IndexMap<String, Parameter>);

impl ParameterDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, param: Parameter) {
        self.0.insert(param.name.clone(), param);
    }

    /// Builder form of [Self::insert]
    pub fn with(mut self, param: Parameter) -> Self {
        self.insert(param);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads every entry of `input` that names one of these parameters.  List parameters accept
    /// either a single `;`-separated line under their own name or positional entries.
    pub fn read_from(&mut self, input: &InputParameters) {
        for param in self.0.values_mut() {
            match input.get(&param.name) {
                Some(entry) => read_parameter(entry, param),
                None if param.is_list() => read_list_parameter(input, param),
                None => {}
            }
            if param.required && !param.provided {
                log::warn!("required parameter `{}` was not provided", param.name);
            }
        }
    }

    /// Fails on the first required parameter that has neither a valid value nor a default
    pub fn verify_required(&self) -> anyhow::Result<()> {
        for param in self.0.values() {
            if param.required && !param.provided_and_valid() && param.default.is_none() {
                return Err(anyhow::Error::new(CalculationError::MissingRequired(
                    param.name.clone(),
                )));
            }
        }
        Ok(())
    }

    fn param(&self, name: &str) -> anyhow::Result<&Parameter> {
        self.0
            .get(name)
            .with_context(|| format!("no parameter named `{name}`"))
    }

    /// Float value in preferred units
    pub fn f64(&self, name: &str) -> anyhow::Result<f64> {
        let param = self.param(name)?;
        match param.value {
            ParameterValue::Float(value) => {
                Ok(convert(value, param.current_units, param.preferred_units)?)
            }
            ParameterValue::Int(value) => Ok(value as f64),
            _ => bail!("`{name}` is not numeric"),
        }
    }

    pub fn int(&self, name: &str) -> anyhow::Result<i64> {
        match self.param(name)?.value {
            ParameterValue::Int(value) => Ok(value),
            _ => bail!("`{name}` is not an integer"),
        }
    }

    pub fn usize(&self, name: &str) -> anyhow::Result<usize> {
        let value = self.int(name)?;
        ensure!(value >= 0, "`{name}` is negative: {value}");
        Ok(value as usize)
    }

    pub fn bool(&self, name: &str) -> anyhow::Result<bool> {
        match self.param(name)?.value {
            ParameterValue::Bool(value) => Ok(value),
            _ => bail!("`{name}` is not a boolean"),
        }
    }

    pub fn str(&self, name: &str) -> anyhow::Result<&str> {
        match &self.param(name)?.value {
            ParameterValue::Str(value) => Ok(value),
            _ => bail!("`{name}` is not a string"),
        }
    }

    /// Float list in preferred units
    pub fn list(&self, name: &str) -> anyhow::Result<Vec<f64>> {
        let param = self.param(name)?;
        match &param.value {
            ParameterValue::List(values) => values
                .iter()
                .map(|v| {
                    convert(*v, param.current_units, param.preferred_units)
                        .map_err(anyhow::Error::from)
                })
                .collect(),
            _ => bail!("`{name}` is not a list"),
        }
    }

    pub fn str_list(&self, name: &str) -> anyhow::Result<&[String]> {
        match &self.param(name)?.value {
            ParameterValue::StrList(values) => Ok(values),
            _ => bail!("`{name}` is not a string list"),
        }
    }

    /// Float value when the user supplied a valid one, e.g. for cost overrides
    pub fn f64_if_provided(&self, name: &str) -> anyhow::Result<Option<f64>> {
        if self.param(name)?.provided_and_valid() {
            self.f64(name).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn provided_and_valid(&self, name: &str) -> bool {
        self.0.get(name).map_or(false, Parameter::provided_and_valid)
    }
}
