use crate::imports::*;
use crate::units::convert;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputValue {
    /// Declared but not yet calculated
    #[default]
    Unset,
    Scalar(f64),
    Series(Array1<f64>),
    Text(String),
}

/// Named result of a sub-model calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputParameter {
    pub name: String,
    pub value: OutputValue,
    pub unit_type: UnitType,
    /// Units `value` is calculated in
    pub current_units: Unit,
    /// Units `value` is reported in
    pub preferred_units: Unit,
    pub tooltip: String,
}

impl OutputParameter {
    pub fn new(name: &str, units: Unit) -> Self {
        Self {
            name: name.to_string(),
            value: OutputValue::Unset,
            unit_type: units.unit_type(),
            current_units: units,
            preferred_units: units,
            tooltip: String::new(),
        }
    }

    /// Reports in `units` instead of the calculation units.  Ignored with a warning when `units`
    /// is of another unit type.
    pub fn preferred(mut self, units: Unit) -> Self {
        if let Err(err) = self.set_preferred_units(units) {
            log::warn!("{err}");
        }
        self
    }

    pub fn tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = tooltip.to_string();
        self
    }

    pub fn is_set(&self) -> bool {
        !matches!(self.value, OutputValue::Unset)
    }

    pub fn set_preferred_units(&mut self, units: Unit) -> anyhow::Result<()> {
        convert(1.0, self.current_units, units)
            .with_context(|| format!("output `{}`", self.name))?;
        self.preferred_units = units;
        Ok(())
    }

    /// Value converted to `preferred_units`
    pub fn rendered(&self) -> anyhow::Result<OutputValue> {
        let (from, to) = (self.current_units, self.preferred_units);
        Ok(match &self.value {
            OutputValue::Unset => bail!("output `{}` was never calculated", self.name),
            OutputValue::Scalar(v) => OutputValue::Scalar(convert(*v, from, to)?),
            OutputValue::Series(values) => OutputValue::Series(
                values
                    .iter()
                    .map(|v| convert(*v, from, to))
                    .collect::<Result<Array1<f64>, _>>()?,
            ),
            OutputValue::Text(text) => OutputValue::Text(text.clone()),
        })
    }
}

/// Insertion-ordered map of a sub-model's outputs.  Every output is declared at construction;
/// setting an undeclared name is an error.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputParameterDict(IndexMap<String, OutputParameter>);

impl OutputParameterDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, output: OutputParameter) {
        self.0.insert(output.name.clone(), output);
    }

    pub fn with(mut self, output: OutputParameter) -> Self {
        self.declare(output);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OutputParameter> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut OutputParameter> {
        self.0.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputParameter> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of declared outputs that are still unset
    pub fn unset(&self) -> Vec<&str> {
        self.0
            .values()
            .filter(|o| !o.is_set())
            .map(|o| o.name.as_str())
            .collect()
    }

    fn output_mut(&mut self, name: &str) -> anyhow::Result<&mut OutputParameter> {
        self.0
            .get_mut(name)
            .with_context(|| format!("no output named `{name}`"))
    }

    fn output(&self, name: &str) -> anyhow::Result<&OutputParameter> {
        self.0
            .get(name)
            .with_context(|| format!("no output named `{name}`"))
    }

    pub fn set_scalar(&mut self, name: &str, value: f64) -> anyhow::Result<()> {
        self.output_mut(name)?.value = OutputValue::Scalar(value);
        Ok(())
    }

    pub fn set_series(&mut self, name: &str, values: Array1<f64>) -> anyhow::Result<()> {
        self.output_mut(name)?.value = OutputValue::Series(values);
        Ok(())
    }

    pub fn set_text<S: Into<String>>(&mut self, name: &str, text: S) -> anyhow::Result<()> {
        self.output_mut(name)?.value = OutputValue::Text(text.into());
        Ok(())
    }

    /// Scalar in calculation units
    pub fn scalar(&self, name: &str) -> anyhow::Result<f64> {
        match self.output(name)?.value {
            OutputValue::Scalar(value) => Ok(value),
            OutputValue::Unset => bail!("output `{name}` was never calculated"),
            _ => bail!("output `{name}` is not a scalar"),
        }
    }

    /// Scalar, or `None` while unset
    pub fn scalar_opt(&self, name: &str) -> Option<f64> {
        match self.0.get(name)?.value {
            OutputValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Series in calculation units
    pub fn series(&self, name: &str) -> anyhow::Result<&Array1<f64>> {
        match &self.output(name)?.value {
            OutputValue::Series(values) => Ok(values),
            OutputValue::Unset => bail!("output `{name}` was never calculated"),
            _ => bail!("output `{name}` is not a series"),
        }
    }

    /// In-place access for modules that adjust another module's production arrays
    pub fn series_mut(&mut self, name: &str) -> anyhow::Result<&mut Array1<f64>> {
        match &mut self.output_mut(name)?.value {
            OutputValue::Series(values) => Ok(values),
            OutputValue::Unset => bail!("output `{name}` was never calculated"),
            _ => bail!("output `{name}` is not a series"),
        }
    }

    pub fn text(&self, name: &str) -> anyhow::Result<&str> {
        match &self.output(name)?.value {
            OutputValue::Text(text) => Ok(text),
            OutputValue::Unset => bail!("output `{name}` was never calculated"),
            _ => bail!("output `{name}` is not text"),
        }
    }

    pub fn set_preferred_units(&mut self, name: &str, units: Unit) -> anyhow::Result<()> {
        self.output_mut(name)?.set_preferred_units(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs() -> OutputParameterDict {
        OutputParameterDict::new()
            .with(OutputParameter::new("LCOE", Unit::CentsPerKwh))
            .with(OutputParameter::new("Initial Reservoir Heat Content", Unit::Megajoule).preferred(Unit::Petajoule))
            .with(OutputParameter::new("Produced Temperature", Unit::Celsius))
    }

    #[test]
    fn test_outputs_start_unset() {
        let dict = outputs();
        assert_eq!(dict.unset().len(), 3);
        assert!(dict.scalar("LCOE").is_err());
        assert!(dict.scalar_opt("LCOE").is_none());
    }

    #[test]
    fn test_undeclared_output_cannot_be_set() {
        let mut dict = outputs();
        assert!(dict.set_scalar("LCOH", 1.0).is_err());
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_rendering_converts_to_preferred_units() {
        let mut dict = outputs();
        dict.set_scalar("Initial Reservoir Heat Content", 2.0e9).unwrap();
        let rendered = dict.get("Initial Reservoir Heat Content").unwrap().rendered().unwrap();
        match rendered {
            OutputValue::Scalar(v) => assert!(v.approx_eq(&2.0, 1e-9)),
            other => panic!("unexpected {other:?}"),
        }
        dict.set_preferred_units("LCOE", Unit::UsdPerMwh).unwrap();
        dict.set_scalar("LCOE", 5.0).unwrap();
        match dict.get("LCOE").unwrap().rendered().unwrap() {
            OutputValue::Scalar(v) => assert!(v.approx_eq(&50.0, 1e-9)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(dict.set_preferred_units("LCOE", Unit::Meter).is_err());
    }

    #[test]
    fn test_series_mut_adjusts_in_place() {
        let mut dict = outputs();
        dict.set_series("Produced Temperature", array![150.0, 149.0]).unwrap();
        dict.series_mut("Produced Temperature").unwrap()[1] -= 1.0;
        assert_eq!(dict.series("Produced Temperature").unwrap(), &array![150.0, 148.0]);
        assert!(dict.unset().contains(&"LCOE"));
    }
}
