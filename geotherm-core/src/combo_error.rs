//! Accumulator for several errors raised while calculating one sub-model.

use std::fmt::{Debug, Display};
use std::ops::{Deref, DerefMut};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ComboError<E: Display> {
    layer: usize,
    error: E,
}

impl<E: Debug + Display> ComboError<E> {
    pub fn new(error: E) -> Self {
        Self { layer: 0, error }
    }
}

impl<E: Debug + Display> Deref for ComboError<E> {
    type Target = E;
    fn deref(&self) -> &E {
        &self.error
    }
}

/// Ordered collection of errors, each tagged with its context depth
pub struct ComboErrors<E: Debug + Display>(Vec<ComboError<E>>);

impl<E: Debug + Display> ComboErrors<E> {
    #[inline]
    pub fn new() -> Self {
        ComboErrors(vec![])
    }

    /// Prepend a context error, pushing every existing error one layer deeper
    #[inline]
    pub fn add_context(&mut self, error_add: E) {
        for error in &mut self.0 {
            error.layer += 1;
        }
        self.0.insert(0, ComboError::<E>::new(error_add));
    }

    #[inline]
    pub fn push(&mut self, error_add: E) {
        self.0.push(ComboError::<E>::new(error_add));
    }
}

impl ComboErrors<anyhow::Error> {
    /// Record `msg` when `condition` does not hold
    pub fn check(&mut self, condition: bool, msg: impl Into<String>) {
        if !condition {
            self.push(anyhow::anyhow!(msg.into()));
        }
    }

    /// Collapse into a single [anyhow::Error] naming the sub-model that accumulated the errors
    pub fn into_result(mut self, source: &str) -> anyhow::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        self.add_context(anyhow::anyhow!("{source} calculation failed"));
        Err(anyhow::Error::new(
            crate::parameter::CalculationError::Accumulated(self.to_string()),
        ))
    }
}

impl<E: Debug + Display> Default for ComboErrors<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Debug + Display> Deref for ComboErrors<E> {
    type Target = Vec<ComboError<E>>;
    fn deref(&self) -> &Vec<ComboError<E>> {
        &self.0
    }
}

impl<E: Debug + Display> DerefMut for ComboErrors<E> {
    fn deref_mut(&mut self) -> &mut Vec<ComboError<E>> {
        &mut self.0
    }
}

impl<E: Debug + Display> std::error::Error for ComboErrors<E> {}

impl<E: Debug + Display> Display for ComboErrors<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bullet = "- ";
        let tab = "  ";
        for error in &self.0 {
            writeln!(f, "{}{}{}", tab.repeat(error.layer), bullet, error.error)?;
        }
        Ok(())
    }
}

impl<E: Debug + Display> Debug for ComboErrors<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bullet = "- ";
        let tab = "  ";
        writeln!(f, "Combo error:")?;
        for error in &self.0 {
            writeln!(f, "{}{}{:?}", tab.repeat(error.layer), bullet, error.error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_accumulator_is_ok() {
        let errors: ComboErrors<anyhow::Error> = ComboErrors::new();
        assert!(errors.into_result("Reservoir").is_ok());
    }

    #[test]
    fn test_accumulated_errors_become_one_failure() {
        let mut errors: ComboErrors<anyhow::Error> = ComboErrors::new();
        errors.check(false, "negative flow");
        errors.check(true, "never recorded");
        errors.check(false, "NaN temperature");
        assert_eq!(errors.len(), 2);
        let err = errors.into_result("WellBores").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("WellBores calculation failed"));
        assert!(msg.contains("negative flow"));
        assert!(msg.contains("NaN temperature"));
        assert!(!msg.contains("never recorded"));
    }
}
