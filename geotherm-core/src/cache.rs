//! Process-wide deduplication of identical runs.

use crate::imports::*;
use crate::model::Model;
use crate::outputs::RunResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Results keyed by the serialized input deck.  One coarse lock is held for the whole
/// computation, so concurrent requests for the same deck compute it once and share the result.
/// Failed runs are not cached.
#[derive(Debug, Default)]
pub struct ResultCache {
    results: Mutex<HashMap<Vec<u8>, Arc<RunResult>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached result for `input`, calculating it with `compute` on a miss
    pub fn get_or_compute<F>(&self, input: &InputParameters, compute: F) -> anyhow::Result<Arc<RunResult>>
    where
        F: FnOnce(&InputParameters) -> anyhow::Result<RunResult>,
    {
        let key = input.cache_key()?;
        let mut results = self
            .results
            .lock()
            .map_err(|_| anyhow!("result cache lock poisoned"))?;
        if let Some(result) = results.get(&key) {
            log::debug!("result cache hit");
            return Ok(Arc::clone(result));
        }
        let result = Arc::new(compute(input)?);
        results.insert(key, Arc::clone(&result));
        Ok(result)
    }

    /// Full run through the cache
    pub fn run(&self, input: &InputParameters) -> anyhow::Result<Arc<RunResult>> {
        self.get_or_compute(input, |input| Model::run(input.clone()))
    }
}
