//! Ingestion of the flat `Description, Value[, Comment]` input deck.

use crate::imports::*;

/// One un-interpreted row of an input deck
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub name: String,
    /// Raw value, possibly followed by a unit token
    pub value: String,
    #[serde(default)]
    pub comment: String,
}

impl ParameterEntry {
    pub fn new<S: Into<String>>(name: S, value: S) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            comment: String::new(),
        }
    }
}

/// Raw input deck keyed by trimmed description.  Ordered so that two decks with the same entries
/// serialize, and therefore hash, identically.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputParameters(pub BTreeMap<String, ParameterEntry>);

impl SerdeAPI for InputParameters {}

/// Lines starting with this prefix override the preferred unit of an output parameter.
pub const UNITS_OVERRIDE_PREFIX: &str = "Units:";

impl InputParameters {
    /// Parses deck text.  Comment lines (`#`), blank lines and lines with fewer than two
    /// comma-separated fields are skipped; commas past the second belong to the comment.
    /// A repeated description keeps its last value.
    pub fn parse_str(contents: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.splitn(3, ',');
            let (Some(name), Some(value)) = (fields.next(), fields.next()) else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let entry = ParameterEntry {
                name: name.to_string(),
                value: value.trim().to_string(),
                comment: fields.next().unwrap_or_default().trim().to_string(),
            };
            if entries.insert(name.to_string(), entry).is_some() {
                log::debug!("duplicate input entry `{name}`, keeping the last value");
            }
        }
        Self(entries)
    }

    /// Loads an input deck.  `.yaml`, `.yml` and `.json` files hold a serialized
    /// [InputParameters]; anything else is parsed as deck text.  A missing file yields an empty
    /// deck so that the run proceeds on defaults.
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("input file {path:?} not found, running on default values");
            return Ok(Self::default());
        }
        match path.extension().and_then(OsStr::to_str) {
            Some("yaml") | Some("yml") | Some("json") => Self::from_file(path),
            _ => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Could not read input file {path:?}"))?;
                Ok(Self::parse_str(&contents))
            }
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut input = Self::default();
        for (name, value) in pairs {
            input.insert(name, value);
        }
        input
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        let name = name.into().trim().to_string();
        let value = value.into().trim().to_string();
        self.0.insert(name.clone(), ParameterEntry::new(name, value));
    }

    pub fn get(&self, name: &str) -> Option<&ParameterEntry> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterEntry> {
        self.0.values()
    }

    /// `(output name, unit token)` pairs of every `Units:<Output Name>` line
    pub fn unit_overrides(&self) -> Vec<(&str, &str)> {
        self.0
            .iter()
            .filter_map(|(name, entry)| {
                name.strip_prefix(UNITS_OVERRIDE_PREFIX)
                    .map(|output| (output.trim(), entry.value.as_str()))
            })
            .collect()
    }

    /// Stable key identifying this deck's content
    pub fn cache_key(&self) -> anyhow::Result<Vec<u8>> {
        self.to_bincode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DECK: &str = "\
# example deck
Reservoir Model, 1, Multiple parallel fractures
Reservoir Depth, 3 kilometers, deep, but not too deep, really

just a description
Number of Production Wells,2
  Number of Injection Wells ,  2  ,
, 7, nameless
Units:LCOE, USD/MWh
";

    #[test]
    fn test_parse_str() {
        let input = InputParameters::parse_str(DECK);
        assert_eq!(input.len(), 5);
        let depth = input.get("Reservoir Depth").unwrap();
        assert_eq!(depth.value, "3 kilometers");
        assert_eq!(depth.comment, "deep, but not too deep, really");
        assert_eq!(input.get("Number of Injection Wells").unwrap().value, "2");
        assert_eq!(input.get("Reservoir Model").unwrap().comment, "Multiple parallel fractures");
        assert!(!input.contains("just a description"));
        assert_eq!(input.unit_overrides(), vec![("LCOE", "USD/MWh")]);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let input = InputParameters::parse_str("Reservoir Model, 1\nReservoir Model, 3\n");
        assert_eq!(input.get("Reservoir Model").unwrap().value, "3");
    }

    #[test]
    fn test_missing_file_is_an_empty_deck() {
        let input = InputParameters::from_path("/definitely/not/a/deck.txt").unwrap();
        assert!(input.is_empty());
    }

    #[test]
    fn test_text_yaml_and_json_decks_agree() {
        let dir = tempfile::tempdir().unwrap();
        let text_path = dir.path().join("deck.txt");
        let mut file = File::create(&text_path).unwrap();
        file.write_all(DECK.as_bytes()).unwrap();
        let from_text = InputParameters::from_path(&text_path).unwrap();

        let yaml_path = dir.path().join("deck.yaml");
        from_text.to_file(&yaml_path).unwrap();
        let json_path = dir.path().join("deck.json");
        from_text.to_file(&json_path).unwrap();

        assert_eq!(InputParameters::from_path(&yaml_path).unwrap(), from_text);
        assert_eq!(InputParameters::from_path(&json_path).unwrap(), from_text);
    }

    #[test]
    fn test_cache_key_ignores_insertion_order() {
        let a = InputParameters::from_pairs([("A", "1"), ("B", "2")]);
        let b = InputParameters::from_pairs([("B", "2"), ("A", "1")]);
        assert_eq!(a.cache_key().unwrap(), b.cache_key().unwrap());
        let c = InputParameters::from_pairs([("A", "1"), ("B", "3")]);
        assert_ne!(a.cache_key().unwrap(), c.cache_key().unwrap());
    }
}
