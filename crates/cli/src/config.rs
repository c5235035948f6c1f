use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use inventory_loader::DEFAULT_REFRESH;
use inventory_protocol::DEFAULT_DISPLAY_FIELDS;
use inventory_search::Locale;
use inventory_table::{Field, Normalizer, SchemaAliases};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "INVENTORY_FINDER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "inventory-finder.toml";

const SECTIONS: [(&str, &[&str]); 4] = [
    ("source", &["path", "delimiter"]),
    ("cache", &["refresh_seconds"]),
    ("schema", &["aliases", "fill_down"]),
    ("display", &["columns", "locale"]),
];

/// Hint attached to config errors: every key the file may contain.
#[must_use]
pub fn allowed_keys_hint() -> String {
    let keys: Vec<String> = SECTIONS
        .iter()
        .flat_map(|(section, keys)| keys.iter().map(move |key| format!("{section}.{key}")))
        .collect();
    format!("Allowed keys: {}", keys.join(", "))
}

/// Effective settings after merging the config file with built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderConfig {
    pub source: Option<PathBuf>,
    pub delimiter: u8,
    pub refresh: Duration,
    /// Extra column names per field, tried before the built-in ones
    pub aliases: BTreeMap<Field, Vec<String>>,
    /// `None` keeps the normalizer's default group-level fields
    pub fill_down: Option<Vec<Field>>,
    pub display: Vec<Field>,
    pub locale: Locale,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            source: None,
            delimiter: b',',
            refresh: DEFAULT_REFRESH,
            aliases: BTreeMap::new(),
            fill_down: None,
            display: DEFAULT_DISPLAY_FIELDS.to_vec(),
            locale: Locale::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    source: Option<RawSource>,
    cache: Option<RawCache>,
    schema: Option<RawSchema>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSource {
    path: Option<PathBuf>,
    delimiter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCache {
    refresh_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    #[serde(default)]
    aliases: BTreeMap<String, Vec<String>>,
    fill_down: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDisplay {
    columns: Option<Vec<String>>,
    locale: Option<String>,
}

impl FinderConfig {
    /// Config file to read: `explicit`, then `$INVENTORY_FINDER_CONFIG`, then
    /// `inventory-finder.toml` in the working directory if it exists.
    pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            return Ok(Some(path.to_path_buf()));
        }
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Ok(Some(PathBuf::from(path)));
            }
        }
        let fallback = env::current_dir()
            .context("Failed to read the working directory")?
            .join(DEFAULT_CONFIG_FILE);
        Ok(fallback.is_file().then_some(fallback))
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::locate(explicit)? else {
            log::debug!("No config file, using defaults");
            return Ok(Self::default());
        };
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_bytes(&bytes)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse JSON or TOML. Unknown keys are rejected by dotted path.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(json_err) => {
                let utf8 =
                    std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
                let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                    anyhow!(
                        "Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                    )
                })?;
                serde_json::to_value(toml_value)
                    .map_err(|err| anyhow!("Failed to convert TOML config to JSON: {err}"))?
            }
        };

        validate_config_value(&value)?;
        let raw: RawConfig =
            serde_json::from_value(value).map_err(|err| anyhow!("Config parse error: {err}"))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let defaults = Self::default();
        let source = raw.source.unwrap_or_default();
        let cache = raw.cache.unwrap_or_default();
        let schema = raw.schema.unwrap_or_default();
        let display = raw.display.unwrap_or_default();

        let mut aliases = BTreeMap::new();
        for (key, names) in schema.aliases {
            let field = parse_field(&key, "schema.aliases")?;
            let names: Vec<String> = names
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            aliases.insert(field, names);
        }

        let fill_down = schema
            .fill_down
            .map(|keys| parse_fields(&keys, "schema.fill_down"))
            .transpose()?;

        Ok(Self {
            source: source.path,
            delimiter: match source.delimiter {
                Some(text) => parse_delimiter(&text).context("source.delimiter")?,
                None => defaults.delimiter,
            },
            refresh: cache
                .refresh_seconds
                .map_or(defaults.refresh, Duration::from_secs),
            aliases,
            fill_down,
            display: match display.columns {
                Some(keys) => parse_fields(&keys, "display.columns")?,
                None => defaults.display,
            },
            locale: match display.locale {
                Some(text) => text.parse::<Locale>().context("display.locale")?,
                None => defaults.locale,
            },
        })
    }

    /// Normalizer with configured aliases ahead of the built-in ones.
    pub fn normalizer(&self) -> Result<Normalizer> {
        let mut aliases = SchemaAliases::builtin();
        for (field, names) in &self.aliases {
            aliases.prepend(*field, names.iter().cloned());
        }
        let normalizer = Normalizer::new(aliases);
        match &self.fill_down {
            Some(fields) => Ok(normalizer.with_fill_down(fields.clone())?),
            None => Ok(normalizer),
        }
    }
}

/// Single-byte delimiter; `\t` and `tab` mean a tab.
pub fn parse_delimiter(text: &str) -> Result<u8> {
    let text = match text {
        "\\t" | "tab" => "\t",
        other => other,
    };
    match text.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(anyhow!("delimiter must be a single ASCII character, got {text:?}")),
    }
}

fn parse_field(key: &str, base: &str) -> Result<Field> {
    key.parse::<Field>()
        .map_err(|err| anyhow!("{base}.{key}: {err}"))
}

fn parse_fields(keys: &[String], base: &str) -> Result<Vec<Field>> {
    keys.iter()
        .enumerate()
        .map(|(idx, key)| {
            key.parse::<Field>()
                .map_err(|err| anyhow!("{base}[{idx}]: {err}"))
        })
        .collect()
}

fn validate_config_value(value: &serde_json::Value) -> Result<()> {
    fn validate_object_keys(
        unknown: &mut Vec<String>,
        obj: &serde_json::Map<String, serde_json::Value>,
        base: &str,
        allowed: &[&str],
    ) {
        for key in obj.keys() {
            if !allowed.iter().any(|a| a == &key.as_str()) {
                if base.is_empty() {
                    unknown.push(key.to_string());
                } else {
                    unknown.push(format!("{base}.{key}"));
                }
            }
        }
    }

    let serde_json::Value::Object(root) = value else {
        return Err(anyhow!("Config must be a table/object"));
    };

    let mut unknown = Vec::new();
    let section_names: Vec<&str> = SECTIONS.iter().map(|(section, _)| *section).collect();
    validate_object_keys(&mut unknown, root, "", &section_names);

    for (section, allowed) in SECTIONS {
        if let Some(serde_json::Value::Object(obj)) = root.get(section) {
            validate_object_keys(&mut unknown, obj, section, allowed);
        }
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        unknown.sort();
        Err(anyhow!("Unknown config keys: {}", unknown.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hint_lists_every_section_key() {
        let hint = allowed_keys_hint();
        assert!(hint.starts_with("Allowed keys: source.path, source.delimiter"));
        assert!(hint.contains("schema.fill_down"));
        assert!(hint.ends_with("display.locale"));
    }

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(FinderConfig::from_bytes(b"").unwrap(), FinderConfig::default());
        assert_eq!(FinderConfig::from_bytes(b"{}").unwrap(), FinderConfig::default());
    }

    #[test]
    fn toml_sections_are_merged() {
        let config = FinderConfig::from_bytes(
            r#"
            [source]
            path = "kho.csv"
            delimiter = ";"

            [cache]
            refresh_seconds = 30

            [schema]
            aliases = { holder = ["Người nhận"], serial = ["S/N"] }
            fill_down = ["product_name", "group_id"]

            [display]
            columns = ["serial", "holder"]
            locale = "en"
            "#
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(config.source, Some(PathBuf::from("kho.csv")));
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.refresh, Duration::from_secs(30));
        assert_eq!(config.aliases[&Field::Holder], vec!["Người nhận".to_string()]);
        assert_eq!(
            config.fill_down,
            Some(vec![Field::ProductName, Field::GroupId])
        );
        assert_eq!(config.display, vec![Field::Serial, Field::Holder]);
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn json_is_accepted_too() {
        let text = br#"{"display":{"locale":"vi"},"cache":{"refresh_seconds":5}}"#;
        let config = FinderConfig::from_bytes(text).unwrap();
        assert_eq!(config.refresh, Duration::from_secs(5));
        assert_eq!(config.locale, Locale::Vi);
    }

    #[test]
    fn unknown_keys_are_reported_with_paths() {
        let err = FinderConfig::from_bytes(
            b"[cache]\nrefresh_seconds = 1\nttl = 3\n[display]\ncolour = true\n",
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cache.ttl"), "{message}");
        assert!(message.contains("display.colour"), "{message}");
    }

    #[test]
    fn unknown_field_names_are_rejected() {
        let err = FinderConfig::from_bytes(b"[display]\ncolumns = [\"serial\", \"price\"]\n")
            .unwrap_err();
        assert!(err.to_string().contains("display.columns[1]"), "{err}");
    }

    #[test]
    fn serial_cannot_be_filled_down() {
        let config =
            FinderConfig::from_bytes(b"[schema]\nfill_down = [\"serial\"]\n").unwrap();
        assert!(config.normalizer().is_err());
    }

    #[test]
    fn configured_aliases_take_priority() {
        let text = "[schema]\naliases = { holder = [\"Người nhận\"] }\n";
        let config = FinderConfig::from_bytes(text.as_bytes()).unwrap();
        let normalizer = config.normalizer().unwrap();
        assert_eq!(normalizer.aliases().names(Field::Holder)[0], "Người nhận");
        assert!(normalizer
            .aliases()
            .names(Field::Holder)
            .iter()
            .any(|name| name == "NHÂN VIÊN NHẬN"));
    }

    #[test]
    fn delimiters() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("").is_err());
    }
}
