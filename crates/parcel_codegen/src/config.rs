//! Generator options, read from `[package.metadata.parcel]`.
//!
//! ```toml
//! [package.metadata.parcel]
//! creator-suffix = "Creator"        # `Ticket` -> `TicketCreator`
//! binder-name = "PayloadBinder"     # one per package
//! missing-key = "field-name"        # or "drop"
//! unsupported = "fatal"             # or "skip"
//! serializable = ["chrono::NaiveDate"]
//! ```

use parcel_macro_utils::Manifest;
use proc_macro2::{Ident, Span};
use syn::ext::IdentExt;
use toml_edit::{Item, TableLike, Value};

use crate::error::ConfigError;

/// The metadata table name under `[package.metadata]`.
pub const METADATA_TABLE: &str = "parcel";

/// What to do with an `#[extra]` that names no key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingKeyPolicy {
    /// Use the field's own name.
    #[default]
    FieldName,
    /// Drop the field with a warning.
    Drop,
}

/// What to do with a marked field whose type cannot be transported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnsupportedPolicy {
    /// Reject the whole host.
    #[default]
    Fatal,
    /// Drop the field with a warning, keep the host.
    Skip,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub creator_suffix: String,
    pub binder_name: String,
    pub missing_key: MissingKeyPolicy,
    pub unsupported: UnsupportedPolicy,
    /// Paths of foreign types to transport as serialized objects, written
    /// the way the scanned crate imports them (`chrono::NaiveDate`).
    pub serializable: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            creator_suffix: String::from("Creator"),
            binder_name: String::from("PayloadBinder"),
            missing_key: MissingKeyPolicy::default(),
            unsupported: UnsupportedPolicy::default(),
            serializable: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Read the configuration of the crate cargo is building.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_manifest(&Manifest::from_env()?)
    }

    /// Read `[package.metadata.parcel]`, defaults apply to missing keys.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, ConfigError> {
        match manifest.package_metadata(METADATA_TABLE) {
            Some(table) => Self::from_table(table),
            None => Ok(Self::default()),
        }
    }

    fn from_table(table: &dyn TableLike) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (key, item) in table.iter() {
            match key {
                "creator-suffix" => config.creator_suffix = identifier(key, item, true)?,
                "binder-name" => config.binder_name = identifier(key, item, false)?,
                "missing-key" => {
                    config.missing_key = match item.as_str() {
                        Some("field-name") => MissingKeyPolicy::FieldName,
                        Some("drop") => MissingKeyPolicy::Drop,
                        _ => return Err(invalid(key, "\"field-name\" or \"drop\"")),
                    };
                }
                "unsupported" => {
                    config.unsupported = match item.as_str() {
                        Some("fatal") => UnsupportedPolicy::Fatal,
                        Some("skip") => UnsupportedPolicy::Skip,
                        _ => return Err(invalid(key, "\"fatal\" or \"skip\"")),
                    };
                }
                "serializable" => {
                    let array = item
                        .as_array()
                        .ok_or_else(|| invalid(key, "an array of type paths"))?;
                    config.serializable = array
                        .iter()
                        .map(|value| {
                            value
                                .as_str()
                                .filter(|path| syn::parse_str::<syn::Path>(path).is_ok())
                                .map(normalize_path)
                                .ok_or_else(|| invalid(key, "an array of type paths"))
                        })
                        .collect::<Result<_, _>>()?;
                }
                _ => {
                    return Err(ConfigError::UnknownKey {
                        key: String::from(key),
                    });
                }
            }
        }
        Ok(config)
    }

    /// `<Host><creator_suffix>`, with a raw host such as `r#Match` read as
    /// `Match`.
    ///
    /// # Panics
    ///
    /// Panics if `creator_suffix` was set by hand to something that does not
    /// continue an identifier. Values read from the manifest are checked.
    pub fn creator_ident(&self, host: &Ident) -> Ident {
        Ident::new(&format!("{}{}", host.unraw(), self.creator_suffix), host.span())
    }

    pub fn binder_ident(&self) -> Ident {
        Ident::new(&self.binder_name, Span::call_site())
    }
}

fn invalid(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: String::from(key),
        expected,
    }
}

/// A string that forms an identifier, or an identifier suffix if `suffix`.
fn identifier(key: &str, item: &Item, suffix: bool) -> Result<String, ConfigError> {
    let expected = if suffix {
        "an identifier suffix"
    } else {
        "an identifier"
    };
    let text = item
        .as_value()
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(key, expected))?;
    // A suffix is appended to a type name, so it only has to continue one.
    let candidate = if suffix { format!("A{text}") } else { String::from(text) };
    if text.is_empty() || syn::parse_str::<Ident>(&candidate).is_err() {
        return Err(invalid(key, expected));
    }
    Ok(String::from(text))
}

/// `::chrono :: NaiveDate` -> `chrono::NaiveDate`
fn normalize_path(path: &str) -> String {
    path.split("::")
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("::")
}

#[cfg(test)]
mod tests {
    use super::{GeneratorConfig, MissingKeyPolicy, UnsupportedPolicy};
    use crate::error::ConfigError;
    use parcel_macro_utils::Manifest;
    use quote::format_ident;

    fn config(metadata: &str) -> Result<GeneratorConfig, ConfigError> {
        let text = format!("[package]\nname = \"app\"\n\n[package.metadata.parcel]\n{metadata}");
        GeneratorConfig::from_manifest(&Manifest::from_text(&text).unwrap())
    }

    #[test]
    fn defaults_without_table() {
        let manifest = Manifest::from_text("[package]\nname = \"app\"\n").unwrap();
        let config = GeneratorConfig::from_manifest(&manifest).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.creator_ident(&format_ident!("Ticket")), "TicketCreator");
        assert_eq!(config.binder_ident(), "PayloadBinder");
    }

    #[test]
    fn raw_host_names() {
        let config = GeneratorConfig::default();
        let host: proc_macro2::Ident = syn::parse_str("r#Match").unwrap();
        assert_eq!(config.creator_ident(&host), "MatchCreator");
        let host: proc_macro2::Ident = syn::parse_str("r#type").unwrap();
        assert_eq!(config.creator_ident(&host), "typeCreator");
    }

    #[test]
    fn every_key() {
        let config = config(
            r#"
            creator-suffix = "Launcher"
            binder-name = "Extras"
            missing-key = "drop"
            unsupported = "skip"
            serializable = ["::chrono::NaiveDate", "uuid::Uuid"]
            "#,
        )
        .unwrap();

        assert_eq!(config.creator_ident(&format_ident!("Ticket")), "TicketLauncher");
        assert_eq!(config.binder_ident(), "Extras");
        assert_eq!(config.missing_key, MissingKeyPolicy::Drop);
        assert_eq!(config.unsupported, UnsupportedPolicy::Skip);
        assert_eq!(config.serializable, ["chrono::NaiveDate", "uuid::Uuid"]);
    }

    #[test]
    fn suffix_may_start_with_a_digit() {
        let config = config("creator-suffix = \"2\"").unwrap();
        assert_eq!(config.creator_ident(&format_ident!("Step")), "Step2");
    }

    #[test]
    fn rejected_values() {
        assert!(matches!(
            config("binder-name = \"not an ident\""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config("creator-suffix = \"\""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config("unsupported = \"ignore\""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config("serializable = \"chrono::NaiveDate\""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config("sentinel = -2"),
            Err(ConfigError::UnknownKey { .. })
        ));
    }
}
