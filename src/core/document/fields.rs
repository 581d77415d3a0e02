//! Allow-listed string field bags shared by environment records and step inputs.
//!
//! Both record kinds are flat maps of optional string parameters. Instead of a
//! struct with one `Option<String>` per name, a [`FieldBag`] stores only the
//! populated entries and checks every name against the static catalog of its
//! context. Empty values are never stored, so serializing a bag can only emit
//! fields that carried a value in the source.

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Static allow-list of field names accepted in one record context.
pub trait FieldCatalog {
    /// Human-readable context used in diagnostics.
    const CONTEXT: &'static str;
    const NAMES: &'static [&'static str];

    fn is_known(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }
}

/// Names accepted in `app.envs` and workflow `envs` entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvironmentFields;

impl FieldCatalog for EnvironmentFields {
    const CONTEXT: &'static str = "environment variable";
    const NAMES: &'static [&'static str] = &[
        "BITRISE_STEP_ID",
        "BITRISE_STEP_GIT_CLONE_URL",
        "MY_STEPLIB_REPO_FORK_GIT_URL",
        "BITRISE_BUILD_URL",
        "BITRISE_BUILD_API_TOKEN",
        "BITRISE_CERTIFICATE_URL",
        "BITRISE_CERTIFICATE_PASSPHRASE",
        "TEAM_ID",
        "BITRISE_KEYCHAIN_PASSWORD",
        "API_TOKEN",
        "APP_SLUG",
        "ORIG_BITRISE_SOURCE_DIR",
        "SAMPLE_APP_URL",
        "BRANCH",
        "BITRISE_PROJECT_PATH",
        "BITRISE_SCHEME",
        "BITRISE_CONFIGURATION",
        "DISTRIBUTION_TYPE",
        "GENERATE_PROFILES",
        "INSTALL_PODS",
        "BITRISE_STEP_VERSION",
    ];
}

/// Names accepted in a step's `inputs` entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFields;

impl FieldCatalog for InputFields {
    const CONTEXT: &'static str = "step input";
    const NAMES: &'static [&'static str] = &[
        "build_url",
        "build_api_token",
        "certificate_urls",
        "passphrases",
        "team_id",
        "distribution_type",
        "project_path",
        "scheme",
        "configuration",
        "verbose_log",
        "generate_profiles",
        "export_method",
        "output_tool",
        "notify_user_groups",
        "path",
        "is_create_path",
        "content",
        "api_token",
        "app_slug",
        "workflow_id",
    ];
}

/// A flat record of populated, allow-listed string fields.
///
/// Entries keep their source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBag<C> {
    values: IndexMap<String, String>,
    catalog: PhantomData<C>,
}

/// One environment-variable record attached to the app or a workflow.
pub type EnvironmentVariable = FieldBag<EnvironmentFields>;

/// One input record attached to a step.
pub type Input = FieldBag<InputFields>;

impl<C: FieldCatalog> FieldBag<C> {
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
            catalog: PhantomData,
        }
    }

    /// Build a bag from `(name, value)` pairs, rejecting names outside the catalog.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut bag = Self::new();
        for (name, value) in pairs {
            bag.set(name, value)?;
        }
        Ok(bag)
    }

    /// Set a field. An empty value clears the field.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), AppError> {
        if !C::is_known(name) {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!("'{}' is not a recognized {} field", name, C::CONTEXT),
            ));
        }
        let value = value.into();
        if value.is_empty() {
            self.values.shift_remove(name);
        } else {
            self.values.insert(name.to_string(), value);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<C: FieldCatalog> Serialize for FieldBag<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de, C: FieldCatalog> Deserialize<'de> for FieldBag<C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldBagVisitor(PhantomData))
    }
}

struct FieldBagVisitor<C>(PhantomData<C>);

impl<'de, C: FieldCatalog> Visitor<'de> for FieldBagVisitor<C> {
    type Value = FieldBag<C>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a mapping of {} fields", C::CONTEXT)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FieldBag::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut bag = FieldBag::new();
        while let Some(name) = access.next_key::<String>()? {
            if !C::is_known(&name) {
                // Reported by the schema audit; the typed model drops it.
                access.next_value::<IgnoredAny>()?;
                continue;
            }
            let value = access.next_value::<Option<ScalarText>>().map_err(|err| {
                de::Error::custom(format!(
                    "{} field '{}' must be a scalar: {}",
                    C::CONTEXT,
                    name,
                    err
                ))
            })?;
            if let Some(ScalarText(text)) = value {
                if !text.is_empty() {
                    bag.values.insert(name, text);
                }
            }
        }
        Ok(bag)
    }
}

/// Source text of a scalar, exactly as written.
///
/// Requested through `deserialize_str`, so a plain `1.10` stays `"1.10"`
/// instead of being resolved to a float first.
struct ScalarText(String);

impl<'de> Deserialize<'de> for ScalarText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(ScalarTextVisitor)
    }
}

struct ScalarTextVisitor;

impl<'de> Visitor<'de> for ScalarTextVisitor {
    type Value = ScalarText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ScalarText(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(ScalarText(value))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(ScalarText(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ScalarText(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ScalarText(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(ScalarText(value.to_string()))
    }
}

/// Source text of a scalar field; `None` for null or a missing value.
pub(crate) fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ScalarText>::deserialize(deserializer)?.map(|ScalarText(text)| text))
}
