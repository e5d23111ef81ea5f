//! Hierarchical per-user settings and the option schema that declares them.
//!
//! A [`SettingGroup`] is what users store: string values keyed by option id
//! plus named subgroups. An [`OptionGroup`] is the read-only schema loaded at
//! startup; it supplies types and default values. Defaults are merged in on
//! read only, so the stored form stays exactly what the user set.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// SettingGroup
// ---------------------------------------------------------------------------

/// One level of a user's settings tree.
///
/// Wire form: `{"settings": {"key": "value"}, "subgroup": {"name": {...}}}`.
/// Submitted trees go through [`SettingGroup::from_submitted`] (or the
/// `Deserialize` impl, which applies the same rules) and must have exactly
/// that shape with scalar values. Stored rows are read with
/// [`SettingGroup::from_stored`], which also repairs the older flat form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingGroup {
    pub settings: BTreeMap<String, String>,
    #[serde(rename = "subgroup")]
    pub subgroups: BTreeMap<String, SettingGroup>,
}

impl SettingGroup {
    /// Parse the stored JSON column, repairing missing or legacy structure.
    ///
    /// A flat object such as `{"theme": "dark"}` is moved into `settings`,
    /// nested objects become subgroups, and numbers/bools are kept as their
    /// string form.
    pub fn from_stored(column: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(column)?;
        Ok(Self::repair(&value))
    }

    /// Convert a client-submitted tree, rejecting anything that is not the
    /// structured form.
    ///
    /// The root, `settings` and `subgroup` must be objects; setting values
    /// must be strings, numbers or bools. Unknown keys are rejected.
    pub fn from_submitted(value: &Value) -> Result<Self, CoreError> {
        Self::strict(value, "")
    }

    fn strict(value: &Value, path: &str) -> Result<Self, CoreError> {
        let invalid = |what: &str| {
            let at = if path.is_empty() { "root" } else { path };
            CoreError::InvalidPreferenceValue(format!("{at}: {what}"))
        };

        let object = value
            .as_object()
            .ok_or_else(|| invalid("expected an object"))?;

        let mut group = Self::default();
        for (key, member) in object {
            match key.as_str() {
                "settings" => {
                    let settings = member
                        .as_object()
                        .ok_or_else(|| invalid("settings must be an object"))?;
                    for (id, raw) in settings {
                        let text = scalar_to_string(raw)
                            .ok_or_else(|| invalid(&format!("{id} must be a scalar")))?;
                        group.settings.insert(id.clone(), text);
                    }
                }
                "subgroup" => {
                    let subgroups = member
                        .as_object()
                        .ok_or_else(|| invalid("subgroup must be an object"))?;
                    for (name, sub) in subgroups {
                        let sub_path = if path.is_empty() {
                            name.clone()
                        } else {
                            format!("{path}.{name}")
                        };
                        group
                            .subgroups
                            .insert(name.clone(), Self::strict(sub, &sub_path)?);
                    }
                }
                other => return Err(invalid(&format!("unexpected key {other}"))),
            }
        }
        Ok(group)
    }

    fn repair(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut group = Self::default();

        if object.contains_key("settings") || object.contains_key("subgroup") {
            if let Some(settings) = object.get("settings").and_then(Value::as_object) {
                for (key, value) in settings {
                    if let Some(text) = scalar_to_string(value) {
                        group.settings.insert(key.clone(), text);
                    }
                }
            }
            if let Some(subgroups) = object.get("subgroup").and_then(Value::as_object) {
                for (name, sub) in subgroups {
                    group.subgroups.insert(name.clone(), Self::repair(sub));
                }
            }
            return group;
        }

        for (key, value) in object {
            if value.is_object() {
                group.subgroups.insert(key.clone(), Self::repair(value));
            } else if let Some(text) = scalar_to_string(value) {
                group.settings.insert(key.clone(), text);
            }
        }
        group
    }

    pub fn to_stored(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Return the named subgroup, creating it if absent.
    pub fn sub_group(&mut self, id: &str) -> &mut SettingGroup {
        self.subgroups.entry(id.to_string()).or_default()
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) {
        self.settings.insert(id.to_string(), value.into());
    }

    pub fn value_as_string(&self, id: &str) -> Result<&str, CoreError> {
        self.settings
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| CoreError::SettingNotFound(id.to_string()))
    }

    pub fn value_as_bool(&self, id: &str) -> Result<bool, CoreError> {
        let raw = self.value_as_string(id)?;
        parse_bool(raw).ok_or_else(|| CoreError::InvalidPreferenceValue(format!("{id}={raw}")))
    }

    /// Walk `path[..len-1]` as subgroups (creating them) and read the leaf as a string.
    pub fn setting_as_string(&mut self, path: &[&str]) -> Result<String, CoreError> {
        let (group, leaf) = self.walk(path)?;
        group.value_as_string(leaf).map(str::to_string)
    }

    /// Walk `path[..len-1]` as subgroups (creating them) and read the leaf as a bool.
    pub fn setting_as_bool(&mut self, path: &[&str]) -> Result<bool, CoreError> {
        let (group, leaf) = self.walk(path)?;
        group.value_as_bool(leaf)
    }

    fn walk<'a, 'p>(
        &'a mut self,
        path: &[&'p str],
    ) -> Result<(&'a mut SettingGroup, &'p str), CoreError> {
        let Some((leaf, parents)) = path.split_last() else {
            return Err(CoreError::SettingNotFound(String::new()));
        };
        let mut group = self;
        for name in parents {
            group = group.sub_group(name);
        }
        Ok((group, *leaf))
    }
}

impl<'de> Deserialize<'de> for SettingGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_submitted(&value).map_err(serde::de::Error::custom)
    }
}

/// Boolean tokens accepted for settings: `1 t T TRUE true True` and their false counterparts.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Option schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Int,
    String,
    Float,
    Bool,
}

impl OptionType {
    pub fn accepts(self, raw: &str) -> bool {
        match self {
            OptionType::Int => raw.trim().parse::<i64>().is_ok(),
            OptionType::Float => raw.trim().parse::<f64>().is_ok(),
            OptionType::Bool => parse_bool(raw).is_some(),
            OptionType::String => true,
        }
    }
}

/// A single declared preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: OptionType,
    #[serde(rename = "defaultValue", deserialize_with = "scalar_string")]
    pub default_value: String,
}

/// A schema node: declared options plus nested groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionDef>,
    #[serde(default)]
    pub subgroups: Vec<OptionGroup>,
}

impl OptionGroup {
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document)
    }

    /// Insert the default of every declared option missing from `settings`.
    ///
    /// Existing values are never overwritten, so applying this twice is the
    /// same as applying it once.
    pub fn merge_defaults(&self, settings: &mut SettingGroup) {
        for option in &self.options {
            settings
                .settings
                .entry(option.id.clone())
                .or_insert_with(|| option.default_value.clone());
        }
        for group in &self.subgroups {
            group.merge_defaults(settings.sub_group(&group.id));
        }
    }

    /// Reject values for declared options that do not parse as the declared type.
    pub fn validate(&self, settings: &SettingGroup) -> Result<(), CoreError> {
        for option in &self.options {
            if let Some(raw) = settings.settings.get(&option.id) {
                if !option.kind.accepts(raw) {
                    return Err(CoreError::InvalidPreferenceValue(format!(
                        "{}={raw}",
                        option.id
                    )));
                }
            }
        }
        for group in &self.subgroups {
            if let Some(sub) = settings.subgroups.get(&group.id) {
                group.validate(sub)?;
            }
        }
        Ok(())
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value)
        .ok_or_else(|| serde::de::Error::custom("defaultValue must be a string, number or bool"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn schema() -> OptionGroup {
        OptionGroup::from_json(
            r#"{
                "id": "root",
                "options": [
                    { "id": "id1", "type": "string", "defaultValue": "33" },
                    { "id": "pageSize", "type": "int", "defaultValue": 25 }
                ],
                "subgroups": [
                    {
                        "id": "notifications",
                        "options": [ { "id": "email", "type": "bool", "defaultValue": true } ]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_fill_only_missing_keys() {
        let mut settings = SettingGroup::from_stored(r#"{"id2":"blue","pageSize":"50"}"#).unwrap();
        schema().merge_defaults(&mut settings);

        assert_eq!(settings.settings["id1"], "33");
        assert_eq!(settings.settings["id2"], "blue");
        assert_eq!(settings.settings["pageSize"], "50");
        assert_eq!(settings.subgroups["notifications"].settings["email"], "true");
    }

    #[test]
    fn merge_is_a_fixed_point() {
        let mut once = SettingGroup::default();
        schema().merge_defaults(&mut once);
        let stored = once.to_stored().unwrap();

        let mut twice = SettingGroup::from_stored(&stored).unwrap();
        schema().merge_defaults(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn structured_form_round_trips() {
        let mut group = SettingGroup::default();
        group.set_value("a", "1");
        group.sub_group("ui").set_value("theme", "dark");

        let parsed = SettingGroup::from_stored(&group.to_stored().unwrap()).unwrap();
        assert_eq!(parsed, group);
    }

    #[test]
    fn missing_maps_are_repaired() {
        let parsed = SettingGroup::from_stored(r#"{"settings":{"a":"b"}}"#).unwrap();
        assert_eq!(parsed.settings["a"], "b");
        assert!(parsed.subgroups.is_empty());

        let empty = SettingGroup::from_stored("null").unwrap();
        assert_eq!(empty, SettingGroup::default());
    }

    #[test]
    fn submitted_trees_must_be_structured() {
        let ok = SettingGroup::from_submitted(&serde_json::json!({
            "settings": { "a": "x", "n": 3, "b": true },
            "subgroup": { "ui": { "settings": { "theme": "dark" } } }
        }))
        .unwrap();
        assert_eq!(ok.settings["n"], "3");
        assert_eq!(ok.subgroups["ui"].settings["theme"], "dark");

        for bad in [
            serde_json::json!([1, 2, 3]),
            serde_json::json!("x"),
            serde_json::json!({ "settings": { "id2": ["x"] } }),
            serde_json::json!({ "settings": { "id2": { "nested": "x" } } }),
            serde_json::json!({ "settings": [] }),
            serde_json::json!({ "subgroup": "ui" }),
            serde_json::json!({ "subgroup": { "ui": { "settings": { "t": null } } } }),
            serde_json::json!({ "theme": "dark" }),
        ] {
            assert_matches!(
                SettingGroup::from_submitted(&bad),
                Err(CoreError::InvalidPreferenceValue(_)),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn deserialize_uses_the_strict_rules() {
        assert!(serde_json::from_str::<SettingGroup>("[1,2,3]").is_err());
        assert!(serde_json::from_str::<SettingGroup>(r#"{"settings":{"a":"b"}}"#).is_ok());
    }

    #[test]
    fn sub_group_auto_vivifies() {
        let mut group = SettingGroup::default();
        assert_matches!(
            group.setting_as_string(&["ui", "theme"]),
            Err(CoreError::SettingNotFound(_))
        );
        assert!(group.subgroups.contains_key("ui"));
    }

    #[test]
    fn bool_accessor_accepts_standard_tokens() {
        let mut group = SettingGroup::default();
        group.sub_group("n").set_value("email", "T");
        group.sub_group("n").set_value("sms", "0");
        group.sub_group("n").set_value("push", "maybe");

        assert_eq!(group.setting_as_bool(&["n", "email"]), Ok(true));
        assert_eq!(group.setting_as_bool(&["n", "sms"]), Ok(false));
        assert_matches!(
            group.setting_as_bool(&["n", "push"]),
            Err(CoreError::InvalidPreferenceValue(_))
        );
        assert_matches!(
            group.value_as_bool("absent"),
            Err(CoreError::SettingNotFound(_))
        );
    }

    #[test]
    fn validation_checks_declared_types() {
        let mut ok = SettingGroup::default();
        ok.set_value("pageSize", "10");
        ok.set_value("free", "anything");
        assert!(schema().validate(&ok).is_ok());

        let mut bad = SettingGroup::default();
        bad.sub_group("notifications").set_value("email", "perhaps");
        assert_matches!(
            schema().validate(&bad),
            Err(CoreError::InvalidPreferenceValue(_))
        );
    }

    #[test]
    fn option_types_parse_their_values() {
        assert!(OptionType::Int.accepts("-4"));
        assert!(!OptionType::Int.accepts("4.5"));
        assert!(OptionType::Float.accepts("4.5"));
        assert!(OptionType::String.accepts(""));
    }
}
