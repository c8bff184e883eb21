//! Attribute and class conventions, loadable from TOML.
//!
//! Every field has a default matching the markup conventions of the server
//! templates, so an empty document (or no config at all) is valid:
//!
//! ```toml
//! [reorder]
//! order = "ascending"
//! settle_delay_ms = 80
//! ```
use dom::{Selector, SelectorError};
use serde::Deserialize;
use std::fmt;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FormsetConfig {
    /// Token replaced by the entry index in every attribute value of a new entry.
    pub placeholder: String,
    pub repeater: RepeaterConfig,
    pub remover: RemoverConfig,
    pub reorder: ReorderConfig,
    pub mirror: MirrorConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RepeaterConfig {
    pub trigger: String,
    pub template_attr: String,
    pub counter_attr: String,
    pub container_attr: String,
    /// Present on a new entry until its second animation frame.
    pub entering_class: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RemoverConfig {
    pub entry: String,
    pub flag: String,
    pub button_class: String,
    pub button_label: String,
    pub deleting_class: String,
    pub deleted_class: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReorderConfig {
    pub list: String,
    pub group_attr: String,
    pub active_attr: String,
    pub prefix_attr: String,
    /// Name suffix of a formset's management counter, after `<group>-`.
    pub counter_suffix: String,
    pub placeholder_row: String,
    pub priority_field: String,
    pub active_field: String,
    pub order: RankOrder,
    /// Delay before the dropped row's active checkbox is written.
    pub settle_delay_ms: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    pub attr: String,
}

/// How a row's position maps to its priority value.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    /// First row gets 1.
    Ascending,
    /// First row gets the row count; the server lists by descending priority.
    #[default]
    Descending,
}

impl RankOrder {
    pub fn rank(self, index: usize, count: usize) -> u64 {
        match self {
            RankOrder::Ascending => index as u64 + 1,
            RankOrder::Descending => count.saturating_sub(index) as u64,
        }
    }
}

impl Default for FormsetConfig {
    fn default() -> Self {
        Self {
            placeholder: "__prefix__".to_string(),
            repeater: RepeaterConfig::default(),
            remover: RemoverConfig::default(),
            reorder: ReorderConfig::default(),
            mirror: MirrorConfig::default(),
        }
    }
}

impl Default for RepeaterConfig {
    fn default() -> Self {
        Self {
            trigger: "[data-formset-template]".to_string(),
            template_attr: "data-formset-template".to_string(),
            counter_attr: "data-formset-counter".to_string(),
            container_attr: "data-formset-container".to_string(),
            entering_class: "formset-entering".to_string(),
        }
    }
}

impl Default for RemoverConfig {
    fn default() -> Self {
        Self {
            entry: ".formset-entry".to_string(),
            flag: ".delete-field input[type=checkbox]".to_string(),
            button_class: "formset-delete".to_string(),
            button_label: "Delete".to_string(),
            deleting_class: "formset-deleting".to_string(),
            deleted_class: "formset-deleted".to_string(),
        }
    }
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            list: "[data-sortable-group]".to_string(),
            group_attr: "data-sortable-group".to_string(),
            active_attr: "data-active".to_string(),
            prefix_attr: "data-prefix".to_string(),
            counter_suffix: "TOTAL_FORMS".to_string(),
            placeholder_row: ".sortable-empty".to_string(),
            priority_field: "input[name$=-priority]".to_string(),
            active_field: "input[name$=-active]".to_string(),
            order: RankOrder::Descending,
            settle_delay_ms: 50,
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            attr: "data-mirror".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Toml(toml::de::Error),
    Selector {
        field: &'static str,
        source: SelectorError,
    },
    EmptyPlaceholder,
    EmptyName { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Toml(err) => write!(f, "invalid formset config: {err}"),
            ConfigError::Selector { field, source } => {
                write!(f, "invalid selector in `{field}`: {source}")
            }
            ConfigError::EmptyPlaceholder => f.write_str("`placeholder` must not be empty"),
            ConfigError::EmptyName { field } => write!(f, "`{field}` must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Toml(err) => Some(err),
            ConfigError::Selector { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err)
    }
}

/// A validated configuration with its selectors parsed.
#[derive(Clone, Debug)]
pub struct Rules {
    config: FormsetConfig,
    pub(crate) trigger: Selector,
    pub(crate) entry: Selector,
    pub(crate) flag: Selector,
    pub(crate) list: Selector,
    pub(crate) placeholder_row: Selector,
    pub(crate) priority_field: Selector,
    pub(crate) active_field: Selector,
    pub(crate) mirror: Selector,
}

impl Rules {
    pub fn config(&self) -> &FormsetConfig {
        &self.config
    }

    pub fn placeholder(&self) -> &str {
        &self.config.placeholder
    }

    pub fn repeater(&self) -> &RepeaterConfig {
        &self.config.repeater
    }

    pub fn remover(&self) -> &RemoverConfig {
        &self.config.remover
    }

    pub fn reorder(&self) -> &ReorderConfig {
        &self.config.reorder
    }

    pub fn mirror(&self) -> &MirrorConfig {
        &self.config.mirror
    }
}

fn selector(field: &'static str, source: &str) -> Result<Selector, ConfigError> {
    Selector::parse(source).map_err(|source| ConfigError::Selector { field, source })
}

fn name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyName { field });
    }
    Ok(())
}

impl FormsetConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn compile(&self) -> Result<Rules, ConfigError> {
        if self.placeholder.is_empty() {
            return Err(ConfigError::EmptyPlaceholder);
        }
        name("repeater.template_attr", &self.repeater.template_attr)?;
        name("repeater.counter_attr", &self.repeater.counter_attr)?;
        name("repeater.container_attr", &self.repeater.container_attr)?;
        name("remover.deleting_class", &self.remover.deleting_class)?;
        name("remover.deleted_class", &self.remover.deleted_class)?;
        name("reorder.group_attr", &self.reorder.group_attr)?;
        name("reorder.active_attr", &self.reorder.active_attr)?;
        name("mirror.attr", &self.mirror.attr)?;

        Ok(Rules {
            trigger: selector("repeater.trigger", &self.repeater.trigger)?,
            entry: selector("remover.entry", &self.remover.entry)?,
            flag: selector("remover.flag", &self.remover.flag)?,
            list: selector("reorder.list", &self.reorder.list)?,
            placeholder_row: selector("reorder.placeholder_row", &self.reorder.placeholder_row)?,
            priority_field: selector("reorder.priority_field", &self.reorder.priority_field)?,
            active_field: selector("reorder.active_field", &self.reorder.active_field)?,
            mirror: selector("mirror.attr", &format!("[{}]", self.mirror.attr))?,
            config: self.clone(),
        })
    }
}
