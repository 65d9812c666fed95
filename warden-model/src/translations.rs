//! Locale-keyed values packed into one attribute slot.
//!
//! A translatable slot stores a JSON-encoded `{locale: text}` object. Every
//! mutation is a read-modify-write of the whole map.

use crate::bag::AttributeSlots;
use crate::config::LocaleConfig;
use crate::error::{ModelError, ModelResult};
use crate::schema::TransformRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// locale → text.
pub type Translations = BTreeMap<String, String>;

/// Supplies the active and fallback locales.
pub trait LocaleProvider: Send + Sync {
    fn active_locale(&self) -> String;

    fn fallback_locale(&self) -> String;
}

/// Locales read from [`LocaleConfig`]; the active locale can be switched at
/// runtime.
#[derive(Debug)]
pub struct ConfiguredLocale {
    active: RwLock<String>,
    fallback: String,
}

impl ConfiguredLocale {
    pub fn new(config: &LocaleConfig) -> Self {
        Self {
            active: RwLock::new(config.active.clone()),
            fallback: config.fallback.clone(),
        }
    }

    pub fn set_active(&self, locale: &str) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = locale.to_string();
    }
}

impl LocaleProvider for ConfiguredLocale {
    fn active_locale(&self) -> String {
        self.active.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn fallback_locale(&self) -> String {
        self.fallback.clone()
    }
}

pub struct TranslationStore {
    locale: Arc<dyn LocaleProvider>,
}

impl TranslationStore {
    pub fn new(locale: Arc<dyn LocaleProvider>) -> Self {
        Self { locale }
    }

    pub fn locale_provider(&self) -> &Arc<dyn LocaleProvider> {
        &self.locale
    }

    /// Decodes a slot. Absent, null and empty slots decode to an empty map.
    pub fn decode(slot: Option<&Value>) -> ModelResult<Translations> {
        match slot {
            None | Some(Value::Null) => Ok(Translations::new()),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(Translations::new()),
            Some(Value::String(s)) => Ok(serde_json::from_str(s)?),
            Some(other) => Ok(serde_json::from_value(other.clone())?),
        }
    }

    pub fn encode(translations: &Translations) -> ModelResult<Value> {
        Ok(Value::String(serde_json::to_string(translations)?))
    }

    fn resolve_locale(&self, locale: Option<&str>) -> String {
        locale.map_or_else(|| self.locale.active_locale(), str::to_string)
    }

    fn guard(registry: &TransformRegistry, attribute: &str) -> ModelResult<()> {
        if registry.is_translatable(attribute) {
            Ok(())
        } else {
            Err(ModelError::NotTranslatable(attribute.to_string()))
        }
    }

    pub fn get_translations(&self, slots: &impl AttributeSlots, attribute: &str) -> ModelResult<Translations> {
        Self::decode(slots.read_slot(attribute)?.as_ref())
    }

    /// Looks up `locale` (the active locale when `None`), then the fallback
    /// locale. `None` when neither has an entry.
    pub fn get_translation(
        &self,
        slots: &impl AttributeSlots,
        attribute: &str,
        locale: Option<&str>,
    ) -> ModelResult<Option<String>> {
        let mut translations = self.get_translations(slots, attribute)?;
        let primary = translations.remove(&self.resolve_locale(locale));
        Ok(primary.or_else(|| translations.remove(&self.locale.fallback_locale())))
    }

    /// True if `locale` itself has an entry; the fallback is not consulted.
    pub fn has_translation(
        &self,
        slots: &impl AttributeSlots,
        attribute: &str,
        locale: Option<&str>,
    ) -> ModelResult<bool> {
        Ok(self
            .get_translations(slots, attribute)?
            .contains_key(&self.resolve_locale(locale)))
    }

    /// Like [`get_translation`](Self::get_translation), with an empty string
    /// when nothing is found.
    pub fn translate(
        &self,
        slots: &impl AttributeSlots,
        attribute: &str,
        locale: Option<&str>,
    ) -> ModelResult<String> {
        Ok(self.get_translation(slots, attribute, locale)?.unwrap_or_default())
    }

    pub fn set_translation(
        &self,
        slots: &mut impl AttributeSlots,
        registry: &TransformRegistry,
        attribute: &str,
        value: &str,
        locale: Option<&str>,
    ) -> ModelResult<()> {
        Self::guard(registry, attribute)?;
        let mut translations = self.get_translations(slots, attribute)?;
        translations.insert(self.resolve_locale(locale), value.to_string());
        slots.write_slot(attribute, Self::encode(&translations)?)
    }

    /// Merges `incoming` over the stored translations.
    pub fn set_translations(
        &self,
        slots: &mut impl AttributeSlots,
        registry: &TransformRegistry,
        attribute: &str,
        incoming: Translations,
    ) -> ModelResult<()> {
        Self::guard(registry, attribute)?;
        let mut translations = self.get_translations(slots, attribute)?;
        translations.extend(incoming);
        slots.write_slot(attribute, Self::encode(&translations)?)
    }

    pub fn forget_translation(
        &self,
        slots: &mut impl AttributeSlots,
        registry: &TransformRegistry,
        attribute: &str,
        locale: Option<&str>,
    ) -> ModelResult<()> {
        Self::guard(registry, attribute)?;
        let mut translations = self.get_translations(slots, attribute)?;
        if translations.remove(&self.resolve_locale(locale)).is_none() {
            return Ok(());
        }
        slots.write_slot(attribute, Self::encode(&translations)?)
    }

    pub fn forget_translations(
        &self,
        slots: &mut impl AttributeSlots,
        registry: &TransformRegistry,
        attribute: &str,
        locales: &[&str],
    ) -> ModelResult<()> {
        Self::guard(registry, attribute)?;
        let mut translations = self.get_translations(slots, attribute)?;
        for locale in locales {
            translations.remove(*locale);
        }
        slots.write_slot(attribute, Self::encode(&translations)?)
    }

    /// Routes a plain attribute write: objects become
    /// [`set_translations`](Self::set_translations), scalars become
    /// [`set_translation`](Self::set_translation) under the active locale and
    /// null clears the slot.
    pub fn route(
        &self,
        slots: &mut impl AttributeSlots,
        registry: &TransformRegistry,
        attribute: &str,
        value: Value,
    ) -> ModelResult<()> {
        Self::guard(registry, attribute)?;
        match value {
            Value::Null => slots.write_slot(attribute, Value::Null),
            Value::Object(entries) => {
                let mut incoming = Translations::new();
                for (locale, text) in entries {
                    let text = match text {
                        Value::String(s) => s,
                        Value::Number(_) | Value::Bool(_) => text.to_string(),
                        other => {
                            return Err(ModelError::validation(
                                attribute,
                                format!("translation for \"{locale}\" must be a string, got {other}"),
                            ));
                        }
                    };
                    incoming.insert(locale, text);
                }
                self.set_translations(slots, registry, attribute, incoming)
            }
            Value::String(text) => self.set_translation(slots, registry, attribute, &text, None),
            Value::Number(_) | Value::Bool(_) => {
                self.set_translation(slots, registry, attribute, &value.to_string(), None)
            }
            Value::Array(_) => Err(ModelError::validation(
                attribute,
                "translations must be a locale map or a single string",
            )),
        }
    }
}
