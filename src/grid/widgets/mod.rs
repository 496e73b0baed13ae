use crate::grid::config::{GridItemConfig, WidgetType};
use crate::grid::error::WiringError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::Receiver;

mod expander;
mod scratchpad;

pub use expander::{ExpanderConfig, ExpanderWidget};
pub use scratchpad::{ScratchpadConfig, ScratchpadWidget};

/// Capability contract every widget hosted by a grid item implements.
pub trait HostedWidget {
    /// Called right after mount and again whenever a resize settles.
    fn item_loaded(&mut self, config: &GridItemConfig);

    /// Hands over the stream of payload updates. Mandatory: returning `None`
    /// fails the mount.
    fn data_changed(&mut self) -> Option<Receiver<Value>>;

    /// Optional stream of whole-config replacements.
    fn config_changed(&mut self) -> Option<Receiver<GridItemConfig>> {
        None
    }

    /// The container replaced the item's payload without changing the type.
    fn on_data_updated(&mut self, _data: &Value) {}

    fn destroy(&mut self) {}

    #[cfg(feature = "egui")]
    fn ui(&mut self, _ui: &mut eframe::egui::Ui) {}
}

type WidgetCtor = dyn Fn(&WidgetType, &Value) -> Result<Box<dyn HostedWidget>, WiringError>;

/// Descriptor for building widgets from an item's `component.data`.
#[derive(Clone)]
pub struct WidgetDescriptor {
    ctor: Rc<WidgetCtor>,
}

pub type WidgetFactory = WidgetDescriptor;

impl WidgetDescriptor {
    /// Typed factory: the payload is deserialised into `C` before `build`
    /// runs. A null payload builds from `C::default()`.
    pub fn new<T, C>(build: fn(C) -> T) -> Self
    where
        T: HostedWidget + 'static,
        C: DeserializeOwned + Default + 'static,
    {
        Self {
            ctor: Rc::new(
                move |widget: &WidgetType,
                      data: &Value|
                      -> Result<Box<dyn HostedWidget>, WiringError> {
                    let cfg = if data.is_null() {
                        C::default()
                    } else {
                        serde_json::from_value::<C>(data.clone()).map_err(|source| {
                            WiringError::InvalidData {
                                widget: widget.clone(),
                                source,
                            }
                        })?
                    };
                    Ok(Box::new(build(cfg)))
                },
            ),
        }
    }

    /// Untyped factory receiving the raw payload.
    pub fn from_fn<F>(build: F) -> Self
    where
        F: Fn(&Value) -> Box<dyn HostedWidget> + 'static,
    {
        Self {
            ctor: Rc::new(
                move |_: &WidgetType, data: &Value| -> Result<Box<dyn HostedWidget>, WiringError> {
                    Ok(build(data))
                },
            ),
        }
    }

    pub fn create(
        &self,
        widget: &WidgetType,
        data: &Value,
    ) -> Result<Box<dyn HostedWidget>, WiringError> {
        (self.ctor)(widget, data)
    }
}

#[derive(Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<WidgetType, WidgetDescriptor>,
}

impl WidgetRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        reg.register("scratchpad", WidgetFactory::new(ScratchpadWidget::new));
        reg.register("expander", WidgetFactory::new(ExpanderWidget::new));
        reg
    }

    pub fn register(&mut self, name: &str, factory: WidgetFactory) {
        self.map.insert(WidgetType::new(name), factory);
    }

    pub fn contains(&self, widget: &WidgetType) -> bool {
        self.map.contains_key(widget)
    }

    /// Resolve the factory for `widget` and build an instance from `data`.
    pub fn create(
        &self,
        widget: &WidgetType,
        data: &Value,
    ) -> Result<Box<dyn HostedWidget>, WiringError> {
        let factory = self
            .map
            .get(widget)
            .ok_or_else(|| WiringError::UnknownWidget {
                widget: widget.clone(),
            })?;
        factory.create(widget, data)
    }
}

/// Lay `patch` over a widget payload. Top-level keys the widget does not
/// know about survive; a non-object on either side is replaced by `patch`.
pub(crate) fn overlay_payload(payload: &Value, patch: &Value) -> Value {
    let (Some(base), Some(top)) = (payload.as_object(), patch.as_object()) else {
        return patch.clone();
    };
    let mut merged = base.clone();
    merged.extend(top.iter().map(|(k, v)| (k.clone(), v.clone())));
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overlay_keeps_foreign_payload_keys() {
        let payload = json!({"content": "old", "pinned": {"by": "someone"}});
        let merged = overlay_payload(&payload, &json!({"content": "new"}));
        assert_eq!(merged, json!({"content": "new", "pinned": {"by": "someone"}}));
        assert_eq!(overlay_payload(&Value::Null, &json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn unknown_type_is_a_wiring_error() {
        let registry = WidgetRegistry::with_defaults();
        let err = registry
            .create(&WidgetType::new("missing"), &json!({}))
            .err()
            .unwrap();
        assert!(matches!(err, WiringError::UnknownWidget { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn malformed_data_is_rejected() {
        let registry = WidgetRegistry::with_defaults();
        let err = registry
            .create(&WidgetType::new("scratchpad"), &json!({"content": 5}))
            .err()
            .unwrap();
        assert!(matches!(err, WiringError::InvalidData { .. }));
        assert_eq!(err.widget().as_str(), "scratchpad");
    }

    #[test]
    fn null_data_builds_from_defaults() {
        let registry = WidgetRegistry::with_defaults();
        assert!(registry.contains(&WidgetType::new("expander")));
        assert!(registry
            .create(&WidgetType::new("expander"), &Value::Null)
            .is_ok());
        assert!(!registry.contains(&WidgetType::new("missing")));
    }
}
