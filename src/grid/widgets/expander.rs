use super::HostedWidget;
use crate::grid::config::GridItemConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::mpsc::{channel, Receiver, Sender};

fn default_step() -> u32 {
    1
}

fn default_max_span() -> u32 {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpanderConfig {
    #[serde(default = "default_step")]
    pub step: u32,
    #[serde(default = "default_max_span")]
    pub max_span: u32,
    #[serde(default)]
    pub grown: u32,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            max_span: default_max_span(),
            grown: 0,
        }
    }
}

/// Widget that asks its item to widen itself through the config stream.
pub struct ExpanderWidget {
    cfg: ExpanderConfig,
    current: Option<GridItemConfig>,
    data_tx: Sender<Value>,
    data_rx: Option<Receiver<Value>>,
    config_tx: Sender<GridItemConfig>,
    config_rx: Option<Receiver<GridItemConfig>>,
}

impl ExpanderWidget {
    pub fn new(cfg: ExpanderConfig) -> Self {
        let (data_tx, data_rx) = channel();
        let (config_tx, config_rx) = channel();
        Self {
            cfg,
            current: None,
            data_tx,
            data_rx: Some(data_rx),
            config_tx,
            config_rx: Some(config_rx),
        }
    }

    pub fn grown(&self) -> u32 {
        self.cfg.grown
    }

    /// Request `step` more columns, up to `max_span`. Returns whether a
    /// request was sent.
    pub fn grow(&mut self) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        let target = (current.sizex + self.cfg.step).min(self.cfg.max_span);
        if target <= current.sizex {
            return false;
        }
        let mut next = current.clone();
        next.sizex = target;
        self.cfg.grown += 1;
        next.component.data = json!(self.cfg);
        if self.data_tx.send(next.component.data.clone()).is_err() {
            tracing::debug!("expander payload dropped, no listener");
        }
        self.config_tx.send(next).is_ok()
    }
}

impl HostedWidget for ExpanderWidget {
    fn item_loaded(&mut self, config: &GridItemConfig) {
        self.current = Some(config.clone());
    }

    fn data_changed(&mut self) -> Option<Receiver<Value>> {
        self.data_rx.take()
    }

    fn config_changed(&mut self) -> Option<Receiver<GridItemConfig>> {
        self.config_rx.take()
    }

    fn on_data_updated(&mut self, data: &Value) {
        if let Ok(cfg) = serde_json::from_value::<ExpanderConfig>(data.clone()) {
            self.cfg = cfg;
        }
    }

    #[cfg(feature = "egui")]
    fn ui(&mut self, ui: &mut eframe::egui::Ui) {
        if ui.button("Grow").clicked() {
            self.grow();
        }
        ui.label(format!("grown {} times", self.cfg.grown));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_requires_a_loaded_config_and_caps_span() {
        let mut widget = ExpanderWidget::new(ExpanderConfig {
            step: 2,
            max_span: 3,
            grown: 0,
        });
        let configs = widget.config_changed().unwrap();
        assert!(!widget.grow());

        widget.item_loaded(&GridItemConfig::with_widget("e", "expander", 0, 0));
        assert!(widget.grow());
        let next = configs.try_recv().unwrap();
        assert_eq!(next.sizex, 3);
        assert_eq!(next.component.data["grown"], json!(1));

        widget.item_loaded(&next);
        assert!(!widget.grow());
    }

    #[test]
    fn grow_survives_a_dropped_payload_listener() {
        let mut widget = ExpanderWidget::new(ExpanderConfig::default());
        drop(widget.data_changed());
        let configs = widget.config_changed().unwrap();
        widget.item_loaded(&GridItemConfig::with_widget("e", "expander", 0, 0));

        assert!(widget.grow());
        assert_eq!(configs.try_recv().unwrap().component.data["grown"], json!(1));
    }
}
