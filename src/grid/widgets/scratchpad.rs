use super::{overlay_payload, HostedWidget};
use crate::grid::config::GridItemConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScratchpadConfig {
    #[serde(default)]
    pub content: String,
}

/// Free-form text note. Every edit is published as the item's new payload.
pub struct ScratchpadWidget {
    content: String,
    payload: Value,
    loaded_with: Option<(u32, u32)>,
    data_tx: Sender<Value>,
    data_rx: Option<Receiver<Value>>,
}

impl ScratchpadWidget {
    pub fn new(cfg: ScratchpadConfig) -> Self {
        let (data_tx, data_rx) = channel();
        let payload = serde_json::to_value(&cfg).unwrap_or_else(|_| json!({}));
        Self {
            content: cfg.content,
            payload,
            loaded_with: None,
            data_tx,
            data_rx: Some(data_rx),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Span the widget was last told about, as `(sizex, sizey)`.
    pub fn loaded_span(&self) -> Option<(u32, u32)> {
        self.loaded_with
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        let content = content.into();
        if content == self.content {
            return;
        }
        self.content = content;
        self.publish();
    }

    fn publish(&mut self) {
        self.payload = overlay_payload(&self.payload, &json!({ "content": self.content }));
        if self.data_tx.send(self.payload.clone()).is_err() {
            tracing::debug!("scratchpad edit dropped, no listener");
        }
    }
}

impl HostedWidget for ScratchpadWidget {
    fn item_loaded(&mut self, config: &GridItemConfig) {
        self.loaded_with = Some((config.sizex, config.sizey));
    }

    fn data_changed(&mut self) -> Option<Receiver<Value>> {
        self.data_rx.take()
    }

    fn on_data_updated(&mut self, data: &Value) {
        match serde_json::from_value::<ScratchpadConfig>(data.clone()) {
            Ok(cfg) => {
                self.content = cfg.content;
                self.payload = data.clone();
            }
            Err(e) => tracing::warn!("ignoring scratchpad payload: {e}"),
        }
    }

    #[cfg(feature = "egui")]
    fn ui(&mut self, ui: &mut eframe::egui::Ui) {
        let mut content = self.content.clone();
        let resp = ui.add(
            eframe::egui::TextEdit::multiline(&mut content)
                .desired_width(f32::INFINITY)
                .desired_rows(3),
        );
        if resp.changed() {
            self.set_content(content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_publish_payload_and_keep_extra_fields() {
        let mut widget = ScratchpadWidget::new(ScratchpadConfig {
            content: "a".into(),
        });
        widget.payload = json!({ "content": "a", "color": "red" });
        let rx = widget.data_changed().unwrap();
        widget.set_content("b");
        widget.set_content("b");
        let updates: Vec<Value> = rx.try_iter().collect();
        assert_eq!(updates, vec![json!({ "content": "b", "color": "red" })]);
    }

    #[test]
    fn data_stream_is_handed_over_once() {
        let mut widget = ScratchpadWidget::new(ScratchpadConfig::default());
        assert!(widget.data_changed().is_some());
        assert!(widget.data_changed().is_none());
    }

    #[test]
    fn replaced_payload_updates_content() {
        let mut widget = ScratchpadWidget::new(ScratchpadConfig::default());
        widget.on_data_updated(&json!({ "content": "from container" }));
        assert_eq!(widget.content(), "from container");
        widget.on_data_updated(&json!({ "content": 1 }));
        assert_eq!(widget.content(), "from container");
    }
}
