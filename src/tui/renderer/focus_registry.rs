use crossterm::event::KeyCode;
use ratatui::layout::Rect;
use crate::tui::element::FocusId;

/// Information about a focusable element
pub struct FocusableInfo<Msg> {
    pub id: FocusId,
    pub rect: Rect,
    pub on_key: Box<dyn Fn(KeyCode) -> Option<Msg> + Send>,
}

/// Focus context for a single layer in the UI
pub struct LayerFocusContext<Msg> {
    pub layer_index: usize,
    pub focusables: Vec<FocusableInfo<Msg>>,
}

/// Stores focus information for UI elements, organized by layer.
/// Only the topmost layer receives keys, so an open modal captures input.
pub struct FocusRegistry<Msg> {
    layers: Vec<LayerFocusContext<Msg>>,
}

impl<Msg> Default for FocusRegistry<Msg> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Msg> FocusRegistry<Msg> {
    pub fn new() -> Self {
        Self {
            layers: vec![LayerFocusContext {
                layer_index: 0,
                focusables: Vec::new(),
            }],
        }
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.layers.push(LayerFocusContext {
            layer_index: 0,
            focusables: Vec::new(),
        });
    }

    pub fn push_layer(&mut self, layer_index: usize) {
        self.layers.push(LayerFocusContext {
            layer_index,
            focusables: Vec::new(),
        });
    }

    pub fn register_focusable(&mut self, info: FocusableInfo<Msg>) {
        let Some(layer) = self.layers.last_mut() else {
            return;
        };
        if layer.focusables.iter().any(|f| f.id == info.id) {
            log::warn!("Duplicate FocusId {:?} in layer {}; last registration wins", info.id, layer.layer_index);
            layer.focusables.retain(|f| f.id != info.id);
        }
        layer.focusables.push(info);
    }

    pub fn active_layer(&self) -> Option<&LayerFocusContext<Msg>> {
        self.layers.iter().rev().find(|layer| !layer.focusables.is_empty())
    }

    pub fn find_in_active_layer(&self, id: &FocusId) -> Option<&FocusableInfo<Msg>> {
        self.active_layer()?.focusables.iter().find(|f| &f.id == id)
    }

    pub fn focusable_ids_in_active_layer(&self) -> Vec<FocusId> {
        self.active_layer()
            .map(|layer| layer.focusables.iter().map(|f| f.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, id: &FocusId) -> bool {
        self.layers.iter().any(|layer| layer.focusables.iter().any(|f| &f.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: &'static str) -> FocusableInfo<u8> {
        FocusableInfo {
            id: FocusId::new(id),
            rect: Rect::new(0, 0, 10, 1),
            on_key: Box::new(|_| Some(1)),
        }
    }

    #[test]
    fn test_topmost_non_empty_layer_is_active() {
        let mut registry = FocusRegistry::new();
        registry.register_focusable(info("video-path"));
        registry.push_layer(1);
        registry.register_focusable(info("modal-input"));
        registry.push_layer(2);

        assert_eq!(registry.focusable_ids_in_active_layer(), vec![FocusId::new("modal-input")]);
        assert!(registry.find_in_active_layer(&FocusId::new("video-path")).is_none());
        assert!(registry.contains(&FocusId::new("video-path")));
    }
}
