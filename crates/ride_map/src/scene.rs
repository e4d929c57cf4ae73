//! In-memory map surface that records what was drawn.

use crate::credential::AccessToken;
use crate::error::{MapError, Result};
use crate::surface::{
    Circle, ClickHandler, LayerControl, MapEngine, MapOptions, MapSurface, Marker, MarkerId,
};
use log::debug;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneElement {
    Marker(Marker),
    Circle(Circle),
}

/// Elements in draw order, with their click handlers.
pub struct Scene {
    options: MapOptions,
    token: Option<AccessToken>,
    elements: Vec<SceneElement>,
    handlers: HashMap<MarkerId, Vec<ClickHandler>>,
    controls: Vec<LayerControl>,
}

impl Scene {
    pub fn new(options: MapOptions) -> Self {
        Self {
            options,
            token: None,
            elements: Vec::new(),
            handlers: HashMap::new(),
            controls: Vec::new(),
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Whether the scene was created from an access token.
    pub fn is_authorized(&self) -> bool {
        self.token.is_some()
    }

    pub fn elements(&self) -> &[SceneElement] {
        &self.elements
    }

    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, &Marker)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, element)| match element {
                SceneElement::Marker(marker) => Some((MarkerId(i), marker)),
                SceneElement::Circle(_) => None,
            })
    }

    pub fn circles(&self) -> impl Iterator<Item = &Circle> {
        self.elements.iter().filter_map(|element| match element {
            SceneElement::Circle(circle) => Some(circle),
            SceneElement::Marker(_) => None,
        })
    }

    pub fn controls(&self) -> &[LayerControl] {
        &self.controls
    }

    /// Fires the click handlers of a marker. Returns false if `id` is not a
    /// marker on this scene.
    pub fn click(&self, id: MarkerId) -> bool {
        let Some(SceneElement::Marker(marker)) = self.elements.get(id.0) else {
            return false;
        };
        if let Some(handlers) = self.handlers.get(&id) {
            for handler in handlers {
                handler(marker);
            }
        }
        true
    }
}

impl MapSurface for Scene {
    fn add_marker(&mut self, marker: Marker) -> MarkerId {
        let id = MarkerId(self.elements.len());
        self.elements.push(SceneElement::Marker(marker));
        id
    }

    fn add_circle(&mut self, circle: Circle) {
        self.elements.push(SceneElement::Circle(circle));
    }

    fn on_marker_click(&mut self, id: MarkerId, handler: ClickHandler) {
        self.handlers.entry(id).or_default().push(handler);
    }

    fn add_layer_control(&mut self, control: LayerControl) {
        self.controls.push(control);
    }

    fn clear_elements(&mut self) {
        self.elements.clear();
        self.handlers.clear();
        self.controls.clear();
    }

    fn element_count(&self) -> usize {
        self.elements.len()
    }
}

/// Engine producing [`Scene`] surfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneEngine;

impl MapEngine for SceneEngine {
    type Surface = Scene;

    fn initialize(self, token: AccessToken, options: &MapOptions) -> Result<Scene> {
        if token.expose().trim().is_empty() {
            return Err(MapError::InvalidConfiguration(
                "map engine requires a non-empty access token".to_string(),
            ));
        }
        debug!(
            "Initializing map at ({}, {}) zoom {}, canvas {}, base layer {:?}",
            options.center.latitude,
            options.center.longitude,
            options.zoom,
            options.prefer_canvas,
            options.base_layer.layer
        );

        let mut scene = Scene::new(options.clone());
        scene.token = Some(token);
        Ok(scene)
    }
}
