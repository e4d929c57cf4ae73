//! Seams to the map engine and the surrounding page.

use crate::credential::AccessToken;
use crate::error::Result;
use crate::record::Coordinate;
use crate::style::{CircleStyle, MarkerIcon, PopupLabel, RideEnd, VisualStyle};
use std::cell::RefCell;

/// Base layer exposed by the layer-selection control.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseLayer {
    /// Name shown in the control.
    pub label: String,
    /// Tile layer identifier understood by the engine.
    pub layer: String,
}

impl Default for BaseLayer {
    fn default() -> Self {
        Self {
            label: "Map".to_string(),
            layer: "map".to_string(),
        }
    }
}

/// Initial view and rendering options for the map engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: Coordinate,
    pub zoom: u8,
    /// Draw vector elements on a shared canvas instead of individual nodes.
    pub prefer_canvas: bool,
    pub base_layer: BaseLayer,
}

impl Default for MapOptions {
    fn default() -> Self {
        // New York City
        Self {
            center: Coordinate {
                latitude: 40.7128,
                longitude: -74.0060,
            },
            zoom: 12,
            prefer_canvas: true,
            base_layer: BaseLayer::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinate,
    pub title: String,
    /// Written to the destination field when the marker is clicked.
    pub address: String,
    pub style: VisualStyle,
    pub icon: MarkerIcon,
    pub popup: PopupLabel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub center: Coordinate,
    pub end: RideEnd,
    pub style: CircleStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerControl {
    pub base_layers: Vec<BaseLayer>,
}

impl LayerControl {
    pub fn single(layer: BaseLayer) -> Self {
        Self {
            base_layers: vec![layer],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub usize);

pub type ClickHandler = Box<dyn Fn(&Marker)>;

/// A map that visual elements can be drawn onto.
pub trait MapSurface {
    fn add_marker(&mut self, marker: Marker) -> MarkerId;
    fn add_circle(&mut self, circle: Circle);
    fn on_marker_click(&mut self, id: MarkerId, handler: ClickHandler);
    fn add_layer_control(&mut self, control: LayerControl);
    /// Removes every drawn element, its handlers and controls.
    fn clear_elements(&mut self);
    fn element_count(&self) -> usize;
}

/// Turns an access token into a ready map surface. The token is moved into
/// the engine and nothing else keeps it.
pub trait MapEngine {
    type Surface: MapSurface;

    fn initialize(self, token: AccessToken, options: &MapOptions) -> Result<Self::Surface>;
}

/// Receives the address of a clicked marker.
pub trait DestinationSink {
    fn write(&self, address: &str);
}

/// In-memory destination input field.
#[derive(Debug, Default)]
pub struct DestinationField {
    value: RefCell<Option<String>>,
    history: RefCell<Vec<String>>,
}

impl DestinationField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    /// Every value written, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }
}

impl DestinationSink for DestinationField {
    fn write(&self, address: &str) {
        *self.value.borrow_mut() = Some(address.to_string());
        self.history.borrow_mut().push(address.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = MapOptions::default();
        assert_eq!(options.center.latitude, 40.7128);
        assert_eq!(options.center.longitude, -74.0060);
        assert_eq!(options.zoom, 12);
        assert!(options.prefer_canvas);
        assert_eq!(options.base_layer.label, "Map");
        assert_eq!(options.base_layer.layer, "map");
    }

    #[test]
    fn test_destination_field_overwrites() {
        let field = DestinationField::new();
        assert_eq!(field.value(), None);

        field.write("1 Main St");
        field.write("2 Main St");
        assert_eq!(field.value().as_deref(), Some("2 Main St"));
        assert_eq!(field.history(), vec!["1 Main St", "2 Main St"]);
    }
}
