use crate::record::{PoiRecord, RecordSet, RideRecord};
use crate::style::{CircleStyle, MarkerIcon, RideEnd, VisualStyle, classify};
use crate::surface::{BaseLayer, Circle, DestinationSink, LayerControl, MapSurface, Marker};
use log::debug;
use std::collections::HashMap;
use std::rc::Rc;

/// Counts of what one render pass drew.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub markers: usize,
    pub circles: usize,
    pub by_style: HashMap<VisualStyle, usize>,
}

/// Draws a record set onto a map surface in a single synchronous pass.
pub struct RecordRenderer {
    sink: Rc<dyn DestinationSink>,
    base_layer: BaseLayer,
}

impl RecordRenderer {
    pub fn new(sink: Rc<dyn DestinationSink>) -> Self {
        Self {
            sink,
            base_layer: BaseLayer::default(),
        }
    }

    pub fn with_base_layer(mut self, base_layer: BaseLayer) -> Self {
        self.base_layer = base_layer;
        self
    }

    /// Draws every record in input order, then attaches the layer control.
    ///
    /// Not idempotent: a second call on the same surface draws duplicates.
    /// Use [`RecordRenderer::rerender`] to replace a previous pass.
    pub fn render<M: MapSurface + ?Sized>(&self, map: &mut M, records: &RecordSet) -> RenderSummary {
        let summary = match records {
            RecordSet::Poi(records) => self.render_markers(map, records),
            RecordSet::Ride(records) => render_ride_circles(map, records),
        };
        map.add_layer_control(LayerControl::single(self.base_layer.clone()));

        debug!(
            "Rendered {} {} records: {} markers, {} circles",
            records.len(),
            records.mode(),
            summary.markers,
            summary.circles
        );
        summary
    }

    /// Clears whatever a previous pass drew, then renders.
    pub fn rerender<M: MapSurface + ?Sized>(
        &self,
        map: &mut M,
        records: &RecordSet,
    ) -> RenderSummary {
        map.clear_elements();
        self.render(map, records)
    }

    fn render_markers<M: MapSurface + ?Sized>(
        &self,
        map: &mut M,
        records: &[PoiRecord],
    ) -> RenderSummary {
        let mut summary = RenderSummary::default();

        for record in records {
            let (style, popup) = classify(record);
            if record.discount.is_some() && record.promotion.is_some() {
                debug!(
                    "'{}' has both a discount and a promotion; showing the promotion",
                    record.name
                );
            }

            let id = map.add_marker(Marker {
                position: record.position,
                title: record.name.clone(),
                address: record.address.clone(),
                style,
                icon: MarkerIcon::for_style(style),
                popup,
            });

            let sink = Rc::clone(&self.sink);
            map.on_marker_click(id, Box::new(move |marker: &Marker| sink.write(&marker.address)));

            summary.markers += 1;
            *summary.by_style.entry(style).or_insert(0) += 1;
        }
        summary
    }
}

fn render_ride_circles<M: MapSurface + ?Sized>(map: &mut M, records: &[RideRecord]) -> RenderSummary {
    for record in records {
        for (end, center) in [
            (RideEnd::Origin, record.origin),
            (RideEnd::Destination, record.destination),
        ] {
            map.add_circle(Circle {
                center,
                end,
                style: CircleStyle::for_end(end),
            });
        }
    }

    RenderSummary {
        circles: records.len() * 2,
        ..Default::default()
    }
}
