pub mod credential;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod scene;
pub mod style;
pub mod surface;

pub use credential::{
    AccessToken, CredentialGate, CredentialSource, DEFAULT_CREDENTIAL_URL, DEFAULT_TOKEN_KEY,
    HttpCredentialSource,
};
pub use error::{CredentialError, MapError, Result};
pub use pipeline::load_map;
pub use record::{Coordinate, ParsedRecords, PoiRecord, RecordSet, RenderMode, RideRecord};
pub use render::{RecordRenderer, RenderSummary};
pub use scene::{Scene, SceneElement, SceneEngine};
pub use style::{CircleStyle, MarkerIcon, PopupLabel, PopupNote, RideEnd, VisualStyle, classify};
pub use surface::{
    BaseLayer, Circle, DestinationField, DestinationSink, LayerControl, MapEngine, MapOptions,
    MapSurface, Marker, MarkerId,
};
