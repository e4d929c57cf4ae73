use crate::credential::{CredentialGate, CredentialSource};
use crate::error::Result;
use crate::record::RecordSet;
use crate::render::{RecordRenderer, RenderSummary};
use crate::surface::{MapEngine, MapOptions};
use log::info;

/// Acquires the token, initializes the map with it, then runs one render pass.
///
/// If the gate fails the engine is never initialized and nothing is drawn.
pub async fn load_map<S, E>(
    gate: CredentialGate<S>,
    engine: E,
    options: &MapOptions,
    records: &RecordSet,
    renderer: &RecordRenderer,
) -> Result<(E::Surface, RenderSummary)>
where
    S: CredentialSource,
    E: MapEngine,
{
    let token = gate.acquire().await?;
    let mut map = engine.initialize(token, options)?;

    let summary = renderer.render(&mut map, records);
    info!(
        "Map ready: {} markers, {} circles",
        summary.markers, summary.circles
    );
    Ok((map, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::AccessToken;
    use crate::error::{CredentialError, MapError};
    use crate::record::{Coordinate, PoiRecord, RenderMode, RideRecord};
    use crate::scene::{Scene, SceneEngine};
    use crate::surface::{DestinationField, MapSurface};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Reachable;

    impl CredentialSource for Reachable {
        async fn fetch_token(&self) -> std::result::Result<AccessToken, CredentialError> {
            Ok(AccessToken::new("key"))
        }
    }

    struct Unreachable;

    impl CredentialSource for Unreachable {
        async fn fetch_token(&self) -> std::result::Result<AccessToken, CredentialError> {
            Err(CredentialError::MissingToken {
                key: "mapquest".to_string(),
            })
        }
    }

    /// Records whether it was ever initialized.
    struct TrackingEngine(Rc<Cell<bool>>);

    impl MapEngine for TrackingEngine {
        type Surface = Scene;

        fn initialize(self, token: AccessToken, options: &MapOptions) -> Result<Scene> {
            self.0.set(true);
            SceneEngine.initialize(token, options)
        }
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_renders_after_token() {
        let field = Rc::new(DestinationField::new());
        let renderer = RecordRenderer::new(field.clone());
        let records = RecordSet::Poi(vec![PoiRecord::new("Cafe A", "1 Main St", coord(40.0, -74.0))]);

        let (scene, summary) = load_map(
            CredentialGate::new(Reachable),
            SceneEngine,
            &MapOptions::default(),
            &records,
            &renderer,
        )
        .await
        .unwrap();

        assert!(scene.is_authorized());
        assert_eq!(summary.markers, 1);
        assert_eq!(scene.element_count(), 1);
        assert_eq!(scene.controls().len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_aborts_without_token() {
        let initialized = Rc::new(Cell::new(false));
        let field = Rc::new(DestinationField::new());
        let renderer = RecordRenderer::new(field.clone());
        let records = RecordSet::Ride(vec![RideRecord::new(coord(1.0, 2.0), coord(3.0, 4.0))]);

        let result = load_map(
            CredentialGate::new(Unreachable),
            TrackingEngine(initialized.clone()),
            &MapOptions::default(),
            &records,
            &renderer,
        )
        .await;

        assert!(matches!(result, Err(MapError::CredentialUnavailable(_))));
        assert!(!initialized.get());
        assert_eq!(field.value(), None);
    }

    #[tokio::test]
    async fn test_pipeline_with_empty_records() {
        let renderer = RecordRenderer::new(Rc::new(DestinationField::new()));
        let (scene, summary) = load_map(
            CredentialGate::new(Reachable),
            SceneEngine,
            &MapOptions::default(),
            &RecordSet::empty(RenderMode::Poi),
            &renderer,
        )
        .await
        .unwrap();

        assert_eq!(summary, RenderSummary::default());
        assert_eq!(scene.element_count(), 0);
    }
}
