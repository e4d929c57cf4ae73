use crate::error::{LoaderError, Result};
use chrono::Local;
use csv::WriterBuilder;
use ride_map::{Scene, SceneElement};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

const HEADER: [&str; 7] = [
    "Kind",
    "Latitude",
    "Longitude",
    "Style",
    "Label",
    "Popup",
    "Address",
];

/// Writes every drawn element of `scene`, in draw order, to a timestamped CSV.
pub fn export_scene_to_csv_with_path(scene: &Scene, output_dir: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let filename = format!("map_scene_{timestamp}.csv");

    std::fs::create_dir_all(output_dir).map_err(|e| LoaderError::CreateDir {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    let file_path = output_dir.join(filename);

    let file = File::create(&file_path).map_err(|e| LoaderError::CreateFile {
        path: file_path.clone(),
        source: e,
    })?;

    let writer = BufWriter::new(file);
    #[allow(unused_mut)]
    let mut builder = WriterBuilder::new();
    #[cfg(windows)]
    {
        use csv::Terminator;
        builder = builder.terminator(Terminator::CRLF);
    }

    let mut wtr = builder.from_writer(writer);
    wtr.write_record(HEADER)?;

    for element in scene.elements() {
        let row = match element {
            SceneElement::Marker(marker) => [
                "marker".to_string(),
                marker.position.latitude.to_string(),
                marker.position.longitude.to_string(),
                marker.style.to_string(),
                marker.popup.to_string(),
                marker.popup.to_html(),
                marker.address.clone(),
            ],
            SceneElement::Circle(circle) => [
                "circle".to_string(),
                circle.center.latitude.to_string(),
                circle.center.longitude.to_string(),
                circle.style.color.to_string(),
                circle.end.to_string(),
                String::new(),
                String::new(),
            ],
        };
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ride_map::{
        Coordinate, DestinationField, MapOptions, PoiRecord, RecordRenderer, RecordSet,
        RideRecord,
    };
    use std::rc::Rc;
    use tempfile::TempDir;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn rendered(records: RecordSet) -> Scene {
        let mut scene = Scene::new(MapOptions::default());
        RecordRenderer::new(Rc::new(DestinationField::new())).render(&mut scene, &records);
        scene
    }

    #[test]
    fn test_export_markers() {
        let temp_dir = TempDir::new().unwrap();
        let scene = rendered(RecordSet::Poi(vec![
            PoiRecord::new("Cafe A", "1 Main St", coord(40.0, -74.0)),
            PoiRecord::new("Cafe B", "2 Main St", coord(40.5, -73.5)).with_discount(10.0),
        ]));

        let path = export_scene_to_csv_with_path(&scene, temp_dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("map_scene_"));
        assert!(name.ends_with(".csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "marker");
        assert_eq!(&rows[0][1], "40");
        assert_eq!(&rows[0][2], "-74");
        assert_eq!(&rows[0][3], "plain");
        assert_eq!(&rows[0][4], "Cafe A");
        assert_eq!(&rows[0][5], "Cafe A");
        assert_eq!(&rows[0][6], "1 Main St");
        assert_eq!(&rows[1][3], "discounted");
        assert_eq!(
            &rows[1][4],
            "Cafe B\nThis location has discounted rates of 10% off."
        );
        assert_eq!(
            &rows[1][5],
            "Cafe B<br>This location has discounted rates of 10% off."
        );
    }

    #[test]
    fn test_export_ride_circles() {
        let temp_dir = TempDir::new().unwrap();
        let scene = rendered(RecordSet::Ride(vec![RideRecord::new(
            coord(1.0, 2.0),
            coord(3.0, 4.0),
        )]));

        let path = export_scene_to_csv_with_path(&scene, temp_dir.path()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Kind,Latitude,Longitude,Style,Label,Popup,Address");
        assert_eq!(lines[1], "circle,1,2,blue,origin,,");
        assert_eq!(lines[2], "circle,3,4,red,destination,,");
    }

    #[test]
    fn test_export_empty_scene() {
        let temp_dir = TempDir::new().unwrap();
        let scene = Scene::new(MapOptions::default());

        let path = export_scene_to_csv_with_path(&scene, temp_dir.path()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Kind,Latitude,Longitude,Style,Label,Popup,Address\n");
    }

    #[test]
    fn test_export_escapes_popup_html() {
        let temp_dir = TempDir::new().unwrap();
        let scene = rendered(RecordSet::Poi(vec![
            PoiRecord::new("Joe's <Diner>", "3 Main St", coord(1.0, 2.0)).with_promotion(20.0),
        ]));

        let path = export_scene_to_csv_with_path(&scene, temp_dir.path()).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[3], "promoted");
        assert!(row[5].starts_with("Joe&#x27;s &lt;Diner&gt;<br>"));
        assert!(row[5].contains("LIMITED TIME ONLY"));
        assert_eq!(&row[6], "3 Main St");
    }

    #[test]
    fn test_creates_missing_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let scene = Scene::new(MapOptions::default());

        let path = export_scene_to_csv_with_path(&scene, &nested).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }
}
