use crate::record::PoiRecord;
use std::fmt;
use strum_macros::{Display, EnumIter};

const ICON_BASE_URL: &str = "https://cdn.rawgit.com/pointhi/leaflet-color-markers/master/img";
const SHADOW_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/0.7.7/images/marker-shadow.png";

/// Circle radius in metres, independent of zoom.
pub const RIDE_CIRCLE_RADIUS_M: f64 = 100.0;
const RIDE_CIRCLE_OPACITY: f64 = 0.2;

/// Visual tier of a POI marker, derived from its offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum VisualStyle {
    #[strum(serialize = "plain")]
    Plain,
    #[strum(serialize = "discounted")]
    Discounted,
    #[strum(serialize = "promoted")]
    Promoted,
}

/// Extra line shown under the name in a marker popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopupNote {
    Discount(f64),
    Promotion(f64),
}

/// Popup content of a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupLabel {
    pub name: String,
    pub note: Option<PopupNote>,
}

impl PopupLabel {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            note: None,
        }
    }

    /// Popup markup; the name is escaped, the note markup is fixed.
    pub fn to_html(&self) -> String {
        let name = html_encode(&self.name);
        match self.note {
            None => name,
            Some(PopupNote::Discount(pct)) => {
                format!("{name}<br>This location has discounted rates of {pct}% off.")
            }
            Some(PopupNote::Promotion(pct)) => format!(
                "{name}<br><span style=\"color:red\">LIMITED TIME ONLY</span><br>{pct}% off when traveling to this location!"
            ),
        }
    }
}

impl fmt::Display for PopupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.note {
            None => write!(f, "{}", self.name),
            Some(PopupNote::Discount(pct)) => write!(
                f,
                "{}\nThis location has discounted rates of {pct}% off.",
                self.name
            ),
            Some(PopupNote::Promotion(pct)) => write!(
                f,
                "{}\nLIMITED TIME ONLY\n{pct}% off when traveling to this location!",
                self.name
            ),
        }
    }
}

/// Decides the style and popup of a POI record.
///
/// Plain by default; a discount upgrades to discounted; a promotion always
/// wins over a discount.
pub fn classify(record: &PoiRecord) -> (VisualStyle, PopupLabel) {
    let mut style = VisualStyle::Plain;
    let mut label = PopupLabel::plain(record.name.clone());

    if let Some(pct) = record.discount {
        style = VisualStyle::Discounted;
        label.note = Some(PopupNote::Discount(pct));
    }
    if let Some(pct) = record.promotion {
        style = VisualStyle::Promoted;
        label.note = Some(PopupNote::Promotion(pct));
    }

    (style, label)
}

/// Marker icon definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerIcon {
    pub icon_url: String,
    pub shadow_url: String,
    pub icon_size: (u32, u32),
    pub icon_anchor: (i32, i32),
    pub popup_anchor: (i32, i32),
    pub shadow_size: (u32, u32),
}

impl MarkerIcon {
    pub fn for_style(style: VisualStyle) -> Self {
        let color = match style {
            VisualStyle::Plain => "grey",
            VisualStyle::Discounted => "blue",
            VisualStyle::Promoted => "green",
        };
        Self {
            icon_url: format!("{ICON_BASE_URL}/marker-icon-{color}.png"),
            shadow_url: SHADOW_URL.to_string(),
            icon_size: (25, 41),
            icon_anchor: (12, 41),
            popup_anchor: (1, -34),
            shadow_size: (41, 41),
        }
    }
}

/// Which end of a ride a circle marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RideEnd {
    #[strum(serialize = "origin")]
    Origin,
    #[strum(serialize = "destination")]
    Destination,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleStyle {
    pub color: &'static str,
    pub fill_color: &'static str,
    pub opacity: f64,
    pub fill_opacity: f64,
    pub radius_m: f64,
}

impl CircleStyle {
    pub fn for_end(end: RideEnd) -> Self {
        let color = match end {
            RideEnd::Origin => "blue",
            RideEnd::Destination => "red",
        };
        Self {
            color,
            fill_color: color,
            opacity: RIDE_CIRCLE_OPACITY,
            fill_opacity: RIDE_CIRCLE_OPACITY,
            radius_m: RIDE_CIRCLE_RADIUS_M,
        }
    }
}

/// HTML-escapes text placed into popup markup.
pub fn html_encode(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Coordinate;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    fn cafe(name: &str) -> PoiRecord {
        PoiRecord::new(name, "1 Main St", Coordinate::new(40.0, -74.0).unwrap())
    }

    #[test]
    fn test_plain_record() {
        let (style, label) = classify(&cafe("Cafe A"));
        assert_eq!(style, VisualStyle::Plain);
        assert_eq!(label.to_string(), "Cafe A");
        assert_eq!(label.to_html(), "Cafe A");
    }

    #[test]
    fn test_discounted_record() {
        let (style, label) = classify(&cafe("Cafe D").with_discount(10.0));
        assert_eq!(style, VisualStyle::Discounted);
        assert_eq!(
            label.to_html(),
            "Cafe D<br>This location has discounted rates of 10% off."
        );
        assert!(label.to_string().contains("10%"));
    }

    #[test]
    fn test_promotion_beats_discount() {
        let (style, label) = classify(&cafe("Cafe B").with_discount(10.0).with_promotion(25.0));
        assert_eq!(style, VisualStyle::Promoted);

        let text = label.to_string();
        assert!(text.contains("25"));
        assert!(text.contains("LIMITED TIME ONLY"));
        assert!(!text.contains("10"));
        assert!(!text.contains("discounted"));
    }

    #[test]
    fn test_promotion_html_markup() {
        let (_, label) = classify(&cafe("Cafe P").with_promotion(12.5));
        assert_eq!(
            label.to_html(),
            "Cafe P<br><span style=\"color:red\">LIMITED TIME ONLY</span><br>12.5% off when traveling to this location!"
        );
    }

    #[test]
    fn test_name_is_escaped_in_html_only() {
        let (_, label) = classify(&cafe("Joe's <Diner>"));
        assert_eq!(label.to_string(), "Joe's <Diner>");
        assert_eq!(label.to_html(), "Joe&#x27;s &lt;Diner&gt;");
    }

    #[test]
    fn test_each_style_has_distinct_icon() {
        let urls: HashSet<String> = VisualStyle::iter()
            .map(|s| MarkerIcon::for_style(s).icon_url)
            .collect();
        assert_eq!(urls.len(), 3);
        assert!(MarkerIcon::for_style(VisualStyle::Plain).icon_url.ends_with("marker-icon-grey.png"));
        assert!(MarkerIcon::for_style(VisualStyle::Discounted).icon_url.ends_with("marker-icon-blue.png"));
        assert!(MarkerIcon::for_style(VisualStyle::Promoted).icon_url.ends_with("marker-icon-green.png"));
    }

    #[test]
    fn test_ride_ends_are_distinct() {
        let origin = CircleStyle::for_end(RideEnd::Origin);
        let destination = CircleStyle::for_end(RideEnd::Destination);
        assert_ne!(origin.color, destination.color);
        assert_eq!(origin.radius_m, destination.radius_m);
        assert_eq!(origin.radius_m, RIDE_CIRCLE_RADIUS_M);
    }
}
