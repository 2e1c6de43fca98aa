//! Interactive map state: viewport, markers and the selection overlay.
//!
//! A [`MapView`] is driven by three events: a new result list
//! ([`MapView::render`]), a pan/zoom by the visitor
//! ([`MapView::set_viewport`]) and a marker click ([`MapView::select`]).
//! Marker colors come from a [`MarkerPalette`], so every page can share one
//! map implementation and only swap the palette.

use rc_catalog::{valid_coordinates, Category, Resource};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Zoom applied when the map centers on a fresh result list.
pub const DEFAULT_ZOOM: u8 = 14;
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;
/// Rendered marker width in pixels.
pub const MARKER_WIDTH: u16 = 40;
/// Pixel offset of the detail overlay relative to its marker.
pub const OVERLAY_OFFSET: (i32, i32) = (120, 70);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MapError {
    #[error("no locations are on the map")]
    NotRendered,

    #[error("no marker with id {0} is on the map")]
    UnknownMarker(u32),

    #[error("coordinates ({lat}, {lng}) are out of range")]
    InvalidCoordinates { lat: f64, lng: f64 },
}

/// CSS hex color for a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MarkerColor(pub String);

impl MarkerColor {
    #[must_use]
    pub fn hex(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Chooses a marker color for each category.
pub trait MarkerPalette {
    fn color(&self, category: Category) -> MarkerColor;
}

impl<F> MarkerPalette for F
where
    F: Fn(Category) -> MarkerColor,
{
    fn color(&self, category: Category) -> MarkerColor {
        self(category)
    }
}

/// Blue for housing, red for food, amber for utilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryPalette;

impl MarkerPalette for CategoryPalette {
    fn color(&self, category: Category) -> MarkerColor {
        MarkerColor::hex(match category {
            Category::Housing => "#1a73e8",
            Category::FoodAssistance => "#db4437",
            Category::UtilityAssistance => "#f4b400",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Viewport {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: u32,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: Category,
    #[schema(value_type = String, example = "#1a73e8")]
    pub color: MarkerColor,
    pub width: u16,
}

/// Detail box shown next to the selected marker.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub id: u32,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub lat: f64,
    pub lng: f64,
    /// `[x, y]` pixels from the marker anchor.
    #[schema(value_type = Vec<i32>)]
    pub offset: (i32, i32),
}

/// Snapshot of everything visible on the map.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MapFrame {
    pub viewport: Viewport,
    pub markers: Vec<Marker>,
    pub overlay: Option<Overlay>,
}

/// Map state for one visitor.
#[derive(Debug, Clone)]
pub struct MapView<P = CategoryPalette> {
    palette: P,
    markers: Vec<Marker>,
    viewport: Option<Viewport>,
    selected: Option<u32>,
}

impl Default for MapView<CategoryPalette> {
    fn default() -> Self {
        Self::new(CategoryPalette)
    }
}

impl<P: MarkerPalette> MapView<P> {
    pub const fn new(palette: P) -> Self {
        Self {
            palette,
            markers: Vec::new(),
            viewport: None,
            selected: None,
        }
    }

    /// Show `locations`.
    ///
    /// An empty list hides the map. A list that differs from the one on
    /// screen recenters on its first element and clears the selection; the
    /// same list again keeps the visitor's pan, zoom and selection.
    pub fn render(&mut self, locations: &[Resource]) -> Option<MapFrame> {
        let Some(first) = locations.first() else {
            self.markers.clear();
            self.viewport = None;
            self.selected = None;
            return None;
        };

        let unchanged = self.markers.len() == locations.len()
            && self.markers.iter().zip(locations).all(|(m, r)| m.id == r.id);

        if !unchanged || self.viewport.is_none() {
            self.markers = locations.iter().map(|r| self.marker_for(r)).collect();
            self.viewport = Some(Viewport {
                lat: first.lat,
                lng: first.lng,
                zoom: DEFAULT_ZOOM,
            });
            self.selected = None;
        }

        self.frame()
    }

    /// The current frame, or `None` when nothing is on the map.
    #[must_use]
    pub fn frame(&self) -> Option<MapFrame> {
        let viewport = self.viewport?;
        Some(MapFrame {
            viewport,
            markers: self.markers.clone(),
            overlay: self.overlay(),
        })
    }

    /// Record a visitor pan/zoom. Fractional zoom from the widget is rounded
    /// to the nearest level and clamped to the tile range.
    ///
    /// # Errors
    ///
    /// [`MapError::NotRendered`] if the map is hidden, or
    /// [`MapError::InvalidCoordinates`] if the center is off the globe.
    pub fn set_viewport(&mut self, lat: f64, lng: f64, zoom: f64) -> Result<MapFrame, MapError> {
        if self.viewport.is_none() {
            return Err(MapError::NotRendered);
        }
        if !valid_coordinates(lat, lng) {
            return Err(MapError::InvalidCoordinates { lat, lng });
        }
        self.viewport = Some(Viewport {
            lat,
            lng,
            zoom: tile_zoom(zoom),
        });
        self.frame().ok_or(MapError::NotRendered)
    }

    /// Select the marker with `id`, replacing any earlier selection.
    ///
    /// # Errors
    ///
    /// [`MapError::NotRendered`] if the map is hidden, or
    /// [`MapError::UnknownMarker`] if no marker has that id.
    pub fn select(&mut self, id: u32) -> Result<MapFrame, MapError> {
        if self.viewport.is_none() {
            return Err(MapError::NotRendered);
        }
        if !self.markers.iter().any(|m| m.id == id) {
            return Err(MapError::UnknownMarker(id));
        }
        self.selected = Some(id);
        self.frame().ok_or(MapError::NotRendered)
    }

    /// Close the overlay. Harmless when nothing is selected.
    pub fn clear_selection(&mut self) -> Option<MapFrame> {
        self.selected = None;
        self.frame()
    }

    #[must_use]
    pub const fn selected(&self) -> Option<u32> {
        self.selected
    }

    #[must_use]
    pub const fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn overlay(&self) -> Option<Overlay> {
        let id = self.selected?;
        let marker = self.markers.iter().find(|m| m.id == id)?;
        Some(Overlay {
            id: marker.id,
            name: marker.name.clone(),
            address: marker.address.clone(),
            phone: marker.phone.clone(),
            lat: marker.lat,
            lng: marker.lng,
            offset: OVERLAY_OFFSET,
        })
    }

    fn marker_for(&self, resource: &Resource) -> Marker {
        Marker {
            id: resource.id,
            lat: resource.lat,
            lng: resource.lng,
            name: resource.name.clone(),
            address: resource.address.clone(),
            phone: resource.phone.clone(),
            category: resource.category,
            color: self.palette.color(resource.category),
            width: MARKER_WIDTH,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tile_zoom(zoom: f64) -> u8 {
    if zoom.is_nan() {
        return MIN_ZOOM;
    }
    // In 1.0..=18.0 after the clamp, so the cast is exact
    zoom.round().clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM)) as u8
}
