//! Shop locator: a map of shops with an info card per shop.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use stockspot_core::{Coordinate, DayOfWeek, Shop, ShopId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::navigation::Route;
use crate::ports::{CameraUpdate, Geolocation, MapCamera, Navigator, ShopStore};

/// Camera behaviour of the locator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Zoom when focusing a shop or auto-centering on the user.
    pub shop_zoom: f64,
    /// Zoom for "Center map".
    pub user_zoom: f64,
    /// Duration of every camera move.
    pub animation: Duration,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            shop_zoom: 16.0,
            user_zoom: 14.0,
            animation: Duration::from_millis(1000),
        }
    }
}

/// Action offered on the selected shop's card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardAction {
    /// "Edit shop". Not wired to anything yet.
    EditShop,
    /// "Manage inventory". Opens the inventory screen for the shop.
    ManageInventory,
}

impl CardAction {
    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EditShop => "Edit shop",
            Self::ManageInventory => "Manage inventory",
        }
    }
}

/// One entry in the shop list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopCard {
    pub shop_id: ShopId,
    pub name: String,
    /// "Open today: ..." or "Closed today".
    pub hours: String,
    pub selected: bool,
    /// Empty unless `selected`.
    pub actions: Vec<CardAction>,
}

/// GeoJSON `FeatureCollection` of shop points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

/// GeoJSON `Feature` for one shop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    /// Shop ID; map taps report it back through [`ShopLocator::on_feature_press`].
    pub id: ShopId,
    pub properties: FeatureProperties,
    pub geometry: Point,
}

/// Feature properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureProperties {
    pub name: String,
}

/// GeoJSON `Point`, `[lng, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    #[serde(rename = "type")]
    kind: &'static str,
    pub coordinates: [f64; 2],
}

impl FeatureCollection {
    fn from_shops(shops: &[Shop]) -> Self {
        Self {
            kind: "FeatureCollection",
            features: shops
                .iter()
                .map(|shop| Feature {
                    kind: "Feature",
                    id: shop.id.clone(),
                    properties: FeatureProperties {
                        name: shop.name.clone(),
                    },
                    geometry: Point {
                        kind: "Point",
                        coordinates: shop.coords.as_lng_lat(),
                    },
                })
                .collect(),
        }
    }
}

/// State and handlers of the locator screen.
pub struct ShopLocator {
    store: Arc<dyn ShopStore>,
    camera: Arc<dyn MapCamera>,
    navigator: Arc<dyn Navigator>,
    settings: CameraSettings,
    shops: Vec<Shop>,
    user_coords: Option<Coordinate>,
    selected: Option<ShopId>,
    refreshing: bool,
    has_centered_on_user: bool,
}

impl std::fmt::Debug for ShopLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopLocator")
            .field("shops", &self.shops.len())
            .field("user_coords", &self.user_coords)
            .field("selected", &self.selected)
            .field("refreshing", &self.refreshing)
            .finish_non_exhaustive()
    }
}

impl ShopLocator {
    /// Empty locator with default camera settings.
    #[must_use]
    pub fn new(
        store: Arc<dyn ShopStore>,
        camera: Arc<dyn MapCamera>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            camera,
            navigator,
            settings: CameraSettings::default(),
            shops: Vec::new(),
            user_coords: None,
            selected: None,
            refreshing: false,
            has_centered_on_user: false,
        }
    }

    /// Replace the camera settings.
    #[must_use]
    pub const fn with_camera_settings(mut self, settings: CameraSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Loaded shops, in store order.
    #[must_use]
    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    /// Last known user position.
    #[must_use]
    pub const fn user_coords(&self) -> Option<Coordinate> {
        self.user_coords
    }

    /// Selected shop, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<&ShopId> {
        self.selected.as_ref()
    }

    /// Whether a pull-to-refresh is in flight.
    #[must_use]
    pub const fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Screen start: read the user's position and the shops concurrently.
    ///
    /// A denied permission or failed position read is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns the shop read's error; the position outcome never fails mount.
    #[instrument(skip_all)]
    pub async fn mount(&mut self, geo: &dyn Geolocation) -> Result<()> {
        let (position, fetched) = tokio::join!(locate(geo), self.fetch_shops());
        if let Some(coords) = position {
            self.on_location_update(Some(coords));
        }
        fetched
    }

    /// Reload all shops with their hours.
    ///
    /// # Errors
    ///
    /// Returns the store error; the previous list is kept.
    #[instrument(skip(self))]
    pub async fn fetch_shops(&mut self) -> Result<()> {
        match self.store.list_shops().await {
            Ok(records) => {
                self.shops = records.into_iter().map(Shop::from).collect();
                tracing::debug!(count = self.shops.len(), "Shops loaded");
                Ok(())
            }
            Err(e) => {
                let err = AppError::from(e);
                err.report("fetch_shops");
                Err(err)
            }
        }
    }

    /// Pull-to-refresh.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_shops`]; `refreshing` is cleared either way.
    pub async fn refresh(&mut self) -> Result<()> {
        self.refreshing = true;
        let result = self.fetch_shops().await;
        self.refreshing = false;
        result
    }

    /// Select a shop and fly the camera to it.
    ///
    /// Returns `false` and changes nothing when `id` is unknown.
    pub fn select_shop(&mut self, id: &ShopId) -> bool {
        let Some(shop) = self.shops.iter().find(|shop| &shop.id == id) else {
            tracing::debug!(shop_id = %id, "Ignoring selection of unknown shop");
            return false;
        };

        self.camera.set_camera(CameraUpdate {
            center: shop.coords,
            zoom: self.settings.shop_zoom,
            animation: self.settings.animation,
        });
        self.selected = Some(shop.id.clone());
        true
    }

    /// Tap on a map feature.
    pub fn on_feature_press(&mut self, feature_id: &str) -> bool {
        self.select_shop(&ShopId::new(feature_id))
    }

    /// "Center map": fly to the user and clear the selection.
    ///
    /// Returns `false` and changes nothing when no position is known.
    pub fn center_on_user(&mut self) -> bool {
        let Some(coords) = self.user_coords else {
            return false;
        };

        self.camera.set_camera(CameraUpdate {
            center: coords,
            zoom: self.settings.user_zoom,
            animation: self.settings.animation,
        });
        self.selected = None;
        true
    }

    /// Position update from the map's user-location layer.
    ///
    /// The first known position centers the camera once.
    pub fn on_location_update(&mut self, coords: Option<Coordinate>) {
        self.user_coords = coords;

        if let Some(center) = coords
            && !self.has_centered_on_user
        {
            self.has_centered_on_user = true;
            self.camera.set_camera(CameraUpdate {
                center,
                zoom: self.settings.shop_zoom,
                animation: self.settings.animation,
            });
        }
    }

    /// Shop points for the map source.
    #[must_use]
    pub fn features(&self) -> FeatureCollection {
        FeatureCollection::from_shops(&self.shops)
    }

    /// Shop list cards for `day`.
    #[must_use]
    pub fn cards(&self, day: DayOfWeek) -> Vec<ShopCard> {
        self.shops
            .iter()
            .map(|shop| {
                let selected = self.selected.as_ref() == Some(&shop.id);
                ShopCard {
                    shop_id: shop.id.clone(),
                    name: shop.name.clone(),
                    hours: shop.hours_label(day),
                    selected,
                    actions: if selected {
                        vec![CardAction::EditShop, CardAction::ManageInventory]
                    } else {
                        Vec::new()
                    },
                }
            })
            .collect()
    }

    /// Run a card action for `shop_id`.
    ///
    /// Returns whether navigation happened.
    pub fn trigger(&self, shop_id: &ShopId, action: CardAction) -> bool {
        match action {
            CardAction::EditShop => {
                tracing::debug!(shop_id = %shop_id, "Edit shop is not available");
                false
            }
            CardAction::ManageInventory => self.manage_inventory(shop_id),
        }
    }

    /// Open the inventory screen for a loaded shop.
    pub fn manage_inventory(&self, shop_id: &ShopId) -> bool {
        let Some(shop) = self.shops.iter().find(|shop| &shop.id == shop_id) else {
            return false;
        };

        self.navigator.navigate(Route::ManageInventory {
            shop_id: shop.id.clone(),
            name: shop.name.clone(),
        });
        true
    }
}

/// Permission prompt then one position read.
async fn locate(geo: &dyn Geolocation) -> Option<Coordinate> {
    let status = geo.request_permission().await;
    if !status.is_granted() {
        tracing::warn!(?status, "Location permission not granted");
        return None;
    }

    match geo.current_position().await {
        Ok(coords) => Some(coords),
        Err(e) => {
            AppError::from(e).report("locate");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use stockspot_core::records::ShopRecord;

    use super::*;
    use crate::ports::{GeolocationError, PermissionStatus, StoreError};

    #[derive(Default)]
    struct Camera(Mutex<Vec<CameraUpdate>>);

    impl MapCamera for Camera {
        fn set_camera(&self, update: CameraUpdate) {
            self.0.lock().unwrap().push(update);
        }
    }

    #[derive(Default)]
    struct Nav(Mutex<Vec<Route>>);

    impl Navigator for Nav {
        fn navigate(&self, route: Route) {
            self.0.lock().unwrap().push(route);
        }
    }

    struct Shops(std::result::Result<Vec<ShopRecord>, StoreError>);

    #[async_trait]
    impl ShopStore for Shops {
        async fn list_shops(&self) -> std::result::Result<Vec<ShopRecord>, StoreError> {
            self.0.clone()
        }
    }

    struct Geo(PermissionStatus, std::result::Result<Coordinate, GeolocationError>);

    #[async_trait]
    impl Geolocation for Geo {
        async fn request_permission(&self) -> PermissionStatus {
            self.0
        }

        async fn current_position(&self) -> std::result::Result<Coordinate, GeolocationError> {
            self.1.clone()
        }
    }

    fn record(id: &str, lng: f64, lat: f64) -> ShopRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Shop {id}"),
            "longitude": lng,
            "latitude": lat,
            "hours": [],
        }))
        .unwrap()
    }

    fn locator(store: Shops) -> (ShopLocator, Arc<Camera>, Arc<Nav>) {
        let camera = Arc::new(Camera::default());
        let nav = Arc::new(Nav::default());
        let locator = ShopLocator::new(Arc::new(store), camera.clone(), nav.clone());
        (locator, camera, nav)
    }

    #[tokio::test]
    async fn test_mount_centers_once_and_loads() {
        let (mut locator, camera, _) = locator(Shops(Ok(vec![record("1", 24.94, 60.17)])));
        let geo = Geo(PermissionStatus::Granted, Ok(Coordinate::new(24.9, 60.2)));

        locator.mount(&geo).await.unwrap();
        assert_eq!(locator.shops().len(), 1);
        assert_eq!(locator.user_coords(), Some(Coordinate::new(24.9, 60.2)));

        locator.on_location_update(Some(Coordinate::new(25.0, 60.0)));
        let moves = camera.0.lock().unwrap();
        assert_eq!(moves.len(), 1);
        assert!((moves.first().unwrap().zoom - 16.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_mount_with_denied_permission() {
        let (mut locator, camera, _) = locator(Shops(Ok(vec![])));
        let geo = Geo(PermissionStatus::Denied, Ok(Coordinate::new(0.0, 0.0)));

        locator.mount(&geo).await.unwrap();
        assert!(locator.user_coords().is_none());
        assert!(camera.0.lock().unwrap().is_empty());
        assert!(!locator.center_on_user());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_list() {
        let (mut locator, _, _) = locator(Shops(Err(StoreError::connection("offline"))));
        locator.shops = vec![Shop::from(record("1", 1.0, 2.0))];

        assert!(locator.refresh().await.is_err());
        assert_eq!(locator.shops().len(), 1);
        assert!(!locator.is_refreshing());
    }

    #[tokio::test]
    async fn test_select_center_and_cards() {
        let (mut locator, camera, nav) = locator(Shops(Ok(vec![
            record("1", 24.94, 60.17),
            record("2", 24.95, 60.18),
        ])));
        locator.fetch_shops().await.unwrap();

        assert!(!locator.select_shop(&ShopId::new("9")));
        assert!(locator.on_feature_press("2"));
        assert_eq!(locator.selected(), Some(&ShopId::new("2")));

        let cards = locator.cards(DayOfWeek::SUNDAY);
        assert!(cards.iter().all(|c| c.hours == "Closed today"));
        assert!(cards.first().unwrap().actions.is_empty());
        assert_eq!(
            cards.get(1).unwrap().actions,
            vec![CardAction::EditShop, CardAction::ManageInventory]
        );

        assert!(!locator.trigger(&ShopId::new("2"), CardAction::EditShop));
        assert!(locator.trigger(&ShopId::new("2"), CardAction::ManageInventory));
        assert_eq!(
            nav.0.lock().unwrap().as_slice(),
            &[Route::ManageInventory {
                shop_id: ShopId::new("2"),
                name: "Shop 2".to_string(),
            }]
        );

        locator.on_location_update(Some(Coordinate::new(24.0, 60.0)));
        assert!(locator.center_on_user());
        assert!(locator.selected().is_none());

        let moves = camera.0.lock().unwrap();
        let last = moves.last().unwrap();
        assert_eq!(last.center, Coordinate::new(24.0, 60.0));
        assert!((last.zoom - 14.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_features_geojson() {
        let (mut locator, _, _) = locator(Shops(Ok(vec![record("7", 24.5, 60.5)])));
        locator.fetch_shops().await.unwrap();

        let json = serde_json::to_value(locator.features()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "id": "7",
                    "properties": { "name": "Shop 7" },
                    "geometry": { "type": "Point", "coordinates": [24.5, 60.5] },
                }],
            })
        );
    }

    #[test]
    fn test_card_action_labels() {
        assert_eq!(CardAction::EditShop.label(), "Edit shop");
        assert_eq!(CardAction::ManageInventory.label(), "Manage inventory");
    }
}
