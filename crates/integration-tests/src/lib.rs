//! Integration tests and test doubles for Stockspot.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stockspot-integration-tests
//! ```
//!
//! # Test Doubles
//!
//! - [`MemoryStore`] - both store ports over in-memory tables, with a call
//!   log and per-operation failure injection
//! - [`RecordingCamera`], [`RecordingNavigator`] - capture what screens ask
//!   of the map and the navigation stack
//! - [`FakeGeolocation`] - scripted permission and position
//! - [`FixedClock`] - settable "now"
//! - [`FakeRest`] - local HTTP server standing in for the REST endpoint, for
//!   wire-level tests of the real client
//!
//! # Test Categories
//!
//! - `locator_scenarios` - shop locator screen
//! - `inventory_scenarios` - inventory screen
//! - `supabase_wire` - REST client against [`FakeRest`]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use chrono::{DateTime, Duration, Utc};
use stockspot_app::navigation::Route;
use stockspot_app::ports::{
    CameraUpdate, Clock, Geolocation, GeolocationError, InventoryStore, MapCamera, Navigator,
    PermissionStatus, ShopStore, StoreError,
};
use stockspot_core::records::{ShopHoursRecord, ShopProductRecord, ShopRecord};
use stockspot_core::{Coordinate, DayOfWeek, Product, ProductId, ShopId, TimeOfDay};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Fixtures
// =============================================================================

/// A shop row without hours.
#[must_use]
pub fn shop(id: &str, name: &str, longitude: f64, latitude: f64) -> ShopRecord {
    ShopRecord {
        id: ShopId::new(id),
        name: name.to_string(),
        longitude,
        latitude,
        hours: Vec::new(),
    }
}

/// A `shop_hours` row. Panics on invalid input; fixtures only.
#[must_use]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
pub fn hours(day: i64, open: &str, close: &str) -> ShopHoursRecord {
    ShopHoursRecord {
        day_of_week: DayOfWeek::new(day).unwrap(),
        open_time: TimeOfDay::parse(open).unwrap(),
        close_time: TimeOfDay::parse(close).unwrap(),
    }
}

/// A catalog product with image `{id}.png`.
#[must_use]
pub fn product(id: &str, name: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        image_path: Some(format!("{id}.png")),
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Store operations, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListShops,
    AssignedProducts,
    AllProducts,
    ProductsExcluding,
    RemoveProduct,
    SetLastVerified,
    AddProduct,
}

/// One call received by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListShops,
    AssignedProducts(ShopId),
    AllProducts,
    ProductsExcluding(Vec<ProductId>),
    RemoveProduct(ShopId, ProductId),
    SetLastVerified(ShopId, ProductId, Option<DateTime<Utc>>),
    AddProduct(ShopId, ProductId, DateTime<Utc>),
}

impl Call {
    /// Operation this call belongs to.
    #[must_use]
    pub const fn op(&self) -> Op {
        match self {
            Self::ListShops => Op::ListShops,
            Self::AssignedProducts(_) => Op::AssignedProducts,
            Self::AllProducts => Op::AllProducts,
            Self::ProductsExcluding(_) => Op::ProductsExcluding,
            Self::RemoveProduct(..) => Op::RemoveProduct,
            Self::SetLastVerified(..) => Op::SetLastVerified,
            Self::AddProduct(..) => Op::AddProduct,
        }
    }
}

#[derive(Debug, Clone)]
struct Association {
    shop_id: ShopId,
    product_id: ProductId,
    last_verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Tables {
    shops: Vec<ShopRecord>,
    products: Vec<Product>,
    associations: Vec<Association>,
    failing: HashSet<Op>,
    calls: Vec<Call>,
}

/// In-memory `shops`, `products` and `shop_products` tables.
///
/// Writes behave like the real store: a delete or update that matches no
/// row succeeds without effect.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shop.
    #[must_use]
    pub fn with_shop(self, shop: ShopRecord) -> Self {
        lock(&self.tables).shops.push(shop);
        self
    }

    /// Add a catalog product.
    #[must_use]
    pub fn with_product(self, product: Product) -> Self {
        lock(&self.tables).products.push(product);
        self
    }

    /// Assign a product to a shop.
    #[must_use]
    pub fn with_assignment(self, shop: &str, product: &str, at: Option<DateTime<Utc>>) -> Self {
        lock(&self.tables).associations.push(Association {
            shop_id: ShopId::new(shop),
            product_id: ProductId::new(product),
            last_verified_at: at,
        });
        self
    }

    /// Make every later `op` fail with a rejection.
    pub fn fail(&self, op: Op) {
        lock(&self.tables).failing.insert(op);
    }

    /// Undo [`Self::fail`].
    pub fn recover(&self, op: Op) {
        lock(&self.tables).failing.remove(&op);
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.tables).calls.clone()
    }

    /// Calls of one operation.
    #[must_use]
    pub fn calls_of(&self, op: Op) -> Vec<Call> {
        lock(&self.tables)
            .calls
            .iter()
            .filter(|call| call.op() == op)
            .cloned()
            .collect()
    }

    /// Stored stamp of an association, `None` if it does not exist.
    #[must_use]
    pub fn stamp(&self, shop: &str, product: &str) -> Option<Option<DateTime<Utc>>> {
        lock(&self.tables)
            .associations
            .iter()
            .find(|a| a.shop_id.as_str() == shop && a.product_id.as_str() == product)
            .map(|a| a.last_verified_at)
    }

    fn record(&self, call: Call) -> Result<MutexGuard<'_, Tables>, StoreError> {
        let mut tables = lock(&self.tables);
        let op = call.op();
        tables.calls.push(call);
        if tables.failing.contains(&op) {
            return Err(StoreError::rejected(500, format!("{op:?} failed")));
        }
        Ok(tables)
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    async fn list_shops(&self) -> Result<Vec<ShopRecord>, StoreError> {
        let tables = self.record(Call::ListShops)?;
        Ok(tables.shops.clone())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn assigned_products(
        &self,
        shop: &ShopId,
    ) -> Result<Vec<ShopProductRecord>, StoreError> {
        let tables = self.record(Call::AssignedProducts(shop.clone()))?;
        Ok(tables
            .associations
            .iter()
            .filter(|a| &a.shop_id == shop)
            .filter_map(|a| {
                let product = tables.products.iter().find(|p| p.id == a.product_id)?;
                Some(ShopProductRecord {
                    shop_id: a.shop_id.clone(),
                    product_id: a.product_id.clone(),
                    last_verified_at: a.last_verified_at,
                    product: product.clone(),
                })
            })
            .collect())
    }

    async fn all_products(&self) -> Result<Vec<Product>, StoreError> {
        let tables = self.record(Call::AllProducts)?;
        Ok(tables.products.clone())
    }

    async fn products_excluding(&self, excluded: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let tables = self.record(Call::ProductsExcluding(excluded.to_vec()))?;
        Ok(tables
            .products
            .iter()
            .filter(|p| !excluded.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn remove_product(&self, shop: &ShopId, product: &ProductId) -> Result<(), StoreError> {
        let mut tables = self.record(Call::RemoveProduct(shop.clone(), product.clone()))?;
        tables
            .associations
            .retain(|a| !(&a.shop_id == shop && &a.product_id == product));
        Ok(())
    }

    async fn set_last_verified(
        &self,
        shop: &ShopId,
        product: &ProductId,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let mut tables = self.record(Call::SetLastVerified(shop.clone(), product.clone(), at))?;
        for a in &mut tables.associations {
            if &a.shop_id == shop && &a.product_id == product {
                a.last_verified_at = at;
            }
        }
        Ok(())
    }

    async fn add_product(
        &self,
        shop: &ShopId,
        product: &ProductId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.record(Call::AddProduct(shop.clone(), product.clone(), at))?;
        if tables
            .associations
            .iter()
            .any(|a| &a.shop_id == shop && &a.product_id == product)
        {
            return Err(StoreError::rejected(
                409,
                "duplicate key value violates unique constraint",
            ));
        }
        tables.associations.push(Association {
            shop_id: shop.clone(),
            product_id: product.clone(),
            last_verified_at: Some(at),
        });
        Ok(())
    }
}

// =============================================================================
// UI and device fakes
// =============================================================================

/// Records camera moves.
#[derive(Debug, Default)]
pub struct RecordingCamera {
    moves: Mutex<Vec<CameraUpdate>>,
}

impl RecordingCamera {
    /// Moves so far, oldest first.
    #[must_use]
    pub fn moves(&self) -> Vec<CameraUpdate> {
        lock(&self.moves).clone()
    }
}

impl MapCamera for RecordingCamera {
    fn set_camera(&self, update: CameraUpdate) {
        lock(&self.moves).push(update);
    }
}

/// Records navigation.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    /// Routes pushed so far, oldest first.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        lock(&self.routes).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        lock(&self.routes).push(route);
    }
}

/// Scripted location provider.
#[derive(Debug, Clone)]
pub struct FakeGeolocation {
    pub permission: PermissionStatus,
    pub position: Result<Coordinate, GeolocationError>,
}

impl FakeGeolocation {
    /// Permission granted, fixed position.
    #[must_use]
    pub const fn at(position: Coordinate) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            position: Ok(position),
        }
    }

    /// Permission denied.
    #[must_use]
    pub const fn denied() -> Self {
        Self {
            permission: PermissionStatus::Denied,
            position: Err(GeolocationError::Timeout),
        }
    }
}

#[async_trait]
impl Geolocation for FakeGeolocation {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        self.position.clone()
    }
}

/// Settable clock.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Clock stopped at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

// =============================================================================
// FakeRest
// =============================================================================

/// One request received by [`FakeRest`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    /// Decoded query pairs in order.
    pub query: Vec<(String, String)>,
    /// Lowercased header names.
    pub headers: BTreeMap<String, String>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Default)]
struct Shared {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<HashMap<(Method, String), (StatusCode, String)>>,
}

/// Local HTTP server answering like the REST endpoint.
///
/// Unscripted reads answer `200 []`; unscripted writes answer `201`/`204`
/// with no body.
#[derive(Debug, Clone)]
pub struct FakeRest {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl FakeRest {
    /// Bind to an ephemeral port and serve in the background.
    ///
    /// # Errors
    ///
    /// Returns the bind error.
    pub async fn start() -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shared = Arc::new(Shared::default());

        let app = Router::new().fallback(respond).with_state(shared.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, shared })
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Script the answer for `method` on `path` (e.g. `/rest/v1/shops`).
    pub fn respond_with(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        lock(&self.shared.responses).insert((method, path.to_string()), (status, body.to_string()));
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.shared.requests).clone()
    }
}

async fn respond(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let path = uri.path().to_string();
    let query = url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    lock(&shared.requests).push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query,
        headers,
        body: serde_json::from_str(&body).ok(),
    });

    let scripted = lock(&shared.responses).get(&(method.clone(), path)).cloned();
    let (status, body) = scripted.unwrap_or_else(|| match method {
        Method::GET => (StatusCode::OK, "[]".to_string()),
        Method::POST => (StatusCode::CREATED, String::new()),
        _ => (StatusCode::NO_CONTENT, String::new()),
    });

    (status, [(header::CONTENT_TYPE, "application/json")], body)
}
