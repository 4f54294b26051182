//! Inventory mutations as values.
//!
//! Each user action on the inventory screen becomes an [`InventoryCommand`]
//! holding everything needed to apply it locally, send it to the store, and
//! take the local change back if the store refuses it. Commands that touch
//! local state before the store answers are *optimistic*; the rest only
//! change local state once the store has confirmed.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use stockspot_core::{InventoryProduct, Product, ProductId, ShopId};

use crate::ports::{InventoryStore, StoreError};

/// Which optimistic commands are rolled back when the store refuses them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CompensationPolicy {
    /// Only "mark in stock" is rolled back. "Undo" keeps its local change.
    #[default]
    Source,
    /// Every optimistic command is rolled back.
    Uniform,
}

impl CompensationPolicy {
    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Uniform => "uniform",
        }
    }
}

impl fmt::Display for CompensationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompensationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(Self::Source),
            "uniform" => Ok(Self::Uniform),
            other => Err(format!(
                "unknown compensation policy '{other}' (expected 'source' or 'uniform')"
            )),
        }
    }
}

/// Local inventory state of one shop.
///
/// `assigned` and `remaining` never share a product ID. `undo` maps a
/// product to the stamp it had before it was last marked in stock; a key is
/// present exactly while "Undo" is offered for that product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryLists {
    pub assigned: Vec<InventoryProduct>,
    pub remaining: Vec<Product>,
    pub undo: HashMap<ProductId, Option<DateTime<Utc>>>,
}

impl InventoryLists {
    /// Assigned product with `id`.
    #[must_use]
    pub fn assigned(&self, id: &ProductId) -> Option<&InventoryProduct> {
        self.assigned.iter().find(|p| p.id() == id)
    }

    /// Unassigned product with `id`.
    #[must_use]
    pub fn remaining(&self, id: &ProductId) -> Option<&Product> {
        self.remaining.iter().find(|p| &p.id == id)
    }

    fn set_stamp(&mut self, id: &ProductId, stamp: Option<DateTime<Utc>>) {
        if let Some(item) = self.assigned.iter_mut().find(|p| p.id() == id) {
            item.last_verified_at = stamp;
        }
    }
}

/// One inventory mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryCommand {
    /// Delete the association and move the product to the unassigned list.
    Remove { product: InventoryProduct },

    /// Stamp the product as verified now, remembering the old stamp.
    MarkInStock {
        product_id: ProductId,
        previous: Option<DateTime<Utc>>,
        stamped: DateTime<Utc>,
    },

    /// Restore the stamp remembered by the last `MarkInStock`.
    UndoStock {
        product_id: ProductId,
        restored: Option<DateTime<Utc>>,
        replaced: Option<DateTime<Utc>>,
    },

    /// Create the association and move the product to the assigned list.
    Add {
        product: Product,
        stamped: DateTime<Utc>,
    },
}

impl InventoryCommand {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Remove { .. } => "remove",
            Self::MarkInStock { .. } => "mark_in_stock",
            Self::UndoStock { .. } => "undo_stock",
            Self::Add { .. } => "add",
        }
    }

    /// Product the command acts on.
    #[must_use]
    pub fn product_id(&self) -> &ProductId {
        match self {
            Self::Remove { product } => product.id(),
            Self::MarkInStock { product_id, .. } | Self::UndoStock { product_id, .. } => product_id,
            Self::Add { product, .. } => &product.id,
        }
    }

    /// Whether local state changes before the store answers.
    #[must_use]
    pub const fn is_optimistic(&self) -> bool {
        matches!(self, Self::MarkInStock { .. } | Self::UndoStock { .. })
    }

    /// Whether a store failure rolls the local change back under `policy`.
    #[must_use]
    pub fn compensates(&self, policy: CompensationPolicy) -> bool {
        match self {
            Self::MarkInStock { .. } => true,
            Self::UndoStock { .. } => policy == CompensationPolicy::Uniform,
            Self::Remove { .. } | Self::Add { .. } => false,
        }
    }

    /// Local change made before the store is called.
    pub fn apply_optimistic(&self, lists: &mut InventoryLists) {
        match self {
            Self::MarkInStock {
                product_id,
                previous,
                stamped,
            } => {
                lists.undo.insert(product_id.clone(), *previous);
                lists.set_stamp(product_id, Some(*stamped));
            }
            Self::UndoStock {
                product_id,
                restored,
                ..
            } => {
                lists.set_stamp(product_id, *restored);
                lists.undo.remove(product_id);
            }
            Self::Remove { .. } | Self::Add { .. } => {}
        }
    }

    /// Local change made once the store has confirmed.
    pub fn apply_confirmed(&self, lists: &mut InventoryLists) {
        match self {
            Self::Remove { product } => {
                let id = product.id();
                lists.undo.remove(id);
                lists.assigned.retain(|p| p.id() != id);
                if lists.remaining(id).is_none() {
                    lists.remaining.push(product.product.clone());
                }
            }
            Self::Add { product, stamped } => {
                lists.remaining.retain(|p| p.id != product.id);
                if lists.assigned(&product.id).is_none() {
                    lists
                        .assigned
                        .push(InventoryProduct::new(product.clone(), Some(*stamped)));
                }
            }
            Self::MarkInStock { .. } | Self::UndoStock { .. } => {}
        }
    }

    /// Take back [`Self::apply_optimistic`].
    ///
    /// A rolled-back "mark in stock" keeps its undo entry, so "Undo" stays
    /// offered against the restored stamp.
    pub fn compensate(&self, lists: &mut InventoryLists) {
        match self {
            Self::MarkInStock {
                product_id,
                previous,
                ..
            } => lists.set_stamp(product_id, *previous),
            Self::UndoStock {
                product_id,
                restored,
                replaced,
            } => {
                lists.set_stamp(product_id, *replaced);
                lists.undo.insert(product_id.clone(), *restored);
            }
            Self::Remove { .. } | Self::Add { .. } => {}
        }
    }

    /// Send the command to the store as a single statement.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged.
    pub async fn execute(
        &self,
        store: &dyn InventoryStore,
        shop: &ShopId,
    ) -> Result<(), StoreError> {
        match self {
            Self::Remove { product } => store.remove_product(shop, product.id()).await,
            Self::MarkInStock {
                product_id,
                stamped,
                ..
            } => store.set_last_verified(shop, product_id, Some(*stamped)).await,
            Self::UndoStock {
                product_id,
                restored,
                ..
            } => store.set_last_verified(shop, product_id, *restored).await,
            Self::Add { product, stamped } => store.add_product(shop, &product.id, *stamped).await,
        }
    }
}
