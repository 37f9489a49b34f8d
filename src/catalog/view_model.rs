use tracing::warn;

use crate::domain::{ChangeKind, DocumentChange, Product};

/// Minimal change of the catalog list, for incremental refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogChange {
    Inserted { index: usize, product: Product },
    Updated { index: usize, product: Product },
    Removed { index: usize, id: String },
    Cleared,
}

/// Receives catalog changes as they are applied.
pub trait CatalogObserver: Send + Sync {
    fn on_change(&self, change: &CatalogChange);
}

/// Ordered, de-duplicated list of persisted products.
///
/// Entries are unique by id and keep arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.position(id).map(|index| &self.products[index])
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.products
            .iter()
            .position(|p| p.id.as_deref() == Some(id))
    }

    /// Appends a product, or refreshes it in place when its id is already listed.
    pub fn add(&mut self, product: Product) -> Option<CatalogChange> {
        let Some(id) = product.id.as_deref() else {
            warn!(product_name = %product.name, "Ignoring transient product");
            return None;
        };
        match self.position(id) {
            Some(index) if self.products[index] == product => None,
            Some(index) => {
                self.products[index] = product.clone();
                Some(CatalogChange::Updated { index, product })
            }
            None => {
                self.products.push(product.clone());
                Some(CatalogChange::Inserted {
                    index: self.products.len() - 1,
                    product,
                })
            }
        }
    }

    /// Replaces the entry with the same id. Unknown ids are ignored.
    pub fn update(&mut self, product: Product) -> Option<CatalogChange> {
        let index = self.position(product.id.as_deref()?)?;
        self.products[index] = product.clone();
        Some(CatalogChange::Updated { index, product })
    }

    /// Removes the entry with the same id. Unknown ids are ignored.
    pub fn delete(&mut self, product: &Product) -> Option<CatalogChange> {
        let id = product.id.as_deref()?;
        let index = self.position(id)?;
        self.products.remove(index);
        Some(CatalogChange::Removed {
            index,
            id: id.to_string(),
        })
    }

    pub fn apply(&mut self, change: &DocumentChange) -> Option<CatalogChange> {
        match change.kind {
            ChangeKind::Added => self.add(change.product.clone()),
            ChangeKind::Modified => self.update(change.product.clone()),
            ChangeKind::Removed => self.delete(&change.product),
        }
    }

    /// Replaces the whole list with a snapshot, keeping the first occurrence
    /// position and the last values of each id. Returns the changes in the
    /// order they were applied.
    pub fn replace_all(&mut self, products: impl IntoIterator<Item = Product>) -> Vec<CatalogChange> {
        let mut changes: Vec<CatalogChange> = self.clear().into_iter().collect();
        changes.extend(products.into_iter().filter_map(|product| self.add(product)));
        changes
    }

    pub fn clear(&mut self) -> Option<CatalogChange> {
        if self.products.is_empty() {
            return None;
        }
        self.products.clear();
        Some(CatalogChange::Cleared)
    }
}

/// Pure reducer form of [`Catalog::apply`].
pub fn apply_event(mut catalog: Catalog, change: &DocumentChange) -> Catalog {
    catalog.apply(change);
    catalog
}
