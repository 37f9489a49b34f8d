use super::Product;

/// Kind of a remote document change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// One document change delivered by a catalog subscription.
///
/// `product.id` is always set from the document key.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChange {
    pub kind: ChangeKind,
    pub product: Product,
}

impl DocumentChange {
    pub fn added(product: Product) -> Self {
        Self { kind: ChangeKind::Added, product }
    }

    pub fn modified(product: Product) -> Self {
        Self { kind: ChangeKind::Modified, product }
    }

    pub fn removed(product: Product) -> Self {
        Self { kind: ChangeKind::Removed, product }
    }
}
