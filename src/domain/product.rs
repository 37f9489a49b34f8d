use serde::{Deserialize, Serialize};

/// A catalog product.
///
/// A product is *transient* while `id` is `None` and *persisted* once the
/// remote store has acknowledged a write under that id. The id is the
/// document key and never part of the stored document body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(skip)]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub price: f64,
    #[serde(rename = "imgUrl")]
    pub img_url: String,
}

impl Product {
    /// Creates a transient product with no image.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        quantity: i32,
        price: f64,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            quantity,
            price,
            img_url: String::new(),
        }
    }

    /// Returns the same product bound to a document id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Rebuilds a product from a stored document and its key.
    pub fn from_document(id: impl Into<String>, document: serde_json::Value) -> serde_json::Result<Self> {
        let product: Product = serde_json::from_value(document)?;
        Ok(product.with_id(id))
    }

    /// The document body as written to the remote store.
    pub fn to_document(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
