use thiserror::Error;

use crate::domain::Product;

/// Raw text of the editor fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub quantity: String,
    pub price: String,
}

/// Field values after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("quantity must be a whole number, got {0:?}")]
    InvalidQuantity(String),
    #[error("price must be a number, got {0:?}")]
    InvalidPrice(String),
}

impl ProductForm {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }

    /// Pre-fills the fields from an existing product.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            quantity: product.quantity.to_string(),
            price: product.price.to_string(),
        }
    }

    pub fn parse(&self) -> Result<ProductFields, ValidationError> {
        let quantity = self.quantity.trim();
        let quantity = quantity
            .parse::<i32>()
            .map_err(|_| ValidationError::InvalidQuantity(quantity.to_string()))?;

        let price = self.price.trim();
        let price = price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| ValidationError::InvalidPrice(price.to_string()))?;

        Ok(ProductFields {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            quantity,
            price,
        })
    }
}

impl ProductFields {
    pub fn apply_to(self, product: &mut Product) {
        product.name = self.name;
        product.description = self.description;
        product.quantity = self.quantity;
        product.price = self.price;
    }
}
