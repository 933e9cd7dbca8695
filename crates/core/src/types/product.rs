//! Catalog products and categories.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A menu category such as `Veg`, `Non-Veg` or `Bulk`.
///
/// Categories are whatever the catalog provider sends; there is no fixed list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which categories the product grid currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Label used for the "show everything" chip.
    pub const ALL_LABEL: &'static str = "All";

    /// Parse a chip label. `All` selects every category.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        if label == Self::ALL_LABEL {
            Self::All
        } else {
            Self::Only(Category::new(label))
        }
    }

    /// Whether `product` passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => &product.category == category,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => Self::ALL_LABEL,
            Self::Only(category) => category.as_str(),
        }
    }
}

/// A purchasable menu item, as served by `GET /api/foods`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    /// Image filename, relative to the storefront's image directory.
    #[serde(default)]
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn biryani() -> Product {
        serde_json::from_str(
            r#"{
                "id": 1,
                "name": "Biryani",
                "category": "Non-Veg",
                "price": 200,
                "description": null,
                "image": "biryani.jpg"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserialize_wire_product() {
        let product = biryani();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_rupees(200));
        assert_eq!(product.category.as_str(), "Non-Veg");
        assert!(product.description.is_none());
        assert_eq!(product.image.as_deref(), Some("biryani.jpg"));
    }

    #[test]
    fn test_missing_optional_fields() {
        let product: Product = serde_json::from_str(
            r#"{"id": 2, "name": "Mini Meals", "category": "Veg", "price": 50}"#,
        )
        .unwrap();
        assert!(product.image.is_none());
    }

    #[test]
    fn test_category_filter() {
        let product = biryani();
        assert!(CategoryFilter::All.matches(&product));
        assert!(CategoryFilter::parse("Non-Veg").matches(&product));
        assert!(!CategoryFilter::parse("Veg").matches(&product));
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("Veg").label(), "Veg");
    }
}
