//! Stock availability.

use serde::{Deserialize, Serialize};

/// Whether a product can currently be ordered.
///
/// The document service stores this as a plain `inStock` boolean; the enum
/// exists for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
}

impl StockStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }

    /// CSS class used by the product card.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::InStock => "instock",
            Self::OutOfStock => "outstock",
        }
    }
}

impl From<bool> for StockStatus {
    fn from(in_stock: bool) -> Self {
        if in_stock {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }
}
