//! Product reference data

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A catalog product, identified by its barcode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub code: String,
    pub description: String,
}

impl Product {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Product catalog indexed by code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    products: BTreeMap<String, Product>,
}

impl ProductCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|p| (p.code.clone(), p))
                .collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&Product> {
        self.products.get(code)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Case-insensitive substring search over code and description,
    /// ordered by description
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let needle = term.trim().to_lowercase();
        let mut found: Vec<&Product> = self
            .products
            .values()
            .filter(|p| {
                needle.is_empty()
                    || p.code.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect();
        found.sort_by(|a, b| a.description.cmp(&b.description));
        found
    }
}
