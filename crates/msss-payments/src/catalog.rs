//! Product Catalog
//!
//! The book and its optional add-on, with prices and download filenames.

use serde::{Deserialize, Serialize};

/// Default price of the templates pack in cents
pub const DEFAULT_TEMPLATES_CENTS: i64 = 700;

/// Downloadable asset kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// The book PDF
    Book,
    /// Templates + Trackers Pack add-on
    TemplatesAddon,
}

impl AssetKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::TemplatesAddon => "templates_addon",
        }
    }

    /// Suggested filename without extension
    pub const fn file_stem(&self) -> &'static str {
        match self {
            Self::Book => "Mornings-Shouldnt-Suck",
            Self::TemplatesAddon => "MSSS-Templates-Trackers-Pack",
        }
    }

    /// Suggested download filename, extension taken from the asset locator
    pub fn download_filename(&self, locator: &str) -> String {
        format!("{}{}", self.file_stem(), file_extension(locator))
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension (with dot) of the locator path, `.pdf` when there is none
pub fn file_extension(locator: &str) -> String {
    let path = locator.split('?').next().unwrap_or_default();
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!(".{ext}")
        }
        _ => ".pdf".into(),
    }
}

/// Line item pricing
#[derive(Clone, Debug)]
pub struct ProductPricing {
    pub name: String,
    pub description: String,
    pub cents: i64,
    pub image: Option<String>,
}

/// Prices for everything sold at checkout
#[derive(Clone, Debug)]
pub struct Catalog {
    pub book: ProductPricing,
    pub templates: ProductPricing,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_templates_price(DEFAULT_TEMPLATES_CENTS)
    }
}

impl Catalog {
    pub fn with_templates_price(templates_cents: i64) -> Self {
        Self {
            book: ProductPricing {
                name: "Mornings Shouldn't Suck".into(),
                description: "The complete guide to building a powerful morning routine. 20+ science-backed habits.".into(),
                cents: 1200, // $12.00
                image: Some("https://morningroutines.co/book-cover.png".into()),
            },
            templates: ProductPricing {
                name: "Templates + Trackers Pack".into(),
                description: "Printable routine templates and habit trackers to go with the book.".into(),
                cents: templates_cents,
                image: None,
            },
        }
    }

    /// Items for a checkout, book first
    pub fn line_items(&self, add_templates: bool) -> Vec<&ProductPricing> {
        let mut items = vec![&self.book];
        if add_templates {
            items.push(&self.templates);
        }
        items
    }
}
