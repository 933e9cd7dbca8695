//! Page state and user actions.
//!
//! [`Storefront`] owns everything the rendering layer needs: the cached
//! catalog, the active category filter and the cart store. Views are pure
//! functions of it, so the whole page can be exercised without a browser.
//!
//! Clicks arrive as [`UiAction`]s. Rendered elements carry only data
//! attributes (`data-action`, `data-product-id`); one delegated listener per
//! container reads them and calls [`Storefront::dispatch`].

use std::collections::HashSet;

use tiffin_core::{Category, CategoryFilter, Price, Product};
use tracing::debug;

use crate::cart::{Cart, CartStore};
use crate::search::{self, SearchQuery};
use crate::storage::KeyValueStore;

/// A cart mutation requested by a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Product card add/added button.
    Toggle(String),
    /// Cart panel `+`.
    Increment(String),
    /// Cart panel `−`.
    Decrement(String),
    /// Cart panel "Remove".
    Remove(String),
    /// Cart panel "Clear".
    Clear,
}

impl UiAction {
    /// Build an action from a clicked element's `data-action` and
    /// `data-product-id` attributes.
    ///
    /// Returns `None` for an unknown action or a per-product action without
    /// a product id.
    #[must_use]
    pub fn from_data_attrs(action: &str, product_id: Option<&str>) -> Option<Self> {
        if action == "clear" {
            return Some(Self::Clear);
        }

        let id = product_id.map(str::trim).filter(|id| !id.is_empty())?.to_string();
        match action {
            "toggle" => Some(Self::Toggle(id)),
            "increment" => Some(Self::Increment(id)),
            "decrement" => Some(Self::Decrement(id)),
            "remove" => Some(Self::Remove(id)),
            _ => None,
        }
    }

    /// The `data-action` value that produces this action.
    #[must_use]
    pub const fn data_action(&self) -> &'static str {
        match self {
            Self::Toggle(_) => "toggle",
            Self::Increment(_) => "increment",
            Self::Decrement(_) => "decrement",
            Self::Remove(_) => "remove",
            Self::Clear => "clear",
        }
    }
}

/// Result of running the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    /// Blank query: the unranked grid for the current filter.
    NoQuery(Vec<&'a Product>),
    /// Ranked matches across the whole catalog; empty means "No matches found".
    Matches(Vec<&'a Product>),
}

impl<'a> SearchOutcome<'a> {
    /// Products to show in the grid.
    #[must_use]
    pub fn items(&self) -> &[&'a Product] {
        match self {
            Self::NoQuery(items) | Self::Matches(items) => items,
        }
    }

    /// Consume into the products to show in the grid.
    #[must_use]
    pub fn into_items(self) -> Vec<&'a Product> {
        match self {
            Self::NoQuery(items) | Self::Matches(items) => items,
        }
    }
}

/// One cart line joined with its catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine<'a> {
    pub product: &'a Product,
    pub quantity: u32,
    pub line_total: Price,
}

/// The cart as the panel shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary<'a> {
    /// Lines for products present in the catalog, in catalog order.
    pub lines: Vec<CartLine<'a>>,
    /// Sum of line totals.
    pub total: Price,
    /// Total quantity across every cart entry, known to the catalog or not.
    pub item_count: u64,
}

impl CartSummary<'_> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Explicit page state: catalog cache, category filter and cart.
#[derive(Debug)]
pub struct Storefront<S> {
    catalog: Vec<Product>,
    filter: CategoryFilter,
    cart: CartStore<S>,
}

impl<S: KeyValueStore> Storefront<S> {
    pub const fn new(storage: S) -> Self {
        Self {
            catalog: Vec::new(),
            filter: CategoryFilter::All,
            cart: CartStore::new(storage),
        }
    }

    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    /// Mutable access, for subscribing to cart changes.
    pub const fn cart_mut(&mut self) -> &mut CartStore<S> {
        &mut self.cart
    }

    // =========================================================================
    // Catalog & filtering
    // =========================================================================

    /// Replace the cached catalog.
    pub fn set_catalog(&mut self, products: Vec<Product>) {
        debug!(count = products.len(), "Catalog loaded");
        self.catalog = products;
    }

    #[must_use]
    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    #[must_use]
    pub const fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn filter_by(&mut self, filter: CategoryFilter) {
        debug!(filter = filter.label(), "Category filter changed");
        self.filter = filter;
    }

    /// Distinct catalog categories in first-seen order, for the filter chips.
    #[must_use]
    pub fn category_names(&self) -> Vec<&Category> {
        let mut seen = HashSet::new();
        self.catalog
            .iter()
            .map(|p| &p.category)
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Products for the grid.
    ///
    /// `list` (search results, a selected suggestion) is shown as-is when
    /// given; otherwise the catalog narrowed by the current filter.
    #[must_use]
    pub fn visible_items<'a>(&'a self, list: Option<Vec<&'a Product>>) -> Vec<&'a Product> {
        list.unwrap_or_else(|| {
            self.catalog
                .iter()
                .filter(|p| self.filter.matches(p))
                .collect()
        })
    }

    /// Look up a catalog product by its cart key.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.catalog.iter().find(|p| p.id.cart_key() == id)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Run the search box.
    ///
    /// A blank query is not a search: it returns the filtered grid unsorted.
    /// Otherwise every catalog product is ranked, regardless of the filter.
    #[must_use]
    pub fn search(&self, raw: &str) -> SearchOutcome<'_> {
        match SearchQuery::parse(raw) {
            None => SearchOutcome::NoQuery(self.visible_items(None)),
            Some(query) => {
                let matches = search::rank_and_filter(&self.catalog, query.as_str());
                debug!(query = query.as_str(), count = matches.len(), "Search ran");
                SearchOutcome::Matches(matches)
            }
        }
    }

    /// Products named exactly `name`, ignoring case.
    #[must_use]
    pub fn select_suggestion(&self, name: &str) -> Vec<&Product> {
        let name = name.to_lowercase();
        self.catalog
            .iter()
            .filter(|p| p.name.to_lowercase() == name)
            .collect()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Apply a click to the cart. Returns the cart after the change.
    pub fn dispatch(&self, action: &UiAction) -> Cart {
        debug!(action = action.data_action(), "Dispatching UI action");
        match action {
            UiAction::Toggle(id) => self.cart.toggle(id),
            UiAction::Increment(id) => self.cart.increment(id),
            UiAction::Decrement(id) => self.cart.decrement(id),
            UiAction::Remove(id) => self.cart.remove(id),
            UiAction::Clear => {
                self.cart.clear();
                Cart::new()
            }
        }
    }

    /// Join the persisted cart with the catalog.
    ///
    /// Ids the catalog does not know are left out of the lines and the total
    /// but still counted in `item_count`.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummary<'_> {
        let cart = self.cart.load();
        let lines: Vec<CartLine<'_>> = self
            .catalog
            .iter()
            .filter_map(|product| {
                let quantity = cart.quantity(&product.id.cart_key());
                (quantity > 0).then(|| CartLine {
                    product,
                    quantity,
                    line_total: product.price.times(quantity),
                })
            })
            .collect();

        CartSummary {
            total: lines.iter().map(|l| l.line_total).sum(),
            item_count: cart.total_quantity(),
            lines,
        }
    }

    /// Whether checkout may proceed: at least one displayable line.
    #[must_use]
    pub fn checkout_ready(&self) -> bool {
        !self.cart_summary().is_empty()
    }
}
