//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! gm-cli cart list
//! gm-cli cart add --id 1 --title "Backpack" --price 150
//! gm-cli cart increment 1
//! gm-cli cart decrement 1
//! ```
//!
//! Each command opens the configured storage, hydrates the cart, applies at
//! most one mutation and prints the resulting cart to stdout.

use std::fmt::Write as _;
use std::io::{self, Write};

use go_marketplace_cart::{CartConfig, CartError, CartStore, CartView, PresentationGate, RenderTarget};
use go_marketplace_core::{NewCartItem, Price, ProductId};
use tracing::info;

/// Writes the cart as a plain-text table.
///
/// The placeholder only logs; the table goes to `out`. The first write
/// error is kept and reported by [`finish`](Self::finish).
pub struct TerminalRenderer<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TerminalRenderer<W> {
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flush and return the writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> RenderTarget for TerminalRenderer<W> {
    fn placeholder(&mut self) {
        info!("Loading cart...");
    }

    fn main(&mut self, cart: &CartView) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.out.write_all(render_cart(cart).as_bytes()) {
            self.error = Some(e);
        }
    }
}

/// Format the cart as a table followed by a summary line.
pub fn render_cart(cart: &CartView) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let id_width = cart
        .items
        .iter()
        .map(|item| item.id.as_str().len())
        .max()
        .unwrap_or(0)
        .max("ID".len());
    let title_width = cart
        .items
        .iter()
        .map(|item| item.title.len())
        .max()
        .unwrap_or(0)
        .max("TITLE".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<id_width$}  {:<title_width$}  {:>5}  {:>10}  {:>10}",
        "ID", "TITLE", "QTY", "PRICE", "TOTAL"
    );
    for item in &cart.items {
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<title_width$}  {:>5}  {:>10}  {:>10}",
            item.id.as_str(),
            item.title,
            item.quantity,
            item.price.display(),
            item.line_total().display(),
        );
    }
    let _ = writeln!(
        out,
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal().display()
    );
    out
}

async fn open_ready(config: &CartConfig) -> Result<CartStore, CartError> {
    let store = CartStore::open(config).await?;
    store.initialize().await;
    Ok(store)
}

async fn print_cart(store: &CartStore) -> io::Result<()> {
    let mut renderer = TerminalRenderer::new(io::stdout());
    renderer.main(&store.view().await);
    renderer.finish().map(drop)
}

/// Print the cart, showing the placeholder while it hydrates.
///
/// # Errors
///
/// Returns an error if storage cannot be opened or stdout cannot be written.
pub async fn list(config: &CartConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = CartStore::open(config).await?;
    let mut gate = PresentationGate::new(store.clone());
    let mut renderer = TerminalRenderer::new(io::stdout());

    tokio::join!(gate.run(&mut renderer), store.initialize());

    renderer.finish()?;
    Ok(())
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the ID or price is invalid, or the cart cannot be
/// loaded or saved.
pub async fn add(
    config: &CartConfig,
    id: &str,
    title: &str,
    image_url: &str,
    price: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let item = NewCartItem {
        id: ProductId::parse(id)?,
        title: title.to_owned(),
        image_url: image_url.to_owned(),
        price: Price::parse(price)?,
    };

    let store = open_ready(config).await?;
    let line = store.add_to_cart(item).await?;
    info!(id = %line.id, quantity = line.quantity, "Added to cart");

    print_cart(&store).await?;
    Ok(())
}

/// Increase a line's quantity by one.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the cart cannot
/// be loaded or saved.
pub async fn increment(config: &CartConfig, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id = ProductId::parse(id)?;
    let store = open_ready(config).await?;
    let line = store.increment(&id).await?;
    info!(id = %line.id, quantity = line.quantity, "Incremented");

    print_cart(&store).await?;
    Ok(())
}

/// Decrease a line's quantity by one, removing it at zero.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the cart cannot
/// be loaded or saved.
pub async fn decrement(config: &CartConfig, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id = ProductId::parse(id)?;
    let store = open_ready(config).await?;
    match store.decrement(&id).await? {
        Some(line) => info!(id = %line.id, quantity = line.quantity, "Decremented"),
        None => info!(id = %id, "Removed from cart"),
    }

    print_cart(&store).await?;
    Ok(())
}
