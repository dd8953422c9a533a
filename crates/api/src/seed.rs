//! Demo catalog seeding for local development.
//!
//! Fills an otherwise empty catalog with named products, placeholder
//! images, and spread-out prices and stock levels so the API is usable
//! straight after startup.

use catalog::{Catalog, CatalogError, Product};
use common::Money;

const ADJECTIVES: &[&str] = &[
    "Rustic", "Sleek", "Ergonomic", "Durable", "Compact", "Luminous", "Vintage", "Modular",
    "Portable", "Refined",
];

const NOUNS: &[&str] = &[
    "Widget", "Gadget", "Lamp", "Keyboard", "Backpack", "Mug", "Notebook", "Speaker", "Chair",
    "Clock",
];

/// Inserts `count` demo products into the catalog.
///
/// Names already present are skipped, so seeding on every startup is
/// harmless. Returns the number of products actually created.
#[tracing::instrument(skip(catalog))]
pub async fn seed_products<C: Catalog>(catalog: &C, count: u32) -> Result<u32, CatalogError> {
    let mut created = 0;
    for n in 0..count {
        let adjective = ADJECTIVES[n as usize % ADJECTIVES.len()];
        let noun = NOUNS[(n as usize / ADJECTIVES.len()) % NOUNS.len()];
        // The numeric suffix keeps names unique past one cycle of the
        // word lists.
        let name = format!("{adjective} {noun} {}", 100 + n);
        let slug = name.to_lowercase().replace(' ', "-");

        // Prices land in 5.00..=1000.00 and stock in 0..=200.
        let price = Money::from_cents(500 + (i64::from(n) * 7919) % 99_501);
        let stock = (n * 37) % 201;

        let product = Product::new(format!("DEMO-{:03}", n + 1), name, price, stock)
            .with_description(format!("Demo listing for the {slug}."))
            .with_image_url(format!("https://placehold.co/600x400?text={slug}"));

        match catalog.insert_product(product).await {
            Ok(_) => created += 1,
            Err(CatalogError::DuplicateName { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    tracing::info!(created, requested = count, "seeded demo products");
    Ok(created)
}
