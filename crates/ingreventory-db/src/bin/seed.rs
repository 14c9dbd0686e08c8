//! # Seed Data Generator
//!
//! Populates the database with a demo café for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./ingreventory_dev.db
//! cargo run -p ingreventory-db --bin seed
//!
//! # Specify database path
//! cargo run -p ingreventory-db --bin seed -- --db ./data/ingreventory.db
//! ```
//!
//! ## Generated Data
//! - One store ("Demo Café") with two categories
//! - A handful of ingredients with stock in grams / millilitres / pieces
//! - Products whose recipes and add-ons reference those ingredients

use chrono::Utc;
use std::collections::HashMap;
use std::env;

use ingreventory_core::validation::slugify;
use ingreventory_core::{
    Addon, AddonType, BusinessType, Category, Ingredient, Product, RecipeEntry, Store, StoreAddress,
};
use ingreventory_db::{generate_id, Database, DbConfig};

/// (name, unit, stock, price per unit in cents)
const INGREDIENTS: &[(&str, &str, i64, i64)] = &[
    ("Espresso Beans", "g", 5_000, 3),
    ("Whole Milk", "ml", 20_000, 1),
    ("Oat Milk", "ml", 8_000, 2),
    ("Vanilla Syrup", "ml", 2_000, 2),
    ("Chocolate Sauce", "ml", 2_000, 2),
    ("Croissant Dough", "pc", 40, 45),
    ("Butter", "g", 3_000, 1),
];

/// (category, product, price cents, recipe of (ingredient, count))
const PRODUCTS: &[(&str, &str, i64, &[(&str, i64)])] = &[
    ("Coffee", "Espresso", 300, &[("Espresso Beans", 18)]),
    ("Coffee", "Latte", 450, &[("Espresso Beans", 18), ("Whole Milk", 200)]),
    ("Coffee", "Mocha", 500, &[("Espresso Beans", 18), ("Whole Milk", 180), ("Chocolate Sauce", 30)]),
    ("Pastry", "Croissant", 350, &[("Croissant Dough", 1), ("Butter", 15)]),
];

/// (type, label, ingredient, quantity, price cents) applied to every coffee.
const COFFEE_ADDONS: &[(&str, &str, &str, i64, i64)] = &[
    ("Milk", "Oat Milk", "Oat Milk", 200, 60),
    ("Syrup", "Vanilla", "Vanilla Syrup", 15, 50),
    ("Extras", "Extra Shot", "Espresso Beans", 18, 75),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./ingreventory_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Ingreventory Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./ingreventory_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Ingreventory Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let store = db
        .stores()
        .insert(&Store {
            id: generate_id(),
            name: "Demo Café".to_string(),
            slug: slugify("Demo Cafe"),
            address: StoreAddress {
                city: Some("Springfield".to_string()),
                ..StoreAddress::default()
            },
            currency: "$".to_string(),
            currency_code: "USD".to_string(),
            phone: "555-0100".to_string(),
            email: "hello@demo-cafe.test".to_string(),
            business_type: BusinessType::Cafe,
            tax_id: None,
            background_image: None,
            logo_image: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    println!("✓ Store '{}' ({})", store.name, store.id);

    let mut ingredient_ids = HashMap::new();
    for (name, unit, stock, price) in INGREDIENTS {
        let ingredient = db
            .ingredients()
            .insert(&Ingredient {
                id: generate_id(),
                store_id: store.id.clone(),
                name: name.to_string(),
                description: None,
                unit: unit.to_string(),
                stock: *stock,
                price_per_unit_cents: *price,
                markup_bps: 2_500,
                created_at: now,
                last_restocked: Some(now),
            })
            .await?;
        ingredient_ids.insert(*name, ingredient.id);
    }
    println!("✓ {} ingredients", ingredient_ids.len());

    let mut category_ids = HashMap::new();
    for (category_name, _, _, _) in PRODUCTS {
        if category_ids.contains_key(category_name) {
            continue;
        }
        let category = db
            .categories()
            .insert(&Category {
                id: generate_id(),
                store_id: store.id.clone(),
                name: category_name.to_string(),
                slug: slugify(category_name),
                description: None,
                is_active: true,
                product_count: 0,
                created_at: now,
                updated_at: now,
            })
            .await?;
        category_ids.insert(*category_name, category.id);
    }

    let mut generated = 0;
    for (category_name, name, price_cents, recipe) in PRODUCTS {
        let Some(category_id) = category_ids.get(category_name) else {
            continue;
        };

        let mut product = Product::new(&store.id, category_id, name);
        product.id = generate_id();
        product.price_cents = *price_cents;
        product.inventory = 100;
        product.ingredients = recipe
            .iter()
            .filter_map(|(ingredient, count)| {
                ingredient_ids.get(ingredient).map(|id| RecipeEntry {
                    ingredient_id: id.clone(),
                    count: *count,
                })
            })
            .collect();

        if *category_name == "Coffee" {
            for (addon_type, label, ingredient, quantity, price) in COFFEE_ADDONS {
                if !product.addon_types.iter().any(|t| t.label == *addon_type) {
                    product.addon_types.push(AddonType {
                        label: addon_type.to_string(),
                    });
                }
                if let Some(ingredient_id) = ingredient_ids.get(ingredient) {
                    product.addons.push(Addon {
                        addon_type: addon_type.to_string(),
                        label: label.to_string(),
                        ingredient_id: ingredient_id.clone(),
                        quantity: *quantity,
                        cost_cents: 0,
                        price_cents: *price,
                    });
                }
            }
        }

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }
        generated += 1;
    }

    println!("✓ {} products", generated);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
