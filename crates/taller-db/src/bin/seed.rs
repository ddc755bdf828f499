//! # Seed Data Generator
//!
//! Populates the database with development data for the workshop backend.
//!
//! ## Usage
//! ```bash
//! # Default dataset
//! cargo run -p taller-db --bin seed
//!
//! # Custom product count
//! cargo run -p taller-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p taller-db --bin seed -- --db ./data/taller.db
//! ```
//!
//! ## Generated Data
//! - a fixed set of parts suppliers
//! - `--count` products with stock at two workshops
//! - payable accounts in all three states: pending, partial (one abono
//!   recorded) and paid (settled through the engine, some with an
//!   early-payment discount honored)
//! - a handful of repair orders at different workflow stages
//! - one walk-in sale

use chrono::{Duration, Utc};
use std::env;
use taller_core::settlement;
use taller_core::{
    Money, NewPayableAccount, NewProduct, NewRepairOrder, NewSale, NewSaleItem, NewSupplier,
    OrderStatus, OrderUpdate,
};
use taller_db::{Database, DbConfig};

/// Parts suppliers with contact names.
const SUPPLIERS: &[(&str, &str)] = &[
    ("Distribuidora Norte", "Carlos Mendez"),
    ("ImportTech SAS", "Lucia Rivera"),
    ("Pantallas y Partes", "Jorge Salas"),
    ("ElectroMayorista", "Ana Torres"),
];

/// Part names combined with device models to build product names.
const PARTS: &[(&str, i64, i64)] = &[
    // (name, price_cents, cost_cents)
    ("Pantalla", 55_000, 30_000),
    ("Bateria", 18_000, 9_000),
    ("Puerto de carga", 12_000, 5_000),
    ("Camara trasera", 35_000, 19_000),
    ("Tapa posterior", 15_000, 7_000),
    ("Flex de encendido", 8_000, 3_000),
];

const MODELS: &[&str] = &[
    "Samsung A54", "Samsung S21", "iPhone 11", "iPhone 13", "Xiaomi Note 12", "Motorola G84",
];

const LOCATIONS: &[&str] = &["principal", "sucursal"];

const FAULTS: &[&str] = &[
    "no enciende",
    "pantalla rota",
    "no carga",
    "se reinicia solo",
    "mojado",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./taller_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Taller Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./taller_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Taller Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().list(1, None).await?;
    if existing.total_products > 0 {
        println!("⚠ Database already has {} products", existing.total_products);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Suppliers
    let mut supplier_ids = Vec::new();
    for (name, contact) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .create(NewSupplier {
                name: name.to_string(),
                contact: Some(contact.to_string()),
                phone: None,
                email: None,
                address: None,
            })
            .await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ {} suppliers", supplier_ids.len());

    // Products with stock
    println!();
    println!("Generating products...");
    let start = std::time::Instant::now();

    let mut product_ids = Vec::new();
    let mut generated = 0;
    'outer: for round in 0usize.. {
        for (part_idx, (part, price, cost)) in PARTS.iter().enumerate() {
            for (model_idx, model) in MODELS.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = round * 100 + part_idx * 10 + model_idx;
                let suffix = if round == 0 {
                    String::new()
                } else {
                    format!(" (lote {})", round + 1)
                };

                let product = db
                    .products()
                    .create(NewProduct {
                        name: format!("{part} {model}{suffix}"),
                        description: None,
                        cost_cents: Some(*cost),
                        price_cents: *price,
                        supplier_id: Some(supplier_ids[seed % supplier_ids.len()].clone()),
                        location: LOCATIONS[seed % LOCATIONS.len()].to_string(),
                        initial_quantity: (seed % 15) as i64,
                        min_stock: None,
                    })
                    .await?;
                product_ids.push(product.id);
                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // Payable accounts: pending, partial and settled
    println!();
    println!("Generating payable accounts...");
    let today = Utc::now().date_naive();
    let mut settled = 0;
    let mut partial = 0;

    for i in 0..30usize {
        let total_cents = 50_000 + ((i as i64 * 13_777) % 450_000);
        let bps = [0u32, 500, 1000][i % 3];
        // Mix of open windows, expired windows and undated invoices.
        let due_date = match i % 4 {
            0 => Some(today + Duration::days(7 + (i as i64 % 20))),
            1 => Some(today - Duration::days(3)),
            2 => Some(today + Duration::days(1)),
            _ => None,
        };

        let account = db
            .payables()
            .create(NewPayableAccount {
                supplier_id: Some(supplier_ids[i % supplier_ids.len()].clone()),
                invoice_number: Some(format!("F-{:04}", 1000 + i)),
                description: Some("repuestos".to_string()),
                total_cents,
                early_discount_bps: bps,
                issue_date: Some(today - Duration::days(10)),
                due_date,
            })
            .await?;

        match i % 3 {
            // One abono of roughly 40%, leaving the account partial.
            1 => {
                db.payables()
                    .submit_payment(
                        &account.id,
                        Money::from_cents(total_cents * 2 / 5),
                        Some("efectivo"),
                        None,
                    )
                    .await?;
                partial += 1;
            }
            // Settle in full at today's target, discounted or not.
            2 => {
                let outstanding = settlement::outstanding(&account, Money::zero(), today);
                db.payables()
                    .submit_payment(
                        &account.id,
                        outstanding.target_balance,
                        Some("transferencia"),
                        None,
                    )
                    .await?;
                settled += 1;
            }
            _ => {}
        }
    }
    println!("✓ 30 payable accounts ({partial} partial, {settled} paid)");

    // Repair orders
    let mut order_ids = Vec::new();
    for i in 0..10usize {
        let order = db
            .orders()
            .create(NewRepairOrder {
                customer_name: format!("Cliente {}", i + 1),
                customer_phone: Some(format!("555-01{:02}", i)),
                customer_email: None,
                device_brand: Some("Samsung".to_string()),
                device_model: Some(MODELS[i % MODELS.len()].to_string()),
                serial_number: None,
                unlock_code: None,
                reported_fault: FAULTS[i % FAULTS.len()].to_string(),
                cosmetic_details: None,
                accessories: None,
                initial_quote_cents: Some(40_000 + (i as i64 * 5_000)),
                location: Some(LOCATIONS[i % LOCATIONS.len()].to_string()),
            })
            .await?;

        let status = match i % 4 {
            1 => Some(OrderStatus::Diagnosing),
            2 => Some(OrderStatus::Repairing),
            3 => Some(OrderStatus::ReadyForPickup),
            _ => None,
        };
        if let Some(status) = status {
            db.orders()
                .update(
                    &order.id,
                    OrderUpdate {
                        status: Some(status),
                        ..OrderUpdate::default()
                    },
                )
                .await?;
        }
        order_ids.push(order.id);
    }
    println!("✓ {} repair orders", order_ids.len());

    // One walk-in sale off the first product
    if let Some(product_id) = product_ids.first() {
        db.sales()
            .checkout(NewSale {
                order_id: None,
                customer_name: Some("Venta mostrador".to_string()),
                customer_document: None,
                total_cents: PARTS[0].1,
                method: Some("efectivo".to_string()),
                location: LOCATIONS[0].to_string(),
                items: vec![NewSaleItem {
                    product_id: Some(product_id.clone()),
                    description: "Pantalla Samsung A54".to_string(),
                    quantity: 1,
                    unit_price_cents: PARTS[0].1,
                    unit_cost_cents: PARTS[0].2,
                    line_total_cents: PARTS[0].1,
                }],
            })
            .await?;
        println!("✓ 1 sale");
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
