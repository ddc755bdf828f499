//! # Repository Module
//!
//! Database repository implementations for Taller.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.payables().submit_payment(&id, amount, method, notes)      │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  PayableRepository                                                      │
//! │  ├── create(&self, input)                                               │
//! │  ├── list(&self, filter)                                                │
//! │  ├── submit_payment(&self, id, amount, ...)                             │
//! │  └── paid_by_month(&self)                                               │
//! │       │                                                                 │
//! │       │  SQL Query / Transaction                                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test against an in-memory database                          │
//! │  • SQL is isolated in one place                                        │
//! │  • Transactions owned by the layer that needs them                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`payable::PayableRepository`] - Accounts payable and settlement
//! - [`supplier::SupplierRepository`] - Supplier CRUD
//! - [`product::ProductRepository`] - Inventory and per-location stock
//! - [`order::OrderRepository`] - Repair order intake and workflow
//! - [`sale::SaleRepository`] - Checkout and sales reporting

pub mod order;
pub mod payable;
pub mod product;
pub mod sale;
pub mod supplier;
