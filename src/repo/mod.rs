pub mod ingredients;
pub mod migrations;
pub mod products;
