pub mod cart;
pub mod product;
