pub mod category;
pub mod ingredients;
pub mod normalize;
pub mod similarity;
