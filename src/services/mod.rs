pub mod product_service;
pub mod reup_service;
pub mod tag_service;
