pub mod product_reviews;
pub mod product_tag_links;
pub mod product_tags;
pub mod products;
pub mod reup_products;
pub mod reup_updates;
pub mod reups;
pub mod user_product_dislikes;
pub mod user_product_favorites;

pub use product_reviews::Entity as ProductReviews;
pub use product_tag_links::Entity as ProductTagLinks;
pub use product_tags::Entity as ProductTags;
pub use products::Entity as Products;
pub use reup_products::Entity as ReUpProducts;
pub use reup_updates::Entity as ReUpUpdates;
pub use reups::Entity as ReUps;
pub use user_product_dislikes::Entity as UserProductDislikes;
pub use user_product_favorites::Entity as UserProductFavorites;
