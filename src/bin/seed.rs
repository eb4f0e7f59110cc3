use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use weedly_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    entity::{
        ProductTagLinks, ProductTags, Products, product_tag_links, product_tags,
        products::{self, ProductType},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let orm = orm_from_pool(pool);

    let indica = ensure_tag(&orm, "Indica", "purple").await?;
    let sativa = ensure_tag(&orm, "Sativa", "orange").await?;
    let hybrid = ensure_tag(&orm, "Hybrid", "green").await?;
    let cbd = ensure_tag(&orm, "CBD", "blue").await?;

    let products = [
        ("Blue Dream", "Green Acres", ProductType::Flower, 35.0, vec![sativa, hybrid]),
        ("Northern Lights Pre-Roll", "Aurora Farms", ProductType::PreRoll, 12.5, vec![indica]),
        ("Live Resin Cart", "Cloud Nine", ProductType::Vape, 45.0, vec![hybrid]),
        ("Calm Gummies", "Sweet Leaf", ProductType::Edible, 20.0, vec![cbd]),
        ("Relief Balm", "Sweet Leaf", ProductType::Topical, 28.99, vec![cbd]),
    ];

    for (name, brand, product_type, price, tags) in products {
        ensure_product(&orm, name, brand, product_type, price, &tags).await?;
    }

    println!("Seed completed");
    Ok(())
}

async fn ensure_tag(orm: &DatabaseConnection, name: &str, color: &str) -> anyhow::Result<i32> {
    if let Some(existing) = ProductTags::find()
        .filter(product_tags::Column::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let tag = product_tags::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        color: Set(color.to_string()),
    }
    .insert(orm)
    .await?;
    println!("Ensured tag {name}");
    Ok(tag.id)
}

async fn ensure_product(
    orm: &DatabaseConnection,
    name: &str,
    brand: &str,
    product_type: ProductType,
    price: f64,
    tag_ids: &[i32],
) -> anyhow::Result<()> {
    let exists = Products::find()
        .filter(products::Column::Name.eq(name))
        .filter(products::Column::Brand.eq(brand))
        .one(orm)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }

    let product = products::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        brand: Set(brand.to_string()),
        description: Set(None),
        product_type: Set(product_type),
        price: Set(price),
    }
    .insert(orm)
    .await?;

    if !tag_ids.is_empty() {
        let links = tag_ids.iter().map(|tag_id| product_tag_links::ActiveModel {
            product_id: Set(product.id),
            tag_id: Set(*tag_id),
        });
        ProductTagLinks::insert_many(links)
            .exec_without_returning(orm)
            .await?;
    }

    println!("Seeded product {name}");
    Ok(())
}
