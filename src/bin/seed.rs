use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use storefront_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    slug::slugify,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_employee(&pool, "admin@example.com", "admin123", "admin").await?;
    let staff_id = ensure_employee(&pool, "staff@example.com", "staff123", "staff").await?;
    let customer_id = ensure_customer(&pool, "0912345678", "customer123").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Staff ID: {staff_id}, Customer ID: {customer_id}");
    Ok(())
}

fn hash(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string())
}

async fn ensure_employee(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO employees (id, username, email, phone_number, password_hash, address, role)
        VALUES ($1, $2, $3, '0987654321', $4, 'Head office', $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(role)
    .bind(email)
    .bind(hash(password)?)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured employee {email} (role={role})");
    Ok(id)
}

async fn ensure_customer(pool: &sqlx::PgPool, phone: &str, password: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO customers (id, username, phone_number, password_hash, address)
        VALUES ($1, 'customer', $2, $3, '1 Le Loi, District 1')
        ON CONFLICT (phone_number) DO UPDATE SET username = EXCLUDED.username
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(phone)
    .bind(hash(password)?)
    .fetch_one(pool)
    .await?;

    println!("Ensured customer {phone}");
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let catalog = [
        ("Cà phê", vec![("Cà phê sữa đá", 35_000, Some(29_000)), ("Bạc xỉu", 39_000, None)]),
        ("Trà", vec![("Trà đào cam sả", 45_000, None), ("Trà sen vàng", 49_000, Some(45_000))]),
    ];

    for (category, products) in catalog {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM product_categories WHERE name = $1")
                .bind(category)
                .fetch_optional(pool)
                .await?;
        let category_id = match existing {
            Some((id,)) => id,
            None => {
                let id = Uuid::new_v4();
                sqlx::query("INSERT INTO product_categories (id, name) VALUES ($1, $2)")
                    .bind(id)
                    .bind(category)
                    .execute(pool)
                    .await?;
                id
            }
        };

        for (name, price, price_discount) in products {
            sqlx::query(
                r#"
                INSERT INTO products (id, name, slug, price, price_discount, category_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (slug) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(slugify(name))
            .bind(price as i64)
            .bind(price_discount.map(|d: i32| d as i64))
            .bind(category_id)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded catalog");
    Ok(())
}
