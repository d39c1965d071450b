//! Database seeder for Tally development and testing.
//!
//! Seeds an admin user and a starter set of accounts for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use tally_core::auth::hash_password;
use tally_db::entities::{
    accounts,
    sea_orm_active_enums::{AccountType, UserRole},
    users,
};

/// Admin user ID (consistent for all seeds)
const ADMIN_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tally_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding admin user...");
    seed_admin_user(&db).await;

    println!("Seeding starter accounts...");
    seed_starter_accounts(&db).await;

    println!("Seeding complete!");
}

fn admin_user_id() -> Uuid {
    Uuid::parse_str(ADMIN_USER_ID).unwrap()
}

/// Seeds the development admin user.
async fn seed_admin_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(admin_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Admin user already exists, skipping...");
        return;
    }

    let password_hash = hash_password("admin-dev-password").expect("Failed to hash password");

    let user = users::ActiveModel {
        id: Set(admin_user_id()),
        email: Set("admin@tally.dev".to_string()),
        password_hash: Set(password_hash),
        full_name: Set("Dev Admin".to_string()),
        role: Set(UserRole::Admin),
        created_at: Set(Utc::now().into()),
    };

    user.insert(db).await.expect("Failed to seed admin user");
    println!("  Seeded admin@tally.dev (password: admin-dev-password)");
}

/// Seeds a starter chart of everyday accounts.
async fn seed_starter_accounts(db: &DatabaseConnection) {
    let starters = [
        ("Cash", AccountType::Asset, "Cash on Hand"),
        ("Business Checking", AccountType::Asset, "Bank Account"),
        ("Owner Loan", AccountType::Liability, "Loan"),
        ("Sales", AccountType::Income, "Revenue"),
        ("Office Costs", AccountType::Expense, "Operating"),
    ];

    let now = Utc::now().into();
    for (name, account_type, subtype) in starters {
        let exists = accounts::Entity::find()
            .all(db)
            .await
            .unwrap_or_default()
            .iter()
            .any(|a| a.name == name);

        if exists {
            println!("  Account '{name}' already exists, skipping...");
            continue;
        }

        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_type: Set(account_type),
            name: Set(name.to_string()),
            balance: Set(Decimal::ZERO),
            subtype: Set(subtype.to_string()),
            lock_version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(db).await.expect("Failed to seed account");
        println!("  Seeded account '{name}'");
    }
}
