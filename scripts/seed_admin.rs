//! Seed script/binary for the admission portal.
//!
//! Creates the default admin account directly in the store. Admins are
//! never created through open registration, so this is the only supported
//! way to bootstrap one:
//!
//!   DEFAULT_ADMIN_EMAIL=... DEFAULT_ADMIN_PASSWORD=... cargo run --bin seed_admin
//!
//! Safe to run repeatedly: it refuses to create a second admin.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use admission_portal::auth::hash_password;
use admission_portal::config::AppConfig;
use admission_portal::models::{Address, Gender, Role, User};
use admission_portal::storage::Storage;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    let storage = Storage::open(&config.data_dir)?;

    if storage.has_admin()? {
        println!("Admin already exists, nothing to do.");
        return Ok(());
    }

    let now = Utc::now();
    let admin = User {
        id: Uuid::new_v4().to_string(),
        name: "System Admin".to_string(),
        email: config.default_admin_email.to_lowercase(),
        password_hash: hash_password(&config.default_admin_password)?,
        role: Role::Admin,
        phone: "9999999999".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        gender: Gender::Other,
        address: Address {
            street: Some("Admin Street".to_string()),
            city: Some("Admin City".to_string()),
            state: Some("Admin State".to_string()),
            pincode: Some("000000".to_string()),
            country: "India".to_string(),
        },
        is_active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    };

    storage.create_user(&admin)?;
    println!(
        "Default admin created: {} (set DEFAULT_ADMIN_EMAIL / DEFAULT_ADMIN_PASSWORD to override)",
        admin.email
    );

    Ok(())
}
