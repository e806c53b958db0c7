//! Database seeder
//!
//! Populates a fresh database with a deterministic starter dataset: admin
//! accounts, sample blog posts, media, documents in every category, and
//! seven businesses each carrying five products, projects, and services.
//! Safe to re-run: rows that already exist (matched by username or slug)
//! are skipped.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atrium::config::Config;
use atrium::db::repositories::{
    AdminRepository, BlogRepository, BusinessRepository, DocumentRepository, MediaRepository,
    SqlxAdminRepository, SqlxBlogRepository, SqlxBusinessRepository, SqlxDocumentRepository,
    SqlxMediaRepository,
};
use atrium::db::{self, migrations};
use atrium::models::ItemKind;
use atrium::services::password::hash_secret;
use atrium::services::slug::generate_slug;

const ADMINS: &[(&str, &str, &str)] = &[
    ("admin1", "admin1@atrium.dev", "Admin1Pass"),
    ("admin2", "admin2@atrium.dev", "Admin2Pass"),
    ("admin3", "admin3@atrium.dev", "Admin3Pass"),
];

const BLOGS: &[(&str, &str)] = &[
    ("Welcome to Our New Site", "We are proud to launch our redesigned company site."),
    ("Breaking Ground on the Eastern Plant", "Construction of the new plant has begun."),
    ("Safety Milestone Reached", "One thousand days without a lost-time incident."),
    ("Year in Review", "A look back at the projects we delivered this year."),
];

const DOCUMENTS: &[(&str, &str)] = &[
    ("Business License", "legality"),
    ("Environmental Permit", "legality"),
    ("ISO 9001 Certificate", "certification"),
    ("ISO 14001 Certificate", "certification"),
    ("Best Contractor Award", "award"),
    ("Safety Excellence Award", "award"),
];

const MEDIA: &[&str] = &["Company Logo", "Head Office", "Site Overview"];

const BUSINESSES: &[(&str, &str)] = &[
    ("Civil", "Roads, bridges, and public infrastructure."),
    ("Construction", "Industrial and commercial construction."),
    ("Electrical", "Power installation and maintenance."),
    ("Fabrication", "Steel structures and custom fabrication."),
    ("General Supplier", "Procurement and material supply."),
    ("Machining", "Precision machining and part repair."),
    ("Mechanical", "Rotating equipment and piping works."),
];

const ITEMS_PER_KIND: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_with_env(Path::new("config.yml")).context("Failed to load config")?;
    let pool = db::create_pool(&config.database).await?;
    migrations::run_migrations(&pool).await?;

    let admins = SqlxAdminRepository::new(pool.clone());
    let blogs = SqlxBlogRepository::new(pool.clone());
    let media = SqlxMediaRepository::new(pool.clone());
    let documents = SqlxDocumentRepository::new(pool.clone());
    let businesses = SqlxBusinessRepository::new(pool);

    let author_id = seed_admins(&admins).await?;
    seed_blogs(&blogs, author_id).await?;
    seed_media(&media, author_id).await?;
    seed_documents(&documents, author_id).await?;
    seed_businesses(&businesses).await?;

    tracing::info!("Seed complete");
    Ok(())
}

/// Create the admin accounts, returning the first admin's ID
async fn seed_admins(repo: &SqlxAdminRepository) -> Result<i64> {
    let mut first_id = None;
    for &(username, email, password) in ADMINS {
        let id = match repo.get_by_username(username).await? {
            Some(existing) => existing.id,
            None => {
                let hash = hash_secret(password)?;
                let created = repo.create(username, email, &hash).await?;
                tracing::info!("Created admin '{}'", username);
                created.id
            }
        };
        first_id.get_or_insert(id);
    }
    first_id.context("No admins configured")
}

async fn seed_blogs(repo: &SqlxBlogRepository, author_id: i64) -> Result<()> {
    for &(title, content) in BLOGS {
        let slug = generate_slug(title);
        if repo.exists_by_slug(&slug, None).await? {
            continue;
        }
        repo.create(title, &slug, content, author_id).await?;
        tracing::info!("Created blog '{}'", title);
    }
    Ok(())
}

async fn seed_media(repo: &SqlxMediaRepository, uploader_id: i64) -> Result<()> {
    for &name in MEDIA {
        let slug = generate_slug(name);
        let url = format!("http://localhost:8080/uploads/{}.png", slug);
        // try_create returns None when the name is taken from a prior run
        if repo
            .try_create(name, &slug, &url, "128 KB", uploader_id)
            .await?
            .is_some()
        {
            tracing::info!("Created media '{}'", name);
        }
    }
    Ok(())
}

async fn seed_documents(repo: &SqlxDocumentRepository, uploader_id: i64) -> Result<()> {
    for &(name, category) in DOCUMENTS {
        let slug = generate_slug(name);
        if repo.exists_by_slug(&slug, None).await? {
            continue;
        }
        let url = format!("http://localhost:8080/uploads/{}.pdf", slug);
        repo.create(name, &slug, category, &url, "523 KB", uploader_id)
            .await?;
        tracing::info!("Created document '{}'", name);
    }
    Ok(())
}

async fn seed_businesses(repo: &SqlxBusinessRepository) -> Result<()> {
    for &(title, description) in BUSINESSES {
        let slug = generate_slug(title);
        let business = match repo.get_by_slug(&slug).await? {
            Some(existing) => existing,
            None => {
                let created = repo.create(title, &slug, description, None, None).await?;
                tracing::info!("Created business '{}'", title);
                created
            }
        };

        for kind in [ItemKind::Product, ItemKind::Project, ItemKind::Service] {
            for index in 1..=ITEMS_PER_KIND {
                let item_title = format!("{} {} {}", title, item_label(kind), index);
                let item_slug = generate_slug(&item_title);
                if repo.item_exists_by_slug(kind, &item_slug, None).await? {
                    continue;
                }
                let description = format!("{} {} for {}", item_label(kind), index, title);
                repo.create_item(kind, &item_title, &item_slug, &description, &[], business.id)
                    .await?;
            }
        }
    }
    Ok(())
}

fn item_label(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Product => "Product",
        ItemKind::Project => "Project",
        ItemKind::Service => "Service",
    }
}
