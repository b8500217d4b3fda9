//! Database schema initialization for salesdb-mcp
//!
//! Creates the sales tables the access policy is scoped to. The history
//! table exists here because conversation bookkeeping writes to it outside
//! these tools; the tools themselves can never reach it.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

/// Ensure the sales tables exist
pub fn ensure_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Real estate project listings (read-only through the tools)
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_name TEXT,
            no_of_bedrooms INTEGER,
            completion_status TEXT,
            bathrooms INTEGER,
            unit_type TEXT,
            developer_name TEXT,
            price_usd REAL,
            area_sq_mtrs REAL,
            property_type TEXT,
            city TEXT,
            country TEXT,
            completion_date TEXT,
            features TEXT,
            facilities TEXT,
            project_description TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Customer leads and preferences
        CREATE TABLE IF NOT EXISTS leads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT,
            last_name TEXT,
            email TEXT UNIQUE,
            preferred_city TEXT,
            preferred_budget_usd INTEGER,
            preferred_property_type TEXT,
            preferred_bedrooms INTEGER,
            metadata_json TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Bookings linking leads to projects
        CREATE TABLE IF NOT EXISTS bookings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lead_id INTEGER,
            project_id INTEGER,
            booking_date TEXT,
            booking_status TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (lead_id) REFERENCES leads(id) ON DELETE CASCADE,
            FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
        );

        -- Conversation bookkeeping; never reachable through the SQL tools
        CREATE TABLE IF NOT EXISTS history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id TEXT NOT NULL UNIQUE,
            lead_id INTEGER,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (lead_id) REFERENCES leads(id) ON DELETE SET NULL
        );

        -- Indexes
        CREATE INDEX IF NOT EXISTS idx_projects_city_bedrooms
        ON projects(city, no_of_bedrooms);

        CREATE INDEX IF NOT EXISTS idx_projects_price
        ON projects(price_usd);

        CREATE INDEX IF NOT EXISTS idx_leads_email
        ON leads(email);

        CREATE INDEX IF NOT EXISTS idx_bookings_lead_status
        ON bookings(lead_id, booking_status);

        CREATE INDEX IF NOT EXISTS idx_bookings_project_status
        ON bookings(project_id, booking_status);

        CREATE INDEX IF NOT EXISTS idx_history_lead
        ON history(lead_id, conversation_id);
        "#,
    )
    .context("Failed to create sales tables")?;

    Ok(())
}

/// Insert demo project rows into an empty projects table
///
/// Idempotent: a non-empty table is left untouched. Returns the number of
/// rows inserted.
pub fn seed_demo_projects(conn: &Connection) -> Result<usize> {
    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))
        .context("Failed to count projects")?;
    if existing > 0 {
        return Ok(0);
    }

    // (name, bedrooms, status, baths, unit, developer, price, area, type, city, country, date, description)
    let demo_projects = [
        (
            "Marina Bay Residences",
            2,
            "available",
            2,
            "2BR-A",
            "Emaar Properties",
            750_000.0,
            110.0,
            "apartment",
            "Dubai",
            "UAE",
            "2024-06",
            "Waterfront apartments in Dubai Marina with full skyline views.",
        ),
        (
            "Sky View Towers",
            1,
            "off plan",
            1,
            "1BR-S",
            "Damac",
            420_000.0,
            68.0,
            "apartment",
            "Dubai",
            "UAE",
            "2026-03",
            "High-rise living above Downtown with completion in 2026.",
        ),
        (
            "ELLE Resort & Beach Club",
            3,
            "available",
            3,
            "3BR-V",
            "Geonet",
            1_250_000.0,
            240.0,
            "villa",
            "Bali",
            "Indonesia",
            "2023-11",
            "Beachfront villas with private pools and resort amenities.",
        ),
        (
            "Palm Grove Villas",
            4,
            "available",
            4,
            "4BR-V",
            "Nakheel",
            2_100_000.0,
            320.0,
            "villa",
            "Dubai",
            "UAE",
            "2022-09",
            "Gated villa community on the Palm with beach access.",
        ),
        (
            "Centro Lofts",
            0,
            "off plan",
            1,
            "studio",
            "Sobha",
            290_000.0,
            45.0,
            "apartment",
            "Abu Dhabi",
            "UAE",
            "2025-12",
            "Compact studios aimed at first-time investors.",
        ),
    ];

    let mut inserted = 0;
    for (
        name,
        bedrooms,
        status,
        baths,
        unit,
        developer,
        price,
        area,
        property_type,
        city,
        country,
        date,
        description,
    ) in demo_projects
    {
        conn.execute(
            r#"
            INSERT INTO projects (
                project_name, no_of_bedrooms, completion_status, bathrooms,
                unit_type, developer_name, price_usd, area_sq_mtrs,
                property_type, city, country, completion_date,
                project_description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                name,
                bedrooms,
                status,
                baths,
                unit,
                developer,
                price,
                area,
                property_type,
                city,
                country,
                date,
                description,
            ],
        )
        .with_context(|| format!("Failed to seed project '{}'", name))?;
        inserted += 1;
    }

    Ok(inserted)
}
