//! Tests for the guard + executor pipeline against a real database

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::config::PolicyConfig;
use crate::executor::QueryExecutor;
use crate::guard::SqlGuard;
use crate::handlers;
use crate::params::ReadQueryParams;
use crate::schema;
use crate::types::{ReadReply, WriteReply};

/// Guard + executor over an in-memory database with the real schema
fn test_pipeline() -> (SqlGuard, QueryExecutor) {
    let conn = Connection::open_in_memory().unwrap();
    schema::ensure_tables(&conn).unwrap();
    let seeded = schema::seed_demo_projects(&conn).unwrap();
    assert!(seeded > 0);

    let guard = SqlGuard::new(&PolicyConfig::default()).unwrap();
    let executor = QueryExecutor::new(Arc::new(Mutex::new(conn)));
    (guard, executor)
}

async fn read(guard: &SqlGuard, executor: &QueryExecutor, query: &str) -> ReadReply {
    match guard.validate_read(query) {
        Ok(validated) => executor.execute_read(query, &validated).await,
        Err(denied) => ReadReply::error(denied.to_string()),
    }
}

async fn write(guard: &SqlGuard, executor: &QueryExecutor, query: &str) -> WriteReply {
    match guard.validate_write(query) {
        Ok(validated) => executor.execute_write(query, &validated).await,
        Err(denied) => WriteReply::error(denied.to_string()),
    }
}

#[tokio::test]
async fn test_select_projects_with_limit() {
    let (guard, executor) = test_pipeline();

    let reply = read(&guard, &executor, "SELECT * FROM projects LIMIT 5").await;

    assert!(matches!(reply, ReadReply::Success { .. }));
    assert!(reply
        .message()
        .starts_with("Success: Retrieved"));
    assert!(reply.message().contains("from tables: projects"));
    assert!(!reply.rows().is_empty());
    assert!(reply.rows().len() <= 5);
    assert!(reply.rows()[0].contains_key("project_name"));
}

#[tokio::test]
async fn test_zero_rows_is_success() {
    let (guard, executor) = test_pipeline();

    let reply = read(
        &guard,
        &executor,
        "SELECT * FROM leads WHERE email = 'nobody@example.com'",
    )
    .await;

    assert!(matches!(reply, ReadReply::Success { .. }));
    assert!(reply.message().contains("Retrieved 0 row(s)"));
    assert!(reply.rows().is_empty());
}

#[tokio::test]
async fn test_insert_then_read_round_trip() {
    let (guard, executor) = test_pipeline();

    let reply = write(
        &guard,
        &executor,
        "INSERT INTO leads (first_name, last_name, email, preferred_city, preferred_budget_usd) \
         VALUES ('John', 'Doe', 'a@b.com', 'Dubai', 500000)",
    )
    .await;

    assert!(matches!(reply, WriteReply::Success { .. }));
    assert!(reply.message().contains("New leads record created with ID"));
    assert!(reply.result() > 0);

    let reply = read(
        &guard,
        &executor,
        "SELECT first_name, preferred_budget_usd FROM leads WHERE email = 'a@b.com'",
    )
    .await;

    assert_eq!(reply.rows().len(), 1);
    assert_eq!(reply.rows()[0]["first_name"], "John");
    assert_eq!(reply.rows()[0]["preferred_budget_usd"], 500000);
}

#[tokio::test]
async fn test_update_round_trip() {
    let (guard, executor) = test_pipeline();

    write(
        &guard,
        &executor,
        "INSERT INTO leads (first_name, email, preferred_budget_usd) \
         VALUES ('Amira', 'a@b.com', 500000)",
    )
    .await;

    let reply = write(
        &guard,
        &executor,
        "UPDATE leads SET preferred_budget_usd = 600000 WHERE email = 'a@b.com'",
    )
    .await;

    assert!(matches!(reply, WriteReply::Success { .. }));
    assert_eq!(reply.result(), 1);
    assert!(reply.message().contains("Updated 1 leads record(s)"));

    let reply = read(
        &guard,
        &executor,
        "SELECT preferred_budget_usd FROM leads WHERE email = 'a@b.com'",
    )
    .await;
    assert_eq!(reply.rows()[0]["preferred_budget_usd"], 600000);
}

#[tokio::test]
async fn test_update_without_match_is_warning() {
    let (guard, executor) = test_pipeline();

    let reply = write(
        &guard,
        &executor,
        "UPDATE leads SET preferred_budget_usd = 1 WHERE email = 'missing@example.com'",
    )
    .await;

    assert!(matches!(reply, WriteReply::Warning { .. }));
    assert!(reply.message().starts_with("Warning:"));
    assert!(reply.message().contains("no rows were affected"));
    assert_eq!(reply.result(), 0);
}

#[tokio::test]
async fn test_booking_insert_joins_back_to_lead() {
    let (guard, executor) = test_pipeline();

    write(
        &guard,
        &executor,
        "INSERT INTO leads (first_name, email) VALUES ('Lena', 'lena@example.com')",
    )
    .await;
    let reply = write(
        &guard,
        &executor,
        "INSERT INTO bookings (lead_id, project_id, booking_date, booking_status) \
         VALUES (1, 1, '2025-12-05 10:30:00', 'confirmed')",
    )
    .await;
    assert!(reply.result() > 0);

    let reply = read(
        &guard,
        &executor,
        "SELECT b.booking_status, l.email FROM bookings b JOIN leads l ON b.lead_id = l.id",
    )
    .await;
    assert_eq!(reply.rows().len(), 1);
    assert_eq!(reply.rows()[0]["booking_status"], "confirmed");
    assert_eq!(reply.rows()[0]["email"], "lena@example.com");
}

#[tokio::test]
async fn test_execution_fault_is_shaped_not_raised() {
    let (guard, executor) = test_pipeline();

    // Passes validation (lexically fine), fails at the database
    let reply = read(
        &guard,
        &executor,
        "SELECT nonexistent_column FROM projects",
    )
    .await;

    assert!(matches!(reply, ReadReply::Error { .. }));
    assert!(reply
        .message()
        .contains("Unexpected error during query execution"));
    assert!(reply.rows().is_empty());
}

#[tokio::test]
async fn test_denied_queries_become_error_replies() {
    let (guard, executor) = test_pipeline();

    let reply = read(&guard, &executor, "DELETE FROM bookings WHERE id = 1").await;
    assert!(reply.message().starts_with("Error:"));
    assert!(reply.message().contains("Forbidden operation 'DELETE'"));
    assert!(reply.rows().is_empty());

    let reply = write(&guard, &executor, "DELETE FROM bookings WHERE id = 1").await;
    assert!(reply.message().starts_with("Error:"));
    assert!(reply.message().contains("Forbidden operation 'DELETE'"));
    assert_eq!(reply.result(), 0);

    let reply = write(
        &guard,
        &executor,
        "INSERT INTO projects (project_name) VALUES ('X')",
    )
    .await;
    assert!(reply.message().contains("projects"));
    assert!(reply.message().contains("forbidden"));
    assert_eq!(reply.result(), 0);

    let reply = read(&guard, &executor, "   ").await;
    assert_eq!(reply.message(), "Error: Empty query provided");
    let reply = write(&guard, &executor, "   ").await;
    assert_eq!(reply.message(), "Error: Empty query provided");
}

#[tokio::test]
async fn test_read_handler_returns_tool_result() {
    let (guard, executor) = test_pipeline();

    let result = handlers::run_secure_read_query(
        &guard,
        &executor,
        ReadQueryParams {
            query: "SELECT DISTINCT city FROM projects".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(!result.is_error.unwrap_or(false));
    assert_eq!(result.content.len(), 1);
}

#[test]
fn test_seed_is_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    schema::ensure_tables(&conn).unwrap();

    let first = schema::seed_demo_projects(&conn).unwrap();
    assert!(first > 0);
    let second = schema::seed_demo_projects(&conn).unwrap();
    assert_eq!(second, 0);
}

#[test]
fn test_server_opens_on_disk_database() {
    use crate::config::SalesDbConfig;
    use crate::server::SalesDbMcpServer;

    let dir = tempfile::tempdir().unwrap();
    let mut config = SalesDbConfig::with_database(dir.path().join("sales.db"));
    config.database.seed_demo_data = true;

    let server = SalesDbMcpServer::with_config(config);
    assert!(server.is_ok());
}
