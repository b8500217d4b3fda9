//! Parameter types for SalesDB MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadQueryParams {
    #[schemars(
        description = "SELECT or WITH query to read data from the database. Allowed tables: leads, bookings, projects. The history table is NOT accessible."
    )]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteQueryParams {
    #[schemars(
        description = "INSERT or UPDATE query for the bookings or leads tables. Use literal values directly in the query, NOT parameterized placeholders (?). Single quotes for strings, no quotes for numbers. No other tables are writable."
    )]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSearchParams {
    #[schemars(description = "Name of the property project to search for")]
    pub project_name: String,

    #[schemars(description = "Location of the project: city, country or area name")]
    pub location: String,

    #[schemars(description = "Brief developer or location details to refine search results")]
    #[serde(default)]
    pub project_description: String,

    #[schemars(description = "What to look for on the web about the project, kept short")]
    #[serde(default)]
    pub project_metadata: String,
}
