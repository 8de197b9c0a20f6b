//! GraphQL API
//!
//! Read/write GraphQL schema over the same repositories as the REST API,
//! served at /graphql.

pub mod schema;
pub mod types;

pub use schema::{build_schema, graphql_router, AppSchema, GraphQLContext};
