//! Row-fetch collaborator client
//!
//! Read-only access to the external paginated table-read service, used to
//! populate tenant options for the organisation selector.

pub mod rows;

pub use rows::{
    organisation_options_from_rows, OrganisationOption, RowFetchClient, RowFetchError, RowPage,
    RowQuery,
};
