//! Shared Diesel error mapping for the stream and push repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Constructors a repository supplies for each failure category.
pub(crate) struct DieselErrorConstructors<Q, C, U> {
    pub query: Q,
    pub connection: C,
    /// Builds the error for a unique constraint violation.
    pub unique_violation: U,
}

/// Map Diesel errors into repository errors.
///
/// Unique violations get their own constructor so repositories can surface
/// lost insert races; every other database failure is a query error.
pub(crate) fn map_basic_diesel_error<E, Q, C, U>(
    error: DieselError,
    constructors: DieselErrorConstructors<Q, C, U>,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
    U: FnOnce() -> E,
{
    let DieselErrorConstructors {
        query,
        connection,
        unique_violation,
    } = constructors;

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => unique_violation(),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(&'static str),
        Duplicate,
    }

    fn map(error: DieselError) -> Mapped {
        map_basic_diesel_error(
            error,
            DieselErrorConstructors {
                query: Mapped::Query,
                connection: Mapped::Connection,
                unique_violation: || Mapped::Duplicate,
            },
        )
    }

    #[rstest]
    fn not_found_maps_to_query() {
        assert_eq!(map(DieselError::NotFound), Mapped::Query("record not found"));
    }

    #[rstest]
    #[case::unique(DatabaseErrorKind::UniqueViolation, Mapped::Duplicate)]
    #[case::closed(
        DatabaseErrorKind::ClosedConnection,
        Mapped::Connection("database connection error")
    )]
    #[case::foreign_key(DatabaseErrorKind::ForeignKeyViolation, Mapped::Query("database error"))]
    fn database_errors_map_by_kind(#[case] kind: DatabaseErrorKind, #[case] expected: Mapped) {
        let error = DieselError::DatabaseError(kind, Box::new("constraint failed".to_owned()));
        assert_eq!(map(error), expected);
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        let mapped: String =
            map_basic_pool_error(PoolError::checkout("connection refused"), |message| message);
        assert_eq!(mapped, "connection refused");
    }
}
