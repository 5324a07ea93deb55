use crate::error::AppError;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Converts Diesel errors into domain-level `AppError` variants.
///
/// Constraint names follow the migrations: `<table>_<column>_key` for unique
/// constraints and `<table>_<column>_check` for checks.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let constraint = info.constraint_name();

        match kind {
            DatabaseErrorKind::UniqueViolation => {
                let (entity, field) = constraint
                    .and_then(parse_constraint_name)
                    .unwrap_or_else(|| ("resource".to_string(), "value".to_string()));
                let value = info
                    .details()
                    .and_then(extract_key_value)
                    .or_else(|| extract_key_value(message))
                    .map(|(_, v)| v)
                    .unwrap_or_default();
                AppError::Conflict {
                    entity: singular(&entity),
                    field,
                    value,
                }
            }
            DatabaseErrorKind::CheckViolation => match constraint {
                Some("products_stock_check") => AppError::InsufficientStock {
                    product: "product".to_string(),
                    requested: 0,
                    available: None,
                },
                Some(name) => {
                    let field = parse_constraint_name(name)
                        .map(|(_, field)| field)
                        .unwrap_or_else(|| name.to_string());
                    AppError::Validation {
                        field,
                        reason: "Value violates a check constraint".to_string(),
                    }
                }
                None => AppError::Database {
                    operation: operation.to_string(),
                    source: anyhow::anyhow!("Check constraint violation: {}", message),
                },
            },
            DatabaseErrorKind::NotNullViolation => AppError::Validation {
                field: info
                    .column_name()
                    .map(str::to_string)
                    .or_else(|| extract_column(message))
                    .unwrap_or_else(|| "unknown".to_string()),
                reason: "Field is required".to_string(),
            },
            DatabaseErrorKind::ForeignKeyViolation => {
                let field = constraint
                    .and_then(|c| c.strip_suffix("_fkey"))
                    .and_then(|c| c.split_once('_').map(|(_, col)| col.to_string()))
                    .unwrap_or_else(|| "reference".to_string());
                AppError::Validation {
                    field,
                    reason: "Referenced record does not exist".to_string(),
                }
            }
            _ if is_out_of_range(message) => AppError::Validation {
                field: info
                    .column_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "value".to_string()),
                reason: "Value is out of range".to_string(),
            },
            _ => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::anyhow!("Database error: {}", message),
            },
        }
    }
}

/// SQLSTATE 22003 has no `DatabaseErrorKind`; PostgreSQL reports it as
/// `numeric field overflow` or `<type> out of range`.
fn is_out_of_range(message: &str) -> bool {
    message.starts_with("numeric field overflow") || message.contains("out of range")
}

/// `users_email_key` -> ("users", "email"); `products_stock_check` -> ("products", "stock").
fn parse_constraint_name(name: &str) -> Option<(String, String)> {
    let base = name
        .strip_suffix("_key")
        .or_else(|| name.strip_suffix("_check"))
        .or_else(|| name.strip_suffix("_idx"))?;
    let (table, column) = TABLES
        .iter()
        .find_map(|t| {
            base.strip_prefix(t)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|col| (*t, col))
        })
        .or_else(|| base.split_once('_'))?;
    Some((table.to_string(), column.to_string()))
}

const TABLES: &[&str] = &[
    "user_addresses",
    "product_reviews",
    "order_items",
    "products",
    "orders",
    "users",
];

/// Pulls `(column, value)` out of `Key (email)=(a@b.c) already exists.`
fn extract_key_value(text: &str) -> Option<(String, String)> {
    let start = text.find("Key (")? + "Key (".len();
    let rest = &text[start..];
    let (column, rest) = rest.split_once(")=(")?;
    let end = rest.find(')')?;
    Some((column.to_string(), rest[..end].to_string()))
}

fn extract_column(message: &str) -> Option<String> {
    let start = message.find("column \"")? + "column \"".len();
    let end = message[start..].find('"')?;
    Some(message[start..start + end].to_string())
}

fn singular(table: &str) -> String {
    if table.ends_with("sses") {
        return table[..table.len() - 2].to_string();
    }
    table.strip_suffix('s').unwrap_or(table).to_string()
}
