//! SQLite-backed storage.
//!
//! Each collection is a table whose columns are the record's serialized
//! fields. Rows are returned in rowid order, which is insertion order.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, ErrorCode, params_from_iter};
use serde_json::{Map, Number, Value};

use super::traits::{Filter, Record, Storage, check_fields};
use crate::error::{InventoryError, Result};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS "category" (
        "id" varchar PRIMARY KEY NOT NULL,
        "name" varchar NOT NULL,
        "description" varchar NOT NULL
    );

    CREATE TABLE IF NOT EXISTS "product" (
        "id" varchar PRIMARY KEY NOT NULL,
        "name" varchar NOT NULL,
        "description" varchar NOT NULL,
        "price" text NOT NULL,
        "quantity" integer NOT NULL,
        "categoryId" varchar NOT NULL,
        CONSTRAINT "FK_Product_Category" FOREIGN KEY ("categoryId") REFERENCES "category"("id")
    );

    CREATE INDEX IF NOT EXISTS "idx_product_category" ON "product"("categoryId");
"#;

/// SQLite storage. The connection is behind a `Mutex` because
/// `rusqlite::Connection` is not `Sync`.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage").finish_non_exhaustive()
    }
}

impl SqliteStorage {
    /// Open or create a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        log::debug!("SQLite storage at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<R>(&self, f: impl FnOnce(&Connection) -> Result<R>) -> Result<R> {
        let conn = self.conn.lock().map_err(|e| InventoryError::Storage(e.to_string()))?;
        f(&conn)
    }

    fn select<T: Record>(&self, filter: Option<(&str, SqlValue)>) -> Result<Vec<T>> {
        let columns = column_list(T::FIELDS);
        let (sql, params) = match filter {
            Some((field, value)) => (
                format!(
                    "SELECT {} FROM {} WHERE {} = ?1 ORDER BY rowid",
                    columns,
                    quote(T::collection()),
                    quote(field)
                ),
                vec![value],
            ),
            None => (
                format!("SELECT {} FROM {} ORDER BY rowid", columns, quote(T::collection())),
                Vec::new(),
            ),
        };

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(params))?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                let mut obj = Map::new();
                for (i, field) in T::FIELDS.iter().enumerate() {
                    obj.insert((*field).to_string(), to_json(row.get_ref(i)?)?);
                }
                records.push(serde_json::from_value(Value::Object(obj))?);
            }
            Ok(records)
        })
    }
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_list(fields: &[&str]) -> String {
    fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(", ")
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn to_json(value: ValueRef<'_>) -> Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::from(i)),
        ValueRef::Real(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| InventoryError::Storage(format!("non-finite number in row: {}", f))),
        ValueRef::Text(t) => Ok(Value::String(String::from_utf8_lossy(t).into_owned())),
        ValueRef::Blob(_) => Err(InventoryError::Storage("unexpected blob column".to_string())),
    }
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

impl Storage for SqliteStorage {
    fn find_by_id<T: Record>(&self, id: &str) -> Result<Option<T>> {
        Ok(self
            .select::<T>(Some(("id", SqlValue::Text(id.to_string()))))?
            .into_iter()
            .next())
    }

    fn find_all<T: Record>(&self) -> Result<Vec<T>> {
        self.select::<T>(None)
    }

    fn find_where<T: Record>(&self, filter: &Filter) -> Result<Vec<T>> {
        filter.check::<T>()?;
        self.select::<T>(Some((filter.field.as_str(), to_sql(&filter.value))))
    }

    fn insert<T: Record>(&self, record: &T) -> Result<()> {
        let value = serde_json::to_value(record)?;
        let row: Vec<SqlValue> = T::FIELDS
            .iter()
            .map(|f| to_sql(value.get(*f).unwrap_or(&Value::Null)))
            .collect();
        let placeholders = (1..=row.len()).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(T::collection()),
            column_list(T::FIELDS),
            placeholders
        );

        self.with_conn(|conn| match conn.execute(&sql, params_from_iter(row)) {
            Ok(_) => Ok(()),
            Err(e) if is_primary_key_violation(&e) => Err(InventoryError::duplicate(T::ENTITY, record.id())),
            Err(e) => Err(e.into()),
        })
    }

    fn update_fields<T: Record>(&self, id: &str, fields: &Map<String, Value>) -> Result<bool> {
        check_fields::<T>(fields.keys().map(String::as_str))?;
        if fields.contains_key("id") {
            return Err(InventoryError::Storage(format!("{} id is immutable", T::ENTITY)));
        }
        if fields.is_empty() {
            return Ok(self.find_by_id::<T>(id)?.is_some());
        }

        let assignments = fields
            .keys()
            .enumerate()
            .map(|(i, k)| format!("{} = ?{}", quote(k), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE \"id\" = ?{}",
            quote(T::collection()),
            assignments,
            fields.len() + 1
        );
        let mut params: Vec<SqlValue> = fields.values().map(to_sql).collect();
        params.push(SqlValue::Text(id.to_string()));

        self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(params))? > 0))
    }

    fn delete_by_id<T: Record>(&self, id: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE \"id\" = ?1", quote(T::collection()));
        self.with_conn(|conn| Ok(conn.execute(&sql, [id])? > 0))
    }
}
