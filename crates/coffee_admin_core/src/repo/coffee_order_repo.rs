//! SQLite-backed coffee order store.
//!
//! # Responsibility
//! - Provide CRUD over the `coffee_orders` table.
//! - Answer uniqueness lookups for `reference`.
//!
//! # Invariants
//! - Construction fails on connections that were not migrated.
//! - Rows with unknown enum values or malformed ids fail to load.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::coffee_order::{Beverage, CoffeeOrder, CoffeeOrderId, CupSize, Milk};
use crate::model::Model;
use crate::repo::{ListQuery, ModelStore, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const TABLE: &str = "coffee_orders";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "reference",
    "customer_name",
    "beverage",
    "size",
    "quantity",
    "extra_shots",
    "milk",
    "notes",
    "created_at",
    "updated_at",
];

const ORDER_SELECT_SQL: &str = "SELECT
    id,
    reference,
    customer_name,
    beverage,
    size,
    quantity,
    extra_shots,
    milk,
    notes
FROM coffee_orders";

/// SQLite coffee order repository borrowing one migrated connection.
pub struct SqliteCoffeeOrderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCoffeeOrderRepository<'conn> {
    /// Wraps `conn` after checking its schema is current.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   was tampered with.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        ensure_schema(conn)?;
        Ok(Self { conn })
    }

    /// Number of stored orders.
    pub fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM coffee_orders;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

impl ModelStore<CoffeeOrder> for SqliteCoffeeOrderRepository<'_> {
    fn insert(&self, order: &CoffeeOrder) -> RepoResult<CoffeeOrderId> {
        self.conn.execute(
            "INSERT INTO coffee_orders (
                id,
                reference,
                customer_name,
                beverage,
                size,
                quantity,
                extra_shots,
                milk,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                order.id.to_string(),
                order.reference.as_str(),
                order.customer_name.as_str(),
                order.beverage.as_str(),
                order.size.as_str(),
                order.quantity,
                order.extra_shots,
                order.milk.map(Milk::as_str),
                order.notes.as_str(),
            ],
        )?;

        Ok(order.id)
    }

    fn update(&self, order: &CoffeeOrder) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE coffee_orders
             SET
                reference = ?1,
                customer_name = ?2,
                beverage = ?3,
                size = ?4,
                quantity = ?5,
                extra_shots = ?6,
                milk = ?7,
                notes = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?9;",
            params![
                order.reference.as_str(),
                order.customer_name.as_str(),
                order.beverage.as_str(),
                order.size.as_str(),
                order.quantity,
                order.extra_shots,
                order.milk.map(Milk::as_str),
                order.notes.as_str(),
                order.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(not_found(order.id));
        }

        Ok(())
    }

    fn get(&self, id: CoffeeOrderId) -> RepoResult<Option<CoffeeOrder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORDER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_order_row(row)?));
        }

        Ok(None)
    }

    fn list(&self, query: &ListQuery) -> RepoResult<Vec<CoffeeOrder>> {
        let mut sql = format!("{ORDER_SELECT_SQL} ORDER BY updated_at DESC, id ASC");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut orders = Vec::new();

        while let Some(row) = rows.next()? {
            orders.push(parse_order_row(row)?);
        }

        Ok(orders)
    }

    fn delete(&self, id: CoffeeOrderId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM coffee_orders WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    fn exists_with(
        &self,
        field: &str,
        value: &str,
        exclude: Option<CoffeeOrderId>,
    ) -> RepoResult<bool> {
        // Column names cannot be bound; only indexed columns are accepted.
        let column = match field {
            "reference" => "reference",
            other => return Err(RepoError::UnknownField(other.to_string())),
        };

        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(
                    SELECT 1 FROM coffee_orders
                    WHERE {column} = ?1
                      AND (?2 IS NULL OR id <> ?2)
                );"
            ),
            params![value, exclude.map(|id| id.to_string())],
            |row| row.get(0),
        )?;

        Ok(exists == 1)
    }
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [TABLE],
        |row| row.get(0),
    )?;
    if table_exists != 1 {
        return Err(RepoError::MissingRequiredTable(TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_order_row(row: &Row<'_>) -> RepoResult<CoffeeOrder> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in coffee_orders.id"))
    })?;

    let beverage_text: String = row.get("beverage")?;
    let beverage = Beverage::parse(&beverage_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid beverage `{beverage_text}` in coffee_orders.beverage"
        ))
    })?;

    let size_text: String = row.get("size")?;
    let size = CupSize::parse(&size_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid size `{size_text}` in coffee_orders.size"))
    })?;

    let milk = match row.get::<_, Option<String>>("milk")? {
        Some(value) => Some(Milk::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid milk `{value}` in coffee_orders.milk"))
        })?),
        None => None,
    };

    Ok(CoffeeOrder {
        id,
        reference: row.get("reference")?,
        customer_name: row.get("customer_name")?,
        beverage,
        size,
        quantity: row.get("quantity")?,
        extra_shots: row.get("extra_shots")?,
        milk,
        notes: row.get("notes")?,
    })
}

fn not_found(id: CoffeeOrderId) -> RepoError {
    RepoError::NotFound {
        model: CoffeeOrder::MODEL_NAME,
        id: id.to_string(),
    }
}
