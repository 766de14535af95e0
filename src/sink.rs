/// Order sinks
///
/// A sink accepts a finished order sequence and writes it out unchanged.
/// Three implementations: space-delimited text, a JSON array, and SQLite rows.

use rusqlite::{params, Connection};
use std::io::{BufRead, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::order::{Order, ParseOrderError};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("insert of row {row} failed: {source}")]
    Insert {
        row: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid table name: {0}")]
    InvalidTable(String),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseOrderError,
    },
}

pub type SinkResult<T> = Result<T, SinkError>;

/// Anything that can take an order sequence
pub trait OrderSink {
    fn write(&mut self, orders: &[Order]) -> SinkResult<()>;
}

/// One `TYPE SIDE PRICE SHARES` line per order
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        TextSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OrderSink for TextSink<W> {
    fn write(&mut self, orders: &[Order]) -> SinkResult<()> {
        for order in orders {
            writeln!(self.writer, "{}", order)?;
        }
        self.writer.flush()?;
        info!(orders = orders.len(), "text output written");
        Ok(())
    }
}

/// Top-level JSON array of order objects
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        JsonSink { writer, pretty: false }
    }

    pub fn pretty(writer: W) -> Self {
        JsonSink { writer, pretty: true }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OrderSink for JsonSink<W> {
    fn write(&mut self, orders: &[Order]) -> SinkResult<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, orders)?;
        } else {
            serde_json::to_writer(&mut self.writer, orders)?;
        }
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        info!(orders = orders.len(), "json output written");
        Ok(())
    }
}

/// Rows in an SQLite table.
///
/// The table gets an autoincrement `orderId` and a server-side `timestamp`.
/// All rows of one `write` go into a single transaction and are committed
/// together. If an insert fails the transaction stays open; call
/// [`SqliteSink::rollback`] to discard the partial run.
pub struct SqliteSink {
    conn: Connection,
    table: String,
}

impl SqliteSink {
    pub const DEFAULT_TABLE: &'static str = "orders";

    pub fn open(path: impl AsRef<Path>, table: &str) -> SinkResult<Self> {
        Self::with_connection(Connection::open(path)?, table)
    }

    pub fn open_in_memory(table: &str) -> SinkResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, table)
    }

    pub fn with_connection(conn: Connection, table: &str) -> SinkResult<Self> {
        let valid = !table.is_empty()
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !table.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(SinkError::InvalidTable(table.to_string()));
        }

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                orderId INTEGER PRIMARY KEY AUTOINCREMENT,
                price NUMERIC,
                shares INTEGER,
                side VARCHAR(3),
                type VARCHAR(3),
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            );"
        ))?;

        Ok(SqliteSink {
            conn,
            table: table.to_string(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Discard rows inserted since the last commit
    pub fn rollback(&mut self) -> SinkResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

impl OrderSink for SqliteSink {
    fn write(&mut self, orders: &[Order]) -> SinkResult<()> {
        self.conn.execute_batch("BEGIN")?;

        let sql = format!(
            "INSERT INTO {} (price, shares, side, type) VALUES (?1, ?2, ?3, ?4)",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        for (row, order) in orders.iter().enumerate() {
            stmt.execute(params![
                order.price.to_f64(),
                order.shares,
                order.side.as_str(),
                order.order_type.as_str(),
            ])
            .map_err(|source| SinkError::Insert { row, source })?;
        }
        drop(stmt);

        self.conn.execute_batch("COMMIT")?;
        info!(orders = orders.len(), table = %self.table, "rows committed");
        Ok(())
    }
}

/// Parse a text order stream; blank lines are skipped
pub fn read_text<R: BufRead>(reader: R) -> SinkResult<Vec<Order>> {
    let mut orders = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let order = line.parse::<Order>().map_err(|source| SinkError::Parse {
            line: index + 1,
            source,
        })?;
        orders.push(order);
    }
    Ok(orders)
}

/// Parse a JSON order array
pub fn read_json<R: Read>(reader: R) -> SinkResult<Vec<Order>> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderType, Price, Side};

    fn sample_orders() -> Vec<Order> {
        vec![
            Order::new(OrderType::GTC, Side::Bid, Price(3547), 120),
            Order::new(OrderType::M, Side::Ask, Price(4001), 1),
            Order::new(OrderType::GFD, Side::Bid, Price(3000), 1000),
        ]
    }

    #[test]
    fn test_text_lines() {
        let mut sink = TextSink::new(Vec::new());
        sink.write(&sample_orders()).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "GTC Bid 35.47 120\nM Ask 40.01 1\nGFD Bid 30.00 1000\n");
    }

    #[test]
    fn test_text_read_back() {
        let orders = sample_orders();
        let mut sink = TextSink::new(Vec::new());
        sink.write(&orders).unwrap();
        let bytes = sink.into_inner();
        assert_eq!(read_text(bytes.as_slice()).unwrap(), orders);
    }

    #[test]
    fn test_text_read_reports_line() {
        let input = "GTC Bid 35.47 120\n\nFOO Ask 40.01 1\n";
        match read_text(input.as_bytes()) {
            Err(SinkError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_json_read_rejects_what_text_rejects() {
        let json = r#"[{"type":"GTC","side":"Bid","price":35.0,"shares":0}]"#;
        assert!(matches!(read_json(json.as_bytes()), Err(SinkError::Json(_))));
        assert!(matches!(
            read_text("GTC Bid 35.00 0\n".as_bytes()),
            Err(SinkError::Parse { line: 1, .. })
        ));

        let json = r#"[{"type":"GTC","side":"Bid","price":35.0,"shares":1001}]"#;
        assert!(read_json(json.as_bytes()).is_err());
    }

    #[test]
    fn test_json_array() {
        let mut sink = JsonSink::new(Vec::new());
        sink.write(&sample_orders()[..1]).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "[{\"type\":\"GTC\",\"side\":\"Bid\",\"price\":35.47,\"shares\":120}]\n");
    }

    #[test]
    fn test_json_empty() {
        let mut sink = JsonSink::new(Vec::new());
        sink.write(&[]).unwrap();
        assert_eq!(sink.into_inner(), b"[]\n");
    }

    #[test]
    fn test_sqlite_rows() {
        let mut sink = SqliteSink::open_in_memory("orders").unwrap();
        sink.write(&sample_orders()).unwrap();

        let conn = sink.connection();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);

        let (id, price, shares, side, kind): (i64, f64, u32, String, String) = conn
            .query_row(
                "SELECT orderId, price, shares, side, type FROM orders ORDER BY orderId LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .unwrap();
        assert_eq!(id, 1);
        assert!((price - 35.47).abs() < 1e-9);
        assert_eq!(shares, 120);
        assert_eq!(side, "Bid");
        assert_eq!(kind, "GTC");

        let stamped: i64 = conn
            .query_row("SELECT COUNT(*) FROM orders WHERE timestamp IS NOT NULL", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stamped, 3);
    }

    #[test]
    fn test_sqlite_insert_failure_left_to_caller() {
        let mut sink = SqliteSink::open_in_memory("orders").unwrap();
        sink.connection()
            .execute_batch(
                "CREATE TRIGGER reject_fok BEFORE INSERT ON orders
                 WHEN NEW.type = 'FOK' BEGIN SELECT RAISE(ABORT, 'no FOK'); END;",
            )
            .unwrap();

        let orders = vec![
            Order::new(OrderType::GTC, Side::Bid, Price(3100), 5),
            Order::new(OrderType::FOK, Side::Bid, Price(3200), 5),
        ];
        match sink.write(&orders) {
            Err(SinkError::Insert { row, .. }) => assert_eq!(row, 1),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!sink.connection().is_autocommit());

        sink.rollback().unwrap();
        let count: i64 = sink
            .connection()
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_sqlite_rejects_bad_table_name() {
        assert!(matches!(
            SqliteSink::open_in_memory("orders; DROP TABLE x"),
            Err(SinkError::InvalidTable(_))
        ));
    }
}
