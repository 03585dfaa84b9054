use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create database directory {:?}", dir))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            id          INTEGER PRIMARY KEY,
            url         TEXT UNIQUE NOT NULL,
            company     TEXT NOT NULL,
            category    TEXT NOT NULL DEFAULT '',
            html        TEXT NOT NULL,
            imported_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per source URL; re-processing replaces it
        CREATE TABLE IF NOT EXISTS contacts (
            url          TEXT PRIMARY KEY REFERENCES documents(url),
            company      TEXT NOT NULL,
            category     TEXT NOT NULL,
            address      TEXT NOT NULL,
            telefon      TEXT NOT NULL,
            mobil        TEXT NOT NULL,
            email        TEXT NOT NULL,
            web          TEXT NOT NULL,
            facebook     TEXT NOT NULL,
            instagram    TEXT NOT NULL,
            processed_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

// ── Documents ──

/// A successfully retrieved page plus the listing metadata it came with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub company: String,
    pub url: String,
    pub category: String,
    pub html: String,
}

/// Already-known URLs are ignored. Returns the number of new documents.
pub fn insert_documents(conn: &Connection, docs: &[Document]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO documents (url, company, category, html) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for d in docs {
            count += stmt.execute(rusqlite::params![d.url, d.company, d.category, d.html])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn fetch_unprocessed(conn: &Connection, limit: Option<usize>) -> Result<Vec<Document>> {
    let sql = format!(
        "SELECT d.company, d.url, d.category, d.html
         FROM documents d
         LEFT JOIN contacts c ON c.url = d.url
         WHERE c.url IS NULL
         ORDER BY d.id{}",
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Document {
                company: row.get(0)?,
                url: row.get(1)?,
                category: row.get(2)?,
                html: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Contacts ──

/// Fixed-schema output record. Field order is the export column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRow {
    pub company: String,
    pub category: String,
    pub url: String,
    pub address: String,
    pub telefon: String,
    pub mobil: String,
    pub email: String,
    pub web: String,
    pub facebook: String,
    pub instagram: String,
}

pub fn save_contacts(conn: &Connection, rows: &[ContactRow]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO contacts
             (url, company, category, address, telefon, mobil, email, web, facebook, instagram)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for r in rows {
            stmt.execute(rusqlite::params![
                r.url, r.company, r.category, r.address, r.telefon, r.mobil,
                r.email, r.web, r.facebook, r.instagram,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// All extracted rows in import order.
pub fn fetch_contacts(conn: &Connection) -> Result<Vec<ContactRow>> {
    let mut stmt = conn.prepare(
        "SELECT c.company, c.category, c.url, c.address, c.telefon, c.mobil,
                c.email, c.web, c.facebook, c.instagram
         FROM contacts c
         JOIN documents d ON d.url = c.url
         ORDER BY d.id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ContactRow {
                company: row.get(0)?,
                category: row.get(1)?,
                url: row.get(2)?,
                address: row.get(3)?,
                telefon: row.get(4)?,
                mobil: row.get(5)?,
                email: row.get(6)?,
                web: row.get(7)?,
                facebook: row.get(8)?,
                instagram: row.get(9)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub const FIELD_COLUMNS: &[&str] = &[
    "address", "telefon", "mobil", "email", "web", "facebook", "instagram",
];

pub struct Stats {
    pub documents: usize,
    pub processed: usize,
    pub pending: usize,
    /// (column, rows with a non-empty value)
    pub filled: Vec<(&'static str, usize)>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let documents: usize = conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
    let processed: usize = conn.query_row("SELECT COUNT(*) FROM contacts", [], |r| r.get(0))?;
    let mut filled = Vec::with_capacity(FIELD_COLUMNS.len());
    for col in FIELD_COLUMNS {
        let n: usize = conn.query_row(
            &format!("SELECT COUNT(*) FROM contacts WHERE {} <> ''", col),
            [],
            |r| r.get(0),
        )?;
        filled.push((*col, n));
    }
    Ok(Stats {
        documents,
        processed,
        pending: documents.saturating_sub(processed),
        filled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn doc(url: &str) -> Document {
        Document {
            company: "Acme".into(),
            url: url.into(),
            category: "Cat".into(),
            html: "<p></p>".into(),
        }
    }

    #[test]
    fn insert_ignores_known_urls() {
        let conn = memory_db();
        assert_eq!(insert_documents(&conn, &[doc("https://a.az"), doc("https://b.az")]).unwrap(), 2);
        assert_eq!(insert_documents(&conn, &[doc("https://a.az")]).unwrap(), 0);
        assert_eq!(fetch_unprocessed(&conn, None).unwrap().len(), 2);
        assert_eq!(fetch_unprocessed(&conn, Some(1)).unwrap()[0].url, "https://a.az");
    }

    #[test]
    fn saved_contacts_are_no_longer_pending() {
        let conn = memory_db();
        insert_documents(&conn, &[doc("https://a.az"), doc("https://b.az")]).unwrap();
        let row = ContactRow {
            company: "Acme".into(),
            url: "https://b.az".into(),
            telefon: "012".into(),
            ..ContactRow::default()
        };
        save_contacts(&conn, &[row.clone()]).unwrap();
        save_contacts(&conn, &[row.clone()]).unwrap();

        let pending = fetch_unprocessed(&conn, None).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].url, "https://a.az");
        assert_eq!(fetch_contacts(&conn).unwrap(), vec![row]);

        let s = get_stats(&conn).unwrap();
        assert_eq!((s.documents, s.processed, s.pending), (2, 1, 1));
        assert!(s.filled.contains(&("telefon", 1)));
        assert!(s.filled.contains(&("web", 0)));
    }
}
