use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::db::ContactRow;

/// Column order of the exported table.
pub const COLUMNS: &[&str] = &[
    "company", "category", "url", "address", "telefon", "mobil", "email", "web", "facebook",
    "instagram",
];

/// First row per URL wins.
pub fn dedup_by_url(rows: Vec<ContactRow>) -> Vec<ContactRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect()
}

pub fn write_csv<W: Write>(out: W, rows: &[ContactRow]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(COLUMNS)?;
    for r in rows {
        wtr.write_record([
            r.company.trim(),
            r.category.as_str(),
            r.url.as_str(),
            r.address.as_str(),
            r.telefon.as_str(),
            r.mobil.as_str(),
            r.email.as_str(),
            r.web.as_str(),
            r.facebook.as_str(),
            r.instagram.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

pub fn write_csv_file(path: &Path, rows: Vec<ContactRow>) -> Result<usize> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let rows = dedup_by_url(rows);
    write_csv(file, &rows).with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str, url: &str) -> ContactRow {
        ContactRow {
            company: company.into(),
            category: "Kosmetika".into(),
            url: url.into(),
            telefon: "+994 12 000 00 00; +994 50 000 00 00".into(),
            ..ContactRow::default()
        }
    }

    #[test]
    fn dedup_keeps_first_url() {
        let rows = dedup_by_url(vec![row("A", "u1"), row("B", "u2"), row("C", "u1")]);
        let names: Vec<&str> = rows.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn header_and_column_order() {
        let mut buf = Vec::new();
        let mut r = row("  Soel Parfum ", "https://marsol.az/soel/");
        r.instagram = "soel.parfum".into();
        r.email = "info@soel.az".into();
        write_csv(&mut buf, &[r]).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("company,category,url,address,telefon,mobil,email,web,facebook,instagram")
        );
        assert_eq!(
            lines.next(),
            Some("Soel Parfum,Kosmetika,https://marsol.az/soel/,,+994 12 000 00 00; +994 50 000 00 00,,info@soel.az,,,soel.parfum")
        );
        assert_eq!(lines.next(), None);
    }
}
