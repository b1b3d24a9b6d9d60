//! CSV-backed menu repository.

use super::connection::CsvConnection;
use crate::domain::models::MenuItem;
use crate::error::{Error, Result};
use crate::storage::MenuStorage;
use csv::{Reader, StringRecord, Writer};
use log::{error, info, warn};
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

const TABLE: &str = "menu_items";
const HEADER: [&str; 6] = ["id", "name", "category", "price", "description", "is_available"];

#[derive(Clone)]
pub struct MenuRepository {
    connection: CsvConnection,
}

impl MenuRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Strict read of the live table. Any schema or parse failure is
    /// reported as corruption; callers decide whether to recover.
    pub fn load_strict(&self) -> Result<Vec<MenuItem>> {
        self.connection
            .ensure_table_exists(TABLE, &HEADER.join(","))?;
        read_menu_file(&self.connection.table_path(TABLE))
    }

    fn recover_from_backups(&self) -> Result<Vec<MenuItem>> {
        for backup in self.connection.backups_for(TABLE)? {
            match read_menu_file(&backup) {
                Ok(items) => {
                    info!(
                        "recovered {} table from backup {}",
                        TABLE,
                        backup.display()
                    );
                    fs::copy(&backup, self.connection.table_path(TABLE))?;
                    return Ok(items);
                }
                Err(e) => {
                    warn!("backup {} also invalid: {}", backup.display(), e);
                }
            }
        }
        error!("no valid {} backup found, starting with an empty table", TABLE);
        Ok(Vec::new())
    }
}

impl MenuStorage for MenuRepository {
    fn load(&self) -> Result<Vec<MenuItem>> {
        match self.load_strict() {
            Ok(items) => Ok(items),
            Err(Error::Corruption { detail, .. }) => {
                warn!("{} table corrupted ({}), attempting backup recovery", TABLE, detail);
                self.recover_from_backups()
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, items: &[MenuItem]) -> Result<()> {
        let mut writer = Writer::from_writer(Vec::new());
        writer
            .write_record(HEADER)
            .map_err(|e| Error::corruption(TABLE, e.to_string()))?;
        for item in items {
            writer
                .write_record(&[
                    item.id.as_str(),
                    item.name.as_str(),
                    item.category.as_str(),
                    &item.price.to_string(),
                    item.description.as_str(),
                    if item.is_available { "true" } else { "false" },
                ])
                .map_err(|e| Error::corruption(TABLE, e.to_string()))?;
        }
        let contents = writer
            .into_inner()
            .map_err(|e| Error::corruption(TABLE, e.to_string()))?;
        self.connection.atomic_replace(TABLE, &contents)
    }
}

fn read_menu_file(path: &Path) -> Result<Vec<MenuItem>> {
    let contents = fs::read_to_string(path)?;
    let mut reader = Reader::from_reader(contents.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::corruption(TABLE, format!("unreadable header: {}", e)))?;
    if headers != &StringRecord::from(HEADER.as_slice()) {
        return Err(Error::corruption(
            TABLE,
            format!("unexpected header: {:?}", headers),
        ));
    }

    let mut items = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| Error::corruption(TABLE, format!("row {}: {}", row + 1, e)))?;
        items.push(parse_record(&record, row + 1)?);
    }
    Ok(items)
}

fn parse_record(record: &StringRecord, row: usize) -> Result<MenuItem> {
    if record.len() != HEADER.len() {
        return Err(Error::corruption(
            TABLE,
            format!("row {}: expected {} columns, found {}", row, HEADER.len(), record.len()),
        ));
    }
    let field = |i: usize| record.get(i).unwrap_or("");

    let price: Decimal = field(3)
        .parse()
        .map_err(|e| Error::corruption(TABLE, format!("row {}: bad price: {}", row, e)))?;
    let category = field(2)
        .parse()
        .map_err(|_| Error::corruption(TABLE, format!("row {}: bad category '{}'", row, field(2))))?;
    let is_available = match field(5) {
        "true" => true,
        "false" => false,
        other => {
            return Err(Error::corruption(
                TABLE,
                format!("row {}: bad is_available '{}'", row, other),
            ))
        }
    };

    Ok(MenuItem {
        id: field(0).to_string(),
        name: field(1).to_string(),
        category,
        price,
        description: field(4).to_string(),
        is_available,
    })
}
