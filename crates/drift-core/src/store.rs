//! The durable, single-writer notification (and address) repository,
//! backed by SQLite via `rusqlite`.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::address::Address;
use crate::control::ControlByte;
use crate::error::{Error, Result};
use crate::notification::Notification;

/// Current persisted schema version, embedded to allow future migration.
const SCHEMA_VERSION: &str = "1";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS addresses (
                hashed BLOB PRIMARY KEY,
                value BLOB NOT NULL,
                is_own INTEGER NOT NULL,
                name TEXT
            );
            CREATE TABLE IF NOT EXISTS notifications (
                hashed_id BLOB PRIMARY KEY,
                control_byte INTEGER NOT NULL,
                hashed_destination BLOB NOT NULL,
                hashed_source BLOB NOT NULL,
                sent_timestamp INTEGER NOT NULL,
                message TEXT NOT NULL
            );",
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    // ---- Notifications ----

    /// Upsert by `hashed_id`. SQLite commits the write before returning,
    /// which is this store's realization of "auto-saves on insert".
    pub fn insert_notification(&self, notification: &Notification) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO notifications
                (hashed_id, control_byte, hashed_destination, hashed_source, sent_timestamp, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                notification.hashed_id.to_vec(),
                notification.control_byte.pack(),
                notification.hashed_destination_address.to_vec(),
                notification.hashed_source_address.to_vec(),
                notification.sent_timestamp as i64,
                notification.message,
            ],
        )?;
        Ok(())
    }

    pub fn fetch_by_hashed_id(&self, hashed_id: &[u8; 32]) -> Result<Option<Notification>> {
        self.conn
            .query_row(
                "SELECT control_byte, hashed_id, hashed_destination, hashed_source, sent_timestamp, message
                 FROM notifications WHERE hashed_id = ?1",
                params![hashed_id.to_vec()],
                row_to_notification,
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn fetch_all_hashed_ids(&self) -> Result<HashSet<[u8; 32]>> {
        let mut stmt = self.conn.prepare("SELECT hashed_id FROM notifications")?;
        let rows = stmt.query_map([], |row| {
            let raw: Vec<u8> = row.get(0)?;
            Ok(raw)
        })?;
        let mut out = HashSet::new();
        for raw in rows {
            out.insert(to_array(raw?));
        }
        Ok(out)
    }

    /// Records where `destinationControlValue != 0`.
    pub fn fetch_all_transmittable(&self) -> Result<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT control_byte, hashed_id, hashed_destination, hashed_source, sent_timestamp, message
             FROM notifications WHERE (control_byte & 0x30) != 0",
        )?;
        let rows = stmt.query_map([], row_to_notification)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Records addressed to `hashed_addr`, used to rebuild the inbox.
    pub fn fetch_all_for(&self, hashed_addr: &[u8; 32]) -> Result<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT control_byte, hashed_id, hashed_destination, hashed_source, sent_timestamp, message
             FROM notifications WHERE hashed_destination = ?1",
        )?;
        let rows = stmt.query_map(params![hashed_addr.to_vec()], row_to_notification)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Validate-then-persist a new `destinationControlValue` for a stored
    /// notification.
    pub fn set_destination_control(&self, hashed_id: &[u8; 32], value: u8) -> Result<()> {
        let Some(notification) = self.fetch_by_hashed_id(hashed_id)? else {
            return Ok(());
        };
        let updated = notification.control_byte.with_destination_control(value)?;
        self.write_control_byte(hashed_id, updated)
    }

    /// Validate-then-persist a new `sequenceNumberValue` for a stored
    /// notification.
    pub fn set_sequence_number(&self, hashed_id: &[u8; 32], value: u8) -> Result<()> {
        let Some(notification) = self.fetch_by_hashed_id(hashed_id)? else {
            return Ok(());
        };
        let updated = notification.control_byte.with_sequence_number(value)?;
        self.write_control_byte(hashed_id, updated)
    }

    fn write_control_byte(&self, hashed_id: &[u8; 32], control_byte: ControlByte) -> Result<()> {
        self.conn.execute(
            "UPDATE notifications SET control_byte = ?1 WHERE hashed_id = ?2",
            params![control_byte.pack(), hashed_id.to_vec()],
        )?;
        Ok(())
    }

    // ---- Addresses ----

    pub fn insert_address(&self, address: &Address) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO addresses (hashed, value, is_own, name) VALUES (?1, ?2, ?3, ?4)",
            params![
                address.hashed.to_vec(),
                address.value.to_vec(),
                address.is_own as i64,
                address.name,
            ],
        )?;
        Ok(())
    }

    pub fn own_address(&self) -> Result<Option<Address>> {
        self.conn
            .query_row(
                "SELECT value, hashed, is_own, name FROM addresses WHERE is_own = 1",
                [],
                row_to_address,
            )
            .optional()
            .map_err(Error::from)
    }

    /// All known addresses except the one marked own (`contacts`, §6.2).
    pub fn contacts(&self) -> Result<Vec<Address>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value, hashed, is_own, name FROM addresses WHERE is_own = 0")?;
        let rows = stmt.query_map([], row_to_address)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }
}

fn to_array(raw: Vec<u8>) -> [u8; 32] {
    raw.try_into().unwrap_or([0u8; 32])
}

fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    let control_byte_raw: u8 = row.get(0)?;
    let hashed_id: Vec<u8> = row.get(1)?;
    let hashed_destination: Vec<u8> = row.get(2)?;
    let hashed_source: Vec<u8> = row.get(3)?;
    let sent_timestamp: i64 = row.get(4)?;
    let message: String = row.get(5)?;

    let control_byte = ControlByte::unpack(control_byte_raw).map_err(|_| {
        rusqlite::Error::IntegralValueOutOfRange(0, control_byte_raw as i64)
    })?;

    Ok(Notification {
        control_byte,
        hashed_id: to_array(hashed_id),
        hashed_destination_address: to_array(hashed_destination),
        hashed_source_address: to_array(hashed_source),
        sent_timestamp: sent_timestamp as u64,
        message,
    })
}

fn row_to_address(row: &rusqlite::Row<'_>) -> rusqlite::Result<Address> {
    let value: Vec<u8> = row.get(0)?;
    let hashed: Vec<u8> = row.get(1)?;
    let is_own: i64 = row.get(2)?;
    let name: Option<String> = row.get(3)?;
    Ok(Address {
        value: to_array(value),
        hashed: to_array(hashed),
        is_own: is_own != 0,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{DC_FLOOD, DC_TERMINAL, PROTOCOL_EPIDEMIC};

    fn sample(hashed_id: u8, dc: u8) -> Notification {
        Notification {
            control_byte: ControlByte::new(PROTOCOL_EPIDEMIC, dc, 0).unwrap(),
            hashed_id: [hashed_id; 32],
            hashed_destination_address: [2u8; 32],
            hashed_source_address: [3u8; 32],
            sent_timestamp: 123,
            message: "hi".into(),
        }
    }

    #[test]
    fn insert_then_fetch_round_trips() {
        let store = Store::in_memory().unwrap();
        let n = sample(1, DC_FLOOD);
        store.insert_notification(&n).unwrap();
        let fetched = store.fetch_by_hashed_id(&n.hashed_id).unwrap().unwrap();
        assert_eq!(fetched, n);
    }

    #[test]
    fn upsert_replaces_existing_record() {
        let store = Store::in_memory().unwrap();
        let mut n = sample(1, DC_FLOOD);
        store.insert_notification(&n).unwrap();
        n.message = "updated".into();
        store.insert_notification(&n).unwrap();
        let fetched = store.fetch_by_hashed_id(&n.hashed_id).unwrap().unwrap();
        assert_eq!(fetched.message, "updated");
    }

    #[test]
    fn transmittable_excludes_terminal_records() {
        let store = Store::in_memory().unwrap();
        store.insert_notification(&sample(1, DC_FLOOD)).unwrap();
        store.insert_notification(&sample(2, DC_TERMINAL)).unwrap();
        let transmittable = store.fetch_all_transmittable().unwrap();
        assert_eq!(transmittable.len(), 1);
        assert_eq!(transmittable[0].hashed_id, [1u8; 32]);
    }

    #[test]
    fn set_destination_control_persists_and_validates() {
        let store = Store::in_memory().unwrap();
        let n = sample(1, DC_FLOOD);
        store.insert_notification(&n).unwrap();
        store.set_destination_control(&n.hashed_id, DC_TERMINAL).unwrap();
        let fetched = store.fetch_by_hashed_id(&n.hashed_id).unwrap().unwrap();
        assert_eq!(fetched.control_byte.destination_control(), DC_TERMINAL);

        assert!(store.set_destination_control(&n.hashed_id, 9).is_err());
    }

    #[test]
    fn fetch_all_for_filters_by_destination() {
        let store = Store::in_memory().unwrap();
        let mut n = sample(1, DC_FLOOD);
        n.hashed_destination_address = [42u8; 32];
        store.insert_notification(&n).unwrap();
        store.insert_notification(&sample(2, DC_FLOOD)).unwrap();

        let inbox = store.fetch_all_for(&[42u8; 32]).unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].hashed_id, [1u8; 32]);
    }

    #[test]
    fn own_address_and_contacts_are_distinguished() {
        let store = Store::in_memory().unwrap();
        store
            .insert_address(&Address {
                value: [1u8; 32],
                hashed: [2u8; 32],
                is_own: true,
                name: None,
            })
            .unwrap();
        store
            .insert_address(&Address {
                value: [3u8; 32],
                hashed: [4u8; 32],
                is_own: false,
                name: Some("alice".into()),
            })
            .unwrap();

        assert_eq!(store.own_address().unwrap().unwrap().hashed, [2u8; 32]);
        let contacts = store.contacts().unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name.as_deref(), Some("alice"));
    }
}
