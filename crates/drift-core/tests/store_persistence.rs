use drift_core::control::{ControlByte, DC_FLOOD, PROTOCOL_EPIDEMIC};
use drift_core::{Address, Notification, Store};

fn sample_notification() -> Notification {
    Notification {
        control_byte: ControlByte::new(PROTOCOL_EPIDEMIC, DC_FLOOD, 0).unwrap(),
        hashed_id: [7u8; 32],
        hashed_destination_address: [8u8; 32],
        hashed_source_address: [9u8; 32],
        sent_timestamp: 1_700_000_000,
        message: "durable hello".to_string(),
    }
}

#[test]
fn notifications_and_addresses_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("drift.sqlite3");

    {
        let store = Store::open(&db_path).unwrap();
        store.insert_notification(&sample_notification()).unwrap();
        store
            .insert_address(&Address {
                value: [1u8; 32],
                hashed: [2u8; 32],
                is_own: true,
                name: None,
            })
            .unwrap();
    }

    let reopened = Store::open(&db_path).unwrap();
    let fetched = reopened.fetch_by_hashed_id(&[7u8; 32]).unwrap().unwrap();
    assert_eq!(fetched, sample_notification());

    let own = reopened.own_address().unwrap().unwrap();
    assert_eq!(own.hashed, [2u8; 32]);
}

#[test]
fn schema_version_row_is_written_on_first_open() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("drift.sqlite3");
    let _store = Store::open(&db_path).unwrap();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let version: String = conn
        .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, "1");
}
