use std::fs;

use library_loan_manager::db::{ensure_loan_schema, insert_loan};
use library_loan_manager::export::export_csv;
use library_loan_manager::models::LOAN_COLUMNS;
use library_loan_manager::{Error, Loan};
use rusqlite::Connection;
use tempfile::tempdir;

fn loan_store() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    ensure_loan_schema(&conn).expect("schema");
    conn
}

#[test]
fn empty_store_writes_no_file() {
    let conn = loan_store();
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");

    assert!(matches!(export_csv(&conn, &path), Err(Error::NoData)));
    assert!(!path.exists());
}

#[test]
fn header_plus_one_line_per_record_in_id_order() {
    let conn = loan_store();
    for name in ["Ama", "Kofi", "Efua"] {
        let loan = Loan {
            firstname: name.to_string(),
            book_title: "Arrow of God".to_string(),
            days_on_loan: 14,
            ..Loan::default()
        };
        insert_loan(&conn, &loan, Some("2024-01-01T00:00:00.000000")).unwrap();
    }
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");

    assert_eq!(export_csv(&conn, &path).unwrap(), 3);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], LOAN_COLUMNS.join(","));
    assert!(lines[1].starts_with("1,"));
    assert!(lines[1].contains("Ama"));
    assert!(lines[2].starts_with("2,") && lines[2].contains("Kofi"));
    assert!(lines[3].starts_with("3,") && lines[3].contains("Efua"));
}

#[test]
fn fields_with_separators_are_quoted() {
    let conn = loan_store();
    let loan = Loan {
        firstname: "Ama".to_string(),
        book_title: "Things Fall Apart".to_string(),
        author: "Achebe, Chinua".to_string(),
        address1: "12 \"Palm\" Road".to_string(),
        days_on_loan: 14,
        ..Loan::default()
    };
    insert_loan(&conn, &loan, None).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("quoted.csv");
    export_csv(&conn, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"Achebe, Chinua\""));
    assert!(text.contains("\"12 \"\"Palm\"\" Road\""));

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(row.len(), LOAN_COLUMNS.len());
    assert_eq!(&row[12], "Achebe, Chinua");
}
