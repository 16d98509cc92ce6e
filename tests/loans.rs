use chrono::NaiveDateTime;
use library_loan_manager::db::{
    authenticate, count_loans, delete_loan, ensure_loan_schema, ensure_user_schema, fetch_loan,
    fetch_loans, insert_loan, next_loan_id, register_user, CREATED_AT_FORMAT,
};
use library_loan_manager::{Error, Loan};
use rstest::rstest;
use rusqlite::Connection;

fn loan_store() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    ensure_loan_schema(&conn).expect("schema");
    conn
}

fn user_store() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    ensure_user_schema(&conn).expect("schema");
    conn
}

fn loan(firstname: &str, book_title: &str) -> Loan {
    Loan {
        firstname: firstname.to_string(),
        book_title: book_title.to_string(),
        days_on_loan: 14,
        ..Loan::default()
    }
}

fn seed(conn: &Connection, count: usize) {
    for n in 1..=count {
        insert_loan(conn, &loan(&format!("Member {n}"), &format!("Book {n}")), None)
            .expect("insert");
    }
}

fn ids(conn: &Connection) -> Vec<i64> {
    fetch_loans(conn, None)
        .expect("fetch")
        .iter()
        .map(|r| r.id)
        .collect()
}

#[test]
fn inserts_receive_dense_ids() {
    let conn = loan_store();
    assert_eq!(next_loan_id(&conn).unwrap(), 1);
    seed(&conn, 5);
    assert_eq!(ids(&conn), vec![1, 2, 3, 4, 5]);
    assert_eq!(next_loan_id(&conn).unwrap(), 6);
    assert_eq!(count_loans(&conn).unwrap(), 5);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(5)]
fn delete_shifts_later_records_down(#[case] k: i64) {
    let conn = loan_store();
    seed(&conn, 5);
    let before = fetch_loans(&conn, None).unwrap();

    assert_eq!(delete_loan(&conn, k).unwrap(), 1);

    let after = fetch_loans(&conn, None).unwrap();
    assert_eq!(after.len(), 4);
    assert_eq!(ids(&conn), vec![1, 2, 3, 4]);
    for record in &after {
        let source = if record.id < k {
            &before[(record.id - 1) as usize]
        } else {
            &before[record.id as usize]
        };
        assert_eq!(record.loan, source.loan);
        assert_eq!(record.created_at, source.created_at);
    }
    assert_eq!(next_loan_id(&conn).unwrap(), count_loans(&conn).unwrap() + 1);
}

#[test]
fn deleting_a_missing_id_changes_nothing() {
    let conn = loan_store();
    seed(&conn, 3);
    assert_eq!(delete_loan(&conn, 7).unwrap(), 0);
    assert_eq!(ids(&conn), vec![1, 2, 3]);
}

#[test]
fn failed_renumber_rolls_back_the_delete() {
    let conn = loan_store();
    seed(&conn, 3);
    conn.execute_batch(
        "CREATE TRIGGER block_renumber BEFORE UPDATE ON borrow_records
         BEGIN SELECT RAISE(ABORT, 'renumber blocked'); END;",
    )
    .unwrap();

    let err = delete_loan(&conn, 1).unwrap_err();
    assert!(matches!(err, Error::Sqlite(_)), "{err}");

    assert_eq!(count_loans(&conn).unwrap(), 3);
    assert_eq!(ids(&conn), vec![1, 2, 3]);
    let first = fetch_loan(&conn, 1).unwrap().expect("record 1 survives");
    assert_eq!(first.loan.firstname, "Member 1");
}

#[test]
fn delete_then_insert_reuses_the_tail_id() {
    let conn = loan_store();
    let a = insert_loan(&conn, &loan("Ama", "Things Fall Apart"), None).unwrap();
    let b = insert_loan(&conn, &loan("Kofi", "Arrow of God"), None).unwrap();
    assert_eq!((a, b), (1, 2));

    delete_loan(&conn, 1).unwrap();
    let moved = fetch_loan(&conn, 1).unwrap().expect("record B moved to id 1");
    assert_eq!(moved.loan.firstname, "Kofi");
    assert!(fetch_loan(&conn, 2).unwrap().is_none());
    assert_eq!(next_loan_id(&conn).unwrap(), 2);
}

#[test]
fn search_matches_names_titles_and_reference() {
    let conn = loan_store();
    insert_loan(&conn, &loan("Ama", "Things Fall Apart"), None).unwrap();
    let mut with_ref = loan("Kofi", "Arrow of God");
    with_ref.surname = "Mensah".into();
    with_ref.reference_no = "REF-77".into();
    insert_loan(&conn, &with_ref, None).unwrap();

    let by_title = fetch_loans(&conn, Some("fall")).unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].loan.firstname, "Ama");

    assert_eq!(fetch_loans(&conn, Some("mensah")).unwrap()[0].id, 2);
    assert_eq!(fetch_loans(&conn, Some("REF-7")).unwrap()[0].id, 2);
    assert!(fetch_loans(&conn, Some("zzz-no-match")).unwrap().is_empty());
    assert!(fetch_loans(&conn, Some("%")).unwrap().is_empty());
}

#[test]
fn null_columns_read_back_as_empty_values() {
    let conn = loan_store();
    conn.execute("INSERT INTO borrow_records (id, firstname) VALUES (1, 'Ama')", [])
        .unwrap();
    let record = fetch_loan(&conn, 1).unwrap().unwrap();
    assert_eq!(record.loan.firstname, "Ama");
    assert_eq!(record.loan.book_title, "");
    assert_eq!(record.loan.days_on_loan, 0);
}

#[test]
fn explicit_created_at_is_kept() {
    let conn = loan_store();
    insert_loan(&conn, &loan("Ama", "Cinderella"), Some("2024-01-01T10:00:00.000000")).unwrap();
    let record = fetch_loan(&conn, 1).unwrap().unwrap();
    assert_eq!(record.created_at, "2024-01-01T10:00:00.000000");

    insert_loan(&conn, &loan("Kofi", "Game Design"), None).unwrap();
    let stamped = fetch_loan(&conn, 2).unwrap().unwrap();
    assert!(NaiveDateTime::parse_from_str(&stamped.created_at, CREATED_AT_FORMAT).is_ok());
}

#[test]
fn sign_up_then_login() {
    let conn = user_store();
    register_user(&conn, "alice", "pw1").unwrap();
    assert!(authenticate(&conn, "alice", "pw1").unwrap());
    assert!(!authenticate(&conn, "alice", "pw2").unwrap());
    assert!(!authenticate(&conn, "bob", "pw1").unwrap());

    let err = register_user(&conn, "alice", "other").unwrap_err();
    assert!(matches!(err, Error::UsernameTaken(ref name) if name == "alice"));
    assert!(authenticate(&conn, "alice", "pw1").unwrap());
}
