use review_core::db::{open_db_in_memory, schema};
use review_core::{
    Employee, EmployeeId, EmployeeLookup, EmployeeRepository, RepoError, RepoResult, Review,
    ReviewRepository, ReviewValidationError, SqliteEmployeeRepository, SqliteReviewRepository,
};
use rusqlite::Connection;
use std::collections::HashMap;

/// In-memory employee directory standing in for the real store.
struct Directory {
    employees: HashMap<EmployeeId, Employee>,
}

impl Directory {
    fn with_ids(ids: &[EmployeeId]) -> Self {
        let employees = ids
            .iter()
            .map(|id| (*id, Employee::new(format!("employee-{id}"), "Tester").unwrap()))
            .collect();
        Self { employees }
    }
}

impl EmployeeLookup for Directory {
    fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        Ok(self.employees.get(&id).cloned())
    }
}

fn validation_error<T>(result: RepoResult<T>) -> ReviewValidationError {
    match result {
        Err(RepoError::Validation(err)) => err,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a validation error"),
    }
}

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    schema::create_all(&conn).unwrap();
    conn
}

#[test]
fn valid_fields_construct_a_review_with_those_values() {
    let directory = Directory::with_ids(&[1, 2]);

    for (year, comment, employee_id) in [(2023, "Great work", 1), (-5, "x", 2), (0, "ünïcode", 1)]
    {
        let review = Review::new(year, comment, employee_id, &directory).unwrap();
        assert_eq!(review.id(), None);
        assert_eq!(review.year(), year);
        assert_eq!(review.comment(), comment);
        assert_eq!(review.employee_id(), employee_id);
    }
}

#[test]
fn empty_comment_fails_with_comment_error() {
    let directory = Directory::with_ids(&[1]);
    let err = validation_error(Review::new(2023, "", 1, &directory));
    assert_eq!(err, ReviewValidationError::InvalidComment);
    assert_eq!(err.to_string(), "Comment must be a non-empty string");
}

#[test]
fn unknown_employee_fails_with_reference_error() {
    let directory = Directory::with_ids(&[1]);
    let err = validation_error(Review::new(2023, "Fine", 2, &directory));
    assert_eq!(err, ReviewValidationError::InvalidEmployeeReference);
}

#[test]
fn setters_validate_and_keep_old_value_on_failure() {
    let directory = Directory::with_ids(&[1, 2]);
    let mut review = Review::new(2023, "Fine", 1, &directory).unwrap();

    let err = validation_error(review.set_comment(""));
    assert_eq!(err, ReviewValidationError::InvalidComment);
    assert_eq!(review.comment(), "Fine");

    let err = validation_error(review.set_employee_id(3, &directory));
    assert_eq!(err, ReviewValidationError::InvalidEmployeeReference);
    assert_eq!(review.employee_id(), 1);

    review.set_employee_id(2, &directory).unwrap();
    review.set_year(2024);
    assert_eq!(review.employee_id(), 2);
    assert_eq!(review.year(), 2024);
}

#[test]
fn repository_accepts_an_injected_lookup() {
    // No employees table exists; with foreign keys off only the injected
    // directory decides which employee ids are valid.
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
    let mut reviews = SqliteReviewRepository::new(&conn, Directory::with_ids(&[77]));
    reviews.create_table().unwrap();

    let review = reviews.create(2023, "Mocked", 77).unwrap();
    assert_eq!(review.borrow().employee_id(), 77);
    assert!(reviews.employees().find_employee(77).unwrap().is_some());

    let id = review.borrow().id().unwrap();
    let reloaded = reviews.find_by_id(id).unwrap().unwrap();
    assert!(std::rc::Rc::ptr_eq(&review, &reloaded));

    let err = validation_error(reviews.create(2023, "Mocked", 78));
    assert_eq!(err, ReviewValidationError::InvalidEmployeeReference);
}

#[test]
fn non_integer_year_in_storage_fails_with_year_error() {
    let conn = setup();
    let employees = SqliteEmployeeRepository::new(&conn);
    let lee = employees.create("Lee", "Manager").unwrap().id().unwrap();
    let mut reviews = SqliteReviewRepository::new(&conn, &employees);

    conn.execute(
        "INSERT INTO reviews (year, comment, employee_id) VALUES ('twenty', 'ok', ?1)",
        [lee],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO reviews (year, comment, employee_id) VALUES (2023.5, 'ok', ?1)",
        [lee],
    )
    .unwrap();

    let err = validation_error(reviews.find_by_id(1));
    assert_eq!(err, ReviewValidationError::InvalidYear);
    assert_eq!(err.to_string(), "Year must be an integer");
    let err = validation_error(reviews.find_by_id(2));
    assert_eq!(err, ReviewValidationError::InvalidYear);
    assert_eq!(reviews.cache_len(), 0);
}

#[test]
fn non_string_comment_in_storage_fails_with_comment_error() {
    let conn = setup();
    let employees = SqliteEmployeeRepository::new(&conn);
    let lee = employees.create("Lee", "Manager").unwrap().id().unwrap();
    let mut reviews = SqliteReviewRepository::new(&conn, &employees);

    conn.execute(
        "INSERT INTO reviews (year, comment, employee_id) VALUES (2023, NULL, ?1)",
        [lee],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO reviews (year, comment, employee_id) VALUES (2023, X'00', ?1)",
        [lee],
    )
    .unwrap();

    let err = validation_error(reviews.find_by_employee_id(lee));
    assert_eq!(err, ReviewValidationError::InvalidComment);
    let err = validation_error(reviews.find_by_id(2));
    assert_eq!(err, ReviewValidationError::InvalidComment);
}

#[test]
fn unresolvable_employee_fails_before_insert() {
    let conn = setup();
    let employees = SqliteEmployeeRepository::new(&conn);
    let mut reviews = SqliteReviewRepository::new(&conn, &employees);

    let err = validation_error(reviews.create(2023, "Nobody", 404));
    assert_eq!(err, ReviewValidationError::InvalidEmployeeReference);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM reviews;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(reviews.cache_len(), 0);
}

#[test]
fn lookup_storage_failure_is_not_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    schema::create_reviews_table(&conn).unwrap();
    let employees = SqliteEmployeeRepository::new(&conn);
    let reviews = SqliteReviewRepository::new(&conn, &employees);

    let err = reviews.new_review(2023, "No employees table", 1).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(std::error::Error::source(&err).is_some());
}
