//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(day: u32, hour: u32, amount: f64, direction: Direction, description: &str) -> Transaction {
        Transaction {
            id: None,
            date: Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap(),
            amount,
            direction,
            description: description.to_string(),
            category: Category::Uncategorized,
        }
    }

    #[test]
    fn test_default_subject_is_seeded() {
        let db = Database::in_memory().unwrap();
        let subjects = db.list_subjects().unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].id, DEFAULT_SUBJECT_ID);
        assert_eq!(subjects[0].name, DEFAULT_SUBJECT_NAME);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::in_memory().unwrap();
        let reopened = Database::new(db.path()).unwrap();
        assert_eq!(reopened.list_subjects().unwrap().len(), 1);
    }

    #[test]
    fn test_ensure_subject_keeps_existing_name() {
        let db = Database::in_memory().unwrap();
        let created = db.ensure_subject(7, "Mama Mboga").unwrap();
        assert_eq!(created.name, "Mama Mboga");

        let again = db.ensure_subject(7, "Renamed").unwrap();
        assert_eq!(again.name, "Mama Mboga");
        assert_eq!(db.list_subjects().unwrap().len(), 2);
    }

    #[test]
    fn test_create_subject_assigns_new_id() {
        let db = Database::in_memory().unwrap();
        let subject = db.create_subject("Duka").unwrap();
        assert!(subject.id > DEFAULT_SUBJECT_ID);
        assert!(db.get_subject(subject.id).unwrap().is_some());
        assert!(db.get_subject(999).unwrap().is_none());
    }

    #[test]
    fn test_create_subject_rejects_blank_name() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(db.create_subject("  ").unwrap_err(), Error::InvalidData(_)));
        assert_eq!(db.list_subjects().unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let db = Database::in_memory().unwrap();
        let mut rent = tx(2, 9, 15000.0, Direction::Expense, "Shop rent");
        rent.category = Category::RentPayments;
        let sales = tx(3, 9, 40000.0, Direction::Income, "Sales");

        let saved = db
            .save_categorized_transactions(DEFAULT_SUBJECT_ID, &[rent.clone(), sales.clone()])
            .unwrap();
        assert_eq!(saved, 2);

        let loaded = db.load_transactions(DEFAULT_SUBJECT_ID).unwrap();
        assert_eq!(loaded.len(), 2);
        // Newest first
        assert_eq!(loaded[0].description, "Sales");
        assert_eq!(loaded[0].direction, Direction::Income);
        assert_eq!(loaded[1].category, Category::RentPayments);
        assert_eq!(loaded[1].date, rent.date);
        assert!(loaded.iter().all(|t| t.id.is_some()));
    }

    #[test]
    fn test_equal_dates_order_by_id_desc() {
        let db = Database::in_memory().unwrap();
        let first = tx(1, 8, 1.0, Direction::Expense, "first");
        let second = tx(1, 8, 2.0, Direction::Expense, "second");
        db.save_categorized_transactions(DEFAULT_SUBJECT_ID, &[first, second])
            .unwrap();

        let loaded = db.load_transactions(DEFAULT_SUBJECT_ID).unwrap();
        assert_eq!(loaded[0].description, "second");
        assert_eq!(loaded[1].description, "first");
    }

    #[test]
    fn test_save_replaces_previous_statement() {
        let db = Database::in_memory().unwrap();
        db.save_categorized_transactions(
            DEFAULT_SUBJECT_ID,
            &[
                tx(1, 8, 1.0, Direction::Expense, "old a"),
                tx(1, 9, 1.0, Direction::Expense, "old b"),
            ],
        )
        .unwrap();
        db.save_categorized_transactions(
            DEFAULT_SUBJECT_ID,
            &[tx(2, 8, 5.0, Direction::Income, "new")],
        )
        .unwrap();

        let loaded = db.load_transactions(DEFAULT_SUBJECT_ID).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].description, "new");
        assert_eq!(db.count_transactions(DEFAULT_SUBJECT_ID).unwrap(), 1);
    }

    #[test]
    fn test_subjects_are_isolated() {
        let db = Database::in_memory().unwrap();
        db.ensure_subject(2, "Other").unwrap();
        db.save_categorized_transactions(DEFAULT_SUBJECT_ID, &[tx(1, 8, 1.0, Direction::Expense, "one")])
            .unwrap();
        db.save_categorized_transactions(2, &[tx(1, 8, 1.0, Direction::Expense, "two")])
            .unwrap();

        db.save_categorized_transactions(2, &[]).unwrap();
        assert_eq!(db.count_transactions(2).unwrap(), 0);
        assert_eq!(db.count_transactions(DEFAULT_SUBJECT_ID).unwrap(), 1);
    }

    #[test]
    fn test_failed_replacement_keeps_previous_rows() {
        let db = Database::in_memory().unwrap();
        db.save_categorized_transactions(DEFAULT_SUBJECT_ID, &[tx(1, 8, 10.0, Direction::Income, "kept")])
            .unwrap();

        // Negative amount violates the CHECK constraint mid-batch
        let bad = [
            tx(2, 8, 5.0, Direction::Income, "fine"),
            tx(2, 9, -5.0, Direction::Expense, "broken"),
        ];
        assert!(db.save_categorized_transactions(DEFAULT_SUBJECT_ID, &bad).is_err());

        let loaded = db.load_transactions(DEFAULT_SUBJECT_ID).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].description, "kept");
    }

    #[test]
    fn test_save_for_unknown_subject_is_not_found() {
        let db = Database::in_memory().unwrap();
        let err = db.save_categorized_transactions(42, &[]).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_sentinel_category_survives_storage() {
        let db = Database::in_memory().unwrap();
        let mut pending = tx(1, 8, 3.0, Direction::Expense, "pending");
        pending.category = Category::UncategorizedModelLoading;
        db.save_categorized_transactions(DEFAULT_SUBJECT_ID, &[pending]).unwrap();

        let loaded = db.load_transactions(DEFAULT_SUBJECT_ID).unwrap();
        assert_eq!(loaded[0].category, Category::UncategorizedModelLoading);
    }

    #[test]
    fn test_clear_transactions() {
        let db = Database::in_memory().unwrap();
        db.save_categorized_transactions(DEFAULT_SUBJECT_ID, &[tx(1, 8, 1.0, Direction::Expense, "x")])
            .unwrap();
        assert_eq!(db.clear_transactions(DEFAULT_SUBJECT_ID).unwrap(), 1);
        assert!(db.load_transactions(DEFAULT_SUBJECT_ID).unwrap().is_empty());
    }

    #[test]
    fn test_sub_second_dates_round_trip_in_time_order() {
        let db = Database::in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let mut later = tx(1, 10, 1000.0, Direction::Income, "Sales A");
        later.date = base + chrono::Duration::milliseconds(900);
        let mut earlier = tx(1, 10, 2000.0, Direction::Income, "Sales B");
        earlier.date = base + chrono::Duration::milliseconds(100);

        db.save_categorized_transactions(DEFAULT_SUBJECT_ID, &[later.clone(), earlier.clone()])
            .unwrap();

        let loaded = db.load_transactions(DEFAULT_SUBJECT_ID).unwrap();
        assert_eq!(loaded[0].description, "Sales A");
        assert_eq!(loaded[0].date, later.date);
        assert_eq!(loaded[1].description, "Sales B");
        assert_eq!(loaded[1].date, earlier.date);
    }

    #[test]
    fn test_parse_datetime_accepts_whole_seconds() {
        let parsed = parse_datetime("2024-05-01 10:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());

        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        assert_eq!(format_datetime(&dt), "2024-05-01 10:00:00.123456789");
        assert_eq!(parse_datetime(&format_datetime(&dt)).unwrap(), dt);
    }

    #[test]
    fn test_in_memory_database_files_removed_on_drop() {
        let db = Database::in_memory().unwrap();
        let path = std::path::PathBuf::from(db.path());
        let copy = db.clone();
        assert!(path.exists());

        drop(db);
        assert!(path.exists(), "a live clone keeps the file");

        drop(copy);
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }
}
