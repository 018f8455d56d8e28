use sijil_core::db::open_db_in_memory;
use sijil_core::{
    SqliteStudentRepository, Student, StudentRepository, StudentSearchQuery, StudentStatus,
};

#[test]
fn list_orders_by_name_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let names: Vec<String> = repo
        .list_students()
        .unwrap()
        .into_iter()
        .map(|student| student.name)
        .collect();

    assert_eq!(
        names,
        [
            "aisha Saleh",
            "Ali Hassan",
            "Dana Haddad",
            "Khaled Omar",
            "Salma Ali",
            "Sam%ir Odeh",
        ]
    );
}

#[test]
fn department_filter_alone_returns_that_department_in_name_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let found = repo.search_students(None, Some("CS")).unwrap();
    let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["aisha Saleh", "Ali Hassan", "Salma Ali"]);
}

#[test]
fn name_filter_alone_matches_substrings_in_any_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    for term in ["ali", "ALI", "Ali"] {
        let found = repo.search_students(Some(term), None).unwrap();
        let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Ali Hassan", "Salma Ali"], "term {term}");
    }
}

#[test]
fn name_and_department_filters_combine_with_and() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let found = repo.search_students(Some("ali"), Some("CS")).unwrap();
    let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Ali Hassan", "Salma Ali"]);

    let found = repo.search_students(Some("ali"), Some("Math")).unwrap();
    assert!(found.is_empty());
}

#[test]
fn like_wildcards_in_terms_match_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let found = repo.search_students(Some("m%i"), None).unwrap();
    let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Sam%ir Odeh"]);

    let found = repo.search_students(Some("%"), None).unwrap();
    let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Sam%ir Odeh"]);
}

#[test]
fn advanced_search_with_no_filters_equals_list() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let all = repo.list_students().unwrap();
    let unfiltered = repo
        .search_students_advanced(&StudentSearchQuery::default())
        .unwrap();
    assert_eq!(unfiltered, all);
}

#[test]
fn advanced_search_filters_combine_independently() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let by_id_fragment = repo
        .search_students_advanced(&StudentSearchQuery {
            student_id: Some("ST-3".to_string()),
            ..StudentSearchQuery::default()
        })
        .unwrap();
    let ids: Vec<&str> = by_id_fragment.iter().map(|s| s.student_id.as_str()).collect();
    assert_eq!(ids, ["ST-3005", "ST-3002"]);

    let graduated_cs = repo
        .search_students_advanced(&StudentSearchQuery {
            department: Some("CS".to_string()),
            status: Some(StudentStatus::Graduated),
            ..StudentSearchQuery::default()
        })
        .unwrap();
    let names: Vec<&str> = graduated_cs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Salma Ali"]);

    let narrow = repo
        .search_students_advanced(&StudentSearchQuery {
            name: Some("hassan".to_string()),
            student_id: Some("ST-".to_string()),
            department: Some("CS".to_string()),
            status: Some(StudentStatus::Active),
            ..StudentSearchQuery::default()
        })
        .unwrap();
    let names: Vec<&str> = narrow.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Ali Hassan"]);
}

#[test]
fn counts_by_status_reflect_seeded_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    assert_eq!(repo.count_students().unwrap(), 6);
    assert_eq!(
        repo.count_students_by_status(StudentStatus::Active).unwrap(),
        3
    );
    assert_eq!(
        repo.count_students_by_status(StudentStatus::Graduated)
            .unwrap(),
        2
    );
    assert_eq!(
        repo.count_students_by_status(StudentStatus::Inactive)
            .unwrap(),
        1
    );
}

/// Six students across two departments and all three statuses. One name
/// carries a literal `%` to pin down wildcard escaping.
fn seeded_repo(conn: &rusqlite::Connection) -> SqliteStudentRepository<'_> {
    let repo = SqliteStudentRepository::try_new(conn).unwrap();
    let rows = [
        ("ST-1010", "Ali Hassan", "CS", StudentStatus::Active),
        ("ST-3002", "Khaled Omar", "Math", StudentStatus::Active),
        ("ST-1020", "Salma Ali", "CS", StudentStatus::Graduated),
        ("ST-1030", "aisha Saleh", "CS", StudentStatus::Inactive),
        ("ST-3005", "Dana Haddad", "Math", StudentStatus::Graduated),
        ("ST-2040", "Sam%ir Odeh", "Math", StudentStatus::Active),
    ];
    for (id, name, department, status) in rows {
        repo.create_student(&Student::new(id, name, department, status))
            .unwrap();
    }
    repo
}
