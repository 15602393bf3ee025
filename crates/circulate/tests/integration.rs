use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn circ_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("circ");
    path
}

fn setup_test_env(backend: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let store_file = match backend {
        "file" => "library.json",
        _ => "library.sqlite",
    };
    let config_content = format!(
        r#"[store]
backend = "{}"
path = "{}/data/{}"
"#,
        backend,
        root.display(),
        store_file
    );

    let config_path = config_dir.join("circ.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_circ(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = circ_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run circ binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

/// Init, one book with the given copies, one borrower. Book id is 1,
/// borrower id is B0001.
fn seed_one_book(config_path: &Path, copies: &str) {
    let (stdout, stderr, success) = run_circ(config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    let (stdout, _, success) = run_circ(
        config_path,
        &[
            "add-book",
            "--title",
            "The Great Gatsby",
            "--author",
            "F. Scott Fitzgerald",
            "--isbn",
            "9780743273565",
            "--genre",
            "Classic",
            "--copies",
            copies,
        ],
    );
    assert!(success, "add-book failed: {}", stdout);
    assert!(stdout.contains("Added book 1: The Great Gatsby"));
    let (stdout, _, success) = run_circ(
        config_path,
        &[
            "add-borrower",
            "--name",
            "Ada Lovelace",
            "--email",
            "ada@example.com",
            "--phone",
            "555-0100",
        ],
    );
    assert!(success, "add-borrower failed: {}", stdout);
    assert!(stdout.contains("Registered borrower B0001: Ada Lovelace"));
}

#[test]
fn test_init_creates_file_store() {
    let (tmp, config_path) = setup_test_env("file");
    let (stdout, stderr, success) = run_circ(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/library.json").exists());
}

#[test]
fn test_init_creates_sqlite_store() {
    let (tmp, config_path) = setup_test_env("sqlite");
    let (stdout, stderr, success) = run_circ(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/library.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    for backend in ["file", "sqlite"] {
        let (_tmp, config_path) = setup_test_env(backend);
        let (_, _, success1) = run_circ(&config_path, &["init"]);
        assert!(success1, "First init failed ({})", backend);
        let (_, _, success2) = run_circ(&config_path, &["init"]);
        assert!(success2, "Second init failed ({})", backend);
    }
}

#[test]
fn test_catalog_persists_across_invocations() {
    for backend in ["file", "sqlite"] {
        let (_tmp, config_path) = setup_test_env(backend);
        seed_one_book(&config_path, "2");

        // Every command is a fresh process, so this listing proves the
        // records survived a full store reopen.
        let (stdout, _, success) = run_circ(&config_path, &["books"]);
        assert!(success);
        assert!(stdout.contains("1: The Great Gatsby by F. Scott Fitzgerald"));
        assert!(stdout.contains("2/2 available"));

        let (stdout, _, success) = run_circ(&config_path, &["borrowers"]);
        assert!(success);
        assert!(stdout.contains("B0001: Ada Lovelace <ada@example.com> (0 on loan)"));
    }
}

#[test]
fn test_borrow_return_cycle() {
    for backend in ["file", "sqlite"] {
        let (_tmp, config_path) = setup_test_env(backend);
        seed_one_book(&config_path, "1");

        let (stdout, _, success) = run_circ(&config_path, &["borrow", "1", "B0001"]);
        assert!(success, "borrow failed ({}): {}", backend, stdout);
        assert!(stdout.contains("Borrowed book 1 as transaction 1, due "));

        let (stdout, _, success) = run_circ(&config_path, &["books"]);
        assert!(success);
        assert!(stdout.contains("0/1 available"));

        let (stdout, _, success) = run_circ(&config_path, &["circulation"]);
        assert!(success);
        assert!(stdout.contains("1: The Great Gatsby -> B0001"));

        let (stdout, _, success) = run_circ(&config_path, &["return", "1"]);
        assert!(success, "return failed ({}): {}", backend, stdout);
        assert!(stdout.contains("Returned transaction 1."));

        let (stdout, _, success) = run_circ(&config_path, &["books"]);
        assert!(success);
        assert!(stdout.contains("1/1 available"));

        let (stdout, _, success) = run_circ(&config_path, &["circulation"]);
        assert!(success);
        assert!(stdout.contains("No active loans."));
    }
}

#[test]
fn test_borrow_last_copy_then_unavailable() {
    let (_tmp, config_path) = setup_test_env("file");
    seed_one_book(&config_path, "1");

    let (_, _, success) = run_circ(&config_path, &["borrow", "1", "B0001"]);
    assert!(success);

    let (stdout, stderr, success) = run_circ(&config_path, &["borrow", "1", "B0001"]);
    assert!(!success, "second borrow of the last copy must fail");
    assert!(
        stderr.contains("no copies available"),
        "stdout={}, stderr={}",
        stdout,
        stderr
    );
}

#[test]
fn test_double_return_rejected() {
    let (_tmp, config_path) = setup_test_env("sqlite");
    seed_one_book(&config_path, "1");

    run_circ(&config_path, &["borrow", "1", "B0001"]);
    let (_, _, success) = run_circ(&config_path, &["return", "1"]);
    assert!(success);

    let (_, stderr, success) = run_circ(&config_path, &["return", "1"]);
    assert!(!success, "double return must fail");
    assert!(stderr.contains("not found"), "stderr={}", stderr);

    // The count did not climb past the owned copies.
    let (stdout, _, _) = run_circ(&config_path, &["books"]);
    assert!(stdout.contains("1/1 available"));
}

#[test]
fn test_borrow_unknown_ids() {
    let (_tmp, config_path) = setup_test_env("file");
    seed_one_book(&config_path, "1");

    let (_, stderr, success) = run_circ(&config_path, &["borrow", "99", "B0001"]);
    assert!(!success);
    assert!(stderr.contains("not found"));

    let (_, stderr, success) = run_circ(&config_path, &["borrow", "1", "B9999"]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_duplicate_borrower_email_rejected() {
    for backend in ["file", "sqlite"] {
        let (_tmp, config_path) = setup_test_env(backend);
        seed_one_book(&config_path, "1");

        let (_, stderr, success) = run_circ(
            &config_path,
            &[
                "add-borrower",
                "--name",
                "Imposter",
                "--email",
                "ada@example.com",
                "--phone",
                "555-0199",
            ],
        );
        assert!(!success, "duplicate email must be rejected ({})", backend);
        assert!(stderr.contains("already registered"), "stderr={}", stderr);
    }
}

#[test]
fn test_search_ranks_matching_title_first() {
    let (_tmp, config_path) = setup_test_env("file");
    seed_one_book(&config_path, "1");
    run_circ(
        &config_path,
        &[
            "add-book",
            "--title",
            "Moby Dick",
            "--author",
            "Herman Melville",
            "--isbn",
            "9781503280786",
            "--genre",
            "Classic",
        ],
    );

    let (stdout, _, success) = run_circ(&config_path, &["search", "gatsby", "--scope", "title"]);
    assert!(success, "search failed: {}", stdout);
    assert!(stdout.contains("The Great Gatsby"));
    // Disjoint records score zero and are omitted.
    assert!(!stdout.contains("Moby Dick"));
}

#[test]
fn test_search_scope_filters_fields() {
    let (_tmp, config_path) = setup_test_env("file");
    seed_one_book(&config_path, "1");

    // The author's name is not in the title scope.
    let (stdout, _, success) =
        run_circ(&config_path, &["search", "fitzgerald", "--scope", "title"]);
    assert!(success);
    assert!(stdout.contains("No results."));

    let (stdout, _, success) =
        run_circ(&config_path, &["search", "fitzgerald", "--scope", "author"]);
    assert!(success);
    assert!(stdout.contains("The Great Gatsby"));
}

#[test]
fn test_search_rejects_unknown_scope() {
    let (_tmp, config_path) = setup_test_env("file");
    seed_one_book(&config_path, "1");
    let (_, _, success) = run_circ(&config_path, &["search", "gatsby", "--scope", "publisher"]);
    assert!(!success);
}

#[test]
fn test_review_sentiment_labels() {
    for backend in ["file", "sqlite"] {
        let (_tmp, config_path) = setup_test_env(backend);
        seed_one_book(&config_path, "1");

        let (stdout, _, success) = run_circ(
            &config_path,
            &[
                "review",
                "1",
                "--text",
                "I absolutely loved this book, wonderful!",
                "--rating",
                "5",
                "--borrower",
                "B0001",
            ],
        );
        assert!(success, "review failed ({}): {}", backend, stdout);
        assert!(stdout.contains("Review 1 added with positive sentiment."));

        let (stdout, _, success) = run_circ(
            &config_path,
            &[
                "review",
                "1",
                "--text",
                "Terrible, boring, waste of time",
                "--rating",
                "1",
            ],
        );
        assert!(success);
        assert!(stdout.contains("Review 2 added with negative sentiment."));

        let (stdout, _, success) = run_circ(&config_path, &["reviews", "1"]);
        assert!(success);
        assert!(stdout.contains("1: 5/5 [positive]"));
        assert!(stdout.contains("2: 1/5 [negative]"));
        assert!(stdout.contains("Sentiment: 1 positive, 1 negative, 0 neutral (2 total)"));
    }
}

#[test]
fn test_review_requires_existing_book() {
    let (_tmp, config_path) = setup_test_env("file");
    seed_one_book(&config_path, "1");
    let (_, stderr, success) = run_circ(
        &config_path,
        &["review", "9", "--text", "great", "--rating", "4"],
    );
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_review_rejects_out_of_range_rating() {
    let (_tmp, config_path) = setup_test_env("file");
    seed_one_book(&config_path, "1");
    let (_, stderr, success) = run_circ(
        &config_path,
        &["review", "1", "--text", "great", "--rating", "6"],
    );
    assert!(!success);
    assert!(stderr.contains("rating"), "stderr={}", stderr);
}

#[test]
fn test_update_book_keeps_loaned_count() {
    let (_tmp, config_path) = setup_test_env("file");
    seed_one_book(&config_path, "2");
    run_circ(&config_path, &["borrow", "1", "B0001"]);

    // 2 copies with 1 on loan, grown to 5 copies: 4 available.
    let (stdout, _, success) = run_circ(&config_path, &["update-book", "1", "--copies", "5"]);
    assert!(success, "update-book failed: {}", stdout);
    let (stdout, _, _) = run_circ(&config_path, &["books"]);
    assert!(stdout.contains("4/5 available"));
}

#[test]
fn test_delete_book_orphans_are_tolerated() {
    let (_tmp, config_path) = setup_test_env("sqlite");
    seed_one_book(&config_path, "1");
    run_circ(&config_path, &["borrow", "1", "B0001"]);

    let (stdout, _, success) = run_circ(&config_path, &["delete-book", "1"]);
    assert!(success, "delete-book failed: {}", stdout);

    // The loan still shows, against the deleted book id.
    let (stdout, _, success) = run_circ(&config_path, &["circulation"]);
    assert!(success);
    assert!(stdout.contains("(deleted book 1)"));

    // And the return still closes the transaction.
    let (stdout, _, success) = run_circ(&config_path, &["return", "1"]);
    assert!(success, "return after delete failed: {}", stdout);
    assert!(stdout.contains("Returned transaction 1."));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("absent.toml");
    let (_, stderr, success) = run_circ(&config_path, &["books"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
