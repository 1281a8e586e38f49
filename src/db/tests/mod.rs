use crate::config::Config;

use super::Database;


/// Open a fresh database in a tempdir with a small list batch size.
/// Returns the database and the tempdir (which must be kept alive).
pub(crate) async fn open_test_db() -> (Database, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_path: temp_dir.path().join("test.db"),
        list_batch_size: 2,
        ..Config::default()
    };
    let db = Database::new(&config).await.unwrap();
    (db, temp_dir)
}
