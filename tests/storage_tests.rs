use edugo_web::{
    StorageError,
    storage::{FileStorage, MemoryStorage, SessionStorage},
};
use std::fs;
use tempfile::TempDir;

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[test]
    fn test_memory_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.get("token").unwrap(), None);

        storage.set("token", "abc").unwrap();
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.len(), 1);

        storage.set("token", "def").unwrap();
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("def"));

        storage.remove("token").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_remove_missing_is_ok() {
        let storage = MemoryStorage::new();
        assert!(storage.remove("role").is_ok());
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_file_storage_lives_in_session_dir() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        assert_eq!(storage.path(), dir.path().join(FileStorage::FILE_NAME));
    }

    #[test]
    fn test_file_missing_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::in_dir(dir.path().join("not-created-yet"));
        assert_eq!(storage.get("token").unwrap(), None);
        // Removing from a file that does not exist must not create it.
        storage.remove("token").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_values_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        {
            let storage = FileStorage::in_dir(dir.path());
            storage.set("token", "persisted").unwrap();
            storage.set("role", "teacher").unwrap();
        }

        let reopened = FileStorage::in_dir(dir.path());
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("persisted"));
        assert_eq!(reopened.get("role").unwrap().as_deref(), Some("teacher"));

        reopened.remove("token").unwrap();
        let again = FileStorage::in_dir(dir.path());
        assert_eq!(again.get("token").unwrap(), None);
        assert_eq!(again.get("role").unwrap().as_deref(), Some("teacher"));
    }

    #[test]
    fn test_file_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::in_dir(&nested);
        storage.set("token", "abc").unwrap();
        assert!(nested.join(FileStorage::FILE_NAME).is_file());
    }

    #[test]
    fn test_file_corrupt_reports_on_read_and_is_replaced_on_write() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        fs::write(storage.path(), "{ not json").unwrap();

        let err = storage.get("token").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));

        storage.set("token", "fresh").unwrap();
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_file_empty_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::in_dir(dir.path());
        fs::write(storage.path(), "").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
    }
}
