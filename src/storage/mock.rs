use mockall::mock;

use super::{FileStorage, ImageUpload, StorageResult};

mock! {
    pub FileStorage {}

    impl FileStorage for FileStorage {
        fn put(&self, directory: &str, image: &ImageUpload) -> StorageResult<String>;
        fn delete(&self, path: &str) -> StorageResult<()>;
    }
}
