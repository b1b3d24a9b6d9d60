//! RAII test infrastructure for the flat-file store.
//!
//! Every test gets its own temporary data directory that is removed when
//! the helper is dropped, even if the test panics.

use super::connection::CsvConnection;
use super::menu_repository::MenuRepository;
use super::order_repository::OrderRepository;
use anyhow::Result;
use tempfile::TempDir;

pub struct TestEnvironment {
    pub connection: CsvConnection,
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Self::with_max_backups(30)
    }

    pub fn with_max_backups(max_backups: usize) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path(), max_backups)?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }
}

pub struct TestHelper {
    pub env: TestEnvironment,
    pub menu_repo: MenuRepository,
    pub order_repo: OrderRepository,
}

impl TestHelper {
    pub fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;
        let menu_repo = MenuRepository::new(env.connection.clone());
        let order_repo = OrderRepository::new(env.connection.clone());
        Ok(Self {
            env,
            menu_repo,
            order_repo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_is_cleaned_up_on_drop() -> Result<()> {
        let base_path;
        {
            let env = TestEnvironment::new()?;
            base_path = env.base_path.clone();
            assert!(base_path.exists());
        }
        assert!(!base_path.exists());
        Ok(())
    }
}
