use crate::bank::Bank;

use super::{Repository, RepositoryError};

/// Keeps the last saved state in memory and counts saves.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    pub state: Option<Bank>,
    pub saves: usize,
}

impl InMemoryRepository {
    pub fn with_state(bank: Bank) -> Self {
        Self {
            state: Some(bank),
            saves: 0,
        }
    }
}

impl Repository for InMemoryRepository {
    fn load(&mut self) -> Result<Option<Bank>, RepositoryError> {
        Ok(self.state.clone())
    }

    fn save(&mut self, bank: &Bank) -> Result<(), RepositoryError> {
        self.state = Some(bank.clone());
        self.saves += 1;
        Ok(())
    }
}
