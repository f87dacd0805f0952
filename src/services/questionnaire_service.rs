use crate::models::{QuestionnaireRequest, COLUMNS, EMAIL_COLUMN, SHEET_NAME};
use crate::spreadsheet::{Book, Sheet};
use crate::storage::{ObjectStore, XLSX_CONTENT_TYPE};
use crate::utils::AppError;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated { row: usize },
    Appended { row: usize },
}

/// Questionnaire responses kept as rows of one workbook object.
pub struct ResponseStore {
    store: Arc<dyn ObjectStore>,
    key: String,
    // Serializes load → mutate → save within this process
    write_lock: Mutex<()>,
}

impl ResponseStore {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Writes `response` into the row keyed on `email`, creating the workbook
    /// (with its header) on first use. Other worksheets are written back
    /// untouched.
    pub async fn upsert(
        &self,
        email: &str,
        response: &QuestionnaireRequest,
    ) -> Result<UpsertOutcome, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut book = self.load_book().await?;
        let sheet = book
            .sheet_mut(SHEET_NAME)
            .ok_or_else(|| AppError::WorkbookError(format!("{} missing after load", SHEET_NAME)))?;
        let row = response.to_row(email);

        let outcome = match sheet.find_row(EMAIL_COLUMN, email) {
            Some(index) => {
                sheet.overwrite_row(index, row);
                log::info!("📝 Updated existing row {} for email: {}", index + 1, email);
                UpsertOutcome::Updated { row: index }
            }
            None => {
                let index = sheet.append_row(row);
                log::info!("➕ Added new row {} for email: {}", index + 1, email);
                UpsertOutcome::Appended { row: index }
            }
        };

        let bytes = book.to_xlsx(SHEET_NAME, &COLUMNS)?;
        self.store.put(&self.key, bytes, XLSX_CONTENT_TYPE).await?;
        log::info!("✅ Uploaded updated workbook to {}", self.key);

        Ok(outcome)
    }

    /// Current workbook, guaranteed to hold a non-blank `Sheet1`.
    ///
    /// A missing object or a workbook without `Sheet1` yields a fresh
    /// workbook with only the header row; a blank `Sheet1` gets the header
    /// written into it and the remaining sheets are kept.
    pub async fn load_book(&self) -> Result<Book, AppError> {
        let Some(bytes) = self.store.get(&self.key).await? else {
            log::info!("ℹ️  {} does not exist. Creating a new workbook.", self.key);
            return Ok(Book::with_sheet(SHEET_NAME, Sheet::with_header(&COLUMNS)));
        };

        let mut book = Book::from_xlsx(&bytes)?;
        match book.sheet(SHEET_NAME) {
            Some(sheet) if !sheet.is_empty() => {}
            Some(_) => {
                log::warn!("⚠️  {} in {} is blank. Writing headers.", SHEET_NAME, self.key);
                book.set_sheet(SHEET_NAME, Sheet::with_header(&COLUMNS));
            }
            None => {
                log::warn!(
                    "⚠️  {} not found in {}. Creating a new workbook with headers (dropping sheets: {:?}).",
                    SHEET_NAME,
                    self.key,
                    book.sheet_names()
                );
                book = Book::with_sheet(SHEET_NAME, Sheet::with_header(&COLUMNS));
            }
        }

        Ok(book)
    }

    #[cfg(test)]
    pub async fn load_sheet(&self) -> Result<Sheet, AppError> {
        let book = self.load_book().await?;
        Ok(book.sheet(SHEET_NAME).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;

    /// Object store whose reads or writes always fail.
    pub struct FailingObjectStore {
        pub fail_reads: bool,
    }

    #[async_trait]
    impl ObjectStore for FailingObjectStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, AppError> {
            if self.fail_reads {
                Err(AppError::StorageError("AccessDenied".to_string()))
            } else {
                Ok(None)
            }
        }

        async fn put(&self, _key: &str, _body: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
            Err(AppError::StorageError("SlowDown".to_string()))
        }
    }
}
