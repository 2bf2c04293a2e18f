//! Knowledge corpus — category-keyed snippet lookup.
//!
//! The pipeline treats this as a read-only table: one collection of text
//! snippets per category. Snippets come either from the built-in default
//! set or from a data directory with one folder of `.txt` documents per
//! category (`billing_docs/`, `technical_docs/`, ...).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::pipeline::state::Category;

/// Read-only snippet corpus keyed by category.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    docs: HashMap<Category, Vec<String>>,
}

impl KnowledgeStore {
    /// The built-in default corpus.
    pub fn builtin() -> Self {
        let mut docs = HashMap::new();
        docs.insert(
            Category::Billing,
            to_strings(&[
                "Billing guide: invoices and refunds.",
                "How to update payment method.",
                "Refund policy and processing times.",
                "Subscription management and billing cycles.",
            ]),
        );
        docs.insert(
            Category::Technical,
            to_strings(&[
                "Technical guide: troubleshooting server 500 errors.",
                "API error handling and logs.",
                "Common connection problems and solutions.",
                "Performance optimization tips.",
                "System requirements and compatibility.",
            ]),
        );
        docs.insert(
            Category::Security,
            to_strings(&[
                "Security guide: change password and enable 2FA.",
                "Incident response playbook.",
                "Account protection best practices.",
                "Data encryption and privacy policy.",
            ]),
        );
        docs.insert(
            Category::General,
            to_strings(&[
                "General FAQ and office hours info.",
                "Support contact details.",
                "Product documentation and user guides.",
                "Company policies and service level agreements.",
            ]),
        );
        Self { docs }
    }

    /// Build a store from an explicit snippet list for a single category.
    pub fn with_snippets(category: Category, snippets: Vec<String>) -> Self {
        let mut docs = HashMap::new();
        docs.insert(category, snippets);
        Self { docs }
    }

    /// Load a store from a data directory with one folder per category.
    ///
    /// Files are read in sorted filename order so corpus order (and with it
    /// retrieval tie-breaking) is deterministic. Missing folders yield empty
    /// categories, never an error.
    pub async fn load_from_dir(base: &Path) -> Result<Self, StoreError> {
        let mut docs = HashMap::new();
        for category in Category::ALL {
            let dir = base.join(Self::category_dir(category));
            let snippets = load_txt_files(&dir).await?;
            debug!(
                category = category.as_str(),
                count = snippets.len(),
                dir = %dir.display(),
                "Loaded category documents"
            );
            docs.insert(category, snippets);
        }
        Ok(Self { docs })
    }

    /// Snippets for a category, in corpus order. Empty for unknown/empty
    /// categories.
    pub fn snippets(&self, category: Category) -> &[String] {
        self.docs.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether every category is empty.
    pub fn is_empty(&self) -> bool {
        self.docs.values().all(Vec::is_empty)
    }

    /// Folder name for a category under the data directory.
    pub fn category_dir(category: Category) -> &'static str {
        match category {
            Category::Billing => "billing_docs",
            Category::Technical => "technical_docs",
            Category::Security => "security_docs",
            Category::General => "general_docs",
        }
    }

    /// Copy a document into the right category folder.
    pub async fn ingest(base: &Path, src: &Path, category: Category) -> Result<PathBuf, StoreError> {
        let dest_dir = base.join(Self::category_dir(category));
        fs::create_dir_all(&dest_dir).await?;
        let file_name = src.file_name().ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a file path: {}", src.display()),
            ))
        })?;
        let dest = dest_dir.join(file_name);
        fs::copy(src, &dest).await?;
        info!(src = %src.display(), dest = %dest.display(), "Ingested document");
        Ok(dest)
    }

    /// Write one example document per category — a starting point for a
    /// fresh deployment's data directory.
    pub async fn seed_demo(base: &Path) -> Result<(), StoreError> {
        for category in Category::ALL {
            let dir = base.join(Self::category_dir(category));
            fs::create_dir_all(&dir).await?;
            let file = dir.join(format!("{}_example.txt", category.as_str().to_lowercase()));
            fs::write(
                &file,
                format!("This is a {} example document for retrieval.", category),
            )
            .await?;
        }
        Ok(())
    }
}

fn to_strings(snippets: &[&str]) -> Vec<String> {
    snippets.iter().map(|s| s.to_string()).collect()
}

async fn load_txt_files(dir: &Path) -> Result<Vec<String>, StoreError> {
    if !fs::try_exists(dir).await? {
        return Ok(Vec::new());
    }

    let mut entries = fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut snippets = Vec::with_capacity(paths.len());
    for path in paths {
        snippets.push(fs::read_to_string(&path).await?);
    }
    Ok(snippets)
}
