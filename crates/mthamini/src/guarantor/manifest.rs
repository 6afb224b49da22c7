use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use super::domain::{DocumentRef, FormContext, GuarantorEntry};
use super::navigation::WizardRoutes;
use super::session::GuarantorFormSession;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read guarantor manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid guarantor manifest CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unable to read document {}: {source}", .path.display())]
    Document {
        row: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Guarantor entries loaded from a CSV manifest; document cells are paths relative
/// to the manifest's directory.
#[derive(Debug, Clone, Default)]
pub struct GuarantorManifest {
    entries: Vec<GuarantorEntry>,
}

impl GuarantorManifest {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, &base_dir)
    }

    pub fn from_reader<R: Read>(reader: R, base_dir: &Path) -> Result<Self, ManifestError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut entries = Vec::new();

        for (position, record) in csv_reader.deserialize::<ManifestRow>().enumerate() {
            let row = record?;
            // Header is line 1.
            entries.push(row.into_entry(position + 2, base_dir)?);
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[GuarantorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_session(self, context: FormContext, routes: WizardRoutes) -> GuarantorFormSession {
        GuarantorFormSession::with_entries(context, routes, self.entries)
    }
}

#[derive(Debug, Deserialize)]
struct ManifestRow {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    national_id_front: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    national_id_back: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    letter_file: Option<String>,
}

impl ManifestRow {
    fn into_entry(self, row: usize, base_dir: &Path) -> Result<GuarantorEntry, ManifestError> {
        let load = |cell: Option<String>| -> Result<Option<DocumentRef>, ManifestError> {
            cell.map(|relative| {
                let path = base_dir.join(relative);
                DocumentRef::from_path(&path)
                    .map_err(|source| ManifestError::Document { row, path, source })
            })
            .transpose()
        };

        Ok(GuarantorEntry {
            national_id_front: load(self.national_id_front)?,
            national_id_back: load(self.national_id_back)?,
            letter_file: load(self.letter_file)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
