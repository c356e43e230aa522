use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(FileId);

/// Runtime values a declared action can be bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<FileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl FileContext {
    pub fn for_file(file_id: FileId, file_path: impl Into<String>) -> Self {
        Self {
            file_id: Some(file_id),
            file_path: Some(file_path.into()),
        }
    }

    pub fn with_file_id(mut self, file_id: FileId) -> Self {
        self.file_id = Some(file_id);
        self
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn value_for(&self, placeholder: Placeholder) -> Option<String> {
        match placeholder {
            Placeholder::FileId => self.file_id.map(|id| id.to_string()),
            Placeholder::FilePath => self.file_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    FileId,
    FilePath,
}

impl Placeholder {
    pub const ALL: [Placeholder; 2] = [Placeholder::FileId, Placeholder::FilePath];

    /// Name as it appears between braces in a template.
    pub fn name(self) -> &'static str {
        match self {
            Placeholder::FileId => "fileId",
            Placeholder::FilePath => "filePath",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}
