use crate::model::TemplateRecord;
use crate::render::{build_rendering, Rendering};

pub const NOT_FOUND_TITLE: &str = "Template Not Found";
pub const NOT_FOUND_MESSAGE: &str = "The requested template could not be loaded.";

/// Detail-page state, built from whatever the selection store handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailSession {
    Found {
        record: TemplateRecord,
        rendering: Rendering,
    },
    /// Nothing stored, or the stored value could not be parsed.
    NotFound,
}

impl DetailSession {
    pub fn open(stored: Option<TemplateRecord>) -> Self {
        match stored {
            Some(record) => {
                let rendering = build_rendering(&record);
                Self::Found { record, rendering }
            }
            None => Self::NotFound,
        }
    }

    pub fn rendering_mut(&mut self) -> Option<&mut Rendering> {
        match self {
            Self::Found { rendering, .. } => Some(rendering),
            Self::NotFound => None,
        }
    }
}
