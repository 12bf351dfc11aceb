//! Reference data (lookup table) models.

use serde::{Deserialize, Serialize};

use folio_core::{ReferenceDataId, ReferenceDataType};

/// One entry in the shared lookup table.
///
/// Books and offers reference these rows for their type, condition,
/// genre, and publisher instead of storing free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDataItem {
    /// Unique entry ID.
    pub id: ReferenceDataId,
    /// Which lookup category the entry belongs to.
    pub data_type: ReferenceDataType,
    /// Display value, e.g. "Hardcover" or "Science Fiction".
    pub value: String,
}

/// Filter criteria for listing reference data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceDataFilters {
    /// Restrict to one lookup category.
    pub data_type: Option<ReferenceDataType>,
}

impl ReferenceDataFilters {
    /// True when `item` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, item: &ReferenceDataItem) -> bool {
        self.data_type
            .is_none_or(|data_type| item.data_type == data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_match_everything() {
        let item = ReferenceDataItem {
            id: ReferenceDataId::new(1),
            data_type: ReferenceDataType::Genre,
            value: "Fantasy".to_string(),
        };
        assert!(ReferenceDataFilters::default().matches(&item));
    }

    #[test]
    fn test_data_type_filter() {
        let item = ReferenceDataItem {
            id: ReferenceDataId::new(1),
            data_type: ReferenceDataType::Genre,
            value: "Fantasy".to_string(),
        };

        let filters = ReferenceDataFilters {
            data_type: Some(ReferenceDataType::Genre),
        };
        assert!(filters.matches(&item));

        let filters = ReferenceDataFilters {
            data_type: Some(ReferenceDataType::Publisher),
        };
        assert!(!filters.matches(&item));
    }
}
