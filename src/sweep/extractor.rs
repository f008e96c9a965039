//! Field extraction from a rendered detail page
//!
//! Each field is read from a fixed location in the document through its own
//! lookup, so a missing cell costs one column, never the whole record. Only the
//! two identity fields can fail a record.

use crate::document::{compile_selector, Document};
use crate::record::{Field, Record, FIELD_COUNT};
use crate::sweep::SweepFailure;
use crate::SweepError;
use scraper::Selector;

/// Field → CSS location table for the property detail page
pub const DETAIL_PAGE_LOCATIONS: [(Field, &str); FIELD_COUNT] = [
    (Field::PropertyId, "td#ucidentification_webprop_id"),
    (Field::GeoId, "td#ucidentification_webprop_geoid"),
    (Field::OwnerName, "td#webprop_name"),
    (Field::MailingAddress, "td#webprop_mailaddress"),
    (Field::LegalDescription, "td#webprop_desc"),
    (Field::Situs, "td#webprop_situs"),
    (Field::Improvements, "td#histimp0_yr"),
    (Field::LandMarketValue, "td#histlnd0_yr"),
    (Field::TotalMarketValue, "td#histmkt0_yr"),
    (Field::TotalAssessedValue, "td#histassd0_yr"),
    (Field::LandCode, "tbody#tableLnd tr td"),
    (Field::TotalAcres, "tbody#tableLnd tr td:nth-of-type(2)"),
    (Field::LastDeedDate, "tbody#tableSale tr td:nth-of-type(4)"),
    (Field::SoldBy, "tbody#tableSale tr td:nth-of-type(1)"),
    (Field::DeedPages, "tbody#tableSale tr td:nth-of-type(3)"),
    (Field::DeedVolume, "tbody#tableSale tr td:nth-of-type(2)"),
    (Field::DeedInstruments, "tbody#tableSale tr td:nth-of-type(5)"),
];

/// Outcome of one field lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRead {
    /// The location exists and has text
    Found(String),
    /// The location exists but holds no text
    Empty,
    /// Nothing in the document matches the location
    Absent,
}

impl FieldRead {
    /// Text value of a non-identity field
    pub fn or_default(self) -> String {
        match self {
            Self::Found(text) => text,
            Self::Empty | Self::Absent => String::new(),
        }
    }
}

/// A successfully extracted record plus the fields that had to be defaulted
#[derive(Debug, Clone)]
pub struct Extracted {
    pub record: Record,
    /// Non-identity fields whose location was absent
    pub defaulted: Vec<Field>,
}

/// Maps a detail document to a [`Record`]
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    /// Indexed by `Field::index()`
    locations: Vec<Selector>,
}

impl FieldExtractor {
    /// Builds an extractor for the property detail page
    pub fn detail_page() -> Result<Self, SweepError> {
        Self::from_table(&DETAIL_PAGE_LOCATIONS)
    }

    /// Builds an extractor from a field → CSS table covering every field once
    pub fn from_table(table: &[(Field, &str)]) -> Result<Self, SweepError> {
        let mut slots: Vec<Option<Selector>> = vec![None; FIELD_COUNT];

        for (field, css) in table {
            let selector = compile_selector(css).map_err(|message| SweepError::Selector {
                selector: css.to_string(),
                message,
            })?;
            slots[field.index()] = Some(selector);
        }

        let locations = Field::ALL
            .iter()
            .zip(slots)
            .map(|(field, slot)| {
                slot.ok_or_else(|| SweepError::Selector {
                    selector: field.header().to_string(),
                    message: "no location configured for field".to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { locations })
    }

    /// Reads one field from the document
    pub fn read(&self, document: &Document, field: Field) -> FieldRead {
        match document.text_of(&self.locations[field.index()]) {
            Some(text) if !text.is_empty() => FieldRead::Found(text),
            Some(_) => FieldRead::Empty,
            None => FieldRead::Absent,
        }
    }

    /// Extracts a full record
    ///
    /// # Returns
    ///
    /// * `Ok(Extracted)` - Both identity fields were readable; every other
    ///   field holds its text or `""`
    /// * `Err(SweepFailure::IdentityMissing)` - Property ID or Geo ID is absent
    ///   or empty
    pub fn extract(&self, document: &Document) -> Result<Extracted, SweepFailure> {
        let property_id = self.read_identity(document, Field::PropertyId)?;
        let geo_id = self.read_identity(document, Field::GeoId)?;
        let mut record = Record::new(property_id, geo_id);
        let mut defaulted = Vec::new();

        for field in Field::ALL.into_iter().filter(|f| !f.is_identity()) {
            let read = self.read(document, field);
            if read == FieldRead::Absent {
                defaulted.push(field);
            }
            record.set(field, read.or_default());
        }

        Ok(Extracted { record, defaulted })
    }

    fn read_identity(&self, document: &Document, field: Field) -> Result<String, SweepFailure> {
        match self.read(document, field) {
            FieldRead::Found(text) => Ok(text),
            FieldRead::Empty | FieldRead::Absent => Err(SweepFailure::IdentityMissing(field)),
        }
    }
}
