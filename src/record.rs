//! The fixed-shape property record
//!
//! A [`Record`] carries exactly one string value per [`Field`], in the fixed
//! column order of the output file. Values are opaque normalized text; currency
//! and date columns are passed through unparsed.

use std::fmt;

/// Number of columns in a record
pub const FIELD_COUNT: usize = 17;

/// One column of the output store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PropertyId,
    GeoId,
    OwnerName,
    MailingAddress,
    LegalDescription,
    Situs,
    Improvements,
    LandMarketValue,
    TotalMarketValue,
    TotalAssessedValue,
    LandCode,
    TotalAcres,
    LastDeedDate,
    SoldBy,
    DeedPages,
    DeedVolume,
    DeedInstruments,
}

impl Field {
    /// All fields in output column order
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::PropertyId,
        Field::GeoId,
        Field::OwnerName,
        Field::MailingAddress,
        Field::LegalDescription,
        Field::Situs,
        Field::Improvements,
        Field::LandMarketValue,
        Field::TotalMarketValue,
        Field::TotalAssessedValue,
        Field::LandCode,
        Field::TotalAcres,
        Field::LastDeedDate,
        Field::SoldBy,
        Field::DeedPages,
        Field::DeedVolume,
        Field::DeedInstruments,
    ];

    /// Returns the header name used in the output file
    pub fn header(&self) -> &'static str {
        match self {
            Self::PropertyId => "Property ID",
            Self::GeoId => "Geo ID",
            Self::OwnerName => "Owner Name",
            Self::MailingAddress => "Mailing Address",
            Self::LegalDescription => "Legal Description",
            Self::Situs => "Situs",
            Self::Improvements => "Improvements",
            Self::LandMarketValue => "Land Market Value",
            Self::TotalMarketValue => "Total Market Value",
            Self::TotalAssessedValue => "Total Assessed Value",
            Self::LandCode => "Land Code",
            Self::TotalAcres => "Total Acres",
            Self::LastDeedDate => "Last Deed Date",
            Self::SoldBy => "Sold By",
            Self::DeedPages => "Deed Pages",
            Self::DeedVolume => "Deed Volume",
            Self::DeedInstruments => "Deed Instruments",
        }
    }

    /// Returns true for the fields whose absence invalidates the whole record
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::PropertyId | Self::GeoId)
    }

    /// Position of this field in the output row
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Header row of the output store
pub fn header_row() -> [&'static str; FIELD_COUNT] {
    Field::ALL.map(|field| field.header())
}

/// One extracted property record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: [String; FIELD_COUNT],
}

impl Record {
    /// Creates a record with both identity fields set and every other field empty
    pub fn new(property_id: impl Into<String>, geo_id: impl Into<String>) -> Self {
        let mut record = Self::default();
        record.set(Field::PropertyId, property_id);
        record.set(Field::GeoId, geo_id);
        record
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn property_id(&self) -> &str {
        self.get(Field::PropertyId)
    }

    pub fn geo_id(&self) -> &str {
        self.get(Field::GeoId)
    }

    /// Values in output column order
    pub fn values(&self) -> &[String; FIELD_COUNT] {
        &self.values
    }
}
