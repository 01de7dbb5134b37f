use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id_newtype!(SessionId);

/// Business vertical an uploaded dataset belongs to. Selects the backend
/// model and the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Supermarket,
    Telecom,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Supermarket, Domain::Telecom];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Supermarket => "supermarket",
            Domain::Telecom => "telecom",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Domain::Supermarket => "Supermarket",
            Domain::Telecom => "Telecommunications",
        }
    }

    pub fn features(self) -> &'static [&'static str] {
        match self {
            Domain::Supermarket => &[
                "Invoice number analysis",
                "Duplicate transaction detection",
                "Product category insights",
                "Customer behavior patterns",
                "Sales amount validation",
            ],
            Domain::Telecom => &[
                "Billing amount validation",
                "Plan category analysis",
                "Zone area insights",
                "Payment status tracking",
                "Service usage patterns",
            ],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "supermarket" => Ok(Domain::Supermarket),
            "telecom" => Ok(Domain::Telecom),
            other => Err(UnknownVariant::new("domain", other)),
        }
    }
}

/// Which generated report a caller asks the backend for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportVariant {
    #[default]
    Comprehensive,
    Detailed,
}

impl FromStr for ReportVariant {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "comprehensive" | "domain" => Ok(ReportVariant::Comprehensive),
            "detailed" => Ok(ReportVariant::Detailed),
            other => Err(UnknownVariant::new("report variant", other)),
        }
    }
}
