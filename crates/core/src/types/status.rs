//! Status enums for orders and the API connection.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Payment status of an order.
///
/// The API stores free-form strings; the three known values are modelled
/// explicitly and anything else is preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PaymentStatus {
    /// Payment received. Requires a "paid to" recipient at checkout.
    Paid,
    /// Not yet paid.
    #[default]
    Unpaid,
    /// Customer pays the courier on delivery.
    CashOnDelivery,
    /// A status this client does not know about.
    Other(String),
}

impl PaymentStatus {
    /// The wire representation used by the API.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Other(other) => other,
        }
    }

    fn from_wire(value: &str) -> Self {
        match value {
            "Paid" => Self::Paid,
            "Unpaid" => Self::Unpaid,
            "Cash on Delivery" => Self::CashOnDelivery,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    /// Lenient parser for user input (`paid`, `unpaid`, `cod`,
    /// `cash-on-delivery`, ...). Unknown values are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "paid" => Ok(Self::Paid),
            "unpaid" => Ok(Self::Unpaid),
            "cod" | "cash on delivery" => Ok(Self::CashOnDelivery),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&value))
    }
}

/// Reachability of the external API as reported by `/api/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    /// The API answered and reported itself healthy.
    Connected,
    /// The API answered but did not report `healthy`.
    Disconnected,
    /// The API could not be reached.
    Offline,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Offline => write!(f, "Offline"),
        }
    }
}
