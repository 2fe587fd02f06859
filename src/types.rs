/// Shared enums used across models, storage and handlers
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted string is not a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Account role carried in the JWT and enforced by the route guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Partner,
    Admin,
}

string_enum!(Role, "role", {
    Client => "client",
    Partner => "partner",
    Admin => "admin",
});

/// Service categories a partner offers and an inquiry asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Wedding,
    Portrait,
    Commercial,
    Event,
    Maternity,
    Product,
}

string_enum!(ServiceCategory, "service category", {
    Wedding => "wedding",
    Portrait => "portrait",
    Commercial => "commercial",
    Event => "event",
    Maternity => "maternity",
    Product => "product",
});

/// Admin-controlled partner state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

string_enum!(VerificationStatus, "verification status", {
    Pending => "pending",
    Verified => "verified",
    Rejected => "rejected",
});

/// Inquiry lifecycle: new -> responded -> booked -> closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    New,
    Responded,
    Booked,
    Closed,
}

string_enum!(InquiryStatus, "inquiry status", {
    New => "new",
    Responded => "responded",
    Booked => "booked",
    Closed => "closed",
});

impl InquiryStatus {
    fn rank(&self) -> u8 {
        match self {
            InquiryStatus::New => 0,
            InquiryStatus::Responded => 1,
            InquiryStatus::Booked => 2,
            InquiryStatus::Closed => 3,
        }
    }

    /// Status only moves forward; staying put is allowed and means "no change"
    pub fn can_transition_to(&self, next: InquiryStatus) -> bool {
        next.rank() >= self.rank()
    }

    /// Open leads still count against a partner's workload
    pub fn is_open(&self) -> bool {
        matches!(self, InquiryStatus::New | InquiryStatus::Responded)
    }

    /// Statuses an assigned partner is allowed to request
    pub fn settable_by_partner(&self) -> bool {
        !matches!(self, InquiryStatus::New)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_variants() {
        for category in ServiceCategory::ALL {
            assert_eq!(category.as_str().parse::<ServiceCategory>().unwrap(), *category);
        }
        assert_eq!("booked".parse::<InquiryStatus>().unwrap(), InquiryStatus::Booked);
        assert_eq!(Role::Admin.to_string(), "admin");

        let err = "wizard".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "invalid role 'wizard'");
    }

    #[test]
    fn inquiry_status_moves_forward_only() {
        use InquiryStatus::*;

        assert!(New.can_transition_to(Responded));
        assert!(New.can_transition_to(Booked));
        assert!(New.can_transition_to(Closed));
        assert!(Responded.can_transition_to(Booked));
        assert!(Booked.can_transition_to(Closed));
        assert!(Closed.can_transition_to(Closed));

        assert!(!Responded.can_transition_to(New));
        assert!(!Booked.can_transition_to(Responded));
        assert!(!Closed.can_transition_to(Booked));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&VerificationStatus::Verified).unwrap();
        assert_eq!(json, "\"verified\"");
        let parsed: ServiceCategory = serde_json::from_str("\"maternity\"").unwrap();
        assert_eq!(parsed, ServiceCategory::Maternity);
    }
}
