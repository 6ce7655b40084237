//! Customer details and payment methods collected during checkout.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RequiredField, ValidationError};
use crate::money::{decimal_comma, Money};

/// Who is ordering and where to deliver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub phone: String,
    /// Street.
    pub address: String,
    /// House or building number.
    pub number: String,
    pub neighborhood: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    /// Landmark to help the courier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl PersonalInfo {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
        number: impl Into<String>,
        neighborhood: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
            number: number.into(),
            neighborhood: neighborhood.into(),
            complement: None,
            reference: None,
        }
    }

    /// Every required field present and not blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<RequiredField> = [
            (RequiredField::Name, &self.name),
            (RequiredField::Phone, &self.phone),
            (RequiredField::Address, &self.address),
            (RequiredField::Number, &self.number),
            (RequiredField::Neighborhood, &self.neighborhood),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(missing))
        }
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// Address on one line, e.g. "Rua A, 10 - Apto 2, Centro".
    pub fn one_line_address(&self) -> String {
        let mut line = format!("{}, {}", self.address.trim(), self.number.trim());
        if let Some(complement) = self.complement.as_deref().filter(|c| !c.trim().is_empty()) {
            line.push_str(" - ");
            line.push_str(complement.trim());
        }
        line.push_str(", ");
        line.push_str(self.neighborhood.trim());
        line
    }
}

/// How the customer pays on delivery or pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash, optionally with the note the courier should bring change for.
    Cash {
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            with = "optional_decimal_comma"
        )]
        change_for: Option<Money>,
    },
    Pix,
    CreditCard,
    DebitCard,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash { .. } => "cash",
            PaymentMethod::Pix => "pix",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Cash { .. } => "Cash",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::CreditCard => "Credit card",
            PaymentMethod::DebitCard => "Debit card",
        }
    }

    /// Parse the short name used on the command line and in scenario files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash { change_for: None }),
            "pix" => Some(PaymentMethod::Pix),
            "credit_card" | "credit" => Some(PaymentMethod::CreditCard),
            "debit_card" | "debit" => Some(PaymentMethod::DebitCard),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash {
                change_for: Some(amount),
            } => write!(f, "{} (change for {})", self.display_name(), amount),
            _ => f.write_str(self.display_name()),
        }
    }
}

mod optional_decimal_comma {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{decimal_comma, Money};

    pub fn serialize<S: Serializer>(value: &Option<Money>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(money) => decimal_comma::serialize(money, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Money>, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(v) => Money::from_json(&v)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid monetary amount: {v}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PersonalInfo {
        PersonalInfo::new("Ana", "11 99999-0000", "Rua das Flores", "10", "Centro")
    }

    #[test]
    fn test_complete_info_validates() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_blank_fields_are_missing() {
        let mut info = complete();
        info.phone = "   ".to_string();
        info.number.clear();

        let err = info.validate().unwrap_err();
        assert_eq!(err.missing, vec![RequiredField::Phone, RequiredField::Number]);
        assert!(!info.is_complete());
    }

    #[test]
    fn test_optional_fields_not_required() {
        let info = complete();
        assert!(info.complement.is_none());
        assert!(info.is_complete());
    }

    #[test]
    fn test_one_line_address() {
        let mut info = complete();
        assert_eq!(info.one_line_address(), "Rua das Flores, 10, Centro");
        info.complement = Some("Apto 2".to_string());
        assert_eq!(info.one_line_address(), "Rua das Flores, 10 - Apto 2, Centro");
    }

    #[test]
    fn test_payment_method_wire_format() {
        let cash = PaymentMethod::Cash {
            change_for: Some(Money::from_cents(5000)),
        };
        let json = serde_json::to_value(&cash).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "cash", "change_for": "50,00" }));
        assert_eq!(serde_json::from_value::<PaymentMethod>(json).unwrap(), cash);

        let pix = serde_json::to_value(PaymentMethod::Pix).unwrap();
        assert_eq!(pix, serde_json::json!({ "type": "pix" }));

        let plain: PaymentMethod = serde_json::from_str(r#"{"type":"cash"}"#).unwrap();
        assert_eq!(plain, PaymentMethod::Cash { change_for: None });
    }

    #[test]
    fn test_payment_method_from_name() {
        assert_eq!(PaymentMethod::from_name("PIX"), Some(PaymentMethod::Pix));
        assert_eq!(PaymentMethod::from_name("credit"), Some(PaymentMethod::CreditCard));
        assert_eq!(PaymentMethod::from_name("cheque"), None);
    }
}
