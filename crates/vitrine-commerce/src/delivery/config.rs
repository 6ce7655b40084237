//! Delivery configuration schemas and normalization.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ConfigParseError;
use crate::money::Money;

const FEE: &str = "taxa_entrega";
const MINIMUM: &str = "pedido_minimo";
const ENABLED: &str = "mostrar_info_delivery";
const RESTRICT: &str = "especificar_bairros_atendidos";
const NEIGHBORHOODS: &str = "bairros_atendidos";
const KNOWN_FIELDS: [&str; 5] = [FEE, MINIMUM, ENABLED, RESTRICT, NEIGHBORHOODS];

/// Delivery fields as the backend sends them.
///
/// Values are kept as raw JSON because stores have saved them with mixed
/// types over time (`"5,00"`, `5`, `"true"`, `true`). A field that was absent
/// is `None`; a field sent as `null` is `Some(Value::Null)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliverySettings {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub taxa_entrega: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub pedido_minimo: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub mostrar_info_delivery: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub especificar_bairros_atendidos: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub bairros_atendidos: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// A store's delivery configuration in one of the two backend schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryConfig {
    /// Fields nested under a `delivery` object.
    Legacy(DeliverySettings),
    /// Fields at the top level of the document.
    Modern(DeliverySettings),
}

impl DeliveryConfig {
    /// Recognize the schema of a company document.
    ///
    /// Discrimination is structural: a `delivery` object carrying any known
    /// field is the legacy schema, known fields at the top level are the
    /// modern schema. An empty `delivery` object with no top-level fields is
    /// read as legacy with every field absent.
    pub fn from_value(value: &Value) -> Result<Self, ConfigParseError> {
        let Some(root) = value.as_object() else {
            return Err(ConfigParseError(format!("expected an object, got {}", kind(value))));
        };

        let nested = root.get("delivery").and_then(Value::as_object);

        if let Some(nested) = nested.filter(|n| has_known_field(n)) {
            return Ok(DeliveryConfig::Legacy(settings_from(nested)?));
        }
        if has_known_field(root) {
            return Ok(DeliveryConfig::Modern(settings_from(root)?));
        }
        if let Some(nested) = nested {
            return Ok(DeliveryConfig::Legacy(settings_from(nested)?));
        }

        Err(ConfigParseError(
            "no delivery fields found at the top level or under `delivery`".to_string(),
        ))
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigParseError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigParseError(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Recognize and normalize in one go. Never fails: an unrecognized
    /// document yields [`NormalizedDeliveryConfig::disabled`].
    pub fn normalize_value(value: &Value) -> NormalizedDeliveryConfig {
        match Self::from_value(value) {
            Ok(config) => config.normalize(),
            Err(err) => {
                warn!(error = %err, "falling back to no delivery");
                NormalizedDeliveryConfig::disabled()
            }
        }
    }

    pub fn settings(&self) -> &DeliverySettings {
        match self {
            DeliveryConfig::Legacy(s) | DeliveryConfig::Modern(s) => s,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, DeliveryConfig::Legacy(_))
    }

    /// Convert to the single internal representation.
    ///
    /// Monetary fields that are missing, unparsable or negative become zero.
    /// Delivery counts as enabled when `mostrar_info_delivery` is absent.
    pub fn normalize(&self) -> NormalizedDeliveryConfig {
        let s = self.settings();

        let fee = money_or_zero(s.taxa_entrega.as_ref());
        let minimum_order = money_or_zero(s.pedido_minimo.as_ref());
        let delivery_enabled = s.mostrar_info_delivery.as_ref().map_or(true, truthy);
        let restricted = s.especificar_bairros_atendidos.as_ref().is_some_and(truthy);
        let restricted_neighborhoods =
            restricted.then(|| neighborhoods(s.bairros_atendidos.as_ref()));

        let normalized = NormalizedDeliveryConfig {
            fee,
            minimum_order,
            delivery_enabled,
            restricted_neighborhoods,
        };
        debug!(legacy = self.is_legacy(), ?normalized, "normalized delivery config");
        normalized
    }

    /// The document as the backend would send it.
    pub fn to_value(&self) -> Value {
        let settings = serde_json::to_value(self.settings())
            .unwrap_or_else(|_| Value::Object(Map::new()));
        match self {
            DeliveryConfig::Legacy(_) => serde_json::json!({ "delivery": settings }),
            DeliveryConfig::Modern(_) => settings,
        }
    }
}

impl From<NormalizedDeliveryConfig> for DeliveryConfig {
    /// Express a normalized config in the modern schema.
    fn from(config: NormalizedDeliveryConfig) -> Self {
        let restricted = config.restricted_neighborhoods.is_some();
        DeliveryConfig::Modern(DeliverySettings {
            taxa_entrega: Some(Value::String(config.fee.to_decimal_comma())),
            pedido_minimo: Some(Value::String(config.minimum_order.to_decimal_comma())),
            mostrar_info_delivery: Some(Value::Bool(config.delivery_enabled)),
            especificar_bairros_atendidos: Some(Value::Bool(restricted)),
            bairros_atendidos: config
                .restricted_neighborhoods
                .map(|list| Value::Array(list.into_iter().map(Value::String).collect())),
        })
    }
}

/// Delivery rules of a store, independent of the schema they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDeliveryConfig {
    pub fee: Money,
    /// Zero means no minimum.
    pub minimum_order: Money,
    pub delivery_enabled: bool,
    /// `None` when the store delivers everywhere.
    pub restricted_neighborhoods: Option<Vec<String>>,
}

impl NormalizedDeliveryConfig {
    /// Delivery disabled, no fee, no minimum.
    pub fn disabled() -> Self {
        Self {
            fee: Money::zero(),
            minimum_order: Money::zero(),
            delivery_enabled: false,
            restricted_neighborhoods: None,
        }
    }

    /// Delivery everywhere with the given fee and minimum.
    pub fn enabled(fee: Money, minimum_order: Money) -> Self {
        Self {
            fee,
            minimum_order,
            delivery_enabled: true,
            restricted_neighborhoods: None,
        }
    }

    /// Restrict delivery to a list of neighborhoods.
    pub fn with_neighborhoods<I, S>(mut self, neighborhoods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restricted_neighborhoods = Some(neighborhoods.into_iter().map(Into::into).collect());
        self
    }
}

impl Default for NormalizedDeliveryConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

fn settings_from(fields: &Map<String, Value>) -> Result<DeliverySettings, ConfigParseError> {
    serde_json::from_value(Value::Object(fields.clone()))
        .map_err(|e| ConfigParseError(e.to_string()))
}

fn has_known_field(fields: &Map<String, Value>) -> bool {
    KNOWN_FIELDS.iter().any(|k| fields.contains_key(*k))
}

fn money_or_zero(value: Option<&Value>) -> Money {
    value
        .and_then(Money::from_json)
        .filter(|m| !m.is_negative())
        .unwrap_or_default()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}

fn neighborhoods(value: Option<&Value>) -> Vec<String> {
    let names: Vec<String> = match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => o.get("nome").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_schema() {
        let raw = json!({
            "nome": "Padaria Central",
            "delivery": {
                "taxa_entrega": "5,00",
                "pedido_minimo": "20,00",
                "mostrar_info_delivery": true,
                "especificar_bairros_atendidos": true,
                "bairros_atendidos": ["Centro", " Boa Vista ", ""]
            }
        });
        let config = DeliveryConfig::from_value(&raw).unwrap();
        assert!(config.is_legacy());

        let n = config.normalize();
        assert_eq!(n.fee.cents(), 500);
        assert_eq!(n.minimum_order.cents(), 2000);
        assert!(n.delivery_enabled);
        assert_eq!(
            n.restricted_neighborhoods,
            Some(vec!["Centro".to_string(), "Boa Vista".to_string()])
        );
    }

    #[test]
    fn test_modern_schema() {
        let raw = json!({
            "taxa_entrega": "7,50",
            "pedido_minimo": "20,00",
            "mostrar_info_delivery": "false",
            "especificar_bairros_atendidos": false,
            "bairros_atendidos": ["Centro"]
        });
        let config = DeliveryConfig::from_value(&raw).unwrap();
        assert!(!config.is_legacy());

        let n = config.normalize();
        assert_eq!(n.fee.cents(), 750);
        assert_eq!(n.minimum_order.cents(), 2000);
        assert!(!n.delivery_enabled);
        assert_eq!(n.restricted_neighborhoods, None);
    }

    #[test]
    fn test_absent_flag_means_enabled() {
        let n = DeliveryConfig::from_value(&json!({ "taxa_entrega": "3,00" }))
            .unwrap()
            .normalize();
        assert!(n.delivery_enabled);

        // an explicit null is not absence
        let raw = json!({ "taxa_entrega": "3,00", "mostrar_info_delivery": null });
        let n = DeliveryConfig::from_value(&raw).unwrap().normalize();
        assert!(!n.delivery_enabled);
    }

    #[test]
    fn test_unparsable_money_is_zero() {
        let n = DeliveryConfig::from_value(&json!({
            "taxa_entrega": "grátis",
            "pedido_minimo": null
        }))
        .unwrap()
        .normalize();
        assert_eq!(n.fee, Money::zero());
        assert_eq!(n.minimum_order, Money::zero());

        let n = DeliveryConfig::from_value(&json!({ "taxa_entrega": "-4,00" }))
            .unwrap()
            .normalize();
        assert_eq!(n.fee, Money::zero());
    }

    #[test]
    fn test_numeric_fields() {
        let n = DeliveryConfig::from_value(&json!({
            "delivery": { "taxa_entrega": 4.5, "pedido_minimo": 30, "mostrar_info_delivery": 1 }
        }))
        .unwrap()
        .normalize();
        assert_eq!(n.fee.cents(), 450);
        assert_eq!(n.minimum_order.cents(), 3000);
        assert!(n.delivery_enabled);

        let n = DeliveryConfig::normalize_value(&json!({
            "taxa_entrega": 4.999,
            "pedido_minimo": 0.1 + 0.2
        }));
        assert_eq!(n.fee.cents(), 500);
        assert_eq!(n.minimum_order.cents(), 30);

        let n = DeliveryConfig::normalize_value(&json!({ "taxa_entrega": 1e3, "pedido_minimo": 1e300 }));
        assert_eq!(n.fee.cents(), 100_000);
        assert_eq!(n.minimum_order, Money::zero());
    }

    #[test]
    fn test_neighborhoods_as_string_or_objects() {
        let n = DeliveryConfig::from_value(&json!({
            "especificar_bairros_atendidos": "true",
            "bairros_atendidos": "Centro, Jardim América,"
        }))
        .unwrap()
        .normalize();
        assert_eq!(
            n.restricted_neighborhoods,
            Some(vec!["Centro".to_string(), "Jardim América".to_string()])
        );

        let n = DeliveryConfig::from_value(&json!({
            "especificar_bairros_atendidos": true,
            "bairros_atendidos": [{ "nome": "Centro" }, 42]
        }))
        .unwrap()
        .normalize();
        assert_eq!(n.restricted_neighborhoods, Some(vec!["Centro".to_string()]));

        // restriction requested with no list restricts to nothing
        let n = DeliveryConfig::from_value(&json!({ "especificar_bairros_atendidos": true }))
            .unwrap()
            .normalize();
        assert_eq!(n.restricted_neighborhoods, Some(Vec::new()));
    }

    #[test]
    fn test_nested_wins_over_top_level() {
        let raw = json!({
            "taxa_entrega": "1,00",
            "delivery": { "taxa_entrega": "2,00" }
        });
        let config = DeliveryConfig::from_value(&raw).unwrap();
        assert!(config.is_legacy());
        assert_eq!(config.normalize().fee.cents(), 200);
    }

    #[test]
    fn test_empty_delivery_object_is_legacy() {
        let config = DeliveryConfig::from_value(&json!({ "delivery": {} })).unwrap();
        assert!(config.is_legacy());
        assert_eq!(
            config.normalize(),
            NormalizedDeliveryConfig::enabled(Money::zero(), Money::zero())
        );
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert!(DeliveryConfig::from_value(&json!({ "nome": "Loja" })).is_err());
        assert!(DeliveryConfig::from_value(&json!([1, 2])).is_err());
        assert!(DeliveryConfig::from_value(&json!("delivery")).is_err());
        assert!(DeliveryConfig::from_json("{not json").is_err());

        assert_eq!(
            DeliveryConfig::normalize_value(&json!({ "nome": "Loja" })),
            NormalizedDeliveryConfig::disabled()
        );
    }

    #[test]
    fn test_normalization_is_a_fixed_point() {
        let samples = [
            NormalizedDeliveryConfig::disabled(),
            NormalizedDeliveryConfig::enabled(Money::from_cents(500), Money::from_cents(2000)),
            NormalizedDeliveryConfig::enabled(Money::from_cents(123_456), Money::zero())
                .with_neighborhoods(["Centro", "Boa Vista"]),
            NormalizedDeliveryConfig::enabled(Money::zero(), Money::from_cents(1))
                .with_neighborhoods(Vec::<String>::new()),
        ];
        for normalized in samples {
            let again = DeliveryConfig::from(normalized.clone()).normalize();
            assert_eq!(again, normalized);
        }
    }

    #[test]
    fn test_to_value_round_trips_shape() {
        let legacy = DeliveryConfig::from_value(&json!({ "delivery": { "taxa_entrega": "5,00" } }))
            .unwrap();
        assert_eq!(DeliveryConfig::from_value(&legacy.to_value()).unwrap(), legacy);

        let modern: DeliveryConfig =
            NormalizedDeliveryConfig::enabled(Money::from_cents(100), Money::zero()).into();
        assert_eq!(modern.to_value()["taxa_entrega"], json!("1,00"));
        assert_eq!(DeliveryConfig::from_value(&modern.to_value()).unwrap(), modern);
    }
}
