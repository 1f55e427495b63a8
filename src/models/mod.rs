use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ListingType {
    #[default]
    #[serde(rename = "For Sale")]
    ForSale,
    #[serde(rename = "For Rent")]
    ForRent,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::ForSale => "For Sale",
            ListingType::ForRent => "For Rent",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "for sale" | "sale" => Ok(ListingType::ForSale),
            "for rent" | "rent" => Ok(ListingType::ForRent),
            other => Err(format!("unknown listing type '{}'", other)),
        }
    }
}

/// Kind of property being listed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PropertyType {
    Apartment,
    Villa,
    House,
    Office,
    Land,
    Commercial,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::House,
        PropertyType::Office,
        PropertyType::Land,
        PropertyType::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::Villa => "Villa",
            PropertyType::House => "House",
            PropertyType::Office => "Office",
            PropertyType::Land => "Land",
            PropertyType::Commercial => "Commercial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown property type '{}'", wanted))
    }
}

/// A listing as returned by the properties API.
///
/// Only the fields the runner prints are typed, and those are read
/// leniently: a value of the wrong shape becomes `None` instead of failing
/// the whole page. Everything else the API sends is kept in `raw_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, rename = "listingType", deserialize_with = "lenient")]
    pub listing_type: Option<ListingType>,
    #[serde(default, rename = "propertyType", deserialize_with = "lenient")]
    pub property_type: Option<PropertyType>,
    #[serde(default, deserialize_with = "lenient")]
    pub bedrooms: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub bathrooms: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Vec<String>,
    #[serde(flatten)]
    pub raw_data: serde_json::Map<String, serde_json::Value>,
}

/// Deserialize `T`, falling back to its default when the value does not fit
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Ids arrive as strings from some backends and as numbers from others
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => id,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// One page of results from `GET /properties`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_type_wire_names() {
        assert_eq!(serde_json::to_value(ListingType::ForSale).unwrap(), json!("For Sale"));
        assert_eq!(serde_json::to_value(ListingType::ForRent).unwrap(), json!("For Rent"));
        assert_eq!("rent".parse::<ListingType>().unwrap(), ListingType::ForRent);
        assert!("lease".parse::<ListingType>().is_err());
    }

    #[test]
    fn test_property_type_parse_ignores_case() {
        assert_eq!("villa".parse::<PropertyType>().unwrap(), PropertyType::Villa);
        assert!("castle".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_property_keeps_unknown_fields() {
        let value = json!({
            "_id": "665f1c",
            "title": "Bole 3BR apartment",
            "price": 8500000,
            "listingType": "For Sale",
            "propertyType": "Apartment",
            "bedrooms": 3,
            "owner": { "name": "Abebe" }
        });

        let property: Property = serde_json::from_value(value).unwrap();
        assert_eq!(property.id, "665f1c");
        assert_eq!(property.listing_type, Some(ListingType::ForSale));
        assert_eq!(property.bedrooms, Some(3.0));
        assert_eq!(property.title.as_deref(), Some("Bole 3BR apartment"));
        assert!(property.raw_data.contains_key("owner"));
        assert!(property.images.is_empty());
    }

    #[test]
    fn test_odd_field_values_do_not_reject_the_record() {
        let value = json!({
            "_id": 42,
            "title": null,
            "price": "negotiable",
            "listingType": "Sold",
            "propertyType": "Condominium",
            "bedrooms": 2.5,
            "bathrooms": "two",
            "images": null
        });

        let property: Property = serde_json::from_value(value).unwrap();
        assert_eq!(property.id, "42");
        assert_eq!(property.title, None);
        assert_eq!(property.price, None);
        assert_eq!(property.listing_type, None);
        assert_eq!(property.property_type, None);
        assert_eq!(property.bedrooms, Some(2.5));
        assert_eq!(property.bathrooms, None);
        assert!(property.images.is_empty());
    }

    #[test]
    fn test_query_result_defaults_missing_fields() {
        let result: QueryResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(result.total, 0);
        assert!(result.properties.is_empty());
    }
}
