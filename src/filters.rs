use crate::directory::RegionDirectory;
use crate::error::ValidationError;
use crate::models::{ListingType, PropertyType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Room filters are offered as 1..=10 in the UI
pub const MIN_ROOMS: u32 = 1;
pub const MAX_ROOMS: u32 = 10;

/// Structured search filters.
///
/// Free-text search lives on the engine, not here, so it can be cleared on
/// its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub listing_type: ListingType,
    pub region: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
}

impl FilterState {
    /// Prices of zero mean "no bound"
    pub fn effective_min_price(&self) -> Option<u64> {
        self.min_price.filter(|p| *p > 0)
    }

    pub fn effective_max_price(&self) -> Option<u64> {
        self.max_price.filter(|p| *p > 0)
    }

    /// The selected city, but only while it still belongs to the region.
    pub fn effective_city<'a>(&'a self, directory: &RegionDirectory) -> Option<&'a str> {
        self.city
            .as_deref()
            .filter(|city| directory.has_city(self.region.as_deref(), city))
    }

    /// Number of filters set beyond the default listing type.
    pub fn active_count(&self) -> usize {
        [
            self.region.is_some(),
            self.city.is_some(),
            self.effective_min_price().is_some(),
            self.effective_max_price().is_some(),
            self.property_type.is_some(),
            self.bedrooms.is_some(),
            self.bathrooms.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Apply `update`, clearing the city whenever the region is touched.
    pub(crate) fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::ListingType(t) => self.listing_type = t,
            FilterUpdate::Region(region) => {
                self.region = region;
                self.city = None;
            }
            FilterUpdate::City(city) => self.city = city,
            FilterUpdate::MinPrice(p) => self.min_price = p,
            FilterUpdate::MaxPrice(p) => self.max_price = p,
            FilterUpdate::PropertyType(t) => self.property_type = t,
            FilterUpdate::Bedrooms(n) => self.bedrooms = n,
            FilterUpdate::Bathrooms(n) => self.bathrooms = n,
            // handled by the engine
            FilterUpdate::SearchQuery(_) => {}
        }
    }
}

/// Names of the individual filters, as used in query strings and forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    ListingType,
    Region,
    City,
    MinPrice,
    MaxPrice,
    PropertyType,
    Bedrooms,
    Bathrooms,
    SearchQuery,
}

impl FilterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::ListingType => "listingType",
            FilterKey::Region => "region",
            FilterKey::City => "city",
            FilterKey::MinPrice => "minPrice",
            FilterKey::MaxPrice => "maxPrice",
            FilterKey::PropertyType => "propertyType",
            FilterKey::Bedrooms => "bedrooms",
            FilterKey::Bathrooms => "bathrooms",
            FilterKey::SearchQuery => "searchQuery",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "listingType" => FilterKey::ListingType,
            "region" => FilterKey::Region,
            "city" => FilterKey::City,
            "minPrice" => FilterKey::MinPrice,
            "maxPrice" => FilterKey::MaxPrice,
            "propertyType" => FilterKey::PropertyType,
            "bedrooms" => FilterKey::Bedrooms,
            "bathrooms" => FilterKey::Bathrooms,
            "searchQuery" => FilterKey::SearchQuery,
            other => return Err(ValidationError::UnknownFilter(other.to_string())),
        };
        Ok(key)
    }
}

/// A single filter change. `None` clears the filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    ListingType(ListingType),
    Region(Option<String>),
    City(Option<String>),
    MinPrice(Option<u64>),
    MaxPrice(Option<u64>),
    PropertyType(Option<PropertyType>),
    Bedrooms(Option<u32>),
    Bathrooms(Option<u32>),
    SearchQuery(Option<String>),
}

impl FilterUpdate {
    pub fn key(&self) -> FilterKey {
        match self {
            FilterUpdate::ListingType(_) => FilterKey::ListingType,
            FilterUpdate::Region(_) => FilterKey::Region,
            FilterUpdate::City(_) => FilterKey::City,
            FilterUpdate::MinPrice(_) => FilterKey::MinPrice,
            FilterUpdate::MaxPrice(_) => FilterKey::MaxPrice,
            FilterUpdate::PropertyType(_) => FilterKey::PropertyType,
            FilterUpdate::Bedrooms(_) => FilterKey::Bedrooms,
            FilterUpdate::Bathrooms(_) => FilterKey::Bathrooms,
            FilterUpdate::SearchQuery(_) => FilterKey::SearchQuery,
        }
    }

    /// Build an update from raw form input. Blank input clears the filter.
    pub fn parse(key: FilterKey, raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        let value = (!raw.is_empty()).then_some(raw);

        let update = match key {
            FilterKey::ListingType => FilterUpdate::ListingType(match value {
                Some(v) => v.parse::<ListingType>().map_err(ValidationError::InvalidChoice)?,
                None => ListingType::default(),
            }),
            FilterKey::Region => FilterUpdate::Region(value.map(str::to_string)),
            FilterKey::City => FilterUpdate::City(value.map(str::to_string)),
            FilterKey::MinPrice => FilterUpdate::MinPrice(parse_price("minPrice", value)?),
            FilterKey::MaxPrice => FilterUpdate::MaxPrice(parse_price("maxPrice", value)?),
            FilterKey::PropertyType => FilterUpdate::PropertyType(
                value
                    .map(|v| v.parse::<PropertyType>().map_err(ValidationError::InvalidChoice))
                    .transpose()?,
            ),
            FilterKey::Bedrooms => FilterUpdate::Bedrooms(parse_rooms("bedrooms", value)?),
            FilterKey::Bathrooms => FilterUpdate::Bathrooms(parse_rooms("bathrooms", value)?),
            FilterKey::SearchQuery => FilterUpdate::SearchQuery(value.map(str::to_string)),
        };
        Ok(update)
    }

    /// Check this update against the directory and the state it will be applied to.
    pub fn validate(
        &self,
        current: &FilterState,
        directory: &RegionDirectory,
        strict_price_range: bool,
    ) -> Result<(), ValidationError> {
        match self {
            FilterUpdate::Region(Some(region)) if !directory.contains_region(region) => {
                Err(ValidationError::UnknownRegion(region.clone()))
            }
            FilterUpdate::City(Some(city)) => match current.region.as_deref() {
                None => Err(ValidationError::CityWithoutRegion),
                Some(region) if !directory.has_city(Some(region), city) => {
                    Err(ValidationError::UnknownCity {
                        region: region.to_string(),
                        city: city.clone(),
                    })
                }
                Some(_) => Ok(()),
            },
            FilterUpdate::Bedrooms(Some(n)) => check_rooms("bedrooms", *n),
            FilterUpdate::Bathrooms(Some(n)) => check_rooms("bathrooms", *n),
            FilterUpdate::MinPrice(_) | FilterUpdate::MaxPrice(_) if strict_price_range => {
                let mut next = current.clone();
                next.apply(self.clone());
                match (next.effective_min_price(), next.effective_max_price()) {
                    (Some(min), Some(max)) if min > max => {
                        Err(ValidationError::PriceRange { min, max })
                    }
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

/// Prices are whole currency units (birr), so "1500.50" is rejected;
/// thousands separators are allowed.
fn parse_price(field: &'static str, value: Option<&str>) -> Result<Option<u64>, ValidationError> {
    value
        .map(|v| {
            v.replace(',', "")
                .parse::<u64>()
                .map_err(|_| ValidationError::NotANumber {
                    field,
                    value: v.to_string(),
                })
        })
        .transpose()
}

fn parse_rooms(field: &'static str, value: Option<&str>) -> Result<Option<u32>, ValidationError> {
    let Some(v) = value else {
        return Ok(None);
    };
    // "10+" is how the dropdown labels its last option
    let n = v
        .trim_end_matches('+')
        .parse::<u32>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: v.to_string(),
        })?;
    check_rooms(field, n)?;
    Ok(Some(n))
}

fn check_rooms(field: &'static str, value: u32) -> Result<(), ValidationError> {
    if (MIN_ROOMS..=MAX_ROOMS).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: MIN_ROOMS,
            max: MAX_ROOMS,
            value,
        })
    }
}
