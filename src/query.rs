use crate::directory::RegionDirectory;
use crate::filters::{FilterKey, FilterState};
use serde::Serialize;

/// Snapshot of everything that identifies one page request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub filters: FilterState,
    pub search_query: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl ListingQuery {
    /// Freeze the engine state into a query.
    ///
    /// A city that no longer belongs to the selected region is dropped and
    /// blank search text becomes `None`.
    pub fn snapshot(
        filters: &FilterState,
        search_query: &str,
        page: u32,
        limit: u32,
        directory: &RegionDirectory,
    ) -> Self {
        let mut filters = filters.clone();
        filters.city = filters.effective_city(directory).map(str::to_string);
        let search_query = search_query.trim();

        Self {
            filters,
            search_query: (!search_query.is_empty()).then(|| search_query.to_string()),
            page,
            limit,
        }
    }

    /// Query-string pairs for `GET /properties`. Unset filters are omitted.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let f = &self.filters;
        let mut params = vec![(FilterKey::ListingType.as_str(), f.listing_type.to_string())];

        let mut push = |key: FilterKey, value: Option<String>| {
            if let Some(value) = value {
                params.push((key.as_str(), value));
            }
        };
        push(FilterKey::Region, f.region.clone());
        push(FilterKey::City, f.city.clone());
        push(FilterKey::MinPrice, f.effective_min_price().map(|p| p.to_string()));
        push(FilterKey::MaxPrice, f.effective_max_price().map(|p| p.to_string()));
        push(FilterKey::PropertyType, f.property_type.map(|t| t.to_string()));
        push(FilterKey::Bedrooms, f.bedrooms.map(|n| n.to_string()));
        push(FilterKey::Bathrooms, f.bathrooms.map(|n| n.to_string()));
        push(FilterKey::SearchQuery, self.search_query.clone());

        params.push(("page", self.page.to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }

    /// `ceil(total / limit)`
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingType, PropertyType};

    fn query(filters: FilterState) -> ListingQuery {
        ListingQuery::snapshot(&filters, "", 1, 6, &RegionDirectory::ethiopia())
    }

    #[test]
    fn test_default_query_params() {
        let params = query(FilterState::default()).to_params();
        assert_eq!(
            params,
            vec![
                ("listingType", "For Sale".to_string()),
                ("page", "1".to_string()),
                ("limit", "6".to_string()),
            ]
        );
    }

    #[test]
    fn test_full_query_params() {
        let filters = FilterState {
            listing_type: ListingType::ForRent,
            region: Some("Addis Ababa".into()),
            city: Some("Bole".into()),
            min_price: Some(0),
            max_price: Some(40_000),
            property_type: Some(PropertyType::Apartment),
            bedrooms: Some(2),
            bathrooms: Some(1),
        };
        let q = ListingQuery::snapshot(&filters, "  near airport ", 3, 6, &RegionDirectory::ethiopia());

        let params = q.to_params();
        let keys: Vec<_> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "listingType",
                "region",
                "city",
                "maxPrice",
                "propertyType",
                "bedrooms",
                "bathrooms",
                "searchQuery",
                "page",
                "limit"
            ]
        );
        assert!(params.contains(&("searchQuery", "near airport".to_string())));
        assert!(params.contains(&("page", "3".to_string())));
    }

    #[test]
    fn test_orphan_city_not_sent() {
        let q = query(FilterState {
            region: Some("Tigray".into()),
            city: Some("Bole".into()),
            ..Default::default()
        });
        assert_eq!(q.filters.city, None);
        assert!(q.to_params().iter().all(|(k, _)| *k != "city"));
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let q = ListingQuery::snapshot(&FilterState::default(), "   ", 1, 6, &RegionDirectory::ethiopia());
        assert_eq!(q.search_query, None);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let q = query(FilterState::default());
        assert_eq!(q.total_pages(0), 0);
        assert_eq!(q.total_pages(6), 1);
        assert_eq!(q.total_pages(7), 2);
    }
}
