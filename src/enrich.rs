//! Client-side join of reservations against separately fetched catalogs.

use std::collections::HashMap;

use crate::models::{Business, BusinessSummary, Product, ProductSummary, Reservation};

/// Attach product (and product -> business) display data to each reservation.
///
/// Joins on `productId` then `product.businessId`. Missing keys leave the
/// field empty instead of failing; with duplicate ids the first catalog row
/// wins. A product's own embedded business is used when the businesses
/// catalog has no match.
pub fn enrich_reservations(
    reservations: Vec<Reservation>,
    products: &[Product],
    businesses: &[Business],
) -> Vec<Reservation> {
    let mut product_map: HashMap<i64, &Product> = HashMap::with_capacity(products.len());
    for product in products {
        product_map.entry(product.id).or_insert(product);
    }
    let mut business_map: HashMap<i64, &Business> = HashMap::with_capacity(businesses.len());
    for business in businesses {
        business_map.entry(business.id).or_insert(business);
    }

    reservations
        .into_iter()
        .map(|mut reservation| {
            if let Some(product) = product_map.get(&reservation.product_id) {
                let business = product
                    .business_id
                    .and_then(|id| business_map.get(&id))
                    .map(|b| BusinessSummary::from(*b))
                    .or_else(|| product.business.clone());
                reservation.product = Some(summarize(product, business));
            }
            reservation
        })
        .collect()
}

fn summarize(product: &Product, business: Option<BusinessSummary>) -> ProductSummary {
    ProductSummary {
        id: product.id,
        name: product.name.clone(),
        description: product.description.clone().unwrap_or_default(),
        price: product.price,
        discounted_price: product.discounted_price,
        image_url: product.image_url.clone(),
        business,
    }
}
