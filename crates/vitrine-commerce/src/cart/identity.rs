//! Cart item identity.
//!
//! Two cart entries are the same purchasable unit when they point at the same
//! product and, for products sold by variation, the same variation. The
//! generated [`CartItemId`](crate::ids::CartItemId) plays no part in this.

use crate::ids::{ProductId, VariationId};

/// Anything that names a purchasable unit: a cart entry or a candidate about
/// to be added.
pub trait ProductIdentity {
    fn product_id(&self) -> &ProductId;

    /// Whether the unit was chosen through a product variation.
    fn has_variation(&self) -> bool;

    fn variation_id(&self) -> Option<&VariationId>;
}

/// Decide whether `a` and `b` are the same purchasable unit.
///
/// - both without variation: same product id;
/// - both with variation: same product id and same variation id;
/// - otherwise never the same, so buying a product plainly and buying one of
///   its variations produce two entries.
pub fn is_same_product<A, B>(a: &A, b: &B) -> bool
where
    A: ProductIdentity + ?Sized,
    B: ProductIdentity + ?Sized,
{
    if a.product_id() != b.product_id() {
        return false;
    }
    match (a.has_variation(), b.has_variation()) {
        (false, false) => true,
        (true, true) => a.variation_id() == b.variation_id(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unit {
        product: ProductId,
        variation: Option<VariationId>,
        has_variation: bool,
    }

    impl ProductIdentity for Unit {
        fn product_id(&self) -> &ProductId {
            &self.product
        }

        fn has_variation(&self) -> bool {
            self.has_variation
        }

        fn variation_id(&self) -> Option<&VariationId> {
            self.variation.as_ref()
        }
    }

    fn plain(product: &str) -> Unit {
        Unit {
            product: ProductId::new(product),
            variation: None,
            has_variation: false,
        }
    }

    fn varied(product: &str, variation: &str) -> Unit {
        Unit {
            product: ProductId::new(product),
            variation: Some(VariationId::new(variation)),
            has_variation: true,
        }
    }

    #[test]
    fn test_plain_products_match_on_product_id() {
        assert!(is_same_product(&plain("p1"), &plain("p1")));
        assert!(!is_same_product(&plain("p1"), &plain("p2")));
    }

    #[test]
    fn test_variations_match_on_both_ids() {
        assert!(is_same_product(&varied("p1", "large"), &varied("p1", "large")));
        assert!(!is_same_product(&varied("p1", "large"), &varied("p1", "small")));
        assert!(!is_same_product(&varied("p1", "large"), &varied("p2", "large")));
    }

    #[test]
    fn test_plain_and_variation_purchase_never_match() {
        assert!(!is_same_product(&plain("p1"), &varied("p1", "large")));

        // a variation flag without an id is still a variation purchase
        let flagged = Unit {
            product: ProductId::new("p1"),
            variation: None,
            has_variation: true,
        };
        assert!(!is_same_product(&plain("p1"), &flagged));
    }

    #[test]
    fn test_relation_is_symmetric() {
        let units = [
            plain("p1"),
            plain("p2"),
            varied("p1", "a"),
            varied("p1", "b"),
            varied("p2", "a"),
            Unit {
                product: ProductId::new("p1"),
                variation: None,
                has_variation: true,
            },
        ];
        for a in &units {
            for b in &units {
                assert_eq!(is_same_product(a, b), is_same_product(b, a));
            }
            assert!(is_same_product(a, a));
        }
    }
}
