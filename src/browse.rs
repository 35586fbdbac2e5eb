//! Searching, filtering and sorting cart items for display

use std::cmp::Ordering;

use rusty_money::{Money, iso::Currency};

use crate::{items::CartItem, members::MemberUuid};

/// Display order for a list of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Alphabetical by name, ignoring case
    #[default]
    Name,

    /// Cheapest unit price first
    Price,

    /// Most recently added first
    DateAdded,

    /// Alphabetical by category, ignoring case
    Category,
}

/// Narrows the items shown. Every populated criterion must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    /// Case-insensitive substring of the name or description
    pub search: Option<String>,

    /// Exact category
    pub category: Option<String>,

    /// Items this member added (or co-added)
    pub added_by: Option<MemberUuid>,

    /// Inclusive unit price bounds
    pub price_range: Option<(Money<'static, Currency>, Money<'static, Currency>)>,
}

impl ItemFilter {
    /// Returns `true` if the item satisfies every criterion.
    pub fn matches(&self, item: &CartItem) -> bool {
        self.matches_search(item)
            && self
                .category
                .as_deref()
                .is_none_or(|category| item.category() == category)
            && self
                .added_by
                .is_none_or(|member| item.was_added_by(member))
            && self.price_range.as_ref().is_none_or(|(min, max)| {
                let price = item.price().to_minor_units();

                price >= min.to_minor_units() && price <= max.to_minor_units()
            })
    }

    fn matches_search(&self, item: &CartItem) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim) else {
            return true;
        };

        if term.is_empty() {
            return true;
        }

        let term = term.to_lowercase();

        item.name().to_lowercase().contains(&term)
            || item
                .description()
                .is_some_and(|description| description.to_lowercase().contains(&term))
    }
}

/// Filters and sorts items without touching the cart's own ordering.
pub fn browse<'a>(
    items: &'a [CartItem],
    filter: &ItemFilter,
    sort: SortOrder,
) -> Vec<&'a CartItem> {
    let mut matching: Vec<&CartItem> = items.iter().filter(|item| filter.matches(item)).collect();

    matching.sort_by(|a, b| compare(a, b, sort));

    matching
}

fn compare(a: &CartItem, b: &CartItem, sort: SortOrder) -> Ordering {
    match sort {
        SortOrder::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
        SortOrder::Price => a.price().to_minor_units().cmp(&b.price().to_minor_units()),
        SortOrder::DateAdded => b.created_at().cmp(&a.created_at()),
        SortOrder::Category => a
            .category()
            .to_lowercase()
            .cmp(&b.category().to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, ToSpan};
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;
    use crate::{cart::Cart, items::NewCartItem, members::Member};

    fn cart() -> Result<(Cart, MemberUuid, MemberUuid), Box<dyn std::error::Error>> {
        let john = Member::new("John Doe", "john@example.com", "");
        let jane = Member::new("Jane Smith", "jane@example.com", "");
        let (john_uuid, jane_uuid) = (john.uuid(), jane.uuid());

        let start = Timestamp::UNIX_EPOCH;
        let mut cart = Cart::new("Groceries", john, USD, start);
        cart.add_member(jane);

        cart.add_item(
            NewCartItem::new("Organic Bananas", Money::from_minor(399, USD), 2, "Fruits")
                .with_description("Fresh organic bananas, perfect for breakfast"),
            john_uuid,
            start,
        )?;
        cart.add_item(
            NewCartItem::new("Whole Milk", Money::from_minor(429, USD), 1, "Dairy"),
            jane_uuid,
            start.checked_add(1.hour())?,
        )?;
        cart.add_item(
            NewCartItem::new("bread", Money::from_minor(299, USD), 1, "Bakery")
                .with_description("Whole grain loaf"),
            john_uuid,
            start.checked_add(2.hours())?,
        )?;

        Ok((cart, john_uuid, jane_uuid))
    }

    fn names(items: &[&CartItem]) -> Vec<String> {
        items.iter().map(|item| item.name().to_string()).collect()
    }

    #[test]
    fn sorts_by_name_ignoring_case() -> TestResult {
        let (cart, _, _) = cart()?;

        let items = browse(cart.items(), &ItemFilter::default(), SortOrder::Name);

        assert_eq!(names(&items), ["bread", "Organic Bananas", "Whole Milk"]);

        Ok(())
    }

    #[test]
    fn sorts_by_price_and_category() -> TestResult {
        let (cart, _, _) = cart()?;

        let by_price = browse(cart.items(), &ItemFilter::default(), SortOrder::Price);
        let by_category = browse(cart.items(), &ItemFilter::default(), SortOrder::Category);

        assert_eq!(names(&by_price), ["bread", "Organic Bananas", "Whole Milk"]);
        assert_eq!(names(&by_category), ["bread", "Whole Milk", "Organic Bananas"]);

        Ok(())
    }

    #[test]
    fn date_added_uses_creation_time_newest_first() -> TestResult {
        let (cart, _, _) = cart()?;

        let items = browse(cart.items(), &ItemFilter::default(), SortOrder::DateAdded);

        assert_eq!(names(&items), ["bread", "Whole Milk", "Organic Bananas"]);

        Ok(())
    }

    #[test]
    fn search_matches_name_or_description() -> TestResult {
        let (cart, _, _) = cart()?;

        let filter = ItemFilter {
            search: Some("GRAIN".to_string()),
            ..ItemFilter::default()
        };

        assert_eq!(names(&browse(cart.items(), &filter, SortOrder::Name)), ["bread"]);

        let filter = ItemFilter {
            search: Some("milk".to_string()),
            ..ItemFilter::default()
        };

        assert_eq!(
            names(&browse(cart.items(), &filter, SortOrder::Name)),
            ["Whole Milk"]
        );

        Ok(())
    }

    #[test]
    fn filters_combine() -> TestResult {
        let (cart, john, jane) = cart()?;

        let johns = ItemFilter {
            added_by: Some(john),
            ..ItemFilter::default()
        };
        assert_eq!(browse(cart.items(), &johns, SortOrder::Name).len(), 2);

        let janes_dairy = ItemFilter {
            added_by: Some(jane),
            category: Some("Dairy".to_string()),
            ..ItemFilter::default()
        };
        assert_eq!(browse(cart.items(), &janes_dairy, SortOrder::Name).len(), 1);

        let cheap = ItemFilter {
            price_range: Some((Money::from_minor(0, USD), Money::from_minor(399, USD))),
            ..ItemFilter::default()
        };
        assert_eq!(
            names(&browse(cart.items(), &cheap, SortOrder::Price)),
            ["bread", "Organic Bananas"]
        );

        Ok(())
    }
}
