//! Item suggestions
//!
//! A fixed catalogue stands in for a recommendation model: suggestions are
//! whatever the cart does not already appear to contain.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::items::NewCartItem;

/// Errors returned when asking for suggestions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SuggestionError {
    /// No shopping goal was given.
    #[error("a shopping goal is required")]
    EmptyGoal,
}

/// An item worth adding, with the reason it was suggested.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Catalogue id
    pub id: &'static str,

    /// Item name
    pub name: &'static str,

    /// Unit price
    pub price: Money<'static, Currency>,

    /// Image reference
    pub image: &'static str,

    /// Why it fits the cart
    pub reason: &'static str,

    /// Category tag
    pub category: &'static str,
}

impl Suggestion {
    /// Turns the suggestion into an item draft.
    pub fn to_draft(&self, quantity: u32) -> NewCartItem {
        NewCartItem::new(self.name, self.price, quantity, self.category)
            .with_description(self.reason)
            .with_image(self.image)
    }
}

/// The suggestion catalogue, priced in `currency`.
pub fn catalogue(currency: &'static Currency) -> [Suggestion; 4] {
    [
        Suggestion {
            id: "1",
            name: "Greek Yogurt",
            price: Money::from_minor(599, currency),
            image: "/api/placeholder/100/100",
            reason: "Perfect protein source to pair with your bananas for breakfast",
            category: "Dairy",
        },
        Suggestion {
            id: "2",
            name: "Peanut Butter",
            price: Money::from_minor(499, currency),
            image: "/api/placeholder/100/100",
            reason: "Great spread for your bread and source of healthy fats",
            category: "Pantry",
        },
        Suggestion {
            id: "3",
            name: "Eggs",
            price: Money::from_minor(349, currency),
            image: "/api/placeholder/100/100",
            reason: "Essential breakfast protein to complement your current items",
            category: "Dairy",
        },
        Suggestion {
            id: "4",
            name: "Spinach",
            price: Money::from_minor(299, currency),
            image: "/api/placeholder/100/100",
            reason: "Nutrient-dense greens for balanced meals",
            category: "Vegetables",
        },
    ]
}

/// Suggests catalogue entries the cart does not already contain.
///
/// An entry is skipped when its name appears, ignoring case, inside any
/// current item name. The goal only has to be present.
///
/// # Errors
///
/// Returns [`SuggestionError::EmptyGoal`] if the goal is blank.
pub fn suggest<S: AsRef<str>>(
    goal: &str,
    current_items: &[S],
    currency: &'static Currency,
) -> Result<Vec<Suggestion>, SuggestionError> {
    if goal.trim().is_empty() {
        return Err(SuggestionError::EmptyGoal);
    }

    let current: Vec<String> = current_items
        .iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect();

    Ok(catalogue(currency)
        .into_iter()
        .filter(|suggestion| {
            let name = suggestion.name.to_lowercase();

            !current.iter().any(|item| item.contains(&name))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn blank_goal_is_rejected() {
        let result = suggest::<&str>("   ", &[], USD);

        assert_eq!(result, Err(SuggestionError::EmptyGoal));
    }

    #[test]
    fn empty_cart_gets_whole_catalogue() -> TestResult {
        let suggestions = suggest::<&str>("breakfast", &[], USD)?;

        assert_eq!(suggestions.len(), 4);

        Ok(())
    }

    #[test]
    fn items_already_in_cart_are_skipped() -> TestResult {
        let suggestions = suggest(
            "healthy week",
            &["Free Range EGGS", "Baby spinach leaves"],
            USD,
        )?;

        let names: Vec<&str> = suggestions.iter().map(|suggestion| suggestion.name).collect();

        assert_eq!(names, ["Greek Yogurt", "Peanut Butter"]);

        Ok(())
    }

    #[test]
    fn suggestion_becomes_valid_draft() {
        let [yogurt, ..] = catalogue(USD);

        let draft = yogurt.to_draft(1);

        assert_eq!(draft.validate(), Ok(()));
        assert_eq!(draft.price, Money::from_minor(599, USD));
        assert_eq!(draft.category, "Dairy");
    }
}
