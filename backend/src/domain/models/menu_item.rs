//! Domain model for a menu item.

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Prices are validated against this cap at the boundary.
pub fn max_price() -> Decimal {
    Decimal::new(9_999_99, 2)
}

/// The fixed set of menu categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Appetizers,
    Mains,
    Desserts,
    Beverages,
    Salads,
    Soups,
    Sides,
    Specials,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Appetizers,
        Category::Mains,
        Category::Desserts,
        Category::Beverages,
        Category::Salads,
        Category::Soups,
        Category::Sides,
        Category::Specials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Appetizers => "appetizers",
            Category::Mains => "mains",
            Category::Desserts => "desserts",
            Category::Beverages => "beverages",
            Category::Salads => "salads",
            Category::Soups => "soups",
            Category::Sides => "sides",
            Category::Specials => "specials",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "appetizers" => Ok(Category::Appetizers),
            "mains" => Ok(Category::Mains),
            "desserts" => Ok(Category::Desserts),
            "beverages" => Ok(Category::Beverages),
            "salads" => Ok(Category::Salads),
            "soups" => Ok(Category::Soups),
            "sides" => Ok(Category::Sides),
            "specials" => Ok(Category::Specials),
            other => Err(Error::validation(
                "category",
                format!(
                    "'{}' is not a valid category (expected one of: {})",
                    other,
                    Category::ALL
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: Category,
    /// Exact decimal price, quantized to cents.
    pub price: Decimal,
    pub description: String,
    pub is_available: bool,
}

impl MenuItem {
    /// Validate fields and construct a new menu item with a fresh id.
    pub fn new(
        name: &str,
        category: &str,
        price: Decimal,
        description: Option<&str>,
        is_available: bool,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: validate_name(name)?,
            category: category.parse()?,
            price: validate_price(price)?,
            description: validate_description(description)?,
            is_available,
        })
    }

    /// Apply a partial update, validating each provided field.
    pub fn apply_update(
        &mut self,
        name: Option<&str>,
        category: Option<&str>,
        price: Option<Decimal>,
        description: Option<&str>,
        is_available: Option<bool>,
    ) -> Result<()> {
        if let Some(name) = name {
            self.name = validate_name(name)?;
        }
        if let Some(category) = category {
            self.category = category.parse()?;
        }
        if let Some(price) = price {
            self.price = validate_price(price)?;
        }
        if let Some(description) = description {
            self.description = validate_description(Some(description))?;
        }
        if let Some(is_available) = is_available {
            self.is_available = is_available;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("name", "menu item name cannot be empty"));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(Error::validation(
            "name",
            format!("menu item name cannot exceed {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: Decimal) -> Result<Decimal> {
    if price <= Decimal::ZERO {
        return Err(Error::validation("price", "price must be greater than zero"));
    }
    if price > max_price() {
        return Err(Error::validation(
            "price",
            format!("price cannot exceed {}", max_price()),
        ));
    }
    Ok(price.round_dp(2))
}

fn validate_description(description: Option<&str>) -> Result<String> {
    let trimmed = description.unwrap_or("").trim();
    if trimmed.len() > MAX_DESCRIPTION_LEN {
        return Err(Error::validation(
            "description",
            format!("description cannot exceed {} characters", MAX_DESCRIPTION_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    #[test]
    fn valid_item_is_constructed() {
        let item = MenuItem::new(
            "  Grilled Salmon ",
            "mains",
            Decimal::from_str("24.99").unwrap(),
            Some("Fresh Atlantic salmon"),
            true,
        )
        .unwrap();
        assert_eq!(item.name, "Grilled Salmon");
        assert_eq!(item.category, Category::Mains);
        assert_eq!(item.price, Decimal::from_str("24.99").unwrap());
        assert!(!item.id.is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = MenuItem::new("  ", "mains", Decimal::ONE, None, true).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = MenuItem::new("Soup", "brunch", Decimal::ONE, None, true).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "category"));
    }

    #[test]
    fn zero_or_negative_price_is_rejected() {
        for price in [Decimal::ZERO, Decimal::from_str("-1.00").unwrap()] {
            let err = MenuItem::new("Soup", "soups", price, None, true).unwrap_err();
            assert!(matches!(err, Error::Validation { ref field, .. } if field == "price"));
        }
    }

    #[test]
    fn partial_update_only_touches_given_fields() {
        let mut item =
            MenuItem::new("Coffee", "beverages", Decimal::from_str("2.99").unwrap(), None, true)
                .unwrap();
        item.apply_update(None, None, Some(Decimal::from_str("3.49").unwrap()), None, Some(false))
            .unwrap();
        assert_eq!(item.name, "Coffee");
        assert_eq!(item.price, Decimal::from_str("3.49").unwrap());
        assert!(!item.is_available);
    }

    #[test]
    fn category_round_trips_through_strings() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.as_str()).unwrap(), category);
        }
    }
}
