//! Practice categories and their fixed item lists

use std::fmt;
use std::str::FromStr;

use crate::Error;

const ANIMALS: &[&str] = &[
    "Dog", "Cat", "Cow", "Horse", "Lion", "Chicken", "Rabbit", "Bear",
];
const FRUITS: &[&str] = &["Apple", "Pear", "Lemon", "Banana", "Strawberry"];
const NUMBERS: &[&str] = &["1", "2", "3", "4", "5", "6", "7", "8", "9"];
const COLORS: &[&str] = &["Red", "Blue", "Yellow", "Green", "Orange", "Purple", "Pink"];
const VEHICLES: &[&str] = &["Car", "Bus", "Train", "Airplane", "Bicycle"];
const CLOTHES: &[&str] = &["Shirt", "Dress", "Shoes", "Gloves", "Hat"];
const OBJECTS: &[&str] = &["Cup", "Chair", "Table", "Ball", "Book", "Pen"];
const SHAPES: &[&str] = &["Circle", "Square", "Triangle", "Star"];

/// A practice category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Animals,
    Fruits,
    Numbers,
    Colors,
    Vehicles,
    Clothes,
    Objects,
    Shapes,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Self; 8] = [
        Self::Animals,
        Self::Fruits,
        Self::Numbers,
        Self::Colors,
        Self::Vehicles,
        Self::Clothes,
        Self::Objects,
        Self::Shapes,
    ];

    /// The ordered item list for this category
    #[must_use]
    pub const fn items(self) -> &'static [&'static str] {
        match self {
            Self::Animals => ANIMALS,
            Self::Fruits => FRUITS,
            Self::Numbers => NUMBERS,
            Self::Colors => COLORS,
            Self::Vehicles => VEHICLES,
            Self::Clothes => CLOTHES,
            Self::Objects => OBJECTS,
            Self::Shapes => SHAPES,
        }
    }

    /// Number of items in this category
    #[must_use]
    pub const fn len(self) -> usize {
        self.items().len()
    }

    /// Categories are never empty
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Lowercase name used for CLI parsing and logging
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Animals => "animals",
            Self::Fruits => "fruits",
            Self::Numbers => "numbers",
            Self::Colors => "colors",
            Self::Vehicles => "vehicles",
            Self::Clothes => "clothes",
            Self::Objects => "objects",
            Self::Shapes => "shapes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "animals" => Ok(Self::Animals),
            "fruits" => Ok(Self::Fruits),
            "numbers" => Ok(Self::Numbers),
            "colors" => Ok(Self::Colors),
            "vehicles" => Ok(Self::Vehicles),
            "clothes" => Ok(Self::Clothes),
            "objects" => Ok(Self::Objects),
            "shapes" => Ok(Self::Shapes),
            other => Err(Error::Config(format!("unknown category: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_counts() {
        assert_eq!(Category::Animals.len(), 8);
        assert_eq!(Category::Fruits.len(), 5);
        assert_eq!(Category::Numbers.len(), 9);
        assert_eq!(Category::Colors.len(), 7);
        assert_eq!(Category::Vehicles.len(), 5);
        assert_eq!(Category::Clothes.len(), 5);
        assert_eq!(Category::Objects.len(), 6);
        assert_eq!(Category::Shapes.len(), 4);
    }

    #[test]
    fn test_parse_roundtrip() {
        for cat in Category::ALL {
            assert_eq!(cat.name().parse::<Category>().unwrap(), cat);
        }
        assert_eq!("  Animals ".parse::<Category>().unwrap(), Category::Animals);
        assert!("planets".parse::<Category>().is_err());
    }

    #[test]
    fn test_first_items() {
        assert_eq!(Category::Animals.items()[0], "Dog");
        assert_eq!(Category::Numbers.items()[8], "9");
    }
}
