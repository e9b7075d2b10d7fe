//! The closed category taxonomy expenses are validated and grouped against.

use serde::{Deserialize, Serialize};

/// A main category and the subcategories it allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainCategory {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

impl MainCategory {
    pub fn new(name: impl Into<String>, subcategories: &[&str]) -> Self {
        Self {
            name: name.into(),
            subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Ordered set of main categories. Read-only at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTaxonomy {
    categories: Vec<MainCategory>,
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self::new(vec![
            MainCategory::new("Rent", &[]),
            MainCategory::new("Food", &["Restaurant", "Snack", "Supermarket"]),
            MainCategory::new(
                "Transport",
                &["Fuel", "Electric", "Parking", "Toll", "Uber"],
            ),
            MainCategory::new("Subscriptions", &["Netflix", "Prime", "HBO"]),
            MainCategory::new("Shopping", &[]),
            MainCategory::new("Health", &[]),
            MainCategory::new("Insurance", &["House", "Car"]),
            MainCategory::new(
                "Utilities",
                &["Water", "Electricity", "Gas", "Net&TV", "Condominium"],
            ),
            MainCategory::new("Entertainment", &[]),
            MainCategory::new("Travel", &[]),
            MainCategory::new("Others", &[]),
        ])
    }
}

impl CategoryTaxonomy {
    pub fn new(categories: Vec<MainCategory>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[MainCategory] {
        &self.categories
    }

    pub fn mains(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.name.as_str())
    }

    pub fn contains_main(&self, main: &str) -> bool {
        self.category(main).is_some()
    }

    pub fn category(&self, main: &str) -> Option<&MainCategory> {
        self.categories.iter().find(|category| category.name == main)
    }

    /// Subcategories of `main`; empty for unknown mains.
    pub fn subcategories(&self, main: &str) -> &[String] {
        self.category(main)
            .map(|category| category.subcategories.as_slice())
            .unwrap_or(&[])
    }

    /// Checks that `main` is known and `sub` is either absent or one of its
    /// subcategories.
    pub fn validate(&self, main: &str, sub: Option<&str>) -> Result<(), String> {
        let category = self
            .category(main)
            .ok_or_else(|| format!("unknown category `{}`", main))?;
        match sub {
            None => Ok(()),
            Some(sub) if category.subcategories.iter().any(|known| known == sub) => Ok(()),
            Some(sub) if category.subcategories.is_empty() => Err(format!(
                "category `{}` has no subcategories, got `{}`",
                main, sub
            )),
            Some(sub) => Err(format!("`{}` is not a subcategory of `{}`", sub, main)),
        }
    }

    /// Owning main category of a subcategory name.
    pub fn main_of(&self, sub: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| category.subcategories.iter().any(|known| known == sub))
            .map(|category| category.name.as_str())
    }

    /// Every subcategory across all mains, sorted and de-duplicated.
    pub fn all_subcategories(&self) -> Vec<&str> {
        let mut subs: Vec<&str> = self
            .categories
            .iter()
            .flat_map(|category| category.subcategories.iter().map(String::as_str))
            .collect();
        subs.sort_unstable();
        subs.dedup();
        subs
    }

    pub fn label(main: &str, sub: Option<&str>) -> String {
        match sub {
            Some(sub) => format!("{} – {}", main, sub),
            None => main.to_string(),
        }
    }
}
