use serde::{Deserialize, Serialize};

/// Spending category of a personal expense.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Travel,
    Entertainment,
    Shopping,
    Utilities,
    Health,
    Education,
    Other,
}

/// Keyword table driving auto-categorization. Categories are tried in this
/// order; the first matching keyword wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "zomato",
            "swiggy",
            "restaurant",
            "pizza",
            "burger",
            "cafe",
            "food",
            "grocery",
            "supermarket",
            "bakery",
            "tea",
            "coffee",
            "lunch",
            "dinner",
            "breakfast",
        ],
    ),
    (
        Category::Travel,
        &[
            "uber", "ola", "cab", "taxi", "flight", "bus", "train", "metro", "petrol", "gas",
            "toll", "parking", "travel", "railway",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "movie",
            "cinema",
            "netflix",
            "spotify",
            "games",
            "concert",
            "ticket",
            "theater",
            "show",
            "entertainment",
            "outing",
        ],
    ),
    (
        Category::Shopping,
        &[
            "amazon", "flipkart", "mall", "market", "store", "shop", "clothing", "clothes",
            "dress", "shoe", "shoes", "purchase", "buy",
        ],
    ),
    (
        Category::Utilities,
        &[
            "electricity",
            "water",
            "internet",
            "phone",
            "mobile",
            "bill",
            "rent",
            "electricity bill",
            "utility",
        ],
    ),
    (
        Category::Health,
        &[
            "hospital", "doctor", "medicine", "pharmacy", "health", "medical", "clinic",
            "dental", "gym", "fitness",
        ],
    ),
    (
        Category::Education,
        &[
            "school",
            "college",
            "tuition",
            "book",
            "course",
            "online",
            "udemy",
            "education",
            "study",
        ],
    ),
];

impl Category {
    /// Guess a category from free text (note/description), lowercased
    /// substring match against the keyword table. No match means `Other`.
    pub fn auto_detect(text: &str) -> Category {
        let text = text.to_lowercase();
        for (category, keywords) in CATEGORY_KEYWORDS {
            if keywords.iter().any(|keyword| text.contains(keyword)) {
                return *category;
            }
        }
        Category::Other
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Utilities => "Utilities",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Category requested at expense creation: a fixed choice, or derived from
/// the note via the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySpec {
    Auto,
    Fixed(Category),
}

impl CategorySpec {
    pub fn resolve(self, note: &str) -> Category {
        match self {
            CategorySpec::Auto => Category::auto_detect(note),
            CategorySpec::Fixed(category) => category,
        }
    }
}
