//! Datasets and their category codes.
//!
//! Every profile dataset has exactly one closed enum of category codes. The
//! display names (Nepali and English) and chart colours live next to the
//! codes, and the [`Catalog`] lookup table is built from them once at startup.

use crate::error::ProfileError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Common surface of the per-dataset category enums.
pub trait CategoryKind: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn code(&self) -> &'static str;
    fn name_ne(&self) -> &'static str;
    fn name_en(&self) -> &'static str;
    fn color(&self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }
}

macro_rules! category_kind {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($code:literal, $ne:literal, $en:literal, $color:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl CategoryKind for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn code(&self) -> &'static str {
                match self { $($name::$variant => $code),+ }
            }
            fn name_ne(&self) -> &'static str {
                match self { $($name::$variant => $ne),+ }
            }
            fn name_en(&self) -> &'static str {
                match self { $($name::$variant => $en),+ }
            }
            fn color(&self) -> &'static str {
                match self { $($name::$variant => $color),+ }
            }
        }
    };
}

category_kind! {
    /// Marital status of residents aged 10 and above.
    pub enum MaritalStatus {
        Single => ("SINGLE", "अविवाहित", "Never married", "#4e79a7"),
        Married => ("MARRIED", "विवाहित", "Married", "#f28e2b"),
        MultiMarriage => ("MULTI_MARRIAGE", "बहुविवाह", "Multiple marriage", "#e15759"),
        ReMarriage => ("RE_MARRIAGE", "पुनर्विवाह", "Remarried", "#76b7b2"),
        Widowed => ("WIDOWED", "विधुर/विधवा", "Widowed", "#59a14f"),
        Divorced => ("DIVORCED", "पारपाचुके", "Divorced", "#edc948"),
        Separated => ("SEPARATED", "छुट्टिएको", "Separated", "#b07aa1"),
        NotStated => ("NOT_STATED", "उल्लेख नभएको", "Not stated", "#bab0ac"),
    }
}

category_kind! {
    /// Registered farmers' groups by main activity.
    pub enum FarmerGroupType {
        Agriculture => ("AGRICULTURE", "कृषि समूह", "Crop farming", "#59a14f"),
        Livestock => ("LIVESTOCK", "पशुपालन समूह", "Livestock", "#9c755f"),
        Vegetable => ("VEGETABLE", "तरकारी खेती समूह", "Vegetable farming", "#8cd17d"),
        Fishery => ("FISHERY", "माछापालन समूह", "Fishery", "#4e79a7"),
        Beekeeping => ("BEEKEEPING", "मौरीपालन समूह", "Beekeeping", "#f1ce63"),
        Other => ("OTHER", "अन्य", "Other", "#bab0ac"),
    }
}

category_kind! {
    /// Cooperatives registered in the municipality by type.
    pub enum CooperativeType {
        SavingsCredit => ("SAVINGS_CREDIT", "बचत तथा ऋण सहकारी", "Savings and credit", "#4e79a7"),
        MultiPurpose => ("MULTI_PURPOSE", "बहुउद्देश्यीय सहकारी", "Multipurpose", "#f28e2b"),
        Agriculture => ("AGRICULTURE", "कृषि सहकारी", "Agriculture", "#59a14f"),
        Dairy => ("DAIRY", "दुग्ध सहकारी", "Dairy", "#76b7b2"),
        Health => ("HEALTH", "स्वास्थ्य सहकारी", "Health", "#e15759"),
        Community => ("COMMUNITY", "सामुदायिक सहकारी", "Community", "#b07aa1"),
        Other => ("OTHER", "अन्य", "Other", "#bab0ac"),
    }
}

category_kind! {
    /// Households by the kind of financial institution they hold an account with.
    pub enum FinancialAccountType {
        Bank => ("BANK", "बैंक", "Commercial bank", "#4e79a7"),
        Finance => ("FINANCE", "वित्तीय संस्था", "Finance company", "#f28e2b"),
        MicroFinance => ("MICRO_FINANCE", "लघुवित्त", "Microfinance", "#59a14f"),
        Cooperative => ("COOPERATIVE", "सहकारी", "Cooperative", "#76b7b2"),
        NoAccount => ("NONE", "खाता नभएको", "No account", "#e15759"),
    }
}

category_kind! {
    /// Households by the construction material of the outer wall.
    pub enum WallMaterial {
        CementBonded => ("CEMENT_BONDED", "सिमेन्टको जोडाइ भएको इँटा/ढुङ्गा", "Cement-bonded brick/stone", "#4e79a7"),
        MudBonded => ("MUD_BONDED", "माटोको जोडाइ भएको इँटा/ढुङ्गा", "Mud-bonded brick/stone", "#9c755f"),
        Prefab => ("PREFAB", "प्रिफ्याब", "Prefabricated", "#76b7b2"),
        Wood => ("WOOD", "काठ/फल्याक", "Wood/planks", "#f28e2b"),
        UnbakedBrick => ("UNBAKED_BRICK", "काँचो इँटा", "Unbaked brick", "#edc948"),
        Bamboo => ("BAMBOO", "बाँस", "Bamboo", "#59a14f"),
        Other => ("OTHER", "अन्य", "Other", "#bab0ac"),
    }
}

/// What a dataset's measure counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureUnit {
    People,
    Households,
    Groups,
    Cooperatives,
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureUnit::People => write!(f, "people"),
            MeasureUnit::Households => write!(f, "households"),
            MeasureUnit::Groups => write!(f, "groups"),
            MeasureUnit::Cooperatives => write!(f, "cooperatives"),
        }
    }
}

/// A profile page's dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    MaritalStatus,
    FarmersGroups,
    Cooperatives,
    FinancialAccounts,
    HouseWallMaterial,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::MaritalStatus,
        Dataset::FarmersGroups,
        Dataset::Cooperatives,
        Dataset::FinancialAccounts,
        Dataset::HouseWallMaterial,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Dataset::MaritalStatus => "marital-status",
            Dataset::FarmersGroups => "farmers-groups",
            Dataset::Cooperatives => "cooperatives",
            Dataset::FinancialAccounts => "financial-accounts",
            Dataset::HouseWallMaterial => "house-wall-material",
        }
    }

    /// Stem of the data file and of the exported files.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Dataset::MaritalStatus => "marital_status",
            Dataset::FarmersGroups => "farmers_groups",
            Dataset::Cooperatives => "cooperatives",
            Dataset::FinancialAccounts => "financial_accounts",
            Dataset::HouseWallMaterial => "house_wall_material",
        }
    }

    pub fn title_ne(&self) -> &'static str {
        match self {
            Dataset::MaritalStatus => "वैवाहिक स्थिति अनुसार जनसंख्या",
            Dataset::FarmersGroups => "कृषक समूहहरूको विवरण",
            Dataset::Cooperatives => "सहकारी संस्थाहरूको विवरण",
            Dataset::FinancialAccounts => "वित्तीय संस्थामा खाता भएका घरधुरी",
            Dataset::HouseWallMaterial => "घरको बाहिरी गारोको बनावट",
        }
    }

    pub fn title_en(&self) -> &'static str {
        match self {
            Dataset::MaritalStatus => "Population by marital status",
            Dataset::FarmersGroups => "Farmers' groups",
            Dataset::Cooperatives => "Cooperatives",
            Dataset::FinancialAccounts => "Households by financial account",
            Dataset::HouseWallMaterial => "Households by outer wall material",
        }
    }

    pub fn unit(&self) -> MeasureUnit {
        match self {
            Dataset::MaritalStatus => MeasureUnit::People,
            Dataset::FarmersGroups => MeasureUnit::Groups,
            Dataset::Cooperatives => MeasureUnit::Cooperatives,
            Dataset::FinancialAccounts | Dataset::HouseWallMaterial => MeasureUnit::Households,
        }
    }

    /// Known category codes in their canonical order.
    pub fn category_codes(&self) -> Vec<&'static str> {
        fn codes<K: CategoryKind>() -> Vec<&'static str> {
            K::ALL.iter().map(|k| k.code()).collect()
        }
        match self {
            Dataset::MaritalStatus => codes::<MaritalStatus>(),
            Dataset::FarmersGroups => codes::<FarmerGroupType>(),
            Dataset::Cooperatives => codes::<CooperativeType>(),
            Dataset::FinancialAccounts => codes::<FinancialAccountType>(),
            Dataset::HouseWallMaterial => codes::<WallMaterial>(),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Dataset {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Dataset::ALL
            .into_iter()
            .find(|d| d.slug() == wanted)
            .ok_or_else(|| ProfileError::UnknownDataset(s.to_string()))
    }
}

/// Display data for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLabel {
    pub name_ne: String,
    pub name_en: String,
    pub color: String,
}

impl CategoryLabel {
    fn from_kind<K: CategoryKind>(k: K) -> Self {
        Self {
            name_ne: k.name_ne().to_string(),
            name_en: k.name_en().to_string(),
            color: k.color().to_string(),
        }
    }

    /// Label for a code nobody registered: the raw code stands in for both names.
    pub fn fallback(code: &str) -> Self {
        Self {
            name_ne: code.to_string(),
            name_en: code.to_string(),
            color: FALLBACK_COLOR.to_string(),
        }
    }
}

pub const FALLBACK_COLOR: &str = "#7f7f7f";

/// `dataset -> code -> label` table.
#[derive(Debug, Default)]
pub struct Catalog {
    labels: HashMap<Dataset, HashMap<&'static str, CategoryLabel>>,
}

static CATALOG: Lazy<Catalog> = Lazy::new(Catalog::build);

impl Catalog {
    /// The process-wide table, built on first use.
    pub fn global() -> &'static Catalog {
        &CATALOG
    }

    pub fn build() -> Self {
        let mut catalog = Catalog::default();
        catalog.register::<MaritalStatus>(Dataset::MaritalStatus);
        catalog.register::<FarmerGroupType>(Dataset::FarmersGroups);
        catalog.register::<CooperativeType>(Dataset::Cooperatives);
        catalog.register::<FinancialAccountType>(Dataset::FinancialAccounts);
        catalog.register::<WallMaterial>(Dataset::HouseWallMaterial);
        catalog
    }

    fn register<K: CategoryKind>(&mut self, dataset: Dataset) {
        let table = self.labels.entry(dataset).or_default();
        for k in K::ALL {
            table.insert(k.code(), CategoryLabel::from_kind(*k));
        }
    }

    pub fn get(&self, dataset: Dataset, code: &str) -> Option<&CategoryLabel> {
        self.labels.get(&dataset)?.get(code)
    }

    /// Label for `code`, falling back to the raw code for unknown categories.
    pub fn label(&self, dataset: Dataset, code: &str) -> CategoryLabel {
        self.get(dataset, code)
            .cloned()
            .unwrap_or_else(|| CategoryLabel::fallback(code))
    }

    pub fn is_known(&self, dataset: Dataset, code: &str) -> bool {
        self.get(dataset, code).is_some()
    }

    pub fn len(&self) -> usize {
        self.labels.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
