use serde::{Deserialize, Serialize};

/// Whether a panel was computed from the document store or is the
/// hard-coded sample substituted on empty results and errors.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Sample,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "90days")]
    Last90Days,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "all")]
    All,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

#[derive(Debug, Deserialize)]
pub struct StatisticsQuery {
    pub range: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RevenueStats {
    pub total_revenue: f64,
    pub total_revenue_display: String,
    pub total_bookings: u64,
    pub new_users: u64,
    pub avg_order_value: f64,
    pub avg_order_value_display: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct RevenueChart {
    pub labels: Vec<String>,
    pub revenue: Vec<f64>,
    pub bookings: Vec<u64>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct CategoryChart {
    pub labels: Vec<String>,
    pub bookings: Vec<u64>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct UserGrowthChart {
    pub labels: Vec<String>,
    pub new_users: Vec<u64>,
    pub total_users: Vec<u64>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TopTour {
    pub tour_id: String,
    pub title: String,
    pub category: String,
    pub image_url: Option<String>,
    pub bookings: u64,
    pub revenue: f64,
    pub revenue_display: String,
    pub avg_rating: f64,
    pub rating_display: String,
    pub conversion_rate: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StatisticsReport {
    pub source: DataSource,
    pub range: DateRange,
    pub granularity: Granularity,
    pub revenue_stats: RevenueStats,
    pub revenue_chart: RevenueChart,
    pub category_chart: CategoryChart,
    pub user_growth: UserGrowthChart,
    pub top_tours: Vec<TopTour>,
}
