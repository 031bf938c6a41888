use serde::Serialize;

use crate::models::statistics::DataSource;

/// One dashboard panel. Each panel falls back to its sample independently.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Panel<T> {
    pub source: DataSource,
    pub data: T,
}

impl<T> Panel<T> {
    pub fn live(data: T) -> Self {
        Self {
            source: DataSource::Live,
            data,
        }
    }

    pub fn sample(data: T) -> Self {
        Self {
            source: DataSource::Sample,
            data,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_customers: u64,
    pub tours_sold: u64,
    pub total_revenue: f64,
    pub total_revenue_display: String,
    pub average_rating: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RecentBooking {
    pub booking_id: String,
    pub participant_name: String,
    pub tour_name: String,
    pub date: String,
    pub number_of_person: u32,
    pub total_price: f64,
    pub total_price_display: String,
    pub status: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct MonthlyRevenue {
    pub labels: Vec<String>,
    pub revenue: Vec<f64>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RecentReview {
    pub user_name: String,
    pub user_image_url: Option<String>,
    pub tour_name: String,
    pub date: String,
    pub rating: f64,
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub stats: Panel<DashboardStats>,
    pub recent_bookings: Panel<Vec<RecentBooking>>,
    pub revenue_chart: Panel<MonthlyRevenue>,
    pub recent_reviews: Panel<Vec<RecentReview>>,
}
