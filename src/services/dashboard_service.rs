use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Collection;

use crate::db::mongo::{parse_id, Store, BOOKINGS, REVIEWS, USERS};
use crate::error::ApiResult;
use crate::models::booking::{Booking, PAYMENT_PAID, STATUS_COMPLETED};
use crate::models::dashboard::{
    DashboardOverview, DashboardStats, MonthlyRevenue, Panel, RecentBooking, RecentReview,
};
use crate::models::format_display_date;
use crate::models::review::Review;
use crate::models::statistics::Granularity;
use crate::models::user::User;
use crate::services::format::{format_rating, format_vnd};
use crate::services::statistics_service::{average_rating, bucketize, sample_revenue_series};
use crate::services::tour_service::{MongoTourRepository, TourRepository};

pub const RECENT_BOOKING_LIMIT: i64 = 5;
pub const RECENT_REVIEW_LIMIT: i64 = 3;

/// Completed bookings count as revenue; when there are none, paid ones do.
pub fn revenue_bookings(completed: Vec<Booking>, paid: Vec<Booking>) -> Vec<Booking> {
    if completed.is_empty() {
        paid
    } else {
        completed
    }
}

/// `None` when the store holds no users, bookings or reviews at all.
pub fn dashboard_stats(customers: u64, bookings: u64, revenue: &[Booking], reviews: &[Review]) -> Option<DashboardStats> {
    if customers == 0 && bookings == 0 && reviews.is_empty() {
        return None;
    }

    let total_revenue: f64 = revenue.iter().filter_map(|b| b.total_price).sum();
    Some(DashboardStats {
        total_customers: customers,
        tours_sold: bookings,
        total_revenue,
        total_revenue_display: format_vnd(total_revenue),
        average_rating: format_rating(average_rating(reviews)),
    })
}

pub fn monthly_revenue(revenue: &[Booking]) -> MonthlyRevenue {
    let buckets = bucketize(
        revenue.iter().map(|b| (b.tour_date_start, b.total_price)),
        Granularity::Month,
    );
    MonthlyRevenue {
        labels: buckets.iter().map(|b| b.label.clone()).collect(),
        revenue: buckets.iter().map(|b| b.total).collect(),
    }
}

pub fn recent_booking_row(booking: &Booking, tour_title: Option<String>) -> RecentBooking {
    let total_price = booking.total_price.unwrap_or(0.0);
    RecentBooking {
        booking_id: booking.id.map(|id| id.to_hex()).unwrap_or_default(),
        participant_name: booking
            .participant_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        tour_name: tour_title.unwrap_or_else(|| "Unknown Tour".to_string()),
        date: booking
            .tour_date_start
            .map(format_display_date)
            .unwrap_or_default(),
        number_of_person: booking.number_of_person.unwrap_or(1),
        total_price,
        total_price_display: format_vnd(total_price),
        status: booking.display_status(),
    }
}

/// `user` is `Err` when the lookup failed and `Ok(None)` when the review has no
/// user or the user no longer exists.
pub fn recent_review_row(review: &Review, user: Result<Option<User>, String>, tour_title: Option<String>) -> RecentReview {
    let (user_name, user_image_url) = match user {
        Ok(Some(user)) => (user.display_name(), user.user_image_url),
        Ok(None) | Err(_) => ("Anonymous User".to_string(), None),
    };

    RecentReview {
        user_name,
        user_image_url,
        tour_name: tour_title.unwrap_or_else(|| "Unknown Tour".to_string()),
        date: review.created_at.map(format_display_date).unwrap_or_default(),
        rating: review.rating.unwrap_or(0.0),
        comment: review
            .comment
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "No comment provided.".to_string()),
    }
}

pub fn sample_stats() -> DashboardStats {
    DashboardStats {
        total_customers: 156,
        tours_sold: 87,
        total_revenue: 12_450_000.0,
        total_revenue_display: format_vnd(12_450_000.0),
        average_rating: "4.7".to_string(),
    }
}

fn sample_booking(id: &str, name: &str, tour: &str, date: &str, people: u32, price: f64, status: &str) -> RecentBooking {
    RecentBooking {
        booking_id: id.to_string(),
        participant_name: name.to_string(),
        tour_name: tour.to_string(),
        date: date.to_string(),
        number_of_person: people,
        total_price: price,
        total_price_display: format_vnd(price),
        status: status.to_string(),
    }
}

pub fn sample_bookings() -> Vec<RecentBooking> {
    vec![
        sample_booking("BK12345A", "Nguyen Van A", "Ha Long Bay Cruise", "14/04/2025", 2, 4_600_000.0, "Completed"),
        sample_booking("BK12346B", "Tran Thi B", "Sapa Trekking Adventure", "12/04/2025", 4, 8_280_000.0, "Completed"),
        sample_booking("BK12347C", "Le Van C", "Hoi An Cultural Tour", "10/04/2025", 3, 5_520_000.0, "Pending"),
        sample_booking("BK12348D", "Pham Thi D", "Mekong Delta Experience", "08/04/2025", 2, 3_450_000.0, "Completed"),
        sample_booking("BK12349E", "Hoang Van E", "Phu Quoc Island Getaway", "05/04/2025", 2, 9_200_000.0, "Failed"),
    ]
}

pub fn sample_monthly_revenue() -> MonthlyRevenue {
    let (labels, revenue) = sample_revenue_series();
    MonthlyRevenue { labels, revenue }
}

fn sample_review(name: &str, tour: &str, date: &str, comment: &str) -> RecentReview {
    RecentReview {
        user_name: name.to_string(),
        user_image_url: None,
        tour_name: tour.to_string(),
        date: date.to_string(),
        rating: 5.0,
        comment: comment.to_string(),
    }
}

pub fn sample_reviews() -> Vec<RecentReview> {
    vec![
        sample_review(
            "Nguyen Van A",
            "Ha Long Bay Cruise",
            "14/04/2025",
            "Amazing experience! The cruise was luxurious and the scenery was breathtaking. The staff were very attentive and professional. Highly recommend this tour!",
        ),
        sample_review(
            "Tran Thi B",
            "Sapa Trekking Adventure",
            "12/04/2025",
            "The trek was challenging but so rewarding! Our guide was knowledgeable about the local culture and very helpful. The homestay experience was authentic and memorable.",
        ),
        sample_review(
            "Le Van C",
            "Hoi An Cultural Tour",
            "10/04/2025",
            "Hoi An is such a beautiful city! The lanterns at night are magical. Our tour guide showed us all the hidden gems and best local food spots. The tailor shops were also amazing.",
        ),
    ]
}

/// Live data when the panel loaded and is non-empty, the sample otherwise.
fn panel_or_sample<T>(name: &str, loaded: ApiResult<Option<T>>, sample: fn() -> T) -> Panel<T> {
    match loaded {
        Ok(Some(data)) => Panel::live(data),
        Ok(None) => {
            log::info!("Dashboard {} panel is empty, showing sample data", name);
            Panel::sample(sample())
        }
        Err(e) => {
            log::error!("Dashboard {} panel failed, showing sample data: {}", name, e);
            Panel::sample(sample())
        }
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Title of a booked or reviewed tour. A failed lookup reads as unknown.
pub async fn tour_title<R: TourRepository>(repo: &R, tour_id: Option<&str>) -> Option<String> {
    let oid = tour_id.and_then(parse_id)?;
    match repo.find_tour(&oid).await {
        Ok(tour) => tour.map(|t| t.title),
        Err(e) => {
            log::error!("Error loading tour {} for the dashboard: {}", oid, e);
            None
        }
    }
}

pub async fn booking_rows<R: TourRepository>(repo: &R, bookings: &[Booking]) -> Vec<RecentBooking> {
    let mut rows = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let title = tour_title(repo, booking.tour_id.as_deref()).await;
        rows.push(recent_booking_row(booking, title));
    }
    rows
}

pub struct DashboardQueries {
    bookings: Collection<Booking>,
    users: Collection<User>,
    tours: MongoTourRepository,
    reviews: Collection<Review>,
}

impl DashboardQueries {
    pub fn new(store: &Store) -> Self {
        Self {
            bookings: store.collection(BOOKINGS),
            users: store.collection(USERS),
            tours: MongoTourRepository::new(store),
            reviews: store.collection(REVIEWS),
        }
    }

    async fn revenue_bookings(&self) -> ApiResult<Vec<Booking>> {
        let completed: Vec<Booking> = self
            .bookings
            .find(doc! { "status": STATUS_COMPLETED })
            .await?
            .try_collect()
            .await?;
        if !completed.is_empty() {
            return Ok(completed);
        }
        let paid: Vec<Booking> = self
            .bookings
            .find(doc! { "payment_status": PAYMENT_PAID })
            .await?
            .try_collect()
            .await?;
        Ok(revenue_bookings(completed, paid))
    }

    async fn stats(&self) -> ApiResult<Option<DashboardStats>> {
        let customers = self.users.count_documents(doc! {}).await?;
        let bookings = self.bookings.count_documents(doc! {}).await?;
        let revenue = self.revenue_bookings().await?;
        let reviews: Vec<Review> = self.reviews.find(doc! {}).await?.try_collect().await?;
        Ok(dashboard_stats(customers, bookings, &revenue, &reviews))
    }

    async fn recent_bookings(&self) -> ApiResult<Option<Vec<RecentBooking>>> {
        let bookings: Vec<Booking> = self
            .bookings
            .find(doc! {})
            .sort(doc! { "tour_date_start": -1 })
            .limit(RECENT_BOOKING_LIMIT)
            .await?
            .try_collect()
            .await?;

        Ok(non_empty(booking_rows(&self.tours, &bookings).await))
    }

    async fn revenue_chart(&self) -> ApiResult<Option<MonthlyRevenue>> {
        let chart = monthly_revenue(&self.revenue_bookings().await?);
        Ok(if chart.labels.is_empty() { None } else { Some(chart) })
    }

    async fn recent_reviews(&self) -> ApiResult<Option<Vec<RecentReview>>> {
        let reviews: Vec<Review> = self
            .reviews
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .limit(RECENT_REVIEW_LIMIT)
            .await?
            .try_collect()
            .await?;

        let mut rows = Vec::with_capacity(reviews.len());
        for review in &reviews {
            let user = match review.user_id.as_deref().and_then(parse_id) {
                Some(oid) => self
                    .users
                    .find_one(doc! { "_id": oid })
                    .await
                    .map_err(|e| e.to_string()),
                None => Ok(None),
            };
            let title = tour_title(&self.tours, review.tour_id.as_deref()).await;
            rows.push(recent_review_row(review, user, title));
        }
        Ok(non_empty(rows))
    }
}

/// Each panel loads and falls back on its own.
pub async fn load_overview(store: &Store) -> DashboardOverview {
    let queries = DashboardQueries::new(store);

    let (stats, recent_bookings, revenue_chart, recent_reviews) = futures::join!(
        queries.stats(),
        queries.recent_bookings(),
        queries.revenue_chart(),
        queries.recent_reviews(),
    );

    DashboardOverview {
        stats: panel_or_sample("stats", stats, sample_stats),
        recent_bookings: panel_or_sample("recent bookings", recent_bookings, sample_bookings),
        revenue_chart: panel_or_sample("revenue", revenue_chart, sample_monthly_revenue),
        recent_reviews: panel_or_sample("recent reviews", recent_reviews, sample_reviews),
    }
}

pub async fn load_stats(store: &Store) -> Panel<DashboardStats> {
    panel_or_sample("stats", DashboardQueries::new(store).stats().await, sample_stats)
}

pub async fn load_recent_bookings(store: &Store) -> Panel<Vec<RecentBooking>> {
    panel_or_sample(
        "recent bookings",
        DashboardQueries::new(store).recent_bookings().await,
        sample_bookings,
    )
}

pub async fn load_revenue_chart(store: &Store) -> Panel<MonthlyRevenue> {
    panel_or_sample(
        "revenue",
        DashboardQueries::new(store).revenue_chart().await,
        sample_monthly_revenue,
    )
}

pub async fn load_recent_reviews(store: &Store) -> Panel<Vec<RecentReview>> {
    panel_or_sample(
        "recent reviews",
        DashboardQueries::new(store).recent_reviews().await,
        sample_reviews,
    )
}
