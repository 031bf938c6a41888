use std::collections::HashMap;

use chrono::{DateTime as ChronoDateTime, Datelike, Duration, TimeZone, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::Collection;
use thiserror::Error;

use crate::db::mongo::{parse_id, Store, BOOKINGS, REVIEWS, USERS};
use crate::models::booking::{Booking, STATUS_COMPLETED};
use crate::models::review::Review;
use crate::models::statistics::{
    CategoryChart, DataSource, DateRange, Granularity, RevenueChart, RevenueStats, StatisticsReport,
    TopTour, UserGrowthChart,
};
use crate::models::tour::Tour;
use crate::models::user::User;
use crate::models::{from_chrono, to_chrono};
use crate::services::format::{format_rating, format_vnd};
use crate::services::tour_service::{MongoTourRepository, TourRepository};

pub const TOP_TOUR_LIMIT: usize = 10;
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("No {0} data in the selected range")]
    NoData(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl DateRange {
    /// Unknown or missing values select the last 30 days.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("7days") => DateRange::Last7Days,
            Some("90days") => DateRange::Last90Days,
            Some("year") => DateRange::Year,
            Some("all") => DateRange::All,
            _ => DateRange::Last30Days,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Last7Days => "7days",
            DateRange::Last30Days => "30days",
            DateRange::Last90Days => "90days",
            DateRange::Year => "year",
            DateRange::All => "all",
        }
    }

    pub fn start(&self, now: ChronoDateTime<Utc>) -> ChronoDateTime<Utc> {
        match self {
            DateRange::Last7Days => now - Duration::days(7),
            DateRange::Last30Days => now - Duration::days(30),
            DateRange::Last90Days => now - Duration::days(90),
            DateRange::Year => Utc
                .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
            DateRange::All => Utc
                .with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            DateRange::Last7Days | DateRange::Last30Days => Granularity::Day,
            DateRange::Last90Days | DateRange::Year => Granularity::Week,
            DateRange::All => Granularity::Month,
        }
    }
}

/// `Week N`, counted from 1 January with the weekday of 1 January as offset.
/// Not an ISO week number.
pub fn week_label(at: ChronoDateTime<Utc>) -> String {
    let jan1 = Utc
        .with_ymd_and_hms(at.year(), 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(at);
    let days_since_jan1 = (at - jan1).num_milliseconds() as f64 / 86_400_000.0;
    let offset = f64::from(jan1.weekday().num_days_from_sunday());

    format!("Week {}", ((days_since_jan1 + offset + 1.0) / 7.0).ceil() as i64)
}

pub fn month_label(at: ChronoDateTime<Utc>) -> &'static str {
    MONTHS[at.month0() as usize]
}

pub fn bucket_label(at: ChronoDateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => at.format("%Y-%m-%d").to_string(),
        Granularity::Week => week_label(at),
        Granularity::Month => month_label(at).to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub total: f64,
    pub count: u64,
}

/// Groups `(timestamp, value)` records into labelled buckets. Records without a
/// timestamp or with a missing or zero value are dropped. Buckets keep the
/// order in which their label first appears after sorting by time; records of
/// different years that share a label land in the same bucket.
pub fn bucketize<I>(records: I, granularity: Granularity) -> Vec<Bucket>
where
    I: IntoIterator<Item = (Option<DateTime>, Option<f64>)>,
{
    let mut points: Vec<(DateTime, f64)> = records
        .into_iter()
        .filter_map(|(at, value)| match (at, value) {
            (Some(at), Some(value)) if value != 0.0 && value.is_finite() => Some((at, value)),
            _ => None,
        })
        .collect();
    points.sort_by_key(|(at, _)| *at);

    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (at, value) in points {
        let label = bucket_label(to_chrono(at), granularity);
        match index.get(&label) {
            Some(&i) => {
                buckets[i].total += value;
                buckets[i].count += 1;
            }
            None => {
                index.insert(label.clone(), buckets.len());
                buckets.push(Bucket {
                    label,
                    total: value,
                    count: 1,
                });
            }
        }
    }

    buckets
}

pub fn cumulative(values: &[u64]) -> Vec<u64> {
    values
        .iter()
        .scan(0u64, |total, value| {
            *total += value;
            Some(*total)
        })
        .collect()
}

pub fn revenue_stats(total_bookings: u64, completed: &[Booking], new_users: u64) -> Result<RevenueStats, StatisticsError> {
    if total_bookings == 0 && new_users == 0 {
        return Err(StatisticsError::NoData("booking or user"));
    }

    let total_revenue: f64 = completed.iter().filter_map(|b| b.total_price).sum();
    let avg_order_value = if completed.is_empty() {
        0.0
    } else {
        total_revenue / completed.len() as f64
    };

    Ok(RevenueStats {
        total_revenue,
        total_revenue_display: format_vnd(total_revenue),
        total_bookings,
        new_users,
        avg_order_value,
        avg_order_value_display: format_vnd(avg_order_value),
    })
}

pub fn revenue_chart(completed: &[Booking], granularity: Granularity) -> Result<RevenueChart, StatisticsError> {
    let buckets = bucketize(
        completed.iter().map(|b| (b.tour_date_start, b.total_price)),
        granularity,
    );
    if buckets.is_empty() {
        return Err(StatisticsError::NoData("revenue"));
    }

    Ok(RevenueChart {
        labels: buckets.iter().map(|b| b.label.clone()).collect(),
        revenue: buckets.iter().map(|b| b.total).collect(),
        bookings: buckets.iter().map(|b| b.count).collect(),
    })
}

/// Distinct tour ids referenced by `bookings`, in first-seen order.
pub fn distinct_tour_ids(bookings: &[Booking]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in bookings.iter().filter_map(|b| b.tour_id.as_ref()) {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    ids
}

fn category_of(tour: Option<&Tour>) -> &str {
    tour.map(|t| t.category.trim())
        .filter(|c| !c.is_empty())
        .unwrap_or("Uncategorized")
}

/// Categories of the tours that were found come first, in the order their
/// tours are first booked; bookings of unknown tours count as `Uncategorized`.
pub fn category_chart(bookings: &[Booking], tours: &HashMap<String, Tour>) -> Result<CategoryChart, StatisticsError> {
    let mut chart = CategoryChart::default();

    for tour_id in distinct_tour_ids(bookings) {
        let Some(tour) = tours.get(&tour_id) else {
            continue;
        };
        let category = category_of(Some(tour));
        if !chart.labels.iter().any(|l| l == category) {
            chart.labels.push(category.to_string());
            chart.bookings.push(0);
        }
    }

    for tour_id in bookings.iter().filter_map(|b| b.tour_id.as_ref()) {
        let category = category_of(tours.get(tour_id));

        match chart.labels.iter().position(|l| l == category) {
            Some(i) => chart.bookings[i] += 1,
            None => {
                chart.labels.push(category.to_string());
                chart.bookings.push(1);
            }
        }
    }

    if chart.labels.is_empty() {
        return Err(StatisticsError::NoData("category"));
    }
    Ok(chart)
}

pub fn user_growth(users: &[User], granularity: Granularity) -> Result<UserGrowthChart, StatisticsError> {
    let buckets = bucketize(users.iter().map(|u| (u.created_at, Some(1.0))), granularity);
    if buckets.is_empty() {
        return Err(StatisticsError::NoData("user"));
    }

    let new_users: Vec<u64> = buckets.iter().map(|b| b.count).collect();
    Ok(UserGrowthChart {
        labels: buckets.into_iter().map(|b| b.label).collect(),
        total_users: cumulative(&new_users),
        new_users,
    })
}

/// Mean over every review; an unrated review counts as 0.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: f64 = reviews.iter().map(|r| r.rating.unwrap_or(0.0)).sum();
    total / reviews.len() as f64
}

/// Booking count over every status, revenue over completed bookings only.
pub fn top_tours(
    bookings: &[Booking],
    tours: &HashMap<String, Tour>,
    ratings: &HashMap<String, f64>,
) -> Result<Vec<TopTour>, StatisticsError> {
    let mut rows: Vec<TopTour> = Vec::new();

    for booking in bookings {
        let Some(tour_id) = booking.tour_id.as_ref() else {
            continue;
        };
        let i = match rows.iter().position(|r| &r.tour_id == tour_id) {
            Some(i) => i,
            None => {
                let tour = tours.get(tour_id);
                let avg_rating = ratings.get(tour_id).copied().unwrap_or(0.0);
                rows.push(TopTour {
                    tour_id: tour_id.clone(),
                    title: tour.map(|t| t.title.clone()).unwrap_or_else(|| "Unknown Tour".to_string()),
                    category: tour.map(|t| t.category.clone()).unwrap_or_else(|| "N/A".to_string()),
                    image_url: tour.and_then(|t| t.tour_image_url.clone()),
                    bookings: 0,
                    revenue: 0.0,
                    revenue_display: String::new(),
                    avg_rating,
                    rating_display: format_rating(avg_rating),
                    conversion_rate: "N/A".to_string(),
                });
                rows.len() - 1
            }
        };

        rows[i].bookings += 1;
        if booking.is_completed() {
            rows[i].revenue += booking.total_price.unwrap_or(0.0);
        }
    }

    if rows.is_empty() {
        return Err(StatisticsError::NoData("tour"));
    }

    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    rows.truncate(TOP_TOUR_LIMIT);
    for row in &mut rows {
        row.revenue_display = format_vnd(row.revenue);
    }
    Ok(rows)
}

fn sample_top_tour(n: usize, title: &str, category: &str, bookings: u64, revenue: f64, rating: f64, conversion: &str) -> TopTour {
    TopTour {
        tour_id: format!("sample-{}", n),
        title: title.to_string(),
        category: category.to_string(),
        image_url: None,
        bookings,
        revenue,
        revenue_display: format_vnd(revenue),
        avg_rating: rating,
        rating_display: format_rating(rating),
        conversion_rate: conversion.to_string(),
    }
}

pub fn sample_revenue_series() -> (Vec<String>, Vec<f64>) {
    (
        MONTHS[..6].iter().map(|m| m.to_string()).collect(),
        vec![
            69_000_000.0,
            92_000_000.0,
            115_000_000.0,
            138_000_000.0,
            126_500_000.0,
            110_400_000.0,
        ],
    )
}

/// Substituted for the whole report whenever any part of it cannot be
/// computed.
pub fn sample_report(range: DateRange) -> StatisticsReport {
    let (labels, revenue) = sample_revenue_series();
    let total_revenue = 650_900_000.0;
    let total_bookings = 87;

    StatisticsReport {
        source: DataSource::Sample,
        range,
        granularity: range.granularity(),
        revenue_stats: RevenueStats {
            total_revenue,
            total_revenue_display: format_vnd(total_revenue),
            total_bookings,
            new_users: 32,
            avg_order_value: total_revenue / total_bookings as f64,
            avg_order_value_display: format_vnd(total_revenue / total_bookings as f64),
        },
        revenue_chart: RevenueChart {
            labels,
            revenue,
            bookings: vec![8, 12, 18, 14, 16, 10],
        },
        category_chart: CategoryChart {
            labels: ["Adventure", "Cultural", "Beach", "City", "Nature"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            bookings: vec![25, 18, 22, 15, 20],
        },
        user_growth: UserGrowthChart {
            labels: (1..=6).map(|w| format!("Week {}", w)).collect(),
            new_users: vec![5, 8, 6, 9, 4, 7],
            total_users: vec![5, 13, 19, 28, 32, 39],
        },
        top_tours: vec![
            sample_top_tour(1, "Bali Adventure Package", "Adventure", 24, 99_360_000.0, 4.8, "14.2%"),
            sample_top_tour(2, "Tokyo Cultural Experience", "Cultural", 18, 74_520_000.0, 4.5, "12.8%"),
            sample_top_tour(3, "Phuket Beach Getaway", "Beach", 16, 66_240_000.0, 4.3, "11.5%"),
            sample_top_tour(4, "New York City Explorer", "City", 12, 49_680_000.0, 4.0, "9.8%"),
            sample_top_tour(5, "Swiss Alps Hiking", "Nature", 8, 42_320_000.0, 4.7, "8.5%"),
        ],
    }
}

/// Referenced tours by id. Malformed ids and failed lookups are left out, so
/// their bookings read as unknown tours.
pub async fn lookup_tours<R: TourRepository>(repo: &R, ids: &[String]) -> HashMap<String, Tour> {
    let mut tours = HashMap::new();
    for id in ids {
        let Some(oid) = parse_id(id) else {
            continue;
        };
        match repo.find_tour(&oid).await {
            Ok(Some(tour)) => {
                tours.insert(id.clone(), tour);
            }
            Ok(None) => {}
            Err(e) => log::error!("Error loading tour {} for statistics: {}", id, e),
        }
    }
    tours
}

/// Read side of the report: one query per branch, plus one per referenced
/// tour for lookups.
pub struct StatisticsQueries {
    bookings: Collection<Booking>,
    users: Collection<User>,
    tours: MongoTourRepository,
    reviews: Collection<Review>,
}

impl StatisticsQueries {
    pub fn new(store: &Store) -> Self {
        Self {
            bookings: store.collection(BOOKINGS),
            users: store.collection(USERS),
            tours: MongoTourRepository::new(store),
            reviews: store.collection(REVIEWS),
        }
    }

    fn in_range(field: &str, start: DateTime, end: DateTime) -> Document {
        doc! { field: { "$gte": start, "$lte": end } }
    }

    async fn bookings_in_range(&self, start: DateTime, end: DateTime, completed_only: bool) -> Result<Vec<Booking>, StatisticsError> {
        let mut filter = Self::in_range("tour_date_start", start, end);
        if completed_only {
            filter.insert("status", STATUS_COMPLETED);
        }
        let cursor = self
            .bookings
            .find(filter)
            .sort(doc! { "tour_date_start": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn users_in_range(&self, start: DateTime, end: DateTime) -> Result<Vec<User>, StatisticsError> {
        let cursor = self
            .users
            .find(Self::in_range("created_at", start, end))
            .sort(doc! { "created_at": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn reviews_of(&self, tour_id: &str) -> mongodb::error::Result<Vec<Review>> {
        self.reviews
            .find(doc! { "tour_id": tour_id })
            .await?
            .try_collect()
            .await
    }

    /// Tours whose reviews fail to load are left out and rank with 0.
    async fn tour_ratings(&self, ids: &[String]) -> HashMap<String, f64> {
        let mut ratings = HashMap::new();
        for id in ids {
            match self.reviews_of(id).await {
                Ok(reviews) => {
                    ratings.insert(id.clone(), average_rating(&reviews));
                }
                Err(e) => log::error!("Error loading reviews of tour {}: {}", id, e),
            }
        }
        ratings
    }

    async fn revenue_stats(&self, start: DateTime, end: DateTime) -> Result<RevenueStats, StatisticsError> {
        let total_bookings = self
            .bookings
            .count_documents(Self::in_range("tour_date_start", start, end))
            .await?;
        let completed = self.bookings_in_range(start, end, true).await?;
        let new_users = self
            .users
            .count_documents(Self::in_range("created_at", start, end))
            .await?;
        revenue_stats(total_bookings, &completed, new_users)
    }

    async fn revenue_chart(&self, start: DateTime, end: DateTime, granularity: Granularity) -> Result<RevenueChart, StatisticsError> {
        let completed = self.bookings_in_range(start, end, true).await?;
        revenue_chart(&completed, granularity)
    }

    async fn category_chart(&self, start: DateTime, end: DateTime) -> Result<CategoryChart, StatisticsError> {
        let bookings = self.bookings_in_range(start, end, false).await?;
        let tours = lookup_tours(&self.tours, &distinct_tour_ids(&bookings)).await;
        category_chart(&bookings, &tours)
    }

    async fn user_growth(&self, start: DateTime, end: DateTime, granularity: Granularity) -> Result<UserGrowthChart, StatisticsError> {
        let users = self.users_in_range(start, end).await?;
        user_growth(&users, granularity)
    }

    async fn top_tours(&self, start: DateTime, end: DateTime) -> Result<Vec<TopTour>, StatisticsError> {
        let bookings = self.bookings_in_range(start, end, false).await?;
        let ids = distinct_tour_ids(&bookings);
        let tours = lookup_tours(&self.tours, &ids).await;
        let ratings = self.tour_ratings(&ids).await;
        top_tours(&bookings, &tours, &ratings)
    }

    pub async fn live_report(&self, range: DateRange, now: ChronoDateTime<Utc>) -> Result<StatisticsReport, StatisticsError> {
        let start = from_chrono(range.start(now));
        let end = from_chrono(now);
        let granularity = range.granularity();

        let (revenue_stats, revenue_chart, category_chart, user_growth, top_tours) = futures::try_join!(
            self.revenue_stats(start, end),
            self.revenue_chart(start, end, granularity),
            self.category_chart(start, end),
            self.user_growth(start, end, granularity),
            self.top_tours(start, end),
        )?;

        Ok(StatisticsReport {
            source: DataSource::Live,
            range,
            granularity,
            revenue_stats,
            revenue_chart,
            category_chart,
            user_growth,
            top_tours,
        })
    }
}

/// The live report, or the sample report if any branch fails or is empty.
pub async fn load_report(store: &Store, range: DateRange, now: ChronoDateTime<Utc>) -> StatisticsReport {
    match StatisticsQueries::new(store).live_report(range, now).await {
        Ok(report) => report,
        Err(e) => {
            log::warn!("Statistics for {} fell back to sample data: {}", range.as_str(), e);
            sample_report(range)
        }
    }
}
