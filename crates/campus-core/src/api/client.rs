//! API client for communicating with the campus REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests for courses, grades, attendance, meals, wallet, events
//! and room reservations.

use std::fmt::Display;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::authenticated::{check_response, ApiRequest, AuthenticatedClient};
use super::{payload, ApiError};
use crate::auth::{is_usable_token, TokenKind, TokenStore};
use crate::models::{
    AttendanceRecord, AttendanceSession, AuthTokens, CampusEvent, CheckInRequest, Classroom,
    Course, EnrollRequest, Enrollment, EventRegistration, Grade, Id, LoginRequest, LogoutRequest,
    MealMenu, MealReservation, MealReservationRequest, ProfileUpdate, RoomReservation,
    RoomReservationRequest, Section, TopUpRequest, UserProfile, Wallet, WalletTransaction,
};
use crate::navigation::Navigator;

/// API client for the campus backend.
/// Clone is cheap - the HTTP client and token store are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: AuthenticatedClient,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        Ok(Self {
            http: AuthenticatedClient::new(base_url, tokens, navigator)?,
        })
    }

    pub fn from_authenticated(http: AuthenticatedClient) -> Self {
        Self { http }
    }

    pub fn authenticated(&self) -> &AuthenticatedClient {
        &self.http
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        self.http.tokens()
    }

    /// True when a usable access token is stored. Says nothing about
    /// whether the server still accepts it.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.tokens().usable(TokenKind::Access)?.is_some())
    }

    /// Execute a request and decode its JSON body, converting error statuses into `ApiError`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let label = format!("{} {}", request.method, request.path);
        let response = self.http.execute(request).await?;
        Self::decode_response(response, &label).await
    }

    async fn decode_response<T: DeserializeOwned>(response: Response, label: &str) -> Result<T> {
        let response = check_response(response).await?;
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", label))?;
        payload::decode(&text).with_context(|| format!("Failed to parse JSON response from {}", label))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(ApiRequest::put(path).json(body)?).await
    }

    /// DELETE a resource, ignoring any response body
    pub async fn delete(&self, path: &str) -> Result<()> {
        let _: serde_json::Value = self.send_json(ApiRequest::delete(path)).await?;
        Ok(())
    }

    // ===== Auth =====

    /// Log in with email and password and persist the returned tokens.
    /// A 401 here means bad credentials, so the refresh cycle is skipped
    /// and the server's message is kept for the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let mut request = ApiRequest::post("/auth/login").json(&body)?;
        request.mark_retried();

        let response = self.http.execute(request).await.context("Login failed")?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::InvalidCredentials(ApiError::detail(&body)).into());
        }
        let tokens: AuthTokens = Self::decode_response(response, "POST /auth/login")
            .await
            .context("Login failed")?;
        if !is_usable_token(&tokens.access_token) {
            return Err(ApiError::InvalidResponse(
                "Login response carried no access token".to_string(),
            )
            .into());
        }

        self.tokens()
            .store_pair(&tokens.access_token, tokens.refresh_token.as_deref())
            .context("Failed to store tokens")?;
        // Without a rotated refresh token an older one would outlive this login
        if tokens.refresh_token.is_none() {
            self.tokens().clear(TokenKind::Refresh)?;
        }

        info!(email = email, "Logged in");
        Ok(tokens)
    }

    /// Revoke the refresh token on the server (best effort) and clear local tokens.
    pub async fn logout(&self) -> Result<()> {
        if let Some(refresh_token) = self.tokens().usable(TokenKind::Refresh)? {
            let mut request = ApiRequest::post("/auth/logout").json(&LogoutRequest { refresh_token })?;
            request.mark_retried();
            if let Err(e) = self.send_json::<serde_json::Value>(request).await {
                warn!(error = %e, "Server-side logout failed, clearing local tokens anyway");
            }
        }
        self.tokens().clear_all().context("Failed to clear stored tokens")?;
        info!("Logged out");
        Ok(())
    }

    // ===== Users =====

    pub async fn profile(&self) -> Result<UserProfile> {
        self.get("/users/me").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.put("/users/me", update).await
    }

    // ===== Courses & enrollment =====

    pub async fn courses(&self) -> Result<Vec<Course>> {
        self.get("/courses").await
    }

    pub async fn course(&self, course_id: impl Display) -> Result<Course> {
        self.get(&format!("/courses/{}", course_id)).await
    }

    pub async fn course_sections(&self, course_id: impl Display) -> Result<Vec<Section>> {
        self.get(&format!("/courses/{}/sections", course_id)).await
    }

    pub async fn my_enrollments(&self) -> Result<Vec<Enrollment>> {
        self.get("/enrollments/my-courses").await
    }

    pub async fn enroll(&self, section_id: Id) -> Result<Enrollment> {
        debug!(section = %section_id, "Enrolling in section");
        self.post("/enrollments", &EnrollRequest { section_id }).await
    }

    pub async fn drop_enrollment(&self, enrollment_id: impl Display) -> Result<()> {
        self.delete(&format!("/enrollments/{}", enrollment_id)).await
    }

    pub async fn my_grades(&self) -> Result<Vec<Grade>> {
        self.get("/grades/my-grades").await
    }

    // ===== Attendance =====

    pub async fn active_attendance_sessions(&self) -> Result<Vec<AttendanceSession>> {
        self.get("/attendance/sessions/active").await
    }

    pub async fn check_in(
        &self,
        session_id: impl Display,
        latitude: f64,
        longitude: f64,
    ) -> Result<AttendanceRecord> {
        anyhow::ensure!(
            (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude),
            "Coordinates out of range: {}, {}",
            latitude,
            longitude
        );
        self.post(
            &format!("/attendance/sessions/{}/checkin", session_id),
            &CheckInRequest { latitude, longitude },
        )
        .await
    }

    pub async fn my_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        self.get("/attendance/my-attendance").await
    }

    // ===== Meals =====

    pub async fn meal_menus(&self, date: Option<NaiveDate>) -> Result<Vec<MealMenu>> {
        let mut request = ApiRequest::get("/meals/menus");
        if let Some(date) = date {
            request = request.query("date", date.format("%Y-%m-%d"));
        }
        self.send_json(request).await
    }

    pub async fn reserve_meal(&self, menu_id: Id) -> Result<MealReservation> {
        self.post("/meals/reservations", &MealReservationRequest { menu_id }).await
    }

    pub async fn my_meal_reservations(&self) -> Result<Vec<MealReservation>> {
        self.get("/meals/reservations/my-reservations").await
    }

    pub async fn cancel_meal_reservation(&self, reservation_id: impl Display) -> Result<()> {
        self.delete(&format!("/meals/reservations/{}", reservation_id)).await
    }

    // ===== Wallet =====

    pub async fn wallet(&self) -> Result<Wallet> {
        self.get("/wallet/balance").await
    }

    pub async fn wallet_transactions(&self) -> Result<Vec<WalletTransaction>> {
        self.get("/wallet/transactions").await
    }

    pub async fn top_up(&self, amount: f64) -> Result<Wallet> {
        anyhow::ensure!(
            amount.is_finite() && amount > 0.0,
            "Top-up amount must be a positive number"
        );
        self.post("/wallet/topup", &TopUpRequest { amount }).await
    }

    // ===== Events =====

    pub async fn events(&self) -> Result<Vec<CampusEvent>> {
        self.get("/events").await
    }

    pub async fn register_event(&self, event_id: impl Display) -> Result<EventRegistration> {
        self.post(&format!("/events/{}/register", event_id), &serde_json::json!({}))
            .await
    }

    pub async fn my_event_registrations(&self) -> Result<Vec<EventRegistration>> {
        self.get("/events/my-registrations").await
    }

    // ===== Rooms =====

    pub async fn classrooms(&self) -> Result<Vec<Classroom>> {
        self.get("/classrooms").await
    }

    pub async fn reserve_room(&self, request: &RoomReservationRequest) -> Result<RoomReservation> {
        self.post("/reservations", request).await
    }

    pub async fn my_room_reservations(&self) -> Result<Vec<RoomReservation>> {
        self.get("/reservations/my").await
    }
}
