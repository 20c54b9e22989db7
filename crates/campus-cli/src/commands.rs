//! Subcommand implementations. Each one calls the API and prints plain text.

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::warn;

use campus_core::models::{attendance_rate, weighted_gpa, Id};
use campus_core::utils::{format_date, format_money, format_optional, truncate_string};
use campus_core::ApiClient;

use crate::settings::LoadedConfig;

/// Column width for names in list output
const NAME_WIDTH: usize = 40;

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line).context("Failed to read input")?;
    Ok(line.trim().to_string())
}

pub async fn login(client: &ApiClient, settings: &mut LoadedConfig, email: Option<String>) -> Result<()> {
    let email = match email.or_else(|| settings.config.last_email.clone()) {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    anyhow::ensure!(!email.is_empty(), "Email is required");
    let password = rpassword::prompt_password(format!("Password for {}: ", email))
        .context("Failed to read password")?;

    let tokens = client.login(&email, &password).await?;
    match tokens.user {
        Some(user) => println!("Signed in as {} ({})", user.full_name(), user.role),
        None => println!("Signed in as {}", email),
    }

    settings.config.last_email = Some(email);
    if let Err(e) = settings.save() {
        warn!(error = %e, "Failed to save config");
    }
    Ok(())
}

pub async fn logout(client: &ApiClient) -> Result<()> {
    client.logout().await?;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(client: &ApiClient) -> Result<()> {
    let user = client.profile().await?;
    println!("{}", user.full_name());
    println!("  Role:       {}", user.role);
    println!("  Email:      {}", format_optional(user.email.as_deref(), "-"));
    if let Some(number) = user.student_number.as_deref() {
        println!("  Student no: {}", number);
    }
    println!("  Department: {}", format_optional(user.department.as_deref(), "-"));
    Ok(())
}

pub async fn courses(client: &ApiClient, sections_of: Option<String>) -> Result<()> {
    if let Some(course_id) = sections_of {
        let course = client.course(&course_id).await?;
        println!("{}", course.title());
        for section in client.course_sections(&course_id).await? {
            let seats = section
                .seats_left()
                .map(|n| format!("{} seats left", n))
                .unwrap_or_else(|| "seats unknown".to_string());
            println!(
                "  [{}] section {} {} | {} | {} | {}",
                section.id,
                format_optional(section.section_number.as_deref(), "?"),
                section.term(),
                format_optional(section.instructor_name.as_deref(), "TBA"),
                section.schedule_display(),
                seats
            );
        }
        return Ok(());
    }

    let courses = client.courses().await?;
    if courses.is_empty() {
        println!("No courses found");
    }
    for course in courses {
        let credits = course.credits.map(|c| format!("{} cr", c)).unwrap_or_default();
        println!(
            "[{}] {:<width$} {}",
            course.id,
            truncate_string(&course.title(), NAME_WIDTH),
            credits,
            width = NAME_WIDTH
        );
    }
    Ok(())
}

pub async fn enroll(client: &ApiClient, section: &str) -> Result<()> {
    let enrollment = client.enroll(Id::from(section)).await?;
    println!(
        "Enrolled: {} {} ({})",
        format_optional(enrollment.course_code.as_deref(), ""),
        format_optional(enrollment.course_name.as_deref(), ""),
        format_optional(enrollment.status.as_deref(), "pending")
    );
    Ok(())
}

pub async fn grades(client: &ApiClient) -> Result<()> {
    let grades = client.my_grades().await?;
    for grade in &grades {
        let fmt_score = |s: Option<f64>| s.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<width$} mid {:>3}  final {:>3}  {}",
            format_optional(grade.course_code.as_deref(), "?"),
            truncate_string(grade.course_name.as_deref().unwrap_or(""), NAME_WIDTH),
            fmt_score(grade.midterm_grade),
            fmt_score(grade.final_grade),
            grade.letter_display(),
            width = NAME_WIDTH
        );
    }
    match weighted_gpa(&grades) {
        Some(gpa) => println!("GPA: {:.2}", gpa),
        None => println!("GPA: -"),
    }
    Ok(())
}

pub async fn attendance(client: &ApiClient, check_in: Option<(String, f64, f64)>) -> Result<()> {
    if let Some((session, lat, lon)) = check_in {
        let record = client.check_in(&session, lat, lon).await?;
        let distance = record
            .distance
            .map(|d| format!(" ({:.0} m from classroom)", d))
            .unwrap_or_default();
        println!("Checked in: {}{}", record.status, distance);
        return Ok(());
    }

    let active = client.active_attendance_sessions().await?;
    if !active.is_empty() {
        println!("Open sessions:");
        for session in &active {
            println!(
                "  [{}] {} until {}",
                session.id,
                format_optional(session.course_code.as_deref(), "?"),
                session.end_time.as_deref().map(format_date).unwrap_or_else(|| "-".to_string())
            );
        }
    }

    let records = client.my_attendance().await?;
    for record in &records {
        println!(
            "{:<10} {:<20} {}",
            format_optional(record.course_code.as_deref(), "?"),
            record.check_in_time.as_deref().map(format_date).unwrap_or_else(|| "-".to_string()),
            record.status
        );
    }
    if let Some(rate) = attendance_rate(&records) {
        println!("Attendance: {:.0}%", rate * 100.0);
    }
    Ok(())
}

pub async fn meals(client: &ApiClient, date: Option<NaiveDate>) -> Result<()> {
    let menus = client.meal_menus(date).await?;
    if menus.is_empty() {
        println!("No menus published");
    }
    for menu in menus {
        println!(
            "[{}] {} {} - {} ({})",
            menu.id,
            menu.date.as_deref().map(format_date).unwrap_or_default(),
            format_optional(menu.meal_type.as_deref(), ""),
            menu.items_display(),
            menu.price.map(|p| format_money(p, None)).unwrap_or_else(|| "-".to_string())
        );
    }

    let reservations = client.my_meal_reservations().await?;
    if !reservations.is_empty() {
        println!("Your reservations:");
        for r in reservations {
            println!(
                "  [{}] {} {} {}",
                r.id,
                r.date.as_deref().map(format_date).unwrap_or_default(),
                format_optional(r.meal_type.as_deref(), ""),
                format_optional(r.status.as_deref(), "")
            );
        }
    }
    Ok(())
}

pub async fn reserve_meal(client: &ApiClient, menu: &str) -> Result<()> {
    let reservation = client.reserve_meal(Id::from(menu)).await?;
    println!(
        "Reserved [{}] {}",
        reservation.id,
        format_optional(reservation.status.as_deref(), "")
    );
    if let Some(code) = reservation.qr_code.as_deref() {
        println!("QR code: {}", code);
    }
    Ok(())
}

pub async fn wallet(client: &ApiClient, top_up: Option<f64>) -> Result<()> {
    if let Some(amount) = top_up {
        let wallet = client.top_up(amount).await?;
        println!("New balance: {}", wallet.balance_display());
        return Ok(());
    }

    let wallet = client.wallet().await?;
    println!("Balance: {}", wallet.balance_display());
    for tx in client.wallet_transactions().await? {
        println!(
            "  {:<20} {:>12}  {}",
            tx.created_at.as_deref().map(format_date).unwrap_or_default(),
            format_money(tx.amount, wallet.currency.as_deref()),
            format_optional(tx.description.as_deref().or(tx.kind.as_deref()), "")
        );
    }
    Ok(())
}

pub async fn events(client: &ApiClient, register: Option<String>) -> Result<()> {
    if let Some(event_id) = register {
        let registration = client.register_event(&event_id).await?;
        println!(
            "Registered for event {} ({})",
            event_id,
            format_optional(registration.status.as_deref(), "registered")
        );
        return Ok(());
    }

    for event in client.events().await? {
        println!(
            "[{}] {:<width$} {:<20} {} {}",
            event.id,
            truncate_string(&event.title, NAME_WIDTH),
            event.date.as_deref().map(format_date).unwrap_or_default(),
            format_optional(event.location.as_deref(), ""),
            event.spots_display(),
            width = NAME_WIDTH
        );
    }
    Ok(())
}

pub async fn rooms(client: &ApiClient) -> Result<()> {
    for room in client.classrooms().await? {
        println!(
            "[{}] {:<12} cap {:>4}  {}",
            room.id,
            room.label(),
            room.capacity.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string()),
            room.features.join(", ")
        );
    }

    let reservations = client.my_room_reservations().await?;
    if !reservations.is_empty() {
        println!("Your reservations:");
        for r in reservations {
            println!(
                "  [{}] {} {}-{} {} ({})",
                r.id,
                format_optional(r.date.as_deref(), "?"),
                format_optional(r.start_time.as_deref(), "?"),
                format_optional(r.end_time.as_deref(), "?"),
                format_optional(r.purpose.as_deref(), ""),
                format_optional(r.status.as_deref(), "")
            );
        }
    }
    Ok(())
}

/// Fetch the overview concurrently; a failing part is reported, not fatal.
pub async fn dashboard(client: &ApiClient) -> Result<()> {
    let (profile, enrollments, wallet, events) = futures::join!(
        client.profile(),
        client.my_enrollments(),
        client.wallet(),
        client.events()
    );

    let profile = profile?;
    println!("Welcome, {}", profile.full_name());

    match enrollments {
        Ok(enrollments) => {
            println!("Courses this term: {}", enrollments.len());
            for e in enrollments {
                println!(
                    "  {} {}",
                    format_optional(e.course_code.as_deref(), ""),
                    format_optional(e.course_name.as_deref(), "")
                );
            }
        }
        Err(e) => println!("Courses: unavailable ({:#})", e),
    }

    match wallet {
        Ok(wallet) => println!("Wallet: {}", wallet.balance_display()),
        Err(e) => println!("Wallet: unavailable ({:#})", e),
    }

    match events {
        Ok(events) => {
            println!("Upcoming events: {}", events.len());
            for event in events.iter().take(5) {
                println!(
                    "  {} {}",
                    event.date.as_deref().map(format_date).unwrap_or_default(),
                    event.title
                );
            }
        }
        Err(e) => println!("Events: unavailable ({:#})", e),
    }
    Ok(())
}

pub async fn raw_get(client: &ApiClient, path: &str) -> Result<()> {
    let value: serde_json::Value = client.get(path).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
