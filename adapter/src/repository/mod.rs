pub mod availability;
pub mod health;
pub mod plan;
pub mod reservation;
pub mod service;

#[cfg(test)]
pub(crate) mod support {
    use chrono::{NaiveDate, NaiveTime};
    use kernel::model::{
        id::{ProviderId, ServiceId, WindowId},
        slot::Slot,
    };
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    pub fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    pub fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    pub fn slot(day: &str, start: &str, end: &str) -> Slot {
        Slot::new(date(day), None, time(start), time(end))
    }

    /// A service bookable every day of the week, 08:00-20:00.
    pub async fn seed_service(
        pool: &PgPool,
        capacity: i32,
        reference_price: Decimal,
    ) -> anyhow::Result<ServiceId> {
        let service_id = ServiceId::new();
        sqlx::query(
            r#"
            INSERT INTO services
            (service_id, service_name, provider_id, capacity, reference_price, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            "#,
        )
        .bind(service_id)
        .bind("Test Service")
        .bind(ProviderId::new())
        .bind(capacity)
        .bind(reference_price)
        .execute(pool)
        .await?;

        for weekday in 0..7i16 {
            seed_window(pool, service_id, weekday, "08:00", "20:00").await?;
        }
        Ok(service_id)
    }

    pub async fn seed_window(
        pool: &PgPool,
        service_id: ServiceId,
        weekday: i16,
        start: &str,
        end: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO schedule_windows
            (window_id, service_id, weekday, start_time, end_time, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            "#,
        )
        .bind(WindowId::new())
        .bind(service_id)
        .bind(weekday)
        .bind(time(start))
        .bind(time(end))
        .execute(pool)
        .await?;
        Ok(())
    }
}
