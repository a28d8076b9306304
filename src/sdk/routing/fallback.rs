use super::haversine::haversine_m;
use super::service::DistanceMetric;
use crate::sdk::points::Point;
use serde::Serialize;

/// Where a leg's distance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegSource {
    Metric,
    HaversineFallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measured {
    pub distance_m: f64,
    pub source: LegSource,
}

/// Asks `metric` for the distance and substitutes the Haversine estimate for
/// this pair alone if the lookup fails or returns a non-finite or negative value.
pub async fn measure_with_fallback<M: DistanceMetric>(
    metric: &M,
    from: &Point,
    to: &Point,
) -> Measured {
    let reason = match metric.distance_m(from, to).await {
        Ok(distance_m) if distance_m.is_finite() && distance_m >= 0.0 => {
            return Measured {
                distance_m,
                source: LegSource::Metric,
            };
        }
        Ok(distance_m) => format!("unusable distance {}", distance_m),
        Err(err) => err.to_string(),
    };

    let distance_m = haversine_m(from, to);
    log::warn!(
        "[{}] lookup {} -> {} failed ({}); using Haversine {:.0} m",
        metric.name(),
        from.label(),
        to.label(),
        reason,
        distance_m
    );
    Measured {
        distance_m,
        source: LegSource::HaversineFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::routing::error::RoutingError;

    struct Fixed(Result<f64, ()>);

    impl DistanceMetric for Fixed {
        async fn distance_m(&self, _from: &Point, _to: &Point) -> Result<f64, RoutingError> {
            self.0
                .map_err(|_| RoutingError::Generic("service unavailable".to_string()))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let a = Point::new(10.0, 76.0);
        let b = Point::new(10.05, 76.05);
        let measured = measure_with_fallback(&Fixed(Ok(9000.0)), &a, &b).await;
        assert_eq!(measured.distance_m, 9000.0);
        assert_eq!(measured.source, LegSource::Metric);
    }

    #[tokio::test]
    async fn test_error_uses_haversine() {
        let a = Point::new(10.0, 76.0);
        let b = Point::new(10.05, 76.05);
        let measured = measure_with_fallback(&Fixed(Err(())), &a, &b).await;
        assert_eq!(measured.distance_m, haversine_m(&a, &b));
        assert_eq!(measured.source, LegSource::HaversineFallback);
    }

    #[tokio::test]
    async fn test_nan_and_negative_use_haversine() {
        let a = Point::new(10.0, 76.0);
        let b = Point::new(10.05, 76.05);
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            let measured = measure_with_fallback(&Fixed(Ok(bad)), &a, &b).await;
            assert_eq!(measured.source, LegSource::HaversineFallback);
            assert_eq!(measured.distance_m, haversine_m(&a, &b));
        }
    }
}
