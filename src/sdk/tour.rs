//! Nearest-neighbour tour construction.
//!
//! Starting from the base point (`BHQ`), the builder repeatedly moves to the
//! closest point not yet visited and finally returns to the base. Distances
//! from the current point to every remaining candidate are requested together
//! and awaited as one batch; the visited set is only updated once the batch
//! has settled.

use futures::future::join_all;
use serde::Serialize;

use super::points::Point;
use super::routing::error::TourError;
use super::routing::fallback::{measure_with_fallback, LegSource, Measured};
use super::routing::haversine::HaversineMetric;
use super::routing::service::DistanceMetric;

/// How the first stop of the tour was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// A point tagged as the base.
    Tagged,
    /// No base in the input; the first point was used instead.
    FirstPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    /// Position in the tour, starting at 0.
    pub sequence: usize,
    /// Position of the point in the caller's input.
    pub input_index: usize,
    pub point: Point,
}

/// Travel between `stops[from]` and `stops[to]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Leg {
    pub from: usize,
    pub to: usize,
    pub distance_m: f64,
    pub source: LegSource,
}

/// A closed tour: `stops` begins and ends with the anchor point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tour {
    pub anchor: Anchor,
    pub stops: Vec<Stop>,
    pub legs: Vec<Leg>,
    pub total_distance_m: f64,
}

impl Tour {
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.stops.iter().map(|s| &s.point)
    }

    /// Input indices in visiting order, including the closing return.
    pub fn visiting_order(&self) -> Vec<usize> {
        self.stops.iter().map(|s| s.input_index).collect()
    }

    /// `[lon, lat]` pairs, ready for a map polyline.
    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        self.points().map(Point::lon_lat).collect()
    }

    pub fn fallback_legs(&self) -> usize {
        self.legs
            .iter()
            .filter(|l| l.source == LegSource::HaversineFallback)
            .count()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_m / 1000.0
    }
}

pub struct TourBuilder<M> {
    metric: M,
}

impl<M: DistanceMetric> TourBuilder<M> {
    pub fn new(metric: M) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub async fn build(&self, points: &[Point]) -> Result<Tour, TourError> {
        validate(points)?;
        let (start, anchor) = select_start(points);
        let n = points.len();

        let mut visited = vec![false; n];
        visited[start] = true;
        let mut order = Vec::with_capacity(n + 1);
        order.push(start);
        let mut legs = Vec::with_capacity(n);
        let mut current = start;

        while order.len() < n {
            let candidates: Vec<usize> = (0..n).filter(|&i| !visited[i]).collect();
            let from = &points[current];
            let measured = join_all(
                candidates
                    .iter()
                    .map(|&i| measure_with_fallback(&self.metric, from, &points[i])),
            )
            .await;

            let (pos, best) = nearest(&measured);
            let next = candidates[pos];
            log::debug!(
                "Step {}: {} -> {} ({:.0} m, {} candidates)",
                order.len(),
                points[current].label(),
                points[next].label(),
                best.distance_m,
                candidates.len()
            );

            visited[next] = true;
            legs.push(Leg {
                from: order.len() - 1,
                to: order.len(),
                distance_m: best.distance_m,
                source: best.source,
            });
            order.push(next);
            current = next;
        }

        let closing = if current == start {
            Measured {
                distance_m: 0.0,
                source: LegSource::Metric,
            }
        } else {
            measure_with_fallback(&self.metric, &points[current], &points[start]).await
        };
        legs.push(Leg {
            from: order.len() - 1,
            to: order.len(),
            distance_m: closing.distance_m,
            source: closing.source,
        });
        order.push(start);

        let tour = Tour {
            anchor,
            stops: order
                .into_iter()
                .enumerate()
                .map(|(sequence, input_index)| Stop {
                    sequence,
                    input_index,
                    point: points[input_index].clone(),
                })
                .collect(),
            total_distance_m: legs.iter().map(|l| l.distance_m).sum(),
            legs,
        };

        log::info!(
            "Built {} tour over {} points: {:.2} km, {} fallback legs",
            self.metric.name(),
            n,
            tour.total_distance_km(),
            tour.fallback_legs()
        );
        Ok(tour)
    }
}

/// Synchronous Haversine-only tour, for callers without an async runtime.
pub fn build_tour_haversine(points: &[Point]) -> Result<Tour, TourError> {
    futures::executor::block_on(TourBuilder::new(HaversineMetric).build(points))
}

fn validate(points: &[Point]) -> Result<(), TourError> {
    if points.is_empty() {
        return Err(TourError::EmptyInput);
    }
    if let Some((index, p)) = points
        .iter()
        .enumerate()
        .find(|(_, p)| !p.has_valid_coordinates())
    {
        return Err(TourError::InvalidCoordinate {
            index,
            latitude: p.latitude,
            longitude: p.longitude,
        });
    }
    Ok(())
}

fn select_start(points: &[Point]) -> (usize, Anchor) {
    match points.iter().position(|p| p.kind.is_base()) {
        Some(index) => (index, Anchor::Tagged),
        None => {
            log::warn!(
                "No base point tagged {} among {} points; anchoring the tour at the first point {}",
                crate::sdk::points::BASE_TAG,
                points.len(),
                points[0].label()
            );
            (0, Anchor::FirstPoint)
        }
    }
}

// First minimum wins, so ties resolve to the earliest candidate.
fn nearest(measured: &[Measured]) -> (usize, Measured) {
    let mut best = (0, measured[0]);
    for (pos, m) in measured.iter().enumerate().skip(1) {
        if m.distance_m < best.1.distance_m {
            best = (pos, *m);
        }
    }
    best
}
