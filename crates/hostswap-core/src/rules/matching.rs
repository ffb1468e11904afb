use crate::domain::environment::Environment;
use crate::domain::geo::{haversine_distance, DistanceUnit};
use crate::domain::hosting::Hosting;
use crate::domain::visit::Visit;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_RADIUS: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    pub radius: f64,
    pub unit: DistanceUnit,
    pub exclude_own_hostings: bool,
}

impl MatchPolicy {
    pub fn new(radius: f64, unit: DistanceUnit, environment: Environment) -> Result<Self, CoreError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(CoreError::InvalidRadius(radius));
        }
        Ok(Self {
            radius,
            unit,
            exclude_own_hostings: environment.is_production_like(),
        })
    }

    pub fn for_environment(environment: Environment) -> Self {
        Self {
            radius: DEFAULT_SEARCH_RADIUS,
            unit: DistanceUnit::default(),
            exclude_own_hostings: environment.is_production_like(),
        }
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostingMatch {
    pub hosting: Hosting,
    pub distance: f64,
}

/// Hostings near `visit` whose dates overlap it, closest first.
///
/// A visit without coordinates matches nothing. Ties on distance fall back
/// to the hosting start date, then id.
pub fn select_available_hostings<I>(visit: &Visit, candidates: I, policy: &MatchPolicy) -> Vec<HostingMatch>
where
    I: IntoIterator<Item = Hosting>,
{
    let Some(origin) = visit.coordinates() else {
        return Vec::new();
    };

    let mut matches: Vec<HostingMatch> = candidates
        .into_iter()
        .filter(|hosting| hosting.overlaps(visit.start_date, visit.end_date))
        .filter(|hosting| !(policy.exclude_own_hostings && hosting.host_id == visit.user_id))
        .filter_map(|hosting| {
            let distance = haversine_distance(origin, hosting.coordinates(), policy.unit);
            (distance <= policy.radius).then_some(HostingMatch { hosting, distance })
        })
        .collect();

    matches.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.hosting.start_date.cmp(&b.hosting.start_date))
            .then_with(|| a.hosting.id.cmp(&b.hosting.id))
    });
    matches
}
