use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::cargo::Cargo;
use crate::models::delivery::{RoutingStatus, TransportStatus};
use crate::repository::CargoRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySummary {
    pub total: usize,
    pub not_routed: usize,
    pub routed: usize,
    pub misrouted: usize,
    pub not_received: usize,
    pub in_port: usize,
    pub onboard_carrier: usize,
    pub claimed: usize,
    pub misdirected: usize,
    pub unloaded_at_destination: usize,
}

impl DeliverySummary {
    pub fn from_cargos<'a>(cargos: impl IntoIterator<Item = &'a Cargo>) -> Self {
        let mut summary = Self::default();

        for cargo in cargos {
            let delivery = cargo.delivery();
            summary.total += 1;

            match delivery.routing_status {
                RoutingStatus::NotRouted => summary.not_routed += 1,
                RoutingStatus::Routed => summary.routed += 1,
                RoutingStatus::Misrouted => summary.misrouted += 1,
            }

            match delivery.transport_status {
                TransportStatus::NotReceived => summary.not_received += 1,
                TransportStatus::InPort => summary.in_port += 1,
                TransportStatus::OnboardCarrier => summary.onboard_carrier += 1,
                TransportStatus::Claimed => summary.claimed += 1,
            }

            if delivery.misdirected {
                summary.misdirected += 1;
            }
            if delivery.unloaded_at_destination {
                summary.unloaded_at_destination += 1;
            }
        }

        summary
    }
}

pub fn summarize(cargos: &dyn CargoRepository) -> Result<DeliverySummary, AppError> {
    Ok(DeliverySummary::from_cargos(&cargos.find_all()?))
}

/// Caller-owned cache of the last summary, keyed by the repository version
/// it was computed at.
#[derive(Debug, Default)]
pub struct SummaryCache {
    cached: Option<(u64, DeliverySummary)>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, cargos: &dyn CargoRepository) -> Result<DeliverySummary, AppError> {
        let version = cargos.version();
        if let Some((cached_version, summary)) = &self.cached {
            if *cached_version == version {
                return Ok(summary.clone());
            }
        }

        let summary = summarize(cargos)?;
        self.cached = Some((version, summary.clone()));
        Ok(summary)
    }

    pub fn cached_version(&self) -> Option<u64> {
        self.cached.as_ref().map(|(version, _)| *version)
    }
}
