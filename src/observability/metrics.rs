use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub cargos_booked_total: IntCounter,
    pub registration_attempts_total: IntCounterVec,
    pub registration_attempts_in_queue: IntGauge,
    pub handling_events_total: IntCounterVec,
    pub notifications_total: IntCounterVec,
    pub inspection_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let cargos_booked_total =
            IntCounter::new("cargos_booked_total", "Total cargos booked")
                .expect("valid cargos_booked_total metric");

        let registration_attempts_total = IntCounterVec::new(
            Opts::new(
                "registration_attempts_total",
                "Handling event registration attempts by outcome",
            ),
            &["outcome"],
        )
        .expect("valid registration_attempts_total metric");

        let registration_attempts_in_queue = IntGauge::new(
            "registration_attempts_in_queue",
            "Current number of registration attempts waiting in queue",
        )
        .expect("valid registration_attempts_in_queue metric");

        let handling_events_total = IntCounterVec::new(
            Opts::new("handling_events_total", "Registered handling events by type"),
            &["event_type"],
        )
        .expect("valid handling_events_total metric");

        let notifications_total = IntCounterVec::new(
            Opts::new("notifications_total", "Raised notifications by kind"),
            &["kind"],
        )
        .expect("valid notifications_total metric");

        let inspection_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "inspection_latency_seconds",
                "Latency of cargo inspection in seconds",
            ),
            &["outcome"],
        )
        .expect("valid inspection_latency_seconds metric");

        registry
            .register(Box::new(cargos_booked_total.clone()))
            .expect("register cargos_booked_total");
        registry
            .register(Box::new(registration_attempts_total.clone()))
            .expect("register registration_attempts_total");
        registry
            .register(Box::new(registration_attempts_in_queue.clone()))
            .expect("register registration_attempts_in_queue");
        registry
            .register(Box::new(handling_events_total.clone()))
            .expect("register handling_events_total");
        registry
            .register(Box::new(notifications_total.clone()))
            .expect("register notifications_total");
        registry
            .register(Box::new(inspection_latency_seconds.clone()))
            .expect("register inspection_latency_seconds");

        Self {
            registry,
            cargos_booked_total,
            registration_attempts_total,
            registration_attempts_in_queue,
            handling_events_total,
            notifications_total,
            inspection_latency_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Metrics;

    #[test]
    fn encodes_registered_metrics() {
        let metrics = Metrics::new();
        metrics.cargos_booked_total.inc();
        metrics
            .handling_events_total
            .with_label_values(&["LOAD"])
            .inc();

        let body = metrics.encode().unwrap();
        assert!(body.contains("cargos_booked_total 1"));
        assert!(body.contains("handling_events_total{event_type=\"LOAD\"} 1"));
    }

    #[test]
    fn registries_are_independent() {
        let a = Metrics::new();
        let b = Metrics::new();
        a.cargos_booked_total.inc();

        assert_eq!(a.cargos_booked_total.get(), 1);
        assert_eq!(b.cargos_booked_total.get(), 0);
    }
}
